use epay_engine::db_types::RequestParams;

/// Parses an `application/x-www-form-urlencoded` string into request parameters. Repeated keys keep all their values
/// in order. A key without `=` gets an empty value.
pub fn parse_params(query: &str) -> RequestParams {
    url::form_urlencoded::parse(query.as_bytes()).into_owned().fold(RequestParams::new(), |mut params, (k, v)| {
        params.entry(k).or_default().push(v);
        params
    })
}

/// The tenant a request is addressed to: its host name, lower-cased and without the port.
pub fn tenant_from_host(host: &str) -> String {
    let host = host.trim();
    let name = match host.strip_prefix('[') {
        // IPv6 literal, e.g. [::1]:8080
        Some(rest) => rest.split(']').next().map(|ip| format!("[{ip}]")).unwrap_or_default(),
        None => host.split(':').next().unwrap_or_default().to_string(),
    };
    name.to_lowercase()
}
