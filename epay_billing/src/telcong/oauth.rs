//! OAuth2 access tokens for service accounts (RFC 7523 JWT-bearer grant).
//!
//! The service-account key is the usual JSON document with `client_email`, `private_key` (PEM encoded RSA key),
//! `private_key_id` and `token_uri`. We sign a short-lived RS256 assertion with the private key and trade it for an
//! access token at `token_uri`. Tokens are reused until a minute before they expire.
//!
//! Billing clients are built per request, so token sources outlive them in [`TokenSources`].
use std::{fmt::Debug, sync::Arc, time::Duration as StdDuration};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use epay_common::Secret;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use url::Url;

use super::api::http_client;
use crate::BillingError;

pub const DEFAULT_OAUTH_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.email";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

struct AccessToken {
    value: Secret<String>,
    expires_at: DateTime<Utc>,
}

pub struct TokenSource {
    client_email: String,
    key_id: Option<String>,
    token_uri: Url,
    scope: String,
    encoding_key: EncodingKey,
    http: Client,
    cached: Mutex<Option<AccessToken>>,
}

impl Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenSource({}, {})", self.client_email, self.token_uri)
    }
}

impl TokenSource {
    /// Parses the service-account key. Malformed JSON, a missing field or an unreadable private key are all
    /// configuration errors.
    pub fn from_service_account_json(json: &str, scope: &str, http: Client) -> Result<Self, BillingError> {
        let key = serde_json::from_str::<ServiceAccountKey>(json)
            .map_err(|e| BillingError::Configuration(format!("Invalid TelcoNG service account key: {e}")))?;
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| BillingError::Configuration(format!("Invalid TelcoNG private key: {e}")))?;
        let token_uri = key.token_uri.as_deref().filter(|s| !s.is_empty()).unwrap_or(DEFAULT_TOKEN_URI);
        let token_uri = Url::parse(token_uri)
            .map_err(|e| BillingError::Configuration(format!("Invalid token URI '{token_uri}': {e}")))?;
        Ok(Self {
            client_email: key.client_email,
            key_id: key.private_key_id,
            token_uri,
            scope: scope.to_string(),
            encoding_key,
            http,
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        self.client_email.as_str()
    }

    /// Returns a valid access token, fetching a new one if the cached token is missing or about to expire.
    pub async fn access_token(&self) -> Result<String, BillingError> {
        let mut cached = self.cached.lock().await;
        let still_valid = Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS);
        if let Some(token) = cached.as_ref().filter(|t| t.expires_at > still_valid) {
            trace!("🔑️ Using cached access token for {}", self.client_email);
            return Ok(token.value.reveal().clone());
        }
        let token = self.fetch_token().await?;
        let value = token.value.reveal().clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Signs the assertion that is traded for an access token.
    pub fn assertion(&self, now: DateTime<Utc>) -> Result<String, BillingError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: &self.scope,
            aud: self.token_uri.as_str(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| BillingError::Configuration(format!("Could not sign OAuth2 assertion: {e}")))
    }

    async fn fetch_token(&self) -> Result<AccessToken, BillingError> {
        let now = Utc::now();
        let assertion = self.assertion(now)?;
        debug!("🔑️ Requesting access token for {} from {}", self.client_email, self.token_uri);
        let response = self
            .http
            .post(self.token_uri.clone())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            warn!("🔑️ Token request for {} failed. {status}: {message}", self.client_email);
            return Err(BillingError::Unavailable(format!("OAuth2 token request failed with {status}")));
        }
        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| BillingError::Unavailable(format!("Invalid OAuth2 token response: {e}")))?;
        Ok(AccessToken {
            value: Secret::new(token.access_token),
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

/// Token sources keyed by service-account key and scope. Clones share the same sources.
#[derive(Clone, Default)]
pub struct TokenSources {
    sources: Arc<DashMap<(String, String), Arc<TokenSource>>>,
}

impl Debug for TokenSources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenSources({} sources)", self.sources.len())
    }
}

impl TokenSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// The token source for `jwt_key` and `scope`, created on first use. `timeout` only applies to new sources.
    pub fn get_or_create(
        &self,
        jwt_key: &str,
        scope: &str,
        timeout: StdDuration,
    ) -> Result<Arc<TokenSource>, BillingError> {
        let key = (jwt_key.to_string(), scope.to_string());
        if let Some(source) = self.sources.get(&key) {
            return Ok(Arc::clone(source.value()));
        }
        let source = Arc::new(TokenSource::from_service_account_json(jwt_key, scope, http_client(timeout)?)?);
        debug!("🔑️ New token source for {}", source.client_email());
        Ok(Arc::clone(self.sources.entry(key).or_insert(source).value()))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
