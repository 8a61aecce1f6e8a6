use serde_json::json;

pub const PRIVATE_KEY: &str = include_str!("../test_data/service_account_key.pem");
pub const PUBLIC_KEY: &str = include_str!("../test_data/service_account_pub.pem");
pub const CLIENT_EMAIL: &str = "epay-bridge@telcong.iam.example.com";

pub fn service_account_json(token_uri: &str) -> String {
    json!({
        "type": "service_account",
        "client_email": CLIENT_EMAIL,
        "private_key_id": "test-key-1",
        "private_key": PRIVATE_KEY,
        "token_uri": token_uri,
    })
    .to_string()
}
