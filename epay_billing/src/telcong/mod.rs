//! The TelcoNG billing API.
//!
//! Requests are authenticated with OAuth2 bearer tokens obtained through the JWT-bearer grant from a service-account
//! key (see [`TokenSource`]). The API itself is plain JSON over HTTPS:
//!
//! * `GET  {base}/v1/epay/bills/{idn}` → `{"amount": "12.40", "subscriberName": "..."}`
//! * `POST {base}/v1/epay/orders` with `{"idn", "amount", "metadata"}` → `{"transactionId": "..."}`
//! * `POST {base}/v1/epay/orders/{transactionId}/confirm` with `{"invoices": [...]}`
//!
//! A `404` from any of them means the subscriber or order is unknown.
mod api;
mod data_objects;
mod oauth;

pub use api::TelcoNgClient;
pub use oauth::{TokenSource, TokenSources, DEFAULT_OAUTH_SCOPE};
