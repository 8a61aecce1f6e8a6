//! The ePay request checksum.
//!
//! ePay signs every request it sends us. The signature is an HMAC-SHA1 over a message built from the request
//! parameters, keyed with the secret shared between ePay and the merchant:
//!
//! 1. Drop the `CHECKSUM` parameter itself.
//! 2. Sort the remaining keys in ascending byte order.
//! 3. For each key, append `<key><first value>\n` to the message.
//!
//! The digest is hex-encoded in lowercase and compared byte for byte, in constant time, with the supplied `CHECKSUM`.
//! Only the first value of a repeated parameter takes part in the message.
use hmac::{Hmac, Mac};
use log::trace;
use sha1::Sha1;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::db_types::RequestParams;

pub const CHECKSUM_PARAM: &str = "CHECKSUM";

type HmacSha1 = Hmac<Sha1>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecksumError {
    #[error("The request does not carry a CHECKSUM parameter")]
    MissingChecksum,
    #[error("The request checksum does not match")]
    InvalidChecksum,
}

/// Returns the first value of the given parameter, if any.
pub fn first_param<'a>(params: &'a RequestParams, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|values| values.first()).map(String::as_str)
}

/// Calculates the ePay checksum of `params` using `secret` as the HMAC key.
pub fn calculate_checksum(params: &RequestParams, secret: &str) -> String {
    let mut keys = params.keys().filter(|k| k.as_str() != CHECKSUM_PARAM).collect::<Vec<_>>();
    keys.sort_unstable();
    let message = keys.into_iter().fold(String::new(), |mut message, key| {
        message.push_str(key);
        message.push_str(first_param(params, key).unwrap_or_default());
        message.push('\n');
        message
    });
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Checks the `CHECKSUM` parameter of `params` against the checksum calculated with `secret`.
pub fn verify_checksum(params: &RequestParams, secret: &str) -> Result<(), ChecksumError> {
    let supplied = first_param(params, CHECKSUM_PARAM).ok_or(ChecksumError::MissingChecksum)?;
    let expected = calculate_checksum(params, secret);
    if bool::from(supplied.as_bytes().ct_eq(expected.as_bytes())) {
        trace!("🔐️ Checksum check ✅️");
        Ok(())
    } else {
        trace!("🔐️ Checksum mismatch");
        Err(ChecksumError::InvalidChecksum)
    }
}
