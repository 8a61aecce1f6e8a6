//! TelcoNG contract codes are seven digits: a six-digit body followed by a Luhn check digit.
//!
//! Whether an IDN is a contract code decides which back-end owns it (and how UCRM searches for it). It says nothing
//! about whether the holder may pay. It is a routing signal only.

pub const CONTRACT_CODE_LENGTH: usize = 7;

/// Returns true if `code` is seven bytes long and its last byte is the Luhn check digit of the first six.
///
/// Only the check digit has to be an ASCII digit. Any other byte in the body counts as 0, so `"ABCDEF0"` is a
/// contract code.
pub fn is_contract_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    if bytes.len() != CONTRACT_CODE_LENGTH {
        return false;
    }
    let (body, check) = bytes.split_at(CONTRACT_CODE_LENGTH - 1);
    if !check[0].is_ascii_digit() {
        return false;
    }
    let check_digit = u32::from(check[0] - b'0');
    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = if b.is_ascii_digit() { u32::from(b - b'0') } else { 0 };
            if i % 2 == 0 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();
    (10 - sum % 10) % 10 == check_digit
}
