mod checksum;
mod contract_code;

pub use checksum::{calculate_checksum, first_param, verify_checksum, ChecksumError, CHECKSUM_PARAM};
pub use contract_code::{is_contract_code, CONTRACT_CODE_LENGTH};
