mod amount;
mod helpers;
mod secret;

pub use amount::{amount_from_minor_units, amount_to_minor_units, AmountError};
pub use helpers::{parse_boolean_flag, parse_list};
pub use secret::Secret;
