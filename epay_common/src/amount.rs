//! ePay transmits amounts as integers in minor units (hundredths of the currency unit). Internally amounts are
//! `Decimal`s so that no floating-point rounding creeps into stored or forwarded values.
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use thiserror::Error;

const MINOR_UNIT_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("{0} is not a valid amount in minor units")]
    InvalidAmount(String),
    #[error("Amount {0} is out of range")]
    OutOfRange(String),
}

/// Converts an amount string in minor units, e.g. `"1050"`, into `10.50`.
pub fn amount_from_minor_units(value: &str) -> Result<Decimal, AmountError> {
    let minor = value.trim().parse::<i64>().map_err(|_| AmountError::InvalidAmount(value.to_string()))?;
    if minor < 0 {
        return Err(AmountError::InvalidAmount(value.to_string()));
    }
    Ok(Decimal::new(minor, MINOR_UNIT_SCALE))
}

/// Converts an amount into minor units, rounding half-away-from-zero at the second decimal place.
pub fn amount_to_minor_units(amount: Decimal) -> Result<i64, AmountError> {
    let rounded = amount.round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    (rounded * Decimal::ONE_HUNDRED).to_i64().ok_or_else(|| AmountError::OutOfRange(amount.to_string()))
}
