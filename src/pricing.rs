//! Pricing

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors that can occur while pricing quantities of a product.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The amount is not representable in whole minor currency units.
    #[error("amount overflowed the representable minor-unit range")]
    AmountOverflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Prices a quantity of product at the given unit price.
///
/// The product of quantity and price is computed in decimal space and rounded
/// to whole minor units, half away from zero, so every line total is
/// representable on a receipt. Quantities may be fractional (loose-weight
/// products) and are not validated here.
///
/// # Errors
///
/// Returns [`PricingError::AmountOverflow`] if the result does not fit in
/// minor units.
pub fn line_total<'a>(
    quantity: Decimal,
    unit_price: &Money<'a, Currency>,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = scale_minor(quantity, unit_price.to_minor_units())?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Multiplies an amount of minor units by a decimal factor, rounding half away
/// from zero.
pub(crate) fn scale_minor(factor: Decimal, minor: i64) -> Result<i64, PricingError> {
    let Some(minor) = Decimal::from_i64(minor) else {
        unreachable!("always returns `Some` for every `i64`")
    };

    let scaled = factor
        .checked_mul(minor)
        .ok_or(PricingError::AmountOverflow)?;

    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::AmountOverflow)
}
