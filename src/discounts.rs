//! Discounts

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    offers::{Offer, OfferType},
    pricing::{PricingError, line_total, scale_minor},
    products::Product,
};

/// Errors specific to discount calculation.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Only positive quantities qualify for a discount.
    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(Decimal),

    /// Unit prices below zero cannot be discounted.
    #[error("unit price must not be negative, got {0} minor units")]
    NegativeUnitPrice(i64),

    /// Percentage arguments must lie between 0 and 100.
    #[error("discount percentage must be between 0 and 100, got {0}")]
    PercentageOutOfRange(Decimal),

    /// Wrapped pricing arithmetic error.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// A discount granted to one product on a receipt.
///
/// The amount is an adjustment to the receipt total and is always zero or
/// negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Discount<'a> {
    product: Product,
    description: String,
    amount: Money<'a, Currency>,
}

impl<'a> Discount<'a> {
    /// Creates a new discount.
    pub fn new(
        product: Product,
        description: impl Into<String>,
        amount: Money<'a, Currency>,
    ) -> Self {
        Discount {
            product,
            description: description.into(),
            amount,
        }
    }

    /// Returns the discounted product.
    #[must_use]
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Returns the human-readable description, e.g. `"3 for £1.98"`.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the discount amount (zero or negative).
    #[must_use]
    pub fn amount(&self) -> &Money<'a, Currency> {
        &self.amount
    }
}

/// Calculates the discount an offer grants on the merged quantity of a product.
///
/// Quantity and unit price are validated here rather than at basket level: a
/// basket accepts any quantity, but only positive quantities at non-negative
/// prices can be discounted. Validation runs once per product per checkout.
///
/// Returns `Ok(None)` when the offer does not apply at this quantity, e.g. a
/// group offer with fewer units than the group size. A qualifying group offer
/// always produces a record, even when its amount works out to zero.
///
/// # Errors
///
/// - [`DiscountError::InvalidQuantity`] if `quantity <= 0`.
/// - [`DiscountError::NegativeUnitPrice`] if `unit_price < 0`.
/// - [`DiscountError::PercentageOutOfRange`] if a percentage argument is
///   outside `0..=100`.
/// - [`DiscountError::Pricing`] if an amount overflows minor units.
pub fn calculate_discount<'a>(
    product: &Product,
    quantity: Decimal,
    unit_price: &Money<'a, Currency>,
    offer: &Offer,
) -> Result<Option<Discount<'a>>, DiscountError> {
    if quantity <= Decimal::ZERO {
        return Err(DiscountError::InvalidQuantity(quantity));
    }

    if unit_price.is_negative() {
        return Err(DiscountError::NegativeUnitPrice(unit_price.to_minor_units()));
    }

    match offer.offer_type() {
        OfferType::ThreeForTwo => {
            let bundle = two_units_price(unit_price)?;

            group_discount(product, quantity, unit_price, 3, &bundle)
        }
        OfferType::TwoForAmount => {
            let bundle = bundle_price(offer.argument(), unit_price.currency())?;

            group_discount(product, quantity, unit_price, 2, &bundle)
        }
        OfferType::FiveForAmount => {
            let bundle = bundle_price(offer.argument(), unit_price.currency())?;

            group_discount(product, quantity, unit_price, 5, &bundle)
        }
        OfferType::TenPercentDiscount => {
            percentage_discount(product, quantity, unit_price, offer.argument())
        }
    }
}

/// Applies the generic group rule: every full group of `group_size` units is
/// charged `bundle_price`, with the remainder priced per unit.
fn group_discount<'a>(
    product: &Product,
    quantity: Decimal,
    unit_price: &Money<'a, Currency>,
    group_size: u32,
    bundle_price: &Money<'a, Currency>,
) -> Result<Option<Discount<'a>>, DiscountError> {
    let group_size_dec = Decimal::from(group_size);

    if quantity < group_size_dec {
        return Ok(None);
    }

    let groups = (quantity / group_size_dec).floor();
    let remainder = quantity - groups * group_size_dec;

    let full_price = line_total(quantity, unit_price)?;
    let bundled = scale_minor(groups, bundle_price.to_minor_units())?;
    let leftover = scale_minor(remainder, unit_price.to_minor_units())?;

    let payable = bundled
        .checked_add(leftover)
        .ok_or(PricingError::AmountOverflow)?;

    // An uneconomic bundle price clamps to a zero-valued record, never a
    // surcharge.
    let saved = (full_price.to_minor_units() - payable).max(0);

    Ok(Some(Discount::new(
        product.clone(),
        format!("{group_size} for {bundle_price}"),
        Money::from_minor(-saved, unit_price.currency()),
    )))
}

/// Takes a percentage of the full price off.
fn percentage_discount<'a>(
    product: &Product,
    quantity: Decimal,
    unit_price: &Money<'a, Currency>,
    argument: Decimal,
) -> Result<Option<Discount<'a>>, DiscountError> {
    if argument < Decimal::ZERO || argument > Decimal::ONE_HUNDRED {
        return Err(DiscountError::PercentageOutOfRange(argument));
    }

    let full_price = line_total(quantity, unit_price)?;
    let fraction = argument / Decimal::ONE_HUNDRED;
    let off = scale_minor(fraction, full_price.to_minor_units())?;

    Ok(Some(Discount::new(
        product.clone(),
        format!("{}% off", argument.normalize()),
        Money::from_minor(-off, unit_price.currency()),
    )))
}

/// The regular price of two units, used as the bundle price for three-for-two.
fn two_units_price<'a>(
    unit_price: &Money<'a, Currency>,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = scale_minor(Decimal::TWO, unit_price.to_minor_units())?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Converts a bundle price given in major units into money.
fn bundle_price<'a>(
    argument: Decimal,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = scale_minor(argument, 100)?;

    Ok(Money::from_minor(minor, currency))
}
