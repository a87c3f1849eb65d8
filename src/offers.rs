//! Offers

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::products::Product;

/// Kinds of promotional offer that can be attached to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferType {
    /// Three units for the price of two.
    ThreeForTwo,

    /// Two units for a fixed bundle price.
    TwoForAmount,

    /// Five units for a fixed bundle price.
    FiveForAmount,

    /// A percentage off the full price of the product.
    TenPercentDiscount,
}

/// A promotional offer: a kind plus a single numeric argument.
///
/// The argument's meaning depends on the kind: unused for
/// [`OfferType::ThreeForTwo`], a bundle price in major units for the
/// `*ForAmount` kinds, and a percentage in `0..=100` for
/// [`OfferType::TenPercentDiscount`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    #[serde(rename = "type")]
    offer_type: OfferType,
    argument: Decimal,
}

impl Offer {
    /// Creates a new offer.
    #[must_use]
    pub fn new(offer_type: OfferType, argument: Decimal) -> Self {
        Offer {
            offer_type,
            argument,
        }
    }

    /// Returns the kind of this offer.
    #[must_use]
    pub fn offer_type(&self) -> OfferType {
        self.offer_type
    }

    /// Returns the numeric argument of this offer.
    #[must_use]
    pub fn argument(&self) -> Decimal {
        self.argument
    }
}

/// Registry mapping each product to at most one active offer.
///
/// Registering a second offer for a product replaces the first. Lookup is
/// read-only during checkout; a missing entry simply means no offer applies.
#[derive(Debug, Default)]
pub struct OfferRegistry {
    offers: FxHashMap<Product, Offer>,
}

impl OfferRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        OfferRegistry {
            offers: FxHashMap::default(),
        }
    }

    /// Registers an offer for a product, replacing any existing one.
    pub fn register(&mut self, product: Product, offer: Offer) {
        self.offers.insert(product, offer);
    }

    /// Returns the active offer for a product, if any.
    #[must_use]
    pub fn offer_for(&self, product: &Product) -> Option<&Offer> {
        self.offers.get(product)
    }

    /// Returns the number of products with a registered offer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offers.len()
    }

    /// Checks whether any offers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}
