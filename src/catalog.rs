//! Catalog

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::products::Product;

/// Errors raised by catalog lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog has no price listed for the product.
    #[error("no price listed for {0}")]
    UnknownProduct(String),
}

/// Unit-price lookup for products.
///
/// In production the catalog is backed by an external price store; this crate
/// only ever reads from it. [`crate::fixtures::MemoryCatalog`] provides an
/// in-memory implementation for tests and demos.
pub trait Catalog {
    /// Returns the unit price for a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownProduct`] if the product has no listed
    /// price. A checkout treats that as fatal.
    fn unit_price(&self, product: &Product) -> Result<Money<'static, Currency>, CatalogError>;
}
