//! Products

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unit in which a product is sold and its quantities are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductUnit {
    /// Sold as individual pieces; quantities are whole numbers.
    Each,

    /// Sold by weight; quantities may be fractional kilograms.
    Kilo,
}

/// Product identity: a name together with its sales unit.
///
/// Two products are the same product exactly when both fields match, which is
/// what makes `Product` usable as a map key for offers and catalog prices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    name: String,
    unit: ProductUnit,
}

impl Product {
    /// Creates a new product.
    pub fn new(name: impl Into<String>, unit: ProductUnit) -> Self {
        Product {
            name: name.into(),
            unit,
        }
    }

    /// Returns the product name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit the product is sold in.
    #[must_use]
    pub fn unit(&self) -> ProductUnit {
        self.unit
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
