//! Basket

use rust_decimal::Decimal;

use crate::products::Product;

/// One basket entry exactly as it was added: a product and the quantity added.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuantity {
    product: Product,
    quantity: Decimal,
}

impl ProductQuantity {
    /// Creates a new entry.
    pub fn new(product: Product, quantity: Decimal) -> Self {
        ProductQuantity { product, quantity }
    }

    /// Returns the product.
    #[must_use]
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Returns the quantity as added.
    #[must_use]
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }
}

/// A shopping basket.
///
/// Keeps the full insertion-order history of additions alongside a running
/// per-product total. The history drives receipt lines, one line per
/// addition; the merged totals drive offer qualification. Merged totals are
/// ordered by each product's first occurrence, so discount order is
/// deterministic.
///
/// No validation happens here: zero, negative and fractional quantities are
/// stored as given and only vetted once a discount is computed.
#[derive(Debug, Default)]
pub struct Basket {
    items: Vec<ProductQuantity>,
    quantities: Vec<(Product, Decimal)>,
}

impl Basket {
    /// Creates an empty basket.
    #[must_use]
    pub fn new() -> Self {
        Basket {
            items: Vec::new(),
            quantities: Vec::new(),
        }
    }

    /// Adds a single unit of a product.
    pub fn add(&mut self, product: Product) {
        self.add_quantity(product, Decimal::ONE);
    }

    /// Adds a quantity of a product, merging it into the running total.
    pub fn add_quantity(&mut self, product: Product, quantity: Decimal) {
        if let Some((_, total)) = self.quantities.iter_mut().find(|(p, _)| *p == product) {
            *total += quantity;
        } else {
            self.quantities.push((product.clone(), quantity));
        }

        self.items.push(ProductQuantity::new(product, quantity));
    }

    /// Every addition in insertion order, never merged.
    #[must_use]
    pub fn items(&self) -> &[ProductQuantity] {
        &self.items
    }

    /// Merged per-product totals, ordered by first occurrence.
    pub fn product_quantities(&self) -> impl Iterator<Item = (&Product, Decimal)> {
        self.quantities
            .iter()
            .map(|(product, quantity)| (product, *quantity))
    }

    /// Returns the number of additions made to the basket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the basket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
