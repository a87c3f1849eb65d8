//! Checkout

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    basket::Basket,
    catalog::{Catalog, CatalogError},
    discounts::{DiscountError, calculate_discount},
    offers::{Offer, OfferRegistry, OfferType},
    pricing::{PricingError, line_total},
    products::Product,
    receipt::Receipt,
};

/// Errors that abort a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A basket product had no catalog price.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A line could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// A discount could not be calculated.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Prices baskets against a catalog and applies registered special offers.
#[derive(Debug)]
pub struct Teller<'c, C: Catalog> {
    catalog: &'c C,
    offers: OfferRegistry,
    currency: &'static Currency,
}

impl<'c, C: Catalog> Teller<'c, C> {
    /// Creates a teller for a catalog, issuing receipts in the given currency.
    pub fn new(catalog: &'c C, currency: &'static Currency) -> Self {
        Teller {
            catalog,
            offers: OfferRegistry::new(),
            currency,
        }
    }

    /// Attaches a special offer to a product, replacing any existing one.
    pub fn add_special_offer(
        &mut self,
        offer_type: OfferType,
        product: Product,
        argument: Decimal,
    ) {
        self.offers.register(product, Offer::new(offer_type, argument));
    }

    /// Prices every basket entry and applies at most one discount per product.
    ///
    /// Receipt lines follow the basket's insertion order, one line per
    /// addition, each priced individually. Discounts are computed on each
    /// product's merged quantity and follow the order in which products first
    /// entered the basket.
    ///
    /// # Errors
    ///
    /// Any failure aborts the whole checkout: an unknown product in the
    /// catalog, an unpriceable line, or an invalid quantity, price or
    /// percentage during discount calculation.
    pub fn checkout(&self, basket: &Basket) -> Result<Receipt<'static>, CheckoutError> {
        let mut receipt = Receipt::new(self.currency);

        for entry in basket.items() {
            let unit_price = self.catalog.unit_price(entry.product())?;
            let total = line_total(entry.quantity(), &unit_price)?;

            receipt.add_item(entry.product().clone(), entry.quantity(), unit_price, total);
        }

        for (product, quantity) in basket.product_quantities() {
            let Some(offer) = self.offers.offer_for(product) else {
                continue;
            };

            let unit_price = self.catalog.unit_price(product)?;

            if let Some(discount) = calculate_discount(product, quantity, &unit_price, offer)? {
                receipt.add_discount(discount);
            }
        }

        Ok(receipt)
    }
}
