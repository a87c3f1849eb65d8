//! Receipt

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    discounts::Discount,
    products::{Product, ProductUnit},
};

/// Errors that can occur when totalling or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The receipt could not be written to the output.
    #[error("failed to write receipt")]
    Io(#[from] io::Error),
}

/// One priced line on a receipt, corresponding to a single basket addition.
///
/// The line total is supplied by the checkout and recorded as given, never
/// recomputed; it may legitimately differ from `quantity * price` when a line
/// is constructed independently.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptItem<'a> {
    product: Product,
    quantity: Decimal,
    price: Money<'a, Currency>,
    total_price: Money<'a, Currency>,
}

impl<'a> ReceiptItem<'a> {
    /// Creates a new receipt line.
    pub fn new(
        product: Product,
        quantity: Decimal,
        price: Money<'a, Currency>,
        total_price: Money<'a, Currency>,
    ) -> Self {
        ReceiptItem {
            product,
            quantity,
            price,
            total_price,
        }
    }

    /// Returns the product on this line.
    #[must_use]
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Returns the quantity on this line.
    #[must_use]
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Returns the unit price at the time the line was created.
    #[must_use]
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Returns the line total as supplied by the checkout.
    #[must_use]
    pub fn total_price(&self) -> &Money<'a, Currency> {
        &self.total_price
    }
}

/// A priced, discounted receipt.
///
/// Lines appear in the order they were added, one per basket addition;
/// discounts appear in the order they were applied, at most one per product.
/// Totals are recomputed from the current contents on every call.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    items: Vec<ReceiptItem<'a>>,
    discounts: SmallVec<[Discount<'a>; 4]>,
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Creates an empty receipt in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Receipt {
            items: Vec::new(),
            discounts: SmallVec::new(),
            currency,
        }
    }

    /// Appends a priced line, trusting the supplied total.
    pub fn add_item(
        &mut self,
        product: Product,
        quantity: Decimal,
        price: Money<'a, Currency>,
        total_price: Money<'a, Currency>,
    ) {
        self.items
            .push(ReceiptItem::new(product, quantity, price, total_price));
    }

    /// Appends a discount.
    pub fn add_discount(&mut self, discount: Discount<'a>) {
        self.discounts.push(discount);
    }

    /// The priced lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[ReceiptItem<'a>] {
        &self.items
    }

    /// The applied discounts, in application order.
    #[must_use]
    pub fn discounts(&self) -> &[Discount<'a>] {
        &self.discounts
    }

    /// Currency used for all monetary values.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Sum of the line totals, before discounts.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError::Money`] on currency mismatch between lines.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, ReceiptError> {
        let subtotal = self
            .items
            .iter()
            .try_fold(Money::from_minor(0, self.currency), |acc, item| {
                acc.add(*item.total_price())
            })?;

        Ok(subtotal)
    }

    /// Grand total: line totals plus discount adjustments.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError::Money`] on currency mismatch between entries.
    pub fn total_price(&self) -> Result<Money<'a, Currency>, ReceiptError> {
        let total = self
            .discounts
            .iter()
            .try_fold(self.subtotal()?, |acc, discount| acc.add(*discount.amount()))?;

        Ok(total)
    }

    /// The amount saved through discounts.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError::Money`] on currency mismatch between entries.
    pub fn savings(&self) -> Result<Money<'a, Currency>, ReceiptError> {
        let savings = self.subtotal()?.sub(self.total_price()?)?;

        Ok(savings)
    }

    /// The savings as a fraction of the pre-discount subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError::Money`] on currency mismatch between entries.
    pub fn savings_percent(&self) -> Result<Percentage, ReceiptError> {
        let savings_minor = self.savings()?.to_minor_units();
        let subtotal_minor = self.subtotal()?.to_minor_units();

        if subtotal_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        let savings = Decimal::from_i64(savings_minor).unwrap_or(Decimal::ZERO);
        let subtotal = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ZERO);

        Ok(Percentage::from(savings / subtotal))
    }

    /// Writes the receipt as a text table followed by a summary block.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a total cannot be computed or the output
    /// cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Unit Price", "Total"]);

        for item in &self.items {
            builder.push_record([
                item.product().name().to_string(),
                quantity_display(item.quantity(), item.product().unit()),
                format!("{}", item.price()),
                format!("{}", item.total_price()),
            ]);
        }

        for discount in &self.discounts {
            builder.push_record([
                format!("{} ({})", discount.description(), discount.product().name()),
                String::new(),
                String::new(),
                format!("{}", discount.amount()),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..4), Alignment::right());

        writeln!(out, "{table}")?;

        let percent_points = percent_points(self.savings_percent()?);

        writeln!(out, " Subtotal: {}", self.subtotal()?)?;
        writeln!(out, " Total:    {}", self.total_price()?)?;
        writeln!(out, " Savings:  ({percent_points:.2}%) {}", self.savings()?)?;

        Ok(())
    }
}

/// Formats a quantity for display: whole numbers for unit sales, three
/// decimals for weighed goods.
fn quantity_display(quantity: Decimal, unit: ProductUnit) -> String {
    match unit {
        ProductUnit::Each => quantity.normalize().to_string(),
        ProductUnit::Kilo => format!("{quantity:.3}"),
    }
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn toothbrush() -> Product {
        Product::new("toothbrush", ProductUnit::Each)
    }

    fn apples() -> Product {
        Product::new("apples", ProductUnit::Kilo)
    }

    #[test]
    fn empty_receipt_totals_to_zero() -> TestResult {
        let receipt = Receipt::new(GBP);

        assert!(receipt.items().is_empty());
        assert!(receipt.discounts().is_empty());
        assert_eq!(receipt.total_price()?, Money::from_minor(0, GBP));

        Ok(())
    }

    #[test]
    fn total_is_items_plus_discounts() -> TestResult {
        let mut receipt = Receipt::new(GBP);

        receipt.add_item(
            toothbrush(),
            Decimal::TWO,
            Money::from_minor(99, GBP),
            Money::from_minor(198, GBP),
        );
        receipt.add_item(
            apples(),
            Decimal::ONE,
            Money::from_minor(199, GBP),
            Money::from_minor(199, GBP),
        );

        assert_eq!(receipt.total_price()?, Money::from_minor(397, GBP));

        receipt.add_discount(Discount::new(
            toothbrush(),
            "3 for £1.98",
            Money::from_minor(-99, GBP),
        ));

        assert_eq!(receipt.subtotal()?, Money::from_minor(397, GBP));
        assert_eq!(receipt.total_price()?, Money::from_minor(298, GBP));

        Ok(())
    }

    #[test]
    fn total_is_idempotent_across_calls() -> TestResult {
        let mut receipt = Receipt::new(GBP);

        receipt.add_item(
            toothbrush(),
            Decimal::ONE,
            Money::from_minor(99, GBP),
            Money::from_minor(99, GBP),
        );

        assert_eq!(receipt.total_price()?, receipt.total_price()?);

        Ok(())
    }

    #[test]
    fn line_total_is_trusted_not_recomputed() -> TestResult {
        let mut receipt = Receipt::new(GBP);

        // Deliberately inconsistent with quantity * price.
        receipt.add_item(
            toothbrush(),
            Decimal::TWO,
            Money::from_minor(250, GBP),
            Money::from_minor(600, GBP),
        );

        assert_eq!(receipt.total_price()?, Money::from_minor(600, GBP));

        Ok(())
    }

    #[test]
    fn total_errors_on_currency_mismatch() {
        let mut receipt = Receipt::new(GBP);

        receipt.add_item(
            toothbrush(),
            Decimal::ONE,
            Money::from_minor(100, USD),
            Money::from_minor(100, USD),
        );

        assert!(matches!(
            receipt.total_price(),
            Err(ReceiptError::Money(_))
        ));
    }

    #[test]
    fn savings_and_percent() -> TestResult {
        let mut receipt = Receipt::new(GBP);

        receipt.add_item(
            toothbrush(),
            Decimal::from(4),
            Money::from_minor(100, GBP),
            Money::from_minor(400, GBP),
        );
        receipt.add_discount(Discount::new(
            toothbrush(),
            "25% off",
            Money::from_minor(-100, GBP),
        ));

        assert_eq!(receipt.savings()?, Money::from_minor(100, GBP));
        assert_eq!(percent_points(receipt.savings_percent()?), Decimal::from(25));

        Ok(())
    }

    #[test]
    fn savings_percent_is_zero_for_empty_receipt() -> TestResult {
        let receipt = Receipt::new(GBP);

        assert_eq!(receipt.savings_percent()?, Percentage::from(0.0));

        Ok(())
    }

    #[test]
    fn write_to_renders_items_discounts_and_summary() -> TestResult {
        let mut receipt = Receipt::new(GBP);

        receipt.add_item(
            toothbrush(),
            Decimal::from(3),
            Money::from_minor(99, GBP),
            Money::from_minor(297, GBP),
        );
        receipt.add_discount(Discount::new(
            toothbrush(),
            "3 for £1.98",
            Money::from_minor(-99, GBP),
        ));

        let mut out = Vec::new();
        receipt.write_to(&mut out)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("toothbrush"));
        assert!(output.contains("3 for £1.98 (toothbrush)"));
        assert!(output.contains("Subtotal: £2.97"));
        assert!(output.contains("Total:    £1.98"));
        assert!(output.contains("Savings:"));

        Ok(())
    }

    #[test]
    fn weighed_quantities_render_with_three_decimals() -> TestResult {
        let mut receipt = Receipt::new(GBP);

        receipt.add_item(
            apples(),
            Decimal::new(5, 1),
            Money::from_minor(199, GBP),
            Money::from_minor(100, GBP),
        );

        let mut out = Vec::new();
        receipt.write_to(&mut out)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("0.500"));

        Ok(())
    }
}
