//! Fixtures

use std::{fs, path::PathBuf};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError},
    checkout::Teller,
    offers::Offer,
    products::{Product, ProductUnit},
};

/// Fixture parsing errors.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files.
    #[error("failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format.
    #[error("invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product key not found in the fixture set.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// Currency mismatch between fixture products.
    #[error("currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet.
    #[error("no products loaded yet; currency unknown")]
    NoCurrency,
}

/// In-memory catalog backed by a plain map, for fixtures, tests and demos.
///
/// The production catalog lives behind the [`Catalog`] trait in an external
/// price store; this implementation only exists so the engine can be exercised
/// without one.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    prices: FxHashMap<Product, Money<'static, Currency>>,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        MemoryCatalog {
            prices: FxHashMap::default(),
        }
    }

    /// Lists a product at the given unit price, replacing any existing price.
    pub fn add_product(&mut self, product: Product, unit_price: Money<'static, Currency>) {
        self.prices.insert(product, unit_price);
    }
}

impl Catalog for MemoryCatalog {
    fn unit_price(&self, product: &Product) -> Result<Money<'static, Currency>, CatalogError> {
        self.prices
            .get(product)
            .copied()
            .ok_or_else(|| CatalogError::UnknownProduct(product.name().to_string()))
    }
}

/// Wrapper for products in YAML.
#[derive(Debug, Deserialize)]
struct ProductsFixture {
    /// Map of product key -> product fixture.
    products: FxHashMap<String, ProductFixture>,
}

/// Product fixture from YAML.
#[derive(Debug, Deserialize)]
struct ProductFixture {
    /// Product name.
    name: String,

    /// Unit the product is sold in.
    unit: ProductUnit,

    /// Product price (e.g., "2.99 GBP").
    price: String,
}

/// Wrapper for offers in YAML, keyed by product key.
#[derive(Debug, Deserialize)]
struct OffersFixture {
    /// Map of product key -> offer.
    offers: FxHashMap<String, Offer>,
}

/// A fixture set: products with catalog prices, plus offers keyed by product.
///
/// Sets live under a base path as `products/<set>.yml` and `offers/<set>.yml`.
/// All products in a set must share one currency.
#[derive(Debug)]
pub struct Fixture {
    base_path: PathBuf,
    products: FxHashMap<String, Product>,
    catalog: MemoryCatalog,
    offers: Vec<(Product, Offer)>,
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Creates a new empty fixture with the default base path.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Creates a new empty fixture with a custom base path.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Fixture {
            base_path: base_path.into(),
            products: FxHashMap::default(),
            catalog: MemoryCatalog::new(),
            offers: Vec::new(),
            currency: None,
        }
    }

    /// Loads products from a YAML fixture file into the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if products
    /// disagree on currency.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for (key, product_fixture) in fixture.products {
            let (minor_units, currency) = parse_price(&product_fixture.price)?;

            if let Some(existing) = self.currency {
                if existing != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            let product = Product::new(product_fixture.name, product_fixture.unit);

            self.catalog
                .add_product(product.clone(), Money::from_minor(minor_units, currency));
            self.products.insert(key, product);
        }

        Ok(self)
    }

    /// Loads offers from a YAML fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if an offer
    /// references a product key that has not been loaded.
    pub fn load_offers(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("offers").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: OffersFixture = serde_norway::from_str(&contents)?;

        for (key, offer) in fixture.offers {
            let product = self
                .products
                .get(&key)
                .ok_or_else(|| FixtureError::ProductNotFound(key.clone()))?;

            self.offers.push((product.clone(), offer));
        }

        Ok(self)
    }

    /// Loads a complete fixture set (products and offers with the same name).
    ///
    /// # Errors
    ///
    /// Returns an error if either fixture file cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_products(name)?.load_offers(name)?;

        Ok(fixture)
    }

    /// Gets a product by its string key.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product, FixtureError> {
        self.products
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// The catalog holding every loaded product's price.
    #[must_use]
    pub fn catalog(&self) -> &MemoryCatalog {
        &self.catalog
    }

    /// The currency shared by the loaded products.
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Builds a teller over the fixture catalog with every loaded offer
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn teller(&self) -> Result<Teller<'_, MemoryCatalog>, FixtureError> {
        let currency = self.currency()?;
        let mut teller = Teller::new(&self.catalog, currency);

        for (product, offer) in &self.offers {
            teller.add_special_offer(offer.offer_type(), product.clone(), offer.argument());
        }

        Ok(teller)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a price string (e.g., "2.99 GBP") into minor units and currency.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if
/// the amount cannot be parsed as a decimal, or if the currency code is not
/// recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}

#[cfg(test)]
mod tests {
    use std::{env, path::Path};

    use testresult::TestResult;

    use crate::offers::OfferType;

    use super::*;

    #[test]
    fn supermarket_set_loads_products_offers_and_currency() -> TestResult {
        let fixture = Fixture::from_set("supermarket")?;

        assert_eq!(fixture.products.len(), 4);
        assert_eq!(fixture.offers.len(), 4);
        assert_eq!(fixture.currency()?, GBP);

        let toothbrush = fixture.product("toothbrush")?;

        assert_eq!(toothbrush.name(), "toothbrush");
        assert_eq!(toothbrush.unit(), ProductUnit::Each);
        assert_eq!(
            fixture.catalog().unit_price(toothbrush)?,
            Money::from_minor(99, GBP)
        );

        Ok(())
    }

    #[test]
    fn offers_deserialize_with_type_and_argument() -> TestResult {
        let fixture = Fixture::from_set("supermarket")?;
        let apples = fixture.product("apples")?;

        let offer = fixture
            .offers
            .iter()
            .find(|(product, _)| product == apples)
            .map(|(_, offer)| offer)
            .ok_or("expected an offer for apples")?;

        assert_eq!(offer.offer_type(), OfferType::FiveForAmount);
        assert_eq!(offer.argument(), Decimal::new(699, 2));

        Ok(())
    }

    #[test]
    fn memory_catalog_rejects_unknown_products() {
        let catalog = MemoryCatalog::new();
        let unknown = Product::new("dragonfruit", ProductUnit::Each);

        assert_eq!(
            catalog.unit_price(&unknown),
            Err(CatalogError::UnknownProduct("dragonfruit".to_string()))
        );
    }

    #[test]
    fn parse_price_accepts_amount_and_currency() -> TestResult {
        let (minor, currency) = parse_price("2.99 GBP")?;

        assert_eq!(minor, 299);
        assert_eq!(currency, GBP);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_bad_input() {
        assert!(matches!(
            parse_price("2.99"),
            Err(FixtureError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("abc GBP"),
            Err(FixtureError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("2.99 XYZ"),
            Err(FixtureError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn product_lookup_with_unknown_key_errors() {
        let fixture = Fixture::new();

        assert!(matches!(
            fixture.product("nonexistent"),
            Err(FixtureError::ProductNotFound(_))
        ));
    }

    #[test]
    fn teller_requires_loaded_products() {
        let fixture = Fixture::new();

        assert!(matches!(fixture.teller(), Err(FixtureError::NoCurrency)));
    }

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    fn scratch_dir() -> Result<PathBuf, std::time::SystemTimeError> {
        let unique = format!(
            "tally-fixtures-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)?
                .as_nanos()
        );

        Ok(env::temp_dir().join(unique))
    }

    #[test]
    fn load_products_rejects_currency_mismatch() -> TestResult {
        let base_path = scratch_dir()?;

        write_fixture(
            &base_path,
            "products",
            "usd_set",
            "products:\n  water:\n    name: water\n    unit: each\n    price: 1.00 USD\n",
        )?;

        write_fixture(
            &base_path,
            "products",
            "gbp_set",
            "products:\n  milk:\n    name: milk\n    unit: each\n    price: 1.00 GBP\n",
        )?;

        let mut fixture = Fixture::with_base_path(&base_path);

        fixture.load_products("usd_set")?;

        let result = fixture.load_products("gbp_set");

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));

        Ok(())
    }

    #[test]
    fn load_offers_rejects_unknown_product_key() -> TestResult {
        let base_path = scratch_dir()?;

        write_fixture(
            &base_path,
            "products",
            "small",
            "products:\n  milk:\n    name: milk\n    unit: each\n    price: 1.00 GBP\n",
        )?;

        write_fixture(
            &base_path,
            "offers",
            "small",
            "offers:\n  bread:\n    type: three_for_two\n    argument: 0\n",
        )?;

        let mut fixture = Fixture::with_base_path(&base_path);

        fixture.load_products("small")?;

        let result = fixture.load_offers("small");

        assert!(matches!(result, Err(FixtureError::ProductNotFound(_))));

        Ok(())
    }
}
