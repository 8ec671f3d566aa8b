//! Cross-rate conversion between two catalog currencies.

use crate::core::catalog::PriceCatalog;
use std::fmt::Display;

/// Outcome of a conversion. `Unavailable` is the normal state while a
/// currency has no usable price yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionResult {
    Converted(String),
    Unavailable,
}

impl ConversionResult {
    pub fn as_str(&self) -> &str {
        match self {
            ConversionResult::Converted(value) => value,
            ConversionResult::Unavailable => "",
        }
    }
}

impl Display for ConversionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn usable_price(catalog: &PriceCatalog, currency: &str) -> Option<f64> {
    catalog
        .price(currency)
        .filter(|price| *price != 0.0 && !price.is_nan())
}

/// Converts `amount` of `from` into `to` using the catalog's spot prices.
///
/// Equal prices return the amount untouched; otherwise the result is
/// `amount * from_price / to_price` with six decimals. The amount's sign is
/// not checked here.
pub fn convert(amount: f64, from: &str, to: &str, catalog: &PriceCatalog) -> ConversionResult {
    let (Some(from_price), Some(to_price)) =
        (usable_price(catalog, from), usable_price(catalog, to))
    else {
        return ConversionResult::Unavailable;
    };

    if from_price == to_price {
        return ConversionResult::Converted(format!("{amount}"));
    }

    let converted = amount * from_price / to_price;
    ConversionResult::Converted(format!("{converted:.6}"))
}
