//! The host form: committed currencies, the amount field and its validation.

use crate::core::catalog::PriceCatalog;
use crate::core::convert::{ConversionResult, convert};
use std::fmt::Display;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_AMOUNT: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum FormField {
    Amount,
    FromCurrency,
    ToCurrency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    MissingSource,
    MissingTarget,
    MissingAmount,
    InvalidAmount,
    NonPositiveAmount,
}

impl Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                FieldError::MissingSource => "Select source currency.",
                FieldError::MissingTarget => "Select target currency.",
                FieldError::MissingAmount => "Please enter the amount to convert.",
                FieldError::InvalidAmount => "Invalid amount.",
                FieldError::NonPositiveAmount => "The amount must be greater than 0.",
            }
        )
    }
}

/// Rendered conversion for a valid form.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub amount: String,
    pub from: String,
    pub to: String,
    pub total: ConversionResult,
    pub unit_rate: ConversionResult,
}

impl Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} = {} {}",
            self.amount, self.from, self.total, self.to
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Values {
    amount: String,
    from_currency: String,
    to_currency: String,
}

impl Values {
    fn initial(catalog: &PriceCatalog) -> Self {
        let mut codes = catalog.codes();
        Self {
            amount: DEFAULT_AMOUNT.to_string(),
            from_currency: codes.next().unwrap_or_default().to_string(),
            to_currency: codes.next().unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Touched {
    amount: bool,
    from_currency: bool,
    to_currency: bool,
}

pub struct SwapForm {
    catalog: Arc<PriceCatalog>,
    initial: Values,
    values: Values,
    touched: Touched,
}

impl SwapForm {
    pub fn new(catalog: Arc<PriceCatalog>) -> Self {
        let initial = Values::initial(&catalog);
        Self {
            catalog,
            values: initial.clone(),
            initial,
            touched: Touched::default(),
        }
    }

    pub fn catalog(&self) -> &Arc<PriceCatalog> {
        &self.catalog
    }

    pub fn amount(&self) -> &str {
        &self.values.amount
    }

    pub fn from_currency(&self) -> &str {
        &self.values.from_currency
    }

    pub fn to_currency(&self) -> &str {
        &self.values.to_currency
    }

    /// Swaps in a new catalog. The form resets when the derived initial
    /// values change, and keeps the user's values otherwise.
    pub fn on_catalog_update(&mut self, catalog: Arc<PriceCatalog>) {
        let initial = Values::initial(&catalog);
        self.catalog = catalog;
        if initial != self.initial {
            debug!(?initial, "Initial values changed, reinitializing form");
            self.values = initial.clone();
            self.initial = initial;
            self.touched = Touched::default();
        }
    }

    pub fn set_amount(&mut self, amount: &str) {
        self.values.amount = amount.to_string();
    }

    /// Accepts `code` for a currency field only if the catalog knows it.
    pub fn change_currency(&mut self, field: FormField, code: &str) -> bool {
        if !self.catalog.contains(code) {
            debug!(?field, code, "Rejecting unknown currency");
            return false;
        }
        match field {
            FormField::FromCurrency => self.values.from_currency = code.to_string(),
            FormField::ToCurrency => self.values.to_currency = code.to_string(),
            FormField::Amount => return false,
        }
        true
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.values.from_currency, &mut self.values.to_currency);
    }

    pub fn touch(&mut self, field: FormField) {
        match field {
            FormField::Amount => self.touched.amount = true,
            FormField::FromCurrency => self.touched.from_currency = true,
            FormField::ToCurrency => self.touched.to_currency = true,
        }
    }

    pub fn is_touched(&self, field: FormField) -> bool {
        match field {
            FormField::Amount => self.touched.amount,
            FormField::FromCurrency => self.touched.from_currency,
            FormField::ToCurrency => self.touched.to_currency,
        }
    }

    pub fn error(&self, field: FormField) -> Option<FieldError> {
        match field {
            FormField::Amount => validate_amount(&self.values.amount).err(),
            FormField::FromCurrency => self
                .values
                .from_currency
                .is_empty()
                .then_some(FieldError::MissingSource),
            FormField::ToCurrency => self
                .values
                .to_currency
                .is_empty()
                .then_some(FieldError::MissingTarget),
        }
    }

    /// Errors are only shown for fields the user has left at least once.
    pub fn visible_error(&self, field: FormField) -> Option<FieldError> {
        self.error(field).filter(|_| self.is_touched(field))
    }

    pub fn is_valid(&self) -> bool {
        [
            FormField::Amount,
            FormField::FromCurrency,
            FormField::ToCurrency,
        ]
        .into_iter()
        .all(|field| self.error(field).is_none())
    }

    pub fn quote(&self) -> Option<Quote> {
        let amount = validate_amount(&self.values.amount).ok()?;
        if !self.is_valid() {
            return None;
        }
        let from = &self.values.from_currency;
        let to = &self.values.to_currency;
        Some(Quote {
            amount: self.values.amount.trim().to_string(),
            from: from.clone(),
            to: to.clone(),
            total: convert(amount, from, to, &self.catalog),
            unit_rate: convert(1.0, from, to, &self.catalog),
        })
    }
}

fn validate_amount(text: &str) -> Result<f64, FieldError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(FieldError::MissingAmount);
    }
    let amount: f64 = text.parse().map_err(|_| FieldError::InvalidAmount)?;
    if !amount.is_finite() {
        return Err(FieldError::InvalidAmount);
    }
    if amount <= 0.0 {
        return Err(FieldError::NonPositiveAmount);
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::PriceObservation;
    use chrono::{TimeZone, Utc};

    fn catalog(prices: &[(&str, f64)]) -> Arc<PriceCatalog> {
        let t = Utc.with_ymd_and_hms(2023, 8, 29, 7, 10, 40).unwrap();
        Arc::new(
            prices
                .iter()
                .map(|(c, p)| PriceObservation::new(c, t, *p))
                .collect(),
        )
    }

    #[test]
    fn test_initial_values_from_catalog() {
        let form = SwapForm::new(catalog(&[("USD", 1.0), ("ETH", 2500.0), ("ATOM", 7.0)]));
        assert_eq!(form.amount(), "1");
        assert_eq!(form.from_currency(), "ATOM");
        assert_eq!(form.to_currency(), "ETH");
        assert!(form.is_valid());

        let empty = SwapForm::new(Arc::new(PriceCatalog::default()));
        assert_eq!(empty.from_currency(), "");
        assert_eq!(empty.error(FormField::FromCurrency), Some(FieldError::MissingSource));
        assert_eq!(empty.error(FormField::ToCurrency), Some(FieldError::MissingTarget));
        assert!(empty.quote().is_none());
    }

    #[test]
    fn test_amount_validation_messages() {
        let mut form = SwapForm::new(catalog(&[("USD", 1.0), ("ETH", 2500.0)]));
        let cases = [
            ("", "Please enter the amount to convert."),
            ("abc", "Invalid amount."),
            ("inf", "Invalid amount."),
            ("0", "The amount must be greater than 0."),
            ("-3", "The amount must be greater than 0."),
        ];
        for (input, message) in cases {
            form.set_amount(input);
            assert_eq!(
                form.error(FormField::Amount).map(|e| e.to_string()).as_deref(),
                Some(message),
                "input {input:?}"
            );
            assert!(!form.is_valid());
            assert!(form.quote().is_none());
        }
        form.set_amount(" 2.5 ");
        assert!(form.is_valid());
    }

    #[test]
    fn test_errors_visible_only_after_touch() {
        let mut form = SwapForm::new(catalog(&[("USD", 1.0), ("ETH", 2500.0)]));
        form.set_amount("");
        assert!(form.visible_error(FormField::Amount).is_none());
        form.touch(FormField::Amount);
        assert_eq!(
            form.visible_error(FormField::Amount),
            Some(FieldError::MissingAmount)
        );
    }

    #[test]
    fn test_change_currency_requires_known_code() {
        let mut form = SwapForm::new(catalog(&[("USD", 1.0), ("ETH", 2500.0)]));
        assert!(form.change_currency(FormField::FromCurrency, "USD"));
        assert!(!form.change_currency(FormField::ToCurrency, "DOGE"));
        assert!(!form.change_currency(FormField::Amount, "USD"));
        assert_eq!(form.from_currency(), "USD");
        assert_eq!(form.to_currency(), "USD");
    }

    #[test]
    fn test_quote_and_swap() {
        let mut form = SwapForm::new(catalog(&[("USD", 1.0), ("ETH", 2500.0)]));
        form.set_amount("2");
        let quote = form.quote().unwrap();
        assert_eq!(quote.to_string(), "2 ETH = 5000.000000 USD");
        assert_eq!(quote.unit_rate.as_str(), "2500.000000");

        form.swap();
        assert_eq!(form.from_currency(), "USD");
        assert_eq!(form.to_currency(), "ETH");
        let quote = form.quote().unwrap();
        assert_eq!(quote.total.as_str(), "0.000800");
    }

    #[test]
    fn test_quote_with_unpriced_currency() {
        let mut form = SwapForm::new(catalog(&[("USD", 1.0), ("ZERO", 0.0)]));
        form.change_currency(FormField::FromCurrency, "ZERO");
        let quote = form.quote().unwrap();
        assert_eq!(quote.total, ConversionResult::Unavailable);
    }

    #[test]
    fn test_catalog_refresh_keeps_or_resets_values() {
        let mut form = SwapForm::new(catalog(&[("USD", 1.0), ("ETH", 2500.0), ("OSMO", 0.4)]));
        form.set_amount("10");
        form.change_currency(FormField::ToCurrency, "OSMO");
        form.touch(FormField::Amount);

        // Same leading codes, new prices: user values survive
        form.on_catalog_update(catalog(&[("USD", 1.0), ("ETH", 2600.0), ("OSMO", 0.5)]));
        assert_eq!(form.amount(), "10");
        assert_eq!(form.to_currency(), "OSMO");
        assert_eq!(form.catalog().price("ETH"), Some(2600.0));

        // A new leading code changes the initial values and resets the form
        form.on_catalog_update(catalog(&[("USD", 1.0), ("ATOM", 7.0), ("ETH", 2600.0)]));
        assert_eq!(form.amount(), "1");
        assert_eq!(form.from_currency(), "ATOM");
        assert_eq!(form.to_currency(), "ETH");
        assert!(!form.is_touched(FormField::Amount));
    }
}
