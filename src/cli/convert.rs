use super::ui;
use crate::core::{ConversionResult, PriceCatalog};
use crate::core::form::{FormField, Quote, SwapForm};
use anyhow::{Result, bail};
use std::sync::Arc;

/// Runs `amount` through the swap form's validation and returns the quote.
pub fn quote(catalog: Arc<PriceCatalog>, amount: &str, from: &str, to: &str) -> Result<Quote> {
    let mut form = SwapForm::new(catalog);
    form.set_amount(amount);
    for (field, code) in [(FormField::FromCurrency, from), (FormField::ToCurrency, to)] {
        if !form.change_currency(field, code) {
            bail!("Unknown currency: {code}");
        }
    }
    if let Some(error) = form.error(FormField::Amount) {
        bail!("{error}");
    }
    match form.quote() {
        Some(quote) => Ok(quote),
        None => bail!("Unable to quote {amount} {from} to {to}"),
    }
}

pub fn display(quote: &Quote) -> String {
    let unit_rate = match &quote.unit_rate {
        ConversionResult::Converted(rate) => rate.as_str(),
        ConversionResult::Unavailable => "N/A",
    };
    format!(
        "{} {} = {} {}\n{}",
        ui::style_text(&quote.amount, ui::StyleType::Label),
        quote.from,
        ui::conversion_text(&quote.total),
        quote.to,
        ui::style_text(
            &format!("1 {} = {} {}", quote.from, unit_rate, quote.to),
            ui::StyleType::Subtle
        )
    )
}

pub fn run(catalog: Arc<PriceCatalog>, amount: &str, from: &str, to: &str) -> Result<()> {
    let quote = quote(catalog, amount, from, to)?;
    println!("{}", display(&quote));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PriceObservation;
    use chrono::{TimeZone, Utc};

    fn catalog() -> Arc<PriceCatalog> {
        let t = Utc.with_ymd_and_hms(2023, 8, 29, 7, 10, 40).unwrap();
        Arc::new(
            vec![
                PriceObservation::new("USD", t, 1.0),
                PriceObservation::new("ETH", t, 2500.0),
                PriceObservation::new("LUNA", t, 0.0),
            ]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn test_quote() {
        let quote = quote(catalog(), "2", "ETH", "USD").unwrap();
        assert_eq!(quote.total.as_str(), "5000.000000");
        assert_eq!(quote.unit_rate.as_str(), "2500.000000");
    }

    #[test]
    fn test_quote_rejections() {
        let err = quote(catalog(), "2", "DOGE", "USD").unwrap_err();
        assert_eq!(err.to_string(), "Unknown currency: DOGE");

        let err = quote(catalog(), "-1", "ETH", "USD").unwrap_err();
        assert_eq!(err.to_string(), "The amount must be greater than 0.");

        let err = quote(catalog(), "two", "ETH", "USD").unwrap_err();
        assert_eq!(err.to_string(), "Invalid amount.");
    }

    #[test]
    fn test_unpriced_currency_quotes_as_unavailable() {
        let quote = quote(catalog(), "2", "LUNA", "USD").unwrap();
        assert_eq!(quote.total, ConversionResult::Unavailable);

        console::set_colors_enabled(false);
        assert_eq!(display(&quote), "2 LUNA = N/A USD\n1 LUNA = N/A USD");
    }
}
