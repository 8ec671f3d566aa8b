use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::core::ConversionResult;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Value,
    Focused,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Value => style(text).green().bold(),
        StyleType::Focused => style(text).cyan().bold().reverse(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right-aligned price cell; zero prices are flagged since they cannot convert.
pub fn price_cell(price: f64) -> Cell {
    let cell = Cell::new(format!("{price}")).set_alignment(CellAlignment::Right);
    if price == 0.0 {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

/// Renders a conversion result, showing "N/A" when prices are missing.
pub fn conversion_text(result: &ConversionResult) -> String {
    match result {
        ConversionResult::Converted(value) => style_text(value, StyleType::Value),
        ConversionResult::Unavailable => style_text("N/A", StyleType::Error),
    }
}

/// Creates a spinner shown while prices are being fetched.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
