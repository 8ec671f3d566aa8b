use super::ui;
use crate::core::PriceCatalog;
use comfy_table::Cell;

/// Renders the catalog as a table, keeping codes that contain `filter`
/// (case-insensitive).
pub fn display_as_table(catalog: &PriceCatalog, filter: Option<&str>) -> Option<String> {
    let needle = filter.map(str::to_lowercase);
    let rows: Vec<_> = catalog
        .iter()
        .filter(|obs| {
            needle
                .as_deref()
                .is_none_or(|n| obs.currency.to_lowercase().contains(n))
        })
        .collect();
    if rows.is_empty() {
        return None;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Price (USD)"),
        ui::header_cell("Observed at"),
    ]);
    for obs in rows {
        table.add_row(vec![
            Cell::new(&obs.currency),
            ui::price_cell(obs.price),
            Cell::new(obs.observed_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        ]);
    }
    Some(table.to_string())
}

pub fn run(catalog: &PriceCatalog, filter: Option<&str>) {
    match display_as_table(catalog, filter) {
        Some(table) => {
            println!("{}", ui::style_text("Spot prices", ui::StyleType::Title));
            println!("{table}");
            println!(
                "{}",
                ui::style_text(
                    &format!("{} currencies available", catalog.len()),
                    ui::StyleType::Subtle
                )
            );
        }
        None => println!("No currencies match the filter."),
    }
}
