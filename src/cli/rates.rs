use super::ui;
use crate::core::rates::{BASE_CURRENCY, RateLookup, RateProvider};
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

pub fn display_rates(lookup: &RateLookup) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Per 1 {BASE_CURRENCY}")),
    ]);
    for (code, rate) in lookup.table.iter() {
        table.add_row(vec![
            Cell::new(code),
            Cell::new(ui::format_rate(rate)).set_alignment(CellAlignment::Right),
        ]);
    }

    let mut output = format!(
        "{}\n\n",
        ui::style_text("Exchange Rates", ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\n{}",
        ui::style_text(
            &format!(
                "{} currencies, {} rates as of {}",
                lookup.table.len(),
                lookup.origin,
                lookup.table.fetched_at().format("%Y-%m-%d %H:%M UTC")
            ),
            ui::StyleType::Subtle
        )
    ));
    if let Some(warning) = &lookup.warning {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(&format!("Warning: {warning}"), ui::StyleType::Warning)
        ));
    }
    output
}

pub async fn run(provider: &dyn RateProvider) -> Result<()> {
    let pb = ui::new_spinner("Fetching exchange rates...");
    let lookup = provider.get_rates().await;
    pb.finish_and_clear();

    println!("{}", display_rates(&lookup));
    Ok(())
}
