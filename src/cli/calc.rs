use super::ui;
use crate::core::payout::{CalculationInputs, CalculationResult};
use crate::core::rates::{BASE_CURRENCY, RateLookup, RateProvider};
use anyhow::Result;
use comfy_table::Cell;

/// Everything needed to render one payout.
pub struct PayoutReport<'a> {
    pub inputs: &'a CalculationInputs,
    pub result: CalculationResult,
    pub rate: f64,
    pub lookup: &'a RateLookup,
}

impl PayoutReport<'_> {
    /// Warnings the user should see next to the numbers.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(warning) = &self.lookup.warning {
            warnings.push(warning.clone());
        }
        if self.rate == 0.0 {
            warnings.push(format!(
                "Exchange rate for {} is 0; the converted payout is not meaningful",
                self.inputs.currency()
            ));
        }
        warnings
    }

    pub fn display_as_table(&self) -> String {
        let currency = self.inputs.currency();
        let split = self.inputs.split_percent();

        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Item"), ui::header_cell("Amount")]);
        table.add_row(vec![
            Cell::new(format!("Total Profit ({BASE_CURRENCY})")),
            ui::amount_cell(format!("${}", ui::format_amount(self.result.total_profit))),
        ]);
        table.add_row(vec![
            Cell::new(format!("Your Share ({})", ui::format_percent(split))),
            ui::amount_cell(format!("${}", ui::format_amount(self.result.trader_share))),
        ]);
        table.add_row(vec![
            Cell::new(format!("Firm Share ({})", ui::format_percent(100.0 - split))),
            ui::amount_cell(format!("${}", ui::format_amount(self.result.firm_share))),
        ]);
        table.add_row(vec![
            Cell::new(format!("Payout ({currency})")),
            ui::payout_cell(format!(
                "{} {currency}",
                ui::format_amount(self.result.converted_amount)
            )),
        ]);

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Payout Summary", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(
                &format!(
                    "Rate: 1 {BASE_CURRENCY} = {} {currency} ({})",
                    ui::format_rate(self.rate),
                    self.lookup.origin
                ),
                ui::StyleType::Subtle
            )
        ));

        for warning in self.warnings() {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(&format!("Warning: {warning}"), ui::StyleType::Warning)
            ));
        }

        output
    }
}

/// Looks up rates and renders one payout.
pub async fn run(provider: &dyn RateProvider, inputs: &CalculationInputs) -> Result<()> {
    let pb = ui::new_spinner("Fetching exchange rates...");
    let lookup = provider.get_rates().await;
    pb.finish_and_clear();

    let (result, rate) = inputs.compute(&lookup.table)?;
    let report = PayoutReport {
        inputs,
        result,
        rate,
        lookup: &lookup,
    };
    println!("{}", report.display_as_table());
    Ok(())
}
