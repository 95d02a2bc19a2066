//! Prompt loop that recomputes the payout after every input change.

use super::calc::PayoutReport;
use super::{rates, ui};
use crate::core::payout::CalculationInputs;
use crate::core::rates::RateProvider;
use anyhow::{Context, Result, anyhow, bail};
use std::io::{self, Write};
use tracing::debug;

const HELP: &str = "\
Commands:
  account <amount>    Account size in USD
  profit <percent>    Profit target (0-100)
  split <percent>     Your profit split (50-100)
  currency <CODE>     Payout currency, e.g. ZAR
  rates               Show the exchange rate table
  help                Show this message
  quit                Exit
Press enter on an empty line to refresh.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Recompute,
    ShowRates,
    Help,
    Quit,
}

/// The current set of inputs, updated one command at a time.
pub struct Session {
    inputs: CalculationInputs,
}

fn parse_number(value: Option<&str>) -> Result<f64> {
    let raw = value.context("Missing value")?;
    let cleaned: String = raw.chars().filter(|c| !matches!(c, ',' | '_' | '%' | '$')).collect();
    cleaned
        .parse::<f64>()
        .map_err(|_| anyhow!("Not a number: {raw}"))
}

impl Session {
    pub fn new(inputs: CalculationInputs) -> Self {
        Self { inputs }
    }

    pub fn inputs(&self) -> &CalculationInputs {
        &self.inputs
    }

    /// Applies one command line. Inputs are only replaced when the new value
    /// is within range.
    pub fn handle(&mut self, line: &str) -> Result<Action> {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return Ok(Action::Recompute);
        };
        let value = parts.next();

        let action = match command.to_lowercase().as_str() {
            "account" | "a" => {
                self.inputs = self.inputs.with_account_size(parse_number(value)?)?;
                Action::Recompute
            }
            "profit" | "p" => {
                self.inputs = self.inputs.with_profit_percent(parse_number(value)?)?;
                Action::Recompute
            }
            "split" | "s" => {
                self.inputs = self.inputs.with_split_percent(parse_number(value)?)?;
                Action::Recompute
            }
            "currency" | "c" => {
                let code = value.context("Missing currency code")?;
                self.inputs = self.inputs.with_currency(code);
                Action::Recompute
            }
            "rates" | "r" => Action::ShowRates,
            "help" | "h" | "?" => Action::Help,
            "quit" | "exit" | "q" => Action::Quit,
            other => bail!("Unknown command: {other} (type `help` for a list)"),
        };
        debug!(inputs = ?self.inputs, ?action, "Handled command");
        Ok(action)
    }
}

async fn render(provider: &dyn RateProvider, inputs: &CalculationInputs) {
    let lookup = provider.get_rates().await;
    match inputs.compute(&lookup.table) {
        Ok((result, rate)) => {
            let report = PayoutReport {
                inputs,
                result,
                rate,
                lookup: &lookup,
            };
            println!("{}", report.display_as_table());
        }
        Err(e) => {
            println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error));
            println!("Select another currency with `currency <CODE>`.");
        }
    }
}

pub async fn run(provider: &dyn RateProvider, initial: CalculationInputs) -> Result<()> {
    let mut session = Session::new(initial);
    println!("{HELP}\n");
    render(provider, session.inputs()).await;

    let stdin = io::stdin();
    loop {
        print!("\n> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }

        match session.handle(&line) {
            Ok(Action::Recompute) => render(provider, session.inputs()).await,
            Ok(Action::ShowRates) => {
                println!("{}", rates::display_rates(&provider.get_rates().await));
            }
            Ok(Action::Help) => println!("{HELP}"),
            Ok(Action::Quit) => break,
            Err(e) => println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error)),
        }
    }
    Ok(())
}
