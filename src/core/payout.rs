//! Payout arithmetic: profit target, trader/firm split and currency conversion.

use crate::core::rates::RateTable;
use std::ops::RangeInclusive;
use thiserror::Error;

pub const PROFIT_PERCENT_RANGE: RangeInclusive<f64> = 0.0..=100.0;
pub const SPLIT_PERCENT_RANGE: RangeInclusive<f64> = 50.0..=100.0;

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Account size must be a non-negative number, got {0}")]
    AccountSize(f64),

    #[error("Profit target must be between 0 and 100 percent, got {0}")]
    ProfitPercent(f64),

    #[error("Profit split must be between 50 and 100 percent, got {0}")]
    SplitPercent(f64),

    #[error("Currency {code} is not available; choose one of: {available}")]
    UnknownCurrency { code: String, available: String },
}

/// Amounts derived from one set of inputs. Nothing is rounded here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculationResult {
    /// Profit at the target, in USD.
    pub total_profit: f64,
    /// Trader's share of the profit, in USD.
    pub trader_share: f64,
    /// Remainder kept by the firm, in USD.
    pub firm_share: f64,
    /// Trader's share in the selected currency.
    pub converted_amount: f64,
}

/// Computes the payout for a given rate.
///
/// Operations are applied in a fixed order so the results are reproducible
/// bit-for-bit under IEEE double precision.
pub fn compute(
    account_size: f64,
    profit_percent: f64,
    split_percent: f64,
    rate: f64,
) -> CalculationResult {
    let total_profit = account_size * profit_percent / 100.0;
    let trader_share = total_profit * split_percent / 100.0;
    let converted_amount = trader_share * rate;

    CalculationResult {
        total_profit,
        trader_share,
        firm_share: total_profit - trader_share,
        converted_amount,
    }
}

/// Range-checked inputs to the calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationInputs {
    account_size: f64,
    profit_percent: f64,
    split_percent: f64,
    currency: String,
}

impl CalculationInputs {
    pub fn new(
        account_size: f64,
        profit_percent: f64,
        split_percent: f64,
        currency: &str,
    ) -> Result<Self, InputError> {
        if !account_size.is_finite() || account_size < 0.0 {
            return Err(InputError::AccountSize(account_size));
        }
        if !PROFIT_PERCENT_RANGE.contains(&profit_percent) {
            return Err(InputError::ProfitPercent(profit_percent));
        }
        if !SPLIT_PERCENT_RANGE.contains(&split_percent) {
            return Err(InputError::SplitPercent(split_percent));
        }

        Ok(Self {
            account_size,
            profit_percent,
            split_percent,
            currency: currency.trim().to_uppercase(),
        })
    }

    pub fn account_size(&self) -> f64 {
        self.account_size
    }

    pub fn profit_percent(&self) -> f64 {
        self.profit_percent
    }

    pub fn split_percent(&self) -> f64 {
        self.split_percent
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn with_account_size(&self, account_size: f64) -> Result<Self, InputError> {
        Self::new(
            account_size,
            self.profit_percent,
            self.split_percent,
            &self.currency,
        )
    }

    pub fn with_profit_percent(&self, profit_percent: f64) -> Result<Self, InputError> {
        Self::new(
            self.account_size,
            profit_percent,
            self.split_percent,
            &self.currency,
        )
    }

    pub fn with_split_percent(&self, split_percent: f64) -> Result<Self, InputError> {
        Self::new(
            self.account_size,
            self.profit_percent,
            split_percent,
            &self.currency,
        )
    }

    pub fn with_currency(&self, currency: &str) -> Self {
        Self {
            currency: currency.trim().to_uppercase(),
            ..self.clone()
        }
    }

    /// Looks up the selected currency and computes the payout. Fails when the
    /// table does not carry the currency, so the caller can re-select.
    pub fn compute(&self, table: &RateTable) -> Result<(CalculationResult, f64), InputError> {
        let rate = table
            .rate(&self.currency)
            .ok_or_else(|| InputError::UnknownCurrency {
                code: self.currency.clone(),
                available: table.codes().collect::<Vec<_>>().join(", "),
            })?;

        Ok((
            compute(
                self.account_size,
                self.profit_percent,
                self.split_percent,
                rate,
            ),
            rate,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::fallback_table;

    #[test]
    fn test_standard_payout() {
        let result = compute(100_000.0, 10.0, 80.0, 18.50);
        assert_eq!(result.total_profit, 10_000.0);
        assert_eq!(result.trader_share, 8_000.0);
        assert_eq!(result.firm_share, 2_000.0);
        assert_eq!(result.converted_amount, 148_000.0);
    }

    #[test]
    fn test_zero_account_yields_zero() {
        let result = compute(0.0, 50.0, 100.0, 1.0);
        assert_eq!(result.total_profit, 0.0);
        assert_eq!(result.trader_share, 0.0);
        assert_eq!(result.firm_share, 0.0);
        assert_eq!(result.converted_amount, 0.0);

        let result = compute(25_000.0, 0.0, 80.0, 18.5);
        assert_eq!(result.converted_amount, 0.0);
    }

    #[test]
    fn test_zero_rate_zeroes_conversion_only() {
        let result = compute(50_000.0, 8.0, 90.0, 0.0);
        assert_eq!(result.trader_share, 3_600.0);
        assert_eq!(result.converted_amount, 0.0);
    }

    #[test]
    fn test_formulas_match_left_to_right_evaluation() {
        let samples = [
            (12_345.67, 7.5, 85.0, 0.9231),
            (200_000.0, 3.3, 50.0, 149.5),
            (1.0, 100.0, 100.0, 1.0),
            (98_765.4321, 12.25, 66.6, 18.4973),
        ];

        for (account, profit, split, rate) in samples {
            let result = compute(account, profit, split, rate);
            let total = account * profit / 100.0;
            let share = total * split / 100.0;
            assert_eq!(result.total_profit.to_bits(), total.to_bits());
            assert_eq!(result.trader_share.to_bits(), share.to_bits());
            assert_eq!(result.converted_amount.to_bits(), (share * rate).to_bits());
            assert!(result.trader_share <= result.total_profit);
        }
    }

    #[test]
    fn test_input_ranges() {
        assert!(CalculationInputs::new(0.0, 0.0, 50.0, "USD").is_ok());
        assert!(CalculationInputs::new(1e9, 100.0, 100.0, "USD").is_ok());

        assert_eq!(
            CalculationInputs::new(-1.0, 10.0, 80.0, "USD"),
            Err(InputError::AccountSize(-1.0))
        );
        assert!(matches!(
            CalculationInputs::new(f64::INFINITY, 10.0, 80.0, "USD"),
            Err(InputError::AccountSize(_))
        ));
        assert_eq!(
            CalculationInputs::new(1000.0, 100.5, 80.0, "USD"),
            Err(InputError::ProfitPercent(100.5))
        );
        assert_eq!(
            CalculationInputs::new(1000.0, 10.0, 49.0, "USD"),
            Err(InputError::SplitPercent(49.0))
        );
        assert!(matches!(
            CalculationInputs::new(1000.0, f64::NAN, 80.0, "USD"),
            Err(InputError::ProfitPercent(_))
        ));
    }

    #[test]
    fn test_inputs_compute_with_table() {
        let inputs = CalculationInputs::new(100_000.0, 10.0, 80.0, "zar").unwrap();
        assert_eq!(inputs.currency(), "ZAR");

        let (result, rate) = inputs.compute(&fallback_table()).unwrap();
        assert_eq!(rate, 18.50);
        assert_eq!(result.converted_amount, 148_000.0);
    }

    #[test]
    fn test_unknown_currency_asks_for_reselection() {
        let inputs = CalculationInputs::new(1000.0, 10.0, 80.0, "INR").unwrap();
        let err = inputs.compute(&fallback_table()).unwrap_err();
        match &err {
            InputError::UnknownCurrency { code, available } => {
                assert_eq!(code, "INR");
                assert!(available.contains("USD"));
                assert!(available.contains("ZAR"));
            }
            other => panic!("Unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("Currency INR is not available"));
    }

    #[test]
    fn test_with_setters_revalidate() {
        let inputs = CalculationInputs::new(1000.0, 10.0, 80.0, "USD").unwrap();
        assert_eq!(inputs.with_account_size(5000.0).unwrap().account_size(), 5000.0);
        assert_eq!(
            inputs.with_split_percent(120.0),
            Err(InputError::SplitPercent(120.0))
        );
        assert_eq!(inputs.with_profit_percent(5.0).unwrap().profit_percent(), 5.0);
        assert_eq!(inputs.with_currency(" eur").currency(), "EUR");
    }
}
