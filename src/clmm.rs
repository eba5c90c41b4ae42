// Copyright 2026 Hypermesh Foundation. All rights reserved.
// MS/AF Economic Model Calculator - Concentrated Liquidity

//! Concentrated-liquidity (Uniswap-V3 style) position replay.
//!
//! A position is opened once with a USDC deposit at an entry price and a price
//! range `[lower, upper]`, then marked to each price of a series. Token
//! amounts follow the closed-form V3 formulas:
//!
//! - `p < lower`: all token, `x = L (1/√a − 1/√b)`
//! - `p > upper`: all USDC, `y = L (√b − √a)`
//! - inside:      `x = L (1/√p − 1/√b)`, `y = L (√p − √a)`
//!
//! Fees accrue only while the price is inside the range.

use serde::{Deserialize, Serialize};

use crate::types::DailySimulation;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClmmError {
    #[error("price range is invalid: lower {lower} must be positive and below upper {upper}")]
    InvalidRange { lower: f64, upper: f64 },

    #[error("entry price must be positive, got {0}")]
    InvalidEntryPrice(f64),

    #[error("deposit must be positive, got {0}")]
    InvalidDeposit(f64),
}

/// Pool-level assumptions for fee accrual.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClmmParams {
    /// USDC traded through the pool per day.
    pub daily_volume_usdc: f64,
    /// Swap fee as a fraction, e.g. `0.003`.
    pub fee_rate: f64,
    /// Fraction of in-range liquidity this position provides.
    pub liquidity_share: f64,
}

impl Default for ClmmParams {
    fn default() -> Self {
        Self { daily_volume_usdc: 100_000.0, fee_rate: 0.003, liquidity_share: 0.01 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClmmPosition {
    pub liquidity: f64,
    pub lower: f64,
    pub upper: f64,
    pub entry_price: f64,
    pub deposit_usdc: f64,
    /// Token amount at entry; the hold-only benchmark.
    pub entry_token: f64,
    /// USDC amount at entry.
    pub entry_usdc: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClmmDayRecord {
    pub day: u32,
    pub price: f64,
    pub token_amount: f64,
    pub usdc_amount: f64,
    pub position_value: f64,
    /// Value of the entry amounts held outside the pool.
    pub hodl_value: f64,
    /// `position_value / hodl_value - 1`; zero or negative.
    pub impermanent_loss: f64,
    pub in_range: bool,
    pub fees_earned: f64,
    pub cumulative_fees: f64,
    /// `position_value + cumulative_fees - deposit`.
    pub net_pnl: f64,
}

/// Amounts held by one unit of liquidity at `price`.
fn unit_amounts(price: f64, lower: f64, upper: f64) -> (f64, f64) {
    let sa = lower.sqrt();
    let sb = upper.sqrt();
    if price <= lower {
        (1.0 / sa - 1.0 / sb, 0.0)
    } else if price >= upper {
        (0.0, sb - sa)
    } else {
        let sp = price.sqrt();
        (1.0 / sp - 1.0 / sb, sp - sa)
    }
}

impl ClmmPosition {
    /// Size liquidity so the position is worth `deposit_usdc` at `entry_price`.
    pub fn open(deposit_usdc: f64, entry_price: f64, lower: f64, upper: f64) -> Result<Self, ClmmError> {
        if !(lower > 0.0 && upper.is_finite() && lower < upper) {
            return Err(ClmmError::InvalidRange { lower, upper });
        }
        if !(entry_price > 0.0 && entry_price.is_finite()) {
            return Err(ClmmError::InvalidEntryPrice(entry_price));
        }
        if !(deposit_usdc > 0.0 && deposit_usdc.is_finite()) {
            return Err(ClmmError::InvalidDeposit(deposit_usdc));
        }

        let (x, y) = unit_amounts(entry_price, lower, upper);
        let unit_value = x * entry_price + y;
        let liquidity = deposit_usdc / unit_value;

        Ok(Self {
            liquidity,
            lower,
            upper,
            entry_price,
            deposit_usdc,
            entry_token: x * liquidity,
            entry_usdc: y * liquidity,
        })
    }

    pub fn in_range(&self, price: f64) -> bool {
        price >= self.lower && price <= self.upper
    }

    /// `(token, usdc)` held at `price`.
    pub fn amounts(&self, price: f64) -> (f64, f64) {
        let (x, y) = unit_amounts(price, self.lower, self.upper);
        (x * self.liquidity, y * self.liquidity)
    }

    pub fn value(&self, price: f64) -> f64 {
        let (token, usdc) = self.amounts(price);
        token * price + usdc
    }

    pub fn hodl_value(&self, price: f64) -> f64 {
        self.entry_token * price + self.entry_usdc
    }

    /// Mark the position to every price in `prices`. Day numbers start at 1.
    pub fn replay(&self, prices: &[f64], params: &ClmmParams) -> Vec<ClmmDayRecord> {
        let daily_fee = params.daily_volume_usdc.max(0.0) * params.fee_rate.max(0.0) * params.liquidity_share.max(0.0);
        let mut cumulative_fees = 0.0;

        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| {
                let (token_amount, usdc_amount) = self.amounts(price);
                let position_value = token_amount * price + usdc_amount;
                let hodl_value = self.hodl_value(price);
                let in_range = self.in_range(price);
                let fees_earned = if in_range { daily_fee } else { 0.0 };
                cumulative_fees += fees_earned;

                ClmmDayRecord {
                    day: i as u32 + 1,
                    price,
                    token_amount,
                    usdc_amount,
                    position_value,
                    hodl_value,
                    impermanent_loss: if hodl_value > 0.0 { position_value / hodl_value - 1.0 } else { 0.0 },
                    in_range,
                    fees_earned,
                    cumulative_fees,
                    net_pnl: position_value + cumulative_fees - self.deposit_usdc,
                }
            })
            .collect()
    }
}

/// Closing prices of an engine run, in day order.
pub fn price_series(days: &[DailySimulation]) -> Vec<f64> {
    days.iter().map(|d| d.price).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn value_at_entry_equals_deposit() {
        let pos = ClmmPosition::open(10_000.0, 0.1, 0.05, 0.2).expect("test: valid position");
        assert!(approx(pos.value(0.1), 10_000.0, 1e-6));
        assert!(approx(pos.hodl_value(0.1), 10_000.0, 1e-6));
        assert!(pos.entry_token > 0.0 && pos.entry_usdc > 0.0);
    }

    #[test]
    fn below_range_holds_only_token() {
        let pos = ClmmPosition::open(1_000.0, 0.1, 0.05, 0.2).expect("test: valid position");
        let (token, usdc) = pos.amounts(0.01);
        assert!(token > 0.0);
        assert_eq!(usdc, 0.0);
        assert!(!pos.in_range(0.01));
    }

    #[test]
    fn above_range_holds_only_usdc() {
        let pos = ClmmPosition::open(1_000.0, 0.1, 0.05, 0.2).expect("test: valid position");
        let (token, usdc) = pos.amounts(1.0);
        assert_eq!(token, 0.0);
        assert!(usdc > 0.0);
    }

    #[test]
    fn entry_outside_range_is_single_sided() {
        let pos = ClmmPosition::open(1_000.0, 0.5, 0.05, 0.2).expect("test: valid position");
        assert_eq!(pos.entry_token, 0.0);
        assert!(approx(pos.entry_usdc, 1_000.0, 1e-9));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(matches!(ClmmPosition::open(1_000.0, 0.1, 0.2, 0.05), Err(ClmmError::InvalidRange { .. })));
        assert!(matches!(ClmmPosition::open(1_000.0, 0.1, 0.0, 0.2), Err(ClmmError::InvalidRange { .. })));
        assert_eq!(ClmmPosition::open(1_000.0, -1.0, 0.05, 0.2), Err(ClmmError::InvalidEntryPrice(-1.0)));
        assert_eq!(ClmmPosition::open(0.0, 0.1, 0.05, 0.2), Err(ClmmError::InvalidDeposit(0.0)));
    }

    #[test]
    fn impermanent_loss_is_never_positive() {
        let pos = ClmmPosition::open(1_000.0, 0.1, 0.05, 0.2).expect("test: valid position");
        let records = pos.replay(&[0.02, 0.06, 0.1, 0.15, 0.5], &ClmmParams::default());
        for r in &records {
            assert!(r.impermanent_loss <= 1e-12, "day {} il {}", r.day, r.impermanent_loss);
        }
        assert!(approx(records[2].impermanent_loss, 0.0, 1e-12));
    }

    #[test]
    fn fees_accrue_only_in_range() {
        let pos = ClmmPosition::open(1_000.0, 0.1, 0.05, 0.2).expect("test: valid position");
        let params = ClmmParams { daily_volume_usdc: 10_000.0, fee_rate: 0.003, liquidity_share: 0.1 };
        let records = pos.replay(&[0.1, 0.3, 0.1], &params);
        assert!(approx(records[0].fees_earned, 3.0, 1e-12));
        assert_eq!(records[1].fees_earned, 0.0);
        assert!(approx(records[2].cumulative_fees, 6.0, 1e-12));
        assert!(approx(records[2].net_pnl, records[2].position_value + 6.0 - 1_000.0, 1e-9));
        assert_eq!(records.iter().map(|r| r.day).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
