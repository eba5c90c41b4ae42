//! Adapter layer: converts between the simulation's f64 world and the
//! Decimal profit splitter.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::profit::{split_trading_profit, FlowRatios};

/// Convert f64 to Decimal (lossy but sufficient for simulation).
/// Non-finite or out-of-range values map to zero.
pub fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
}

/// Convert Decimal to f64.
pub fn from_decimal(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// f64 view of a trading result, as consumed by the day loop.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TradingProfit {
    pub gross_profit: f64,
    pub fee: f64,
    pub net_profit: f64,
    pub user_profit: f64,
    pub platform_profit: f64,
    pub broker_profit: f64,
    pub lp_usdc: f64,
    pub lp_token: f64,
    pub buyback: f64,
    pub reserve: f64,
}

/// f64 view of a fund-flow allocation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct FundAllocation {
    pub lp_usdc: f64,
    pub lp_token: f64,
    pub buyback: f64,
    pub reserve: f64,
}

/// Allocate a deposit across the configured fund-flow ratios.
pub fn allocate_deposit(amount: f64, config: &Config) -> FundAllocation {
    let flows = FlowRatios::from_config(&config.fund_flow).allocate(to_decimal(amount.max(0.0)));
    FundAllocation {
        lp_usdc: from_decimal(flows.lp_usdc),
        lp_token: from_decimal(flows.lp_token),
        buyback: from_decimal(flows.buyback),
        reserve: from_decimal(flows.reserve),
    }
}

/// Trading profit for `capital` using the config's fund-flow ratios.
///
/// `profit_rate` is a fraction; `fee_rate` (of gross profit) and
/// `user_share_percent` are percents. Net profit is floored at zero.
pub fn compute_trading_profit(
    capital: f64,
    profit_rate: f64,
    fee_rate: f64,
    user_share_percent: f64,
    config: &Config,
) -> TradingProfit {
    let ratios = FlowRatios::from_config(&config.fund_flow);
    let b = split_trading_profit(
        to_decimal(capital),
        to_decimal(profit_rate),
        to_decimal(fee_rate),
        to_decimal(user_share_percent),
        &ratios,
    );
    TradingProfit {
        gross_profit: from_decimal(b.gross_profit),
        fee: from_decimal(b.fee),
        net_profit: from_decimal(b.net_profit),
        user_profit: from_decimal(b.user_profit),
        platform_profit: from_decimal(b.platform_profit),
        broker_profit: from_decimal(b.broker_profit),
        lp_usdc: from_decimal(b.flows.lp_usdc),
        lp_token: from_decimal(b.flows.lp_token),
        buyback: from_decimal(b.flows.buyback),
        reserve: from_decimal(b.flows.reserve),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn reference_trade_in_f64() {
        let p = compute_trading_profit(10_000.0, 0.05, 5.0, 60.0, &Config::default());
        assert!(approx(p.gross_profit, 500.0));
        assert!(approx(p.fee, 25.0));
        assert!(approx(p.net_profit, 475.0));
        assert!(approx(p.user_profit, 285.0));
        assert!(approx(p.platform_profit, 95.0));
        assert!(approx(p.broker_profit, 95.0));
        assert!(approx(p.lp_usdc, 3_000.0));
        assert!(approx(p.reserve, 2_000.0));
    }

    #[test]
    fn deposit_allocation_follows_ratios() {
        let a = allocate_deposit(1_000.0, &Config::default());
        assert!(approx(a.lp_usdc, 300.0));
        assert!(approx(a.lp_token, 300.0));
        assert!(approx(a.buyback, 200.0));
        assert!(approx(a.reserve, 200.0));
        assert_eq!(allocate_deposit(-5.0, &Config::default()), FundAllocation::default());
    }

    #[test]
    fn non_finite_input_maps_to_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
        let p = compute_trading_profit(f64::NAN, 0.05, 5.0, 60.0, &Config::default());
        assert_eq!(p, TradingProfit::default());
    }
}
