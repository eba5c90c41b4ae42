// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Trading profit distribution -- splitting a day's trading result among the
//! user, the platform and the broker network.
//!
//! No value creation occurs here. Gross profit is `capital * profit_rate`; the
//! trading fee is a percent of gross profit; what remains is floored at zero
//! and split user-first, with the remainder halved between platform and
//! broker. Fund flows (LP, buyback, reserve) are ratios of the traded capital,
//! not of profit.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::FundFlowRatios;

/// Platform share of the non-user net profit. The broker takes the rest.
const PLATFORM_SHARE: Decimal = dec!(0.5);
const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Full breakdown of one trading result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitBreakdown {
    pub gross_profit: Decimal,
    pub fee: Decimal,
    pub net_profit: Decimal,
    pub user_profit: Decimal,
    pub platform_profit: Decimal,
    pub broker_profit: Decimal,
    pub flows: CapitalFlows,
}

/// Fund-flow allocation of traded capital.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapitalFlows {
    pub lp_usdc: Decimal,
    pub lp_token: Decimal,
    pub buyback: Decimal,
    pub reserve: Decimal,
}

/// Fund-flow ratios in Decimal, each a percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRatios {
    pub lp_usdc: Decimal,
    pub lp_token: Decimal,
    pub buyback: Decimal,
    pub reserve: Decimal,
}

impl FlowRatios {
    pub fn from_config(ratios: &FundFlowRatios) -> Self {
        use crate::adapter::to_decimal;
        Self {
            lp_usdc: to_decimal(ratios.lp_usdc),
            lp_token: to_decimal(ratios.lp_token),
            buyback: to_decimal(ratios.buyback),
            reserve: to_decimal(ratios.reserve),
        }
    }

    /// Allocate `amount` across the four flows.
    pub fn allocate(&self, amount: Decimal) -> CapitalFlows {
        CapitalFlows {
            lp_usdc: percent_of(amount, self.lp_usdc),
            lp_token: percent_of(amount, self.lp_token),
            buyback: percent_of(amount, self.buyback),
            reserve: percent_of(amount, self.reserve),
        }
    }
}

// ---------------------------------------------------------------------------
// Checked arithmetic
// ---------------------------------------------------------------------------

/// `a * b`, or zero when the product does not fit a Decimal.
fn mul(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b).unwrap_or(Decimal::ZERO)
}

/// `percent`% of `amount`, or zero on overflow.
fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    percent
        .checked_div(HUNDRED)
        .map_or(Decimal::ZERO, |fraction| mul(amount, fraction))
}

// ---------------------------------------------------------------------------
// Splitter
// ---------------------------------------------------------------------------

/// Compute the profit split for trading `capital`.
///
/// `profit_rate` is a fraction, `fee_rate` and `user_share` are percents.
/// A fee above 100% of gross profit is absorbed: net profit never goes
/// negative. A product too large for a Decimal counts as zero.
pub fn split_trading_profit(
    capital: Decimal,
    profit_rate: Decimal,
    fee_rate: Decimal,
    user_share: Decimal,
    ratios: &FlowRatios,
) -> ProfitBreakdown {
    let capital = capital.max(Decimal::ZERO);
    let gross_profit = mul(capital, profit_rate);
    let fee = percent_of(gross_profit, fee_rate);
    let net_profit = (gross_profit - fee).max(Decimal::ZERO);

    let user_profit = percent_of(net_profit, user_share);
    let remainder = net_profit - user_profit;
    let platform_profit = mul(remainder, PLATFORM_SHARE);
    let broker_profit = remainder - platform_profit;

    ProfitBreakdown {
        gross_profit,
        fee,
        net_profit,
        user_profit,
        platform_profit,
        broker_profit,
        flows: ratios.allocate(capital),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
