// Copyright 2026 Hypermesh Foundation. All rights reserved.
// MS/AF Economic Model Calculator - Type Definitions

use serde::{Deserialize, Serialize};

use crate::config::ExitPercents;
use crate::pool::Pool;

// ─── Order Kind ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OrderKind {
    /// Staked into a named package tier.
    Package { tier: String },
    /// Staked for a fixed duration tier.
    Days { duration_days: u32 },
}

// ─── Order ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: u64,
    pub principal: f64,
    pub days_staked: u32,
    /// Day offset at which the order was placed. The order is active on days
    /// `start_day + 1 ..= start_day + days_staked`.
    #[serde(default)]
    pub start_day: u32,
    #[serde(flatten)]
    pub kind: OrderKind,
    /// Per-order exit split; `None` uses the package defaults.
    #[serde(default)]
    pub exit_override: Option<ExitPercents>,
    /// Level of the referring broker, if any.
    #[serde(default)]
    pub broker_level: Option<u8>,
}

impl Order {
    pub fn package(id: u64, tier: &str, principal: f64, days_staked: u32, start_day: u32) -> Self {
        Self {
            id,
            principal,
            days_staked,
            start_day,
            kind: OrderKind::Package { tier: tier.to_string() },
            exit_override: None,
            broker_level: None,
        }
    }

    pub fn days(id: u64, duration_days: u32, principal: f64, start_day: u32) -> Self {
        Self {
            id,
            principal,
            days_staked: duration_days,
            start_day,
            kind: OrderKind::Days { duration_days },
            exit_override: None,
            broker_level: None,
        }
    }

    pub fn with_exit_override(mut self, exit: ExitPercents) -> Self {
        self.exit_override = Some(exit);
        self
    }

    pub fn with_broker_level(mut self, level: u8) -> Self {
        self.broker_level = Some(level);
        self
    }

    /// Order-local day number for simulation day `day`, or `None` when the
    /// order is not active on that day.
    pub fn order_day(&self, day: u32) -> Option<u32> {
        let local = day.checked_sub(self.start_day)?;
        if local >= 1 && local <= self.days_staked {
            Some(local)
        } else {
            None
        }
    }
}

// ─── Exit Breakdown ──────────────────────────────────────────────────────────

/// Day totals of where released tokens went.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ExitBreakdown {
    /// Withdrawn tokens sold into the pool after burn.
    pub to_secondary_market: f64,
    /// Tokens kept in-system to cover trading fees.
    pub to_trading_fee: f64,
    /// Tokens converted into trading capital.
    pub to_trading_capital: f64,
    pub to_trading_capital_usdc: f64,
}

// ─── Fund Flow Breakdown ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct FundFlowBreakdown {
    pub lp_usdc: f64,
    /// LP token contribution valued in USDC.
    pub lp_token_usdc: f64,
    /// LP token contribution converted at the opening price.
    pub lp_tokens: f64,
    pub reserve: f64,
}

// ─── DailySimulation ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailySimulation {
    pub day: u32,
    pub tokens_released: f64,
    /// Previous day's closing price; all of today's valuations use it.
    pub opening_price: f64,
    /// Closing price after today's pool step.
    pub price: f64,
    pub user_profit: f64,
    pub platform_profit: f64,
    pub broker_profit: f64,
    #[serde(default)]
    pub broker_commission: f64,
    pub trading_fee: f64,
    /// USDC value of today's secondary-market exits at the opening price.
    pub selling_revenue: f64,
    pub lp_pool_size: f64,
    pub pool: Pool,
    pub buyback: f64,
    pub burn: f64,
    pub exit: ExitBreakdown,
    pub fund_flow: FundFlowBreakdown,
    #[serde(default)]
    pub active_orders: u32,
}

// ─── OrderDailyDetail ────────────────────────────────────────────────────────

/// One order's ledger entry for one active day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDailyDetail {
    pub order_id: u64,
    pub day: u32,
    pub order_day: u32,
    pub price: f64,
    pub released_tokens: f64,
    pub released_value_usdc: f64,
    pub principal_portion: f64,
    pub interest_portion: f64,
    pub cumulative_released: f64,
    pub withdrawn_tokens: f64,
    /// Burned share of today's withdrawal, valued in USDC.
    pub withdrawal_fee_usdc: f64,
    pub cumulative_withdrawn: f64,
    /// Kept tokens still held in-system.
    pub held_tokens: f64,
    pub trading_capital_from_held: f64,
    pub forex_income: f64,
}

// ─── OrderSummary ────────────────────────────────────────────────────────────

/// Running counters of an order at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSummary {
    pub order_id: u64,
    pub released: f64,
    pub withdrawn: f64,
    pub kept_in_system: f64,
    pub converted: f64,
    pub burned: f64,
    /// Full token schedule for fixed-quantity orders.
    pub scheduled_release: Option<f64>,
    pub forex_income: f64,
}

// ─── SimulationOutput ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationOutput {
    pub daily_simulations: Vec<DailySimulation>,
    pub order_ledger: Vec<OrderDailyDetail>,
    pub order_summaries: Vec<OrderSummary>,
}
