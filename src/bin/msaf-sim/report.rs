// Simulation Report Types
// Structured output for spreadsheet review and model comparison

use msaf_engine::clmm::ClmmDayRecord;
use msaf_engine::{DailySimulation, OrderDailyDetail, OrderSummary, Pool};
use serde::Serialize;

// ─── Statistics (per-series aggregation) ────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        Self {
            mean,
            std_dev: variance.sqrt(),
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }
}

// ─── Run Summary ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub days: usize,
    pub opening_price: f64,
    pub closing_price: f64,
    pub price_change_pct: f64,
    pub total_released: f64,
    pub total_to_secondary_market: f64,
    pub total_burned: f64,
    pub total_buyback: f64,
    pub total_selling_revenue: f64,
    pub total_user_profit: f64,
    pub total_platform_profit: f64,
    pub total_broker_profit: f64,
    pub total_broker_commission: f64,
    pub total_trading_fee: f64,
    pub total_reserve: f64,
    pub final_pool: Pool,
}

impl RunSummary {
    pub fn from_days(days: &[DailySimulation], opening: &Pool) -> Self {
        let sum = |f: fn(&DailySimulation) -> f64| days.iter().map(f).sum::<f64>();
        let final_pool = days.last().map_or(*opening, |d| d.pool);
        let price_change_pct = if opening.price > 0.0 {
            (final_pool.price / opening.price - 1.0) * 100.0
        } else {
            0.0
        };

        Self {
            days: days.len(),
            opening_price: opening.price,
            closing_price: final_pool.price,
            price_change_pct,
            total_released: sum(|d| d.tokens_released),
            total_to_secondary_market: sum(|d| d.exit.to_secondary_market),
            total_burned: sum(|d| d.burn),
            total_buyback: sum(|d| d.buyback),
            total_selling_revenue: sum(|d| d.selling_revenue),
            total_user_profit: sum(|d| d.user_profit),
            total_platform_profit: sum(|d| d.platform_profit),
            total_broker_profit: sum(|d| d.broker_profit),
            total_broker_commission: sum(|d| d.broker_commission),
            total_trading_fee: sum(|d| d.trading_fee),
            total_reserve: sum(|d| d.fund_flow.reserve),
            final_pool,
        }
    }
}

// ─── CLMM Summary ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ClmmReport {
    pub price_source: &'static str,
    pub deposit_usdc: f64,
    pub entry_price: f64,
    pub lower: f64,
    pub upper: f64,
    pub days_in_range: usize,
    pub final_value: f64,
    pub final_impermanent_loss: f64,
    pub total_fees: f64,
    pub net_pnl: f64,
    pub days: Vec<ClmmDayRecord>,
}

impl ClmmReport {
    pub fn new(
        price_source: &'static str,
        deposit_usdc: f64,
        entry_price: f64,
        lower: f64,
        upper: f64,
        days: Vec<ClmmDayRecord>,
    ) -> Self {
        let last = days.last();
        Self {
            price_source,
            deposit_usdc,
            entry_price,
            lower,
            upper,
            days_in_range: days.iter().filter(|d| d.in_range).count(),
            final_value: last.map_or(deposit_usdc, |d| d.position_value),
            final_impermanent_loss: last.map_or(0.0, |d| d.impermanent_loss),
            total_fees: last.map_or(0.0, |d| d.cumulative_fees),
            net_pnl: last.map_or(0.0, |d| d.net_pnl),
            days,
        }
    }
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub timestamp: String,
    pub version: &'static str,
    pub scenario: String,
    pub order_count: usize,
    pub summary: RunSummary,
    pub price: Stats,
    pub daily_release: Stats,
    pub order_summaries: Vec<OrderSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_ledger: Option<Vec<OrderDailyDetail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clmm: Option<ClmmReport>,
}
