// Per-Day JSONL Time Series Recorder
// One JSON line per simulated day, flattened for spreadsheet/pandas import

use msaf_engine::DailySimulation;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct DaySnapshot {
    pub day: u32,
    pub opening_price: f64,
    pub price: f64,
    pub price_change_pct: f64,
    pub tokens_released: f64,
    pub to_secondary_market: f64,
    pub to_trading_fee: f64,
    pub to_trading_capital: f64,
    pub burn: f64,
    pub buyback: f64,
    pub selling_revenue: f64,
    pub user_profit: f64,
    pub platform_profit: f64,
    pub broker_profit: f64,
    pub broker_commission: f64,
    pub trading_fee: f64,
    pub lp_usdc_added: f64,
    pub lp_tokens_added: f64,
    pub reserve: f64,
    pub pool_usdc: f64,
    pub pool_tokens: f64,
    pub lp_pool_size: f64,
    pub burned_cumulative: f64,
    pub buyback_cumulative: f64,
    pub active_orders: u32,
}

impl DaySnapshot {
    pub fn from_day(d: &DailySimulation) -> Self {
        let price_change_pct = if d.opening_price > 0.0 {
            (d.price / d.opening_price - 1.0) * 100.0
        } else {
            0.0
        };

        Self {
            day: d.day,
            opening_price: d.opening_price,
            price: d.price,
            price_change_pct,
            tokens_released: d.tokens_released,
            to_secondary_market: d.exit.to_secondary_market,
            to_trading_fee: d.exit.to_trading_fee,
            to_trading_capital: d.exit.to_trading_capital,
            burn: d.burn,
            buyback: d.buyback,
            selling_revenue: d.selling_revenue,
            user_profit: d.user_profit,
            platform_profit: d.platform_profit,
            broker_profit: d.broker_profit,
            broker_commission: d.broker_commission,
            trading_fee: d.trading_fee,
            lp_usdc_added: d.fund_flow.lp_usdc,
            lp_tokens_added: d.fund_flow.lp_tokens,
            reserve: d.fund_flow.reserve,
            pool_usdc: d.pool.usdc_balance,
            pool_tokens: d.pool.token_balance,
            lp_pool_size: d.lp_pool_size,
            burned_cumulative: d.pool.total_burned,
            buyback_cumulative: d.pool.total_buyback,
            active_orders: d.active_orders,
        }
    }
}

/// Accumulates snapshots and writes JSONL
pub struct TimeSeriesRecorder {
    snapshots: Vec<DaySnapshot>,
}

impl TimeSeriesRecorder {
    pub fn from_days(days: &[DailySimulation]) -> Self {
        Self { snapshots: days.iter().map(DaySnapshot::from_day).collect() }
    }

    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        file.flush()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
}
