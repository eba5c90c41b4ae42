// Copyright 2026 Hypermesh Foundation. All rights reserved.
// MS/AF Economic Model Calculator - Token Release

use crate::config::{Config, ReleaseMode};
use crate::types::Order;

/// Full token schedule of a fixed-quantity order: the USDC value
/// `principal * release_multiplier` converted at the issue price.
///
/// `None` for value-pegged orders (their token count depends on the price
/// path) and for unknown tiers.
pub fn scheduled_release(order: &Order, config: &Config) -> Option<f64> {
    if config.release_mode_for(order) != ReleaseMode::FixedQuantity {
        return None;
    }
    let params = config.params_for(order)?;
    let issue_price = config.initial_pool.price();
    if issue_price <= 0.0 {
        return Some(0.0);
    }
    Some((order.principal * params.release_multiplier / issue_price).max(0.0))
}

/// Tokens released to `order` for one day at `price`.
///
/// Value-pegged release is inversely proportional to price, so the loop must
/// pass the previous day's closing price. Fixed-quantity release is the
/// schedule spread evenly over the staking period, capped at the schedule.
/// Disabled staking and unknown tiers release nothing.
pub fn compute_daily_release(order: &Order, config: &Config, price: f64) -> f64 {
    if !config.staking_enabled {
        return 0.0;
    }
    let Some(params) = config.params_for(order) else {
        tracing::warn!(order_id = order.id, kind = ?order.kind, "unknown tier, releasing nothing");
        return 0.0;
    };

    match config.release_mode_for(order) {
        ReleaseMode::ValuePegged => {
            if price <= 0.0 {
                return 0.0;
            }
            (order.principal * params.release_rate / 100.0 / price).max(0.0)
        }
        ReleaseMode::FixedQuantity => {
            let total = scheduled_release(order, config).unwrap_or(0.0);
            let days = order.days_staked.max(1) as f64;
            (total / days).min(total)
        }
    }
}
