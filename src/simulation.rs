// Copyright 2026 Hypermesh Foundation. All rights reserved.
// MS/AF Economic Model Calculator - Simulation Core

//! Day-stepped simulation engine.
//!
//! Every run is a pure function of `(orders, config, days, pool)`. The input
//! pool is copied, never mutated; per-order running counters and the token
//! accounting tracker are threaded through [`step_day`] as explicit
//! [`Ledger`] and [`ConservationLaw`] values. All of a day's
//! valuations use the opening price (the previous day's close) and the pool is
//! stepped once, at the end of the day, with the aggregated flows.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::adapter::{allocate_deposit, compute_trading_profit};
use crate::broker::commission_for;
use crate::config::{Config, ExitPercents};
use crate::conservation::{ConservationLaw, ConservationResult};
use crate::exit::split_exit_distribution;
use crate::ledger::Ledger;
use crate::pool::{step_pool, DayFlows, Pool};
use crate::release::compute_daily_release;
use crate::types::*;

// ─── Day Totals ──────────────────────────────────────────────────────────────

/// Aggregates of one day across all active orders.
#[derive(Debug, Clone, Copy, Default)]
struct DayTotals {
    released: f64,
    burn: f64,
    secondary: f64,
    kept: f64,
    converted: f64,
    converted_usdc: f64,
    selling_revenue: f64,

    user_profit: f64,
    platform_profit: f64,
    broker_profit: f64,
    broker_commission: f64,
    trading_fee: f64,

    lp_usdc: f64,
    lp_token_usdc: f64,
    reserve: f64,
    buyback: f64,

    active_orders: u32,
}

// ─── Day Outcome ─────────────────────────────────────────────────────────────

/// Everything one day step produces.
#[derive(Debug, Clone)]
pub struct DayOutcome {
    pub record: DailySimulation,
    /// Closing pool; the next day's opening pool.
    pub pool: Pool,
    pub ledger: Ledger,
    pub law: ConservationLaw,
    /// Token accounting of the day's totals.
    pub conservation: ConservationResult,
    /// Per-order entries; empty unless details were requested.
    pub details: Vec<OrderDailyDetail>,
}

// ─── Day Step ────────────────────────────────────────────────────────────────

/// Advance the model by one day.
///
/// Orders are visited in input order. An order is active when
/// `1 <= day - start_day <= days_staked`. Ledger entries are keyed by the
/// order's index in `orders`. Every order's exit split and the day's totals
/// are checked against `law`.
pub fn step_day(
    day: u32,
    orders: &[Order],
    config: &Config,
    pool: &Pool,
    mut ledger: Ledger,
    mut law: ConservationLaw,
    record_details: bool,
) -> DayOutcome {
    let opening_price = pool.price;
    let mut totals = DayTotals::default();
    let mut details = Vec::new();

    for (slot, order) in orders.iter().enumerate() {
        let Some(order_day) = order.order_day(day) else {
            continue;
        };
        totals.active_orders += 1;

        let params = config.params_for(order);

        // 1. Release, capped by what remains of a fixed schedule
        let mut released = compute_daily_release(order, config, opening_price);
        if let Some(remaining) = ledger.remaining_schedule(slot, order, config) {
            released = released.min(remaining);
        }

        // 2. Exit split
        let exit = order
            .exit_override
            .or_else(|| params.map(|p| p.exit))
            .unwrap_or_else(ExitPercents::default);
        let capital_multiplier = params.map_or(0.0, |p| p.trading_capital_multiplier);
        let split = split_exit_distribution(released, opening_price, &exit, capital_multiplier, config);
        let check = law.verify_split(released, &split);
        if !check.balanced {
            warn!(day, order_id = order.id, error = check.error, "order exit split does not balance");
        }

        totals.released += released;
        totals.burn += split.burn;
        totals.secondary += split.secondary_market;
        totals.kept += split.keep;
        totals.converted += split.convert;
        totals.converted_usdc += split.trading_capital_usdc;

        // 3. Selling revenue at the opening price
        totals.selling_revenue += split.secondary_market * opening_price;

        let state = ledger.entry(slot);
        state.apply_split(released, &split);

        // 4. Deposit allocation on the first active day
        if order_day == 1 && config.deposit_allocation_enabled {
            let deposit = allocate_deposit(order.principal, config);
            totals.lp_usdc += deposit.lp_usdc;
            totals.lp_token_usdc += deposit.lp_token;
            totals.buyback += deposit.buyback;
            totals.reserve += deposit.reserve;
        }

        // 5. Trading on principal; trading buyback is not booked
        let mut forex_income = 0.0;
        let mut trading_capital_from_held = 0.0;
        if let Some(p) = params.filter(|_| order_day > config.trading_start_delay_days) {
            let capital = order.principal * p.trading_capital_multiplier;
            let volume = capital * config.daily_trading_volume_percent / 100.0;
            let profit = compute_trading_profit(
                volume,
                p.trading_profit_rate,
                p.trading_fee_rate,
                p.user_profit_share,
                config,
            );
            totals.user_profit += profit.user_profit;
            totals.platform_profit += profit.platform_profit;
            totals.broker_profit += profit.broker_profit;
            totals.trading_fee += profit.fee;
            totals.lp_usdc += profit.lp_usdc;
            totals.lp_token_usdc += profit.lp_token;
            totals.reserve += profit.reserve;

            if let Some(level) = order.broker_level {
                totals.broker_commission +=
                    commission_for(&config.broker_levels, level, profit.broker_profit);
            }

            // Forex income on tokens held in-system
            trading_capital_from_held = state.kept * opening_price * p.trading_capital_multiplier;
            forex_income = compute_trading_profit(
                trading_capital_from_held,
                p.trading_profit_rate,
                p.trading_fee_rate,
                p.user_profit_share,
                config,
            )
            .user_profit;
            state.forex_income += forex_income;
        }

        if record_details {
            let released_value = released * opening_price;
            let principal_portion = order.principal / order.days_staked.max(1) as f64;
            details.push(OrderDailyDetail {
                order_id: order.id,
                day,
                order_day,
                price: opening_price,
                released_tokens: released,
                released_value_usdc: released_value,
                principal_portion,
                interest_portion: (released_value - principal_portion).max(0.0),
                cumulative_released: state.released,
                withdrawn_tokens: split.withdraw,
                withdrawal_fee_usdc: split.burn * opening_price,
                cumulative_withdrawn: state.withdrawn,
                held_tokens: state.kept,
                trading_capital_from_held,
                forex_income,
            });
        }
    }

    // 6. Pool step
    let lp_tokens = if opening_price > 0.0 {
        totals.lp_token_usdc / opening_price
    } else {
        0.0
    };
    let flows = DayFlows {
        usdc_added: totals.lp_usdc,
        token_added: lp_tokens,
        tokens_sold: totals.secondary,
        tokens_burned: totals.burn,
        buyback_usdc: totals.buyback,
    };
    let next_pool = step_pool(pool, &flows);

    debug!(
        day,
        active = totals.active_orders,
        released = totals.released,
        opening_price,
        closing_price = next_pool.price,
        "day stepped"
    );

    // 7. Record
    let record = DailySimulation {
        day,
        tokens_released: totals.released,
        opening_price,
        price: next_pool.price,
        user_profit: totals.user_profit,
        platform_profit: totals.platform_profit,
        broker_profit: totals.broker_profit,
        broker_commission: totals.broker_commission,
        trading_fee: totals.trading_fee,
        selling_revenue: totals.selling_revenue,
        lp_pool_size: next_pool.lp_tokens,
        pool: next_pool,
        buyback: totals.buyback,
        burn: totals.burn,
        exit: ExitBreakdown {
            to_secondary_market: totals.secondary,
            to_trading_fee: totals.kept,
            to_trading_capital: totals.converted,
            to_trading_capital_usdc: totals.converted_usdc,
        },
        fund_flow: FundFlowBreakdown {
            lp_usdc: totals.lp_usdc,
            lp_token_usdc: totals.lp_token_usdc,
            lp_tokens,
            reserve: totals.reserve,
        },
        active_orders: totals.active_orders,
    };

    let conservation = check_day(&mut law, &record);

    DayOutcome { record, pool: next_pool, ledger, law, conservation, details }
}

// ─── Conservation ────────────────────────────────────────────────────────────

/// Token accounting of a finished day.
fn check_day(law: &mut ConservationLaw, record: &DailySimulation) -> ConservationResult {
    let result = law.verify_day(
        record.tokens_released,
        record.exit.to_secondary_market,
        record.burn,
        record.exit.to_trading_fee,
        record.exit.to_trading_capital,
    );
    if !result.balanced {
        warn!(
            day = record.day,
            error = result.error,
            cumulative = law.cumulative_error,
            "token split does not balance"
        );
    }
    result
}

// ─── Runs ────────────────────────────────────────────────────────────────────

fn run(orders: &[Order], config: &Config, days: u32, pool: &Pool, record_details: bool) -> SimulationOutput {
    info!(orders = orders.len(), days, opening_price = pool.price, "simulation started");

    let mut ids = BTreeSet::new();
    let shared_ids = orders.iter().filter(|o| !ids.insert(o.id)).count();
    if shared_ids > 0 {
        warn!(shared_ids, "order ids repeat; ledger entries are kept per position");
    }

    let mut current = *pool;
    let mut ledger = Ledger::new();
    let mut law = ConservationLaw::default();
    let mut unbalanced_days = 0u32;
    let mut daily_simulations = Vec::with_capacity(days as usize);
    let mut order_ledger = Vec::new();

    for day in 1..=days {
        let outcome = step_day(day, orders, config, &current, ledger, law, record_details);
        if !outcome.conservation.balanced {
            unbalanced_days += 1;
        }

        current = outcome.pool;
        ledger = outcome.ledger;
        law = outcome.law;
        order_ledger.extend(outcome.details);
        daily_simulations.push(outcome.record);
    }

    info!(
        days,
        closing_price = current.price,
        total_burned = current.total_burned,
        total_buyback = current.total_buyback,
        checks = law.checks,
        unbalanced_days,
        balanced = law.is_balanced(),
        "simulation finished"
    );

    SimulationOutput {
        daily_simulations,
        order_ledger,
        order_summaries: ledger.summaries(orders, config),
    }
}

/// Run `days` days and return one record per day.
pub fn run_simulation(orders: &[Order], config: &Config, days: u32, pool: &Pool) -> Vec<DailySimulation> {
    run(orders, config, days, pool, false).daily_simulations
}

/// Like [`run_simulation`], plus the per-order daily ledger and end-of-run
/// order summaries.
pub fn run_simulation_with_details(
    orders: &[Order],
    config: &Config,
    days: u32,
    pool: &Pool,
) -> SimulationOutput {
    run(orders, config, days, pool, true)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    fn quiet_config() -> Config {
        let mut config = Config::default();
        config.deposit_allocation_enabled = false;
        config
    }

    #[test]
    fn zero_orders_emit_days_identical_records() {
        let config = Config::default();
        let pool = Pool::from_config(&config);
        let out = run_simulation(&[], &config, 30, &pool);
        assert_eq!(out.len(), 30);
        for (i, rec) in out.iter().enumerate() {
            assert_eq!(rec.day, i as u32 + 1);
            assert_eq!(rec.pool, pool);
            assert_eq!(rec.price, pool.price);
            assert_eq!(rec.tokens_released, 0.0);
            assert_eq!(rec.active_orders, 0);
        }
    }

    #[test]
    fn first_day_release_uses_opening_price() {
        let config = quiet_config();
        let pool = Pool::from_config(&config);
        let orders = [Order::package(1, "pro", 1000.0, 270, 0)];
        let out = run_simulation(&orders, &config, 1, &pool);
        assert!(approx(out[0].tokens_released, 70.0, 1e-9));
        assert_eq!(out[0].opening_price, pool.price);
    }

    #[test]
    fn order_waits_for_its_start_day() {
        let config = quiet_config();
        let pool = Pool::from_config(&config);
        let orders = [Order::package(1, "starter", 1000.0, 2, 3)];
        let out = run_simulation(&orders, &config, 6, &pool);
        let active: Vec<u32> = out.iter().map(|r| r.active_orders).collect();
        assert_eq!(active, vec![0, 0, 0, 1, 1, 0]);
    }

    #[test]
    fn input_pool_is_not_mutated() {
        let config = Config::default();
        let pool = Pool::from_config(&config);
        let before = pool;
        let orders = [Order::package(1, "elite", 50_000.0, 360, 0)];
        let _ = run_simulation(&orders, &config, 10, &pool);
        assert_eq!(pool, before);
    }

    #[test]
    fn deposit_allocation_books_buyback_once() {
        let config = Config::default();
        let pool = Pool::from_config(&config);
        let orders = [Order::package(1, "starter", 1000.0, 180, 0)];
        let out = run_simulation(&orders, &config, 3, &pool);
        assert!(approx(out[0].buyback, 200.0, 1e-9));
        assert_eq!(out[1].buyback, 0.0);
        assert!(approx(out[2].pool.total_buyback, 200.0, 1e-9));
    }

    #[test]
    fn trading_buyback_is_not_booked() {
        let config = quiet_config();
        let pool = Pool::from_config(&config);
        let orders = [Order::package(1, "pro", 10_000.0, 270, 0)];
        let out = run_simulation(&orders, &config, 5, &pool);
        assert!(out.iter().all(|r| r.buyback == 0.0));
        assert!(out.iter().all(|r| r.user_profit > 0.0));
    }

    #[test]
    fn trading_delay_postpones_profit() {
        let mut config = quiet_config();
        config.trading_start_delay_days = 2;
        let pool = Pool::from_config(&config);
        let orders = [Order::package(1, "pro", 10_000.0, 270, 0)];
        let out = run_simulation(&orders, &config, 4, &pool);
        assert_eq!(out[0].user_profit, 0.0);
        assert_eq!(out[1].user_profit, 0.0);
        assert!(out[2].user_profit > 0.0);
    }

    #[test]
    fn broker_commission_follows_level() {
        let config = quiet_config();
        let pool = Pool::from_config(&config);
        let orders = [Order::package(1, "pro", 10_000.0, 270, 0).with_broker_level(2)];
        let out = run_simulation(&orders, &config, 1, &pool);
        assert!(approx(out[0].broker_commission, out[0].broker_profit * 0.2, 1e-9));
    }

    #[test]
    fn fixed_schedule_is_never_exceeded() {
        let config = Config::default();
        let pool = Pool::from_config(&config);
        let orders = [Order::days(1, 30, 1000.0, 0)];
        let out = run_simulation_with_details(&orders, &config, 40, &pool);
        let summary = &out.order_summaries[0];
        let schedule = summary.scheduled_release.unwrap_or(0.0);
        assert!(summary.released <= schedule + 1e-6);
        assert!(approx(summary.released, schedule, 1e-6));
        assert_eq!(out.order_ledger.len(), 30);
    }

    #[test]
    fn ledger_sums_match_daily_release() {
        let config = Config::default();
        let pool = Pool::from_config(&config);
        let orders = [
            Order::package(1, "pro", 1000.0, 270, 0),
            Order::days(2, 90, 5000.0, 2),
        ];
        let out = run_simulation_with_details(&orders, &config, 10, &pool);
        for rec in &out.daily_simulations {
            let sum: f64 = out
                .order_ledger
                .iter()
                .filter(|d| d.day == rec.day)
                .map(|d| d.released_tokens)
                .sum();
            assert!(approx(sum, rec.tokens_released, 1e-9));
        }
    }

    #[test]
    fn step_day_threads_ledger() {
        let config = quiet_config();
        let pool = Pool::from_config(&config);
        let orders = [Order::package(7, "pro", 1000.0, 270, 0)];
        let first = step_day(1, &orders, &config, &pool, Ledger::new(), ConservationLaw::default(), true);
        let second = step_day(2, &orders, &config, &first.pool, first.ledger, first.law, true);
        assert!(approx(second.ledger.get(0).released, first.record.tokens_released + second.record.tokens_released, 1e-9));
        assert!(approx(second.details[0].cumulative_released, second.ledger.get(0).released, 1e-9));
    }

    #[test]
    fn step_day_checks_every_split_and_the_day() {
        let config = Config::default();
        let pool = Pool::from_config(&config);
        let orders = [
            Order::package(1, "pro", 1000.0, 270, 0),
            Order::days(2, 30, 500.0, 0),
            Order::package(3, "starter", 800.0, 180, 5),
        ];
        let out = step_day(1, &orders, &config, &pool, Ledger::new(), ConservationLaw::default(), false);
        // two active splits plus the day total
        assert_eq!(out.law.checks, 3);
        assert!(out.conservation.balanced);
        assert!(out.law.is_balanced());

        let next = step_day(2, &orders, &config, &out.pool, out.ledger, out.law, false);
        assert_eq!(next.law.checks, 6);
    }

    #[test]
    fn orders_sharing_an_id_release_independently() {
        let config = Config::default();
        let pool = Pool::from_config(&config);
        let shared = [Order::days(0, 30, 1000.0, 0), Order::days(0, 30, 1000.0, 0)];
        let distinct = [Order::days(0, 30, 1000.0, 0), Order::days(1, 30, 1000.0, 0)];

        let a = run_simulation_with_details(&shared, &config, 30, &pool);
        let b = run_simulation_with_details(&distinct, &config, 30, &pool);
        let total = |out: &SimulationOutput| out.daily_simulations.iter().map(|d| d.tokens_released).sum::<f64>();

        assert!(approx(total(&a), 22_000.0, 1e-6), "released {}", total(&a));
        assert!(approx(total(&a), total(&b), 1e-9));
        for s in &a.order_summaries {
            assert!(approx(s.released, 11_000.0, 1e-6));
        }
    }
}
