// Copyright 2026 Hypermesh Foundation. All rights reserved.
// MS/AF Economic Model Calculator

pub mod types;
pub mod config;
pub mod release;
pub mod exit;
pub mod profit;
pub mod adapter;
pub mod pool;
pub mod broker;
pub mod ledger;
pub mod conservation;
pub mod simulation;
pub mod clmm;

#[cfg(not(target_arch = "wasm32"))]
pub mod price_path;

pub use types::*;
pub use config::{Config, ConfigError, ConfigStore, ExitPercents, PackageParams, ReleaseMode};
pub use pool::{step_pool, DayFlows, Pool};
pub use release::compute_daily_release;
pub use exit::split_exit_distribution;
pub use adapter::compute_trading_profit;
pub use simulation::{run_simulation, run_simulation_with_details, step_day};
pub use clmm::{ClmmError, ClmmParams, ClmmPosition};

use wasm_bindgen::prelude::*;

// ─── Calculator ──────────────────────────────────────────────────────────────

/// Front-end state store: the validated config, the ordered order book and
/// the pool. Every run hands copies of them to the pure engine.
#[wasm_bindgen]
pub struct Calculator {
    store: ConfigStore,
    orders: Vec<Order>,
    pool: Pool,
    next_order_id: u64,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl Calculator {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let store = ConfigStore::default();
        let pool = Pool::from_config(store.get());
        Self { store, orders: Vec::new(), pool, next_order_id: 1 }
    }

    pub fn get_config(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.store.get()).unwrap_or(JsValue::NULL)
    }

    /// Replace the config. Rejected whole on a schema error.
    pub fn set_config(&mut self, value: JsValue) -> Result<(), JsValue> {
        let config: Config = serde_wasm_bindgen::from_value(value)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.set_config_core(config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// `days_staked == 0` takes the tier's staking period.
    pub fn add_package_order(&mut self, tier: &str, principal: f64, days_staked: u32, start_day: u32) -> u64 {
        let id = self.next_order_id;
        let mut order = Order::package(id, tier, principal, days_staked, start_day);
        if days_staked == 0 {
            order.days_staked = self.store.get().params_for(&order).map_or(0, |p| p.staking_days);
        }
        self.add_order(order)
    }

    pub fn add_days_order(&mut self, duration_days: u32, principal: f64, start_day: u32) -> u64 {
        let id = self.next_order_id;
        self.add_order(Order::days(id, duration_days, principal, start_day))
    }

    pub fn remove_order(&mut self, order_id: u64) -> bool {
        let before = self.orders.len();
        self.orders.retain(|o| o.id != order_id);
        self.orders.len() != before
    }

    pub fn clear_orders(&mut self) {
        self.orders.clear();
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn get_orders(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.orders).unwrap_or(JsValue::NULL)
    }

    /// Reset the pool to the configured initial reserves.
    pub fn reset_pool(&mut self) {
        self.pool = Pool::from_config(self.store.get());
    }

    pub fn run(&self, days: u32) -> JsValue {
        serde_wasm_bindgen::to_value(&self.run_core(days)).unwrap_or(JsValue::NULL)
    }

    pub fn run_with_details(&self, days: u32) -> JsValue {
        serde_wasm_bindgen::to_value(&self.run_with_details_core(days)).unwrap_or(JsValue::NULL)
    }

    /// Replay the run's closing prices against a CLMM position opened at the
    /// current pool price.
    #[allow(clippy::too_many_arguments)]
    pub fn clmm_replay(
        &self,
        days: u32,
        deposit_usdc: f64,
        lower: f64,
        upper: f64,
        daily_volume_usdc: f64,
        fee_rate: f64,
        liquidity_share: f64,
    ) -> Result<JsValue, JsValue> {
        let params = ClmmParams { daily_volume_usdc, fee_rate, liquidity_share };
        let records = self
            .clmm_replay_core(days, deposit_usdc, lower, upper, &params)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        serde_wasm_bindgen::to_value(&records).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

// ─── Native Interface ────────────────────────────────────────────────────────

impl Calculator {
    pub fn config(&self) -> &Config {
        self.store.get()
    }

    pub fn set_config_core(&mut self, config: Config) -> Result<(), ConfigError> {
        self.store.replace(config)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Append an order, assigning the next id.
    pub fn add_order(&mut self, mut order: Order) -> u64 {
        order.id = self.next_order_id;
        self.next_order_id += 1;
        let id = order.id;
        self.orders.push(order);
        id
    }

    pub fn run_core(&self, days: u32) -> Vec<DailySimulation> {
        run_simulation(&self.orders, self.store.get(), days, &self.pool)
    }

    pub fn run_with_details_core(&self, days: u32) -> SimulationOutput {
        run_simulation_with_details(&self.orders, self.store.get(), days, &self.pool)
    }

    pub fn clmm_replay_core(
        &self,
        days: u32,
        deposit_usdc: f64,
        lower: f64,
        upper: f64,
        params: &ClmmParams,
    ) -> Result<Vec<clmm::ClmmDayRecord>, ClmmError> {
        let position = ClmmPosition::open(deposit_usdc, self.pool.price, lower, upper)?;
        let prices = clmm::price_series(&self.run_core(days));
        Ok(position.replay(&prices, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_ids_are_sequential_and_removable() {
        let mut calc = Calculator::new();
        let a = calc.add_package_order("pro", 1000.0, 0, 0);
        let b = calc.add_days_order(30, 500.0, 2);
        assert_eq!((a, b), (1, 2));
        assert_eq!(calc.orders()[0].days_staked, 270);

        assert!(calc.remove_order(a));
        assert!(!calc.remove_order(a));
        assert_eq!(calc.order_count(), 1);
        // ids are never reused
        assert_eq!(calc.add_days_order(90, 1.0, 0), 3);
    }

    #[test]
    fn invalid_config_is_rejected_and_previous_kept() {
        let mut calc = Calculator::new();
        let mut bad = Config::default();
        bad.fund_flow.lp_usdc = 500.0;
        assert!(calc.set_config_core(bad).is_err());
        assert_eq!(calc.config().fund_flow.lp_usdc, 30.0);
    }

    #[test]
    fn runs_do_not_move_the_held_pool() {
        let mut calc = Calculator::new();
        calc.add_package_order("elite", 100_000.0, 0, 0);
        let before = *calc.pool();
        let out = calc.run_core(20);
        assert_eq!(out.len(), 20);
        assert_eq!(*calc.pool(), before);
    }

    #[test]
    fn reset_pool_follows_config() {
        let mut calc = Calculator::new();
        let mut config = Config::default();
        config.initial_pool.usdc = 2_000_000.0;
        calc.set_config_core(config).expect("test: valid config");
        calc.reset_pool();
        assert!((calc.pool().price - 0.2).abs() < 1e-12);
    }

    #[test]
    fn clmm_replay_covers_every_day() {
        let mut calc = Calculator::new();
        calc.add_package_order("pro", 10_000.0, 0, 0);
        let records = calc
            .clmm_replay_core(15, 1_000.0, 0.05, 0.2, &ClmmParams::default())
            .expect("test: valid range");
        assert_eq!(records.len(), 15);
        assert!(calc.clmm_replay_core(15, 1_000.0, 0.2, 0.05, &ClmmParams::default()).is_err());
    }
}
