// Copyright 2026 Hypermesh Foundation. All rights reserved.
// MS/AF Economic Model Calculator - Configuration

//! Process-wide model configuration.
//!
//! A [`Config`] is immutable for the duration of a simulation run. Every section
//! carries `#[serde(default)]` so partial JSON documents load on top of the
//! canonical parameter set. Validation happens only at the store boundary
//! ([`ConfigStore::replace`]); the engine itself assumes well-typed input and
//! falls back to zero contributions when a lookup misses.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::broker::{default_broker_levels, BrokerLevel};
use crate::types::{Order, OrderKind};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised when a configuration document is loaded or validated.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be within 0..=100, got {value}")]
    PercentOutOfRange { field: String, value: f64 },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: String, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: String, value: f64 },

    #[error("package `{0}` has a zero staking period")]
    ZeroStakingDays(String),

    #[error("no package tiers configured")]
    NoPackages,

    #[error("duplicate broker level {0}")]
    DuplicateBrokerLevel(u8),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Release mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseMode {
    /// Daily release is a USDC value (percent of principal) converted at the
    /// current pool price.
    #[default]
    ValuePegged,
    /// A token schedule fixed at the issue price, spread evenly over the
    /// staking period.
    FixedQuantity,
}

// ---------------------------------------------------------------------------
// Exit percentages
// ---------------------------------------------------------------------------

/// How released tokens leave the order: withdrawn to market, kept in-system
/// (pays trading fees), or converted into trading capital.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ExitPercents {
    pub withdraw: f64,
    pub keep: f64,
    pub convert: f64,
}

impl Default for ExitPercents {
    fn default() -> Self {
        Self { withdraw: 40.0, keep: 30.0, convert: 30.0 }
    }
}

impl ExitPercents {
    pub fn new(withdraw: f64, keep: f64, convert: f64) -> Self {
        Self { withdraw, keep, convert }
    }

    /// Rescale so the three shares sum to exactly 100.
    ///
    /// Negative entries count as zero. A zero total keeps everything in-system.
    pub fn normalized(&self) -> Self {
        let w = self.withdraw.max(0.0);
        let k = self.keep.max(0.0);
        let c = self.convert.max(0.0);
        let sum = w + k + c;
        if sum <= 0.0 || !sum.is_finite() {
            return Self { withdraw: 0.0, keep: 100.0, convert: 0.0 };
        }
        Self {
            withdraw: w / sum * 100.0,
            keep: k / sum * 100.0,
            convert: c / sum * 100.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Package parameters
// ---------------------------------------------------------------------------

/// Per-tier parameters shared by package tiers and duration tiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageParams {
    /// Percent of principal released per day, in USDC value (value-pegged mode).
    pub release_rate: f64,
    /// Total USDC value released over the staking period as a multiple of
    /// principal (fixed-quantity mode).
    pub release_multiplier: f64,
    pub trading_capital_multiplier: f64,
    pub staking_days: u32,
    /// Percent of gross trading profit taken as fee.
    pub trading_fee_rate: f64,
    /// Daily profit as a fraction of traded volume.
    pub trading_profit_rate: f64,
    /// Percent of net profit paid to the user.
    pub user_profit_share: f64,
    #[serde(default)]
    pub exit: ExitPercents,
}

impl PackageParams {
    fn tier(
        release_rate: f64,
        release_multiplier: f64,
        trading_capital_multiplier: f64,
        staking_days: u32,
        user_profit_share: f64,
    ) -> Self {
        Self {
            release_rate,
            release_multiplier,
            trading_capital_multiplier,
            staking_days,
            trading_fee_rate: 5.0,
            trading_profit_rate: 0.002,
            user_profit_share,
            exit: ExitPercents::default(),
        }
    }
}

fn default_packages() -> BTreeMap<String, PackageParams> {
    let mut packages = BTreeMap::new();
    packages.insert("starter".to_string(), PackageParams::tier(0.5, 1.5, 1.0, 180, 50.0));
    packages.insert("growth".to_string(), PackageParams::tier(0.6, 1.8, 1.5, 180, 55.0));
    packages.insert("pro".to_string(), PackageParams::tier(0.7, 2.0, 2.0, 270, 60.0));
    packages.insert("elite".to_string(), PackageParams::tier(0.8, 2.5, 3.0, 360, 70.0));
    packages
}

fn default_duration_tiers() -> BTreeMap<u32, PackageParams> {
    let mut tiers = BTreeMap::new();
    tiers.insert(30, PackageParams::tier(0.4, 1.1, 1.0, 30, 50.0));
    tiers.insert(90, PackageParams::tier(0.5, 1.35, 1.2, 90, 55.0));
    tiers.insert(180, PackageParams::tier(0.6, 1.8, 1.5, 180, 60.0));
    tiers.insert(360, PackageParams::tier(0.7, 2.5, 2.0, 360, 65.0));
    tiers
}

// ---------------------------------------------------------------------------
// Fund flow
// ---------------------------------------------------------------------------

/// Global fund-flow ratios, each a percent of the amount being allocated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FundFlowRatios {
    pub lp_usdc: f64,
    pub lp_token: f64,
    pub buyback: f64,
    pub reserve: f64,
}

impl Default for FundFlowRatios {
    fn default() -> Self {
        Self { lp_usdc: 30.0, lp_token: 30.0, buyback: 20.0, reserve: 20.0 }
    }
}

/// Reserves the pool is reset to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PoolSettings {
    pub usdc: f64,
    pub tokens: f64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self { usdc: 1_000_000.0, tokens: 10_000_000.0 }
    }
}

impl PoolSettings {
    /// Opening price of a freshly reset pool; also the fixed-quantity issue price.
    pub fn price(&self) -> f64 {
        self.usdc / self.tokens.max(1.0)
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub release_mode: ReleaseMode,

    #[serde(default = "default_packages")]
    pub packages: BTreeMap<String, PackageParams>,

    #[serde(default = "default_duration_tiers")]
    pub duration_tiers: BTreeMap<u32, PackageParams>,

    #[serde(default)]
    pub fund_flow: FundFlowRatios,

    /// Percent of withdrawn tokens burned on exit.
    #[serde(default = "default_exit_burn_ratio")]
    pub exit_burn_ratio: f64,

    /// Percent of trading capital traded per day.
    #[serde(default = "default_daily_trading_volume_percent")]
    pub daily_trading_volume_percent: f64,

    #[serde(default = "default_true")]
    pub staking_enabled: bool,

    /// Trading starts once an order is older than this many days.
    #[serde(default)]
    pub trading_start_delay_days: u32,

    /// Allocate principal by fund-flow ratios on an order's first active day.
    #[serde(default = "default_true")]
    pub deposit_allocation_enabled: bool,

    #[serde(default)]
    pub initial_pool: PoolSettings,

    #[serde(default = "default_broker_levels")]
    pub broker_levels: Vec<BrokerLevel>,
}

fn default_exit_burn_ratio() -> f64 {
    10.0
}

fn default_daily_trading_volume_percent() -> f64 {
    100.0
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            release_mode: ReleaseMode::default(),
            packages: default_packages(),
            duration_tiers: default_duration_tiers(),
            fund_flow: FundFlowRatios::default(),
            exit_burn_ratio: default_exit_burn_ratio(),
            daily_trading_volume_percent: default_daily_trading_volume_percent(),
            staking_enabled: true,
            trading_start_delay_days: 0,
            deposit_allocation_enabled: true,
            initial_pool: PoolSettings::default(),
            broker_levels: default_broker_levels(),
        }
    }
}

impl Config {
    /// Parse a JSON document. Missing sections take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Parameters governing an order, resolved from its kind.
    ///
    /// `None` for an unknown tier or duration; callers treat that as a zero
    /// contribution.
    pub fn params_for(&self, order: &Order) -> Option<&PackageParams> {
        match &order.kind {
            OrderKind::Package { tier } => self.packages.get(tier),
            OrderKind::Days { duration_days } => self.duration_tiers.get(duration_days),
        }
    }

    /// Release mode in force for an order. Duration orders always release a
    /// fixed schedule.
    pub fn release_mode_for(&self, order: &Order) -> ReleaseMode {
        match order.kind {
            OrderKind::Package { .. } => self.release_mode,
            OrderKind::Days { .. } => ReleaseMode::FixedQuantity,
        }
    }

    /// Schema validation for the config-save boundary.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.packages.is_empty() {
            return Err(ConfigError::NoPackages);
        }
        for (name, params) in &self.packages {
            validate_params(&format!("packages.{name}"), params)?;
        }
        for (days, params) in &self.duration_tiers {
            validate_params(&format!("duration_tiers.{days}"), params)?;
        }

        percent("fund_flow.lp_usdc", self.fund_flow.lp_usdc)?;
        percent("fund_flow.lp_token", self.fund_flow.lp_token)?;
        percent("fund_flow.buyback", self.fund_flow.buyback)?;
        percent("fund_flow.reserve", self.fund_flow.reserve)?;
        percent("exit_burn_ratio", self.exit_burn_ratio)?;
        percent("daily_trading_volume_percent", self.daily_trading_volume_percent)?;

        positive("initial_pool.usdc", self.initial_pool.usdc)?;
        positive("initial_pool.tokens", self.initial_pool.tokens)?;

        let mut seen = std::collections::BTreeSet::new();
        for level in &self.broker_levels {
            if !seen.insert(level.level) {
                return Err(ConfigError::DuplicateBrokerLevel(level.level));
            }
            percent(&format!("broker_levels.{}.commission_percent", level.level), level.commission_percent)?;
            non_negative(&format!("broker_levels.{}.min_team_volume", level.level), level.min_team_volume)?;
        }
        Ok(())
    }
}

fn validate_params(prefix: &str, p: &PackageParams) -> Result<(), ConfigError> {
    if p.staking_days == 0 {
        return Err(ConfigError::ZeroStakingDays(prefix.to_string()));
    }
    percent(&format!("{prefix}.release_rate"), p.release_rate)?;
    non_negative(&format!("{prefix}.release_multiplier"), p.release_multiplier)?;
    non_negative(&format!("{prefix}.trading_capital_multiplier"), p.trading_capital_multiplier)?;
    non_negative(&format!("{prefix}.trading_fee_rate"), p.trading_fee_rate)?;
    non_negative(&format!("{prefix}.trading_profit_rate"), p.trading_profit_rate)?;
    percent(&format!("{prefix}.user_profit_share"), p.user_profit_share)?;
    // Exit shares are renormalized at use time; only the sign is checked here.
    non_negative(&format!("{prefix}.exit.withdraw"), p.exit.withdraw)?;
    non_negative(&format!("{prefix}.exit.keep"), p.exit.keep)?;
    non_negative(&format!("{prefix}.exit.convert"), p.exit.convert)?;
    Ok(())
}

fn percent(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ConfigError::PercentOutOfRange { field: field.to_string(), value });
    }
    Ok(())
}

fn positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(ConfigError::NotPositive { field: field.to_string(), value });
    }
    Ok(())
}

fn non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(value >= 0.0 && value.is_finite()) {
        return Err(ConfigError::Negative { field: field.to_string(), value });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ConfigStore
// ---------------------------------------------------------------------------

/// Process-lifetime config holder. Reads never fail; replacements are
/// validated and rejected whole.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    current: Config,
}

impl ConfigStore {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { current: config })
    }

    pub fn get(&self) -> &Config {
        &self.current
    }

    pub fn replace(&mut self, config: Config) -> Result<(), ConfigError> {
        config.validate()?;
        tracing::info!(
            packages = config.packages.len(),
            duration_tiers = config.duration_tiers.len(),
            "config replaced"
        );
        self.current = config;
        Ok(())
    }

    /// Replace from a JSON body, the shape accepted by the config-save endpoint.
    pub fn replace_json(&mut self, json: &str) -> Result<(), ConfigError> {
        let config = Config::from_json_str(json)?;
        self.replace(config)
    }

    pub fn reset(&mut self) {
        self.current = Config::default();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
