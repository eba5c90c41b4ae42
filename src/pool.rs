// Copyright 2026 Hypermesh Foundation. All rights reserved.
// MS/AF Economic Model Calculator - Bonding-Curve Pool

//! Simulated USDC/token pool.
//!
//! The pool is a value type. [`step_pool`] consumes one day of aggregated flows
//! and returns the next state; the input is never touched. Price and LP supply
//! are derived from reserves on every step rather than tracked incrementally.

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// The pool never pays out its last unit of USDC, and never starts below it.
const USDC_FLOOR: f64 = 1.0;
/// Token reserves are floored here before repricing.
const TOKEN_FLOOR: f64 = 1.0;

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Pool {
    pub usdc_balance: f64,
    pub token_balance: f64,
    /// USDC per token, always `usdc_balance / max(token_balance, 1)`.
    pub price: f64,
    /// `sqrt(usdc_balance * token_balance)`.
    pub lp_tokens: f64,
    pub total_burned: f64,
    pub total_buyback: f64,
}

impl Pool {
    pub fn new(usdc_balance: f64, token_balance: f64) -> Self {
        let mut pool = Self {
            usdc_balance,
            token_balance,
            price: 0.0,
            lp_tokens: 0.0,
            total_burned: 0.0,
            total_buyback: 0.0,
        };
        pool.reprice();
        pool
    }

    /// Reset state derived from the configured initial reserves.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.initial_pool.usdc, config.initial_pool.tokens)
    }

    fn reprice(&mut self) {
        self.usdc_balance = self.usdc_balance.max(USDC_FLOOR);
        self.token_balance = self.token_balance.max(TOKEN_FLOOR);
        self.price = self.usdc_balance / self.token_balance;
        self.lp_tokens = (self.usdc_balance * self.token_balance).max(0.0).sqrt();
    }
}

// ---------------------------------------------------------------------------
// Day flows
// ---------------------------------------------------------------------------

/// A day's aggregated flows into the pool.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct DayFlows {
    pub usdc_added: f64,
    pub token_added: f64,
    /// Tokens sold into the pool by secondary-market exits.
    pub tokens_sold: f64,
    /// Tokens burned outside the pool; counter only.
    pub tokens_burned: f64,
    /// USDC booked to buyback; counter only.
    pub buyback_usdc: f64,
}

// ---------------------------------------------------------------------------
// Stepper
// ---------------------------------------------------------------------------

/// Apply one day of flows in fixed order: add liquidity, absorb sells at the
/// pre-step price, book burn/buyback, reprice.
///
/// A sell that would drain the pool is partially filled: USDC paid out is
/// capped at `usdc_balance - 1` and the absorbed token quantity is recomputed
/// from the capped amount. Negative inputs are treated as zero.
pub fn step_pool(pool: &Pool, flows: &DayFlows) -> Pool {
    let mut next = *pool;
    let pre_step_price = pool.price;

    next.usdc_balance += flows.usdc_added.max(0.0);
    next.token_balance += flows.token_added.max(0.0);

    let sold = flows.tokens_sold.max(0.0);
    if sold > 0.0 && pre_step_price > 0.0 {
        let requested_usdc = sold * pre_step_price;
        let available_usdc = (next.usdc_balance - USDC_FLOOR).max(0.0);
        let usdc_out = requested_usdc.min(available_usdc);
        let absorbed = usdc_out / pre_step_price;
        next.usdc_balance -= usdc_out;
        next.token_balance += absorbed;
        if usdc_out < requested_usdc {
            tracing::debug!(
                requested = sold,
                absorbed,
                usdc_out,
                "sell pressure partially filled at pool floor"
            );
        }
    }

    next.total_burned += flows.tokens_burned.max(0.0);
    next.total_buyback += flows.buyback_usdc.max(0.0);

    next.reprice();
    next
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
