// Copyright 2026 Hypermesh Foundation. All rights reserved.
// MS/AF Economic Model Calculator - Order Ledger

//! Per-order running counters.
//!
//! Orders are immutable. What an order has released, withdrawn or kept so far
//! lives in a [`Ledger`] that the day loop takes by value and hands back after
//! each step. Entries are keyed by the order's position in the order book, so
//! two orders that share an id still keep separate counters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::exit::ExitSplit;
use crate::release::scheduled_release;
use crate::types::{Order, OrderSummary};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderState {
    pub released: f64,
    pub withdrawn: f64,
    /// Kept tokens still held in-system.
    pub kept: f64,
    pub converted: f64,
    pub burned: f64,
    pub forex_income: f64,
}

impl OrderState {
    pub fn apply_split(&mut self, released: f64, split: &ExitSplit) {
        self.released += released;
        self.withdrawn += split.withdraw;
        self.kept += split.keep;
        self.converted += split.convert;
        self.burned += split.burn;
    }
}

/// Running state of every order touched so far, keyed by slot (index into
/// the run's order slice).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    orders: BTreeMap<usize, OrderState>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: usize) -> OrderState {
        self.orders.get(&slot).copied().unwrap_or_default()
    }

    pub fn entry(&mut self, slot: usize) -> &mut OrderState {
        self.orders.entry(slot).or_default()
    }

    /// Tokens still owed to the order in `slot`, `None` when the order has no
    /// fixed schedule.
    pub fn remaining_schedule(&self, slot: usize, order: &Order, config: &Config) -> Option<f64> {
        let total = scheduled_release(order, config)?;
        Some((total - self.get(slot).released).max(0.0))
    }

    /// One summary per order, in input order.
    pub fn summaries(&self, orders: &[Order], config: &Config) -> Vec<OrderSummary> {
        orders
            .iter()
            .enumerate()
            .map(|(slot, order)| {
                let state = self.get(slot);
                OrderSummary {
                    order_id: order.id,
                    released: state.released,
                    withdrawn: state.withdrawn,
                    kept_in_system: state.kept,
                    converted: state.converted,
                    burned: state.burned,
                    scheduled_release: scheduled_release(order, config),
                    forex_income: state.forex_income,
                }
            })
            .collect()
    }
}
