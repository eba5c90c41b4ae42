// Built-in order books
// Used when no --orders file is given

use msaf_engine::{ExitPercents, Order};

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    /// Suggested horizon when --days is not given.
    pub days: u32,
    pub orders: fn() -> Vec<Order>,
}

// ─── Order Books ────────────────────────────────────────────────────────────

fn single() -> Vec<Order> {
    vec![Order::package(1, "pro", 1_000.0, 270, 0)]
}

fn mixed() -> Vec<Order> {
    vec![
        Order::package(1, "starter", 5_000.0, 180, 0),
        Order::package(2, "growth", 10_000.0, 180, 5).with_broker_level(1),
        Order::package(3, "pro", 25_000.0, 270, 10).with_broker_level(2),
        Order::package(4, "elite", 50_000.0, 360, 20).with_broker_level(3),
        Order::days(5, 30, 2_000.0, 0),
        Order::days(6, 90, 8_000.0, 15),
        Order::days(7, 180, 12_000.0, 30),
    ]
}

fn whale_exit() -> Vec<Order> {
    vec![
        Order::package(1, "elite", 1_000_000.0, 360, 0)
            .with_exit_override(ExitPercents::new(100.0, 0.0, 0.0)),
    ]
}

/// One starter deposit per day for a month.
fn ladder() -> Vec<Order> {
    (0..30)
        .map(|d| Order::package(d as u64 + 1, "starter", 1_000.0, 180, d))
        .collect()
}

fn fixed_only() -> Vec<Order> {
    vec![
        Order::days(1, 30, 10_000.0, 0),
        Order::days(2, 90, 10_000.0, 0),
        Order::days(3, 180, 10_000.0, 0),
        Order::days(4, 360, 10_000.0, 0),
    ]
}

fn hold_heavy() -> Vec<Order> {
    vec![
        Order::package(1, "pro", 20_000.0, 270, 0)
            .with_exit_override(ExitPercents::new(0.0, 80.0, 20.0))
            .with_broker_level(5),
    ]
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario { name: "single", label: "Single pro order", days: 270, orders: single },
        Scenario { name: "mixed", label: "Mixed tiers, staggered", days: 360, orders: mixed },
        Scenario { name: "whale-exit", label: "Elite whale, full withdraw", days: 360, orders: whale_exit },
        Scenario { name: "ladder", label: "Daily starter ladder", days: 210, orders: ladder },
        Scenario { name: "fixed", label: "Duration tiers only", days: 360, orders: fixed_only },
        Scenario { name: "hold-heavy", label: "Keep/convert heavy exit", days: 270, orders: hold_heavy },
    ]
}

pub fn find(name: &str) -> Option<Scenario> {
    let name = name.to_lowercase();
    scenarios().into_iter().find(|s| s.name == name)
}

pub fn names() -> Vec<&'static str> {
    scenarios().iter().map(|s| s.name).collect()
}
