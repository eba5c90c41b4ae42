// Copyright 2026 Hypermesh Foundation. All rights reserved.
// MS/AF Economic Model Calculator - Broker Levels

//! Broker commission table.
//!
//! Plain table scans. The day loop only asks one question of it: what share of
//! an order's broker profit goes to the order's referring broker.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrokerLevel {
    pub level: u8,
    pub name: String,
    /// Percent of broker profit paid to a broker at this level.
    pub commission_percent: f64,
    /// Team volume (USDC principal) required to reach this level.
    pub min_team_volume: f64,
}

impl BrokerLevel {
    fn new(level: u8, name: &str, commission_percent: f64, min_team_volume: f64) -> Self {
        Self { level, name: name.to_string(), commission_percent, min_team_volume }
    }
}

pub fn default_broker_levels() -> Vec<BrokerLevel> {
    vec![
        BrokerLevel::new(1, "V1", 10.0, 0.0),
        BrokerLevel::new(2, "V2", 20.0, 10_000.0),
        BrokerLevel::new(3, "V3", 30.0, 50_000.0),
        BrokerLevel::new(4, "V4", 40.0, 200_000.0),
        BrokerLevel::new(5, "V5", 50.0, 1_000_000.0),
    ]
}

pub fn lookup_level(levels: &[BrokerLevel], level: u8) -> Option<&BrokerLevel> {
    levels.iter().find(|l| l.level == level)
}

/// Highest level whose volume requirement `team_volume` meets.
pub fn level_for_volume(levels: &[BrokerLevel], team_volume: f64) -> Option<&BrokerLevel> {
    levels
        .iter()
        .filter(|l| team_volume >= l.min_team_volume)
        .max_by(|a, b| a.min_team_volume.total_cmp(&b.min_team_volume))
}

/// Commission owed on `broker_profit` at `level`. Unknown levels earn nothing.
pub fn commission_for(levels: &[BrokerLevel], level: u8, broker_profit: f64) -> f64 {
    match lookup_level(levels, level) {
        Some(l) => broker_profit.max(0.0) * l.commission_percent / 100.0,
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_and_unknown_levels() {
        let levels = default_broker_levels();
        assert_eq!(lookup_level(&levels, 3).map(|l| l.name.as_str()), Some("V3"));
        assert!(lookup_level(&levels, 9).is_none());
    }

    #[test]
    fn level_for_volume_picks_highest_reached() {
        let levels = default_broker_levels();
        assert_eq!(level_for_volume(&levels, 0.0).map(|l| l.level), Some(1));
        assert_eq!(level_for_volume(&levels, 75_000.0).map(|l| l.level), Some(3));
        assert_eq!(level_for_volume(&levels, 5_000_000.0).map(|l| l.level), Some(5));
        assert!(level_for_volume(&[], 5_000_000.0).is_none());
    }

    #[test]
    fn commission_scales_with_level() {
        let levels = default_broker_levels();
        assert!((commission_for(&levels, 2, 95.0) - 19.0).abs() < 1e-12);
        assert_eq!(commission_for(&levels, 42, 95.0), 0.0);
        assert_eq!(commission_for(&levels, 1, -10.0), 0.0);
    }
}
