// Copyright 2026 Hypermesh Foundation. All rights reserved.
// MS/AF Economic Model Calculator - Exit Distribution

use serde::{Deserialize, Serialize};

use crate::config::{Config, ExitPercents};

/// Partition of one release.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ExitSplit {
    pub withdraw: f64,
    pub keep: f64,
    pub convert: f64,
    /// Share of `withdraw` destroyed on exit.
    pub burn: f64,
    /// Share of `withdraw` sold into the pool.
    pub secondary_market: f64,
    /// `convert` valued at `price` and scaled by the capital multiplier.
    pub trading_capital_usdc: f64,
}

/// Split `released` tokens by `exit` (renormalized to 100) and apply the
/// configured burn ratio to the withdrawn share.
pub fn split_exit_distribution(
    released: f64,
    price: f64,
    exit: &ExitPercents,
    trading_capital_multiplier: f64,
    config: &Config,
) -> ExitSplit {
    let released = released.max(0.0);
    let shares = exit.normalized();

    let withdraw = released * shares.withdraw / 100.0;
    let keep = released * shares.keep / 100.0;
    let convert = released * shares.convert / 100.0;

    let burn_ratio = config.exit_burn_ratio.clamp(0.0, 100.0);
    let burn = withdraw * burn_ratio / 100.0;

    ExitSplit {
        withdraw,
        keep,
        convert,
        burn,
        secondary_market: withdraw - burn,
        trading_capital_usdc: convert * price.max(0.0) * trading_capital_multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_follows_percentages_and_burn_ratio() {
        let config = Config::default(); // 10% burn
        let split = split_exit_distribution(100.0, 0.1, &ExitPercents::new(40.0, 30.0, 30.0), 2.0, &config);
        assert!((split.withdraw - 40.0).abs() < 1e-9);
        assert!((split.keep - 30.0).abs() < 1e-9);
        assert!((split.convert - 30.0).abs() < 1e-9);
        assert!((split.burn - 4.0).abs() < 1e-9);
        assert!((split.secondary_market - 36.0).abs() < 1e-9);
        assert!((split.trading_capital_usdc - 6.0).abs() < 1e-9);
    }

    #[test]
    fn misconfigured_sum_is_renormalized() {
        let config = Config::default();
        let split = split_exit_distribution(90.0, 1.0, &ExitPercents::new(60.0, 60.0, 60.0), 1.0, &config);
        assert!((split.withdraw - 30.0).abs() < 1e-9);
        assert!((split.withdraw + split.keep + split.convert - 90.0).abs() < 1e-9);
    }

    #[test]
    fn zero_release_splits_to_zero() {
        let config = Config::default();
        let split = split_exit_distribution(0.0, 0.1, &ExitPercents::default(), 1.0, &config);
        assert_eq!(split, ExitSplit::default());
    }

    #[test]
    fn full_burn_leaves_nothing_for_market() {
        let mut config = Config::default();
        config.exit_burn_ratio = 100.0;
        let split = split_exit_distribution(10.0, 0.1, &ExitPercents::new(100.0, 0.0, 0.0), 1.0, &config);
        assert!((split.burn - 10.0).abs() < 1e-12);
        assert_eq!(split.secondary_market, 0.0);
    }
}
