// Copyright 2026 Hypermesh Foundation. All rights reserved.
// MS/AF Economic Model Calculator - Conservation Logic

use serde::{Deserialize, Serialize};

use crate::exit::ExitSplit;

/// Relative tolerance: error below `TOLERANCE * max(1, amount)` is balanced.
const TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Free function
// ---------------------------------------------------------------------------

/// Token leakage of one exit split.
///
/// In a closed split:
///   released = withdraw + keep + convert
///   withdraw = burn + secondary_market
///
/// Returns the sum of both absolute differences.
pub fn compute_conservation(released: f64, split: &ExitSplit) -> f64 {
    let outflow = split.withdraw + split.keep + split.convert;
    let withdrawn = split.burn + split.secondary_market;
    (released - outflow).abs() + (split.withdraw - withdrawn).abs()
}

// ---------------------------------------------------------------------------
// Conservation result
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct ConservationResult {
    pub balanced: bool,
    pub error: f64,
    /// Cumulative error has passed the alert threshold.
    pub threshold_exceeded: bool,
}

// ---------------------------------------------------------------------------
// Conservation law
// ---------------------------------------------------------------------------

/// Tracks cumulative token-accounting error across a run.
///
/// The engine never halts on a violation; the tracker exists so a run can
/// report whether its day totals stayed closed.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConservationLaw {
    /// Running total of absolute errors across checks that violated tolerance.
    pub cumulative_error: f64,
    pub alert_threshold: f64,
    pub threshold_exceeded: bool,
    pub consecutive_violations: u32,
    pub checks: u64,
}

impl ConservationLaw {
    pub fn new(threshold: f64) -> Self {
        Self {
            cumulative_error: 0.0,
            alert_threshold: threshold,
            threshold_exceeded: false,
            consecutive_violations: 0,
            checks: 0,
        }
    }

    /// Verify one order's split.
    pub fn verify_split(&mut self, released: f64, split: &ExitSplit) -> ConservationResult {
        let error = compute_conservation(released, split);
        self.record(error, released)
    }

    /// Verify a day's aggregated totals.
    ///
    /// Invariant: `released == secondary + burn + kept + converted`
    pub fn verify_day(
        &mut self,
        released: f64,
        secondary_market: f64,
        burned: f64,
        kept: f64,
        converted: f64,
    ) -> ConservationResult {
        let error = (released - (secondary_market + burned + kept + converted)).abs();
        self.record(error, released)
    }

    fn record(&mut self, error: f64, scale: f64) -> ConservationResult {
        self.checks += 1;
        let balanced = error <= TOLERANCE * scale.abs().max(1.0);

        if balanced {
            self.consecutive_violations = 0;
        } else {
            self.cumulative_error += error;
            self.consecutive_violations += 1;
        }

        if self.cumulative_error > self.alert_threshold {
            self.threshold_exceeded = true;
        }

        ConservationResult {
            balanced,
            error,
            threshold_exceeded: self.threshold_exceeded,
        }
    }

    pub fn is_balanced(&self) -> bool {
        !self.threshold_exceeded && self.cumulative_error == 0.0
    }
}

impl Default for ConservationLaw {
    fn default() -> Self {
        Self::new(0.001)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn split(withdraw: f64, keep: f64, convert: f64, burn: f64) -> ExitSplit {
        ExitSplit {
            withdraw,
            keep,
            convert,
            burn,
            secondary_market: withdraw - burn,
            trading_capital_usdc: 0.0,
        }
    }

    #[test]
    fn test_compute_conservation_exact() {
        let err = compute_conservation(100.0, &split(40.0, 30.0, 30.0, 4.0));
        assert!(err < f64::EPSILON);
    }

    #[test]
    fn test_compute_conservation_leakage() {
        let err = compute_conservation(100.0, &split(40.0, 30.0, 25.0, 4.0));
        assert!((err - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_threshold() {
        let law = ConservationLaw::default();
        assert!((law.alert_threshold - 0.001).abs() < f64::EPSILON);
        assert!(!law.threshold_exceeded);
        assert!(law.is_balanced());
    }

    #[test]
    fn test_split_violation_accumulates() {
        let mut law = ConservationLaw::default();
        let result = law.verify_split(100.0, &split(40.0, 30.0, 25.0, 4.0));
        assert!(!result.balanced);
        assert!(result.threshold_exceeded);
        assert_eq!(law.consecutive_violations, 1);
        assert!(!law.is_balanced());
    }

    #[test]
    fn test_balanced_resets_consecutive() {
        let mut law = ConservationLaw::new(100.0);
        law.verify_split(100.0, &split(40.0, 30.0, 25.0, 4.0));
        assert_eq!(law.consecutive_violations, 1);
        law.verify_split(100.0, &split(40.0, 30.0, 30.0, 4.0));
        assert_eq!(law.consecutive_violations, 0);
        assert_eq!(law.checks, 2);
    }

    #[test]
    fn test_verify_day_balanced_at_scale() {
        let mut law = ConservationLaw::default();
        // float noise well inside relative tolerance at 1e9 tokens
        let result = law.verify_day(1e9, 3.6e8, 4e7, 3e8, 3e8 + 1e-3);
        assert!(result.balanced);
    }
}
