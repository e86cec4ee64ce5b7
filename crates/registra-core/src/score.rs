//! Weighted grade computation.
//!
//! Pure, side-effect-free arithmetic over (label, weight, value) entries.
//! The weighted sum is deliberately NOT normalized by the weight present:
//! a partially-scored set yields a partial contribution, so a final grade
//! only becomes meaningful once every configured evaluation type has been
//! recorded (tracked by the `complete` flag on [`GradeSummary`]).

use serde::{Deserialize, Serialize};

/// Raw weighted-sum pass threshold, used by statistics paths.
pub const RAW_PASS_THRESHOLD: f64 = 10.5;

/// Rounded integer-grade pass threshold, used by reporting paths.
///
/// The institution uses both thresholds in different contexts; they are
/// intentionally kept distinct.
pub const ROUNDED_PASS_THRESHOLD: i32 = 11;

/// One scored evaluation entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Evaluation label.
    pub label: String,
    /// Weight toward the final grade, percent.
    pub weight_percent: f64,
    /// Score on the 0-20 scale.
    pub value: f64,
}

/// A set of scored evaluation entries for one enrollment.
#[derive(Debug, Clone, Default)]
pub struct WeightedScoreSet {
    entries: Vec<ScoreEntry>,
}

impl WeightedScoreSet {
    pub fn new(entries: Vec<ScoreEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// `Σ value · weight / 100` over all entries.
    pub fn weighted_sum(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.value * e.weight_percent / 100.0)
            .sum()
    }

    /// Rounded final grade, or `None` when the raw sum is exactly zero
    /// (interpreted as "nothing recorded yet").
    pub fn rounded(&self) -> Option<i32> {
        let sum = self.weighted_sum();
        if sum == 0.0 {
            None
        } else {
            Some(round_half_away_from_zero(sum))
        }
    }

    /// Pass determination on the raw weighted sum (statistics contexts).
    pub fn passes_raw(&self) -> bool {
        self.weighted_sum() >= RAW_PASS_THRESHOLD
    }

    /// Pass determination on the rounded grade (reporting contexts).
    pub fn passes_rounded(&self) -> bool {
        self.rounded().is_some_and(|g| g >= ROUNDED_PASS_THRESHOLD)
    }
}

/// Round to the nearest integer, half away from zero: 10.5 → 11,
/// 10.49 → 10, -10.5 → -11.
pub fn round_half_away_from_zero(value: f64) -> i32 {
    if value >= 0.0 {
        (value + 0.5).floor() as i32
    } else {
        (value - 0.5).ceil() as i32
    }
}

/// Read-time grade computation for one enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeSummary {
    /// Raw weighted sum over recorded entries.
    pub weighted_sum: f64,
    /// Rounded final grade; `None` while nothing is recorded.
    pub rounded: Option<i32>,
    /// Whether every active evaluation type has a recorded entry.
    pub complete: bool,
    /// Raw-threshold pass determination (≥ 10.5 on the weighted sum).
    pub passes_raw: bool,
    /// Rounded-threshold pass determination (≥ 11 on the rounded grade).
    pub passes_rounded: bool,
}

impl GradeSummary {
    pub fn from_set(set: &WeightedScoreSet, complete: bool) -> Self {
        Self {
            weighted_sum: set.weighted_sum(),
            rounded: set.rounded(),
            complete,
            passes_raw: set.passes_raw(),
            passes_rounded: set.passes_rounded(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str, weight: f64, value: f64) -> ScoreEntry {
        ScoreEntry {
            label: label.into(),
            weight_percent: weight,
            value,
        }
    }

    #[test]
    fn partial_weight_is_not_normalized() {
        // Scheme {A:50, B:50}: only A recorded at 20 contributes half.
        let set = WeightedScoreSet::new(vec![entry("A", 50.0, 20.0)]);
        assert!((set.weighted_sum() - 10.0).abs() < 1e-9);

        let set = WeightedScoreSet::new(vec![entry("A", 50.0, 20.0), entry("B", 50.0, 0.0)]);
        assert!((set.weighted_sum() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_half_away_from_zero(10.5), 11);
        assert_eq!(round_half_away_from_zero(10.49), 10);
        assert_eq!(round_half_away_from_zero(16.3), 16);
        assert_eq!(round_half_away_from_zero(-10.5), -11);
    }

    #[test]
    fn zero_sum_has_no_rounded_grade() {
        let set = WeightedScoreSet::new(vec![entry("A", 50.0, 0.0)]);
        assert_eq!(set.rounded(), None);
        let set = WeightedScoreSet::default();
        assert_eq!(set.rounded(), None);
    }

    #[test]
    fn pass_thresholds_stay_distinct() {
        // Raw 10.5 passes the raw threshold and, rounded to 11, the
        // rounded threshold as well.
        let set = WeightedScoreSet::new(vec![entry("A", 100.0, 10.5)]);
        assert!(set.passes_raw());
        assert_eq!(set.rounded(), Some(11));
        assert!(set.passes_rounded());

        // Raw 10.49 fails raw but would round to 10 — fails both.
        let set = WeightedScoreSet::new(vec![entry("A", 100.0, 10.49)]);
        assert!(!set.passes_raw());
        assert!(!set.passes_rounded());
    }

    #[test]
    fn seven_slot_scenario_sums_to_sixteen_point_three() {
        let weights = [10.0, 10.0, 20.0, 20.0, 20.0, 5.0, 15.0];
        let values = [15.0, 14.0, 18.0, 16.0, 17.0, 19.0, 15.0];
        let entries = weights
            .iter()
            .zip(values.iter())
            .enumerate()
            .map(|(i, (w, v))| entry(&format!("slot-{i}"), *w, *v))
            .collect();
        let set = WeightedScoreSet::new(entries);
        assert!((set.weighted_sum() - 16.3).abs() < 1e-9);
        assert_eq!(set.rounded(), Some(16));
        assert!(set.passes_raw());
        assert!(set.passes_rounded());
    }
}
