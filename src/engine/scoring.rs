// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Activity scoring: unit normalization, point values, and CO₂ estimates.
//!
//! Two independent conversion paths exist on purpose. The scoring path
//! measures "activity volume" (ten minutes of effort is worth one unit of
//! volume); the CO₂ path measures a kilometer-equivalent of displaced car
//! travel. They model different physical assumptions and must not be
//! merged.

use crate::config::ScoringConfig;
use crate::models::ActivityType;

/// Computes point values and CO₂ estimates for activity records.
///
/// All constants come from the [`ScoringConfig`]; there is exactly one
/// conversion table per path, shared by every caller.
#[derive(Clone)]
pub struct ActivityScorer {
    config: ScoringConfig,
}

impl ActivityScorer {
    /// Create a scorer with the given configuration
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// The active scoring configuration
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Normalized activity volume for point scoring.
    ///
    /// Minutes are divided down (sustained effort accumulates slowly),
    /// kilometers and any other unit pass through unchanged.
    pub fn scoring_volume(&self, amount: f64, unit: &str) -> f64 {
        if unit.eq_ignore_ascii_case("minutes") {
            amount / self.config.conversion.scoring_minutes_divisor
        } else {
            // "km" and unrecognized units both score the raw amount
            amount
        }
    }

    /// Kilometer-equivalent of an activity for CO₂ estimation.
    ///
    /// Minutes are converted through the assumed travel speed; unknown
    /// units fall back to a flat km-per-unit factor.
    pub fn distance_km_equivalent(&self, amount: f64, unit: &str) -> f64 {
        if unit.eq_ignore_ascii_case("km") {
            amount
        } else if unit.eq_ignore_ascii_case("minutes") {
            (amount / 60.0) * self.config.conversion.assumed_speed_kmh
        } else {
            amount * self.config.conversion.fallback_km_per_unit
        }
    }

    /// Points awarded for an activity.
    ///
    /// Every valid activity earns at least one point; there are no
    /// zero-point log events. Callers validate `amount > 0` before
    /// reaching the scorer.
    pub fn points(&self, activity_type: ActivityType, amount: f64, unit: &str) -> i64 {
        let raw = self.config.base_rate(activity_type) * self.scoring_volume(amount, unit);
        (raw.round() as i64).max(1)
    }

    /// Estimated CO₂ savings in kilograms, relative to driving.
    ///
    /// Never negative; zero only when the amount is zero.
    pub fn co2_saved_kg(&self, activity_type: ActivityType, amount: f64, unit: &str) -> f64 {
        self.distance_km_equivalent(amount, unit) * self.config.co2_per_km(activity_type)
    }
}
