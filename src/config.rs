// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Scoring configuration: point rates, CO₂ factors, and unit conversion
//! constants, loadable from TOML with embedded defaults.
//!
//! Historically these constants drifted between call sites (three different
//! minutes-to-km assumptions existed at one point). They now live in exactly
//! one place; every component converts through the same table.

use crate::models::ActivityType;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main scoring configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub points: PointRates,
    pub co2: Co2Factors,
    pub conversion: ConversionConstants,
}

/// Base point rate per activity type, multiplied by the scoring volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointRates {
    pub walking: f64,
    pub cycling: f64,
    pub public_transport: f64,
    pub reusable_items: f64,
    pub recycling: f64,
    pub other: f64,
}

/// Kilograms of CO₂ displaced per kilometer, per activity type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Co2Factors {
    pub walking: f64,
    pub cycling: f64,
    pub public_transport: f64,
    pub reusable_items: f64,
    pub recycling: f64,
    pub other: f64,
}

/// Unit normalization constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConstants {
    /// Assumed travel speed when converting minutes to kilometers for CO₂
    /// estimation (km/h)
    pub assumed_speed_kmh: f64,
    /// Flat km-equivalent per unit for unrecognized units on the CO₂ path
    pub fallback_km_per_unit: f64,
    /// Divisor applied to minute amounts on the scoring path
    pub scoring_minutes_divisor: f64,
}

impl ScoringConfig {
    /// Load scoring configuration from file or use defaults
    pub fn load(path: Option<String>) -> Result<Self> {
        // Try explicit path first
        if let Some(config_path) = path {
            return Self::load_from_file(&config_path);
        }

        // Try default scoring config file
        if Path::new("scoring_config.toml").exists() {
            return Self::load_from_file("scoring_config.toml");
        }

        // Fall back to embedded defaults
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scoring config file: {}", path))?;

        let config: ScoringConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse scoring config file: {}", path))?;

        Ok(config)
    }

    /// Base point rate for an activity type
    pub fn base_rate(&self, activity_type: ActivityType) -> f64 {
        match activity_type {
            ActivityType::Walking => self.points.walking,
            ActivityType::Cycling => self.points.cycling,
            ActivityType::PublicTransport => self.points.public_transport,
            ActivityType::ReusableItems => self.points.reusable_items,
            ActivityType::Recycling => self.points.recycling,
            ActivityType::Other => self.points.other,
        }
    }

    /// CO₂ displacement factor (kg per km) for an activity type
    pub fn co2_per_km(&self, activity_type: ActivityType) -> f64 {
        match activity_type {
            ActivityType::Walking => self.co2.walking,
            ActivityType::Cycling => self.co2.cycling,
            ActivityType::PublicTransport => self.co2.public_transport,
            ActivityType::ReusableItems => self.co2.reusable_items,
            ActivityType::Recycling => self.co2.recycling,
            ActivityType::Other => self.co2.other,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points: PointRates {
                walking: 2.0,
                cycling: 3.0,
                public_transport: 4.0,
                reusable_items: 1.5,
                recycling: 1.5,
                other: 1.0,
            },
            co2: Co2Factors {
                // kg CO₂ per km, relative to driving the same distance
                walking: 0.21,
                cycling: 0.21,
                public_transport: 0.10,
                reusable_items: 0.05,
                recycling: 0.05,
                other: 0.03,
            },
            conversion: ConversionConstants {
                assumed_speed_kmh: 5.0,
                fallback_km_per_unit: 0.2,
                scoring_minutes_divisor: 10.0,
            },
        }
    }
}
