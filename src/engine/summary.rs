// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Home dashboard summary aggregation.

use crate::constants::defaults;
use crate::engine::streak;
use crate::models::Activity;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Aggregate view backing the home dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeSummary {
    /// Points across the full history
    pub total_points: i64,
    /// Points in the trailing 7-day window (today-6 through today)
    pub weekly_points: i64,
    /// Distinct active days in the same window
    pub weekly_active_days: i64,
    /// CO₂ savings across the full history, kilograms
    pub co2_saved_kg: f64,
    /// Consecutive-day streak ending today
    pub current_streak: u32,
    /// Fixed weekly active-day target shown next to the progress ring
    pub weekly_goal_days: i64,
}

/// Fold a user's full activity history into the dashboard summary.
///
/// The weekly window is inclusive on both ends; everything else is a plain
/// sum over precomputed per-activity values.
pub fn summarize(activities: &[Activity], today: NaiveDate) -> HomeSummary {
    let week_start = today.checked_sub_days(Days::new(6)).unwrap_or(today);

    let total_points: i64 = activities.iter().map(|a| a.points).sum();
    let co2_saved_kg: f64 = activities.iter().map(|a| a.co2_saved_kg).sum();

    let in_week = |date: NaiveDate| date >= week_start && date <= today;

    let weekly_points: i64 = activities
        .iter()
        .filter(|a| in_week(a.date))
        .map(|a| a.points)
        .sum();

    let weekly_active_days = activities
        .iter()
        .filter(|a| in_week(a.date))
        .map(|a| a.date)
        .collect::<HashSet<_>>()
        .len() as i64;

    let current_streak = streak::current_streak(activities.iter().map(|a| a.date), today);

    HomeSummary {
        total_points,
        weekly_points,
        weekly_active_days,
        co2_saved_kg,
        current_streak,
        weekly_goal_days: defaults::WEEKLY_GOAL_DAYS,
    }
}
