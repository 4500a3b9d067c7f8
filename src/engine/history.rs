// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! History composition: unlocked achievements, a rolling 30-day activity
//! feed, a 7-day CO₂ trend, and a calendar completion map.

use crate::constants::defaults;
use crate::engine::streak;
use crate::models::{Activity, TargetKind, TargetProgress};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An achievement the user has unlocked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub id: String,
    pub title: String,
    /// Calendar date of the unlock
    pub date: NaiveDate,
}

/// One row of the 30-day activity feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryActivity {
    pub date: NaiveDate,
    /// Human-readable label derived from the activity type
    pub label: String,
    pub co2_saved_kg: f64,
}

/// One day of the 7-day CO₂ trend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Co2TrendPoint {
    /// Short day name, e.g. "Mon"
    pub day: String,
    pub kg: f64,
}

/// One day of the 30-day completion calendar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Whether at least one activity was logged that day
    pub completed: bool,
}

/// The full history view for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryReport {
    pub streak_days: u32,
    /// Unlocked achievements, most recent first
    pub achievements: Vec<UnlockedAchievement>,
    /// Activities of the last 30 days, newest first, capped at 50 rows
    pub completed_activities: Vec<HistoryActivity>,
    /// Exactly 7 points, today-6 through today; inactive days carry 0
    pub co2_trend: Vec<Co2TrendPoint>,
    /// One entry per day, today-29 through today
    pub calendar: Vec<CalendarDay>,
}

/// Compose the history view from a user's activity history and progress
/// list.
pub fn compose(
    activities: &[Activity],
    progress: &[TargetProgress],
    today: NaiveDate,
) -> HistoryReport {
    let streak_days = streak::current_streak(activities.iter().map(|a| a.date), today);

    let mut achievements: Vec<UnlockedAchievement> = progress
        .iter()
        .filter(|p| p.definition.kind == TargetKind::Achievement)
        .filter_map(|p| {
            p.unlocked_at.map(|unlocked| UnlockedAchievement {
                id: p.definition.id.clone(),
                title: p.definition.title.clone(),
                date: unlocked.date_naive(),
            })
        })
        .collect();
    achievements.sort_by(|a, b| b.date.cmp(&a.date));

    let thirty_days_ago = today.checked_sub_days(Days::new(29)).unwrap_or(today);

    let mut recent: Vec<&Activity> = activities
        .iter()
        .filter(|a| a.date >= thirty_days_ago)
        .collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

    let completed_activities: Vec<HistoryActivity> = recent
        .iter()
        .take(defaults::HISTORY_FEED_CAP)
        .map(|a| HistoryActivity {
            date: a.date,
            label: a.activity_type.display_name().to_string(),
            co2_saved_kg: a.co2_saved_kg,
        })
        .collect();

    let week_start = today.checked_sub_days(Days::new(6)).unwrap_or(today);
    let co2_trend: Vec<Co2TrendPoint> = (0..7)
        .filter_map(|i| week_start.checked_add_days(Days::new(i)))
        .map(|day| Co2TrendPoint {
            day: day.format("%a").to_string(),
            kg: activities
                .iter()
                .filter(|a| a.date == day)
                .map(|a| a.co2_saved_kg)
                .sum(),
        })
        .collect();

    let active_days: HashSet<NaiveDate> = activities.iter().map(|a| a.date).collect();
    let calendar: Vec<CalendarDay> = (0..30)
        .filter_map(|i| thirty_days_ago.checked_add_days(Days::new(i)))
        .map(|date| CalendarDay {
            date,
            completed: active_days.contains(&date),
        })
        .collect();

    HistoryReport {
        streak_days,
        achievements,
        completed_activities,
        co2_trend,
        calendar,
    }
}
