// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Leaderboard ranking and pagination.
//!
//! The board is recomputed from the raw activity log on every request —
//! O(users × activities), with no cached aggregate that could drift from
//! the log. Ranks are positions in the full sorted list, so they are
//! stable across pages: the row at sorted index `i` carries rank `i + 1`
//! no matter which page it lands on.
//!
//! Inclusion rule, all views: users with zero points inside the scoring
//! window are dropped. Ties on points keep user registration order.

use crate::constants::defaults;
use crate::database::Database;
use crate::engine::streak;
use anyhow::Result;
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One ranked leaderboard row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub email: String,
    /// CO₂ savings inside the scoring window, kilograms
    pub co2_saved_kg: f64,
    /// Points inside the scoring window
    pub points: i64,
    /// Lifetime streak; never window-limited
    pub streak_days: u32,
    /// 1-based position in the full sorted list
    pub rank: i64,
}

/// One page of the leaderboard plus the pre-pagination total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
    pub view: String,
    pub limit: i64,
    pub offset: i64,
    /// Row count before pagination
    pub total: i64,
    pub entries: Vec<LeaderboardEntry>,
}

/// A scored-but-unranked row
struct Standing {
    user_id: Uuid,
    display_name: Option<String>,
    email: String,
    co2_saved_kg: f64,
    points: i64,
    streak_days: u32,
}

/// Map a raw view string onto one of the three scoring windows.
/// Unknown values fall back to the weekly view.
pub fn normalize_view(raw: &str) -> &'static str {
    match raw.to_ascii_lowercase().as_str() {
        "month" | "monthly" => "month",
        "all" | "all_time" | "alltime" => "all",
        _ => "week",
    }
}

/// Lower bound of the scoring window for a normalized view; `None` means
/// all-time (no bound)
pub fn window_start(view: &str, today: NaiveDate) -> Option<NaiveDate> {
    match view {
        "month" => today.with_day(1),
        "all" => None,
        // Monday of the current week
        _ => today.checked_sub_days(Days::new(today.weekday().num_days_from_monday() as u64)),
    }
}

/// Compute the full leaderboard for a view and slice out one page
pub async fn build(
    database: &Database,
    view: &str,
    limit: i64,
    offset: i64,
    today: NaiveDate,
) -> Result<Leaderboard> {
    let normalized = normalize_view(view);
    let range_start = window_start(normalized, today);

    let mut standings = Vec::new();

    for user in database.list_users().await? {
        let all_activities = database.activities_for_user(user.id).await?;
        if all_activities.is_empty() {
            continue;
        }

        // Streak is a lifetime property; score over the window only
        let streak_days = streak::current_streak(all_activities.iter().map(|a| a.date), today);

        let in_window = |date: NaiveDate| match range_start {
            Some(start) => date >= start && date <= today,
            None => true,
        };

        let points: i64 = all_activities
            .iter()
            .filter(|a| in_window(a.date))
            .map(|a| a.points)
            .sum();

        if points == 0 {
            continue;
        }

        let co2_saved_kg: f64 = all_activities
            .iter()
            .filter(|a| in_window(a.date))
            .map(|a| a.co2_saved_kg)
            .sum();

        standings.push(Standing {
            user_id: user.id,
            display_name: user.display_name,
            email: user.email,
            co2_saved_kg,
            points,
            streak_days,
        });
    }

    let (total, entries) = paginate(standings, limit, offset);

    Ok(Leaderboard {
        view: normalized.to_string(),
        limit: if limit > 0 {
            limit
        } else {
            defaults::LEADERBOARD_PAGE_SIZE
        },
        offset: offset.clamp(0, total),
        total,
        entries,
    })
}

/// Sort standings, assign global ranks, and slice out the requested page.
///
/// The sort is stable, so equal point totals keep their input order.
fn paginate(mut standings: Vec<Standing>, limit: i64, offset: i64) -> (i64, Vec<LeaderboardEntry>) {
    standings.sort_by(|a, b| b.points.cmp(&a.points));

    let total = standings.len() as i64;
    let limit = if limit > 0 {
        limit
    } else {
        defaults::LEADERBOARD_PAGE_SIZE
    };
    let offset = offset.clamp(0, total);

    let from = offset as usize;
    let to = (offset + limit).min(total) as usize;

    let entries = standings[from..to]
        .iter()
        .enumerate()
        .map(|(i, s)| LeaderboardEntry {
            user_id: s.user_id,
            display_name: s.display_name.clone(),
            email: s.email.clone(),
            co2_saved_kg: s.co2_saved_kg,
            points: s.points,
            streak_days: s.streak_days,
            rank: from as i64 + i as i64 + 1,
        })
        .collect();

    (total, entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(email: &str, points: i64) -> Standing {
        Standing {
            user_id: Uuid::new_v4(),
            display_name: None,
            email: email.to_string(),
            co2_saved_kg: 0.0,
            points,
            streak_days: 0,
        }
    }

    #[test]
    fn test_normalize_view() {
        assert_eq!(normalize_view("week"), "week");
        assert_eq!(normalize_view("MONTH"), "month");
        assert_eq!(normalize_view("monthly"), "month");
        assert_eq!(normalize_view("all_time"), "all");
        assert_eq!(normalize_view("alltime"), "all");
        assert_eq!(normalize_view("nonsense"), "week");
        assert_eq!(normalize_view(""), "week");
    }

    #[test]
    fn test_window_start_week_is_monday() {
        // 2025-06-15 is a Sunday; that week's Monday is 2025-06-09
        let sunday = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(
            window_start("week", sunday),
            NaiveDate::from_ymd_opt(2025, 6, 9)
        );

        let monday = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        assert_eq!(window_start("week", monday), Some(monday));
    }

    #[test]
    fn test_window_start_month_and_all() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(
            window_start("month", today),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
        assert_eq!(window_start("all", today), None);
    }

    #[test]
    fn test_paginate_assigns_global_ranks() {
        let standings = vec![
            standing("a@x", 10),
            standing("b@x", 30),
            standing("c@x", 20),
            standing("d@x", 5),
        ];
        let (total, page) = paginate(standings, 2, 2);

        assert_eq!(total, 4);
        assert_eq!(page.len(), 2);
        // Third and fourth rows of the sorted order, ranks continue globally
        assert_eq!(page[0].email, "a@x");
        assert_eq!(page[0].rank, 3);
        assert_eq!(page[1].email, "d@x");
        assert_eq!(page[1].rank, 4);
    }

    #[test]
    fn test_paginate_ties_keep_input_order() {
        let standings = vec![standing("first@x", 10), standing("second@x", 10)];
        let (_, page) = paginate(standings, 10, 0);

        assert_eq!(page[0].email, "first@x");
        assert_eq!(page[0].rank, 1);
        assert_eq!(page[1].email, "second@x");
        assert_eq!(page[1].rank, 2);
    }

    #[test]
    fn test_paginate_clamps_offset_and_defaults_limit() {
        let standings = vec![standing("a@x", 1), standing("b@x", 2)];
        let (total, page) = paginate(standings, 0, 100);
        assert_eq!(total, 2);
        assert!(page.is_empty());

        let standings = vec![standing("a@x", 1), standing("b@x", 2)];
        let (_, page) = paginate(standings, -1, 0);
        assert_eq!(page.len(), 2);
    }
}
