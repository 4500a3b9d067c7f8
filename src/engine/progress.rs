// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Progress tracking for achievements and goals.
//!
//! Both target kinds share one mechanism: an activity event selects every
//! target whose type filter matches, converts the activity amount into a
//! unit-appropriate increment, and applies it through the database's
//! atomic upsert. The unlock timestamp is written in the same statement,
//! exactly once.

use crate::database::Database;
use crate::models::{Activity, ProgressRecord, TargetProgress};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// Increment contributed by one activity toward a target measured in
/// `unit`.
///
/// Volume units accrue the raw amount; `"actions"` counts occurrences
/// regardless of amount. `"days"` targets track streaks, which activity
/// events cannot advance — they contribute 0 and stay locked until streak
/// wiring exists. Unrecognized units count occurrences.
pub fn increment_for(unit: &str, amount: f64) -> f64 {
    match unit.to_ascii_lowercase().as_str() {
        "steps" | "km" | "kilometers" | "items" => amount,
        "actions" => 1.0,
        "days" => 0.0,
        _ => 1.0,
    }
}

/// Advance every target matching a freshly logged activity.
///
/// Progress rows are created lazily on first contribution. Returns the
/// updated records in target order.
pub async fn process_activity(
    database: &Database,
    user_id: Uuid,
    activity: &Activity,
    now: DateTime<Utc>,
) -> Result<Vec<ProgressRecord>> {
    let targets = database.targets_for_user(user_id).await?;

    let mut updated = Vec::new();
    for target in targets
        .iter()
        .filter(|t| t.matches(activity.activity_type))
    {
        let delta = increment_for(&target.unit, activity.amount);

        let record = database
            .apply_progress_delta(user_id, &target.id, delta, target.required, now)
            .await?;

        // Crossing the threshold on this very delta means we unlocked it
        if record.unlocked_at.is_some() && delta > 0.0 && record.progress - delta < target.required
        {
            info!(
                user.id = %user_id,
                target.id = %target.id,
                target.kind = target.kind.as_str(),
                "Target unlocked"
            );
        }

        updated.push(record);
    }

    Ok(updated)
}

/// Every target visible to the user joined with their progress.
///
/// Targets the user has never triggered appear with progress 0 and no
/// unlock timestamp.
pub async fn list_user_progress(
    database: &Database,
    user_id: Uuid,
) -> Result<Vec<TargetProgress>> {
    let targets = database.targets_for_user(user_id).await?;
    let records = database.progress_for_user(user_id).await?;

    let by_target: HashMap<String, ProgressRecord> = records
        .into_iter()
        .map(|r| (r.target_id.clone(), r))
        .collect();

    Ok(targets
        .into_iter()
        .map(|definition| {
            let record = by_target.get(&definition.id);
            TargetProgress {
                progress: record.map(|r| r.progress).unwrap_or(0.0),
                unlocked_at: record.and_then(|r| r.unlocked_at),
                definition,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_units_accrue_amount() {
        assert_eq!(increment_for("km", 4.2), 4.2);
        assert_eq!(increment_for("kilometers", 4.2), 4.2);
        assert_eq!(increment_for("steps", 8000.0), 8000.0);
        assert_eq!(increment_for("items", 3.0), 3.0);
    }

    #[test]
    fn test_actions_count_once_per_activity() {
        assert_eq!(increment_for("actions", 45.0), 1.0);
        assert_eq!(increment_for("ACTIONS", 0.5), 1.0);
    }

    #[test]
    fn test_streak_units_do_not_accrue() {
        assert_eq!(increment_for("days", 10.0), 0.0);
    }

    #[test]
    fn test_unknown_units_count_once() {
        assert_eq!(increment_for("trees", 12.0), 1.0);
    }
}
