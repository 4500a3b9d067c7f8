// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Engine Module
//!
//! The GreenLoop core: activity scoring, streak calculation, progress
//! tracking, and the derived dashboard views.
//!
//! This module includes:
//! - Activity scoring and CO₂ estimation
//! - Consecutive-day streak calculation
//! - Achievement/goal progress tracking with atomic updates
//! - Home summary aggregation
//! - Leaderboard ranking and pagination
//! - 30-day history composition
//!
//! All entry points take the authenticated user id as an explicit
//! parameter; the engine never resolves identity on its own.

use crate::config::ScoringConfig;
use crate::constants::defaults;
use crate::database::Database;
use crate::models::{
    Activity, ActivityType, NewActivity, NewGoal, ProgressRecord, TargetDefinition, TargetKind,
    TargetProgress,
};
use chrono::{Local, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

pub mod history;
pub mod leaderboard;
pub mod progress;
pub mod scoring;
pub mod streak;
pub mod summary;

pub use history::HistoryReport;
pub use leaderboard::Leaderboard;
pub use scoring::ActivityScorer;
pub use summary::HomeSummary;

/// Errors surfaced by engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Client supplied an invalid value (non-positive amount, wrong target
    /// kind, ...)
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced user or target does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A concurrent writer updated the same progress row; the caller may
    /// retry with fresh state
    #[error("concurrent update detected for target {target_id}")]
    ProgressConflict { target_id: String },

    /// Storage-layer failure
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Facade over the scoring, streak, progress, and ranking components.
///
/// Holds the database handle and the scorer; every operation is a
/// request-scoped read/modify/write sequence with no background state.
#[derive(Clone)]
pub struct Engine {
    database: Database,
    scorer: ActivityScorer,
}

impl Engine {
    /// Create a new engine over a database with the given scoring config
    pub fn new(database: Database, config: ScoringConfig) -> Self {
        Self {
            database,
            scorer: ActivityScorer::new(config),
        }
    }

    /// Access the underlying database handle
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Access the activity scorer
    pub fn scorer(&self) -> &ActivityScorer {
        &self.scorer
    }

    /// Today as a naive calendar date; all date windows are anchored here
    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Points awarded for an activity, always >= 1
    pub fn score_activity(&self, activity_type: ActivityType, amount: f64, unit: &str) -> i64 {
        self.scorer.points(activity_type, amount, unit)
    }

    /// Estimated CO₂ savings in kilograms for an activity
    pub fn estimate_co2_saved_kg(
        &self,
        activity_type: ActivityType,
        amount: f64,
        unit: &str,
    ) -> f64 {
        self.scorer.co2_saved_kg(activity_type, amount, unit)
    }

    /// Score and store a new activity, then advance every matching
    /// progress target.
    ///
    /// The record is immutable once written: points and CO₂ savings are
    /// computed here and never recomputed.
    pub async fn log_activity(
        &self,
        user_id: Uuid,
        new_activity: NewActivity,
    ) -> Result<Activity, EngineError> {
        if new_activity.amount <= 0.0 {
            return Err(EngineError::Validation(
                "amount must be positive".to_string(),
            ));
        }

        self.require_user(user_id).await?;

        let unit = match new_activity.unit {
            Some(u) if !u.trim().is_empty() => u,
            _ => "minutes".to_string(),
        };
        let date = new_activity.date.unwrap_or_else(Self::today);

        let activity = Activity {
            id: Uuid::new_v4(),
            user_id,
            activity_type: new_activity.activity_type,
            amount: new_activity.amount,
            unit: unit.clone(),
            date,
            points: self
                .scorer
                .points(new_activity.activity_type, new_activity.amount, &unit),
            co2_saved_kg: self.scorer.co2_saved_kg(
                new_activity.activity_type,
                new_activity.amount,
                &unit,
            ),
            created_at: Utc::now(),
        };

        self.database.insert_activity(&activity).await?;

        info!(
            user.id = %user_id,
            activity.id = %activity.id,
            activity.type = activity.activity_type.as_str(),
            activity.points = activity.points,
            "Activity logged"
        );

        progress::process_activity(&self.database, user_id, &activity, Utc::now()).await?;

        Ok(activity)
    }

    /// The user's five most recent activities, newest first
    pub async fn recent_activities(&self, user_id: Uuid) -> Result<Vec<Activity>, EngineError> {
        self.require_user(user_id).await?;
        Ok(self
            .database
            .recent_activities(user_id, defaults::RECENT_ACTIVITY_COUNT)
            .await?)
    }

    /// Home dashboard aggregate for one user
    pub async fn build_summary(&self, user_id: Uuid) -> Result<HomeSummary, EngineError> {
        self.require_user(user_id).await?;
        let activities = self.database.activities_for_user(user_id).await?;
        Ok(summary::summarize(&activities, Self::today()))
    }

    /// Ranked leaderboard for a scoring window
    pub async fn leaderboard(
        &self,
        view: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Leaderboard, EngineError> {
        Ok(leaderboard::build(&self.database, view, limit, offset, Self::today()).await?)
    }

    /// 30-day activity feed, CO₂ trend, and completion calendar
    pub async fn history(&self, user_id: Uuid) -> Result<HistoryReport, EngineError> {
        self.require_user(user_id).await?;
        let activities = self.database.activities_for_user(user_id).await?;
        let progress = progress::list_user_progress(&self.database, user_id).await?;
        Ok(history::compose(&activities, &progress, Self::today()))
    }

    /// Every target visible to the user joined with their progress;
    /// targets never triggered show progress 0 and no unlock
    pub async fn list_progress(&self, user_id: Uuid) -> Result<Vec<TargetProgress>, EngineError> {
        self.require_user(user_id).await?;
        Ok(progress::list_user_progress(&self.database, user_id).await?)
    }

    /// Create a user-owned goal definition
    pub async fn create_goal(
        &self,
        user_id: Uuid,
        new_goal: NewGoal,
    ) -> Result<TargetDefinition, EngineError> {
        if new_goal.required <= 0.0 {
            return Err(EngineError::Validation(
                "required threshold must be positive".to_string(),
            ));
        }

        self.require_user(user_id).await?;

        let target = TargetDefinition {
            id: Uuid::new_v4().to_string(),
            kind: TargetKind::Goal,
            title: new_goal.title,
            description: new_goal.description,
            required: new_goal.required,
            unit: new_goal.unit,
            activity_filter: new_goal.activity_filter,
            icon: new_goal.icon,
            owner_user_id: Some(user_id),
        };

        self.database.create_target(&target).await?;

        info!(user.id = %user_id, target.id = %target.id, "Goal created");

        Ok(target)
    }

    /// Add `delta` to the user's progress toward a goal.
    ///
    /// The increment is a single atomic statement; concurrent increments
    /// never lose updates.
    pub async fn increment_goal_progress(
        &self,
        user_id: Uuid,
        goal_id: &str,
        delta: f64,
    ) -> Result<ProgressRecord, EngineError> {
        self.require_user(user_id).await?;
        let goal = self.require_goal(goal_id).await?;

        let record = self
            .database
            .apply_progress_delta(user_id, goal_id, delta, goal.required, Utc::now())
            .await?;

        if record.unlocked_at.is_some() && record.progress - delta < goal.required {
            info!(user.id = %user_id, target.id = %goal_id, "Goal unlocked");
        }

        Ok(record)
    }

    /// Replace the user's progress toward a goal with an absolute value.
    ///
    /// Guarded by an optimistic version token: if another writer updates
    /// the row between the read and the write, the call fails with
    /// [`EngineError::ProgressConflict`] instead of overwriting.
    pub async fn set_goal_progress(
        &self,
        user_id: Uuid,
        goal_id: &str,
        value: f64,
    ) -> Result<ProgressRecord, EngineError> {
        self.require_user(user_id).await?;
        let goal = self.require_goal(goal_id).await?;

        let current_version = self
            .database
            .get_progress(user_id, goal_id)
            .await?
            .map(|p| p.version);

        let updated = self
            .database
            .set_progress(
                user_id,
                goal_id,
                value,
                goal.required,
                Utc::now(),
                current_version,
            )
            .await?;

        updated.ok_or_else(|| EngineError::ProgressConflict {
            target_id: goal_id.to_string(),
        })
    }

    async fn require_user(&self, user_id: Uuid) -> Result<(), EngineError> {
        match self.database.get_user(user_id).await? {
            Some(_) => Ok(()),
            None => Err(EngineError::NotFound {
                entity: "user",
                id: user_id.to_string(),
            }),
        }
    }

    async fn require_goal(&self, goal_id: &str) -> Result<TargetDefinition, EngineError> {
        let target =
            self.database
                .get_target(goal_id)
                .await?
                .ok_or_else(|| EngineError::NotFound {
                    entity: "goal",
                    id: goal_id.to_string(),
                })?;

        // Achievements only move through activity events
        if target.kind != TargetKind::Goal {
            return Err(EngineError::Validation(format!(
                "target {} is not a goal",
                goal_id
            )));
        }

        Ok(target)
    }
}
