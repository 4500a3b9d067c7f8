// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Core data structures shared across the GreenLoop engine: logged
//! activities, users, and the unified progress-target model covering both
//! achievements and goals.
//!
//! ## Design Principles
//!
//! - **Immutable activities**: an activity is scored once at write time
//!   (points and CO₂) and never mutated afterwards.
//! - **One target model**: achievements and goals share the same shape and
//!   the same progress tracker, tagged by [`TargetKind`].
//! - **Serializable**: all models derive serde; the wire format is the
//!   caller's concern.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Categories of sustainable activity a user can log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    /// Walking instead of driving
    Walking,
    /// Cycling instead of driving
    Cycling,
    /// Taking public transport
    PublicTransport,
    /// Using reusable items (bags, cups, bottles)
    ReusableItems,
    /// Recycling household items
    Recycling,
    /// Any other sustainable action
    Other,
}

impl ActivityType {
    /// Parse a client-supplied type string, case-insensitively.
    ///
    /// Accepts both the upper-case wire names (`"WALKING"`) and the
    /// snake_case serde names (`"public_transport"`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "walking" => Some(Self::Walking),
            "cycling" => Some(Self::Cycling),
            "public_transport" => Some(Self::PublicTransport),
            "reusable_items" => Some(Self::ReusableItems),
            "recycling" => Some(Self::Recycling),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Canonical snake_case name used for storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Cycling => "cycling",
            Self::PublicTransport => "public_transport",
            Self::ReusableItems => "reusable_items",
            Self::Recycling => "recycling",
            Self::Other => "other",
        }
    }

    /// Human-readable label for the history feed
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Walking => "Walked instead of driving",
            Self::Cycling => "Cycled",
            Self::PublicTransport => "Used public transport",
            Self::ReusableItems => "Used reusable items",
            Self::Recycling => "Recycling",
            Self::Other => "Other sustainable action",
        }
    }
}

/// One logged sustainable action, scored at write time
///
/// Points and CO₂ savings are computed when the activity is stored and are
/// never recomputed; every aggregate (summary, leaderboard, history) folds
/// over these precomputed values so all views agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Unique identifier for the activity
    pub id: Uuid,
    /// Owning user; an activity belongs to exactly one user
    pub user_id: Uuid,
    /// Category of the action
    pub activity_type: ActivityType,
    /// Positive quantity in `unit`
    pub amount: f64,
    /// Unit of `amount`: `"minutes"`, `"km"`, or free-form
    pub unit: String,
    /// Calendar date the action happened (timezone-naive by design)
    pub date: NaiveDate,
    /// Points awarded at write time, always >= 1
    pub points: i64,
    /// Estimated CO₂ savings in kilograms, computed at write time
    pub co2_saved_kg: f64,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

/// Request payload for logging a new activity
///
/// `unit` defaults to `"minutes"` and `date` to today when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivity {
    pub activity_type: ActivityType,
    pub amount: f64,
    pub unit: Option<String>,
    pub date: Option<NaiveDate>,
}

/// A registered user
///
/// Authentication is handled upstream; the engine only ever receives an
/// already-authenticated user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated id and current timestamp
    pub fn new(email: String, display_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            display_name,
            created_at: Utc::now(),
        }
    }
}

/// Distinguishes the two flavors of progress target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// System-curated achievement, unlocked by accumulating activity
    Achievement,
    /// Goal, system-defined or user-created, advanced by activity or by
    /// explicit increment/set calls
    Goal,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Achievement => "achievement",
            Self::Goal => "goal",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "achievement" => Some(Self::Achievement),
            "goal" => Some(Self::Goal),
            _ => None,
        }
    }
}

/// A named threshold a user can make progress toward
///
/// Unifies the historical achievement and goal models: both are a required
/// amount in some unit, optionally filtered to one activity type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDefinition {
    /// Stable identifier, e.g. `"walk_50km"` or a generated uuid string
    pub id: String,
    pub kind: TargetKind,
    pub title: String,
    pub description: String,
    /// Threshold that unlocks the target
    pub required: f64,
    /// Unit the threshold is measured in: `"km"`, `"items"`, `"actions"`,
    /// `"days"`, ...
    pub unit: String,
    /// Activity type this target accrues from; `None` matches every type
    pub activity_filter: Option<ActivityType>,
    /// Display icon hint
    pub icon: Option<String>,
    /// Owning user for user-created goals; `None` = system-defined
    pub owner_user_id: Option<Uuid>,
}

impl TargetDefinition {
    /// Whether an activity of the given type contributes to this target
    pub fn matches(&self, activity_type: ActivityType) -> bool {
        match self.activity_filter {
            Some(filter) => filter == activity_type,
            None => true,
        }
    }
}

/// Request payload for creating a user-owned goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGoal {
    pub title: String,
    pub description: String,
    pub required: f64,
    pub unit: String,
    pub activity_filter: Option<ActivityType>,
    pub icon: Option<String>,
}

/// Per-user accumulated progress toward one target
///
/// `unlocked_at` is set exactly once, the first time `progress` reaches the
/// target's required threshold, and is never cleared. `version` is an
/// optimistic-concurrency token bumped on every write so interleaved
/// writers are detectable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: Uuid,
    pub target_id: String,
    pub progress: f64,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub version: i64,
}

/// One target definition joined with the user's progress toward it
///
/// Users without a stored progress row see progress 0 and no unlock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetProgress {
    pub definition: TargetDefinition,
    pub progress: f64,
    pub unlocked_at: Option<DateTime<Utc>>,
}
