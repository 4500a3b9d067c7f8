// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Database Management
//!
//! SQLite-backed storage for users, activities, progress targets, and
//! per-user progress rows.
//!
//! Progress mutation is the only write path with a read-modify-write
//! hazard; it is implemented as single-statement atomic upserts so two
//! concurrent activity submissions for the same user never lose an
//! increment. Replacing a progress value goes through an optimistic
//! version token instead, so interleaved writers are detected rather than
//! silently overwritten.

use crate::models::{
    Activity, ActivityType, ProgressRecord, TargetDefinition, TargetKind, User,
};
use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Row, Sqlite, SqlitePool};
use uuid::Uuid;

/// Database manager for the activity, target, and progress stores
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        let db = Self { pool };

        // Run migrations
        db.migrate().await?;

        Ok(db)
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                display_name TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS activities (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                activity_type TEXT NOT NULL,
                amount REAL NOT NULL,
                unit TEXT NOT NULL,
                activity_date TEXT NOT NULL,
                points INTEGER NOT NULL,
                co2_saved_kg REAL NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_activities_user_date \
             ON activities(user_id, activity_date)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS targets (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                required REAL NOT NULL,
                unit TEXT NOT NULL,
                activity_filter TEXT,
                icon TEXT,
                owner_user_id TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS target_progress (
                user_id TEXT NOT NULL,
                target_id TEXT NOT NULL,
                progress REAL NOT NULL DEFAULT 0,
                unlocked_at TEXT,
                version INTEGER NOT NULL DEFAULT 1,
                PRIMARY KEY (user_id, target_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ── Users ────────────────────────────────────────────────────────

    /// Create a new user
    pub async fn create_user(&self, user: &User) -> Result<Uuid> {
        sqlx::query(
            "INSERT INTO users (id, email, display_name, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(user.id)
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Get user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// All users in registration order.
    ///
    /// The leaderboard iterates this list; the stable ordering doubles as
    /// the tiebreaker for equal point totals.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_user).collect()
    }

    // ── Activities ───────────────────────────────────────────────────

    /// Store a scored activity record
    pub async fn insert_activity(&self, activity: &Activity) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO activities
                (id, user_id, activity_type, amount, unit, activity_date,
                 points, co2_saved_kg, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(activity.id.to_string())
        .bind(activity.user_id.to_string())
        .bind(activity.activity_type.as_str())
        .bind(activity.amount)
        .bind(&activity.unit)
        .bind(activity.date.to_string())
        .bind(activity.points)
        .bind(activity.co2_saved_kg)
        .bind(activity.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Full activity history for one user, oldest first
    pub async fn activities_for_user(&self, user_id: Uuid) -> Result<Vec<Activity>> {
        let rows = sqlx::query(
            "SELECT * FROM activities WHERE user_id = ?1 \
             ORDER BY activity_date ASC, created_at ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_activity).collect()
    }

    /// Most recent activities for one user, newest first
    pub async fn recent_activities(&self, user_id: Uuid, limit: i64) -> Result<Vec<Activity>> {
        let rows = sqlx::query(
            "SELECT * FROM activities WHERE user_id = ?1 \
             ORDER BY activity_date DESC, created_at DESC LIMIT ?2",
        )
        .bind(user_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_activity).collect()
    }

    // ── Targets ──────────────────────────────────────────────────────

    /// Store a target definition
    pub async fn create_target(&self, target: &TargetDefinition) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO targets
                (id, kind, title, description, required, unit,
                 activity_filter, icon, owner_user_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&target.id)
        .bind(target.kind.as_str())
        .bind(&target.title)
        .bind(&target.description)
        .bind(target.required)
        .bind(&target.unit)
        .bind(target.activity_filter.map(|t| t.as_str()))
        .bind(&target.icon)
        .bind(target.owner_user_id.map(|u| u.to_string()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a target definition by id
    pub async fn get_target(&self, target_id: &str) -> Result<Option<TargetDefinition>> {
        let row = sqlx::query("SELECT * FROM targets WHERE id = ?1")
            .bind(target_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_target(&row)?)),
            None => Ok(None),
        }
    }

    /// All target definitions visible to one user: system-defined targets
    /// plus the user's own goals
    pub async fn targets_for_user(&self, user_id: Uuid) -> Result<Vec<TargetDefinition>> {
        let rows = sqlx::query(
            "SELECT * FROM targets WHERE owner_user_id IS NULL OR owner_user_id = ?1 \
             ORDER BY owner_user_id IS NOT NULL, id ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_target).collect()
    }

    /// Insert the built-in system achievement set, skipping any ids that
    /// already exist
    pub async fn seed_default_achievements(&self) -> Result<()> {
        for target in default_achievements() {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO targets
                    (id, kind, title, description, required, unit,
                     activity_filter, icon, owner_user_id)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL)
                "#,
            )
            .bind(&target.id)
            .bind(target.kind.as_str())
            .bind(&target.title)
            .bind(&target.description)
            .bind(target.required)
            .bind(&target.unit)
            .bind(target.activity_filter.map(|t| t.as_str()))
            .bind(&target.icon)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    // ── Progress ─────────────────────────────────────────────────────

    /// Get one progress row
    pub async fn get_progress(
        &self,
        user_id: Uuid,
        target_id: &str,
    ) -> Result<Option<ProgressRecord>> {
        let row = sqlx::query(
            "SELECT * FROM target_progress WHERE user_id = ?1 AND target_id = ?2",
        )
        .bind(user_id.to_string())
        .bind(target_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_progress(&row)?)),
            None => Ok(None),
        }
    }

    /// All progress rows for one user
    pub async fn progress_for_user(&self, user_id: Uuid) -> Result<Vec<ProgressRecord>> {
        let rows = sqlx::query("SELECT * FROM target_progress WHERE user_id = ?1")
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_progress).collect()
    }

    /// Atomically add `delta` to a progress row, creating it if absent.
    ///
    /// The increment, the one-time unlock check, and the version bump all
    /// happen in a single statement, so concurrent callers cannot lose an
    /// update. `unlocked_at` is set the first time the accumulated progress
    /// reaches `required` and never changes afterwards.
    pub async fn apply_progress_delta(
        &self,
        user_id: Uuid,
        target_id: &str,
        delta: f64,
        required: f64,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord> {
        sqlx::query(
            r#"
            INSERT INTO target_progress (user_id, target_id, progress, unlocked_at, version)
            VALUES (?1, ?2, ?3, CASE WHEN ?3 >= ?4 THEN ?5 END, 1)
            ON CONFLICT(user_id, target_id) DO UPDATE SET
                progress = target_progress.progress + ?3,
                unlocked_at = COALESCE(
                    target_progress.unlocked_at,
                    CASE WHEN target_progress.progress + ?3 >= ?4 THEN ?5 END
                ),
                version = target_progress.version + 1
            "#,
        )
        .bind(user_id.to_string())
        .bind(target_id)
        .bind(delta)
        .bind(required)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        self.get_progress(user_id, target_id)
            .await?
            .ok_or_else(|| anyhow!("progress row missing after upsert"))
    }

    /// Replace a progress value, guarded by the optimistic version token.
    ///
    /// `expected_version` is the version the caller read (`None` if no row
    /// existed yet). Returns `Ok(None)` when another writer interleaved:
    /// the row's version no longer matches, or the row was created
    /// concurrently. The caller decides whether to retry.
    pub async fn set_progress(
        &self,
        user_id: Uuid,
        target_id: &str,
        value: f64,
        required: f64,
        now: DateTime<Utc>,
        expected_version: Option<i64>,
    ) -> Result<Option<ProgressRecord>> {
        let affected = match expected_version {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO target_progress
                        (user_id, target_id, progress, unlocked_at, version)
                    VALUES (?1, ?2, ?3, CASE WHEN ?3 >= ?4 THEN ?5 END, 1)
                    ON CONFLICT(user_id, target_id) DO NOTHING
                    "#,
                )
                .bind(user_id.to_string())
                .bind(target_id)
                .bind(value)
                .bind(required)
                .bind(now.to_rfc3339())
                .execute(&self.pool)
                .await?
                .rows_affected()
            }
            Some(version) => {
                sqlx::query(
                    r#"
                    UPDATE target_progress
                    SET progress = ?3,
                        unlocked_at = COALESCE(
                            unlocked_at, CASE WHEN ?3 >= ?4 THEN ?5 END
                        ),
                        version = version + 1
                    WHERE user_id = ?1 AND target_id = ?2 AND version = ?6
                    "#,
                )
                .bind(user_id.to_string())
                .bind(target_id)
                .bind(value)
                .bind(required)
                .bind(now.to_rfc3339())
                .bind(version)
                .execute(&self.pool)
                .await?
                .rows_affected()
            }
        };

        if affected == 0 {
            return Ok(None);
        }

        Ok(self.get_progress(user_id, target_id).await?)
    }
}

/// Built-in system achievements, seeded on first startup
pub fn default_achievements() -> Vec<TargetDefinition> {
    let achievement = |id: &str,
                       title: &str,
                       description: &str,
                       required: f64,
                       unit: &str,
                       filter: Option<ActivityType>,
                       icon: &str| TargetDefinition {
        id: id.to_string(),
        kind: TargetKind::Achievement,
        title: title.to_string(),
        description: description.to_string(),
        required,
        unit: unit.to_string(),
        activity_filter: filter,
        icon: Some(icon.to_string()),
        owner_user_id: None,
    };

    vec![
        achievement(
            "first_step",
            "First Step",
            "Log your first sustainable action",
            1.0,
            "actions",
            None,
            "seedling",
        ),
        achievement(
            "walk_50km",
            "City Walker",
            "Walk 50 km instead of driving",
            50.0,
            "km",
            Some(ActivityType::Walking),
            "footprints",
        ),
        achievement(
            "cycle_100km",
            "Century Rider",
            "Cycle 100 km instead of driving",
            100.0,
            "km",
            Some(ActivityType::Cycling),
            "bicycle",
        ),
        achievement(
            "transit_20",
            "Commuter",
            "Take public transport 20 times",
            20.0,
            "actions",
            Some(ActivityType::PublicTransport),
            "bus",
        ),
        achievement(
            "recycle_30",
            "Sorting Champion",
            "Recycle 30 items",
            30.0,
            "items",
            Some(ActivityType::Recycling),
            "recycle",
        ),
        // Streak achievements are not advanced by activity events yet; see
        // the progress tracker's increment rules.
        achievement(
            "streak_7",
            "One Green Week",
            "Stay active 7 days in a row",
            7.0,
            "days",
            None,
            "flame",
        ),
    ]
}

// ── Row converters ───────────────────────────────────────────────────

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let id_str: String = row.try_get("id")?;
    let created_at_str: String = row.try_get("created_at")?;

    Ok(User {
        id: Uuid::parse_str(&id_str)?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)?.with_timezone(&Utc),
    })
}

fn row_to_activity(row: &sqlx::sqlite::SqliteRow) -> Result<Activity> {
    let id_str: String = row.try_get("id")?;
    let user_id_str: String = row.try_get("user_id")?;
    let type_str: String = row.try_get("activity_type")?;
    let date_str: String = row.try_get("activity_date")?;
    let created_at_str: String = row.try_get("created_at")?;

    let activity_type = ActivityType::parse(&type_str)
        .ok_or_else(|| anyhow!("unknown activity type in store: {type_str}"))?;

    Ok(Activity {
        id: Uuid::parse_str(&id_str)?,
        user_id: Uuid::parse_str(&user_id_str)?,
        activity_type,
        amount: row.try_get("amount")?,
        unit: row.try_get("unit")?,
        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")?,
        points: row.try_get("points")?,
        co2_saved_kg: row.try_get("co2_saved_kg")?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)?.with_timezone(&Utc),
    })
}

fn row_to_target(row: &sqlx::sqlite::SqliteRow) -> Result<TargetDefinition> {
    let kind_str: String = row.try_get("kind")?;
    let filter_str: Option<String> = row.try_get("activity_filter")?;
    let owner_str: Option<String> = row.try_get("owner_user_id")?;

    let kind = TargetKind::parse(&kind_str)
        .ok_or_else(|| anyhow!("unknown target kind in store: {kind_str}"))?;

    let activity_filter = match filter_str {
        Some(s) => Some(
            ActivityType::parse(&s)
                .ok_or_else(|| anyhow!("unknown activity filter in store: {s}"))?,
        ),
        None => None,
    };

    let owner_user_id = match owner_str {
        Some(s) => Some(Uuid::parse_str(&s)?),
        None => None,
    };

    Ok(TargetDefinition {
        id: row.try_get("id")?,
        kind,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        required: row.try_get("required")?,
        unit: row.try_get("unit")?,
        activity_filter,
        icon: row.try_get("icon")?,
        owner_user_id,
    })
}

fn row_to_progress(row: &sqlx::sqlite::SqliteRow) -> Result<ProgressRecord> {
    let user_id_str: String = row.try_get("user_id")?;
    let unlocked_str: Option<String> = row.try_get("unlocked_at")?;

    let unlocked_at = match unlocked_str {
        Some(s) => Some(DateTime::parse_from_rfc3339(&s)?.with_timezone(&Utc)),
        None => None,
    };

    Ok(ProgressRecord {
        user_id: Uuid::parse_str(&user_id_str)?,
        target_id: row.try_get("target_id")?,
        progress: row.try_get("progress")?,
        unlocked_at,
        version: row.try_get("version")?,
    })
}
