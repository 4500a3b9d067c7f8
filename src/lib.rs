// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # GreenLoop Server
//!
//! Core engine for the GreenLoop sustainability tracker. The crate turns a
//! raw log of eco-friendly activities into everything the product surfaces:
//! points, CO₂ savings, streaks, achievement and goal progress, a community
//! leaderboard, and the home/history dashboard views.
//!
//! ## Features
//!
//! - **Activity scoring**: points and CO₂ estimates computed once at write
//!   time from configurable per-type rates
//! - **Streaks**: consecutive-day runs ending today, from the raw log
//! - **Achievements and goals**: one unified target model with atomic
//!   progress accrual and exactly-once unlock timestamps
//! - **Leaderboard**: weekly, monthly, and all-time rankings with stable
//!   global ranks under pagination
//! - **Dashboard views**: home summary and 30-day history composition
//!
//! ## Architecture
//!
//! - **Models**: activities, users, and target definitions
//! - **Engine**: scoring, streak, progress, leaderboard, summary, history
//! - **Database**: SQLite persistence for the activity log and progress rows
//! - **Config**: TOML-loadable scoring rates with built-in defaults
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use greenloop_server::config::ScoringConfig;
//! use greenloop_server::database::Database;
//! use greenloop_server::engine::Engine;
//! use greenloop_server::models::{ActivityType, NewActivity, User};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let database = Database::new("sqlite:./data/greenloop.db").await?;
//!     database.seed_default_achievements().await?;
//!
//!     let engine = Engine::new(database.clone(), ScoringConfig::load(None)?);
//!
//!     let user = User::new("ada@example.com".to_string(), Some("Ada".to_string()));
//!     database.create_user(&user).await?;
//!
//!     let activity = engine
//!         .log_activity(
//!             user.id,
//!             NewActivity {
//!                 activity_type: ActivityType::Cycling,
//!                 amount: 10.0,
//!                 unit: Some("km".to_string()),
//!                 date: None,
//!             },
//!         )
//!         .await?;
//!     println!("Earned {} points", activity.points);
//!
//!     Ok(())
//! }
//! ```

/// Common data models for activities, users, and targets
pub mod models;

/// Scoring configuration management and persistence
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// SQLite database management
pub mod database;

/// Scoring, streak, progress, leaderboard, and dashboard engine
pub mod engine;

/// Production logging and structured output
pub mod logging;
