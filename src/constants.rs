// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Application constants and environment-based configuration values.

/// Domain constants
pub mod defaults {
    /// Target number of active days per week shown on the home dashboard
    pub const WEEKLY_GOAL_DAYS: i64 = 5;

    /// Page size used when the caller passes a non-positive limit
    pub const LEADERBOARD_PAGE_SIZE: i64 = 50;

    /// Maximum rows returned in the 30-day history feed
    pub const HISTORY_FEED_CAP: usize = 50;

    /// Number of entries on the recent-activity endpoint
    pub const RECENT_ACTIVITY_COUNT: i64 = 5;
}

/// Environment-based configuration
pub mod env_config {
    use std::env;

    /// Get database URL from environment or default
    pub fn database_url() -> String {
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./data/greenloop.db".to_string())
    }

    /// Get scoring config path from environment, if set
    pub fn scoring_config_path() -> Option<String> {
        env::var("SCORING_CONFIG_PATH").ok()
    }

    /// Get log level from environment or default
    pub fn log_level() -> String {
        env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    }
}
