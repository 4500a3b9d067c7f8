// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Leaderboard Report Binary
//!
//! Prints one page of the community leaderboard for a scoring window.
//! Useful for eyeballing rankings against a live database without going
//! through the API layer.

use anyhow::Result;
use clap::Parser;
use greenloop_server::{
    config::ScoringConfig,
    constants::env_config,
    engine::Engine,
    database::Database,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "leaderboard-report")]
#[command(about = "Print a page of the GreenLoop community leaderboard")]
pub struct Args {
    /// Scoring window: week, month, or all
    #[arg(short, long, default_value = "week")]
    view: String,

    /// Page size
    #[arg(short, long, default_value = "50")]
    limit: i64,

    /// Offset into the full ranking
    #[arg(short, long, default_value = "0")]
    offset: i64,

    /// Database URL (SQLite file path); falls back to DATABASE_URL
    #[arg(short, long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    greenloop_server::logging::init_from_env()?;

    let args = Args::parse();

    let database_url = args
        .database_url
        .unwrap_or_else(env_config::database_url);
    info!("Connecting to database: {}", database_url);

    let database = Database::new(&database_url).await?;
    database.seed_default_achievements().await?;

    let config = ScoringConfig::load(env_config::scoring_config_path())?;
    let engine = Engine::new(database, config);

    let board = engine.leaderboard(&args.view, args.limit, args.offset).await?;

    println!(
        "🏆 Leaderboard ({}) — showing {} of {} users",
        board.view,
        board.entries.len(),
        board.total
    );
    println!(
        "{:>5}  {:<30} {:>8} {:>10} {:>8}",
        "Rank", "User", "Points", "CO₂ (kg)", "Streak"
    );

    for entry in &board.entries {
        let name = entry.display_name.as_deref().unwrap_or(&entry.email);
        println!(
            "{:>5}  {:<30} {:>8} {:>10.2} {:>8}",
            entry.rank, name, entry.points, entry.co2_saved_kg, entry.streak_days
        );
    }

    if board.entries.is_empty() {
        println!("No users scored in this window.");
    }

    Ok(())
}
