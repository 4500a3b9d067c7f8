// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Leaderboard integration tests over a live database: window selection,
//! zero-point exclusion, and rank stability under pagination.

use anyhow::Result;
use chrono::{Days, Local, NaiveDate};
use greenloop_server::config::ScoringConfig;
use greenloop_server::database::Database;
use greenloop_server::engine::Engine;
use greenloop_server::models::{ActivityType, NewActivity, User};
use uuid::Uuid;

async fn setup() -> Result<Engine> {
    let database = Database::new("sqlite::memory:").await?;
    database.seed_default_achievements().await?;
    Ok(Engine::new(database, ScoringConfig::default()))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn add_user(engine: &Engine, email: &str) -> Result<Uuid> {
    let user = User::new(email.to_string(), None);
    engine.database().create_user(&user).await?;
    Ok(user.id)
}

async fn log_cycling(engine: &Engine, user_id: Uuid, km: f64, date: NaiveDate) -> Result<()> {
    engine
        .log_activity(
            user_id,
            NewActivity {
                activity_type: ActivityType::Cycling,
                amount: km,
                unit: Some("km".to_string()),
                date: Some(date),
            },
        )
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_week_and_all_time_windows_rank_differently() -> Result<()> {
    let engine = setup().await?;
    let alice = add_user(&engine, "alice@example.com").await?;
    let bob = add_user(&engine, "bob@example.com").await?;

    // Alice: a big ride two months ago (120 pts) plus a small one today (9 pts)
    log_cycling(&engine, alice, 40.0, today() - Days::new(60)).await?;
    log_cycling(&engine, alice, 3.0, today()).await?;
    // Bob: one ride today (30 pts)
    log_cycling(&engine, bob, 10.0, today()).await?;

    let week = engine.leaderboard("week", 10, 0).await?;
    assert_eq!(week.view, "week");
    assert_eq!(week.total, 2);
    assert_eq!(week.entries[0].user_id, bob);
    assert_eq!(week.entries[0].points, 30);
    assert_eq!(week.entries[0].rank, 1);
    assert_eq!(week.entries[1].user_id, alice);
    assert_eq!(week.entries[1].points, 9);
    assert_eq!(week.entries[1].rank, 2);

    let all_time = engine.leaderboard("all", 10, 0).await?;
    assert_eq!(all_time.view, "all");
    assert_eq!(all_time.entries[0].user_id, alice);
    assert_eq!(all_time.entries[0].points, 129);
    assert_eq!(all_time.entries[1].user_id, bob);
    assert_eq!(all_time.entries[1].points, 30);

    Ok(())
}

#[tokio::test]
async fn test_zero_point_users_are_excluded() -> Result<()> {
    let engine = setup().await?;
    let active = add_user(&engine, "active@example.com").await?;
    let _never_logged = add_user(&engine, "lurker@example.com").await?;
    let dormant = add_user(&engine, "dormant@example.com").await?;

    log_cycling(&engine, active, 5.0, today()).await?;
    // Dormant scored once, long outside the weekly window
    log_cycling(&engine, dormant, 5.0, today() - Days::new(60)).await?;

    let week = engine.leaderboard("week", 10, 0).await?;
    assert_eq!(week.total, 1);
    assert_eq!(week.entries[0].user_id, active);

    // All-time still counts the dormant user's old ride
    let all_time = engine.leaderboard("all", 10, 0).await?;
    assert_eq!(all_time.total, 2);

    Ok(())
}

#[tokio::test]
async fn test_ranks_stay_global_across_pages() -> Result<()> {
    let engine = setup().await?;

    // Five users with distinct point totals (3, 6, ..., 15 pts today)
    for i in 1..=5 {
        let user = add_user(&engine, &format!("user{i}@example.com")).await?;
        log_cycling(&engine, user, i as f64, today()).await?;
    }

    let full = engine.leaderboard("week", 10, 0).await?;
    assert_eq!(full.total, 5);

    // Page through two at a time and compare against the full ranking
    let mut paged = Vec::new();
    for offset in [0, 2, 4] {
        let page = engine.leaderboard("week", 2, offset).await?;
        assert_eq!(page.total, 5);
        paged.extend(page.entries);
    }

    assert_eq!(paged.len(), full.entries.len());
    for (from_page, from_full) in paged.iter().zip(full.entries.iter()) {
        assert_eq!(from_page.user_id, from_full.user_id);
        assert_eq!(from_page.rank, from_full.rank);
    }
    assert_eq!(paged[0].rank, 1);
    assert_eq!(paged[4].rank, 5);
    // Highest total first
    assert_eq!(paged[0].points, 15);

    Ok(())
}

#[tokio::test]
async fn test_streak_is_lifetime_even_in_windowed_views() -> Result<()> {
    let engine = setup().await?;
    let user = add_user(&engine, "steady@example.com").await?;

    // Ten consecutive days, ending today; only part of the streak overlaps
    // the weekly scoring window
    for offset in 0..10 {
        log_cycling(&engine, user, 1.0, today() - Days::new(offset)).await?;
    }

    let week = engine.leaderboard("week", 10, 0).await?;
    assert_eq!(week.entries[0].streak_days, 10);

    Ok(())
}

#[tokio::test]
async fn test_unknown_view_falls_back_to_week() -> Result<()> {
    let engine = setup().await?;
    let user = add_user(&engine, "u@example.com").await?;
    log_cycling(&engine, user, 2.0, today()).await?;

    let board = engine.leaderboard("fortnight", 10, 0).await?;
    assert_eq!(board.view, "week");
    assert_eq!(board.total, 1);

    Ok(())
}
