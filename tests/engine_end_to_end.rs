// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! End-to-end engine tests: logging activities drives scoring, progress,
//! the home summary, and the history view together.

use anyhow::Result;
use chrono::{Days, Local, NaiveDate};
use greenloop_server::config::ScoringConfig;
use greenloop_server::database::Database;
use greenloop_server::engine::{Engine, EngineError};
use greenloop_server::models::{
    ActivityType, NewActivity, NewGoal, TargetDefinition, TargetKind, User,
};
use uuid::Uuid;

async fn setup() -> Result<(Engine, Uuid)> {
    let database = Database::new("sqlite::memory:").await?;
    database.seed_default_achievements().await?;

    let user = User::new("walker@example.com".to_string(), Some("Walker".to_string()));
    database.create_user(&user).await?;

    Ok((Engine::new(database, ScoringConfig::default()), user.id))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn walk_km(km: f64, date: NaiveDate) -> NewActivity {
    NewActivity {
        activity_type: ActivityType::Walking,
        amount: km,
        unit: Some("km".to_string()),
        date: Some(date),
    }
}

#[tokio::test]
async fn test_activity_log_drives_achievement_unlock() -> Result<()> {
    let (engine, user_id) = setup().await?;

    // A tighter walking achievement next to the seeded walk_50km
    engine
        .database()
        .create_target(&TargetDefinition {
            id: "walk_10km".to_string(),
            kind: TargetKind::Achievement,
            title: "Warm-up Walker".to_string(),
            description: "Walk 10 km".to_string(),
            required: 10.0,
            unit: "km".to_string(),
            activity_filter: Some(ActivityType::Walking),
            icon: None,
            owner_user_id: None,
        })
        .await?;

    engine
        .log_activity(user_id, walk_km(4.0, today() - Days::new(2)))
        .await?;
    engine
        .log_activity(user_id, walk_km(4.0, today() - Days::new(1)))
        .await?;

    let before = engine.list_progress(user_id).await?;
    let warm_up = before
        .iter()
        .find(|p| p.definition.id == "walk_10km")
        .unwrap();
    assert_eq!(warm_up.progress, 8.0);
    assert!(warm_up.unlocked_at.is_none());

    // Third walk crosses the threshold
    engine.log_activity(user_id, walk_km(3.0, today())).await?;

    let after = engine.list_progress(user_id).await?;
    let warm_up = after
        .iter()
        .find(|p| p.definition.id == "walk_10km")
        .unwrap();
    assert_eq!(warm_up.progress, 11.0);
    assert!(warm_up.unlocked_at.is_some());

    // The seeded 50 km achievement accrued the same distance but stays locked
    let city_walker = after
        .iter()
        .find(|p| p.definition.id == "walk_50km")
        .unwrap();
    assert_eq!(city_walker.progress, 11.0);
    assert!(city_walker.unlocked_at.is_none());

    // The wildcard first_step achievement counted each log once
    let first_step = after
        .iter()
        .find(|p| p.definition.id == "first_step")
        .unwrap();
    assert_eq!(first_step.progress, 3.0);
    assert!(first_step.unlocked_at.is_some());

    Ok(())
}

#[tokio::test]
async fn test_summary_reflects_logged_activities() -> Result<()> {
    let (engine, user_id) = setup().await?;

    // 4 km walking scores 8 points (2.0 base rate), 3 km scores 6
    engine
        .log_activity(user_id, walk_km(4.0, today() - Days::new(2)))
        .await?;
    engine
        .log_activity(user_id, walk_km(4.0, today() - Days::new(1)))
        .await?;
    engine.log_activity(user_id, walk_km(3.0, today())).await?;

    let summary = engine.build_summary(user_id).await?;
    assert_eq!(summary.total_points, 22);
    assert_eq!(summary.weekly_points, 22);
    assert_eq!(summary.weekly_active_days, 3);
    assert_eq!(summary.current_streak, 3);
    assert_eq!(summary.weekly_goal_days, 5);
    // 11 km walked at 0.21 kg/km
    assert!((summary.co2_saved_kg - 2.31).abs() < 1e-9);

    Ok(())
}

#[tokio::test]
async fn test_history_shows_unlocks_and_feed() -> Result<()> {
    let (engine, user_id) = setup().await?;

    engine
        .log_activity(user_id, walk_km(2.0, today() - Days::new(1)))
        .await?;
    engine.log_activity(user_id, walk_km(2.0, today())).await?;

    let history = engine.history(user_id).await?;
    assert_eq!(history.streak_days, 2);
    assert_eq!(history.co2_trend.len(), 7);
    assert_eq!(history.calendar.len(), 30);
    assert!(history.calendar.last().unwrap().completed);

    assert_eq!(history.completed_activities.len(), 2);
    assert_eq!(history.completed_activities[0].date, today());
    assert_eq!(
        history.completed_activities[0].label,
        "Walked instead of driving"
    );

    // first_step unlocked on the first log
    assert!(history
        .achievements
        .iter()
        .any(|a| a.id == "first_step"));

    Ok(())
}

#[tokio::test]
async fn test_unit_and_date_defaults() -> Result<()> {
    let (engine, user_id) = setup().await?;

    let activity = engine
        .log_activity(
            user_id,
            NewActivity {
                activity_type: ActivityType::Walking,
                amount: 30.0,
                unit: Some("   ".to_string()),
                date: None,
            },
        )
        .await?;

    assert_eq!(activity.unit, "minutes");
    assert_eq!(activity.date, today());
    // 2.0 base rate * (30 / 10) volume
    assert_eq!(activity.points, 6);

    Ok(())
}

#[tokio::test]
async fn test_validation_and_not_found_errors() -> Result<()> {
    let (engine, user_id) = setup().await?;

    let err = engine
        .log_activity(user_id, walk_km(0.0, today()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .log_activity(Uuid::new_v4(), walk_km(1.0, today()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { entity: "user", .. }));

    let err = engine
        .create_goal(
            user_id,
            NewGoal {
                title: "Empty goal".to_string(),
                description: String::new(),
                required: 0.0,
                unit: "km".to_string(),
                activity_filter: None,
                icon: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn test_goal_lifecycle() -> Result<()> {
    let (engine, user_id) = setup().await?;

    let goal = engine
        .create_goal(
            user_id,
            NewGoal {
                title: "Bike to work".to_string(),
                description: "Cycle 20 km this month".to_string(),
                required: 20.0,
                unit: "km".to_string(),
                activity_filter: Some(ActivityType::Cycling),
                icon: Some("bicycle".to_string()),
            },
        )
        .await?;
    assert_eq!(goal.kind, TargetKind::Goal);
    assert_eq!(goal.owner_user_id, Some(user_id));

    // Logged cycling accrues toward the goal automatically
    engine
        .log_activity(
            user_id,
            NewActivity {
                activity_type: ActivityType::Cycling,
                amount: 5.0,
                unit: Some("km".to_string()),
                date: Some(today()),
            },
        )
        .await?;

    let record = engine
        .increment_goal_progress(user_id, &goal.id, 10.0)
        .await?;
    assert_eq!(record.progress, 15.0);
    assert!(record.unlocked_at.is_none());

    // Explicit set crosses the threshold and unlocks
    let record = engine.set_goal_progress(user_id, &goal.id, 20.0).await?;
    assert_eq!(record.progress, 20.0);
    let unlocked = record.unlocked_at.unwrap();

    // Setting again keeps the original unlock timestamp
    let record = engine.set_goal_progress(user_id, &goal.id, 25.0).await?;
    assert_eq!(record.unlocked_at, Some(unlocked));

    // Achievements cannot be moved through the goal endpoints
    let err = engine
        .increment_goal_progress(user_id, "walk_50km", 5.0)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .increment_goal_progress(user_id, "no_such_goal", 5.0)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { entity: "goal", .. }));

    Ok(())
}

#[tokio::test]
async fn test_recent_activities_capped_at_five() -> Result<()> {
    let (engine, user_id) = setup().await?;

    for offset in 0..8 {
        engine
            .log_activity(user_id, walk_km(1.0, today() - Days::new(offset)))
            .await?;
    }

    let recent = engine.recent_activities(user_id).await?;
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0].date, today());
    assert!(recent[0].date > recent[4].date);

    Ok(())
}
