//! Background maintenance: expiry, renames, and ordering
//!
//! Run with: cargo test -p integration-tests --test maintenance_tests

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeZone;
use chrono_tz::America::New_York;
use integration_tests::*;
use raid_common::MaintenanceMode;
use raid_core::value_objects::schedule::localize;
use raid_core::reconcile;
use raid_core::{ChannelRef, ChatPlatform, EventRecord, EventStoreExt, GuildConfig, Snowflake};
use raid_service::services::{PlacementService, SweepReport};
use raid_service::MaintenanceScheduler;

fn new_york(y: i32, m: u32, d: u32, h: u32) -> chrono::DateTime<chrono::Utc> {
    New_York
        .with_ymd_and_hms(y, m, d, h, 0, 0)
        .unwrap()
        .with_timezone(&chrono::Utc)
}

#[tokio::test]
async fn test_sweep_deletes_expired_events() {
    let harness = Harness::configured().await;
    let old = harness.create_event("Onyxia", "Jan 1", "9 PM").await;
    let upcoming = harness.create_event("Molten Core", "Jan 6", "9 PM").await;

    // 48 hours after Jan 1 9 PM, plus one
    harness.clock.set(new_york(2024, 1, 3, 22));
    let report = PlacementService::new(&harness.ctx)
        .sweep_guild(GUILD)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.expired, 1);
    assert!(harness.platform.channel(old).is_none());
    assert!(harness.record(old).await.is_none());
    assert!(harness.platform.channel(upcoming).is_some());
    assert_eq!(
        harness.platform.channel(upcoming).unwrap().position,
        CATEGORY_POSITION + 1
    );
}

#[tokio::test]
async fn test_expiry_tolerates_a_channel_deleted_mid_sweep() {
    let harness = Harness::configured().await;
    let old = harness.create_event("Onyxia", "Jan 1", "9 PM").await;
    harness.clock.set(new_york(2024, 1, 3, 22));

    let placement = PlacementService::new(&harness.ctx);
    let config = harness.store.load::<GuildConfig>(GUILD).await.unwrap().unwrap();
    let (anchor, siblings) = placement.gather_siblings(&config).await.unwrap();
    let plan = reconcile::plan(siblings, &placement.reconcile_context(anchor));
    assert_eq!(plan.expired, vec![old]);

    // Someone removes the channel by hand before the plan runs
    harness.platform.delete_channel(old).await.unwrap();

    let report = placement.apply(&plan).await.unwrap();
    assert_eq!(report.expired, 1);
    assert!(harness.record(old).await.is_none());
}

#[tokio::test]
async fn test_sweep_marks_today_and_past_events() {
    let harness = Harness::configured().await;
    let channel = harness.create_event("Molten Core", "Jan 3", "9 PM").await;
    assert_eq!(harness.channel_names(), vec!["Jan-03-Molten-Core"]);

    harness.clock.set(new_york(2024, 1, 3, 9));
    PlacementService::new(&harness.ctx).sweep_guild(GUILD).await.unwrap();
    assert_eq!(harness.platform.channel(channel).unwrap().name, "⭐Jan-03-Molten-Core");

    harness.clock.set(new_york(2024, 1, 4, 9));
    let report = PlacementService::new(&harness.ctx)
        .sweep_guild(GUILD)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.renamed, 1);
    assert_eq!(harness.platform.channel(channel).unwrap().name, "❌Jan-03-Molten-Core");
}

#[tokio::test]
async fn test_sweep_orders_by_date_with_dateless_first() {
    let harness = Harness::configured().await;
    let record_at = |day: u32| {
        let start = localize(
            chrono::NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(21, 0, 0)
                .unwrap(),
            New_York,
        );
        EventRecord::new(format!("Day {day}"), start, CREATOR)
    };

    let general = Snowflake::new(501);
    let third = Snowflake::new(502);
    let first = Snowflake::new(503);
    harness
        .platform
        .add_channel(GUILD, ChannelRef::text(general, "general", 7, Some(CATEGORY)));
    harness
        .platform
        .add_channel(GUILD, ChannelRef::text(third, "Jan-03-Day-3", 6, Some(CATEGORY)));
    harness
        .platform
        .add_channel(GUILD, ChannelRef::text(first, "Jan-01-Day-1", 8, Some(CATEGORY)));
    harness.store.save(third, &record_at(3)).await.unwrap();
    harness.store.save(first, &record_at(1)).await.unwrap();

    PlacementService::new(&harness.ctx).sweep_guild(GUILD).await.unwrap();

    let position = |id| harness.platform.channel(id).unwrap().position;
    assert_eq!(position(general), 5);
    assert_eq!(position(first), 6);
    assert_eq!(position(third), 7);
    assert_eq!(harness.platform.channel(first).unwrap().name, "⭐Jan-01-Day-1");
}

#[tokio::test]
async fn test_settled_category_needs_no_changes() {
    let harness = Harness::configured().await;
    harness.create_event("Molten Core", "Jan 6", "9 PM").await;

    let report = PlacementService::new(&harness.ctx)
        .sweep_guild(GUILD)
        .await
        .unwrap();

    assert_eq!(report, Some(SweepReport::default()));
}

#[tokio::test]
async fn test_sweep_all_skips_unconfigured_guilds() {
    let harness = Harness::configured().await;
    harness.platform.add_guild(Snowflake::new(101), GUILD_OWNER);

    let swept = PlacementService::new(&harness.ctx).sweep_all().await.unwrap();

    assert_eq!(swept, 1);
    assert!(PlacementService::new(&harness.ctx)
        .sweep_guild(Snowflake::new(101))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_sweep_all_fails_only_when_guilds_cannot_be_listed() {
    let harness = Harness::configured().await;
    harness.platform.fail_on("guild_ids");

    assert!(PlacementService::new(&harness.ctx).sweep_all().await.is_err());
}

#[tokio::test]
async fn test_direct_scheduler_sweeps_on_start() {
    let harness = Harness::configured().await;
    let old = harness.create_event("Onyxia", "Jan 1", "9 PM").await;
    harness.clock.set(new_york(2024, 1, 5, 12));

    let scheduler = MaintenanceScheduler::new(
        Arc::clone(&harness.ctx),
        Duration::from_secs(3600),
        MaintenanceMode::Direct,
        harness.cancel.clone(),
    )
    .spawn();

    assert!(eventually(|| harness.platform.channel(old).is_none()).await);
    harness.cancel.cancel();
    scheduler.await.unwrap();
    assert!(harness.store.load::<EventRecord>(old).await.unwrap().is_none());
}

#[tokio::test]
async fn test_queued_scheduler_submits_to_the_command_queue() {
    let mut harness = Harness::configured().await;
    let old = harness.create_event("Onyxia", "Jan 1", "9 PM").await;
    harness.clock.set(new_york(2024, 1, 5, 12));

    let scheduler = MaintenanceScheduler::new(
        Arc::clone(&harness.ctx),
        Duration::from_secs(3600),
        MaintenanceMode::Queued,
        harness.cancel.clone(),
    )
    .spawn();

    assert!(eventually(|| harness.ctx.queue().submitted() == 1).await);
    assert!(harness.platform.channel(old).is_some());

    let outcomes = harness.run_queued().await;
    assert_eq!(outcomes.len(), 1);
    assert!(harness.platform.channel(old).is_none());

    harness.cancel.cancel();
    scheduler.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_sweeps_again_after_the_interval() {
    let harness = Harness::configured().await;
    let channel = harness.create_event("Onyxia", "Jan 2", "9 PM").await;
    harness.clock.set(new_york(2024, 1, 2, 9));

    let scheduler = MaintenanceScheduler::new(
        Arc::clone(&harness.ctx),
        Duration::from_secs(3600),
        MaintenanceMode::Direct,
        harness.cancel.clone(),
    )
    .spawn();

    assert!(
        eventually(|| harness
            .platform
            .channel(channel)
            .is_some_and(|c| c.name == "⭐Jan-02-Onyxia"))
        .await
    );

    harness.clock.set(new_york(2024, 1, 5, 12));
    tokio::time::advance(Duration::from_secs(3600)).await;
    assert!(eventually(|| harness.platform.channel(channel).is_none()).await);

    harness.cancel.cancel();
    scheduler.await.unwrap();
}
