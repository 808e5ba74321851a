//! Integration tests for the flat-file stores.
//!
//! Each test works in its own temporary directory, so the tests can run in
//! parallel and leave nothing behind.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::Utc;
use guildsync_store::{CSV_HEADER, DataDir, RosterCsv};
use guildsync_types::{CatacombsBracket, PlayerId, PlayerRecord, SkyblockBracket};
use uuid::Uuid;

fn record(n: u128, name: &str, handle: Option<&str>) -> PlayerRecord {
    PlayerRecord {
        id: PlayerId(Uuid::from_u128(n)),
        display_name: name.to_owned(),
        catacombs: CatacombsBracket::From30,
        skyblock: SkyblockBracket::containing(200),
        chat_handle: handle.map(ToOwned::to_owned),
    }
}

// =============================================================================
// Roster
// =============================================================================

#[tokio::test]
async fn missing_roster_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let data = DataDir::new(dir.path());
    assert!(data.roster.load().await.is_empty());
}

#[tokio::test]
async fn first_persist_without_previous_file_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let data = DataDir::new(dir.path());

    let mut csv = RosterCsv::new();
    csv.push(&record(1, "Steve", None));
    data.roster.persist(&csv).await.unwrap();

    assert!(!data.roster.backup_path().exists());
    let written = std::fs::read_to_string(data.roster.path()).unwrap();
    assert_eq!(written.lines().count(), 2);
    assert_eq!(written.lines().next(), Some(CSV_HEADER));
}

#[tokio::test]
async fn persist_backs_up_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let data = DataDir::new(dir.path());

    let mut first = RosterCsv::new();
    first.push(&record(1, "Steve", Some("steve")));
    data.roster.persist(&first).await.unwrap();

    let mut second = RosterCsv::new();
    second.push(&record(2, "Alex", None));
    data.roster.persist(&second).await.unwrap();

    let backup = std::fs::read_to_string(data.roster.backup_path()).unwrap();
    assert_eq!(backup, first.render());

    let reloaded = data.roster.load().await;
    assert_eq!(reloaded.len(), 1);
    assert!(reloaded.contains(&PlayerId(Uuid::from_u128(2))));
}

#[tokio::test]
async fn persisted_roster_reloads_identically() {
    let dir = tempfile::tempdir().unwrap();
    let data = DataDir::new(dir.path());
    let records = [record(1, "Steve", Some("steve")), record(2, "Alex", None)];

    let mut csv = RosterCsv::new();
    for r in &records {
        csv.push(r);
    }
    data.roster.persist(&csv).await.unwrap();

    let reloaded = data.roster.load().await;
    for r in &records {
        assert_eq!(reloaded.get(&r.id), Some(r));
    }
}

// =============================================================================
// Ban list
// =============================================================================

#[tokio::test]
async fn missing_ban_list_is_created_empty() {
    let dir = tempfile::tempdir().unwrap();
    let data = DataDir::new(dir.path());

    let banned = data.ban_list.load_or_init().await.unwrap();
    assert!(banned.is_empty());
    assert_eq!(std::fs::read_to_string(data.ban_list.path()).unwrap(), "[]");
}

#[tokio::test]
async fn corrupt_ban_list_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let data = DataDir::new(dir.path());
    std::fs::write(data.ban_list.path(), "[\"half").unwrap();

    let banned = data.ban_list.load_or_init().await.unwrap();
    assert!(banned.is_empty());
    assert_eq!(std::fs::read_to_string(data.ban_list.path()).unwrap(), "[\"half");
}

#[tokio::test]
async fn ban_list_reads_ids() {
    let dir = tempfile::tempdir().unwrap();
    let data = DataDir::new(dir.path());
    let id = PlayerId(Uuid::from_u128(9));
    std::fs::write(data.ban_list.path(), format!("[\"{id}\"]")).unwrap();

    let banned = data.ban_list.load_or_init().await.unwrap();
    assert!(banned.contains(&id));
}

// =============================================================================
// Change log
// =============================================================================

#[tokio::test]
async fn change_log_appends_lines() {
    let dir = tempfile::tempdir().unwrap();
    let data = DataDir::new(dir.path());

    data.change_log.append("first", Utc::now()).await.unwrap();
    data.change_log.append("second", Utc::now()).await.unwrap();

    let text = std::fs::read_to_string(data.change_log.path()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with('[') && lines[0].ends_with("] first"));
    assert!(lines[1].ends_with("] second"));
}
