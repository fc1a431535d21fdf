//! Integration tests for the score ledger.

use bjorli_ledger::{
    Game, Ledger, LedgerConfig, MonthDate, Snapshot, SnapshotDraft, Timestamp,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn config(dir: &TempDir) -> LedgerConfig {
    LedgerConfig {
        data_root: dir.path().to_path_buf(),
        create_if_missing: true,
    }
}

fn open(dir: &TempDir) -> Ledger {
    init_tracing();
    Ledger::open(config(dir)).unwrap()
}

fn month(s: &str) -> MonthDate {
    MonthDate::parse(s).unwrap()
}

fn write_file(dir: &Path, name: &str, text: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), text).unwrap();
}

fn session(date: &str, kubb: i64) -> Snapshot {
    Snapshot {
        date: month(date),
        locked: false,
        games: vec![
            Game::new("Kubb").with_score("alice", kubb).with_score("bob", 2),
            Game::new("Darts").with_score("alice", 7).with_score("bob", 3),
        ],
        players: vec!["alice".into(), "bob".into()],
    }
}

// --- Startup Load ---

#[test]
fn test_startup_loads_locked_history_and_newest_editable() {
    let dir = TempDir::new().unwrap();
    let locked = dir.path().join("locked");
    write_file(&locked, "2024_01_100.csv", "Player,Kubb\nalice,1\n");
    write_file(&locked, "2024_02_200.csv", "Player,Kubb\nalice,2\n");
    write_file(dir.path(), "2024_03_300.csv", "Player,Kubb\nalice,3\n");
    write_file(dir.path(), "2024_03_400.csv", "Player,Kubb,Darts\nalice,4,1\nbob,5,2\n");

    let ledger = open(&dir);

    let jan = ledger.read(&month("2024-01")).unwrap();
    assert!(jan.locked);
    assert_eq!(jan.score("alice", "Kubb"), Some(1));

    let mar = ledger.read(&month("2024-03")).unwrap();
    assert!(!mar.locked);
    assert_eq!(mar.players, vec!["alice", "bob"]);
    assert_eq!(mar.score("bob", "Darts"), Some(2));

    // Only the newest editable version is loaded.
    assert_eq!(ledger.history(&month("2024-03")).len(), 1);
    assert_eq!(ledger.history(&month("2024-03"))[0].timestamp, Timestamp(400));

    assert_eq!(ledger.latest_date(), Some(month("2024-03")));
    assert_eq!(ledger.len(), 3);

    let report = ledger.load_report();
    assert_eq!(report.locked_loaded, 2);
    assert_eq!(report.editable, Some(dir.path().join("2024_03_400.csv")));
    assert!(report.skipped.is_empty());
}

#[test]
fn test_startup_with_no_editable_file() {
    let dir = TempDir::new().unwrap();
    write_file(&dir.path().join("locked"), "2024_01_100.csv", "Player,Kubb\nalice,1\n");

    let ledger = open(&dir);

    assert!(ledger.load_report().editable.is_none());
    assert_eq!(ledger.read_all_dates(), vec![month("2024-01")]);
}

#[test]
fn test_locked_history_loads_in_timestamp_order() {
    let dir = TempDir::new().unwrap();
    let locked = dir.path().join("locked");
    // Name order and stamp order disagree.
    write_file(&locked, "2024_05_90.csv", "Player,Kubb\nalice,9\n");
    write_file(&locked, "2024_05_100.csv", "Player,Kubb\nalice,10\n");
    write_file(&locked, "2024_04_95.csv", "Player,Kubb\nalice,4\n");

    let ledger = open(&dir);

    let stamps: Vec<u64> = ledger
        .history(&month("2024-05"))
        .iter()
        .map(|e| e.timestamp.0)
        .collect();
    assert_eq!(stamps, vec![90, 100]);

    // The newest locked file of a month is what reads return.
    let may = ledger.read(&month("2024-05")).unwrap();
    assert_eq!(may.score("alice", "Kubb"), Some(10));
    assert_eq!(ledger.latest_date(), Some(month("2024-05")));
}

#[test]
fn test_editable_file_for_locked_month_is_not_loaded() {
    let dir = TempDir::new().unwrap();
    write_file(&dir.path().join("locked"), "2024_06_100.csv", "Player,Kubb\nalice,1\n");
    write_file(dir.path(), "2024_06_200.csv", "Player,Kubb\nalice,99\n");

    let ledger = open(&dir);

    let june = ledger.read(&month("2024-06")).unwrap();
    assert!(june.locked);
    assert_eq!(june.score("alice", "Kubb"), Some(1));
    assert!(ledger.load_report().editable.is_none());
    assert_eq!(ledger.load_report().skipped.len(), 1);
}

// --- Read ---

#[test]
fn test_empty_ledger_read() {
    let dir = TempDir::new().unwrap();
    let ledger = open(&dir);

    let date = month("2099-01");
    assert!(ledger.read(&date).is_none());

    let empty = ledger.read_or_empty(&date);
    assert_eq!(empty.date, date);
    assert!(!empty.locked);
    assert!(empty.is_empty());

    assert!(ledger.read_all_dates().is_empty());
    assert!(ledger.history(&date).is_empty());
}

#[test]
fn test_read_all_dates_newest_first() {
    let dir = TempDir::new().unwrap();
    let ledger = open(&dir);

    ledger.write(session("2024-02", 1)).unwrap();
    ledger.write(session("2023-11", 1)).unwrap();
    ledger.write(session("2024-02", 2)).unwrap();
    ledger.write(session("2024-01", 1)).unwrap();

    assert_eq!(
        ledger.read_all_dates(),
        vec![month("2024-02"), month("2024-01"), month("2023-11")]
    );
    assert_eq!(ledger.latest_date(), Some(month("2024-01")));
}

// --- Write ---

#[test]
fn test_multi_write_last_wins_history_kept() {
    let dir = TempDir::new().unwrap();
    let ledger = open(&dir);
    let date = month("2024-01");

    let a = session("2024-01", 1);
    let b = session("2024-01", 2);
    ledger.write(a.clone()).unwrap();
    ledger.write(b.clone()).unwrap();

    assert_eq!(ledger.read(&date), Some(b.clone()));

    let history = ledger.history(&date);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].snapshot, a);
    assert_eq!(history[1].snapshot, b);
}

#[test]
fn test_write_missing_scores_export_as_zero() {
    let dir = TempDir::new().unwrap();
    let ledger = open(&dir);

    let mut snapshot = session("2024-01", 3);
    snapshot.games[1].scores.remove("bob");
    let entry = ledger.write(snapshot).unwrap();
    assert_eq!(
        fs::read_to_string(&entry.path).unwrap(),
        "Player,Kubb,Darts\nalice,3,7\nbob,2,0\n"
    );
}

#[test]
fn test_lock_enforcement() {
    let dir = TempDir::new().unwrap();
    let ledger = open(&dir);
    let date = month("2024-03");

    ledger.write(session("2024-03", 1)).unwrap();
    let mut final_state = session("2024-03", 5);
    final_state.locked = true;
    ledger.write(final_state.clone()).unwrap();

    let before = ledger.history(&date);

    let result = ledger.write(session("2024-03", 9));
    assert!(matches!(result, Err(bjorli_ledger::LedgerError::LockedGame(d)) if d == date));

    let after = ledger.history(&date);
    assert_eq!(after.len(), before.len());
    assert_eq!(after.last(), before.last());
    assert_eq!(ledger.read(&date), Some(final_state));

    // Other months are unaffected.
    ledger.write(session("2024-04", 1)).unwrap();
}

// --- Restart ---

#[test]
fn test_restart_restores_latest_write() {
    let dir = TempDir::new().unwrap();
    {
        let ledger = open(&dir);
        ledger.write(session("2024-01", 1)).unwrap();
        ledger.write(session("2024-01", 2)).unwrap();
    }

    let ledger = open(&dir);
    let read = ledger.read(&month("2024-01")).unwrap();
    assert_eq!(read, session("2024-01", 2));
}

#[test]
fn test_lock_survives_restart() {
    let dir = TempDir::new().unwrap();
    {
        let ledger = open(&dir);
        ledger.write(session("2024-02", 1)).unwrap();
        let mut locked = session("2024-02", 4);
        locked.locked = true;
        ledger.write(locked).unwrap();
    }

    let ledger = open(&dir);
    let date = month("2024-02");
    assert!(ledger.is_locked(&date));
    assert_eq!(ledger.read(&date).unwrap().score("alice", "Kubb"), Some(4));
    assert!(ledger.write(session("2024-02", 7)).is_err());
}

#[test]
fn test_restart_after_writes_to_several_months() {
    let dir = TempDir::new().unwrap();
    {
        let ledger = open(&dir);
        ledger.write(session("2024-01", 1)).unwrap();
        ledger.write(session("2024-02", 1)).unwrap();
    }

    // Only the newest editable file comes back.
    let ledger = open(&dir);
    assert!(ledger.read(&month("2024-01")).is_none());
    assert!(ledger.read(&month("2024-02")).is_some());
}

#[test]
fn test_restart_picks_last_write_after_quick_edits_to_another_month() {
    let dir = TempDir::new().unwrap();
    let feb = {
        let ledger = open(&dir);
        for kubb in 1..=3 {
            ledger.write(session("2024-01", kubb)).unwrap();
        }
        let feb = ledger.write(session("2024-02", 4)).unwrap();
        let jan = ledger.history(&month("2024-01"));
        assert!(jan.iter().all(|e| e.timestamp < feb.timestamp));
        feb
    };

    let ledger = open(&dir);
    assert_eq!(ledger.load_report().editable, Some(feb.path));
    assert_eq!(ledger.latest_date(), Some(month("2024-02")));
    assert_eq!(ledger.read(&month("2024-02")), Some(session("2024-02", 4)));
    assert!(ledger.read(&month("2024-01")).is_none());
}

// --- Boundary ---

#[test]
fn test_request_layer_workflow() {
    let dir = TempDir::new().unwrap();
    let ledger = open(&dir);

    let snapshot = SnapshotDraft::from_json(
        r#"{
            "date": "2024-07",
            "locked": false,
            "games": [
                {"name": "Kubb", "scores": {"alice": 3, "bob": 1}},
                {"name": "Mølkky", "scores": {"alice": 50}}
            ],
            "players": ["alice", "bob"]
        }"#,
    )
    .unwrap();
    ledger.write(snapshot).unwrap();

    let date = month("2024-07");
    assert_eq!(
        ledger.export_csv(&date).unwrap(),
        "Player,Kubb,Mølkky\nalice,3,50\nbob,1,0\n"
    );

    let json = serde_json::to_value(ledger.read_or_empty(&date)).unwrap();
    assert_eq!(json["date"], "2024-07");
    assert_eq!(json["games"][1]["name"], "Mølkky");
}

#[test]
fn test_edit_round_trips_through_draft() {
    let dir = TempDir::new().unwrap();
    let ledger = open(&dir);
    let date = month("2024-09");
    ledger.write(session("2024-09", 1)).unwrap();

    // A client fetches the month, edits it, and sends it back as JSON.
    let mut draft = SnapshotDraft::from(&ledger.read(&date).unwrap());
    draft.games[1].scores.insert("bob".into(), 6);
    draft.locked = true;
    let json = serde_json::to_string(&draft).unwrap();

    ledger.write(SnapshotDraft::from_json(&json).unwrap()).unwrap();

    let read = ledger.read(&date).unwrap();
    assert!(read.locked);
    assert_eq!(read.score("bob", "Darts"), Some(6));
    assert_eq!(read.score("alice", "Kubb"), Some(1));
    assert_eq!(ledger.history(&date).len(), 2);
}
