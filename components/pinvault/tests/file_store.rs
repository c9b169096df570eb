/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use pinvault::{
    App, MemoryClipboard, Record, RecordEntry, SelectionStage, Settings, Signal, VaultApiError,
    VaultConfig, VaultStore,
};
use std::fs;
use std::sync::Arc;
use std::thread;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_initialize_creates_file() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let config = VaultConfig::with_dir(dir.path().join("nested").join("vault"));
    let store = VaultStore::from_config(&config).unwrap();
    assert_eq!(store.path(), Some(config.path().as_path()));

    // Nothing on disk yet.
    assert!(matches!(
        store.get_settings(),
        Err(VaultApiError::StorageUnavailable { .. })
    ));

    store.initialize().unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(config.path()).unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "settings": {"pin": "0000", "web_mode": false},
            "records": [],
        })
    );

    store
        .add_record(Record::new(RecordEntry::new("Mail", "me", "pw")))
        .unwrap();
    let before = fs::read_to_string(config.path()).unwrap();
    store.initialize().unwrap();
    assert_eq!(fs::read_to_string(config.path()).unwrap(), before);
}

#[test]
fn test_hand_edited_file() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    fs::write(
        &path,
        r#"{
            "settings": {"pin": "4321", "web_mode": true},
            "records": [
                {"name": "Old", "login": "o", "password": "1", "use_time": "2020-01-01 10:00:00"},
                {"name": "New", "login": "n", "password": "2", "use_time": "2023-06-30 23:59:59"}
            ]
        }"#,
    )
    .unwrap();

    let store = VaultStore::new(&path).unwrap();
    store.initialize().unwrap();
    assert_eq!(
        store.get_settings().unwrap(),
        Settings {
            pin: "4321".into(),
            web_mode: true
        }
    );
    let records = store.get_records().unwrap();
    let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["New", "Old"]);
    assert!(records.iter().all(|r| !r.id.is_empty()));

    // The ids were written back, so a second handle sees the same ones.
    let other = VaultStore::new(&path).unwrap();
    let again = other.get_records().unwrap();
    assert_eq!(records[0].id, again[0].id);
    assert_eq!(records[1].id, again[1].id);
    assert_eq!(
        records[0].last_used.format("%Y-%m-%d %H:%M:%S").to_string(),
        "2023-06-30 23:59:59"
    );
}

const COPY_PASTED: &str = r#"{
    "settings": {"pin": "0000", "web_mode": false},
    "records": [
        {"id": "AAAAAAAAAAAA", "name": "Mail", "login": "me", "password": "p1",
         "use_time": "2023-06-30 23:59:59"},
        {"id": "AAAAAAAAAAAA", "name": "Bank", "login": "acct", "password": "p2",
         "use_time": "2020-01-01 10:00:00"}
    ]
}"#;

#[test]
fn test_repeated_ids_on_initialize() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    fs::write(&path, COPY_PASTED).unwrap();

    let store = Arc::new(VaultStore::new(&path).unwrap());
    store.initialize().unwrap();
    let records = store.get_records().unwrap();
    assert_eq!(records[0].name, "Mail");
    assert_eq!(records[0].id.as_str(), "AAAAAAAAAAAA");
    assert_ne!(records[1].id, records[0].id);
    let bank = records[1].clone();

    // Clicking and deleting Bank must act on Bank, not on the record it was copied from.
    let mut app = App::new(Arc::clone(&store), MemoryClipboard::new());
    assert_eq!(app.submit_pin("0000"), Signal::Success);
    assert_eq!(app.select(&bank.id), Signal::Success);
    assert_eq!(app.clipboard().contents(), Some("acct"));
    assert_eq!(app.stage_of(&records[0].id), SelectionStage::Unselected);

    let mut asked_about = None;
    assert_eq!(
        app.delete_selected(|r| {
            asked_about = Some(r.name.clone());
            true
        }),
        Some(Signal::Success)
    );
    assert_eq!(asked_about.as_deref(), Some("Bank"));
    let names: Vec<_> = store
        .get_records()
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, ["Mail"]);
}

#[test]
fn test_repeated_ids_after_initialize() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let store = VaultStore::new(&path).unwrap();
    store.initialize().unwrap();

    // Edited by hand while the store is open.
    fs::write(&path, COPY_PASTED).unwrap();
    let records = store.get_records().unwrap();
    assert_ne!(records[0].id, records[1].id);
    // The new id was written back, so it's stable.
    let again = store.get_records().unwrap();
    assert_eq!(records[1].id, again[1].id);
    let on_disk = fs::read_to_string(&path).unwrap();
    assert_eq!(on_disk.matches("AAAAAAAAAAAA").count(), 1);
}

#[test]
fn test_password_not_copied_when_touch_fails() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let store = Arc::new(VaultStore::new(&path).unwrap());
    store.initialize().unwrap();
    store
        .add_record(Record::new(RecordEntry::new("Mail", "me", "p1")))
        .unwrap();
    let record = store.get_records().unwrap().remove(0);

    // Reads still work, but nothing can take the write lock any more.
    let lock_path = dir.path().join("data.json.lock");
    fs::remove_file(&lock_path).unwrap();
    fs::create_dir(&lock_path).unwrap();

    let mut app = App::new(Arc::clone(&store), MemoryClipboard::new());
    assert_eq!(app.submit_pin("0000"), Signal::Success);
    assert_eq!(app.select(&record.id), Signal::Success);
    assert_eq!(app.clipboard().contents(), Some("me"));

    assert_eq!(app.select(&record.id), Signal::Failure);
    assert_eq!(app.clipboard().contents(), None);
    assert!(app.selection().is_none());
    assert_eq!(
        store.get_record(&record.id).unwrap().unwrap().last_used,
        record.last_used
    );
}

#[test]
fn test_malformed_file() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let store = VaultStore::new(&path).unwrap();

    for bad in [
        "not json at all",
        r#"{"records": []}"#,
        r#"{"settings": {"pin": "0000", "web_mode": false}, "records": [{"name": "x"}]}"#,
        r#"{"settings": {"pin": "0000", "web_mode": false},
            "records": [{"name": "x", "login": "", "password": "", "use_time": "2020-01-01"}]}"#,
    ] {
        fs::write(&path, bad).unwrap();
        assert!(
            matches!(
                store.get_records(),
                Err(VaultApiError::StorageUnavailable { .. })
            ),
            "{bad} should be rejected"
        );
        assert!(store.initialize().is_err());
        // no auto-repair
        assert_eq!(fs::read_to_string(&path).unwrap(), bad);
    }
}

#[test]
fn test_writes_leave_no_temp_files() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let store = VaultStore::new(&path).unwrap();
    store.initialize().unwrap();
    for i in 0..5 {
        store
            .add_record(Record::new(RecordEntry::new(format!("r{i}"), "", "")))
            .unwrap();
    }
    let mut names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, ["data.json", "data.json.lock"]);
}

#[test]
fn test_concurrent_handles_do_not_lose_writes() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = Arc::new(dir.path().join("data.json"));
    VaultStore::new(path.as_path()).unwrap().initialize().unwrap();

    let threads: Vec<_> = (0..4)
        .map(|t| {
            let path = Arc::clone(&path);
            thread::spawn(move || {
                // Each thread has its own handle, like separate processes would.
                let store = VaultStore::new(path.as_path()).unwrap();
                for i in 0..10 {
                    store
                        .add_record(Record::new(RecordEntry::new(format!("{t}-{i}"), "", "")))
                        .unwrap();
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    let store = VaultStore::new(path.as_path()).unwrap();
    assert_eq!(store.get_records().unwrap().len(), 40);
}

#[test]
fn test_shared_handle() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(VaultStore::new(dir.path().join("data.json")).unwrap());
    store.initialize().unwrap();
    let threads: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..5 {
                    store
                        .add_record(Record::new(RecordEntry::new(format!("{t}-{i}"), "", "")))
                        .unwrap();
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }
    assert_eq!(store.get_records().unwrap().len(), 20);
}

#[test]
fn test_invalid_path() {
    assert!(matches!(
        VaultStore::new("/"),
        Err(VaultApiError::StorageUnavailable { .. })
    ));
}
