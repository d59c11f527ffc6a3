use std::fs;

use chrono::{TimeZone, Utc};
use serde_json::Value;

use todo_tracker::model::{FixedClock, Priority};
use todo_tracker::session::Session;
use todo_tracker::storage::{self, FileStore, Identity, KeyValueStore, ListName};

#[test]
fn reads_lists_written_by_other_clients() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let raw = r#"[
        {"id":"1","todo":"legacy task","isCompleted":false,"dueDate":"","priority":"high",
         "category":"Work","subtasks":[{"text":"a","isCompleted":true}],"files":[],
         "createdAt":"2024-03-01T09:00:00.000Z"},
        {"id":"2","todo":"no due date","isCompleted":false,"dueDate":null,"priority":"low",
         "category":"","subtasks":[],"files":[],"createdAt":"2024-03-02T09:00:00Z"}
    ]"#;
    fs::write(dir.path().join("todos_u1.json"), raw)?;

    let store = FileStore::new(dir.path());
    let tasks = storage::load(&store, ListName::Todos, &Identity::User("u1".to_string()));
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].text, "legacy task");
    assert_eq!(tasks[0].priority, Priority::High);
    assert!(tasks[0].due_date.is_none());
    assert!(tasks[0].subtasks[0].is_completed);
    assert!(tasks[1].due_date.is_none());

    assert!(storage::load(&store, ListName::Todos, &Identity::Anonymous).is_empty());
    Ok(())
}

#[test]
fn malformed_slot_loads_empty() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("history.json"), "{not json")?;
    fs::write(dir.path().join("completed.json"), "{\"id\":\"x\"}")?;

    let session = Session::open(FileStore::new(dir.path()), Identity::Anonymous);
    assert!(session.history().is_empty());
    assert!(session.completed().is_empty());
    assert_eq!(session.progress().percent, 0.0);
    Ok(())
}

#[test]
fn saved_lists_use_wire_field_names() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
    let mut session =
        Session::open(FileStore::new(dir.path()), Identity::Anonymous).with_clock(FixedClock(now));

    session.update_draft(|draft| {
        draft.text = "wire check".to_string();
        draft.add_subtask("sub");
    })?;
    let task = session.add()?.ok_or("draft rejected")?;
    session.complete(&task.id)?;

    let raw = fs::read_to_string(dir.path().join("completed.json"))?;
    let value: Value = serde_json::from_str(&raw)?;
    let entry = &value[0];
    assert_eq!(entry["todo"], "wire check");
    assert_eq!(entry["isCompleted"], true);
    assert_eq!(entry["category"], "General");
    assert_eq!(entry["dueDate"], "");
    assert_eq!(entry["subtasks"][0]["isCompleted"], false);
    assert!(entry["files"].as_array().is_some_and(Vec::is_empty));
    assert!(entry["createdAt"].is_string());
    assert!(entry["completedAt"].is_string());

    let pending: Value = serde_json::from_str(&fs::read_to_string(dir.path().join("todos.json"))?)?;
    assert_eq!(pending, Value::Array(Vec::new()));
    Ok(())
}

#[test]
fn odd_user_ids_get_their_own_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut store = FileStore::new(dir.path());
    let slash = Identity::User("a/b".to_string());
    let dot = Identity::User("a.b".to_string());

    storage::save(&mut store, ListName::Todos, &slash, &[])?;
    store.set_item(&storage::slot_key("todos", &dot), "[]")?;

    assert!(store.path_for_key("todos_a/b").starts_with(dir.path()));
    assert_ne!(
        store.path_for_key("todos_a/b"),
        store.path_for_key("todos_a.b")
    );
    assert!(store.path_for_key("todos_a/b").exists());
    assert!(store.path_for_key("todos_a.b").exists());
    Ok(())
}
