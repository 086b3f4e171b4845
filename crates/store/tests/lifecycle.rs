use ob_domain::{Energy, Mode, NewTask, Task, TaskPatch, TaskStatus};
use ob_store::{StartSession, Store, TaskFilter};

fn open_count(store: &Store, user: &str) -> usize {
    store
        .list_sessions(user, 100)
        .unwrap()
        .iter()
        .filter(|s| s.is_open())
        .count()
}

#[test]
fn at_most_one_open_session_per_user() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("orbit.db")).unwrap();

    for (i, mode) in [Mode::Build, Mode::Flow, Mode::Restore, Mode::Build]
        .into_iter()
        .enumerate()
    {
        store
            .start_session(
                "u1",
                StartSession {
                    mode,
                    energy: Energy::new(20 * i as u8).ok(),
                    task_id: None,
                },
            )
            .unwrap();
        assert_eq!(open_count(&store, "u1"), 1);
    }
    store
        .start_session(
            "u2",
            StartSession {
                mode: Mode::Flow,
                energy: None,
                task_id: None,
            },
        )
        .unwrap();

    assert_eq!(store.list_sessions("u1", 100).unwrap().len(), 4);
    assert_eq!(open_count(&store, "u1"), 1);
    assert_eq!(open_count(&store, "u2"), 1);

    store.end_active_session("u1", None).unwrap();
    assert_eq!(open_count(&store, "u1"), 0);
    assert_eq!(open_count(&store, "u2"), 1);
}

#[test]
fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orbit.db");

    let task = Task::new("u1", NewTask::titled("Persist me"));
    {
        let store = Store::open(&path).unwrap();
        store.upsert_user("u1", Some("u1@example.com")).unwrap();
        store.create_task(&task).unwrap();
        store
            .update_task("u1", task.id, &TaskPatch::status(TaskStatus::InProgress))
            .unwrap();
    }

    let store = Store::open(&path).unwrap();
    let tasks = store.list_tasks("u1", &TaskFilter::default()).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Persist me");
    assert_eq!(tasks[0].status, TaskStatus::InProgress);
    assert_eq!(
        store.get_user("u1").unwrap().unwrap().email.as_deref(),
        Some("u1@example.com")
    );
}

#[test]
fn newest_task_is_listed_first() {
    let store = Store::open_in_memory().unwrap();
    let mut older = Task::new("u1", NewTask::titled("older"));
    older.created_at -= chrono::Duration::hours(1);
    let newer = Task::new("u1", NewTask::titled("newer"));
    store.create_task(&older).unwrap();
    store.create_task(&newer).unwrap();

    let titles: Vec<_> = store
        .list_tasks("u1", &TaskFilter::default())
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["newer", "older"]);
}
