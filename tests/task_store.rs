use chrono::NaiveDate;
use todopad::kv::{FileKv, KvStore, MemoryKv};
use todopad::store::{LoadOutcome, TaskStore, DEFAULT_TASKS_KEY};
use todopad::task::{decode_tasks, Category, Draft, DueDate, Priority, TaskId};

fn due(day: u32) -> DueDate {
    DueDate::new(NaiveDate::from_ymd_opt(2024, 1, day).unwrap())
}

/// A fixed mix of operations, including some on ids that do not exist.
fn run_script<K: KvStore>(store: &mut TaskStore<K>) {
    for (idx, text) in ["alpha", "beta", "gamma", "delta"].iter().enumerate() {
        let draft = Draft::new(due(idx as u32 + 1))
            .with_text(*text)
            .with_category(if idx % 2 == 0 { Category::Work } else { Category::Personal })
            .with_priority(Priority::ALL[idx % 3]);
        store.add(draft).unwrap();
    }
    let ids: Vec<TaskId> = store.tasks().iter().map(|task| task.id).collect();

    store.toggle_completion(ids[0]).unwrap();
    store.toggle_completion(ids[2]).unwrap();
    store.toggle_completion(ids[2]).unwrap();
    store
        .edit(ids[1], Draft::new(due(20)).with_text("beta v2").with_priority(Priority::High))
        .unwrap();
    store.delete(ids[3]).unwrap();
    store.delete(TaskId(1)).unwrap();
    store.toggle_completion(TaskId(2)).unwrap();
    store.edit(TaskId(3), Draft::new(due(5))).unwrap();
}

#[test]
fn file_store_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = TaskStore::open(FileKv::new(dir.path()), DEFAULT_TASKS_KEY);
    run_script(&mut store);
    let expected = store.tasks().to_vec();

    let mut reopened = TaskStore::new(FileKv::new(dir.path()), DEFAULT_TASKS_KEY);
    match reopened.load() {
        LoadOutcome::Loaded { count, repaired } => {
            assert_eq!(count, 3);
            assert_eq!(repaired, 0);
        }
        other => panic!("unexpected load outcome: {other:?}"),
    }
    assert_eq!(reopened.tasks(), expected.as_slice());

    let texts: Vec<&str> = expected.iter().map(|task| task.text.as_str()).collect();
    assert_eq!(texts, ["alpha", "beta v2", "gamma"]);
    assert!(expected[0].completed);
    assert!(!expected[1].completed);
    assert_eq!(expected[1].priority, Priority::High);
    assert_eq!(expected[1].category, Category::Work);
    assert_eq!(expected[1].due_date.to_string(), "Sat Jan 20 2024");
    assert!(!expected[2].completed);
}

#[test]
fn memory_and_file_backends_store_the_same_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let file_kv = FileKv::new(dir.path());
    let memory_kv = MemoryKv::new();

    let mut file_store = TaskStore::open(&file_kv, DEFAULT_TASKS_KEY);
    run_script(&mut file_store);

    // Replay the exact resulting list through the memory backend.
    let bytes = file_kv.get(DEFAULT_TASKS_KEY).unwrap().unwrap();
    memory_kv.set(DEFAULT_TASKS_KEY, &bytes).unwrap();
    let memory_store = TaskStore::open(&memory_kv, DEFAULT_TASKS_KEY);

    assert_eq!(memory_store.tasks(), file_store.tasks());
    assert_eq!(decode_tasks(&bytes).unwrap(), file_store.tasks());
}

#[test]
fn stored_value_is_always_the_last_committed_list() {
    let kv = MemoryKv::new();
    let mut store = TaskStore::open(kv.clone(), "todos");
    assert!(kv.get("todos").unwrap().is_none());

    store.add(Draft::new(due(1)).with_text("one")).unwrap();
    let stored = decode_tasks(&kv.get("todos").unwrap().unwrap()).unwrap();
    assert_eq!(stored, store.tasks());

    let id = store.tasks()[0].id;
    store.toggle_completion(id).unwrap();
    let stored = decode_tasks(&kv.get("todos").unwrap().unwrap()).unwrap();
    assert_eq!(stored, store.tasks());
    assert!(stored[0].completed);

    store.delete(id).unwrap();
    assert_eq!(kv.get("todos").unwrap().unwrap(), b"[]");
    assert!(store.tasks().is_empty());
}
