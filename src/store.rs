//! The task store: the authoritative task list and its persisted copy.
//!
//! Every mutation builds the complete next list, writes it under one key,
//! and only then makes it the visible list. A rejected write leaves the
//! previous list in place.

use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::kv::KvStore;
use crate::task::{decode_tasks, encode_tasks, Draft, IdSequence, Task, TaskId};

/// Key the task list is stored under unless configured otherwise
pub const DEFAULT_TASKS_KEY: &str = "tasks";

/// What [`TaskStore::load`] found
#[derive(Debug)]
pub enum LoadOutcome {
    /// Nothing stored yet
    Fresh,
    /// Stored list read; `repaired` tasks had duplicate ids replaced
    Loaded { count: usize, repaired: usize },
    /// Stored list unreadable; starting empty
    Reset { reason: Error },
}

impl LoadOutcome {
    pub fn is_reset(&self) -> bool {
        matches!(self, LoadOutcome::Reset { .. })
    }
}

pub struct TaskStore<K> {
    kv: K,
    key: String,
    tasks: Vec<Task>,
    ids: IdSequence,
}

impl<K: KvStore> TaskStore<K> {
    /// Store over `kv` with an empty list; call [`load`](Self::load) to read.
    pub fn new(kv: K, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
            tasks: Vec::new(),
            ids: IdSequence::default(),
        }
    }

    /// [`new`](Self::new) followed by [`load`](Self::load).
    pub fn open(kv: K, key: impl Into<String>) -> Self {
        let mut store = Self::new(kv, key);
        store.load();
        store
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Replace the in-memory list with the stored one.
    ///
    /// Never fails: unreadable data yields an empty list and a
    /// [`LoadOutcome::Reset`].
    pub fn load(&mut self) -> LoadOutcome {
        let outcome = match self.read_stored() {
            Ok(None) => {
                debug!(key = %self.key, "no stored tasks");
                self.tasks = Vec::new();
                LoadOutcome::Fresh
            }
            Ok(Some(mut tasks)) => {
                let repaired = repair_duplicate_ids(&mut tasks);
                let count = tasks.len();
                debug!(key = %self.key, count, "loaded tasks");
                self.tasks = tasks;
                LoadOutcome::Loaded { count, repaired }
            }
            Err(reason) => {
                warn!(key = %self.key, error = %reason, "starting with an empty task list");
                self.tasks = Vec::new();
                LoadOutcome::Reset { reason }
            }
        };
        self.ids = IdSequence::after(&self.tasks);
        outcome
    }

    /// Append a new, not completed task built from `draft`.
    pub fn add(&mut self, draft: Draft) -> Result<&[Task]> {
        let id = self.ids.next_id().ok_or_else(|| {
            Error::OperationFailed("no task ids left above the largest stored id".to_string())
        })?;
        let mut next = self.tasks.clone();
        next.push(Task::from_draft(id, draft));
        self.commit(next, "add")
    }

    /// Overwrite text, category, priority and due date of task `id`.
    ///
    /// An unknown id leaves the list as it is; it is still written.
    pub fn edit(&mut self, id: TaskId, draft: Draft) -> Result<&[Task]> {
        let mut next = self.tasks.clone();
        match next.iter_mut().find(|task| task.id == id) {
            Some(task) => task.apply(&draft),
            None => debug!(%id, "edit: no such task"),
        }
        self.commit(next, "edit")
    }

    pub fn delete(&mut self, id: TaskId) -> Result<&[Task]> {
        let mut next = self.tasks.clone();
        next.retain(|task| task.id != id);
        if next.len() == self.tasks.len() {
            debug!(%id, "delete: no such task");
        }
        self.commit(next, "delete")
    }

    pub fn toggle_completion(&mut self, id: TaskId) -> Result<&[Task]> {
        let mut next = self.tasks.clone();
        match next.iter_mut().find(|task| task.id == id) {
            Some(task) => task.completed = !task.completed,
            None => debug!(%id, "toggle: no such task"),
        }
        self.commit(next, "toggle")
    }

    fn read_stored(&self) -> Result<Option<Vec<Task>>> {
        let bytes = self
            .kv
            .get(&self.key)
            .map_err(|err| Error::load_failure(&self.key, err))?;
        let Some(bytes) = bytes.filter(|bytes| !bytes.is_empty()) else {
            return Ok(None);
        };
        decode_tasks(&bytes)
            .map(Some)
            .map_err(|err| Error::load_failure(&self.key, err))
    }

    fn commit(&mut self, next: Vec<Task>, op: &'static str) -> Result<&[Task]> {
        let written = encode_tasks(&next).and_then(|bytes| self.kv.set(&self.key, &bytes));
        if let Err(err) = written {
            error!(key = %self.key, op, error = %err, "task list not saved; keeping previous list");
            return Err(Error::write_failure(&self.key, err));
        }
        info!(key = %self.key, op, count = next.len(), "saved tasks");
        self.tasks = next;
        Ok(&self.tasks)
    }
}

/// Give later duplicates fresh ids so every id is unique again.
///
/// Fresh ids come from the sequence, or from the smallest unused id once the
/// sequence is exhausted.
fn repair_duplicate_ids(tasks: &mut [Task]) -> usize {
    let mut ids = IdSequence::after(tasks);
    let mut taken: HashSet<TaskId> = tasks.iter().map(|task| task.id).collect();
    let mut seen = HashSet::with_capacity(tasks.len());
    let mut repaired = 0;
    for task in tasks.iter_mut() {
        if !seen.insert(task.id) {
            let fresh = ids
                .next_id()
                .filter(|id| !taken.contains(id))
                .unwrap_or_else(|| smallest_unused_id(&taken));
            warn!(old = %task.id, new = %fresh, "reassigned duplicate task id");
            task.id = fresh;
            taken.insert(fresh);
            seen.insert(fresh);
            repaired += 1;
        }
    }
    repaired
}

fn smallest_unused_id(taken: &HashSet<TaskId>) -> TaskId {
    let mut candidate = 0;
    while taken.contains(&TaskId(candidate)) {
        candidate += 1;
    }
    TaskId(candidate)
}
