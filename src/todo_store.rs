use tracing::{debug, error, warn};

use crate::storage::{KeyValueStore, StorageError};
use crate::task::{Clock, SystemClock, Todo, TodoPatch};

/// Slot the list lives under unless configured otherwise.
pub const DEFAULT_SLOT: &str = "todos";

/// What a persistence call did.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The mutation was applied and the list written.
    Saved,
    /// No record had the requested id; the unchanged list was written back.
    NoMatch,
    /// `add` was given an id already in the list; nothing was written.
    DuplicateId,
    /// The backend refused the write. The failure has been logged.
    WriteFailed,
}

impl Outcome {
    pub fn is_saved(self) -> bool {
        self == Outcome::Saved
    }
}

/// Whole-list persistence for todos kept in a single key-value slot.
///
/// Every call re-reads the slot and every mutation rewrites it entirely;
/// nothing is cached between calls. No call panics or returns an error:
/// unreadable data loads as an empty list and write failures come back as
/// [`Outcome::WriteFailed`].
pub struct TodoStore<S, C = SystemClock> {
    backend: S,
    clock: C,
    slot: String,
}

impl<S: KeyValueStore> TodoStore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_clock(backend, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> TodoStore<S, C> {
    pub fn with_clock(backend: S, clock: C) -> Self {
        Self {
            backend,
            clock,
            slot: DEFAULT_SLOT.to_string(),
        }
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = slot.into();
        self
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    pub fn load(&self) -> Vec<Todo> {
        let data = match self.backend.get(&self.slot) {
            Ok(Some(data)) => data,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(slot = %self.slot, error = %err, "failed to read todo list");
                return Vec::new();
            }
        };
        if data.trim().is_empty() {
            return Vec::new();
        }

        serde_json::from_str(&data).unwrap_or_else(|err| {
            warn!(slot = %self.slot, error = %err, "discarding unreadable todo list");
            Vec::new()
        })
    }

    /// Replaces the stored list. No validation is done here.
    pub fn save(&self, todos: &[Todo]) -> Outcome {
        let written = serde_json::to_string(todos)
            .map_err(StorageError::from)
            .and_then(|json| self.backend.set(&self.slot, &json));

        match written {
            Ok(()) => {
                debug!(slot = %self.slot, count = todos.len(), "saved todo list");
                Outcome::Saved
            }
            Err(err) => {
                error!(slot = %self.slot, error = %err, "failed to save todo list");
                Outcome::WriteFailed
            }
        }
    }

    pub fn add(&self, todo: Todo) -> Outcome {
        let mut todos = self.load();
        if todos.iter().any(|t| t.id == todo.id) {
            warn!(id = %todo.id, "refusing to add todo with duplicate id");
            return Outcome::DuplicateId;
        }
        todos.push(todo);
        self.save(&todos)
    }

    pub fn update(&self, id: &str, patch: &TodoPatch) -> Outcome {
        let now = self.clock.now();
        self.modify(id, |todo| {
            patch.apply_to(todo);
            todo.touch(now);
        })
    }

    pub fn delete(&self, id: &str) -> Outcome {
        let mut todos = self.load();
        let before = todos.len();
        todos.retain(|t| t.id != id);
        let matched = todos.len() != before;
        self.finish(todos, matched)
    }

    pub fn toggle(&self, id: &str) -> Outcome {
        let now = self.clock.now();
        self.modify(id, |todo| {
            todo.completed = !todo.completed;
            todo.touch(now);
        })
    }

    fn modify(&self, id: &str, mut change: impl FnMut(&mut Todo)) -> Outcome {
        let mut todos = self.load();
        let mut matched = false;
        for todo in todos.iter_mut().filter(|t| t.id == id) {
            change(todo);
            matched = true;
        }
        self.finish(todos, matched)
    }

    fn finish(&self, todos: Vec<Todo>, matched: bool) -> Outcome {
        match self.save(&todos) {
            Outcome::Saved if !matched => Outcome::NoMatch,
            outcome => outcome,
        }
    }
}
