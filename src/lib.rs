pub mod app;
pub mod config;
pub mod filter;
pub mod logging;
pub mod storage;
pub mod task;
pub mod todo_store;
pub mod ui;

pub use app::App;
pub use config::{Cli, Config};
pub use filter::{Filter, Stats, StatusFilter};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use task::{Clock, DraftError, Priority, SystemClock, Todo, TodoDraft, TodoPatch};
pub use todo_store::{Outcome, TodoStore, DEFAULT_SLOT};
