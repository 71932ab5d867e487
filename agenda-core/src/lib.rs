//! agenda-core: task store, persistence, and deadline watch for the agenda CLI.

pub mod error;
pub mod handle;
pub mod storage;
pub mod store;
pub mod task;
pub mod time;
pub mod watcher;

pub use error::StoreError;
pub use handle::StoreHandle;
pub use storage::Storage;
pub use store::{SchedulerStore, SortOrder};
pub use task::{Deadline, Task};
pub use time::{DATE_TIME_FORMAT, format_deadline, parse_deadline};
pub use watcher::{DeadlineAlert, WatchPolicy, run as run_watcher, scan};
