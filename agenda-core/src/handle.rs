//! Shared store handle: the command surface the front end calls.
//!
//! One `SchedulerStore` sits behind a single reader-writer lock. Mutations
//! (add, edit, delete, execute-next) take the write lock, so the heap is
//! never observed mid-rebuild; snapshots take the read lock and may run
//! concurrently with each other, including the watcher's scans.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::StoreError;
use crate::store::{SchedulerStore, SortOrder};
use crate::task::Task;

#[derive(Debug, Clone)]
pub struct StoreHandle {
    inner: Arc<RwLock<SchedulerStore>>,
}

impl StoreHandle {
    pub fn new(store: SchedulerStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn add_task(&self, priority: i32, name: &str, date: &str, time: &str) -> Result<(), StoreError> {
        self.write().add(priority, name, date, time)
    }

    pub fn edit_task(
        &self,
        old_name: &str,
        new_name: &str,
        priority: i32,
        date: &str,
        time: &str,
    ) -> Result<(), StoreError> {
        self.write().edit(old_name, new_name, priority, date, time)
    }

    pub fn delete_task(&self, name: &str) -> Result<(), StoreError> {
        self.write().delete(name)
    }

    pub fn execute_next(&self) -> Result<Option<Task>, StoreError> {
        self.write().execute_next()
    }

    pub fn list_tasks(&self, order: SortOrder) -> Vec<Task> {
        self.read().list(order)
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Every mutation leaves the heap structurally valid, so a caller that
    // panicked while holding the lock has not stranded a half-rebuilt
    // structure; recover the guard instead of propagating the poison.
    fn read(&self) -> RwLockReadGuard<'_, SchedulerStore> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SchedulerStore> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
