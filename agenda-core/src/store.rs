//! Scheduler store: the ordered task collection and its mutation API.
//!
//! Tasks live in a binary heap min-ordered by `(priority, deadline, name)`.
//! Every mutation rewrites the durable snapshot before returning. Edits are
//! remove-then-reinsert, never in-place field mutation; removal by name drops
//! every match and rebuilds the heap in one O(n) pass.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use chrono_tz::Tz;

use crate::error::StoreError;
use crate::storage::Storage;
use crate::task::{Deadline, Task};
use crate::time::parse_deadline;

/// Orderings a snapshot can be returned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Execution order: ascending `(priority, deadline, name)`.
    Priority,
    /// Display order: ascending `(deadline, priority, name)`, undated tasks last.
    Deadline,
}

fn exec_key(t: &Task) -> (i32, Deadline, &str) {
    (t.priority, t.deadline, t.name.as_str())
}

fn display_key(t: &Task) -> (Deadline, i32, &str) {
    (t.deadline, t.priority, t.name.as_str())
}

#[derive(Debug, Clone)]
struct HeapEntry(Task);

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        exec_key(&self.0) == exec_key(&other.0)
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert so the smallest key pops first.
        exec_key(&other.0).cmp(&exec_key(&self.0))
    }
}

/// Owns the task collection. All queries return snapshots; nothing hands out
/// references into the heap.
#[derive(Debug)]
pub struct SchedulerStore {
    heap: BinaryHeap<HeapEntry>,
    storage: Storage,
    tz: Tz,
}

impl SchedulerStore {
    /// Restore from durable storage. A missing file yields an empty store; a
    /// file that cannot be decoded fails with `StoreError::CorruptState`.
    pub fn open(storage: Storage, tz: Tz) -> Result<Self, StoreError> {
        let tasks = storage.load()?;
        tracing::debug!(path = %storage.path().display(), tasks = tasks.len(), "store opened");
        Ok(Self {
            heap: tasks.into_iter().map(HeapEntry).collect(),
            storage,
            tz,
        })
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Insert a task and persist. `date`/`time` parse leniently: malformed
    /// input stores the "no deadline" sentinel rather than failing. No
    /// uniqueness check; duplicate names are legal.
    pub fn add(&mut self, priority: i32, name: &str, date: &str, time: &str) -> Result<(), StoreError> {
        let deadline = parse_deadline(date, time, self.tz)
            .map(Deadline::at)
            .unwrap_or(Deadline::NONE);
        tracing::debug!(task = name, priority, dated = !deadline.is_none(), "add task");
        self.heap.push(HeapEntry(Task {
            name: name.to_string(),
            priority,
            deadline,
        }));
        self.persist()
    }

    /// Replace every task named `old_name` with a single task built from the
    /// new values. An unknown `old_name` degrades to a plain add.
    pub fn edit(
        &mut self,
        old_name: &str,
        new_name: &str,
        priority: i32,
        date: &str,
        time: &str,
    ) -> Result<(), StoreError> {
        self.heap.retain(|e| e.0.name != old_name);
        self.add(priority, new_name, date, time)
    }

    /// Remove every task with this name and persist. An unknown name is a
    /// no-op, not an error.
    pub fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        self.heap.retain(|e| e.0.name != name);
        self.persist()
    }

    /// Pop the task that runs next: the minimum by `(priority, deadline,
    /// name)`, ties on priority going to the earlier deadline and undated
    /// tasks losing against any dated one. `Ok(None)` on an empty store.
    pub fn execute_next(&mut self) -> Result<Option<Task>, StoreError> {
        match self.heap.pop() {
            Some(HeapEntry(task)) => {
                self.persist()?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    /// Sorted snapshot of every task. Idempotent; never mutates the store.
    pub fn list(&self, order: SortOrder) -> Vec<Task> {
        let mut out: Vec<Task> = self.heap.iter().map(|e| e.0.clone()).collect();
        match order {
            SortOrder::Priority => out.sort_by(|a, b| exec_key(a).cmp(&exec_key(b))),
            SortOrder::Deadline => out.sort_by(|a, b| display_key(a).cmp(&display_key(b))),
        }
        out
    }

    /// Write the whole collection to durable storage, in execution order.
    pub fn persist(&self) -> Result<(), StoreError> {
        self.storage.save(&self.list(SortOrder::Priority))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::UTC;

    fn fresh(dir: &tempfile::TempDir) -> SchedulerStore {
        SchedulerStore::open(Storage::new(dir.path().join("tasks.json")), UTC).unwrap()
    }

    #[test]
    fn lower_priority_value_wins_regardless_of_later_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = fresh(&dir);
        store.add(1, "Write report", "31/12/2030", "23:59").unwrap();
        store.add(2, "Buy milk", "01/01/2030", "08:00").unwrap();

        let first = store.execute_next().unwrap().unwrap();
        assert_eq!(first.name, "Write report");
    }

    #[test]
    fn earlier_deadline_breaks_priority_tie_and_undated_loses() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = fresh(&dir);
        store.add(1, "later", "02/06/2030", "09:00").unwrap();
        store.add(1, "sooner", "01/06/2030", "09:00").unwrap();
        store.add(1, "undated", "", "").unwrap();

        assert_eq!(store.execute_next().unwrap().unwrap().name, "sooner");
        assert_eq!(store.execute_next().unwrap().unwrap().name, "later");
        assert_eq!(store.execute_next().unwrap().unwrap().name, "undated");
    }

    #[test]
    fn drain_is_nondecreasing_and_ends_with_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = fresh(&dir);
        store.add(3, "c", "05/05/2030", "12:00").unwrap();
        store.add(1, "a", "", "").unwrap();
        store.add(2, "b", "01/01/2031", "00:00").unwrap();
        store.add(1, "a2", "04/04/2030", "12:00").unwrap();

        let mut drained = Vec::new();
        while let Some(task) = store.execute_next().unwrap() {
            drained.push(task);
        }
        assert_eq!(drained.len(), 4);
        for pair in drained.windows(2) {
            assert!(exec_key(&pair[0]) <= exec_key(&pair[1]));
        }
        assert!(store.execute_next().unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn malformed_date_stores_sentinel_and_lists_last_by_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = fresh(&dir);
        store.add(1, "bogus", "not-a-date", "xx:yy").unwrap();
        store.add(9, "dated", "01/01/2030", "08:00").unwrap();

        let by_deadline = store.list(SortOrder::Deadline);
        assert_eq!(by_deadline[0].name, "dated");
        assert_eq!(by_deadline[1].name, "bogus");
        assert!(by_deadline[1].deadline.is_none());
    }

    #[test]
    fn list_sorts_by_priority_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = fresh(&dir);
        store.add(2, "second", "01/01/2030", "08:00").unwrap();
        store.add(1, "first", "", "").unwrap();
        store.add(3, "third", "01/01/2029", "08:00").unwrap();

        let a = store.list(SortOrder::Priority);
        let names: Vec<&str> = a.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);

        let b = store.list(SortOrder::Priority);
        assert_eq!(a, b);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn delete_unknown_name_leaves_content_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = fresh(&dir);
        store.add(1, "keep me", "01/01/2030", "08:00").unwrap();

        let before = store.list(SortOrder::Priority);
        store.delete("never existed").unwrap();
        assert_eq!(store.list(SortOrder::Priority), before);
    }

    #[test]
    fn delete_removes_every_match() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = fresh(&dir);
        store.add(1, "dup", "01/01/2030", "08:00").unwrap();
        store.add(7, "dup", "", "").unwrap();
        store.add(2, "other", "", "").unwrap();

        store.delete("dup").unwrap();
        let names: Vec<String> = store
            .list(SortOrder::Priority)
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["other"]);
    }

    #[test]
    fn edit_replaces_all_matches_with_one_task() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = fresh(&dir);
        store.add(5, "draft", "01/01/2030", "08:00").unwrap();
        store.add(6, "draft", "", "").unwrap();

        store.edit("draft", "final", 1, "02/01/2030", "09:00").unwrap();

        let tasks = store.list(SortOrder::Priority);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "final");
        assert_eq!(tasks[0].priority, 1);
    }

    #[test]
    fn edit_of_unknown_name_is_a_plain_add() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = fresh(&dir);
        store.edit("ghost", "real", 2, "", "").unwrap();

        let tasks = store.list(SortOrder::Priority);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "real");
    }

    #[test]
    fn reopen_restores_the_same_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        {
            let mut store = SchedulerStore::open(Storage::new(&path), UTC).unwrap();
            store.add(1, "Write report", "31/12/2030", "23:59").unwrap();
            store.add(2, "Buy milk", "01/01/2030", "08:00").unwrap();
            store.add(3, "undated", "", "").unwrap();
        }

        let reopened = SchedulerStore::open(Storage::new(&path), UTC).unwrap();
        let names: Vec<String> = reopened
            .list(SortOrder::Priority)
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Write report", "Buy milk", "undated"]);
    }

    #[test]
    fn duplicate_triples_are_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = fresh(&dir);
        store.add(1, "twin", "01/01/2030", "08:00").unwrap();
        store.add(1, "twin", "01/01/2030", "08:00").unwrap();
        assert_eq!(store.len(), 2);
    }
}
