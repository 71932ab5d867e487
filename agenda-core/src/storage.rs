//! Durable task storage: a whole-file JSON snapshot.
//!
//! The file is an ordered array of `{priority, deadline, name}` records with
//! no other metadata. Every mutating store operation rewrites the entire
//! file; there is no diffing and no transaction log.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StoreError;
use crate::task::{Deadline, Task};

/// One persisted task. `deadline` is floating-point seconds since the Unix
/// epoch; `null` is the "no deadline" sentinel.
#[derive(Debug, Serialize, Deserialize)]
struct TaskRecord {
    priority: i32,
    #[serde(deserialize_with = "nullable_seconds")]
    deadline: Option<f64>,
    name: String,
}

// With a plain `Option` field serde accepts an absent key as `None`; routing
// through `deserialize_with` makes the key itself required, so a record
// missing `deadline` is rejected like one missing `priority` or `name`.
fn nullable_seconds<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(de)
}

impl TaskRecord {
    fn from_task(task: &Task) -> Self {
        Self {
            priority: task.priority,
            deadline: task
                .deadline
                .0
                .map(|dt| dt.timestamp_millis() as f64 / 1000.0),
            name: task.name.clone(),
        }
    }
}

fn decode_deadline(seconds: Option<f64>) -> Result<Deadline, String> {
    match seconds {
        None => Ok(Deadline::NONE),
        Some(s) if !s.is_finite() => Err(format!("non-finite deadline {s}")),
        Some(s) => DateTime::from_timestamp_millis((s * 1000.0).round() as i64)
            .map(Deadline::at)
            .ok_or_else(|| format!("deadline {s} out of range")),
    }
}

/// Handle to the snapshot file.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every task from the snapshot file.
    ///
    /// An absent file is an empty store. A file that exists but cannot be
    /// decoded fails with `StoreError::CorruptState`.
    pub fn load(&self) -> Result<Vec<Task>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        let records: Vec<TaskRecord> =
            serde_json::from_str(&raw).map_err(|e| self.corrupt(e.to_string()))?;

        records
            .into_iter()
            .map(|r| {
                let deadline = decode_deadline(r.deadline).map_err(|reason| self.corrupt(reason))?;
                Ok(Task {
                    name: r.name,
                    priority: r.priority,
                    deadline,
                })
            })
            .collect()
    }

    /// Write the full snapshot. The data goes to a sibling temp file first;
    /// the rename is the commit point, so a crash mid-write leaves the
    /// previous snapshot intact.
    pub fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let records: Vec<TaskRecord> = tasks.iter().map(TaskRecord::from_task).collect();
        let json = serde_json::to_string(&records).map_err(|e| StoreError::Write {
            path: self.path.clone(),
            source: std::io::Error::other(e),
        })?;

        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(|e| StoreError::Write {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::Write {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %self.path.display(), tasks = tasks.len(), "snapshot written");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut os = self.path.as_os_str().to_owned();
        os.push(".tmp");
        PathBuf::from(os)
    }

    fn corrupt(&self, reason: String) -> StoreError {
        StoreError::CorruptState {
            path: self.path.clone(),
            reason,
        }
    }
}
