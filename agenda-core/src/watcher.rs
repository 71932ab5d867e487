//! Deadline watcher: periodic scan that raises alerts for tasks due soon.
//!
//! The watcher is read-only with respect to the store. Once per interval it
//! takes a consistent snapshot through the shared handle and emits one alert
//! per task whose deadline falls strictly inside the warning window. Alerts
//! are at-least-once per qualifying scan: a task still inside the window on
//! the next scan fires again, with no de-duplication.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{mpsc, watch};

use crate::handle::StoreHandle;
use crate::store::SortOrder;
use crate::task::Task;

/// How often to scan and how far ahead to look.
#[derive(Debug, Clone, Copy)]
pub struct WatchPolicy {
    pub interval: std::time::Duration,
    pub window: Duration,
}

impl Default for WatchPolicy {
    fn default() -> Self {
        Self {
            interval: std::time::Duration::from_secs(60),
            window: Duration::seconds(60),
        }
    }
}

/// Notification event handed to the presentation layer, which owns all
/// rendering (print, toast, sound).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineAlert {
    pub task_name: String,
    pub message: String,
}

impl DeadlineAlert {
    fn for_task(task: &Task) -> Self {
        Self {
            task_name: task.name.clone(),
            message: format!("Task '{}' is nearing its deadline.", task.name),
        }
    }
}

/// One alert per task with `now < deadline <= now + window`. Undated tasks
/// and already-passed deadlines never qualify.
pub fn scan(tasks: &[Task], now: DateTime<Utc>, window: Duration) -> Vec<DeadlineAlert> {
    tasks
        .iter()
        .filter_map(|task| {
            let due = task.deadline.0?;
            (due > now && due - now <= window).then(|| DeadlineAlert::for_task(task))
        })
        .collect()
}

/// Polling loop. Runs until the stop signal flips true, its sender is
/// dropped, or the alert receiver goes away.
pub async fn run(
    store: StoreHandle,
    policy: WatchPolicy,
    events: mpsc::UnboundedSender<DeadlineAlert>,
    mut stop: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(policy.interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = store.list_tasks(SortOrder::Deadline);
                let alerts = scan(&snapshot, Utc::now(), policy.window);
                tracing::debug!(tasks = snapshot.len(), due = alerts.len(), "deadline scan");
                for alert in alerts {
                    if events.send(alert).is_err() {
                        tracing::warn!("alert receiver dropped, stopping watcher");
                        return;
                    }
                }
            }
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow_and_update() {
                    break;
                }
            }
        }
    }
}
