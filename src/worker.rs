// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Background task plumbing for long-running operations.
//!
//! Service restarts, package upgrades and mastering runs must never block a
//! UI redraw. Each user-initiated action gets one dedicated worker thread;
//! completion comes back as a [`TaskEvent`] on a channel the UI drains every
//! event-loop tick. There is no cancellation - closing the window abandons
//! the worker, it does not stop it.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// How a background task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Task finished; payload is a human-readable summary for the UI.
    Success(String),
    /// Task failed; payload is the error text to surface in a dialog.
    Failure(String),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }

    pub fn message(&self) -> &str {
        match self {
            TaskOutcome::Success(m) => m,
            TaskOutcome::Failure(m) => m,
        }
    }
}

/// Completion notification for one submitted task.
#[derive(Debug, Clone)]
pub struct TaskEvent {
    /// Action name the task was submitted under.
    pub action: String,
    pub outcome: TaskOutcome,
}

/// Spawns worker threads and collects their completion events.
///
/// At most one task per action name may be in flight; a second submit for
/// the same action is refused, mirroring the disabled trigger button in the
/// window.
pub struct TaskRunner {
    event_tx: mpsc::Sender<TaskEvent>,
    event_rx: mpsc::Receiver<TaskEvent>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl TaskRunner {
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            event_tx,
            event_rx,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Submit a task under an action name. Returns false (and runs nothing)
    /// if a task with the same name is still in flight.
    pub fn submit<F>(&self, action: &str, task: F) -> bool
    where
        F: FnOnce() -> Result<String, String> + Send + 'static,
    {
        {
            let mut in_flight = self.in_flight.lock();
            if !in_flight.insert(action.to_string()) {
                warn!("Task '{}' is already running, refusing re-entry", action);
                return false;
            }
        }

        info!("Starting background task '{}'", action);
        let tx = self.event_tx.clone();
        let in_flight = Arc::clone(&self.in_flight);
        let action = action.to_string();

        thread::spawn(move || {
            let outcome = match task() {
                Ok(msg) => TaskOutcome::Success(msg),
                Err(msg) => TaskOutcome::Failure(msg),
            };

            in_flight.lock().remove(&action);

            // Send fails only when the runner is gone; the work is already
            // done at that point, so just note it.
            if tx.send(TaskEvent { action: action.clone(), outcome }).is_err() {
                debug!("Task '{}' finished after its runner was dropped", action);
            }
        });

        true
    }

    /// Whether a task with this action name is still running.
    pub fn is_running(&self, action: &str) -> bool {
        self.in_flight.lock().contains(action)
    }

    /// Drain all completion events received since the last poll.
    pub fn poll(&self) -> Vec<TaskEvent> {
        self.event_rx.try_iter().collect()
    }
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::new()
    }
}
