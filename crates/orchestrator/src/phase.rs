//! Phase - Fan out a batch of tasks, join them all, aggregate failures
//!
//! A phase never short-circuits: every spawned task runs to completion even
//! when a sibling has already failed. Only the caller decides what happens
//! after a failed join (in practice: the next phase is skipped).

use std::any::Any;
use std::future::Future;

use shared::{AggregateError, TaskFailure};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error};

enum Slot<T> {
    Running {
        label: String,
        handle: JoinHandle<Result<T, TaskFailure>>,
    },
    Failed(TaskFailure),
}

/// A batch of concurrently running tasks
///
/// Tasks start as soon as they are spawned. Results and failures are
/// reported in submission order, regardless of completion order.
pub struct Phase<T> {
    name: &'static str,
    slots: Vec<Slot<T>>,
}

impl<T: Send + 'static> Phase<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slots: Vec::new(),
        }
    }

    /// Start a task on the runtime's worker threads
    ///
    /// The future must own everything it uses: capture per-task copies,
    /// never references into shared loop state.
    pub fn spawn<F>(&mut self, label: impl Into<String>, task: F)
    where
        F: Future<Output = Result<T, TaskFailure>> + Send + 'static,
    {
        self.slots.push(Slot::Running {
            label: label.into(),
            handle: tokio::spawn(task),
        });
    }

    /// Record a task that failed before it could be spawned
    pub fn record_failure(&mut self, failure: TaskFailure) {
        self.slots.push(Slot::Failed(failure));
    }

    /// Number of submitted tasks, including pre-failed ones
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Wait for every task, then combine all failures into one error
    pub async fn join(self) -> Result<Vec<T>, AggregateError> {
        let mut outputs = Vec::with_capacity(self.slots.len());
        let mut failures = Vec::new();

        for slot in self.slots {
            let outcome = match slot {
                Slot::Failed(failure) => Err(failure),
                Slot::Running { label, handle } => match handle.await {
                    Ok(result) => result,
                    Err(join_error) => Err(TaskFailure::Panicked {
                        reason: describe_join_error(join_error),
                        label,
                    }),
                },
            };

            match outcome {
                Ok(output) => outputs.push(output),
                Err(failure) => {
                    error!(
                        phase = self.name,
                        task = failure.label(),
                        error = %failure,
                        "Task failed"
                    );
                    failures.push(failure);
                }
            }
        }

        debug!(
            phase = self.name,
            succeeded = outputs.len(),
            failed = failures.len(),
            "Phase joined"
        );

        match AggregateError::new(self.name, failures) {
            Some(aggregate) => Err(aggregate),
            None => Ok(outputs),
        }
    }
}

fn describe_join_error(err: JoinError) -> String {
    if err.is_panic() {
        panic_message(err.into_panic())
    } else {
        "task was cancelled".to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{BackendError, SetupTaskError};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn setup_failure(task: &str) -> TaskFailure {
        SetupTaskError {
            task: task.to_string(),
            source: BackendError::Transport("boom".to_string()).into(),
        }
        .into()
    }

    #[tokio::test]
    async fn test_outputs_in_submission_order() {
        let mut phase = Phase::new("ordering");
        phase.spawn("slow", async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(1)
        });
        phase.spawn("fast", async { Ok(2) });

        assert_eq!(phase.len(), 2);
        assert_eq!(phase.join().await.unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_empty_phase_succeeds() {
        let phase: Phase<()> = Phase::new("empty");
        assert!(phase.is_empty());
        assert!(phase.join().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_does_not_cancel_siblings() {
        let finished = Arc::new(AtomicBool::new(false));

        let mut phase = Phase::new("no-short-circuit");
        phase.spawn("fails", async { Err(setup_failure("fails")) });
        let flag = Arc::clone(&finished);
        phase.spawn("slow", async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        let err = phase.join().await.unwrap_err();
        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(err.labels(), vec!["fails"]);
        assert_eq!(err.phase(), "no-short-circuit");
    }

    #[tokio::test]
    async fn test_all_failures_aggregated_with_recorded_ones() {
        let mut phase: Phase<()> = Phase::new("aggregate");
        phase.spawn("a", async { Err(setup_failure("a")) });
        phase.record_failure(setup_failure("b"));
        phase.spawn("c", async { Ok(()) });
        phase.spawn("d", async { Err(setup_failure("d")) });

        let err = phase.join().await.unwrap_err();
        assert_eq!(err.len(), 3);
        assert_eq!(err.labels(), vec!["a", "b", "d"]);
    }

    #[tokio::test]
    async fn test_panic_becomes_labelled_failure() {
        let mut phase: Phase<()> = Phase::new("panics");
        phase.spawn("explodes", async { panic!("kaboom") });
        phase.spawn("fine", async { Ok(()) });

        let err = phase.join().await.unwrap_err();
        assert_eq!(err.len(), 1);
        match &err.failures()[0] {
            TaskFailure::Panicked { label, reason } => {
                assert_eq!(label, "explodes");
                assert!(reason.contains("kaboom"));
            }
            other => panic!("unexpected failure: {:?}", other),
        }
    }
}
