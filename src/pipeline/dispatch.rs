// Member dispatch with per-member failure isolation
//
// Parallel mode runs every member on its own named thread. Results travel
// back over a crossbeam channel tagged with the member index and are put
// back in configured order. Members that miss the deadline are reported
// as abstentions; their threads are detached and their late results
// dropped.

use crate::evidence::Evidence;
use crate::judgment::Judgment;
use crossbeam::channel::{self, RecvTimeoutError};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// A unit of work the dispatcher can run and, failing that, abstain for
pub(crate) trait Task: Send + Sync + 'static {
    fn label(&self) -> &str;

    fn run(&self, evidence: &Evidence) -> Judgment;

    fn abstain(&self, reason: &str) -> Judgment;
}

/// Run one task, turning a panic into an abstention
pub(crate) fn run_isolated<T: Task + ?Sized>(task: &T, evidence: &Evidence) -> Judgment {
    match panic::catch_unwind(AssertUnwindSafe(|| task.run(evidence))) {
        Ok(judgment) => judgment,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(classifier = task.label(), %message, "classifier panicked");
            task.abstain(&format!("classifier panicked: {}", message))
        }
    }
}

/// Run tasks in order on the calling thread
pub(crate) fn sequential<T: Task>(tasks: &[T], evidence: &Evidence) -> Vec<Judgment> {
    tasks.iter().map(|t| run_isolated(t, evidence)).collect()
}

/// Run every task on its own thread, waiting at most `timeout` overall
pub(crate) fn parallel<T: Task>(
    pipeline: &str,
    tasks: &Arc<[T]>,
    evidence: &Evidence,
    timeout: Duration,
) -> Vec<Judgment> {
    let deadline = Instant::now() + timeout;
    let (tx, rx) = channel::bounded::<(usize, Judgment)>(tasks.len());
    let mut slots: Vec<Option<Judgment>> = (0..tasks.len()).map(|_| None).collect();
    let mut pending = 0usize;

    for index in 0..tasks.len() {
        let tx = tx.clone();
        let worker_tasks = Arc::clone(tasks);
        let worker_evidence = evidence.clone();
        let spawned = thread::Builder::new()
            .name(format!("{}-{}", pipeline, index))
            .spawn(move || {
                let judgment = run_isolated(&worker_tasks[index], &worker_evidence);
                // The receiver is gone once the deadline passed
                let _ = tx.send((index, judgment));
            });
        match spawned {
            Ok(_) => pending += 1,
            Err(e) => {
                warn!(pipeline, index, error = %e, "worker spawn failed, running inline");
                slots[index] = Some(run_isolated(&tasks[index], evidence));
            }
        }
    }
    drop(tx);

    while pending > 0 {
        match rx.recv_deadline(deadline) {
            Ok((index, judgment)) => {
                trace!(pipeline, index, "member reported");
                slots[index] = Some(judgment);
                pending -= 1;
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    slots
        .into_iter()
        .zip(tasks.iter())
        .map(|(slot, task)| {
            slot.unwrap_or_else(|| {
                warn!(
                    pipeline,
                    classifier = task.label(),
                    timeout_ms = timeout.as_millis() as u64,
                    "classifier timed out"
                );
                task.abstain(&format!("timed out after {} ms", timeout.as_millis()))
            })
        })
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
