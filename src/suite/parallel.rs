//! Parallel execution strategy
//!
//! Fans every runnable slot out as its own task against the shared
//! context. Outcomes are written back by registration index, so the
//! reported order never depends on completion order, and one test's
//! failure never affects its siblings.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::models::{Failure, Results, SlotResult, Stats};

use super::{run_case, Slot};

pub(crate) async fn run<C: Send + Sync + 'static>(slots: Vec<Slot<C>>, context: Arc<C>) -> Results {
    let total = slots.len();
    let mut stats = Stats {
        total,
        ..Stats::default()
    };
    let mut slot_results = vec![SlotResult::Skipped; total];

    let mut running: Vec<(usize, String, JoinHandle<anyhow::Result<()>>)> = Vec::new();

    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Slot::Skipped => {
                stats.skipped += 1;
            }
            Slot::Runnable(case) => {
                let context = Arc::clone(&context);
                let handle = tokio::spawn(run_case(case.run, context));
                running.push((index, case.title, handle));
            }
        }
    }

    for (index, title, handle) in running {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            // run_case already contains panics; this is a defensive net
            // for an aborted task.
            Err(join_error) => {
                warn!("test task for `{title}` did not complete: {join_error}");
                Err(anyhow::anyhow!("test task did not complete: {join_error}"))
            }
        };

        match outcome {
            Ok(()) => {
                slot_results[index] = SlotResult::Ok;
                stats.passed += 1;
            }
            Err(error) => {
                slot_results[index] = SlotResult::Failed(Failure::from_error(error, &title));
                stats.failed += 1;
            }
        }
    }

    Results {
        results: slot_results,
        stats,
    }
}
