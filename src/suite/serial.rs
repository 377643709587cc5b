//! Serial execution strategy
//!
//! Used whenever per-test hooks are registered: slots run one at a time
//! in registration order, with `before.each` and `after.each` bracketing
//! every runnable test. A failing test never stops the loop; its
//! `after.each` still runs. A failing hook does stop the run.

use std::sync::Arc;

use crate::models::{Failure, Results, SlotResult, Stats};

use super::{run_case, Hooks, Slot, SuiteError};

pub(crate) async fn run<C: Send + Sync + 'static>(
    slots: Vec<Slot<C>>,
    context: Arc<C>,
    hooks: &Hooks<C>,
) -> Result<Results, SuiteError> {
    let total = slots.len();
    let mut stats = Stats {
        total,
        ..Stats::default()
    };
    let mut slot_results = vec![SlotResult::Skipped; total];

    for (index, slot) in slots.into_iter().enumerate() {
        let case = match slot {
            Slot::Skipped => {
                stats.skipped += 1;
                continue;
            }
            Slot::Runnable(case) => case,
        };

        if let Some(hook) = &hooks.before_each {
            hook(Arc::clone(&context))
                .await
                .map_err(|source| SuiteError::Hook {
                    phase: "before.each",
                    source,
                })?;
        }

        match run_case(case.run, Arc::clone(&context)).await {
            Ok(()) => {
                slot_results[index] = SlotResult::Ok;
                stats.passed += 1;
            }
            Err(error) => {
                slot_results[index] = SlotResult::Failed(Failure::from_error(error, &case.title));
                stats.failed += 1;
            }
        }

        if let Some(hook) = &hooks.after_each {
            hook(Arc::clone(&context))
                .await
                .map_err(|source| SuiteError::Hook {
                    phase: "after.each",
                    source,
                })?;
        }
    }

    Ok(Results {
        results: slot_results,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::suite::{Suite, SuiteError};

    type Log = Mutex<Vec<String>>;

    fn record(cx: &Log, entry: impl Into<String>) {
        cx.lock().unwrap().push(entry.into());
    }

    #[tokio::test]
    async fn hooks_bracket_every_test_even_on_failure() {
        let mut subject = Suite::<Log>::new("bracketing");
        let context = subject.context();

        subject.before_each(|cx: Arc<Log>| async move {
            record(&cx, "before");
            Ok(())
        });
        subject.after_each(|cx: Arc<Log>| async move {
            record(&cx, "after");
            Ok(())
        });

        subject.test("one", |cx: Arc<Log>| async move {
            record(&cx, "one");
            Ok(())
        });
        subject.test("two", |cx: Arc<Log>| async move {
            record(&cx, "two");
            Err(anyhow::anyhow!("two goes wrong"))
        });
        subject.test("three", |cx: Arc<Log>| async move {
            record(&cx, "three");
            Ok(())
        });

        let results = subject.run().await.unwrap();

        assert_eq!(results.stats.failed, 1);
        assert_eq!(results.stats.passed, 2);

        let log = context.lock().unwrap().clone();
        assert_eq!(
            log,
            vec![
                "before", "one", "after", //
                "before", "two", "after", //
                "before", "three", "after",
            ]
        );
    }

    #[tokio::test]
    async fn skipped_slots_do_not_trigger_hooks() {
        let mut subject = Suite::<Log>::new("quiet skips");
        let context = subject.context();

        subject.before_each(|cx: Arc<Log>| async move {
            record(&cx, "before");
            Ok(())
        });
        subject.skip("left out", |_cx| async { Ok(()) });
        subject.test("runs", |cx: Arc<Log>| async move {
            record(&cx, "runs");
            Ok(())
        });

        let results = subject.run().await.unwrap();

        assert_eq!(results.stats.skipped, 1);
        assert_eq!(results.stats.passed, 1);
        assert_eq!(context.lock().unwrap().clone(), vec!["before", "runs"]);
    }

    #[tokio::test]
    async fn failing_before_each_aborts_the_run() {
        let mut subject = Suite::<Log>::new("fatal hook");
        subject.before_each(|_cx| async { Err(anyhow::anyhow!("fixture missing")) });
        subject.test("unreached", |_cx| async { Ok(()) });

        let error = subject.run().await.unwrap_err();
        let SuiteError::Hook { phase, .. } = error;
        assert_eq!(phase, "before.each");
    }

    #[tokio::test]
    async fn registering_a_per_test_hook_forces_ordering() {
        let mut subject = Suite::<Log>::new("sequenced");
        let context = subject.context();

        subject.before_each(|_cx| async { Ok(()) });

        subject.test("slow", |cx: Arc<Log>| async move {
            tokio::time::sleep(std::time::Duration::from_millis(30)).await;
            record(&cx, "slow");
            Ok(())
        });
        subject.test("fast", |cx: Arc<Log>| async move {
            record(&cx, "fast");
            Ok(())
        });

        subject.run().await.unwrap();

        // Serial order: the slow test finishes before the fast one starts.
        assert_eq!(context.lock().unwrap().clone(), vec!["slow", "fast"]);
    }
}
