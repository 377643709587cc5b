//! Isolate orchestrator
//!
//! Executes N test files as isolated units with a concurrency ceiling,
//! folds every suite-completion message into a running global total, and
//! hands the grand total to the reporter with the elapsed wall-clock
//! time. A unit that dies abnormally contributes whatever it already
//! reported; the run continues for the remaining files.

mod isolate;

pub use isolate::{ProcessSpawner, Spawner, UnitError, UnitHandle};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::models::Stats;
use crate::output::Reporter;
use crate::utils::Timer;

/// Outcome of a whole session across every file.
#[derive(Debug)]
pub struct RunSummary {
    pub stats: Stats,
    /// Files whose unit failed to launch or exited abnormally. Their
    /// partial stats are kept; the crash itself is tracked here rather
    /// than faked as test failures.
    pub files_errored: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.stats.failed == 0 && self.files_errored == 0
    }
}

pub struct Runner {
    concurrency: usize,
    spawner: Arc<dyn Spawner>,
    reporter: Reporter,
}

impl Runner {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            spawner: Arc::new(ProcessSpawner),
            reporter: Reporter::default(),
        }
    }

    /// Logical core count, the default ceiling.
    pub fn default_concurrency() -> usize {
        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
    }

    pub fn with_spawner(mut self, spawner: Arc<dyn Spawner>) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Run every file, at most `concurrency` units alive at once, and
    /// report the grand total.
    pub async fn exec(&self, files: &[PathBuf]) -> RunSummary {
        info!(
            "running {} test files (max {} concurrent)",
            files.len(),
            self.concurrency
        );

        let timer = Timer::start("session");
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::new();

        for file in files {
            let semaphore = Arc::clone(&semaphore);
            let spawner = Arc::clone(&self.spawner);
            let reporter = self.reporter.clone();
            let file = file.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.unwrap();
                run_file(spawner.as_ref(), &file, &reporter).await
            }));
        }

        let mut stats = Stats::default();
        let mut files_errored = 0;

        for outcome in join_all(handles).await {
            match outcome {
                Ok((file_stats, errored)) => {
                    stats.merge(&file_stats);
                    if errored {
                        files_errored += 1;
                    }
                }
                Err(join_error) => {
                    error!("file task did not complete: {join_error}");
                    files_errored += 1;
                }
            }
        }

        let summary = RunSummary {
            stats,
            files_errored,
            elapsed: timer.elapsed(),
        };
        self.reporter
            .report_run(&summary.stats, summary.files_errored, summary.elapsed);
        summary
    }
}

// Drains the unit's message stream, folding stats and forwarding each
// suite to the reporter, then waits for the exit signal.
async fn run_file(spawner: &dyn Spawner, file: &Path, reporter: &Reporter) -> (Stats, bool) {
    let mut stats = Stats::default();

    let mut unit = match spawner.spawn(file) {
        Ok(unit) => unit,
        Err(launch_error) => {
            error!("{launch_error}");
            return (stats, true);
        }
    };

    while let Some(message) = unit.messages.recv().await {
        stats.merge(&message.results.stats);
        reporter.report_suite(Some(file), &message);
    }

    match unit.exit.await {
        Ok(Ok(())) => (stats, false),
        Ok(Err(unit_error)) => {
            error!("{unit_error}");
            (stats, true)
        }
        Err(_) => {
            error!(
                "isolated unit for {} vanished without an exit signal",
                file.display()
            );
            (stats, true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::{mpsc, oneshot};

    use crate::models::{Results, SlotResult, SuiteMessage};
    use crate::output::{OutputFormat, Reporter};

    // In-process stand-in for a subprocess: emits canned stats after a
    // short delay and tracks how many units are alive at once.
    struct StubSpawner {
        delay: Duration,
        active: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
        crash_on: Option<&'static str>,
    }

    impl StubSpawner {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                active: Arc::new(AtomicUsize::new(0)),
                peak: Arc::new(AtomicUsize::new(0)),
                crash_on: None,
            }
        }

        fn crash_on(mut self, name: &'static str) -> Self {
            self.crash_on = Some(name);
            self
        }
    }

    fn stats_for(file: &Path) -> Stats {
        match file.to_str().unwrap_or_default() {
            "first" => Stats {
                total: 4,
                passed: 3,
                failed: 1,
                skipped: 0,
            },
            "second" => Stats {
                total: 2,
                passed: 2,
                failed: 0,
                skipped: 0,
            },
            _ => Stats {
                total: 1,
                passed: 1,
                failed: 0,
                skipped: 0,
            },
        }
    }

    impl Spawner for StubSpawner {
        fn spawn(&self, file: &Path) -> Result<UnitHandle, UnitError> {
            let (message_tx, messages) = mpsc::channel(4);
            let (exit_tx, exit) = oneshot::channel();

            let stats = stats_for(file);
            let delay = self.delay;
            let active = Arc::clone(&self.active);
            let peak = Arc::clone(&self.peak);
            let crashes = self.crash_on == file.to_str();
            let file = file.to_path_buf();

            tokio::spawn(async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);

                tokio::time::sleep(delay).await;

                let results: Vec<SlotResult> =
                    std::iter::repeat(SlotResult::Ok).take(stats.total).collect();
                let _ = message_tx
                    .send(SuiteMessage {
                        results: Results { results, stats },
                        suite_name: file.display().to_string(),
                    })
                    .await;
                drop(message_tx);

                active.fetch_sub(1, Ordering::SeqCst);
                let _ = exit_tx.send(if crashes {
                    Err(UnitError::Crashed {
                        file,
                        status: "signal: 11".to_string(),
                    })
                } else {
                    Ok(())
                });
            });

            Ok(UnitHandle { messages, exit })
        }
    }

    fn quiet_reporter() -> Reporter {
        Reporter::new(OutputFormat::Text).no_color()
    }

    #[tokio::test]
    async fn stats_sum_across_files() {
        let runner = Runner::new(4)
            .with_spawner(Arc::new(StubSpawner::new(Duration::from_millis(5))))
            .with_reporter(quiet_reporter());

        let summary = runner
            .exec(&[PathBuf::from("first"), PathBuf::from("second")])
            .await;

        assert_eq!(
            summary.stats,
            Stats {
                total: 6,
                passed: 5,
                failed: 1,
                skipped: 0,
            }
        );
        assert_eq!(summary.files_errored, 0);
        assert!(!summary.is_success()); // one failed test
    }

    #[tokio::test]
    async fn concurrency_ceiling_is_respected() {
        let spawner = StubSpawner::new(Duration::from_millis(40));
        let peak = Arc::clone(&spawner.peak);

        let runner = Runner::new(2)
            .with_spawner(Arc::new(spawner))
            .with_reporter(quiet_reporter());

        let files: Vec<PathBuf> = (0..5).map(|n| PathBuf::from(format!("file{n}"))).collect();
        let summary = runner.exec(&files).await;

        assert_eq!(summary.stats.total, 5);
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn crashed_units_keep_partial_stats_and_fail_the_run() {
        let spawner = StubSpawner::new(Duration::from_millis(5)).crash_on("second");
        let runner = Runner::new(2)
            .with_spawner(Arc::new(spawner))
            .with_reporter(quiet_reporter());

        let summary = runner
            .exec(&[PathBuf::from("second"), PathBuf::from("third")])
            .await;

        // The crashed file's already-reported stats still count.
        assert_eq!(summary.stats.total, 3);
        assert_eq!(summary.files_errored, 1);
        assert!(!summary.is_success());
    }

    #[tokio::test]
    async fn empty_file_list_is_a_clean_run() {
        let runner = Runner::new(2)
            .with_spawner(Arc::new(StubSpawner::new(Duration::ZERO)))
            .with_reporter(quiet_reporter());

        let summary = runner.exec(&[]).await;

        assert_eq!(summary.stats, Stats::default());
        assert!(summary.is_success());
    }
}
