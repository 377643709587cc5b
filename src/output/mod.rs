//! Output and reporting
//!
//! The reporting side of the framework: suite summaries, failure blocks
//! with diffs, and session stats. Also owns the suite-side emit that
//! switches between human output and the isolate protocol.

mod formatter;
mod snippet;

pub use formatter::{OutputFormat, Reporter};

use std::time::Duration;

use crate::models::{Results, SuiteMessage, ISOLATE_ENV};

/// Report one completed suite from inside a test binary.
///
/// Inside an isolated unit the results travel to the orchestrator as a
/// protocol line; in a directly-invoked binary they render as a human
/// summary with stats.
pub fn emit_suite(suite_name: &str, results: &Results, elapsed: Duration) {
    let message = SuiteMessage {
        results: results.clone(),
        suite_name: suite_name.to_string(),
    };

    if std::env::var_os(ISOLATE_ENV).is_some() {
        println!("{}", message.encode());
        return;
    }

    let reporter = if std::env::var_os("NO_COLOR").is_some() {
        Reporter::default().no_color()
    } else {
        Reporter::default()
    };
    reporter.report_suite(None, &message);
    reporter.report_stats(&message.results.stats, elapsed);
}
