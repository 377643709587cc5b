//! # attest
//!
//! A concurrent test-execution framework: suites of async test functions
//! with lifecycle hooks, assertion primitives that report failures as
//! structured diffs, and an orchestrator that runs whole test files as
//! isolated units with bounded concurrency.
//!
//! A test file is an ordinary binary linking this crate:
//!
//! ```no_run
//! use attest::{assert, suite};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut math = suite("math");
//!
//!     math.test("addition", |_cx| async {
//!         assert::is(2 + 2, 4, None)?;
//!         Ok(())
//!     });
//!     math.test("structures", |_cx| async {
//!         assert::equal(vec![1, 2, 3], vec![1, 2, 3], None)?;
//!         Ok(())
//!     });
//!
//!     math.exec().await?;
//!     Ok(())
//! }
//! ```
//!
//! Run directly, the binary prints a human-readable report. Run under
//! the `attest` CLI, it becomes an isolated unit whose results stream
//! back to the orchestrator and into the session total.

pub mod assert;
pub mod cli;
pub mod config;
pub mod models;
pub mod output;
pub mod runner;
pub mod suite;
pub mod utils;

pub use models::{Failure, Results, SlotResult, Stats, SuiteMessage};
pub use suite::{suite, Suite, SuiteError};
