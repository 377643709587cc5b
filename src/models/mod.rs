//! Data models for test execution
//!
//! This module contains the result types shared by suites, the runner,
//! and the wire protocol between them.

mod protocol;
mod results;

pub use protocol::{SuiteMessage, ISOLATE_ENV, MESSAGE_PREFIX};
pub use results::{Failure, Results, SlotResult, Stats};
