//! Structured assertion failures
//!
//! A failed primitive produces an `AssertionFailure`: the assertion kind,
//! the structured diff, the canned or custom message, and the call site
//! of the assertion in user code. Tests abort by propagating it with `?`;
//! the execution strategies capture it and attach the test title.

use std::fmt;
use std::panic::Location;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::compare::Diff;

/// Which primitive raised the failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionKind {
    Is,
    Equal,
    IsNot,
    NotEqual,
    Truthy,
    True,
    False,
    Falsy,
    Match,
    Unreachable,
}

impl AssertionKind {
    pub fn label(&self) -> &'static str {
        match self {
            AssertionKind::Is => "is",
            AssertionKind::Equal => "equal",
            AssertionKind::IsNot => "is:not",
            AssertionKind::NotEqual => "not:equal",
            AssertionKind::Truthy => "truthy",
            AssertionKind::True => "true",
            AssertionKind::False => "false",
            AssertionKind::Falsy => "falsy",
            AssertionKind::Match => "match",
            AssertionKind::Unreachable => "unreachable",
        }
    }
}

impl fmt::Display for AssertionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Source location of the assertion call site in user code.
///
/// Captured through `#[track_caller]`, so the library's own frames never
/// appear. Advisory: used for reporting, never for control flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Trace {
    #[track_caller]
    pub fn capture() -> Self {
        let location = Location::caller();
        Self {
            file: location.file().to_string(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// The failure raised by a violated assertion.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{}", .message.as_deref().unwrap_or("assertion failed"))]
pub struct AssertionFailure {
    pub assertion: AssertionKind,
    pub diff: Diff,
    pub message: Option<String>,
    pub trace: Trace,
}

impl AssertionFailure {
    pub(crate) fn new(
        assertion: AssertionKind,
        diff: Diff,
        message: Option<String>,
        trace: Trace,
    ) -> Self {
        Self {
            assertion,
            diff,
            message,
            trace,
        }
    }
}
