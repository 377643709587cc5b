//! Result models for test execution
//!
//! Defines per-slot results, captured failures, and aggregate stats.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::assert::{AssertionFailure, AssertionKind, Diff, Trace};

/// Aggregate counters for one suite run or a whole session.
///
/// Monotonically updated while a run is in flight; `merge` is the only
/// combination operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Stats {
    /// Add another stats record into this one.
    pub fn merge(&mut self, other: &Stats) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }

    /// Invariant: every slot is accounted for exactly once.
    pub fn is_consistent(&self) -> bool {
        self.passed + self.failed + self.skipped == self.total
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total: {} | passed: {} | failed: {} | skipped: {}",
            self.total, self.passed, self.failed, self.skipped
        )
    }
}

/// A captured test failure in transferable form.
///
/// This is what crosses the isolation boundary: no live error value, just
/// the structured fields a reporter needs. `title` is filled in by the
/// execution strategy at capture time, since the assertion call site does
/// not know which test it runs inside.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub assertion: Option<AssertionKind>,
    #[serde(skip_serializing_if = "Diff::is_empty", default)]
    pub diff: Diff,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trace: Option<Trace>,
}

impl Failure {
    pub const ASSERTION: &'static str = "AssertionFailure";
    pub const ERROR: &'static str = "Error";

    /// Capture an error propagated out of a test body.
    ///
    /// Structured assertion failures keep their kind, diff, and trace;
    /// anything else is recorded as an opaque error with only a message.
    pub fn from_error(error: anyhow::Error, title: &str) -> Self {
        match error.downcast::<AssertionFailure>() {
            Ok(failure) => Self {
                name: Self::ASSERTION.to_string(),
                assertion: Some(failure.assertion),
                diff: failure.diff,
                message: failure.message,
                title: Some(title.to_string()),
                trace: Some(failure.trace),
            },
            Err(error) => Self {
                name: Self::ERROR.to_string(),
                assertion: None,
                diff: Diff::default(),
                message: Some(format!("{error:#}")),
                title: Some(title.to_string()),
                trace: None,
            },
        }
    }

    pub fn is_assertion(&self) -> bool {
        self.name == Self::ASSERTION
    }
}

/// Outcome of a single test slot, indexed by registration position.
#[derive(Clone, Debug, PartialEq)]
pub enum SlotResult {
    Ok,
    Skipped,
    Failed(Failure),
}

impl SlotResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, SlotResult::Ok)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, SlotResult::Skipped)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            SlotResult::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

// Wire form: "ok" | "skipped" | failure object.
impl Serialize for SlotResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SlotResult::Ok => serializer.serialize_str("ok"),
            SlotResult::Skipped => serializer.serialize_str("skipped"),
            SlotResult::Failed(failure) => failure.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SlotResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Tag(String),
            Failure(Failure),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Tag(tag) if tag == "ok" => Ok(SlotResult::Ok),
            Repr::Tag(tag) if tag == "skipped" => Ok(SlotResult::Skipped),
            Repr::Tag(tag) => Err(D::Error::custom(format!("unknown slot result `{tag}`"))),
            Repr::Failure(failure) => Ok(SlotResult::Failed(failure)),
        }
    }
}

/// Everything a suite run produced: per-slot outcomes in registration
/// order plus the aggregate counters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Results {
    pub results: Vec<SlotResult>,
    pub stats: Stats,
}

impl Results {
    pub fn failures(&self) -> impl Iterator<Item = &Failure> {
        self.results.iter().filter_map(SlotResult::failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_merge_is_additive() {
        let mut total = Stats {
            total: 4,
            passed: 3,
            failed: 1,
            skipped: 0,
        };
        total.merge(&Stats {
            total: 2,
            passed: 2,
            failed: 0,
            skipped: 0,
        });

        assert_eq!(
            total,
            Stats {
                total: 6,
                passed: 5,
                failed: 1,
                skipped: 0,
            }
        );
        assert!(total.is_consistent());
    }

    #[test]
    fn slot_result_wire_forms() {
        let ok = serde_json::to_string(&SlotResult::Ok).unwrap();
        let skipped = serde_json::to_string(&SlotResult::Skipped).unwrap();

        assert_eq!(ok, "\"ok\"");
        assert_eq!(skipped, "\"skipped\"");

        let failure = SlotResult::Failed(Failure {
            name: Failure::ERROR.to_string(),
            assertion: None,
            diff: Diff::default(),
            message: Some("boom".to_string()),
            title: Some("a test".to_string()),
            trace: None,
        });
        let encoded = serde_json::to_string(&failure).unwrap();
        let decoded: SlotResult = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, failure);
    }

    #[test]
    fn slot_result_rejects_unknown_tags() {
        let decoded: Result<SlotResult, _> = serde_json::from_str("\"maybe\"");
        assert!(decoded.is_err());
    }
}
