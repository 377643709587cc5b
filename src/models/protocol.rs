//! Cross-isolate message protocol
//!
//! One message per completed suite travels from an isolated unit to the
//! orchestrator as a prefixed JSON line on the unit's stdout. Lines
//! without the prefix are ordinary user output and pass through.

use serde::{Deserialize, Serialize};

use super::results::Results;

/// Marks a stdout line as a protocol message rather than user output.
pub const MESSAGE_PREFIX: &str = "##attest##";

/// Set in the environment of every isolated unit; suites emit protocol
/// lines instead of human-readable reports when it is present.
pub const ISOLATE_ENV: &str = "ATTEST_ISOLATE";

/// Suite-completion message, unit → orchestrator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuiteMessage {
    pub results: Results,
    #[serde(rename = "suiteName")]
    pub suite_name: String,
}

impl SuiteMessage {
    /// Encode as a single protocol line.
    pub fn encode(&self) -> String {
        format!(
            "{MESSAGE_PREFIX} {}",
            serde_json::to_string(self).unwrap_or_default()
        )
    }

    /// Decode a stdout line. `None` means the line is not a protocol
    /// message; `Some(Err)` means it claimed to be one but is malformed.
    pub fn decode(line: &str) -> Option<serde_json::Result<Self>> {
        let payload = line.strip_prefix(MESSAGE_PREFIX)?;
        Some(serde_json::from_str(payload.trim_start()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SlotResult, Stats};

    fn message() -> SuiteMessage {
        SuiteMessage {
            results: Results {
                results: vec![SlotResult::Ok, SlotResult::Skipped],
                stats: Stats {
                    total: 2,
                    passed: 1,
                    failed: 0,
                    skipped: 1,
                },
            },
            suite_name: "wire".to_string(),
        }
    }

    #[test]
    fn encode_produces_prefixed_line() {
        let line = message().encode();
        assert!(line.starts_with(MESSAGE_PREFIX));

        let decoded = SuiteMessage::decode(&line).unwrap().unwrap();
        assert_eq!(decoded, message());
    }

    #[test]
    fn user_output_is_not_a_message() {
        assert!(SuiteMessage::decode("plain test output").is_none());
    }

    #[test]
    fn malformed_payload_is_reported() {
        let line = format!("{MESSAGE_PREFIX} {{not json");
        assert!(SuiteMessage::decode(&line).unwrap().is_err());
    }
}
