//! Structured diff engine
//!
//! Turns two formatted values into an ordered sequence of styled lines.
//! Multi-line renderings get a line-level edit script; short values get a
//! compact two-line word diff. The fragment model is the canonical
//! representation; ANSI styling is a rendering concern layered on in the
//! output module.

use difference::{Changeset, Difference};
use serde::{Deserialize, Serialize};

use super::format::format;
use super::value::Value;

const MINUS_MARK: &str = " --- ";
const PLUS_MARK: &str = " +++ ";
/// Same width as the change markers, keeps unchanged lines aligned.
const CONTEXT_PAD: &str = "     ";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Gray,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Dim,
    Bold,
}

/// One styled run of text within a diff line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub style: Option<Style>,
}

impl Fragment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            style: None,
        }
    }

    fn styled(text: impl Into<String>, color: Option<Color>, style: Option<Style>) -> Self {
        Self {
            text: text.into(),
            color,
            style,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub fragments: Vec<Fragment>,
}

impl DiffLine {
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }

    /// The line with styling stripped.
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|fragment| fragment.text.as_str())
            .collect()
    }
}

/// The structured difference between two values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    pub lines: Vec<DiffLine>,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// A one-line explanatory diff, indented like diff output.
    pub fn note(text: impl Into<String>) -> Self {
        Self {
            lines: vec![DiffLine::new(vec![Fragment::plain(format!(
                "  {}",
                text.into()
            ))])],
        }
    }

    /// A block of text rendered verbatim, two spaces in. Used when there
    /// is a single value to show rather than a pair to contrast.
    pub fn indented(block: &str) -> Self {
        Self {
            lines: block
                .split('\n')
                .map(|line| DiffLine::new(vec![Fragment::plain(format!("  {line}"))]))
                .collect(),
        }
    }

    /// All lines with styling stripped, for logs and fallbacks.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(DiffLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn minus_marker() -> Fragment {
    Fragment::styled(MINUS_MARK, Some(Color::Red), None)
}

fn plus_marker() -> Fragment {
    Fragment::styled(PLUS_MARK, Some(Color::Green), None)
}

/// Compute the structured diff between two values.
pub fn compare(value: &Value, expected: &Value) -> Diff {
    let actual = format(value);
    let wanted = format(expected);

    if actual.contains('\n') || wanted.contains('\n') {
        compare_lines(&actual, &wanted)
    } else {
        compare_words(&actual, &wanted)
    }
}

// Line-mode: unchanged lines once, dimmed; removed lines before added
// lines within each hunk, as in a unified diff.
fn compare_lines(actual: &str, expected: &str) -> Diff {
    let changeset = Changeset::new(actual, expected, "\n");

    let mut lines = Vec::new();
    let mut removed: Vec<DiffLine> = Vec::new();
    let mut added: Vec<DiffLine> = Vec::new();

    fn flush(lines: &mut Vec<DiffLine>, removed: &mut Vec<DiffLine>, added: &mut Vec<DiffLine>) {
        lines.append(removed);
        lines.append(added);
    }

    for change in &changeset.diffs {
        match change {
            Difference::Same(block) => {
                flush(&mut lines, &mut removed, &mut added);
                for line in block.split('\n') {
                    lines.push(DiffLine::new(vec![Fragment::styled(
                        format!("{CONTEXT_PAD}{line}"),
                        Some(Color::Gray),
                        Some(Style::Dim),
                    )]));
                }
            }
            Difference::Rem(block) => {
                for line in block.split('\n') {
                    removed.push(DiffLine::new(vec![
                        minus_marker(),
                        Fragment::styled(line, Some(Color::Red), Some(Style::Bold)),
                    ]));
                }
            }
            Difference::Add(block) => {
                for line in block.split('\n') {
                    added.push(DiffLine::new(vec![
                        plus_marker(),
                        Fragment::styled(line, Some(Color::Green), Some(Style::Bold)),
                    ]));
                }
            }
        }
    }
    flush(&mut lines, &mut removed, &mut added);

    Diff { lines }
}

// Word-mode: exactly two lines, minus then plus, unchanged tokens dim and
// changed tokens bold.
fn compare_words(actual: &str, expected: &str) -> Diff {
    let changeset = Changeset::new(actual, expected, " ");

    let mut minus = vec![minus_marker()];
    let mut plus = vec![plus_marker()];

    for change in &changeset.diffs {
        match change {
            Difference::Same(text) => {
                push_tokens(&mut minus, text, Style::Dim);
                push_tokens(&mut plus, text, Style::Dim);
            }
            Difference::Rem(text) => push_tokens(&mut minus, text, Style::Bold),
            Difference::Add(text) => push_tokens(&mut plus, text, Style::Bold),
        }
    }

    Diff {
        lines: vec![DiffLine::new(minus), DiffLine::new(plus)],
    }
}

fn push_tokens(line: &mut Vec<Fragment>, text: &str, style: Style) {
    // Slot 0 holds the change marker; later chunks need the separator
    // the changeset split on.
    let text = if line.len() > 1 {
        format!(" {text}")
    } else {
        text.to_string()
    };
    line.push(Fragment::styled(text, None, Some(style)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_values_use_word_mode() {
        let diff = compare(&Value::Bool(true), &Value::Bool(false));

        assert_eq!(diff.lines.len(), 2);
        assert_eq!(diff.lines[0].text(), " --- true");
        assert_eq!(diff.lines[1].text(), " +++ false");
        assert_eq!(diff.lines[0].fragments[1].style, Some(Style::Bold));
        assert_eq!(diff.lines[1].fragments[1].style, Some(Style::Bold));
    }

    #[test]
    fn word_mode_keeps_common_tokens_on_both_lines() {
        let diff = compare(
            &Value::Str("lazy brown dog".to_string()),
            &Value::Str("lazy red dog".to_string()),
        );

        assert_eq!(diff.lines.len(), 2);
        assert!(diff.lines[0].text().contains("brown"));
        assert!(!diff.lines[0].text().contains("red"));
        assert!(diff.lines[1].text().contains("red"));
        assert!(!diff.lines[1].text().contains("brown"));
    }

    #[test]
    fn multi_line_values_use_line_mode() {
        let value = Value::map([("foo", Value::list([1, 2, 3]))]);
        let expected = Value::map([("foo", Value::List(Vec::new()))]);
        let diff = compare(&value, &expected);

        let removed: Vec<String> = diff
            .lines
            .iter()
            .filter(|line| line.text().starts_with(MINUS_MARK))
            .map(DiffLine::text)
            .collect();
        let added: Vec<String> = diff
            .lines
            .iter()
            .filter(|line| line.text().starts_with(PLUS_MARK))
            .map(DiffLine::text)
            .collect();

        assert!(removed.iter().any(|line| line.contains('1')));
        assert!(removed.iter().any(|line| line.contains('2')));
        assert!(removed.iter().any(|line| line.contains('3')));
        assert!(added.iter().any(|line| line.contains("foo: []")));
    }

    #[test]
    fn line_mode_emits_removed_before_added_within_a_hunk() {
        let value = Value::list(["a", "b"]);
        let expected = Value::list(["a", "c"]);
        let diff = compare(&value, &expected);

        let minus_position = diff
            .lines
            .iter()
            .position(|line| line.text().starts_with(MINUS_MARK))
            .unwrap();
        let plus_position = diff
            .lines
            .iter()
            .position(|line| line.text().starts_with(PLUS_MARK))
            .unwrap();
        assert!(minus_position < plus_position);
    }

    #[test]
    fn unchanged_lines_are_dimmed_context() {
        let value = Value::list([1, 2]);
        let expected = Value::list([1, 3]);
        let diff = compare(&value, &expected);

        let context = diff
            .lines
            .iter()
            .find(|line| line.text().ends_with('['))
            .unwrap();
        assert_eq!(context.fragments[0].style, Some(Style::Dim));
        assert_eq!(context.fragments[0].color, Some(Color::Gray));
    }

    #[test]
    fn note_and_indented_build_plain_lines() {
        let note = Diff::note("something to know.");
        assert_eq!(note.plain_text(), "  something to know.");

        let indented = Diff::indented("1\n2");
        assert_eq!(indented.plain_text(), "  1\n  2");
    }
}
