//! Result rendering
//!
//! Renders suite summaries, failure blocks, and session stats. Styling
//! is plain ANSI behind a `colorize` flag; the structured diff model is
//! translated to escape codes only here.

use std::path::Path;
use std::time::Duration;

use crate::assert::{Color, Diff, Style};
use crate::models::{Failure, SlotResult, Stats, SuiteMessage};
use crate::output::snippet::source_excerpt;
use crate::utils::format_elapsed;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Renders results for humans (or machines, with the json format).
#[derive(Clone, Debug)]
pub struct Reporter {
    format: OutputFormat,
    colorize: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputFormat::Text)
    }
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Render one completed suite: the summary line, per-test symbols in
    /// registration order, and a block per captured failure.
    pub fn report_suite(&self, file: Option<&Path>, message: &SuiteMessage) {
        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string(message).unwrap_or_default());
            return;
        }

        let mut out = String::new();

        if let Some(file) = file {
            out.push_str(&self.paint(&file.display().to_string(), "4"));
            out.push('\n');
        }

        let stats = &message.results.stats;
        let clean = stats.passed + stats.skipped == stats.total;
        let counts_codes = if clean { "37;42" } else { "37;41" };

        out.push_str(&self.paint(&format!(" {} ", message.suite_name), "30;47"));
        out.push_str(&self.paint(&format!(" {}/{} ", stats.passed, stats.total), counts_codes));
        out.push(' ');

        let symbols: Vec<String> = message
            .results
            .results
            .iter()
            .map(|slot| match slot {
                SlotResult::Ok => self.paint("•", "32"),
                SlotResult::Skipped => self.paint("~", "33"),
                SlotResult::Failed(_) => self.paint("⨯", "31"),
            })
            .collect();
        out.push_str(&symbols.join(" "));
        out.push('\n');

        println!("{out}");

        for failure in message.results.failures() {
            println!("{}", self.format_failure(failure));
        }
    }

    fn format_failure(&self, failure: &Failure) -> String {
        let mut out = String::new();

        let title = failure.title.as_deref().unwrap_or("Test");
        out.push_str(&self.paint(&format!("⨯ {title}"), "1;31"));
        out.push('\n');

        if let Some(trace) = &failure.trace {
            out.push_str(&self.paint(&format!("  at {trace}"), "2"));
            out.push('\n');
            if let Some(excerpt) = source_excerpt(&trace.file, trace.line) {
                for (number, line) in excerpt {
                    let marker = if number == trace.line { ">" } else { " " };
                    out.push_str(&self.paint(&format!("  {marker} {number:3} | {line}"), "2"));
                    out.push('\n');
                }
            }
        }

        if let Some(message) = &failure.message {
            out.push('\n');
            out.push_str(&format!("  {message}\n"));
        }

        if !failure.diff.is_empty() {
            out.push('\n');
            out.push_str(&self.render_diff(&failure.diff));
            out.push('\n');
        }

        out
    }

    /// Translate a structured diff to styled lines.
    pub fn render_diff(&self, diff: &Diff) -> String {
        let mut lines = Vec::with_capacity(diff.lines.len());
        for line in &diff.lines {
            let mut rendered = String::new();
            for fragment in &line.fragments {
                let codes = fragment_codes(fragment.color, fragment.style);
                if codes.is_empty() {
                    rendered.push_str(&fragment.text);
                } else {
                    rendered.push_str(&self.paint(&fragment.text, &codes));
                }
            }
            lines.push(rendered);
        }
        lines.join("\n")
    }

    /// Render the session stats block, zero-valued counters dimmed.
    pub fn report_stats(&self, stats: &Stats, elapsed: Duration) {
        println!();
        println!("{}", self.stat_line("  Total:", stats.total, "37"));
        println!("{}", self.stat_line("  Passed:", stats.passed, "32"));
        println!("{}", self.stat_line("  Skipped:", stats.skipped, "33"));
        println!("{}", self.stat_line("  Failed:", stats.failed, "31"));
        println!();
        println!(
            "{}",
            self.paint(&format!("  Done in {}", format_elapsed(elapsed)), "2;36")
        );
    }

    /// Session-level report: crashed files first, then the stats block.
    pub fn report_run(&self, stats: &Stats, files_errored: usize, elapsed: Duration) {
        if files_errored > 0 {
            println!(
                "{}",
                self.paint(
                    &format!("  {files_errored} test file(s) failed to execute"),
                    "1;31"
                )
            );
        }
        self.report_stats(stats, elapsed);
    }

    fn stat_line(&self, label: &str, count: usize, codes: &str) -> String {
        let text = format!("{label:<11}{count}");
        if count == 0 {
            self.paint(&text, "2")
        } else {
            self.paint(&text, codes)
        }
    }

    fn paint(&self, text: &str, codes: &str) -> String {
        if self.colorize {
            format!("\x1b[{codes}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

fn fragment_codes(color: Option<Color>, style: Option<Style>) -> String {
    let mut codes: Vec<&str> = Vec::new();
    match style {
        Some(Style::Bold) => codes.push("1"),
        Some(Style::Dim) => codes.push("2"),
        None => {}
    }
    match color {
        Some(Color::Red) => codes.push("31"),
        Some(Color::Green) => codes.push("32"),
        Some(Color::Gray) => codes.push("90"),
        None => {}
    }
    codes.join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert::{compare, Value};

    #[test]
    fn output_format_parses_known_names() {
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("yaml"), None);
    }

    #[test]
    fn render_diff_without_color_is_plain_text() {
        let reporter = Reporter::default().no_color();
        let diff = compare(&Value::Bool(true), &Value::Bool(false));

        let rendered = reporter.render_diff(&diff);
        assert_eq!(rendered, " --- true\n +++ false");
    }

    #[test]
    fn render_diff_with_color_wraps_changed_fragments() {
        let reporter = Reporter::default();
        let diff = compare(&Value::Bool(true), &Value::Bool(false));

        let rendered = reporter.render_diff(&diff);
        assert!(rendered.contains("\x1b[31m")); // minus marker
        assert!(rendered.contains("\x1b[1m")); // bold changed token
    }
}
