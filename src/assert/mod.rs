//! Assertion library
//!
//! Comparison primitives over [`Value`] operands. A violated assertion
//! returns an [`AssertionFailure`] carrying its kind, a structured diff,
//! and the user-code call site; test bodies abort by propagating it with
//! `?`. Every primitive accepts an optional custom message that replaces
//! the canned one.
//!
//! ```no_run
//! use attest::assert;
//!
//! # fn demo() -> anyhow::Result<()> {
//! assert::is(1, 1, None)?;
//! assert::equal(vec![1, 2], vec![1, 2], None)?;
//! assert::truthy("words", Some("expected some text"))?;
//! # Ok(())
//! # }
//! ```

pub mod compare;
pub mod failure;
pub mod format;
pub mod messages;
pub mod value;

pub use compare::{compare, Color, Diff, DiffLine, Fragment, Style};
pub use failure::{AssertionFailure, AssertionKind, Trace};
pub use format::format;
pub use value::Value;

use std::future::Future;

pub type AssertResult = Result<(), AssertionFailure>;

/// What a raised error is validated against in [`throws`].
pub enum Expected<'a> {
    Pattern(Pattern),
    Predicate(&'a (dyn Fn(&anyhow::Error) -> bool + Sync)),
}

impl<'a> From<&str> for Expected<'a> {
    fn from(text: &str) -> Self {
        Expected::Pattern(Pattern::from(text))
    }
}

impl<'a> From<regex::Regex> for Expected<'a> {
    fn from(pattern: regex::Regex) -> Self {
        Expected::Pattern(Pattern::from(pattern))
    }
}

/// Literal-containment or regular-expression matching for [`matches`].
#[derive(Clone, Debug)]
pub enum Pattern {
    Text(String),
    Regex(regex::Regex),
}

impl Pattern {
    fn is_match(&self, value: &str) -> bool {
        match self {
            Pattern::Text(text) => value.contains(text.as_str()),
            Pattern::Regex(pattern) => pattern.is_match(value),
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Pattern::Text(_) => "contain",
            Pattern::Regex(_) => "match",
        }
    }

    fn render(&self) -> String {
        match self {
            Pattern::Text(text) => format!("{text:?}"),
            Pattern::Regex(pattern) => format!("/{}/", pattern.as_str()),
        }
    }
}

impl From<&str> for Pattern {
    fn from(text: &str) -> Self {
        Pattern::Text(text.to_string())
    }
}

impl From<String> for Pattern {
    fn from(text: String) -> Self {
        Pattern::Text(text)
    }
}

impl From<regex::Regex> for Pattern {
    fn from(pattern: regex::Regex) -> Self {
        Pattern::Regex(pattern)
    }
}

fn raise(
    assertion: AssertionKind,
    diff: Diff,
    message: Option<&str>,
    canned: Option<&str>,
    trace: Trace,
) -> AssertResult {
    let message = message.or(canned).map(str::to_string);
    Err(AssertionFailure::new(assertion, diff, message, trace))
}

/// Strict identity. `NaN` is identity-equal to `NaN`; `0.0` and `-0.0`
/// are not. A composite `expected` cannot satisfy identity unless it is
/// the same shared allocation, so the failure carries an advisory note
/// pointing at [`equal`] instead of a value diff.
#[track_caller]
pub fn is(value: impl Into<Value>, expected: impl Into<Value>, message: Option<&str>) -> AssertResult {
    let trace = Trace::capture();
    let value = value.into();
    let expected = expected.into();

    if value.identical(&expected) {
        return Ok(());
    }

    if let Some(kind) = expected.composite_kind() {
        let diff = Diff::note(format!(
            "At a glance, `expected` is an {kind}; usually, this type is compared to other values using `equal`."
        ));
        return raise(
            AssertionKind::Is,
            diff,
            message,
            Some(messages::IS_COMPOSITE),
            trace,
        );
    }

    raise(
        AssertionKind::Is,
        compare(&value, &expected),
        message,
        Some(messages::IS),
        trace,
    )
}

/// Deep structural equality: container-agnostic, key-order independent,
/// cycle-tolerant.
#[track_caller]
pub fn equal(
    value: impl Into<Value>,
    expected: impl Into<Value>,
    message: Option<&str>,
) -> AssertResult {
    let trace = Trace::capture();
    let value = value.into();
    let expected = expected.into();

    if value.deep_equal(&expected) {
        return Ok(());
    }

    raise(
        AssertionKind::Equal,
        compare(&value, &expected),
        message,
        Some(messages::EQUAL),
        trace,
    )
}

/// Negated [`is`]. The failure shows the single (equal) value, since
/// there is nothing to contrast.
#[track_caller]
pub fn is_not(
    value: impl Into<Value>,
    expected: impl Into<Value>,
    message: Option<&str>,
) -> AssertResult {
    let trace = Trace::capture();
    let value = value.into();

    if !value.identical(&expected.into()) {
        return Ok(());
    }

    raise(
        AssertionKind::IsNot,
        Diff::indented(&format(&value)),
        message,
        None,
        trace,
    )
}

/// Negated [`equal`].
#[track_caller]
pub fn not_equal(
    value: impl Into<Value>,
    expected: impl Into<Value>,
    message: Option<&str>,
) -> AssertResult {
    let trace = Trace::capture();
    let value = value.into();

    if !value.deep_equal(&expected.into()) {
        return Ok(());
    }

    raise(
        AssertionKind::NotEqual,
        Diff::indented(&format(&value)),
        message,
        None,
        trace,
    )
}

/// Coercive truthiness check.
#[track_caller]
pub fn truthy(value: impl Into<Value>, message: Option<&str>) -> AssertResult {
    let trace = Trace::capture();
    let value = value.into();

    if value.is_truthy() {
        return Ok(());
    }

    raise(
        AssertionKind::Truthy,
        Diff::note(format!("{} converts to false.", format(&value))),
        message,
        None,
        trace,
    )
}

/// Coercive falsiness check.
#[track_caller]
pub fn falsy(value: impl Into<Value>, message: Option<&str>) -> AssertResult {
    let trace = Trace::capture();
    let value = value.into();

    if !value.is_truthy() {
        return Ok(());
    }

    raise(
        AssertionKind::Falsy,
        Diff::note(format!("{} converts to true.", format(&value))),
        message,
        None,
        trace,
    )
}

/// Strict boolean identity with `true` (not coercive).
#[track_caller]
pub fn is_true(value: impl Into<Value>, message: Option<&str>) -> AssertResult {
    let trace = Trace::capture();
    let value = value.into();

    if value.identical(&Value::Bool(true)) {
        return Ok(());
    }

    raise(
        AssertionKind::True,
        Diff::note(format!("The received value is {}.", format(&value))),
        message,
        None,
        trace,
    )
}

/// Strict boolean identity with `false` (not coercive).
#[track_caller]
pub fn is_false(value: impl Into<Value>, message: Option<&str>) -> AssertResult {
    let trace = Trace::capture();
    let value = value.into();

    if value.identical(&Value::Bool(false)) {
        return Ok(());
    }

    raise(
        AssertionKind::False,
        Diff::note(format!("The received value is {}.", format(&value))),
        message,
        None,
        trace,
    )
}

/// Substring containment for literal patterns, regular-expression test
/// otherwise.
#[track_caller]
pub fn matches(value: &str, pattern: impl Into<Pattern>, message: Option<&str>) -> AssertResult {
    let trace = Trace::capture();
    let pattern = pattern.into();

    if pattern.is_match(value) {
        return Ok(());
    }

    raise(
        AssertionKind::Match,
        Diff::note(format!(
            "{value:?} does not {} {}.",
            pattern.verb(),
            pattern.render()
        )),
        message,
        None,
        trace,
    )
}

/// Always fails; asserts a code path is never taken.
#[track_caller]
pub fn unreachable(message: Option<&str>) -> AssertResult {
    raise(
        AssertionKind::Unreachable,
        Diff::default(),
        message,
        None,
        Trace::capture(),
    )
}

/// Awaits `op` and fails unless it returns an error. With `expected`
/// supplied, the raised error's message is re-validated against the
/// pattern, or the error against the predicate. An error that is itself
/// an assertion failure propagates unchanged, so a nested failure is
/// never reinterpreted as "did throw".
#[track_caller]
pub fn throws<'a, F, Fut>(
    op: F,
    expected: Option<Expected<'a>>,
    message: Option<&'a str>,
) -> impl Future<Output = AssertResult> + 'a
where
    F: FnOnce() -> Fut + 'a,
    Fut: Future<Output = anyhow::Result<()>> + 'a,
{
    let trace = Trace::capture();

    async move {
        let error = match op().await {
            Ok(()) => {
                return raise(
                    AssertionKind::Unreachable,
                    Diff::default(),
                    message,
                    Some(messages::THROWS_MISSING),
                    trace,
                )
            }
            Err(error) => error,
        };

        let error = match error.downcast::<AssertionFailure>() {
            Ok(nested) => return Err(nested),
            Err(error) => error,
        };

        match expected {
            None => Ok(()),
            Some(Expected::Pattern(pattern)) => {
                let text = error.to_string();
                if pattern.is_match(&text) {
                    return Ok(());
                }
                raise(
                    AssertionKind::Match,
                    Diff::note(format!(
                        "{text:?} does not {} {}.",
                        pattern.verb(),
                        pattern.render()
                    )),
                    message,
                    Some(messages::THROWS_MESSAGE),
                    trace,
                )
            }
            Some(Expected::Predicate(check)) => {
                if check(&error) {
                    return Ok(());
                }
                raise(
                    AssertionKind::True,
                    Diff::note("The received value is false."),
                    message,
                    Some(messages::THROWS_PREDICATE),
                    trace,
                )
            }
        }
    }
}
