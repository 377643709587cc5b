//! Canonical value rendering
//!
//! One deterministic textual form per structurally-equal value: map keys
//! are sorted regardless of insertion order, depth and length are never
//! truncated, and revisited shared nodes render as `[Circular]`. Output
//! carries no styling; the diff engine layers that on.

use std::sync::Arc;

use super::value::Value;

/// Render a value into its canonical textual form.
pub fn format(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, 0, &mut out, &mut Vec::new());
    out
}

fn write_value(value: &Value, indent: usize, out: &mut String, seen: &mut Vec<usize>) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::Float(f) => out.push_str(&format_float(*f)),
        Value::Str(s) => out.push_str(&format!("{s:?}")),
        Value::List(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[\n");
            for (position, item) in items.iter().enumerate() {
                pad(out, indent + 2);
                write_value(item, indent + 2, out, seen);
                if position + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            pad(out, indent);
            out.push(']');
        }
        Value::Map(entries) => {
            if entries.is_empty() {
                out.push_str("{}");
                return;
            }
            let mut sorted: Vec<&(String, Value)> = entries.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(&b.0));

            out.push_str("{\n");
            for (position, (key, entry)) in sorted.iter().enumerate() {
                pad(out, indent + 2);
                out.push_str(&format_key(key));
                out.push_str(": ");
                write_value(entry, indent + 2, out, seen);
                if position + 1 < sorted.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            pad(out, indent);
            out.push('}');
        }
        Value::Shared(cell) => {
            let pointer = Arc::as_ptr(cell) as usize;
            if seen.contains(&pointer) {
                out.push_str("[Circular]");
                return;
            }
            seen.push(pointer);
            let inner = cell
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone();
            write_value(&inner, indent, out, seen);
            seen.pop();
        }
    }
}

fn pad(out: &mut String, width: usize) {
    for _ in 0..width {
        out.push(' ');
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if f == f.trunc() {
        // Keeps the fractional marker so 1.0 never collides with 1.
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

fn format_key(key: &str) -> String {
    let identifier = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !key.starts_with(|c: char| c.is_ascii_digit());
    if identifier {
        key.to_string()
    } else {
        format!("{key:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_render_canonically() {
        assert_eq!(format(&Value::Null), "null");
        assert_eq!(format(&Value::Bool(true)), "true");
        assert_eq!(format(&Value::Int(42)), "42");
        assert_eq!(format(&Value::Float(1.0)), "1.0");
        assert_eq!(format(&Value::Float(-0.0)), "-0.0");
        assert_eq!(format(&Value::Float(0.5)), "0.5");
        assert_eq!(format(&Value::Float(f64::NAN)), "NaN");
        assert_eq!(format(&Value::Str("hi".to_string())), "\"hi\"");
    }

    #[test]
    fn map_keys_render_sorted() {
        let value = Value::map([("zebra", Value::from(1)), ("apple", Value::from(2))]);
        assert_eq!(format(&value), "{\n  apple: 2,\n  zebra: 1\n}");
    }

    #[test]
    fn rendering_is_insertion_order_independent() {
        let left = Value::map([("a", Value::from(1)), ("b", Value::from(2))]);
        let right = Value::map([("b", Value::from(2)), ("a", Value::from(1))]);
        assert_eq!(format(&left), format(&right));
    }

    #[test]
    fn nested_composites_indent() {
        let value = Value::map([("foo", Value::list([1, 2]))]);
        assert_eq!(format(&value), "{\n  foo: [\n    1,\n    2\n  ]\n}");
    }

    #[test]
    fn empty_composites_stay_inline() {
        assert_eq!(format(&Value::List(Vec::new())), "[]");
        assert_eq!(format(&Value::Map(Vec::new())), "{}");
    }

    #[test]
    fn cycles_render_a_marker() {
        let node = Value::shared(Value::Null);
        node.store(Value::map([("next", node.clone())]));
        assert_eq!(format(&node), "{\n  next: [Circular]\n}");
    }

    #[test]
    fn shared_aliases_without_cycles_render_fully() {
        let leaf = Value::shared(Value::Int(7));
        let value = Value::list([leaf.clone(), leaf]);
        assert_eq!(format(&value), "[\n  7,\n  7\n]");
    }
}
