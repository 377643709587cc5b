//! The value tree assertions operate on
//!
//! Comparison primitives work over a self-describing `Value` rather than
//! arbitrary user types, so the formatter and diff engine can render any
//! operand the same way. `Shared` wraps a node in `Arc<Mutex<_>>` and is
//! the only way to express aliasing or cycles; identity comparison of
//! composites is pointer identity, exactly like comparing two separately
//! built collections always fails.

use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// Entries keep insertion order; rendering sorts by key.
    Map(Vec<(String, Value)>),
    /// A reference-counted node, usable from several positions at once.
    Shared(Arc<Mutex<Value>>),
}

fn lock(cell: &Mutex<Value>) -> MutexGuard<'_, Value> {
    cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Value {
    /// Wrap a value in a shared node.
    pub fn shared(value: Value) -> Value {
        Value::Shared(Arc::new(Mutex::new(value)))
    }

    pub fn list<I>(items: I) -> Value
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn map<K, V, I>(entries: I) -> Value
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Replace the contents of a shared node. Returns false when the
    /// value is not shared.
    pub fn store(&self, value: Value) -> bool {
        match self {
            Value::Shared(cell) => {
                *lock(cell) = value;
                true
            }
            _ => false,
        }
    }

    /// "array" or "object" when the value is composite, resolving
    /// through shared nodes.
    pub fn composite_kind(&self) -> Option<&'static str> {
        match self {
            Value::List(_) => Some("array"),
            Value::Map(_) => Some("object"),
            Value::Shared(cell) => {
                let inner = lock(cell).clone();
                match inner {
                    // A shared chain is reference-like either way.
                    Value::Shared(_) => Some("object"),
                    other => other.composite_kind(),
                }
            }
            _ => None,
        }
    }

    /// Strict identity: `NaN` is self-equal, `0.0` and `-0.0` differ,
    /// composites are identical only when they are the same shared
    /// allocation.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => float_identical(*a, *b),
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                float_identical(*a as f64, *b)
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Shared(a), Value::Shared(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Deep structural equality: container-agnostic, key-order
    /// independent, and tolerant of cyclic shared structures.
    pub fn deep_equal(&self, other: &Value) -> bool {
        deep_eq(self, other, &mut Vec::new())
    }

    /// Host-style coercive truthiness: zero, `NaN`, the empty string,
    /// and null are falsy; composites are always truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) => true,
            Value::Shared(cell) => {
                let inner = lock(cell).clone();
                match inner {
                    Value::List(_) | Value::Map(_) | Value::Shared(_) => true,
                    scalar => scalar.is_truthy(),
                }
            }
        }
    }
}

fn float_identical(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        return true;
    }
    a.to_bits() == b.to_bits()
}

// Recursion never runs while a lock is held: shared nodes are cloned out
// first (clones are shallow at the next shared boundary). The `seen` list
// of pointer pairs terminates walks over cyclic graphs.
fn deep_eq(a: &Value, b: &Value, seen: &mut Vec<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Shared(x), Value::Shared(y)) => {
            if Arc::ptr_eq(x, y) {
                return true;
            }
            let key = (Arc::as_ptr(x) as usize, Arc::as_ptr(y) as usize);
            if seen.contains(&key) {
                return true;
            }
            seen.push(key);
            let left = lock(x).clone();
            let right = lock(y).clone();
            deep_eq(&left, &right, seen)
        }
        (Value::Shared(x), other) => {
            let key = (Arc::as_ptr(x) as usize, usize::MAX);
            if seen.contains(&key) {
                return false;
            }
            seen.push(key);
            let inner = lock(x).clone();
            let equal = deep_eq(&inner, other, seen);
            seen.retain(|entry| entry != &key);
            equal
        }
        (other, Value::Shared(y)) => {
            let key = (usize::MAX, Arc::as_ptr(y) as usize);
            if seen.contains(&key) {
                return false;
            }
            seen.push(key);
            let inner = lock(y).clone();
            let equal = deep_eq(other, &inner, seen);
            seen.retain(|entry| entry != &key);
            equal
        }
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => (*x as f64) == *y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y.iter())
                    .all(|(left, right)| deep_eq(left, right, seen))
        }
        (Value::Map(x), Value::Map(y)) => {
            x.len() == y.len()
                && x.iter().all(|(key, left)| {
                    y.iter()
                        .find(|(other_key, _)| other_key == key)
                        .is_some_and(|(_, right)| deep_eq(left, right, seen))
                })
        }
        _ => false,
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value.into())
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .unwrap_or_else(|| Value::Float(n.as_f64().unwrap_or(f64::NAN))),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_treats_nan_as_self_equal() {
        assert!(Value::Float(f64::NAN).identical(&Value::Float(f64::NAN)));
    }

    #[test]
    fn identity_distinguishes_signed_zero() {
        assert!(!Value::Float(0.0).identical(&Value::Float(-0.0)));
        assert!(!Value::Int(0).identical(&Value::Float(-0.0)));
        assert!(Value::Int(0).identical(&Value::Float(0.0)));
    }

    #[test]
    fn composites_are_identical_only_by_pointer() {
        let shared = Value::shared(Value::list([1, 2]));
        assert!(shared.identical(&shared.clone()));

        let left = Value::list([1, 2]);
        let right = Value::list([1, 2]);
        assert!(!left.identical(&right));
        assert!(left.deep_equal(&right));
    }

    #[test]
    fn deep_equality_ignores_key_order() {
        let left = Value::map([("foo", Value::from(1)), ("bar", Value::from(2))]);
        let right = Value::map([("bar", Value::from(2)), ("foo", Value::from(1))]);
        assert!(left.deep_equal(&right));
    }

    #[test]
    fn deep_equality_detects_structural_difference() {
        let left = Value::map([("foo", Value::list([1, 2, 3]))]);
        let right = Value::map([("foo", Value::List(Vec::new()))]);
        assert!(!left.deep_equal(&right));
    }

    #[test]
    fn deep_equality_terminates_on_cycles() {
        let left = Value::shared(Value::Null);
        left.store(Value::List(vec![left.clone()]));
        let right = Value::shared(Value::Null);
        right.store(Value::List(vec![right.clone()]));

        assert!(left.deep_equal(&right));
        assert!(left.deep_equal(&left.clone()));
    }

    #[test]
    fn truthiness_follows_host_coercion() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::Float(-0.0).is_truthy());
        assert!(!Value::Float(f64::NAN).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());

        assert!(Value::Int(2).is_truthy());
        assert!(Value::Str("0".to_string()).is_truthy());
        assert!(Value::List(Vec::new()).is_truthy());
        assert!(Value::Map(Vec::new()).is_truthy());
    }

    #[test]
    fn json_values_convert_structurally() {
        let json: serde_json::Value = serde_json::json!({"foo": [1, 2], "bar": null});
        let value: Value = json.into();
        let expected = Value::map([
            ("foo", Value::list([1, 2])),
            ("bar", Value::Null),
        ]);
        assert!(value.deep_equal(&expected));
    }
}
