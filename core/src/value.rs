use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::equality::DeepEq;

/// A dynamically typed argument value.
///
/// Use this (or `Vec<Value>`) as the argument type when a suspender is called with
/// heterogeneous or variable-length argument lists. Statically typed tuples work just
/// as well when the arity is known.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    /// A subtree shared between several argument lists. Identical pointers match
    /// without being walked.
    Shared(Arc<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Shared(inner) => inner.type_name(),
        }
    }

    pub fn is_nan(&self) -> bool {
        match self {
            Value::Number(n) => n.is_nan(),
            Value::Shared(inner) => inner.is_nan(),
            _ => false,
        }
    }

    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Looks through any number of [`Value::Shared`] layers.
    fn resolved(&self) -> &Value {
        let mut value = self;
        while let Value::Shared(inner) = value {
            value = &**inner;
        }
        value
    }
}

impl DeepEq for Value {
    fn deep_eq(&self, other: &Self) -> bool {
        if let (Value::Shared(a), Value::Shared(b)) = (self, other) {
            if Arc::ptr_eq(a, b) {
                return true;
            }
        }

        match (self.resolved(), other.resolved()) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.deep_eq(b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.deep_eq(b),
            (Value::Object(a), Value::Object(b)) => a.deep_eq(b),
            _ => false,
        }
    }
}

/// Equality here is [`DeepEq`], so `Value::Number(NAN) == Value::Number(NAN)`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.deep_eq(other)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! value_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(value.into())
                }
            }
        )*
    };
}

value_from_number!(f64, f32, i32, u32, i16, u16, i8, u8);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl From<Arc<Value>> for Value {
    fn from(value: Arc<Value>) -> Self {
        Value::Shared(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_objects_are_structural() {
        let a = Value::object([
            ("id", Value::from(42)),
            ("tags", Value::from(vec!["a", "b"])),
        ]);
        let b = Value::object([
            ("tags", Value::from(vec!["a", "b"])),
            ("id", Value::from(42)),
        ]);
        assert_eq!(a, b);

        let c = Value::object([("id", Value::from(42))]);
        assert_ne!(a, c);
    }

    #[test]
    fn variants_never_mix() {
        assert_ne!(Value::Undefined, Value::Null);
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::from(0), Value::from(false));
        assert_ne!(Value::Array(vec![]), Value::Object(BTreeMap::new()));
    }

    #[test]
    fn nan_arguments_match() {
        let args = vec![Value::from(f64::NAN), Value::Null];
        assert!(args.deep_eq(&vec![Value::from(f64::NAN), Value::Null]));
        assert!(Value::from(f64::NAN).is_nan());
    }

    #[test]
    fn shared_subtrees() {
        let shared = Arc::new(Value::from(vec![1, 2, 3]));
        let a = Value::Shared(shared.clone());
        assert_eq!(a, Value::Shared(shared));
        assert_eq!(a, Value::from(vec![1, 2, 3]));
        assert_eq!(a.type_name(), "array");
    }

    #[test]
    fn json_fixtures() {
        let value: Value = serde_json::from_str(r#"{"Array":[{"Number":1.0},"Null"]}"#)
            .expect("Failed to deserialize");
        assert_eq!(value, Value::Array(vec![Value::from(1), Value::Null]));
    }
}
