//! Normalized configuration values
//!
//! Every value a descriptor schema accepts normalizes into one of a closed
//! set of shapes. Consumers pattern-match exhaustively; there is no dynamic
//! field access and no implicit coercion outside the schema engine.
//!
//! The externally parsed document enters as `serde_json::Value` and is
//! converted once at the pass boundary via [`Value::from_json`]; everything
//! past that boundary works on [`Value`] and [`Node`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Identifier naming a descriptor instance's variable.
///
/// Either declared by the user in the instance's `id` field or generated by
/// the pass driver as `<descriptor>_<index>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Ident(String);

impl Ident {
    /// Creates an identifier from a raw name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A normalized configuration value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Absent value carried by the raw document; rejected by every validator.
    Null,
    /// Boolean flag
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    Str(String),
    /// Reference to another descriptor instance's variable
    Id(Ident),
    /// Length-prefixed binary structure, validated by the schema engine
    Bytes(Vec<u8>),
    /// Homogeneous or heterogeneous list
    List(Vec<Value>),
    /// Nested mapping validated by a nested schema
    Node(Node),
}

impl Value {
    /// Returns the value's type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Id(_) => "identifier",
            Value::Bytes(_) => "byte sequence",
            Value::List(_) => "list",
            Value::Node(_) => "node",
        }
    }

    /// Returns the boolean if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float if this is a `Float` or `Int`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the string if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the identifier if this is an `Id`.
    pub fn as_id(&self) -> Option<&Ident> {
        match self {
            Value::Id(id) => Some(id),
            _ => None,
        }
    }

    /// Returns the bytes if this is a `Bytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the elements if this is a `List`.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the node if this is a `Node`.
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Converts an externally parsed JSON value into a raw `Value`.
    ///
    /// Numbers become `Int` when they fit a signed 64-bit integer and `Float`
    /// otherwise. Objects become `Node`s. No validation happens here; the
    /// schema engine decides what is acceptable.
    pub fn from_json(raw: &serde_json::Value) -> Value {
        match raw {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                let mut node = Node::new();
                for (key, value) in map {
                    node.insert(key, Value::from_json(value));
                }
                Value::Node(node)
            }
        }
    }
}

/// A normalized mapping node produced by applying a schema.
///
/// Field iteration order is deterministic (sorted by key), so serialized
/// output is reproducible across runs on identical input.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Node {
    fields: BTreeMap<String, Value>,
}

impl Node {
    /// Creates an empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Inserts a field, replacing any previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// Returns whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Iterates over `(key, value)` pairs in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over field keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether the node has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the boolean field `key`, if present and a `Bool`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Returns the integer field `key`, if present and an `Int`.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int)
    }

    /// Returns the string field `key`, if present and a `Str`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns the identifier field `key`, if present and an `Id`.
    pub fn get_id(&self, key: &str) -> Option<&Ident> {
        self.get(key).and_then(Value::as_id)
    }

    /// Returns the byte-sequence field `key`, if present and `Bytes`.
    pub fn get_bytes(&self, key: &str) -> Option<&[u8]> {
        self.get(key).and_then(Value::as_bytes)
    }

    /// Returns the list field `key`, if present and a `List`.
    pub fn get_list(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_list)
    }

    /// Returns the nested node field `key`, if present and a `Node`.
    pub fn get_node(&self, key: &str) -> Option<&Node> {
        self.get(key).and_then(Value::as_node)
    }
}
