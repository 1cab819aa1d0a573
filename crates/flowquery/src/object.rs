//! Object model seam
//!
//! The engine never looks inside the objects it queries. Everything the
//! built-in operations need (property access, identity, type tests, scalar
//! views) goes through [`QueryObject`]. An implementation for
//! [`serde_json::Value`] ships with the crate.

use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

use crate::config::QueryConfig;

/// An element of a query context
pub trait QueryObject: Clone + PartialEq + fmt::Debug {
    /// Value of a single property, `None` when absent
    fn property(&self, name: &str) -> Option<Self>;

    /// Value at a dotted property path such as `resource.fileExtension`
    fn property_path(&self, path: &str) -> Option<Self> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.property(first)?, |current, segment| {
            current.property(segment)
        })
    }

    /// Object identifier, used by `#identifier` filters
    fn identifier(&self, config: &QueryConfig) -> Option<String>;

    /// `instanceof` test against a builtin type name or a class/type name
    fn is_instance_of(&self, type_name: &str, config: &QueryConfig) -> bool;

    /// Scalar view; `None` for composite values
    fn scalar(&self) -> Option<Scalar>;

    /// List view for list-valued properties
    fn items(&self) -> Option<Vec<Self>>;

    fn is_null(&self) -> bool {
        matches!(self.scalar(), Some(Scalar::Null))
    }
}

/// Comparable scalar value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    /// Text used by string operators; `None` for null
    pub fn as_text(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(b) => Some(b.to_string()),
            Scalar::Int(i) => Some(i.to_string()),
            Scalar::Float(f) => Some(f.to_string()),
            Scalar::String(s) => Some(s.clone()),
        }
    }

    /// Ordering for `<`, `<=`, `>`, `>=`.
    ///
    /// Numbers compare numerically (ints and floats mix), strings compare
    /// lexicographically; every other pairing is unordered.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
            (Scalar::Int(a), Scalar::Float(b)) => (*a as f64).partial_cmp(b),
            (Scalar::Float(a), Scalar::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Scalar::Float(a), Scalar::Float(b)) => a.partial_cmp(b),
            (Scalar::String(a), Scalar::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<&fizzle::Operand> for Scalar {
    fn from(operand: &fizzle::Operand) -> Self {
        match operand {
            fizzle::Operand::String(s) | fizzle::Operand::Unquoted(s) => Scalar::String(s.clone()),
            fizzle::Operand::Integer(i) => Scalar::Int(*i),
            fizzle::Operand::Float(f) => Scalar::Float(*f),
            fizzle::Operand::Boolean(b) => Scalar::Bool(*b),
        }
    }
}

fn normalize_type_name(name: &str) -> &str {
    name.trim_start_matches('\\')
}

impl QueryObject for Value {
    fn property(&self, name: &str) -> Option<Self> {
        match self {
            Value::Object(map) => map.get(name).cloned(),
            Value::Array(items) => name.parse::<usize>().ok().and_then(|i| items.get(i).cloned()),
            _ => None,
        }
    }

    fn identifier(&self, config: &QueryConfig) -> Option<String> {
        match self.get(&config.identity_property)? {
            Value::String(id) => Some(id.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn is_instance_of(&self, type_name: &str, config: &QueryConfig) -> bool {
        match type_name {
            "object" => self.is_object(),
            "array" => self.is_array(),
            "string" => self.is_string(),
            // Numbers outside i64 have a float scalar view, so they are floats here too
            "integer" | "int" => self.is_i64(),
            "float" | "double" => self.is_number() && !self.is_i64(),
            "boolean" | "bool" => self.is_boolean(),
            "null" => self.is_null(),
            class => {
                let wanted = normalize_type_name(class);
                match self.get(&config.type_property) {
                    Some(Value::String(declared)) => normalize_type_name(declared) == wanted,
                    Some(Value::Array(declared)) => declared
                        .iter()
                        .filter_map(Value::as_str)
                        .any(|d| normalize_type_name(d) == wanted),
                    _ => false,
                }
            }
        }
    }

    fn scalar(&self) -> Option<Scalar> {
        match self {
            Value::Null => Some(Scalar::Null),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Scalar::Int(i)),
                None => n.as_f64().map(Scalar::Float),
            },
            Value::String(s) => Some(Scalar::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn items(&self) -> Option<Vec<Self>> {
        self.as_array().cloned()
    }
}
