// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Attribute values and the typed casting rules applied on assignment

use super::{Args, Node, NodeClass, Vector, VectorKind};
use crate::error::{Result, ScadError};
use indexmap::IndexMap;
use serde::Serialize;

/// A dynamically typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Vector(Vector),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Node(Box<Node>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Vector(v) => v.kind().name(),
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Node(_) => "node",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Numeric view of ints and floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&Vector> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn into_node(self) -> Option<Node> {
        match self {
            Value::Node(node) => Some(*node),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vector> for Value {
    fn from(v: Vector) -> Self {
        Value::Vector(v)
    }
}

impl From<Node> for Value {
    fn from(v: Node) -> Self {
        Value::Node(Box::new(v))
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(v: IndexMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::None)
    }
}

/// Declared type of a schema field
#[derive(Debug, Clone)]
pub enum FieldType {
    /// Stored as given, never cast
    Any,
    Bool,
    Int,
    Float,
    Str,
    Vector(VectorKind),
    List(Box<FieldType>),
    Map,
    Node(&'static NodeClass),
}

impl FieldType {
    pub fn list_of(item: FieldType) -> Self {
        FieldType::List(Box::new(item))
    }

    pub fn describe(&self) -> String {
        match self {
            FieldType::Any => "any".to_string(),
            FieldType::Bool => "bool".to_string(),
            FieldType::Int => "int".to_string(),
            FieldType::Float => "float".to_string(),
            FieldType::Str => "str".to_string(),
            FieldType::Vector(kind) => kind.name().to_string(),
            FieldType::List(item) => format!("list of {}", item.describe()),
            FieldType::Map => "map".to_string(),
            FieldType::Node(class) => class.name().to_string(),
        }
    }

    /// The zero value used when a field declares no explicit default
    pub fn zero_value(&self) -> Result<Value> {
        Ok(match self {
            FieldType::Any => Value::None,
            FieldType::Bool => Value::Bool(false),
            FieldType::Int => Value::Int(0),
            FieldType::Float => Value::Float(0.0),
            FieldType::Str => Value::Str(String::new()),
            FieldType::Vector(kind) => Value::Vector(Vector::new(*kind)),
            FieldType::List(_) => Value::List(Vec::new()),
            FieldType::Map => Value::Map(IndexMap::new()),
            FieldType::Node(class) => Value::Node(Box::new(Node::create(*class, Args::new())?)),
        })
    }

    /// Construct this type from `value`; `None` always passes through (unset)
    pub fn cast(&self, field: &str, value: Value) -> Result<Value> {
        if value.is_none() {
            return Ok(value);
        }
        let mismatch = |value: &Value| ScadError::cast(field, self.describe(), value.type_name());

        match self {
            FieldType::Any => Ok(value),

            FieldType::Bool => match value {
                Value::Bool(_) => Ok(value),
                Value::Int(i) => Ok(Value::Bool(i != 0)),
                Value::Float(f) => Ok(Value::Bool(f != 0.0)),
                Value::Str(ref s) => match s.to_ascii_lowercase().as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(mismatch(&value)),
                },
                other => Err(mismatch(&other)),
            },

            FieldType::Int => match value {
                Value::Int(_) => Ok(value),
                Value::Float(f) => Ok(Value::Int(f.trunc() as i64)),
                Value::Bool(b) => Ok(Value::Int(i64::from(b))),
                Value::Str(ref s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| mismatch(&value)),
                other => Err(mismatch(&other)),
            },

            FieldType::Float => match value {
                Value::Float(_) => Ok(value),
                Value::Int(i) => Ok(Value::Float(i as f64)),
                Value::Bool(b) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
                Value::Str(ref s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| mismatch(&value)),
                other => Err(mismatch(&other)),
            },

            FieldType::Str => match value {
                Value::Str(_) => Ok(value),
                Value::Bool(b) => Ok(Value::Str(b.to_string())),
                Value::Int(i) => Ok(Value::Str(i.to_string())),
                Value::Float(f) => Ok(Value::Str(format!("{:?}", f))),
                other => Err(mismatch(&other)),
            },

            FieldType::Vector(kind) => match value {
                Value::Vector(v) if v.kind() == *kind => Ok(Value::Vector(v)),
                Value::Vector(v) => Ok(Value::Vector(Vector::from_values(*kind, v.values())?)),
                Value::Int(_) | Value::Float(_) => {
                    let scalar = value.as_f64().unwrap_or_default();
                    Ok(Value::Vector(Vector::splat(*kind, scalar)))
                }
                Value::List(ref items) => {
                    let numbers: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
                    match numbers {
                        Some(numbers) => Ok(Value::Vector(Vector::from_values(*kind, &numbers)?)),
                        None => Err(mismatch(&value)),
                    }
                }
                Value::Str(ref name) if *kind == VectorKind::Color => {
                    Ok(Value::Vector(Vector::from_color_name(name)?))
                }
                other => Err(mismatch(&other)),
            },

            FieldType::List(item) => {
                let items: Vec<Value> = match value {
                    Value::List(items) => items,
                    Value::Vector(v) => v.iter().map(Value::Float).collect(),
                    other => return Err(mismatch(&other)),
                };
                items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, v)| item.cast(&format!("{field}[{idx}]"), v))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::List)
            }

            FieldType::Map => match value {
                Value::Map(_) => Ok(value),
                other => Err(mismatch(&other)),
            },

            FieldType::Node(class) => match value {
                Value::Node(node) if node.class().is_a(class) => Ok(Value::Node(node)),
                Value::Map(kwargs) => {
                    let args = kwargs
                        .into_iter()
                        .fold(Args::new(), |args, (key, val)| args.kw(&key, val));
                    Ok(Value::Node(Box::new(Node::create(*class, args)?)))
                }
                Value::List(items) => {
                    let args = items.into_iter().fold(Args::new(), |args, val| args.pos(val));
                    Ok(Value::Node(Box::new(Node::create(*class, args)?)))
                }
                other => Err(mismatch(&other)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_casts() {
        assert_eq!(FieldType::Float.cast("h", Value::Int(10)).unwrap(), Value::Float(10.0));
        assert_eq!(FieldType::Int.cast("n", Value::Float(2.7)).unwrap(), Value::Int(2));
        assert_eq!(
            FieldType::Float.cast("h", Value::from("2.5")).unwrap(),
            Value::Float(2.5)
        );
    }

    #[test]
    fn test_cast_failure_names_field_and_types() {
        let err = FieldType::Float.cast("height", Value::from("tall")).unwrap_err();
        match err {
            ScadError::Cast { field, expected, actual } => {
                assert_eq!(field, "height");
                assert_eq!(expected, "float");
                assert_eq!(actual, "str");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_vector_casts() {
        let v = FieldType::Vector(VectorKind::Vec3)
            .cast("size", Value::from(vec![1, 2, 3]))
            .unwrap();
        assert_eq!(v, Value::Vector(Vector::vec3(1.0, 2.0, 3.0)));

        let splat = FieldType::Vector(VectorKind::Vec3)
            .cast("size", Value::Int(2))
            .unwrap();
        assert_eq!(splat, Value::Vector(Vector::vec3(2.0, 2.0, 2.0)));

        assert!(FieldType::Vector(VectorKind::Vec2)
            .cast("size", Value::from(vec![1, 2, 3]))
            .is_err());
    }

    #[test]
    fn test_nested_list_cast() {
        let faces = FieldType::list_of(FieldType::list_of(FieldType::Int))
            .cast("faces", Value::from(vec![vec![0.0, 1.0, 2.0]]))
            .unwrap();
        assert_eq!(
            faces,
            Value::List(vec![Value::List(vec![
                Value::Int(0),
                Value::Int(1),
                Value::Int(2)
            ])])
        );
    }

    #[test]
    fn test_none_passes_through() {
        assert_eq!(FieldType::Float.cast("r2", Value::None).unwrap(), Value::None);
    }
}
