// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Field schemas and their merge rules across a class lineage

use super::{FieldType, Value, VectorKind};
use crate::error::Result;
use indexmap::IndexMap;

/// Default for a schema field
#[derive(Debug, Clone)]
pub enum FieldDefault {
    /// Zero value of the declared type
    TypeDefault,
    Value(Value),
    /// Evaluated for every new instance (nested objects, fresh collections)
    Factory(fn() -> Result<Value>),
}

/// One typed attribute of a node class
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
    pub default: FieldDefault,
    pub cast: bool,
    pub propagate: bool,
}

impl FieldSpec {
    pub fn new(name: &str, ty: FieldType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            default: FieldDefault::TypeDefault,
            cast: true,
            propagate: false,
        }
    }

    pub fn bool(name: &str, default: bool) -> Self {
        Self::new(name, FieldType::Bool).default(default)
    }

    pub fn int(name: &str) -> Self {
        Self::new(name, FieldType::Int)
    }

    pub fn float(name: &str, default: f64) -> Self {
        Self::new(name, FieldType::Float).default(default)
    }

    pub fn str(name: &str) -> Self {
        Self::new(name, FieldType::Str)
    }

    pub fn vector(name: &str, kind: VectorKind) -> Self {
        Self::new(name, FieldType::Vector(kind))
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    /// Field starts out unset
    pub fn optional(mut self) -> Self {
        self.default = FieldDefault::Value(Value::None);
        self
    }

    pub fn factory(mut self, factory: fn() -> Result<Value>) -> Self {
        self.default = FieldDefault::Factory(factory);
        self
    }

    pub fn no_cast(mut self) -> Self {
        self.cast = false;
        self
    }

    pub fn propagate(mut self) -> Self {
        self.propagate = true;
        self
    }

    pub fn default_value(&self) -> Result<Value> {
        match &self.default {
            FieldDefault::TypeDefault => self.ty.zero_value(),
            FieldDefault::Value(value) => Ok(value.clone()),
            FieldDefault::Factory(factory) => factory(),
        }
    }

    /// Apply the field's cast rule to an incoming value
    pub fn coerce(&self, value: Value) -> Result<Value> {
        if self.cast {
            self.ty.cast(&self.name, value)
        } else {
            Ok(value)
        }
    }
}

/// Ordered field table of a node class
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, FieldSpec>,
}

impl Schema {
    /// Union of the parents' tables (first-listed parent wins among ancestors)
    /// overridden wholesale by the class's own declarations
    pub fn merge(parents: &[&Schema], own: Vec<FieldSpec>) -> Schema {
        let mut fields: IndexMap<String, FieldSpec> = IndexMap::new();
        for parent in parents {
            for (name, spec) in &parent.fields {
                fields.entry(name.clone()).or_insert_with(|| spec.clone());
            }
        }
        for spec in own {
            fields.insert(spec.name.clone(), spec);
        }
        Schema { fields }
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fresh namespace populated with every field's default
    pub fn defaults(&self) -> Result<IndexMap<String, Value>> {
        self.fields
            .values()
            .map(|spec| Ok((spec.name.clone(), spec.default_value()?)))
            .collect()
    }
}
