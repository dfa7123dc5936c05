// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types shared by the object model, the serializer and the OpenSCAD bridge

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ScadError>;

#[derive(Debug, Error)]
pub enum ScadError {
    #[error("'{type_name}' object has no attribute '{attr}'")]
    AttributeNotFound { type_name: String, attr: String },

    #[error("attribute '{field}' must be castable to {expected}, and can not be {actual}")]
    Cast {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("attribute '{attr}' of '{type_name}' is read-only")]
    ReadOnly { type_name: String, attr: String },

    #[error("attribute '{path}' is unset")]
    AbsentValue { path: String },

    #[error("attribute '{path}' holds {actual}, which has no attributes")]
    NotAnObject { path: String, actual: String },

    #[error("unknown color '{0}'")]
    UnknownColor(String),

    #[error("vector arity mismatch: expected {expected} components, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("{type_name} does not accept {count} positional argument(s)")]
    UnexpectedArguments { type_name: String, count: usize },

    #[error("state stack of '{name}' is empty")]
    EmptyStack { name: String },

    #[error("'{type_name}' has no SCAD representation")]
    NotRenderable { type_name: String },

    #[error("render failed: {0}")]
    Render(String),

    #[error("invalid value '{value}' for option '{option}'")]
    InvalidOption { option: String, value: String },

    #[error("executable not found: {0}")]
    ToolNotFound(String),

    #[error("camera needs both eye and center; '{missing}' is unset")]
    IncompleteCamera { missing: String },

    #[error("no size in '{table}' matches {size} mm exactly")]
    NoExactSize { table: String, size: f64 },

    #[error("'{name}' needs more information to resolve")]
    Underdetermined { name: String },

    #[error("font error: {0}")]
    Font(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScadError {
    pub(crate) fn not_found(type_name: &str, attr: &str) -> Self {
        Self::AttributeNotFound {
            type_name: type_name.to_string(),
            attr: attr.to_string(),
        }
    }

    pub(crate) fn cast(field: &str, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::Cast {
            field: field.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
