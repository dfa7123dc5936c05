// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Object model
//!
//! Typed attribute namespaces, alias resolution and the scene tree every
//! primitive and composite is built from

mod alias;
mod args;
mod class;
mod namer;
mod node;
mod schema;
mod value;
mod vector;

pub use alias::{global_aliases, AliasMap, Wildcard, GLOBAL_ALIASES};
pub use args::{Args, NAME_KEY};
pub use class::{
    Accessor, GetterFn, InitFn, NodeClass, NodeClassBuilder, NodeType, Object, PositionalFn,
    RenderFn, ScadArgsFn, SetterFn,
};
pub use namer::Namer;
pub use node::{Node, ScopeGuard};
pub use schema::{FieldDefault, FieldSpec, Schema};
pub use value::{FieldType, Value};
pub use vector::{Vector, VectorKind};
