// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Node classes: the immutable, per-type description every node instance shares

use super::alias::{AliasMap, AliasSources, Wildcard};
use super::{FieldSpec, Node, Schema, Value};
use crate::error::Result;
use crate::io::{RenderOptions, ScadArg};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::fmt;

/// Computed attribute read hook
pub type GetterFn = fn(&Node) -> Result<Value>;
/// Computed attribute write hook
pub type SetterFn = fn(&mut Node, Value) -> Result<()>;
/// Maps positional constructor arguments onto attributes
pub type PositionalFn = fn(&mut Node, Vec<Value>) -> Result<()>;
/// Produces the ordered argument list of the emitted call
pub type ScadArgsFn = fn(&Node) -> Result<Vec<ScadArg>>;
/// Replaces the generic call renderer
pub type RenderFn = fn(&Node, &RenderOptions, usize) -> Result<String>;
/// Runs once construction arguments have been applied
pub type InitFn = fn(&mut Node) -> Result<()>;

/// A derived get/set pair that behaves like a field during alias resolution
#[derive(Clone, Copy)]
pub struct Accessor {
    pub get: GetterFn,
    pub set: Option<SetterFn>,
}

impl Accessor {
    pub fn read_write(get: GetterFn, set: SetterFn) -> Self {
        Self { get, set: Some(set) }
    }

    pub fn read_only(get: GetterFn) -> Self {
        Self { get, set: None }
    }
}

pub struct NodeClass {
    name: &'static str,
    scad_name: Option<&'static str>,
    lineage: Vec<&'static str>,
    schema: Schema,
    explicit_aliases: Vec<(String, String)>,
    wildcards: Vec<Wildcard>,
    aliases: AliasMap,
    accessors: IndexMap<&'static str, Accessor>,
    positional: Option<PositionalFn>,
    scad_args: ScadArgsFn,
    render: Option<RenderFn>,
    init: Option<InitFn>,
}

impl NodeClass {
    pub fn builder(name: &'static str) -> NodeClassBuilder {
        NodeClassBuilder {
            name,
            scad_name: None,
            parents: Vec::new(),
            fields: Vec::new(),
            aliases: Vec::new(),
            wildcards: Vec::new(),
            accessors: Vec::new(),
            positional: None,
            scad_args: None,
            render: None,
            init: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Keyword of the emitted CSG call, if this class maps onto one
    pub fn scad_name(&self) -> Option<&'static str> {
        self.scad_name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn aliases(&self) -> &AliasMap {
        &self.aliases
    }

    pub fn accessor(&self, name: &str) -> Option<&Accessor> {
        self.accessors.get(name)
    }

    pub fn accessor_names(&self) -> impl Iterator<Item = &str> {
        self.accessors.keys().copied()
    }

    /// Self first, then every ancestor
    pub fn lineage(&self) -> &[&'static str] {
        &self.lineage
    }

    pub fn is_a(&self, other: &NodeClass) -> bool {
        self.lineage.contains(&other.name)
    }

    pub(crate) fn positional(&self) -> Option<PositionalFn> {
        self.positional
    }

    pub(crate) fn scad_args(&self) -> ScadArgsFn {
        self.scad_args
    }

    pub(crate) fn render_fn(&self) -> Option<RenderFn> {
        self.render
    }

    pub(crate) fn init(&self) -> Option<InitFn> {
        self.init
    }
}

impl fmt::Debug for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeClass")
            .field("name", &self.name)
            .field("scad_name", &self.scad_name)
            .field("fields", &self.schema.names().collect::<Vec<_>>())
            .field("accessors", &self.accessors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PartialEq for NodeClass {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn no_scad_args(_: &Node) -> Result<Vec<ScadArg>> {
    Ok(Vec::new())
}

/// Registration-time description of a class; `build` freezes it
pub struct NodeClassBuilder {
    name: &'static str,
    scad_name: Option<&'static str>,
    parents: Vec<&'static NodeClass>,
    fields: Vec<FieldSpec>,
    aliases: Vec<(String, String)>,
    wildcards: Vec<Wildcard>,
    accessors: Vec<(&'static str, Accessor)>,
    positional: Option<PositionalFn>,
    scad_args: Option<ScadArgsFn>,
    render: Option<RenderFn>,
    init: Option<InitFn>,
}

impl NodeClassBuilder {
    pub fn scad(mut self, scad_name: &'static str) -> Self {
        self.scad_name = Some(scad_name);
        self
    }

    pub fn extends(mut self, parent: &'static NodeClass) -> Self {
        self.parents.push(parent);
        self
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn alias(mut self, alias: &str, target: &str) -> Self {
        self.aliases.push((alias.to_string(), target.to_string()));
        self
    }

    /// Route `prefix<rest>` to `field.<rest>` when the field's value has `rest`
    pub fn wildcard(mut self, prefix: &str, field: &str) -> Self {
        self.wildcards.push(Wildcard {
            prefix: prefix.to_string(),
            field: field.to_string(),
        });
        self
    }

    pub fn accessor(mut self, name: &'static str, accessor: Accessor) -> Self {
        self.accessors.push((name, accessor));
        self
    }

    pub fn positional(mut self, f: PositionalFn) -> Self {
        self.positional = Some(f);
        self
    }

    pub fn scad_args(mut self, f: ScadArgsFn) -> Self {
        self.scad_args = Some(f);
        self
    }

    pub fn render(mut self, f: RenderFn) -> Self {
        self.render = Some(f);
        self
    }

    pub fn init(mut self, f: InitFn) -> Self {
        self.init = Some(f);
        self
    }

    pub fn build(self) -> NodeClass {
        let parent_schemas: Vec<&Schema> = self.parents.iter().map(|p| &p.schema).collect();
        let schema = Schema::merge(&parent_schemas, self.fields);

        let mut accessors: IndexMap<&'static str, Accessor> = IndexMap::new();
        for parent in &self.parents {
            for (name, acc) in &parent.accessors {
                accessors.entry(*name).or_insert(*acc);
            }
        }
        for (name, acc) in self.accessors {
            accessors.insert(name, acc);
        }

        let mut explicit_aliases = self.aliases;
        for parent in &self.parents {
            explicit_aliases.extend(parent.explicit_aliases.iter().cloned());
        }
        let mut wildcards = self.wildcards;
        for parent in &self.parents {
            for wc in &parent.wildcards {
                if !wildcards.contains(wc) {
                    wildcards.push(wc.clone());
                }
            }
        }

        let accessor_names: Vec<&str> = accessors.keys().copied().collect();
        let aliases = AliasMap::build(AliasSources {
            explicit: &explicit_aliases,
            schema: &schema,
            accessors: &accessor_names,
            wildcards: wildcards.clone(),
        });

        let mut lineage = vec![self.name];
        for parent in &self.parents {
            for ancestor in &parent.lineage {
                if !lineage.contains(ancestor) {
                    lineage.push(*ancestor);
                }
            }
        }

        let scad_name = self
            .scad_name
            .or_else(|| self.parents.iter().find_map(|p| p.scad_name));
        let positional = self
            .positional
            .or_else(|| self.parents.iter().find_map(|p| p.positional));
        let render = self
            .render
            .or_else(|| self.parents.iter().find_map(|p| p.render));
        let init = self
            .init
            .or_else(|| self.parents.iter().find_map(|p| p.init));
        let scad_args = self
            .scad_args
            .or_else(|| self.parents.first().map(|p| p.scad_args))
            .unwrap_or(no_scad_args);

        NodeClass {
            name: self.name,
            scad_name,
            lineage,
            schema,
            explicit_aliases,
            wildcards,
            aliases,
            accessors,
            positional,
            scad_args,
            render,
            init,
        }
    }
}

/// Types backed by a registered [`NodeClass`]
pub trait NodeType {
    fn class() -> &'static NodeClass;

    /// Construct an instance from constructor arguments
    fn build(args: super::Args) -> Result<Node> {
        Node::create(Self::class(), args)
    }

    /// Construct an instance with every field at its default
    fn node() -> Result<Node> {
        Self::build(super::Args::new())
    }
}

/// Root of every class: visibility flags and centering
pub struct Object;

static OBJECT: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Object")
        .field(FieldSpec::bool("disable", false).propagate())
        .field(FieldSpec::bool("debug", false).propagate())
        .field(FieldSpec::bool("root", false).propagate())
        .field(FieldSpec::bool("background", false).propagate())
        .field(FieldSpec::bool("center", false).propagate())
        .build()
});

impl NodeType for Object {
    fn class() -> &'static NodeClass {
        &OBJECT
    }
}
