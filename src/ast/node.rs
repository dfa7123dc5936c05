// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene nodes: typed attribute namespaces arranged in a tree

use super::{Args, Namer, NodeClass, Value, Vector};
use crate::error::{Result, ScadError};
use crate::io::{self, RenderOptions};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::ops::{Deref, DerefMut};

type Namespace = IndexMap<String, Value>;

/// One primitive, transform, combinator or composite in a scene
#[derive(Clone)]
pub struct Node {
    class: &'static NodeClass,
    name: String,
    namespace: Namespace,
    children: Vec<Node>,
    stack: Vec<Namespace>,
}

/// Something an attribute path can walk into
enum Target<'a> {
    Node(&'a Node),
    Vector(&'a Vector),
}

impl Target<'_> {
    fn has_attr(&self, name: &str) -> bool {
        match self {
            Target::Node(node) => node.has_attr(name),
            Target::Vector(vector) => vector.has_attr(name),
        }
    }

    fn resolve(&self, name: &str) -> String {
        match self {
            Target::Node(node) => node.resolve(name),
            Target::Vector(vector) => vector.resolve(name),
        }
    }
}

impl Node {
    /// Construct an instance named by the process-wide [`Namer`]
    pub fn create(class: &'static NodeClass, args: Args) -> Result<Node> {
        Self::create_with(class, args, Namer::global())
    }

    /// Construct an instance: defaults, then positional arguments, then keywords in order
    pub fn create_with(class: &'static NodeClass, args: Args, namer: &Namer) -> Result<Node> {
        let (positional, keywords, name) = args.into_parts();
        let mut node = Node {
            class,
            name: name.unwrap_or_else(|| namer.next(class.name())),
            namespace: class.schema().defaults()?,
            children: Vec::new(),
            stack: Vec::new(),
        };
        if !positional.is_empty() {
            let apply = class.positional().ok_or_else(|| ScadError::UnexpectedArguments {
                type_name: class.name().to_string(),
                count: positional.len(),
            })?;
            apply(&mut node, positional)?;
        }
        for (key, value) in keywords {
            node.set(&key, value)?;
        }
        if let Some(init) = class.init() {
            init(&mut node)?;
        }
        Ok(node)
    }

    pub fn class(&self) -> &'static NodeClass {
        self.class
    }

    pub fn type_name(&self) -> &'static str {
        self.class.name()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn namespace(&self) -> &IndexMap<String, Value> {
        &self.namespace
    }

    /// Raw read of a canonical field, bypassing aliases and accessors
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.namespace.get(name)
    }

    /// Raw write of a canonical field; the value is cast but not propagated
    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let spec = self
            .class
            .schema()
            .get(name)
            .ok_or_else(|| ScadError::not_found(self.class.name(), name))?;
        let value = spec.coerce(value.into())?;
        self.namespace.insert(name.to_string(), value);
        Ok(())
    }

    /// Borrow a node-typed field
    pub fn node_field(&self, name: &str) -> Result<&Node> {
        match self.namespace.get(name) {
            Some(Value::Node(node)) => Ok(node),
            Some(Value::None) => Err(ScadError::AbsentValue {
                path: name.to_string(),
            }),
            Some(other) => Err(ScadError::NotAnObject {
                path: name.to_string(),
                actual: other.type_name().to_string(),
            }),
            None => Err(ScadError::not_found(self.class.name(), name)),
        }
    }

    pub fn node_field_mut(&mut self, name: &str) -> Result<&mut Node> {
        let type_name = self.class.name();
        match self.namespace.get_mut(name) {
            Some(Value::Node(node)) => Ok(node),
            Some(Value::None) => Err(ScadError::AbsentValue {
                path: name.to_string(),
            }),
            Some(other) => Err(ScadError::NotAnObject {
                path: name.to_string(),
                actual: other.type_name().to_string(),
            }),
            None => Err(ScadError::not_found(type_name, name)),
        }
    }

    // attribute resolution

    /// Canonical path for `name`, or `name` itself when nothing matches
    pub fn resolve(&self, name: &str) -> String {
        if let Some(target) = self.class.aliases().lookup(name) {
            return target.to_string();
        }
        if let Some((head, rest)) = name.split_once('.') {
            let head = self.resolve(head);
            let rest = match self.locate(&head) {
                Some(target) => target.resolve(rest),
                None => rest.to_string(),
            };
            return format!("{head}.{rest}");
        }
        for (field, rest) in self.class.aliases().wildcard_candidates(name) {
            if let Some(target) = self.locate(field) {
                if target.has_attr(rest) {
                    return format!("{field}.{}", target.resolve(rest));
                }
            }
        }
        name.to_string()
    }

    fn locate(&self, path: &str) -> Option<Target<'_>> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let target = match self.namespace.get(head) {
            Some(Value::Node(node)) => Target::Node(node),
            Some(Value::Vector(vector)) => Target::Vector(vector),
            Some(_) => return None,
            None => Target::Node(self.child(head)?),
        };
        match (rest, target) {
            (None, target) => Some(target),
            (Some(rest), Target::Node(node)) => node.locate(rest),
            (Some(_), Target::Vector(_)) => None,
        }
    }

    pub fn has_attr(&self, name: &str) -> bool {
        let path = self.resolve(name);
        match path.split_once('.') {
            None => {
                self.class.accessor(&path).is_some()
                    || self.namespace.contains_key(&path)
                    || self.child(&path).is_some()
            }
            Some((head, rest)) => self
                .locate(head)
                .map(|target| target.has_attr(rest))
                .unwrap_or(false),
        }
    }

    /// Read an attribute by field name, alias, dotted path or child name
    pub fn get(&self, name: &str) -> Result<Value> {
        let path = self.resolve(name);
        self.get_path(&path)
    }

    fn get_path(&self, path: &str) -> Result<Value> {
        let Some((head, rest)) = path.split_once('.') else {
            return self.get_local(path);
        };
        if let Some(accessor) = self.class.accessor(head) {
            let value = (accessor.get)(self)?;
            return descend_get(&value, head, rest);
        }
        if let Some(value) = self.namespace.get(head) {
            return descend_get(value, head, rest);
        }
        match self.child(head) {
            Some(child) => child.get(rest),
            None => Err(ScadError::not_found(self.class.name(), head)),
        }
    }

    fn get_local(&self, name: &str) -> Result<Value> {
        if let Some(accessor) = self.class.accessor(name) {
            return (accessor.get)(self);
        }
        if let Some(value) = self.namespace.get(name) {
            return Ok(value.clone());
        }
        match self.child(name) {
            Some(child) => Ok(Value::Node(Box::new(child.clone()))),
            None => Err(ScadError::not_found(self.class.name(), name)),
        }
    }

    /// Write an attribute, casting per schema and forwarding propagating fields
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let path = self.resolve(name);
        let head = path.split_once('.').map_or(path.as_str(), |(head, _)| head);
        let propagate = self
            .class
            .schema()
            .get(head)
            .map(|spec| spec.propagate)
            .unwrap_or(false);
        let forwarded = propagate.then(|| value.clone());
        let origin = head.to_string();

        self.set_path(&path, value)?;

        if let Some(value) = forwarded {
            self.propagate(name, &origin, value)?;
        }
        Ok(())
    }

    fn set_path(&mut self, path: &str, value: Value) -> Result<()> {
        let Some((head, rest)) = path.split_once('.') else {
            return self.set_local(path, value);
        };
        if let Some(accessor) = self.class.accessor(head).copied() {
            let setter = accessor.set.ok_or_else(|| ScadError::ReadOnly {
                type_name: self.class.name().to_string(),
                attr: head.to_string(),
            })?;
            let mut current = (accessor.get)(self)?;
            descend_set(&mut current, head, rest, value)?;
            return setter(self, current);
        }
        if let Some(slot) = self.namespace.get_mut(head) {
            return descend_set(slot, head, rest, value);
        }
        let type_name = self.class.name();
        match self.child_mut(head) {
            Some(child) => child.set(rest, value),
            None => Err(ScadError::not_found(type_name, head)),
        }
    }

    fn set_local(&mut self, name: &str, value: Value) -> Result<()> {
        if let Some(accessor) = self.class.accessor(name).copied() {
            return match accessor.set {
                Some(setter) => setter(self, value),
                None => Err(ScadError::ReadOnly {
                    type_name: self.class.name().to_string(),
                    attr: name.to_string(),
                }),
            };
        }
        if self.class.schema().contains(name) {
            return self.set_field(name, value);
        }
        Err(ScadError::not_found(self.class.name(), name))
    }

    /// Forward `alias = value` to every other node-valued field that understands it
    fn propagate(&mut self, alias: &str, origin: &str, value: Value) -> Result<()> {
        let targets: Vec<String> = self
            .namespace
            .iter()
            .filter(|(key, value)| key.as_str() != origin && matches!(value, Value::Node(_)))
            .map(|(key, _)| key.clone())
            .collect();
        for field in targets {
            if let Some(Value::Node(inner)) = self.namespace.get_mut(&field) {
                if inner.has_attr(alias) {
                    inner.set(alias, value.clone())?;
                } else {
                    tracing::debug!(
                        node = %self.name,
                        field = %field,
                        alias,
                        "skipping propagation target without matching attribute"
                    );
                }
            }
        }
        Ok(())
    }

    /// Apply keyword updates in order
    pub fn update<I, K, V>(&mut self, updates: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (key, value) in updates {
            self.set(key.as_ref(), value)?;
        }
        Ok(())
    }

    pub fn get_f64(&self, name: &str) -> Result<f64> {
        let value = self.get(name)?;
        value
            .as_f64()
            .ok_or_else(|| ScadError::cast(name, "float", value.type_name()))
    }

    /// Numeric read where an unset value is `None`
    pub fn get_opt_f64(&self, name: &str) -> Result<Option<f64>> {
        match self.get(name)? {
            Value::None => Ok(None),
            value => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| ScadError::cast(name, "float", value.type_name())),
        }
    }

    pub fn get_i64(&self, name: &str) -> Result<i64> {
        let value = self.get(name)?;
        value
            .as_i64()
            .ok_or_else(|| ScadError::cast(name, "int", value.type_name()))
    }

    pub fn get_bool(&self, name: &str) -> Result<bool> {
        let value = self.get(name)?;
        value
            .as_bool()
            .ok_or_else(|| ScadError::cast(name, "bool", value.type_name()))
    }

    pub fn get_string(&self, name: &str) -> Result<String> {
        match self.get(name)? {
            Value::Str(s) => Ok(s),
            other => Err(ScadError::cast(name, "str", other.type_name())),
        }
    }

    pub fn get_vector(&self, name: &str) -> Result<Vector> {
        match self.get(name)? {
            Value::Vector(v) => Ok(v),
            other => Err(ScadError::cast(name, "vector", other.type_name())),
        }
    }

    pub fn get_node(&self, name: &str) -> Result<Node> {
        match self.get(name)? {
            Value::Node(node) => Ok(*node),
            Value::None => Err(ScadError::AbsentValue {
                path: name.to_string(),
            }),
            other => Err(ScadError::NotAnObject {
                path: name.to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    // children

    /// Replace the children and hand the node back for fluent composition
    pub fn attach(mut self, children: impl IntoIterator<Item = Node>) -> Node {
        self.children = children.into_iter().collect();
        self
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Replace the children, returning the disowned ones
    pub fn set_children(&mut self, children: impl IntoIterator<Item = Node>) -> Vec<Node> {
        std::mem::replace(&mut self.children, children.into_iter().collect())
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn remove_child(&mut self, name: &str) -> Option<Node> {
        let idx = self.children.iter().position(|c| c.name == name)?;
        Some(self.children.remove(idx))
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Depth-first search of the subtree below this node
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find_map(|c| if c.name == name { Some(c) } else { c.find(name) })
    }

    // state stack

    pub fn push(&mut self, descend: bool) {
        self.stack.push(self.namespace.clone());
        if descend {
            for child in &mut self.children {
                child.push(true);
            }
        }
    }

    pub fn pop(&mut self, descend: bool) -> Result<()> {
        let snapshot = self.stack.pop().ok_or_else(|| ScadError::EmptyStack {
            name: self.name.clone(),
        })?;
        self.namespace = snapshot;
        if descend {
            for child in &mut self.children {
                child.pop(true)?;
            }
        }
        Ok(())
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Snapshot now; the returned guard restores the snapshot when dropped
    pub fn scope(&mut self) -> ScopeGuard<'_> {
        self.push(false);
        ScopeGuard { node: self }
    }

    /// Run `f` between a push and a pop; the pop also runs on error or panic
    pub fn scoped<T>(&mut self, f: impl FnOnce(&mut Node) -> Result<T>) -> Result<T> {
        let mut guard = self.scope();
        f(&mut guard)
    }

    // rendering

    pub fn render_scad(&self) -> Result<String> {
        self.render_at(&RenderOptions::default(), 0)
    }

    pub fn render_with(&self, opts: &RenderOptions) -> Result<String> {
        self.render_at(opts, 0)
    }

    pub fn render_at(&self, opts: &RenderOptions, level: usize) -> Result<String> {
        match self.class.render_fn() {
            Some(render) => render(self, opts, level),
            None => io::render_call(self, opts, level),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ScadError::Render(e.to_string()))
    }
}

fn descend_get(value: &Value, head: &str, rest: &str) -> Result<Value> {
    match value {
        Value::Node(node) => node.get(rest),
        Value::Vector(vector) => vector.get_value(rest),
        Value::None => Err(ScadError::AbsentValue {
            path: head.to_string(),
        }),
        other => Err(ScadError::NotAnObject {
            path: head.to_string(),
            actual: other.type_name().to_string(),
        }),
    }
}

fn descend_set(slot: &mut Value, head: &str, rest: &str, value: Value) -> Result<()> {
    match slot {
        Value::Node(node) => node.set(rest, value),
        Value::Vector(vector) => vector.set_value(rest, value),
        Value::None => Err(ScadError::AbsentValue {
            path: head.to_string(),
        }),
        other => Err(ScadError::NotAnObject {
            path: head.to_string(),
            actual: other.type_name().to_string(),
        }),
    }
}

/// Restores the guarded node's namespace on drop
pub struct ScopeGuard<'a> {
    node: &'a mut Node,
}

impl Deref for ScopeGuard<'_> {
    type Target = Node;

    fn deref(&self) -> &Node {
        &*self.node
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Node {
        &mut *self.node
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.node.pop(false) {
            tracing::warn!(%err, "scope guard found an empty state stack");
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.class.name())
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("children", &self.children)
            .finish()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class
            && self.name == other.name
            && self.namespace == other.namespace
            && self.children == other.children
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("type", self.class.name())?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("attributes", &self.namespace)?;
        map.serialize_entry("children", &self.children)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FieldSpec, FieldType, NodeType, Object};
    use crate::geometry::RadialResolution;
    use once_cell::sync::Lazy;

    static WIDGET: Lazy<NodeClass> = Lazy::new(|| {
        NodeClass::builder("Widget")
            .extends(Object::class())
            .field(FieldSpec::float("height", 1.0))
            .field(FieldSpec::new("resolution", FieldType::Node(RadialResolution::class()))
                .factory(|| Ok(RadialResolution::node()?.into()))
                .propagate())
            .alias("fn", "resolution.fn")
            .build()
    });

    fn widget(args: Args) -> Node {
        Node::create_with(&WIDGET, args, &Namer::new()).unwrap()
    }

    static SOCKET: Lazy<NodeClass> = Lazy::new(|| {
        NodeClass::builder("Socket")
            .extends(Object::class())
            .field(FieldSpec::new("ball", FieldType::Node(crate::geometry::Sphere::class()))
                .factory(|| Ok(crate::geometry::Sphere::node()?.into())))
            .alias("bore", "ball.d")
            .build()
    });

    #[test]
    fn test_dotted_alias_target_reads_like_it_writes() {
        let mut socket = Node::create_with(&SOCKET, Args::new(), &Namer::new()).unwrap();
        socket.set("bore", 6).unwrap();
        assert_eq!(socket.get_f64("ball.radius").unwrap(), 3.0);
        assert_eq!(socket.get_f64("bore").unwrap(), 6.0);
        assert_eq!(socket.get_f64("ball.r").unwrap(), 3.0);
    }

    #[test]
    fn test_alias_and_dotted_access() {
        let mut w = widget(Args::new().kw("h", 3));
        assert_eq!(w.get("height").unwrap(), Value::Float(3.0));
        w.set("fn", 12).unwrap();
        assert_eq!(w.get("resolution.fn").unwrap(), Value::Float(12.0));
        assert_eq!(w.resolve("fn"), "resolution.fn");
        assert_eq!(w.resolve("nothing"), "nothing");
    }

    #[test]
    fn test_unknown_attribute() {
        let w = widget(Args::new());
        match w.get("nope") {
            Err(ScadError::AttributeNotFound { type_name, attr }) => {
                assert_eq!(type_name, "Widget");
                assert_eq!(attr, "nope");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_positional_without_handler_fails() {
        let err = Node::create(&WIDGET, Args::new().pos(1)).unwrap_err();
        assert!(matches!(err, ScadError::UnexpectedArguments { count: 1, .. }));
    }

    #[test]
    fn test_auto_names_use_injected_counter() {
        let namer = Namer::new();
        let a = Node::create_with(&WIDGET, Args::new(), &namer).unwrap();
        let b = Node::create_with(&WIDGET, Args::new(), &namer).unwrap();
        assert_eq!(a.name(), "Widget_0");
        assert_eq!(b.name(), "Widget_1");
    }

    #[test]
    fn test_push_pop_restores() {
        let mut w = widget(Args::new());
        w.push(false);
        w.set("height", 9).unwrap();
        w.set("fn", 4).unwrap();
        w.pop(false).unwrap();
        assert_eq!(w.get_f64("height").unwrap(), 1.0);
        assert_eq!(w.get_f64("fn").unwrap(), 0.0);
        assert!(matches!(w.pop(false), Err(ScadError::EmptyStack { .. })));
    }

    #[test]
    fn test_scoped_restores_on_error() {
        let mut w = widget(Args::new());
        let result: Result<()> = w.scoped(|node| {
            node.set("height", 5)?;
            node.set("height", "tall")
        });
        assert!(result.is_err());
        assert_eq!(w.get_f64("height").unwrap(), 1.0);
        assert_eq!(w.stack_depth(), 0);
    }

    #[test]
    fn test_children_lookup() {
        let namer = Namer::new();
        let bob = Node::create_with(&WIDGET, Args::new().name("bob"), &namer).unwrap();
        let wrapper = Node::create_with(&WIDGET, Args::new().name("wrap"), &namer)
            .unwrap()
            .attach([bob.clone()]);
        let mut root = widget(Args::new()).attach([wrapper]);

        assert_eq!(root.get("wrap.bob").unwrap(), Value::Node(Box::new(bob.clone())));
        assert_eq!(root.find("bob"), Some(&bob));
        root.set("wrap.bob.h", 7).unwrap();
        assert_eq!(root.get_f64("wrap.bob.height").unwrap(), 7.0);

        let old = root.set_children(Vec::new());
        assert_eq!(old.len(), 1);
        assert!(root.children().is_empty());
    }

    #[test]
    fn test_json_shape() {
        let w = widget(Args::new().name("w"));
        let json: serde_json::Value = serde_json::from_str(&w.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "Widget");
        assert_eq!(json["name"], "w");
        assert_eq!(json["attributes"]["height"], 1.0);
    }
}
