// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Regular polyhedra from closed-form vertex positions

use super::primitives::{inherit_visibility, Polyhedron};
use crate::ast::{Accessor, FieldSpec, Node, NodeClass, NodeType, Object, Value, Vector};
use crate::error::{Result, ScadError};
use once_cell::sync::Lazy;

/// Height of a regular tetrahedron (or octahedron face-to-face) per unit edge
fn height_ratio() -> f64 {
    (2.0_f64 / 3.0).sqrt()
}

fn edge_of(node: &Node) -> Result<Value> {
    Ok(Value::Float(node.get_f64("height")? / height_ratio()))
}

fn set_edge(node: &mut Node, value: Value) -> Result<()> {
    let edge = value
        .as_f64()
        .ok_or_else(|| ScadError::cast("edge", "float", value.type_name()))?;
    node.set("height", edge * height_ratio())
}

/// Altitude of an equilateral face
fn triangle_height(edge: f64) -> f64 {
    edge * 3.0_f64.sqrt() / 2.0
}

/// Build a polyhedron node carrying the solid's flags and no further geometry
fn as_polyhedron(node: &Node, points: Vec<Vector>, faces: &[[i64; 3]]) -> Result<Node> {
    let mut poly = Polyhedron::node()?;
    poly.set_name(node.name());
    inherit_visibility(node, &mut poly)?;
    poly.set("points", points.into_iter().map(Value::Vector).collect::<Vec<_>>())?;
    poly.set(
        "faces",
        faces.iter().map(|face| face.to_vec()).collect::<Vec<_>>(),
    )?;
    Ok(poly.attach(node.children().iter().cloned()))
}

fn recenter(points: Vec<Vector>, centroid: &Vector) -> Result<Vec<Vector>> {
    points.iter().map(|p| p.checked_sub(centroid)).collect()
}

/// Regular tetrahedron resting on a face, apex up
pub struct Tetrahedron;

const TETRAHEDRON_FACES: [[i64; 3]; 4] = [[0, 1, 2], [1, 0, 3], [0, 2, 3], [2, 1, 3]];

static TETRAHEDRON: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Tetrahedron")
        .extends(Object::class())
        .field(FieldSpec::float("height", 1.0))
        .accessor("edge", Accessor::read_write(edge_of, set_edge))
        .render(|node, opts, level| {
            as_polyhedron(node, tetrahedron_points(node)?, &TETRAHEDRON_FACES)?.render_at(opts, level)
        })
        .build()
});

impl NodeType for Tetrahedron {
    fn class() -> &'static NodeClass {
        &TETRAHEDRON
    }
}

fn tetrahedron_points(node: &Node) -> Result<Vec<Vector>> {
    let height = node.get_f64("height")?;
    let edge = height / height_ratio();
    let th = triangle_height(edge);
    let points = vec![
        Vector::vec3(0.0, 0.0, 0.0),
        Vector::vec3(edge, 0.0, 0.0),
        Vector::vec3(edge / 2.0, th, 0.0),
        Vector::vec3(edge / 2.0, th / 3.0, height),
    ];
    if !node.get_bool("center")? {
        return Ok(points);
    }
    // the centroid sits a quarter of the way up
    recenter(points, &Vector::vec3(edge / 2.0, th / 3.0, height / 4.0))
}

/// Regular octahedron resting on a face
///
/// The top face is the bottom face turned half a revolution about the
/// vertical axis through its centroid.
pub struct Octahedron;

const OCTAHEDRON_FACES: [[i64; 3]; 8] = [
    [0, 1, 2],
    [4, 3, 5],
    [1, 0, 5],
    [2, 1, 3],
    [0, 2, 4],
    [3, 4, 2],
    [4, 5, 0],
    [5, 3, 1],
];

static OCTAHEDRON: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Octahedron")
        .extends(Object::class())
        .field(FieldSpec::float("height", 1.0))
        .accessor("edge", Accessor::read_write(edge_of, set_edge))
        .render(|node, opts, level| {
            as_polyhedron(node, octahedron_points(node)?, &OCTAHEDRON_FACES)?.render_at(opts, level)
        })
        .build()
});

impl NodeType for Octahedron {
    fn class() -> &'static NodeClass {
        &OCTAHEDRON
    }
}

fn octahedron_points(node: &Node) -> Result<Vec<Vector>> {
    let height = node.get_f64("height")?;
    let edge = height / height_ratio();
    let th = triangle_height(edge);
    let points = vec![
        Vector::vec3(0.0, 0.0, 0.0),
        Vector::vec3(edge, 0.0, 0.0),
        Vector::vec3(edge / 2.0, th, 0.0),
        Vector::vec3(edge, th * 2.0 / 3.0, height),
        Vector::vec3(0.0, th * 2.0 / 3.0, height),
        Vector::vec3(edge / 2.0, -th / 3.0, height),
    ];
    if !node.get_bool("center")? {
        return Ok(points);
    }
    recenter(points, &Vector::vec3(edge / 2.0, th / 3.0, height / 2.0))
}

/// Vertex positions of either solid, for callers composing their own meshes
pub fn solid_points(node: &Node) -> Result<Vec<Vector>> {
    if node.class().is_a(Tetrahedron::class()) {
        tetrahedron_points(node)
    } else if node.class().is_a(Octahedron::class()) {
        octahedron_points(node)
    } else {
        Err(ScadError::NotRenderable {
            type_name: node.type_name().to_string(),
        })
    }
}
