// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solid and planar primitives

use super::resolution::{resolution_args, Radial};
use crate::ast::{
    Accessor, FieldSpec, FieldType, Node, NodeClass, NodeType, Object, Value, Vector, VectorKind,
};
use crate::error::{Result, ScadError};
use crate::io::ScadArg;
use once_cell::sync::Lazy;

/// A single list argument stands for the whole positional list
pub(crate) fn flatten(mut args: Vec<Value>) -> Vec<Value> {
    if args.len() == 1 && matches!(args[0], Value::List(_)) {
        if let Some(Value::List(items)) = args.pop() {
            return items;
        }
    }
    args
}

fn unexpected(node: &Node, count: usize) -> ScadError {
    ScadError::UnexpectedArguments {
        type_name: node.type_name().to_string(),
        count,
    }
}

/// `size` from one scalar/sequence or from one value per axis
fn size_positional(node: &mut Node, args: Vec<Value>) -> Result<()> {
    match args.len() {
        1 => node.set("size", args.into_iter().next().unwrap_or(Value::None)),
        _ => node.set("size", Value::List(args)),
    }
}

/// Single positional radius
fn radius_positional(node: &mut Node, args: Vec<Value>) -> Result<()> {
    let args = flatten(args);
    if args.len() != 1 {
        return Err(unexpected(node, args.len()));
    }
    node.set("radius", args.into_iter().next().unwrap_or(Value::None))
}

fn doubled(node: &Node, field: &str) -> Result<Value> {
    Ok(match node.get_opt_f64(field)? {
        Some(radius) => Value::Float(radius * 2.0),
        None => Value::None,
    })
}

fn halved(node: &mut Node, field: &str, value: Value) -> Result<()> {
    match value {
        Value::None => node.set(field, Value::None),
        value => {
            let diameter = value
                .as_f64()
                .ok_or_else(|| ScadError::cast(field, "float", value.type_name()))?;
            node.set(field, diameter / 2.0)
        }
    }
}

pub struct Cube;

static CUBE: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Cube")
        .scad("cube")
        .extends(Object::class())
        .field(FieldSpec::vector("size", VectorKind::Vec3).default(Vector::vec3(1.0, 1.0, 1.0)))
        .alias("x", "size.x")
        .alias("y", "size.y")
        .alias("z", "size.z")
        .positional(size_positional)
        .scad_args(|node| {
            Ok(vec![
                ScadArg::positional(node.get_vector("size")?),
                ScadArg::named("center", node.get_bool("center")?),
            ])
        })
        .build()
});

impl NodeType for Cube {
    fn class() -> &'static NodeClass {
        &CUBE
    }
}

pub struct Square;

static SQUARE: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Square")
        .scad("square")
        .extends(Object::class())
        .field(FieldSpec::vector("size", VectorKind::Vec2).default(Vector::vec2(1.0, 1.0)))
        .alias("x", "size.x")
        .alias("y", "size.y")
        .positional(size_positional)
        .scad_args(|node| {
            Ok(vec![
                ScadArg::positional(node.get_vector("size")?),
                ScadArg::named("center", node.get_bool("center")?),
            ])
        })
        .build()
});

impl NodeType for Square {
    fn class() -> &'static NodeClass {
        &SQUARE
    }
}

/// Cylinders and cones; a second radius turns the cylinder into a frustum
pub struct Cylinder;

static CYLINDER: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Cylinder")
        .scad("cylinder")
        .extends(Radial::class())
        .field(FieldSpec::float("radius_1", 1.0))
        .field(FieldSpec::new("radius_2", FieldType::Float).optional())
        .field(FieldSpec::float("height", 1.0))
        .accessor(
            "diameter_1",
            Accessor::read_write(
                |node| doubled(node, "radius_1"),
                |node, value| halved(node, "radius_1", value),
            ),
        )
        .accessor(
            "diameter_2",
            Accessor::read_write(
                |node| doubled(node, "radius_2"),
                |node, value| halved(node, "radius_2", value),
            ),
        )
        .scad_args(cylinder_args)
        .build()
});

impl NodeType for Cylinder {
    fn class() -> &'static NodeClass {
        &CYLINDER
    }
}

fn cylinder_args(node: &Node) -> Result<Vec<ScadArg>> {
    let mut args = Vec::new();
    match node.get_opt_f64("radius_2")? {
        Some(r2) if r2 != 0.0 => {
            args.push(ScadArg::named("r1", node.get_f64("radius_1")?));
            args.push(ScadArg::named("r2", r2));
        }
        _ => args.push(ScadArg::named("r", node.get_f64("radius_1")?)),
    }
    args.push(ScadArg::named("h", node.get_f64("height")?));
    args.push(ScadArg::named("center", node.get_bool("center")?));
    args.extend(resolution_args(node)?);
    Ok(args)
}

pub struct Sphere;

static SPHERE: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Sphere")
        .scad("sphere")
        .extends(Radial::class())
        .field(FieldSpec::float("radius", 1.0))
        .accessor(
            "diameter",
            Accessor::read_write(
                |node| doubled(node, "radius"),
                |node, value| halved(node, "radius", value),
            ),
        )
        .positional(radius_positional)
        .scad_args(|node| {
            let mut args = vec![
                ScadArg::named("r", node.get_f64("radius")?),
                ScadArg::named("center", node.get_bool("center")?),
            ];
            args.extend(resolution_args(node)?);
            Ok(args)
        })
        .build()
});

impl NodeType for Sphere {
    fn class() -> &'static NodeClass {
        &SPHERE
    }
}

pub struct Circle;

static CIRCLE: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Circle")
        .scad("circle")
        .extends(Radial::class())
        .field(FieldSpec::float("radius", 1.0))
        .accessor(
            "diameter",
            Accessor::read_write(
                |node| doubled(node, "radius"),
                |node, value| halved(node, "radius", value),
            ),
        )
        .positional(radius_positional)
        .scad_args(|node| {
            let mut args = vec![ScadArg::named("r", node.get_f64("radius")?)];
            args.extend(resolution_args(node)?);
            Ok(args)
        })
        .build()
});

impl NodeType for Circle {
    fn class() -> &'static NodeClass {
        &CIRCLE
    }
}

/// Explicit point list plus faces indexing into it
pub struct Polyhedron;

static POLYHEDRON: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Polyhedron")
        .scad("polyhedron")
        .extends(Object::class())
        .field(FieldSpec::new(
            "points",
            FieldType::list_of(FieldType::Vector(VectorKind::Vec3)),
        ))
        .field(FieldSpec::new(
            "faces",
            FieldType::list_of(FieldType::list_of(FieldType::Int)),
        ))
        .field(FieldSpec::new("convexity", FieldType::Int).optional())
        .scad_args(|node| {
            let mut args = vec![
                ScadArg::named("points", node.get("points")?),
                ScadArg::named("faces", node.get("faces")?),
            ];
            convexity_arg(node, &mut args)?;
            Ok(args)
        })
        .build()
});

impl NodeType for Polyhedron {
    fn class() -> &'static NodeClass {
        &POLYHEDRON
    }
}

pub struct Polygon;

static POLYGON: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Polygon")
        .scad("polygon")
        .extends(Object::class())
        .field(FieldSpec::new(
            "points",
            FieldType::list_of(FieldType::Vector(VectorKind::Vec2)),
        ))
        .field(FieldSpec::new(
            "paths",
            FieldType::list_of(FieldType::list_of(FieldType::Int)),
        ))
        .field(FieldSpec::new("convexity", FieldType::Int).optional())
        .scad_args(|node| {
            let mut args = vec![ScadArg::named("points", node.get("points")?)];
            let paths = node.get("paths")?;
            if paths.as_list().map_or(false, |p| !p.is_empty()) {
                args.push(ScadArg::named("paths", paths));
            }
            convexity_arg(node, &mut args)?;
            Ok(args)
        })
        .build()
});

impl NodeType for Polygon {
    fn class() -> &'static NodeClass {
        &POLYGON
    }
}

/// Copy the visibility flags onto a node standing in for `from` at render time
pub(crate) fn inherit_visibility(from: &Node, to: &mut Node) -> Result<()> {
    for flag in ["disable", "debug", "root", "background"] {
        to.set_field(flag, from.get(flag)?)?;
    }
    Ok(())
}

pub(crate) fn convexity_arg(node: &Node, args: &mut Vec<ScadArg>) -> Result<()> {
    let convexity = node.get("convexity")?;
    if !convexity.is_none() {
        args.push(ScadArg::named("convexity", convexity));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_forms() {
        let cube = Cube::build(args!(1)).unwrap();
        assert_eq!(cube.get_vector("size").unwrap(), Vector::vec3(1.0, 1.0, 1.0));
        let cube = Cube::build(args!(1, 2, 3)).unwrap();
        assert_eq!(cube.get_f64("z").unwrap(), 3.0);
        let cube = Cube::build(args!(2; center = true)).unwrap();
        assert!(cube.get_bool("center").unwrap());
        assert_eq!(
            cube.render_scad().unwrap(),
            "cube([2.0, 2.0, 2.0], center=true);"
        );
    }

    #[test]
    fn test_cylinder_diameter_tracks_radius() {
        let mut cyl = Cylinder::build(args!(h = 10, r = 20)).unwrap();
        assert_relative_eq!(cyl.get_f64("d1").unwrap(), 40.0);
        cyl.set("diameter", 7).unwrap();
        assert_relative_eq!(cyl.get_f64("radius_1").unwrap(), 3.5);
        assert!(cyl.get("d2").unwrap().is_none());
    }

    #[test]
    fn test_frustum_emits_both_radii() {
        let cyl = Cylinder::build(args!(r1 = 2, r2 = 1, h = 3)).unwrap();
        assert_eq!(
            cyl.render_scad().unwrap(),
            "cylinder(r1=2.0, r2=1.0, h=3.0, center=false);"
        );
    }

    #[test]
    fn test_sphere_positional_radius() {
        let sphere = Sphere::build(args!(2)).unwrap();
        assert_relative_eq!(sphere.get_f64("d").unwrap(), 4.0);
        assert_eq!(sphere.render_scad().unwrap(), "sphere(r=2.0, center=false);");
        assert!(Sphere::build(args!(1, 2)).is_err());
    }

    #[test]
    fn test_polygon_paths_are_optional() {
        let mut polygon = Polygon::build(args!(points = vec![vec![0, 0], vec![1, 0], vec![0, 1]]))
            .unwrap();
        assert_eq!(
            polygon.render_scad().unwrap(),
            "polygon(points=[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);"
        );
        polygon.set("paths", vec![vec![0, 1, 2]]).unwrap();
        polygon.set("convexity", 2).unwrap();
        assert_eq!(
            polygon.render_scad().unwrap(),
            "polygon(points=[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]], paths=[[0, 1, 2]], convexity=2);"
        );
    }
}
