// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Hollow shapes built by subtracting one cylinder from another
//!
//! The subtracted inner shape is deliberately taller than the outer one
//! (by [`PIPE_PADDING`]) so the boolean never sees coplanar end faces.

use super::primitives::Cylinder;
use super::resolution::Radial;
use crate::args;
use crate::ast::{Accessor, FieldSpec, FieldType, Node, NodeClass, NodeType, Value, Vector};
use crate::error::{Result, ScadError};
use crate::io::{format_value, modifier, render_block, RenderOptions};
use once_cell::sync::Lazy;

/// Inner-to-outer height ratio of a pipe
pub const PIPE_PADDING: f64 = 1.2;
/// Overshoot applied to cutters that must clear a flat face
pub const ENDCAP_OFFSET: f64 = 0.05;

/// Outer cylinder minus a padded inner cylinder
pub struct Pipe;

static PIPE: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Pipe")
        .extends(Radial::class())
        .field(
            FieldSpec::new("inner", FieldType::Node(Cylinder::class()))
                .factory(|| Ok(Cylinder::build(args!(r = 0.5, h = PIPE_PADDING))?.into())),
        )
        .field(
            FieldSpec::new("outer", FieldType::Node(Cylinder::class()))
                .factory(|| Ok(Cylinder::build(args!(r = 1.0, h = 1.0))?.into())),
        )
        .field(FieldSpec::float("_padding", PIPE_PADDING))
        .accessor("padding", Accessor::read_write(pipe_padding, set_pipe_padding))
        .accessor("height", Accessor::read_write(pipe_height, set_pipe_height))
        .wildcard("inner_", "inner")
        .wildcard("outer_", "outer")
        .render(render_pipe)
        .build()
});

impl NodeType for Pipe {
    fn class() -> &'static NodeClass {
        &PIPE
    }
}

fn pipe_height(node: &Node) -> Result<Value> {
    node.get("outer.height")
}

fn set_pipe_height(node: &mut Node, value: Value) -> Result<()> {
    let height = value
        .as_f64()
        .ok_or_else(|| ScadError::cast("height", "float", value.type_name()))?;
    let padding = node.get_f64("_padding")?;
    node.set("outer.height", height)?;
    node.set("inner.height", height * padding)
}

fn pipe_padding(node: &Node) -> Result<Value> {
    node.get("_padding")
}

fn set_pipe_padding(node: &mut Node, value: Value) -> Result<()> {
    node.set("_padding", value)?;
    let height = pipe_height(node)?;
    set_pipe_height(node, height)
}

/// Distance the inner shape is lowered so its overshoot is split evenly between both ends
fn inner_offset(node: &Node) -> Result<f64> {
    if node.get_bool("inner.center")? {
        return Ok(0.0);
    }
    let overshoot = node.get_f64("inner.height")? - node.get_f64("outer.height")?;
    Ok(overshoot / 2.0)
}

fn render_pipe(node: &Node, opts: &RenderOptions, level: usize) -> Result<String> {
    let outer = node.node_field("outer")?;
    let inner = node.node_field("inner")?;
    let offset = inner_offset(node)?;

    let mut body = vec![outer.render_at(opts, level + 2)?];
    if offset == 0.0 {
        body.push(inner.render_at(opts, level + 2)?);
    } else {
        let shift = format_value(&Value::Vector(Vector::vec3(0.0, 0.0, -offset)))?;
        body.push(render_block(
            "",
            &format!("translate({shift})"),
            &[inner.render_at(opts, level + 3)?],
            opts,
            level + 2,
        ));
    }
    body.extend(
        node.children()
            .iter()
            .map(|child| child.render_at(opts, level + 2))
            .collect::<Result<Vec<_>>>()?,
    );

    let difference = render_block("", "difference()", &body, opts, level + 1);
    Ok(render_block(modifier(node), "render()", &[difference], opts, level))
}

/// Accessor over a backing field that rebuilds both cylinders on write
macro_rules! reshaping {
    ($field:literal) => {
        Accessor::read_write(|node| node.get($field), |node, value| reshape_after(node, $field, value))
    };
}

/// Beveling cutter for the rim of a cylinder
///
/// The outer cylinder spans the bevel; the inner cone follows the 45 degree
/// slope from `radius - size` up to `radius`, extended along that slope by the
/// padding so the subtraction leaves a clean ring. `invert` flips the cone to
/// bevel a top rim instead of a bottom one.
pub struct Chamfer;

static CHAMFER: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Chamfer")
        .extends(Pipe::class())
        .field(FieldSpec::float("_radius", 1.0))
        .field(FieldSpec::float("_size", 0.1))
        .field(FieldSpec::bool("_invert", false))
        .accessor("radius", reshaping!("_radius"))
        .accessor("size", reshaping!("_size"))
        .accessor("invert", reshaping!("_invert"))
        .accessor("height", reshaping!("_size"))
        .accessor("padding", reshaping!("_padding"))
        .alias("c", "size")
        .alias("chamfer", "size")
        .init(reshape)
        .build()
});

impl NodeType for Chamfer {
    fn class() -> &'static NodeClass {
        &CHAMFER
    }
}

fn reshape_after(node: &mut Node, field: &str, value: Value) -> Result<()> {
    node.set_field(field, value)?;
    reshape(node)
}

fn reshape(node: &mut Node) -> Result<()> {
    let radius = node.get_f64("_radius")?;
    let size = node.get_f64("_size")?;
    let padding = node.get_f64("_padding")?;
    let invert = node.get_bool("_invert")?;

    let inner_height = size * padding;
    let extension = (inner_height - size) / 2.0;
    let narrow = (radius - size - extension).max(0.0);
    let wide = radius + extension;
    let (r1, r2) = if invert { (wide, narrow) } else { (narrow, wide) };

    node.set("outer.radius_1", radius + size)?;
    node.set("outer.radius_2", Value::None)?;
    node.set("outer.height", size)?;
    node.set("inner.radius_1", r1)?;
    node.set("inner.radius_2", r2)?;
    node.set("inner.height", inner_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::code_eq;
    use approx::assert_relative_eq;

    #[test]
    fn test_pipe_composed_aliases() {
        let pipe = Pipe::build(args!(or1 = 8, or2 = 5, ir1 = 7, ir2 = 2, h = 20.0)).unwrap();
        assert_eq!(pipe.get_f64("ir").unwrap(), 7.0);
        assert_eq!(pipe.get_f64("inner.r2").unwrap(), 2.0);
        assert_eq!(pipe.get_f64("outer.r1").unwrap(), 8.0);
        assert_eq!(pipe.get_f64("outer_radius_2").unwrap(), 5.0);
        assert_eq!(pipe.get_f64("height").unwrap(), 20.0);
        assert_relative_eq!(pipe.get_f64("ih").unwrap(), 24.0);
    }

    #[test]
    fn test_pipe_padding_is_reapplied() {
        let mut pipe = Pipe::build(args!(h = 10)).unwrap();
        pipe.set("padding", 1.5).unwrap();
        assert_relative_eq!(pipe.get_f64("inner.height").unwrap(), 15.0);
        assert_relative_eq!(pipe.get_f64("outer.height").unwrap(), 10.0);
        assert_relative_eq!(inner_offset(&pipe).unwrap(), 2.5);
    }

    #[test]
    fn test_pipe_render_recenters_inner() {
        let pipe = Pipe::build(args!(h = 10, padding = 1.5)).unwrap();
        let expected = "render() {\n    difference() {\n        cylinder(r=1.0, h=10.0, center=false);\n        \
            translate([0.0, 0.0, -2.5]) {\n            cylinder(r=0.5, h=15.0, center=false);\n        }\n    }\n}";
        assert_eq!(pipe.render_scad().unwrap(), expected);
    }

    #[test]
    fn test_centered_pipe_skips_translation() {
        let pipe = Pipe::build(args!(center = true)).unwrap();
        assert!(code_eq(
            &pipe.render_scad().unwrap(),
            "render(){difference(){cylinder(r=1.0,h=1.0,center=true);cylinder(r=0.5,h=1.2,center=true);}}"
        ));
    }

    #[test]
    fn test_resolution_propagates_to_both_cylinders() {
        let pipe = Pipe::build(args!(fn = 32)).unwrap();
        assert_eq!(pipe.get_f64("inner.fn").unwrap(), 32.0);
        assert_eq!(pipe.get_f64("outer.resolution.fn").unwrap(), 32.0);
        assert!(pipe.render_scad().unwrap().contains("$fn=32.0"));
    }

    #[test]
    fn test_chamfer_follows_slope() {
        let chamfer = Chamfer::build(args!(r = 5, c = 1)).unwrap();
        assert_relative_eq!(chamfer.get_f64("outer.radius_1").unwrap(), 6.0);
        assert_relative_eq!(chamfer.get_f64("outer.height").unwrap(), 1.0);
        assert_relative_eq!(chamfer.get_f64("inner.height").unwrap(), 1.2);
        // extended by 0.1 along the slope at each end
        assert_relative_eq!(chamfer.get_f64("inner.radius_1").unwrap(), 3.9);
        assert_relative_eq!(chamfer.get_f64("inner.radius_2").unwrap(), 5.1);
        assert_relative_eq!(chamfer.get_f64("height").unwrap(), 1.0);

        let inverted = Chamfer::build(args!(r = 5, c = 1, invert = true)).unwrap();
        assert_relative_eq!(inverted.get_f64("inner.radius_1").unwrap(), 5.1);
        assert_relative_eq!(inverted.get_f64("inner.radius_2").unwrap(), 3.9);
    }

    #[test]
    fn test_chamfer_reshapes_on_write() {
        let mut chamfer = Chamfer::build(args!(r = 5, c = 1)).unwrap();
        chamfer.set("size", 2).unwrap();
        assert_relative_eq!(chamfer.get_f64("outer.radius_1").unwrap(), 7.0);
        assert_relative_eq!(chamfer.get_f64("inner.height").unwrap(), 2.4);
        chamfer.set("radius", 1).unwrap();
        assert_relative_eq!(chamfer.get_f64("inner.radius_1").unwrap(), 0.0);
    }
}
