// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Angular sections of rings and discs, approximated by polygons and extruded

use super::operations::LinearExtrude;
use super::primitives::{inherit_visibility, Polygon};
use super::resolution::{resolution_of, Radial};
use crate::args;
use crate::ast::{Accessor, FieldSpec, Node, NodeClass, NodeType, Value, Vector};
use crate::error::Result;
use once_cell::sync::Lazy;

/// Components closer to zero than this are written as zero
const SNAP: f64 = 1e-12;

fn snap(v: f64) -> f64 {
    if v.abs() < SNAP {
        0.0
    } else {
        v
    }
}

/// Ring sector between two radii, swept from `start_angle` through `angle` degrees
pub struct Arc;

static ARC: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Arc")
        .extends(Radial::class())
        .field(FieldSpec::float("inner_radius", 0.5))
        .field(FieldSpec::float("outer_radius", 1.0))
        .field(FieldSpec::float("height", 1.0))
        .field(FieldSpec::float("angle", 90.0))
        .field(FieldSpec::float("start_angle", 0.0))
        .accessor(
            "points",
            Accessor::read_only(|node| {
                Ok(arc_points(node)?
                    .into_iter()
                    .map(Value::Vector)
                    .collect::<Vec<_>>()
                    .into())
            }),
        )
        .render(|node, opts, level| extruded(node)?.render_at(opts, level))
        .build()
});

impl NodeType for Arc {
    fn class() -> &'static NodeClass {
        &ARC
    }
}

/// Boundary of the cross-section, counter-clockwise along the outer edge
///
/// The outer edge gets `fragments + 1` points; the inner edge repeats them in
/// reverse, or collapses to the origin for a filled sector.
pub fn arc_points(node: &Node) -> Result<Vec<Vector>> {
    let inner = node.get_f64("inner_radius")?;
    let outer = node.get_f64("outer_radius")?;
    let sweep = node.get_f64("angle")?;
    let start = node.get_f64("start_angle")?;

    let length = outer * sweep.to_radians();
    let fragments = resolution_of(node)?.fragments(length, sweep).max(1);
    let step = sweep / fragments as f64;
    let at = |radius: f64, i: usize| {
        let theta = (start + step * i as f64).to_radians();
        Vector::vec2(snap(radius * theta.cos()), snap(radius * theta.sin()))
    };

    let mut points: Vec<Vector> = (0..=fragments).map(|i| at(outer, i)).collect();
    if inner > 0.0 {
        points.extend((0..=fragments).rev().map(|i| at(inner, i)));
    } else {
        points.push(Vector::vec2(0.0, 0.0));
    }
    Ok(points)
}

/// `linear_extrude` of the cross-section, carrying the arc's flags and children
fn extruded(node: &Node) -> Result<Node> {
    let points = arc_points(node)?
        .into_iter()
        .map(Value::Vector)
        .collect::<Vec<_>>();
    let polygon = Polygon::build(args!(points = points))?;

    let mut extrude = LinearExtrude::build(args!(
        height = node.get_f64("height")?,
        center = node.get_bool("center")?
    ))?;
    extrude.set_name(node.name());
    inherit_visibility(node, &mut extrude)?;
    let children = std::iter::once(polygon).chain(node.children().iter().cloned());
    Ok(extrude.attach(children))
}

/// Filled sector of a disc
pub struct PieSlice;

static PIE_SLICE: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("PieSlice")
        .extends(Arc::class())
        .field(FieldSpec::float("inner_radius", 0.0))
        .alias("radius", "outer_radius")
        .alias("r", "outer_radius")
        .alias("R", "outer_radius")
        .build()
});

impl NodeType for PieSlice {
    fn class() -> &'static NodeClass {
        &PIE_SLICE
    }
}

/// Half cylinder lying on its cut face
pub struct SemiCylinder;

static SEMI_CYLINDER: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("SemiCylinder")
        .extends(PieSlice::class())
        .field(FieldSpec::float("angle", 180.0))
        .build()
});

impl NodeType for SemiCylinder {
    fn class() -> &'static NodeClass {
        &SEMI_CYLINDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_arc_aliases_and_point_count() {
        let arc = Arc::build(args!(height = 4, iR = 4, oR = 8, center = true)).unwrap();
        assert_eq!(arc.get_f64("h").unwrap(), 4.0);
        assert_eq!(arc.get_f64("ir").unwrap(), 4.0);
        // length 8 * pi / 2 over fs 2 gives 6.28, rounded up to 7 fragments
        let points = arc_points(&arc).unwrap();
        assert_eq!(points.len(), 16);
        assert_relative_eq!(points[0].x(), 8.0);
        assert_relative_eq!(points[7].y(), 8.0);
        assert_relative_eq!(points[8].y(), 4.0);
        assert_relative_eq!(points[15].x(), 4.0);
    }

    #[test]
    fn test_pie_slice_closes_at_origin() {
        let pie = PieSlice::build(args!(r = 2, fn = 4)).unwrap();
        let points = arc_points(&pie).unwrap();
        assert_eq!(points.len(), 6);
        assert_eq!(points[5], Vector::vec2(0.0, 0.0));
        assert_eq!(points[4], Vector::vec2(0.0, 2.0));
    }

    #[test]
    fn test_start_angle_rotates_section() {
        let semi = SemiCylinder::build(args!(r = 1, start = 90, fn = 2)).unwrap();
        let points = arc_points(&semi).unwrap();
        // fn is raised to three segments
        assert_eq!(points.len(), 5);
        assert_eq!(points[0].x(), 0.0);
        assert_relative_eq!(points[0].y(), 1.0);
        assert_eq!(points[3].x(), 0.0);
        assert_relative_eq!(points[3].y(), -1.0);
    }

    #[test]
    fn test_zero_adaptive_resolution_is_bounded() {
        let pie = PieSlice::build(args!(r = 1, angle = 90, fa = 0, fs = 0)).unwrap();
        // pi / 2 over the 0.01 floor gives 157.08, rounded up to 158 fragments
        assert_eq!(arc_points(&pie).unwrap().len(), 160);

        let pie = PieSlice::build(args!(r = 1, angle = 90, fn = 1e12)).unwrap();
        let points = arc_points(&pie).unwrap();
        assert_eq!(points.len(), crate::geometry::MAX_FRAGMENTS as usize + 2);
    }

    #[test]
    fn test_renders_as_extruded_polygon() {
        let pie = PieSlice::build(args!(r = 1, h = 3, fn = 4, debug = true)).unwrap();
        let scad = pie.render_scad().unwrap();
        assert!(scad.starts_with("#linear_extrude(height=3.0, center=false, slices=20, scale=1.0) {\n    polygon(points=[[1.0, 0.0], "));
        assert!(scad.ends_with("[0.0, 0.0]]);\n}"));
    }
}
