// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Built-in scenes for the command-line tool

use crate::args;
use crate::ast::{Node, NodeType};
use crate::config::Config;
use crate::error::{Result, ScadError};
use crate::geometry::{
    solid_points, stitch_helices, Arc, Chamfer, Color, Cylinder, Difference, Gear, Helix,
    MetricThread, Pipe, Rotate, SemiCylinder, Tetrahedron, Translate, Union,
};
use crate::utils::drill::METRIC;
use crate::Vector;

/// Names accepted by [`demo`]
pub const DEMOS: [&str; 8] = [
    "pipe",
    "chamfer",
    "sierpinski",
    "crosshairs",
    "arc",
    "bolt",
    "gear",
    "helix",
];

/// Build the named demo scene
pub fn demo(name: &str, config: &Config) -> Result<Node> {
    match name {
        "pipe" => pipe(config),
        "chamfer" => chamfered_post(config),
        "sierpinski" => sierpinski(3, 30.0),
        "crosshairs" => crosshairs(20.0, 0.25),
        "arc" => arcs(),
        "bolt" => bolt(),
        "gear" => gear(),
        "helix" => helix(),
        other => Err(ScadError::InvalidOption {
            option: "demo".to_string(),
            value: other.to_string(),
        }),
    }
}

/// Tapered pipe with a tapered bore
fn pipe(config: &Config) -> Result<Node> {
    Pipe::build(args!(
        or1 = 8,
        or2 = 5,
        ir1 = 7,
        ir2 = 2,
        h = 20,
        padding = config.pipe_padding,
        fn = 64
    ))
}

/// Post with both rims beveled
fn chamfered_post(config: &Config) -> Result<Node> {
    let (radius, height, size) = (5.0, 10.0, 1.0);
    let overlap = config.endcap_offset;
    let bottom = Translate::build(args!(z = -overlap))?.attach([Chamfer::build(args!(
        r = radius,
        c = size,
        padding = config.pipe_padding,
        fn = 64
    ))?]);
    let top = Translate::build(args!(z = height - size + overlap))?.attach([Chamfer::build(
        args!(r = radius, c = size, invert = true, padding = config.pipe_padding, fn = 64),
    )?]);
    let post = Cylinder::build(args!(r = radius, h = height, fn = 64))?;
    Ok(Difference::node()?.attach([post, bottom, top]))
}

/// Sierpinski tetrahedron: four half-size copies at the corners, `depth` times
fn sierpinski(depth: usize, edge: f64) -> Result<Node> {
    if depth == 0 {
        return Tetrahedron::build(args!(edge = edge));
    }
    let corners = solid_points(&Tetrahedron::build(args!(edge = edge / 2.0))?)?;
    let mut union = Union::node()?;
    for corner in corners {
        let child = sierpinski(depth - 1, edge / 2.0)?;
        union.add_child(Translate::build(args!(corner))?.attach([child]));
    }
    Ok(union)
}

/// Colored axis markers through the origin
fn crosshairs(length: f64, radius: f64) -> Result<Node> {
    let axis = |color: &str, rotation: [i32; 3]| -> Result<Node> {
        let rod = Cylinder::build(args!(r = radius, h = length, center = true, fn = 16))?;
        let rotated = Rotate::build(args!(rotation))?.attach([rod]);
        Ok(Color::build(args!(color))?.attach([rotated]))
    };
    Ok(Union::node()?.attach([
        axis("red", [0, 90, 0])?,
        axis("green", [-90, 0, 0])?,
        axis("blue", [0, 0, 0])?,
    ]))
}

/// Ring sector next to a half cylinder
fn arcs() -> Result<Node> {
    let sector = Arc::build(args!(ir = 4, or = 8, h = 2, angle = 120, fn = 48))?;
    let half = SemiCylinder::build(args!(r = 3, h = 2, start = 180, fn = 48))?;
    let shifted = Translate::build(args!(x = -2))?.attach([half]);
    Ok(Union::node()?.attach([sector, shifted]))
}

/// M8 x 1.25 threaded rod with its tap drill cut through the center
fn bolt() -> Result<Node> {
    let (diameter, pitch, length) = (8.0, 1.25, 12.0);
    let thread = MetricThread::build(args!(d = diameter, pitch = pitch, length = length))?;
    let tap = METRIC.lookup(diameter - pitch, true)?;
    let bore = Cylinder::build(args!(
        d = tap.diameter,
        h = length * 1.2,
        center = true,
        fn = 32
    ))?;
    let bore = Translate::build(args!(z = length / 2.0))?.attach([bore]);
    Ok(Difference::node()?.attach([thread, bore]))
}

/// 24-tooth module 2 spur gear with an axle hole
fn gear() -> Result<Node> {
    let wheel = Gear::build(args!(teeth = 24, module = 2, h = 5, fn = 192))?;
    let axle = Cylinder::build(args!(r = 4, h = 12, center = true, fn = 32))?;
    Ok(Difference::node()?.attach([wheel, axle]))
}

/// Three helices stitched into one twisted band
fn helix() -> Result<Node> {
    let helices = [(10.0, 0.0), (15.0, 2.0), (13.0, 4.0)]
        .into_iter()
        .map(|(radius, rise)| -> Result<Helix> {
            Ok(Helix::new(radius, 8.0, 40.0, 10)?.with_offset(Vector::vec3(0.0, 0.0, rise)))
        })
        .collect::<Result<Vec<_>>>()?;
    stitch_helices(&helices)
}

/// All demo names with a one-line description, for `--help` style listings
pub fn describe() -> Vec<(&'static str, &'static str)> {
    vec![
        ("pipe", "tapered pipe with a tapered bore"),
        ("chamfer", "post with chamfered rims"),
        ("sierpinski", "depth-3 Sierpinski tetrahedron"),
        ("crosshairs", "colored axis markers"),
        ("arc", "ring sector and half cylinder"),
        ("bolt", "M8 threaded rod with a tap-drill bore"),
        ("gear", "24-tooth spur gear"),
        ("helix", "three stitched helices"),
    ]
}
