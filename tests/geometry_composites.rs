// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Composite shapes: padding, solids, arcs, threads, gears and fragment counts

use approx::assert_relative_eq;
use scadkit::args;
use scadkit::ast::{NodeType, Vector};
use scadkit::geometry::{
    arc_points, gear_outline, solid_points, Chamfer, Difference, Gear, MetricThread, Octahedron,
    PieSlice, Pipe, RadialResolution, Resolution, Tetrahedron, MAX_FRAGMENTS,
};
use scadkit::utils::drill::{IMPERIAL, METRIC};
use scadkit::ScadError;
use scadkit::io::code_eq;
use scadkit::Assembly;

#[test]
fn test_pipe_padding_invariant() {
    for (height, padding) in [(10.0, 1.2), (4.0, 2.0), (7.5, 1.0)] {
        let pipe = Pipe::build(args!(h = height, padding = padding)).unwrap();
        let inner = pipe.get_f64("inner.height").unwrap();
        assert_relative_eq!(inner, height * padding);

        let offset = (inner - height) / 2.0;
        let scad = pipe.render_scad().unwrap();
        if offset == 0.0 {
            assert!(!scad.contains("translate("));
        } else {
            let shift = format!("translate([0.0, 0.0, {:?}])", -offset);
            assert!(scad.contains(&shift), "{scad}");
        }
    }
}

#[test]
fn test_pipe_children_are_subtracted() {
    let pipe = Pipe::build(args!(h = 2, padding = 1.0))
        .unwrap()
        .attach([scadkit::geometry::Cube::node().unwrap()]);
    assert!(code_eq(
        &pipe.render_scad().unwrap(),
        "render() { difference() {
            cylinder(r=1.0, h=2.0, center=false);
            cylinder(r=0.5, h=2.0, center=false);
            cube([1.0, 1.0, 1.0], center=false);
        } }"
    ));
}

#[test]
fn test_chamfer_reshapes_on_every_write() {
    let mut chamfer = Chamfer::build(args!(r = 10, c = 2)).unwrap();
    chamfer.set("radius", 4).unwrap();
    assert_relative_eq!(chamfer.get_f64("outer.radius_1").unwrap(), 6.0);
    chamfer.set("padding", 1.0).unwrap();
    assert_relative_eq!(chamfer.get_f64("inner.radius_1").unwrap(), 2.0);
    assert_relative_eq!(chamfer.get_f64("inner.radius_2").unwrap(), 4.0);
    assert_relative_eq!(chamfer.get_f64("inner.height").unwrap(), 2.0);
}

#[test]
fn test_tetrahedron_geometry() {
    let h = 3.0;
    let tet = Tetrahedron::build(args!(height = h, center = true)).unwrap();
    let points = solid_points(&tet).unwrap();
    let centroid = points
        .iter()
        .fold(Vector::vec3(0.0, 0.0, 0.0), |acc, p| acc + p.clone())
        .scale(0.25);
    assert_relative_eq!(centroid.magnitude(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(
        points[0].distance(&points[1]).unwrap(),
        h / (2.0_f64 / 3.0).sqrt(),
        epsilon = 1e-12
    );
    assert_relative_eq!(tet.get_f64("edge").unwrap(), h / (2.0_f64 / 3.0).sqrt());
}

#[test]
fn test_octahedron_is_regular() {
    let octo = Octahedron::build(args!(edge = 2)).unwrap();
    let points = solid_points(&octo).unwrap();
    assert_eq!(points.len(), 6);
    let mut edges = 0;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            let d = a.distance(b).unwrap();
            if (d - 2.0).abs() < 1e-9 {
                edges += 1;
            }
        }
    }
    assert_eq!(edges, 12);
}

#[test]
fn test_fragment_counts() {
    let fixed = Resolution {
        fn_: 2.0,
        fa: 1.0,
        fs: 0.01,
    };
    assert_eq!(fixed.fragments(100.0, 360.0), 3);
    let adaptive = Resolution {
        fn_: 0.0,
        fa: 12.0,
        fs: 2.0,
    };
    // min(360 / 12, 100 / 2) = 30
    assert_eq!(adaptive.fragments(100.0, 360.0), 30);

    let node = RadialResolution::build(args!(fa = 30, fs = 1)).unwrap();
    assert_eq!(RadialResolution::fragments(&node, 100.0, 360.0).unwrap(), 12);
}

#[test]
fn test_pie_slice_boundary() {
    let pie = PieSlice::build(args!(r = 1, angle = 90, fn = 4)).unwrap();
    let points = arc_points(&pie).unwrap();
    // fragments + 1 boundary points plus the origin
    assert_eq!(points.len(), 6);
    assert_eq!(points.last(), Some(&Vector::vec2(0.0, 0.0)));
    for p in &points[..5] {
        assert_relative_eq!(p.magnitude(), 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_assembly_of_composites() {
    let mut assembly = Assembly::new("fixture")
        .with_part("sleeve", Pipe::build(args!(h = 10)).unwrap())
        .with_part("bevel", Chamfer::build(args!(r = 5, c = 1)).unwrap());
    assembly.apply_overrides([("fn", 40)]).unwrap();
    let rendered = assembly
        .render_scad(&scadkit::RenderOptions::default())
        .unwrap();
    assert_eq!(rendered.len(), 2);
    assert!(rendered["sleeve"].contains("$fn=40.0"));
    assert!(rendered["bevel"].contains("$fn=40.0"));
}

#[test]
fn test_unbounded_resolution_is_capped() {
    let pie = PieSlice::build(args!(r = 5, fa = 0, fs = 0)).unwrap();
    let points = arc_points(&pie).unwrap();
    assert!(points.len() <= MAX_FRAGMENTS as usize + 2);
    let pie = PieSlice::build(args!(r = 5, fn = f64::MAX)).unwrap();
    assert_eq!(arc_points(&pie).unwrap().len(), MAX_FRAGMENTS as usize + 2);
}

#[test]
fn test_threaded_hole_with_tap_drill() {
    let tap = METRIC.lookup_str("6.75 mm", true).unwrap();
    assert_eq!(tap.name, "6.8mm");
    assert!(matches!(
        IMPERIAL.lookup_str("0.1765 in", false),
        Err(ScadError::NoExactSize { .. })
    ));

    let nut = MetricThread::build(args!(d = 8, pitch = 1.25, h = 6, internal = true)).unwrap();
    let block = scadkit::geometry::Cube::build(args!(x = 14, y = 14, z = 6)).unwrap();
    let scene = Difference::node().unwrap().attach([block, nut]);
    let scad = scene.render_scad().unwrap();
    assert!(scad.starts_with("difference() {\n    cube([14.0, 14.0, 6.0], center=false);\n    union() {"));
    assert_eq!(scad.matches("polyhedron(").count(), (1 + 4) * 48);
}

#[test]
fn test_gear_outline_scales_with_module() {
    let small = Gear::build(args!(teeth = 16, m = 1, fn = 64)).unwrap();
    let large = Gear::build(args!(teeth = 16, m = 3, fn = 64)).unwrap();
    let (small, large) = (gear_outline(&small).unwrap(), gear_outline(&large).unwrap());
    assert_eq!(small.len(), large.len());
    for (a, b) in small.iter().zip(&large) {
        assert_relative_eq!(b.x(), a.x() * 3.0, epsilon = 1e-9);
        assert_relative_eq!(b.y(), a.y() * 3.0, epsilon = 1e-9);
    }
}
