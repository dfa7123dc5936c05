// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - the node catalog
//!
//! Primitives map one-to-one onto OpenSCAD calls; composites assemble
//! primitives into derived shapes at render time.

mod arcs;
mod composites;
mod gear;
mod operations;
mod primitives;
mod resolution;
mod solids;
mod text;
mod threads;

pub use arcs::{arc_points, Arc, PieSlice, SemiCylinder};
pub use composites::{Chamfer, Pipe, ENDCAP_OFFSET, PIPE_PADDING};
pub use gear::{
    gear_outline, gear_spec, Gear, GearParam, GearProfile, GearSpec, DEFAULT_PRESSURE_ANGLE,
};
pub use operations::{
    Color, Difference, Hull, Include, Inline, Intersection, LinearExtrude, Minkowski, Mirror,
    Projection, Render, Rotate, Scale, Translate, Union, Use, VectorTransform,
};
pub use primitives::{Circle, Cube, Cylinder, Polygon, Polyhedron, Sphere, Square};
pub use resolution::{
    Radial, RadialResolution, Resolution, DEFAULT_FA, DEFAULT_FN, DEFAULT_FS, MAX_FRAGMENTS,
    MIN_ADAPTIVE, MIN_FRAGMENTS,
};
pub use solids::{solid_points, Octahedron, Tetrahedron};
pub use text::{
    cached_font, font, pen_offsets, register_font, Glyph, GlyphSource, Outline, Text,
};
pub use threads::{
    stitch_helices, thread_polyhedron, thread_segments, EnglishThread, Helix, MetricThread,
    ThreadParams, MAX_HELIX_POINTS, MAX_THREAD_SEGMENTS, MAX_THREAD_TURNS,
};
