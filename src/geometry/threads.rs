// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Screw threads and helical surfaces
//!
//! A thread is a stack of turns, each made of one small tooth polyhedron per
//! segment, rotated and raised along the helix. The stack is trimmed to the
//! requested length and fused with a core cylinder at the minor diameter.

use super::operations::{Intersection, Rotate, Translate, Union};
use super::primitives::{inherit_visibility, Cube, Cylinder, Polyhedron};
use crate::args;
use crate::ast::{FieldSpec, Node, NodeClass, NodeType, Object, Value, Vector};
use crate::error::{Result, ScadError};
use crate::utils::units::inch2mm;
use once_cell::sync::Lazy;
use std::f64::consts::PI;

/// Most segments per turn, reached at a diameter of about 8.3 mm
pub const MAX_THREAD_SEGMENTS: usize = 50;
/// Longest thread accepted, in turns
pub const MAX_THREAD_TURNS: i64 = 1_000;
/// Largest point count of a single helix
pub const MAX_HELIX_POINTS: usize = 1_000_000;

/// Teeth are stretched by this factor so neighbours overlap
const TOOTH_OVERLAP: f64 = 1.005;

fn invalid(option: &str, value: impl ToString) -> ScadError {
    ScadError::InvalidOption {
        option: option.to_string(),
        value: value.to_string(),
    }
}

/// Segments per turn for a thread of `diameter` mm
pub fn thread_segments(diameter: f64) -> usize {
    (diameter * 6.0).ceil().clamp(3.0, MAX_THREAD_SEGMENTS as f64) as usize
}

/// Height of the fundamental triangle of a 60 degree thread
fn triangle_height(pitch: f64) -> f64 {
    pitch * 30f64.to_radians().cos()
}

/// Flank height at `current` radius, valid over the first half pitch
fn flank_z(current: f64, radius: f64, pitch: f64) -> f64 {
    0.5 * (current - (radius - 0.875 * triangle_height(pitch))) / 30f64.to_radians().cos()
}

/// One tooth of a 60 degree thread: eight points, twelve triangles
///
/// The tooth faces -y and spans one segment. `internal` adds relief on the
/// outer radius for a nut-side thread.
pub fn thread_polyhedron(radius: f64, pitch: f64, internal: bool, starts: i64) -> Result<Node> {
    let segments = thread_segments(radius * 2.0) as f64;
    let h = triangle_height(pitch);
    let outer_r = if internal { radius + h / 20.0 } else { radius };
    let inner_r = radius - 0.875 * h;

    let x_outer = outer_r / segments * 2.0 * PI * TOOTH_OVERLAP;
    let x_inner = inner_r / segments * 2.0 * PI * TOOTH_OVERLAP;
    let z_incr = starts as f64 * pitch / segments * TOOTH_OVERLAP;
    let z0 = flank_z(outer_r, radius, pitch);

    let points: Vec<Value> = [
        [-x_inner / 2.0, -inner_r, 0.0],
        [x_inner / 2.0, -inner_r, z_incr],
        [x_inner / 2.0, -inner_r, pitch + z_incr],
        [-x_inner / 2.0, -inner_r, pitch],
        [-x_outer / 2.0, -outer_r, z0],
        [x_outer / 2.0, -outer_r, z0 + z_incr],
        [x_outer / 2.0, -outer_r, pitch - z0 + z_incr],
        [-x_outer / 2.0, -outer_r, pitch - z0],
    ]
    .into_iter()
    .map(|[x, y, z]| Value::Vector(Vector::vec3(x, y, z)))
    .collect();

    // clockwise seen from outside
    let faces: Vec<Value> = [
        [0, 3, 4],
        [3, 7, 4],
        [1, 5, 2],
        [2, 5, 6],
        [0, 1, 2],
        [0, 2, 3],
        [4, 6, 5],
        [4, 7, 6],
        [7, 2, 6],
        [7, 3, 2],
        [0, 5, 1],
        [0, 4, 5],
    ]
    .into_iter()
    .map(Value::from)
    .collect();

    Polyhedron::build(args!(points = points, faces = faces))
}

/// Dimensions of a thread in millimetres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreadParams {
    pub diameter: f64,
    pub pitch: f64,
    pub length: f64,
    pub internal: bool,
    pub starts: i64,
}

impl ThreadParams {
    fn validate(&self) -> Result<()> {
        if !(self.diameter > 0.0 && self.diameter.is_finite()) {
            return Err(invalid("diameter", self.diameter));
        }
        if !(self.pitch > 0.0 && self.pitch.is_finite()) {
            return Err(invalid("pitch", self.pitch));
        }
        if !(self.length >= 0.0 && self.length.is_finite()) {
            return Err(invalid("length", self.length));
        }
        if self.starts < 1 {
            return Err(invalid("starts", self.starts));
        }
        if self.turns() > MAX_THREAD_TURNS {
            return Err(invalid("length", self.length));
        }
        Ok(())
    }

    fn turns(&self) -> i64 {
        (self.length / self.pitch).floor() as i64
    }

    /// Radius of the core cylinder filling the thread root
    pub fn core_radius(&self) -> f64 {
        let depth = if self.internal { 5.0 / 8.0 } else { 5.3 / 8.0 };
        self.diameter / 2.0 - triangle_height(self.pitch) * depth
    }

    fn turn(&self, index: i64, segments: usize) -> Result<Node> {
        let fraction = 1.0 / segments as f64;
        let teeth = (0..segments)
            .map(|i| {
                let i = i as f64;
                let tooth = thread_polyhedron(
                    self.diameter / 2.0,
                    self.pitch,
                    self.internal,
                    self.starts,
                )?;
                let raised = Translate::build(args!(
                    z = i * self.starts as f64 * self.pitch * fraction
                ))?
                .attach([tooth]);
                Ok(Rotate::build(args!(z = i * 360.0 * fraction))?.attach([raised]))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Translate::build(args!(z = index as f64 * self.pitch))?.attach(teeth))
    }

    /// The thread as plain CSG, from z = 0 to z = `length`
    pub fn body(&self) -> Result<Node> {
        self.validate()?;
        let segments = thread_segments(self.diameter);
        let turns = (-self.starts..self.turns())
            .map(|index| self.turn(index, segments))
            .collect::<Result<Vec<_>>>()?;

        let width = self.diameter * 1.1;
        let cut = Cube::build(args!(x = width, y = width, z = self.length, center = true))?;
        let cut = Translate::build(args!(z = self.length / 2.0))?.attach([cut]);
        let trimmed = Intersection::node()?.attach([Union::node()?.attach(turns), cut]);

        let core = Cylinder::build(args!(
            r = self.core_radius(),
            h = self.length,
            fn = segments as f64
        ))?;
        Ok(Union::node()?.attach([trimmed, core]))
    }
}

/// Plain CSG for `node`, carrying its name, visibility flags and children
fn threaded(node: &Node, params: ThreadParams) -> Result<Node> {
    let mut body = params.body()?;
    body.set_name(node.name());
    inherit_visibility(node, &mut body)?;
    Ok(body.attach(node.children().iter().cloned()))
}

fn metric_params(node: &Node) -> Result<ThreadParams> {
    Ok(ThreadParams {
        diameter: node.get_f64("diameter")?,
        pitch: node.get_f64("pitch")?,
        length: node.get_f64("length")?,
        internal: node.get_bool("internal")?,
        starts: node.get_i64("starts")?,
    })
}

/// Metric thread, all dimensions in millimetres
pub struct MetricThread;

static METRIC_THREAD: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("MetricThread")
        .extends(Object::class())
        .field(FieldSpec::float("diameter", 8.0))
        .field(FieldSpec::float("pitch", 1.0))
        .field(FieldSpec::float("length", 1.0))
        .field(FieldSpec::bool("internal", false))
        .field(FieldSpec::int("starts").default(1))
        .alias("height", "length")
        .alias("h", "length")
        .alias("n_starts", "starts")
        .render(|node, opts, level| threaded(node, metric_params(node)?)?.render_at(opts, level))
        .build()
});

impl NodeType for MetricThread {
    fn class() -> &'static NodeClass {
        &METRIC_THREAD
    }
}

impl MetricThread {
    pub fn body(node: &Node) -> Result<Node> {
        threaded(node, metric_params(node)?)
    }
}

fn english_params(node: &Node) -> Result<ThreadParams> {
    let tpi = node.get_f64("threads_per_inch")?;
    if !(tpi > 0.0) {
        return Err(invalid("threads_per_inch", tpi));
    }
    Ok(ThreadParams {
        diameter: inch2mm(node.get_f64("diameter")?),
        pitch: inch2mm(1.0 / tpi),
        length: inch2mm(node.get_f64("length")?),
        internal: node.get_bool("internal")?,
        starts: node.get_i64("starts")?,
    })
}

/// Unified inch thread given by diameter and threads per inch
pub struct EnglishThread;

static ENGLISH_THREAD: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("EnglishThread")
        .extends(Object::class())
        .field(FieldSpec::float("diameter", 0.25))
        .field(FieldSpec::float("threads_per_inch", 20.0))
        .field(FieldSpec::float("length", 1.0))
        .field(FieldSpec::bool("internal", false))
        .field(FieldSpec::int("starts").default(1))
        .alias("tpi", "threads_per_inch")
        .alias("height", "length")
        .alias("h", "length")
        .alias("n_starts", "starts")
        .render(|node, opts, level| threaded(node, english_params(node)?)?.render_at(opts, level))
        .build()
});

impl NodeType for EnglishThread {
    fn class() -> &'static NodeClass {
        &ENGLISH_THREAD
    }
}

impl EnglishThread {
    pub fn body(node: &Node) -> Result<Node> {
        threaded(node, english_params(node)?)
    }
}

/// Points along a helix around the z axis
#[derive(Debug, Clone, PartialEq)]
pub struct Helix {
    pub radius: f64,
    pub pitch: f64,
    pub height: f64,
    /// Points per turn
    pub resolution: usize,
    pub offset: Vector,
}

impl Helix {
    pub fn new(radius: f64, pitch: f64, height: f64, resolution: usize) -> Result<Self> {
        let helix = Self {
            radius,
            pitch,
            height,
            resolution,
            offset: Vector::vec3(0.0, 0.0, 0.0),
        };
        if !radius.is_finite() {
            return Err(invalid("radius", radius));
        }
        if !(pitch > 0.0 && pitch.is_finite()) {
            return Err(invalid("pitch", pitch));
        }
        if !(height >= 0.0 && height.is_finite()) {
            return Err(invalid("height", height));
        }
        if resolution == 0 {
            return Err(invalid("resolution", resolution));
        }
        if height / pitch * resolution as f64 > MAX_HELIX_POINTS as f64 {
            return Err(invalid("height", height));
        }
        Ok(helix)
    }

    pub fn with_offset(mut self, offset: Vector) -> Self {
        self.offset = offset;
        self
    }

    pub fn len(&self) -> usize {
        (self.height / self.pitch * self.resolution as f64) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn points(&self) -> Vec<Vector> {
        let angle_step = 2.0 * PI / self.resolution as f64;
        let rise = self.pitch / (2.0 * PI);
        (0..self.len())
            .map(|i| {
                let angle = angle_step * i as f64;
                Vector::vec3(
                    self.radius * angle.cos() + self.offset.x(),
                    self.radius * angle.sin() + self.offset.y(),
                    rise * angle + self.offset.z(),
                )
            })
            .collect()
    }
}

/// Polyhedron whose triangles join each helix to the next
///
/// The last helix is joined back to the first one turn higher. All helices
/// must have the same point count and resolution.
pub fn stitch_helices(helices: &[Helix]) -> Result<Node> {
    let Some(first) = helices.first() else {
        return Err(invalid("helices", 0));
    };
    let count = first.len();
    let res = first.resolution;
    if let Some(odd) = helices
        .iter()
        .find(|helix| helix.len() != count || helix.resolution != res)
    {
        return Err(invalid("helices", odd.len()));
    }

    let points: Vec<Value> = helices
        .iter()
        .flat_map(Helix::points)
        .map(Value::Vector)
        .collect();
    let total = points.len();
    let last = helices.len() - 1;

    let mut faces: Vec<Value> = Vec::new();
    for h in 0..helices.len() {
        let offset = count * h;
        let next = (offset + count) % total;
        let prev = (offset + total - count) % total;
        for idx in 0..count {
            if h < last {
                if idx + 1 < count {
                    faces.push([offset + idx, offset + idx + 1, next + idx].into());
                }
            } else if idx + res < count {
                faces.push([offset + idx, offset + idx + 1, next + idx + res].into());
            }
            if h == 0 {
                if idx > res {
                    faces.push([offset + idx, offset + idx - 1, prev + idx - res].into());
                }
            } else if idx > 0 {
                faces.push([offset + idx, offset + idx - 1, prev + idx].into());
            }
        }
    }

    Polyhedron::build(args!(points = points, faces = faces))
}
