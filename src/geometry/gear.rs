// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Involute spur gears
//!
//! [`GearSpec`] derives the standard gear dimensions from whichever ones are
//! given. [`GearProfile`] traces the tooth outline following Reyes, Rebolledo
//! and Sanchez, "An algorithm to describe the ideal spur gear profile"
//! (WCE 2008).

use super::operations::LinearExtrude;
use super::primitives::{inherit_visibility, Polygon};
use super::resolution::{resolution_of, Radial};
use crate::args;
use crate::ast::{Accessor, FieldSpec, FieldType, Node, NodeClass, NodeType, Value, Vector};
use crate::error::{Result, ScadError};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::f64::consts::PI;

/// Pressure angle used when none is given, in degrees
pub const DEFAULT_PRESSURE_ANGLE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GearParam {
    DiametralPitch,
    PitchDiameter,
    OutsideDiameter,
    NumberOfTeeth,
    Addendum,
    Dedendum,
    ToothThickness,
    WorkingDepth,
    CircularPitch,
    BaseDiameter,
    Clearance,
    WholeDepth,
    RootDiameter,
    PitchRadius,
    OutsideRadius,
    BaseRadius,
    RootRadius,
    Module,
    /// Degrees
    PressureAngle,
}

type Lookup<'a> = dyn FnMut(GearParam) -> Result<f64> + 'a;

impl GearParam {
    pub const ALL: [GearParam; 19] = [
        GearParam::DiametralPitch,
        GearParam::PitchDiameter,
        GearParam::OutsideDiameter,
        GearParam::NumberOfTeeth,
        GearParam::Addendum,
        GearParam::Dedendum,
        GearParam::ToothThickness,
        GearParam::WorkingDepth,
        GearParam::CircularPitch,
        GearParam::BaseDiameter,
        GearParam::Clearance,
        GearParam::WholeDepth,
        GearParam::RootDiameter,
        GearParam::PitchRadius,
        GearParam::OutsideRadius,
        GearParam::BaseRadius,
        GearParam::RootRadius,
        GearParam::Module,
        GearParam::PressureAngle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GearParam::DiametralPitch => "diametral_pitch",
            GearParam::PitchDiameter => "pitch_diameter",
            GearParam::OutsideDiameter => "outside_diameter",
            GearParam::NumberOfTeeth => "number_of_teeth",
            GearParam::Addendum => "addendum",
            GearParam::Dedendum => "dedendum",
            GearParam::ToothThickness => "tooth_thickness",
            GearParam::WorkingDepth => "working_depth",
            GearParam::CircularPitch => "circular_pitch",
            GearParam::BaseDiameter => "base_diameter",
            GearParam::Clearance => "clearance",
            GearParam::WholeDepth => "whole_depth",
            GearParam::RootDiameter => "root_diameter",
            GearParam::PitchRadius => "pitch_radius",
            GearParam::OutsideRadius => "outside_radius",
            GearParam::BaseRadius => "base_radius",
            GearParam::RootRadius => "root_radius",
            GearParam::Module => "module",
            GearParam::PressureAngle => "pressure_angle",
        }
    }

    pub fn from_name(name: &str) -> Option<GearParam> {
        Self::ALL.into_iter().find(|param| param.name() == name)
    }

    /// The `choice`-th way to derive this value, or `None` past the last one
    fn formula(self, choice: usize, v: &mut Lookup<'_>) -> Result<Option<f64>> {
        use GearParam::*;
        Ok(Some(match (self, choice) {
            (DiametralPitch, 0) => v(NumberOfTeeth)? / v(PitchDiameter)?,
            (DiametralPitch, 1) => PI / v(CircularPitch)?,
            (DiametralPitch, 2) => (v(NumberOfTeeth)? + 2.0) / v(OutsideDiameter)?,
            (DiametralPitch, 3) => 1.0 / v(Module)?,
            (PitchDiameter, 0) => v(NumberOfTeeth)? / v(DiametralPitch)?,
            (PitchDiameter, 1) => v(Module)? * v(NumberOfTeeth)?,
            (PitchDiameter, 2) => 2.0 * v(PitchRadius)?,
            (OutsideDiameter, 0) => (v(NumberOfTeeth)? + 2.0) / v(DiametralPitch)?,
            (OutsideDiameter, 1) => v(PitchDiameter)? + 2.0 / v(DiametralPitch)?,
            (OutsideDiameter, 2) => 2.0 * v(OutsideRadius)?,
            (NumberOfTeeth, 0) => v(PitchDiameter)? * v(DiametralPitch)?,
            (NumberOfTeeth, 1) => v(PitchDiameter)? / v(Module)?,
            (Addendum, 0) => 1.0 / v(DiametralPitch)?,
            (Dedendum, 0) => v(WholeDepth)? - v(Addendum)?,
            (ToothThickness, 0) => (PI / 2.0) / v(DiametralPitch)?,
            (WorkingDepth, 0) => 2.0 * v(Addendum)?,
            (CircularPitch, 0) => PI / v(DiametralPitch)?,
            (BaseDiameter, 0) => v(PitchDiameter)? * v(PressureAngle)?.to_radians().cos(),
            (Clearance, 0) => 0.157 / v(DiametralPitch)?,
            (WholeDepth, 0) => 2.157 / v(DiametralPitch)?,
            (RootDiameter, 0) => v(OutsideDiameter)? - 2.0 * v(WholeDepth)?,
            (PitchRadius, 0) => v(PitchDiameter)? / 2.0,
            (OutsideRadius, 0) => v(OutsideDiameter)? / 2.0,
            (BaseRadius, 0) => v(BaseDiameter)? / 2.0,
            (RootRadius, 0) => v(RootDiameter)? / 2.0,
            (Module, 0) => v(PitchDiameter)? / v(NumberOfTeeth)?,
            (Module, 1) => 1.0 / v(DiametralPitch)?,
            (PressureAngle, 0) => DEFAULT_PRESSURE_ANGLE,
            _ => return Ok(None),
        }))
    }
}

fn underdetermined(param: GearParam) -> ScadError {
    ScadError::Underdetermined {
        name: param.name().to_string(),
    }
}

/// A partially specified gear; unset dimensions are derived on request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GearSpec {
    defined: IndexMap<GearParam, f64>,
}

impl GearSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, param: GearParam, value: f64) -> Self {
        self.set(param, value);
        self
    }

    pub fn set(&mut self, param: GearParam, value: f64) {
        self.defined.insert(param, value);
    }

    pub fn set_named(&mut self, name: &str, value: f64) -> Result<()> {
        let param =
            GearParam::from_name(name).ok_or_else(|| ScadError::not_found("GearSpec", name))?;
        self.set(param, value);
        Ok(())
    }

    pub fn defined(&self) -> impl Iterator<Item = (GearParam, f64)> + '_ {
        self.defined.iter().map(|(param, value)| (*param, *value))
    }

    pub fn get(&self, param: GearParam) -> Result<f64> {
        self.resolve(param, &mut Vec::new())
    }

    pub fn get_named(&self, name: &str) -> Result<f64> {
        let param =
            GearParam::from_name(name).ok_or_else(|| ScadError::not_found("GearSpec", name))?;
        self.get(param)
    }

    /// A value already being derived further up counts as unknown, so the
    /// next formula is tried instead of recursing forever
    fn resolve(&self, param: GearParam, visiting: &mut Vec<GearParam>) -> Result<f64> {
        if let Some(value) = self.defined.get(&param) {
            return Ok(*value);
        }
        if visiting.contains(&param) {
            return Err(underdetermined(param));
        }
        visiting.push(param);
        let mut resolved = Err(underdetermined(param));
        for choice in 0.. {
            let mut lookup = |p: GearParam| self.resolve(p, visiting);
            match param.formula(choice, &mut lookup) {
                Ok(None) => break,
                Ok(Some(value)) if value.is_finite() => {
                    resolved = Ok(value);
                    break;
                }
                Ok(Some(_)) | Err(ScadError::Underdetermined { .. }) => {}
                Err(err) => {
                    resolved = Err(err);
                    break;
                }
            }
        }
        visiting.pop();
        resolved
    }
}

/// Outline of a spur gear, one closed path of 2D points
#[derive(Debug, Clone)]
pub struct GearProfile {
    teeth: usize,
    /// Points per involute, land and root arc
    steps: usize,
    base_radius: f64,
    outside_radius: f64,
    root_radius: f64,
    theta_re: f64,
    alpha_re: f64,
    xi: f64,
    sigma: f64,
    tau: f64,
}

impl GearProfile {
    pub fn new(spec: &GearSpec, steps: usize) -> Result<Self> {
        let teeth = spec.get(GearParam::NumberOfTeeth)?;
        if !(teeth >= 3.0 && teeth.fract() == 0.0) {
            return Err(ScadError::InvalidOption {
                option: "number_of_teeth".to_string(),
                value: teeth.to_string(),
            });
        }
        let outside_radius = spec.get(GearParam::OutsideRadius)?;
        let base_radius = spec.get(GearParam::BaseRadius)?;
        let pitch_radius = spec.get(GearParam::PitchRadius)?;
        let root_radius = spec.get(GearParam::RootRadius)?;
        let module = spec.get(GearParam::Module)?;
        let pitch_diameter = spec.get(GearParam::PitchDiameter)?;

        let unroll =
            |radius: f64| ((radius.powi(2) - base_radius.powi(2)) / base_radius.powi(2)).sqrt();
        let theta_re = unroll(outside_radius);
        let theta_rp = unroll(pitch_radius);
        if !(theta_re.is_finite() && theta_rp.is_finite()) {
            return Err(ScadError::InvalidOption {
                option: "base_radius".to_string(),
                value: base_radius.to_string(),
            });
        }
        let alpha_re = theta_re - theta_re.atan();
        let alpha_rp = theta_rp - theta_rp.atan();
        let epsilon = alpha_re - alpha_rp;
        let gamma = PI * module / pitch_diameter;
        let xi = gamma - 2.0 * epsilon;

        Ok(Self {
            teeth: teeth as usize,
            steps: steps.max(1),
            base_radius,
            outside_radius,
            root_radius,
            theta_re,
            alpha_re,
            xi,
            sigma: xi + 2.0 * alpha_re,
            tau: 2.0 * PI / teeth,
        })
    }

    pub fn teeth(&self) -> usize {
        self.teeth
    }

    /// Points per tooth
    pub fn tooth_len(&self) -> usize {
        4 * self.steps + 3
    }

    fn involute(&self, angle: f64) -> (f64, f64) {
        let r = self.base_radius;
        (
            r * (angle.cos() + angle * angle.sin()),
            r * (angle.sin() - angle * angle.cos()),
        )
    }

    fn arc(&self, radius: f64, start: f64, end: f64) -> impl Iterator<Item = (f64, f64)> + '_ {
        let step = (end - start) / self.steps as f64;
        (0..self.steps).map(move |i| {
            let angle = start + step * i as f64;
            (radius * angle.cos(), radius * angle.sin())
        })
    }

    /// One tooth starting on the x axis: root, rising flank, land, falling
    /// flank and the root arc up to the next tooth
    pub fn tooth(&self) -> Vec<(f64, f64)> {
        let step = self.theta_re / self.steps as f64;
        let mut path = Vec::with_capacity(self.tooth_len());
        path.push((self.root_radius, 0.0));
        path.push((self.base_radius, 0.0));
        path.extend((0..self.steps).map(|i| self.involute(step * i as f64)));
        path.extend(self.arc(self.outside_radius, self.alpha_re, self.alpha_re + self.xi));
        path.extend((0..self.steps).map(|i| {
            let (x, y) = self.involute(self.theta_re - step * i as f64);
            rotate((x, -y), self.sigma)
        }));
        path.push((
            self.root_radius * self.sigma.cos(),
            self.root_radius * self.sigma.sin(),
        ));
        path.extend(self.arc(self.root_radius, self.sigma, self.tau));
        path
    }

    pub fn outline(&self) -> Vec<Vector> {
        let tooth = self.tooth();
        (0..self.teeth)
            .flat_map(|k| {
                let angle = self.tau * k as f64;
                tooth.iter().map(move |point| {
                    let (x, y) = rotate(*point, angle);
                    Vector::vec2(x, y)
                })
            })
            .collect()
    }
}

fn rotate((x, y): (f64, f64), angle: f64) -> (f64, f64) {
    let (sin, cos) = angle.sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

/// Extruded spur gear sized by module, diametral pitch or pitch diameter
pub struct Gear;

static GEAR: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Gear")
        .extends(Radial::class())
        .field(FieldSpec::int("teeth").default(20))
        .field(FieldSpec::new("module", FieldType::Float).optional())
        .field(FieldSpec::new("diametral_pitch", FieldType::Float).optional())
        .field(FieldSpec::new("pitch_diameter", FieldType::Float).optional())
        .field(FieldSpec::float("pressure_angle", DEFAULT_PRESSURE_ANGLE))
        .field(FieldSpec::float("height", 1.0))
        .alias("number_of_teeth", "teeth")
        .alias("n", "teeth")
        .alias("m", "module")
        .alias("dp", "diametral_pitch")
        .alias("pd", "pitch_diameter")
        .accessor(
            "pitch_radius",
            Accessor::read_only(|node| derived(node, GearParam::PitchRadius)),
        )
        .accessor(
            "outside_radius",
            Accessor::read_only(|node| derived(node, GearParam::OutsideRadius)),
        )
        .accessor(
            "root_radius",
            Accessor::read_only(|node| derived(node, GearParam::RootRadius)),
        )
        .accessor(
            "points",
            Accessor::read_only(|node| {
                Ok(gear_outline(node)?
                    .into_iter()
                    .map(Value::Vector)
                    .collect::<Vec<_>>()
                    .into())
            }),
        )
        .render(|node, opts, level| extruded(node)?.render_at(opts, level))
        .build()
});

impl NodeType for Gear {
    fn class() -> &'static NodeClass {
        &GEAR
    }
}

fn derived(node: &Node, param: GearParam) -> Result<Value> {
    Ok(gear_spec(node)?.get(param)?.into())
}

/// The dimensions set on a gear node
pub fn gear_spec(node: &Node) -> Result<GearSpec> {
    let mut spec = GearSpec::new()
        .with(GearParam::NumberOfTeeth, node.get_i64("teeth")? as f64)
        .with(GearParam::PressureAngle, node.get_f64("pressure_angle")?);
    for param in [
        GearParam::Module,
        GearParam::DiametralPitch,
        GearParam::PitchDiameter,
    ] {
        if let Some(value) = node.get_opt_f64(param.name())? {
            spec.set(param, value);
        }
    }
    Ok(spec)
}

/// Closed outline of a gear node
///
/// The node's resolution gives the facet count of the full outside circle;
/// each tooth gets its share.
pub fn gear_outline(node: &Node) -> Result<Vec<Vector>> {
    let spec = gear_spec(node)?;
    let outside = spec.get(GearParam::OutsideRadius)?;
    let teeth = spec.get(GearParam::NumberOfTeeth)?.max(1.0);
    let fragments = resolution_of(node)?.fragments(2.0 * PI * outside, 360.0) as f64;
    let steps = (fragments / teeth).ceil().max(2.0) as usize;
    Ok(GearProfile::new(&spec, steps)?.outline())
}

fn extruded(node: &Node) -> Result<Node> {
    let points = gear_outline(node)?
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
