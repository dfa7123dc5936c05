// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Fixed-arity vectors with named (and aliased) axes

use super::Value;
use crate::error::{Result, ScadError};
use crate::utils::colors;
use serde::Serialize;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// The three vector shapes understood by the object model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VectorKind {
    Vec2,
    Vec3,
    Color,
}

const VEC2_AXES: &[&str] = &["x", "y"];
const VEC3_AXES: &[&str] = &["x", "y", "z"];
const COLOR_AXES: &[&str] = &["red", "green", "blue", "alpha"];

const VEC2_ALIASES: &[(&str, &str)] = &[("X", "x"), ("Y", "y")];
const VEC3_ALIASES: &[(&str, &str)] = &[
    ("X", "x"),
    ("h", "x"),
    ("height", "x"),
    ("Y", "y"),
    ("w", "y"),
    ("width", "y"),
    ("Z", "z"),
    ("d", "z"),
    ("depth", "z"),
];
const COLOR_ALIASES: &[(&str, &str)] = &[
    ("r", "red"),
    ("R", "red"),
    ("g", "green"),
    ("G", "green"),
    ("b", "blue"),
    ("B", "blue"),
    ("a", "alpha"),
    ("A", "alpha"),
];

/// Pseudo-attribute available on color vectors
const COLORNAME: &str = "colorname";

impl VectorKind {
    pub fn name(self) -> &'static str {
        match self {
            VectorKind::Vec2 => "Vector2D",
            VectorKind::Vec3 => "Vector3D",
            VectorKind::Color => "VectorColor",
        }
    }

    pub fn axes(self) -> &'static [&'static str] {
        match self {
            VectorKind::Vec2 => VEC2_AXES,
            VectorKind::Vec3 => VEC3_AXES,
            VectorKind::Color => COLOR_AXES,
        }
    }

    pub fn aliases(self) -> &'static [(&'static str, &'static str)] {
        match self {
            VectorKind::Vec2 => VEC2_ALIASES,
            VectorKind::Vec3 => VEC3_ALIASES,
            VectorKind::Color => COLOR_ALIASES,
        }
    }

    pub fn arity(self) -> usize {
        self.axes().len()
    }

    pub fn defaults(self) -> &'static [f64] {
        match self {
            VectorKind::Vec2 => &[0.0, 0.0],
            VectorKind::Vec3 => &[0.0, 0.0, 0.0],
            VectorKind::Color => &[0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Position of an axis given its name or one of its aliases
    pub fn axis_index(self, name: &str) -> Option<usize> {
        let canonical = self
            .aliases()
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, axis)| *axis)
            .unwrap_or(name);
        self.axes().iter().position(|axis| *axis == canonical)
    }

    pub fn canonical_axis(self, name: &str) -> Option<&'static str> {
        self.axis_index(name).map(|idx| self.axes()[idx])
    }
}

/// An ordered tuple of named numeric components
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vector {
    kind: VectorKind,
    values: Vec<f64>,
}

impl Vector {
    /// A vector holding the kind's default components
    pub fn new(kind: VectorKind) -> Self {
        Self {
            kind,
            values: kind.defaults().to_vec(),
        }
    }

    /// Build by position; missing trailing components keep their defaults
    pub fn from_values(kind: VectorKind, values: &[f64]) -> Result<Self> {
        if values.len() > kind.arity() {
            return Err(ScadError::ArityMismatch {
                expected: kind.arity(),
                actual: values.len(),
            });
        }
        let mut vector = Self::new(kind);
        vector.values[..values.len()].copy_from_slice(values);
        Ok(vector)
    }

    /// Every axis set to the same value
    pub fn splat(kind: VectorKind, value: f64) -> Self {
        Self {
            kind,
            values: vec![value; kind.arity()],
        }
    }

    pub fn vec2(x: f64, y: f64) -> Self {
        Self {
            kind: VectorKind::Vec2,
            values: vec![x, y],
        }
    }

    pub fn vec3(x: f64, y: f64, z: f64) -> Self {
        Self {
            kind: VectorKind::Vec3,
            values: vec![x, y, z],
        }
    }

    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            kind: VectorKind::Color,
            values: vec![r, g, b, a],
        }
    }

    /// Resolve a symbolic color name
    pub fn from_color_name(name: &str) -> Result<Self> {
        let rgba = colors::lookup(name).ok_or_else(|| ScadError::UnknownColor(name.to_string()))?;
        Ok(Self {
            kind: VectorKind::Color,
            values: rgba.to_vec(),
        })
    }

    pub fn kind(&self) -> VectorKind {
        self.kind
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn x(&self) -> f64 {
        self.values[0]
    }

    pub fn y(&self) -> f64 {
        self.values[1]
    }

    pub fn z(&self) -> f64 {
        self.values.get(2).copied().unwrap_or(0.0)
    }

    fn index_of(&self, axis: &str) -> Result<usize> {
        self.kind
            .axis_index(axis)
            .ok_or_else(|| ScadError::not_found(self.kind.name(), axis))
    }

    /// Read a component by axis name or alias
    pub fn get(&self, axis: &str) -> Result<f64> {
        Ok(self.values[self.index_of(axis)?])
    }

    /// Write a component by axis name or alias
    pub fn set(&mut self, axis: &str, value: f64) -> Result<()> {
        let idx = self.index_of(axis)?;
        self.values[idx] = value;
        Ok(())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.kind.axis_index(name).is_some() || (self.kind == VectorKind::Color && name == COLORNAME)
    }

    /// Canonical spelling of an attribute, used by dotted alias resolution
    pub fn resolve(&self, name: &str) -> String {
        self.kind
            .canonical_axis(name)
            .map(str::to_string)
            .unwrap_or_else(|| name.to_string())
    }

    pub fn get_value(&self, name: &str) -> Result<Value> {
        if self.kind == VectorKind::Color && name == COLORNAME {
            return Ok(Value::Str(self.colorname().to_string()));
        }
        self.get(name).map(Value::Float)
    }

    pub fn set_value(&mut self, name: &str, value: Value) -> Result<()> {
        if self.kind == VectorKind::Color && name == COLORNAME {
            return match value {
                Value::Str(color) => self.set_colorname(&color),
                other => Err(ScadError::cast(name, "str", other.type_name())),
            };
        }
        let number = value
            .as_f64()
            .ok_or_else(|| ScadError::cast(name, "float", value.type_name()))?;
        self.set(name, number)
    }

    /// Nearest named color by Euclidean distance
    pub fn colorname(&self) -> &'static str {
        let mut best = ("black", f64::INFINITY);
        for (name, rgba) in colors::named_colors() {
            let distance = self
                .values
                .iter()
                .zip(rgba.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            if distance < best.1 {
                best = (name, distance);
            }
        }
        best.0
    }

    pub fn set_colorname(&mut self, name: &str) -> Result<()> {
        let named = Self::from_color_name(name)?;
        let n = self.values.len().min(named.values.len());
        self.values[..n].copy_from_slice(&named.values[..n]);
        Ok(())
    }

    fn check_arity(&self, other: &Vector) -> Result<()> {
        if self.values.len() != other.values.len() {
            return Err(ScadError::ArityMismatch {
                expected: self.values.len(),
                actual: other.values.len(),
            });
        }
        Ok(())
    }

    fn zip_with(&self, other: &Vector, op: impl Fn(f64, f64) -> f64) -> Result<Vector> {
        self.check_arity(other)?;
        Ok(Vector {
            kind: self.kind,
            values: self
                .values
                .iter()
                .zip(other.values.iter())
                .map(|(a, b)| op(*a, *b))
                .collect(),
        })
    }

    pub fn checked_add(&self, other: &Vector) -> Result<Vector> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn checked_sub(&self, other: &Vector) -> Result<Vector> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Add a scalar to every component
    pub fn offset(&self, amount: f64) -> Vector {
        self.map(|v| v + amount)
    }

    pub fn scale(&self, factor: f64) -> Vector {
        self.map(|v| v * factor)
    }

    fn map(&self, op: impl Fn(f64) -> f64) -> Vector {
        Vector {
            kind: self.kind,
            values: self.values.iter().map(|v| op(*v)).collect(),
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub fn distance(&self, other: &Vector) -> Result<f64> {
        Ok(self.checked_sub(other)?.magnitude())
    }

    pub fn dot(&self, other: &Vector) -> Result<f64> {
        self.check_arity(other)?;
        Ok(self.values.iter().zip(other.values.iter()).map(|(a, b)| a * b).sum())
    }

    /// Cross product; only defined for three-component vectors
    pub fn cross(&self, other: &Vector) -> Result<Vector> {
        self.check_arity(other)?;
        if self.values.len() != 3 {
            return Err(ScadError::ArityMismatch {
                expected: 3,
                actual: self.values.len(),
            });
        }
        let product = self.to_na().cross(&other.to_na());
        Ok(Vector::vec3(product.x, product.y, product.z))
    }

    /// View as an nalgebra vector (missing components read as zero)
    pub fn to_na(&self) -> nalgebra::Vector3<f64> {
        nalgebra::Vector3::new(self.x(), self.values.get(1).copied().unwrap_or(0.0), self.z())
    }
}

impl From<nalgebra::Vector3<f64>> for Vector {
    fn from(v: nalgebra::Vector3<f64>) -> Self {
        Vector::vec3(v.x, v.y, v.z)
    }
}

impl From<nalgebra::Point3<f64>> for Vector {
    fn from(p: nalgebra::Point3<f64>) -> Self {
        Vector::vec3(p.x, p.y, p.z)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.values.iter().map(|v| format!("{:?}", v)).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        self.checked_add(&rhs).unwrap_or_else(|err| panic!("{err}"))
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        self.checked_sub(&rhs).unwrap_or_else(|err| panic!("{err}"))
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        self.scale(rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self.scale(-1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_axis_aliases() {
        let v = Vector::vec3(1.0, 2.0, 3.0);
        assert_eq!(v.get("X").unwrap(), 1.0);
        assert_eq!(v.get("width").unwrap(), 2.0);
        assert_eq!(v.get("d").unwrap(), 3.0);
        assert!(v.get("w2").is_err());
    }

    #[test]
    fn test_subtraction() {
        let v = Vector::vec3(2.0, 1.0, 5.0) - Vector::vec3(1.0, 2.0, 3.0);
        assert_eq!(v.values(), &[1.0, -1.0, 2.0]);
    }

    #[test]
    fn test_dot_and_cross() {
        let a = Vector::vec3(9.0, 2.0, 7.0);
        let b = Vector::vec3(4.0, 8.0, 10.0);
        assert_eq!(a.dot(&b).unwrap(), 122.0);

        let c = Vector::vec3(2.0, 3.0, 4.0)
            .cross(&Vector::vec3(5.0, 6.0, 7.0))
            .unwrap();
        assert_eq!(c.values(), &[-3.0, 6.0, -3.0]);
    }

    #[test]
    fn test_distance() {
        let a = Vector::vec3(6.1, 51.0, 3.0);
        let b = Vector::vec3(1.9, 99.0, 2.9);
        assert_relative_eq!(a.distance(&b).unwrap(), 48.18, epsilon = 0.01);
    }

    #[test]
    fn test_arity_mismatch() {
        let a = Vector::vec2(1.0, 2.0);
        let b = Vector::vec3(1.0, 2.0, 3.0);
        assert!(matches!(
            a.checked_add(&b),
            Err(ScadError::ArityMismatch { expected: 2, actual: 3 })
        ));
        assert!(a.cross(&a).is_err());
    }

    #[test]
    fn test_from_values_pads_defaults() {
        let c = Vector::from_values(VectorKind::Color, &[0.5, 0.5]).unwrap();
        assert_eq!(c.values(), &[0.5, 0.5, 0.0, 1.0]);
        assert!(Vector::from_values(VectorKind::Vec2, &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_colorname_roundtrip() {
        let mut c = Vector::from_color_name("green").unwrap();
        assert_eq!(c.colorname(), "green");
        c.set("g", 0.0).unwrap();
        assert_ne!(c.colorname(), "green");
        assert!(matches!(
            c.set_colorname("octarine"),
            Err(ScadError::UnknownColor(_))
        ));
    }

    #[test]
    fn test_display_keeps_decimal_point() {
        assert_eq!(Vector::vec3(1.0, 2.0, 3.0).to_string(), "[1.0, 2.0, 3.0]");
    }
}
