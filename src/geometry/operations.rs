// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Combinators, transforms and pass-through statements

use super::primitives::{convexity_arg, flatten};
use crate::ast::{
    Accessor, FieldSpec, FieldType, Node, NodeClass, NodeType, Object, Value, Vector, VectorKind,
};
use crate::error::{Result, ScadError};
use crate::io::{RenderOptions, ScadArg};
use once_cell::sync::Lazy;

macro_rules! combinator {
    ($(#[$meta:meta])* $ty:ident, $static:ident, $name:literal, $scad:literal) => {
        $(#[$meta])*
        pub struct $ty;

        static $static: Lazy<NodeClass> = Lazy::new(|| {
            NodeClass::builder($name)
                .scad($scad)
                .extends(Object::class())
                .build()
        });

        impl NodeType for $ty {
            fn class() -> &'static NodeClass {
                &$static
            }
        }
    };
}

combinator!(Union, UNION, "Union", "union");
combinator!(
    /// First child is the base, the rest are subtracted in order
    Difference,
    DIFFERENCE,
    "Difference",
    "difference"
);
combinator!(Intersection, INTERSECTION, "Intersection", "intersection");
combinator!(Hull, HULL, "Hull", "hull");
combinator!(Minkowski, MINKOWSKI, "Minkowski", "minkowski");
combinator!(
    /// Forces a full CGAL evaluation of the children
    Render,
    RENDER,
    "Render",
    "render"
);

/// A vector given either whole or one value per axis
fn vector_positional(node: &mut Node, args: Vec<Value>) -> Result<()> {
    match args.len() {
        1 => node.set("vector", args.into_iter().next().unwrap_or(Value::None)),
        _ => node.set("vector", Value::List(args)),
    }
}

/// Shared base of transforms wrapping one 3-vector
pub struct VectorTransform;

static VECTOR_TRANSFORM: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("VectorTransform")
        .extends(Object::class())
        .field(FieldSpec::vector("vector", VectorKind::Vec3))
        .alias("x", "vector.x")
        .alias("y", "vector.y")
        .alias("z", "vector.z")
        .alias("v", "vector")
        .positional(vector_positional)
        .scad_args(|node| Ok(vec![ScadArg::positional(node.get_vector("vector")?)]))
        .build()
});

impl NodeType for VectorTransform {
    fn class() -> &'static NodeClass {
        &VECTOR_TRANSFORM
    }
}

pub struct Translate;

static TRANSLATE: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Translate")
        .scad("translate")
        .extends(VectorTransform::class())
        .build()
});

impl NodeType for Translate {
    fn class() -> &'static NodeClass {
        &TRANSLATE
    }
}

pub struct Scale;

static SCALE: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Scale")
        .scad("scale")
        .extends(VectorTransform::class())
        .field(FieldSpec::vector("vector", VectorKind::Vec3).default(Vector::vec3(1.0, 1.0, 1.0)))
        .build()
});

impl NodeType for Scale {
    fn class() -> &'static NodeClass {
        &SCALE
    }
}

/// Mirror across the plane through the origin whose normal is `vector`
pub struct Mirror;

static MIRROR: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Mirror")
        .scad("mirror")
        .extends(VectorTransform::class())
        .field(FieldSpec::vector("vector", VectorKind::Vec3).default(Vector::vec3(1.0, 0.0, 0.0)))
        .build()
});

impl NodeType for Mirror {
    fn class() -> &'static NodeClass {
        &MIRROR
    }
}

/// Rotation by per-axis angles, or by one angle about an axis
pub struct Rotate;

static ROTATE: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Rotate")
        .scad("rotate")
        .extends(VectorTransform::class())
        .field(FieldSpec::new("angle", FieldType::Float).optional())
        .field(FieldSpec::vector("axis", VectorKind::Vec3).optional())
        .alias("v", "axis")
        .accessor("a", Accessor::read_write(rotate_get_a, rotate_set_a))
        .positional(rotate_positional)
        .scad_args(rotate_args)
        .build()
});

impl NodeType for Rotate {
    fn class() -> &'static NodeClass {
        &ROTATE
    }
}

fn rotate_get_a(node: &Node) -> Result<Value> {
    match node.get("angle")? {
        Value::None => node.get("vector"),
        angle => Ok(angle),
    }
}

/// A scalar selects angle/axis form, anything else the per-axis form
fn rotate_set_a(node: &mut Node, value: Value) -> Result<()> {
    match value {
        Value::Int(_) | Value::Float(_) => node.set("angle", value),
        value => {
            node.set("angle", Value::None)?;
            node.set("vector", value)
        }
    }
}

fn rotate_positional(node: &mut Node, args: Vec<Value>) -> Result<()> {
    let mut args = args.into_iter();
    match (args.next(), args.next(), args.next(), args.next()) {
        (Some(a), None, None, None) => rotate_set_a(node, a),
        (Some(angle @ (Value::Int(_) | Value::Float(_))), Some(axis), None, None) => {
            node.set("angle", angle)?;
            node.set("axis", axis)
        }
        (Some(x), Some(y), Some(z), None) => node.set("vector", Value::List(vec![x, y, z])),
        (first, second, third, fourth) => Err(ScadError::UnexpectedArguments {
            type_name: node.type_name().to_string(),
            count: [first, second, third, fourth].iter().flatten().count(),
        }),
    }
}

fn rotate_args(node: &Node) -> Result<Vec<ScadArg>> {
    match node.get("angle")? {
        Value::None => Ok(vec![ScadArg::named("a", node.get_vector("vector")?)]),
        angle => {
            let mut args = vec![ScadArg::named("a", angle)];
            let axis = node.get("axis")?;
            if !axis.is_none() {
                args.push(ScadArg::named("v", axis));
            }
            Ok(args)
        }
    }
}

/// Colors the children; accepts RGBA components or a color name
pub struct Color;

static COLOR: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Color")
        .scad("color")
        .extends(Object::class())
        .field(FieldSpec::vector("color", VectorKind::Color))
        .alias("r", "color.red")
        .alias("g", "color.green")
        .alias("b", "color.blue")
        .alias("a", "color.alpha")
        .alias("red", "color.red")
        .alias("green", "color.green")
        .alias("blue", "color.blue")
        .alias("alpha", "color.alpha")
        .alias("colorname", "color.colorname")
        .positional(|node, args| match flatten(args).as_slice() {
            [Value::Str(name)] => node.set("colorname", name.as_str()),
            [single] => node.set("color", single.clone()),
            components => node.set("color", Value::List(components.to_vec())),
        })
        .scad_args(|node| Ok(vec![ScadArg::positional(node.get_vector("color")?)]))
        .build()
});

impl NodeType for Color {
    fn class() -> &'static NodeClass {
        &COLOR
    }
}

pub struct LinearExtrude;

static LINEAR_EXTRUDE: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("LinearExtrude")
        .scad("linear_extrude")
        .extends(Object::class())
        .field(FieldSpec::float("height", 1.0))
        .field(FieldSpec::new("twist", FieldType::Float).optional())
        .field(FieldSpec::int("slices").default(20))
        .field(FieldSpec::float("scale", 1.0))
        .field(FieldSpec::new("convexity", FieldType::Int).optional())
        .scad_args(|node| {
            let mut args = vec![
                ScadArg::named("height", node.get_f64("height")?),
                ScadArg::named("center", node.get_bool("center")?),
            ];
            if let Some(twist) = node.get_opt_f64("twist")? {
                args.push(ScadArg::named("twist", twist));
            }
            args.push(ScadArg::named("slices", node.get_i64("slices")?));
            args.push(ScadArg::named("scale", node.get_f64("scale")?));
            convexity_arg(node, &mut args)?;
            Ok(args)
        })
        .build()
});

impl NodeType for LinearExtrude {
    fn class() -> &'static NodeClass {
        &LINEAR_EXTRUDE
    }
}

/// 2D shadow of the children, or a slice at z=0 when `cut` is set
pub struct Projection;

static PROJECTION: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Projection")
        .scad("projection")
        .extends(Object::class())
        .field(FieldSpec::bool("cut", false))
        .scad_args(|node| Ok(vec![ScadArg::named("cut", node.get_bool("cut")?)]))
        .build()
});

impl NodeType for Projection {
    fn class() -> &'static NodeClass {
        &PROJECTION
    }
}

fn filename_positional(node: &mut Node, args: Vec<Value>) -> Result<()> {
    match flatten(args).as_slice() {
        [filename] => node.set("filename", filename.clone()),
        other => Err(ScadError::UnexpectedArguments {
            type_name: node.type_name().to_string(),
            count: other.len(),
        }),
    }
}

/// `<keyword> <file>` with no terminating semicolon
fn render_file_statement(node: &Node, opts: &RenderOptions, level: usize) -> Result<String> {
    let keyword = node.class().scad_name().ok_or_else(|| ScadError::NotRenderable {
        type_name: node.type_name().to_string(),
    })?;
    Ok(format!(
        "{}{keyword} <{}>",
        opts.margin(level),
        node.get_string("filename")?
    ))
}

/// `include <file>`: runs the file's top-level statements
pub struct Include;

static INCLUDE: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Include")
        .scad("include")
        .extends(Object::class())
        .field(FieldSpec::str("filename"))
        .alias("file", "filename")
        .alias("path", "filename")
        .positional(filename_positional)
        .render(render_file_statement)
        .build()
});

impl NodeType for Include {
    fn class() -> &'static NodeClass {
        &INCLUDE
    }
}

/// `use <file>`: imports modules and functions only
pub struct Use;

static USE: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Use")
        .scad("use")
        .extends(Include::class())
        .build()
});

impl NodeType for Use {
    fn class() -> &'static NodeClass {
        &USE
    }
}

/// Hand-written SCAD emitted verbatim, re-indented to its depth
pub struct Inline;

static INLINE: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Inline")
        .extends(Object::class())
        .field(FieldSpec::str("code"))
        .positional(|node, args| {
            let code = flatten(args)
                .iter()
                .map(|arg| match arg {
                    Value::Str(line) => Ok(line.clone()),
                    other => Err(ScadError::cast("code", "str", other.type_name())),
                })
                .collect::<Result<Vec<_>>>()?;
            node.set("code", code.join("\n"))
        })
        .render(|node, opts, level| {
            let margin = opts.margin(level);
            let code = node.get_string("code")?;
            Ok(code
                .lines()
                .map(|line| format!("{margin}{line}"))
                .collect::<Vec<_>>()
                .join("\n"))
        })
        .build()
});

impl NodeType for Inline {
    fn class() -> &'static NodeClass {
        &INLINE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::geometry::{Cube, Cylinder};
    use crate::io::code_eq;

    fn cylinder() -> Node {
        Cylinder::build(args!(h = 10, r = 20)).unwrap()
    }

    #[test]
    fn test_rotate_forms() {
        let rotate = Rotate::build(args!(x = 20, y = 30, z = 40)).unwrap().attach([cylinder()]);
        assert!(code_eq(
            &rotate.render_scad().unwrap(),
            "rotate(a=[20.0,30.0,40.0]){cylinder(r=20.0,h=10.0,center=false);}"
        ));

        let rotate = Rotate::build(args!(20)).unwrap().attach([cylinder()]);
        assert!(code_eq(
            &rotate.render_scad().unwrap(),
            "rotate(a=20.0){cylinder(r=20.0,h=10.0,center=false);}"
        ));

        let rotate = Rotate::build(args!(20, [0, 0, 1])).unwrap().attach([cylinder()]);
        assert!(code_eq(
            &rotate.render_scad().unwrap(),
            "rotate(a=20.0,v=[0.0,0.0,1.0]){cylinder(r=20.0,h=10.0,center=false);}"
        ));

        let rotate = Rotate::build(args!(a = [0, 90, 0])).unwrap();
        assert_eq!(rotate.render_scad().unwrap(), "rotate(a=[0.0, 90.0, 0.0]);");
    }

    #[test]
    fn test_translate_positional_and_axes() {
        let tr = Translate::build(args!([1, 2, 3])).unwrap();
        assert_eq!(tr.get_f64("y").unwrap(), 2.0);
        let tr = Translate::build(args!(z = 5)).unwrap().attach([Cube::node().unwrap()]);
        assert_eq!(
            tr.render_scad().unwrap(),
            "translate([0.0, 0.0, 5.0]) {\n    cube([1.0, 1.0, 1.0], center=false);\n}"
        );
    }

    #[test]
    fn test_color_by_name_and_components() {
        let mut color = Color::build(args!("green")).unwrap();
        assert_eq!(color.get_string("colorname").unwrap(), "green");
        assert_eq!(color.get_f64("r").unwrap(), 0.0);
        color.set("g", 0).unwrap();
        assert_ne!(color.get_string("colorname").unwrap(), "green");

        let color = Color::build(args!([1, 0, 0])).unwrap();
        assert_eq!(color.get_f64("alpha").unwrap(), 1.0);
        assert_eq!(color.render_scad().unwrap(), "color([1.0, 0.0, 0.0, 1.0]);");

        assert!(matches!(
            Color::build(args!("not-a-color")),
            Err(ScadError::UnknownColor(_))
        ));
    }

    #[test]
    fn test_linear_extrude_args() {
        let extrude = LinearExtrude::build(args!(height = 4, twist = 90)).unwrap();
        assert_eq!(
            extrude.render_scad().unwrap(),
            "linear_extrude(height=4.0, center=false, twist=90.0, slices=20, scale=1.0);"
        );
    }

    #[test]
    fn test_include_and_inline() {
        let include = Include::build(args!("threads.scad")).unwrap();
        assert_eq!(include.render_scad().unwrap(), "include <threads.scad>");
        let used = Use::build(args!(file = "threads.scad")).unwrap();
        assert_eq!(used.render_scad().unwrap(), "use <threads.scad>");
        assert!(used.class().is_a(Include::class()));

        let inline = Inline::build(args!(code = "a = 1;\nb = 2;")).unwrap();
        let union = Union::node().unwrap().attach([inline]);
        assert_eq!(
            union.render_scad().unwrap(),
            "union() {\n    a = 1;\n    b = 2;\n}"
        );
    }

    #[test]
    fn test_modifier_priority() {
        let mut cube = Cube::build(args!(debug = true, disable = true)).unwrap();
        assert_eq!(cube.render_scad().unwrap(), "#cube([1.0, 1.0, 1.0], center=false);");
        cube.set("background", true).unwrap();
        assert!(cube.render_scad().unwrap().starts_with('%'));
    }
}
