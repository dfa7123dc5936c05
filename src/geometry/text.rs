// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Glyph outlines and left-to-right text layout
//!
//! Font parsing lives behind [`GlyphSource`]; loaded sources are cached per
//! font path for the life of the process.

use super::operations::{LinearExtrude, Translate, Union};
use super::primitives::{inherit_visibility, Polygon};
use crate::args;
use crate::ast::{FieldSpec, FieldType, Node, NodeClass, NodeType, Object, Value, Vector};
use crate::error::{Result, ScadError};
use crate::utils::math::{flatten_contours, split_contour};
use dashmap::DashMap;
use nalgebra::Point2;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Flattened outline of one character: points plus closed index paths
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    pub points: Vec<Point2<f64>>,
    pub paths: Vec<Vec<usize>>,
}

impl Outline {
    /// Flatten raw font contours of on-curve / off-curve points
    ///
    /// Curved segments are sampled with `steps` points each.
    pub fn from_contours(contours: &[Vec<(Point2<f64>, bool)>], steps: usize) -> Self {
        let segments: Vec<_> = contours.iter().map(|c| split_contour(c)).collect();
        let (points, paths) = flatten_contours(&segments, steps);
        Self { points, paths }
    }
}

/// Provider of glyph outlines and metrics for one font face
pub trait GlyphSource: Send + Sync {
    /// Outline of `ch` at `size`, curves flattened with `steps` samples each
    fn outline(&self, ch: char, size: f64, steps: usize) -> Result<Outline>;

    /// Horizontal pen advance after `ch`
    fn advance(&self, ch: char, size: f64) -> Result<f64>;

    /// Horizontal adjustment between a pair of characters
    fn kerning(&self, _left: char, _right: char, _size: f64) -> Result<f64> {
        Ok(0.0)
    }
}

static FONT_CACHE: Lazy<DashMap<String, Arc<dyn GlyphSource>>> = Lazy::new(DashMap::new);

/// Make `source` available under `path`, replacing any earlier entry
pub fn register_font(path: &str, source: Arc<dyn GlyphSource>) {
    FONT_CACHE.insert(path.to_string(), source);
}

/// Cached source for `path`, loading it on first use
pub fn font<F>(path: &str, loader: F) -> Result<Arc<dyn GlyphSource>>
where
    F: FnOnce(&str) -> Result<Arc<dyn GlyphSource>>,
{
    if let Some(source) = FONT_CACHE.get(path) {
        return Ok(Arc::clone(source.value()));
    }
    let source = loader(path)?;
    tracing::debug!(path, "cached font face");
    Ok(Arc::clone(
        FONT_CACHE
            .entry(path.to_string())
            .or_insert(source)
            .value(),
    ))
}

/// Source already registered for `path`
pub fn cached_font(path: &str) -> Result<Arc<dyn GlyphSource>> {
    FONT_CACHE
        .get(path)
        .map(|source| Arc::clone(source.value()))
        .ok_or_else(|| ScadError::Font(format!("no font loaded for '{path}'")))
}

/// One character as a polygon, extruded when `depth` is positive
pub struct Glyph;

static GLYPH: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Glyph")
        .extends(Object::class())
        .field(FieldSpec::str("fontfile"))
        .field(FieldSpec::str("ch"))
        .field(FieldSpec::float("size", 10.0))
        .field(FieldSpec::float("depth", 0.0))
        .field(FieldSpec::int("steps").default(10))
        .alias("font", "fontfile")
        .alias("char", "ch")
        .render(|node, opts, level| glyph_shape(node)?.render_at(opts, level))
        .build()
});

impl NodeType for Glyph {
    fn class() -> &'static NodeClass {
        &GLYPH
    }
}

fn glyph_char(node: &Node) -> Result<char> {
    node.get_string("ch")?
        .chars()
        .next()
        .ok_or_else(|| ScadError::Font(format!("glyph '{}' has no character", node.name())))
}

fn glyph_shape(node: &Node) -> Result<Node> {
    let source = cached_font(&node.get_string("fontfile")?)?;
    let steps = usize::try_from(node.get_i64("steps")?).unwrap_or(1);
    let outline = source.outline(glyph_char(node)?, node.get_f64("size")?, steps)?;

    let points = outline
        .points
        .iter()
        .map(|p| Value::Vector(Vector::vec2(p.x, p.y)))
        .collect::<Vec<_>>();
    let paths = outline
        .paths
        .iter()
        .map(|path| path.iter().map(|&i| Value::from(i)).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    let mut polygon = Polygon::build(args!(points = points, paths = paths))?;

    let depth = node.get_f64("depth")?;
    if depth <= 0.0 {
        inherit_visibility(node, &mut polygon)?;
        return Ok(polygon.attach(node.children().iter().cloned()));
    }
    let mut extrude = LinearExtrude::build(args!(height = depth))?;
    inherit_visibility(node, &mut extrude)?;
    Ok(extrude.attach(std::iter::once(polygon).chain(node.children().iter().cloned())))
}

/// A run of glyphs laid out left to right
pub struct Text;

static TEXT: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Text")
        .extends(Object::class())
        .field(FieldSpec::str("text"))
        .field(
            FieldSpec::new("glyph", FieldType::Node(Glyph::class()))
                .factory(|| Ok(Glyph::node()?.into())),
        )
        .field(FieldSpec::bool("kerning", true))
        .alias("kernflag", "kerning")
        .alias("fontfile", "glyph.fontfile")
        .alias("font", "glyph.fontfile")
        .alias("size", "glyph.size")
        .alias("depth", "glyph.depth")
        .alias("steps", "glyph.steps")
        .positional(|node, args| match args.as_slice() {
            [text] => node.set("text", text.clone()),
            other => Err(ScadError::UnexpectedArguments {
                type_name: node.type_name().to_string(),
                count: other.len(),
            }),
        })
        .render(|node, opts, level| layout(node)?.render_at(opts, level))
        .build()
});

impl NodeType for Text {
    fn class() -> &'static NodeClass {
        &TEXT
    }
}

/// Pen position of every character of the text
pub fn pen_offsets(node: &Node) -> Result<Vec<(char, f64)>> {
    let glyph = node.node_field("glyph")?;
    let source = cached_font(&glyph.get_string("fontfile")?)?;
    let size = glyph.get_f64("size")?;
    let kerning = node.get_bool("kerning")?;

    let mut offsets = Vec::new();
    let mut pen = 0.0;
    let mut previous: Option<char> = None;
    for ch in node.get_string("text")?.chars() {
        if let (Some(left), true) = (previous, kerning) {
            pen += source.kerning(left, ch, size)?;
        }
        offsets.push((ch, pen));
        pen += source.advance(ch, size)?;
        previous = Some(ch);
    }
    Ok(offsets)
}

fn layout(node: &Node) -> Result<Node> {
    let template = node.node_field("glyph")?;
    let mut placed = Vec::new();
    for (ch, x) in pen_offsets(node)? {
        let mut glyph = template.clone();
        glyph.set("ch", ch.to_string())?;
        placed.push(Translate::build(args!(x = x))?.attach([glyph]));
    }
    let mut union = Union::node()?;
    union.set_name(node.name());
    inherit_visibility(node, &mut union)?;
    Ok(union.attach(placed.into_iter().chain(node.children().iter().cloned())))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is a unit-square outline scaled by size
    struct BlockFont;

    impl GlyphSource for BlockFont {
        fn outline(&self, _ch: char, size: f64, _steps: usize) -> Result<Outline> {
            Ok(Outline {
                points: vec![
                    Point2::new(0.0, 0.0),
                    Point2::new(size, 0.0),
                    Point2::new(size, size),
                    Point2::new(0.0, size),
                ],
                paths: vec![vec![0, 1, 2, 3]],
            })
        }

        fn advance(&self, _ch: char, size: f64) -> Result<f64> {
            Ok(size * 1.5)
        }

        fn kerning(&self, left: char, right: char, _size: f64) -> Result<f64> {
            Ok(if (left, right) == ('A', 'V') { -1.0 } else { 0.0 })
        }
    }

    fn block_font() -> &'static str {
        register_font("test://block", Arc::new(BlockFont));
        "test://block"
    }

    #[test]
    fn test_glyph_renders_polygon() {
        let glyph = Glyph::build(args!(font = block_font(), ch = "A", size = 2)).unwrap();
        assert_eq!(
            glyph.render_scad().unwrap(),
            "polygon(points=[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]], paths=[[0, 1, 2, 3]]);"
        );
        let glyph = Glyph::build(args!(font = block_font(), ch = "A", size = 2, depth = 1)).unwrap();
        assert!(glyph.render_scad().unwrap().starts_with("linear_extrude(height=1.0"));
    }

    #[test]
    fn test_text_applies_kerning() {
        let text = Text::build(args!("AVA"; font = block_font(), size = 2)).unwrap();
        let offsets = pen_offsets(&text).unwrap();
        assert_eq!(offsets, vec![('A', 0.0), ('V', 2.0), ('A', 5.0)]);

        let mut plain = text.clone();
        plain.set("kernflag", false).unwrap();
        let offsets = pen_offsets(&plain).unwrap();
        assert_eq!(offsets[1], ('V', 3.0));
    }

    #[test]
    fn test_text_renders_union_of_translated_glyphs() {
        let text = Text::build(args!("AB"; font = block_font(), size = 1)).unwrap();
        let scad = text.render_scad().unwrap();
        assert!(scad.starts_with("union() {\n    translate([0.0, 0.0, 0.0]) {\n        polygon("));
        assert!(scad.contains("translate([1.5, 0.0, 0.0])"));
    }

    #[test]
    fn test_outline_from_quadratic_contour() {
        // square with one bulging side
        let contour = vec![
            (Point2::new(0.0, 0.0), true),
            (Point2::new(1.0, 0.0), true),
            (Point2::new(1.5, 0.5), false),
            (Point2::new(1.0, 1.0), true),
            (Point2::new(0.0, 1.0), true),
        ];
        let outline = Outline::from_contours(&[contour], 4);
        assert_eq!(outline.paths.len(), 1);
        // three straight starts plus four samples of the curve
        assert_eq!(outline.points.len(), 7);
        assert_eq!(outline.points[1], Point2::new(1.0, 0.0));
        assert_eq!(outline.points[3], Point2::new(1.25, 0.5));
        assert_eq!(outline.paths[0], (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_missing_font_is_reported() {
        let glyph = Glyph::build(args!(font = "missing.ttf", ch = "x")).unwrap();
        assert!(matches!(glyph.render_scad(), Err(ScadError::Font(_))));
        let loaded = font("test://lazy", |_| Ok(Arc::new(BlockFont) as Arc<dyn GlyphSource>)).unwrap();
        assert_eq!(loaded.advance('x', 2.0).unwrap(), 3.0);
        assert!(cached_font("test://lazy").is_ok());
    }
}
