// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Facet-count control for curved shapes

use crate::ast::{FieldSpec, FieldType, Node, NodeClass, NodeType, Object, Value};
use crate::error::Result;
use crate::io::{format_args, RenderOptions, ScadArg};
use once_cell::sync::Lazy;

/// Unset fixed facet count
pub const DEFAULT_FN: f64 = 0.0;
/// Angular resolution assumed when none is given
pub const DEFAULT_FA: f64 = 2.0;
/// Arc-length resolution assumed when none is given
pub const DEFAULT_FS: f64 = 2.0;
/// Fewest facets an adaptive resolution produces
pub const MIN_FRAGMENTS: f64 = 5.0;
/// Smallest `fa`/`fs` honoured; lower values are raised to this, as OpenSCAD does
pub const MIN_ADAPTIVE: f64 = 0.01;
/// Upper bound on the facets of a single arc
pub const MAX_FRAGMENTS: f64 = 100_000.0;

/// Facet settings as plain numbers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub fn_: f64,
    pub fa: f64,
    pub fs: f64,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            fn_: DEFAULT_FN,
            fa: DEFAULT_FA,
            fs: DEFAULT_FS,
        }
    }
}

impl Resolution {
    pub fn fixed(fn_: f64) -> Self {
        Self {
            fn_,
            ..Self::default()
        }
    }

    pub fn from_node(node: &Node) -> Result<Self> {
        Ok(Self {
            fn_: node.get_f64("fn")?,
            fa: node.get_f64("fa")?,
            fs: node.get_f64("fs")?,
        })
    }

    /// Segments used for an arc of `length` spanning `angle` degrees
    ///
    /// The count is always within `3..=MAX_FRAGMENTS`, whatever the inputs.
    pub fn fragments(&self, length: f64, angle: f64) -> usize {
        let fragments = if self.fn_ > 0.0 {
            self.fn_.max(3.0).trunc()
        } else {
            let fa = self.fa.max(MIN_ADAPTIVE);
            let fs = self.fs.max(MIN_ADAPTIVE);
            (angle / fa).min(length / fs).max(MIN_FRAGMENTS).ceil()
        };
        fragments.min(MAX_FRAGMENTS) as usize
    }

    /// Special-variable arguments differing from the defaults; `$fn` excludes the others
    pub fn scad_args(&self) -> Vec<ScadArg> {
        if self.fn_ != DEFAULT_FN {
            return vec![ScadArg::named("$fn", self.fn_)];
        }
        let mut args = Vec::new();
        if self.fa != DEFAULT_FA {
            args.push(ScadArg::named("$fa", self.fa));
        }
        if self.fs != DEFAULT_FS {
            args.push(ScadArg::named("$fs", self.fs));
        }
        args
    }
}

/// `fn`/`fa`/`fs` settings node, nested inside every curved shape
pub struct RadialResolution;

static RADIAL_RESOLUTION: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("RadialResolution")
        .field(FieldSpec::float("fn", DEFAULT_FN))
        .field(FieldSpec::float("fs", DEFAULT_FS))
        .field(FieldSpec::float("fa", DEFAULT_FA))
        .alias("$fn", "fn")
        .alias("$fa", "fa")
        .alias("$fs", "fs")
        .scad_args(|node| Ok(Resolution::from_node(node)?.scad_args()))
        .render(render_statements)
        .build()
});

impl NodeType for RadialResolution {
    fn class() -> &'static NodeClass {
        &RADIAL_RESOLUTION
    }
}

impl RadialResolution {
    pub fn fragments(node: &Node, length: f64, angle: f64) -> Result<usize> {
        Ok(Resolution::from_node(node)?.fragments(length, angle))
    }
}

/// As a scene statement the settings become global assignments, one per line
fn render_statements(node: &Node, opts: &RenderOptions, level: usize) -> Result<String> {
    let margin = opts.margin(level);
    let args = Resolution::from_node(node)?.scad_args();
    Ok(args
        .iter()
        .map(|arg| Ok(format!("{margin}{};", format_args(std::slice::from_ref(arg))?)))
        .collect::<Result<Vec<_>>>()?
        .join("\n"))
}

/// Base of every shape approximated by facets
pub struct Radial;

static RADIAL: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Radial")
        .extends(Object::class())
        .field(
            FieldSpec::new("resolution", FieldType::Node(RadialResolution::class()))
                .factory(|| Ok(Value::from(RadialResolution::node()?)))
                .propagate(),
        )
        .alias("fn", "resolution.fn")
        .alias("fa", "resolution.fa")
        .alias("fs", "resolution.fs")
        .alias("segments", "resolution.fn")
        .build()
});

impl NodeType for Radial {
    fn class() -> &'static NodeClass {
        &RADIAL
    }
}

/// The `$fn`/`$fa`/`$fs` arguments of a radial node
pub(crate) fn resolution_args(node: &Node) -> Result<Vec<ScadArg>> {
    Ok(Resolution::from_node(node.node_field("resolution")?)?.scad_args())
}

/// Facet settings of a radial node
pub(crate) fn resolution_of(node: &Node) -> Result<Resolution> {
    Resolution::from_node(node.node_field("resolution")?)
}
