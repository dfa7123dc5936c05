// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! scadkit
//!
//! Declarative CSG scene graphs that generate OpenSCAD source. Nodes carry
//! typed attribute namespaces with aliases, nested sub-objects and attribute
//! propagation; the optional bridge hands generated text to the OpenSCAD
//! compiler.

pub mod ast;
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod kernel;
pub mod utils;

pub use ast::{Args, Namer, Node, NodeClass, NodeType, Value, Vector, VectorKind};
pub use cli::{OpenScad, RenderOutcome};
pub use config::Config;
pub use error::{Result, ScadError};
pub use io::{code_eq, RenderOptions};
pub use kernel::Assembly;

/// Render a scene to OpenSCAD source with default formatting
pub fn render(scene: &Node) -> Result<String> {
    scene.render_scad()
}

/// Render a scene and write it to `path`
pub fn render_file(scene: &Node, path: impl AsRef<std::path::Path>) -> Result<()> {
    io::write_scad(scene, path, &RenderOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::geometry::{Cube, Union};

    #[test]
    fn test_basic_union() {
        let scene = Union::node()
            .unwrap()
            .attach([Cube::node().unwrap(), Cube::build(args!(2)).unwrap()]);
        assert_eq!(
            render(&scene).unwrap(),
            "union() {\n    cube([1.0, 1.0, 1.0], center=false);\n    cube([2.0, 2.0, 2.0], center=false);\n}"
        );
    }
}
