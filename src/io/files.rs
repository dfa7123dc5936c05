// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Reading and writing .scad files

use super::RenderOptions;
use crate::ast::Node;
use crate::error::Result;
use std::fs;
use std::path::Path;

/// Read SCAD source text from disk
pub fn read_scad(path: impl AsRef<Path>) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

/// Render `node` and write the text to `path` with a trailing newline
pub fn write_scad(node: &Node, path: impl AsRef<Path>, opts: &RenderOptions) -> Result<()> {
    let path = path.as_ref();
    let mut text = node.render_with(opts)?;
    text.push('\n');
    fs::write(path, text)?;
    tracing::info!(path = %path.display(), "wrote scad");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::ast::NodeType;
    use crate::geometry::Cube;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("cube.scad");
        let cube = Cube::build(args!([1, 2, 3]))?;

        write_scad(&cube, &path, &RenderOptions::default())?;
        assert_eq!(read_scad(&path)?, "cube([1.0, 2.0, 3.0], center=false);\n");
        Ok(())
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_scad("/nonexistent/scadkit/missing.scad").unwrap_err();
        assert!(matches!(err, crate::error::ScadError::Io(_)));
    }
}
