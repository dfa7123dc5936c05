// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Assemblies: named parts, a build selection and per-part output

use crate::ast::{Node, NodeType, Value};
use crate::error::{Result, ScadError};
use crate::geometry::Union;
use crate::io::{self, RenderOptions};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Selection entry that builds every part
pub const BUILD_ALL: &str = "all";

/// A named collection of parts rendered together or one file per part
#[derive(Debug, Clone)]
pub struct Assembly {
    name: String,
    parts: IndexMap<String, Node>,
    build: Vec<String>,
}

impl Assembly {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parts: IndexMap::new(),
            build: vec![BUILD_ALL.to_string()],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_part(mut self, name: impl Into<String>, part: Node) -> Self {
        self.add_part(name, part);
        self
    }

    /// Add or replace the part stored under `name`
    pub fn add_part(&mut self, name: impl Into<String>, mut part: Node) {
        let name = name.into();
        part.set_name(name.clone());
        self.parts.insert(name, part);
    }

    /// Swap in a new definition for an existing part, returning the old one
    pub fn replace_part(&mut self, name: &str, mut part: Node) -> Result<Node> {
        let slot = self
            .parts
            .get_mut(name)
            .ok_or_else(|| ScadError::not_found("Assembly", name))?;
        part.set_name(name);
        Ok(std::mem::replace(slot, part))
    }

    pub fn part(&self, name: &str) -> Option<&Node> {
        self.parts.get(name)
    }

    pub fn part_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.parts.get_mut(name)
    }

    pub fn parts(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.parts.iter().map(|(name, part)| (name.as_str(), part))
    }

    /// Choose which parts are built; `"all"` selects every part
    pub fn select<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let build: Vec<String> = names.into_iter().map(Into::into).collect();
        if let Some(unknown) = build
            .iter()
            .find(|name| name.as_str() != BUILD_ALL && !self.parts.contains_key(name.as_str()))
        {
            return Err(ScadError::not_found("Assembly", unknown));
        }
        self.build = build;
        Ok(())
    }

    /// Names of the selected parts, in selection order without repeats
    pub fn build_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entry in &self.build {
            let selected: Vec<&str> = if entry == BUILD_ALL {
                self.parts.keys().map(String::as_str).collect()
            } else {
                vec![entry.as_str()]
            };
            for name in selected {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// The selected parts
    pub fn get_build(&self) -> Vec<&Node> {
        self.build_names()
            .into_iter()
            .filter_map(|name| self.parts.get(name))
            .collect()
    }

    /// Apply attribute overrides
    ///
    /// A key whose first segment names a part targets that part
    /// (`"bracket.outer.height"`). Any other key is applied to every selected
    /// part that understands it and must match at least one.
    pub fn apply_overrides<I, K, V>(&mut self, overrides: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (key, value) in overrides {
            let key = key.as_ref();
            let value = value.into();
            if let Some((part, path)) = key.split_once('.') {
                if let Some(node) = self.parts.get_mut(part) {
                    node.set(path, value)?;
                    continue;
                }
            }

            let targets: Vec<String> = self
                .build_names()
                .into_iter()
                .filter(|name| self.parts[*name].has_attr(key))
                .map(str::to_string)
                .collect();
            if targets.is_empty() {
                return Err(ScadError::not_found("Assembly", key));
            }
            for name in targets {
                if let Some(node) = self.parts.get_mut(&name) {
                    node.set(key, value.clone())?;
                }
            }
        }
        Ok(())
    }

    /// The selected parts under one `union()`
    pub fn scene(&self) -> Result<Node> {
        let mut union = Union::node()?;
        union.set_name(self.name.clone());
        Ok(union.attach(self.get_build().into_iter().cloned()))
    }

    /// Generated text of each selected part
    pub fn render_scad(&self, opts: &RenderOptions) -> Result<IndexMap<String, String>> {
        self.get_build()
            .into_iter()
            .map(|part| Ok((part.name().to_string(), part.render_with(opts)?)))
            .collect()
    }

    /// Write `<part>.scad` for each selected part into `dir`
    pub fn write(&self, dir: impl AsRef<Path>, opts: &RenderOptions) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir.as_ref())?;
        let mut written = Vec::new();
        for part in self.get_build() {
            let path = dir.as_ref().join(format!("{}.scad", part.name()));
            io::write_scad(part, &path, opts)?;
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::geometry::{Cube, Cylinder, Pipe};
    use tempfile::TempDir;

    fn bench() -> Assembly {
        Assembly::new("bench")
            .with_part("leg", Cylinder::build(args!(r = 1, h = 10)).unwrap())
            .with_part("top", Cube::build(args!([20, 10, 1])).unwrap())
            .with_part("sleeve", Pipe::build(args!(or1 = 2, h = 3)).unwrap())
    }

    #[test]
    fn test_build_selection() {
        let mut assembly = bench();
        assert_eq!(assembly.build_names(), vec!["leg", "top", "sleeve"]);
        assembly.select(["top", "all"]).unwrap();
        assert_eq!(assembly.build_names(), vec!["top", "leg", "sleeve"]);
        assert!(assembly.select(["seat"]).is_err());
        assert_eq!(assembly.get_build().len(), 3);
    }

    #[test]
    fn test_dotted_overrides() {
        let mut assembly = bench();
        assembly
            .apply_overrides([("sleeve.outer.height", Value::from(12)), ("leg.h", Value::from(4))])
            .unwrap();
        let sleeve = assembly.part("sleeve").unwrap();
        assert_eq!(sleeve.get_f64("outer.height").unwrap(), 12.0);
        assert_eq!(assembly.part("leg").unwrap().get_f64("height").unwrap(), 4.0);
    }

    #[test]
    fn test_broadcast_overrides_reach_matching_parts() {
        let mut assembly = bench();
        assembly.apply_overrides([("fn", 24)]).unwrap();
        assert_eq!(assembly.part("leg").unwrap().get_f64("fn").unwrap(), 24.0);
        assert_eq!(assembly.part("sleeve").unwrap().get_f64("inner.fn").unwrap(), 24.0);
        assert!(assembly.apply_overrides([("wingspan", 1)]).is_err());
    }

    #[test]
    fn test_replace_part_keeps_name() {
        let mut assembly = bench();
        let old = assembly
            .replace_part("top", Cube::build(args!([30, 10, 1])).unwrap())
            .unwrap();
        assert_eq!(old.get_f64("size.x").unwrap(), 20.0);
        assert_eq!(assembly.part("top").unwrap().name(), "top");
        assert!(assembly.replace_part("seat", Cube::node().unwrap()).is_err());
    }

    #[test]
    fn test_scene_and_files() {
        let mut assembly = bench();
        assembly.select(["leg", "top"]).unwrap();
        let scene = assembly.scene().unwrap().render_scad().unwrap();
        assert_eq!(
            scene,
            "union() {\n    cylinder(r=1.0, h=10.0, center=false);\n    cube([20.0, 10.0, 1.0], center=false);\n}"
        );

        let dir = TempDir::new().unwrap();
        let written = assembly.write(dir.path(), &RenderOptions::default()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("leg.scad"));
        assert_eq!(
            std::fs::read_to_string(&written[1]).unwrap(),
            "cube([20.0, 10.0, 1.0], center=false);\n"
        );
    }
}
