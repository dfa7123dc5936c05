// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tool configuration: `scadkit.toml` plus environment overrides

use crate::args;
use crate::cli::OpenScad;
use crate::geometry::{ENDCAP_OFFSET, PIPE_PADDING};
use crate::io::{RenderOptions, DEFAULT_INDENT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory by [`Config::load`]
pub const CONFIG_FILE: &str = "scadkit.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenSCAD executable; searched on `PATH` when unset
    pub openscad_path: Option<String>,
    /// Spaces per nesting level in generated text
    pub indent: usize,
    pub imgsize: [u32; 2],
    pub csglimit: Option<u64>,
    /// `--render` when true, `--preview` otherwise
    pub full_render: bool,
    /// Inner-to-outer height ratio of pipe cutters
    pub pipe_padding: f64,
    /// Overlap added where end caps meet a body
    pub endcap_offset: f64,
    /// `tracing` filter directive for the command-line tool
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openscad_path: None,
            indent: DEFAULT_INDENT,
            imgsize: [640, 480],
            csglimit: None,
            full_render: true,
            pipe_padding: PIPE_PADDING,
            endcap_offset: ENDCAP_OFFSET,
            log_filter: "scadkit=info".to_string(),
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// `scadkit.toml` from the working directory, then the environment
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Config file at `path` if it exists, defaults otherwise, then the environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = if PathBuf::from(path.as_ref()).exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `OPENSCAD_PATH`, `SCADKIT_INDENT`, `SCADKIT_CSGLIMIT` and `SCADKIT_LOG`
    ///
    /// Values that fail to parse leave the setting alone.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(openscad) = lookup("OPENSCAD_PATH") {
            self.openscad_path = Some(openscad);
        }
        if let Some(indent) = lookup("SCADKIT_INDENT").and_then(|v| v.parse().ok()) {
            self.indent = indent;
        }
        if let Some(limit) = lookup("SCADKIT_CSGLIMIT") {
            if let Ok(limit) = limit.parse() {
                self.csglimit = Some(limit);
            }
        }
        if let Some(filter) = lookup("SCADKIT_LOG") {
            self.log_filter = filter;
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::with_indent(self.indent)
    }

    /// OpenSCAD bridge carrying these settings
    pub fn engine(&self) -> Result<OpenScad> {
        let settings = args!(
            command = self.openscad_path.clone(),
            imgsize = self.imgsize.to_vec(),
            full_render = self.full_render,
            csglimit = self.csglimit.map(|limit| limit as i64)
        );
        let engine = OpenScad::with(settings).context("Failed to configure OpenSCAD")?;
        Ok(engine.with_options(self.render_options()))
    }
}
