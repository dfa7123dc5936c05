// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - SCAD emission and file access

mod files;
mod writer;

pub use files::{read_scad, write_scad};
pub use writer::{
    code_eq, format_args, format_float, format_value, modifier, normalize, render_block,
    render_call, render_children, RenderOptions, ScadArg, DEFAULT_INDENT,
};
