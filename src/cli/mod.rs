// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OpenSCAD bridge, built-in scenes and terminal reporting

pub mod demos;
pub mod reporter;
pub mod runner;

pub use demos::{demo, DEMOS};
pub use reporter::Reporter;
pub use runner::{camera, which, Camera, OpenScad, OpenScadSettings, RenderOutcome};
