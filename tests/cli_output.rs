// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! The `scadkit` binary keeps generated SCAD alone on stdout

use scadkit::cli::demo;
use scadkit::Config;
use std::process::Command;
use tempfile::TempDir;

fn scadkit(dir: &TempDir, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_scadkit"))
        .args(args)
        .current_dir(dir.path())
        .env_remove("SCADKIT_INDENT")
        .env_remove("SCADKIT_LOG")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_demo_stdout_is_only_scad() {
    let dir = TempDir::new().unwrap();
    let output = scadkit(&dir, &["demo", "pipe"]);
    assert!(output.status.success());

    let config = Config::default();
    let expected = demo("pipe", &config)
        .unwrap()
        .render_with(&config.render_options())
        .unwrap();
    assert_eq!(String::from_utf8(output.stdout).unwrap(), format!("{expected}\n"));

    let summary = String::from_utf8(output.stderr).unwrap();
    assert!(summary.contains("Scene:"));
}

#[test]
fn test_inspect_prints_json() {
    let dir = TempDir::new().unwrap();
    let output = scadkit(&dir, &["inspect", "arc"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["type"], "Union");
}
