// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OpenSCAD bridge behavior, using a stand-in executable where a process is needed

use scadkit::args;
use scadkit::ast::{Args, NodeType};
use scadkit::cli::OpenScad;
use scadkit::geometry::{Cube, Sphere};
use scadkit::{Config, ScadError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[cfg(unix)]
fn fake_openscad(dir: &Path, exit_code: i32) -> String {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("fake-openscad");
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"{}\"\nexit {exit_code}\n",
        dir.join("argv.txt").display()
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path.display().to_string()
}

#[test]
fn test_scad_output_skips_the_compiler() {
    let dir = TempDir::new().unwrap();
    let mut engine = OpenScad::with(args!(command = "scadkit-missing-binary")).unwrap();
    let out = dir.path().join("sphere.scad");
    let outcome = engine
        .render(&Sphere::build(args!(r = 2)).unwrap(), Some(&out), false, Args::new())
        .unwrap();
    assert!(outcome.command.is_empty());
    assert_eq!(fs::read_to_string(out).unwrap(), "sphere(r=2.0, center=false);");
}

#[test]
fn test_missing_compiler_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut engine = OpenScad::with(args!(command = "scadkit-missing-binary")).unwrap();
    let result = engine.render(
        &Cube::node().unwrap(),
        Some(&dir.path().join("cube.stl")),
        false,
        Args::new(),
    );
    assert!(matches!(result, Err(ScadError::ToolNotFound(_))));
}

#[cfg(unix)]
#[test]
fn test_invocation_and_cleanup() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        openscad_path: Some(fake_openscad(dir.path(), 0)),
        csglimit: Some(500),
        ..Config::default()
    };
    let mut engine = config.engine().unwrap();
    let out = dir.path().join("cube.png");
    let outcome = engine
        .render(
            &Cube::build(args!(3)).unwrap(),
            Some(&out),
            false,
            args!(projection = "p", imgsize = [800, 600]),
        )
        .unwrap();
    assert_eq!(outcome.status, Some(0));
    assert!(outcome.success());

    let argv: Vec<String> = fs::read_to_string(dir.path().join("argv.txt"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(argv[0], "-o");
    assert_eq!(argv[1], out.display().to_string());
    assert!(argv.contains(&"--imgsize=800,600".to_string()));
    assert!(argv.contains(&"--projection=persp".to_string()));
    assert!(argv.contains(&"--preview".to_string()));
    assert!(argv.contains(&"--csglimit=500".to_string()));

    let input = argv.last().unwrap();
    assert!(input.ends_with(".scad"));
    assert!(!Path::new(input).exists(), "scratch file was not removed");

    // per-call overrides do not stick
    let settings = engine.settings();
    assert!(settings.get("projection").unwrap().is_none());
    assert!(settings.get_bool("_render").unwrap());
    assert!(settings.get("output").unwrap().is_none());
}

#[cfg(unix)]
#[test]
fn test_nonzero_exit_is_reported_not_raised() {
    let dir = TempDir::new().unwrap();
    let mut engine = OpenScad::with(args!(command = fake_openscad(dir.path(), 3))).unwrap();
    let outcome = engine
        .render(
            &Cube::node().unwrap(),
            Some(&dir.path().join("cube.stl")),
            false,
            Args::new(),
        )
        .unwrap();
    assert_eq!(outcome.status, Some(3));
    assert!(!outcome.success());
}
