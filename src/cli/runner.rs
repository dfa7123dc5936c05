// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Subprocess bridge to the OpenSCAD compiler
//!
//! Settings live in an ordinary node so a render call can override them
//! inside a push/pop scope and leave the caller's settings untouched.

use crate::args;
use crate::ast::{
    Accessor, Args, FieldSpec, FieldType, Node, NodeClass, NodeType, Value, Vector, VectorKind,
};
use crate::error::{Result, ScadError};
use crate::io::{format_float, format_value, RenderOptions};
use once_cell::sync::Lazy;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(windows)]
const OPENSCAD_EXE: &str = "openscad.exe";
#[cfg(not(windows))]
const OPENSCAD_EXE: &str = "openscad";

/// Viewpoint for image exports: eye and center, plus an optional distance
pub struct Camera;

static CAMERA: Lazy<NodeClass> = Lazy::new(|| {
    NodeClass::builder("Camera")
        .field(FieldSpec::vector("v1", VectorKind::Vec3).optional())
        .field(FieldSpec::vector("v2", VectorKind::Vec3).optional())
        .field(FieldSpec::new("distance", FieldType::Float).optional())
        .alias("eye", "v1")
        .alias("e", "v1")
        .alias("translate", "v1")
        .alias("t", "v1")
        .alias("center", "v2")
        .alias("c", "v2")
        .alias("rotation", "v2")
        .alias("rot", "v2")
        .alias("r", "v2")
        .build()
});

impl NodeType for Camera {
    fn class() -> &'static NodeClass {
        &CAMERA
    }
}

/// Command-line options of one compiler run
pub struct OpenScadSettings;

static OPENSCAD_SETTINGS: Lazy<NodeClass> = Lazy::new(|| {
    let optional_str = |name: &str| FieldSpec::new(name, FieldType::Str).optional().no_cast();
    NodeClass::builder("OpenScadSettings")
        .field(optional_str("_command"))
        .field(optional_str("output"))
        .field(optional_str("deps"))
        .field(optional_str("make"))
        .field(FieldSpec::new("define", FieldType::Map))
        .field(FieldSpec::bool("version", false))
        .field(FieldSpec::bool("info", false))
        .field(FieldSpec::new("camera", FieldType::Node(Camera::class())).optional())
        .field(FieldSpec::vector("imgsize", VectorKind::Vec2).default(Vector::vec2(640.0, 480.0)))
        .field(optional_str("_projection"))
        .field(FieldSpec::bool("_render", true))
        .field(FieldSpec::new("csglimit", FieldType::Int).optional())
        .field(optional_str("input"))
        .accessor("command", Accessor::read_write(get_command, set_command))
        .accessor("preview", Accessor::read_write(get_preview, set_preview))
        .accessor("projection", Accessor::read_write(get_projection, set_projection))
        .alias("full_render", "_render")
        .alias("o", "output")
        .alias("d", "deps")
        .alias("m", "make")
        .alias("D", "define")
        .build()
});

impl NodeType for OpenScadSettings {
    fn class() -> &'static NodeClass {
        &OPENSCAD_SETTINGS
    }
}

fn get_command(node: &Node) -> Result<Value> {
    match node.get("_command")? {
        Value::None => Ok(Value::from(OPENSCAD_EXE)),
        command => Ok(command),
    }
}

fn set_command(node: &mut Node, value: Value) -> Result<()> {
    node.set("_command", value)
}

fn get_preview(node: &Node) -> Result<Value> {
    Ok(Value::Bool(!node.get_bool("_render")?))
}

fn set_preview(node: &mut Node, value: Value) -> Result<()> {
    let preview = FieldType::Bool
        .cast("preview", value)?
        .as_bool()
        .unwrap_or(false);
    node.set("_render", !preview)
}

fn get_projection(node: &Node) -> Result<Value> {
    node.get("_projection")
}

/// Accepts any prefix of `ortho` or `persp`; a projection implies preview mode
fn set_projection(node: &mut Node, value: Value) -> Result<()> {
    let requested = match value {
        Value::None => return node.set("_projection", Value::None),
        Value::Str(s) => s,
        other => return Err(ScadError::cast("projection", "str", other.type_name())),
    };
    let mode = ["ortho", "persp"]
        .into_iter()
        .find(|mode| mode.starts_with(requested.as_str()))
        .ok_or_else(|| ScadError::InvalidOption {
            option: "projection".to_string(),
            value: requested.clone(),
        })?;
    node.set("_projection", mode)?;
    node.set("_render", false)
}

/// What a compiler run did
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    /// Executed argv, empty when the text was written directly
    pub command: Vec<String>,
    /// Exit code; `None` for direct writes and background runs
    pub status: Option<i32>,
    pub output: Option<PathBuf>,
}

impl RenderOutcome {
    pub fn success(&self) -> bool {
        self.status.map_or(true, |code| code == 0)
    }
}

/// Handle on the external compiler
#[derive(Debug, Clone)]
pub struct OpenScad {
    settings: Node,
    options: RenderOptions,
}

impl OpenScad {
    pub fn new() -> Result<Self> {
        Self::with(Args::new())
    }

    /// Bridge whose settings are built from constructor arguments
    pub fn with(args: Args) -> Result<Self> {
        Ok(Self {
            settings: OpenScadSettings::build(args)?,
            options: RenderOptions::default(),
        })
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn settings(&self) -> &Node {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Node {
        &mut self.settings
    }

    /// Argument vector for the current settings, executable first
    pub fn command_line(&self) -> Result<Vec<String>> {
        command_line(&self.settings)
    }

    /// Render `scene` to `output`
    ///
    /// A `.scad` output receives the generated text directly. Anything else
    /// runs the compiler on a scratch copy of the text with `overrides`
    /// applied to the settings for this call only. A non-zero exit status is
    /// logged and reported in the outcome, not returned as an error. With
    /// `background` set the call returns once the process has started and the
    /// scratch file is removed when it exits.
    pub fn render(
        &mut self,
        scene: &Node,
        output: Option<&Path>,
        background: bool,
        overrides: Args,
    ) -> Result<RenderOutcome> {
        let scad = scene.render_with(&self.options)?;
        if let Some(path) = output.filter(|p| is_scad(p)) {
            fs::write(path, scad)?;
            tracing::info!(path = %path.display(), "wrote scad");
            return Ok(RenderOutcome {
                command: Vec::new(),
                status: None,
                output: Some(path.to_path_buf()),
            });
        }

        self.settings.scoped(|settings| {
            let (_, keywords, _) = overrides.into_parts();
            settings.update(keywords)?;
            if let Some(path) = output {
                settings.set("output", path.display().to_string())?;
            }

            let mut scratch = tempfile::Builder::new()
                .prefix("scadkit-")
                .suffix(".scad")
                .tempfile()?;
            scratch.write_all(scad.as_bytes())?;
            scratch.flush()?;
            settings.set("input", scratch.path().display().to_string())?;

            let mut argv = command_line(settings)?;
            let executable = which(&argv[0]).ok_or_else(|| {
                tracing::warn!(command = %argv[0], "OpenSCAD executable not found");
                ScadError::ToolNotFound(argv[0].clone())
            })?;
            argv[0] = executable.display().to_string();
            tracing::debug!(command = %argv.join(" "), "executing");

            let mut process = Command::new(&argv[0]);
            process.args(&argv[1..]);
            let outcome = |status| RenderOutcome {
                command: argv.clone(),
                status,
                output: output.map(Path::to_path_buf),
            };

            if background {
                let mut child = process.spawn()?;
                std::thread::spawn(move || {
                    match child.wait() {
                        Ok(status) if !status.success() => report_exit(status.code()),
                        Ok(_) => {}
                        Err(err) => tracing::error!(%err, "lost track of OpenSCAD process"),
                    }
                    drop(scratch);
                });
                return Ok(outcome(None));
            }

            let status = process.status()?;
            if !status.success() {
                report_exit(status.code());
            }
            Ok(outcome(Some(status.code().unwrap_or(-1))))
        })
    }
}

fn report_exit(code: Option<i32>) {
    tracing::error!(
        code = code.unwrap_or(-1),
        "OpenSCAD returned a non-zero exit code"
    );
}

fn is_scad(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("scad"))
}

fn command_line(settings: &Node) -> Result<Vec<String>> {
    let mut argv = vec![settings.get_string("command")?];
    if settings.get_bool("info")? {
        argv.push("--info".into());
        return Ok(argv);
    }
    if settings.get_bool("version")? {
        argv.push("--version".into());
        return Ok(argv);
    }

    for (flag, field) in [("-o", "output"), ("-d", "deps"), ("-m", "make")] {
        if let Value::Str(path) = settings.get(field)? {
            argv.extend([flag.to_string(), path]);
        }
    }
    if let Value::Map(defines) = settings.get("define")? {
        for (key, value) in defines {
            let value = match value {
                Value::Str(s) => s,
                other => format_value(&other)?,
            };
            argv.extend(["-D".to_string(), format!("{key}=\"{value}\"")]);
        }
    }
    if let Value::Node(camera) = settings.get("camera")? {
        argv.push(format!("--camera={}", camera_arg(&camera)?));
    }
    let imgsize = settings.get_vector("imgsize")?;
    argv.push(format!(
        "--imgsize={},{}",
        imgsize.x() as i64,
        imgsize.y() as i64
    ));
    if let Value::Str(projection) = settings.get("projection")? {
        argv.push(format!("--projection={projection}"));
    }
    argv.push(if settings.get_bool("_render")? { "--render" } else { "--preview" }.into());
    if let Value::Int(limit) = settings.get("csglimit")? {
        argv.push(format!("--csglimit={limit}"));
    }
    if let Value::Str(input) = settings.get("input")? {
        argv.push(input);
    }
    Ok(argv)
}

fn camera_arg(camera: &Node) -> Result<String> {
    let mut parts = Vec::new();
    for (field, role) in [("v1", "eye"), ("v2", "center")] {
        let vector = match camera.get(field)? {
            Value::Vector(vector) => vector,
            _ => {
                return Err(ScadError::IncompleteCamera {
                    missing: role.to_string(),
                })
            }
        };
        parts.extend(vector.iter().map(format_float));
    }
    if let Some(distance) = camera.get_opt_f64("distance")? {
        parts.push(format_float(distance));
    }
    Ok(parts.join(","))
}

/// Locate an executable: a qualified path, the macOS application bundles, then `PATH`
pub fn which(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }
    if cfg!(target_os = "macos") {
        let bundles = [
            format!("/Applications/{program}/{program}.app/Contents/MacOS/{program}"),
            format!("/Applications/{program}.app/Contents/MacOS/{program}"),
        ];
        if let Some(found) = bundles.iter().map(PathBuf::from).find(|p| is_executable(p)) {
            return Some(found);
        }
    }
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|p| is_executable(p))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Settings for a camera looking from `eye` at `center`
pub fn camera(eye: Vector, center: Vector, distance: Option<f64>) -> Result<Node> {
    Camera::build(args!(eye = eye, center = center, distance = distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Cube;
    use indexmap::IndexMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_command_line() {
        let scad = OpenScad::new().unwrap();
        assert_eq!(
            scad.command_line().unwrap(),
            vec![OPENSCAD_EXE, "--imgsize=640,480", "--render"]
        );
    }

    #[test]
    fn test_full_command_line() {
        let mut defines = IndexMap::new();
        defines.insert("part".to_string(), Value::from("lid"));
        defines.insert("scale".to_string(), Value::from(2));
        let cam = camera(
            Vector::vec3(10.0, 10.0, 10.0),
            Vector::vec3(0.0, 0.0, 0.0),
            Some(50.0),
        )
        .unwrap();
        let scad = OpenScad::with(args!(
            command = "/opt/openscad",
            o = "out.png",
            deps = "out.d",
            define = defines,
            camera = cam,
            imgsize = [320, 200],
            csglimit = 5000,
            projection = "o"
        ))
        .unwrap();
        assert_eq!(
            scad.command_line().unwrap(),
            vec![
                "/opt/openscad",
                "-o",
                "out.png",
                "-d",
                "out.d",
                "-D",
                "part=\"lid\"",
                "-D",
                "scale=\"2\"",
                "--camera=10.0,10.0,10.0,0.0,0.0,0.0,50.0",
                "--imgsize=320,200",
                "--projection=ortho",
                "--preview",
                "--csglimit=5000",
            ]
        );
    }

    #[test]
    fn test_camera_requires_eye_and_center() {
        let eye_only = Camera::build(args!(eye = Vector::vec3(1.0, 2.0, 3.0))).unwrap();
        let scad = OpenScad::with(args!(camera = eye_only)).unwrap();
        match scad.command_line() {
            Err(ScadError::IncompleteCamera { missing }) => assert_eq!(missing, "center"),
            other => panic!("unexpected: {other:?}"),
        }

        let center_only = Camera::build(args!(c = Vector::vec3(0.0, 0.0, 0.0))).unwrap();
        let scad = OpenScad::with(args!(camera = center_only)).unwrap();
        let err = scad.command_line().unwrap_err();
        assert_eq!(err.to_string(), "camera needs both eye and center; 'eye' is unset");
    }

    #[test]
    fn test_projection_prefixes() {
        let mut scad = OpenScad::new().unwrap();
        let settings = scad.settings_mut();
        settings.set("projection", "pers").unwrap();
        assert_eq!(settings.get_string("projection").unwrap(), "persp");
        assert!(settings.get_bool("preview").unwrap());
        assert!(matches!(
            settings.set("projection", "fisheye"),
            Err(ScadError::InvalidOption { .. })
        ));
        settings.set("preview", false).unwrap();
        assert!(settings.get_bool("_render").unwrap());
    }

    #[test]
    fn test_info_and_version_are_exclusive() {
        let scad = OpenScad::with(args!(info = true, version = true, o = "x.stl")).unwrap();
        assert_eq!(scad.command_line().unwrap(), vec![OPENSCAD_EXE, "--info"]);
    }

    #[test]
    fn test_scad_output_is_written_directly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("part.SCAD");
        let mut scad = OpenScad::new().unwrap();
        let outcome = scad
            .render(&Cube::node().unwrap(), Some(&path), false, Args::new())
            .unwrap();
        assert!(outcome.command.is_empty());
        assert!(outcome.success());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "cube([1.0, 1.0, 1.0], center=false);"
        );
    }

    #[test]
    fn test_missing_executable_restores_settings() {
        let dir = TempDir::new().unwrap();
        let mut scad = OpenScad::with(args!(command = "scadkit-no-such-openscad")).unwrap();
        let err = scad
            .render(
                &Cube::node().unwrap(),
                Some(&dir.path().join("part.stl")),
                false,
                args!(csglimit = 10),
            )
            .unwrap_err();
        assert!(matches!(err, ScadError::ToolNotFound(_)));
        assert!(scad.settings().get("csglimit").unwrap().is_none());
        assert!(scad.settings().get("output").unwrap().is_none());
        assert_eq!(scad.settings().stack_depth(), 0);
    }

    #[test]
    fn test_which_rejects_missing_paths() {
        assert!(which("/definitely/not/here/openscad").is_none());
    }
}
