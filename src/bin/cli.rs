// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! scadkit CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use scadkit::ast::{Args, NodeType, Value, Vector};
use scadkit::cli::{camera, demo, demos, Reporter};
use scadkit::geometry::Inline;
use scadkit::{args, io, Config};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scadkit")]
#[command(about = "Declarative CSG scenes and an OpenSCAD bridge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Args)]
struct RenderFlags {
    /// Camera as eye and center coordinates, optionally followed by a distance
    #[arg(long, value_name = "X,Y,Z,X,Y,Z[,D]")]
    camera: Option<String>,

    /// Image size for PNG exports
    #[arg(long, value_name = "W,H")]
    imgsize: Option<String>,

    /// Projection: any prefix of `ortho` or `persp`
    #[arg(long)]
    projection: Option<String>,

    /// Use preview mode instead of a full CGAL render
    #[arg(long)]
    preview: bool,

    /// CSG node limit
    #[arg(long)]
    csglimit: Option<i64>,

    /// Preprocessor defines
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    define: Vec<String>,

    /// Return once OpenSCAD has started
    #[arg(long)]
    background: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run OpenSCAD on an existing SCAD file
    Render {
        /// Input SCAD file
        input: PathBuf,

        /// Output file; the extension selects the export format
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        flags: RenderFlags,
    },

    /// Build a built-in scene and print or render it
    Demo {
        /// Scene name (pipe, chamfer, sierpinski, crosshairs, arc)
        name: String,

        /// Output file; `.scad` writes the text, anything else runs OpenSCAD
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        flags: RenderFlags,
    },

    /// Print a built-in scene's node tree as JSON
    Inspect {
        /// Scene name
        name: String,
    },

    /// List the built-in scenes
    List,

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env(|key| std::env::var(key).ok());
            config
        }
        None => Config::load()?,
    };
    init_tracing(&config, cli.verbose);

    match cli.command {
        Commands::Render {
            input,
            output,
            flags,
        } => render_command(&config, &input, &output, &flags),
        Commands::Demo {
            name,
            output,
            flags,
        } => demo_command(&config, &name, output.as_deref(), &flags),
        Commands::Inspect { name } => {
            let scene = demo(&name, &config)?;
            println!("{}", scene.to_json()?);
            Ok(())
        }
        Commands::List => {
            for (name, description) in demos::describe() {
                Reporter::report_info(&format!("{name:<12} {description}"));
            }
            Ok(())
        }
        Commands::Version => {
            println!("scadkit v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("scadkit=debug")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.log_filter))
            .unwrap_or_else(|_| EnvFilter::new("scadkit=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn render_command(config: &Config, input: &Path, output: &Path, flags: &RenderFlags) -> Result<()> {
    if !input.exists() {
        Reporter::report_error(&format!("Input file not found: {}", input.display()));
        std::process::exit(1);
    }
    let code = io::read_scad(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let scene = Inline::build(args!(code = code))?;
    run_engine(config, &scene, output, flags)
}

fn demo_command(
    config: &Config,
    name: &str,
    output: Option<&Path>,
    flags: &RenderFlags,
) -> Result<()> {
    let start = Instant::now();
    let scene = match demo(name, config) {
        Ok(scene) => scene,
        Err(err) => {
            Reporter::report_error(&err.to_string());
            Reporter::report_info(&format!("Available scenes: {}", scadkit::cli::DEMOS.join(", ")));
            std::process::exit(1);
        }
    };
    match output {
        Some(output) => run_engine(config, &scene, output, flags),
        None => {
            let scad = scene.render_with(&config.render_options())?;
            println!("{scad}");
            Reporter::report_scene(name, &scad, start.elapsed());
            Ok(())
        }
    }
}

fn run_engine(
    config: &Config,
    scene: &scadkit::Node,
    output: &Path,
    flags: &RenderFlags,
) -> Result<()> {
    let mut engine = config.engine()?;
    let overrides = overrides(flags)?;

    Reporter::progress(&format!("Rendering {}", output.display()));
    let start = Instant::now();
    let outcome = engine
        .render(scene, Some(output), flags.background, overrides)
        .with_context(|| format!("Failed to render {}", output.display()))?;
    Reporter::report_render(&outcome, start.elapsed());

    if !outcome.success() {
        Reporter::report_warning("OpenSCAD reported an error; the output may be stale or missing");
        std::process::exit(1);
    }
    Reporter::success("Done");
    Ok(())
}

/// Per-run settings from command-line flags
fn overrides(flags: &RenderFlags) -> Result<Args> {
    let mut args = Args::new();
    if let Some(spec) = &flags.camera {
        let numbers = parse_numbers(spec)?;
        let (eye, center, distance) = match numbers.as_slice() {
            [a, b, c, d, e, f] => ([*a, *b, *c], [*d, *e, *f], None),
            [a, b, c, d, e, f, g] => ([*a, *b, *c], [*d, *e, *f], Some(*g)),
            _ => bail!("--camera expects 6 or 7 numbers, got {}", numbers.len()),
        };
        let eye = Vector::vec3(eye[0], eye[1], eye[2]);
        let center = Vector::vec3(center[0], center[1], center[2]);
        args = args.kw("camera", camera(eye, center, distance)?);
    }
    if let Some(spec) = &flags.imgsize {
        match parse_numbers(spec)?.as_slice() {
            [w, h] => args = args.kw("imgsize", vec![*w, *h]),
            _ => bail!("--imgsize expects W,H"),
        }
    }
    if let Some(projection) = &flags.projection {
        args = args.kw("projection", projection.as_str());
    }
    if flags.preview {
        args = args.kw("preview", true);
    }
    if let Some(limit) = flags.csglimit {
        args = args.kw("csglimit", limit);
    }
    if !flags.define.is_empty() {
        let mut defines = IndexMap::new();
        for define in &flags.define {
            let (key, value) = define
                .split_once('=')
                .with_context(|| format!("Define '{define}' is not KEY=VALUE"))?;
            defines.insert(key.to_string(), Value::from(value));
        }
        args = args.kw("define", defines);
    }
    Ok(args)
}

fn parse_numbers(spec: &str) -> Result<Vec<f64>> {
    spec.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("'{part}' is not a number"))
        })
        .collect()
}
