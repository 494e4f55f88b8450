// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SketchPart command line
//!
//! # Commands
//!
//! - `sketchpart run <image>` - Sketch to features, model, drawing and solid
//! - `sketchpart patch <run_dir> <patch.json>` - Edit a run's model and re-render
//! - `sketchpart generate <part_id>` - Build a standard part from the catalog
//! - `sketchpart assemble <stl>... --out <file>` - Lay meshes out side by side
//! - `sketchpart catalog` - List the standard parts
//!
//! Logging goes to stderr; `RUST_LOG` selects the filter and `--json`
//! switches to JSON lines.

mod config;
mod input;
mod parts;
mod sketch;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,sketchpart=debug";

/// Part sketches to drawings and solids
#[derive(Parser)]
#[command(name = "sketchpart")]
#[command(about = "Turn part sketches into drawings, solids and standard-part assemblies", long_about = None)]
#[command(version)]
struct Cli {
    /// Log as JSON lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory for run outputs (overrides SKETCHPART_OUTPUT_ROOT)
    #[arg(long, global = true, value_name = "DIR")]
    output_root: Option<PathBuf>,

    /// Catalog JSON file or directory (overrides SKETCHPART_CATALOG)
    #[arg(long, global = true, value_name = "PATH")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a sketch and write its model, drawing and solid
    Run {
        /// PNG, JPEG or BMP sketch
        image: PathBuf,

        /// JSON object of resolution parameters
        #[arg(long, value_name = "FILE")]
        params: Option<PathBuf>,

        /// Parameter override, repeatable
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Run directory name (default: timestamp plus random suffix)
        #[arg(long)]
        run_id: Option<String>,
    },

    /// Patch geometry, constraints or intent of a finished run
    Patch {
        run_dir: PathBuf,
        patch: PathBuf,
    },

    /// Generate a standard part
    Generate {
        part_id: String,

        /// Parameter override, repeatable
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Factor applied to every length parameter
        #[arg(long, default_value_t = 1.0)]
        scale: f64,

        /// Number of copies
        #[arg(long, default_value_t = 1)]
        quantity: usize,

        /// Output directory (default: a new run directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Combine STL files side by side into one
    Assemble {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[arg(long)]
        out: PathBuf,

        /// Gap between components (overrides SKETCHPART_ASSEMBLY_SPACING_MM)
        #[arg(long)]
        spacing: Option<f64>,
    },

    /// List catalog parts
    Catalog {
        #[arg(long)]
        category: Option<String>,

        /// Language for part names
        #[arg(long, default_value = "en")]
        lang: String,
    },
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json);

    let mut config = Config::from_env();
    if let Some(root) = cli.output_root {
        config.output_root = root;
    }
    if let Some(catalog) = cli.catalog {
        config.catalog_path = Some(catalog);
    }
    tracing::debug!(?config, "configuration");

    match cli.command {
        Commands::Run {
            image,
            params,
            set,
            run_id,
        } => {
            let params = input::load_parameters(params.as_deref(), &set)?;
            let run_dir = config.output_root.join(run_id.unwrap_or_else(input::new_run_id));
            sketch::run(&image, &params, &run_dir)?;
            println!("{}", run_dir.display());
        }
        Commands::Patch { run_dir, patch } => {
            sketch::patch(&run_dir, &patch)?;
            println!("{}", run_dir.display());
        }
        Commands::Generate {
            part_id,
            set,
            scale,
            quantity,
            out,
        } => {
            let catalog = input::load_catalog(config.catalog_path.as_deref())?;
            let params = input::load_parameters(None, &set)?;
            let out_dir = out.unwrap_or_else(|| config.output_root.join(input::new_run_id()));
            let selection = parts::generate(
                &catalog,
                &part_id,
                &params,
                scale,
                quantity,
                &out_dir,
                config.assembly_spacing_mm,
            )?;
            for w in &selection.warnings {
                eprintln!("warning: {w}");
            }
            println!("{}", out_dir.display());
        }
        Commands::Assemble {
            inputs,
            out,
            spacing,
        } => {
            let spacing = spacing.unwrap_or(config.assembly_spacing_mm);
            if parts::assemble(&inputs, &out, spacing)? {
                println!("{}", out.display());
            } else {
                eprintln!("no readable meshes, nothing assembled");
            }
        }
        Commands::Catalog { category, lang } => {
            let catalog = input::load_catalog(config.catalog_path.as_deref())?;
            println!("{}", parts::catalog_listing(&catalog, category.as_deref(), &lang));
        }
    }
    Ok(())
}
