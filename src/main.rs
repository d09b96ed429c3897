//! GT Flow - GregTech processing line balancer
//!
//! Reads a project file, balances machine counts and writes a Graphviz chart.
//!
//! # Usage
//!
//! ```bash
//! gtflow projects/steel.gtf --config flow.toml --output output/
//! dot -Tpng output/steel.dot -o steel.png
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use gtflow_core::{
    balance, build_graph, dsl,
    error::{FlowError, Result},
    render::to_dot,
    FlowConfig, GameData,
};
use log::{error, info};

/// Balance a GregTech processing line and chart it
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the project file
    #[arg(value_name = "PROJECT")]
    project: PathBuf,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Game data tables replacing the bundled ones (TOML)
    #[arg(short, long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Directory the chart is written to
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    output: PathBuf,

    /// Burn leftover fuels in generators
    #[arg(long)]
    power_line: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn write_chart(dir: &Path, name: &str, dot: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{}.dot", name));
    let write_error = |source| FlowError::FileWriteError {
        path: path.display().to_string(),
        source,
    };
    fs::create_dir_all(dir).map_err(write_error)?;
    fs::write(&path, dot).map_err(write_error)?;
    Ok(path)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => FlowConfig::load(path)?,
        None => FlowConfig::default(),
    };
    config.debug_logging |= args.verbose;
    config.power_line |= args.power_line;

    let level = if config.debug_logging { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let data = match &args.data {
        Some(path) => GameData::load(path)?,
        None => GameData::builtin()?,
    };
    config.validate(&data)?;

    let name = args
        .project
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    // Load and overclock
    let recipes = dsl::load_project_file(&args.project, &config)?;
    let mut graph = build_graph(recipes, &config, &data)?;

    // Solve and chart
    match balance(&mut graph, &config, &data) {
        Ok(summary) => {
            let path = write_chart(&args.output, &name, &to_dot(&graph, Some(&summary), &config, &name))?;
            info!("Output graph at: {}", path.display());
            Ok(())
        }
        Err(err @ (FlowError::Inconsistent { .. } | FlowError::UnsupportedConflict { .. })) => {
            let debug_name = format!("{}_debug", name);
            let path = write_chart(&args.output, &debug_name, &to_dot(&graph, None, &config, &debug_name))?;
            error!("{}", err);
            info!("Debug graph with solver variables at: {}", path.display());
            Err(err)
        }
        Err(err) => Err(err),
    }
}
