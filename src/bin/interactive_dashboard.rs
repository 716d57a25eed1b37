//! Interactive Dashboard Generator
//!
//! Writes a standalone plotly.js HTML dashboard for a simulation run or a sensitivity
//! analysis.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::warn;
use workforce_viz::application::interactive::{
    default_output_path, sensitivity_dashboard, simulation_dashboard,
};
use workforce_viz::config::VizConfig;
use workforce_viz::infrastructure::loader::load_json_report;
use workforce_viz::infrastructure::load_simulation_data;
use workforce_viz::infrastructure::observability::init_logging;

#[derive(Parser)]
#[command(author, version, about = "Create an interactive workforce transition dashboard", long_about = None)]
struct Cli {
    /// Results file (JSON)
    input: PathBuf,

    /// Output HTML file (defaults to <input stem>_dashboard.html next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Build the sensitivity analysis dashboard
    #[arg(long)]
    sensitivity: bool,

    /// Open the dashboard in the default browser once written
    #[arg(long)]
    open: bool,

    /// TOML file with render setting overrides
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = VizConfig::load(cli.config.as_deref())?;
    init_logging(&config.observability);

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input, cli.sensitivity));

    println!("Loading data from {}...", cli.input.display());
    let figure = if cli.sensitivity {
        let report = load_json_report(&cli.input).context(format!(
            "Could not load sensitivity report from {}",
            cli.input.display()
        ))?;
        sensitivity_dashboard(&report).context("Could not build sensitivity dashboard")?
    } else {
        let data = load_simulation_data(&cli.input).context(format!(
            "Could not load simulation data from {}",
            cli.input.display()
        ))?;
        simulation_dashboard(data.report.as_ref(), &data.frame)
    };

    figure
        .write_html(&output, &config.render.plotly_js_url)
        .context(format!("Failed to write dashboard to {}", output.display()))?;
    if cli.sensitivity {
        println!("Interactive sensitivity dashboard saved to {}", output.display());
    } else {
        println!("Interactive dashboard saved to {}", output.display());
    }

    if cli.open {
        match open_in_browser(&output) {
            Ok(()) => println!("Dashboard opened in browser"),
            Err(e) => warn!("Could not open dashboard: {:#}", e),
        }
    }
    Ok(())
}

fn open_in_browser(path: &Path) -> Result<()> {
    let target = path
        .canonicalize()
        .context(format!("Failed to resolve {}", path.display()))?;

    let mut command = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };
    command
        .arg(&target)
        .spawn()
        .context("Failed to launch the platform opener")?;
    Ok(())
}
