//! Simulation Plot Generator
//!
//! Renders the standard chart set for a single simulation run from its JSON report or
//! CSV time-series export.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use workforce_viz::application::rendering::render_batch;
use workforce_viz::application::reporting::VizReporter;
use workforce_viz::application::simulation_plots::{self, SIMULATION_DASHBOARD};
use workforce_viz::config::{ImageFormat, VizConfig};
use workforce_viz::infrastructure::observability::init_logging;
use workforce_viz::infrastructure::{RenderSettings, load_simulation_data};

#[derive(Parser)]
#[command(author, version, about = "Generate charts from simulation results", long_about = None)]
struct Cli {
    /// Simulation results file (JSON report or CSV export)
    input: PathBuf,

    /// Output directory for the charts
    #[arg(short, long, default_value = "plots")]
    output: PathBuf,

    /// Only render the summary dashboard
    #[arg(long)]
    dashboard_only: bool,

    /// Image format (png, svg); overrides VIZ_IMAGE_FORMAT
    #[arg(long)]
    format: Option<ImageFormat>,

    /// TOML file with render setting overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the run summary as JSON into the output directory
    #[arg(long)]
    export_summary: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = VizConfig::load(cli.config.as_deref())?;
    init_logging(&config.observability);
    if let Some(format) = cli.format {
        config.render.image_format = format;
    }
    let settings = RenderSettings::from(&config.render);

    let reporter = VizReporter::new(&cli.output);
    reporter.print_header("SIMULATION PLOT GENERATOR", &cli.input);

    std::fs::create_dir_all(&cli.output).context(format!(
        "Failed to create output directory {}",
        cli.output.display()
    ))?;

    println!("Loading simulation data from {}...", cli.input.display());
    let data = load_simulation_data(&cli.input)
        .context(format!("Could not load simulation data from {}", cli.input.display()))?;
    println!("Loaded {} time steps of simulation data", data.frame.len());

    let report = data.report.as_ref();
    let jobs = if cli.dashboard_only {
        println!("Creating summary dashboard...");
        simulation_plots::summary_dashboard(report, &data.frame)
            .map(|figure| vec![(SIMULATION_DASHBOARD, figure)])
            .unwrap_or_default()
    } else {
        println!("Creating workforce, revenue, cost, equilibrium and dashboard plots...");
        simulation_plots::all_figures(report, &data.frame)
    };
    if jobs.is_empty() {
        bail!(
            "No plottable columns found in {} (expected workforce, cost or revenue data)",
            cli.input.display()
        );
    }

    let written = render_batch(&jobs, &cli.output, &settings).context("Failed to render plots")?;
    info!("Wrote {} chart files", written.len());

    if let Some(report) = report {
        reporter.print_simulation_summary(report);
        if cli.export_summary {
            reporter.export_summary_json(&report.summary(), &cli.input, "simulation_summary.json")?;
        }
    } else if cli.export_summary {
        println!("⚠️  Summary export needs a JSON report; skipped for CSV input");
    }

    reporter.print_generated_files(settings.format.extension())?;
    Ok(())
}
