//! Sensitivity Analysis Plot Generator
//!
//! Renders parameter rankings, sweep variations, correlation heatmap and outcome
//! distributions from a sensitivity report and/or a detailed run export.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use workforce_viz::application::rendering::render_batch;
use workforce_viz::application::reporting::VizReporter;
use workforce_viz::application::sensitivity_plots::{self, SENSITIVITY_DASHBOARD};
use workforce_viz::config::{ImageFormat, VizConfig};
use workforce_viz::domain::sensitivity::{ImpactSummary, RunStatistics};
use workforce_viz::infrastructure::loader::load_csv_frame;
use workforce_viz::infrastructure::observability::init_logging;
use workforce_viz::infrastructure::{RenderSettings, load_sensitivity_data};

#[derive(Parser)]
#[command(author, version, about = "Generate charts from sensitivity analysis results", long_about = None)]
struct Cli {
    /// Sensitivity results file (JSON report or detailed CSV)
    input: PathBuf,

    /// Output directory for the charts
    #[arg(short, long, default_value = "sensitivity_plots")]
    output: PathBuf,

    /// Detailed per-run CSV export used for the heatmap and distributions
    #[arg(long)]
    detailed: Option<PathBuf>,

    /// Only render the summary dashboard
    #[arg(long)]
    dashboard_only: bool,

    /// Image format (png, svg); overrides VIZ_IMAGE_FORMAT
    #[arg(long)]
    format: Option<ImageFormat>,

    /// TOML file with render setting overrides
    #[arg(long)]
    config: Option<PathBuf>,
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
    reporter.print_header("SENSITIVITY ANALYSIS PLOT GENERATOR", &cli.input);

    std::fs::create_dir_all(&cli.output).context(format!(
        "Failed to create output directory {}",
        cli.output.display()
    ))?;

    println!("Loading sensitivity data from {}...", cli.input.display());
    let mut data = load_sensitivity_data(&cli.input).context(format!(
        "Could not load sensitivity data from {}",
        cli.input.display()
    ))?;

    if let Some(detailed) = &cli.detailed {
        println!("Loading detailed results from {}...", detailed.display());
        let frame = load_csv_frame(detailed)
            .context(format!("Could not load detailed results from {}", detailed.display()))?;
        data.frame = Some(frame);
    }
    if data.is_empty() {
        bail!("No sensitivity data could be loaded");
    }
    if let Some(frame) = &data.frame {
        println!("Loaded {} sensitivity analysis runs", frame.len());
    }

    let report = data.report.as_ref();
    let frame = data.frame.as_ref();
    let jobs = if cli.dashboard_only {
        println!("Creating sensitivity dashboard...");
        sensitivity_plots::sensitivity_dashboard(report, frame)
            .map(|figure| vec![(SENSITIVITY_DASHBOARD, figure)])
            .unwrap_or_default()
    } else {
        println!("Creating sensitivity analysis plots...");
        sensitivity_plots::all_figures(report, frame)
    };
    if jobs.is_empty() {
        bail!("Nothing to plot: no rankings, sweeps or outcome columns were found");
    }

    render_batch(&jobs, &cli.output, &settings).context("Failed to render plots")?;

    let impacts = report.map(|r| ImpactSummary::from_rankings(&r.parameter_rankings));
    let runs = frame.and_then(RunStatistics::from_frame);
    let simulator = report.and_then(|r| r.summary.as_ref());
    reporter.print_sensitivity_summary(impacts.as_ref(), simulator, runs.as_ref());

    reporter.print_generated_files(settings.format.extension())?;
    Ok(())
}
