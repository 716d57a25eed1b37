//! Console reporting for the visualization tools.
//!
//! Provides formatted run summaries, the generated-file listing and JSON export of
//! the headline numbers.

use crate::domain::sensitivity::{ImpactSummary, RunStatistics, SensitivitySummary};
use crate::domain::simulation::{ReportSummary, SimulationReport};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Summary document written by [`VizReporter::export_summary_json`].
#[derive(Debug, Serialize)]
pub struct ExportedSummary<'a> {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub summary: &'a ReportSummary,
}

/// Reporter for chart generation output.
pub struct VizReporter {
    output_dir: PathBuf,
}

impl VizReporter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Prints the header banner for a run.
    pub fn print_header(&self, tool: &str, input: &Path) {
        println!("{}", "=".repeat(80));
        println!("📈 {}", tool);
        println!("{}", "=".repeat(80));
        println!("Input:        {}", input.display());
        println!("Output:       {}", self.output_dir.display());
        println!("{}", "=".repeat(80));
    }

    /// Prints the headline numbers of a simulation run.
    pub fn print_simulation_summary(&self, report: &SimulationReport) {
        let summary = report.summary();
        println!("\n📊 Simulation Summary:");
        println!(
            "  {:<22} | {:>12} | {:>12}",
            "Metric", "Initial", "Final"
        );
        println!("  {}", "-".repeat(52));
        println!(
            "  {:<22} | {:>12} | {:>12}",
            "Workforce", summary.initial_workforce_size, summary.final_workforce_size
        );
        println!(
            "  {:<22} | {:>12} | {:>12}",
            "Humans", summary.initial_human_count, summary.final_human_count
        );
        println!(
            "  {:<22} | {:>12} | {:>12}",
            "AI Agents", summary.initial_ai_agent_count, summary.final_ai_agent_count
        );
        println!();
        println!("  Total Revenue:      {:.2}", summary.total_revenue_generated);
        println!("  Avg Productivity:   {:.2}", summary.average_productivity);
        println!("  Cost Efficiency:    {:.4}", summary.cost_efficiency_ratio);
        if let Some(steps) = report.time_to_equilibrium {
            println!("  Equilibrium After:  {} steps", steps);
        }
        if let Some(failures) = report.total_catastrophic_failures {
            println!("  Catastrophic Fails: {}", failures);
        }
    }

    /// Prints parameter ranking highlights, the simulator's own summary and run
    /// statistics.
    pub fn print_sensitivity_summary(
        &self,
        impacts: Option<&ImpactSummary>,
        simulator: Option<&SensitivitySummary>,
        runs: Option<&RunStatistics>,
    ) {
        println!("\n📊 Sensitivity Summary:");
        if let Some(impacts) = impacts {
            let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());
            println!("  Parameters:         {}", impacts.total_parameters);
            println!("  Top (Time):         {}", or_na(&impacts.most_impactful_time));
            println!(
                "  Top (Composition):  {}",
                or_na(&impacts.most_impactful_composition)
            );
            if let Some(avg) = impacts.average_time_impact {
                println!("  Avg Time Impact:    {:.3}", avg);
            }
        }
        if let Some(simulator) = simulator {
            for line in simulator.summary_lines() {
                println!("  {}", line);
            }
        }
        if let Some(runs) = runs {
            for line in runs.summary_lines().iter().skip(2) {
                println!("  {}", line);
            }
        }
    }

    /// File names in the output directory with the given extension, sorted.
    pub fn generated_files(&self, extension: &str) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.output_dir).context(format!(
            "Failed to list output directory {}",
            self.output_dir.display()
        ))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let matches = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
            if !matches {
                continue;
            }
            if let Some(name) = path.file_name() {
                names.push(name.to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Prints the output directory and every file with `extension` in it.
    pub fn print_generated_files(&self, extension: &str) -> Result<()> {
        let files = self.generated_files(extension)?;
        println!("\n✅ Plots saved to {}/", self.output_dir.display());
        println!("Generated files:");
        for name in files {
            println!("  - {}", name);
        }
        Ok(())
    }

    /// Exports the run summary as pretty JSON, relative to the output directory unless
    /// `filename` is already a path.
    pub fn export_summary_json(
        &self,
        summary: &ReportSummary,
        source: &Path,
        filename: &str,
    ) -> Result<PathBuf> {
        let output_path = if filename.contains('/') || filename.contains('\\') {
            PathBuf::from(filename)
        } else {
            self.output_dir.join(filename)
        };

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {:?}", parent))?;
        }

        let document = ExportedSummary {
            generated_at: Utc::now(),
            source: source.display().to_string(),
            summary,
        };
        let json_output = serde_json::to_string_pretty(&document)
            .context("Failed to serialize summary to JSON")?;

        fs::write(&output_path, json_output)
            .context(format!("Failed to write summary to {}", output_path.display()))?;

        println!("💾 Summary saved to: {}", output_path.display());
        Ok(output_path)
    }
}

impl Default for VizReporter {
    fn default() -> Self {
        Self::new(Path::new("plots"))
    }
}
