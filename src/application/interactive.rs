//! Interactive HTML dashboards built on plotly.js.

use crate::application::simulation_plots::{
    AI_COLUMNS, AVAILABLE_BUDGET, HUMAN_COLUMNS, REVENUE_OUTPUT, TOTAL_COST, TOTAL_PRODUCTIVITY,
    budget_utilization,
};
use crate::domain::errors::VizError;
use crate::domain::figure::{SET1, format_thousands};
use crate::domain::frame::Frame;
use crate::domain::sensitivity::{ImpactSummary, SensitivityReport};
use crate::domain::simulation::SimulationReport;
use crate::infrastructure::plotly::{PlotlyFigure, SubplotGrid};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

const TIME_STEP_TITLE: &str = "Time Step";

fn line(name: &str, x: &[f64], y: &[f64], color: &str, hover: &str) -> Value {
    json!({
        "type": "scatter",
        "mode": "lines",
        "name": name,
        "x": x,
        "y": y,
        "line": {"color": color},
        "hovertemplate": hover,
    })
}

fn title_layout(text: &str, color: &str) -> Value {
    json!({"text": text, "x": 0.5, "font": {"size": 24, "color": color}})
}

fn apply_white_theme(figure: &mut PlotlyFigure) {
    figure.set_layout("showlegend", json!(true));
    figure.set_layout("plot_bgcolor", json!("white"));
    figure.set_layout("paper_bgcolor", json!("white"));
}

/// Key metrics of a finished run for the dashboard table.
pub fn key_metrics(report: &SimulationReport) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    if let Some(steps) = report.time_to_equilibrium {
        rows.push(("Time to Equilibrium".to_string(), format!("{} steps", steps)));
    }
    if let Some(failures) = report.total_catastrophic_failures {
        rows.push(("Catastrophic Failures".to_string(), failures.to_string()));
    }
    if let Some(state) = &report.equilibrium_state {
        if let Some(revenue) = state.revenue_output {
            rows.push((
                "Final Revenue".to_string(),
                format!("${}", format_thousands(revenue)),
            ));
        }
        if let Some(productivity) = state.total_productivity {
            rows.push((
                "Final Productivity".to_string(),
                format!("{:.2}", productivity),
            ));
        }
    }
    rows
}

/// Six-cell simulation dashboard: workforce, revenue, cost with budget on a
/// secondary axis, productivity, budget utilisation and a key metrics table.
pub fn simulation_dashboard(report: Option<&SimulationReport>, frame: &Frame) -> PlotlyFigure {
    let grid = SubplotGrid::new(3, 2)
        .with_secondary_y(1, 0)
        .with_table(2, 1);
    let mut figure = PlotlyFigure::new(
        grid,
        &[
            "Workforce Composition",
            "Revenue Output",
            "Cost Analysis",
            "Productivity",
            "Budget Utilization",
            "Key Metrics",
        ],
    );
    let time = frame.time_axis();

    if let Some((_, humans)) = frame.first_numeric(&HUMAN_COLUMNS) {
        let mut trace = line(
            "Human Workers",
            &time,
            humans,
            "blue",
            "Time Step: %{x}<br>Humans: %{y}<extra></extra>",
        );
        trace["line"]["width"] = json!(3);
        figure.add_trace(0, 0, trace);
    }
    if let Some((_, agents)) = frame.first_numeric(&AI_COLUMNS) {
        let mut trace = line(
            "AI Agents",
            &time,
            agents,
            "red",
            "Time Step: %{x}<br>AI Agents: %{y}<extra></extra>",
        );
        trace["line"]["width"] = json!(3);
        figure.add_trace(0, 0, trace);
    }

    if let Some(revenue) = frame.numeric(REVENUE_OUTPUT) {
        figure.add_trace(
            0,
            1,
            line(
                "Revenue",
                &time,
                revenue,
                "green",
                "Time Step: %{x}<br>Revenue: $%{y:,.0f}<extra></extra>",
            ),
        );
    }

    if let Some(cost) = frame.numeric(TOTAL_COST) {
        figure.add_trace(
            1,
            0,
            line(
                "Total Cost",
                &time,
                cost,
                "orange",
                "Time Step: %{x}<br>Cost: $%{y:,.0f}<extra></extra>",
            ),
        );
    }
    if let Some(budget) = frame.numeric(AVAILABLE_BUDGET) {
        let mut trace = line(
            "Available Budget",
            &time,
            budget,
            "purple",
            "Time Step: %{x}<br>Available: $%{y:,.0f}<extra></extra>",
        );
        trace["line"]["dash"] = json!("dash");
        figure.add_trace_secondary(1, 0, trace);
    }

    if let Some(productivity) = frame.numeric(TOTAL_PRODUCTIVITY) {
        figure.add_trace(
            1,
            1,
            line(
                "Productivity",
                &time,
                productivity,
                "teal",
                "Time Step: %{x}<br>Productivity: %{y:.2f}<extra></extra>",
            ),
        );
    }

    if let Some(utilization) = budget_utilization(frame) {
        figure.add_trace(
            2,
            0,
            line(
                "Budget Utilization",
                &time,
                &utilization,
                "crimson",
                "Time Step: %{x}<br>Utilization: %{y:.1f}%<extra></extra>",
            ),
        );
    }

    if let Some(report) = report {
        let metrics = key_metrics(report);
        if !metrics.is_empty() {
            figure.add_table(2, 1, &metrics, "lightblue");
        }
    }

    figure.set_layout(
        "title",
        title_layout("Workforce AI Transition Simulation Dashboard", "darkblue"),
    );
    figure.set_layout("height", json!(1000));
    figure.set_layout("legend", json!({"x": 0.01, "y": 0.99}));
    apply_white_theme(&mut figure);

    figure.set_axis_titles(0, 0, TIME_STEP_TITLE, "Number of Workers");
    figure.set_axis_titles(0, 1, TIME_STEP_TITLE, "Revenue ($)");
    figure.set_axis_titles(1, 0, TIME_STEP_TITLE, "Cost ($)");
    figure.set_axis_titles(1, 1, TIME_STEP_TITLE, "Productivity");
    figure.set_axis_titles(2, 0, TIME_STEP_TITLE, "Budget Utilization (%)");
    figure
}

fn impact_summary_rows(summary: &ImpactSummary) -> Vec<(String, String)> {
    let name = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());
    let avg = |v: Option<f64>| v.map_or_else(|| "N/A".to_string(), |v| format!("{:.3}", v));
    vec![
        (
            "Total Parameters Analyzed".to_string(),
            summary.total_parameters.to_string(),
        ),
        ("Most Impactful (Time)".to_string(), name(&summary.most_impactful_time)),
        (
            "Most Impactful (Composition)".to_string(),
            name(&summary.most_impactful_composition),
        ),
        ("Avg Time Impact".to_string(), avg(summary.average_time_impact)),
        (
            "Avg Composition Impact".to_string(),
            avg(summary.average_composition_impact),
        ),
    ]
}

/// Four-cell sensitivity dashboard: time and composition impact bars, one line per
/// sweep and a summary table.
pub fn sensitivity_dashboard(report: &SensitivityReport) -> Result<PlotlyFigure, VizError> {
    let rankings = &report.parameter_rankings;
    if rankings.is_empty() {
        return Err(VizError::empty("parameter rankings"));
    }

    let grid = SubplotGrid::new(2, 2).with_table(1, 1);
    let mut figure = PlotlyFigure::new(
        grid,
        &[
            "Time to Equilibrium Impact",
            "Workforce Composition Impact",
            "Parameter Variations",
            "Summary Statistics",
        ],
    );

    let names: Vec<&str> = rankings.iter().map(|r| r.parameter_name.as_str()).collect();
    let time_impacts: Vec<f64> = rankings
        .iter()
        .map(|r| r.time_to_equilibrium_impact.unwrap_or(0.0))
        .collect();
    let composition_impacts: Vec<f64> = rankings
        .iter()
        .map(|r| r.workforce_composition_impact.unwrap_or(0.0))
        .collect();
    let bar_hover = "Parameter: %{x}<br>Impact: %{y:.3f}<extra></extra>";

    figure.add_trace(
        0,
        0,
        json!({
            "type": "bar",
            "name": "Time Impact",
            "x": names,
            "y": time_impacts,
            "marker": {"color": "skyblue"},
            "hovertemplate": bar_hover,
        }),
    );
    figure.add_trace(
        0,
        1,
        json!({
            "type": "bar",
            "name": "Composition Impact",
            "x": names,
            "y": composition_impacts,
            "marker": {"color": "lightcoral"},
            "hovertemplate": bar_hover,
        }),
    );

    for (i, sweep) in report.sweeps.iter().enumerate() {
        let color = SET1[i % SET1.len()].hex();
        figure.add_trace(
            1,
            0,
            json!({
                "type": "scatter",
                "mode": "lines+markers",
                "name": sweep.parameter_name,
                "x": sweep.parameter_values,
                "y": sweep.time_values(),
                "line": {"color": color, "width": 3},
                "marker": {"size": 8},
                "hovertemplate": format!(
                    "{}: %{{x}}<br>Time to Equilibrium: %{{y}}<extra></extra>",
                    sweep.parameter_name
                ),
            }),
        );
    }

    figure.add_table(
        1,
        1,
        &impact_summary_rows(&ImpactSummary::from_rankings(rankings)),
        "lightgreen",
    );

    figure.set_layout("title", title_layout("Sensitivity Analysis Dashboard", "darkgreen"));
    figure.set_layout("height", json!(800));
    apply_white_theme(&mut figure);

    figure.set_axis_titles(0, 0, "Parameter", "Impact Score");
    figure.set_axis_titles(0, 1, "Parameter", "Impact Score");
    figure.set_axis_titles(1, 0, "Parameter Value", "Time to Equilibrium");
    Ok(figure)
}

/// `<stem>_dashboard.html` (or `<stem>_sensitivity_dashboard.html`) next to the input.
pub fn default_output_path(input: &Path, sensitivity: bool) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());
    let name = if sensitivity {
        format!("{}_sensitivity_dashboard.html", stem)
    } else {
        format!("{}_dashboard.html", stem)
    };
    input.with_file_name(name)
}
