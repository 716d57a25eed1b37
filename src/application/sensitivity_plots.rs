//! Static figures for a sensitivity analysis.

use crate::domain::figure::{
    Bars, Cell, Figure, Histogram, Marker, Orientation, Panel, PanelKind, Rgb, Series,
    TextEmphasis,
};
use crate::domain::frame::Frame;
use crate::domain::sensitivity::{
    FINAL_AI_AGENTS, FINAL_HUMANS, OUTCOMES, ParameterImpact, RunStatistics, SensitivityReport,
    TIME_TO_EQUILIBRIUM, available_outcomes, correlation_matrix,
};
use tracing::warn;

pub const PARAMETER_RANKINGS: &str = "parameter_rankings";
pub const PARAMETER_VARIATIONS: &str = "parameter_variations";
pub const SENSITIVITY_HEATMAP: &str = "sensitivity_heatmap";
pub const OUTCOME_DISTRIBUTIONS: &str = "outcome_distributions";
pub const SENSITIVITY_DASHBOARD: &str = "sensitivity_dashboard";

const TIME_LABEL: &str = "Time to Equilibrium";
const MAX_SWEEP_COLUMNS: usize = 3;
const DASHBOARD_SWEEPS: usize = 6;

fn impact_bars(
    rankings: &[ParameterImpact],
    impact: impl Fn(&ParameterImpact) -> Option<f64>,
    color: Rgb,
    value_labels: bool,
) -> Option<Bars> {
    let (categories, values): (Vec<String>, Vec<f64>) = rankings
        .iter()
        .filter_map(|r| impact(r).map(|v| (r.parameter_name.clone(), v)))
        .unzip();
    if categories.is_empty() {
        return None;
    }
    Some(Bars {
        categories,
        values,
        color,
        orientation: Orientation::Horizontal,
        value_labels,
    })
}

fn sweep_panel(cell: Cell, title: &str, name: &str, points: Vec<(f64, f64)>) -> Panel {
    Panel::new(
        cell,
        title,
        PanelKind::Lines {
            series: vec![Series::unlabeled(points, Rgb::BLUE).with_marker(Marker::Circle)],
            y_range: None,
        },
    )
    .with_axes(name, TIME_LABEL)
}

/// Side-by-side horizontal bars of time and composition impact per parameter.
pub fn parameter_rankings(report: &SensitivityReport) -> Option<Figure> {
    let rankings = &report.parameter_rankings;
    if rankings.is_empty() {
        warn!("No parameter rankings found in data");
        return None;
    }

    let mut figure = Figure::new(1, 2, (16.0, 8.0));
    if let Some(bars) = impact_bars(rankings, |r| r.time_to_equilibrium_impact, Rgb::SKYBLUE, true)
    {
        figure.push(
            Panel::new(
                Cell::at(0, 0),
                "Parameter Impact on Time to Equilibrium",
                PanelKind::Bars(bars),
            )
            .with_axes("Impact Score", ""),
        );
    }
    if let Some(bars) = impact_bars(
        rankings,
        |r| r.workforce_composition_impact,
        Rgb::LIGHTCORAL,
        true,
    ) {
        figure.push(
            Panel::new(
                Cell::at(0, 1),
                "Parameter Impact on Workforce Composition",
                PanelKind::Bars(bars),
            )
            .with_axes("Impact Score", ""),
        );
    }

    if figure.is_empty() {
        warn!("Parameter rankings carry no impact scores");
        return None;
    }
    Some(figure)
}

/// One line chart per sweep, up to three per row.
pub fn parameter_variations(report: &SensitivityReport) -> Option<Figure> {
    let sweeps = &report.sweeps;
    if sweeps.is_empty() {
        warn!("No sensitivity results found in data");
        return None;
    }

    let cols = sweeps.len().min(MAX_SWEEP_COLUMNS);
    let rows = sweeps.len().div_ceil(cols);
    let mut figure = Figure::new(rows, cols, (5.0 * cols as f64, 4.0 * rows as f64));
    for (i, sweep) in sweeps.iter().enumerate() {
        figure.push(sweep_panel(
            Cell::at(i / cols, i % cols),
            &format!("Impact of {}", sweep.parameter_name),
            &sweep.parameter_name,
            sweep.points(),
        ));
    }
    Some(figure)
}

pub fn sensitivity_heatmap(frame: &Frame) -> Option<Figure> {
    let Some(matrix) = correlation_matrix(frame) else {
        warn!("Could not identify parameter and outcome columns for heatmap");
        return None;
    };
    let mut figure = Figure::new(1, 1, (12.0, 8.0));
    figure.push(
        Panel::new(
            Cell::at(0, 0),
            "Parameter-Outcome Correlation Heatmap",
            PanelKind::Heatmap(matrix),
        )
        .with_axes("Outcome", "Parameter"),
    );
    Some(figure)
}

/// Histograms of up to four outcome columns with mean and spread markers.
pub fn outcome_distributions(frame: &Frame) -> Option<Figure> {
    let outcomes = available_outcomes(frame, &OUTCOMES);
    if outcomes.is_empty() {
        warn!("No outcome columns found for distribution plots");
        return None;
    }

    let mut figure = Figure::new(2, 2, (15.0, 12.0));
    for (i, (label, values)) in outcomes.into_iter().take(4).enumerate() {
        figure.push(
            Panel::new(
                Cell::at(i / 2, i % 2),
                &format!("Distribution of {}", label),
                PanelKind::Histogram(Histogram {
                    values: values.to_vec(),
                    bins: 20,
                    color: Rgb::SKYBLUE,
                    show_stats: true,
                }),
            )
            .with_axes(label, "Frequency"),
        );
    }
    Some(figure)
}

pub fn sensitivity_dashboard(
    report: Option<&SensitivityReport>,
    frame: Option<&Frame>,
) -> Option<Figure> {
    let mut figure = Figure::new(4, 3, (20.0, 16.0)).with_title("Sensitivity Analysis Dashboard");

    if let Some(report) = report {
        if let Some(bars) = impact_bars(
            &report.parameter_rankings,
            |r| r.time_to_equilibrium_impact,
            Rgb::SKYBLUE,
            false,
        ) {
            figure.push(
                Panel::new(
                    Cell::spanning(0, 0, 1, 2),
                    "Parameter Impact on Time to Equilibrium",
                    PanelKind::Bars(bars),
                )
                .with_axes("Impact Score", ""),
            );
        }

        for (i, sweep) in report.sweeps.iter().take(DASHBOARD_SWEEPS).enumerate() {
            figure.push(sweep_panel(
                Cell::at(1 + i / 3, i % 3),
                &format!("{} Impact", sweep.parameter_name),
                &sweep.parameter_name,
                sweep.points(),
            ));
        }
    }

    if let Some(frame) = frame {
        if let Some(stats) = RunStatistics::from_frame(frame) {
            figure.push(Panel::new(
                Cell::at(0, 2),
                "Summary Statistics",
                PanelKind::Text {
                    lines: stats.summary_lines(),
                    emphasis: TextEmphasis::Monospace,
                },
            ));
        }

        let outcomes =
            available_outcomes(frame, &[TIME_TO_EQUILIBRIUM, FINAL_HUMANS, FINAL_AI_AGENTS]);
        for (i, (label, values)) in outcomes.into_iter().enumerate() {
            figure.push(
                Panel::new(
                    Cell::at(3, i),
                    &format!("{} Distribution", label),
                    PanelKind::Histogram(Histogram {
                        values: values.to_vec(),
                        bins: 15,
                        color: Rgb::LIGHTCORAL,
                        show_stats: false,
                    }),
                )
                .with_axes(label, "Frequency"),
            );
        }
    }

    if figure.is_empty() {
        warn!("Nothing to show on the sensitivity dashboard");
        return None;
    }
    Some(figure)
}

/// Every sensitivity figure that has data, paired with its output file stem.
pub fn all_figures(
    report: Option<&SensitivityReport>,
    frame: Option<&Frame>,
) -> Vec<(&'static str, Figure)> {
    let mut figures = Vec::new();
    if let Some(report) = report {
        figures.push((PARAMETER_RANKINGS, parameter_rankings(report)));
        figures.push((PARAMETER_VARIATIONS, parameter_variations(report)));
    }
    if let Some(frame) = frame {
        figures.push((SENSITIVITY_HEATMAP, sensitivity_heatmap(frame)));
        figures.push((OUTCOME_DISTRIBUTIONS, outcome_distributions(frame)));
    }
    figures.push((SENSITIVITY_DASHBOARD, sensitivity_dashboard(report, frame)));

    figures
        .into_iter()
        .filter_map(|(name, figure)| figure.map(|f| (name, f)))
        .collect()
}
