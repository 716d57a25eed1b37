//! Static figures for a single simulation run.
//!
//! Every builder returns `None` (after logging a warning) when the input lacks the
//! columns it needs, so callers can render whatever subset is available.

use crate::domain::figure::{
    AreaLayer, Bars, Cell, Figure, Marker, Orientation, Panel, PanelKind, Rgb, SERIES_PALETTE,
    Series, Slice, TextEmphasis, format_thousands,
};
use crate::domain::frame::Frame;
use crate::domain::simulation::SimulationReport;
use crate::domain::stats::Stats;
use tracing::warn;

pub const WORKFORCE_COMPOSITION: &str = "workforce_composition";
pub const REVENUE_PRODUCTIVITY: &str = "revenue_productivity";
pub const COST_ANALYSIS: &str = "cost_analysis";
pub const EQUILIBRIUM_ANALYSIS: &str = "equilibrium_analysis";
pub const SIMULATION_DASHBOARD: &str = "simulation_dashboard";

/// Human headcount column as written by the JSON report, the legacy CSV and the
/// analytics CSV export.
pub const HUMAN_COLUMNS: [&str; 3] = ["Workforce.Humans.Total", "TotalHumans", "HumanCount"];
pub const AI_COLUMNS: [&str; 3] = ["Workforce.AIAgents.Total", "TotalAIAgents", "AIAgentCount"];

pub const TOTAL_COST: &str = "TotalCost";
pub const AVAILABLE_BUDGET: &str = "AvailableBudget";
pub const REVENUE_OUTPUT: &str = "RevenueOutput";
pub const TOTAL_PRODUCTIVITY: &str = "TotalProductivity";

const TIME_STEP_LABEL: &str = "Time Step";
const WORKERS_LABEL: &str = "Number of Workers";

fn points(x: &[f64], y: &[f64]) -> Vec<(f64, f64)> {
    x.iter().copied().zip(y.iter().copied()).collect()
}

fn workforce_columns(frame: &Frame) -> Option<(&[f64], &[f64])> {
    let (_, humans) = frame.first_numeric(&HUMAN_COLUMNS)?;
    let (_, agents) = frame.first_numeric(&AI_COLUMNS)?;
    Some((humans, agents))
}

/// Budget utilisation (%) per time step.
pub fn budget_utilization(frame: &Frame) -> Option<Vec<f64>> {
    let cost = frame.numeric(TOTAL_COST)?;
    let budget = frame.numeric(AVAILABLE_BUDGET)?;
    Some(
        cost.iter()
            .zip(budget)
            .map(|(c, b)| Stats::budget_utilization(*c, *b))
            .collect(),
    )
}

pub fn workforce_composition(frame: &Frame) -> Option<Figure> {
    let Some((humans, agents)) = workforce_columns(frame) else {
        warn!("Could not find workforce composition columns");
        return None;
    };
    let time = frame.time_axis();

    let mut figure = Figure::new(2, 1, (12.0, 10.0));
    figure.push(
        Panel::new(
            Cell::at(0, 0),
            "Workforce Composition Over Time",
            PanelKind::Lines {
                series: vec![
                    Series::new("Human Workers", points(&time, humans), Rgb::BLUE)
                        .with_marker(Marker::Circle),
                    Series::new("AI Agents", points(&time, agents), Rgb::ORANGE)
                        .with_marker(Marker::Square),
                ],
                y_range: None,
            },
        )
        .with_axes(TIME_STEP_LABEL, WORKERS_LABEL),
    );
    figure.push(
        Panel::new(
            Cell::at(1, 0),
            "Workforce Composition (Stacked)",
            PanelKind::StackedArea {
                x: time.clone(),
                layers: vec![
                    AreaLayer {
                        label: "Human Workers".to_string(),
                        values: humans.to_vec(),
                        color: Rgb::BLUE,
                    },
                    AreaLayer {
                        label: "AI Agents".to_string(),
                        values: agents.to_vec(),
                        color: Rgb::ORANGE,
                    },
                ],
            },
        )
        .with_axes(TIME_STEP_LABEL, WORKERS_LABEL),
    );
    Some(figure)
}

pub fn revenue_and_productivity(frame: &Frame) -> Option<Figure> {
    let time = frame.time_axis();
    let mut figure = Figure::new(2, 1, (12.0, 10.0));

    if let Some(revenue) = frame.numeric(REVENUE_OUTPUT) {
        figure.push(
            Panel::new(
                Cell::at(0, 0),
                "Revenue Output Over Time",
                PanelKind::Lines {
                    series: vec![
                        Series::unlabeled(points(&time, revenue), Rgb::GREEN)
                            .with_marker(Marker::Circle),
                    ],
                    y_range: None,
                },
            )
            .with_axes(TIME_STEP_LABEL, "Revenue Output"),
        );
    }
    if let Some(productivity) = frame.numeric(TOTAL_PRODUCTIVITY) {
        figure.push(
            Panel::new(
                Cell::at(1, 0),
                "Total Productivity Over Time",
                PanelKind::Lines {
                    series: vec![
                        Series::unlabeled(points(&time, productivity), Rgb::BLUE)
                            .with_marker(Marker::Square),
                    ],
                    y_range: None,
                },
            )
            .with_axes(TIME_STEP_LABEL, "Total Productivity"),
        );
    }

    if figure.is_empty() {
        warn!("No revenue or productivity columns found");
        return None;
    }
    Some(figure)
}

pub fn cost_analysis(frame: &Frame) -> Option<Figure> {
    let (Some(cost), Some(budget), Some(utilization)) = (
        frame.numeric(TOTAL_COST),
        frame.numeric(AVAILABLE_BUDGET),
        budget_utilization(frame),
    ) else {
        warn!("Cost analysis needs both TotalCost and AvailableBudget columns");
        return None;
    };
    let time = frame.time_axis();

    let mut figure = Figure::new(2, 1, (12.0, 10.0));
    figure.push(
        Panel::new(
            Cell::at(0, 0),
            "Cost and Budget Over Time",
            PanelKind::Lines {
                series: vec![
                    Series::new("Total Cost", points(&time, cost), Rgb::RED)
                        .with_marker(Marker::Circle),
                    Series::new("Available Budget", points(&time, budget), Rgb::ORANGE)
                        .with_marker(Marker::Square),
                ],
                y_range: None,
            },
        )
        .with_axes(TIME_STEP_LABEL, "Cost ($)"),
    );
    figure.push(
        Panel::new(
            Cell::at(1, 0),
            "Budget Utilization Over Time",
            PanelKind::Lines {
                series: vec![
                    Series::unlabeled(points(&time, &utilization), Rgb::PURPLE)
                        .with_marker(Marker::Triangle),
                ],
                y_range: Some((0.0, 100.0)),
            },
        )
        .with_axes(TIME_STEP_LABEL, "Budget Utilization (%)"),
    );
    Some(figure)
}

fn single_bar(label: &str, value: f64, color: Rgb) -> PanelKind {
    PanelKind::Bars(Bars {
        categories: vec![label.to_string()],
        values: vec![value],
        color,
        orientation: Orientation::Vertical,
        value_labels: false,
    })
}

pub fn equilibrium_analysis(report: Option<&SimulationReport>) -> Option<Figure> {
    let Some(report) = report else {
        warn!("Cannot create equilibrium analysis without JSON data");
        return None;
    };
    let mut figure = Figure::new(2, 2, (15.0, 12.0));

    if let Some(steps) = report.time_to_equilibrium {
        figure.push(
            Panel::new(
                Cell::at(0, 0),
                "Time to Reach Equilibrium",
                single_bar("Time to Equilibrium", steps as f64, Rgb::SKYBLUE),
            )
            .with_axes("", "Time Steps"),
        );
    }

    if let Some(state) = &report.equilibrium_state {
        let workforce = &state.workforce;
        figure.push(Panel::new(
            Cell::at(0, 1),
            "Final Workforce Composition",
            PanelKind::Pie(vec![
                Slice {
                    label: "Human Workers".to_string(),
                    value: workforce.humans.total as f64,
                    color: Rgb::LIGHTCORAL,
                },
                Slice {
                    label: "AI Agents".to_string(),
                    value: workforce.ai_agents.total as f64,
                    color: Rgb::LIGHTSKYBLUE,
                },
            ]),
        ));

        let distribution = workforce.human_experience_distribution();
        if !distribution.is_empty() {
            let (levels, counts): (Vec<String>, Vec<f64>) = distribution
                .into_iter()
                .map(|(level, count)| (level, count as f64))
                .unzip();
            figure.push(
                Panel::new(
                    Cell::at(1, 0),
                    "Final Human Experience Distribution",
                    PanelKind::Bars(Bars {
                        categories: levels,
                        values: counts,
                        color: Rgb::LIGHTGREEN,
                        orientation: Orientation::Vertical,
                        value_labels: false,
                    }),
                )
                .with_axes("Experience Level", WORKERS_LABEL),
            );
        }
    }

    if let Some(failures) = report.total_catastrophic_failures {
        figure.push(
            Panel::new(
                Cell::at(1, 1),
                "Total Catastrophic Failures",
                single_bar("Total Failures", failures as f64, Rgb::SALMON),
            )
            .with_axes("", "Number of Failures"),
        );
    }

    if figure.is_empty() {
        warn!("Report has no equilibrium metrics to plot");
        return None;
    }
    Some(figure)
}

fn headline(cell: Cell, title: &str, value: String, caption: &str) -> Panel {
    Panel::new(
        cell,
        title,
        PanelKind::Text {
            lines: vec![value, caption.to_string()],
            emphasis: TextEmphasis::Headline,
        },
    )
}

/// One-page overview: trends on the top two rows, headline metrics below.
pub fn summary_dashboard(report: Option<&SimulationReport>, frame: &Frame) -> Option<Figure> {
    let time = frame.time_axis();
    let mut figure =
        Figure::new(3, 4, (20.0, 12.0)).with_title("Workforce AI Transition Simulation Dashboard");

    if let Some((humans, agents)) = workforce_columns(frame) {
        figure.push(Panel::new(
            Cell::spanning(0, 0, 1, 2),
            "Workforce Evolution",
            PanelKind::Lines {
                series: vec![
                    Series::new("Humans", points(&time, humans), SERIES_PALETTE[2]),
                    Series::new("AI Agents", points(&time, agents), SERIES_PALETTE[0]),
                ],
                y_range: None,
            },
        ));
    }

    if let Some(revenue) = frame.numeric(REVENUE_OUTPUT) {
        figure.push(Panel::new(
            Cell::spanning(0, 2, 1, 2),
            "Revenue Output",
            PanelKind::Lines {
                series: vec![Series::unlabeled(points(&time, revenue), Rgb::GREEN)],
                y_range: None,
            },
        ));
    }

    if let Some(cost) = frame.numeric(TOTAL_COST) {
        let mut series = vec![Series::new("Total Cost", points(&time, cost), SERIES_PALETTE[2])];
        if let Some(budget) = frame.numeric(AVAILABLE_BUDGET) {
            series.push(Series::new(
                "Available Budget",
                points(&time, budget),
                SERIES_PALETTE[3],
            ));
        }
        figure.push(Panel::new(
            Cell::spanning(1, 0, 1, 2),
            "Cost Analysis",
            PanelKind::Lines {
                series,
                y_range: None,
            },
        ));
    }

    if let Some(productivity) = frame.numeric(TOTAL_PRODUCTIVITY) {
        figure.push(Panel::new(
            Cell::spanning(1, 2, 1, 2),
            "Total Productivity",
            PanelKind::Lines {
                series: vec![Series::unlabeled(points(&time, productivity), Rgb::BLUE)],
                y_range: None,
            },
        ));
    }

    if let Some(report) = report {
        if let Some(steps) = report.time_to_equilibrium {
            figure.push(headline(
                Cell::at(2, 0),
                "Time to Equilibrium",
                steps.to_string(),
                "Time Steps",
            ));
        }
        if let Some(ratio) = report.final_ai_human_ratio() {
            figure.push(headline(
                Cell::at(2, 1),
                "Final AI:Human Ratio",
                format!("{:.2}", ratio),
                "AI:Human Ratio",
            ));
        }
        if let Some(failures) = report.total_catastrophic_failures {
            figure.push(headline(
                Cell::at(2, 2),
                "Catastrophic Failures",
                failures.to_string(),
                "Failures",
            ));
        }
        if let Some(revenue) = report.equilibrium_state.as_ref().and_then(|s| s.revenue_output) {
            figure.push(headline(
                Cell::at(2, 3),
                "Final Revenue Output",
                format!("${}", format_thousands(revenue)),
                "Final Revenue",
            ));
        }
    }

    if figure.is_empty() {
        warn!("Nothing to show on the simulation dashboard");
        return None;
    }
    Some(figure)
}

/// Every simulation figure that has data, paired with its output file stem.
pub fn all_figures(report: Option<&SimulationReport>, frame: &Frame) -> Vec<(&'static str, Figure)> {
    [
        (WORKFORCE_COMPOSITION, workforce_composition(frame)),
        (REVENUE_PRODUCTIVITY, revenue_and_productivity(frame)),
        (COST_ANALYSIS, cost_analysis(frame)),
        (EQUILIBRIUM_ANALYSIS, equilibrium_analysis(report)),
        (SIMULATION_DASHBOARD, summary_dashboard(report, frame)),
    ]
    .into_iter()
    .filter_map(|(name, figure)| figure.map(|f| (name, f)))
    .collect()
}
