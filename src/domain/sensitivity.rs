//! Sensitivity analysis report model and the derived rankings and statistics.

use crate::domain::figure::LabeledMatrix;
use crate::domain::frame::Frame;
use crate::domain::simulation::SimulationState;
use crate::domain::stats::Stats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Impact of one parameter on the two headline outcomes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterImpact {
    pub parameter_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_equilibrium_impact: Option<f64>,
    #[serde(
        default,
        alias = "CompositionImpact",
        skip_serializing_if = "Option::is_none"
    )]
    pub workforce_composition_impact: Option<f64>,
}

impl ParameterImpact {
    pub fn combined(&self) -> f64 {
        self.time_to_equilibrium_impact.unwrap_or(0.0)
            + self.workforce_composition_impact.unwrap_or(0.0)
    }
}

/// One simulation run inside a sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SweepRun {
    pub time_to_equilibrium: f64,
    pub equilibrium_state: SimulationState,
    pub total_catastrophic_failures: i64,
}

/// A single parameter varied over a list of values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ParameterSweep {
    pub parameter_name: String,
    pub parameter_values: Vec<f64>,
    /// Keyed by the parameter value rendered as text
    pub time_to_equilibrium_by_value: BTreeMap<String, f64>,
    pub results: Vec<SweepRun>,
}

impl ParameterSweep {
    /// Time to equilibrium for each entry of `parameter_values`.
    ///
    /// Keys are matched numerically so "100", "100.0" and "1e2" all resolve. A value
    /// without an entry reads as 0. When the keyed map is empty the run results are
    /// used instead.
    pub fn time_values(&self) -> Vec<f64> {
        if self.time_to_equilibrium_by_value.is_empty() && !self.results.is_empty() {
            return (0..self.parameter_values.len())
                .map(|i| self.results.get(i).map_or(0.0, |r| r.time_to_equilibrium))
                .collect();
        }

        let keyed: Vec<(f64, f64)> = self
            .time_to_equilibrium_by_value
            .iter()
            .filter_map(|(k, v)| k.trim().parse::<f64>().ok().map(|k| (k, *v)))
            .collect();

        self.parameter_values
            .iter()
            .map(|value| {
                keyed
                    .iter()
                    .find(|(k, _)| approx_eq(*k, *value))
                    .map_or(0.0, |(_, t)| *t)
            })
            .collect()
    }

    pub fn points(&self) -> Vec<(f64, f64)> {
        self.parameter_values
            .iter()
            .copied()
            .zip(self.time_values())
            .collect()
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SensitivitySummary {
    pub most_impactful_parameter: String,
    pub least_impactful_parameter: String,
    pub average_time_to_equilibrium: f64,
    pub time_to_equilibrium_variance: f64,
    pub optimal_parameter_values: BTreeMap<String, f64>,
}

impl SensitivitySummary {
    /// Console lines for the simulator's own summary block.
    pub fn summary_lines(&self) -> Vec<String> {
        let or_na = |name: &str| {
            if name.is_empty() {
                "N/A".to_string()
            } else {
                name.to_string()
            }
        };
        let mut lines = vec![
            format!("Most Impactful:     {}", or_na(&self.most_impactful_parameter)),
            format!("Least Impactful:    {}", or_na(&self.least_impactful_parameter)),
            format!("Avg Time to Eq.:    {:.1}", self.average_time_to_equilibrium),
            format!("Time Variance:      {:.2}", self.time_to_equilibrium_variance),
        ];
        if !self.optimal_parameter_values.is_empty() {
            lines.push("Optimal Values:".to_string());
            lines.extend(
                self.optimal_parameter_values
                    .iter()
                    .map(|(name, value)| format!("  {:<18} {}", name, value)),
            );
        }
        lines
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SweepCollection {
    List(Vec<ParameterSweep>),
    Keyed(BTreeMap<String, ParameterSweep>),
}

impl SweepCollection {
    fn into_sweeps(self) -> Vec<ParameterSweep> {
        match self {
            SweepCollection::List(sweeps) => sweeps,
            SweepCollection::Keyed(map) => map
                .into_iter()
                .map(|(name, mut sweep)| {
                    if sweep.parameter_name.is_empty() {
                        sweep.parameter_name = name;
                    }
                    sweep
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawSensitivityReport {
    #[serde(default)]
    parameter_rankings: Vec<ParameterImpact>,
    #[serde(default)]
    sensitivity_results: Option<SweepCollection>,
    #[serde(default)]
    detailed_results: Option<SweepCollection>,
    #[serde(default)]
    summary: Option<SensitivitySummary>,
}

/// Sensitivity report as written by the simulator.
///
/// Sweeps may arrive as a `SensitivityResults` list or a `DetailedResults` map keyed
/// by parameter name; both end up in `sweeps`. Reports that carry raw runs but no
/// rankings get their rankings computed on load.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "RawSensitivityReport")]
pub struct SensitivityReport {
    pub parameter_rankings: Vec<ParameterImpact>,
    pub sweeps: Vec<ParameterSweep>,
    pub summary: Option<SensitivitySummary>,
}

impl From<RawSensitivityReport> for SensitivityReport {
    fn from(raw: RawSensitivityReport) -> Self {
        let listed = raw
            .sensitivity_results
            .map(SweepCollection::into_sweeps)
            .unwrap_or_default();
        let sweeps = if listed.is_empty() {
            raw.detailed_results
                .map(SweepCollection::into_sweeps)
                .unwrap_or_default()
        } else {
            listed
        };

        let parameter_rankings = if raw.parameter_rankings.is_empty() {
            rank_parameter_impacts(&sweeps)
        } else {
            raw.parameter_rankings
        };

        Self {
            parameter_rankings,
            sweeps,
            summary: raw.summary,
        }
    }
}

/// Ranks parameters by the variance they induce, highest combined impact first.
///
/// Time impact is the sample variance of time to equilibrium across a sweep.
/// Composition impact averages the variances of final human count, final AI count
/// and orchestration utilisation (the latter scaled down by 100).
pub fn rank_parameter_impacts(sweeps: &[ParameterSweep]) -> Vec<ParameterImpact> {
    let mut impacts: Vec<ParameterImpact> = sweeps
        .iter()
        .filter(|sweep| !sweep.results.is_empty())
        .map(|sweep| {
            let times: Vec<f64> = sweep.results.iter().map(|r| r.time_to_equilibrium).collect();
            let humans: Vec<f64> = sweep
                .results
                .iter()
                .map(|r| r.equilibrium_state.workforce.humans.total as f64)
                .collect();
            let agents: Vec<f64> = sweep
                .results
                .iter()
                .map(|r| r.equilibrium_state.workforce.ai_agents.total as f64)
                .collect();
            let orchestration: Vec<f64> = sweep
                .results
                .iter()
                .map(|r| r.equilibrium_state.workforce.orchestration_utilization)
                .collect();

            let composition = (Stats::sample_variance(&humans)
                + Stats::sample_variance(&agents)
                + Stats::sample_variance(&orchestration) / 100.0)
                / 3.0;

            ParameterImpact {
                parameter_name: sweep.parameter_name.clone(),
                time_to_equilibrium_impact: Some(Stats::sample_variance(&times)),
                workforce_composition_impact: Some(composition),
            }
        })
        .collect();

    impacts.sort_by(|a, b| {
        b.combined()
            .partial_cmp(&a.combined())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    impacts
}

/// Aggregate view over a ranking list; missing impacts count as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactSummary {
    pub total_parameters: usize,
    pub most_impactful_time: Option<String>,
    pub most_impactful_composition: Option<String>,
    pub average_time_impact: Option<f64>,
    pub average_composition_impact: Option<f64>,
}

impl ImpactSummary {
    pub fn from_rankings(rankings: &[ParameterImpact]) -> Self {
        let time: Vec<f64> = rankings
            .iter()
            .map(|r| r.time_to_equilibrium_impact.unwrap_or(0.0))
            .collect();
        let composition: Vec<f64> = rankings
            .iter()
            .map(|r| r.workforce_composition_impact.unwrap_or(0.0))
            .collect();

        Self {
            total_parameters: rankings.len(),
            most_impactful_time: first_max(&time).map(|i| rankings[i].parameter_name.clone()),
            most_impactful_composition: first_max(&composition)
                .map(|i| rankings[i].parameter_name.clone()),
            average_time_impact: average(&time),
            average_composition_impact: average(&composition),
        }
    }
}

fn first_max(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, v) in values.iter().enumerate() {
        match best {
            Some(b) if values[b] >= *v => {}
            _ => best = Some(i),
        }
    }
    best
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// An outcome column of the detailed sensitivity CSV and the headers it may use.
pub struct Outcome {
    pub label: &'static str,
    pub aliases: &'static [&'static str],
}

pub const TIME_TO_EQUILIBRIUM: Outcome = Outcome {
    label: "TimeToEquilibrium",
    aliases: &["TimeToEquilibrium"],
};
pub const FINAL_HUMANS: Outcome = Outcome {
    label: "FinalHumans",
    aliases: &["FinalHumans", "FinalHumanCount"],
};
pub const FINAL_AI_AGENTS: Outcome = Outcome {
    label: "FinalAIAgents",
    aliases: &["FinalAIAgents", "FinalAIAgentCount"],
};
pub const FINAL_REVENUE: Outcome = Outcome {
    label: "FinalRevenue",
    aliases: &["FinalRevenue"],
};

pub const OUTCOMES: [Outcome; 4] = [
    TIME_TO_EQUILIBRIUM,
    FINAL_HUMANS,
    FINAL_AI_AGENTS,
    FINAL_REVENUE,
];

const WIDE_PARAMETER_COLUMNS: [&str; 3] = ["InitialHumans", "FixedBudget", "NaturalRate"];

impl Outcome {
    pub fn values<'f>(&self, frame: &'f Frame) -> Option<&'f [f64]> {
        frame.first_numeric(self.aliases).map(|(_, values)| values)
    }
}

/// Outcomes from `candidates` that the frame provides, in candidate order.
pub fn available_outcomes<'f>(
    frame: &'f Frame,
    candidates: &[Outcome],
) -> Vec<(&'static str, &'f [f64])> {
    candidates
        .iter()
        .filter_map(|o| o.values(frame).map(|values| (o.label, values)))
        .collect()
}

/// Parameter-by-outcome Pearson correlations.
///
/// Wide exports carry one column per parameter (`Param_*`, `InitialHumans`,
/// `FixedBudget`, `NaturalRate`). Long exports carry `ParameterName` and
/// `ParameterValue`; each parameter is then correlated over its own rows. Labels are
/// sorted on both axes. Returns `None` when either axis would be empty.
pub fn correlation_matrix(frame: &Frame) -> Option<LabeledMatrix> {
    let outcomes = available_outcomes(frame, &OUTCOMES);
    if outcomes.is_empty() {
        return None;
    }

    let mut rows: Vec<(String, Vec<Option<f64>>)> = Vec::new();

    if let (Some(names), true) = (frame.text("ParameterName"), frame.has("ParameterValue")) {
        for name in frame.distinct_text("ParameterName") {
            let mask: Vec<bool> = names.iter().map(|n| *n == name).collect();
            let subset = frame.filter_rows(&mask);
            let Some(param) = subset.numeric("ParameterValue") else {
                continue;
            };
            let cells = OUTCOMES
                .iter()
                .filter(|o| outcomes.iter().any(|(label, _)| *label == o.label))
                .map(|o| o.values(&subset).and_then(|ys| Stats::pearson(param, ys)))
                .collect();
            rows.push((name, cells));
        }
    } else {
        for column in frame.column_names() {
            let is_param = column.starts_with("Param_")
                || WIDE_PARAMETER_COLUMNS.contains(&column.as_str());
            if !is_param {
                continue;
            }
            if let Some(param) = frame.numeric(column) {
                let cells = outcomes
                    .iter()
                    .map(|(_, ys)| Stats::pearson(param, ys))
                    .collect();
                rows.push((column.clone(), cells));
            }
        }
    }

    if rows.is_empty() {
        return None;
    }

    let mut col_order: Vec<usize> = (0..outcomes.len()).collect();
    col_order.sort_by_key(|&i| outcomes[i].0);
    rows.sort_by(|a, b| a.0.cmp(&b.0));

    Some(LabeledMatrix {
        row_labels: rows.iter().map(|(name, _)| name.clone()).collect(),
        col_labels: col_order.iter().map(|&i| outcomes[i].0.to_string()).collect(),
        values: rows
            .iter()
            .map(|(_, cells)| col_order.iter().map(|&i| cells[i]).collect())
            .collect(),
    })
}

/// Distribution of time to equilibrium over all runs of a detailed export.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    pub runs: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub std_dev: Option<f64>,
}

impl RunStatistics {
    pub fn from_frame(frame: &Frame) -> Option<Self> {
        let values = TIME_TO_EQUILIBRIUM.values(frame)?;
        Some(Self {
            runs: frame.len(),
            mean: Stats::mean(values),
            min: Stats::min(values),
            max: Stats::max(values),
            std_dev: Stats::std_dev(values),
        })
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let fmt = |v: Option<f64>, precision: usize| match v {
            Some(v) => format!("{:.*}", precision, v),
            None => "n/a".to_string(),
        };
        vec![
            "Sensitivity Analysis Summary".to_string(),
            String::new(),
            format!("Total Runs: {}", self.runs),
            format!("Avg Time to Equilibrium: {}", fmt(self.mean, 1)),
            format!("Min Time: {}", fmt(self.min, 0)),
            format!("Max Time: {}", fmt(self.max, 0)),
            format!("Std Dev: {}", fmt(self.std_dev, 1)),
        ]
    }
}
