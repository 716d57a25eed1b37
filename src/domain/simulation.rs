//! Typed view of a simulation report.
//!
//! The simulator writes two JSON shapes: the raw run result (`TimeSeries`,
//! `EquilibriumState`, `TimeToEquilibrium`) and the analytics report (`TimeSeriesData`,
//! `EquilibriumDetails`, `TotalSimulationDuration`). Both deserialize into
//! [`SimulationReport`].
//!
//! Parsing is lenient the same way the column view in `frame` is: counts written as
//! floats are rounded and `null` fields fall back to their defaults.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Capability tier of a human worker or AI agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExperienceLevel {
    UniversityHire,
    MidLevel,
    Senior,
    Executive,
}

impl ExperienceLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ExperienceLevel::UniversityHire => "University_Hire",
            ExperienceLevel::MidLevel => "Mid_Level",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::Executive => "Executive",
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    /// Accepts the numeric map keys the simulator emits as well as the level names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "university_hire" | "universityhire" => Ok(ExperienceLevel::UniversityHire),
            "1" | "mid_level" | "midlevel" => Ok(ExperienceLevel::MidLevel),
            "2" | "senior" => Ok(ExperienceLevel::Senior),
            "3" | "executive" => Ok(ExperienceLevel::Executive),
            other => Err(format!("Unknown experience level: {}", other)),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn round_count(value: f64) -> i64 {
    value.round() as i64
}

/// Integer or float count; `null` reads as 0.
fn lenient_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?
        .map(round_count)
        .unwrap_or_default())
}

fn lenient_optional_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.map(round_count))
}

fn lenient_count_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Option<f64>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, count)| (key, count.map(round_count).unwrap_or_default()))
        .collect())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HumanComposition {
    #[serde(deserialize_with = "lenient_count")]
    pub total: i64,
    #[serde(deserialize_with = "lenient_count_map")]
    pub by_experience: BTreeMap<String, i64>,
    #[serde(deserialize_with = "lenient_count_map")]
    pub by_cost_category: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AgentComposition {
    #[serde(deserialize_with = "lenient_count")]
    pub total: i64,
    #[serde(deserialize_with = "lenient_count_map")]
    pub by_experience: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WorkforceComposition {
    #[serde(deserialize_with = "null_as_default")]
    pub humans: HumanComposition,
    #[serde(rename = "AIAgents", deserialize_with = "null_as_default")]
    pub ai_agents: AgentComposition,
    /// Percentage of orchestration capacity in use (0-100)
    #[serde(deserialize_with = "null_as_default")]
    pub orchestration_utilization: f64,
}

impl WorkforceComposition {
    pub fn total(&self) -> i64 {
        self.humans.total + self.ai_agents.total
    }

    /// Human headcount per experience level, known levels first in seniority order.
    pub fn human_experience_distribution(&self) -> Vec<(String, i64)> {
        let mut known: Vec<(ExperienceLevel, i64)> = Vec::new();
        let mut unknown: Vec<(String, i64)> = Vec::new();
        for (key, count) in &self.humans.by_experience {
            match key.parse::<ExperienceLevel>() {
                Ok(level) => known.push((level, *count)),
                Err(_) => unknown.push((key.clone(), *count)),
            }
        }
        known.sort_by_key(|(level, _)| *level);

        known
            .into_iter()
            .map(|(level, count)| (level.label().to_string(), count))
            .chain(unknown)
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SimulationState {
    #[serde(deserialize_with = "lenient_count")]
    pub time_step: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub workforce: WorkforceComposition,
    #[serde(deserialize_with = "null_as_default")]
    pub total_cost: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub available_budget: f64,
    /// `None` when the simulator did not record it
    pub total_productivity: Option<f64>,
    pub revenue_output: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_equilibrium: bool,
    #[serde(deserialize_with = "lenient_count")]
    pub catastrophic_failures: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SimulationReport {
    #[serde(default, alias = "TimeSeriesData", deserialize_with = "null_as_default")]
    pub time_series: Vec<SimulationState>,
    #[serde(default, alias = "EquilibriumDetails")]
    pub equilibrium_state: Option<SimulationState>,
    #[serde(
        default,
        alias = "TotalSimulationDuration",
        deserialize_with = "lenient_optional_count"
    )]
    pub time_to_equilibrium: Option<i64>,
    #[serde(default, deserialize_with = "lenient_optional_count")]
    pub total_catastrophic_failures: Option<i64>,
}

/// Headline numbers for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub initial_workforce_size: i64,
    pub final_workforce_size: i64,
    pub initial_human_count: i64,
    pub final_human_count: i64,
    pub initial_ai_agent_count: i64,
    pub final_ai_agent_count: i64,
    pub total_revenue_generated: f64,
    pub average_productivity: f64,
    /// Final productivity per unit of final cost
    pub cost_efficiency_ratio: f64,
}

impl SimulationReport {
    /// The equilibrium state, or the last recorded step when the report has none.
    pub fn final_state(&self) -> Option<&SimulationState> {
        self.equilibrium_state.as_ref().or(self.time_series.last())
    }

    /// AI agents per human at equilibrium, 0 when no humans remain.
    pub fn final_ai_human_ratio(&self) -> Option<f64> {
        let workforce = &self.equilibrium_state.as_ref()?.workforce;
        if workforce.humans.total > 0 {
            Some(workforce.ai_agents.total as f64 / workforce.humans.total as f64)
        } else {
            Some(0.0)
        }
    }

    pub fn summary(&self) -> ReportSummary {
        let (Some(initial), Some(last)) = (self.time_series.first(), self.final_state()) else {
            return ReportSummary::default();
        };

        let steps = self.time_series.len() as f64;
        let total_revenue: f64 = self
            .time_series
            .iter()
            .map(|s| s.revenue_output.unwrap_or_default())
            .sum();
        let average_productivity = self
            .time_series
            .iter()
            .map(|s| s.total_productivity.unwrap_or_default())
            .sum::<f64>()
            / steps;
        let cost_efficiency_ratio = if last.total_cost > 0.0 {
            last.total_productivity.unwrap_or_default() / last.total_cost
        } else {
            0.0
        };

        ReportSummary {
            initial_workforce_size: initial.workforce.total(),
            final_workforce_size: last.workforce.total(),
            initial_human_count: initial.workforce.humans.total,
            final_human_count: last.workforce.humans.total,
            initial_ai_agent_count: initial.workforce.ai_agents.total,
            final_ai_agent_count: last.workforce.ai_agents.total,
            total_revenue_generated: total_revenue,
            average_productivity,
            cost_efficiency_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_report() -> SimulationReport {
        serde_json::from_value(json!({
            "TimeSeries": [
                {"TimeStep": 0, "Workforce": {"Humans": {"Total": 10}, "AIAgents": {"Total": 0}},
                 "TotalCost": 100.0, "TotalProductivity": 20.0, "RevenueOutput": 1000.0},
                {"TimeStep": 1, "Workforce": {"Humans": {"Total": 8}, "AIAgents": {"Total": 4}},
                 "TotalCost": 80.0, "TotalProductivity": 40.0, "RevenueOutput": 3000.0}
            ],
            "EquilibriumState": {
                "TimeStep": 1,
                "Workforce": {
                    "Humans": {"Total": 8, "ByExperience": {"2": 3, "0": 5}},
                    "AIAgents": {"Total": 4}
                },
                "TotalCost": 80.0, "TotalProductivity": 40.0, "RevenueOutput": 3000.0
            },
            "TimeToEquilibrium": 1,
            "TotalCatastrophicFailures": 2
        }))
        .unwrap()
    }

    #[test]
    fn test_experience_level_parsing() {
        assert_eq!("0".parse::<ExperienceLevel>(), Ok(ExperienceLevel::UniversityHire));
        assert_eq!("Mid_Level".parse::<ExperienceLevel>(), Ok(ExperienceLevel::MidLevel));
        assert_eq!("executive".parse::<ExperienceLevel>(), Ok(ExperienceLevel::Executive));
        assert!("Intern".parse::<ExperienceLevel>().is_err());
    }

    #[test]
    fn test_summary_matches_time_series() {
        let report = sample_report();
        let summary = report.summary();

        assert_eq!(summary.initial_workforce_size, 10);
        assert_eq!(summary.final_workforce_size, 12);
        assert_eq!(summary.final_human_count, 8);
        assert_eq!(summary.final_ai_agent_count, 4);
        assert!((summary.total_revenue_generated - 4000.0).abs() < 1e-9);
        assert!((summary.average_productivity - 30.0).abs() < 1e-9);
        assert!((summary.cost_efficiency_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_report_summary_is_default() {
        assert_eq!(SimulationReport::default().summary(), ReportSummary::default());
    }

    #[test]
    fn test_analytics_report_aliases() {
        let report: SimulationReport = serde_json::from_value(json!({
            "TimeSeriesData": [{"TimeStep": 0}],
            "EquilibriumDetails": {"TimeStep": 0, "RevenueOutput": 5.0},
            "TotalSimulationDuration": 42
        }))
        .unwrap();

        assert_eq!(report.time_series.len(), 1);
        assert_eq!(report.time_to_equilibrium, Some(42));
        assert_eq!(report.equilibrium_state.unwrap().revenue_output, Some(5.0));
        assert_eq!(report.total_catastrophic_failures, None);
    }

    #[test]
    fn test_float_counts_are_rounded() {
        let report: SimulationReport = serde_json::from_value(json!({
            "TimeSeries": [{
                "TimeStep": 0.0,
                "Workforce": {
                    "Humans": {"Total": 10.0, "ByExperience": {"1": 4.0, "3": null}},
                    "AIAgents": {"Total": 2.0}
                },
                "CatastrophicFailures": 1.0
            }],
            "TimeToEquilibrium": 12.0
        }))
        .unwrap();

        let state = &report.time_series[0];
        assert_eq!(state.workforce.humans.total, 10);
        assert_eq!(state.workforce.ai_agents.total, 2);
        assert_eq!(state.workforce.humans.by_experience["1"], 4);
        assert_eq!(state.workforce.humans.by_experience["3"], 0);
        assert_eq!(state.catastrophic_failures, 1);
        assert_eq!(report.time_to_equilibrium, Some(12));
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let report: SimulationReport = serde_json::from_value(json!({
            "TimeSeries": [{
                "TimeStep": 0,
                "RevenueOutput": null,
                "IsEquilibrium": null,
                "Workforce": {"Humans": null, "AIAgents": {"Total": null}}
            }],
            "EquilibriumState": null,
            "TimeToEquilibrium": null
        }))
        .unwrap();

        let state = &report.time_series[0];
        assert_eq!(state.revenue_output, None);
        assert!(!state.is_equilibrium);
        assert_eq!(state.workforce.total(), 0);
        assert!(report.equilibrium_state.is_none());
        assert_eq!(report.time_to_equilibrium, None);
    }

    #[test]
    fn test_experience_distribution_in_level_order() {
        let report = sample_report();
        let dist = report
            .equilibrium_state
            .as_ref()
            .unwrap()
            .workforce
            .human_experience_distribution();
        assert_eq!(
            dist,
            vec![("University_Hire".to_string(), 5), ("Senior".to_string(), 3)]
        );
    }

    #[test]
    fn test_final_ratio() {
        let report = sample_report();
        assert!((report.final_ai_human_ratio().unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(SimulationReport::default().final_ai_human_ratio(), None);
    }
}
