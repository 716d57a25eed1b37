use serde_json::json;
use std::fs;
use std::path::PathBuf;
use workforce_viz::application::interactive::{default_output_path, simulation_dashboard};
use workforce_viz::application::simulation_plots::{
    COST_ANALYSIS, EQUILIBRIUM_ANALYSIS, REVENUE_PRODUCTIVITY, SIMULATION_DASHBOARD,
    WORKFORCE_COMPOSITION, all_figures,
};
use workforce_viz::domain::errors::VizError;
use workforce_viz::domain::figure::PanelKind;
use workforce_viz::infrastructure::load_simulation_data;

struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("viz_sim_it_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.dir).ok();
    }
}

fn step(t: i64, humans: i64, agents: i64, cost: f64, budget: f64, revenue: f64) -> serde_json::Value {
    json!({
        "TimeStep": t,
        "Workforce": {
            "Humans": {"Total": humans, "ByExperience": {"0": humans / 2, "2": humans - humans / 2}},
            "AIAgents": {"Total": agents},
            "OrchestrationUtilization": 40.0
        },
        "TotalCost": cost,
        "AvailableBudget": budget,
        "TotalProductivity": humans as f64 + 2.0 * agents as f64,
        "RevenueOutput": revenue,
        "IsEquilibrium": false,
        "CatastrophicFailures": 0
    })
}

fn report_json() -> String {
    let series = vec![
        step(0, 100, 0, 5000.0, 15000.0, 120000.0),
        step(1, 95, 6, 5200.0, 14800.0, 131000.0),
        step(2, 90, 12, 5300.0, 14700.0, 140500.0),
    ];
    json!({
        "TimeSeries": series,
        "EquilibriumState": series[2],
        "TimeToEquilibrium": 2,
        "TotalCatastrophicFailures": 1
    })
    .to_string()
}

#[test]
fn test_json_report_produces_full_chart_set() {
    let scratch = Scratch::new();
    let input = scratch.write("run.json", &report_json());

    let data = load_simulation_data(&input).unwrap();
    assert_eq!(data.frame.len(), 3);
    let report = data.report.as_ref().unwrap();
    assert_eq!(report.summary().final_ai_agent_count, 12);

    let figures = all_figures(Some(report), &data.frame);
    let names: Vec<&str> = figures.iter().map(|(name, _)| *name).collect();
    assert_eq!(
        names,
        vec![
            WORKFORCE_COMPOSITION,
            REVENUE_PRODUCTIVITY,
            COST_ANALYSIS,
            EQUILIBRIUM_ANALYSIS,
            SIMULATION_DASHBOARD
        ]
    );

    let (_, dashboard) = figures.last().unwrap();
    let tile = dashboard.panel("Time to Equilibrium").unwrap();
    assert_eq!(
        tile.kind,
        PanelKind::Text {
            lines: vec!["2".to_string(), "Time Steps".to_string()],
            emphasis: workforce_viz::domain::figure::TextEmphasis::Headline,
        }
    );
}

#[test]
fn test_csv_export_skips_report_only_figures() {
    let scratch = Scratch::new();
    let input = scratch.write(
        "export.csv",
        "TimeStep,HumanCount,AIAgentCount,TotalCost,AvailableBudget,TotalProductivity,RevenueOutput\n\
         0,100,0,5000,15000,100,120000\n\
         1,95,6,5200,14800,107,131000\n",
    );

    let data = load_simulation_data(&input).unwrap();
    assert!(data.report.is_none());

    let names: Vec<&str> = all_figures(None, &data.frame)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert!(!names.contains(&EQUILIBRIUM_ANALYSIS));
    assert!(names.contains(&SIMULATION_DASHBOARD));
}

#[test]
fn test_interactive_dashboard_html() {
    let scratch = Scratch::new();
    let input = scratch.write("run.json", &report_json());
    let data = load_simulation_data(&input).unwrap();

    let output = default_output_path(&input, false);
    assert_eq!(output, scratch.dir.join("run_dashboard.html"));

    let figure = simulation_dashboard(data.report.as_ref(), &data.frame);
    figure
        .write_html(&output, "https://cdn.example.test/plotly.min.js")
        .unwrap();

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("https://cdn.example.test/plotly.min.js"));
    assert!(html.contains("Workforce AI Transition Simulation Dashboard"));
    assert!(html.contains("Plotly.newPlot"));
    assert!(html.contains("Generated: "));
}

#[test]
fn test_loader_errors() {
    let scratch = Scratch::new();
    let missing_series = scratch.write("bad.json", r#"{"EquilibriumState": {}}"#);
    assert!(matches!(
        load_simulation_data(&missing_series),
        Err(VizError::MissingTimeSeries { .. })
    ));

    let excel = scratch.write("run.xlsx", "");
    assert!(matches!(
        load_simulation_data(&excel),
        Err(VizError::UnsupportedFormat { .. })
    ));
}
