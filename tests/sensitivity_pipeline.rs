use serde_json::json;
use std::fs;
use std::path::PathBuf;
use workforce_viz::application::interactive::sensitivity_dashboard;
use workforce_viz::application::sensitivity_plots::{
    OUTCOME_DISTRIBUTIONS, PARAMETER_RANKINGS, PARAMETER_VARIATIONS, SENSITIVITY_DASHBOARD,
    SENSITIVITY_HEATMAP, all_figures,
};
use workforce_viz::domain::figure::PanelKind;
use workforce_viz::infrastructure::loader::load_csv_frame;
use workforce_viz::infrastructure::load_sensitivity_data;

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("viz_sens_it_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn run(time: f64, humans: i64, agents: i64) -> serde_json::Value {
    json!({
        "TimeToEquilibrium": time,
        "EquilibriumState": {
            "Workforce": {"Humans": {"Total": humans}, "AIAgents": {"Total": agents}}
        }
    })
}

/// A report with raw runs only; rankings are derived while loading.
fn detailed_report() -> String {
    json!({
        "DetailedResults": {
            "FixedBudget": {
                "ParameterValues": [1000, 2000, 3000],
                "TimeToEquilibriumByValue": {"1000": 40, "2000": 30, "3000": 20},
                "Results": [run(40.0, 80, 10), run(30.0, 70, 20), run(20.0, 60, 30)]
            },
            "NaturalRate": {
                "ParameterValues": [0.01, 0.02],
                "TimeToEquilibriumByValue": {"0.01": 25, "0.02": 25},
                "Results": [run(25.0, 70, 20), run(25.0, 70, 20)]
            }
        }
    })
    .to_string()
}

#[test]
fn test_report_and_detailed_csv() {
    let dir = scratch_dir();
    let json_path = dir.join("sensitivity.json");
    fs::write(&json_path, detailed_report()).unwrap();
    let csv_path = dir.join("detailed.csv");
    fs::write(
        &csv_path,
        "ParameterName,ParameterValue,TimeToEquilibrium,FinalHumans,FinalAIAgents,FinalRevenue\n\
         FixedBudget,1000,40,80,10,100\n\
         FixedBudget,2000,30,70,20,110\n\
         FixedBudget,3000,20,60,30,125\n",
    )
    .unwrap();

    let mut data = load_sensitivity_data(&json_path).unwrap();
    let report = data.report.as_ref().unwrap();
    assert_eq!(report.parameter_rankings[0].parameter_name, "FixedBudget");
    assert_eq!(report.sweeps.len(), 2);

    data.frame = Some(load_csv_frame(&csv_path).unwrap());
    let figures = all_figures(data.report.as_ref(), data.frame.as_ref());
    let names: Vec<&str> = figures.iter().map(|(name, _)| *name).collect();
    assert_eq!(
        names,
        vec![
            PARAMETER_RANKINGS,
            PARAMETER_VARIATIONS,
            SENSITIVITY_HEATMAP,
            OUTCOME_DISTRIBUTIONS,
            SENSITIVITY_DASHBOARD
        ]
    );

    let (_, distributions) = &figures[3];
    assert_eq!(distributions.panels.len(), 4);

    let (_, heatmap) = &figures[2];
    let PanelKind::Heatmap(matrix) = &heatmap.panels[0].kind else {
        panic!("expected heatmap");
    };
    assert_eq!(matrix.row_labels, vec!["FixedBudget"]);
    assert_eq!(matrix.col_labels.len(), 4);
    assert!((matrix.values[0][3].unwrap() + 1.0).abs() < 1e-9);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_sensitivity_html_dashboard() {
    let dir = scratch_dir();
    let json_path = dir.join("sensitivity.json");
    fs::write(&json_path, detailed_report()).unwrap();

    let data = load_sensitivity_data(&json_path).unwrap();
    let figure = sensitivity_dashboard(data.report.as_ref().unwrap()).unwrap();
    let output = dir.join("sensitivity_dashboard.html");
    figure.write_html(&output, "plotly.min.js").unwrap();

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("Sensitivity Analysis Dashboard"));
    assert!(html.contains("Most Impactful (Time)"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_csv_only_input() {
    let dir = scratch_dir();
    let csv_path = dir.join("runs.csv");
    fs::write(&csv_path, "TimeToEquilibrium,FinalHumans\n10,5\n12,4\n").unwrap();

    let data = load_sensitivity_data(&csv_path).unwrap();
    assert!(data.report.is_none());
    let names: Vec<&str> = all_figures(None, data.frame.as_ref())
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    // no parameter columns, so no heatmap
    assert_eq!(names, vec![OUTCOME_DISTRIBUTIONS, SENSITIVITY_DASHBOARD]);

    fs::remove_dir_all(&dir).ok();
}
