use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use workforce_viz::application::rendering::render_batch;
use workforce_viz::application::{sensitivity_plots, simulation_plots};
use workforce_viz::config::ImageFormat;
use workforce_viz::domain::figure::{Figure, PanelKind};
use workforce_viz::infrastructure::loader::load_csv_frame;
use workforce_viz::infrastructure::{RenderSettings, load_sensitivity_data, load_simulation_data};

struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("viz_render_it_{}", uuid::Uuid::new_v4()));
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

fn settings(format: ImageFormat) -> RenderSettings {
    RenderSettings {
        format,
        dpi: 30,
        parallel: true,
        ..RenderSettings::default()
    }
}

/// Renders the batch in both formats and checks every file landed with content.
fn render_both_formats(jobs: &[(&str, Figure)], out_dir: &Path) {
    for format in [ImageFormat::Png, ImageFormat::Svg] {
        let paths = render_batch(jobs, out_dir, &settings(format)).unwrap();
        assert_eq!(paths.len(), jobs.len());
        for ((name, _), path) in jobs.iter().zip(&paths) {
            assert_eq!(
                path.file_name().unwrap().to_string_lossy(),
                format!("{}.{}", name, format.extension())
            );
            assert!(fs::metadata(path).unwrap().len() > 0);
        }
    }
}

fn step(t: i64, humans: i64, agents: i64) -> serde_json::Value {
    json!({
        "TimeStep": t,
        "Workforce": {
            "Humans": {"Total": humans, "ByExperience": {"0": humans / 2, "3": humans - humans / 2}},
            "AIAgents": {"Total": agents},
            "OrchestrationUtilization": 35.0
        },
        "TotalCost": 4000.0 + 100.0 * t as f64,
        "AvailableBudget": 12000.0,
        "TotalProductivity": humans as f64 + 1.5 * agents as f64,
        "RevenueOutput": 90000.0 + 5000.0 * t as f64,
        "CatastrophicFailures": 0
    })
}

#[test]
fn test_simulation_figures_render_to_png_and_svg() {
    let scratch = Scratch::new();
    let series: Vec<_> = (0..6).map(|t| step(t, 100 - 5 * t, 3 * t)).collect();
    let input = scratch.write(
        "run.json",
        &json!({
            "TimeSeries": series,
            "EquilibriumState": series[5],
            "TimeToEquilibrium": 5,
            "TotalCatastrophicFailures": 2
        })
        .to_string(),
    );

    let data = load_simulation_data(&input).unwrap();
    let jobs = simulation_plots::all_figures(data.report.as_ref(), &data.frame);
    assert_eq!(jobs.len(), 5);
    render_both_formats(&jobs, &scratch.dir.join("plots"));
}

#[test]
fn test_single_step_run_with_empty_workforce_renders() {
    let scratch = Scratch::new();
    let only = step(0, 0, 0);
    let input = scratch.write(
        "single.json",
        &json!({"TimeSeries": [only], "EquilibriumState": only, "TimeToEquilibrium": 0}).to_string(),
    );

    let data = load_simulation_data(&input).unwrap();
    let jobs = simulation_plots::all_figures(data.report.as_ref(), &data.frame);
    let (_, equilibrium) = jobs
        .iter()
        .find(|(name, _)| *name == simulation_plots::EQUILIBRIUM_ANALYSIS)
        .unwrap();
    let pie = equilibrium
        .panels
        .iter()
        .find_map(|panel| match &panel.kind {
            PanelKind::Pie(slices) => Some(slices),
            _ => None,
        })
        .unwrap();
    assert!(pie.iter().all(|slice| slice.value == 0.0));

    render_both_formats(&jobs, &scratch.dir.join("plots"));
}

fn run(time: f64, humans: i64, agents: i64) -> serde_json::Value {
    json!({
        "TimeToEquilibrium": time,
        "EquilibriumState": {
            "Workforce": {"Humans": {"Total": humans}, "AIAgents": {"Total": agents}}
        }
    })
}

#[test]
fn test_sensitivity_figures_render_to_png_and_svg() {
    let scratch = Scratch::new();
    let report = scratch.write(
        "sensitivity.json",
        &json!({
            "ParameterRankings": [
                {"ParameterName": "FixedBudget", "TimeToEquilibriumImpact": 100.0, "WorkforceCompositionImpact": 40.0},
                {"ParameterName": "NaturalRate", "TimeToEquilibriumImpact": 4.0, "WorkforceCompositionImpact": 1.0}
            ],
            "SensitivityResults": [
                {"ParameterName": "FixedBudget", "ParameterValues": [1000, 2000, 3000],
                 "TimeToEquilibriumByValue": {"1000": 40, "2000": 30, "3000": 20}},
                {"ParameterName": "NaturalRate", "ParameterValues": [0.01, 0.02],
                 "TimeToEquilibriumByValue": {"0.01": 26, "0.02": 24}}
            ]
        })
        .to_string(),
    );
    let detailed = scratch.write(
        "detailed.csv",
        "ParameterName,ParameterValue,TimeToEquilibrium,FinalHumans,FinalAIAgents,FinalRevenue\n\
         FixedBudget,1000,40,80,10,100\n\
         FixedBudget,2000,30,70,20,110\n\
         FixedBudget,3000,20,60,30,125\n\
         NaturalRate,0.01,26,72,18,104\n\
         NaturalRate,0.02,24,70,19,106\n",
    );

    let mut data = load_sensitivity_data(&report).unwrap();
    data.frame = Some(load_csv_frame(&detailed).unwrap());
    let jobs = sensitivity_plots::all_figures(data.report.as_ref(), data.frame.as_ref());
    assert_eq!(jobs.len(), 5);
    render_both_formats(&jobs, &scratch.dir.join("sensitivity_plots"));
}

#[test]
fn test_single_value_sweep_and_constant_outcomes_render() {
    let scratch = Scratch::new();
    let report = scratch.write(
        "sensitivity.json",
        &json!({
            "DetailedResults": {
                "FixedBudget": {
                    "ParameterValues": [2000],
                    "Results": [run(30.0, 70, 20)]
                }
            }
        })
        .to_string(),
    );
    // every outcome is constant, so no correlation can be computed
    let detailed = scratch.write(
        "detailed.csv",
        "ParameterName,ParameterValue,TimeToEquilibrium,FinalHumans\n\
         FixedBudget,1000,30,70\n\
         FixedBudget,2000,30,70\n\
         FixedBudget,3000,30,70\n",
    );

    let mut data = load_sensitivity_data(&report).unwrap();
    data.frame = Some(load_csv_frame(&detailed).unwrap());
    let jobs = sensitivity_plots::all_figures(data.report.as_ref(), data.frame.as_ref());

    let (_, heatmap) = jobs
        .iter()
        .find(|(name, _)| *name == sensitivity_plots::SENSITIVITY_HEATMAP)
        .unwrap();
    let PanelKind::Heatmap(matrix) = &heatmap.panels[0].kind else {
        panic!("expected heatmap");
    };
    assert!(matrix.values.iter().flatten().all(Option::is_none));
    assert!(
        jobs.iter()
            .any(|(name, _)| *name == sensitivity_plots::PARAMETER_VARIATIONS)
    );

    render_both_formats(&jobs, &scratch.dir.join("sensitivity_plots"));
}
