//! Reads simulator output files from disk.

use crate::domain::errors::VizError;
use crate::domain::frame::Frame;
use crate::domain::sensitivity::SensitivityReport;
use crate::domain::simulation::SimulationReport;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// A simulation run as loaded from disk.
///
/// `report` is only present for JSON input; CSV exports carry the time series alone.
#[derive(Debug, Clone)]
pub struct SimulationData {
    pub report: Option<SimulationReport>,
    pub frame: Frame,
}

#[derive(Debug, Clone, Default)]
pub struct SensitivityData {
    pub report: Option<SensitivityReport>,
    pub frame: Option<Frame>,
}

impl SensitivityData {
    pub fn is_empty(&self) -> bool {
        self.report.is_none() && self.frame.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputFormat {
    Json,
    Csv,
}

fn input_format(path: &Path) -> Result<InputFormat, VizError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "json" => Ok(InputFormat::Json),
        "csv" => Ok(InputFormat::Csv),
        _ => Err(VizError::UnsupportedFormat {
            extension: format!(".{}", extension),
        }),
    }
}

fn read_json_value(path: &Path) -> Result<Value, VizError> {
    let content = fs::read_to_string(path).map_err(|e| VizError::io(path, e))?;
    serde_json::from_str(&content).map_err(|source| VizError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a headed CSV file into a [`Frame`].
pub fn load_csv_frame(path: &Path) -> Result<Frame, VizError> {
    let to_viz = |source: csv::Error| VizError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let reader = csv::Reader::from_path(path).map_err(to_viz)?;
    let frame = Frame::from_csv_reader(reader).map_err(to_viz)?;
    debug!(
        "Read {} rows x {} columns from {}",
        frame.len(),
        frame.column_names().len(),
        path.display()
    );
    Ok(frame)
}

/// Loads a simulation report (JSON) or a time-series export (CSV).
pub fn load_simulation_data(path: &Path) -> Result<SimulationData, VizError> {
    match input_format(path)? {
        InputFormat::Json => {
            let value = read_json_value(path)?;
            let series = value
                .get("TimeSeries")
                .or_else(|| value.get("TimeSeriesData"))
                .and_then(Value::as_array)
                .ok_or_else(|| VizError::MissingTimeSeries {
                    path: path.to_path_buf(),
                })?;
            let frame = Frame::from_records(series);

            // the frame alone still drives the time-series charts
            let report = match serde_json::from_value::<SimulationReport>(value) {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!(
                        "Could not read report details from {}: {}. Plotting the time series only",
                        path.display(),
                        e
                    );
                    None
                }
            };
            info!(
                "Loaded simulation report {} ({} steps)",
                path.display(),
                frame.len()
            );
            Ok(SimulationData { report, frame })
        }
        InputFormat::Csv => Ok(SimulationData {
            report: None,
            frame: load_csv_frame(path)?,
        }),
    }
}

/// Parses a sensitivity analysis JSON report.
pub fn load_json_report(path: &Path) -> Result<SensitivityReport, VizError> {
    let value = read_json_value(path)?;
    let report: SensitivityReport =
        serde_json::from_value(value).map_err(|source| VizError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    info!(
        "Loaded sensitivity report {} ({} parameters, {} sweeps)",
        path.display(),
        report.parameter_rankings.len(),
        report.sweeps.len()
    );
    Ok(report)
}

/// Loads a sensitivity report (JSON) or a detailed run export (CSV).
pub fn load_sensitivity_data(path: &Path) -> Result<SensitivityData, VizError> {
    match input_format(path)? {
        InputFormat::Json => Ok(SensitivityData {
            report: Some(load_json_report(path)?),
            frame: None,
        }),
        InputFormat::Csv => Ok(SensitivityData {
            report: None,
            frame: Some(load_csv_frame(path)?),
        }),
    }
}
