//! Interactive dashboards written as standalone plotly.js pages.
//!
//! The figure is assembled as plain JSON (`data` + `layout`) and embedded in an HTML
//! document that pulls plotly.js from a configurable URL.

use crate::domain::errors::VizError;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use std::fs;
use std::path::Path;
use tracing::info;

/// Paper-space rectangle occupied by one subplot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Xy,
    XySecondary,
    Table,
}

/// Axis references of an xy cell, e.g. `("x3", "y3", Some("y4"))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAxes {
    pub x: String,
    pub y: String,
    pub secondary_y: Option<String>,
}

/// Row-major grid of subplots with plotly's default spacing.
///
/// Axes are numbered in row-major order over xy cells; a secondary y axis takes the
/// number right after its primary one. Table cells get no axes.
#[derive(Debug, Clone)]
pub struct SubplotGrid {
    rows: usize,
    cols: usize,
    horizontal_spacing: f64,
    vertical_spacing: f64,
    kinds: Vec<CellKind>,
}

impl SubplotGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            rows,
            cols,
            horizontal_spacing: 0.2 / cols as f64,
            vertical_spacing: 0.3 / rows as f64,
            kinds: vec![CellKind::Xy; rows * cols],
        }
    }

    pub fn with_secondary_y(mut self, row: usize, col: usize) -> Self {
        if let Some(idx) = self.index(row, col) {
            self.kinds[idx] = CellKind::XySecondary;
        }
        self
    }

    pub fn with_table(mut self, row: usize, col: usize) -> Self {
        if let Some(idx) = self.index(row, col) {
            self.kinds[idx] = CellKind::Table;
        }
        self
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// Domain of the cell at zero-based `row`, `col`; row 0 is the top row.
    pub fn domain(&self, row: usize, col: usize) -> Domain {
        let width = (1.0 - self.horizontal_spacing * (self.cols - 1) as f64) / self.cols as f64;
        let height = (1.0 - self.vertical_spacing * (self.rows - 1) as f64) / self.rows as f64;
        let x0 = col as f64 * (width + self.horizontal_spacing);
        let y1 = 1.0 - row as f64 * (height + self.vertical_spacing);
        Domain {
            x: [x0, x0 + width],
            y: [y1 - height, y1],
        }
    }

    pub fn axes(&self, row: usize, col: usize) -> Option<CellAxes> {
        let target = self.index(row, col)?;
        let mut x_count = 0;
        let mut y_count = 0;
        for (idx, kind) in self.kinds.iter().enumerate() {
            if *kind == CellKind::Table {
                continue;
            }
            x_count += 1;
            y_count += 1;
            let primary_y = y_count;
            let secondary = if *kind == CellKind::XySecondary {
                y_count += 1;
                Some(axis_ref("y", y_count))
            } else {
                None
            };
            if idx == target {
                return Some(CellAxes {
                    x: axis_ref("x", x_count),
                    y: axis_ref("y", primary_y),
                    secondary_y: secondary,
                });
            }
        }
        None
    }

    fn layout_axes(&self, layout: &mut Map<String, Value>) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let Some(axes) = self.axes(row, col) else {
                    continue;
                };
                let domain = self.domain(row, col);
                layout.insert(
                    axis_key(&axes.x),
                    json!({"domain": domain.x, "anchor": axes.y}),
                );
                layout.insert(
                    axis_key(&axes.y),
                    json!({"domain": domain.y, "anchor": axes.x}),
                );
                if let Some(secondary) = &axes.secondary_y {
                    layout.insert(
                        axis_key(secondary),
                        json!({"anchor": axes.x, "overlaying": axes.y, "side": "right"}),
                    );
                }
            }
        }
    }
}

fn axis_ref(prefix: &str, n: usize) -> String {
    if n == 1 {
        prefix.to_string()
    } else {
        format!("{}{}", prefix, n)
    }
}

/// Layout key for an axis reference: `x` -> `xaxis`, `y4` -> `yaxis4`.
fn axis_key(reference: &str) -> String {
    let (prefix, n) = reference.split_at(1);
    format!("{}axis{}", prefix, n)
}

/// A plotly figure under construction.
#[derive(Debug, Clone)]
pub struct PlotlyFigure {
    grid: SubplotGrid,
    traces: Vec<Value>,
    layout: Map<String, Value>,
}

impl PlotlyFigure {
    /// Creates an empty figure; `subplot_titles` are placed above the cells in
    /// row-major order.
    pub fn new(grid: SubplotGrid, subplot_titles: &[&str]) -> Self {
        let mut layout = Map::new();
        grid.layout_axes(&mut layout);

        let mut annotations = Vec::new();
        for (i, title) in subplot_titles.iter().enumerate() {
            let (row, col) = (i / grid.cols, i % grid.cols);
            if row >= grid.rows {
                break;
            }
            let domain = grid.domain(row, col);
            annotations.push(json!({
                "text": title,
                "showarrow": false,
                "xref": "paper",
                "yref": "paper",
                "x": (domain.x[0] + domain.x[1]) / 2.0,
                "y": domain.y[1],
                "xanchor": "center",
                "yanchor": "bottom",
                "font": {"size": 16},
            }));
        }
        layout.insert("annotations".to_string(), Value::Array(annotations));

        Self {
            grid,
            traces: Vec::new(),
            layout,
        }
    }

    pub fn traces(&self) -> &[Value] {
        &self.traces
    }

    pub fn layout(&self) -> &Map<String, Value> {
        &self.layout
    }

    /// Adds an xy trace (scatter, bar, ...) to the cell's primary axes.
    pub fn add_trace(&mut self, row: usize, col: usize, trace: Value) {
        let axes = self.grid.axes(row, col);
        self.push_on_axes(trace, axes.map(|a| (a.x, a.y)));
    }

    /// Adds an xy trace against the cell's secondary y axis, falling back to the
    /// primary axis when the cell has none.
    pub fn add_trace_secondary(&mut self, row: usize, col: usize, trace: Value) {
        let axes = self
            .grid
            .axes(row, col)
            .map(|a| (a.x, a.secondary_y.unwrap_or(a.y)));
        self.push_on_axes(trace, axes);
    }

    fn push_on_axes(&mut self, mut trace: Value, axes: Option<(String, String)>) {
        if let (Some((x, y)), Value::Object(map)) = (axes, &mut trace) {
            map.insert("xaxis".to_string(), Value::String(x));
            map.insert("yaxis".to_string(), Value::String(y));
        }
        self.traces.push(trace);
    }

    /// Adds a two-column key/value table filling the cell's domain.
    pub fn add_table(
        &mut self,
        row: usize,
        col: usize,
        rows: &[(String, String)],
        header_color: &str,
    ) {
        let domain = self.grid.domain(row, col);
        let (keys, values): (Vec<&str>, Vec<&str>) = rows
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .unzip();
        self.traces.push(json!({
            "type": "table",
            "domain": {"x": domain.x, "y": domain.y},
            "header": {
                "values": ["Metric", "Value"],
                "fill": {"color": header_color},
                "font": {"size": 14, "color": "black"},
            },
            "cells": {
                "values": [keys, values],
                "fill": {"color": "white"},
                "font": {"size": 12},
            },
        }));
    }

    /// Sets axis titles of an xy cell.
    pub fn set_axis_titles(&mut self, row: usize, col: usize, x_title: &str, y_title: &str) {
        let Some(axes) = self.grid.axes(row, col) else {
            return;
        };
        for (reference, title) in [(axes.x, x_title), (axes.y, y_title)] {
            if let Some(Value::Object(axis)) = self.layout.get_mut(&axis_key(&reference)) {
                axis.insert("title".to_string(), json!({"text": title}));
            }
        }
    }

    pub fn set_layout(&mut self, key: &str, value: Value) {
        self.layout.insert(key.to_string(), value);
    }

    pub fn to_json(&self) -> Value {
        json!({
            "data": self.traces,
            "layout": self.layout,
        })
    }

    /// Standalone HTML page rendering the figure with plotly.js from `plotly_js_url`.
    pub fn to_html(&self, plotly_js_url: &str, generated_at: DateTime<Utc>) -> String {
        let title = self
            .layout
            .get("title")
            .and_then(|t| t.get("text"))
            .and_then(Value::as_str)
            .unwrap_or("Dashboard");
        // A literal "</" inside the inline script would close the tag early.
        let figure_json = self.to_json().to_string().replace("</", "<\\/");

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="{plotly_js_url}" charset="utf-8"></script>
    <style>
        body {{ margin: 0; font-family: sans-serif; background: #ffffff; }}
        #dashboard {{ width: 100%; }}
        .footer {{ color: #888888; font-size: 12px; padding: 8px 16px; }}
    </style>
</head>
<body>
    <div id="dashboard"></div>
    <p class="footer">Generated: {timestamp}</p>
    <script type="text/javascript">
        var figure = {figure_json};
        Plotly.newPlot("dashboard", figure.data, figure.layout, {{responsive: true}});
    </script>
</body>
</html>
"#,
            title = html_escape(title),
            plotly_js_url = html_escape(plotly_js_url),
            timestamp = generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            figure_json = figure_json,
        )
    }

    pub fn write_html(&self, path: &Path, plotly_js_url: &str) -> Result<(), VizError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| VizError::io(parent, e))?;
        }
        let html = self.to_html(plotly_js_url, Utc::now());
        fs::write(path, html).map_err(|e| VizError::io(path, e))?;
        info!(
            "Wrote interactive dashboard {} ({} traces)",
            path.display(),
            self.traces.len()
        );
        Ok(())
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dashboard_grid() -> SubplotGrid {
        SubplotGrid::new(3, 2).with_secondary_y(1, 0).with_table(2, 1)
    }

    #[test]
    fn test_domains_cover_grid_with_spacing() {
        let grid = SubplotGrid::new(2, 2);
        let top_left = grid.domain(0, 0);
        let bottom_right = grid.domain(1, 1);

        assert!((top_left.x[0] - 0.0).abs() < 1e-12);
        assert!((top_left.y[1] - 1.0).abs() < 1e-12);
        assert!((bottom_right.x[1] - 1.0).abs() < 1e-12);
        assert!(bottom_right.y[0].abs() < 1e-12);
        // 0.2 / cols horizontal gap
        assert!((grid.domain(0, 1).x[0] - top_left.x[1] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_axis_numbering_with_secondary_and_table() {
        let grid = dashboard_grid();
        assert_eq!(grid.axes(0, 0).unwrap().x, "x");
        assert_eq!(grid.axes(0, 1).unwrap().y, "y2");

        let cost = grid.axes(1, 0).unwrap();
        assert_eq!((cost.x.as_str(), cost.y.as_str()), ("x3", "y3"));
        assert_eq!(cost.secondary_y.as_deref(), Some("y4"));

        let productivity = grid.axes(1, 1).unwrap();
        assert_eq!((productivity.x.as_str(), productivity.y.as_str()), ("x4", "y5"));
        assert_eq!(grid.axes(2, 0).unwrap().y, "y6");
        assert!(grid.axes(2, 1).is_none());
        assert!(grid.axes(5, 5).is_none());
    }

    #[test]
    fn test_traces_are_bound_to_cell_axes() {
        let mut figure = PlotlyFigure::new(dashboard_grid(), &["A", "B"]);
        figure.add_trace(0, 1, json!({"type": "scatter", "x": [0, 1], "y": [2, 3]}));
        figure.add_trace_secondary(1, 0, json!({"type": "scatter"}));
        figure.add_trace_secondary(0, 0, json!({"type": "scatter"}));

        let traces = figure.traces();
        assert_eq!(traces[0]["xaxis"], "x2");
        assert_eq!(traces[1]["yaxis"], "y4");
        assert_eq!(traces[2]["yaxis"], "y");
        assert_eq!(figure.layout()["yaxis4"]["overlaying"], "y3");
    }

    #[test]
    fn test_subplot_titles_and_axis_titles() {
        let mut figure = PlotlyFigure::new(SubplotGrid::new(1, 2), &["Left", "Right", "Extra"]);
        figure.set_axis_titles(0, 1, "Time Step", "Revenue ($)");

        let annotations = figure.layout()["annotations"].as_array().unwrap();
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[1]["text"], "Right");
        assert_eq!(figure.layout()["xaxis2"]["title"]["text"], "Time Step");
        assert_eq!(figure.layout()["yaxis2"]["title"]["text"], "Revenue ($)");
    }

    #[test]
    fn test_table_trace_uses_cell_domain() {
        let mut figure = PlotlyFigure::new(dashboard_grid(), &[]);
        figure.add_table(
            2,
            1,
            &[("Time to Equilibrium".to_string(), "12 steps".to_string())],
            "lightblue",
        );
        let table = &figure.traces()[0];
        assert_eq!(table["type"], "table");
        assert_eq!(table["cells"]["values"][0][0], "Time to Equilibrium");
        assert_eq!(table["cells"]["values"][1][0], "12 steps");
        assert!(table.get("xaxis").is_none());
    }

    #[test]
    fn test_html_embeds_figure_and_script_url() {
        let mut figure = PlotlyFigure::new(SubplotGrid::new(1, 1), &[]);
        figure.set_layout("title", json!({"text": "Costs </script> & more"}));
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let html = figure.to_html("https://cdn.example/plotly.js", at);

        assert!(html.contains(r#"<script src="https://cdn.example/plotly.js""#));
        assert!(html.contains("Plotly.newPlot"));
        assert!(html.contains("Generated: 2024-05-01 12:00:00 UTC"));
        assert!(html.contains("<title>Costs &lt;/script&gt; &amp; more</title>"));
        assert!(!html.contains("more</script>"));
    }
}
