//! Static chart rendering with `plotters`.
//!
//! A [`Figure`] is laid out on a grid of cells, each panel drawn into its own
//! sub-area. PNG goes through the bitmap backend, SVG through the SVG backend; both
//! share the same drawing code.

mod panels;

use crate::config::{ImageFormat, RenderEnvConfig};
use crate::domain::errors::VizError;
use crate::domain::figure::{Cell, Figure, Rgb};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;
use tracing::debug;

pub(crate) type DrawResult = Result<(), Box<dyn Error>>;

/// How figures are turned into files.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub format: ImageFormat,
    pub dpi: u32,
    pub font_family: String,
    /// Render independent files concurrently
    pub parallel: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from(&RenderEnvConfig::default())
    }
}

impl From<&RenderEnvConfig> for RenderSettings {
    fn from(config: &RenderEnvConfig) -> Self {
        Self {
            format: config.image_format,
            dpi: config.dpi,
            font_family: config.font_family.clone(),
            parallel: config.parallel,
        }
    }
}

impl RenderSettings {
    pub fn pixel_size(&self, size_inches: (f64, f64)) -> (u32, u32) {
        let scale = |inches: f64| ((inches * self.dpi as f64).round() as u32).max(1);
        (scale(size_inches.0), scale(size_inches.1))
    }

    fn fonts(&self) -> Fonts {
        Fonts {
            family: self.font_family.clone(),
            dpi: self.dpi as f64,
        }
    }
}

/// Font sizes are given in points and converted to pixels at the configured DPI.
pub(crate) struct Fonts {
    family: String,
    dpi: f64,
}

impl Fonts {
    pub(crate) fn px(&self, points: f64) -> f64 {
        points * self.dpi / 72.0
    }

    pub(crate) fn style(&self, points: f64) -> TextStyle<'_> {
        TextStyle::from((self.family.as_str(), self.px(points)).into_font())
    }

    pub(crate) fn bold(&self, points: f64) -> TextStyle<'_> {
        TextStyle::from((self.family.as_str(), self.px(points), FontStyle::Bold).into_font())
    }

    pub(crate) fn mono(&self, points: f64) -> TextStyle<'_> {
        TextStyle::from(("monospace", self.px(points)).into_font())
    }
}

pub(crate) fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// Renders `figure` to `path` in the configured format.
pub fn render_figure(
    figure: &Figure,
    path: &Path,
    settings: &RenderSettings,
) -> Result<(), VizError> {
    let size = settings.pixel_size(figure.size_inches);
    let fonts = settings.fonts();

    let drawn = match settings.format {
        ImageFormat::Png => {
            draw_figure(BitMapBackend::new(path, size).into_drawing_area(), figure, &fonts)
        }
        ImageFormat::Svg => {
            draw_figure(SVGBackend::new(path, size).into_drawing_area(), figure, &fonts)
        }
    };
    drawn.map_err(|e| VizError::Render {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    debug!(
        "Rendered {} panels to {} ({}x{} px)",
        figure.panels.len(),
        path.display(),
        size.0,
        size.1
    );
    Ok(())
}

fn draw_figure<DB>(root: DrawingArea<DB, Shift>, figure: &Figure, fonts: &Fonts) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let body = match &figure.title {
        Some(title) => root.titled(title, fonts.bold(16.0))?,
        None => root.clone(),
    };
    let (width, height) = body.dim_in_pixel();

    for panel in &figure.panels {
        let (x, y, w, h) = cell_rect((figure.rows, figure.cols), &panel.cell, (width, height));
        let area = body.clone().shrink((x, y), (w, h));
        panels::draw_panel(&area, panel, fonts)?;
    }

    root.present()?;
    Ok(())
}

/// Pixel rectangle `(x, y, width, height)` covered by `cell` on a `rows x cols` grid.
///
/// Cells and spans that run past the grid are clipped to it, and every cell keeps at
/// least one row and one column.
pub fn cell_rect(grid: (usize, usize), cell: &Cell, size: (u32, u32)) -> (i32, i32, u32, u32) {
    let (rows, cols) = (grid.0.max(1), grid.1.max(1));
    let row = cell.row.min(rows - 1);
    let col = cell.col.min(cols - 1);
    let row_end = (row + cell.row_span.max(1)).min(rows);
    let col_end = (col + cell.col_span.max(1)).min(cols);

    let edge = |index: usize, count: usize, extent: u32| -> u32 {
        (extent as u64 * index as u64 / count as u64) as u32
    };
    let x0 = edge(col, cols, size.0);
    let x1 = edge(col_end, cols, size.0);
    let y0 = edge(row, rows, size.1);
    let y1 = edge(row_end, rows, size.1);

    (x0 as i32, y0 as i32, x1 - x0, y1 - y0)
}

/// Diverging blue-white-red colour for a correlation in [-1, 1]; grey when undefined.
pub fn diverging_color(value: Option<f64>) -> RGBColor {
    const NEGATIVE: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const NEUTRAL: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const POSITIVE: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let Some(v) = value.filter(|v| v.is_finite()) else {
        return rgb(Rgb::GREY);
    };
    let t = v.clamp(-1.0, 1.0);
    let (from, to, frac) = if t < 0.0 {
        (NEUTRAL, NEGATIVE, -t)
    } else {
        (NEUTRAL, POSITIVE, t)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * frac).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_rect_single_cells() {
        let grid = (2, 2);
        assert_eq!(cell_rect(grid, &Cell::at(0, 0), (800, 600)), (0, 0, 400, 300));
        assert_eq!(cell_rect(grid, &Cell::at(1, 1), (800, 600)), (400, 300, 400, 300));
    }

    #[test]
    fn test_cell_rect_spans() {
        let rect = cell_rect((3, 4), &Cell::spanning(0, 2, 1, 2), (1200, 900));
        assert_eq!(rect, (600, 0, 600, 300));

        let rows = cell_rect((4, 3), &Cell::spanning(1, 0, 2, 3), (900, 800));
        assert_eq!(rows, (0, 200, 900, 400));
    }

    #[test]
    fn test_cell_rect_clips_to_grid() {
        let rect = cell_rect((2, 2), &Cell::spanning(1, 1, 5, 5), (100, 100));
        assert_eq!(rect, (50, 50, 50, 50));

        let out_of_range = cell_rect((2, 2), &Cell::at(9, 9), (100, 100));
        assert_eq!(out_of_range, (50, 50, 50, 50));
    }

    #[test]
    fn test_pixel_size_scales_with_dpi() {
        let settings = RenderSettings {
            dpi: 150,
            ..RenderSettings::default()
        };
        assert_eq!(settings.pixel_size((12.0, 10.0)), (1800, 1500));
        assert_eq!(settings.pixel_size((0.0, 1.0)), (1, 150));
    }

    #[test]
    fn test_diverging_color() {
        assert_eq!(diverging_color(Some(0.0)), RGBColor(221, 221, 221));
        assert_eq!(diverging_color(Some(1.0)), RGBColor(180, 4, 38));
        assert_eq!(diverging_color(Some(-2.0)), RGBColor(59, 76, 192));
        assert_eq!(diverging_color(None), rgb(Rgb::GREY));
        assert_eq!(diverging_color(Some(f64::NAN)), rgb(Rgb::GREY));
    }
}
