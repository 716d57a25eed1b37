use super::{DrawResult, Fonts, diverging_color, rgb};
use crate::domain::figure::{
    AreaLayer, Bars, Histogram, LabeledMatrix, Marker, Orientation, Panel, PanelKind, Rgb,
    Series, Slice, TextEmphasis,
};
use crate::domain::stats::Stats;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;

pub(super) fn draw_panel<DB>(area: &DrawingArea<DB, Shift>, panel: &Panel, fonts: &Fonts) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    match &panel.kind {
        PanelKind::Lines { series, y_range } => draw_lines(area, panel, series, *y_range, fonts),
        PanelKind::StackedArea { x, layers } => draw_stacked_area(area, panel, x, layers, fonts),
        PanelKind::Bars(bars) => match bars.orientation {
            Orientation::Vertical => draw_vertical_bars(area, panel, bars, fonts),
            Orientation::Horizontal => draw_horizontal_bars(area, panel, bars, fonts),
        },
        PanelKind::Pie(slices) => draw_pie(area, panel, slices, fonts),
        PanelKind::Histogram(hist) => draw_histogram(area, panel, hist, fonts),
        PanelKind::Heatmap(matrix) => draw_heatmap(area, panel, matrix, fonts),
        PanelKind::Text { lines, emphasis } => draw_text_block(area, panel, lines, *emphasis, fonts),
    }
}

fn chart_builder<'a, 'b, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    title: &str,
    fonts: &'b Fonts,
    y_label_px: u32,
) -> ChartBuilder<'a, 'b, DB> {
    let mut builder = ChartBuilder::on(area);
    builder
        .margin(fonts.px(8.0) as u32)
        .x_label_area_size(fonts.px(28.0) as u32)
        .y_label_area_size(y_label_px);
    if !title.is_empty() {
        builder.caption(title, fonts.style(12.0));
    }
    builder
}

fn default_y_label_px(fonts: &Fonts) -> u32 {
    fonts.px(50.0) as u32
}

/// Room for the longest category label plus the axis description.
fn category_label_px(labels: &[String], fonts: &Fonts) -> u32 {
    let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
    (longest * fonts.px(9.0) * 0.6 + fonts.px(22.0)) as u32
}

fn titled_area<DB>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    fonts: &Fonts,
) -> Result<DrawingArea<DB, Shift>, DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
{
    if title.is_empty() {
        Ok(area.clone())
    } else {
        area.titled(title, fonts.style(12.0))
    }
}

fn draw_no_data<DB>(area: &DrawingArea<DB, Shift>, panel: &Panel, fonts: &Fonts) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let inner = titled_area(area, &panel.title, fonts)?;
    let (w, h) = inner.dim_in_pixel();
    inner.draw_text(
        "No data available",
        &fonts.style(10.0).pos(Pos::new(HPos::Center, VPos::Center)),
        ((w / 2) as i32, (h / 2) as i32),
    )?;
    Ok(())
}

fn finite_bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn widened(lo: f64, hi: f64) -> Range<f64> {
    if (hi - lo).abs() < 1e-12 {
        let pad = if lo.abs() > 1e-12 { lo.abs() * 0.1 } else { 1.0 };
        (lo - pad)..(hi + pad)
    } else {
        lo..hi
    }
}

fn padded(lo: f64, hi: f64) -> Range<f64> {
    if (hi - lo).abs() < 1e-12 {
        return widened(lo, hi);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

/// Category name at an integer axis position; blank between categories.
fn label_at(labels: &[String], position: f64) -> String {
    let index = position.round();
    if (position - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

fn draw_lines<DB>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    series: &[Series],
    y_range: Option<(f64, f64)>,
    fonts: &Fonts,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let finite: Vec<Vec<(f64, f64)>> = series
        .iter()
        .map(|s| {
            s.points
                .iter()
                .copied()
                .filter(|(x, y)| x.is_finite() && y.is_finite())
                .collect()
        })
        .collect();

    let Some((x_lo, x_hi)) = finite_bounds(finite.iter().flatten().map(|(x, _)| *x)) else {
        return draw_no_data(area, panel, fonts);
    };
    let y_axis = match y_range {
        Some((lo, hi)) => lo..hi,
        None => {
            let (lo, hi) =
                finite_bounds(finite.iter().flatten().map(|(_, y)| *y)).unwrap_or((0.0, 1.0));
            padded(lo, hi)
        }
    };

    let mut chart = chart_builder(area, &panel.title, fonts, default_y_label_px(fonts))
        .build_cartesian_2d(widened(x_lo, x_hi), y_axis)?;
    chart
        .configure_mesh()
        .light_line_style(WHITE)
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .label_style(fonts.style(9.0))
        .axis_desc_style(fonts.style(10.0))
        .draw()?;

    let stroke = fonts.px(1.5).max(1.0) as u32;
    let marker_size = fonts.px(3.0).max(2.0) as i32;
    let mut labelled = false;

    for (s, points) in series.iter().zip(&finite) {
        let color = rgb(s.color);
        let anno = chart.draw_series(LineSeries::new(
            points.iter().copied(),
            color.stroke_width(stroke),
        ))?;
        if let Some(label) = &s.label {
            anno.label(label.as_str()).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
            labelled = true;
        }

        match s.marker {
            Marker::None => {}
            Marker::Circle => {
                chart.draw_series(
                    points
                        .iter()
                        .map(|p| Circle::new(*p, marker_size, color.filled())),
                )?;
            }
            Marker::Square => {
                chart.draw_series(points.iter().map(|p| {
                    EmptyElement::at(*p)
                        + Rectangle::new(
                            [(-marker_size, -marker_size), (marker_size, marker_size)],
                            color.filled(),
                        )
                }))?;
            }
            Marker::Triangle => {
                chart.draw_series(
                    points
                        .iter()
                        .map(|p| TriangleMarker::new(*p, marker_size + 1, color.filled())),
                )?;
            }
        }
    }

    if labelled {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font(fonts.style(9.0))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

fn draw_stacked_area<DB>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    x: &[f64],
    layers: &[AreaLayer],
    fonts: &Fonts,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let Some((x_lo, x_hi)) = finite_bounds(x.iter().copied()) else {
        return draw_no_data(area, panel, fonts);
    };
    if layers.is_empty() {
        return draw_no_data(area, panel, fonts);
    }

    // Running totals per layer; missing cells stack as zero.
    let mut totals = vec![0.0; x.len()];
    let mut stacked: Vec<Vec<(f64, f64)>> = Vec::with_capacity(layers.len());
    for layer in layers {
        for (i, total) in totals.iter_mut().enumerate() {
            *total += layer
                .values
                .get(i)
                .copied()
                .filter(|v| v.is_finite())
                .unwrap_or(0.0);
        }
        stacked.push(
            x.iter()
                .copied()
                .zip(totals.iter().copied())
                .filter(|(x, _)| x.is_finite())
                .collect(),
        );
    }
    let y_max = totals.iter().copied().fold(0.0f64, f64::max).max(1.0) * 1.05;

    let mut chart = chart_builder(area, &panel.title, fonts, default_y_label_px(fonts))
        .build_cartesian_2d(widened(x_lo, x_hi), 0.0..y_max)?;
    chart
        .configure_mesh()
        .light_line_style(WHITE)
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .label_style(fonts.style(9.0))
        .axis_desc_style(fonts.style(10.0))
        .draw()?;

    // Tallest band first so each lower band paints over it.
    for (layer, points) in layers.iter().zip(&stacked).rev() {
        let color = rgb(layer.color);
        chart
            .draw_series(
                AreaSeries::new(points.iter().copied(), 0.0, color.filled())
                    .border_style(BLACK.mix(0.4).stroke_width(1)),
            )?
            .label(layer.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(fonts.style(9.0))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn bar_values(bars: &Bars) -> Vec<f64> {
    bars.categories
        .iter()
        .enumerate()
        .map(|(i, _)| bars.values.get(i).copied().filter(|v| v.is_finite()).unwrap_or(0.0))
        .collect()
}

/// Value axis covering zero and every bar, with headroom for value labels.
fn bar_axis(values: &[f64], labelled: bool) -> Range<f64> {
    let lo = values.iter().copied().fold(0.0f64, f64::min);
    let hi = values.iter().copied().fold(0.0f64, f64::max);
    let span = (hi - lo).max(1e-9);
    let headroom = if labelled { 0.15 } else { 0.05 };
    let hi = if hi > 0.0 || lo == 0.0 { hi + span * headroom } else { hi };
    if (hi - lo).abs() < 1e-9 {
        return 0.0..1.0;
    }
    lo..hi
}

fn draw_vertical_bars<DB>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    bars: &Bars,
    fonts: &Fonts,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let values = bar_values(bars);
    if values.is_empty() {
        return draw_no_data(area, panel, fonts);
    }
    let n = values.len();
    let color = rgb(bars.color);

    let mut chart = chart_builder(area, &panel.title, fonts, default_y_label_px(fonts))
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), bar_axis(&values, bars.value_labels))?;
    let category = |x: &f64| label_at(&bars.categories, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(WHITE)
        .x_labels(n)
        .x_label_formatter(&category)
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .label_style(fonts.style(9.0))
        .axis_desc_style(fonts.style(10.0))
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *v)], color.filled())
    }))?;
    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *v)], BLACK.stroke_width(1))
    }))?;

    if bars.value_labels {
        let style = fonts.style(8.0).pos(Pos::new(HPos::Center, VPos::Bottom));
        chart.draw_series(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| Text::new(format!("{:.3}", v), (i as f64, *v), style.clone())),
        )?;
    }
    Ok(())
}

fn draw_horizontal_bars<DB>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    bars: &Bars,
    fonts: &Fonts,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let values = bar_values(bars);
    if values.is_empty() {
        return draw_no_data(area, panel, fonts);
    }
    let n = values.len();
    let color = rgb(bars.color);

    let mut chart = chart_builder(
        area,
        &panel.title,
        fonts,
        category_label_px(&bars.categories, fonts),
    )
    .build_cartesian_2d(bar_axis(&values, bars.value_labels), -0.5..(n as f64 - 0.5))?;
    let category = |y: &f64| label_at(&bars.categories, *y);
    chart
        .configure_mesh()
        .disable_y_mesh()
        .light_line_style(WHITE)
        .y_labels(n)
        .y_label_formatter(&category)
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .label_style(fonts.style(9.0))
        .axis_desc_style(fonts.style(10.0))
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        let y = i as f64;
        Rectangle::new([(0.0, y - 0.4), (*v, y + 0.4)], color.filled())
    }))?;

    if bars.value_labels {
        let style = fonts.style(8.0).pos(Pos::new(HPos::Left, VPos::Center));
        chart.draw_series(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| Text::new(format!(" {:.3}", v), (*v, i as f64), style.clone())),
        )?;
    }
    Ok(())
}

fn draw_pie<DB>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    slices: &[Slice],
    fonts: &Fonts,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let kept: Vec<&Slice> = slices
        .iter()
        .filter(|s| s.value.is_finite() && s.value > 0.0)
        .collect();
    if kept.is_empty() {
        return draw_no_data(area, panel, fonts);
    }

    let inner = titled_area(area, &panel.title, fonts)?;
    let (w, h) = inner.dim_in_pixel();
    let center = ((w / 2) as i32, (h / 2) as i32);
    let radius = w.min(h) as f64 * 0.33;
    let sizes: Vec<f64> = kept.iter().map(|s| s.value).collect();
    let colors: Vec<RGBColor> = kept.iter().map(|s| rgb(s.color)).collect();
    let labels: Vec<&str> = kept.iter().map(|s| s.label.as_str()).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.label_style(fonts.style(10.0));
    pie.percentages(fonts.style(9.0));
    inner.draw(&pie)?;
    Ok(())
}

fn draw_histogram<DB>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    hist: &Histogram,
    fonts: &Fonts,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let bins = Stats::histogram(&hist.values, hist.bins);
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return draw_no_data(area, panel, fonts);
    };
    let (lo, hi) = (first.0, last.0 + last.1);
    let y_max = bins.iter().map(|(_, _, c)| *c).max().unwrap_or(0).max(1) as f64 * 1.1;
    let color = rgb(hist.color);

    let mut chart = chart_builder(area, &panel.title, fonts, default_y_label_px(fonts))
        .build_cartesian_2d(lo..hi, 0.0..y_max)?;
    chart
        .configure_mesh()
        .light_line_style(WHITE)
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .label_style(fonts.style(9.0))
        .axis_desc_style(fonts.style(10.0))
        .draw()?;

    chart.draw_series(bins.iter().map(|(start, width, count)| {
        Rectangle::new([(*start, 0.0), (start + width, *count as f64)], color.mix(0.8).filled())
    }))?;
    chart.draw_series(bins.iter().map(|(start, width, count)| {
        Rectangle::new([(*start, 0.0), (start + width, *count as f64)], BLACK.stroke_width(1))
    }))?;

    if !hist.show_stats {
        return Ok(());
    }
    let Some(mean) = Stats::mean(&hist.values) else {
        return Ok(());
    };
    let stroke = fonts.px(1.5).max(1.0) as u32;

    chart
        .draw_series(DashedLineSeries::new(
            vec![(mean, 0.0), (mean, y_max)],
            10,
            6,
            RED.stroke_width(stroke),
        ))?
        .label(format!("Mean: {:.2}", mean))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    if let Some(std) = Stats::std_dev(&hist.values) {
        let orange = rgb(Rgb::ORANGE);
        let mut labelled = false;
        for edge in [mean - std, mean + std] {
            if edge < lo || edge > hi {
                continue;
            }
            let anno = chart.draw_series(DashedLineSeries::new(
                vec![(edge, 0.0), (edge, y_max)],
                3,
                4,
                orange.stroke_width(stroke),
            ))?;
            if !labelled {
                anno.label(format!("±1 Std: {:.2}", std)).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], orange.stroke_width(2))
                });
                labelled = true;
            }
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(fonts.style(9.0))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_heatmap<DB>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    matrix: &LabeledMatrix,
    fonts: &Fonts,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let rows = matrix.row_labels.len();
    let cols = matrix.col_labels.len();
    if rows == 0 || cols == 0 {
        return draw_no_data(area, panel, fonts);
    }

    let mut chart = chart_builder(
        area,
        &panel.title,
        fonts,
        category_label_px(&matrix.row_labels, fonts),
    )
    .build_cartesian_2d(-0.5..(cols as f64 - 0.5), -0.5..(rows as f64 - 0.5))?;

    // First row is drawn at the top.
    let row_label = |y: &f64| {
        let flipped = (rows - 1) as f64 - *y;
        label_at(&matrix.row_labels, flipped)
    };
    let col_label = |x: &f64| label_at(&matrix.col_labels, *x);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(cols)
        .y_labels(rows)
        .x_label_formatter(&col_label)
        .y_label_formatter(&row_label)
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .label_style(fonts.style(9.0))
        .axis_desc_style(fonts.style(10.0))
        .draw()?;

    let cells: Vec<(f64, f64, Option<f64>)> = (0..rows)
        .flat_map(|r| {
            (0..cols).map(move |c| {
                let value = matrix
                    .values
                    .get(r)
                    .and_then(|row| row.get(c))
                    .copied()
                    .flatten()
                    .filter(|v| v.is_finite());
                (c as f64, (rows - 1 - r) as f64, value)
            })
        })
        .collect();

    chart.draw_series(cells.iter().map(|(x, y, value)| {
        Rectangle::new(
            [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
            diverging_color(*value).filled(),
        )
    }))?;

    let style = fonts.style(9.0).pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(cells.iter().map(|(x, y, value)| {
        let text = match value {
            Some(v) => format!("{:.3}", v),
            None => "n/a".to_string(),
        };
        Text::new(text, (*x, *y), style.clone())
    }))?;
    Ok(())
}

fn draw_text_block<DB>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    lines: &[String],
    emphasis: TextEmphasis,
    fonts: &Fonts,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let inner = titled_area(area, &panel.title, fonts)?;
    let (w, h) = inner.dim_in_pixel();

    match emphasis {
        TextEmphasis::Headline => {
            let line_height = fonts.px(26.0) as i32;
            let top = h as i32 / 2 - line_height * (lines.len() as i32 - 1) / 2;
            let style = fonts.bold(20.0).pos(Pos::new(HPos::Center, VPos::Center));
            for (i, line) in lines.iter().enumerate() {
                inner.draw_text(line, &style, ((w / 2) as i32, top + line_height * i as i32))?;
            }
        }
        TextEmphasis::Monospace => {
            let pad = fonts.px(10.0) as i32;
            let line_height = fonts.px(13.0) as i32;
            let box_height = line_height * lines.len() as i32 + pad * 2;
            inner.draw(&Rectangle::new(
                [(pad / 2, pad / 2), (w as i32 - pad / 2, box_height.min(h as i32 - pad / 2))],
                RGBColor(245, 222, 179).mix(0.5).filled(),
            ))?;
            let style = fonts.mono(9.0).pos(Pos::new(HPos::Left, VPos::Top));
            for (i, line) in lines.iter().enumerate() {
                inner.draw_text(line, &style, (pad, pad + line_height * i as i32))?;
            }
        }
    }
    Ok(())
}
