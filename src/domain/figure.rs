//! Backend-independent description of a chart figure.
//!
//! Application code assembles a [`Figure`] out of [`Panel`]s placed on a grid; the
//! plotting backend turns it into pixels. Keeping the description as plain data lets
//! the chart contents be checked without rendering anything.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const BLUE: Rgb = Rgb(31, 119, 180);
    pub const GREEN: Rgb = Rgb(44, 160, 44);
    pub const RED: Rgb = Rgb(214, 39, 40);
    pub const ORANGE: Rgb = Rgb(255, 165, 0);
    pub const PURPLE: Rgb = Rgb(128, 0, 128);
    pub const SKYBLUE: Rgb = Rgb(135, 206, 235);
    pub const LIGHTSKYBLUE: Rgb = Rgb(135, 206, 250);
    pub const LIGHTCORAL: Rgb = Rgb(240, 128, 128);
    pub const LIGHTGREEN: Rgb = Rgb(144, 238, 144);
    pub const SALMON: Rgb = Rgb(250, 128, 114);
    pub const GREY: Rgb = Rgb(200, 200, 200);

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Default colours for unstyled series, in assignment order.
pub const SERIES_PALETTE: [Rgb; 6] = [
    Rgb(247, 112, 136),
    Rgb(80, 177, 49),
    Rgb(54, 162, 235),
    Rgb(206, 143, 49),
    Rgb(163, 110, 247),
    Rgb(52, 174, 150),
];

/// Qualitative palette for one-line-per-parameter charts.
pub const SET1: [Rgb; 9] = [
    Rgb(228, 26, 28),
    Rgb(55, 126, 184),
    Rgb(77, 175, 74),
    Rgb(152, 78, 163),
    Rgb(255, 127, 0),
    Rgb(255, 255, 51),
    Rgb(166, 86, 40),
    Rgb(247, 129, 191),
    Rgb(153, 153, 153),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    None,
    Circle,
    Square,
    Triangle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
    pub color: Rgb,
    pub marker: Marker,
}

impl Series {
    pub fn new(label: &str, points: Vec<(f64, f64)>, color: Rgb) -> Self {
        Self {
            label: Some(label.to_string()),
            points,
            color,
            marker: Marker::None,
        }
    }

    pub fn unlabeled(points: Vec<(f64, f64)>, color: Rgb) -> Self {
        Self {
            label: None,
            points,
            color,
            marker: Marker::None,
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = marker;
        self
    }
}

/// One band of a stacked area chart; bands are stacked in order.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaLayer {
    pub label: String,
    pub values: Vec<f64>,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bars {
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    pub color: Rgb,
    pub orientation: Orientation,
    /// Print each value (3 decimals) next to its bar
    pub value_labels: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub values: Vec<f64>,
    pub bins: usize,
    pub color: Rgb,
    /// Overlay mean and one-standard-deviation markers
    pub show_stats: bool,
}

/// Grid of optional values with row and column labels. `None` marks an undefined cell.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEmphasis {
    /// Large bold text centred in the panel
    Headline,
    /// Small fixed-width block, left aligned
    Monospace,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelKind {
    Lines {
        series: Vec<Series>,
        y_range: Option<(f64, f64)>,
    },
    StackedArea {
        x: Vec<f64>,
        layers: Vec<AreaLayer>,
    },
    Bars(Bars),
    Pie(Vec<Slice>),
    Histogram(Histogram),
    Heatmap(LabeledMatrix),
    Text {
        lines: Vec<String>,
        emphasis: TextEmphasis,
    },
}

/// Position of a panel on the figure grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
}

impl Cell {
    pub fn at(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            row_span: 1,
            col_span: 1,
        }
    }

    pub fn spanning(row: usize, col: usize, row_span: usize, col_span: usize) -> Self {
        Self {
            row,
            col,
            row_span,
            col_span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub cell: Cell,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: PanelKind,
}

impl Panel {
    pub fn new(cell: Cell, title: &str, kind: PanelKind) -> Self {
        Self {
            cell,
            title: title.to_string(),
            x_label: String::new(),
            y_label: String::new(),
            kind,
        }
    }

    pub fn with_axes(mut self, x_label: &str, y_label: &str) -> Self {
        self.x_label = x_label.to_string();
        self.y_label = y_label.to_string();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: Option<String>,
    /// Width and height in inches; pixel size is this times the configured DPI
    pub size_inches: (f64, f64),
    pub rows: usize,
    pub cols: usize,
    pub panels: Vec<Panel>,
}

impl Figure {
    pub fn new(rows: usize, cols: usize, size_inches: (f64, f64)) -> Self {
        Self {
            title: None,
            size_inches,
            rows: rows.max(1),
            cols: cols.max(1),
            panels: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn push(&mut self, panel: Panel) {
        self.panels.push(panel);
    }

    pub fn panel(&self, title: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.title == title)
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}

/// Formats a value rounded to whole units with comma thousands separators.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value.is_sign_negative() {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(1234567.89), "1,234,568");
        assert_eq!(format_thousands(-25000.0), "-25,000");
        assert_eq!(format_thousands(-0.2), "-0");
        assert_eq!(format_thousands(0.4), "0");
    }

    #[test]
    fn test_hex() {
        assert_eq!(Rgb::SKYBLUE.hex(), "#87ceeb");
        assert_eq!(Rgb::BLACK.hex(), "#000000");
    }

    #[test]
    fn test_figure_lookup() {
        let mut figure = Figure::new(0, 2, (12.0, 10.0)).with_title("Demo");
        assert_eq!(figure.rows, 1);
        assert!(figure.is_empty());
        figure.push(Panel::new(
            Cell::at(0, 1),
            "Revenue",
            PanelKind::Lines {
                series: vec![Series::new("Revenue", vec![(0.0, 1.0)], Rgb::GREEN)],
                y_range: None,
            },
        ));
        assert!(figure.panel("Revenue").is_some());
        assert!(figure.panel("Cost").is_none());
    }
}
