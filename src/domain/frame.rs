//! Column-oriented table built from report time series or CSV exports.
//!
//! Numeric columns store `f64` with `NaN` marking a missing cell. Any column holding a
//! value that does not parse as a number is kept as text.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::io;

/// Column name used as the x axis of every time-series chart.
pub const TIME_STEP: &str = "TimeStep";

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(&self, mask: &[bool]) -> Column {
        match self {
            Column::Numeric(values) => Column::Numeric(
                values
                    .iter()
                    .zip(mask)
                    .filter(|(_, keep)| **keep)
                    .map(|(v, _)| *v)
                    .collect(),
            ),
            Column::Text(values) => Column::Text(
                values
                    .iter()
                    .zip(mask)
                    .filter(|(_, keep)| **keep)
                    .map(|(v, _)| v.clone())
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone)]
enum Cell {
    Num(f64),
    Text(String),
}

#[derive(Debug, Clone, Default)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
    rows: usize,
}

impl Frame {
    /// Builds a frame from JSON objects, flattening nested objects into dotted names
    /// such as `Workforce.Humans.Total`.
    pub fn from_records(records: &[Value]) -> Self {
        let mut order: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut rows: Vec<HashMap<String, Cell>> = Vec::with_capacity(records.len());

        for record in records {
            let mut cells = Vec::new();
            if let Value::Object(_) = record {
                flatten_value("", record, &mut cells);
            }
            let mut row = HashMap::with_capacity(cells.len());
            for (key, cell) in cells {
                if seen.insert(key.clone()) {
                    order.push(key.clone());
                }
                row.insert(key, cell);
            }
            rows.push(row);
        }

        let mut frame = Frame {
            rows: rows.len(),
            ..Default::default()
        };
        for name in order {
            let numeric = rows
                .iter()
                .all(|row| !matches!(row.get(&name), Some(Cell::Text(_))));
            let column = if numeric {
                Column::Numeric(
                    rows.iter()
                        .map(|row| match row.get(&name) {
                            Some(Cell::Num(v)) => *v,
                            _ => f64::NAN,
                        })
                        .collect(),
                )
            } else {
                Column::Text(
                    rows.iter()
                        .map(|row| match row.get(&name) {
                            Some(Cell::Num(v)) => v.to_string(),
                            Some(Cell::Text(s)) => s.clone(),
                            None => String::new(),
                        })
                        .collect(),
                )
            };
            frame.names.push(name);
            frame.columns.push(column);
        }
        frame
    }

    /// Reads a headed CSV. A column is numeric when every non-empty cell parses as a
    /// number or a boolean.
    pub fn from_csv_reader<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Self, csv::Error> {
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        let mut rows = 0;

        for record in reader.records() {
            let record = record?;
            for (idx, column) in raw.iter_mut().enumerate() {
                column.push(record.get(idx).unwrap_or("").trim().to_string());
            }
            rows += 1;
        }

        let mut frame = Frame {
            rows,
            ..Default::default()
        };
        for (name, cells) in headers.into_iter().zip(raw) {
            let numeric = cells
                .iter()
                .all(|c| c.is_empty() || parse_numeric(c).is_some());
            let column = if numeric {
                Column::Numeric(
                    cells
                        .iter()
                        .map(|c| parse_numeric(c).unwrap_or(f64::NAN))
                        .collect(),
                )
            } else {
                Column::Text(cells)
            };
            frame.names.push(name);
            frame.columns.push(column);
        }
        Ok(frame)
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|idx| &self.columns[idx])
    }

    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        match self.column(name)? {
            Column::Numeric(values) => Some(values),
            Column::Text(_) => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&[String]> {
        match self.column(name)? {
            Column::Text(values) => Some(values),
            Column::Numeric(_) => None,
        }
    }

    /// First numeric column among `aliases`, together with the alias that matched.
    pub fn first_numeric<'a>(&self, aliases: &[&'a str]) -> Option<(&'a str, &[f64])> {
        aliases
            .iter()
            .find_map(|alias| self.numeric(alias).map(|values| (*alias, values)))
    }

    /// Values of `TimeStep`, or the row index when the column is absent.
    pub fn time_axis(&self) -> Vec<f64> {
        match self.numeric(TIME_STEP) {
            Some(values) => values.to_vec(),
            None => (0..self.rows).map(|i| i as f64).collect(),
        }
    }

    /// Distinct values of a text column in first-seen order.
    pub fn distinct_text(&self, name: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        if let Some(values) = self.text(name) {
            for value in values {
                if !value.is_empty() && !out.contains(value) {
                    out.push(value.clone());
                }
            }
        }
        out
    }

    pub fn filter_rows(&self, mask: &[bool]) -> Frame {
        Frame {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.select(mask)).collect(),
            rows: mask.iter().take(self.rows).filter(|keep| **keep).count(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

fn parse_numeric(raw: &str) -> Option<f64> {
    if let Ok(v) = raw.parse::<f64>() {
        return Some(v);
    }
    match raw.to_ascii_lowercase().as_str() {
        "true" => Some(1.0),
        "false" => Some(0.0),
        _ => None,
    }
}

fn flatten_value(prefix: &str, value: &Value, out: &mut Vec<(String, Cell)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_value(&name, child, out);
            }
        }
        Value::Number(n) => {
            if let Some(v) = n.as_f64() {
                out.push((prefix.to_string(), Cell::Num(v)));
            }
        }
        Value::Bool(b) => out.push((prefix.to_string(), Cell::Num(if *b { 1.0 } else { 0.0 }))),
        Value::String(s) => out.push((prefix.to_string(), Cell::Text(s.clone()))),
        Value::Null | Value::Array(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_are_flattened_with_dotted_names() {
        let records = vec![
            json!({"TimeStep": 0, "Workforce": {"Humans": {"Total": 100}, "AIAgents": {"Total": 0}}, "IsEquilibrium": false}),
            json!({"TimeStep": 1, "Workforce": {"Humans": {"Total": 95}, "AIAgents": {"Total": 6}}, "IsEquilibrium": true}),
        ];
        let frame = Frame::from_records(&records);

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.numeric("Workforce.Humans.Total"), Some(&[100.0, 95.0][..]));
        assert_eq!(frame.numeric("Workforce.AIAgents.Total"), Some(&[0.0, 6.0][..]));
        assert_eq!(frame.numeric("IsEquilibrium"), Some(&[0.0, 1.0][..]));
    }

    #[test]
    fn test_missing_record_keys_become_nan() {
        let records = vec![json!({"TimeStep": 0, "RevenueOutput": 10.0}), json!({"TimeStep": 1})];
        let frame = Frame::from_records(&records);
        let revenue = frame.numeric("RevenueOutput").unwrap();
        assert_eq!(revenue[0], 10.0);
        assert!(revenue[1].is_nan());
    }

    #[test]
    fn test_csv_column_typing() {
        let data = "ParameterName,ParameterValue,IsEquilibrium\nFixedBudget,1000.5,true\nNaturalRate,,false\n";
        let reader = csv::Reader::from_reader(data.as_bytes());
        let frame = Frame::from_csv_reader(reader).unwrap();

        assert_eq!(frame.len(), 2);
        assert!(frame.text("ParameterName").is_some());
        assert!(frame.numeric("ParameterName").is_none());
        let values = frame.numeric("ParameterValue").unwrap();
        assert_eq!(values[0], 1000.5);
        assert!(values[1].is_nan());
        assert_eq!(frame.numeric("IsEquilibrium"), Some(&[1.0, 0.0][..]));
    }

    #[test]
    fn test_first_numeric_prefers_earlier_alias() {
        let data = "TotalHumans,HumanCount\n5,7\n";
        let frame = Frame::from_csv_reader(csv::Reader::from_reader(data.as_bytes())).unwrap();
        let (name, values) = frame
            .first_numeric(&["Workforce.Humans.Total", "TotalHumans", "HumanCount"])
            .unwrap();
        assert_eq!(name, "TotalHumans");
        assert_eq!(values, &[5.0]);
    }

    #[test]
    fn test_time_axis_falls_back_to_row_index() {
        let data = "RevenueOutput\n1\n2\n3\n";
        let frame = Frame::from_csv_reader(csv::Reader::from_reader(data.as_bytes())).unwrap();
        assert_eq!(frame.time_axis(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_filter_rows_and_distinct_text() {
        let data = "ParameterName,ParameterValue\nA,1\nB,2\nA,3\n";
        let frame = Frame::from_csv_reader(csv::Reader::from_reader(data.as_bytes())).unwrap();
        assert_eq!(frame.distinct_text("ParameterName"), vec!["A", "B"]);

        let names = frame.text("ParameterName").unwrap();
        let mask: Vec<bool> = names.iter().map(|n| n == "A").collect();
        let only_a = frame.filter_rows(&mask);
        assert_eq!(only_a.len(), 2);
        assert_eq!(only_a.numeric("ParameterValue"), Some(&[1.0, 3.0][..]));
    }
}
