//! Dataset JSON to `ChartData` parser.

use serde_json::Value;
use timechart_core::{
    ChartData, ChartError, ChartOptions, Legend, RawLine, RawSlice, TimelineChart,
};

/// Parse a chart dataset from a JSON string.
pub fn parse_dataset_str(dataset_json: &str) -> Result<ChartData, ChartError> {
    let value: Value =
        serde_json::from_str(dataset_json).map_err(|err| ChartError::Parse(err.to_string()))?;
    parse_dataset_value(&value)
}

/// Parse a chart dataset from a `serde_json::Value`.
///
/// The expected shape is the widget's external input:
///
/// ```json
/// {
///   "legends": [{ "id": "...", "name": "...", "class": "..." }],
///   "lines": { "<line name>": [["legend", "HH:MM", "HH:MM"], ...] }
/// }
/// ```
///
/// Line order follows the key order of the `lines` object. Legends are
/// carried through as-is; missing legend fields default to empty strings.
pub fn parse_dataset_value(dataset: &Value) -> Result<ChartData, ChartError> {
    let legends = dataset
        .get("legends")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(parse_legend).collect())
        .unwrap_or_default();

    let lines_object = dataset
        .get("lines")
        .and_then(Value::as_object)
        .ok_or_else(|| ChartError::Parse("expected a lines object".to_string()))?;

    let mut lines = Vec::with_capacity(lines_object.len());
    for (name, slices) in lines_object {
        lines.push(parse_line(name, slices)?);
    }

    Ok(ChartData { legends, lines })
}

/// Parse the dataset and build a ready `TimelineChart` in one call.
pub fn chart_from_str(
    dataset_json: &str,
    options: &ChartOptions,
) -> Result<TimelineChart, ChartError> {
    let data = parse_dataset_str(dataset_json)?;
    TimelineChart::new(data, options)
}

fn parse_legend(entry: &Value) -> Legend {
    Legend {
        id: string_field(entry, "id"),
        name: string_field(entry, "name"),
        style_class: string_field(entry, "class"),
    }
}

fn string_field(entry: &Value, key: &str) -> String {
    entry
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn parse_line(name: &str, slices: &Value) -> Result<RawLine, ChartError> {
    let entries = slices
        .as_array()
        .ok_or_else(|| ChartError::Parse(format!("line {name} must be an array of slices")))?;

    let mut parsed = Vec::with_capacity(entries.len());
    for slice in entries {
        parsed.push(parse_slice(name, slice)?);
    }

    Ok(RawLine {
        name: name.to_string(),
        slices: parsed,
    })
}

fn parse_slice(line: &str, slice: &Value) -> Result<RawSlice, ChartError> {
    let triple = slice.as_array().filter(|parts| parts.len() == 3).ok_or_else(|| {
        ChartError::Parse(format!(
            "line {line}: each slice must be a [legend, start, end] triple"
        ))
    })?;

    let part = |index: usize| {
        triple[index]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ChartError::Parse(format!("line {line}: slice fields must be strings")))
    };

    Ok(RawSlice {
        legend: part(0)?,
        start: part(1)?,
        end: part(2)?,
    })
}
