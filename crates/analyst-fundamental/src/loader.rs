//! Dataset discovery and parsing
//!
//! Loads the seven files of one ticker directory into an
//! [`AggregatedTickerData`]. A missing or malformed file only makes its own
//! dataset absent; the load as a whole fails only when the directory is
//! missing or nothing at all could be read.

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::dataset::{
    AbsenceReason, AggregatedTickerData, DATASETS, DatasetContent, DatasetShape, DatasetSpec,
    RowOrder, ScalarMap, SourceDataset, SourceFormat, Table, TableRow,
};
use crate::error::{AnalystError, DatasetParseError, Result};

/// Cell values that mean "no value" in the collector output
const MISSING_TOKENS: [&str; 9] = ["", "nan", "NaN", "NAN", "None", "null", "NaT", "<NA>", "-"];

/// Load every dataset for `ticker` from `data_dir/ticker/`
pub fn load_ticker_data(ticker: &str, data_dir: &Path) -> Result<AggregatedTickerData> {
    let ticker = validate_ticker(ticker)?;
    let ticker_dir = data_dir.join(ticker);

    if !ticker_dir.is_dir() {
        return Err(AnalystError::DataNotFound {
            ticker: ticker.to_string(),
            reason: format!("directory {} does not exist", ticker_dir.display()),
        });
    }

    let datasets: Vec<SourceDataset> = DATASETS
        .iter()
        .map(|spec| load_dataset(spec, &ticker_dir))
        .collect();

    let data = AggregatedTickerData::new(ticker, &ticker_dir, datasets);

    if data.present_count() == 0 {
        return Err(AnalystError::DataNotFound {
            ticker: ticker.to_string(),
            reason: format!(
                "none of the {} expected data files could be loaded from {}",
                DATASETS.len(),
                ticker_dir.display()
            ),
        });
    }

    info!(
        ticker,
        present = data.present_count(),
        total = DATASETS.len(),
        "Loaded ticker data"
    );
    Ok(data)
}

/// Ticker directories directly under `data_dir`, sorted by name
pub fn discover_tickers(data_dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(data_dir).map_err(|e| AnalystError::io(data_dir, e))?;

    let mut tickers = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AnalystError::io(data_dir, e))?;
        if entry.path().is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                tickers.push(name.to_string());
            }
        }
    }

    tickers.sort();
    Ok(tickers)
}

fn validate_ticker(ticker: &str) -> Result<&str> {
    let ticker = ticker.trim();
    let valid = !ticker.is_empty()
        && ticker != "."
        && ticker != ".."
        && !ticker.contains(['/', '\\'])
        && !ticker.chars().any(char::is_control);

    if valid {
        Ok(ticker)
    } else {
        Err(AnalystError::InvalidTicker(ticker.to_string()))
    }
}

/// Load one dataset, downgrading every failure to an absent marker
fn load_dataset(spec: &DatasetSpec, ticker_dir: &Path) -> SourceDataset {
    let path = ticker_dir.join(spec.file_name);

    if !path.is_file() {
        debug!(dataset = spec.name, path = %path.display(), "Dataset file not found");
        return SourceDataset::absent(spec.kind, None, AbsenceReason::FileNotFound);
    }

    match parse_dataset(spec, &path) {
        Ok(content) => {
            debug!(dataset = spec.name, path = %path.display(), "Dataset loaded");
            SourceDataset::present(spec.kind, path, content)
        }
        Err(err) => {
            warn!(dataset = spec.name, error = %err, "Skipping unparsable dataset");
            SourceDataset::absent(spec.kind, Some(path), AbsenceReason::Unparsable(err.reason))
        }
    }
}

/// Parse one file according to its table entry
pub fn parse_dataset(spec: &DatasetSpec, path: &Path) -> std::result::Result<DatasetContent, DatasetParseError> {
    let fail = |reason: String| DatasetParseError::new(spec.kind, path, reason);

    match (spec.format, spec.shape) {
        (SourceFormat::Json, DatasetShape::ScalarMap) => {
            let text = std::fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
            parse_json_object(&text).map(DatasetContent::ScalarMap).map_err(fail)
        }
        (SourceFormat::Csv, DatasetShape::ScalarMap) => read_table(path)
            .map(|table| DatasetContent::ScalarMap(table_to_scalar_map(&table)))
            .map_err(fail),
        (SourceFormat::Csv, DatasetShape::Tabular) => {
            let mut table = read_table(path).map_err(fail)?;
            if spec.row_order == RowOrder::DateAscending {
                sort_rows_by_date(&mut table);
            }
            Ok(DatasetContent::Tabular(table))
        }
        (SourceFormat::Json, DatasetShape::Tabular) => {
            Err(fail("JSON tables are not supported".to_string()))
        }
    }
}

/// Top-level keys of a JSON object, in file order
fn parse_json_object(text: &str) -> std::result::Result<ScalarMap, String> {
    let value: Value = serde_json::from_str(text).map_err(|e| format!("invalid JSON: {e}"))?;

    let Value::Object(object) = value else {
        return Err("expected a JSON object at the top level".to_string());
    };
    if object.is_empty() {
        return Err("JSON object has no fields".to_string());
    }

    Ok(object
        .into_iter()
        .map(|(key, value)| (key, json_scalar(value)))
        .collect())
}

fn json_scalar(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => normalize_cell(&s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested @ (Value::Array(_) | Value::Object(_)) => Some(nested.to_string()),
    }
}

/// Read a CSV written with its index as the first column
fn read_table(path: &Path) -> std::result::Result<Table, String> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    let mut records = reader.records();

    let mut header: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(|e| format!("CSV parse error: {e}"))?
            .iter()
            .map(collapse_whitespace)
            .collect(),
        None => return Err("file is empty".to_string()),
    };

    if header.len() < 2 {
        return Err(format!(
            "expected a label column and at least one value column, found {} column(s)",
            header.len()
        ));
    }

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for (idx, record) in records.enumerate() {
        // +2: header is line 1, records are 1-based
        let line = idx + 2;
        let record = record.map_err(|e| format!("CSV parse error on line {line}: {e}"))?;

        if record.len() > header.len() {
            return Err(format!(
                "line {line} has {} fields but the header has {}",
                record.len(),
                header.len()
            ));
        }
        raw_rows.push(record.iter().map(collapse_whitespace).collect());
    }

    if raw_rows.is_empty() {
        return Err("no data rows".to_string());
    }

    if has_positional_index(&header, &raw_rows) {
        header.remove(0);
        for row in &mut raw_rows {
            row.remove(0);
        }
    }

    let mut header = header.into_iter();
    let index_header = header.next().unwrap_or_default();
    let columns: Vec<String> = header.collect();

    let rows = raw_rows
        .into_iter()
        .map(|row| {
            let mut fields = row.into_iter();
            let label = fields.next().unwrap_or_default();
            TableRow {
                label,
                cells: fields.map(|f| normalize_cell(&f)).collect(),
            }
        })
        .collect();

    Ok(Table::new(index_header, columns, rows))
}

/// A pandas RangeIndex written as the first column: unnamed, and row `i` is labelled `i`
fn has_positional_index(header: &[String], rows: &[Vec<String>]) -> bool {
    header.len() > 2
        && header[0].is_empty()
        && rows
            .iter()
            .enumerate()
            .all(|(i, row)| row.first().is_some_and(|label| *label == i.to_string()))
}

/// Key = row label, value = remaining cells
fn table_to_scalar_map(table: &Table) -> ScalarMap {
    table
        .rows()
        .iter()
        .map(|row| {
            let values: Vec<&str> = row.cells.iter().flatten().map(String::as_str).collect();
            let value = if values.is_empty() {
                None
            } else {
                Some(values.join(", "))
            };
            (row.label.clone(), value)
        })
        .collect()
}

/// One space between words; embedded newlines and tabs included
fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> Option<String> {
    let collapsed = collapse_whitespace(raw);
    if MISSING_TOKENS.contains(&collapsed.as_str()) {
        None
    } else {
        Some(collapsed)
    }
}

/// Stable ascending sort, applied only when every label is a date
fn sort_rows_by_date(table: &mut Table) {
    let dates: Option<Vec<NaiveDate>> = table.rows().iter().map(|r| parse_date(&r.label)).collect();
    let Some(dates) = dates else {
        return;
    };

    let mut keyed: Vec<(NaiveDate, TableRow)> = dates.into_iter().zip(table.rows_mut().drain(..)).collect();
    keyed.sort_by_key(|(date, _)| *date);
    table.rows_mut().extend(keyed.into_iter().map(|(_, row)| row));
}

fn parse_date(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    NaiveDate::parse_from_str(label, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(label, "%m/%d/%Y"))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(label, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            // Timestamps with an offset, e.g. "2024-09-30 00:00:00-04:00"
            label
                .get(..10)
                .filter(|_| label.len() > 10 && label.as_bytes()[10] == b' ')
                .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        })
}
