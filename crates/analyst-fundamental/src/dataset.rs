//! Dataset catalogue and the normalized per-ticker record
//!
//! Every ticker directory is expected to hold up to seven files. Each one maps
//! to a [`DatasetKind`] whose [`DatasetSpec`] fixes the file name, the section
//! title, the parsed shape and the row ordering rule. The loader and the
//! formatter both dispatch on this table and nothing else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Logical datasets, in the order their sections appear in the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    TickerInfo,
    FinvizKeyStats,
    YfinanceKeyStats,
    HistoricalStats,
    BalanceSheet,
    IncomeStatement,
    CashFlow,
}

/// Parsed shape of a present dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetShape {
    /// Flat key → value entries
    ScalarMap,
    /// Rows × columns, first column is the row label
    Tabular,
}

/// On-disk encoding of a dataset file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
}

/// How the loader orders table rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    /// Keep file order
    AsParsed,
    /// Sort ascending when every row label is a date, else keep file order
    DateAscending,
}

/// Static description of one dataset
#[derive(Debug, Clone, Copy)]
pub struct DatasetSpec {
    pub kind: DatasetKind,
    pub name: &'static str,
    pub file_name: &'static str,
    pub title: &'static str,
    pub shape: DatasetShape,
    pub format: SourceFormat,
    pub row_order: RowOrder,
    /// Columns are reporting periods, most recent first
    pub periodic: bool,
}

/// The dataset table, in section order
pub const DATASETS: [DatasetSpec; 7] = [
    DatasetSpec {
        kind: DatasetKind::TickerInfo,
        name: "ticker_info",
        file_name: "yfinance_TickerInfo.json",
        title: "Company Information",
        shape: DatasetShape::ScalarMap,
        format: SourceFormat::Json,
        row_order: RowOrder::AsParsed,
        periodic: false,
    },
    DatasetSpec {
        kind: DatasetKind::FinvizKeyStats,
        name: "finviz_key_stats",
        file_name: "finviz_KeyFinanceStat_finviz.csv",
        title: "Key Financial Statistics (Finviz)",
        shape: DatasetShape::ScalarMap,
        format: SourceFormat::Csv,
        row_order: RowOrder::AsParsed,
        periodic: false,
    },
    DatasetSpec {
        kind: DatasetKind::YfinanceKeyStats,
        name: "yfinance_key_stats",
        // Upstream collector spells it this way
        file_name: "yfinance_KeyFinanceStat_yfiance.csv",
        title: "Key Financial Statistics (Yahoo Finance)",
        shape: DatasetShape::ScalarMap,
        format: SourceFormat::Csv,
        row_order: RowOrder::AsParsed,
        periodic: false,
    },
    DatasetSpec {
        kind: DatasetKind::HistoricalStats,
        name: "historical_stats",
        file_name: "yfinance_HistoricalStat.csv",
        title: "Historical Valuation Metrics",
        shape: DatasetShape::Tabular,
        format: SourceFormat::Csv,
        row_order: RowOrder::DateAscending,
        periodic: false,
    },
    DatasetSpec {
        kind: DatasetKind::BalanceSheet,
        name: "balance_sheet",
        file_name: "yfinance_FinancialReport_Balance_Sheet.csv",
        title: "Balance Sheet (Annual)",
        shape: DatasetShape::Tabular,
        format: SourceFormat::Csv,
        row_order: RowOrder::AsParsed,
        periodic: true,
    },
    DatasetSpec {
        kind: DatasetKind::IncomeStatement,
        name: "income_statement",
        file_name: "yfinance_FinancialReport_Income_Statement.csv",
        title: "Income Statement (Annual)",
        shape: DatasetShape::Tabular,
        format: SourceFormat::Csv,
        row_order: RowOrder::AsParsed,
        periodic: true,
    },
    DatasetSpec {
        kind: DatasetKind::CashFlow,
        name: "cash_flow",
        file_name: "yfinance_FinancialReport_Cash_Flow.csv",
        title: "Cash Flow Statement (Annual)",
        shape: DatasetShape::Tabular,
        format: SourceFormat::Csv,
        row_order: RowOrder::AsParsed,
        periodic: true,
    },
];

impl DatasetKind {
    /// All kinds in section order
    pub const ALL: [DatasetKind; 7] = [
        DatasetKind::TickerInfo,
        DatasetKind::FinvizKeyStats,
        DatasetKind::YfinanceKeyStats,
        DatasetKind::HistoricalStats,
        DatasetKind::BalanceSheet,
        DatasetKind::IncomeStatement,
        DatasetKind::CashFlow,
    ];

    /// Static description of this dataset
    pub fn spec(self) -> &'static DatasetSpec {
        &DATASETS[self as usize]
    }

    /// Logical name, e.g. `balance_sheet`
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Look a kind up by its logical name
    pub fn from_name(name: &str) -> Option<Self> {
        DATASETS.iter().find(|s| s.name == name).map(|s| s.kind)
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered key → value entries; `None` marks a missing value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScalarMap {
    entries: Vec<(String, Option<String>)>,
}

impl ScalarMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: Option<String>) {
        self.entries.push((key.into(), value));
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for ScalarMap {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// One table row: a label plus exactly one cell per column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub label: String,
    pub cells: Vec<Option<String>>,
}

/// A parsed table whose rows all have `columns.len()` cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    index_header: String,
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl Table {
    /// Build a table, padding short rows with missing cells
    ///
    /// Rows wider than the header are cut to the header width; the loader
    /// rejects those before getting here.
    pub fn new(index_header: impl Into<String>, columns: Vec<String>, rows: Vec<TableRow>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.cells.resize(width, None);
                row
            })
            .collect();

        Self {
            index_header: index_header.into(),
            columns,
            rows,
        }
    }

    /// Header cell above the row labels (often empty)
    pub fn index_header(&self) -> &str {
        &self.index_header
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Copy restricted to the first `n` columns
    pub fn first_columns(&self, n: usize) -> Self {
        let n = n.min(self.columns.len());
        Self {
            index_header: self.index_header.clone(),
            columns: self.columns[..n].to_vec(),
            rows: self
                .rows
                .iter()
                .map(|row| TableRow {
                    label: row.label.clone(),
                    cells: row.cells[..n].to_vec(),
                })
                .collect(),
        }
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<TableRow> {
        &mut self.rows
    }
}

/// Why a dataset is absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AbsenceReason {
    /// The expected file does not exist
    FileNotFound,
    /// The file exists but could not be parsed
    Unparsable(String),
}

impl fmt::Display for AbsenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound => f.write_str("file not found"),
            Self::Unparsable(reason) => write!(f, "unparsable: {reason}"),
        }
    }
}

/// Parsed payload of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DatasetContent {
    ScalarMap(ScalarMap),
    Tabular(Table),
    Absent(AbsenceReason),
}

/// One named, independently loaded unit of input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDataset {
    pub kind: DatasetKind,
    pub origin_path: Option<PathBuf>,
    pub content: DatasetContent,
}

impl SourceDataset {
    pub fn present(kind: DatasetKind, origin_path: impl Into<PathBuf>, content: DatasetContent) -> Self {
        Self {
            kind,
            origin_path: Some(origin_path.into()),
            content,
        }
    }

    pub fn absent(kind: DatasetKind, origin_path: Option<PathBuf>, reason: AbsenceReason) -> Self {
        Self {
            kind,
            origin_path,
            content: DatasetContent::Absent(reason),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Shape of the payload, `None` when absent
    pub fn shape(&self) -> Option<DatasetShape> {
        match self.content {
            DatasetContent::ScalarMap(_) => Some(DatasetShape::ScalarMap),
            DatasetContent::Tabular(_) => Some(DatasetShape::Tabular),
            DatasetContent::Absent(_) => None,
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self.content, DatasetContent::Absent(_))
    }

    pub fn absence_reason(&self) -> Option<&AbsenceReason> {
        match &self.content {
            DatasetContent::Absent(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Everything loaded for one ticker: exactly one dataset per [`DatasetKind`]
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedTickerData {
    ticker: String,
    ticker_dir: PathBuf,
    datasets: Vec<SourceDataset>,
}

impl AggregatedTickerData {
    /// Assemble the record; kinds not supplied are marked absent
    ///
    /// If a kind is supplied twice the first one wins.
    pub fn new(ticker: impl Into<String>, ticker_dir: impl Into<PathBuf>, datasets: Vec<SourceDataset>) -> Self {
        let mut slots: Vec<Option<SourceDataset>> = vec![None; DATASETS.len()];
        for dataset in datasets {
            let slot = &mut slots[dataset.kind as usize];
            if slot.is_none() {
                *slot = Some(dataset);
            }
        }

        let datasets = slots
            .into_iter()
            .zip(DatasetKind::ALL)
            .map(|(slot, kind)| {
                slot.unwrap_or_else(|| SourceDataset::absent(kind, None, AbsenceReason::FileNotFound))
            })
            .collect();

        Self {
            ticker: ticker.into(),
            ticker_dir: ticker_dir.into(),
            datasets,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn ticker_dir(&self) -> &Path {
        &self.ticker_dir
    }

    /// All seven datasets in section order
    pub fn datasets(&self) -> &[SourceDataset] {
        &self.datasets
    }

    pub fn get(&self, kind: DatasetKind) -> &SourceDataset {
        &self.datasets[kind as usize]
    }

    pub fn present_count(&self) -> usize {
        self.datasets.iter().filter(|d| d.is_present()).count()
    }

    pub fn absent(&self) -> impl Iterator<Item = &SourceDataset> {
        self.datasets.iter().filter(|d| !d.is_present())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_kind_order() {
        for (idx, spec) in DATASETS.iter().enumerate() {
            assert_eq!(spec.kind as usize, idx);
            assert_eq!(DatasetKind::ALL[idx], spec.kind);
            assert_eq!(DatasetKind::from_name(spec.name), Some(spec.kind));
        }
    }

    #[test]
    fn test_file_names_are_unique() {
        let mut names: Vec<_> = DATASETS.iter().map(|s| s.file_name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DATASETS.len());
    }

    #[test]
    fn test_table_pads_short_rows() {
        let table = Table::new(
            "",
            vec!["2024".to_string(), "2023".to_string()],
            vec![TableRow {
                label: "Total Assets".to_string(),
                cells: vec![Some("100".to_string())],
            }],
        );
        assert_eq!(table.rows()[0].cells, vec![Some("100".to_string()), None]);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_first_columns() {
        let table = Table::new(
            "",
            vec!["a".into(), "b".into(), "c".into()],
            vec![TableRow {
                label: "x".into(),
                cells: vec![Some("1".into()), Some("2".into()), Some("3".into())],
            }],
        );

        let cut = table.first_columns(2);
        assert_eq!(cut.columns(), ["a", "b"]);
        assert_eq!(cut.rows()[0].cells.len(), 2);
        assert_eq!(table.first_columns(10).column_count(), 3);
    }

    #[test]
    fn test_aggregated_fills_missing_kinds() {
        let info: ScalarMap = [("sector", Some("Technology".to_string()))].into_iter().collect();
        let data = AggregatedTickerData::new(
            "AAPL",
            "/data/AAPL",
            vec![SourceDataset::present(
                DatasetKind::TickerInfo,
                "/data/AAPL/yfinance_TickerInfo.json",
                DatasetContent::ScalarMap(info),
            )],
        );

        assert_eq!(data.datasets().len(), 7);
        assert_eq!(data.present_count(), 1);
        assert_eq!(data.get(DatasetKind::TickerInfo).shape(), Some(DatasetShape::ScalarMap));
        assert_eq!(
            data.get(DatasetKind::CashFlow).absence_reason(),
            Some(&AbsenceReason::FileNotFound)
        );
        assert_eq!(data.absent().count(), 6);
    }

    #[test]
    fn test_scalar_map_lookup() {
        let mut map = ScalarMap::new();
        map.push("P/E", Some("31.2".to_string()));
        map.push("Dividend", None);

        assert_eq!(map.get("P/E"), Some(Some("31.2")));
        assert_eq!(map.get("Dividend"), Some(None));
        assert_eq!(map.get("Beta"), None);
        assert_eq!(map.len(), 2);
    }
}
