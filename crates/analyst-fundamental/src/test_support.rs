//! On-disk fixtures shaped like the collector output

use std::path::{Path, PathBuf};

pub(crate) const TICKER_INFO: &str = r#"{
  "longBusinessSummary": "Apple Inc. designs, manufactures, and markets smartphones, personal computers, tablets, wearables, and accessories worldwide.",
  "sector": "Technology",
  "industry": "Consumer Electronics"
}"#;

pub(crate) const FINVIZ_KEY_STATS: &str = "\
,Stat,Value
0,Market Cap,3.75T
1,P/E,37.52
2,Forward P/E,32.10
3,Dividend %,0.41%
";

pub(crate) const YFINANCE_KEY_STATS: &str = "\
,Stat,Value
0,Beta (5Y Monthly),1.24
1,52 Week High,260.10
2,Shares Outstanding,14.84B
";

pub(crate) const HISTORICAL_STATS: &str = "\
Date,Market Cap,Trailing P/E,Price/Book
2024-06-30,3.30T,32.5,47.1
2024-09-30,3.50T,38.0,52.3
2024-12-31,3.78T,37.9,60.1
";

/// Three line items × two periods
pub(crate) const BALANCE_SHEET: &str = "\
,2024-09-30,2023-09-30
Total Assets,364980000000.0,352583000000.0
Total Debt,106629000000.0,111088000000.0
Stockholders Equity,56950000000.0,62146000000.0
";

pub(crate) const INCOME_STATEMENT: &str = "\
,2024-09-30,2023-09-30,2022-09-30,2021-09-30
Total Revenue,391035000000.0,383285000000.0,394328000000.0,365817000000.0
Net Income,93736000000.0,96995000000.0,99803000000.0,94680000000.0
";

pub(crate) const CASH_FLOW: &str = "\
,2024-09-30,2023-09-30
Operating Cash Flow,118254000000.0,110543000000.0
Free Cash Flow,108807000000.0,99584000000.0
";

/// Write `contents` to `data_dir/ticker/file_name`, creating directories
pub(crate) fn write_file(data_dir: &Path, ticker: &str, file_name: &str, contents: &str) -> PathBuf {
    let dir = data_dir.join(ticker);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(file_name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Write all seven well-formed files for `ticker`
pub(crate) fn write_complete_set(data_dir: &Path, ticker: &str) {
    write_file(data_dir, ticker, "yfinance_TickerInfo.json", TICKER_INFO);
    write_file(data_dir, ticker, "finviz_KeyFinanceStat_finviz.csv", FINVIZ_KEY_STATS);
    write_file(data_dir, ticker, "yfinance_KeyFinanceStat_yfiance.csv", YFINANCE_KEY_STATS);
    write_file(data_dir, ticker, "yfinance_HistoricalStat.csv", HISTORICAL_STATS);
    write_file(data_dir, ticker, "yfinance_FinancialReport_Balance_Sheet.csv", BALANCE_SHEET);
    write_file(data_dir, ticker, "yfinance_FinancialReport_Income_Statement.csv", INCOME_STATEMENT);
    write_file(data_dir, ticker, "yfinance_FinancialReport_Cash_Flow.csv", CASH_FLOW);
}
