//! Load-then-format entry points

use std::path::Path;

use crate::error::Result;
use crate::formatter::{FormatOptions, FormattedPrompt, format_ticker_data};
use crate::loader::load_ticker_data;

/// Load `data_dir/ticker/` and format it with default options
pub fn load_and_format(ticker: &str, data_dir: impl AsRef<Path>) -> Result<FormattedPrompt> {
    load_and_format_with(ticker, data_dir, &FormatOptions::default())
}

/// Load `data_dir/ticker/` and format it with `options`
pub fn load_and_format_with(
    ticker: &str,
    data_dir: impl AsRef<Path>,
    options: &FormatOptions,
) -> Result<FormattedPrompt> {
    options.validate()?;
    let data = load_ticker_data(ticker, data_dir.as_ref())?;
    Ok(format_ticker_data(&data, options))
}
