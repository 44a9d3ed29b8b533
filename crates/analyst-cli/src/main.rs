//! Command-line interface for the fundamental analyst
//!
//! ```bash
//! export OPENROUTER_API_KEY="sk-or-..."
//! fundamental-analyst analyze AAPL --data-dir data/raw/20251230_100857
//! fundamental-analyst batch AAPL MSFT GOOGL --data-dir data/raw/20251230_100857 --output-dir reports
//! fundamental-analyst prompt AAPL --data-dir data/raw/20251230_100857 --max-periods 3
//! fundamental-analyst scan --data-dir data/raw/20251230_100857
//! ```

use analyst_fundamental::{
    AbsentPolicy, AnalystConfig, AnalystError, FormatOptions, FundamentalAnalyst, discover_tickers,
    load_and_format_with, load_ticker_data, run_batch,
};
use analyst_utils::LoggingConfig;
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "fundamental-analyst", version)]
#[command(about = "LLM fundamental analysis reports from collected ticker data", long_about = None)]
struct Cli {
    /// Debug logging for the analyst crates
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit log records as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one ticker and save the Markdown report
    Analyze {
        /// Ticker symbol (e.g., AAPL)
        ticker: String,

        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        model: ModelArgs,

        /// Report directory. Defaults to <data root>/output/<timestamp>/analyst/fundamental.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Analyze several tickers one after another
    Batch {
        /// Ticker symbols
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        tickers: Vec<String>,

        /// Analyze every ticker directory under --data-dir
        #[arg(long, default_value_t = false)]
        all: bool,

        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        model: ModelArgs,

        /// Directory shared by all reports
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the formatted data document without calling the model
    Prompt {
        /// Ticker symbol
        ticker: String,

        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        format: FormatArgs,
    },
    /// List ticker directories and the datasets each one holds
    Scan {
        #[command(flatten)]
        data: DataArgs,
    },
}

#[derive(Args, Debug)]
struct DataArgs {
    /// Directory holding one sub-directory per ticker
    #[arg(long)]
    data_dir: PathBuf,
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// API key. Falls back to OPENROUTER_API_KEY.
    #[arg(long)]
    api_key: Option<String>,

    /// Model identifier. Falls back to OPENROUTER_MODEL.
    #[arg(long)]
    model: Option<String>,

    /// OpenAI-compatible API base URL. Falls back to OPENROUTER_API_BASE.
    #[arg(long)]
    api_base: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Completion token limit
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,

    /// Attempts per ticker, including the first
    #[arg(long)]
    max_attempts: Option<u32>,

    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args, Debug)]
struct FormatArgs {
    /// Keep sections of missing datasets with a placeholder body
    #[arg(long, default_value_t = false)]
    placeholders: bool,

    /// Keep only the N most recent periods of each financial statement
    #[arg(long, value_name = "N")]
    max_periods: Option<usize>,
}

impl FormatArgs {
    fn to_options(&self) -> FormatOptions {
        let mut options = FormatOptions::default();
        if self.placeholders {
            options = options.with_absent_policy(AbsentPolicy::Placeholder);
        }
        if let Some(periods) = self.max_periods {
            options = options.with_max_statement_periods(periods);
        }
        options
    }
}

impl ModelArgs {
    fn to_config(&self) -> Result<AnalystConfig> {
        self.to_config_with(|name| std::env::var(name).ok())
    }

    /// Flags first, then `OPENROUTER_*` for anything left unset
    fn to_config_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<AnalystConfig> {
        let mut builder = AnalystConfig::builder()
            .request_timeout(Duration::from_secs(self.timeout))
            .format(self.format.to_options());

        if let Some(key) = &self.api_key {
            builder = builder.api_key(key);
        }
        if let Some(model) = &self.model {
            builder = builder.model(model);
        }
        if let Some(api_base) = &self.api_base {
            builder = builder.api_base(api_base);
        }
        if let Some(max_tokens) = self.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(attempts) = self.max_attempts {
            builder = builder.max_attempts(attempts);
        }

        Ok(builder.with_env_lookup(env).build()?)
    }

    fn analyst(&self) -> Result<FundamentalAnalyst> {
        let config = self.to_config()?;
        info!(model = %config.model, api_base = %config.api_base, "Using model");
        FundamentalAnalyst::from_config(config).context("failed to set up the analyst")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::default();
    if cli.verbose {
        logging = logging.verbose();
    }
    if cli.log_json {
        logging = logging.json();
    }
    analyst_utils::init_tracing_with(&logging);

    match cli.command {
        Command::Analyze {
            ticker,
            data,
            model,
            output_dir,
        } => run_analyze(&ticker, &data.data_dir, &model, output_dir.as_deref()).await,
        Command::Batch {
            tickers,
            all,
            data,
            model,
            output_dir,
        } => run_batch_command(tickers, all, &data.data_dir, &model, output_dir.as_deref()).await,
        Command::Prompt { ticker, data, format } => run_prompt(&ticker, &data.data_dir, &format),
        Command::Scan { data } => run_scan(&data.data_dir),
    }
}

async fn run_analyze(ticker: &str, data_dir: &Path, model: &ModelArgs, output_dir: Option<&Path>) -> Result<()> {
    let analyst = model.analyst()?;

    println!("Analyzing {ticker}...");
    let path = analyst
        .analyze_and_save(ticker, data_dir, output_dir)
        .await
        .with_context(|| format!("analysis of {ticker} failed"))?;

    println!("Analysis complete!");
    println!("Report: {}", path.display());
    Ok(())
}

async fn run_batch_command(
    tickers: Vec<String>,
    all: bool,
    data_dir: &Path,
    model: &ModelArgs,
    output_dir: Option<&Path>,
) -> Result<()> {
    let tickers = if all { discover_tickers(data_dir)? } else { tickers };
    if tickers.is_empty() {
        bail!("no tickers found under {}", data_dir.display());
    }

    let analyst = model.analyst()?;
    let summary = run_batch(&analyst, &tickers, data_dir, output_dir).await;

    println!("Batch analysis summary");
    println!("{}", "=".repeat(70));

    if summary.success_count() > 0 {
        println!("\nSuccessfully analyzed {} ticker(s):", summary.success_count());
        for (ticker, path) in summary.successes() {
            println!("  - {ticker}: {}", path.display());
        }
    }

    if summary.failure_count() > 0 {
        println!("\nFailed to analyze {} ticker(s):", summary.failure_count());
        for (ticker, message) in summary.failures() {
            println!("  - {ticker}: {message}");
        }
    }

    if summary.all_failed() {
        bail!("all {} ticker(s) failed", summary.failure_count());
    }
    Ok(())
}

fn run_prompt(ticker: &str, data_dir: &Path, format: &FormatArgs) -> Result<()> {
    let prompt = load_and_format_with(ticker, data_dir, &format.to_options())?;
    print!("{prompt}");
    Ok(())
}

fn run_scan(data_dir: &Path) -> Result<()> {
    let tickers = discover_tickers(data_dir)?;
    if tickers.is_empty() {
        println!("No ticker directories under {}", data_dir.display());
        return Ok(());
    }

    println!("Found {} ticker(s) under {}:", tickers.len(), data_dir.display());
    for ticker in &tickers {
        match load_ticker_data(ticker, data_dir) {
            Ok(data) => {
                println!("  {ticker}: {}/{} datasets", data.present_count(), data.datasets().len());
                for dataset in data.absent() {
                    if let Some(reason) = dataset.absence_reason() {
                        println!("      missing {}: {reason}", dataset.name());
                    }
                }
            }
            Err(AnalystError::DataNotFound { reason, .. }) => println!("  {ticker}: no data ({reason})"),
            Err(err) => println!("  {ticker}: {err}"),
        }
    }
    Ok(())
}
