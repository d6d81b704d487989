//! Command-line arguments for `intrinsic`.
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `TICKER` | `PRU` | Equity to analyze |
//! | `--growth-rate` | `0.03` | Annual dividend growth rate |
//! | `--discount-rate` | `0.08` | Required rate of return |
//! | `--years` | `5` | DDM forecast horizon |
//! | `--pe` | `12` | Assumed P/E for the earnings valuation |
//! | `--pb` | `1.0` | Target P/B for the book valuation |
//! | `--history-range` | `1y` | Price chart window |
//! | `--chart-dir` | `.` | Where SVG charts are written |
//! | `--no-charts` | `false` | Skip charts and the price history lookup |
//! | `--timeout-ms` | `10000` | Per-request transport timeout |
//! | `-v` | | Raise log verbosity (repeatable) |
//!
//! ```bash
//! intrinsic PRU
//! intrinsic KO --growth-rate 0.04 --discount-rate 0.09 --years 10
//! intrinsic MSFT --no-charts -v
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use intrinsic_core::{AnalysisParams, DdmAssumptions, HistoryRange, DEFAULT_TIMEOUT_MS};

/// Equity fundamentals and intrinsic value estimates.
///
/// Fetches a fundamentals snapshot from Yahoo Finance, then runs a dividend
/// discount model, an earnings multiple and a price-to-book multiple.
#[derive(Debug, Parser)]
#[command(name = "intrinsic", author, version, about)]
pub struct Cli {
    /// Ticker symbol to analyze.
    #[arg(default_value = "PRU")]
    pub ticker: String,

    /// Annual dividend growth rate used by the DDM.
    #[arg(long, default_value_t = 0.03, allow_hyphen_values = true)]
    pub growth_rate: f64,

    /// Discount rate (required return) used by the DDM.
    #[arg(long, default_value_t = 0.08, allow_hyphen_values = true)]
    pub discount_rate: f64,

    /// Number of explicitly projected dividend years.
    #[arg(long, default_value_t = 5)]
    pub years: u32,

    /// Assumed price-to-earnings multiple.
    #[arg(long, default_value_t = 12.0, allow_hyphen_values = true)]
    pub pe: f64,

    /// Target price-to-book multiple.
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    pub pb: f64,

    /// Trailing window for the price chart (1mo, 3mo, 6mo, 1y, 2y, 5y).
    #[arg(long, default_value_t = HistoryRange::OneYear)]
    pub history_range: HistoryRange,

    /// Directory the SVG charts are written to.
    #[arg(long, default_value = ".")]
    pub chart_dir: PathBuf,

    /// Do not render charts or fetch price history.
    #[arg(long, default_value_t = false)]
    pub no_charts: bool,

    /// Request timeout in milliseconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Log verbosity: -v for info, -vv for debug. RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn analysis_params(&self) -> AnalysisParams {
        AnalysisParams {
            ddm: DdmAssumptions::new(self.growth_rate, self.discount_rate, self.years),
            assumed_pe: self.pe,
            target_pb: self.pb,
            history_range: self.history_range,
            skip_price_history: self.no_charts,
        }
    }

    /// Default `EnvFilter` directive for the chosen verbosity.
    pub fn log_directive(&self) -> String {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        format!("warn,intrinsic={level},intrinsic_core={level}")
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_reproduce_the_reference_run() {
        let cli = Cli::try_parse_from(["intrinsic"]).expect("defaults parse");
        assert_eq!(cli.ticker, "PRU");
        assert_eq!(cli.timeout_ms, 10_000);
        assert!(!cli.no_charts);
        assert_eq!(cli.analysis_params(), AnalysisParams::default());
        assert_eq!(
            cli.log_directive(),
            "warn,intrinsic=warn,intrinsic_core=warn"
        );
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::try_parse_from([
            "intrinsic",
            "ko",
            "--growth-rate",
            "-0.01",
            "--discount-rate",
            "0.07",
            "--years",
            "10",
            "--pb",
            "1.5",
            "--history-range",
            "5y",
            "--no-charts",
            "-vv",
        ])
        .expect("overrides parse");

        let params = cli.analysis_params();
        assert_eq!(cli.ticker, "ko");
        assert_eq!(params.ddm, DdmAssumptions::new(-0.01, 0.07, 10));
        assert_eq!(params.target_pb, 1.5);
        assert_eq!(params.history_range, HistoryRange::FiveYears);
        assert!(params.skip_price_history);
        assert!(cli.log_directive().contains("intrinsic_core=debug"));
    }

    #[test]
    fn rejects_unknown_history_range() {
        let result = Cli::try_parse_from(["intrinsic", "--history-range", "10y"]);
        assert!(result.is_err());
    }
}
