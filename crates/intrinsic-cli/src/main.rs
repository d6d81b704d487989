mod cli;
mod error;
mod output;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use intrinsic_core::{run_analysis, ReqwestHttpClient, YahooAdapter};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::RunPresenter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if !error.reported_inline() {
                eprintln!("error: {error}");
            }
            ExitCode::from(error.exit_code())
        }
    }
}

fn init_tracing(cli: &Cli) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_directive())),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let params = cli.analysis_params();
    let http_client = ReqwestHttpClient::new()?;
    let source = YahooAdapter::new(Arc::new(http_client)).with_timeout_ms(cli.timeout_ms);

    let chart_dir = (!cli.no_charts).then(|| cli.chart_dir.clone());
    let mut presenter = RunPresenter::new(io::stdout(), chart_dir);

    // Estimator failures are already reported inline; only a failed
    // fundamentals lookup aborts the run.
    let outcome = run_analysis(&source, &cli.ticker, &params, &mut presenter).await;
    let written = presenter.finish()?;
    let report = outcome?;

    tracing::debug!(
        ticker = %report.fundamentals.symbol(),
        charts = written.len(),
        unavailable = report.unavailable_count(),
        "run complete"
    );
    Ok(())
}
