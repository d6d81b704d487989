//! Fundamentals accessor: the boundary where provider failures become
//! [`AnalysisError::ProviderUnavailable`].

use crate::data_source::FundamentalsSource;
use crate::{AnalysisError, Fundamentals, HistoryRange, PriceHistory, Symbol};

const ESTIMATOR: &str = "fundamentals lookup";

/// Look up fundamentals for `ticker`.
///
/// A malformed ticker fails with `InvalidInput` before the provider is
/// contacted; any provider failure becomes `ProviderUnavailable`.
pub async fn fetch_fundamentals(
    source: &dyn FundamentalsSource,
    ticker: &str,
) -> Result<Fundamentals, AnalysisError> {
    let symbol = parse_ticker(ticker)?;
    tracing::info!(ticker = %symbol, provider = source.name(), "fetching fundamentals");

    match source.fundamentals(&symbol).await {
        Ok(fundamentals) => {
            let known = fundamentals
                .metrics()
                .filter(|(_, value)| value.is_some())
                .count();
            tracing::debug!(
                ticker = %symbol,
                known_fields = known,
                as_of = %fundamentals.as_of(),
                "fundamentals received"
            );
            Ok(fundamentals)
        }
        Err(error) => {
            tracing::warn!(ticker = %symbol, error = %error, "fundamentals lookup failed");
            Err(AnalysisError::provider_unavailable(symbol.as_str(), &error))
        }
    }
}

/// Look up daily closes for `symbol` over `range`.
pub async fn fetch_price_history(
    source: &dyn FundamentalsSource,
    symbol: &Symbol,
    range: HistoryRange,
) -> Result<PriceHistory, AnalysisError> {
    tracing::info!(ticker = %symbol, range = %range, "fetching price history");

    source.price_history(symbol, range).await.map_err(|error| {
        tracing::warn!(ticker = %symbol, error = %error, "price history lookup failed");
        AnalysisError::provider_unavailable(symbol.as_str(), &error)
    })
}

fn parse_ticker(ticker: &str) -> Result<Symbol, AnalysisError> {
    Symbol::parse(ticker)
        .map_err(|error| AnalysisError::invalid_input(ticker.trim(), ESTIMATOR, error.to_string()))
}
