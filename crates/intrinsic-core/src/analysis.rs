//! Analysis pipeline: one fundamentals lookup, three estimators, one price
//! history lookup, with every outcome handed to an injected [`Presenter`].
//!
//! ```text
//! ticker ──▶ fetch_fundamentals ──▶ DDM ─────────────┐
//!                    │           ├─▶ earnings multiple ├──▶ Presenter
//!                    │           └─▶ price-to-book ────┤
//!                    └──────────▶ fetch_price_history ─┘
//! ```

use crate::accessor::{fetch_fundamentals, fetch_price_history};
use crate::data_source::FundamentalsSource;
use crate::valuation::{
    self, earnings_multiple_value, price_to_book_value, DdmAssumptions, DdmProjection,
    MultipleValuation,
};
use crate::{AnalysisError, Fundamentals, HistoryRange, PriceHistory};

const HISTORY_CHART: &str = "price history chart";

/// Caller-chosen parameters for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisParams {
    pub ddm: DdmAssumptions,
    /// Assumed P/E applied to trailing EPS.
    pub assumed_pe: f64,
    /// Target P/B applied to book value per share.
    pub target_pb: f64,
    pub history_range: HistoryRange,
    /// Skip the price history lookup entirely.
    pub skip_price_history: bool,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            ddm: DdmAssumptions::default(),
            assumed_pe: 12.0,
            target_pb: 1.0,
            history_range: HistoryRange::OneYear,
            skip_price_history: false,
        }
    }
}

/// Output capability for the pipeline: console, charts, or a capture stub.
pub trait Presenter {
    /// Called once before anything is fetched.
    fn begin(&mut self, ticker: &str);
    fn fundamentals(&mut self, fundamentals: &Fundamentals);
    fn ddm(&mut self, fundamentals: &Fundamentals, projection: &DdmProjection);
    fn earnings_value(&mut self, fundamentals: &Fundamentals, valuation: &MultipleValuation);
    fn book_value(&mut self, fundamentals: &Fundamentals, valuation: &MultipleValuation);
    fn price_history(&mut self, history: &PriceHistory);
    /// A lookup or estimator could not produce a result.
    fn unavailable(&mut self, error: &AnalysisError);
}

/// Every outcome of a run whose fundamentals lookup succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub fundamentals: Fundamentals,
    pub ddm: Result<DdmProjection, AnalysisError>,
    pub earnings: Result<MultipleValuation, AnalysisError>,
    pub price_to_book: Result<MultipleValuation, AnalysisError>,
    /// `None` when the lookup was skipped.
    pub price_history: Option<Result<PriceHistory, AnalysisError>>,
}

impl AnalysisReport {
    /// Number of lookups and estimators that came back unavailable.
    pub fn unavailable_count(&self) -> usize {
        [
            self.ddm.is_err(),
            self.earnings.is_err(),
            self.price_to_book.is_err(),
            matches!(self.price_history, Some(Err(_))),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

fn report_unavailable(presenter: &mut dyn Presenter, error: &AnalysisError) {
    tracing::debug!(
        ticker = error.ticker(),
        kind = error.kind().as_str(),
        error = %error,
        "outcome unavailable"
    );
    presenter.unavailable(error);
}

/// Run the full analysis for `ticker`.
///
/// Fails only when the fundamentals lookup does; estimator failures are
/// reported to `presenter` and recorded in the report.
pub async fn run_analysis(
    source: &dyn FundamentalsSource,
    ticker: &str,
    params: &AnalysisParams,
    presenter: &mut dyn Presenter,
) -> Result<AnalysisReport, AnalysisError> {
    presenter.begin(ticker);

    let fundamentals = match fetch_fundamentals(source, ticker).await {
        Ok(fundamentals) => fundamentals,
        Err(error) => {
            report_unavailable(presenter, &error);
            return Err(error);
        }
    };
    presenter.fundamentals(&fundamentals);

    let ddm = valuation::project(&fundamentals, &params.ddm);
    match &ddm {
        Ok(projection) => presenter.ddm(&fundamentals, projection),
        Err(error) => report_unavailable(presenter, error),
    }

    let earnings = earnings_multiple_value(&fundamentals, params.assumed_pe);
    match &earnings {
        Ok(valuation) => presenter.earnings_value(&fundamentals, valuation),
        Err(error) => report_unavailable(presenter, error),
    }

    let price_to_book = price_to_book_value(&fundamentals, params.target_pb);
    match &price_to_book {
        Ok(valuation) => presenter.book_value(&fundamentals, valuation),
        Err(error) => report_unavailable(presenter, error),
    }

    let price_history = if params.skip_price_history {
        None
    } else {
        let history = fetch_price_history(source, fundamentals.symbol(), params.history_range)
            .await
            .and_then(|history| {
                if history.is_empty() {
                    Err(AnalysisError::missing_field(
                        fundamentals.symbol().as_str(),
                        "historical prices",
                        HISTORY_CHART,
                    ))
                } else {
                    Ok(history)
                }
            });
        match &history {
            Ok(history) => presenter.price_history(history),
            Err(error) => report_unavailable(presenter, error),
        }
        Some(history)
    };

    let report = AnalysisReport {
        fundamentals,
        ddm,
        earnings,
        price_to_book,
        price_history,
    };
    tracing::info!(
        ticker = %report.fundamentals.symbol(),
        unavailable = report.unavailable_count(),
        "analysis finished"
    );
    Ok(report)
}
