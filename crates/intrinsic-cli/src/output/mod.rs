pub mod charts;
pub mod summary;

use std::io::Write;
use std::path::PathBuf;

use intrinsic_core::{
    AnalysisError, DdmProjection, Fundamentals, MultipleValuation, Presenter, PriceHistory,
};

pub use self::charts::{ChartError, ChartPresenter};
pub use self::summary::SummaryPrinter;
use crate::error::CliError;

/// Console summary plus optional chart files, fed from one pipeline run.
pub struct RunPresenter<W: Write> {
    summary: SummaryPrinter<W>,
    charts: Option<ChartPresenter>,
}

impl<W: Write> RunPresenter<W> {
    /// `chart_dir: None` disables chart rendering.
    pub fn new(out: W, chart_dir: Option<PathBuf>) -> Self {
        Self {
            summary: SummaryPrinter::new(out),
            charts: chart_dir.map(ChartPresenter::new),
        }
    }

    /// Flushes the console output and reports every chart written.
    pub fn finish(self) -> Result<Vec<PathBuf>, CliError> {
        let mut out = self.summary.finish()?;
        let written = match self.charts {
            Some(charts) => charts.finish()?,
            None => Vec::new(),
        };
        for path in &written {
            writeln!(out, "\nChart saved: {}", path.display())?;
        }
        out.flush()?;
        Ok(written)
    }

    fn each(&mut self, mut call: impl FnMut(&mut dyn Presenter)) {
        call(&mut self.summary);
        if let Some(charts) = self.charts.as_mut() {
            call(charts);
        }
    }
}

impl<W: Write> Presenter for RunPresenter<W> {
    fn begin(&mut self, ticker: &str) {
        self.each(|presenter| presenter.begin(ticker));
    }

    fn fundamentals(&mut self, fundamentals: &Fundamentals) {
        self.each(|presenter| presenter.fundamentals(fundamentals));
    }

    fn ddm(&mut self, fundamentals: &Fundamentals, projection: &DdmProjection) {
        self.each(|presenter| presenter.ddm(fundamentals, projection));
    }

    fn earnings_value(&mut self, fundamentals: &Fundamentals, valuation: &MultipleValuation) {
        self.each(|presenter| presenter.earnings_value(fundamentals, valuation));
    }

    fn book_value(&mut self, fundamentals: &Fundamentals, valuation: &MultipleValuation) {
        self.each(|presenter| presenter.book_value(fundamentals, valuation));
    }

    fn price_history(&mut self, history: &PriceHistory) {
        self.each(|presenter| presenter.price_history(history));
    }

    fn unavailable(&mut self, error: &AnalysisError) {
        self.each(|presenter| presenter.unavailable(error));
    }
}

#[cfg(test)]
mod tests {
    use intrinsic_core::valuation::{project_dividends, DdmAssumptions};
    use intrinsic_core::{Symbol, UtcDateTime};

    use super::*;

    fn fundamentals() -> Fundamentals {
        Fundamentals::new(
            Symbol::parse("PRU").expect("symbol"),
            "Prudential Financial, Inc.",
            UtcDateTime::parse("2024-01-01T00:00:00Z").expect("timestamp"),
        )
    }

    #[test]
    fn without_chart_dir_only_text_is_produced() {
        let projection = project_dividends(2.0, &DdmAssumptions::default()).expect("projection");
        let mut presenter = RunPresenter::new(Vec::new(), None);
        presenter.ddm(&fundamentals(), &projection);

        let written = presenter.finish().expect("finish");
        assert!(written.is_empty());
    }

    #[test]
    fn chart_paths_are_listed_after_the_summary() {
        let dir = tempfile::tempdir().expect("tempdir");
        let projection = project_dividends(2.0, &DdmAssumptions::default()).expect("projection");
        let mut presenter = RunPresenter::new(Vec::new(), Some(dir.path().to_path_buf()));
        presenter.begin("PRU");
        presenter.ddm(&fundamentals(), &projection);

        let written = presenter.finish().expect("finish");
        assert_eq!(written, vec![dir.path().join("PRU_ddm.svg")]);
    }
}
