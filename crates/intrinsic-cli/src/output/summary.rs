use std::fmt;
use std::io::{self, Write};

use intrinsic_core::{
    AnalysisError, DdmProjection, Fundamentals, MultipleValuation, Presenter, PriceHistory,
};

/// Plain-text console report.
///
/// `Presenter` callbacks cannot fail, so the first write error is held and
/// surfaced by [`SummaryPrinter::finish`]; later writes are skipped.
pub struct SummaryPrinter<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> SummaryPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    pub fn finish(mut self) -> io::Result<W> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = writeln!(self.out, "{args}") {
            self.error = Some(error);
        }
    }
}

fn value_or_unknown(value: Option<f64>) -> String {
    value.map_or_else(|| "unknown".to_owned(), |value| value.to_string())
}

/// `1` prints as `1.0`, `1.25` as-is.
fn multiple_label(multiple: f64) -> String {
    if multiple.fract() == 0.0 {
        format!("{multiple:.1}")
    } else {
        multiple.to_string()
    }
}

impl<W: Write> Presenter for SummaryPrinter<W> {
    fn begin(&mut self, ticker: &str) {
        self.line(format_args!("Analyzing stock: {}", ticker.trim()));
    }

    fn fundamentals(&mut self, fundamentals: &Fundamentals) {
        self.line(format_args!("\nFundamental Metrics:"));
        self.line(format_args!("=== Fundamental Summary ==="));
        for (metric, value) in fundamentals.metrics() {
            self.line(format_args!("{metric}: {}", value_or_unknown(value)));
        }
        self.line(format_args!("==========================="));
    }

    fn ddm(&mut self, _fundamentals: &Fundamentals, projection: &DdmProjection) {
        self.line(format_args!("\n=== DDM Analysis Results ==="));
        self.line(format_args!(
            "Intrinsic Value (DDM): ${:.2}",
            projection.intrinsic_value
        ));
    }

    fn earnings_value(&mut self, _fundamentals: &Fundamentals, valuation: &MultipleValuation) {
        self.line(format_args!(
            "\nEarnings Based Valuation (Assumed P/E of {}): ${:.2}",
            valuation.multiple, valuation.value
        ));
    }

    fn book_value(&mut self, _fundamentals: &Fundamentals, valuation: &MultipleValuation) {
        self.line(format_args!(
            "\nPrice-to-Book Valuation (Target P/B of {}): ${:.2}",
            multiple_label(valuation.multiple),
            valuation.value
        ));
    }

    fn price_history(&mut self, history: &PriceHistory) {
        if let Some((low, high)) = history.close_bounds() {
            self.line(format_args!(
                "\nPrice History ({}): {} closes, low ${low:.2}, high ${high:.2}",
                history.range.describe(),
                history.points.len()
            ));
        }
    }

    fn unavailable(&mut self, error: &AnalysisError) {
        self.line(format_args!("\n{error}"));
    }
}

#[cfg(test)]
mod tests {
    use intrinsic_core::valuation::{
        earnings_multiple_value, price_to_book_value, project, DdmAssumptions,
    };
    use intrinsic_core::{Symbol, UtcDateTime};

    use super::*;

    fn render(run: impl FnOnce(&mut SummaryPrinter<Vec<u8>>)) -> String {
        let mut printer = SummaryPrinter::new(Vec::new());
        run(&mut printer);
        let bytes = printer.finish().expect("in-memory writes succeed");
        String::from_utf8(bytes).expect("utf-8 output")
    }

    fn snapshot() -> Fundamentals {
        Fundamentals::new(
            Symbol::parse("PRU").expect("symbol"),
            "Prudential Financial, Inc.",
            UtcDateTime::parse("2024-01-01T00:00:00Z").expect("timestamp"),
        )
        .with_pe_ratio(Some(9.5))
        .with_dividend_rate(Some(2.0))
        .with_trailing_eps(Some(5.0))
        .with_book_value(Some(40.0))
    }

    #[test]
    fn summary_lists_metrics_without_identity_fields() {
        let fundamentals = snapshot();
        let output = render(|printer| {
            printer.begin("PRU");
            printer.fundamentals(&fundamentals);
        });

        assert!(output.starts_with("Analyzing stock: PRU\n"));
        assert!(output.contains("=== Fundamental Summary ==="));
        assert!(output.contains("P/E: 9.5\n"));
        assert!(output.contains("Market Cap: unknown\n"));
        assert!(output.contains("Unlevered Free Cash Flow: unknown\n"));
        assert!(!output.contains("Prudential Financial"));
    }

    #[test]
    fn valuation_lines_use_two_decimals() {
        let fundamentals = snapshot();
        let projection = project(&fundamentals, &DdmAssumptions::default()).expect("ddm");
        let earnings = earnings_multiple_value(&fundamentals, 12.0).expect("earnings");
        let book = price_to_book_value(&fundamentals, 1.0).expect("book");

        let output = render(|printer| {
            printer.ddm(&fundamentals, &projection);
            printer.earnings_value(&fundamentals, &earnings);
            printer.book_value(&fundamentals, &book);
        });

        assert!(output.contains("Intrinsic Value (DDM): $41.20\n"));
        assert!(output.contains("Earnings Based Valuation (Assumed P/E of 12): $60.00\n"));
        assert!(output.contains("Price-to-Book Valuation (Target P/B of 1.0): $40.00\n"));
    }

    #[test]
    fn unavailable_outcomes_are_reported_inline() {
        let error = AnalysisError::missing_field("PRU", "dividend rate", "DDM analysis");
        let output = render(|printer| printer.unavailable(&error));
        assert_eq!(output, "\nPRU: no valid dividend rate available for DDM analysis\n");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn first_write_error_surfaces_on_finish() {
        let mut printer = SummaryPrinter::new(BrokenPipe);
        printer.begin("PRU");
        printer.begin("PRU");
        let error = printer.finish().err().expect("write error kept");
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
    }
}
