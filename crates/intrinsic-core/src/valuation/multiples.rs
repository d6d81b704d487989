use crate::{AnalysisError, Fundamentals};

pub const EARNINGS_ESTIMATOR: &str = "earnings based valuation";
pub const PRICE_TO_BOOK_ESTIMATOR: &str = "price-to-book valuation";

/// A per-share value obtained by applying a multiple to a per-share basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultipleValuation {
    /// Trailing EPS or book value per share.
    pub basis: f64,
    pub multiple: f64,
    pub value: f64,
}

/// Trailing EPS times an assumed P/E.
pub fn earnings_multiple_value(
    fundamentals: &Fundamentals,
    assumed_multiple: f64,
) -> Result<MultipleValuation, AnalysisError> {
    apply_multiple(
        fundamentals,
        fundamentals.trailing_eps(),
        "trailing EPS",
        assumed_multiple,
        EARNINGS_ESTIMATOR,
    )
}

/// Book value per share times a target P/B.
pub fn price_to_book_value(
    fundamentals: &Fundamentals,
    target_multiple: f64,
) -> Result<MultipleValuation, AnalysisError> {
    apply_multiple(
        fundamentals,
        fundamentals.book_value(),
        "book value",
        target_multiple,
        PRICE_TO_BOOK_ESTIMATOR,
    )
}

fn apply_multiple(
    fundamentals: &Fundamentals,
    basis: Option<f64>,
    field: &'static str,
    multiple: f64,
    estimator: &'static str,
) -> Result<MultipleValuation, AnalysisError> {
    let ticker = fundamentals.symbol().as_str();
    let basis = basis.ok_or_else(|| AnalysisError::missing_field(ticker, field, estimator))?;

    if basis <= 0.0 {
        return Err(AnalysisError::invalid_input(
            ticker,
            estimator,
            format!("{field} must be positive, got {basis}"),
        ));
    }
    if !multiple.is_finite() || multiple <= 0.0 {
        return Err(AnalysisError::invalid_input(
            ticker,
            estimator,
            format!("multiple must be a positive number, got {multiple}"),
        ));
    }

    let value = basis * multiple;
    tracing::debug!(ticker, estimator, basis, multiple, value, "multiple valuation computed");
    Ok(MultipleValuation {
        basis,
        multiple,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnalysisErrorKind, Symbol, UtcDateTime};

    fn snapshot() -> Fundamentals {
        let symbol = Symbol::parse("PRU").expect("symbol");
        let as_of = UtcDateTime::parse("2024-01-01T00:00:00Z").expect("timestamp");
        Fundamentals::new(symbol, "Prudential", as_of)
    }

    #[test]
    fn earnings_multiple_applies_assumed_pe() {
        let fundamentals = snapshot().with_trailing_eps(Some(5.0));
        let valuation = earnings_multiple_value(&fundamentals, 12.0).expect("valid");
        assert_eq!(valuation.value, 60.0);
        assert_eq!(valuation.basis, 5.0);
    }

    #[test]
    fn price_to_book_applies_target_multiple() {
        let fundamentals = snapshot().with_book_value(Some(40.0));
        let valuation = price_to_book_value(&fundamentals, 1.0).expect("valid");
        assert_eq!(valuation.value, 40.0);
    }

    #[test]
    fn unknown_basis_is_a_missing_field() {
        let err = earnings_multiple_value(&snapshot(), 12.0).expect_err("must fail");
        assert_eq!(err.kind(), AnalysisErrorKind::MissingField);
        assert_eq!(
            err.to_string(),
            "PRU: no valid trailing EPS available for earnings based valuation"
        );
    }

    #[test]
    fn non_positive_basis_or_multiple_is_invalid() {
        let losses = snapshot().with_trailing_eps(Some(-3.2));
        let err = earnings_multiple_value(&losses, 12.0).expect_err("must fail");
        assert_eq!(err.kind(), AnalysisErrorKind::InvalidInput);

        let book = snapshot().with_book_value(Some(40.0));
        for multiple in [0.0, -1.0, f64::INFINITY] {
            let err = price_to_book_value(&book, multiple).expect_err("must fail");
            assert_eq!(err.kind(), AnalysisErrorKind::InvalidInput);
        }
    }
}
