use thiserror::Error;

use crate::{AnalysisError, Fundamentals};

pub const ESTIMATOR: &str = "DDM analysis";
pub const MAX_FORECAST_YEARS: u32 = 100;

/// Growth, discount and horizon assumptions for the dividend discount model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DdmAssumptions {
    pub growth_rate: f64,
    pub discount_rate: f64,
    pub forecast_years: u32,
}

impl Default for DdmAssumptions {
    fn default() -> Self {
        Self {
            growth_rate: 0.03,
            discount_rate: 0.08,
            forecast_years: 5,
        }
    }
}

impl DdmAssumptions {
    pub fn new(growth_rate: f64, discount_rate: f64, forecast_years: u32) -> Self {
        Self {
            growth_rate,
            discount_rate,
            forecast_years,
        }
    }

    /// Checks everything except the dividend itself.
    pub fn validate(&self) -> Result<(), DdmInputError> {
        check_rate("growth rate", self.growth_rate)?;
        check_rate("discount rate", self.discount_rate)?;

        if self.discount_rate <= self.growth_rate {
            return Err(DdmInputError::DiscountNotAboveGrowth {
                growth: self.growth_rate,
                discount: self.discount_rate,
            });
        }

        if self.forecast_years == 0 || self.forecast_years > MAX_FORECAST_YEARS {
            return Err(DdmInputError::HorizonOutOfRange {
                years: self.forecast_years,
                max: MAX_FORECAST_YEARS,
            });
        }

        Ok(())
    }
}

fn check_rate(name: &'static str, value: f64) -> Result<(), DdmInputError> {
    if !value.is_finite() {
        return Err(DdmInputError::NonFiniteRate { name });
    }
    if value <= -1.0 {
        return Err(DdmInputError::RateAtOrBelowMinusOne { name, value });
    }
    Ok(())
}

/// Why a DDM projection cannot be computed from the given inputs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DdmInputError {
    #[error("dividend rate must be positive, got {0}")]
    NonPositiveDividend(f64),
    #[error("{name} must be finite")]
    NonFiniteRate { name: &'static str },
    #[error("{name} must be greater than -1, got {value}")]
    RateAtOrBelowMinusOne { name: &'static str, value: f64 },
    #[error("discount rate {discount} must exceed growth rate {growth}")]
    DiscountNotAboveGrowth { growth: f64, discount: f64 },
    #[error("forecast horizon must be between 1 and {max} years, got {years}")]
    HorizonOutOfRange { years: u32, max: u32 },
    #[error("projection overflows: {field} is not a finite number")]
    NonFiniteResult { field: &'static str },
}

/// One explicitly projected year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedDividend {
    pub year: u32,
    pub projected: f64,
    pub discounted: f64,
}

/// Result of a dividend discount projection.
///
/// `years` has exactly `assumptions.forecast_years` entries and
/// `intrinsic_value` is the sum of their discounted dividends plus the
/// discounted terminal value.
#[derive(Debug, Clone, PartialEq)]
pub struct DdmProjection {
    pub dividend_rate: f64,
    pub assumptions: DdmAssumptions,
    pub years: Vec<ProjectedDividend>,
    pub terminal_value: f64,
    pub discounted_terminal_value: f64,
    pub intrinsic_value: f64,
}

impl DdmProjection {
    pub fn discounted_dividends_total(&self) -> f64 {
        self.years.iter().map(|year| year.discounted).sum()
    }
}

/// Project and discount `dividend_rate` under `assumptions`.
///
/// Terminal value uses the Gordon growth formula anchored at the last
/// projected dividend.
pub fn project_dividends(
    dividend_rate: f64,
    assumptions: &DdmAssumptions,
) -> Result<DdmProjection, DdmInputError> {
    if !dividend_rate.is_finite() || dividend_rate <= 0.0 {
        return Err(DdmInputError::NonPositiveDividend(dividend_rate));
    }
    assumptions.validate()?;

    let growth = 1.0 + assumptions.growth_rate;
    let discount = 1.0 + assumptions.discount_rate;
    // Bounded by MAX_FORECAST_YEARS.
    let horizon = assumptions.forecast_years as i32;

    let years = (1..=horizon)
        .map(|year| {
            let projected = dividend_rate * growth.powi(year);
            ProjectedDividend {
                year: year as u32,
                projected,
                discounted: projected / discount.powi(year),
            }
        })
        .collect::<Vec<_>>();

    let last_dividend = dividend_rate * growth.powi(horizon);
    let terminal_value =
        last_dividend * growth / (assumptions.discount_rate - assumptions.growth_rate);
    let discounted_terminal_value = terminal_value / discount.powi(horizon);
    let intrinsic_value =
        years.iter().map(|year| year.discounted).sum::<f64>() + discounted_terminal_value;

    for (field, value) in [
        ("terminal value", terminal_value),
        ("discounted terminal value", discounted_terminal_value),
        ("intrinsic value", intrinsic_value),
    ] {
        if !value.is_finite() {
            return Err(DdmInputError::NonFiniteResult { field });
        }
    }

    Ok(DdmProjection {
        dividend_rate,
        assumptions: *assumptions,
        years,
        terminal_value,
        discounted_terminal_value,
        intrinsic_value,
    })
}

/// Dividend discount model over a fundamentals snapshot.
pub fn project(
    fundamentals: &Fundamentals,
    assumptions: &DdmAssumptions,
) -> Result<DdmProjection, AnalysisError> {
    let ticker = fundamentals.symbol().as_str();
    let dividend_rate = fundamentals
        .dividend_rate()
        .ok_or_else(|| AnalysisError::missing_field(ticker, "dividend rate", ESTIMATOR))?;

    let projection = project_dividends(dividend_rate, assumptions)
        .map_err(|error| AnalysisError::invalid_input(ticker, ESTIMATOR, error.to_string()))?;

    tracing::debug!(
        ticker,
        intrinsic_value = projection.intrinsic_value,
        years = projection.years.len(),
        "ddm projection computed"
    );
    Ok(projection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnalysisErrorKind, Symbol, UtcDateTime};

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    fn with_dividend(rate: Option<f64>) -> Fundamentals {
        let symbol = Symbol::parse("PRU").expect("symbol");
        let as_of = UtcDateTime::parse("2024-01-01T00:00:00Z").expect("timestamp");
        Fundamentals::new(symbol, "Prudential", as_of).with_dividend_rate(rate)
    }

    #[test]
    fn reference_projection_matches_hand_computation() {
        let projection =
            project_dividends(2.0, &DdmAssumptions::default()).expect("valid inputs");

        assert_eq!(projection.years.len(), 5);
        let first = projection.years[0];
        assert_eq!(first.year, 1);
        assert!(close(first.projected, 2.06, 1e-12));
        assert!(close(first.discounted, 1.907_407, 1e-6));

        let last = projection.years[4];
        assert_eq!(last.year, 5);
        assert!(close(last.projected, 2.318_548, 1e-6));
        assert!(close(last.discounted, 1.577_965, 1e-6));

        assert!(close(projection.terminal_value, 47.762_092, 1e-6));
        assert!(close(projection.discounted_terminal_value, 32.506_077, 1e-6));
        assert!(close(projection.discounted_dividends_total(), 8.693_923, 1e-6));
        assert!(close(projection.intrinsic_value, 41.20, 1e-9));
    }

    #[test]
    fn horizon_length_is_exact() {
        for years in [1, 2, 7, 30, MAX_FORECAST_YEARS] {
            let assumptions = DdmAssumptions::new(0.02, 0.09, years);
            let projection = project_dividends(1.5, &assumptions).expect("valid inputs");
            assert_eq!(projection.years.len(), years as usize);
            assert_eq!(projection.years.last().map(|y| y.year), Some(years));
        }
    }

    #[test]
    fn discount_rate_must_exceed_growth_rate() {
        for (growth, discount) in [(0.08, 0.08), (0.10, 0.05)] {
            let err = project_dividends(2.0, &DdmAssumptions::new(growth, discount, 5))
                .expect_err("must fail");
            assert!(matches!(err, DdmInputError::DiscountNotAboveGrowth { .. }));
        }
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert!(matches!(
            project_dividends(2.0, &DdmAssumptions::new(0.03, 0.08, 0)),
            Err(DdmInputError::HorizonOutOfRange { years: 0, .. })
        ));
        assert!(matches!(
            project_dividends(2.0, &DdmAssumptions::new(-1.0, 0.08, 5)),
            Err(DdmInputError::RateAtOrBelowMinusOne { .. })
        ));
        assert!(matches!(
            project_dividends(2.0, &DdmAssumptions::new(0.03, f64::NAN, 5)),
            Err(DdmInputError::NonFiniteRate { .. })
        ));
        assert!(matches!(
            project_dividends(f64::NAN, &DdmAssumptions::default()),
            Err(DdmInputError::NonPositiveDividend(_))
        ));
    }

    #[test]
    fn overflowing_projection_is_rejected() {
        let err = project_dividends(2.0, &DdmAssumptions::new(1e10, 2e10, 100))
            .expect_err("must fail");
        assert!(matches!(err, DdmInputError::NonFiniteResult { .. }));
    }

    #[test]
    fn missing_or_non_positive_dividend_is_unavailable() {
        let missing = project(&with_dividend(None), &DdmAssumptions::default())
            .expect_err("must fail");
        assert_eq!(missing.kind(), AnalysisErrorKind::MissingField);
        assert!(missing.to_string().contains("PRU"));

        for rate in [0.0, -1.25] {
            let err = project(&with_dividend(Some(rate)), &DdmAssumptions::default())
                .expect_err("must fail");
            assert_eq!(err.kind(), AnalysisErrorKind::InvalidInput);
        }
    }
}
