//! # Valuation Estimators
//!
//! Independent pure functions over a [`Fundamentals`](crate::Fundamentals)
//! snapshot. Each one fails on its own with an
//! [`AnalysisError`](crate::AnalysisError); a failed estimator never stops
//! the others.
//!
//! | Estimator | Function | Requires |
//! |-----------|----------|----------|
//! | Dividend discount model | [`ddm::project`] | dividend rate > 0, discount rate > growth rate |
//! | Earnings multiple | [`earnings_multiple_value`] | trailing EPS > 0 |
//! | Price-to-book multiple | [`price_to_book_value`] | book value > 0 |
//!
//! ```rust
//! use intrinsic_core::valuation::{project_dividends, DdmAssumptions};
//!
//! let projection = project_dividends(2.0, &DdmAssumptions::default()).unwrap();
//! assert_eq!(projection.years.len(), 5);
//! assert!((projection.intrinsic_value - 41.2).abs() < 1e-9);
//! ```

pub mod ddm;
mod multiples;

pub use ddm::{
    project, project_dividends, DdmAssumptions, DdmInputError, DdmProjection, ProjectedDividend,
    MAX_FORECAST_YEARS,
};
pub use multiples::{earnings_multiple_value, price_to_book_value, MultipleValuation};
