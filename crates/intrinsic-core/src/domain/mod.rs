//! # Domain Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Fundamentals`] | Company fundamentals snapshot with explicit unknowns |
//! | [`Metric`] | Numeric fields of a snapshot, in presentation order |
//! | [`PriceHistory`] | Daily closes over a trailing window |
//! | [`ClosePoint`] | One daily close |
//! | [`HistoryRange`] | Trailing window (1mo .. 5y) |
//! | [`Symbol`] | Normalized ticker |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Missing provider data is always `None`, never a numeric sentinel:
//!
//! ```rust
//! use intrinsic_core::{Fundamentals, Symbol, UtcDateTime};
//!
//! let symbol = Symbol::parse("pru").unwrap();
//! let snapshot = Fundamentals::new(symbol, "Prudential", UtcDateTime::now())
//!     .with_operating_cash_flow(Some(1000.0))
//!     .with_dividend_rate(Some(f64::NAN));
//!
//! assert_eq!(snapshot.dividend_rate(), None);
//! assert_eq!(snapshot.unlevered_free_cash_flow(), None);
//! ```

mod models;
mod symbol;
mod timestamp;

pub use models::{ClosePoint, Fundamentals, HistoryRange, Metric, PriceHistory};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
