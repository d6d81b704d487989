//! # Intrinsic Core
//!
//! Fundamentals access and valuation estimators for the `intrinsic` CLI.
//!
//! ## Overview
//!
//! - **Domain models** for fundamentals snapshots and price history, with
//!   unknown values held as `None` rather than numeric sentinels
//! - **Provider contract** ([`FundamentalsSource`]) and the Yahoo Finance adapter
//! - **Valuation estimators**: dividend discount model, earnings multiple,
//!   price-to-book multiple
//! - **Analysis pipeline** that runs everything once per ticker and hands the
//!   results to an injected [`Presenter`]
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`accessor`] | Fundamentals/price lookups with provider failures mapped to [`AnalysisError`] |
//! | [`adapters`] | Provider adapters (Yahoo) |
//! | [`analysis`] | Pipeline and [`Presenter`] capability |
//! | [`data_source`] | Provider trait and [`SourceError`] |
//! | [`domain`] | Domain models |
//! | [`error`] | Validation and analysis errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`valuation`] | Estimators |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use intrinsic_core::{fetch_fundamentals, valuation, ReqwestHttpClient, YahooAdapter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = YahooAdapter::new(Arc::new(ReqwestHttpClient::new()?));
//!     let fundamentals = fetch_fundamentals(&adapter, "PRU").await?;
//!
//!     let projection = valuation::project(&fundamentals, &Default::default())?;
//!     println!("DDM value: ${:.2}", projection.intrinsic_value);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Estimators return `Result<_, AnalysisError>` and never panic:
//!
//! ```rust
//! use intrinsic_core::{AnalysisError, AnalysisErrorKind};
//!
//! fn describe(error: &AnalysisError) -> &'static str {
//!     match error.kind() {
//!         AnalysisErrorKind::ProviderUnavailable => "lookup failed",
//!         AnalysisErrorKind::MissingField => "provider did not report a required field",
//!         AnalysisErrorKind::InvalidInput => "value or assumption out of range",
//!     }
//! }
//! ```

pub mod accessor;
pub mod adapters;
pub mod analysis;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod valuation;

// Re-export commonly used types at crate root for convenience

// Accessor
pub use accessor::{fetch_fundamentals, fetch_price_history};

// Adapter implementations
pub use adapters::{YahooAdapter, YahooAuthManager};

// Pipeline
pub use analysis::{run_analysis, AnalysisParams, AnalysisReport, Presenter};

// Provider contract
pub use data_source::{FundamentalsSource, SourceError, SourceErrorKind, SourceFuture};

// Domain models
pub use domain::{ClosePoint, Fundamentals, HistoryRange, Metric, PriceHistory, Symbol, UtcDateTime};

// Error types
pub use error::{AnalysisError, AnalysisErrorKind, ValidationError};

// HTTP client types
pub use http_client::{
    CannedHttpClient, HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse,
    ReqwestHttpClient, DEFAULT_TIMEOUT_MS,
};

// Estimators
pub use valuation::{DdmAssumptions, DdmProjection, MultipleValuation, ProjectedDividend};
