//! Provider contract and its error type.
//!
//! A [`FundamentalsSource`] answers two questions for a ticker: the latest
//! fundamentals snapshot and a trailing series of daily closes. The Yahoo
//! adapter is the production implementation; anything offering equivalent
//! fields can stand in for it.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{Fundamentals, HistoryRange, PriceHistory, Symbol};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Transport failure or non-success status.
    Unavailable,
    /// The provider does not know the requested symbol.
    NotFound,
    RateLimited,
    /// The response could not be decoded.
    Malformed,
}

/// Structured error returned by provider adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Malformed,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Malformed => "source.malformed",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Boxed future returned by [`FundamentalsSource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Market-data provider contract.
///
/// Implementations must be `Send + Sync`; methods return boxed futures so the
/// trait stays object safe.
pub trait FundamentalsSource: Send + Sync {
    /// Short provider name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Fetches the latest fundamentals snapshot for `symbol`.
    ///
    /// Fields the provider does not report come back as unknown; only a
    /// failed lookup as a whole is an error.
    fn fundamentals<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, Fundamentals>;

    /// Fetches daily closes over the trailing `range`.
    fn price_history<'a>(
        &'a self,
        symbol: &'a Symbol,
        range: HistoryRange,
    ) -> SourceFuture<'a, PriceHistory>;
}
