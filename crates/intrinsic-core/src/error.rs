use thiserror::Error;

use crate::data_source::SourceError;

/// Validation errors raised while constructing domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character {ch:?} at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid history range '{value}', expected one of 1mo, 3mo, 6mo, 1y, 2y, 5y")]
    InvalidHistoryRange { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
}

/// Failure classification for the accessor and the estimators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisErrorKind {
    ProviderUnavailable,
    MissingField,
    InvalidInput,
}

impl AnalysisErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProviderUnavailable => "provider_unavailable",
            Self::MissingField => "missing_field",
            Self::InvalidInput => "invalid_input",
        }
    }
}

/// An "unavailable" outcome. Every variant names the ticker it concerns.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("{ticker}: provider unavailable: {message}")]
    ProviderUnavailable { ticker: String, message: String },

    #[error("{ticker}: no valid {field} available for {estimator}")]
    MissingField {
        ticker: String,
        field: &'static str,
        estimator: &'static str,
    },

    #[error("{ticker}: invalid input for {estimator}: {reason}")]
    InvalidInput {
        ticker: String,
        estimator: &'static str,
        reason: String,
    },
}

impl AnalysisError {
    pub fn provider_unavailable(ticker: impl Into<String>, error: &SourceError) -> Self {
        Self::ProviderUnavailable {
            ticker: ticker.into(),
            message: error.to_string(),
        }
    }

    pub fn missing_field(
        ticker: impl Into<String>,
        field: &'static str,
        estimator: &'static str,
    ) -> Self {
        Self::MissingField {
            ticker: ticker.into(),
            field,
            estimator,
        }
    }

    pub fn invalid_input(
        ticker: impl Into<String>,
        estimator: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            ticker: ticker.into(),
            estimator,
            reason: reason.into(),
        }
    }

    pub const fn kind(&self) -> AnalysisErrorKind {
        match self {
            Self::ProviderUnavailable { .. } => AnalysisErrorKind::ProviderUnavailable,
            Self::MissingField { .. } => AnalysisErrorKind::MissingField,
            Self::InvalidInput { .. } => AnalysisErrorKind::InvalidInput,
        }
    }

    pub fn ticker(&self) -> &str {
        match self {
            Self::ProviderUnavailable { ticker, .. }
            | Self::MissingField { ticker, .. }
            | Self::InvalidInput { ticker, .. } => ticker,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_name_the_ticker() {
        let error = AnalysisError::missing_field("PRU", "dividend rate", "DDM analysis");
        assert_eq!(error.kind(), AnalysisErrorKind::MissingField);
        assert_eq!(error.ticker(), "PRU");
        assert_eq!(error.kind().as_str(), "missing_field");
        assert_eq!(
            error.to_string(),
            "PRU: no valid dividend rate available for DDM analysis"
        );
    }

    #[test]
    fn provider_failures_keep_the_source_message() {
        let source = SourceError::unavailable("yahoo returned status 404");
        let error = AnalysisError::provider_unavailable("ZZZZ", &source);
        assert_eq!(error.kind(), AnalysisErrorKind::ProviderUnavailable);
        assert!(error.to_string().contains("status 404"));
    }
}
