use intrinsic_core::{AnalysisError, AnalysisErrorKind, HttpError};
use thiserror::Error;

use crate::output::ChartError;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("http client setup failed: {0}")]
    Transport(#[from] HttpError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Analysis(error) => match error.kind() {
                AnalysisErrorKind::InvalidInput => 2,
                AnalysisErrorKind::ProviderUnavailable | AnalysisErrorKind::MissingField => 3,
            },
            Self::Transport(_) => 3,
            Self::Chart(_) => 4,
            Self::Io(_) => 10,
        }
    }

    /// Analysis failures already reached stdout through the presenter.
    pub const fn reported_inline(&self) -> bool {
        matches!(self, Self::Analysis(_))
    }
}
