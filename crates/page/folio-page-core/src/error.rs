//! Error types for the page core.

use crate::ids::TargetId;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PageError {
    #[error("word list must contain at least one word")]
    EmptyWordList,

    #[error("word at index {index} is empty")]
    EmptyWord { index: usize },

    /// The primary banner is missing one of its required sub-elements.
    #[error("primary banner is missing its `{part}` element")]
    MissingBannerPart { part: String },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("a submission is already in flight")]
    SubmissionInFlight,

    #[error("form access key is missing or still the placeholder")]
    MissingAccessKey,

    #[error("unknown reveal target {0:?}")]
    UnknownTarget(TargetId),
}

impl PageError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
