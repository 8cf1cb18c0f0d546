//! Error types

use folio_dom::{IntersectionOptionsError, SelectorError};

/// Result alias that carries [`EnhanceError`].
pub type Result<T> = std::result::Result<T, EnhanceError>;

/// Enhancement layer error
#[derive(Debug, thiserror::Error)]
pub enum EnhanceError {
    #[error("invalid selector `{selector}` for {component}: {source}")]
    Selector {
        component: &'static str,
        selector: String,
        #[source]
        source: SelectorError,
    },

    #[error("invalid intersection options: {0}")]
    Intersection(#[from] IntersectionOptionsError),

    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl EnhanceError {
    pub fn invalid_option(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name,
            reason: reason.into(),
        }
    }
}
