//! Error taxonomy for `reindex` and `ask`.
//!
//! Every variant is local to a single action invocation. None of them is
//! fatal to the process: callers render them to the user and carry on.
//! A response body that is not JSON is not an error at all; it degrades to
//! [`ResponseBody::Raw`](crate::models::ResponseBody::Raw).

use thiserror::Error;

use crate::models::NotifyLevel;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    /// The outline provider has no current page.
    #[error("No page context")]
    NoContext,

    /// The current page has no blocks.
    #[error("No blocks found on current page")]
    EmptyDocument,

    #[error("{0}")]
    Validation(String),

    /// The outline provider failed while loading the page.
    #[error("Could not load outline: {0}")]
    Provider(String),

    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("{message}")]
    Remote { status: u16, message: String },
}

impl BridgeError {
    /// Notification level used when this error is reported to the user.
    pub fn level(&self) -> NotifyLevel {
        match self {
            Self::NoContext | Self::EmptyDocument | Self::Validation(_) => NotifyLevel::Warning,
            Self::Provider(_) | Self::Transport(_) | Self::Remote { .. } => NotifyLevel::Error,
        }
    }
}
