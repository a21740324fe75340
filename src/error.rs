//! Errors crossing the page/background messaging boundary.

use thiserror::Error;

const INVALIDATED_SIGNATURES: [&str; 2] = ["Extension context invalidated", "message port closed"];

/// Failure delivering a message between a page context and the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The page context was torn down; nothing sent on this channel will
    /// ever arrive again.
    #[error("context invalidated")]
    ContextInvalidated,

    /// The other side is not reachable right now (not loaded yet, navigating).
    #[error("channel disconnected: {0}")]
    Disconnected(String),
}

impl ChannelError {
    /// Map a host runtime error message onto a channel error.
    pub fn classify(message: &str) -> Self {
        if INVALIDATED_SIGNATURES
            .iter()
            .any(|signature| message.contains(signature))
        {
            ChannelError::ContextInvalidated
        } else {
            ChannelError::Disconnected(message.to_string())
        }
    }

    pub fn is_context_invalidated(&self) -> bool {
        matches!(self, ChannelError::ContextInvalidated)
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for ChannelError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        ChannelError::ContextInvalidated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_invalidation_signatures() {
        assert_eq!(
            ChannelError::classify("Error: Extension context invalidated."),
            ChannelError::ContextInvalidated
        );
        assert_eq!(
            ChannelError::classify("The message port closed before a response was received."),
            ChannelError::ContextInvalidated
        );
    }

    #[test]
    fn other_failures_are_transient() {
        let err = ChannelError::classify("Could not establish connection. Receiving end does not exist.");
        assert!(!err.is_context_invalidated());
        assert!(err.to_string().contains("Receiving end"));
    }
}
