//! User feedback submission.
//!
//! Delivery goes through a [`FeedbackRelay`]; the core only validates the
//! message and interprets the relay's response status.

use crate::form::ValidationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Feedback submission errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Feedback was rejected with status {0}")]
    Rejected(u16),
    #[error("Failed to send feedback: {0}")]
    Relay(#[from] RelayError),
}

/// Transport failures of a [`FeedbackRelay`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("relay unreachable: {0}")]
    Unreachable(String),
    #[error("could not queue message: {0}")]
    Queue(String),
}

/// A feedback message as sent to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub feedback: String,
}

/// Transport for feedback messages.
pub trait FeedbackRelay {
    /// Send `feedback`, returning the response status code.
    fn deliver(&self, feedback: &Feedback) -> Result<u16, RelayError>;
}

/// Validate `text` and send it. Surrounding whitespace is trimmed.
pub fn submit_feedback(relay: &impl FeedbackRelay, text: &str) -> Result<(), FeedbackError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyFeedback.into());
    }

    let feedback = Feedback {
        feedback: text.to_string(),
    };
    match relay.deliver(&feedback) {
        Ok(status) if (200..300).contains(&status) => {
            log::info!("Feedback delivered");
            Ok(())
        }
        Ok(status) => {
            log::warn!("Feedback relay responded with status {status}");
            Err(FeedbackError::Rejected(status))
        }
        Err(e) => {
            log::warn!("Feedback relay failed: {e}");
            Err(e.into())
        }
    }
}
