use crate::meet::Phase;
use serde::Serialize;
use thiserror::Error;

/// Problems met while scoring. None of them abort a meet: the affected
/// entry or event is left unscored and the error is handed back to the
/// caller alongside whatever did score.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringError {
    /// A time token could not be read. Only this entry goes unscored.
    #[error("{event} ({phase}): {field} '{value}' for {swimmer} is invalid: {reason}")]
    InvalidTime {
        field: String,
        event: String,
        phase: Phase,
        swimmer: String,
        value: String,
        reason: String,
    },

    /// No points category matches the event, so nobody in it can score.
    #[error("{event}: no points category matches this event")]
    MissingCategory { event: String },
}

impl ScoringError {
    pub fn is_config(&self) -> bool {
        matches!(self, ScoringError::MissingCategory { .. })
    }
}
