//! Error types for editor operations.

use thiserror::Error;

use crate::checks::CheckConfigError;
use crate::controls::{Control, Section};
use crate::rules::{RuleId, RuleViolation};
use tierset_models::EntityKind;

/// Failure reported by a [`crate::Transport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The store answered with a non-success status.
    #[error("store responded with status {status}")]
    Status {
        /// HTTP status code returned by the store.
        status: u16,
        /// Problem detail extracted from the body, when present.
        detail: Option<String>,
    },
    /// The request never produced a response.
    #[error("request to the store failed: {detail}")]
    Network {
        /// Transport-level failure description.
        detail: String,
    },
    /// A body could not be encoded or decoded.
    #[error("store payload could not be mapped")]
    Codec {
        /// Underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

/// Primary error type for editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// One or more rules failed validation; nothing was sent.
    #[error("rule validation failed")]
    RuleValidation {
        /// First failing rule per check, in check order.
        violations: Vec<RuleViolation>,
    },
    /// A check configuration form failed validation; nothing was sent.
    #[error("{kind:?} check configuration is invalid")]
    CheckConfigValidation {
        /// Entity kind whose configuration was rejected.
        kind: EntityKind,
        /// Validation failure detail.
        source: CheckConfigError,
    },
    /// A store request failed; in-memory state was left unchanged.
    #[error("{operation} failed")]
    Request {
        /// Operation identifier.
        operation: &'static str,
        /// Store path the request targeted.
        path: &'static str,
        /// Transport failure.
        source: TransportError,
    },
    /// The control backing the action is disabled (for example while a check runs).
    #[error("control {control:?} is disabled")]
    ControlDisabled {
        /// Control that refused the action.
        control: Control,
    },
    /// The section has not finished loading, so its controls are not attached yet.
    #[error("section {section:?} is not loaded")]
    NotLoaded {
        /// Section that is not yet available.
        section: Section,
    },
    /// No rule row carries the identifier.
    #[error("unknown rule {id}")]
    UnknownRule {
        /// Identifier that was not found.
        id: RuleId,
    },
    /// Render data could not be prepared.
    #[error("failed to prepare render data for {template}")]
    Render {
        /// Template that was being rendered.
        template: &'static str,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The session was destroyed while the operation was pending; its result was discarded.
    #[error("editor session destroyed")]
    Destroyed,
}

impl EditorError {
    /// Whether the error was raised by local validation rather than the store.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::RuleValidation { .. } | Self::CheckConfigValidation { .. }
        )
    }
}

/// Convenience alias for editor results.
pub type EditorResult<T> = Result<T, EditorError>;
