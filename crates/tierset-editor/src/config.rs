//! Editor configuration: notification texts and control labels.
//!
//! # Design
//! - Every field has a default so hosts may override only what they need.
//! - Overrides arrive as JSON documents; unknown keys are rejected to catch typos.

use serde::{Deserialize, Serialize};

/// Default header for store failures.
pub const DEFAULT_FAILURE_HEADER: &str = "Error";
/// Default body for store failures.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Settings could not be synchronised. Try again later.";
/// Default header for validation failures.
pub const DEFAULT_VALIDATION_HEADER: &str = "Check the form";

/// Labels shown on save and run controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlLabels {
    /// Save control at rest.
    pub save: String,
    /// Save control while the request is in flight.
    pub saving: String,
    /// Save control after a successful save.
    pub saved: String,
    /// Run control at rest.
    pub run: String,
    /// Run control while a check is in progress.
    pub running: String,
}

impl Default for ControlLabels {
    fn default() -> Self {
        Self {
            save: "Save".to_string(),
            saving: "Saving...".to_string(),
            saved: "Saved".to_string(),
            run: "Run check".to_string(),
            running: "Check in progress".to_string(),
        }
    }
}

/// Session-wide editor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Header of the generic request-failure notification.
    pub failure_header: String,
    /// Body of the generic request-failure notification.
    pub failure_message: String,
    /// Header of validation notifications.
    pub validation_header: String,
    /// Control labels.
    pub labels: ControlLabels,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            failure_header: DEFAULT_FAILURE_HEADER.to_string(),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
            validation_header: DEFAULT_VALIDATION_HEADER.to_string(),
            labels: ControlLabels::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a JSON override document on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the document is not valid JSON or names unknown keys.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
