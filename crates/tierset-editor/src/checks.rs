//! Check configuration forms and the check-run controller.
//!
//! # Design
//! - Months stay text until save so "3.7" can be rejected before any request.
//! - Status polling happens once per session; nothing re-enables controls afterwards.

use serde_json::Value;
use thiserror::Error;
use tierset_models::{CompanySetting, ContactSetting, EntityKind, endpoints};
use tracing::debug;

use crate::error::TransportError;
use crate::ports::{Method, Transport};

/// Why a check configuration form was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckConfigError {
    /// Months is empty or not an integer.
    #[error("months must be an integer, got '{value}'")]
    MonthsNotInteger {
        /// The offending text.
        value: String,
    },
    /// Months is negative.
    #[error("months must be zero or a positive integer")]
    MonthsNegative,
    /// No lead field selected.
    #[error("select a lead field")]
    MissingLeadField,
    /// No entity field selected.
    #[error("select a field to store the result")]
    MissingEntityField,
}

/// Validated check configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// Look-back window in months.
    pub months: u32,
    /// Lead field receiving the computed value.
    pub lead_field_id: String,
    /// Entity field receiving the computed value.
    pub entity_field_id: String,
}

impl CheckConfig {
    /// Store body for the configuration of `kind`.
    ///
    /// # Errors
    ///
    /// Propagates JSON encoding failures.
    pub fn to_wire(&self, kind: EntityKind) -> Result<Value, serde_json::Error> {
        let months = i64::from(self.months);
        match kind {
            EntityKind::Contact => serde_json::to_value(ContactSetting {
                months,
                lead_field_id: self.lead_field_id.clone(),
                contact_field_id: self.entity_field_id.clone(),
            }),
            EntityKind::Company => serde_json::to_value(CompanySetting {
                months,
                lead_field_id: self.lead_field_id.clone(),
                company_field_id: self.entity_field_id.clone(),
            }),
        }
    }
}

/// Editable check configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckConfigForm {
    /// Months text.
    pub months: String,
    /// Selected lead field.
    pub lead_field_id: String,
    /// Selected entity field.
    pub entity_field_id: String,
}

/// Single-attribute edit of a check configuration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckEdit {
    /// Replace the months text.
    Months(String),
    /// Select a lead field.
    LeadField(String),
    /// Select an entity field.
    EntityField(String),
}

impl CheckConfigForm {
    /// Form state for a stored configuration.
    #[must_use]
    pub fn from_config(config: &CheckConfig) -> Self {
        Self {
            months: config.months.to_string(),
            lead_field_id: config.lead_field_id.clone(),
            entity_field_id: config.entity_field_id.clone(),
        }
    }

    /// Form state from the store body for `kind`; `null` yields a blank form.
    ///
    /// # Errors
    ///
    /// Returns a JSON error when the body does not match the kind's shape.
    pub fn from_wire(kind: EntityKind, body: Value) -> Result<Self, serde_json::Error> {
        if body.is_null() {
            return Ok(Self::default());
        }
        let (months, lead_field_id, entity_field_id) = match kind {
            EntityKind::Contact => {
                let setting: ContactSetting = serde_json::from_value(body)?;
                (setting.months, setting.lead_field_id, setting.contact_field_id)
            }
            EntityKind::Company => {
                let setting: CompanySetting = serde_json::from_value(body)?;
                (setting.months, setting.lead_field_id, setting.company_field_id)
            }
        };
        Ok(Self {
            months: months.to_string(),
            lead_field_id,
            entity_field_id,
        })
    }

    /// Apply one edit in place.
    pub fn apply(&mut self, edit: CheckEdit) {
        match edit {
            CheckEdit::Months(value) => self.months = value,
            CheckEdit::LeadField(value) => self.lead_field_id = value,
            CheckEdit::EntityField(value) => self.entity_field_id = value,
        }
    }

    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns the first failing check: months, then lead field, then entity field.
    pub fn validate(&self) -> Result<CheckConfig, CheckConfigError> {
        let months_text = self.months.trim();
        let months = months_text
            .parse::<i64>()
            .map_err(|_| CheckConfigError::MonthsNotInteger {
                value: months_text.to_string(),
            })?;
        let months = u32::try_from(months).map_err(|_| {
            if months < 0 {
                CheckConfigError::MonthsNegative
            } else {
                CheckConfigError::MonthsNotInteger {
                    value: months_text.to_string(),
                }
            }
        })?;

        let lead_field_id = self.lead_field_id.trim();
        if lead_field_id.is_empty() {
            return Err(CheckConfigError::MissingLeadField);
        }
        let entity_field_id = self.entity_field_id.trim();
        if entity_field_id.is_empty() {
            return Err(CheckConfigError::MissingEntityField);
        }

        Ok(CheckConfig {
            months,
            lead_field_id: lead_field_id.to_string(),
            entity_field_id: entity_field_id.to_string(),
        })
    }
}

/// Run-check endpoint for a kind.
#[must_use]
pub const fn run_path(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Contact => endpoints::RUN_CONTACT_CHECK,
        EntityKind::Company => endpoints::RUN_COMPANY_CHECK,
    }
}

/// Check-status endpoint for a kind.
#[must_use]
pub const fn status_path(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Contact => endpoints::CONTACT_CHECK_STATUS,
        EntityKind::Company => endpoints::COMPANY_CHECK_STATUS,
    }
}

/// Outcome of polling both check statuses. Each side completes independently.
#[derive(Debug)]
pub struct CheckPoll {
    /// Whether a contact check is running.
    pub contact: Result<bool, TransportError>,
    /// Whether a company check is running.
    pub company: Result<bool, TransportError>,
}

/// Triggers background checks and reads their running state.
pub struct CheckRunner<'a> {
    transport: &'a dyn Transport,
}

impl<'a> CheckRunner<'a> {
    /// Controller bound to a transport.
    #[must_use]
    pub const fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    /// Start the background check for `kind`.
    ///
    /// # Errors
    ///
    /// Returns the transport failure.
    pub async fn trigger(&self, kind: EntityKind) -> Result<(), TransportError> {
        let path = run_path(kind);
        debug!(kind = kind.as_str(), path, "triggering check");
        self.transport.request(Method::Post, path, None).await?;
        Ok(())
    }

    /// Read both running flags concurrently.
    pub async fn poll_status(&self) -> CheckPoll {
        let (contact, company) = tokio::join!(
            self.running(EntityKind::Contact),
            self.running(EntityKind::Company)
        );
        CheckPoll { contact, company }
    }

    async fn running(&self, kind: EntityKind) -> Result<bool, TransportError> {
        let path = status_path(kind);
        debug!(kind = kind.as_str(), path, "polling check status");
        let body = self.transport.request(Method::Get, path, None).await?;
        let running: Option<bool> = serde_json::from_value(body)?;
        Ok(running.unwrap_or(false))
    }
}
