//! Settings synchronisation with the remote store.
//!
//! # Design
//! - One GET and one POST per section; rules are always replaced wholesale.
//! - `load_all` fans out the three loads and waits for every one of them.
//! - Failures are returned untouched; callers decide how to surface them.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tierset_models::{EntityKind, RuleRecord, endpoints};
use tracing::debug;

use crate::checks::{CheckConfig, CheckConfigForm};
use crate::error::TransportError;
use crate::ports::{Method, Transport};

/// Store path for the configuration of `kind`.
#[must_use]
pub const fn setting_path(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Contact => endpoints::CONTACT_SETTING,
        EntityKind::Company => endpoints::COMPANY_SETTING,
    }
}

/// Results of the startup fan-out. Each section completes independently.
#[derive(Debug)]
pub struct LoadedSettings {
    /// Persisted rule list.
    pub rules: Result<Vec<RuleRecord>, TransportError>,
    /// Contact check configuration.
    pub contact: Result<CheckConfigForm, TransportError>,
    /// Company check configuration.
    pub company: Result<CheckConfigForm, TransportError>,
}

/// Loads and persists settings through the host transport.
pub struct SettingsSync<'a> {
    transport: &'a dyn Transport,
}

impl<'a> SettingsSync<'a> {
    /// Synchroniser bound to a transport.
    #[must_use]
    pub const fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    /// Issue the three loads concurrently and wait for all of them.
    pub async fn load_all(&self) -> LoadedSettings {
        let (rules, contact, company) = tokio::join!(
            self.load_rules(),
            self.load_check_config(EntityKind::Contact),
            self.load_check_config(EntityKind::Company)
        );
        LoadedSettings {
            rules,
            contact,
            company,
        }
    }

    /// Fetch the persisted rule list. A `null` body is an empty list.
    ///
    /// # Errors
    ///
    /// Returns the transport failure or a codec error.
    pub async fn load_rules(&self) -> Result<Vec<RuleRecord>, TransportError> {
        let records: Option<Vec<RuleRecord>> = self.get(endpoints::STATUS_RULES).await?;
        Ok(records.unwrap_or_default())
    }

    /// Replace the persisted rule list.
    ///
    /// # Errors
    ///
    /// Returns the transport failure or a codec error.
    pub async fn save_rules(&self, records: &[RuleRecord]) -> Result<(), TransportError> {
        let body = serde_json::to_value(records)?;
        self.post(endpoints::STATUS_RULES, body).await
    }

    /// Fetch the check configuration of `kind` as form state.
    ///
    /// # Errors
    ///
    /// Returns the transport failure or a codec error.
    pub async fn load_check_config(
        &self,
        kind: EntityKind,
    ) -> Result<CheckConfigForm, TransportError> {
        let body: Value = self.get(setting_path(kind)).await?;
        Ok(CheckConfigForm::from_wire(kind, body)?)
    }

    /// Overwrite the check configuration of `kind`.
    ///
    /// # Errors
    ///
    /// Returns the transport failure or a codec error.
    pub async fn save_check_config(
        &self,
        kind: EntityKind,
        config: &CheckConfig,
    ) -> Result<(), TransportError> {
        let body = config.to_wire(kind)?;
        self.post(setting_path(kind), body).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        debug!(path, "loading settings");
        let body = self.transport.request(Method::Get, path, None).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn post(&self, path: &str, body: Value) -> Result<(), TransportError> {
        debug!(path, "saving settings");
        self.transport
            .request(Method::Post, path, Some(body))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use serde_json::json;

    #[tokio::test]
    async fn load_all_collects_each_section_independently() {
        let transport = ScriptedTransport::new();
        transport.reply_json(
            Method::Get,
            endpoints::STATUS_RULES,
            json!([{
                "status": "Won",
                "dependency_type": "sum",
                "entity_type": "company",
                "field_id": 7,
                "to_amount": 1000
            }]),
        );
        transport.reply_json(Method::Get, endpoints::CONTACT_SETTING, Value::Null);
        transport.reply_status(Method::Get, endpoints::COMPANY_SETTING, 503);

        let loaded = SettingsSync::new(&transport).load_all().await;
        assert_eq!(loaded.rules.expect("rules load").len(), 1);
        assert_eq!(loaded.contact.expect("contact load"), CheckConfigForm::default());
        assert!(matches!(
            loaded.company,
            Err(TransportError::Status { status: 503, .. })
        ));
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn save_rules_sends_the_whole_list() {
        let transport = ScriptedTransport::new();
        transport.reply_json(Method::Post, endpoints::STATUS_RULES, json!([]));
        let records = vec![
            RuleRecord {
                status: "A".to_string(),
                dependency_type: tierset_models::DependencyType::Quantity,
                entity_type: EntityKind::Contact,
                field_id: "3".to_string(),
                from_amount: Some(1),
                to_amount: 2,
            };
            2
        ];
        SettingsSync::new(&transport)
            .save_rules(&records)
            .await
            .expect("save succeeds");
        let body = transport.last_body(endpoints::STATUS_RULES).expect("body sent");
        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn malformed_rule_list_is_a_codec_error() {
        let transport = ScriptedTransport::new();
        transport.reply_json(Method::Get, endpoints::STATUS_RULES, json!({"rules": []}));
        let err = SettingsSync::new(&transport)
            .load_rules()
            .await
            .expect_err("shape mismatch");
        assert!(matches!(err, TransportError::Codec { .. }));
    }
}
