#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared wire DTOs for the Tierset settings store.
//!
//! These types describe the JSON bodies exchanged with the remote store. The
//! editor converts them into its own form state on load and back on save, so the
//! mapping between the store contract and the editing model lives in one place.

use serde::{Deserialize, Serialize};

/// Store paths, relative to the configured base URL.
pub mod endpoints {
    /// Field catalog for every entity and value kind.
    pub const CUSTOM_FIELDS: &str = "settings/get-custom-fields";
    /// Ordered status rule list (GET) and full replacement (POST).
    pub const STATUS_RULES: &str = "settings/status";
    /// Contact check configuration.
    pub const CONTACT_SETTING: &str = "settings/contact";
    /// Company check configuration.
    pub const COMPANY_SETTING: &str = "settings/company";
    /// Starts the background contact check.
    pub const RUN_CONTACT_CHECK: &str = "settings/run-contact-check";
    /// Starts the background company check.
    pub const RUN_COMPANY_CHECK: &str = "settings/run-company-check";
    /// Whether a contact check is currently running.
    pub const CONTACT_CHECK_STATUS: &str = "settings/contact-check-status";
    /// Whether a company check is currently running.
    pub const COMPANY_CHECK_STATUS: &str = "settings/company-check-status";
}

/// Record type a rule or check applies to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Contact records.
    Contact,
    /// Company records.
    Company,
}

impl EntityKind {
    /// Both kinds in display order.
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::Contact, Self::Company]
    }

    /// Wire value for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Company => "company",
        }
    }
}

/// Which aggregate a rule compares against its range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// Number of successful deals.
    Quantity,
    /// Sum of successful deals.
    Sum,
}

impl DependencyType {
    /// Both dependency types in display order.
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::Quantity, Self::Sum]
    }

    /// Wire value for the dependency type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quantity => "quantity",
            Self::Sum => "sum",
        }
    }
}

/// One selectable field as returned by the field catalog endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldOptionDto {
    /// Field identifier.
    #[serde(with = "flexible_id")]
    pub value: String,
    /// Human-readable field name.
    pub label: String,
}

/// Body of `GET settings/get-custom-fields`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldsResponse {
    /// Numeric lead fields used by check configuration.
    #[serde(default)]
    pub lead_fields: Vec<FieldOptionDto>,
    /// Text fields on company records.
    #[serde(default)]
    pub company_string_fields: Vec<FieldOptionDto>,
    /// Numeric fields on company records.
    #[serde(default)]
    pub company_numeric_fields: Vec<FieldOptionDto>,
    /// Text fields on contact records.
    #[serde(default)]
    pub contact_string_fields: Vec<FieldOptionDto>,
    /// Numeric fields on contact records.
    #[serde(default)]
    pub contact_numeric_fields: Vec<FieldOptionDto>,
}

/// Persisted status rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleRecord {
    /// Status label written to the target field.
    pub status: String,
    /// Aggregate compared against the range.
    pub dependency_type: DependencyType,
    /// Entity kind the rule applies to.
    pub entity_type: EntityKind,
    /// Target field receiving the status.
    #[serde(with = "flexible_id")]
    pub field_id: String,
    /// Inclusive lower bound; absent for open-ended "up to" rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_amount: Option<i64>,
    /// Inclusive upper bound.
    pub to_amount: i64,
}

/// Contact check configuration as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactSetting {
    /// Look-back window in months.
    pub months: i64,
    /// Lead field receiving the computed value.
    #[serde(with = "flexible_id")]
    pub lead_field_id: String,
    /// Contact field receiving the successful deal count.
    #[serde(with = "flexible_id")]
    pub contact_field_id: String,
}

/// Company check configuration as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanySetting {
    /// Look-back window in months.
    pub months: i64,
    /// Lead field receiving the computed value.
    #[serde(with = "flexible_id")]
    pub lead_field_id: String,
    /// Company field receiving the successful deal sum.
    #[serde(with = "flexible_id")]
    pub company_field_id: String,
}

/// Identifiers travel as strings but the store may emit them as integers.
pub mod flexible_id {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    /// Serialize an identifier as a JSON string.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value)
    }

    /// Accept either a JSON string or a JSON integer.
    ///
    /// # Errors
    ///
    /// Fails when the value is neither a string nor an integer.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => text,
            RawId::Signed(number) => number.to_string(),
            RawId::Unsigned(number) => number.to_string(),
        })
    }
}
