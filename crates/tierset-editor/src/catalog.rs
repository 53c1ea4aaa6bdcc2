//! Field catalog adapter.
//!
//! # Design
//! - Fetch the catalog once per session; fields are immutable afterwards.
//! - Plain selects and checkbox lists use separate builders picked by the call site.
//! - A reference to a field missing from the catalog resolves to an unresolved marker,
//!   never an error.

use std::collections::BTreeSet;

use serde::Serialize;
use tierset_models::{CustomFieldsResponse, DependencyType, EntityKind, FieldOptionDto, endpoints};
use tracing::debug;

use crate::error::TransportError;
use crate::ports::{Method, Transport};

/// Record type that owns a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOwner {
    /// Contact records.
    Contact,
    /// Company records.
    Company,
    /// Lead records.
    Lead,
}

impl FieldOwner {
    /// Group label used when fields from several owners share one list.
    #[must_use]
    pub const fn group_label(self) -> &'static str {
        match self {
            Self::Contact => "Contact",
            Self::Company => "Company",
            Self::Lead => "Lead",
        }
    }
}

impl From<EntityKind> for FieldOwner {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Contact => Self::Contact,
            EntityKind::Company => Self::Company,
        }
    }
}

/// Value type stored in a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Free text.
    String,
    /// Numbers.
    Numeric,
}

/// A selectable record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Store identifier.
    pub id: String,
    /// Display name.
    pub label: String,
    /// Record type owning the field.
    pub owner: FieldOwner,
    /// Value type of the field.
    pub value_kind: ValueKind,
}

/// Option projected for a single-select control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    /// Option value.
    pub id: String,
    /// Option text.
    pub label: String,
}

/// Option projected for a checkbox list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckboxOption {
    /// Option value.
    pub id: String,
    /// Option text, prefixed with the owner group.
    pub label: String,
    /// Input name (`prefix` + id).
    pub name: String,
    /// Whether the option is currently selected.
    pub checked: bool,
}

/// Outcome of looking up a field reference in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef<'a> {
    /// No field selected.
    Unset,
    /// The referenced field exists.
    Resolved(&'a Field),
    /// The referenced field is not in the catalog anymore.
    Unresolved(&'a str),
}

/// Fields partitioned by owner and value kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldCatalog {
    company_string: Vec<Field>,
    company_numeric: Vec<Field>,
    contact_string: Vec<Field>,
    contact_numeric: Vec<Field>,
    lead: Vec<Field>,
}

impl FieldCatalog {
    /// Fetch the catalog from the store.
    ///
    /// # Errors
    ///
    /// Returns the transport failure or a codec error when the body does not match.
    pub async fn load(transport: &dyn Transport) -> Result<Self, TransportError> {
        debug!(path = endpoints::CUSTOM_FIELDS, "loading field catalog");
        let body = transport
            .request(Method::Get, endpoints::CUSTOM_FIELDS, None)
            .await?;
        let response: CustomFieldsResponse = serde_json::from_value(body)?;
        Ok(Self::from_response(response))
    }

    /// Normalise the raw catalog response.
    #[must_use]
    pub fn from_response(response: CustomFieldsResponse) -> Self {
        Self {
            company_string: to_fields(
                response.company_string_fields,
                FieldOwner::Company,
                ValueKind::String,
            ),
            company_numeric: to_fields(
                response.company_numeric_fields,
                FieldOwner::Company,
                ValueKind::Numeric,
            ),
            contact_string: to_fields(
                response.contact_string_fields,
                FieldOwner::Contact,
                ValueKind::String,
            ),
            contact_numeric: to_fields(
                response.contact_numeric_fields,
                FieldOwner::Contact,
                ValueKind::Numeric,
            ),
            lead: to_fields(response.lead_fields, FieldOwner::Lead, ValueKind::Numeric),
        }
    }

    /// Fields for an owner and value kind. Leads only expose numeric fields.
    #[must_use]
    pub fn fields(&self, owner: FieldOwner, value_kind: ValueKind) -> &[Field] {
        match (owner, value_kind) {
            (FieldOwner::Company, ValueKind::String) => &self.company_string,
            (FieldOwner::Company, ValueKind::Numeric) => &self.company_numeric,
            (FieldOwner::Contact, ValueKind::String) => &self.contact_string,
            (FieldOwner::Contact, ValueKind::Numeric) => &self.contact_numeric,
            (FieldOwner::Lead, ValueKind::Numeric) => &self.lead,
            (FieldOwner::Lead, ValueKind::String) => &[],
        }
    }

    /// Text fields a status rule for `kind` may write to.
    #[must_use]
    pub fn status_fields(&self, kind: EntityKind) -> &[Field] {
        self.fields(kind.into(), ValueKind::String)
    }

    /// Numeric fields a check for `kind` may write its aggregate to.
    #[must_use]
    pub fn aggregate_fields(&self, kind: EntityKind) -> &[Field] {
        self.fields(kind.into(), ValueKind::Numeric)
    }

    /// Numeric lead fields.
    #[must_use]
    pub fn lead_fields(&self) -> &[Field] {
        &self.lead
    }

    /// Every field, grouped by owner then value kind.
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.contact_string
            .iter()
            .chain(&self.contact_numeric)
            .chain(&self.company_string)
            .chain(&self.company_numeric)
            .chain(&self.lead)
    }

    /// Look up a field reference among the fields of one owner and value kind.
    #[must_use]
    pub fn resolve<'a>(
        &'a self,
        owner: FieldOwner,
        value_kind: ValueKind,
        id: &'a str,
    ) -> FieldRef<'a> {
        let id_trimmed = id.trim();
        if id_trimmed.is_empty() {
            return FieldRef::Unset;
        }
        self.fields(owner, value_kind)
            .iter()
            .find(|field| field.id == id_trimmed)
            .map_or(FieldRef::Unresolved(id_trimmed), FieldRef::Resolved)
    }
}

fn to_fields(items: Vec<FieldOptionDto>, owner: FieldOwner, value_kind: ValueKind) -> Vec<Field> {
    items
        .into_iter()
        .map(|item| Field {
            id: item.value,
            label: item.label,
            owner,
            value_kind,
        })
        .collect()
}

/// Project fields 1:1 into select options, preserving order.
#[must_use]
pub fn select_options(fields: &[Field]) -> Vec<SelectOption> {
    fields
        .iter()
        .map(|field| SelectOption {
            id: field.id.clone(),
            label: field.label.clone(),
        })
        .collect()
}

/// Project fields into checkbox options named `prefix` + id.
#[must_use]
pub fn checkbox_options(
    fields: &[Field],
    selected: &BTreeSet<String>,
    prefix: &str,
) -> Vec<CheckboxOption> {
    fields
        .iter()
        .map(|field| CheckboxOption {
            id: field.id.clone(),
            label: format!("{}. {}", field.owner.group_label(), field.label),
            name: format!("{prefix}{}", field.id),
            checked: selected.contains(&field.id),
        })
        .collect()
}

/// Display label for a dependency type.
#[must_use]
pub const fn dependency_label(dependency: DependencyType) -> &'static str {
    match dependency {
        DependencyType::Quantity => "By quantity",
        DependencyType::Sum => "By sum",
    }
}

/// Display label for an entity kind.
#[must_use]
pub const fn entity_label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Contact => "Contact",
        EntityKind::Company => "Company",
    }
}

/// Static dependency type options.
#[must_use]
pub fn dependency_type_options() -> Vec<SelectOption> {
    DependencyType::all()
        .into_iter()
        .map(|dependency| SelectOption {
            id: dependency.as_str().to_string(),
            label: dependency_label(dependency).to_string(),
        })
        .collect()
}

/// Static entity type options.
#[must_use]
pub fn entity_type_options() -> Vec<SelectOption> {
    EntityKind::all()
        .into_iter()
        .map(|kind| SelectOption {
            id: kind.as_str().to_string(),
            label: entity_label(kind).to_string(),
        })
        .collect()
}
