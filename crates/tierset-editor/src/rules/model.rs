use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use tierset_models::{DependencyType, EntityKind};

/// Stable identity of a rule row within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RuleId(u64);

impl Display for RuleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "rule-{}", self.0)
    }
}

/// A validated rule ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Status label written when the rule matches.
    pub status: String,
    /// Aggregate compared against the range.
    pub dependency_type: DependencyType,
    /// Entity kind the rule applies to.
    pub entity_type: EntityKind,
    /// Target text field.
    pub field_id: String,
    /// Inclusive lower bound, absent for "up to" rules.
    pub from_amount: Option<i64>,
    /// Inclusive upper bound.
    pub to_amount: i64,
}

/// Editable rule row state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleForm {
    /// Status label entered in the editor.
    pub status: String,
    /// Selected dependency type.
    pub dependency_type: DependencyType,
    /// Selected entity kind.
    pub entity_type: EntityKind,
    /// Selected target field identifier.
    pub field_id: String,
    /// Lower bound text; empty means open-ended.
    pub from_amount: String,
    /// Upper bound text.
    pub to_amount: String,
}

impl Default for RuleForm {
    fn default() -> Self {
        Self {
            status: String::new(),
            dependency_type: DependencyType::Quantity,
            entity_type: EntityKind::Contact,
            field_id: String::new(),
            from_amount: String::new(),
            to_amount: String::new(),
        }
    }
}

impl From<&Rule> for RuleForm {
    fn from(rule: &Rule) -> Self {
        Self {
            status: rule.status.clone(),
            dependency_type: rule.dependency_type,
            entity_type: rule.entity_type,
            field_id: rule.field_id.clone(),
            from_amount: rule.from_amount.map(|value| value.to_string()).unwrap_or_default(),
            to_amount: rule.to_amount.to_string(),
        }
    }
}

/// Single-attribute edit coming from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleEdit {
    /// Replace the status label.
    Status(String),
    /// Select a dependency type.
    DependencyType(DependencyType),
    /// Select an entity kind. Switching kinds clears the field selection.
    EntityType(EntityKind),
    /// Select a target field.
    Field(String),
    /// Replace the lower bound text.
    FromAmount(String),
    /// Replace the upper bound text.
    ToAmount(String),
}

impl RuleForm {
    /// Apply one edit in place.
    pub fn apply(&mut self, edit: RuleEdit) {
        match edit {
            RuleEdit::Status(value) => self.status = value,
            RuleEdit::DependencyType(value) => self.dependency_type = value,
            RuleEdit::EntityType(value) => {
                if self.entity_type != value {
                    self.field_id.clear();
                }
                self.entity_type = value;
            }
            RuleEdit::Field(value) => self.field_id = value,
            RuleEdit::FromAmount(value) => self.from_amount = value,
            RuleEdit::ToAmount(value) => self.to_amount = value,
        }
    }
}

/// A rule row: identity plus form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRow {
    /// Row identity.
    pub id: RuleId,
    /// Current form state.
    pub form: RuleForm,
}

/// Ordered rule rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rows: Vec<RuleRow>,
    next_id: u64,
}

impl RuleTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row, blank unless `initial` is given.
    pub fn add_rule(&mut self, initial: Option<RuleForm>) -> RuleId {
        let id = RuleId(self.next_id);
        self.next_id += 1;
        self.rows.push(RuleRow {
            id,
            form: initial.unwrap_or_default(),
        });
        id
    }

    /// Remove a row by identity, returning its last form state.
    pub fn remove_rule(&mut self, id: RuleId) -> Option<RuleForm> {
        let index = self.rows.iter().position(|row| row.id == id)?;
        Some(self.rows.remove(index).form)
    }

    /// Apply an edit to one row. Returns `false` when the row does not exist.
    pub fn update_field(&mut self, id: RuleId, edit: RuleEdit) -> bool {
        self.rows
            .iter_mut()
            .find(|row| row.id == id)
            .map(|row| row.form.apply(edit))
            .is_some()
    }

    /// Drop every row. Identifiers keep increasing.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Rows in display order.
    #[must_use]
    pub fn rows(&self) -> &[RuleRow] {
        &self.rows
    }

    /// Form state of one row.
    #[must_use]
    pub fn get(&self, id: RuleId) -> Option<&RuleForm> {
        self.rows.iter().find(|row| row.id == id).map(|row| &row.form)
    }

    /// Identifier of the row at a display position.
    #[must_use]
    pub fn id_at(&self, index: usize) -> Option<RuleId> {
        self.rows.get(index).map(|row| row.id)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
