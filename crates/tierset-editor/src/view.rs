//! Render data and the rendered-markup map.
//!
//! # Design
//! - Render data is built from typed state; markup is never read back.
//! - Field references missing from the catalog are rendered with `unresolved: true`.

use std::collections::BTreeMap;

use serde::Serialize;
use tierset_models::{DependencyType, EntityKind};

use crate::catalog::{
    FieldCatalog, FieldOwner, FieldRef, SelectOption, ValueKind, dependency_type_options,
    entity_type_options, select_options,
};
use crate::checks::CheckConfigForm;
use crate::controls::{Control, ControlPanel, ControlState, Section};
use crate::rules::{RuleId, RuleTable};

/// Places in the page a template renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// Loading indicator.
    Loading,
    /// Page skeleton.
    Skeleton,
    /// Check configuration section of one kind.
    Check(EntityKind),
    /// Status rule table.
    RuleTable,
}

/// Current markup per slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedView {
    slots: BTreeMap<Slot, String>,
}

impl RenderedView {
    /// Replace the markup of a slot.
    pub fn set(&mut self, slot: Slot, markup: String) {
        self.slots.insert(slot, markup);
    }

    /// Drop a slot.
    pub fn remove(&mut self, slot: Slot) -> Option<String> {
        self.slots.remove(&slot)
    }

    /// Markup of a slot.
    #[must_use]
    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.slots.get(&slot).map(String::as_str)
    }

    /// Rendered slots in page order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &str)> {
        self.slots.iter().map(|(slot, markup)| (*slot, markup.as_str()))
    }
}

/// A field selection as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionView {
    /// Selected identifier; empty when nothing is selected.
    pub id: String,
    /// Field label when the field exists.
    pub label: Option<String>,
    /// Whether the identifier is missing from the catalog.
    pub unresolved: bool,
}

impl SelectionView {
    fn resolve(catalog: &FieldCatalog, owner: FieldOwner, value_kind: ValueKind, id: &str) -> Self {
        match catalog.resolve(owner, value_kind, id) {
            FieldRef::Unset => Self {
                id: String::new(),
                label: None,
                unresolved: false,
            },
            FieldRef::Resolved(field) => Self {
                id: field.id.clone(),
                label: Some(field.label.clone()),
                unresolved: false,
            },
            FieldRef::Unresolved(id) => Self {
                id: id.to_string(),
                label: None,
                unresolved: true,
            },
        }
    }
}

/// Render data of a check configuration section.
#[derive(Debug, Clone, Serialize)]
pub struct CheckSectionView {
    /// Entity kind of the section.
    pub kind: EntityKind,
    /// Months text.
    pub months: String,
    /// Selected lead field.
    pub lead_field: SelectionView,
    /// Selected entity field.
    pub entity_field: SelectionView,
    /// Lead field choices.
    pub lead_options: Vec<SelectOption>,
    /// Entity field choices.
    pub entity_options: Vec<SelectOption>,
    /// Save control.
    pub save: ControlState,
    /// Run control.
    pub run: ControlState,
}

impl CheckSectionView {
    /// Build the section data from form state.
    #[must_use]
    pub fn build(
        kind: EntityKind,
        form: &CheckConfigForm,
        catalog: &FieldCatalog,
        controls: &ControlPanel,
    ) -> Self {
        Self {
            kind,
            months: form.months.clone(),
            lead_field: SelectionView::resolve(
                catalog,
                FieldOwner::Lead,
                ValueKind::Numeric,
                &form.lead_field_id,
            ),
            entity_field: SelectionView::resolve(
                catalog,
                kind.into(),
                ValueKind::Numeric,
                &form.entity_field_id,
            ),
            lead_options: select_options(catalog.lead_fields()),
            entity_options: select_options(catalog.aggregate_fields(kind)),
            save: controls.state(Control::Save(Section::of(kind))),
            run: controls.state(Control::Run(kind)),
        }
    }
}

/// Render data of one rule row.
#[derive(Debug, Clone, Serialize)]
pub struct RuleRowView {
    /// Row identity.
    pub id: RuleId,
    /// 1-based display position.
    pub position: usize,
    /// Status text.
    pub status: String,
    /// Selected dependency type.
    pub dependency_type: DependencyType,
    /// Selected entity kind.
    pub entity_type: EntityKind,
    /// Selected target field.
    pub field: SelectionView,
    /// Target field choices for the selected entity kind.
    pub field_options: Vec<SelectOption>,
    /// Lower bound text.
    pub from_amount: String,
    /// Upper bound text.
    pub to_amount: String,
}

/// Render data of the rule table.
#[derive(Debug, Clone, Serialize)]
pub struct RuleTableView {
    /// Rows in display order.
    pub rows: Vec<RuleRowView>,
    /// Dependency type choices.
    pub dependency_types: Vec<SelectOption>,
    /// Entity kind choices.
    pub entity_types: Vec<SelectOption>,
    /// Save control.
    pub save: ControlState,
}

impl RuleTableView {
    /// Build the table data from the rule rows.
    #[must_use]
    pub fn build(table: &RuleTable, catalog: &FieldCatalog, controls: &ControlPanel) -> Self {
        let rows = table
            .rows()
            .iter()
            .enumerate()
            .map(|(index, row)| RuleRowView {
                id: row.id,
                position: index + 1,
                status: row.form.status.clone(),
                dependency_type: row.form.dependency_type,
                entity_type: row.form.entity_type,
                field: SelectionView::resolve(
                    catalog,
                    row.form.entity_type.into(),
                    ValueKind::String,
                    &row.form.field_id,
                ),
                field_options: select_options(catalog.status_fields(row.form.entity_type)),
                from_amount: row.form.from_amount.clone(),
                to_amount: row.form.to_amount.clone(),
            })
            .collect();
        Self {
            rows,
            dependency_types: dependency_type_options(),
            entity_types: entity_type_options(),
            save: controls.state(Control::Save(Section::Rules)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlLabels;
    use crate::rules::RuleForm;
    use crate::testing::sample_catalog;

    #[test]
    fn rows_referencing_missing_fields_are_flagged() {
        let catalog = sample_catalog();
        let mut table = RuleTable::new();
        table.add_rule(Some(RuleForm {
            status: "Gold".to_string(),
            entity_type: EntityKind::Company,
            field_id: "404".to_string(),
            ..RuleForm::default()
        }));
        table.add_rule(Some(RuleForm {
            entity_type: EntityKind::Company,
            field_id: "7".to_string(),
            ..RuleForm::default()
        }));
        let view = RuleTableView::build(&table, &catalog, &ControlPanel::new(ControlLabels::default()));

        assert!(view.rows[0].field.unresolved);
        assert_eq!(view.rows[0].field.id, "404");
        assert!(!view.rows[1].field.unresolved);
        assert_eq!(view.rows[1].field.label.as_deref(), Some("Company level"));
        assert_eq!(view.rows[1].position, 2);
        assert_eq!(view.rows[1].field_options.len(), 2);
        assert!(view.save.disabled);
    }

    #[test]
    fn check_section_resolves_numeric_fields() {
        let catalog = sample_catalog();
        let form = CheckConfigForm {
            months: "6".to_string(),
            lead_field_id: "1".to_string(),
            entity_field_id: String::new(),
        };
        let mut controls = ControlPanel::new(ControlLabels::default());
        controls.attach(Section::Contact);
        let view = CheckSectionView::build(EntityKind::Contact, &form, &catalog, &controls);

        assert_eq!(view.lead_field.label.as_deref(), Some("Deals in 6 months"));
        assert_eq!(view.entity_field.id, "");
        assert!(!view.entity_field.unresolved);
        assert_eq!(view.entity_options.len(), 1);
        assert!(!view.run.disabled);
        assert_eq!(view.run.label, "Run check");
    }

    #[test]
    fn rendered_view_keeps_page_order() {
        let mut view = RenderedView::default();
        view.set(Slot::RuleTable, "table".to_string());
        view.set(Slot::Loading, "loading".to_string());
        view.set(Slot::Check(EntityKind::Company), "company".to_string());
        view.set(Slot::Check(EntityKind::Contact), "contact".to_string());
        assert_eq!(view.remove(Slot::Loading).as_deref(), Some("loading"));
        let order: Vec<Slot> = view.iter().map(|(slot, _)| slot).collect();
        assert_eq!(
            order,
            vec![
                Slot::Check(EntityKind::Contact),
                Slot::Check(EntityKind::Company),
                Slot::RuleTable
            ]
        );
    }
}
