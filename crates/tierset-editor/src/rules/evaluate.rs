//! Status assignment preview.
//!
//! Mirrors what the background check does for one entity: every rule of the
//! entity's kind whose inclusive range contains the relevant aggregate assigns
//! its status to its field, in rule order.

use serde::Serialize;
use tierset_models::{DependencyType, EntityKind, RuleRecord};

/// A status the check would write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusAssignment {
    /// Field receiving the status.
    pub field_id: String,
    /// Status label.
    pub status: String,
}

/// Records that apply to one entity kind, in order.
#[must_use]
pub fn for_entity(records: &[RuleRecord], kind: EntityKind) -> Vec<&RuleRecord> {
    records
        .iter()
        .filter(|record| record.entity_type == kind)
        .collect()
}

/// Assignments for an entity with `quantity` successful deals summing to `sum`.
#[must_use]
pub fn evaluate(
    records: &[RuleRecord],
    kind: EntityKind,
    quantity: i64,
    sum: i64,
) -> Vec<StatusAssignment> {
    for_entity(records, kind)
        .into_iter()
        .filter(|record| {
            let value = match record.dependency_type {
                DependencyType::Quantity => quantity,
                DependencyType::Sum => sum,
            };
            value <= record.to_amount && record.from_amount.is_none_or(|from| value >= from)
        })
        .map(|record| StatusAssignment {
            field_id: record.field_id.clone(),
            status: record.status.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        status: &str,
        dependency_type: DependencyType,
        entity_type: EntityKind,
        from_amount: Option<i64>,
        to_amount: i64,
    ) -> RuleRecord {
        RuleRecord {
            status: status.to_string(),
            dependency_type,
            entity_type,
            field_id: "7".to_string(),
            from_amount,
            to_amount,
        }
    }

    #[test]
    fn bounds_are_inclusive_and_lower_bound_optional() {
        let records = vec![
            record("New", DependencyType::Quantity, EntityKind::Contact, None, 1),
            record("Regular", DependencyType::Quantity, EntityKind::Contact, Some(2), 5),
            record("Loyal", DependencyType::Quantity, EntityKind::Contact, Some(6), 1000),
        ];
        let statuses = |quantity| -> Vec<String> {
            evaluate(&records, EntityKind::Contact, quantity, 0)
                .into_iter()
                .map(|assignment| assignment.status)
                .collect()
        };
        assert_eq!(statuses(0), vec!["New"]);
        assert_eq!(statuses(2), vec!["Regular"]);
        assert_eq!(statuses(5), vec!["Regular"]);
        assert_eq!(statuses(6), vec!["Loyal"]);
        assert!(statuses(1001).is_empty());
    }

    #[test]
    fn dependency_type_selects_the_aggregate() {
        let records = vec![
            record("Big spender", DependencyType::Sum, EntityKind::Company, Some(10_000), 99_999),
            record("Frequent", DependencyType::Quantity, EntityKind::Company, Some(3), 10),
        ];
        let assignments = evaluate(&records, EntityKind::Company, 4, 50_000);
        assert_eq!(assignments.len(), 2);
        let only_sum = evaluate(&records, EntityKind::Company, 1, 50_000);
        assert_eq!(only_sum[0].status, "Big spender");
        assert_eq!(only_sum.len(), 1);
    }

    #[test]
    fn other_entity_rules_are_ignored() {
        let records = vec![
            record("Contact rule", DependencyType::Quantity, EntityKind::Contact, None, 10),
            record("Company rule", DependencyType::Quantity, EntityKind::Company, None, 10),
        ];
        assert_eq!(for_entity(&records, EntityKind::Company).len(), 1);
        let assignments = evaluate(&records, EntityKind::Company, 1, 1);
        assert_eq!(
            assignments,
            vec![StatusAssignment {
                field_id: "7".to_string(),
                status: "Company rule".to_string()
            }]
        );
    }
}
