use tierset_models::RuleRecord;

use super::model::{Rule, RuleForm, RuleTable};

impl Rule {
    /// Persisted form of the rule.
    #[must_use]
    pub fn to_record(&self) -> RuleRecord {
        RuleRecord {
            status: self.status.clone(),
            dependency_type: self.dependency_type,
            entity_type: self.entity_type,
            field_id: self.field_id.clone(),
            from_amount: self.from_amount,
            to_amount: self.to_amount,
        }
    }
}

impl From<&RuleRecord> for RuleForm {
    fn from(record: &RuleRecord) -> Self {
        Self {
            status: record.status.clone(),
            dependency_type: record.dependency_type,
            entity_type: record.entity_type,
            field_id: record.field_id.clone(),
            from_amount: record
                .from_amount
                .map(|value| value.to_string())
                .unwrap_or_default(),
            to_amount: record.to_amount.to_string(),
        }
    }
}

/// Map validated rules to the replacement list sent to the store.
#[must_use]
pub fn to_persisted(rules: &[Rule]) -> Vec<RuleRecord> {
    rules.iter().map(Rule::to_record).collect()
}

impl RuleTable {
    /// Replace every row with `records`, seeding one blank row when the list is empty.
    /// Identifiers keep increasing across replacements.
    pub fn replace_from_persisted(&mut self, records: &[RuleRecord]) {
        self.clear();
        for record in records {
            self.add_rule(Some(RuleForm::from(record)));
        }
        if self.is_empty() {
            self.add_rule(None);
        }
    }
}

/// Build a table from persisted records. An empty list yields one blank row.
#[must_use]
pub fn from_persisted(records: &[RuleRecord]) -> RuleTable {
    let mut table = RuleTable::new();
    table.replace_from_persisted(records);
    table
}
