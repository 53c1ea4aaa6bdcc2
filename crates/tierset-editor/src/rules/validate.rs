use std::fmt::{self, Display, Formatter};

use super::model::{Rule, RuleForm, RuleId, RuleTable};

/// Validation checks, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCheck {
    /// Status label must not be empty.
    Status,
    /// Upper bound must be present and numeric.
    UpperBound,
    /// Lower bound, when present, must be numeric and not above the upper bound.
    Range,
    /// A target field must be selected.
    Field,
}

impl RuleCheck {
    const ORDER: [Self; 4] = [Self::Status, Self::UpperBound, Self::Range, Self::Field];
}

/// Amount input a violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountBound {
    /// The `from` input.
    From,
    /// The `to` input.
    To,
}

/// What is wrong with a rule row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Status label is empty.
    MissingStatus,
    /// Upper bound is empty.
    MissingUpperBound,
    /// An amount is present but not an integer.
    InvalidAmount {
        /// Which bound failed to parse.
        bound: AmountBound,
        /// The offending text.
        value: String,
    },
    /// Lower bound is greater than the upper bound.
    RangeInverted {
        /// Parsed lower bound.
        from: i64,
        /// Parsed upper bound.
        to: i64,
    },
    /// No target field selected.
    MissingField,
}

impl ViolationKind {
    /// Check that reports this violation.
    #[must_use]
    pub const fn check(&self) -> RuleCheck {
        match self {
            Self::MissingStatus => RuleCheck::Status,
            Self::MissingUpperBound
            | Self::InvalidAmount {
                bound: AmountBound::To,
                ..
            } => RuleCheck::UpperBound,
            Self::InvalidAmount {
                bound: AmountBound::From,
                ..
            }
            | Self::RangeInverted { .. } => RuleCheck::Range,
            Self::MissingField => RuleCheck::Field,
        }
    }
}

/// A failed check on one rule row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    /// Row that failed.
    pub rule: RuleId,
    /// One-based display position of the row.
    pub position: usize,
    /// Failure detail.
    pub kind: ViolationKind,
}

impl Display for RuleViolation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let position = self.position;
        match &self.kind {
            ViolationKind::MissingStatus => write!(formatter, "row {position}: status is required"),
            ViolationKind::MissingUpperBound => {
                write!(formatter, "row {position}: \"to\" amount is required")
            }
            ViolationKind::InvalidAmount { bound, value } => {
                let name = match bound {
                    AmountBound::From => "from",
                    AmountBound::To => "to",
                };
                write!(
                    formatter,
                    "row {position}: \"{name}\" amount '{value}' must be an integer"
                )
            }
            ViolationKind::RangeInverted { from, to } => write!(
                formatter,
                "row {position}: \"from\" amount {from} is greater than \"to\" amount {to}"
            ),
            ViolationKind::MissingField => write!(formatter, "row {position}: select a field"),
        }
    }
}

impl RuleTable {
    /// Validate every row.
    ///
    /// # Errors
    ///
    /// Returns the first failing row for each check, in check order. Any violation
    /// rejects the whole table.
    pub fn validate_all(&self) -> Result<Vec<Rule>, Vec<RuleViolation>> {
        let inspected: Vec<Result<Rule, Vec<ViolationKind>>> =
            self.rows().iter().map(|row| inspect(&row.form)).collect();

        let violations: Vec<RuleViolation> = RuleCheck::ORDER
            .into_iter()
            .filter_map(|check| {
                self.rows()
                    .iter()
                    .zip(&inspected)
                    .enumerate()
                    .find_map(|(index, (row, result))| {
                        let kinds = result.as_ref().err()?;
                        let kind = kinds.iter().find(|kind| kind.check() == check)?;
                        Some(RuleViolation {
                            rule: row.id,
                            position: index + 1,
                            kind: kind.clone(),
                        })
                    })
            })
            .collect();

        if violations.is_empty() {
            Ok(inspected.into_iter().flatten().collect())
        } else {
            Err(violations)
        }
    }
}

fn inspect(form: &RuleForm) -> Result<Rule, Vec<ViolationKind>> {
    let mut problems = Vec::new();

    let status = form.status.trim();
    if status.is_empty() {
        problems.push(ViolationKind::MissingStatus);
    }

    let to_amount = match parse_amount(&form.to_amount) {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            problems.push(ViolationKind::MissingUpperBound);
            None
        }
        Err(()) => {
            problems.push(ViolationKind::InvalidAmount {
                bound: AmountBound::To,
                value: form.to_amount.trim().to_string(),
            });
            None
        }
    };

    let from_amount = parse_amount(&form.from_amount).unwrap_or_else(|()| {
        problems.push(ViolationKind::InvalidAmount {
            bound: AmountBound::From,
            value: form.from_amount.trim().to_string(),
        });
        None
    });

    if let (Some(from), Some(to)) = (from_amount, to_amount)
        && from > to
    {
        problems.push(ViolationKind::RangeInverted { from, to });
    }

    let field_id = form.field_id.trim();
    if field_id.is_empty() {
        problems.push(ViolationKind::MissingField);
    }

    match to_amount {
        Some(to_amount) if problems.is_empty() => Ok(Rule {
            status: status.to_string(),
            dependency_type: form.dependency_type,
            entity_type: form.entity_type,
            field_id: field_id.to_string(),
            from_amount,
            to_amount,
        }),
        _ => Err(problems),
    }
}

fn parse_amount(value: &str) -> Result<Option<i64>, ()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse::<i64>().map(Some).map_err(|_| ())
}
