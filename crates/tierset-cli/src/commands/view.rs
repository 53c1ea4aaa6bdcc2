use std::collections::BTreeSet;

use tierset_editor::catalog::checkbox_options;
use tierset_editor::{EditorSession, EntityKind, FieldOwner, ValueKind};

use crate::client::{AppContext, CliResult};
use crate::output::{render_fields, render_session};

const FIELD_INPUT_PREFIX: &str = "field_";

const FIELD_GROUPS: [(FieldOwner, ValueKind); 5] = [
    (FieldOwner::Contact, ValueKind::String),
    (FieldOwner::Contact, ValueKind::Numeric),
    (FieldOwner::Company, ValueKind::String),
    (FieldOwner::Company, ValueKind::Numeric),
    (FieldOwner::Lead, ValueKind::Numeric),
];

pub(crate) async fn handle_show(ctx: &AppContext) -> CliResult<()> {
    let session = ctx.open_session().await?;
    render_session(&session, ctx.output)
}

pub(crate) async fn handle_fields(ctx: &AppContext) -> CliResult<()> {
    let session = ctx.open_session().await?;
    let referenced = referenced_fields(&session);
    let catalog = session.catalog();
    let options: Vec<_> = FIELD_GROUPS
        .into_iter()
        .flat_map(|(owner, value_kind)| {
            checkbox_options(
                catalog.fields(owner, value_kind),
                &referenced,
                FIELD_INPUT_PREFIX,
            )
        })
        .collect();
    render_fields(&options, ctx.output)
}

/// Field identifiers referenced by rules or check configurations.
fn referenced_fields(session: &EditorSession) -> BTreeSet<String> {
    let rule_fields = session
        .rules()
        .rows()
        .iter()
        .map(|row| row.form.field_id.trim());
    let check_fields = EntityKind::all()
        .into_iter()
        .filter_map(|kind| session.check_form(kind))
        .flat_map(|form| [form.lead_field_id.trim(), form.entity_field_id.trim()]);
    rule_fields
        .chain(check_fields)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
