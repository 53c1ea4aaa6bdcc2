use anyhow::Context;
use tierset_editor::rules::evaluate;
use tierset_editor::sync::SettingsSync;
use tierset_editor::{EditorSession, EntityKind, RuleForm, RuleRecord, RuleTable};
use tracing::debug;

use crate::cli::{EvaluateArgs, RuleAddArgs, RuleApplyArgs, RuleRemoveArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_assignments, render_rule_list};

pub(crate) async fn handle_rules_list(ctx: &AppContext) -> CliResult<()> {
    let session = ctx.open_session().await?;
    render_rule_list(&session, ctx.output)
}

pub(crate) async fn handle_rules_add(ctx: &AppContext, args: RuleAddArgs) -> CliResult<()> {
    let mut session = ctx.open_session().await?;
    drop_placeholder_row(&mut session)?;
    session.add_rule(Some(RuleForm {
        status: args.status,
        dependency_type: args.dependency.into(),
        entity_type: args.entity.into(),
        field_id: args.field,
        from_amount: args.from.unwrap_or_default(),
        to_amount: args.to,
    }))?;
    session.save_rules().await?;
    println!("Rule added; {} rules saved.", session.rules().len());
    Ok(())
}

pub(crate) async fn handle_rules_remove(ctx: &AppContext, args: RuleRemoveArgs) -> CliResult<()> {
    let position = args.index;
    let mut session = ctx.open_session().await?;
    let id = position
        .checked_sub(1)
        .and_then(|index| session.rules().id_at(index))
        .ok_or_else(|| CliError::validation(format!("no rule at position {position}")))?;
    session.remove_rule(id)?;
    session.save_rules().await?;
    println!("Rule {position} removed.");
    Ok(())
}

pub(crate) async fn handle_rules_apply(ctx: &AppContext, args: RuleApplyArgs) -> CliResult<()> {
    let payload = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))
        .map_err(CliError::failure)?;
    let records: Vec<RuleRecord> = serde_json::from_str(&payload)
        .map_err(|err| CliError::validation(format!("rule file is not a rule list: {err}")))?;

    let mut session = ctx.open_session().await?;
    session.replace_rules(&records)?;
    drop_placeholder_row(&mut session)?;
    session.save_rules().await?;
    println!("{} rules saved.", records.len());
    Ok(())
}

pub(crate) async fn handle_evaluate(ctx: &AppContext, args: EvaluateArgs) -> CliResult<()> {
    let kind = EntityKind::from(args.entity);
    let records = SettingsSync::new(ctx.transport.as_ref())
        .load_rules()
        .await
        .context("failed to load status rules")
        .map_err(CliError::failure)?;
    let assignments = evaluate(&records, kind, args.quantity, args.sum);
    debug!(
        kind = kind.as_str(),
        rules = records.len(),
        matched = assignments.len(),
        "evaluated status rules"
    );
    render_assignments(&assignments, ctx.output)
}

/// The editor seeds one blank row for an empty rule set; drop it before a non-interactive save.
fn drop_placeholder_row(session: &mut EditorSession) -> CliResult<()> {
    if is_placeholder(session.rules())
        && let Some(id) = session.rules().id_at(0)
    {
        session.remove_rule(id)?;
    }
    Ok(())
}

fn is_placeholder(table: &RuleTable) -> bool {
    table.len() == 1 && table.rows().iter().all(|row| row.form == RuleForm::default())
}
