use tierset_editor::{CheckEdit, EntityKind};

use crate::cli::{CheckRunArgs, ConfigSetArgs};
use crate::client::{AppContext, CliResult};
use crate::output::render_check_status;

pub(crate) async fn handle_config_set(ctx: &AppContext, args: ConfigSetArgs) -> CliResult<()> {
    let kind = EntityKind::from(args.entity);
    let edits = [
        args.months.map(CheckEdit::Months),
        args.lead_field.map(CheckEdit::LeadField),
        args.entity_field.map(CheckEdit::EntityField),
    ];

    let mut session = ctx.open_session().await?;
    for edit in edits.into_iter().flatten() {
        session.update_check_config(kind, edit)?;
    }
    session.save_check_config(kind).await?;
    println!("{} check configuration saved.", kind.as_str());
    Ok(())
}

pub(crate) async fn handle_check_run(ctx: &AppContext, args: CheckRunArgs) -> CliResult<()> {
    let kind = EntityKind::from(args.entity);
    let mut session = ctx.open_session().await?;
    session.run_check(kind).await?;
    println!("{} check started.", kind.as_str());
    Ok(())
}

pub(crate) async fn handle_check_status(ctx: &AppContext) -> CliResult<()> {
    let session = ctx.open_session().await?;
    let statuses: Vec<(EntityKind, bool)> = EntityKind::all()
        .into_iter()
        .map(|kind| (kind, session.controls().check_running(kind)))
        .collect();
    render_check_status(&statuses, ctx.output)
}
