//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tierset_editor::{DependencyType, EntityKind};
use tierset_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliResult, parse_url};
use crate::commands::checks::{handle_check_run, handle_check_status, handle_config_set};
use crate::commands::rules::{
    handle_evaluate, handle_rules_add, handle_rules_apply, handle_rules_list, handle_rules_remove,
};
use crate::commands::view::{handle_fields, handle_show};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api/";

/// Parses CLI arguments, installs logging, and executes the requested command.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.map_or_else(LogFormat::infer, LogFormat::from),
        build_sha: option_env!("TIERSET_BUILD_SHA").unwrap_or("dev"),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("error: {err:#}");
        return 3;
    }

    let command_name = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();
    let result = match AppContext::from_cli(&cli, &trace_id) {
        Ok(ctx) => dispatch(cli.command, &ctx).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => {
            tracing::debug!(command = command_name, %trace_id, "command completed");
            0
        }
        Err(err) => {
            let exit_code = err.exit_code();
            let message = err.display_message();
            tracing::warn!(command = command_name, %trace_id, exit_code, "command failed");
            eprintln!("error: {message}");
            exit_code
        }
    }
}

pub(crate) async fn dispatch(command: Command, ctx: &AppContext) -> CliResult<()> {
    match command {
        Command::Show => handle_show(ctx).await,
        Command::Fields => handle_fields(ctx).await,
        Command::Rules(rules) => match rules {
            RulesCommand::List => handle_rules_list(ctx).await,
            RulesCommand::Add(args) => handle_rules_add(ctx, args).await,
            RulesCommand::Remove(args) => handle_rules_remove(ctx, args).await,
            RulesCommand::Apply(args) => handle_rules_apply(ctx, args).await,
        },
        Command::Config(ConfigCommand::Set(args)) => handle_config_set(ctx, args).await,
        Command::Check(check) => match check {
            CheckCommand::Run(args) => handle_check_run(ctx, args).await,
            CheckCommand::Status => handle_check_status(ctx).await,
        },
        Command::Evaluate(args) => handle_evaluate(ctx, args).await,
    }
}

#[derive(Parser)]
#[command(name = "tierset", about = "Edit status rules and check settings")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "TIERSET_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(long, global = true, env = "TIERSET_API_KEY")]
    pub(crate) api_key: Option<String>,
    #[arg(
        long,
        global = true,
        env = "TIERSET_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(
        long,
        global = true,
        env = "TIERSET_EDITOR_CONFIG",
        help = "JSON file overriding notification texts and control labels"
    )]
    pub(crate) editor_config: Option<PathBuf>,
    #[arg(long, global = true, env = "TIERSET_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub(crate) log_level: String,
    #[arg(long, global = true, env = "TIERSET_LOG_FORMAT", value_enum)]
    pub(crate) log_format: Option<LogFormatArg>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Load every section and print it.
    Show,
    /// List catalog fields, marking the ones current settings reference.
    Fields,
    /// Edit the status rule table.
    #[command(subcommand)]
    Rules(RulesCommand),
    /// Edit check configurations.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Trigger checks or read their state.
    #[command(subcommand)]
    Check(CheckCommand),
    /// Preview the statuses persisted rules assign to one entity.
    Evaluate(EvaluateArgs),
}

#[derive(Subcommand)]
pub(crate) enum RulesCommand {
    List,
    Add(RuleAddArgs),
    Remove(RuleRemoveArgs),
    Apply(RuleApplyArgs),
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommand {
    Set(ConfigSetArgs),
}

#[derive(Subcommand)]
pub(crate) enum CheckCommand {
    Run(CheckRunArgs),
    Status,
}

#[derive(Args)]
pub(crate) struct RuleAddArgs {
    #[arg(long)]
    pub(crate) status: String,
    #[arg(long, value_enum, default_value_t = DependencyArg::Quantity)]
    pub(crate) dependency: DependencyArg,
    #[arg(long, value_enum, default_value_t = EntityArg::Contact)]
    pub(crate) entity: EntityArg,
    #[arg(long)]
    pub(crate) field: String,
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) from: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) to: String,
}

#[derive(Args)]
pub(crate) struct RuleRemoveArgs {
    #[arg(help = "1-based position shown by `rules list`")]
    pub(crate) index: usize,
}

#[derive(Args)]
pub(crate) struct RuleApplyArgs {
    #[arg(long, help = "JSON file holding the full replacement rule list")]
    pub(crate) file: PathBuf,
}

#[derive(Args)]
pub(crate) struct ConfigSetArgs {
    #[arg(value_enum)]
    pub(crate) entity: EntityArg,
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) months: Option<String>,
    #[arg(long)]
    pub(crate) lead_field: Option<String>,
    #[arg(long)]
    pub(crate) entity_field: Option<String>,
}

#[derive(Args)]
pub(crate) struct CheckRunArgs {
    #[arg(value_enum)]
    pub(crate) entity: EntityArg,
}

#[derive(Args)]
pub(crate) struct EvaluateArgs {
    #[arg(long, value_enum)]
    pub(crate) entity: EntityArg,
    #[arg(long, default_value_t = 0)]
    pub(crate) quantity: i64,
    #[arg(long, default_value_t = 0)]
    pub(crate) sum: i64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Default)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum EntityArg {
    Contact,
    Company,
}

impl From<EntityArg> for EntityKind {
    fn from(value: EntityArg) -> Self {
        match value {
            EntityArg::Contact => Self::Contact,
            EntityArg::Company => Self::Company,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum DependencyArg {
    Quantity,
    Sum,
}

impl From<DependencyArg> for DependencyType {
    fn from(value: DependencyArg) -> Self {
        match value {
            DependencyArg::Quantity => Self::Quantity,
            DependencyArg::Sum => Self::Sum,
        }
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Show => "show",
        Command::Fields => "fields",
        Command::Rules(RulesCommand::List) => "rules_list",
        Command::Rules(RulesCommand::Add(_)) => "rules_add",
        Command::Rules(RulesCommand::Remove(_)) => "rules_remove",
        Command::Rules(RulesCommand::Apply(_)) => "rules_apply",
        Command::Config(ConfigCommand::Set(_)) => "config_set",
        Command::Check(CheckCommand::Run(_)) => "check_run",
        Command::Check(CheckCommand::Status) => "check_status",
        Command::Evaluate(_) => "evaluate",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};

    fn parse(args: &[&str]) -> Result<Cli> {
        Cli::try_parse_from(std::iter::once("tierset").chain(args.iter().copied()))
            .map_err(|err| anyhow!(err.to_string()))
    }

    #[test]
    fn rule_add_parses_open_ended_rule() -> Result<()> {
        let cli = parse(&[
            "rules", "add", "--status", "Won", "--dependency", "sum", "--entity", "company",
            "--field", "7", "--to", "1000",
        ])?;
        let Command::Rules(RulesCommand::Add(args)) = cli.command else {
            return Err(anyhow!("expected rules add"));
        };
        assert_eq!(DependencyType::from(args.dependency), DependencyType::Sum);
        assert_eq!(EntityKind::from(args.entity), EntityKind::Company);
        assert!(args.from.is_none());
        assert_eq!(args.to, "1000");
        Ok(())
    }

    #[test]
    fn global_flags_apply_after_subcommands() -> Result<()> {
        let cli = parse(&[
            "check",
            "status",
            "--output",
            "json",
            "--api-url",
            "http://localhost:9000/crm",
        ])?;
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.api_url.as_str(), "http://localhost:9000/crm/");
        assert_eq!(command_label(&cli.command), "check_status");
        Ok(())
    }

    #[test]
    fn config_set_keeps_months_as_text() -> Result<()> {
        let cli = parse(&["config", "set", "contact", "--months", "3.7"])?;
        assert_eq!(command_label(&cli.command), "config_set");
        let Command::Config(ConfigCommand::Set(args)) = cli.command else {
            return Err(anyhow!("expected config set"));
        };
        assert_eq!(args.months.as_deref(), Some("3.7"));
        assert!(args.lead_field.is_none());
        Ok(())
    }

    #[test]
    fn unknown_entities_are_rejected() {
        assert!(parse(&["check", "run", "lead"]).is_err());
    }

    #[test]
    fn log_format_flag_maps_to_telemetry_format() {
        assert_eq!(LogFormat::from(LogFormatArg::Json), LogFormat::Json);
        assert_eq!(LogFormat::from(LogFormatArg::Pretty), LogFormat::Pretty);
    }
}
