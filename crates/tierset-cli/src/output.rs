//! Output renderers and formatting helpers for CLI commands.

use std::fmt::Write as _;

use anyhow::anyhow;
use serde::Serialize;
use serde_json::Value;
use tierset_editor::catalog::CheckboxOption;
use tierset_editor::ports::templates;
use tierset_editor::rules::StatusAssignment;
use tierset_editor::view::{CheckSectionView, RuleTableView};
use tierset_editor::{EditorSession, EntityKind, Notifier, TemplateRenderer};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Plain-text template renderer for terminals.
pub(crate) struct TextRenderer;

impl TemplateRenderer for TextRenderer {
    fn render(&self, template: &str, data: &Value) -> String {
        match template {
            templates::LOADING => "Loading settings...".to_string(),
            templates::SKELETON => "Tierset settings".to_string(),
            templates::CHECK_SECTION => render_check_section(data),
            templates::RULE_TABLE => render_rule_table(data),
            _ => data.to_string(),
        }
    }
}

/// Notifier writing operator messages to stderr.
pub(crate) struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, header: &str, message: &str) {
        eprintln!("{header}: {message}");
    }
}

fn text_at<'a>(data: &'a Value, pointer: &str) -> &'a str {
    data.pointer(pointer).and_then(Value::as_str).unwrap_or_default()
}

fn flag_at(data: &Value, pointer: &str) -> bool {
    data.pointer(pointer)
        .and_then(Value::as_bool)
        .unwrap_or_default()
}

fn selection_text(selection: Option<&Value>) -> String {
    let Some(selection) = selection else {
        return "-".to_string();
    };
    let id = text_at(selection, "/id");
    if id.is_empty() {
        "-".to_string()
    } else if flag_at(selection, "/unresolved") {
        format!("{id} (missing field)")
    } else {
        format!("{} ({id})", text_at(selection, "/label"))
    }
}

fn control_text(data: &Value, pointer: &str) -> String {
    let label = data
        .pointer(&format!("{pointer}/label"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    if flag_at(data, &format!("{pointer}/disabled")) {
        format!("[{label}] (disabled)")
    } else {
        format!("[{label}]")
    }
}

fn render_check_section(data: &Value) -> String {
    let kind = text_at(data, "/kind");
    let months = text_at(data, "/months");
    format!(
        "== {kind} check ==\nmonths:       {}\nlead field:   {}\n{kind} field: {}\n{} {}",
        if months.is_empty() { "-" } else { months },
        selection_text(data.get("lead_field")),
        selection_text(data.get("entity_field")),
        control_text(data, "/save"),
        control_text(data, "/run"),
    )
}

fn render_rule_table(data: &Value) -> String {
    let mut out = String::from("== status rules ==\n");
    let _ = writeln!(
        out,
        "{:>3} {:<20} {:<9} {:<8} {:<28} {:>10} {:>10}",
        "#", "STATUS", "BY", "ENTITY", "FIELD", "FROM", "TO"
    );
    for row in data
        .get("rows")
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice)
    {
        let position = row.get("position").and_then(Value::as_u64).unwrap_or_default();
        let _ = writeln!(
            out,
            "{:>3} {:<20} {:<9} {:<8} {:<28} {:>10} {:>10}",
            position,
            text_at(row, "/status"),
            text_at(row, "/dependency_type"),
            text_at(row, "/entity_type"),
            selection_text(row.get("field")),
            text_at(row, "/from_amount"),
            text_at(row, "/to_amount"),
        );
    }
    out.push_str(&control_text(data, "/save"));
    out
}

/// Print a value as pretty JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

/// Structured view of a started session.
#[derive(Serialize)]
struct SessionSnapshot {
    contact: Option<CheckSectionView>,
    company: Option<CheckSectionView>,
    rules: RuleTableView,
}

impl SessionSnapshot {
    fn capture(session: &EditorSession) -> Self {
        let section = |kind| {
            session.check_form(kind).map(|form| {
                CheckSectionView::build(kind, form, session.catalog(), session.controls())
            })
        };
        Self {
            contact: section(EntityKind::Contact),
            company: section(EntityKind::Company),
            rules: RuleTableView::build(session.rules(), session.catalog(), session.controls()),
        }
    }
}

pub(crate) fn render_session(session: &EditorSession, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&SessionSnapshot::capture(session))?,
        OutputFormat::Table => {
            for (_, markup) in session.view().iter() {
                println!("{markup}\n");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_rule_list(session: &EditorSession, format: OutputFormat) -> CliResult<()> {
    let view = RuleTableView::build(session.rules(), session.catalog(), session.controls());
    match format {
        OutputFormat::Json => print_json(&view)?,
        OutputFormat::Table => {
            let data = serde_json::to_value(&view)
                .map_err(|err| CliError::failure(anyhow!("failed to prepare rule table: {err}")))?;
            println!("{}", render_rule_table(&data));
        }
    }
    Ok(())
}

pub(crate) fn render_fields(options: &[CheckboxOption], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&options)?,
        OutputFormat::Table => {
            for option in options {
                let mark = if option.checked { 'x' } else { ' ' };
                println!("[{mark}] {:<40} {}", option.label, option.name);
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct CheckStatusRow {
    kind: EntityKind,
    running: bool,
}

pub(crate) fn render_check_status(
    statuses: &[(EntityKind, bool)],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<CheckStatusRow> = statuses
                .iter()
                .map(|&(kind, running)| CheckStatusRow { kind, running })
                .collect();
            print_json(&rows)?;
        }
        OutputFormat::Table => {
            for (kind, running) in statuses {
                let state = if *running { "running" } else { "idle" };
                println!("{:<8} {state}", kind.as_str());
            }
        }
    }
    Ok(())
}

pub(crate) fn render_assignments(
    assignments: &[StatusAssignment],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&assignments)?,
        OutputFormat::Table => {
            if assignments.is_empty() {
                println!("no rule matches");
            }
            for assignment in assignments {
                println!("field {:<10} <- {}", assignment.field_id, assignment.status);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn check_section_renders_selections_and_controls() {
        let data = json!({
            "kind": "contact",
            "months": "6",
            "lead_field": {"id": "1", "label": "Deals in 6 months", "unresolved": false},
            "entity_field": {"id": "44", "label": null, "unresolved": true},
            "save": {"label": "Save", "disabled": true},
            "run": {"label": "Check in progress", "disabled": true}
        });
        let text = TextRenderer.render(templates::CHECK_SECTION, &data);
        assert!(text.starts_with("== contact check =="));
        assert!(text.contains("Deals in 6 months (1)"));
        assert!(text.contains("44 (missing field)"));
        assert!(text.contains("[Check in progress] (disabled)"));
    }

    #[test]
    fn rule_table_lists_rows_in_order() {
        let data = json!({
            "rows": [
                {"position": 1, "status": "Won", "dependency_type": "sum", "entity_type": "company",
                 "field": {"id": "7", "label": "Company level", "unresolved": false},
                 "from_amount": "", "to_amount": "1000"},
                {"position": 2, "status": "", "dependency_type": "quantity", "entity_type": "contact",
                 "field": {"id": "", "label": null, "unresolved": false},
                 "from_amount": "", "to_amount": ""}
            ],
            "save": {"label": "Saved", "disabled": false}
        });
        let text = TextRenderer.render(templates::RULE_TABLE, &data);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].contains("Won") && lines[2].contains("Company level (7)"));
        assert!(lines[3].trim_start().starts_with('2'));
        assert_eq!(lines[4], "[Saved]");
    }

    #[test]
    fn unknown_templates_fall_back_to_json() {
        let text = TextRenderer.render("banner", &json!({"a": 1}));
        assert_eq!(text, r#"{"a":1}"#);
        assert_eq!(
            TextRenderer.render(templates::LOADING, &Value::Null),
            "Loading settings..."
        );
    }
}
