//! HTTP transport, error types, and session wiring for the CLI.

use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use tierset_editor::{
    Collaborators, Control, EditorConfig, EditorError, EditorSession, Method, Transport,
    TransportError,
};
use tracing::debug;
use url::Url;

use crate::cli::{Cli, OutputFormat};
use crate::output::{StderrNotifier, TextRenderer};

pub(crate) const HEADER_API_KEY: &str = "x-tierset-api-key";
pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<EditorError> for CliError {
    fn from(err: EditorError) -> Self {
        match &err {
            EditorError::RuleValidation { violations } => Self::validation(
                violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            EditorError::CheckConfigValidation { kind, source } => {
                Self::validation(format!("{} check configuration: {source}", kind.as_str()))
            }
            EditorError::ControlDisabled { control } => Self::validation(match control {
                Control::Save(section) => {
                    format!("saving {} settings is disabled while a check runs", section.as_str())
                }
                Control::Run(kind) => {
                    format!("cannot start the {} check while a check runs", kind.as_str())
                }
            }),
            EditorError::UnknownRule { .. } => Self::validation(err.to_string()),
            EditorError::Request {
                source:
                    TransportError::Status {
                        status: 400 | 409 | 422,
                        detail,
                    },
                ..
            } => Self::validation(detail.clone().unwrap_or_else(|| err.to_string())),
            _ => Self::failure(err),
        }
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) transport: Arc<HttpTransport>,
    pub(crate) editor_config: EditorConfig,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Build the HTTP client and load editor overrides from the parsed flags.
    pub(crate) fn from_cli(cli: &Cli, trace_id: &str) -> CliResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(trace_id).map_err(|_| {
            CliError::failure(anyhow!("trace identifier contains invalid characters"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(Duration::from_secs(cli.timeout))
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        let api_key = parse_api_key(cli.api_key.clone())?;
        let editor_config = load_editor_config(cli.editor_config.as_deref())?;

        Ok(Self {
            transport: Arc::new(HttpTransport::new(client, cli.api_url.clone(), api_key)),
            editor_config,
            output: cli.output,
        })
    }

    pub(crate) fn collaborators(&self) -> Collaborators {
        Collaborators {
            transport: self.transport.clone(),
            notifier: Arc::new(StderrNotifier),
            renderer: Arc::new(TextRenderer),
        }
    }

    /// Start an editor session; any load failure aborts the command.
    pub(crate) async fn open_session(&self) -> CliResult<EditorSession> {
        let mut session = EditorSession::new(self.collaborators(), self.editor_config.clone());
        session.start().await?;
        Ok(session)
    }
}

/// [`Transport`] over HTTP with the operator's API key.
pub(crate) struct HttpTransport {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpTransport {
    pub(crate) const fn new(client: Client, base_url: Url, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, TransportError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| TransportError::Network {
                detail: format!("invalid request path '{path}': {err}"),
            })?;
        debug!(method = method.as_str(), %url, "sending request");

        let mut request = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        if let Some(key) = &self.api_key {
            request = request.header(HEADER_API_KEY, key);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|err| TransportError::Network {
                detail: err.to_string(),
            })?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| TransportError::Network {
                detail: format!("failed to read response body: {err}"),
            })?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                detail: problem_detail(&bytes),
            });
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(Deserialize)]
struct ProblemBody {
    detail: Option<String>,
    title: Option<String>,
    message: Option<String>,
}

/// Extract a human-readable message from an error response body.
fn problem_detail(bytes: &[u8]) -> Option<String> {
    if let Ok(problem) = serde_json::from_slice::<ProblemBody>(bytes)
        && let Some(text) = problem.detail.or(problem.title).or(problem.message)
    {
        return Some(text);
    }
    let text = String::from_utf8_lossy(bytes).trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Parse the API URL provided to the CLI. Paths are resolved relative to it.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    let mut url = input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse the API key provided to the CLI.
pub(crate) fn parse_api_key(input: Option<String>) -> CliResult<Option<String>> {
    let Some(raw) = input else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CliError::validation("API key cannot be an empty string"));
    }
    Ok(Some(trimmed.to_string()))
}

/// Load editor overrides from a JSON file, or the defaults when no file is given.
pub(crate) fn load_editor_config(path: Option<&Path>) -> CliResult<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .map_err(CliError::failure)?;
    EditorConfig::from_json(&text).map_err(|err| {
        CliError::validation(format!(
            "editor config {} is invalid: {err}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::prelude::*;
    use serde_json::json;
    use tierset_editor::{EntityKind, Method, Section};

    fn transport_for(server: &MockServer, api_key: Option<&str>) -> Result<HttpTransport> {
        let base_url = parse_url(&server.base_url()).map_err(|err| anyhow!(err))?;
        Ok(HttpTransport::new(
            Client::new(),
            base_url,
            api_key.map(str::to_string),
        ))
    }

    #[tokio::test]
    async fn get_decodes_json_and_sends_api_key() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/settings/contact-check-status")
                .header(HEADER_API_KEY, "secret");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!(true));
        });

        let transport = transport_for(&server, Some("secret"))?;
        let body = transport
            .request(Method::Get, "settings/contact-check-status", None)
            .await?;
        assert_eq!(body, json!(true));
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn post_sends_body_and_maps_empty_response_to_null() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/settings/status")
                .json_body(json!([]));
            then.status(204);
        });

        let transport = transport_for(&server, None)?;
        let body = transport
            .request(Method::Post, "settings/status", Some(json!([])))
            .await?;
        assert_eq!(body, Value::Null);
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn error_status_carries_problem_detail() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/settings/company");
            then.status(422)
                .header("content-type", "application/json")
                .json_body(json!({"detail": "months out of range"}));
        });

        let transport = transport_for(&server, None)?;
        let err = transport
            .request(Method::Post, "settings/company", Some(json!({})))
            .await
            .expect_err("store rejects");
        assert!(matches!(
            err,
            TransportError::Status { status: 422, detail: Some(ref detail) } if detail == "months out of range"
        ));
        Ok(())
    }

    #[test]
    fn parse_url_keeps_nested_base_paths() -> Result<()> {
        let url = parse_url("https://crm.example.com/api/v2").map_err(|err| anyhow!(err))?;
        assert_eq!(url.as_str(), "https://crm.example.com/api/v2/");
        assert_eq!(
            url.join("settings/status")?.as_str(),
            "https://crm.example.com/api/v2/settings/status"
        );
        assert!(parse_url("not a url").is_err());
        Ok(())
    }

    #[test]
    fn parse_api_key_rejects_blank_values() {
        assert!(matches!(parse_api_key(None), Ok(None)));
        assert!(matches!(
            parse_api_key(Some(" key ".to_string())),
            Ok(Some(ref key)) if key == "key"
        ));
        assert!(matches!(
            parse_api_key(Some("   ".to_string())),
            Err(CliError::Validation(_))
        ));
    }

    #[test]
    fn editor_errors_map_to_exit_codes() {
        let validation = CliError::from(EditorError::ControlDisabled {
            control: Control::Save(Section::Contact),
        });
        assert_eq!(validation.exit_code(), 2);
        assert!(validation.display_message().contains("contact"));

        let rejected = CliError::from(EditorError::Request {
            operation: "save_check_config",
            path: "settings/company",
            source: TransportError::Status {
                status: 409,
                detail: Some("check running".to_string()),
            },
        });
        assert_eq!(rejected.display_message(), "check running");

        let failure = CliError::from(EditorError::Request {
            operation: "run_check",
            path: "settings/run-company-check",
            source: TransportError::Status {
                status: 502,
                detail: None,
            },
        });
        assert_eq!(failure.exit_code(), 3);
        assert!(failure.display_message().contains("run_check failed"));

        let not_loaded = CliError::from(EditorError::NotLoaded {
            section: Section::of(EntityKind::Company),
        });
        assert_eq!(not_loaded.exit_code(), 3);
    }

    #[test]
    fn missing_editor_config_file_uses_defaults() -> Result<()> {
        let config = load_editor_config(None).map_err(|err| anyhow!(err.display_message()))?;
        assert_eq!(config, EditorConfig::default());
        Ok(())
    }
}
