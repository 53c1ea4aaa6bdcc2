//! Command handlers grouped by concern.

pub(crate) mod checks;
pub(crate) mod rules;
pub(crate) mod view;

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use anyhow::{Result, anyhow};
    use httpmock::prelude::*;
    use reqwest::Client;
    use serde_json::{Value, json};
    use tierset_editor::EditorConfig;

    use crate::cli::OutputFormat;
    use crate::client::{AppContext, HEADER_API_KEY, HttpTransport, parse_url};

    pub(crate) const API_KEY: &str = "secret";

    pub(crate) fn context(server: &MockServer) -> Result<AppContext> {
        let base_url = parse_url(&server.base_url()).map_err(|err| anyhow!(err))?;
        Ok(AppContext {
            transport: Arc::new(HttpTransport::new(
                Client::new(),
                base_url,
                Some(API_KEY.to_string()),
            )),
            editor_config: EditorConfig::default(),
            output: OutputFormat::Table,
        })
    }

    fn mock_get(server: &MockServer, path: &'static str, body: Value) {
        server.mock(move |when, then| {
            when.method(GET).path(path).header(HEADER_API_KEY, API_KEY);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(body);
        });
    }

    /// Serve the catalog, the given rules, both check configurations and check states.
    pub(crate) fn mock_settings(server: &MockServer, rules: Value, company_running: bool) {
        mock_get(
            server,
            "/settings/get-custom-fields",
            json!({
                "leadFields": [{"value": 1, "label": "Deals in 6 months"}],
                "companyStringFields": [{"value": 7, "label": "Company level"}],
                "companyNumericFields": [{"value": 9, "label": "Payments"}],
                "contactStringFields": [{"value": 3, "label": "Contact level"}],
                "contactNumericFields": [{"value": 4, "label": "Deals count"}]
            }),
        );
        mock_get(server, "/settings/status", rules);
        mock_get(
            server,
            "/settings/contact",
            json!({"months": 6, "lead_field_id": "1", "contact_field_id": "4"}),
        );
        mock_get(server, "/settings/company", Value::Null);
        mock_get(server, "/settings/contact-check-status", json!(false));
        mock_get(
            server,
            "/settings/company-check-status",
            json!(company_running),
        );
    }
}
