//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tierset_models::CustomFieldsResponse;

use crate::catalog::FieldCatalog;
use crate::error::TransportError;
use crate::ports::{Collaborators, Method, Notifier, TemplateRenderer, Transport};
use crate::session::SessionHandle;

#[derive(Debug, Clone)]
enum Reply {
    Json(Value),
    Status(u16),
}

/// A request seen by [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) body: Option<Value>,
}

/// Transport answering from a fixed route table and recording every request.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), Reply>>,
    requests: Mutex<Vec<RecordedRequest>>,
    destroy_on: Mutex<Option<(String, SessionHandle)>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply_json(&self, method: Method, path: &str, body: Value) {
        self.routes
            .lock()
            .expect("routes lock")
            .insert((method, path.to_string()), Reply::Json(body));
    }

    pub(crate) fn reply_status(&self, method: Method, path: &str, status: u16) {
        self.routes
            .lock()
            .expect("routes lock")
            .insert((method, path.to_string()), Reply::Status(status));
    }

    /// Destroy the session while the request to `path` is in flight.
    pub(crate) fn destroy_during(&self, path: &str, handle: SessionHandle) {
        *self.destroy_on.lock().expect("destroy lock") = Some((path.to_string(), handle));
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    pub(crate) fn paths(&self) -> Vec<(Method, String)> {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .map(|request| (request.method, request.path.clone()))
            .collect()
    }

    pub(crate) fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    pub(crate) fn last_body(&self, path: &str) -> Option<Value> {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .rev()
            .find(|request| request.path == path)
            .and_then(|request| request.body.clone())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, TransportError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(RecordedRequest {
                method,
                path: path.to_string(),
                body,
            });
        if let Some((target, handle)) = self.destroy_on.lock().expect("destroy lock").as_ref()
            && target == path
        {
            handle.destroy();
        }
        let reply = self
            .routes
            .lock()
            .expect("routes lock")
            .get(&(method, path.to_string()))
            .cloned();
        match reply {
            Some(Reply::Json(value)) => Ok(value),
            Some(Reply::Status(status)) => Err(TransportError::Status {
                status,
                detail: None,
            }),
            None => Err(TransportError::Status {
                status: 404,
                detail: Some(format!("no scripted reply for {} {path}", method.as_str())),
            }),
        }
    }
}

/// Notifier keeping every `(header, message)` pair.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    messages: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub(crate) fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().expect("messages lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, header: &str, message: &str) {
        self.messages
            .lock()
            .expect("messages lock")
            .push((header.to_string(), message.to_string()));
    }
}

/// Renderer returning `name:data` and keeping every call.
#[derive(Default)]
pub(crate) struct RecordingRenderer {
    calls: Mutex<Vec<(String, Value)>>,
}

impl RecordingRenderer {
    pub(crate) fn templates(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub(crate) fn last_data(&self, template: &str) -> Option<Value> {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .rev()
            .find(|(name, _)| name == template)
            .map(|(_, data)| data.clone())
    }
}

impl TemplateRenderer for RecordingRenderer {
    fn render(&self, template: &str, data: &Value) -> String {
        self.calls
            .lock()
            .expect("calls lock")
            .push((template.to_string(), data.clone()));
        format!("{template}:{data}")
    }
}

/// Test doubles wired into one collaborator bundle.
pub(crate) struct Harness {
    pub(crate) transport: Arc<ScriptedTransport>,
    pub(crate) notifier: Arc<RecordingNotifier>,
    pub(crate) renderer: Arc<RecordingRenderer>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self {
            transport: Arc::new(ScriptedTransport::new()),
            notifier: Arc::new(RecordingNotifier::default()),
            renderer: Arc::new(RecordingRenderer::default()),
        }
    }

    pub(crate) fn collaborators(&self) -> Collaborators {
        Collaborators {
            transport: self.transport.clone(),
            notifier: self.notifier.clone(),
            renderer: self.renderer.clone(),
        }
    }
}

pub(crate) fn sample_catalog_json() -> Value {
    json!({
        "leadFields": [{"value": 1, "label": "Deals in 6 months"}],
        "companyStringFields": [
            {"value": "7", "label": "Company level"},
            {"value": "8", "label": "Segment"}
        ],
        "companyNumericFields": [{"value": "9", "label": "Payments in 6 months"}],
        "contactStringFields": [{"value": "3", "label": "Contact level"}],
        "contactNumericFields": [{"value": "4", "label": "Deals count"}]
    })
}

pub(crate) fn sample_catalog() -> FieldCatalog {
    let response: CustomFieldsResponse =
        serde_json::from_value(sample_catalog_json()).expect("sample catalog decodes");
    FieldCatalog::from_response(response)
}
