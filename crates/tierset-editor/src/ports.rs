//! Collaborator traits supplied by the host.
//!
//! # Design
//! - The editor never talks to the network, the screen or the user directly.
//! - Hosts inject one implementation of each trait per session.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// Template names the session renders.
pub mod templates {
    /// Placeholder shown while settings load.
    pub const LOADING: &str = "loading";
    /// Page skeleton holding every section.
    pub const SKELETON: &str = "skeleton";
    /// Contact or company check configuration section.
    pub const CHECK_SECTION: &str = "check_section";
    /// Status rule table.
    pub const RULE_TABLE: &str = "rule_table";
}

/// HTTP verbs used against the settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read a resource.
    Get,
    /// Replace a resource or trigger an action.
    Post,
}

impl Method {
    /// Upper-case verb name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Authenticated request function provided by the host.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a request relative to the store base URL and return the decoded JSON body.
    ///
    /// Empty bodies are returned as [`Value::Null`].
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, TransportError>;
}

/// User-notification sink.
pub trait Notifier: Send + Sync {
    /// Show a message to the operator.
    fn notify(&self, header: &str, message: &str);
}

/// Template rendering service.
pub trait TemplateRenderer: Send + Sync {
    /// Turn a named template and its data into markup.
    fn render(&self, template: &str, data: &Value) -> String;
}

/// Bundle of host collaborators for one session.
#[derive(Clone)]
pub struct Collaborators {
    /// Authenticated request function.
    pub transport: Arc<dyn Transport>,
    /// Notification sink.
    pub notifier: Arc<dyn Notifier>,
    /// Template renderer.
    pub renderer: Arc<dyn TemplateRenderer>,
}
