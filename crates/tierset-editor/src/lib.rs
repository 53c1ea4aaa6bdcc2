#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
//! Rule-table editor and settings synchronisation engine.
//!
//! Layout:
//! - `catalog.rs`: field catalog loading and option builders
//! - `rules/`: rule form model, validation, persistence mapping and evaluation preview
//! - `checks.rs`: check configuration forms and the check-run controller
//! - `controls.rs`: save/run control state per section
//! - `sync.rs`: settings load/save against the remote store
//! - `session.rs`: the editor session orchestrating startup and user actions
//! - `ports.rs`: collaborator traits supplied by the host (transport, notifier, renderer)

pub mod catalog;
pub mod checks;
pub mod config;
pub mod controls;
pub mod error;
pub mod ports;
pub mod rules;
pub mod session;
pub mod sync;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{CheckboxOption, Field, FieldCatalog, FieldOwner, SelectOption, ValueKind};
pub use checks::{CheckConfig, CheckConfigError, CheckConfigForm, CheckEdit};
pub use config::{ControlLabels, EditorConfig};
pub use controls::{Control, ControlPanel, ControlState, Interaction, SaveState, Section};
pub use error::{EditorError, EditorResult, TransportError};
pub use ports::{Collaborators, Method, Notifier, TemplateRenderer, Transport};
pub use rules::{Rule, RuleEdit, RuleForm, RuleId, RuleTable, RuleViolation, StatusAssignment};
pub use session::{EditorSession, SessionHandle};
pub use tierset_models::{DependencyType, EntityKind, RuleRecord};
pub use view::{RenderedView, Slot};
