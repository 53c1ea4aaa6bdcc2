//! Editor session: startup sequence and operator actions.
//!
//! # Design
//! - The session owns every piece of editor state; only the destroyed flag is shared.
//! - Every continuation after an await re-checks the destroyed flag and ends silently.
//! - Validation runs before every persist; a rejected save sends nothing.
//! - Request failures notify the operator and leave in-memory state untouched.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde_json::json;
use tierset_models::{EntityKind, RuleRecord, endpoints};
use tracing::{debug, info, warn};

use crate::catalog::FieldCatalog;
use crate::checks::{CheckConfigForm, CheckEdit, CheckRunner, run_path, status_path};
use crate::config::EditorConfig;
use crate::controls::{Control, ControlPanel, Interaction, Section};
use crate::error::{EditorError, EditorResult, TransportError};
use crate::ports::{Collaborators, templates};
use crate::rules::{RuleEdit, RuleForm, RuleId, RuleTable, to_persisted};
use crate::sync::{SettingsSync, setting_path};
use crate::view::{CheckSectionView, RenderedView, RuleTableView, Slot};

/// Cloneable handle used to tear a session down from outside.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    destroyed: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Mark the session destroyed. Pending continuations become no-ops.
    pub fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }

    /// Whether [`Self::destroy`] was called.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

/// One editor lifetime.
pub struct EditorSession {
    collaborators: Collaborators,
    config: EditorConfig,
    handle: SessionHandle,
    catalog: FieldCatalog,
    rules: RuleTable,
    contact: Option<CheckConfigForm>,
    company: Option<CheckConfigForm>,
    controls: ControlPanel,
    view: RenderedView,
}

impl EditorSession {
    /// Fresh session; nothing is loaded until [`Self::start`].
    #[must_use]
    pub fn new(collaborators: Collaborators, config: EditorConfig) -> Self {
        let controls = ControlPanel::new(config.labels.clone());
        Self {
            collaborators,
            config,
            handle: SessionHandle::default(),
            catalog: FieldCatalog::default(),
            rules: RuleTable::new(),
            contact: None,
            company: None,
            controls,
            view: RenderedView::default(),
        }
    }

    /// Handle sharing this session's destroyed flag.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Tear the session down.
    pub fn destroy(&self) {
        self.handle.destroy();
    }

    /// Editor configuration in use.
    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Loaded field catalog.
    #[must_use]
    pub const fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// Rule rows.
    #[must_use]
    pub const fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Check configuration form of `kind`, once loaded.
    #[must_use]
    pub const fn check_form(&self, kind: EntityKind) -> Option<&CheckConfigForm> {
        match kind {
            EntityKind::Contact => self.contact.as_ref(),
            EntityKind::Company => self.company.as_ref(),
        }
    }

    const fn check_form_mut(&mut self, kind: EntityKind) -> &mut Option<CheckConfigForm> {
        match kind {
            EntityKind::Contact => &mut self.contact,
            EntityKind::Company => &mut self.company,
        }
    }

    /// Control state.
    #[must_use]
    pub const fn controls(&self) -> &ControlPanel {
        &self.controls
    }

    /// Current markup per slot.
    #[must_use]
    pub const fn view(&self) -> &RenderedView {
        &self.view
    }

    /// Load everything and render the editor.
    ///
    /// Sections that load are rendered even when another section fails. Check controls attach
    /// and status is polled only once both check sections loaded. Every failure is notified
    /// and the first one is returned.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Request`] for the first failed load,
    /// [`EditorError::Destroyed`] when torn down meanwhile.
    pub async fn start(&mut self) -> EditorResult<()> {
        self.ensure_live()?;
        self.render(Slot::Loading, templates::LOADING, &json!({}))?;

        let transport = Arc::clone(&self.collaborators.transport);
        let loaded_catalog = FieldCatalog::load(transport.as_ref()).await;
        self.ensure_live()?;
        let catalog = loaded_catalog.map_err(|source| {
            self.request_failed("load_catalog", endpoints::CUSTOM_FIELDS, source)
        })?;
        self.catalog = catalog;

        let loaded = SettingsSync::new(transport.as_ref()).load_all().await;
        self.ensure_live()?;
        self.render(Slot::Skeleton, templates::SKELETON, &json!({}))?;
        self.view.remove(Slot::Loading);

        let mut failures = Vec::new();
        let mut checks_ready = true;
        for (kind, form) in [
            (EntityKind::Contact, loaded.contact),
            (EntityKind::Company, loaded.company),
        ] {
            match form {
                Ok(form) => {
                    *self.check_form_mut(kind) = Some(form);
                    self.render_check(kind)?;
                }
                Err(source) => {
                    checks_ready = false;
                    failures.push(self.request_failed(
                        "load_check_config",
                        setting_path(kind),
                        source,
                    ));
                }
            }
        }
        if checks_ready {
            for kind in EntityKind::all() {
                self.controls.attach(Section::of(kind));
            }
        }

        match loaded.rules {
            Ok(records) => {
                self.rules.replace_from_persisted(&records);
                self.controls.attach(Section::Rules);
                self.render_rules()?;
            }
            Err(source) => {
                failures.push(self.request_failed("load_rules", endpoints::STATUS_RULES, source));
            }
        }

        if checks_ready {
            if let Err(err) = self.poll_checks().await {
                if matches!(err, EditorError::Destroyed) {
                    return Err(err);
                }
                failures.push(err);
            }
            self.render_checks()?;
        }

        debug!(rules = self.rules.len(), checks_ready, "editor session started");
        failures.into_iter().next().map_or(Ok(()), Err)
    }

    async fn poll_checks(&mut self) -> EditorResult<()> {
        let transport = Arc::clone(&self.collaborators.transport);
        let poll = CheckRunner::new(transport.as_ref()).poll_status().await;
        self.ensure_live()?;
        let mut failures = Vec::new();
        for (kind, status) in [
            (EntityKind::Contact, poll.contact),
            (EntityKind::Company, poll.company),
        ] {
            match status {
                Ok(true) => {
                    debug!(kind = kind.as_str(), "check already running");
                    self.controls.mark_check_running(kind);
                }
                Ok(false) => {}
                Err(source) => {
                    failures.push(self.request_failed(
                        "poll_check_status",
                        status_path(kind),
                        source,
                    ));
                }
            }
        }
        failures.into_iter().next().map_or(Ok(()), Err)
    }

    /// Append a rule row and re-render the table.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NotLoaded`] before the table is attached.
    pub fn add_rule(&mut self, initial: Option<RuleForm>) -> EditorResult<RuleId> {
        self.begin_edit(Section::Rules)?;
        let id = self.rules.add_rule(initial);
        self.render_sections()?;
        Ok(id)
    }

    /// Remove a rule row and re-render the table.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownRule`] when no row carries `id`.
    pub fn remove_rule(&mut self, id: RuleId) -> EditorResult<RuleForm> {
        self.begin_edit(Section::Rules)?;
        let form = self
            .rules
            .remove_rule(id)
            .ok_or(EditorError::UnknownRule { id })?;
        self.render_sections()?;
        Ok(form)
    }

    /// Edit one attribute of a rule row.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownRule`] when no row carries `id`.
    pub fn update_rule(&mut self, id: RuleId, edit: RuleEdit) -> EditorResult<()> {
        self.begin_edit(Section::Rules)?;
        if !self.rules.update_field(id, edit) {
            return Err(EditorError::UnknownRule { id });
        }
        self.render_sections()
    }

    /// Replace every rule row with `records`, seeding a blank row when empty.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NotLoaded`] before the table is attached.
    pub fn replace_rules(&mut self, records: &[RuleRecord]) -> EditorResult<()> {
        self.begin_edit(Section::Rules)?;
        self.rules.replace_from_persisted(records);
        self.render_sections()
    }

    /// Edit one attribute of a check configuration form.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NotLoaded`] before the section is attached.
    pub fn update_check_config(&mut self, kind: EntityKind, edit: CheckEdit) -> EditorResult<()> {
        let section = Section::of(kind);
        self.begin_edit(section)?;
        self.check_form_mut(kind)
            .as_mut()
            .ok_or(EditorError::NotLoaded { section })?
            .apply(edit);
        self.render_sections()
    }

    /// Record a click that is not an edit or an action.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Destroyed`] after teardown.
    pub fn interact(&mut self, interaction: Interaction) -> EditorResult<()> {
        self.ensure_live()?;
        self.controls.register_interaction(interaction);
        self.render_sections()
    }

    /// Validate every rule and replace the persisted list.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::RuleValidation`] without sending anything when a rule is
    /// invalid, [`EditorError::Request`] when the store rejects the save.
    pub async fn save_rules(&mut self) -> EditorResult<()> {
        let section = Section::Rules;
        self.ensure_enabled(Control::Save(section))?;
        self.controls.register_interaction(Interaction::Save(section));

        let rules = match self.rules.validate_all() {
            Ok(rules) => rules,
            Err(violations) => {
                warn!(
                    section = section.as_str(),
                    count = violations.len(),
                    "rule validation failed"
                );
                for violation in &violations {
                    self.collaborators
                        .notifier
                        .notify(&self.config.validation_header, &violation.to_string());
                }
                self.render_sections()?;
                return Err(EditorError::RuleValidation { violations });
            }
        };
        let records = to_persisted(&rules);

        self.controls.begin_save(section);
        self.render_sections()?;
        let transport = Arc::clone(&self.collaborators.transport);
        let result = SettingsSync::new(transport.as_ref())
            .save_rules(&records)
            .await;
        self.ensure_live()?;
        self.finish_save(section, "save_rules", endpoints::STATUS_RULES, result)?;
        info!(section = section.as_str(), rules = records.len(), "status rules saved");
        Ok(())
    }

    /// Validate and persist the check configuration of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::CheckConfigValidation`] without sending anything when the form
    /// is invalid, [`EditorError::ControlDisabled`] while a check runs,
    /// [`EditorError::Request`] when the store rejects the save.
    pub async fn save_check_config(&mut self, kind: EntityKind) -> EditorResult<()> {
        let section = Section::of(kind);
        self.ensure_enabled(Control::Save(section))?;
        self.controls.register_interaction(Interaction::Save(section));

        let form = self
            .check_form(kind)
            .ok_or(EditorError::NotLoaded { section })?;
        let config = match form.validate() {
            Ok(config) => config,
            Err(source) => {
                warn!(section = section.as_str(), error = %source, "check configuration rejected");
                self.collaborators
                    .notifier
                    .notify(&self.config.validation_header, &source.to_string());
                self.render_sections()?;
                return Err(EditorError::CheckConfigValidation { kind, source });
            }
        };

        self.controls.begin_save(section);
        self.render_sections()?;
        let transport = Arc::clone(&self.collaborators.transport);
        let result = SettingsSync::new(transport.as_ref())
            .save_check_config(kind, &config)
            .await;
        self.ensure_live()?;
        if result.is_ok() {
            *self.check_form_mut(kind) = Some(CheckConfigForm::from_config(&config));
        }
        self.finish_save(section, "save_check_config", setting_path(kind), result)?;
        info!(section = section.as_str(), months = config.months, "check configuration saved");
        Ok(())
    }

    /// Start the background check for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ControlDisabled`] while any check runs,
    /// [`EditorError::Request`] when the trigger fails.
    pub async fn run_check(&mut self, kind: EntityKind) -> EditorResult<()> {
        self.ensure_enabled(Control::Run(kind))?;
        self.controls.register_interaction(Interaction::Other);

        let transport = Arc::clone(&self.collaborators.transport);
        let result = CheckRunner::new(transport.as_ref()).trigger(kind).await;
        self.ensure_live()?;
        if let Err(source) = result {
            self.render_sections()?;
            return Err(self.request_failed("run_check", run_path(kind), source));
        }
        self.controls.mark_check_running(kind);
        self.render_sections()?;
        info!(kind = kind.as_str(), "check triggered");
        Ok(())
    }

    fn finish_save(
        &mut self,
        section: Section,
        operation: &'static str,
        path: &'static str,
        result: Result<(), TransportError>,
    ) -> EditorResult<()> {
        self.controls.finish_save(section, result.is_ok());
        self.render_sections()?;
        result.map_err(|source| self.request_failed(operation, path, source))
    }

    fn ensure_live(&self) -> EditorResult<()> {
        if self.handle.is_destroyed() {
            debug!("session destroyed; dropping continuation");
            return Err(EditorError::Destroyed);
        }
        Ok(())
    }

    fn ensure_enabled(&self, control: Control) -> EditorResult<()> {
        self.ensure_live()?;
        let section = match control {
            Control::Save(section) => section,
            Control::Run(kind) => Section::of(kind),
        };
        if !self.controls.is_attached(section) {
            return Err(EditorError::NotLoaded { section });
        }
        if !self.controls.is_enabled(control) {
            return Err(EditorError::ControlDisabled { control });
        }
        Ok(())
    }

    fn begin_edit(&mut self, section: Section) -> EditorResult<()> {
        self.ensure_live()?;
        if !self.controls.is_attached(section) {
            return Err(EditorError::NotLoaded { section });
        }
        self.controls.register_interaction(Interaction::Other);
        Ok(())
    }

    fn request_failed(
        &self,
        operation: &'static str,
        path: &'static str,
        source: TransportError,
    ) -> EditorError {
        warn!(operation, path, error = %source, "store request failed");
        self.collaborators
            .notifier
            .notify(&self.config.failure_header, &self.config.failure_message);
        EditorError::Request {
            operation,
            path,
            source,
        }
    }

    fn render<T: Serialize>(
        &mut self,
        slot: Slot,
        template: &'static str,
        data: &T,
    ) -> EditorResult<()> {
        let data = serde_json::to_value(data)
            .map_err(|source| EditorError::Render { template, source })?;
        let markup = self.collaborators.renderer.render(template, &data);
        self.view.set(slot, markup);
        Ok(())
    }

    fn render_check(&mut self, kind: EntityKind) -> EditorResult<()> {
        let Some(form) = self.check_form(kind) else {
            return Ok(());
        };
        let data = CheckSectionView::build(kind, form, &self.catalog, &self.controls);
        self.render(Slot::Check(kind), templates::CHECK_SECTION, &data)
    }

    fn render_checks(&mut self) -> EditorResult<()> {
        for kind in EntityKind::all() {
            self.render_check(kind)?;
        }
        Ok(())
    }

    fn render_rules(&mut self) -> EditorResult<()> {
        let data = RuleTableView::build(&self.rules, &self.catalog, &self.controls);
        self.render(Slot::RuleTable, templates::RULE_TABLE, &data)
    }

    fn render_sections(&mut self) -> EditorResult<()> {
        self.render_checks()?;
        if self.controls.is_attached(Section::Rules) {
            self.render_rules()?;
        }
        Ok(())
    }
}
