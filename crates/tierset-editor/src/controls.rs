//! Save and run control state.
//!
//! # Design
//! - Controls exist only after their section is attached.
//! - A running check disables both run controls and both check save controls.
//! - "Saved" is transient: any interaction outside that save control reverts it.

use serde::Serialize;
use tierset_models::EntityKind;

use crate::config::ControlLabels;

/// Editor sections with their own save control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Status rule table.
    Rules,
    /// Contact check configuration.
    Contact,
    /// Company check configuration.
    Company,
}

impl Section {
    /// Every section in display order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Contact, Self::Company, Self::Rules]
    }

    /// Short name used in logs and output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rules => "rules",
            Self::Contact => "contact",
            Self::Company => "company",
        }
    }

    /// Check configuration section of an entity kind.
    #[must_use]
    pub const fn of(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Contact => Self::Contact,
            EntityKind::Company => Self::Company,
        }
    }
}

impl From<EntityKind> for Section {
    fn from(kind: EntityKind) -> Self {
        Self::of(kind)
    }
}

/// Save progress of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveState {
    /// Nothing pending.
    #[default]
    Idle,
    /// Request in flight.
    Saving,
    /// Last save succeeded.
    Saved,
}

/// A user-facing control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Save control of a section.
    Save(Section),
    /// Run control of a check.
    Run(EntityKind),
}

/// Where the operator clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// The save control of a section.
    Save(Section),
    /// Anywhere else.
    Other,
}

/// Rendered state of one control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlState {
    /// Current label.
    pub label: String,
    /// Whether the control refuses clicks.
    pub disabled: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct SectionControls {
    attached: bool,
    save: SaveState,
    save_disabled: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct RunControl {
    disabled: bool,
    running: bool,
}

/// Control state for every section of one session.
#[derive(Debug, Clone)]
pub struct ControlPanel {
    labels: ControlLabels,
    rules: SectionControls,
    contact: SectionControls,
    company: SectionControls,
    run_contact: RunControl,
    run_company: RunControl,
}

impl ControlPanel {
    /// Fresh panel with nothing attached.
    #[must_use]
    pub fn new(labels: ControlLabels) -> Self {
        Self {
            labels,
            rules: SectionControls::default(),
            contact: SectionControls::default(),
            company: SectionControls::default(),
            run_contact: RunControl::default(),
            run_company: RunControl::default(),
        }
    }

    const fn section(&self, section: Section) -> &SectionControls {
        match section {
            Section::Rules => &self.rules,
            Section::Contact => &self.contact,
            Section::Company => &self.company,
        }
    }

    const fn section_mut(&mut self, section: Section) -> &mut SectionControls {
        match section {
            Section::Rules => &mut self.rules,
            Section::Contact => &mut self.contact,
            Section::Company => &mut self.company,
        }
    }

    const fn run(&self, kind: EntityKind) -> &RunControl {
        match kind {
            EntityKind::Contact => &self.run_contact,
            EntityKind::Company => &self.run_company,
        }
    }

    const fn run_mut(&mut self, kind: EntityKind) -> &mut RunControl {
        match kind {
            EntityKind::Contact => &mut self.run_contact,
            EntityKind::Company => &mut self.run_company,
        }
    }

    /// Wire a section's controls once its markup exists.
    pub const fn attach(&mut self, section: Section) {
        self.section_mut(section).attached = true;
    }

    /// Whether a section's controls are wired.
    #[must_use]
    pub const fn is_attached(&self, section: Section) -> bool {
        self.section(section).attached
    }

    /// Save progress of a section.
    #[must_use]
    pub const fn save_state(&self, section: Section) -> SaveState {
        self.section(section).save
    }

    /// Whether a check for `kind` is known to be running.
    #[must_use]
    pub const fn check_running(&self, kind: EntityKind) -> bool {
        self.run(kind).running
    }

    /// Whether a control accepts clicks.
    #[must_use]
    pub const fn is_enabled(&self, control: Control) -> bool {
        match control {
            Control::Save(section) => {
                let state = self.section(section);
                state.attached && !state.save_disabled && !matches!(state.save, SaveState::Saving)
            }
            Control::Run(kind) => {
                self.section(Section::of(kind)).attached && !self.run(kind).disabled
            }
        }
    }

    /// Label and disabled flag for rendering.
    #[must_use]
    pub fn state(&self, control: Control) -> ControlState {
        let label = match control {
            Control::Save(section) => match self.section(section).save {
                SaveState::Idle => &self.labels.save,
                SaveState::Saving => &self.labels.saving,
                SaveState::Saved => &self.labels.saved,
            },
            Control::Run(kind) => {
                if self.run(kind).running {
                    &self.labels.running
                } else {
                    &self.labels.run
                }
            }
        };
        ControlState {
            label: label.clone(),
            disabled: !self.is_enabled(control),
        }
    }

    /// Record a click; every `saved` section except the clicked one reverts to idle.
    pub fn register_interaction(&mut self, interaction: Interaction) {
        for section in Section::all() {
            if interaction == Interaction::Save(section) {
                continue;
            }
            let controls = self.section_mut(section);
            if controls.save == SaveState::Saved {
                controls.save = SaveState::Idle;
            }
        }
    }

    /// Enter `saving`.
    pub const fn begin_save(&mut self, section: Section) {
        self.section_mut(section).save = SaveState::Saving;
    }

    /// Leave `saving`: `saved` on success, `idle` on failure.
    pub const fn finish_save(&mut self, section: Section, succeeded: bool) {
        self.section_mut(section).save = if succeeded {
            SaveState::Saved
        } else {
            SaveState::Idle
        };
    }

    /// Apply the effects of a running check for `kind`.
    pub const fn mark_check_running(&mut self, kind: EntityKind) {
        self.run_mut(kind).running = true;
        self.run_contact.disabled = true;
        self.run_company.disabled = true;
        self.contact.save_disabled = true;
        self.company.save_disabled = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached_panel() -> ControlPanel {
        let mut panel = ControlPanel::new(ControlLabels::default());
        for section in Section::all() {
            panel.attach(section);
        }
        panel
    }

    #[test]
    fn unattached_controls_are_disabled() {
        let panel = ControlPanel::new(ControlLabels::default());
        assert!(!panel.is_enabled(Control::Save(Section::Rules)));
        assert!(!panel.is_enabled(Control::Run(EntityKind::Contact)));
        assert!(panel.state(Control::Run(EntityKind::Contact)).disabled);
    }

    #[test]
    fn running_check_disables_runs_and_check_saves() {
        let mut panel = attached_panel();
        panel.mark_check_running(EntityKind::Company);

        assert!(!panel.is_enabled(Control::Run(EntityKind::Contact)));
        assert!(!panel.is_enabled(Control::Run(EntityKind::Company)));
        assert!(!panel.is_enabled(Control::Save(Section::Contact)));
        assert!(!panel.is_enabled(Control::Save(Section::Company)));
        assert!(panel.is_enabled(Control::Save(Section::Rules)));

        assert_eq!(
            panel.state(Control::Run(EntityKind::Company)).label,
            "Check in progress"
        );
        assert_eq!(panel.state(Control::Run(EntityKind::Contact)).label, "Run check");
        assert!(panel.check_running(EntityKind::Company));
        assert!(!panel.check_running(EntityKind::Contact));
    }

    #[test]
    fn save_states_progress_and_revert_on_other_clicks() {
        let mut panel = attached_panel();
        panel.begin_save(Section::Rules);
        assert!(!panel.is_enabled(Control::Save(Section::Rules)));
        assert_eq!(panel.state(Control::Save(Section::Rules)).label, "Saving...");

        panel.finish_save(Section::Rules, true);
        assert_eq!(panel.save_state(Section::Rules), SaveState::Saved);

        panel.register_interaction(Interaction::Save(Section::Rules));
        assert_eq!(panel.save_state(Section::Rules), SaveState::Saved);

        panel.register_interaction(Interaction::Save(Section::Contact));
        assert_eq!(panel.save_state(Section::Rules), SaveState::Idle);
        assert_eq!(panel.state(Control::Save(Section::Rules)).label, "Save");
    }

    #[test]
    fn failed_save_returns_to_idle() {
        let mut panel = attached_panel();
        panel.begin_save(Section::Contact);
        panel.finish_save(Section::Contact, false);
        assert_eq!(panel.save_state(Section::Contact), SaveState::Idle);
        assert!(panel.is_enabled(Control::Save(Section::Contact)));
    }
}
