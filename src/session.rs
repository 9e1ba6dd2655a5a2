//! Per-tab editing session for the ADT panel form: the three sticky
//! selection controls, the confirmation-before-reset flow, and the
//! active filtered catalog with its request-generation guard.

use crate::{
    marker_catalog::{Catalog, CatalogEntry, CatalogSet},
    panel::Panel,
};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Control {
    Species,
    Chemistry,
    OutputFormat,
}

/// Sticky selection state of one control.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice {
    #[default]
    Unselected,
    Selected(String),
}

impl Choice {
    pub fn value(&self) -> Option<&str> {
        match self {
            Choice::Selected(value) => Some(value),
            Choice::Unselected => None,
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Choice::Selected(_))
    }
}

/// A control change waiting on the user's reset confirmation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingChange {
    pub control: Control,
    pub value: String,
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChangeOutcome {
    Applied,
    ConfirmationRequired,
}

#[derive(Debug, Default)]
pub struct Session {
    species: Choice,
    chemistry: Choice,
    output_format: Choice,
    pub panel: Panel,
    catalog: Option<Catalog>,
    catalog_generation: u64,
    pending: Option<PendingChange>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn choice(&self, control: Control) -> &Choice {
        match control {
            Control::Species => &self.species,
            Control::Chemistry => &self.chemistry,
            Control::OutputFormat => &self.output_format,
        }
    }

    fn choice_mut(&mut self, control: Control) -> &mut Choice {
        match control {
            Control::Species => &mut self.species,
            Control::Chemistry => &mut self.chemistry,
            Control::OutputFormat => &mut self.output_format,
        }
    }

    pub fn species(&self) -> Option<&str> {
        self.species.value()
    }

    pub fn chemistry(&self) -> Option<&str> {
        self.chemistry.value()
    }

    pub fn output_format(&self) -> Option<&str> {
        self.output_format.value()
    }

    pub fn pending(&self) -> Option<&PendingChange> {
        self.pending.as_ref()
    }

    /// First choice for a control applies immediately; so does a change
    /// while the panel is still empty. Changing a selected control with
    /// rows present records a pending change and asks for confirmation.
    pub fn request_change(&mut self, control: Control, value: &str) -> ChangeOutcome {
        if self.choice(control).is_selected() && !self.panel.is_empty() {
            self.pending = Some(PendingChange {
                control,
                value: value.to_string(),
            });
            return ChangeOutcome::ConfirmationRequired;
        }
        *self.choice_mut(control) = Choice::Selected(value.to_string());
        ChangeOutcome::Applied
    }

    /// Confirmed reset: clear the panel, reset every control, then apply
    /// the pending value. Returns the control that changed.
    pub fn confirm_pending(&mut self) -> Option<Control> {
        let pending = self.pending.take()?;
        self.panel.clear();
        self.species = Choice::Unselected;
        self.chemistry = Choice::Unselected;
        self.output_format = Choice::Unselected;
        self.catalog = None;
        *self.choice_mut(pending.control) = Choice::Selected(pending.value);
        Some(pending.control)
    }

    /// Declined reset: only the changed control reverts, to Unselected;
    /// the panel and the other controls stay as they were.
    pub fn decline_pending(&mut self) -> Option<Control> {
        let pending = self.pending.take()?;
        *self.choice_mut(pending.control) = Choice::Unselected;
        Some(pending.control)
    }

    /// Hands out a token for a catalog request. Tokens are monotonic;
    /// only the newest one may install a catalog.
    pub fn begin_catalog_request(&mut self) -> u64 {
        self.catalog_generation += 1;
        self.catalog_generation
    }

    /// Installs a loaded (already species-filtered) catalog, unless a
    /// newer request has started since this token was handed out.
    pub fn install_catalog(&mut self, token: u64, catalog: Option<Catalog>) -> bool {
        if token != self.catalog_generation {
            tracing::debug!(
                "discarding stale catalog response (token {token}, newest {})",
                self.catalog_generation
            );
            return false;
        }
        self.catalog = catalog;
        true
    }

    /// Synchronous load-and-filter path used by the desktop frontends.
    pub fn refresh_catalog(&mut self, catalogs: &CatalogSet) {
        let token = self.begin_catalog_request();
        let filtered = self
            .chemistry
            .value()
            .and_then(|format| catalogs.get(format))
            .map(|catalog| catalog.species_subset(self.species.value().unwrap_or("")));
        let _ = self.install_catalog(token, filtered);
    }

    /// Applies a control change and, when it sticks, re-filters the
    /// catalog. Output-format changes never touch the catalog.
    pub fn apply_change(
        &mut self,
        control: Control,
        value: &str,
        catalogs: &CatalogSet,
    ) -> ChangeOutcome {
        let outcome = self.request_change(control, value);
        if outcome == ChangeOutcome::Applied && control != Control::OutputFormat {
            self.refresh_catalog(catalogs);
        }
        outcome
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    /// Typeahead over the active filtered catalog; empty until both a
    /// chemistry is selected and its catalog installed.
    pub fn search(&self, query: &str) -> Vec<&CatalogEntry> {
        match &self.catalog {
            Some(catalog) => catalog.search(query),
            None => vec![],
        }
    }
}
