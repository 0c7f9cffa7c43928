// Selection state of the dashboard, passed explicitly to the presentation layer

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::LapSelection;
use crate::errors::PaddockError;
use crate::session::{Session, SessionKey, SessionRepository, TimingProvider};

/// What the user has picked so far. Changing an upstream choice clears the
/// choices that depended on it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DashboardContext {
    year: Option<i32>,
    circuit: Option<String>,
    session_type: Option<String>,
    show_quick_laps: bool,
}

impl DashboardContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_year(&mut self, year: i32) {
        if self.year != Some(year) {
            self.circuit = None;
            self.session_type = None;
        }
        self.year = Some(year);
    }

    pub fn select_circuit(&mut self, circuit: impl Into<String>) {
        let circuit = circuit.into();
        if self.circuit.as_deref() != Some(circuit.as_str()) {
            self.session_type = None;
        }
        self.circuit = Some(circuit);
    }

    pub fn select_session(&mut self, session_type: impl Into<String>) {
        self.session_type = Some(session_type.into());
    }

    pub fn set_show_quick_laps(&mut self, show_quick_laps: bool) {
        self.show_quick_laps = show_quick_laps;
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn circuit(&self) -> Option<&str> {
        self.circuit.as_deref()
    }

    pub fn session_type(&self) -> Option<&str> {
        self.session_type.as_deref()
    }

    /// Lap set the lap time chart should show
    pub fn lap_selection(&self) -> LapSelection {
        if self.show_quick_laps {
            LapSelection::Quick
        } else {
            LapSelection::Valid
        }
    }

    /// Key of the selected session once year, circuit and session are chosen
    pub fn session_key(&self) -> Option<SessionKey> {
        Some(SessionKey::new(
            self.year?,
            self.circuit.clone()?,
            self.session_type.clone()?,
        ))
    }

    /// Load the selected session, `None` while the selection is incomplete.
    /// A failed load leaves the selection untouched.
    pub async fn load_selected<P: TimingProvider>(
        &self,
        repository: &SessionRepository<P>,
    ) -> Result<Option<Arc<Session>>, PaddockError> {
        match self.session_key() {
            Some(key) => repository.load(&key).await.map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_requires_full_selection() {
        let mut context = DashboardContext::new();
        assert!(context.session_key().is_none());
        context.select_year(2024);
        context.select_circuit("Monza");
        assert!(context.session_key().is_none());
        context.select_session("Race");
        assert_eq!(
            context.session_key(),
            Some(SessionKey::new(2024, "Monza", "Race"))
        );
    }

    #[test]
    fn test_upstream_change_clears_dependents() {
        let mut context = DashboardContext::new();
        context.select_year(2024);
        context.select_circuit("Monza");
        context.select_session("Race");

        context.select_circuit("Monza");
        assert_eq!(context.session_type(), Some("Race"));

        context.select_circuit("Imola");
        assert_eq!(context.session_type(), None);

        context.select_session("Qualifying");
        context.select_year(2023);
        assert_eq!(context.circuit(), None);
        assert_eq!(context.session_type(), None);
    }

    #[test]
    fn test_lap_selection_toggle() {
        let mut context = DashboardContext::new();
        assert_eq!(context.lap_selection(), LapSelection::Valid);
        context.set_show_quick_laps(true);
        assert_eq!(context.lap_selection(), LapSelection::Quick);
    }
}
