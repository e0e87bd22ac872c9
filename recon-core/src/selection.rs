use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Canonical key for one organization/plan combination.
///
/// Always `organization|plan`; a selection step running in single-plan mode
/// gets the `default` plan. Built once here so no downstream lookup ever has
/// to probe alternative key shapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionKey(String);

impl SelectionKey {
    pub fn new(organization: &str, plan: Option<&str>) -> Self {
        let plan = match plan.map(str::trim) {
            Some(p) if !p.is_empty() => p,
            _ => "default",
        };
        Self(format!("{}|{}", organization.trim(), plan))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn organization(&self) -> &str {
        self.0.split_once('|').map(|(org, _)| org).unwrap_or(&self.0)
    }

    pub fn plan(&self) -> &str {
        self.0.split_once('|').map(|(_, plan)| plan).unwrap_or("default")
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// In-memory map from organization/plan key to the single chosen service id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectionState {
    chosen: HashMap<SelectionKey, i64>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle semantics: picking the already-chosen service removes the
    /// mapping, anything else sets or overwrites it. Single-select per key.
    /// Returns whether the key is mapped afterwards.
    pub fn select(&mut self, key: SelectionKey, service_id: i64) -> bool {
        if self.chosen.get(&key) == Some(&service_id) {
            self.chosen.remove(&key);
            false
        } else {
            self.chosen.insert(key, service_id);
            true
        }
    }

    /// Remove the mapping for a key unconditionally.
    pub fn clear(&mut self, key: &SelectionKey) {
        self.chosen.remove(key);
    }

    /// Drop every selection, e.g. after a fresh catalog load.
    pub fn clear_all(&mut self) {
        self.chosen.clear();
    }

    /// Number of distinct keys currently mapped.
    pub fn count(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    pub fn selected(&self, key: &SelectionKey) -> Option<i64> {
        self.chosen.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SelectionKey, i64)> {
        self.chosen.iter().map(|(key, id)| (key, *id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_canonical() {
        assert_eq!(SelectionKey::new("Acme", None).as_str(), "Acme|default");
        assert_eq!(SelectionKey::new(" Acme ", Some("gold")).as_str(), "Acme|gold");
        assert_eq!(SelectionKey::new("Acme", Some("  ")).as_str(), "Acme|default");

        let key = SelectionKey::new("Acme", Some("gold"));
        assert_eq!(key.organization(), "Acme");
        assert_eq!(key.plan(), "gold");
    }

    #[test]
    fn test_toggle_restores_prior_state() {
        let mut state = SelectionState::new();
        let key = SelectionKey::new("Acme", None);

        assert!(state.select(key.clone(), 101));
        assert_eq!(state.selected(&key), Some(101));
        assert_eq!(state.count(), 1);

        // Same id again removes the mapping
        assert!(!state.select(key.clone(), 101));
        assert_eq!(state.selected(&key), None);
        assert_eq!(state.count(), 0);
    }

    #[test]
    fn test_select_overwrites_different_id() {
        let mut state = SelectionState::new();
        let key = SelectionKey::new("Acme", Some("gold"));

        state.select(key.clone(), 101);
        assert!(state.select(key.clone(), 202));
        assert_eq!(state.selected(&key), Some(202));
        assert_eq!(state.count(), 1);
    }

    #[test]
    fn test_clear() {
        let mut state = SelectionState::new();
        state.select(SelectionKey::new("Acme", None), 101);
        state.select(SelectionKey::new("Globex", None), 102);

        state.clear(&SelectionKey::new("Acme", None));
        assert_eq!(state.count(), 1);

        state.clear_all();
        assert!(state.is_empty());
    }
}
