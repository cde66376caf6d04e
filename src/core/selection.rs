//! Bounded, ordered, duplicate-free set of chosen symptom ids

use crate::error::ValidationError;
use tracing::debug;

/// Default bound, matching the service's per-request limit
pub const MAX_SELECTED: usize = 5;

/// Outcome of adding an id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadySelected,
}

/// Outcome of toggling an id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Absent and the set is full; not an error
    Ignored,
}

/// Append-ordered ids. Order is only used for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<String>,
    capacity: usize,
}

impl Default for SelectionSet {
    fn default() -> Self {
        Self::new(MAX_SELECTED)
    }
}

impl SelectionSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ids.len() >= self.capacity
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|selected| selected == id)
    }

    /// Add from a search result or suggestion. A full set rejects the call
    /// even when the id is already present.
    pub fn add(&mut self, id: &str) -> Result<AddOutcome, ValidationError> {
        if self.is_full() {
            return Err(ValidationError::CapacityExceeded { max: self.capacity });
        }
        if self.contains(id) {
            return Ok(AddOutcome::AlreadySelected);
        }

        self.ids.push(id.to_string());
        debug!(target: "selection", "Added {} ({}/{})", id, self.len(), self.capacity);
        self.check_invariants();
        Ok(AddOutcome::Added)
    }

    pub fn toggle(&mut self, id: &str) -> ToggleOutcome {
        let outcome = if let Some(position) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(position);
            ToggleOutcome::Removed
        } else if self.is_full() {
            ToggleOutcome::Ignored
        } else {
            self.ids.push(id.to_string());
            ToggleOutcome::Added
        };

        debug!(target: "selection", "Toggle {} -> {:?}", id, outcome);
        self.check_invariants();
        outcome
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Frozen copy of the ids for a request
    pub fn snapshot(&self) -> Vec<String> {
        self.ids.clone()
    }

    fn check_invariants(&self) {
        debug_assert!(
            self.ids.len() <= self.capacity,
            "selection holds {} ids, bound is {}",
            self.ids.len(),
            self.capacity
        );
        debug_assert!(
            self.ids
                .iter()
                .enumerate()
                .all(|(i, id)| !self.ids[..i].contains(id)),
            "selection holds duplicate ids: {:?}",
            self.ids
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_keeps_append_order() {
        let mut selection = SelectionSet::new(3);
        assert_eq!(selection.add("s2"), Ok(AddOutcome::Added));
        assert_eq!(selection.add("s1"), Ok(AddOutcome::Added));
        assert_eq!(selection.ids(), ["s2", "s1"]);
    }

    #[test]
    fn test_add_duplicate_is_not_appended() {
        let mut selection = SelectionSet::new(3);
        selection.add("s1").unwrap();
        assert_eq!(selection.add("s1"), Ok(AddOutcome::AlreadySelected));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_add_rejects_when_full() {
        let mut selection = SelectionSet::new(2);
        selection.add("s1").unwrap();
        selection.add("s2").unwrap();

        let err = selection.add("s3").unwrap_err();
        assert_eq!(err, ValidationError::CapacityExceeded { max: 2 });
        assert_eq!(err.to_string(), "Maximum 2 symptômes autorisés");
        assert_eq!(selection.ids(), ["s1", "s2"]);
        assert!(!selection.contains("s3"));
    }

    #[test]
    fn test_toggle_add_remove_and_ignore() {
        let mut selection = SelectionSet::new(2);
        assert_eq!(selection.toggle("s1"), ToggleOutcome::Added);
        assert_eq!(selection.toggle("s2"), ToggleOutcome::Added);
        assert_eq!(selection.toggle("s3"), ToggleOutcome::Ignored);
        assert_eq!(selection.toggle("s1"), ToggleOutcome::Removed);
        assert_eq!(selection.ids(), ["s2"]);
        assert_eq!(selection.toggle("s3"), ToggleOutcome::Added);
        assert_eq!(selection.ids(), ["s2", "s3"]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut selection = SelectionSet::default();
        selection.add("s1").unwrap();
        let frozen = selection.snapshot();
        selection.toggle("s1");
        selection.add("s2").unwrap();
        assert_eq!(frozen, vec!["s1".to_string()]);
    }

    #[test]
    fn test_bound_holds_for_mixed_sequences() {
        let mut selection = SelectionSet::new(MAX_SELECTED);
        // Deterministic pseudo-random walk over 8 ids
        let mut seed: u32 = 7;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let id = format!("s{}", (seed >> 16) % 8);
            match (seed >> 8) % 3 {
                0 => {
                    let _ = selection.add(&id);
                }
                1 => {
                    selection.toggle(&id);
                }
                _ if seed % 17 == 0 => selection.clear(),
                _ => {}
            }

            assert!(selection.len() <= MAX_SELECTED);
            let mut ids = selection.snapshot();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), selection.len());
        }
    }
}
