//! The four pattern slots of a polygon.

use crate::pattern::{PatternConfig, PatternKey};

/// Four pattern slots plus the active slot index.
///
/// There is no separate "live" copy: the live configuration is the
/// active slot, so an edit is stored the moment it is made. Saving
/// and loading copy values between slots, never references.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternStore {
    slots: [PatternConfig; 4],
    active: PatternKey,
}

impl PatternStore {
    /// Store with `config` copied into every slot and slot A active.
    pub fn replicated(config: PatternConfig) -> Self {
        Self {
            slots: [config.clone(), config.clone(), config.clone(), config],
            active: PatternKey::A,
        }
    }

    /// Key of the live slot.
    pub fn active_key(&self) -> PatternKey {
        self.active
    }

    /// The live configuration.
    pub fn active(&self) -> &PatternConfig {
        &self.slots[self.active.index()]
    }

    /// Mutable access to the live configuration; edits land in the active slot.
    pub fn active_mut(&mut self) -> &mut PatternConfig {
        &mut self.slots[self.active.index()]
    }

    /// Stored configuration of a slot.
    pub fn slot(&self, key: PatternKey) -> &PatternConfig {
        &self.slots[key.index()]
    }

    /// Mutable access to any slot, live or not.
    pub fn slot_mut(&mut self, key: PatternKey) -> &mut PatternConfig {
        &mut self.slots[key.index()]
    }

    /// Copy the live configuration into `key`.
    ///
    /// Saving into the active slot leaves the store unchanged.
    pub fn save(&mut self, key: PatternKey) {
        if key != self.active {
            self.slots[key.index()] = self.active().clone();
        }
    }

    /// Make `key` the live slot.
    pub fn load(&mut self, key: PatternKey) {
        self.active = key;
    }

    /// All slots with their keys.
    pub fn iter(&self) -> impl Iterator<Item = (PatternKey, &PatternConfig)> {
        PatternKey::ALL.into_iter().zip(self.slots.iter())
    }
}

impl Default for PatternStore {
    fn default() -> Self {
        Self::replicated(PatternConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn save_then_load_keeps_live_config() {
        let mut store = PatternStore::default();
        store.active_mut().set_side_count(5);
        let before = store.active().clone();

        store.save(PatternKey::C);
        store.load(PatternKey::C);

        assert_eq!(store.active_key(), PatternKey::C);
        assert_eq!(store.active(), &before);
    }

    #[test]
    fn slots_do_not_alias() {
        let mut store = PatternStore::default();
        store.save(PatternKey::B);

        store.active_mut().set_radius(42.0);

        assert_eq!(store.slot(PatternKey::A).radius(), 42.0);
        assert_eq!(store.slot(PatternKey::B).radius(), 80.0);
        assert_eq!(store.slot(PatternKey::C).radius(), 80.0);
    }

    #[test]
    fn editing_after_load_touches_only_new_slot() {
        let mut store = PatternStore::default();
        store.load(PatternKey::D);
        store.active_mut().set_side_count(3);

        assert_eq!(store.slot(PatternKey::D).side_count(), 3);
        assert_eq!(store.slot(PatternKey::A).side_count(), 6);
    }

    #[test]
    fn iter_visits_all_slots_in_order() {
        let store = PatternStore::default();
        let keys: Vec<PatternKey> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, PatternKey::ALL.to_vec());
    }
}
