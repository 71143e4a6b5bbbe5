//! Cycle sequences ("AABC") that pick a pattern slot per rotation.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::pattern::PatternKey;

/// A non-empty list of pattern slots, one per rotation cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sequence(Vec<PatternKey>);

impl Sequence {
    /// Parse user input. Letters outside A-D are dropped (case-insensitive);
    /// if nothing is left the sequence is "A".
    pub fn parse(input: &str) -> Self {
        let keys: Vec<PatternKey> = input.chars().filter_map(PatternKey::from_char).collect();
        let dropped = input.chars().count() - keys.len();
        if dropped > 0 {
            log::debug!(target: "sequence", "dropped {} characters from {:?}", dropped, input);
        }
        Self::from_keys(keys)
    }

    /// Build from keys, falling back to "A" when empty.
    pub fn from_keys(keys: Vec<PatternKey>) -> Self {
        if keys.is_empty() {
            log::debug!(target: "sequence", "empty sequence, using A");
            Self::default()
        } else {
            Self(keys)
        }
    }

    /// Number of cycles before the sequence repeats.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// First key (played after a reset).
    pub fn first(&self) -> PatternKey {
        self.0[0]
    }

    /// Key for rotation cycle `cycle`.
    pub fn key_for_cycle(&self, cycle: u64) -> PatternKey {
        self.0[(cycle % self.0.len() as u64) as usize]
    }

    pub fn keys(&self) -> &[PatternKey] {
        &self.0
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self(vec![PatternKey::A])
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.0 {
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}
