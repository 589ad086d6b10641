use serde::{Deserialize, Serialize};

/// Is bank slot `slot` used up by the current selection?
///
/// Slots are identified by position and value only: slot `i` is disabled when
/// its word has been picked more times than the word occurs before `i`.
pub fn is_slot_disabled(options: &[String], selected: &[String], slot: usize) -> bool {
    let Some(word) = options.get(slot) else {
        return true;
    };
    let picked = selected.iter().filter(|w| *w == word).count();
    let earlier = options[..slot].iter().filter(|w| *w == word).count();
    picked > earlier
}

/// Ordered tokens picked from a word bank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSelection {
    words: Vec<String>,
}

impl WordSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the word in bank slot `slot`. Returns false if the slot is
    /// out of range or already used.
    pub fn pick(&mut self, options: &[String], slot: usize) -> bool {
        if is_slot_disabled(options, &self.words, slot) {
            return false;
        }
        self.words.push(options[slot].clone());
        true
    }

    /// Return the word at `position` in the selection to the bank.
    pub fn remove(&mut self, position: usize) -> Option<String> {
        (position < self.words.len()).then(|| self.words.remove(position))
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// The submission string: tokens joined by single spaces.
    pub fn joined(&self) -> String {
        self.words.join(" ")
    }

    /// Enabled/disabled flags for every bank slot, for rendering.
    pub fn slot_states(&self, options: &[String]) -> Vec<bool> {
        (0..options.len())
            .map(|slot| !is_slot_disabled(options, &self.words, slot))
            .collect()
    }
}
