//! Word-cycling text effect.
//!
//! An explicit state machine that types a word character by character,
//! holds it, deletes it, pauses, and moves on to the next word forever.
//! [`TextCycle::step`] performs exactly one transition and returns the delay
//! until the next one; the caller owns the single pending timer.

use serde::{Deserialize, Serialize};

use crate::config::PageConfig;
use crate::error::PageError;
use crate::Millis;

/// Ordered, non-empty list of non-empty words.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    pub fn new<I, S>(words: I) -> Result<Self, PageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.is_empty() {
            return Err(PageError::EmptyWordList);
        }
        if let Some(index) = words.iter().position(|w| w.is_empty()) {
            return Err(PageError::EmptyWord { index });
        }
        Ok(Self { words })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

/// First `n` characters of `word` (by Unicode scalar value).
fn prefix(word: &str, n: usize) -> &str {
    match word.char_indices().nth(n) {
        Some((byte, _)) => &word[..byte],
        None => word,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CyclePhase {
    Typing,
    PausedBeforeDelete,
    Deleting,
    PausedBeforeNext,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleState {
    pub word_index: usize,
    pub char_index: usize,
    pub is_deleting: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleTiming {
    pub typing_ms: Millis,
    pub deleting_ms: Millis,
    pub hold_before_delete_ms: Millis,
    pub pause_before_next_ms: Millis,
}

impl Default for CycleTiming {
    fn default() -> Self {
        Self::from_config(&PageConfig::default())
    }
}

impl CycleTiming {
    pub fn from_config(cfg: &PageConfig) -> Self {
        Self {
            typing_ms: cfg.typing_interval_ms,
            deleting_ms: cfg.deleting_interval_ms,
            hold_before_delete_ms: cfg.hold_before_delete_ms,
            pause_before_next_ms: cfg.pause_before_next_ms,
        }
    }
}

/// Result of one transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    /// Text the display surface should show now.
    pub text: String,
    /// Delay until the next transition.
    pub next_delay: Millis,
    /// Set when this step finished deleting a word and moved to a new index.
    pub advanced_to: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct TextCycle {
    words: WordList,
    timing: CycleTiming,
    state: CycleState,
    phase: CyclePhase,
}

impl TextCycle {
    pub fn new(words: WordList, timing: CycleTiming) -> Self {
        Self {
            words,
            timing,
            state: CycleState::default(),
            phase: CyclePhase::Typing,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn words(&self) -> &WordList {
        &self.words
    }

    pub fn current_word(&self) -> &str {
        // word_index is always reduced modulo len
        self.words.words[self.state.word_index].as_str()
    }

    fn current_len(&self) -> usize {
        self.current_word().chars().count()
    }

    /// Text currently shown on the surface.
    pub fn display(&self) -> &str {
        prefix(self.current_word(), self.state.char_index)
    }

    /// Perform one transition. A pause phase resolves into the phase it was
    /// waiting for and performs that phase's first step in the same call.
    pub fn step(&mut self) -> Step {
        match self.phase {
            CyclePhase::Typing => self.type_step(),
            CyclePhase::PausedBeforeDelete => {
                self.state.is_deleting = true;
                self.phase = CyclePhase::Deleting;
                self.delete_step()
            }
            CyclePhase::Deleting => self.delete_step(),
            CyclePhase::PausedBeforeNext => {
                self.phase = CyclePhase::Typing;
                self.type_step()
            }
        }
    }

    fn type_step(&mut self) -> Step {
        let len = self.current_len();
        if self.state.char_index < len {
            self.state.char_index += 1;
        }
        let text = self.display().to_string();
        if self.state.char_index == len {
            self.phase = CyclePhase::PausedBeforeDelete;
            Step {
                text,
                next_delay: self.timing.hold_before_delete_ms,
                advanced_to: None,
            }
        } else {
            Step {
                text,
                next_delay: self.timing.typing_ms,
                advanced_to: None,
            }
        }
    }

    fn delete_step(&mut self) -> Step {
        self.state.char_index = self.state.char_index.saturating_sub(1);
        let text = self.display().to_string();
        if self.state.char_index > 0 {
            return Step {
                text,
                next_delay: self.timing.deleting_ms,
                advanced_to: None,
            };
        }
        self.state.is_deleting = false;
        self.state.word_index = (self.state.word_index + 1) % self.words.len();
        self.phase = CyclePhase::PausedBeforeNext;
        Step {
            text,
            next_delay: self.timing.pause_before_next_ms,
            advanced_to: Some(self.state.word_index),
        }
    }
}
