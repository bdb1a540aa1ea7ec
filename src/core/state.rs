//! # Story State
//!
//! The chapter state machine for one playthrough.
//!
//! ```text
//! StoryState
//! ├── story: Story          // immutable once submitted
//! └── current_index: usize  // always a valid index into story
//! ```
//!
//! States are chapter indices, transitions are choice labels, the initial
//! state is 0 and any chapter without choices is terminal. State only
//! changes through `advance()`; a rejected choice leaves it untouched.

use log::debug;

use crate::core::story::{Chapter, Story, StoryError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryState {
    story: Story,
    current_index: usize,
}

impl StoryState {
    /// Starts a playthrough at chapter 0.
    ///
    /// A `Story` can only be built through `submit()`, which rejects empty
    /// stories, so index 0 always exists.
    pub fn new(story: Story) -> Self {
        Self {
            story,
            current_index: 0,
        }
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current(&self) -> &Chapter {
        &self.story.chapters()[self.current_index]
    }

    /// Follows `label` out of the current chapter and returns the new index.
    pub fn advance(&mut self, label: &str) -> Result<usize, StoryError> {
        let target = self
            .current()
            .target(label)
            .ok_or_else(|| StoryError::InvalidChoice {
                chapter: self.current_index,
                label: label.to_string(),
            })?;

        debug!(
            "Advancing via '{}': chapter {} -> {}",
            label, self.current_index, target
        );
        self.current_index = target;
        Ok(target)
    }

    pub fn is_finished(&self) -> bool {
        self.current().is_terminal()
    }
}
