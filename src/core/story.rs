//! # Story Graph
//!
//! A story is an ordered list of chapters. Each chapter has some text and a
//! set of labelled choices, each pointing at another chapter by index.
//!
//! ```text
//! [0] "Shahar went sailing" ──speed up──▶ [1] "Capsize" ──swim──▶ [3] "Die"
//!          │                                   │
//!          └──────enjoy the sunset─────────────┴──▶ [2] "See the strange pattern..."
//! ```
//!
//! Raw records come in as JSON and are validated eagerly: a story that
//! passes `submit()` never produces an out-of-range index later.

use std::fmt;

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

// ============================================================================
// Errors
// ============================================================================

/// Everything that can go wrong while building or walking a story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryError {
    /// The submitted story is missing fields, is empty, or points at chapters that don't exist.
    MalformedStory(String),
    /// The label is not one of the current chapter's choices.
    InvalidChoice { chapter: usize, label: String },
    /// Navigation was requested before any story was submitted.
    NoActiveSession,
}

impl fmt::Display for StoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryError::MalformedStory(reason) => write!(f, "malformed story: {reason}"),
            StoryError::InvalidChoice { chapter, label } => {
                write!(f, "invalid choice '{label}' for chapter {chapter}")
            }
            StoryError::NoActiveSession => write!(f, "no story has been submitted"),
        }
    }
}

impl std::error::Error for StoryError {}

// ============================================================================
// Raw Records (wire format)
// ============================================================================

/// One chapter as it arrives over the wire.
///
/// Fields are optional here so a missing one can be reported with its
/// position instead of as a generic serde error. The dashboard exporter
/// calls the choices `buttons`, so both spellings are accepted.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ChapterRecord {
    pub text: Option<String>,
    #[serde(alias = "buttons")]
    pub choices: Option<IndexMap<String, i64>>,
}

// ============================================================================
// Validated Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    text: String,
    choices: IndexMap<String, usize>,
}

impl Chapter {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Choice labels in the order the author wrote them.
    pub fn choice_labels(&self) -> Vec<&str> {
        self.choices.keys().map(String::as_str).collect()
    }

    /// Target chapter index for `label`, if this chapter offers it.
    pub fn target(&self, label: &str) -> Option<usize> {
        self.choices.get(label).copied()
    }

    /// A chapter with no way out ends the story.
    pub fn is_terminal(&self) -> bool {
        self.choices.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    chapters: Vec<Chapter>,
}

impl Story {
    /// Parses and validates a JSON array of chapter records.
    pub fn from_json(json: &[u8]) -> Result<Story, StoryError> {
        let records: Vec<ChapterRecord> = serde_json::from_slice(json)
            .map_err(|e| StoryError::MalformedStory(e.to_string()))?;
        submit(records)
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    /// The built-in sailing story, used to seed sessions in demo mode.
    pub fn sailing_demo() -> Story {
        let chapter = |text: &str, choices: &[(&str, usize)]| Chapter {
            text: text.to_string(),
            choices: choices
                .iter()
                .map(|(label, target)| (label.to_string(), *target))
                .collect(),
        };

        Story {
            chapters: vec![
                chapter("Shahar went sailing", &[("speed up", 1), ("enjoy the sunset", 2)]),
                chapter("Capsize", &[("enjoy the sunset", 2), ("swim", 3)]),
                chapter("See the strange pattern in the sky", &[]),
                chapter("Die", &[]),
            ],
        }
    }
}

/// Builds a validated `Story` from raw records.
///
/// Rejects an empty story, records without `text` or `choices`, and any
/// choice whose target is negative or past the last chapter.
pub fn submit(records: Vec<ChapterRecord>) -> Result<Story, StoryError> {
    if records.is_empty() {
        return Err(StoryError::MalformedStory(
            "story has no chapters".to_string(),
        ));
    }

    let count = records.len();
    let mut chapters = Vec::with_capacity(count);

    for (index, record) in records.into_iter().enumerate() {
        let text = record.text.ok_or_else(|| {
            StoryError::MalformedStory(format!("chapter {index} is missing 'text'"))
        })?;
        let raw_choices = record.choices.ok_or_else(|| {
            StoryError::MalformedStory(format!("chapter {index} is missing 'choices'"))
        })?;

        let mut choices = IndexMap::with_capacity(raw_choices.len());
        for (label, target) in raw_choices {
            let target = usize::try_from(target)
                .ok()
                .filter(|t| *t < count)
                .ok_or_else(|| {
                    StoryError::MalformedStory(format!(
                        "choice '{label}' in chapter {index} points at chapter {target}, \
                         but the story has {count} chapters"
                    ))
                })?;
            choices.insert(label, target);
        }

        chapters.push(Chapter { text, choices });
    }

    debug!("Story accepted: {} chapters", chapters.len());
    Ok(Story { chapters })
}
