//! The JSON shape the game page polls for.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::core::StoryState;

pub const IMAGE_ROUTE: &str = "/make_image_from_text";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChapterView {
    pub text: String,
    pub image_url: String,
    pub button_choices: Vec<String>,
}

impl ChapterView {
    pub fn of(state: &StoryState) -> Self {
        let chapter = state.current();
        Self {
            text: chapter.text().to_string(),
            image_url: image_url_for(chapter.text()),
            button_choices: chapter
                .choice_labels()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Relative URL of the image proxy for `prompt`.
pub fn image_url_for(prompt: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("text", prompt)
        .finish();
    format!("{IMAGE_ROUTE}?{query}")
}
