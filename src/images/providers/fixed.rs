//! Placeholder provider that answers every prompt with the same URL.
//!
//! Useful for running the game without an image-generation account.

use async_trait::async_trait;
use log::debug;

use crate::images::{ImageError, ImageProvider};

pub const DEFAULT_FIXED_IMAGE_URL: &str =
    "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcTkhAV70lOOVr2-gS3HXBVvR-wHv9IiTCmU8Q&s";

pub struct FixedImageProvider {
    url: String,
}

impl FixedImageProvider {
    pub fn new(url: Option<String>) -> Self {
        Self {
            url: url.unwrap_or_else(|| DEFAULT_FIXED_IMAGE_URL.to_string()),
        }
    }
}

#[async_trait]
impl ImageProvider for FixedImageProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn resolve(&self, prompt: &str) -> Result<String, ImageError> {
        debug!("Fixed image for prompt ({} bytes)", prompt.len());
        Ok(self.url.clone())
    }
}
