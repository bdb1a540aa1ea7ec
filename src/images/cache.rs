//! # Prompt Cache
//!
//! Per-session memo of `prompt → image URL`. Generating an image is slow and
//! billed, and the same chapter text is requested every time a player
//! revisits a chapter, so the provider is only asked on a miss.
//! Failures are not remembered; the next request tries again.

use std::collections::HashMap;

use log::debug;

use crate::images::{ImageError, ImageProvider};

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub url: String,
    /// True when the provider was called for this request.
    pub generated: bool,
}

#[derive(Debug, Default, Clone)]
pub struct ImageCache {
    urls_by_prompt: HashMap<String, String>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, prompt: &str) -> Option<&str> {
        self.urls_by_prompt.get(prompt).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls_by_prompt.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls_by_prompt.is_empty()
    }

    /// Returns the cached URL for `prompt`, asking `provider` only on a miss.
    pub async fn resolve(
        &mut self,
        provider: &dyn ImageProvider,
        prompt: &str,
    ) -> Result<Resolution, ImageError> {
        if let Some(url) = self.urls_by_prompt.get(prompt) {
            debug!("Image cache hit ({} cached)", self.urls_by_prompt.len());
            return Ok(Resolution {
                url: url.clone(),
                generated: false,
            });
        }

        debug!("Image cache miss, asking provider '{}'", provider.name());
        let url = provider.resolve(prompt).await?;
        self.urls_by_prompt.insert(prompt.to_string(), url.clone());
        Ok(Resolution {
            url,
            generated: true,
        })
    }
}
