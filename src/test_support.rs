//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::images::{ImageError, ImageProvider};

/// Answers `<base>/<prompt>` and counts how often it was asked.
pub struct StubImageProvider {
    base: String,
    calls: AtomicUsize,
}

impl StubImageProvider {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for StubImageProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn resolve(&self, prompt: &str) -> Result<String, ImageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}/{}", self.base, prompt.replace(' ', "_")))
    }
}

/// Always fails with the given error.
pub struct FailingImageProvider(pub ImageError);

#[async_trait]
impl ImageProvider for FailingImageProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn resolve(&self, _prompt: &str) -> Result<String, ImageError> {
        Err(self.0.clone())
    }
}
