use std::fmt;

use async_trait::async_trait;

/// Errors that can occur while generating or downloading an image.
/// None of these are retried; they propagate to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// Provider misconfigured (missing API key, bad URL).
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// The API returned an error response.
    Api { status: u16, message: String },
    /// Failed to parse the provider's response.
    Parse(String),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::Config(msg) => write!(f, "config error: {msg}"),
            ImageError::Network(msg) => write!(f, "network error: {msg}"),
            ImageError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ImageError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ImageError {}

/// Turns a text prompt into the URL of a generated image.
///
/// Implementations may hit the network on every call. Callers that see the
/// same prompt repeatedly should go through an `ImageCache`.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Resolves `prompt` to an image URL.
    async fn resolve(&self, prompt: &str) -> Result<String, ImageError>;
}
