//! Fable library exports for testing

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod core;
pub mod images;
pub mod server;

#[cfg(test)]
pub mod test_support;

/// Which service turns chapter text into pictures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageBackend {
    #[default]
    #[value(name = "openai")]
    OpenAi,
    Fixed,
}
