pub mod fixed;
pub mod openai;

pub use fixed::FixedImageProvider;
pub use openai::{ImageSettings, OpenAiImageProvider};
