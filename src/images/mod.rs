pub mod cache;
pub mod fetch;
pub mod provider;
pub mod providers;

pub use cache::{ImageCache, Resolution};
pub use fetch::{FetchedImage, ImageFetcher};
pub use provider::{ImageError, ImageProvider};
pub use providers::{FixedImageProvider, ImageSettings, OpenAiImageProvider};
