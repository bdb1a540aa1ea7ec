//! Downloads resolved images so the server can proxy them, and optionally
//! keeps a copy of every freshly generated one on disk.

use std::path::{Path, PathBuf};

use chrono::Local;
use log::{debug, info, warn};

use crate::images::ImageError;

pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

pub struct ImageFetcher {
    client: reqwest::Client,
    archive_dir: Option<PathBuf>,
}

impl ImageFetcher {
    pub fn new(archive_dir: Option<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            archive_dir,
        }
    }

    pub fn archive_dir(&self) -> Option<&Path> {
        self.archive_dir.as_deref()
    }

    /// Downloads `url`. Non-2xx responses are errors; nothing is retried.
    pub async fn fetch(&self, url: &str) -> Result<FetchedImage, ImageError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Image download status: {}", status);

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Image download failed: {} - {}", status, message);
            return Err(ImageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageError::Network(e.to_string()))?
            .to_vec();

        info!("Downloaded image: {} bytes ({})", bytes.len(), content_type);
        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }

    /// Writes `image` to `<archive_dir>/image_<timestamp>_<suffix>.png`.
    ///
    /// The timestamp goes down to milliseconds and the suffix is random, so
    /// images generated in the same instant never share a file.
    ///
    /// Returns the written path, or `None` when archiving is off or the
    /// write failed. Failures are logged and otherwise ignored.
    pub async fn archive(&self, image: &FetchedImage) -> Option<PathBuf> {
        let dir = self.archive_dir.as_ref()?;

        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!("Failed to create image archive {}: {}", dir.display(), e);
            return None;
        }

        let path = dir.join(archive_file_name());
        match tokio::fs::write(&path, &image.bytes).await {
            Ok(()) => {
                debug!("Archived image to {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Failed to archive image to {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn archive_file_name() -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("image_{timestamp}_{}.png", &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn test_fetch_returns_bytes_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/boat.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(vec![1u8, 2, 3]),
            )
            .mount(&server)
            .await;

        let fetcher = ImageFetcher::new(None);
        let image = fetcher
            .fetch(&format!("{}/boat.png", server.uri()))
            .await
            .unwrap();

        assert_eq!(image.bytes, vec![1, 2, 3]);
        assert_eq!(image.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_fetch_defaults_non_image_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blob"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![9u8]))
            .mount(&server)
            .await;

        let fetcher = ImageFetcher::new(None);
        let image = fetcher.fetch(&format!("{}/blob", server.uri())).await.unwrap();
        assert_eq!(image.content_type, DEFAULT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.png"))
            .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
            .mount(&server)
            .await;

        let fetcher = ImageFetcher::new(None);
        let result = fetcher.fetch(&format!("{}/missing.png", server.uri())).await;
        assert_eq!(
            result,
            Err(ImageError::Api {
                status: 404,
                message: "gone".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_archive_disabled_without_dir() {
        let fetcher = ImageFetcher::new(None);
        let image = FetchedImage {
            bytes: vec![1],
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        };
        assert!(fetcher.archive(&image).await.is_none());
    }

    #[tokio::test]
    async fn test_archive_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let archive_dir = dir.path().join("images");
        let fetcher = ImageFetcher::new(Some(archive_dir.clone()));
        let image = FetchedImage {
            bytes: vec![4, 5, 6],
            content_type: "image/png".to_string(),
        };

        let written = fetcher.archive(&image).await.unwrap();
        assert!(written.starts_with(&archive_dir));
        assert_eq!(std::fs::read(written).unwrap(), vec![4, 5, 6]);
    }

    #[tokio::test]
    async fn test_archive_back_to_back_keeps_both_images() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ImageFetcher::new(Some(dir.path().to_path_buf()));
        let first = FetchedImage {
            bytes: vec![1],
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        };
        let second = FetchedImage {
            bytes: vec![2],
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        };

        let first_path = fetcher.archive(&first).await.unwrap();
        let second_path = fetcher.archive(&second).await.unwrap();

        assert_ne!(first_path, second_path);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
        assert_eq!(std::fs::read(first_path).unwrap(), vec![1]);
        assert_eq!(std::fs::read(second_path).unwrap(), vec![2]);
    }

    #[test]
    fn test_archive_file_name_shape() {
        let name = archive_file_name();
        assert!(name.starts_with("image_"));
        assert!(name.ends_with(".png"));
        // image_YYYYmmdd_HHMMSS_mmm_xxxxxxxx.png
        assert_eq!(name.len(), "image_20240101_120000_000_abcdef12.png".len());
    }

    #[tokio::test]
    async fn test_archive_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let fetcher = ImageFetcher::new(Some(blocker.clone()));
        let image = FetchedImage {
            bytes: vec![7],
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        };

        assert!(fetcher.archive(&image).await.is_none());
        assert_eq!(std::fs::read(&blocker).unwrap(), b"file".to_vec());
    }
}
