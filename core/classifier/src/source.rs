use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::warn;
use url::Url;

use crate::config::ImageSourceConfig;
use crate::error::ImageError;

/// Where the bytes of an image live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    Remote(Url),
    Local(PathBuf),
}

impl ImageReference {
    /// Parses a percent-encoded reference as sent by clients.
    ///
    /// `http(s)` URLs are remote, `file` URLs and anything else that is not a
    /// URL are paths on the local filesystem.
    pub fn parse(encoded: &str) -> Result<Self, ImageError> {
        let decoded = urlencoding::decode(encoded)?;
        if decoded.is_empty() {
            return Err(ImageError::EmptyReference);
        }

        match Url::parse(&decoded) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::Remote(url)),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(Self::Local)
                .map_err(|_| ImageError::InvalidReference(decoded.into_owned())),
            _ => Ok(Self::Local(PathBuf::from(decoded.into_owned()))),
        }
    }
}

pub struct ImageSource {
    client: reqwest::Client,
    config: ImageSourceConfig,
}

impl ImageSource {
    pub fn new(config: ImageSourceConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub async fn load(&self, reference: &ImageReference) -> Result<Bytes, ImageError> {
        match reference {
            ImageReference::Local(path) => self.read(path).await,
            ImageReference::Remote(url) => self.fetch(url).await,
        }
    }

    async fn read(&self, path: &Path) -> Result<Bytes, ImageError> {
        let io_error = |source: std::io::Error| match source.kind() {
            ErrorKind::NotFound => ImageError::NotFound(path.to_path_buf()),
            _ => {
                warn!("failed to read image {}: {source}", path.display());
                ImageError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            },
        };

        // Devices and FIFOs report no length and may never reach EOF, and
        // opening a FIFO blocks until a writer shows up.
        let metadata = tokio::fs::metadata(path).await.map_err(io_error)?;
        if !metadata.is_file() {
            return Err(ImageError::NotAFile(path.to_path_buf()));
        }
        self.check_len(metadata.len())?;

        let file = File::open(path).await.map_err(io_error)?;
        let mut data = Vec::new();
        file.take(self.limit() + 1)
            .read_to_end(&mut data)
            .await
            .map_err(io_error)?;
        self.check_len(data.len() as u64)?;
        Ok(data.into())
    }

    async fn fetch(&self, url: &Url) -> Result<Bytes, ImageError> {
        if !self.config.allow_remote {
            return Err(ImageError::RemoteDisabled);
        }

        let fetch_error = |source| ImageError::Fetch {
            url: url.to_string(),
            source,
        };

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::FetchStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(len) = response.content_length() {
            self.check_len(len)?;
        }

        // Chunked bodies carry no length up front, so the cap is enforced
        // while streaming.
        let mut data = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(fetch_error)? {
            self.check_len((data.len() + chunk.len()) as u64)?;
            data.extend_from_slice(&chunk);
        }
        Ok(data.freeze())
    }

    fn limit(&self) -> u64 {
        self.config.max_image_bytes as u64
    }

    fn check_len(&self, len: u64) -> Result<(), ImageError> {
        if len > self.limit() {
            return Err(ImageError::TooLarge {
                limit: self.config.max_image_bytes,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_plain_path() {
        assert_eq!(
            ImageReference::parse("images/leaf.png").unwrap(),
            ImageReference::Local("images/leaf.png".into())
        );
    }

    #[test]
    fn parse_percent_encoded_path() {
        assert_eq!(
            ImageReference::parse("%2Ftmp%2Fmy%20leaf.png").unwrap(),
            ImageReference::Local("/tmp/my leaf.png".into())
        );
    }

    #[test]
    fn parse_plus_is_kept() {
        assert_eq!(
            ImageReference::parse("a+b.png").unwrap(),
            ImageReference::Local("a+b.png".into())
        );
    }

    #[test]
    fn parse_remote() {
        let reference = ImageReference::parse("https%3A%2F%2Fexample.com%2Fleaf.jpg").unwrap();
        assert_eq!(
            reference,
            ImageReference::Remote(Url::parse("https://example.com/leaf.jpg").unwrap())
        );
    }

    #[cfg(unix)]
    #[test]
    fn parse_file_url() {
        assert_eq!(
            ImageReference::parse("file:///tmp/leaf.png").unwrap(),
            ImageReference::Local("/tmp/leaf.png".into())
        );
    }

    #[test]
    fn parse_empty() {
        assert!(matches!(
            ImageReference::parse(""),
            Err(ImageError::EmptyReference)
        ));
    }

    #[test]
    fn parse_invalid_utf8() {
        assert!(matches!(
            ImageReference::parse("%FF%FE"),
            Err(ImageError::InvalidEncoding(_))
        ));
    }

    #[tokio::test]
    async fn read_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.bin");
        std::fs::write(&path, b"pixels").unwrap();

        let source = ImageSource::new(ImageSourceConfig::default()).unwrap();
        let data = source.load(&ImageReference::Local(path)).await.unwrap();
        assert_eq!(data.as_ref(), b"pixels");
    }

    #[tokio::test]
    async fn missing_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = ImageSource::new(ImageSourceConfig::default()).unwrap();
        let err = source
            .load(&ImageReference::Local(dir.path().join("missing.png")))
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::NotFound(_)));
    }

    #[tokio::test]
    async fn oversized_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        std::fs::write(&path, vec![0u8; 64]).unwrap();

        let source = ImageSource::new(ImageSourceConfig {
            max_image_bytes: 16,
            ..Default::default()
        })
        .unwrap();
        let err = source.load(&ImageReference::Local(path)).await.unwrap_err();
        assert!(matches!(err, ImageError::TooLarge { limit: 16 }));
    }

    #[tokio::test]
    async fn file_at_the_limit_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exact.bin");
        std::fs::write(&path, vec![7u8; 16]).unwrap();

        let source = ImageSource::new(ImageSourceConfig {
            max_image_bytes: 16,
            ..Default::default()
        })
        .unwrap();
        let data = source.load(&ImageReference::Local(path)).await.unwrap();
        assert_eq!(data.len(), 16);
    }

    #[tokio::test]
    async fn directory_is_not_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let source = ImageSource::new(ImageSourceConfig::default()).unwrap();
        let err = source
            .load(&ImageReference::Local(dir.path().to_path_buf()))
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::NotAFile(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn endless_device_is_not_an_image() {
        let source = ImageSource::new(ImageSourceConfig::default()).unwrap();
        let reference = ImageReference::parse("%2Fdev%2Fzero").unwrap();
        let err = tokio::time::timeout(Duration::from_secs(5), source.load(&reference))
            .await
            .expect("reading a device must not block")
            .unwrap_err();
        assert!(matches!(err, ImageError::NotAFile(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn fifo_is_not_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipe.png");
        let status = std::process::Command::new("mkfifo")
            .arg(&path)
            .status()
            .unwrap();
        assert!(status.success());

        let source = ImageSource::new(ImageSourceConfig::default()).unwrap();
        let err = tokio::time::timeout(
            Duration::from_secs(5),
            source.load(&ImageReference::Local(path)),
        )
        .await
        .expect("a fifo without writers must not block")
        .unwrap_err();
        assert!(matches!(err, ImageError::NotAFile(_)));
    }

    #[tokio::test]
    async fn remote_disabled() {
        let source = ImageSource::new(ImageSourceConfig {
            allow_remote: false,
            ..Default::default()
        })
        .unwrap();
        let url = Url::parse("http://127.0.0.1:9/leaf.png").unwrap();
        let err = source
            .load(&ImageReference::Remote(url))
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::RemoteDisabled));
    }
}
