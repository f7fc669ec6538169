use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tokio::{
    fs,
    io::{AsyncWrite, AsyncWriteExt},
};

use crate::{
    config::BUCKETS,
    error::{AppError, Result},
};

/// Filesystem object store: one directory per bucket, served publicly under `/storage`.
#[derive(Clone, Debug)]
pub struct StorageService {
    base_path: PathBuf,
    public_base_url: String,
}

impl StorageService {
    pub fn new(base_path: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn init(&self) -> Result<()> {
        for bucket in BUCKETS {
            fs::create_dir_all(self.bucket_path(bucket))
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create bucket {bucket}: {e}")))?;
        }
        Ok(())
    }

    pub fn check_bucket(bucket: &str) -> Result<()> {
        if BUCKETS.contains(&bucket) {
            Ok(())
        } else {
            Err(AppError::BadRequest(format!("Unknown bucket: {bucket}")))
        }
    }

    pub fn bucket_path(&self, bucket: &str) -> PathBuf {
        self.base_path.join(bucket)
    }

    pub fn object_path(&self, bucket: &str, name: &str) -> PathBuf {
        self.bucket_path(bucket).join(name)
    }

    pub fn public_url(&self, bucket: &str, name: &str) -> String {
        format!("{}/storage/{bucket}/{name}", self.public_base_url)
    }

    /// Writes a new object. Existing objects are never overwritten.
    pub async fn put_object(&self, bucket: &str, name: &str, data: &[u8]) -> Result<PathBuf> {
        Self::check_bucket(bucket)?;
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(AppError::BadRequest(format!("Invalid object name: {name}")));
        }

        let dir = self.bucket_path(bucket);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create bucket {bucket}: {e}")))?;

        let path = dir.join(name);
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => {
                    AppError::Internal(format!("Object already exists: {bucket}/{name}"))
                }
                _ => AppError::Internal(format!("Failed to write object: {e}")),
            })?;

        write_or_discard(file, &path, data).await?;

        Ok(path)
    }
}

/// Writes the whole object or removes the partial file.
async fn write_or_discard<W>(mut file: W, path: &Path, data: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        file.write_all(data).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        if let Err(rm) = fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %rm, "failed to remove partial object");
        }
        return Err(AppError::Internal(format!(
            "Failed to write object {}: {e}",
            path.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        pin::Pin,
        task::{Context, Poll},
    };

    use super::*;

    struct FullDisk;

    impl AsyncWrite for FullDisk {
        fn poll_write(
            self: Pin<&mut Self>,
            _: &mut Context<'_>,
            _: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "no space left")))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn temp_store() -> StorageService {
        let dir = std::env::temp_dir().join(format!("agency-storage-{}", uuid::Uuid::new_v4()));
        StorageService::new(dir, "http://localhost:3000/")
    }

    #[test]
    fn public_url_joins_bucket_and_name() {
        let store = temp_store();
        assert_eq!(
            store.public_url("banners", "1_abc.webp"),
            "http://localhost:3000/storage/banners/1_abc.webp"
        );
    }

    #[test]
    fn rejects_unknown_bucket() {
        assert!(StorageService::check_bucket("portfolio").is_ok());
        assert!(matches!(
            StorageService::check_bucket("../etc"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn put_never_overwrites() {
        let store = temp_store();
        store.init().await.unwrap();

        let path = store.put_object("portfolio", "a.txt", b"first").await.unwrap();
        let second = store.put_object("portfolio", "a.txt", b"second").await;

        assert!(matches!(second, Err(AppError::Internal(_))));
        assert_eq!(std::fs::read(path).unwrap(), b"first");
    }

    #[tokio::test]
    async fn rejects_path_like_names() {
        let store = temp_store();
        let result = store.put_object("portfolio", "../escape.txt", b"x").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn failed_write_leaves_no_partial_object() {
        let store = temp_store();
        store.init().await.unwrap();
        let path = store.object_path("portfolio", "partial.bin");
        std::fs::write(&path, b"half").unwrap();

        let result = write_or_discard(FullDisk, &path, b"whole object").await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert!(!path.exists());
    }
}
