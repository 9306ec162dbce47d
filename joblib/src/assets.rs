//! Filesystem store for uploaded and produced assets.
//!
//! Every asset lives directly under the store root. Uploads are named
//! `<generated id><original extension>`, so a name alone is enough to find the file
//! again without any side metadata.

use crate::error::{JobError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

pub const DEFAULT_MAX_ASSET_BYTES: usize = 10 * 1024 * 1024;

const PARTIAL_SUFFIX: &str = ".part";

/// Handle to a stored asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssetRef {
    pub id: String,
    pub stored_name: String,
    /// Extension including the leading dot, or empty.
    pub extension: String,
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct AssetStore {
    root: PathBuf,
    max_bytes: usize,
}

impl AssetStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// The root is canonicalized so asset paths handed to workers are absolute.
    pub async fn open(root: impl AsRef<Path>, max_bytes: usize) -> Result<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root).await?;
        let root = fs::canonicalize(root).await?;
        tracing::debug!(root = %root.display(), max_bytes, "opened asset store");
        Ok(Self { root, max_bytes })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Persist `bytes` under a fresh name that keeps the extension of `original_filename`.
    pub async fn store(&self, bytes: &[u8], original_filename: &str) -> Result<AssetRef> {
        if bytes.len() > self.max_bytes {
            return Err(JobError::TooLarge {
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }

        let id = Uuid::new_v4().simple().to_string();
        let extension = extension_of(original_filename);
        let stored_name = format!("{id}{extension}");
        let path = self.root.join(&stored_name);
        // Leading dot keeps in-flight writes out of reach of `locate`.
        let partial = self.root.join(format!(".{stored_name}{PARTIAL_SUFFIX}"));

        fs::create_dir_all(&self.root).await?;
        if let Err(err) = write_then_rename(&partial, &path, bytes).await {
            let _ = fs::remove_file(&partial).await;
            return Err(err.into());
        }

        tracing::info!(asset = %stored_name, size = bytes.len(), "stored asset");
        Ok(AssetRef {
            id,
            stored_name,
            extension,
            path,
        })
    }

    /// Path of an existing asset.
    pub async fn locate(&self, name: &str) -> Result<PathBuf> {
        if !is_plain_name(name) {
            return Err(JobError::asset_not_found(name));
        }
        let path = self.root.join(name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(JobError::asset_not_found(name)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(JobError::asset_not_found(name))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Open an existing asset for reading, returning the file and its length.
    pub async fn retrieve(&self, name: &str) -> Result<(fs::File, u64)> {
        let path = self.locate(name).await?;
        let file = fs::File::open(&path).await?;
        let len = file.metadata().await?.len();
        Ok((file, len))
    }
}

async fn write_then_rename(partial: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    fs::write(partial, bytes).await?;
    fs::rename(partial, path).await
}

/// `.png` for `cat.png`; empty when there is no usable extension.
fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

/// Names must address a file directly under the root.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\', '\0'])
}
