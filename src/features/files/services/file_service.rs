use axum::body::Bytes;
use futures::{pin_mut, Stream, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{FileListDto, StoredFileDto};
use crate::modules::storage::LocalStore;

/// Service for file operations
pub struct FileService {
    store: Arc<LocalStore>,
    max_upload_size: usize,
}

impl FileService {
    pub fn new(store: Arc<LocalStore>, max_upload_size: usize) -> Self {
        Self {
            store,
            max_upload_size,
        }
    }

    /// List every entry currently in the store
    pub async fn list_files(&self) -> Result<FileListDto> {
        let files = self.store.list().await?;
        debug!("Listed {} stored files", files.len());
        Ok(FileListDto { files })
    }

    /// Resolve `name` to a servable file path
    ///
    /// # Returns
    /// The on-disk path, or `NotFound` when `name` is not a regular file in the store
    pub async fn resolve_file(&self, name: &str) -> Result<PathBuf> {
        self.store
            .regular_file(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File '{}' not found", name)))
    }

    /// Stream an upload into the store under `name`, replacing any existing file.
    ///
    /// The body is written to a staging file and only moved into the store once
    /// complete, so a failed upload leaves the previous version of `name` intact.
    ///
    /// # Arguments
    /// * `name` - The client-supplied original filename
    /// * `chunks` - The file body as it arrives from the client
    pub async fn store_file<S>(&self, name: &str, chunks: S) -> Result<StoredFileDto>
    where
        S: Stream<Item = Result<Bytes>>,
    {
        self.store.path_for(name)?;
        let mut staged = self.store.stage().await?;

        let size = match self.write_chunks(&mut staged.file, chunks).await {
            Ok(size) => size,
            Err(e) => {
                drop(staged.file);
                self.store.discard(&staged.path).await;
                debug!("Upload of {} aborted: {}", name, e);
                return Err(e);
            }
        };

        drop(staged.file);
        self.store.commit(&staged.path, name).await?;

        info!("File stored: name={}, size={}", name, size);
        Ok(StoredFileDto {
            name: name.to_string(),
            size,
        })
    }

    async fn write_chunks<S>(&self, file: &mut tokio::fs::File, chunks: S) -> Result<u64>
    where
        S: Stream<Item = Result<Bytes>>,
    {
        pin_mut!(chunks);
        let mut written: u64 = 0;

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;

            if written > self.max_upload_size as u64 {
                return Err(AppError::PayloadTooLarge(format!(
                    "File too large. Maximum size is {} bytes",
                    self.max_upload_size
                )));
            }

            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(written)
    }

    /// Delete a single file from the store
    pub async fn delete_file(&self, name: &str) -> Result<()> {
        self.store.remove(name).await?;
        info!("File deleted: {}", name);
        Ok(())
    }

    /// Remove every stored file
    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await?;
        info!("Store cleared: {}", self.store.root().display());
        Ok(())
    }
}
