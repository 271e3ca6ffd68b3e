//! Local-disk storage for the flat file store
//!
//! Every stored file lives directly under a single root directory.
//! The directory itself is the only source of truth: nothing is cached
//! in memory, so listings always reflect what is on disk.
//!
//! Uploads are written to a staging directory next to the root and renamed
//! into place once complete, so a stored file is only ever replaced whole.
//!
//! Uses `tokio::fs`, which runs blocking filesystem calls on the runtime's
//! blocking pool so one slow disk operation never stalls other requests.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::shared::validation::validate_file_name;

/// Flat directory of stored files
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    staging: PathBuf,
}

/// Upload in progress, not yet visible in the store
#[derive(Debug)]
pub struct StagedFile {
    pub path: PathBuf,
    pub file: fs::File,
}

/// Sibling of `root` on the same filesystem, so commits are a plain rename
fn staging_dir_for(root: &Path) -> PathBuf {
    let parent = match root.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut name = OsString::from(".");
    name.push(root.file_name().unwrap_or_else(|| "store".as_ref()));
    name.push(".staging");
    parent.join(name)
}

impl LocalStore {
    /// Open the store at `root`, creating it and its staging directory if absent
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let staging = staging_dir_for(&root);
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(&staging).await?;

        info!(
            "Local store opened at {} (staging: {})",
            root.display(),
            staging.display()
        );

        Ok(Self { root, staging })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn staging(&self) -> &Path {
        &self.staging
    }

    /// Map a client-supplied name to its location directly under the root
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_file_name(name).map_err(AppError::Validation)?;
        Ok(self.root.join(name))
    }

    /// Names of every entry under the root, in directory enumeration order.
    ///
    /// Entries whose names are not valid UTF-8 cannot be addressed over HTTP
    /// and are left out.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => warn!("Skipping non UTF-8 store entry: {:?}", raw),
            }
        }

        Ok(names)
    }

    /// Path of `name` if it is a regular file directly under the root.
    ///
    /// Directories and symlinks are never served.
    pub async fn regular_file(&self, name: &str) -> Result<Option<PathBuf>> {
        let path = self.path_for(name)?;

        match fs::symlink_metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(path)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Open a fresh staging file for an incoming upload
    pub async fn stage(&self) -> Result<StagedFile> {
        // A concurrent clear never touches staging, but it may have been removed out-of-band
        fs::create_dir_all(&self.staging).await?;

        let path = self.staging.join(format!("{}.part", Uuid::new_v4()));
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        Ok(StagedFile { path, file })
    }

    /// Move a completed staging file into the store as `name`.
    ///
    /// The rename replaces whatever entry held `name`, including a symlink,
    /// without following it.
    pub async fn commit(&self, staged: &Path, name: &str) -> Result<()> {
        let target = self.path_for(name)?;

        if let Err(e) = fs::rename(staged, &target).await {
            self.discard(staged).await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Best-effort removal of an abandoned staging file
    pub async fn discard(&self, staged: &Path) {
        if let Err(e) = fs::remove_file(staged).await {
            if e.kind() != ErrorKind::NotFound {
                warn!("Failed to discard staged file {}: {}", staged.display(), e);
            }
        }
    }

    /// Remove `name`, reporting a missing file as not found
    pub async fn remove(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("File '{}' not found", name)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the root and everything in it, then recreate it empty
    pub async fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Store root {} already absent", self.root.display());
            }
            Err(e) => return Err(e.into()),
        }

        fs::create_dir_all(&self.root).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncWriteExt;

    async fn open_temp_store() -> (LocalStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path().join("files")).await.unwrap();
        (store, dir)
    }

    #[test]
    fn test_staging_dir_is_sibling_of_root() {
        assert_eq!(
            staging_dir_for(Path::new("/srv/data/files")),
            PathBuf::from("/srv/data/.files.staging")
        );
        assert_eq!(
            staging_dir_for(Path::new("files")),
            PathBuf::from("./.files.staging")
        );
    }

    #[tokio::test]
    async fn test_open_creates_missing_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested").join("files");

        let store = LocalStore::open(&root).await.unwrap();

        assert!(root.is_dir());
        assert!(store.staging().is_dir());
        assert_eq!(store.root(), root.as_path());
    }

    #[tokio::test]
    async fn test_list_reflects_directory() {
        let (store, _dir) = open_temp_store().await;
        std::fs::write(store.root().join("a.txt"), b"a").unwrap();
        std::fs::write(store.root().join("b.txt"), b"b").unwrap();

        let mut names = store.list().await.unwrap();
        names.sort();

        assert_eq!(names, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_list_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (store, _dir) = open_temp_store().await;
        std::fs::write(store.root().join("plain.txt"), b"ok").unwrap();
        std::fs::write(store.root().join(OsStr::from_bytes(b"bad\xFFname")), b"x").unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["plain.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_list_fails_when_root_vanishes() {
        let (store, _dir) = open_temp_store().await;
        std::fs::remove_dir_all(store.root()).unwrap();

        let err = store.list().await.unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[tokio::test]
    async fn test_path_for_rejects_escaping_names() {
        let (store, _dir) = open_temp_store().await;

        assert!(matches!(
            store.path_for("../outside"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(store.path_for(".."), Err(AppError::Validation(_))));
        assert_eq!(
            store.path_for("inside.txt").unwrap(),
            store.root().join("inside.txt")
        );
    }

    #[tokio::test]
    async fn test_regular_file_ignores_directories() {
        let (store, _dir) = open_temp_store().await;
        std::fs::create_dir(store.root().join("subdir")).unwrap();
        std::fs::write(store.root().join("plain"), b"x").unwrap();

        assert!(store.regular_file("subdir").await.unwrap().is_none());
        assert!(store.regular_file("missing").await.unwrap().is_none());
        assert_eq!(
            store.regular_file("plain").await.unwrap(),
            Some(store.root().join("plain"))
        );
    }

    #[tokio::test]
    async fn test_staged_file_is_invisible_until_commit() {
        let (store, _dir) = open_temp_store().await;

        let mut staged = store.stage().await.unwrap();
        staged.file.write_all(b"staged bytes").await.unwrap();
        staged.file.flush().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());

        drop(staged.file);
        store.commit(&staged.path, "done.txt").await.unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["done.txt".to_string()]);
        assert_eq!(
            std::fs::read(store.root().join("done.txt")).unwrap(),
            b"staged bytes"
        );
        assert!(!staged.path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_commit_replaces_symlink_instead_of_following_it() {
        let (store, dir) = open_temp_store().await;
        let outside = dir.path().join("outside.txt");
        std::fs::write(&outside, b"untouched").unwrap();
        std::os::unix::fs::symlink(&outside, store.root().join("link.txt")).unwrap();

        let mut staged = store.stage().await.unwrap();
        staged.file.write_all(b"uploaded").await.unwrap();
        staged.file.flush().await.unwrap();
        drop(staged.file);
        store.commit(&staged.path, "link.txt").await.unwrap();

        assert_eq!(std::fs::read(&outside).unwrap(), b"untouched");
        let metadata = std::fs::symlink_metadata(store.root().join("link.txt")).unwrap();
        assert!(metadata.is_file());
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let (store, _dir) = open_temp_store().await;

        let err = store.remove("ghost.txt").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let (store, _dir) = open_temp_store().await;
        std::fs::write(store.root().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(store.root().join("nested")).unwrap();
        std::fs::write(store.root().join("nested").join("b.txt"), b"b").unwrap();

        store.clear().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());

        std::fs::remove_dir_all(store.root()).unwrap();
        store.clear().await.unwrap();
        assert!(store.root().is_dir());
    }
}
