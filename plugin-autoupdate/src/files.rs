//! File helpers shared by both updaters: staged writes and local digests.

use crate::error::UpdaterError;
use sha1::{Digest as _, Sha1};
use std::io::Read as _;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt as _;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// A file being written next to its final destination.
///
/// Data only becomes visible at the destination once [`StagedFile::commit`]
/// renames the temporary file over it. Dropping an uncommitted staged file
/// removes the temporary file.
#[derive(Debug)]
pub struct StagedFile {
    file: tokio::fs::File,
    temp: TempPath,
    destination: PathBuf,
    written: u64,
}

impl StagedFile {
    pub fn create(destination: impl Into<PathBuf>) -> Result<Self, UpdaterError> {
        let destination = destination.into();
        let directory = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let (file, temp) = tempfile::Builder::new()
            .prefix(".")
            .suffix(".part")
            .tempfile_in(directory)?
            .into_parts();

        Ok(Self {
            file: tokio::fs::File::from_std(file),
            temp,
            destination,
            written: 0,
        })
    }

    pub async fn write_all(&mut self, data: &[u8]) -> Result<(), UpdaterError> {
        self.file.write_all(data).await?;
        self.written += data.len() as u64;

        Ok(())
    }

    /// Flush everything to disk and move the file into place.
    pub async fn commit(self) -> Result<PathBuf, UpdaterError> {
        let Self {
            mut file,
            temp,
            destination,
            written,
        } = self;

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        temp.persist(&destination).map_err(std::io::Error::from)?;
        tracing::trace!("Committed {} bytes to {}", written, destination.display());

        Ok(destination)
    }
}

/// SHA-1 of a local file as lowercase hex, or `None` if the file does not exist.
pub async fn sha1_file(path: impl Into<PathBuf>) -> Result<Option<String>, UpdaterError> {
    let path = path.into();

    // Hashing is plain blocking I/O, keep it off the async reactor.
    tokio::task::spawn_blocking(move || {
        let mut file = match std::fs::File::open(&path) {
            Ok(v) => v,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let mut hasher = Sha1::new();
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];
        loop {
            let n = file.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok::<_, UpdaterError>(Some(hex::encode(hasher.finalize())))
    })
    .await
    .map_err(std::io::Error::other)?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sha1_of_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();

        let digest = sha1_file(dir.path().join("missing.jar")).await.unwrap();

        assert_eq!(digest, None);
    }

    #[tokio::test]
    async fn sha1_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.jar");
        let hello = dir.path().join("hello.jar");
        std::fs::write(&empty, b"").unwrap();
        std::fs::write(&hello, b"hello\n").unwrap();

        assert_eq!(
            sha1_file(&empty).await.unwrap().as_deref(),
            Some("da39a3ee5e6b4b0d3255bfef95601890afd80709")
        );
        assert_eq!(
            sha1_file(&hello).await.unwrap().as_deref(),
            Some("f572d396fae9206628714fb2ce00f72e94f2258f")
        );
    }

    #[tokio::test]
    async fn commit_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Plugin.jar");
        std::fs::write(&target, b"old").unwrap();

        let mut staged = StagedFile::create(&target).unwrap();
        staged.write_all(b"new ").await.unwrap();
        staged.write_all(b"content").await.unwrap();

        // Not visible until committed
        assert_eq!(std::fs::read(&target).unwrap(), b"old");

        let committed = staged.commit().await.unwrap();

        assert_eq!(committed, target);
        assert_eq!(std::fs::read(&target).unwrap(), b"new content");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn dropped_staged_file_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Plugin.jar");

        let mut staged = StagedFile::create(&target).unwrap();
        staged.write_all(b"partial").await.unwrap();
        drop(staged);

        assert!(!target.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
