//! Per-request scratch storage for uploaded bytes.
//!
//! Each upload gets its own scratch file named `{uuid}-{sanitized display name}`, so
//! concurrent uploads sharing a display name never collide on disk and a hostile
//! display name cannot escape the scratch directory. The file is removed when the
//! owning [`ScratchFile`] guard is dropped, success or failure.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use uuid::Uuid;

/// RAII guard for a single request's scratch file.
///
/// Dropping the guard deletes the file from disk.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Create the backing file inside `dir`; the caller streams bytes into the
    /// returned handle and drops it before handing the path to the publisher.
    pub async fn create(dir: &Path, display_name: &str) -> io::Result<(Self, File)> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(scratch_file_name(display_name));
        let file = File::create(&path).await?;
        Ok((Self { path }, file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(error) = std::fs::remove_file(&self.path) {
            if error.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), %error, "Failed to remove scratch file");
            }
        }
    }
}

/// Build a unique, filesystem-safe scratch name from the caller-supplied display name.
///
/// The display name is only a readable suffix; uniqueness comes from the UUID.
fn scratch_file_name(display_name: &str) -> String {
    let sanitized = sanitize(display_name);
    if sanitized.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        format!("{}-{}", Uuid::new_v4(), sanitized)
    }
}

/// Replace everything that is not a plain filename character and strip leading/trailing
/// dots, so traversal segments can never survive into the path.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_written_bytes_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let payload = b"\x89PNG\r\n\x1a\n12";

        let (guard, mut file) = ScratchFile::create(dir.path(), "cat.png").await.unwrap();
        file.write_all(payload).await.unwrap();
        file.flush().await.unwrap();
        drop(file);

        let stored = tokio::fs::read(guard.path()).await.unwrap();
        assert_eq!(stored, payload);
    }

    #[tokio::test]
    async fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();

        let (guard, mut file) = ScratchFile::create(dir.path(), "cat.png").await.unwrap();
        file.write_all(b"bytes").await.unwrap();
        drop(file);

        let path = guard.path().to_path_buf();
        assert!(path.exists());
        drop(guard);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_same_display_name_never_collides() {
        let dir = tempfile::tempdir().unwrap();

        let (first, file_a) = ScratchFile::create(dir.path(), "cat.png").await.unwrap();
        let (second, file_b) = ScratchFile::create(dir.path(), "cat.png").await.unwrap();
        drop(file_a);
        drop(file_b);

        assert_ne!(first.path(), second.path());
        assert!(first.path().exists());
        assert!(second.path().exists());
    }

    #[tokio::test]
    async fn test_traversal_name_stays_inside_dir() {
        let dir = tempfile::tempdir().unwrap();

        let (guard, file) = ScratchFile::create(dir.path(), "../../etc/passwd").await.unwrap();
        drop(file);

        assert_eq!(guard.path().parent(), Some(dir.path()));
        let name = guard.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(!name.contains('/'));
        assert!(!name.starts_with('.'));
    }

    #[tokio::test]
    async fn test_empty_display_name_accepted() {
        let dir = tempfile::tempdir().unwrap();

        let (guard, file) = ScratchFile::create(dir.path(), "").await.unwrap();
        drop(file);

        assert!(guard.path().exists());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("cat.png"), "cat.png");
        assert_eq!(sanitize("my photo.png"), "my_photo.png");
        assert_eq!(sanitize("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize("...."), "");
    }
}
