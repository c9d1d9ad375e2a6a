//! Code and layer archives referenced by the graph.
//!
//! Archives live outside the project directory (relative to the parent of
//! the working directory) and are treated as opaque blobs. When an archive
//! exists on disk its content hash is recorded so the reconciler can detect
//! code changes; a missing archive is not a build error because upload is
//! the reconciler's job.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const STREAM_BUF_SIZE: usize = 65536;

/// A packaged archive referenced by a function or layer node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveArtifact {
    /// Archive path as the reconciler should see it.
    pub path: String,
    /// `"blake3:{hex}"` of the archive contents, when present on disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl ArchiveArtifact {
    /// Resolve `relative` against the build root, hashing the archive if it
    /// exists.
    pub fn at(root: &Path, relative: &str) -> Result<Self, String> {
        let full = root.join(relative);
        let content_hash = if full.is_file() {
            Some(hash_file(&full)?)
        } else {
            None
        };
        Ok(ArchiveArtifact {
            path: full.to_string_lossy().to_string(),
            content_hash,
        })
    }

    /// An artifact carrying only a path, with no hash.
    pub fn unhashed(path: &str) -> Self {
        ArchiveArtifact {
            path: path.to_string(),
            content_hash: None,
        }
    }
}

/// Root that archive paths resolve against: the parent of the working
/// directory, so sibling `build/` and `layers/` directories are found.
pub fn build_root() -> Result<PathBuf, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("cannot determine working directory: {}", e))?;
    match cwd.parent() {
        Some(parent) => Ok(parent.to_path_buf()),
        None => Ok(cwd),
    }
}

/// Hash a file's contents. Returns `"blake3:{hex}"`.
pub fn hash_file(path: &Path) -> Result<String, String> {
    let mut file =
        std::fs::File::open(path).map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; STREAM_BUF_SIZE];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| format!("read error {}: {}", path.display(), e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("blake3:{}", hasher.finalize().to_hex()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_archive_yields_no_hash() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ArchiveArtifact::at(dir.path(), "build/archive.zip").unwrap();
        assert!(artifact.content_hash.is_none());
        assert!(artifact.path.ends_with("build/archive.zip"));
    }

    #[test]
    fn existing_archive_is_hashed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("build")).unwrap();
        let mut f = std::fs::File::create(dir.path().join("build/archive.zip")).unwrap();
        f.write_all(b"archive bytes").unwrap();
        let artifact = ArchiveArtifact::at(dir.path(), "build/archive.zip").unwrap();
        let hash = artifact.content_hash.unwrap();
        assert!(hash.starts_with("blake3:"));
    }

    #[test]
    fn hash_is_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.zip");
        let b = dir.path().join("b.zip");
        std::fs::write(&a, b"same").unwrap();
        std::fs::write(&b, b"same").unwrap();
        assert_eq!(hash_file(&a).unwrap(), hash_file(&b).unwrap());
        std::fs::write(&b, b"different").unwrap();
        assert_ne!(hash_file(&a).unwrap(), hash_file(&b).unwrap());
    }
}
