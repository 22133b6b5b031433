//! Output tree writer.
//!
//! All paths handed to the writer are relative to the output root and
//! `/`-separated, the same keys the [`ledger`](crate::ledger) records.
//! Per-file failures are returned as [`WriteFailure`] values so the caller can
//! keep going; only failing to create the root itself is fatal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// One file that could not be written.
#[derive(Error, Debug)]
#[error("{path}: {source}")]
pub struct WriteFailure {
    pub path: String,
    #[source]
    pub source: io::Error,
}

/// A static asset copied into the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedAsset {
    pub path: String,
    pub bytes: Vec<u8>,
}

pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    /// Create the output root (and parents) if needed.
    pub fn create(root: &Path) -> io::Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of an output-relative path.
    pub fn resolve(&self, rel: &str) -> PathBuf {
        rel.split('/')
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    /// Write `content` to `rel`, creating parent directories and overwriting
    /// any existing file.
    pub fn write(&self, rel: &str, content: &[u8]) -> Result<(), WriteFailure> {
        let path = self.resolve(rel);
        let result = match path.parent() {
            Some(parent) => fs::create_dir_all(parent).and_then(|_| fs::write(&path, content)),
            None => fs::write(&path, content),
        };
        result.map_err(|source| WriteFailure {
            path: rel.to_string(),
            source,
        })?;
        debug!(path = rel, bytes = content.len(), "wrote file");
        Ok(())
    }

    /// Copy every file under `src` to `<root>/<prefix>/...`, preserving the
    /// relative layout. A missing `src` copies nothing.
    ///
    /// Returns the copied files (in path order) and the ones that failed.
    pub fn copy_tree(&self, src: &Path, prefix: &str) -> (Vec<CopiedAsset>, Vec<WriteFailure>) {
        let mut copied = Vec::new();
        let mut failures = Vec::new();
        if !src.is_dir() {
            return (copied, failures);
        }

        for entry in WalkDir::new(src).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| src.display().to_string());
                    failures.push(WriteFailure {
                        path,
                        source: io::Error::other(err.to_string()),
                    });
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(src) else {
                continue;
            };
            let rel = std::iter::once(prefix.to_string())
                .chain(
                    relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned()),
                )
                .collect::<Vec<_>>()
                .join("/");

            let bytes = match fs::read(entry.path()) {
                Ok(bytes) => bytes,
                Err(source) => {
                    failures.push(WriteFailure { path: rel, source });
                    continue;
                }
            };
            match self.write(&rel, &bytes) {
                Ok(()) => copied.push(CopiedAsset { path: rel, bytes }),
                Err(failure) => failures.push(failure),
            }
        }
        (copied, failures)
    }

    /// Delete `rel`, then any parent directories it leaves empty (never the
    /// root). A file that is already gone is not an error.
    pub fn remove(&self, rel: &str) -> io::Result<()> {
        let path = self.resolve(rel);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
        let mut dir = path.parent();
        while let Some(current) = dir {
            if current == self.root || !current.starts_with(&self.root) {
                break;
            }
            if fs::remove_dir(current).is_err() {
                break;
            }
            dir = current.parent();
        }
        Ok(())
    }
}
