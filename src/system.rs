use std::io::Write;
use std::path::{Path, PathBuf};

use log::{trace, warn};
use walkdir::WalkDir;

use crate::error::{GenerateError, Result};

/// Abstraction over the file system the generator reads from and writes to.
/// This lets the generator be driven against an in-memory tree in tests.
pub trait ResourceFs {
    /// Every regular file below `root`, in walk order.
    ///
    /// Fails with [`GenerateError::InputNotFound`] when `root` is not a directory.
    fn list_files(&self, root: &Path, follow_links: bool) -> Result<Vec<PathBuf>>;

    /// Read a whole file.
    fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    /// Replace `path` with `contents`. Either the full text lands or `path` is untouched.
    fn write_output(&self, path: &Path, contents: &str) -> Result<()>;
}

/// The real disk.
pub struct LocalFs;

impl ResourceFs for LocalFs {
    fn list_files(&self, root: &Path, follow_links: bool) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(GenerateError::InputNotFound { path: root.to_path_buf() });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).follow_links(follow_links) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                GenerateError::InputUnreadable { path, source: e.into() }
            })?;

            let file_type = entry.file_type();
            if file_type.is_file() {
                files.push(entry.into_path());
            } else if entry.path_is_symlink() {
                // Unfollowed link: embed it when it points at a file, never descend into it.
                let target = std::fs::metadata(entry.path()).map_err(|source| {
                    GenerateError::InputUnreadable { path: entry.path().to_path_buf(), source }
                })?;
                if target.is_file() {
                    files.push(entry.into_path());
                } else {
                    warn!(
                        "Skipping directory symlink {:?} (use --follow-links to embed its contents)",
                        entry.path()
                    );
                }
            } else if !file_type.is_dir() {
                warn!("Skipping {:?}: not a regular file", entry.path());
            }
        }
        Ok(files)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|source| GenerateError::InputUnreadable {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_output(&self, path: &Path, contents: &str) -> Result<()> {
        let write_err = |source| GenerateError::OutputWrite { path: path.to_path_buf(), source };

        // Stage next to the target so the final rename stays on one file system.
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        trace!("Staging header in {:?}", tmp.path());

        tmp.write_all(contents.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;

        // The temp file is created 0600; keep the old header's mode, else 0644.
        let permissions = match std::fs::metadata(path) {
            Ok(meta) => Some(meta.permissions()),
            Err(_) => default_permissions(),
        };
        if let Some(permissions) = permissions {
            std::fs::set_permissions(tmp.path(), permissions).map_err(write_err)?;
        }

        tmp.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<std::fs::Permissions> {
    None
}

/// An in-memory tree for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFs {
    pub root: PathBuf,
    /// Files in the order `list_files` yields them.
    pub files: Vec<(PathBuf, Vec<u8>)>,
    pub unreadable: Vec<PathBuf>,
    pub fail_writes: bool,
    pub written: std::sync::Mutex<std::collections::HashMap<PathBuf, String>>,
}

#[cfg(test)]
impl MockFs {
    pub fn new(root: &str) -> Self {
        Self { root: PathBuf::from(root), ..Default::default() }
    }

    /// Adds a file at `rel` (slash separated) below the root.
    pub fn with_file(mut self, rel: &str, bytes: &[u8]) -> Self {
        let path = rel.split('/').fold(self.root.clone(), |acc, part| acc.join(part));
        self.files.push((path, bytes.to_vec()));
        self
    }

    pub fn output(&self, path: &Path) -> Option<String> {
        self.written.lock().unwrap().get(path).cloned()
    }
}

#[cfg(test)]
impl ResourceFs for MockFs {
    fn list_files(&self, root: &Path, _follow_links: bool) -> Result<Vec<PathBuf>> {
        if root != self.root {
            return Err(GenerateError::InputNotFound { path: root.to_path_buf() });
        }
        Ok(self.files.iter().map(|(p, _)| p.clone()).collect())
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let not_readable = || GenerateError::InputUnreadable {
            path: path.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        if self.unreadable.iter().any(|p| p == path) {
            return Err(not_readable());
        }
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(not_readable)
    }

    fn write_output(&self, path: &Path, contents: &str) -> Result<()> {
        if self.fail_writes {
            return Err(GenerateError::OutputWrite {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            });
        }
        self.written.lock().unwrap().insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}
