//! Names that end up in the generated header: declaration identifiers and the
//! forward-slash relative paths stored next to them.

use std::path::{Component, Path};

use crate::error::{GenerateError, Result};

/// Derives a declaration identifier from a bare file name.
///
/// Dots become underscores and letters are uppercased, so `a.b.png` becomes
/// `A_B_PNG`. Any other character a C++ identifier cannot hold is also mapped
/// to `_`, and a leading digit gets a `_` prefix.
pub fn derive_identifier(file_name: &str) -> String {
    let mut ident: String = file_name
        .replace('.', "_")
        .to_uppercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Path of `path` relative to `root`, joined with `/` on every platform.
pub fn relative_path(root: &Path, path: &Path) -> Result<String> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut parts = Vec::new();

    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| GenerateError::NonUtf8Path { path: path.to_path_buf() })?;
                parts.push(part);
            }
            Component::CurDir => {}
            other => parts.push(other.as_os_str().to_str().unwrap_or_default()),
        }
    }

    Ok(parts.join("/"))
}
