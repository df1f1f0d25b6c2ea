//! Checks run before an adapter touches the project.

use fcu_core::{FcuError, Result};
use std::path::{Component, Path, PathBuf};

/// Extensions the model adapters import.
pub const MODEL_IMPORT_EXTENSIONS: &[&str] = &["fbx"];

/// The source must exist and carry one of `extensions` (case-insensitive).
pub fn validate_source(path: &Path, extensions: &[&str]) -> Result<()> {
    if !path.is_file() {
        return Err(FcuError::invalid_asset(format!(
            "cannot import file \"{}\" because it does not exist",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if !extensions.contains(&extension.as_str()) {
        return Err(FcuError::invalid_asset(format!(
            "importing files with extension \".{}\" is not supported",
            extension
        )));
    }
    Ok(())
}

/// Resolves `destination` and checks that it is `root` or lies below it.
///
/// Existing paths are canonicalized, so symlinks cannot point outside the
/// root. For paths that do not exist yet, the deepest existing ancestor is
/// canonicalized and the rest is normalized lexically.
///
/// # Errors
///
/// `FcuError::OutOfBoundsDestination` when the resolved path leaves `root`.
pub fn contained_destination(root: &Path, destination: &Path) -> Result<PathBuf> {
    let resolved_root = resolve(root);
    let resolved = resolve(destination);

    if resolved.starts_with(&resolved_root) {
        Ok(resolved)
    } else {
        Err(FcuError::OutOfBoundsDestination {
            destination: destination.to_path_buf(),
            root: root.to_path_buf(),
        })
    }
}

fn resolve(path: &Path) -> PathBuf {
    let normalized = normalize_lexically(path);

    let mut existing = normalized.as_path();
    let mut rest = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return rest.iter().rev().fold(canonical, |acc, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return normalized,
        }
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
