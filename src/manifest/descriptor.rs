//! Per-run package metadata read from rewritten manifests
//!
//! Descriptors are built fresh from disk on every orchestrator run so they
//! reflect whatever the rewrite pass (or a manual edit) left in the
//! manifests. Nothing here is cached across runs.

use crate::core::error::ForkError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, Item};

/// One package as the publish orchestrator sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Crate directory (containing Cargo.toml)
    pub path: PathBuf,

    /// Declared (published) package name
    pub name: String,

    /// Declared version
    pub version: String,

    /// Names of path dependencies, as they will resolve on the registry.
    /// Dev-dependencies are excluded: they are stripped at publish time and
    /// may legitimately point backwards in the order.
    pub internal_deps: Vec<String>,
}

impl PackageDescriptor {
    /// Read a descriptor from `<crate_dir>/Cargo.toml`
    pub fn read(crate_dir: &Path) -> Result<Self, ForkError> {
        let manifest_path = crate_dir.join("Cargo.toml");
        let text = std::fs::read_to_string(&manifest_path)?;

        let doc: DocumentMut =
            text.parse()
                .map_err(|e: toml_edit::TomlError| ForkError::ManifestParse {
                    path: manifest_path.clone(),
                    message: e.to_string(),
                })?;

        let package = doc
            .get("package")
            .and_then(Item::as_table_like)
            .ok_or_else(|| ForkError::ManifestFieldMissing {
                path: manifest_path.clone(),
                field: "package".to_string(),
            })?;

        let name = package
            .get("name")
            .and_then(Item::as_str)
            .ok_or_else(|| ForkError::ManifestFieldMissing {
                path: manifest_path.clone(),
                field: "package.name".to_string(),
            })?
            .to_string();

        let version = package
            .get("version")
            .and_then(Item::as_str)
            .ok_or_else(|| ForkError::ManifestFieldMissing {
                path: manifest_path.clone(),
                field: "package.version".to_string(),
            })?
            .to_string();

        let mut internal_deps = Vec::new();
        for section in ["dependencies", "build-dependencies"] {
            let Some(deps) = doc.get(section).and_then(Item::as_table_like) else {
                continue;
            };
            for (alias, dep) in deps.iter() {
                let Some(dep) = dep.as_table_like() else { continue };
                if dep.get("path").and_then(Item::as_str).is_none() {
                    continue;
                }
                let name = dep.get("package").and_then(Item::as_str).unwrap_or(alias);
                internal_deps.push(name.to_string());
            }
        }

        Ok(Self {
            path: crate_dir.to_path_buf(),
            name,
            version,
            internal_deps,
        })
    }

    /// Path to this package's manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.path.join("Cargo.toml")
    }
}

/// Read descriptors for the configured crate directories, in order.
///
/// `crate_dirs` entries are resolved relative to `workspace_root`.
pub fn load_order(
    workspace_root: &Path,
    crate_dirs: &[PathBuf],
) -> Result<Vec<PackageDescriptor>, ForkError> {
    crate_dirs
        .iter()
        .map(|dir| PackageDescriptor::read(&workspace_root.join(dir)))
        .collect()
}

/// Check that no package appears before one of its path dependencies.
///
/// The orchestrator itself trusts the supplied order; this check is for the
/// caller to run up front. Dependencies outside the supplied order are
/// ignored (they may be path crates that are intentionally not published).
pub fn validate_order(order: &[PackageDescriptor]) -> Result<(), ForkError> {
    let positions: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(i, d)| (d.name.as_str(), i))
        .collect();

    for (index, package) in order.iter().enumerate() {
        for dep in &package.internal_deps {
            if let Some(&dep_index) = positions.get(dep.as_str()) {
                if dep_index > index {
                    return Err(ForkError::OrderViolation {
                        package: package.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
    }

    Ok(())
}
