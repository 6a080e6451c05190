//! Lossless manifest rewriting for the fork
//!
//! Rewrites one `Cargo.toml` so the package publishes under its forked
//! identity: the package's own name is renamed, every path dependency gets
//! the renamed identity recorded in its `package` field (the alias key stays
//! untouched so source code keeps compiling), versions are pinned to the
//! target release, and feature strings that reference workspace crates are
//! renamed in place.
//!
//! The document is parsed, modified, and re-serialized with `toml_edit`, so
//! comments and formatting survive and a manifest that does not match the
//! expected shape fails loudly instead of passing through unchanged.
//! Re-running the rewrite with the same target version is a no-op.

use crate::core::error::ForkError;
use crate::manifest::rename::RenameRule;
use std::path::Path;
use toml_edit::{value, DocumentMut, Item, Value};

/// Dependency sections a manifest may declare
const DEPENDENCY_SECTIONS: &[&str] = &["dependencies", "dev-dependencies", "build-dependencies"];

/// Rewrites manifests to the forked identity at a fixed target version
#[derive(Debug)]
pub struct ManifestRewriter {
    rule: RenameRule,
    target_version: String,
}

impl ManifestRewriter {
    /// Create a rewriter for one target release version.
    ///
    /// # Errors
    ///
    /// Returns `ForkError::InvalidVersion` if the version is not semver.
    pub fn new(rule: RenameRule, target_version: &str) -> Result<Self, ForkError> {
        semver::Version::parse(target_version).map_err(|e| ForkError::InvalidVersion {
            version: target_version.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            rule,
            target_version: target_version.to_string(),
        })
    }

    /// Rewrite manifest text, returning the new text.
    ///
    /// Writing the result back to storage is the caller's responsibility.
    /// `path` is only used for error reporting.
    pub fn rewrite(&self, manifest_text: &str, path: &Path) -> Result<String, ForkError> {
        let mut doc: DocumentMut =
            manifest_text
                .parse()
                .map_err(|e: toml_edit::TomlError| ForkError::ManifestParse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;

        self.rewrite_package(&mut doc, path)?;
        self.rewrite_dependencies(&mut doc);
        self.rewrite_features(&mut doc);

        Ok(doc.to_string())
    }

    /// Rewrite a manifest file in place.
    ///
    /// Returns true when the file content changed.
    pub fn rewrite_file(&self, path: &Path) -> Result<bool, ForkError> {
        let original = std::fs::read_to_string(path)?;
        let rewritten = self.rewrite(&original, path)?;

        if rewritten == original {
            return Ok(false);
        }
        std::fs::write(path, rewritten)?;
        Ok(true)
    }

    /// Rename `[package].name` and pin `[package].version`
    fn rewrite_package(&self, doc: &mut DocumentMut, path: &Path) -> Result<(), ForkError> {
        let package = doc
            .get_mut("package")
            .and_then(Item::as_table_like_mut)
            .ok_or_else(|| ForkError::ManifestFieldMissing {
                path: path.to_path_buf(),
                field: "package".to_string(),
            })?;

        let name = package
            .get("name")
            .and_then(Item::as_str)
            .ok_or_else(|| ForkError::ManifestFieldMissing {
                path: path.to_path_buf(),
                field: "package.name".to_string(),
            })?
            .to_string();

        if !self.rule.is_renamed(&name) {
            let published = self.rule.published_name(&name);
            if let Some(item) = package.get_mut("name") {
                *item = value(published);
            }
        }

        // Keeps the key position when the field exists; a manifest relying on
        // workspace version inheritance gets a literal version instead.
        if let Some(item) = package.get_mut("version") {
            *item = value(self.target_version.as_str());
        } else {
            package.insert("version", value(self.target_version.as_str()));
        }

        Ok(())
    }

    /// Retarget every path dependency: alias key unchanged, renamed identity
    /// in `package`, version pinned. Registry dependencies are untouched.
    fn rewrite_dependencies(&self, doc: &mut DocumentMut) {
        for section in DEPENDENCY_SECTIONS {
            let Some(deps) = doc.get_mut(section).and_then(Item::as_table_like_mut) else {
                continue;
            };

            let aliases: Vec<String> = deps.iter().map(|(k, _)| k.to_string()).collect();

            for alias in aliases {
                let Some(dep) = deps.get_mut(&alias).and_then(Item::as_table_like_mut) else {
                    continue;
                };
                if dep.get("path").and_then(Item::as_str).is_none() {
                    continue;
                }

                // An existing `package` key carries the real crate name;
                // otherwise the alias is the crate name itself.
                let original = dep
                    .get("package")
                    .and_then(Item::as_str)
                    .unwrap_or(&alias)
                    .to_string();

                if !self.rule.is_renamed(&original) {
                    let published = self.rule.published_name(&original);
                    if let Some(item) = dep.get_mut("package") {
                        *item = value(published);
                    } else {
                        dep.insert("package", value(published));
                    }
                }

                if let Some(item) = dep.get_mut("version") {
                    *item = value(self.target_version.as_str());
                } else {
                    dep.insert("version", value(self.target_version.as_str()));
                }
            }
        }
    }

    /// Rename workspace-crate references inside `[features]` arrays.
    ///
    /// Entries look like `"core_docmodel"`, `"core_docmodel/serde"`,
    /// `"dep:core_errors"` or `"core_io?/default"`; only the identity portion
    /// is renamed, qualifiers and sub-feature suffixes stay as they are.
    fn rewrite_features(&self, doc: &mut DocumentMut) {
        let Some(features) = doc.get_mut("features").and_then(Item::as_table_like_mut) else {
            return;
        };

        let names: Vec<String> = features.iter().map(|(k, _)| k.to_string()).collect();

        for name in names {
            let Some(entries) = features
                .get_mut(&name)
                .and_then(Item::as_value_mut)
                .and_then(Value::as_array_mut)
            else {
                continue;
            };

            for entry in entries.iter_mut() {
                let Some(text) = entry.as_str() else { continue };
                if let Some(renamed) = self.rename_feature_entry(text) {
                    let decor = entry.decor().clone();
                    let mut replacement = Value::from(renamed);
                    *replacement.decor_mut() = decor;
                    *entry = replacement;
                }
            }
        }
    }

    /// Compute the renamed form of one feature entry, or None when the entry
    /// does not reference a workspace crate (or already did get renamed).
    fn rename_feature_entry(&self, entry: &str) -> Option<String> {
        let (qualifier, rest) = match entry.strip_prefix("dep:") {
            Some(rest) => ("dep:", rest),
            None => ("", entry),
        };

        let (target, suffix) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };

        let (base, weak) = match target.strip_suffix('?') {
            Some(base) => (base, "?"),
            None => (target, ""),
        };

        if self.rule.is_renamed(base) || !self.rule.in_namespace(base) {
            return None;
        }

        Some(format!(
            "{}{}{}{}",
            qualifier,
            self.rule.published_name(base),
            weak,
            suffix
        ))
    }
}
