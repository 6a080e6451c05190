//! Audit report: which forked crates are published, and at which versions
//!
//! Walks the workspace manifests, maps each package through the rename rule,
//! and asks the registry for the published version list of the renamed
//! crate. Read-only; failures on individual crates land in the report
//! instead of aborting it.

use crate::manifest::rename::RenameRule;
use crate::registry::status::CratesIoChecker;
use std::path::Path;
use std::time::Duration;
use toml_edit::{DocumentMut, Item};
use walkdir::WalkDir;

/// One line of the audit report
#[derive(Debug, Clone)]
pub struct AuditRow {
    /// Name as declared in the workspace (pre-rename when the rewrite pass
    /// has not run yet)
    pub original: String,

    /// Name the crate publishes under
    pub published: String,

    /// Published versions, or None when the crate is not on the registry.
    /// A query failure is reported as an empty `Err`-style message row.
    pub versions: Option<Vec<String>>,

    /// Query error, if the registry could not be asked
    pub error: Option<String>,
}

/// Collects the audit report for a workspace
pub struct Auditor {
    checker: CratesIoChecker,
    rule: RenameRule,
    api_spacing: Duration,
}

impl Auditor {
    pub fn new(checker: CratesIoChecker, rule: RenameRule, api_spacing: Duration) -> Self {
        Self {
            checker,
            rule,
            api_spacing,
        }
    }

    /// Audit the root crate plus everything under `crates/`.
    ///
    /// Rows come back sorted by original name. Registry queries respect the
    /// configured API spacing.
    pub async fn audit_workspace(&self, workspace_root: &Path) -> Vec<AuditRow> {
        let mut names = Vec::new();

        if let Some(name) = read_package_name(&workspace_root.join("Cargo.toml")) {
            names.push(name);
        }

        let crates_dir = workspace_root.join("crates");
        if crates_dir.is_dir() {
            for entry in WalkDir::new(&crates_dir)
                .min_depth(2)
                .max_depth(2)
                .into_iter()
                .filter_map(Result::ok)
            {
                if entry.file_name() == "Cargo.toml" {
                    if let Some(name) = read_package_name(entry.path()) {
                        names.push(name);
                    }
                }
            }
        }

        names.sort();
        names.dedup();

        let mut rows = Vec::with_capacity(names.len());
        for (index, original) in names.into_iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.api_spacing).await;
            }

            let published = if self.rule.is_renamed(&original) {
                original.clone()
            } else {
                self.rule.published_name(&original)
            };

            let row = match self.checker.published_versions(&published).await {
                Ok(versions) => AuditRow {
                    original,
                    published,
                    versions,
                    error: None,
                },
                Err(e) => AuditRow {
                    original,
                    published,
                    versions: None,
                    error: Some(e.to_string()),
                },
            };
            rows.push(row);
        }

        rows
    }
}

/// Read `[package].name` from a manifest, skipping virtual manifests and
/// anything unparseable (audit is a report, not a gate).
fn read_package_name(manifest_path: &Path) -> Option<String> {
    let text = std::fs::read_to_string(manifest_path).ok()?;
    let doc: DocumentMut = text.parse().ok()?;

    doc.get("package")
        .and_then(Item::as_table_like)
        .and_then(|p| p.get("name"))
        .and_then(Item::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_manifest(dir: &Path, name: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(
            dir.join("Cargo.toml"),
            format!("[package]\nname = \"{}\"\nversion = \"0.1.0\"\n", name),
        )
        .unwrap();
    }

    #[test]
    fn test_read_package_name() {
        let temp_dir = TempDir::new().unwrap();
        write_manifest(temp_dir.path(), "core_errors");

        let name = read_package_name(&temp_dir.path().join("Cargo.toml"));
        assert_eq!(name.as_deref(), Some("core_errors"));
    }

    #[test]
    fn test_read_package_name_virtual_manifest() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("Cargo.toml"),
            "[workspace]\nmembers = [\"crates/*\"]\n",
        )
        .unwrap();

        assert!(read_package_name(&temp_dir.path().join("Cargo.toml")).is_none());
    }

    #[tokio::test]
    async fn test_audit_collects_sorted_rows_with_errors() {
        let temp_dir = TempDir::new().unwrap();
        write_manifest(temp_dir.path(), "core");
        write_manifest(&temp_dir.path().join("crates/io"), "core_io");
        write_manifest(&temp_dir.path().join("crates/errors"), "core_errors");

        // Unreachable registry: every row reports an error, but the walk and
        // the rename mapping still work.
        let auditor = Auditor::new(
            CratesIoChecker::with_base_url("http://127.0.0.1:1"),
            RenameRule::new("prefix-", "core"),
            Duration::ZERO,
        );

        let rows = auditor.audit_workspace(temp_dir.path()).await;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].original, "core");
        assert_eq!(rows[0].published, "prefix-core");
        assert_eq!(rows[1].original, "core_errors");
        assert_eq!(rows[1].published, "prefix-core-errors");
        assert_eq!(rows[2].published, "prefix-core-io");
        assert!(rows.iter().all(|r| r.error.is_some()));
    }

    #[tokio::test]
    async fn test_audit_keeps_already_renamed_names() {
        let temp_dir = TempDir::new().unwrap();
        write_manifest(temp_dir.path(), "prefix-core");

        let auditor = Auditor::new(
            CratesIoChecker::with_base_url("http://127.0.0.1:1"),
            RenameRule::new("prefix-", "core"),
            Duration::ZERO,
        );

        let rows = auditor.audit_workspace(temp_dir.path()).await;
        assert_eq!(rows[0].published, "prefix-core");
    }
}
