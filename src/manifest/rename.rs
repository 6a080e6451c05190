//! Published-name rule for forked packages
//!
//! Every place a package identity appears (its own `[package].name`, a path
//! dependency, a feature string, the audit report) must rename it through
//! this one rule. Divergent ad hoc renaming at different call sites is the
//! bug class this module exists to prevent.

use crate::core::config::RenameConfig;

/// Deterministic mapping from an original package name to its published name.
///
/// # Examples
///
/// ```
/// use fork_publisher::manifest::RenameRule;
///
/// let rule = RenameRule::new("jxoesneon-", "tectonic");
/// assert_eq!(rule.published_name("tectonic"), "jxoesneon-tectonic");
/// assert_eq!(rule.published_name("tectonic_errors"), "jxoesneon-tectonic-errors");
/// assert_eq!(rule.published_name("xdvipdfmx"), "jxoesneon-xdvipdfmx");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRule {
    prefix: String,
    root_name: String,
    underscored: String,
    dashed: String,
}

impl RenameRule {
    pub fn new(prefix: &str, root_name: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            root_name: root_name.to_string(),
            underscored: format!("{}_", root_name),
            dashed: format!("{}-", root_name),
        }
    }

    pub fn from_config(config: &RenameConfig) -> Self {
        Self::new(&config.prefix, &config.root_name)
    }

    /// Compute the published name for an original package name.
    ///
    /// Pure and total: the root name gets the prefix, names in the root's
    /// underscore namespace additionally have `<root>_` turned into
    /// `<root>-`, and anything else is prefixed verbatim. No casing or
    /// truncation is ever applied.
    pub fn published_name(&self, original: &str) -> String {
        if original == self.root_name {
            format!("{}{}", self.prefix, self.root_name)
        } else if original.starts_with(&self.underscored) {
            format!(
                "{}{}",
                self.prefix,
                original.replace(&self.underscored, &self.dashed)
            )
        } else {
            format!("{}{}", self.prefix, original)
        }
    }

    /// True when a name has already been through `published_name`.
    ///
    /// The rewriter uses this to make a second pass a no-op instead of
    /// double-prefixing.
    pub fn is_renamed(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }

    /// True when a name belongs to the workspace namespace the rule covers
    /// (the root itself or `<root>_...`). Feature strings outside this
    /// namespace are plain feature names and must not be touched.
    pub fn in_namespace(&self, name: &str) -> bool {
        name == self.root_name || name.starts_with(&self.underscored)
    }
}
