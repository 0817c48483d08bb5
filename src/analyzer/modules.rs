//! Module version consistency checking.
//!
//! Every remote `module` block is grouped by its normalized source. A group
//! whose references disagree on version (registry `version`, git ref/tag or
//! commit, or nothing at all) is a conflict.
//!
//! The block body is parsed with `hcl-rs` so that only top-level `source`
//! and `version` attributes are read.

use crate::parser::{
    extract_git_ref, is_local_path, is_terraform_file, module_headers, normalize_source, BlockHeader,
    MaskedSource,
};
use crate::types::{ModuleConflict, ModuleReference};
use hcl::expr::TemplateExpr;
use hcl::{Body, Expression};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Counters for a module check run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Files dropped by `--exclude-dir`
    pub excluded: usize,
    /// Files scanned
    pub files: usize,
    /// Remote module references found
    pub references: usize,
}

/// Collects module references and finds version conflicts.
#[derive(Debug, Default)]
pub struct ModuleVersionChecker {
    /// Substrings that exclude a file when found in its path
    exclude_dirs: Vec<String>,
    /// References grouped by normalized source
    references: BTreeMap<String, Vec<ModuleReference>>,
    stats: ScanStats,
}

impl ModuleVersionChecker {
    /// Create a checker that skips paths containing any of `exclude_dirs`.
    #[must_use]
    pub fn new(exclude_dirs: Vec<String>) -> Self {
        Self {
            exclude_dirs,
            ..Self::default()
        }
    }

    /// Whether `path` is dropped by an exclusion substring.
    ///
    /// Backslashes are treated as `/` before matching.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        let normalized = path.to_string_lossy().replace('\\', "/");
        self.exclude_dirs
            .iter()
            .any(|pattern| normalized.contains(pattern.as_str()))
    }

    /// Read `source` and `version` from one module block.
    ///
    /// Returns `None` for unterminated or unparseable blocks, blocks without
    /// a string `source`, and local-path modules.
    #[must_use]
    pub fn parse_module_block(src: &MaskedSource<'_>, header: &BlockHeader, path: &Path) -> Option<ModuleReference> {
        let close = crate::parser::find_matching_brace(&src.structure, header.open_brace)?;
        let text = &src.raw[header.start..=close];

        let body: Body = match hcl::from_str(text) {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(
                    file = %path.display(),
                    line = header.line,
                    error = %e,
                    "Skipping module block that does not parse"
                );
                return None;
            }
        };

        let block = body.into_inner().into_iter().find_map(|structure| match structure {
            hcl::Structure::Block(block) if block.identifier.as_str() == "module" => Some(block),
            _ => None,
        })?;

        let source = get_string_attribute(&block.body, "source")?;
        if is_local_path(&source) {
            return None;
        }

        Some(ModuleReference {
            file_path: path.to_path_buf(),
            line_number: header.line,
            name: header.label(0).to_string(),
            version: get_string_attribute(&block.body, "version"),
            git_ref: extract_git_ref(&source),
            normalized_source: normalize_source(&source),
            source,
        })
    }

    /// Every remote module reference in `content`.
    #[must_use]
    pub fn check_content(content: &str, path: &Path) -> Vec<ModuleReference> {
        let src = MaskedSource::new(content);
        module_headers(&src)
            .iter()
            .filter_map(|header| Self::parse_module_block(&src, header, path))
            .collect()
    }

    /// Collect the references in one file. Returns how many were found.
    ///
    /// Excluded, non-`.tf` and unreadable files contribute nothing.
    pub fn check_file(&mut self, path: &Path) -> usize {
        if self.is_excluded(path) {
            tracing::debug!(file = %path.display(), "Excluded file");
            self.stats.excluded += 1;
            return 0;
        }
        if !is_terraform_file(path) {
            return 0;
        }

        self.stats.files += 1;
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Could not read file");
                return 0;
            }
        };

        let found = Self::check_content(&content, path);
        let count = found.len();
        tracing::debug!(file = %path.display(), modules = count, "Checked file");

        for reference in found {
            self.references
                .entry(reference.normalized_source.clone())
                .or_default()
                .push(reference);
        }
        self.stats.references += count;
        count
    }

    /// Collect references from every file.
    pub fn check_all(&mut self, files: &[PathBuf]) {
        for path in files {
            self.check_file(path);
        }

        tracing::info!(
            files = self.stats.files,
            excluded = self.stats.excluded,
            references = self.stats.references,
            unique_modules = self.references.len(),
            "Module scan complete"
        );
    }

    /// Sources referenced with more than one version identity, sorted by source.
    #[must_use]
    pub fn find_conflicts(&self) -> Vec<ModuleConflict> {
        self.references
            .iter()
            .filter(|(_, references)| references.len() >= 2)
            .map(|(source, references)| ModuleConflict {
                normalized_source: source.clone(),
                references: references.clone(),
            })
            .filter(|conflict| conflict.identities().len() > 1)
            .collect()
    }

    /// Number of distinct normalized sources seen.
    #[must_use]
    pub fn unique_modules(&self) -> usize {
        self.references.len()
    }

    /// Counters for the run so far.
    #[must_use]
    pub fn stats(&self) -> ScanStats {
        self.stats
    }
}

/// Get a string attribute value from an HCL body.
fn get_string_attribute(body: &Body, key: &str) -> Option<String> {
    body.attributes()
        .find(|attr| attr.key.as_str() == key)
        .and_then(|attr| match &attr.expr {
            Expression::String(s) => Some(s.clone()),
            Expression::TemplateExpr(template) => match &**template {
                TemplateExpr::QuotedString(s) => Some(s.clone()),
                _ => None,
            },
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_check_content() {
        let content = r#"
module "vpc" {
  source  = "terraform-aws-modules/vpc/aws"
  version = "5.1.0"

  tags = {
    version = "not-this-one"
  }
}

module "local" {
  source = "./modules/local"
}

module "git" {
  source = "git::https://github.com/org/repo.git?ref=v1.2.0"
}

# module "commented" {
#   source = "terraform-aws-modules/vpc/aws"
# }
"#;
        let references = ModuleVersionChecker::check_content(content, Path::new("main.tf"));
        assert_eq!(references.len(), 2);

        assert_eq!(references[0].name, "vpc");
        assert_eq!(references[0].line_number, 2);
        assert_eq!(references[0].version.as_deref(), Some("5.1.0"));
        assert_eq!(references[0].identity(), "version=5.1.0");

        assert_eq!(references[1].name, "git");
        assert_eq!(references[1].git_ref.as_deref(), Some("v1.2.0"));
        assert_eq!(references[1].normalized_source, "https://github.com/org/repo.git");
    }

    #[test]
    fn test_unterminated_and_sourceless_blocks_ignored() {
        let content = "module \"a\" {\n  version = \"1.0\"\n}\nmodule \"b\" {\n  source = \"x/y/z\"\n";
        assert!(ModuleVersionChecker::check_content(content, Path::new("main.tf")).is_empty());
    }

    #[test]
    fn test_find_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(
            dir.path(),
            "a/main.tf",
            "module \"vpc\" {\n  source  = \"terraform-aws-modules/vpc/aws\"\n  version = \"5.0.0\"\n}\n",
        );
        let b = write(
            dir.path(),
            "b/main.tf",
            "module \"vpc\" {\n  source  = \"terraform-aws-modules/vpc/aws/\"\n  version = \"5.1.0\"\n}\n",
        );
        let c = write(
            dir.path(),
            "c/main.tf",
            "module \"s3\" {\n  source  = \"terraform-aws-modules/s3-bucket/aws\"\n  version = \"4.0.0\"\n}\n\
             module \"s3_logs\" {\n  source  = \"terraform-aws-modules/s3-bucket/aws\"\n  version = \"4.0.0\"\n}\n",
        );

        let mut checker = ModuleVersionChecker::new(Vec::new());
        checker.check_all(&[a.clone(), b.clone(), c]);

        assert_eq!(checker.unique_modules(), 2);
        assert_eq!(
            checker.stats(),
            ScanStats {
                excluded: 0,
                files: 3,
                references: 4,
            }
        );

        let conflicts = checker.find_conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].normalized_source, "terraform-aws-modules/vpc/aws");
        assert_eq!(conflicts[0].identities(), vec!["version=5.0.0", "version=5.1.0"]);
        assert_eq!(
            conflicts[0].references.iter().map(|r| r.file_path.clone()).collect::<Vec<_>>(),
            vec![a, b]
        );
    }

    #[test]
    fn test_git_ref_and_no_version_conflict() {
        let content = r#"
module "a" {
  source = "git::https://github.com/org/mod.git?ref=v1"
}
module "b" {
  source = "https://github.com/org/mod.git"
}
"#;
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "main.tf", content);
        let mut checker = ModuleVersionChecker::new(Vec::new());
        assert_eq!(checker.check_file(&path), 2);

        let conflicts = checker.find_conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].identities(), vec!["no-version", "v1"]);
    }

    #[test]
    fn test_exclude_dir() {
        let dir = tempfile::tempdir().unwrap();
        let kept = write(dir.path(), "live/main.tf", "module \"a\" {\n  source = \"x/y/aws\"\n}\n");
        let skipped = write(dir.path(), ".terraform/modules/main.tf", "module \"a\" {\n  source = \"x/y/aws\"\n  version = \"2\"\n}\n");

        let mut checker = ModuleVersionChecker::new(vec![".terraform/".to_string()]);
        assert!(checker.is_excluded(Path::new(r"repo\.terraform\modules\main.tf")));
        checker.check_all(&[kept, skipped]);

        assert_eq!(checker.stats().excluded, 1);
        assert_eq!(checker.stats().references, 1);
        assert!(checker.find_conflicts().is_empty());
    }

    #[test]
    fn test_unreadable_file_contributes_nothing() {
        let mut checker = ModuleVersionChecker::new(Vec::new());
        assert_eq!(checker.check_file(Path::new("/nonexistent/main.tf")), 0);
        assert!(checker.find_conflicts().is_empty());
    }
}
