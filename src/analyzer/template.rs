//! Repository scaffold drift against a reference template.
//!
//! Every directory and file under the template root (minus build output,
//! caches and local state) must exist at the same relative path in the
//! repository, and files must have the same SHA-256 digest.

use crate::error::{Result, ResultExt};
use crate::types::{TemplateDrift, UnreadableFile};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory names never compared.
pub const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".ruff_cache",
    "node_modules",
    ".terraform",
    ".venv",
    "venv",
    "htmlcov",
    ".coverage",
    "dist",
    "build",
];

/// Directory name suffixes never compared.
const EXCLUDED_DIR_SUFFIXES: &[&str] = &[".egg-info"];

/// File names never compared.
pub const EXCLUDED_FILES: &[&str] = &[
    ".DS_Store",
    "Thumbs.db",
    ".terraform.lock.hcl",
    "terraform.tfstate",
    "terraform.tfstate.backup",
];

/// File name suffixes never compared.
const EXCLUDED_FILE_SUFFIXES: &[&str] = &[".tfvars"];

/// Whether an entry named `name` is skipped. An excluded directory hides its
/// whole subtree.
#[must_use]
pub fn is_excluded(name: &str, is_dir: bool) -> bool {
    let (names, suffixes) = if is_dir {
        (EXCLUDED_DIRS, EXCLUDED_DIR_SUFFIXES)
    } else {
        (EXCLUDED_FILES, EXCLUDED_FILE_SUFFIXES)
    };
    names.contains(&name) || suffixes.iter().any(|suffix| name.ends_with(suffix))
}

/// Hex SHA-256 digest of a file, streamed.
///
/// # Errors
///
/// Returns the I/O error if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Directories and file digests found under the template root, keyed by
/// relative path.
#[derive(Debug, Default)]
struct TemplateTree {
    dirs: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, String>,
}

/// Compares a repository against a template directory.
#[derive(Debug)]
pub struct TemplateSyncChecker {
    template_root: PathBuf,
    repo_root: PathBuf,
    drift: Vec<TemplateDrift>,
    warnings: Vec<UnreadableFile>,
}

impl TemplateSyncChecker {
    /// Create a checker.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `template_path` does not exist or is
    /// not a directory.
    pub fn new(template_path: &Path, repo_root: &Path) -> Result<Self> {
        if !template_path.exists() {
            return Err(crate::err!(ConfigValue {
                key: "template_path".to_string(),
                message: format!("Template path does not exist: {}", template_path.display()),
            }));
        }
        if !template_path.is_dir() {
            return Err(crate::err!(ConfigValue {
                key: "template_path".to_string(),
                message: format!("Template path is not a directory: {}", template_path.display()),
            }));
        }

        Ok(Self {
            template_root: template_path.canonicalize().with_path(template_path)?,
            repo_root: std::path::absolute(repo_root).with_path(repo_root)?,
            drift: Vec::new(),
            warnings: Vec::new(),
        })
    }

    /// Absolute template root.
    #[must_use]
    pub fn template_root(&self) -> &Path {
        &self.template_root
    }

    /// Absolute repository root.
    #[must_use]
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Compare the repository with the template. Returns `true` if nothing drifted.
    pub fn check_sync(&mut self) -> bool {
        let tree = self.template_tree();
        tracing::debug!(
            template = %self.template_root.display(),
            dirs = tree.dirs.len(),
            files = tree.files.len(),
            "Walked template"
        );

        self.check_directories(&tree.dirs);
        self.check_files(&tree.files);
        self.drift.is_empty()
    }

    /// Every difference found, directories first, each group sorted by path.
    #[must_use]
    pub fn drift(&self) -> &[TemplateDrift] {
        &self.drift
    }

    /// Template files that could not be hashed. These do not fail the run.
    #[must_use]
    pub fn warnings(&self) -> &[UnreadableFile] {
        &self.warnings
    }

    fn template_tree(&mut self) -> TemplateTree {
        let mut tree = TemplateTree::default();

        for entry in WalkDir::new(&self.template_root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !is_excluded(&e.file_name().to_string_lossy(), e.file_type().is_dir())
            })
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read template entry");
                    self.drift.push(TemplateDrift::TemplateUnreadable { reason: e.to_string() });
                    continue;
                }
            };

            let Ok(relative) = entry.path().strip_prefix(&self.template_root) else {
                continue;
            };
            let relative = relative.to_path_buf();

            if entry.file_type().is_dir() {
                tree.dirs.insert(relative);
            } else if entry.file_type().is_file() {
                match sha256_file(entry.path()) {
                    Ok(hash) => {
                        tree.files.insert(relative, hash);
                    }
                    Err(e) => {
                        tracing::warn!(file = %entry.path().display(), error = %e, "Could not hash template file");
                        self.warnings.push(UnreadableFile {
                            path: relative,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        tree
    }

    fn check_directories(&mut self, dirs: &BTreeSet<PathBuf>) {
        for relative in dirs {
            let repo_dir = self.repo_root.join(relative);
            if !repo_dir.exists() {
                self.drift.push(TemplateDrift::MissingDirectory {
                    path: relative.clone(),
                    expected: repo_dir,
                });
            } else if !repo_dir.is_dir() {
                self.drift.push(TemplateDrift::NotADirectory {
                    path: relative.clone(),
                    location: repo_dir,
                });
            }
        }
    }

    fn check_files(&mut self, files: &BTreeMap<PathBuf, String>) {
        for (relative, template_hash) in files {
            let repo_file = self.repo_root.join(relative);
            let template_file = self.template_root.join(relative);

            if !repo_file.exists() {
                self.drift.push(TemplateDrift::MissingFile {
                    path: relative.clone(),
                    expected: repo_file,
                    template: template_file,
                });
                continue;
            }

            if !repo_file.is_file() {
                self.drift.push(TemplateDrift::NotAFile {
                    path: relative.clone(),
                    location: repo_file,
                });
                continue;
            }

            match sha256_file(&repo_file) {
                Ok(repo_hash) if repo_hash == *template_hash => {}
                Ok(repo_hash) => self.drift.push(TemplateDrift::ContentMismatch {
                    path: relative.clone(),
                    repo_file,
                    template_file,
                    repo_hash,
                    template_hash: template_hash.clone(),
                }),
                Err(e) => self.drift.push(TemplateDrift::Unverifiable {
                    path: relative.clone(),
                    location: repo_file,
                    reason: e.to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use test_case::test_case;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn template() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".editorconfig", "root = true\n");
        write(dir.path(), ".github/workflows/ci.yml", "on: push\n");
        write(dir.path(), "Makefile", "test:\n\ttofu test\n");
        write(dir.path(), ".terraform/modules/modules.json", "{}");
        write(dir.path(), "pkg.egg-info/PKG-INFO", "x");
        write(dir.path(), "terraform.tfvars", "region = \"x\"\n");
        write(dir.path(), ".DS_Store", "x");
        dir
    }

    #[test_case(".git", true, true)]
    #[test_case("node_modules", true, true)]
    #[test_case("tfhooks.egg-info", true, true)]
    #[test_case("modules", true, false)]
    #[test_case(".terraform.lock.hcl", false, true)]
    #[test_case("prod.tfvars", false, true)]
    #[test_case("terraform.tfvars.json", false, false)]
    #[test_case("build", false, false ; "file named like an excluded dir")]
    fn test_is_excluded(name: &str, is_dir: bool, expected: bool) {
        assert_eq!(is_excluded(name, is_dir), expected);
    }

    #[test]
    fn test_sha256_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.txt");
        fs::write(&path, "abc").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(sha256_file(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_template_path_must_be_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = TemplateSyncChecker::new(&dir.path().join("missing"), dir.path()).unwrap_err();
        assert!(missing.is_configuration_error());
        assert!(missing.summary().contains("does not exist"));

        write(dir.path(), "file.txt", "x");
        let not_dir = TemplateSyncChecker::new(&dir.path().join("file.txt"), dir.path()).unwrap_err();
        assert!(not_dir.summary().contains("is not a directory"));
    }

    #[test]
    fn test_identical_repository_passes() {
        let template = template();
        let repo = tempfile::tempdir().unwrap();
        write(repo.path(), ".editorconfig", "root = true\n");
        write(repo.path(), ".github/workflows/ci.yml", "on: push\n");
        write(repo.path(), "Makefile", "test:\n\ttofu test\n");

        let mut checker = TemplateSyncChecker::new(template.path(), repo.path()).unwrap();
        assert!(checker.check_sync());
        assert!(checker.drift().is_empty());
        assert!(checker.warnings().is_empty());
    }

    #[test]
    fn test_reports_every_kind_of_drift() {
        let template = template();
        let repo = tempfile::tempdir().unwrap();
        write(repo.path(), ".editorconfig", "root = false\n");
        // A file where the template has a directory, and a directory where
        // it has a file.
        write(repo.path(), ".github", "not a dir");
        fs::create_dir_all(repo.path().join("Makefile")).unwrap();

        let mut checker = TemplateSyncChecker::new(template.path(), repo.path()).unwrap();
        assert!(!checker.check_sync());

        let drift = checker.drift();
        assert_eq!(drift.len(), 5, "{drift:#?}");
        assert!(matches!(&drift[0], TemplateDrift::NotADirectory { path, .. } if path == Path::new(".github")));
        assert!(
            matches!(&drift[1], TemplateDrift::MissingDirectory { path, .. } if path == Path::new(".github/workflows"))
        );
        assert!(matches!(
            &drift[2],
            TemplateDrift::ContentMismatch { path, repo_hash, template_hash, .. }
                if path == Path::new(".editorconfig") && repo_hash != template_hash
        ));
        assert!(
            matches!(&drift[3], TemplateDrift::MissingFile { path, .. } if path == Path::new(".github/workflows/ci.yml"))
        );
        assert!(matches!(&drift[4], TemplateDrift::NotAFile { path, .. } if path == Path::new("Makefile")));
    }

    #[test]
    fn test_excluded_entries_are_not_required() {
        let template = template();
        let repo = tempfile::tempdir().unwrap();

        let mut checker = TemplateSyncChecker::new(template.path(), repo.path()).unwrap();
        checker.check_sync();

        let paths: Vec<String> = checker
            .drift()
            .iter()
            .filter_map(|d| match d {
                TemplateDrift::MissingDirectory { path, .. } | TemplateDrift::MissingFile { path, .. } => {
                    Some(path.display().to_string())
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            paths,
            vec![".github", ".github/workflows", ".editorconfig", ".github/workflows/ci.yml", "Makefile"]
        );
    }

    #[test]
    fn test_excluded_template_root_name_is_still_walked() {
        let parent = tempfile::tempdir().unwrap();
        let template = parent.path().join("build");
        write(&template, "README.md", "# module\n");
        let repo = tempfile::tempdir().unwrap();

        let mut checker = TemplateSyncChecker::new(&template, repo.path()).unwrap();
        assert!(!checker.check_sync());
        assert_eq!(checker.drift().len(), 1);
    }

    #[test]
    fn test_roots_are_absolute() {
        let template = template();
        let checker = TemplateSyncChecker::new(template.path(), Path::new(".")).unwrap();
        assert!(checker.template_root().is_absolute());
        assert!(checker.repo_root().is_absolute());
    }
}
