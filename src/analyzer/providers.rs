//! Old-style provider configuration detection.
//!
//! A `provider "<name>" { ... }` block inside a module prevents callers
//! from using `for_each` and `depends_on` on that module. Providers should
//! instead be declared in `required_providers` and passed in by the caller.

use crate::parser::{is_terraform_file, provider_headers, MaskedSource};
use crate::types::{ProviderViolation, UnreadableFile};
use std::path::{Component, Path, PathBuf};

/// How far back from a provider header to look for exemption markers.
const CONTEXT_BYTES: usize = 500;

/// Markers that exempt a provider block when found in the preceding context.
const EXEMPT_MARKERS: &[&str] = &["required_providers", "configuration_aliases", "mock_provider"];

/// Files whose presence marks a directory as a reusable module.
const MODULE_INDICATORS: &[&str] = &["variables.tf", "outputs.tf"];

/// Whether `path` belongs to a reusable module rather than a root configuration.
#[must_use]
pub fn is_module_directory(path: &Path) -> bool {
    let directory = path.parent().unwrap_or_else(|| Path::new(""));

    if MODULE_INDICATORS
        .iter()
        .any(|indicator| directory.join(indicator).exists())
    {
        return true;
    }

    directory
        .components()
        .any(|c| matches!(c, Component::Normal(name) if name == "modules"))
}

/// Text of up to [`CONTEXT_BYTES`] before `offset`, on a char boundary.
fn preceding_context(content: &str, offset: usize) -> &str {
    let mut from = offset.saturating_sub(CONTEXT_BYTES);
    while !content.is_char_boundary(from) {
        from += 1;
    }
    &content[from..offset]
}

fn is_exempt(context: &str) -> bool {
    EXEMPT_MARKERS.iter().any(|marker| context.contains(marker))
        || context.to_lowercase().contains("# test")
}

/// Detects provider configuration blocks.
#[derive(Debug, Default)]
pub struct ProviderConfigChecker {
    violations: Vec<ProviderViolation>,
    unreadable: Vec<UnreadableFile>,
}

impl ProviderConfigChecker {
    /// Create an empty checker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Find old-style provider blocks in `content`.
    ///
    /// `path` is used for reporting and to decide the module/root hint.
    #[must_use]
    pub fn check_content(content: &str, path: &Path) -> Vec<ProviderViolation> {
        let src = MaskedSource::new(content);
        let headers = provider_headers(&src);
        if headers.is_empty() {
            return Vec::new();
        }

        let in_module = is_module_directory(path);

        headers
            .into_iter()
            .filter(|header| {
                let exempt = is_exempt(preceding_context(content, header.start));
                if exempt {
                    tracing::debug!(provider = header.label(0), line = header.line, "Skipping exempt provider block");
                }
                !exempt
            })
            .map(|header| ProviderViolation {
                file: path.to_path_buf(),
                line: header.line,
                provider: header.label(0).to_string(),
                in_module,
            })
            .collect()
    }

    /// Check one file. Returns `true` if it added no findings.
    pub fn check_file(&mut self, path: &Path) -> bool {
        if !is_terraform_file(path) {
            return true;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "Error reading file");
                self.unreadable.push(UnreadableFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
                return false;
            }
        };

        let found = Self::check_content(&content, path);
        tracing::debug!(file = %path.display(), providers = found.len(), "Checked file");
        let passed = found.is_empty();
        self.violations.extend(found);
        passed
    }

    /// Check every file. Returns `true` if the whole run is clean.
    pub fn check_all(&mut self, files: &[PathBuf]) -> bool {
        let mut all_passed = true;
        for path in files {
            if !self.check_file(path) {
                all_passed = false;
            }
        }
        all_passed
    }

    /// Every violation so far, in file order.
    #[must_use]
    pub fn violations(&self) -> &[ProviderViolation] {
        &self.violations
    }

    /// Every file that could not be read.
    #[must_use]
    pub fn unreadable(&self) -> &[UnreadableFile] {
        &self.unreadable
    }
}
