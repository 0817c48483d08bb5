//! Module source utilities.
//!
//! Two references point at the same module when their sources normalize to
//! the same string. The version identity of a git source comes from its
//! `ref`, `tag` or `commit` query parameter.

use regex::Regex;
use std::sync::LazyLock;

// Query parameters that pin a git revision
static PIN_PARAM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&](?:ref|tag|commit)=[^&]+").expect("Invalid regex"));

static GIT_COMMIT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]commit=([a-f0-9]{7,40})").expect("Invalid regex"));

static GIT_REF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Capture groups: 1=ref|tag keyword, 2=value, 3=subdir ref, 4=.git subdir ref
    Regex::new(r"\?(ref|tag)=([^&]+)|//.*\?.*ref=([^&]+)|\.git//.*\?ref=([^&]+)").expect("Invalid regex")
});

static PROTOCOL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:git::)?(?:https?::)?").expect("Invalid regex"));

/// Check if a source is a local file path.
#[must_use]
pub fn is_local_path(source: &str) -> bool {
    source.starts_with("./") || source.starts_with("../") || source.starts_with('/')
}

/// Normalize a module source so references to the same module compare equal.
///
/// Strips `ref`/`tag`/`commit` parameters, a dangling `?`, trailing slashes
/// and `git::` / `http(s)::` forced-protocol prefixes.
///
/// # Examples
///
/// ```rust
/// use tfhooks::parser::normalize_source;
///
/// assert_eq!(
///     normalize_source("git::https://github.com/org/repo.git?ref=v1.0.0"),
///     "https://github.com/org/repo.git"
/// );
/// assert_eq!(normalize_source("terraform-aws-modules/vpc/aws/"), "terraform-aws-modules/vpc/aws");
/// ```
#[must_use]
pub fn normalize_source(source: &str) -> String {
    let stripped = PIN_PARAM_PATTERN.replace_all(source, "");
    let stripped = stripped.strip_suffix('?').unwrap_or(&stripped);
    let stripped = stripped.trim_end_matches('/');
    PROTOCOL_PREFIX.replace(stripped, "").into_owned()
}

/// Extract the pinned git revision from a module source.
///
/// A `commit=<sha>` parameter wins and is returned as `commit=<sha>`;
/// otherwise the `ref` or `tag` value is returned as-is.
#[must_use]
pub fn extract_git_ref(source: &str) -> Option<String> {
    if let Some(caps) = GIT_COMMIT_PATTERN.captures(source) {
        return Some(format!("commit={}", &caps[1]));
    }

    let caps = GIT_REF_PATTERN.captures(source)?;
    (2..=4)
        .filter_map(|i| caps.get(i))
        .map(|m| m.as_str())
        .find(|value| !value.is_empty())
        .map(String::from)
}
