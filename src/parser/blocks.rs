//! Block header location.
//!
//! Headers are matched against the comment-masked text, so commented-out
//! blocks are never reported. Header-like lines inside heredoc bodies are
//! skipped as well. Each header regex ends at the block's opening
//! brace.

use crate::parser::scan::MaskedSource;
use regex::Regex;
use std::sync::LazyLock;

static RESOURCE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*resource\s+"([^"]+)"\s+"([^"]+)"\s*\{"#).expect("Invalid regex")
});

static MODULE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^[ \t]*module\s+"([^"]+)"\s*\{"#).expect("Invalid regex"));

static PROVIDER_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^[ \t]*provider\s+"([^"]+)"\s*\{"#).expect("Invalid regex"));

static VARIABLE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^[ \t]*variable\s+"([^"]+)"\s*\{"#).expect("Invalid regex"));

static OUTPUT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^[ \t]*output\s+"([^"]+)"\s*\{"#).expect("Invalid regex"));

/// A located `<keyword> "<label>"... {` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// Quoted labels in order, e.g. `["aws_instance", "web"]`.
    pub labels: Vec<String>,
    /// Byte offset of the keyword.
    pub start: usize,
    /// Byte offset of the opening brace.
    pub open_brace: usize,
    /// 1-based line of the keyword.
    pub line: usize,
}

impl BlockHeader {
    /// First label, or an empty string for label-less headers.
    #[must_use]
    pub fn label(&self, index: usize) -> &str {
        self.labels.get(index).map_or("", String::as_str)
    }
}

fn find_headers(src: &MaskedSource<'_>, pattern: &Regex) -> Vec<BlockHeader> {
    pattern
        .captures_iter(&src.code)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            // The match may begin with indentation; point at the keyword.
            let indent = whole.as_str().len() - whole.as_str().trim_start().len();
            let start = whole.start() + indent;
            // Inside a heredoc body the keyword is blanked in the structure mask.
            if src.structure.as_bytes().get(start) != src.raw.as_bytes().get(start) {
                return None;
            }
            let labels = caps
                .iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str().to_string())
                .collect();
            Some(BlockHeader {
                labels,
                start,
                open_brace: whole.end() - 1,
                line: src.line_at(start),
            })
        })
        .collect()
}

/// All `resource "<type>" "<name>" {` headers.
#[must_use]
pub fn resource_headers(src: &MaskedSource<'_>) -> Vec<BlockHeader> {
    find_headers(src, &RESOURCE_HEADER)
}

/// All `module "<name>" {` headers.
#[must_use]
pub fn module_headers(src: &MaskedSource<'_>) -> Vec<BlockHeader> {
    find_headers(src, &MODULE_HEADER)
}

/// All `provider "<name>" {` headers.
#[must_use]
pub fn provider_headers(src: &MaskedSource<'_>) -> Vec<BlockHeader> {
    find_headers(src, &PROVIDER_HEADER)
}

/// All `variable "<name>" {` headers.
#[must_use]
pub fn variable_headers(src: &MaskedSource<'_>) -> Vec<BlockHeader> {
    find_headers(src, &VARIABLE_HEADER)
}

/// All `output "<name>" {` headers.
#[must_use]
pub fn output_headers(src: &MaskedSource<'_>) -> Vec<BlockHeader> {
    find_headers(src, &OUTPUT_HEADER)
}
