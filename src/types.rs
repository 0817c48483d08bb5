//! Core data types shared by the hooks.
//!
//! This module defines:
//! - Resource blocks and the tags extracted from them
//! - Tag violations and their kinds
//! - Provider and module findings
//! - Block ordering findings and template drift

use crate::parser::BlockHeader;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Tag key to value, in first-insertion order. A repeated key keeps its
/// original position and takes the last value.
pub type TagSet = IndexMap<String, String>;

/// Outcome of reading the tag attribute of one resource block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagExtraction {
    /// The attribute is computed (`merge(...)`, `var.*`, `local.*`). The
    /// resource cannot be checked statically and is exempt.
    Dynamic,

    /// A literal object, or no attribute at all (empty set).
    Literal {
        /// Extracted pairs
        tags: TagSet,
        /// Line of the `tags =` / `labels =` assignment, or of the resource
        /// header when the attribute is absent
        line: usize,
    },

    /// The resource block or its tag object is never closed.
    Unterminated,
}

/// A `resource "<type>" "<name>" { ... }` block found in a file.
///
/// # Example HCL
///
/// ```hcl
/// resource "aws_instance" "web" {
///   tags = { Environment = "Dev" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceBlock {
    /// Resource type (e.g., "aws_instance")
    pub resource_type: String,

    /// Resource name (e.g., "web")
    pub name: String,

    /// File where the block is defined
    pub file_path: PathBuf,

    /// Line of the `resource` keyword (1-based)
    pub line: usize,

    /// Byte offset of the `resource` keyword
    pub start: usize,
}

impl ResourceBlock {
    /// Build from a located header. Returns `None` for a header without two labels.
    #[must_use]
    pub fn from_header(header: &BlockHeader, file_path: &Path) -> Option<Self> {
        match header.labels.as_slice() {
            [resource_type, name, ..] => Some(Self {
                resource_type: resource_type.clone(),
                name: name.clone(),
                file_path: file_path.to_path_buf(),
                line: header.line,
                start: header.start,
            }),
            _ => None,
        }
    }

    /// The `type.name` address used in reports.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }
}

/// What is wrong with a resource's tags.
///
/// The `Display` output is the message shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required key is absent in every casing.
    Missing {
        /// Required key
        tag: String,
    },

    /// A key is present only under a different casing.
    KeyCase {
        /// Whether the rule is required or optional
        required: bool,
        /// Configured key
        tag: String,
        /// Key found in the file
        found: String,
    },

    /// A required key has an empty or whitespace-only value.
    EmptyValue {
        /// Required key
        tag: String,
    },

    /// The value matches an allowed value only case-insensitively.
    ValueCase {
        /// Tag key
        tag: String,
        /// Value found in the file
        value: String,
        /// Correctly-cased allowed value
        expected: String,
        /// The full allow-list
        allowed: Vec<String>,
    },

    /// The value is not in the allow-list.
    InvalidValue {
        /// Tag key
        tag: String,
        /// Value found in the file
        value: String,
        /// The full allow-list
        allowed: Vec<String>,
    },

    /// The value does not match the rule's pattern from its first character.
    PatternMismatch {
        /// Tag key
        tag: String,
        /// Value found in the file
        value: String,
        /// Configured pattern
        pattern: String,
    },

    /// The rule's pattern does not compile.
    InvalidPattern {
        /// Tag key
        tag: String,
        /// Configured pattern
        pattern: String,
        /// Compiler error
        error: String,
    },

    /// The resource block or its tag object has no closing brace.
    Unterminated,
}

impl Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing { tag } => write!(f, "Required tag '{tag}' is missing."),
            Self::KeyCase { required, tag, found } => {
                let kind = if *required { "Required" } else { "Optional" };
                write!(
                    f,
                    "{kind} tag '{tag}' has incorrect case. Found '{found}' but expected '{tag}'."
                )
            }
            Self::EmptyValue { tag } => write!(f, "Required tag '{tag}' has an empty value."),
            Self::ValueCase { tag, value, expected, allowed } => write!(
                f,
                "Tag '{tag}' value '{value}' has incorrect case. Expected '{expected}' (allowed: {allowed:?})."
            ),
            Self::InvalidValue { tag, value, allowed } => write!(
                f,
                "Tag '{tag}' has invalid value '{value}'. Allowed values: {allowed:?}."
            ),
            Self::PatternMismatch { tag, value, pattern } => write!(
                f,
                "Tag '{tag}' value '{value}' does not match required pattern '{pattern}'."
            ),
            Self::InvalidPattern { tag, pattern, error } => {
                write!(f, "Tag '{tag}' has invalid regex pattern '{pattern}': {error}")
            }
            Self::Unterminated => write!(f, "Resource block is not terminated (missing closing brace)."),
        }
    }
}

/// One tag finding against one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagViolation {
    /// File containing the resource
    pub file: PathBuf,
    /// Line reported (tag assignment, or resource header)
    pub line: usize,
    /// `type.name`
    pub resource: String,
    /// What is wrong
    pub kind: ViolationKind,
}

impl TagViolation {
    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

/// A file that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadableFile {
    /// The file
    pub path: PathBuf,
    /// The read error
    pub reason: String,
}

/// An old-style `provider` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderViolation {
    /// File containing the block
    pub file: PathBuf,
    /// Line of the `provider` keyword
    pub line: usize,
    /// Provider name (e.g., "aws")
    pub provider: String,
    /// Whether the file belongs to a reusable module
    pub in_module: bool,
}

impl ProviderViolation {
    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Old-style provider configuration detected for '{}'. \
             This prevents module-level for_each and depends_on.",
            self.provider
        )
    }

    /// Fix hints, one per line.
    #[must_use]
    pub fn hints(&self) -> &'static [&'static str] {
        if self.in_module {
            &[
                "Modules should use required_providers with configuration_aliases instead.",
                "See: https://developer.hashicorp.com/terraform/language/modules/develop/providers",
            ]
        } else {
            &["Root modules should declare providers in required_providers block."]
        }
    }
}

/// A remote `module` block reference.
///
/// # Example HCL
///
/// ```hcl
/// module "vpc" {
///   source  = "terraform-aws-modules/vpc/aws"
///   version = "5.1.0"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReference {
    /// File where the block is defined
    pub file_path: PathBuf,

    /// Line of the `module` keyword
    pub line_number: usize,

    /// Module block label
    pub name: String,

    /// Raw `source` value
    pub source: String,

    /// `version` attribute, if set
    pub version: Option<String>,

    /// Pinned git revision from the source, if any
    pub git_ref: Option<String>,

    /// Source with pins and protocol prefixes stripped
    pub normalized_source: String,
}

impl ModuleReference {
    /// Version identity compared across references to the same module.
    #[must_use]
    pub fn identity(&self) -> String {
        if let Some(version) = &self.version {
            format!("version={version}")
        } else if let Some(git_ref) = &self.git_ref {
            git_ref.clone()
        } else {
            "no-version".to_string()
        }
    }
}

/// References to one normalized source that disagree on version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConflict {
    /// The shared normalized source
    pub normalized_source: String,
    /// Every reference to the source, in discovery order
    pub references: Vec<ModuleReference>,
}

impl ModuleConflict {
    /// Distinct version identities, sorted.
    #[must_use]
    pub fn identities(&self) -> Vec<String> {
        let mut identities: Vec<String> =
            self.references.iter().map(ModuleReference::identity).collect();
        identities.sort();
        identities.dedup();
        identities
    }
}

/// Which kind of block an ordering finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderedBlock {
    /// `variable "<name>" { ... }`
    Variable,
    /// `output "<name>" { ... }`
    Output,
}

impl Display for OrderedBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Variable => write!(f, "Variable"),
            Self::Output => write!(f, "Output"),
        }
    }
}

/// Blocks of one kind in a file that are not in alphabetical order.
///
/// Only the first out-of-place block is reported; the full orders are kept
/// so the report can show both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderViolation {
    /// File containing the blocks
    pub file: PathBuf,
    /// Line of the first out-of-place block
    pub line: usize,
    /// Block kind
    pub block: OrderedBlock,
    /// Name expected at that position
    pub expected: String,
    /// Name found at that position
    pub found: String,
    /// Names in file order
    pub current_order: Vec<String>,
    /// Names in case-insensitive alphabetical order
    pub expected_order: Vec<String>,
}

impl OrderViolation {
    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "{} blocks are not sorted alphabetically. Expected '{}' but found '{}' at line {}.",
            self.block, self.expected, self.found, self.line
        )
    }
}

/// A difference between a repository and its reference template.
///
/// Paths named `path` are relative to both roots; the others are absolute
/// locations shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateDrift {
    /// A template directory is absent from the repository.
    MissingDirectory {
        /// Relative path
        path: PathBuf,
        /// Where it should be
        expected: PathBuf,
    },

    /// A template directory exists in the repository as something else.
    NotADirectory {
        /// Relative path
        path: PathBuf,
        /// What is there instead
        location: PathBuf,
    },

    /// A template file is absent from the repository.
    MissingFile {
        /// Relative path
        path: PathBuf,
        /// Where it should be
        expected: PathBuf,
        /// The template copy
        template: PathBuf,
    },

    /// A template file exists in the repository as something else.
    NotAFile {
        /// Relative path
        path: PathBuf,
        /// What is there instead
        location: PathBuf,
    },

    /// The repository file differs from the template file.
    ContentMismatch {
        /// Relative path
        path: PathBuf,
        /// Repository copy
        repo_file: PathBuf,
        /// Template copy
        template_file: PathBuf,
        /// SHA-256 of the repository copy
        repo_hash: String,
        /// SHA-256 of the template copy
        template_hash: String,
    },

    /// The repository file exists but could not be hashed.
    Unverifiable {
        /// Relative path
        path: PathBuf,
        /// Repository copy
        location: PathBuf,
        /// The read error
        reason: String,
    },

    /// Part of the template tree could not be walked.
    TemplateUnreadable {
        /// The walk error
        reason: String,
    },
}

impl Display for TemplateDrift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDirectory { path, expected } => write!(
                f,
                "Missing directory: {}\n   Expected location: {}\n   \
                 -> This directory exists in the template but not in the repository.\n   \
                 -> Create this directory to match the template structure.",
                path.display(),
                expected.display()
            ),
            Self::NotADirectory { path, location } => write!(
                f,
                "Path exists but is not a directory: {}\n   Location: {}\n   \
                 -> This path should be a directory according to the template.\n   \
                 -> Remove the file and create a directory instead.",
                path.display(),
                location.display()
            ),
            Self::MissingFile { path, expected, template } => write!(
                f,
                "Missing file: {}\n   Expected location: {}\n   Template location: {}\n   \
                 -> This file exists in the template but not in the repository.\n   \
                 -> Copy this file from the template to maintain consistency.",
                path.display(),
                expected.display(),
                template.display()
            ),
            Self::NotAFile { path, location } => write!(
                f,
                "Path exists but is not a file: {}\n   Location: {}\n   \
                 -> This path should be a file according to the template.\n   \
                 -> Remove the directory and create a file instead.",
                path.display(),
                location.display()
            ),
            Self::ContentMismatch { path, repo_file, template_file, repo_hash, template_hash } => write!(
                f,
                "File content mismatch: {}\n   Repository file: {}\n   Template file:   {}\n   \
                 Repository SHA256: {repo_hash}\n   Template SHA256:   {template_hash}\n   \
                 -> The file exists but has different content than the template.\n   \
                 -> Update this file to match the template version.",
                path.display(),
                repo_file.display(),
                template_file.display()
            ),
            Self::Unverifiable { path, location, reason } => write!(
                f,
                "Could not verify file: {}\n   Location: {}\n   Reason: {reason}\n   \
                 -> Unable to calculate hash for comparison.",
                path.display(),
                location.display()
            ),
            Self::TemplateUnreadable { reason } => write!(f, "Failed to read template structure: {reason}"),
        }
    }
}
