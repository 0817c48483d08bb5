//! # tfhooks
//!
//! Pre-commit hooks for Terraform/OpenTofu `.tf` sources.
//!
//! The source hooks read a fixed list of files as plain text, locate blocks
//! with regular expressions plus comment- and string-aware brace matching,
//! and validate what they find. A run is a single stateless pass over the
//! files. The template sync hook instead walks a template directory and
//! compares file digests.
//!
//! ## Hooks
//!
//! - **Tag compliance**: required and optional tags (or Google `labels`) on
//!   every taggable resource, with case, allow-list and pattern checks
//! - **Provider configuration**: old-style `provider` blocks that prevent
//!   module-level `for_each` and `depends_on`
//! - **Module versions**: the same module source pinned to different
//!   versions, git refs or commits
//! - **Block ordering**: `variable` and `output` blocks sorted
//!   alphabetically, ignoring case
//! - **Template sync**: scaffold files present and identical to a
//!   reference template directory
//!
//! ## Example
//!
//! ```rust
//! use tfhooks::{TagChecker, TagPolicy, TagRule};
//! use std::path::Path;
//!
//! let policy = TagPolicy {
//!     required_tags: vec![TagRule::new("Environment"), TagRule::new("Owner")],
//!     ..TagPolicy::default()
//! };
//! let checker = TagChecker::new(policy);
//!
//! let content = r#"resource "aws_instance" "x" { tags = { Environment = "Dev" } }"#;
//! let violations = checker.check_content(content, Path::new("main.tf"));
//!
//! assert_eq!(violations.len(), 1);
//! assert_eq!(violations[0].message(), "Required tag 'Owner' is missing.");
//! ```

#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod reporter;
pub mod types;

// Re-export commonly used types at crate root
pub use analyzer::{
    BlockOrderChecker, ModuleVersionChecker, ProviderConfigChecker, TagChecker, TemplateSyncChecker,
};
pub use config::{PolicyOverrides, TagPolicy, TagRule, TaggableCatalog};
pub use error::{HookError, Result};
pub use types::{
    ModuleConflict, ModuleReference, OrderViolation, OrderedBlock, ProviderViolation, TagExtraction,
    TagSet, TagViolation, TemplateDrift, ViolationKind,
};
