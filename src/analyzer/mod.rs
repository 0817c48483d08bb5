//! Hook checkers.
//!
//! Each checker scans a caller-supplied list of files and accumulates its
//! findings as data. Nothing here prints; the [`crate::reporter`] module
//! turns findings into text.
//!
//! # Checkers
//!
//! 1. **Tags** ([`TagChecker`]): required and optional tag rules on every
//!    taggable resource.
//!
//! 2. **Providers** ([`ProviderConfigChecker`]): old-style `provider`
//!    blocks that block module-level `for_each` and `depends_on`.
//!
//! 3. **Modules** ([`ModuleVersionChecker`]): the same module source
//!    referenced with different versions or git refs.
//!
//! 4. **Ordering** ([`BlockOrderChecker`]): `variable` and `output` blocks
//!    in case-insensitive alphabetical order.
//!
//! 5. **Template sync** ([`TemplateSyncChecker`]): scaffold files that are
//!    missing from the repository or differ from a reference template.
//!
//! # Example
//!
//! ```rust,no_run
//! use tfhooks::analyzer::TagChecker;
//! use tfhooks::config::{PolicyOverrides, TagPolicy};
//! use std::path::PathBuf;
//!
//! let policy = TagPolicy::load(None, PolicyOverrides::default())?;
//! let mut checker = TagChecker::new(policy);
//! let passed = checker.check_all(&[PathBuf::from("main.tf")]);
//! # Ok::<(), tfhooks::HookError>(())
//! ```

mod modules;
mod ordering;
mod providers;
mod tags;
mod template;

pub use modules::{ModuleVersionChecker, ScanStats};
pub use ordering::BlockOrderChecker;
pub use providers::{is_module_directory, ProviderConfigChecker};
pub use tags::{extract_tags, tag_attribute_name, TagChecker};
pub use template::{is_excluded, sha256_file, TemplateSyncChecker, EXCLUDED_DIRS, EXCLUDED_FILES};
