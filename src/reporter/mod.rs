//! Report generation module.
//!
//! Every hook reports in human-readable text only. Reports are built as
//! strings so they can be compared in tests and printed by the binary.
//!
//! # Example
//!
//! ```rust
//! use tfhooks::analyzer::ProviderConfigChecker;
//! use tfhooks::reporter::{ReportGenerator, TextReporter};
//!
//! let checker = ProviderConfigChecker::new();
//! let report = TextReporter::new(false).generate(&checker);
//! assert!(report.contains("No old-style provider configurations"));
//! ```

mod text;

pub use text::TextReporter;

/// Trait for report generators.
pub trait ReportGenerator<T: ?Sized> {
    /// Generate a report from checker findings.
    fn generate(&self, input: &T) -> String;
}
