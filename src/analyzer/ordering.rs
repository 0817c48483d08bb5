//! Alphabetical ordering of `variable` and `output` blocks.
//!
//! Within one file, blocks of each kind must appear in case-insensitive
//! alphabetical order of their labels. Names that differ only in case keep
//! their file order, so `Region` followed by `region` is accepted.

use crate::parser::{is_terraform_file, output_headers, variable_headers, BlockHeader, MaskedSource};
use crate::types::{OrderViolation, OrderedBlock, UnreadableFile};
use std::path::{Path, PathBuf};

/// Checks block ordering.
#[derive(Debug, Default)]
pub struct BlockOrderChecker {
    violations: Vec<OrderViolation>,
    unreadable: Vec<UnreadableFile>,
}

impl BlockOrderChecker {
    /// Create an empty checker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Find out-of-order blocks in `content`: at most one finding per block kind.
    #[must_use]
    pub fn check_content(content: &str, path: &Path) -> Vec<OrderViolation> {
        let src = MaskedSource::new(content);

        [
            (OrderedBlock::Variable, variable_headers(&src)),
            (OrderedBlock::Output, output_headers(&src)),
        ]
        .into_iter()
        .filter_map(|(block, headers)| first_out_of_order(block, &headers, path))
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
        tracing::debug!(file = %path.display(), issues = found.len(), "Checked block order");
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
    pub fn violations(&self) -> &[OrderViolation] {
        &self.violations
    }

    /// Every file that could not be read.
    #[must_use]
    pub fn unreadable(&self) -> &[UnreadableFile] {
        &self.unreadable
    }
}

fn first_out_of_order(block: OrderedBlock, headers: &[BlockHeader], path: &Path) -> Option<OrderViolation> {
    if headers.len() < 2 {
        return None;
    }

    let current: Vec<String> = headers.iter().map(|h| h.label(0).to_string()).collect();
    let mut expected = current.clone();
    // Stable, so case-only differences keep file order.
    expected.sort_by_key(|name| name.to_lowercase());

    let index = current.iter().zip(&expected).position(|(found, want)| found != want)?;

    Some(OrderViolation {
        file: path.to_path_buf(),
        line: headers[index].line,
        block,
        expected: expected[index].clone(),
        found: current[index].clone(),
        current_order: current,
        expected_order: expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_sorted_file_passes() {
        let content = r#"
variable "ami" {}
variable "instance_type" {}
variable "Region" {}

output "arn" { value = "a" }
output "id" { value = "b" }
"#;
        assert!(BlockOrderChecker::check_content(content, Path::new("main.tf")).is_empty());
    }

    #[test]
    fn test_reports_first_out_of_order_variable() {
        let content = r#"variable "region" {
  type = string
}

variable "ami" {
  type = string
}

variable "zone" {}
"#;
        let violations = BlockOrderChecker::check_content(content, Path::new("variables.tf"));
        assert_eq!(violations.len(), 1);

        let violation = &violations[0];
        assert_eq!(violation.block, OrderedBlock::Variable);
        assert_eq!(violation.line, 1);
        assert_eq!(violation.found, "region");
        assert_eq!(violation.expected, "ami");
        assert_eq!(violation.current_order, vec!["region", "ami", "zone"]);
        assert_eq!(violation.expected_order, vec!["ami", "region", "zone"]);
        assert_eq!(violation.file, PathBuf::from("variables.tf"));
    }

    #[test]
    fn test_variables_and_outputs_checked_independently() {
        let content = r#"
variable "a" {}
output "z" { value = 1 }
variable "b" {}
output "y" { value = 2 }
"#;
        let violations = BlockOrderChecker::check_content(content, Path::new("main.tf"));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].block, OrderedBlock::Output);
        assert_eq!(violations[0].line, 3);
        assert_eq!(violations[0].expected, "y");
    }

    #[test_case("variable \"b\" {}\nvariable \"A\" {}\n", Some("A") ; "ignores case when sorting")]
    #[test_case("variable \"name\" {}\nvariable \"Name\" {}\n", None ; "case only differences keep file order")]
    #[test_case("variable \"only\" {}\n", None ; "single block")]
    #[test_case("# variable \"z\" {}\nvariable \"a\" {}\nvariable \"b\" {}\n", None ; "commented block ignored")]
    fn test_ordering_cases(content: &str, expected: Option<&str>) {
        let violations = BlockOrderChecker::check_content(content, Path::new("main.tf"));
        assert_eq!(violations.first().map(|v| v.expected.as_str()), expected);
    }

    #[test]
    fn test_heredoc_header_text_is_ignored() {
        let content = "variable \"b\" {\n  default = <<EOT\nvariable \"a\" {\nEOT\n}\nvariable \"c\" {}\n";
        assert!(BlockOrderChecker::check_content(content, Path::new("main.tf")).is_empty());
    }

    #[test]
    fn test_check_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputs.tf");
        std::fs::write(&path, "output \"b\" { value = 1 }\noutput \"a\" { value = 2 }\n").unwrap();

        let mut checker = BlockOrderChecker::new();
        assert!(checker.check_file(Path::new("README.md")));
        assert!(!checker.check_all(&[path.clone(), dir.path().join("missing.tf")]));
        assert_eq!(checker.violations().len(), 1);
        assert_eq!(checker.violations()[0].file, path);
        assert_eq!(checker.unreadable().len(), 1);
    }
}
