//! Tag compliance checking.
//!
//! For every taggable `resource` block the checker reads the literal
//! `tags = { ... }` object (`labels` for Google resources) and validates it
//! against the required and optional rules of the active [`TagPolicy`].
//!
//! # Dynamic tags
//!
//! A tag attribute assigned from `merge(...)`, `var.*` or `local.*` cannot be
//! evaluated by a text scan, so the resource is exempt. Detection is a
//! keyword check on the assignment, not expression evaluation: a literal that
//! happens to be built another way (e.g. `tomap(...)`) is not recognised as
//! dynamic and is read as if it were literal.

use crate::config::TagPolicy;
use crate::parser::{find_matching_brace, is_terraform_file, resource_headers, MaskedSource};
use crate::types::{
    ResourceBlock, TagExtraction, TagSet, TagViolation, UnreadableFile, ViolationKind,
};
use rayon::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Regexes for one tag attribute name.
struct AttributePatterns {
    /// `<attr> = merge|var.|local.`
    dynamic: Regex,
    /// `<attr> = {`
    object_start: Regex,
}

impl AttributePatterns {
    fn new(attribute: &str) -> Self {
        Self {
            dynamic: Regex::new(&format!(r"\b{attribute}\s*=\s*(?:merge|var\.|local\.)"))
                .expect("Invalid regex"),
            object_start: Regex::new(&format!(r"\b{attribute}\s*=\s*\{{")).expect("Invalid regex"),
        }
    }
}

static TAGS_PATTERNS: LazyLock<AttributePatterns> = LazyLock::new(|| AttributePatterns::new("tags"));

static LABELS_PATTERNS: LazyLock<AttributePatterns> =
    LazyLock::new(|| AttributePatterns::new("labels"));

// Capture groups: 1=quoted key, 2=bare key, 3=value
static TAG_PAIR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:"([^"]+)"|(\w+))\s*=\s*"([^"]*)""#).expect("Invalid regex")
});

fn attribute_patterns(attribute: &str) -> &'static AttributePatterns {
    if attribute == "labels" {
        &LABELS_PATTERNS
    } else {
        &TAGS_PATTERNS
    }
}

/// Name of the attribute holding a resource's tags.
///
/// Google resources use `labels`; every other provider uses `tags`.
#[must_use]
pub fn tag_attribute_name(resource_type: &str) -> &'static str {
    if resource_type.starts_with("google_") {
        "labels"
    } else {
        "tags"
    }
}

/// Read the tags of the resource whose header starts at `resource_start`.
///
/// # Example
///
/// ```rust
/// use tfhooks::analyzer::extract_tags;
/// use tfhooks::types::TagExtraction;
///
/// let content = r#"resource "aws_instance" "web" {
///   tags = {
///     Environment = "Dev"
///   }
/// }"#;
///
/// match extract_tags(content, 0, "aws_instance") {
///     TagExtraction::Literal { tags, line } => {
///         assert_eq!(tags["Environment"], "Dev");
///         assert_eq!(line, 2);
///     }
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[must_use]
pub fn extract_tags(content: &str, resource_start: usize, resource_type: &str) -> TagExtraction {
    extract_from(&MaskedSource::new(content), resource_start, resource_type)
}

fn extract_from(src: &MaskedSource<'_>, resource_start: usize, resource_type: &str) -> TagExtraction {
    let Some((open, close)) = src.block_from(resource_start) else {
        return TagExtraction::Unterminated;
    };
    let body_start = open + 1;
    let patterns = attribute_patterns(tag_attribute_name(resource_type));

    // String interiors are masked, so only real assignments match.
    let structure = &src.structure[body_start..close];
    if patterns.dynamic.is_match(structure) {
        return TagExtraction::Dynamic;
    }

    let Some(assignment) = patterns.object_start.find(structure) else {
        return TagExtraction::Literal {
            tags: TagSet::new(),
            line: src.line_at(resource_start),
        };
    };

    let object_open = body_start + assignment.end() - 1;
    let Some(object_close) = find_matching_brace(&src.structure, object_open) else {
        return TagExtraction::Unterminated;
    };

    let mut tags = TagSet::new();
    for caps in TAG_PAIR_PATTERN.captures_iter(&src.code[object_open + 1..object_close]) {
        let Some(key) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        let value = caps.get(3).map_or("", |m| m.as_str());
        tags.insert(key.as_str().to_string(), value.to_string());
    }

    TagExtraction::Literal {
        tags,
        line: src.line_at(body_start + assignment.start()),
    }
}

/// First key equal to `name` ignoring case but not exactly.
fn case_variant<'a>(tags: &'a TagSet, name: &str) -> Option<&'a str> {
    let lowered = name.to_lowercase();
    tags.keys()
        .find(|key| key.as_str() != name && key.to_lowercase() == lowered)
        .map(String::as_str)
}

/// Result of scanning one file.
#[derive(Debug, Default)]
struct FileOutcome {
    violations: Vec<TagViolation>,
    unreadable: Option<UnreadableFile>,
}

/// Checks resource tags against a [`TagPolicy`].
///
/// Findings accumulate across calls in file order.
///
/// # Example
///
/// ```rust
/// use tfhooks::analyzer::TagChecker;
/// use tfhooks::config::{TagPolicy, TagRule};
///
/// let policy = TagPolicy {
///     required_tags: vec![TagRule::new("Owner")],
///     ..TagPolicy::default()
/// };
/// let checker = TagChecker::new(policy);
/// assert!(checker.is_taggable("aws_instance"));
/// assert!(!checker.is_taggable("aws_iam_policy_document"));
/// ```
pub struct TagChecker {
    policy: TagPolicy,
    /// Compiled pattern per required rule, aligned with `policy.required_tags`
    patterns: Vec<Option<Result<Regex, String>>>,
    violations: Vec<TagViolation>,
    unreadable: Vec<UnreadableFile>,
}

impl TagChecker {
    /// Create a checker, compiling every rule pattern once.
    ///
    /// A pattern that fails to compile is kept as an error and reported
    /// against each resource it would have been applied to.
    #[must_use]
    pub fn new(policy: TagPolicy) -> Self {
        let patterns = policy
            .required_tags
            .iter()
            .map(|rule| {
                rule.pattern.as_ref().map(|pattern| {
                    // Match from the start of the value; trailing text is accepted
                    Regex::new(&format!("^(?:{pattern})")).map_err(|e| {
                        tracing::warn!(tag = %rule.name, pattern = %pattern, "Invalid tag pattern");
                        e.to_string()
                    })
                })
            })
            .collect();

        Self {
            policy,
            patterns,
            violations: Vec::new(),
            unreadable: Vec::new(),
        }
    }

    /// The active policy.
    #[must_use]
    pub fn policy(&self) -> &TagPolicy {
        &self.policy
    }

    /// Whether `resource_type` is in the taggable catalog.
    #[must_use]
    pub fn is_taggable(&self, resource_type: &str) -> bool {
        self.policy.taggable_resources.contains(resource_type)
    }

    /// Validate `tags` against the required rules, in configured order.
    #[must_use]
    pub fn validate_required(&self, resource: &str, tags: &TagSet, file: &Path, line: usize) -> Vec<TagViolation> {
        let violation = |kind| TagViolation {
            file: file.to_path_buf(),
            line,
            resource: resource.to_string(),
            kind,
        };
        let mut violations = Vec::new();

        for (rule, pattern) in self.policy.required_tags.iter().zip(&self.patterns) {
            let tag = rule.name.clone();

            let Some(value) = tags.get(&rule.name) else {
                let kind = match case_variant(tags, &rule.name) {
                    Some(found) => ViolationKind::KeyCase {
                        required: true,
                        tag,
                        found: found.to_string(),
                    },
                    None => ViolationKind::Missing { tag },
                };
                violations.push(violation(kind));
                continue;
            };

            if value.trim().is_empty() {
                violations.push(violation(ViolationKind::EmptyValue { tag }));
                continue;
            }

            if let Some(allowed) = rule.allow_list() {
                if allowed.contains(value) {
                    continue;
                }
                let lowered = value.to_lowercase();
                let kind = match allowed.iter().find(|a| a.to_lowercase() == lowered) {
                    Some(expected) => ViolationKind::ValueCase {
                        tag,
                        value: value.clone(),
                        expected: expected.clone(),
                        allowed: allowed.to_vec(),
                    },
                    None => ViolationKind::InvalidValue {
                        tag,
                        value: value.clone(),
                        allowed: allowed.to_vec(),
                    },
                };
                violations.push(violation(kind));
                continue;
            }

            let (Some(source), Some(compiled)) = (&rule.pattern, pattern) else {
                continue;
            };
            match compiled {
                Ok(regex) if regex.is_match(value) => {}
                Ok(_) => violations.push(violation(ViolationKind::PatternMismatch {
                    tag,
                    value: value.clone(),
                    pattern: source.clone(),
                })),
                Err(error) => violations.push(violation(ViolationKind::InvalidPattern {
                    tag,
                    pattern: source.clone(),
                    error: error.clone(),
                })),
            }
        }

        violations
    }

    /// Validate key casing of the optional rules that are present.
    ///
    /// Values of optional tags are never checked.
    #[must_use]
    pub fn validate_optional(&self, resource: &str, tags: &TagSet, file: &Path, line: usize) -> Vec<TagViolation> {
        self.policy
            .optional_tags
            .iter()
            .filter(|rule| !tags.contains_key(&rule.name))
            .filter_map(|rule| {
                case_variant(tags, &rule.name).map(|found| TagViolation {
                    file: file.to_path_buf(),
                    line,
                    resource: resource.to_string(),
                    kind: ViolationKind::KeyCase {
                        required: false,
                        tag: rule.name.clone(),
                        found: found.to_string(),
                    },
                })
            })
            .collect()
    }

    /// Validate every resource block in `content`.
    #[must_use]
    pub fn check_content(&self, content: &str, path: &Path) -> Vec<TagViolation> {
        let src = MaskedSource::new(content);
        let mut violations = Vec::new();

        for header in resource_headers(&src) {
            let Some(resource) = ResourceBlock::from_header(&header, path) else {
                continue;
            };

            if !self.is_taggable(&resource.resource_type) {
                tracing::trace!(resource = %resource.address(), "Skipping non-taggable resource");
                continue;
            }

            match extract_from(&src, resource.start, &resource.resource_type) {
                TagExtraction::Dynamic => {
                    tracing::debug!(resource = %resource.address(), "Skipping resource with dynamic tags");
                }
                TagExtraction::Unterminated => {
                    tracing::debug!(resource = %resource.address(), line = resource.line, "Unterminated block");
                    violations.push(TagViolation {
                        file: resource.file_path.clone(),
                        line: resource.line,
                        resource: resource.address(),
                        kind: ViolationKind::Unterminated,
                    });
                }
                TagExtraction::Literal { tags, line } => {
                    let address = resource.address();
                    let file = resource.file_path.as_path();
                    violations.extend(self.validate_required(&address, &tags, file, line));
                    violations.extend(self.validate_optional(&address, &tags, file, line));
                }
            }
        }

        violations
    }

    fn scan_file(&self, path: &Path) -> FileOutcome {
        if !is_terraform_file(path) {
            tracing::debug!(file = %path.display(), "Skipping non-Terraform file");
            return FileOutcome::default();
        }

        tracing::debug!(file = %path.display(), "Checking file");

        match std::fs::read_to_string(path) {
            Ok(content) => FileOutcome {
                violations: self.check_content(&content, path),
                unreadable: None,
            },
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "Error reading file");
                FileOutcome {
                    violations: Vec::new(),
                    unreadable: Some(UnreadableFile {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    }),
                }
            }
        }
    }

    fn record(&mut self, outcome: FileOutcome) -> bool {
        let passed = outcome.violations.is_empty() && outcome.unreadable.is_none();
        self.violations.extend(outcome.violations);
        self.unreadable.extend(outcome.unreadable);
        passed
    }

    /// Check one file. Returns `true` if it added no findings.
    ///
    /// Non-`.tf` files always pass. A file that cannot be read fails.
    pub fn check_file(&mut self, path: &Path) -> bool {
        let outcome = self.scan_file(path);
        self.record(outcome)
    }

    /// Check every file. Returns `true` if the whole run is clean.
    ///
    /// Files are scanned in parallel; findings are recorded in input order.
    pub fn check_all(&mut self, files: &[PathBuf]) -> bool {
        let outcomes: Vec<FileOutcome> = files.par_iter().map(|path| self.scan_file(path)).collect();
        for outcome in outcomes {
            self.record(outcome);
        }

        tracing::info!(
            files = files.len(),
            violations = self.violations.len(),
            unreadable = self.unreadable.len(),
            "Tag check complete"
        );

        self.violations.is_empty() && self.unreadable.is_empty()
    }

    /// Every violation so far, in file order.
    #[must_use]
    pub fn violations(&self) -> &[TagViolation] {
        &self.violations
    }

    /// Every file that could not be read.
    #[must_use]
    pub fn unreadable(&self) -> &[UnreadableFile] {
        &self.unreadable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TaggableCatalog, TagRule};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn checker(required: Vec<TagRule>, optional: Vec<TagRule>) -> TagChecker {
        TagChecker::new(TagPolicy {
            required_tags: required,
            optional_tags: optional,
            ..TagPolicy::default()
        })
    }

    fn tags(pairs: &[(&str, &str)]) -> TagSet {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    fn kinds(violations: &[TagViolation]) -> Vec<ViolationKind> {
        violations.iter().map(|v| v.kind.clone()).collect()
    }

    fn literal(extraction: TagExtraction) -> (TagSet, usize) {
        match extraction {
            TagExtraction::Literal { tags, line } => (tags, line),
            other => panic!("Expected literal tags, got {other:?}"),
        }
    }

    #[test_case("aws_instance", "tags")]
    #[test_case("azurerm_resource_group", "tags")]
    #[test_case("google_compute_instance", "labels")]
    #[test_case("googlecompute", "tags")]
    fn test_tag_attribute_name(resource_type: &str, expected: &str) {
        assert_eq!(tag_attribute_name(resource_type), expected);
    }

    #[test]
    fn test_extract_literal_tags() {
        let content = r#"
resource "aws_instance" "web" {
  ami = "ami-123"

  tags = {
    Name               = "web"
    "kubernetes.io/id" = "cluster"
    Environment        = "Dev" # inline comment
    # Owner = "commented-out"
    Empty              = ""
  }
}
"#;
        let start = content.find("resource").unwrap();
        let (tags, line) = literal(extract_tags(content, start, "aws_instance"));
        assert_eq!(
            tags.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect::<Vec<_>>(),
            vec![
                ("Name", "web"),
                ("kubernetes.io/id", "cluster"),
                ("Environment", "Dev"),
                ("Empty", ""),
            ]
        );
        assert_eq!(line, 5);
    }

    #[test]
    fn test_extract_duplicate_key_last_wins() {
        let content = "resource \"aws_vpc\" \"a\" {\n  tags = {\n    Env = \"one\"\n    Name = \"n\"\n    Env = \"two\"\n  }\n}\n";
        let (tags, _) = literal(extract_tags(content, 0, "aws_vpc"));
        assert_eq!(tags.keys().collect::<Vec<_>>(), vec!["Env", "Name"]);
        assert_eq!(tags["Env"], "two");
    }

    #[test]
    fn test_extract_google_labels() {
        let content = r#"resource "google_compute_instance" "vm" {
  tags = ["web"]
  labels = {
    environment = "dev"
  }
}"#;
        let (tags, line) = literal(extract_tags(content, 0, "google_compute_instance"));
        assert_eq!(tags, self::tags(&[("environment", "dev")]));
        assert_eq!(line, 3);
    }

    #[test]
    fn test_extract_absent_attribute_uses_resource_line() {
        let content = "\n\nresource \"aws_vpc\" \"a\" {\n  cidr_block = \"10.0.0.0/16\"\n}\n";
        let start = content.find("resource").unwrap();
        let (tags, line) = literal(extract_tags(content, start, "aws_vpc"));
        assert!(tags.is_empty());
        assert_eq!(line, 3);
    }

    #[test_case("tags = merge(local.common, { Name = \"x\" })" ; "merge")]
    #[test_case("tags = var.tags" ; "variable")]
    #[test_case("tags = local.common_tags" ; "local")]
    #[test_case("tags     =merge(var.a, var.b)" ; "spacing")]
    fn test_extract_dynamic_tags(assignment: &str) {
        let content = format!("resource \"aws_instance\" \"x\" {{\n  {assignment}\n}}\n");
        assert_eq!(extract_tags(&content, 0, "aws_instance"), TagExtraction::Dynamic);
    }

    #[test]
    fn test_dynamic_keyword_inside_string_is_literal() {
        let content = r#"resource "aws_instance" "x" {
  description = "tags = var.tags"
  tags = { Name = "x" }
}"#;
        let (tags, _) = literal(extract_tags(content, 0, "aws_instance"));
        assert_eq!(tags, self::tags(&[("Name", "x")]));
    }

    #[test]
    fn test_default_tags_not_mistaken_for_tags() {
        let content = r#"resource "aws_instance" "x" {
  default_tags = var.defaults
  tags = { Name = "x" }
}"#;
        let (tags, _) = literal(extract_tags(content, 0, "aws_instance"));
        assert_eq!(tags, self::tags(&[("Name", "x")]));
    }

    #[test]
    fn test_braces_in_values_do_not_break_extraction() {
        let content = r#"resource "aws_instance" "x" {
  user_data = "echo }"
  tags = {
    Name = "a { b"
    Owner = "ops"
  }
}"#;
        let (tags, _) = literal(extract_tags(content, 0, "aws_instance"));
        assert_eq!(tags["Name"], "a { b");
        assert_eq!(tags["Owner"], "ops");
    }

    #[test]
    fn test_heredoc_with_glob_does_not_hide_later_resources() {
        let checker = checker(vec![TagRule::new("Owner")], vec![]);
        let content = r#"resource "aws_instance" "a" {
  user_data = <<-EOF
    #!/bin/bash
    rm -rf /tmp/*
  EOF

  tags = {
    Owner = "x"
  }
}

resource "aws_s3_bucket" "b" {
  bucket = "b"
}
"#;
        let violations = checker.check_content(content, Path::new("main.tf"));
        assert_eq!(kinds(&violations), vec![ViolationKind::Missing { tag: "Owner".into() }]);
        assert_eq!(violations[0].resource, "aws_s3_bucket.b");
        assert_eq!(violations[0].line, 12);
        assert_eq!(violations[0].file, PathBuf::from("main.tf"));
    }

    #[test]
    fn test_extract_unterminated() {
        let resource = "resource \"aws_instance\" \"x\" {\n  ami = \"a\"\n";
        assert_eq!(extract_tags(resource, 0, "aws_instance"), TagExtraction::Unterminated);
    }

    #[test]
    fn test_required_any_non_empty_value() {
        let checker = checker(vec![TagRule::new("Owner")], vec![]);
        let file = Path::new("main.tf");

        assert!(checker.validate_required("a.b", &tags(&[("Owner", "x")]), file, 1).is_empty());
        for empty in ["", "   ", "\t"] {
            let violations = checker.validate_required("a.b", &tags(&[("Owner", empty)]), file, 1);
            assert_eq!(kinds(&violations), vec![ViolationKind::EmptyValue { tag: "Owner".into() }]);
        }
    }

    #[test]
    fn test_required_case_mismatch_preferred_over_missing() {
        let checker = checker(vec![TagRule::new("Environment")], vec![]);
        let violations = checker.validate_required(
            "aws_instance.x",
            &tags(&[("ENVIRONMENT", "Dev"), ("environment", "Dev")]),
            Path::new("main.tf"),
            4,
        );
        assert_eq!(
            kinds(&violations),
            vec![ViolationKind::KeyCase {
                required: true,
                tag: "Environment".into(),
                found: "ENVIRONMENT".into(),
            }]
        );
        assert_eq!(violations[0].line, 4);
        assert_eq!(violations[0].resource, "aws_instance.x");
    }

    #[test]
    fn test_allow_list_case_and_invalid() {
        let checker = checker(
            vec![TagRule::new("Environment").with_allowed_values(["Dev", "Staging", "Production"])],
            vec![],
        );
        let file = Path::new("main.tf");
        let allowed: Vec<String> = vec!["Dev".into(), "Staging".into(), "Production".into()];

        let case = checker.validate_required("a.b", &tags(&[("Environment", "production")]), file, 1);
        assert_eq!(
            kinds(&case),
            vec![ViolationKind::ValueCase {
                tag: "Environment".into(),
                value: "production".into(),
                expected: "Production".into(),
                allowed: allowed.clone(),
            }]
        );

        let invalid = checker.validate_required("a.b", &tags(&[("Environment", "QA")]), file, 1);
        assert_eq!(
            kinds(&invalid),
            vec![ViolationKind::InvalidValue {
                tag: "Environment".into(),
                value: "QA".into(),
                allowed,
            }]
        );

        assert!(checker
            .validate_required("a.b", &tags(&[("Environment", "Staging")]), file, 1)
            .is_empty());
    }

    #[test]
    fn test_empty_allow_list_falls_through_to_pattern() {
        let checker = checker(
            vec![TagRule::new("Team")
                .with_allowed_values(Vec::<String>::new())
                .with_pattern("[a-z]+")],
            vec![],
        );
        let file = Path::new("main.tf");
        assert!(checker.validate_required("a.b", &tags(&[("Team", "ops")]), file, 1).is_empty());
        assert_eq!(
            kinds(&checker.validate_required("a.b", &tags(&[("Team", "OPS")]), file, 1)),
            vec![ViolationKind::PatternMismatch {
                tag: "Team".into(),
                value: "OPS".into(),
                pattern: "[a-z]+".into(),
            }]
        );
    }

    #[test_case("^CC-[0-9]{4}$", "CC-1234", true ; "anchored match")]
    #[test_case("^CC-[0-9]{4}$", "CC-12345", false ; "anchored rejects trailing")]
    #[test_case("CC-[0-9]{4}", "CC-12345", true ; "unanchored accepts trailing")]
    #[test_case("CC-[0-9]{4}", "XCC-1234", false ; "match starts at first character")]
    fn test_pattern_matches_from_start(pattern: &str, value: &str, passes: bool) {
        let checker = checker(vec![TagRule::new("CostCenter").with_pattern(pattern)], vec![]);
        let violations =
            checker.validate_required("a.b", &tags(&[("CostCenter", value)]), Path::new("main.tf"), 1);
        assert_eq!(violations.is_empty(), passes);
    }

    #[test]
    fn test_invalid_pattern_is_violation() {
        let checker = checker(vec![TagRule::new("CostCenter").with_pattern("CC-(")], vec![]);
        let violations =
            checker.validate_required("a.b", &tags(&[("CostCenter", "CC-1")]), Path::new("main.tf"), 1);
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            &violations[0].kind,
            ViolationKind::InvalidPattern { tag, pattern, .. } if tag == "CostCenter" && pattern == "CC-("
        ));
        assert!(violations[0].message().starts_with("Tag 'CostCenter' has invalid regex pattern 'CC-(':"));
    }

    #[test_case("^(?!test-).+" ; "negative lookahead")]
    #[test_case(r"^(a)\1$" ; "backreference")]
    fn test_unsupported_regex_features_are_invalid_patterns(pattern: &str) {
        let checker = checker(vec![TagRule::new("Name").with_pattern(pattern)], vec![]);
        let violations = checker.validate_required("a.b", &tags(&[("Name", "prod-web")]), Path::new("main.tf"), 1);
        assert_eq!(violations.len(), 1);
        assert!(matches!(&violations[0].kind, ViolationKind::InvalidPattern { .. }));
    }

    #[test]
    fn test_allow_list_takes_precedence_over_pattern() {
        let checker = checker(
            vec![TagRule::new("Env").with_allowed_values(["Dev"]).with_pattern("^x$")],
            vec![],
        );
        assert!(checker
            .validate_required("a.b", &tags(&[("Env", "Dev")]), Path::new("main.tf"), 1)
            .is_empty());
    }

    #[test]
    fn test_optional_tags() {
        let checker = checker(vec![], vec![TagRule::new("Project"), TagRule::new("Team")]);
        let file = Path::new("main.tf");

        assert!(checker.validate_optional("a.b", &tags(&[]), file, 1).is_empty());
        assert!(checker.validate_optional("a.b", &tags(&[("Project", "")]), file, 1).is_empty());
        assert_eq!(
            kinds(&checker.validate_optional("a.b", &tags(&[("project", "x"), ("TEAM", "y")]), file, 1)),
            vec![
                ViolationKind::KeyCase {
                    required: false,
                    tag: "Project".into(),
                    found: "project".into(),
                },
                ViolationKind::KeyCase {
                    required: false,
                    tag: "Team".into(),
                    found: "TEAM".into(),
                },
            ]
        );
    }

    #[test]
    fn test_scenario_a_missing_owner() {
        let checker = checker(vec![TagRule::new("Environment"), TagRule::new("Owner")], vec![]);
        let content = r#"resource "aws_instance" "x" { tags = { Environment = "Dev" } }"#;
        let violations = checker.check_content(content, Path::new("main.tf"));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::Missing { tag: "Owner".into() });
        assert_eq!(violations[0].resource, "aws_instance.x");
        assert_eq!(violations[0].message(), "Required tag 'Owner' is missing.");
    }

    #[test]
    fn test_scenario_b_google_label_case() {
        let checker = checker(vec![TagRule::new("Environment")], vec![]);
        let content = r#"
resource "google_compute_instance" "vm" {
  name = "vm"
  labels = {
    environment = "dev"
  }
}
"#;
        let violations = checker.check_content(content, Path::new("main.tf"));
        assert_eq!(
            kinds(&violations),
            vec![ViolationKind::KeyCase {
                required: true,
                tag: "Environment".into(),
                found: "environment".into(),
            }]
        );
        assert_eq!(violations[0].line, 4);
    }

    #[test]
    fn test_scenario_c_dynamic_tags_skipped() {
        let checker = checker(vec![TagRule::new("Environment"), TagRule::new("Owner")], vec![]);
        let content = r#"resource "aws_instance" "x" {
  tags = merge(local.common, {Name = "x"})
}"#;
        assert!(checker.check_content(content, Path::new("main.tf")).is_empty());
    }

    #[test]
    fn test_scenario_d_non_taggable_ignored() {
        let checker = checker(vec![TagRule::new("Environment")], vec![]);
        let content = r#"resource "aws_iam_policy_document" "x" {
  tags = { environment = "" }
}"#;
        assert!(checker.check_content(content, Path::new("main.tf")).is_empty());
    }

    #[test]
    fn test_unterminated_resource_is_reported() {
        let checker = checker(vec![TagRule::new("Owner")], vec![]);
        let content = "resource \"aws_instance\" \"x\" {\n  tags = {\n    Owner = \"me\"\n";
        let violations = checker.check_content(content, Path::new("main.tf"));
        assert_eq!(kinds(&violations), vec![ViolationKind::Unterminated]);
        assert_eq!(violations[0].line, 1);
    }

    #[test]
    fn test_custom_catalog_replaces_builtin() {
        let policy = TagPolicy {
            required_tags: vec![TagRule::new("Owner")],
            optional_tags: vec![],
            taggable_resources: [("custom", ["custom_thing"])].into_iter().collect::<TaggableCatalog>(),
        };
        let checker = TagChecker::new(policy);
        let content = r#"
resource "aws_instance" "a" {}
resource "custom_thing" "b" {}
"#;
        let violations = checker.check_content(content, Path::new("main.tf"));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].resource, "custom_thing.b");
    }

    #[test]
    fn test_check_file_skips_non_terraform_and_records_unreadable() {
        let mut checker = checker(vec![TagRule::new("Owner")], vec![]);
        assert!(checker.check_file(Path::new("README.md")));
        assert!(!checker.check_file(Path::new("/nonexistent/dir/main.tf")));
        assert_eq!(checker.unreadable().len(), 1);
        assert!(checker.violations().is_empty());
    }

    #[test]
    fn test_check_all_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = Vec::new();
        for name in ["c.tf", "a.tf", "b.tf"] {
            let path = dir.path().join(name);
            std::fs::write(&path, format!("resource \"aws_vpc\" \"{name}\" {{}}\n")).unwrap();
            files.push(path);
        }

        let mut checker = checker(vec![TagRule::new("Owner")], vec![]);
        assert!(!checker.check_all(&files));
        let order: Vec<_> = checker.violations().iter().map(|v| v.file.clone()).collect();
        assert_eq!(order, files);
    }
}
