//! Plain text report generator.

use crate::analyzer::{BlockOrderChecker, ProviderConfigChecker, TagChecker, TemplateSyncChecker};
use crate::config::TagRule;
use crate::reporter::ReportGenerator;
use crate::types::{ModuleConflict, ModuleReference, UnreadableFile};
use colored::Colorize;
use comfy_table::{Cell, Color, ContentArrangement, Table};

const RULE_WIDTH: usize = 80;
const TABLE_WIDTH: u16 = 100;

/// Recommended replacement for old-style provider blocks.
const PROVIDER_FIX: &str = r#"For modules, use required_providers with configuration_aliases:

    terraform {
      required_providers {
        <provider> = {
          source                = "<source>"
          version               = "<version>"
          configuration_aliases = [<provider>.main]
        }
      }
    }

Then reference providers when calling the module:

    module "example" {
      source = "./modules/my-module"

      providers = {
        <provider>.main = <provider>.alias_name
      }

      # Now for_each and depends_on work!
      for_each   = var.instances
      depends_on = [<resource>]
    }

Examples for common providers:
  - AWS (aws):        source = "hashicorp/aws"
  - Azure (azurerm):  source = "hashicorp/azurerm"
  - GCP (google):     source = "hashicorp/google"
  - Oracle (oci):     source = "oracle/oci""#;

/// Steps printed after template drift.
const TEMPLATE_FIX: &str = "1. Review each error above to understand what's missing or different
2. For missing directories: Create them to match the template structure
3. For missing files: Copy them from the template directory
4. For mismatched files: Update them to match the template version
5. Re-run the hook to verify all issues are resolved";

/// Text report generator for hook output.
#[derive(Debug, Clone, Copy)]
pub struct TextReporter {
    /// Whether to use colors
    use_colors: bool,
}

impl TextReporter {
    /// Create a new text reporter.
    #[must_use]
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// A title framed by `=` rules.
    fn banner(&self, title: &str) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        if self.use_colors {
            format!(
                "{}\n{}\n{}\n",
                rule.bright_blue(),
                title.bright_white().bold(),
                rule.bright_blue()
            )
        } else {
            format!("{rule}\n{title}\n{rule}\n")
        }
    }

    fn section(&self, title: &str) -> String {
        let title = if self.use_colors {
            title.bright_cyan().bold().to_string()
        } else {
            title.to_string()
        };
        format!("\n{title}\n{}\n", "-".repeat(RULE_WIDTH))
    }

    fn label(&self, name: &str) -> String {
        if self.use_colors {
            format!("{name}:").dimmed().to_string()
        } else {
            format!("{name}:")
        }
    }

    fn failure(&self, text: &str) -> String {
        if self.use_colors {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn success(&self, text: &str) -> String {
        if self.use_colors {
            text.green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn format_unreadable(&self, unreadable: &[UnreadableFile]) -> String {
        if unreadable.is_empty() {
            return String::new();
        }

        let mut output = self.section("Unreadable files");
        for file in unreadable {
            output.push_str(&format!("  {}: {}\n", file.path.display(), file.reason));
        }
        output
    }

    /// Table of the configured rules.
    fn format_requirements(&self, required: &[TagRule], optional: &[TagRule]) -> String {
        let mut output = self.banner("TAG REQUIREMENTS");

        if required.is_empty() && optional.is_empty() {
            output.push_str("No tag rules configured.\n");
            return output;
        }

        let mut table = Table::new();
        table
            .load_preset(comfy_table::presets::UTF8_BORDERS_ONLY)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_width(TABLE_WIDTH)
            .set_header(vec!["Tag", "Kind", "Constraint"]);

        for rule in required {
            let kind = if self.use_colors {
                Cell::new("required").fg(Color::Yellow)
            } else {
                Cell::new("required")
            };
            table.add_row(vec![Cell::new(&rule.name), kind, Cell::new(rule.constraint())]);
        }
        for rule in optional {
            table.add_row(vec![
                Cell::new(&rule.name),
                Cell::new("optional"),
                Cell::new("exact key case if present"),
            ]);
        }

        output.push_str(&table.to_string());
        output.push('\n');
        output
    }

    fn format_module_reference(&self, reference: &ModuleReference) -> String {
        let version_info = match (&reference.version, &reference.git_ref) {
            (Some(version), _) => format!("version = {version}"),
            (None, Some(git_ref)) => format!("git ref = {git_ref}"),
            (None, None) => "no version specified".to_string(),
        };
        let version_info = if self.use_colors && reference.version.is_none() && reference.git_ref.is_none() {
            version_info.yellow().to_string()
        } else {
            version_info
        };

        format!(
            "   {} {}\n   {} {}\n   {} {}\n   {} {}\n\n",
            self.label("File"),
            reference.file_path.display(),
            self.label("Line"),
            reference.line_number,
            self.label("Version"),
            version_info,
            self.label("Source"),
            reference.source,
        )
    }
}

impl ReportGenerator<TagChecker> for TextReporter {
    fn generate(&self, checker: &TagChecker) -> String {
        let violations = checker.violations();
        let unreadable = checker.unreadable();

        if violations.is_empty() && unreadable.is_empty() {
            return format!("{}\n", self.success("All taggable resources have valid tags"));
        }

        let mut output = self.banner("TERRAFORM TAG VALIDATION FAILED");

        for violation in violations {
            output.push_str(&format!(
                "\n{} {}\n{} {}\n{} {}\n{}\n",
                self.label("File"),
                violation.file.display(),
                self.label("Line"),
                violation.line,
                self.label("Resource"),
                violation.resource,
                self.failure(&violation.message()),
            ));
        }

        output.push_str(&self.format_unreadable(unreadable));
        output.push('\n');

        let policy = checker.policy();
        output.push_str(&self.format_requirements(&policy.required_tags, &policy.optional_tags));

        let mut summary = format!("Found {} tag issue(s)", violations.len());
        if !unreadable.is_empty() {
            summary.push_str(&format!(" and {} unreadable file(s)", unreadable.len()));
        }
        output.push_str(&format!("\n{}\n", self.failure(&summary)));

        output
    }
}

impl ReportGenerator<ProviderConfigChecker> for TextReporter {
    fn generate(&self, checker: &ProviderConfigChecker) -> String {
        let violations = checker.violations();
        let unreadable = checker.unreadable();

        if violations.is_empty() && unreadable.is_empty() {
            return format!("{}\n", self.success("No old-style provider configurations detected"));
        }

        let mut output = String::new();

        if !violations.is_empty() {
            output.push_str(&self.banner("OLD-STYLE PROVIDER CONFIGURATION DETECTED"));
            for violation in violations {
                output.push_str(&format!(
                    "\n{} {}\n{} {}\n{}\n",
                    self.label("File"),
                    violation.file.display(),
                    self.label("Line"),
                    violation.line,
                    self.failure(&violation.message()),
                ));
                for hint in violation.hints() {
                    output.push_str(&format!("  -> {hint}\n"));
                }
            }
        }

        output.push_str(&self.format_unreadable(unreadable));

        if !violations.is_empty() {
            output.push('\n');
            output.push_str(&self.banner("RECOMMENDED FIX"));
            output.push('\n');
            output.push_str(PROVIDER_FIX);
            output.push('\n');
        }

        let mut summary = format!("Found {} old-style provider block(s)", violations.len());
        if !unreadable.is_empty() {
            summary.push_str(&format!(" and {} unreadable file(s)", unreadable.len()));
        }
        output.push_str(&format!("\n{}\n", self.failure(&summary)));

        output
    }
}

impl ReportGenerator<[ModuleConflict]> for TextReporter {
    fn generate(&self, conflicts: &[ModuleConflict]) -> String {
        if conflicts.is_empty() {
            return format!("{}\n", self.success("No module version conflicts detected"));
        }

        let mut output = self.banner("MODULE VERSION CONFLICTS DETECTED");
        output.push_str("\nThe same module is referenced with different versions or git refs.\n");
        output.push_str("This can lead to inconsistent behavior and should be resolved.\n\n");

        for conflict in conflicts {
            let title = format!("Module: {}", conflict.normalized_source);
            let title = if self.use_colors {
                title.bright_white().bold().to_string()
            } else {
                title
            };
            output.push_str(&format!("{title}\n   Conflicting references:\n\n"));

            for reference in &conflict.references {
                output.push_str(&self.format_module_reference(reference));
            }

            output.push_str("   Resolution:\n");
            output.push_str("   All references to this module should use the same version/ref.\n");
            output.push_str("   Choose one version and update all references to match.\n\n");
            output.push_str(&"-".repeat(RULE_WIDTH));
            output.push_str("\n\n");
        }

        output.push_str(&format!(
            "{}\n",
            self.failure(&format!("Found {} module(s) with version conflicts", conflicts.len()))
        ));

        output
    }
}

impl ReportGenerator<BlockOrderChecker> for TextReporter {
    fn generate(&self, checker: &BlockOrderChecker) -> String {
        let violations = checker.violations();
        let unreadable = checker.unreadable();

        if violations.is_empty() && unreadable.is_empty() {
            return format!("{}\n", self.success("All variable and output blocks are sorted alphabetically"));
        }

        let mut output = String::new();

        if !violations.is_empty() {
            output.push_str(&self.banner("TFSORT COMPLIANCE CHECK FAILED"));
            for violation in violations {
                output.push_str(&format!(
                    "\n{} {}\n{} {}\n{}\n   Current order: {}\n   Expected order: {}\n  -> Fix: run 'tfsort {}' or reorder the blocks alphabetically.\n",
                    self.label("File"),
                    violation.file.display(),
                    self.label("Line"),
                    violation.line,
                    self.failure(&violation.message()),
                    violation.current_order.join(", "),
                    violation.expected_order.join(", "),
                    violation.file.display(),
                ));
            }
        }

        output.push_str(&self.format_unreadable(unreadable));

        let mut summary = format!("Found {} sorting issue(s)", violations.len());
        if !unreadable.is_empty() {
            summary.push_str(&format!(" and {} unreadable file(s)", unreadable.len()));
        }
        output.push_str(&format!("\n{}\n", self.failure(&summary)));

        output
    }
}

impl ReportGenerator<TemplateSyncChecker> for TextReporter {
    fn generate(&self, checker: &TemplateSyncChecker) -> String {
        let drift = checker.drift();
        let warnings = checker.warnings();
        let mut output = String::new();

        if !warnings.is_empty() {
            output.push_str(&self.banner("WARNINGS"));
            for warning in warnings {
                output.push_str(&format!(
                    "\nCould not calculate hash for template file: {}\n   Reason: {}\n",
                    warning.path.display(),
                    warning.reason
                ));
            }
            output.push('\n');
        }

        if drift.is_empty() {
            if warnings.is_empty() {
                output.push_str(&format!("{}\n", self.success("Repository structure matches template perfectly!")));
            }
            return output;
        }

        output.push_str(&self.banner("TEMPLATE SYNC ERRORS DETECTED"));
        output.push_str(&format!(
            "\nThe repository does not match the template structure.\n{} {}\n{} {}\n\n",
            self.label("Template path"),
            checker.template_root().display(),
            self.label("Repository path"),
            checker.repo_root().display(),
        ));
        output.push_str(&self.failure(&format!("Found {} error(s):", drift.len())));
        output.push_str("\n\n");

        for item in drift {
            output.push_str(&item.to_string());
            output.push('\n');
            output.push_str(&"-".repeat(RULE_WIDTH));
            output.push('\n');
        }

        output.push('\n');
        output.push_str(&self.banner("HOW TO FIX"));
        output.push('\n');
        output.push_str(TEMPLATE_FIX);
        output.push('\n');

        output
    }
}
