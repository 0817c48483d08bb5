//! Command-line interface module.
//!
//! This module defines the CLI structure using Clap, including
//! all commands, arguments, and options.
//!
//! # Commands
//!
//! - `tags`: Check resource tags against required/optional rules
//! - `providers`: Detect old-style provider configuration blocks
//! - `modules`: Detect conflicting module versions
//! - `sort`: Check that variable and output blocks are sorted
//! - `template-sync`: Compare scaffold files with a template directory
//! - `init`: Create an example tag policy file
//! - `validate`: Validate a tag policy file
//!
//! # Example Usage
//!
//! ```bash
//! # Check tags with a policy file
//! tfhooks tags --config .terraform-tags.yaml main.tf network.tf
//!
//! # Rules on the command line (JSON), overriding the file
//! tfhooks tags --required-tags '[{"name":"Environment","allowed_values":["Dev","Prod"]},{"name":"Owner"}]' main.tf
//!
//! # Provider blocks in modules
//! tfhooks providers modules/vpc/main.tf
//!
//! # Module version conflicts, ignoring downloaded modules
//! tfhooks modules --exclude-dir .terraform/ $(git ls-files '*.tf')
//!
//! # Block ordering and template drift
//! tfhooks sort variables.tf outputs.tf
//! tfhooks template-sync --template-path ~/templates/opentofu-module
//!
//! # Write and check a policy file
//! tfhooks init
//! tfhooks validate .terraform-tags.yaml
//! ```

use crate::config::DEFAULT_CONFIG_FILE;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// tfhooks - pre-commit hooks for Terraform/OpenTofu sources.
#[derive(Parser, Debug)]
#[command(
    name = "tfhooks",
    author,
    version,
    about = "Pre-commit hooks for Terraform/OpenTofu sources",
    long_about = "tfhooks scans the .tf files it is given and checks resource tag compliance, \
                  old-style provider configuration, module version consistency and block \
                  ordering, and can compare a repository with a template directory. It exits \
                  0 when clean, 1 when it finds problems and 2 on configuration errors \
                  (unreadable policy files, invalid rule lists, a missing template)."
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check resource tags against required and optional tag rules
    #[command(visible_alias = "t")]
    Tags(TagsArgs),

    /// Detect old-style provider configuration blocks
    #[command(visible_alias = "p")]
    Providers(FilesArgs),

    /// Detect modules referenced with conflicting versions
    #[command(visible_alias = "m")]
    Modules(ModulesArgs),

    /// Check that variable and output blocks are sorted alphabetically
    #[command(visible_alias = "s")]
    Sort(FilesArgs),

    /// Check that scaffold files match a reference template directory
    TemplateSync(TemplateSyncArgs),

    /// Create an example tag policy file
    Init(InitArgs),

    /// Validate a tag policy file
    Validate(ValidateArgs),
}

/// Arguments for the tags command.
#[derive(Args, Debug)]
#[command(after_help = "Examples:\n  \
    tfhooks tags --config .terraform-tags.yaml main.tf\n  \
    tfhooks tags --required-tags '[{\"name\":\"Environment\",\"allowed_values\":[\"Dev\",\"Staging\",\"Prod\"]},{\"name\":\"Owner\"}]' main.tf\n  \
    tfhooks tags --config .terraform-tags.yaml --optional-tags '[{\"name\":\"Project\"}]' main.tf")]
pub struct TagsArgs {
    /// Terraform files to check
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Path to a .terraform-tags.yaml or .terraform-tags.json policy file
    #[arg(short, long, value_name = "FILE", env = "TFHOOKS_TAGS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Required tags as a JSON list, e.g. [{"name":"Env","allowed_values":["Dev","Prod"]}]
    #[arg(long, value_name = "JSON")]
    pub required_tags: Option<String>,

    /// Optional tags as a JSON list, e.g. [{"name":"Project"},{"name":"Description"}]
    #[arg(long, value_name = "JSON")]
    pub optional_tags: Option<String>,
}

/// Arguments for commands that only take files.
#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Terraform files to check
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

/// Arguments for the modules command.
#[derive(Args, Debug)]
pub struct ModulesArgs {
    /// Terraform files to check
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Skip files whose path contains this text (repeatable)
    #[arg(long = "exclude-dir", value_name = "PATTERN")]
    pub exclude_dirs: Vec<String>,
}

/// Arguments for the template-sync command.
#[derive(Args, Debug)]
#[command(after_help = "Examples:\n  \
    tfhooks template-sync --template-path ~/templates/opentofu-module\n  \
    tfhooks template-sync --template-path /path/to/template --repo-root /path/to/repo")]
pub struct TemplateSyncArgs {
    /// Directory holding the reference files
    #[arg(long, value_name = "DIR")]
    pub template_path: PathBuf,

    /// Repository root to compare
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub repo_root: PathBuf,

    /// Files passed by pre-commit (accepted and ignored)
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

/// Arguments for the init command.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the policy file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub output: PathBuf,
}

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the policy file to validate
    #[arg(value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}
