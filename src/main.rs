//! tfhooks CLI entry point.
//!
//! This binary provides the command-line interface for the hooks.

use clap::Parser;
use regex::Regex;
use std::process::ExitCode;
use tfhooks::analyzer::{
    BlockOrderChecker, ModuleVersionChecker, ProviderConfigChecker, TagChecker, TemplateSyncChecker,
};
use tfhooks::cli::{
    Cli, Commands, FilesArgs, InitArgs, ModulesArgs, TagsArgs, TemplateSyncArgs, ValidateArgs,
};
use tfhooks::config::{parse_tag_rules, PolicyFile, PolicyOverrides, TagPolicy, TaggableCatalog};
use tfhooks::error::{ResultExt, EXIT_CONFIG_ERROR, EXIT_VIOLATIONS};
use tfhooks::reporter::{ReportGenerator, TextReporter};
use tfhooks::HookError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output settings shared by every command.
#[derive(Debug, Clone, Copy)]
struct Output {
    reporter: TextReporter,
    verbose: bool,
    quiet: bool,
}

impl Output {
    /// Print unless `--quiet` is set.
    fn info(&self, message: &str) {
        if !self.quiet {
            println!("{message}");
        }
    }
}

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Run the appropriate command
    match run(cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            tracing::debug!(error = %e, "Fatal error");

            eprintln!("Error: {e}");

            // Print error chain (cause chain)
            let mut source = e.source();
            if source.is_some() {
                eprintln!("\nCaused by:");
                let mut i = 0;
                while let Some(cause) = source {
                    eprintln!("  {i}: {cause}");
                    source = cause.source();
                    i += 1;
                }
            }

            let code = e
                .downcast_ref::<HookError>()
                .map_or(EXIT_VIOLATIONS, HookError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        // First try to use RUST_LOG from environment, otherwise use verbose flag
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let base_level = match verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            };
            // tfhooks at the requested level, everything else at warn
            EnvFilter::new(format!("warn,tfhooks={base_level}"))
        })
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let output = Output {
        reporter: TextReporter::new(!cli.no_color),
        verbose: cli.verbose > 0,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Tags(args) => run_tags(args, output),
        Commands::Providers(args) => run_providers(args, output),
        Commands::Modules(args) => run_modules(args, output),
        Commands::Sort(args) => Ok(run_sort(&args, output)),
        Commands::TemplateSync(args) => run_template_sync(&args, output),
        Commands::Init(args) => run_init(&args, output),
        Commands::Validate(args) => Ok(run_validate(&args, output)),
    }
}

fn run_tags(args: TagsArgs, output: Output) -> anyhow::Result<ExitCode> {
    if args.files.is_empty() {
        output.info("No files to check");
        return Ok(ExitCode::SUCCESS);
    }

    let overrides = PolicyOverrides {
        required_tags: args
            .required_tags
            .as_deref()
            .map(|json| parse_tag_rules("required_tags", json))
            .transpose()?,
        optional_tags: args
            .optional_tags
            .as_deref()
            .map(|json| parse_tag_rules("optional_tags", json))
            .transpose()?,
        taggable_resources: None,
    };

    tracing::debug!("Loading tag policy");
    let policy = TagPolicy::load(args.config.as_deref(), overrides)?;

    let mut checker = TagChecker::new(policy);
    let passed = checker.check_all(&args.files);
    let report = output.reporter.generate(&checker);

    if passed {
        if !output.quiet {
            print!("{report}");
        }
        Ok(ExitCode::SUCCESS)
    } else {
        print!("{report}");
        Ok(ExitCode::from(EXIT_VIOLATIONS))
    }
}

fn run_providers(args: FilesArgs, output: Output) -> anyhow::Result<ExitCode> {
    if args.files.is_empty() {
        output.info("No files to check");
        return Ok(ExitCode::SUCCESS);
    }

    let mut checker = ProviderConfigChecker::new();
    let passed = checker.check_all(&args.files);
    let report = output.reporter.generate(&checker);

    if passed {
        if !output.quiet {
            print!("{report}");
        }
        Ok(ExitCode::SUCCESS)
    } else {
        print!("{report}");
        Ok(ExitCode::from(EXIT_VIOLATIONS))
    }
}

fn run_modules(args: ModulesArgs, output: Output) -> anyhow::Result<ExitCode> {
    if args.files.is_empty() {
        output.info("No files provided to check.");
        return Ok(ExitCode::SUCCESS);
    }

    let mut checker = ModuleVersionChecker::new(args.exclude_dirs);
    checker.check_all(&args.files);
    let stats = checker.stats();

    if output.verbose && !output.quiet {
        if stats.excluded > 0 {
            println!("Excluded {} file(s)", stats.excluded);
        }
        println!("Scanned {} files", stats.files);
        println!("Found {} module references", stats.references);
        println!("Checking {} unique modules", checker.unique_modules());
        println!();
    }

    let conflicts = checker.find_conflicts();
    if !conflicts.is_empty() {
        print!("{}", output.reporter.generate(conflicts.as_slice()));
        return Ok(ExitCode::from(EXIT_VIOLATIONS));
    }

    if output.verbose || stats.references > 0 {
        output.info(output.reporter.generate(conflicts.as_slice()).trim_end());
    }
    Ok(ExitCode::SUCCESS)
}

fn run_sort(args: &FilesArgs, output: Output) -> ExitCode {
    if args.files.is_empty() {
        output.info("No files to check");
        return ExitCode::SUCCESS;
    }

    let mut checker = BlockOrderChecker::new();
    let passed = checker.check_all(&args.files);
    let report = output.reporter.generate(&checker);

    if passed {
        if !output.quiet {
            print!("{report}");
        }
        ExitCode::SUCCESS
    } else {
        print!("{report}");
        ExitCode::from(EXIT_VIOLATIONS)
    }
}

fn run_template_sync(args: &TemplateSyncArgs, output: Output) -> anyhow::Result<ExitCode> {
    if !args.files.is_empty() {
        tracing::debug!(files = args.files.len(), "Ignoring file arguments; the whole template is compared");
    }

    let mut checker = TemplateSyncChecker::new(&args.template_path, &args.repo_root)?;
    let passed = checker.check_sync();
    let report = output.reporter.generate(&checker);

    if passed {
        if !output.quiet {
            print!("{report}");
        }
        Ok(ExitCode::SUCCESS)
    } else {
        print!("{report}");
        Ok(ExitCode::from(EXIT_VIOLATIONS))
    }
}

fn run_init(args: &InitArgs, output: Output) -> anyhow::Result<ExitCode> {
    if args.output.exists() {
        return Err(tfhooks::err!(ConfigExists {
            path: args.output.clone(),
        })
        .into());
    }

    std::fs::write(&args.output, TagPolicy::example_yaml()).with_path(&args.output)?;
    tracing::info!(path = %args.output.display(), "Policy file written");
    output.info(&format!("Created example tag policy: {}", args.output.display()));
    Ok(ExitCode::SUCCESS)
}

fn run_validate(args: &ValidateArgs, output: Output) -> ExitCode {
    let policy = match PolicyFile::load(&args.config) {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("Configuration error: {}", e.summary());
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let required = policy.required_tags.unwrap_or_default();
    let optional = policy.optional_tags.unwrap_or_default();

    let invalid: Vec<String> = required
        .iter()
        .chain(&optional)
        .filter_map(|rule| {
            let pattern = rule.pattern.as_ref()?;
            Regex::new(&format!("^(?:{pattern})"))
                .err()
                .map(|e| format!("Tag '{}' has invalid regex pattern '{pattern}': {e}", rule.name))
        })
        .collect();

    if !invalid.is_empty() {
        for message in &invalid {
            eprintln!("Configuration error: {message}");
        }
        return ExitCode::from(EXIT_CONFIG_ERROR);
    }

    let catalog = policy.taggable_resources.unwrap_or_else(TaggableCatalog::builtin);
    output.info(&format!(
        "Configuration is valid: {} ({} required, {} optional, {} taggable resource types)",
        args.config.display(),
        required.len(),
        optional.len(),
        catalog.len()
    ));
    ExitCode::SUCCESS
}
