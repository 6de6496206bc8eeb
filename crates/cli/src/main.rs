//! PlanGuard CLI - planning vocabulary enforcement.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use planguard_core::Violation;
use planguard_plan::{PlanBuilder, PlanSpec};
use planguard_rules::{
    validate_context_document, AuditReport, Auditor, ContextSource, ContextUpdater, OutputValidator,
    RuleCatalog, SaveOutcome, DEFAULT_CONTEXT_PATH, DEFAULT_PATTERNS,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "planguard")]
#[command(about = "Enforce a time-estimate-free planning vocabulary", long_about = None)]
struct Cli {
    /// Rule catalog file (defaults to the built-in catalog)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Project context document
    #[arg(long, global = true)]
    context: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit files for time estimates
    Check {
        /// File or directory
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Filename patterns (repeatable)
        #[arg(long = "pattern", short = 'p')]
        patterns: Vec<String>,
        /// Emit a JSON report
        #[arg(long)]
        json: bool,
    },
    /// Validate text (stdin when no file or "-")
    Validate {
        /// Input file
        input: Option<PathBuf>,
        /// Output type selecting the required patterns
        #[arg(long, short = 't', default_value = "general")]
        output_type: String,
        /// Rewrite non-compliant text and print the rewrite
        #[arg(long)]
        transform: bool,
        /// Emit a JSON report
        #[arg(long)]
        json: bool,
    },
    /// Build a plan from a YAML or JSON spec
    Plan {
        /// Spec file
        spec: PathBuf,
        /// Output format: json, yaml or markdown
        #[arg(long, short = 'f', default_value = "yaml")]
        format: String,
    },
    /// Validate a project context document
    Context {
        /// Document path
        path: Option<PathBuf>,
    },
    /// Record a repository's current focus in the project context
    Focus {
        /// Repository name
        repository: String,
        /// What the repository is working on
        focus: String,
        /// Show the change without writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// List the loaded rules
    Rules,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load catalog
    let loaded;
    let catalog = match &cli.rules {
        Some(path) => {
            loaded = RuleCatalog::from_path(path)
                .with_context(|| format!("failed to load rule catalog {}", path.display()))?;
            &loaded
        }
        None => RuleCatalog::builtin(),
    };

    let context_path = cli
        .context
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTEXT_PATH));

    match cli.command {
        Commands::Check { path, patterns, json } => {
            let patterns: Vec<&str> = if patterns.is_empty() {
                DEFAULT_PATTERNS.to_vec()
            } else {
                patterns.iter().map(String::as_str).collect()
            };

            let report = Auditor::new(catalog)
                .audit_path(&path, &patterns)
                .with_context(|| format!("failed to audit {}", path.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_audit(&report);
            }
            Ok(exit_code(report.is_clean()))
        }
        Commands::Validate { input, output_type, transform, json } => {
            let text = read_input(input.as_deref())?;
            let validator = OutputValidator::new(catalog).with_context(ContextSource::Path(context_path));

            if transform {
                let result = validator.validate_agent_output(&text, &output_type);
                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    print_violations(&result.violations);
                    if let Some(rewritten) = &result.transformed {
                        println!("--- rewritten ---");
                        println!("{}", rewritten);
                        if !result.remaining_violations.is_empty() {
                            println!("--- remaining ---");
                            print_violations(&result.remaining_violations);
                        }
                    }
                }
                Ok(exit_code(result.valid || result.transformed_is_compliant()))
            } else {
                let report = validator.validate_output(&text, &output_type);
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print_violations(&report.violations);
                    println!("{}", if report.compliant { "Compliant" } else { "Not compliant" });
                }
                Ok(exit_code(report.compliant))
            }
        }
        Commands::Plan { spec, format } => {
            let source = std::fs::read_to_string(&spec)
                .with_context(|| format!("failed to read {}", spec.display()))?;
            let parsed = if has_extension(&spec, "json") {
                PlanSpec::from_json_str(&source)?
            } else {
                PlanSpec::from_yaml_str(&source)?
            };

            let mut builder = PlanBuilder::from_spec(&parsed)?;
            print!("{}", builder.build_with(&format)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Context { path } => {
            let path = path.unwrap_or(context_path);
            let report = validate_context_document(&path);

            println!("Context: {}", path.display());
            for error in &report.errors {
                println!("  ERROR: {}", error);
            }
            for warning in &report.warnings {
                println!("  WARNING: {}", warning);
            }
            for info in &report.info {
                println!("  INFO: {}", info);
            }
            println!("{}", if report.is_valid() { "Valid" } else { "Invalid" });
            Ok(exit_code(report.is_valid()))
        }
        Commands::Focus { repository, focus, dry_run } => {
            let mut updater = ContextUpdater::open(&context_path);
            if !updater.add_current_focus(&repository, &focus) {
                anyhow::bail!("unknown repository '{}' in {}", repository, context_path.display());
            }

            match updater.save(dry_run)? {
                SaveOutcome::Unchanged => println!("No changes"),
                SaveOutcome::DryRun(changes) => {
                    println!("Dry run, changes that would be made:");
                    for change in &changes {
                        println!("  - {}", change);
                    }
                }
                SaveOutcome::Written { changes, backup } => {
                    println!("Updated {} with {} change(s):", context_path.display(), changes.len());
                    for change in &changes {
                        println!("  - {}", change);
                    }
                    if let Some(backup) = backup {
                        println!("Backup: {}", backup.display());
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Rules => {
            println!("Enforcement: {:?}", catalog.enforcement_level());
            println!("Forbidden ({})", catalog.forbidden().len());
            for rule in catalog.forbidden() {
                println!("  {:<28} {:<8} {}", rule.name(), rule.severity().as_str(), rule.rule.message);
            }
            for output_type in catalog.output_types() {
                println!("Required for {}", output_type);
                for rule in catalog.required_for(output_type) {
                    println!("  {:<28} {}", rule.name(), rule.rule.message);
                }
            }
            println!("Exceptions ({})", catalog.exceptions().len());
            for ctx in catalog.exceptions() {
                println!("  {}", ctx.name);
            }
            println!("Transformations: {}", catalog.transforms().len());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            debug!("reading from stdin");
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn print_audit(report: &AuditReport) {
    for (path, matches) in &report.files {
        println!("{}", path.display());
        for m in matches {
            println!("  {}: [{}] '{}' in: {}", m.line, m.rule, m.matched, m.context);
        }
    }

    if report.is_clean() {
        println!("No time estimates found ({} files scanned)", report.files_scanned);
    } else {
        println!(
            "Found {} violation(s) in {} of {} files",
            report.total_violations(),
            report.files.len(),
            report.files_scanned
        );
    }
}

fn print_violations(violations: &[Violation]) {
    for v in violations {
        if v.evidence.is_empty() {
            println!("[{}] {}: {}", v.severity, v.rule, v.message);
        } else {
            println!("[{}] {}: {} ({})", v.severity, v.rule, v.message, v.evidence.join(", "));
        }
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
