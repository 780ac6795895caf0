//! CLI for `oastatic` (C15, ambient).
//!
//! Thin wrapper over the library API: load a [`ProjectConfig`], run
//! [`oastatic_gen::generate`], emit the result. The library returns typed
//! [`oastatic_gen::Error`]s; this binary is the one place they get wrapped in
//! [`anyhow::Error`] with file-path context, per the library/CLI error
//! boundary (§7).

#![forbid(unsafe_code)]

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use oastatic_core::Severity;
use oastatic_gen::{emit, OutputFormat, ProjectConfig};

/// Static `OpenAPI` 3.x specification generator for decorator-based HTTP
/// frameworks.
#[derive(Parser)]
#[command(name = "oastatic", version, about)]
enum Cli {
    /// Analyze a project and emit an `OpenAPI` document.
    Generate(GenerateArgs),

    /// Analyze a project and report broken references without writing a
    /// document.
    Validate(ValidateArgs),
}

#[derive(Parser)]
struct GenerateArgs {
    /// Path to the `oastatic` project config YAML.
    #[arg(short, long, default_value = "oastatic.yaml")]
    config: PathBuf,

    /// Write the document here instead of `config`'s `output` field.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail (nonzero exit) if C11 found any broken `$ref`s.
    #[arg(long)]
    fail_on_broken_refs: bool,
}

#[derive(Parser)]
struct ValidateArgs {
    /// Path to the `oastatic` project config YAML.
    #[arg(short, long, default_value = "oastatic.yaml")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli {
        Cli::Generate(args) => run_generate(&args),
        Cli::Validate(args) => run_validate(&args),
    }
}

fn run_generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;
    let project_root = project_root(&args.config);

    let outcome = oastatic_gen::generate(&config, &project_root)
        .with_context(|| format!("generation failed for {}", args.config.display()))?;

    report_diagnostics(&outcome.diagnostics);

    let broken = outcome
        .diagnostics
        .iter()
        .filter(|d| d.code == "missing-schema")
        .count();
    if args.fail_on_broken_refs && broken > 0 {
        bail!("{broken} broken schema reference(s) found");
    }

    let format = OutputFormat::from(config.format);
    let rendered = emit(&outcome.document, format).context("failed to serialize document")?;

    let output_path = args.output.clone().or_else(|| config.output.clone().map(PathBuf::from));
    match output_path {
        Some(path) => {
            fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn run_validate(args: &ValidateArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;
    let project_root = project_root(&args.config);

    let outcome = oastatic_gen::generate(&config, &project_root)
        .with_context(|| format!("generation failed for {}", args.config.display()))?;

    report_diagnostics(&outcome.diagnostics);

    let broken = outcome
        .diagnostics
        .iter()
        .filter(|d| d.code == "missing-schema")
        .count();
    if broken > 0 {
        bail!("{broken} broken schema reference(s) found");
    }

    eprintln!("no broken references found");
    Ok(())
}

fn load_config(path: &std::path::Path) -> anyhow::Result<ProjectConfig> {
    ProjectConfig::load(path).with_context(|| format!("failed to load config: {}", path.display()))
}

/// The project root is the config file's parent directory — `files.entry`
/// and `files.tsconfig` are resolved relative to it.
fn project_root(config_path: &std::path::Path) -> PathBuf {
    config_path
        .parent()
        .map(std::path::Path::to_path_buf)
        .unwrap_or_default()
}

fn report_diagnostics(diagnostics: &[oastatic_core::Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Warning => eprintln!("warning[{}]: {}", diagnostic.code, diagnostic.message),
            Severity::Info => eprintln!("info[{}]: {}", diagnostic.code, diagnostic.message),
        }
    }
}
