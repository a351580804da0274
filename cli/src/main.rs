use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use ifr_menu_core::validate_document;
use ifr_menu_parser::batch::{BatchConfig, build_report_bundle, import_batch};
use ifr_menu_parser::config::{ImportConfig, TitleDelimiter};
use ifr_menu_parser::output::{OutputFormat, format_document, format_report};
use ifr_menu_parser::{import_file, load_document};
use tracing_subscriber::EnvFilter;

const BATCH_REPORT_STEM: &str = "import-report";
const BATCH_REPORT_FILE: &str = "import-report.json";

#[derive(Debug, Parser)]
#[command(name = "ifr-import", version)]
#[command(about = "Import IFR setup-menu dumps into menu documents")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import one IFR dump file.
    Import(ImportArgs),
    /// Import several dump files in parallel into a directory.
    Batch(BatchArgs),
    /// Validate one or more menu document JSON files.
    Validate(ValidateArgs),
}

/// Settings that override the config file.
#[derive(Debug, Args)]
struct ConfigArgs {
    /// YAML import configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Document title shown by the renderer.
    #[arg(long)]
    title: Option<String>,
    /// Renderer theme name.
    #[arg(long)]
    theme: Option<String>,
    /// How form titles are delimited on `Form:` lines.
    #[arg(long, value_enum)]
    title_delimiter: Option<TitleDelimiter>,
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// IFR dump text file.
    #[arg(short, long)]
    input: PathBuf,
    /// Output file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[command(flatten)]
    config: ConfigArgs,
    /// Output format.
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,
    /// Also write the import report as JSON to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// IFR dump text files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Directory receiving one document per dump plus the batch report.
    #[arg(long)]
    output_dir: PathBuf,
    #[command(flatten)]
    config: ConfigArgs,
    /// Number of parallel import jobs (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
    /// Output format for document files.
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Menu document JSON files.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Import(args) => run_import(args),
        Command::Batch(args) => run_batch(args),
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(args: &ConfigArgs) -> Result<ImportConfig, String> {
    let mut config = match &args.config {
        Some(path) => ImportConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => ImportConfig::default(),
    };

    if let Some(title) = &args.title {
        config.document.title = title.clone();
    }
    if let Some(theme) = &args.theme {
        config.document.theme = theme.clone();
    }
    if let Some(delimiter) = args.title_delimiter {
        config.parser.title_delimiter = delimiter;
    }
    Ok(config)
}

fn run_import(args: ImportArgs) -> Result<(), String> {
    let config = load_config(&args.config)?;
    let run = import_file(&args.input, &config)
        .map_err(|err| format!("Failed to import '{}': {err}", args.input.display()))?;

    if let Some(report_path) = &args.report {
        let raw = format_report(&run.report, OutputFormat::Json)?;
        write_file(report_path, &raw)?;
    }

    let Some(document) = run.result.document else {
        return Err(format!(
            "No forms found in '{}'; nothing written",
            args.input.display()
        ));
    };

    let raw = format_document(&document, args.format)?;
    match &args.output {
        Some(path) => {
            write_file(path, &raw)?;
            println!(
                "Imported {} form(s) ({} tab(s)) into '{}'.",
                document.form_count(),
                document.tabs.len(),
                path.display()
            );
        }
        None => println!("{raw}"),
    }

    if !run.result.warnings.is_empty() {
        eprintln!(
            "{} warning(s) emitted during import.",
            run.result.warnings.len()
        );
    }

    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<(), String> {
    let config = BatchConfig {
        import: load_config(&args.config)?,
        jobs: args.jobs,
    };
    let outcome = import_batch(&args.inputs, &config).map_err(|err| err.to_string())?;

    fs::create_dir_all(&args.output_dir).map_err(|err| {
        format!(
            "Failed to create output directory '{}': {err}",
            args.output_dir.display()
        )
    })?;

    let ext = args.format.extension();
    let mut used_stems = reserved_stems(ext);
    let mut written = 0usize;
    for imported in &outcome.documents {
        let stem = unique_stem(&imported.path, &mut used_stems);
        let path = args.output_dir.join(format!("{stem}.{ext}"));
        let raw = format_document(&imported.document, args.format)?;
        write_file(&path, &raw)?;
        written += 1;
    }

    println!("Imported and wrote {written} document(s).");

    let bundle = build_report_bundle(outcome.reports, outcome.failures.clone());
    let raw = serde_json::to_string_pretty(&bundle)
        .map_err(|err| format!("Failed to serialize import report: {err}"))?;
    write_file(&args.output_dir.join(BATCH_REPORT_FILE), &raw)?;

    if !outcome.failures.is_empty() {
        eprintln!(
            "{} import failure(s): {}",
            outcome.failures.len(),
            outcome.failures.join(", ")
        );
    }
    if !outcome.warnings.is_empty() {
        eprintln!("{} warning(s) emitted during import.", outcome.warnings.len());
    }

    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut invalid = 0usize;

    for path in &args.files {
        let document = load_document(path).map_err(|err| err.to_string())?;
        let errors = validate_document(&document);
        if errors.is_empty() {
            continue;
        }
        invalid += 1;
        for error in errors {
            eprintln!("{}: {error}", path.display());
        }
    }

    if invalid > 0 {
        return Err(format!(
            "{invalid} of {} document(s) failed validation",
            args.files.len()
        ));
    }

    println!("Validated {} document(s).", args.files.len());
    Ok(())
}

/// Stems a document may not take because the batch report owns that file name.
fn reserved_stems(ext: &str) -> HashSet<String> {
    let mut reserved = HashSet::new();
    if format!("{BATCH_REPORT_STEM}.{ext}") == BATCH_REPORT_FILE {
        reserved.insert(BATCH_REPORT_STEM.to_string());
    }
    reserved
}

/// Picks an output stem for a dump, suffixing `-2`, `-3`, ... when two inputs
/// share a file stem.
fn unique_stem(path: &Path, used: &mut HashSet<String>) -> String {
    let base = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "menu".to_string());

    if used.insert(base.clone()) {
        return base;
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{base}-{suffix}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create output directory '{}': {err}",
                parent.display()
            )
        })?;
    }
    fs::write(path, contents).map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}
