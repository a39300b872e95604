//! @ai:module:intent CLI entry point for the annotation stripper
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on batch, config, pipeline, output

use clap::{ArgAction, Parser, ValueEnum};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use unannotate::{
    batch, output, transform_with, BatchOptions, BatchReport, EscapeSpelling, FileKind,
    FileOutcome, OutputFormat, SourceFile, StripConfig, WhitespacePolicy,
};

#[derive(Parser)]
#[command(name = "unannotate")]
#[command(author, version, about = "Strip selected annotations from Java sources without touching anything else")]
struct Cli {
    /// Files or directories to process; standard input is used when none are given
    paths: Vec<PathBuf>,

    /// Annotation name to remove, simple or fully qualified (repeatable)
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    names: Vec<String>,

    /// Regular expression matched against annotation names (repeatable)
    #[arg(short = 'p', long = "pattern", value_name = "REGEX")]
    patterns: Vec<String>,

    /// TOML configuration file; command-line values are applied on top
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also remove import declarations of matching names
    #[arg(long)]
    imports: bool,

    /// Rewrite files instead of printing the result
    #[arg(short, long)]
    in_place: bool,

    /// Fail if a name, pattern or path turned out to remove nothing
    #[arg(short, long)]
    strict: bool,

    /// Whitespace removed together with an annotation
    #[arg(long, value_enum)]
    whitespace: Option<Whitespace>,

    /// Spelling of Unicode escapes in retained text
    #[arg(long, value_enum)]
    escapes: Option<Escapes>,

    /// Worker threads (defaults to one per core)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Report format
    #[arg(long, short, value_enum, default_value = "text")]
    format: Format,

    /// More log output (repeat for debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Whitespace {
    Exact,
    Line,
    Greedy,
}

impl From<Whitespace> for WhitespacePolicy {
    fn from(w: Whitespace) -> Self {
        match w {
            Whitespace::Exact => WhitespacePolicy::Exact,
            Whitespace::Line => WhitespacePolicy::Line,
            Whitespace::Greedy => WhitespacePolicy::Greedy,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Escapes {
    Original,
    Translated,
}

impl From<Escapes> for EscapeSpelling {
    fn from(e: Escapes) -> Self {
        match e {
            Escapes::Original => EscapeSpelling::Original,
            Escapes::Translated => EscapeSpelling::Translated,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "unannotate=warn",
        1 => "unannotate=info",
        _ => "unannotate=debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// @ai:intent Merge the configuration file with command-line values
fn load_config(cli: &Cli) -> unannotate::Result<StripConfig> {
    let mut config = match &cli.config {
        Some(path) => StripConfig::load(path)?,
        None => StripConfig::default(),
    };

    config.extend_targets(cli.names.iter().cloned(), cli.patterns.iter().cloned());
    config.strict |= cli.strict;
    config.rewrite.imports |= cli.imports;

    if let Some(whitespace) = cli.whitespace {
        config.rewrite.whitespace = whitespace.into();
    }
    if let Some(escapes) = cli.escapes {
        config.rewrite.escapes = escapes.into();
    }
    if cli.jobs.is_some() {
        config.jobs = cli.jobs;
    }

    Ok(config)
}

/// @ai:intent Transform standard input to standard output
fn run_stdin(
    targets: &unannotate::TargetSet,
    options: &BatchOptions,
) -> unannotate::Result<BatchReport> {
    let mut content = String::new();
    std::io::stdin().read_to_string(&mut content)?;

    let source = SourceFile {
        path: PathBuf::from("<stdin>"),
        root: PathBuf::from("<stdin>"),
    };
    let result = transform_with(&content, targets, FileKind::default(), &options.options);

    if let Ok(transformed) = &result {
        print!("{}", output::format_source(None, &transformed.text));
    }

    Ok(BatchReport::new(
        vec![FileOutcome::new(&source, result, false)],
        targets,
        &[],
    ))
}

fn run(cli: &Cli) -> unannotate::Result<ExitCode> {
    let config = load_config(cli)?;
    let targets = config.targets()?;

    if targets.is_empty() {
        return Err(unannotate::Error::NoTargets);
    }

    let options = BatchOptions {
        options: config.options(),
        in_place: cli.in_place,
        jobs: config.jobs.unwrap_or(BatchOptions::default().jobs),
    };

    let report = if cli.paths.is_empty() {
        if cli.in_place {
            return Err(unannotate::Error::NoInput);
        }
        run_stdin(&targets, &options)?
    } else {
        let report = batch::run(&cli.paths, &targets, &options)?;

        for file in &report.files {
            if let Some(text) = &file.text {
                print!("{}", output::format_source(Some(file.path.as_path()), text));
            }
        }

        report
    };

    let formatted = output::format_report(&report, cli.format.into(), config.strict);
    if cli.in_place {
        print!("{}", formatted);
    } else {
        eprint!("{}", formatted);
    }

    if !report.passed() {
        Ok(ExitCode::from(2))
    } else if config.strict && report.has_strict_violations() {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            match e {
                unannotate::Error::NoTargets | unannotate::Error::NoInput => ExitCode::from(1),
                _ => ExitCode::from(2),
            }
        }
    }
}
