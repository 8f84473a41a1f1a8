//! Extract the five statement tables from a token file.
//!
//! Reads a JSON token document, runs the table pipeline and prints a JSON
//! report with the detected direction, the sections found, the rows of every
//! table and the cross-table validation result.
//!
//! Usage:
//!   cargo run --release --bin extract_tables -- statement.tokens.json
//!   cargo run --release --bin extract_tables -- statement.tokens.json \
//!       --config overrides.json --header-employer "Acme Ltd" --output report.json
//!   cargo run --release --bin extract_tables -- statement.tokens.json --dump-lines --verbose

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde_json::{json, Map, Value};
use spatial_tables::document::TokenDocument;
use spatial_tables::layout::{render_lines, SectionId};
use spatial_tables::pipeline::{DocumentTables, PipelineConfig, TablePipeline};

struct CliConfig {
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    header_employer: Option<String>,
    output: Option<PathBuf>,
    dump_lines: bool,
    verbose: bool,
}

impl CliConfig {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut cli = Self {
            input: None,
            config: None,
            header_employer: None,
            output: None,
            dump_lines: false,
            verbose: false,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" => {
                    i += 1;
                    if i < args.len() {
                        cli.config = Some(PathBuf::from(&args[i]));
                    }
                },
                "--header-employer" => {
                    i += 1;
                    if i < args.len() {
                        cli.header_employer = Some(args[i].clone());
                    }
                },
                "--output" | "-o" => {
                    i += 1;
                    if i < args.len() {
                        cli.output = Some(PathBuf::from(&args[i]));
                    }
                },
                "--dump-lines" => {
                    cli.dump_lines = true;
                },
                "--verbose" | "-v" => {
                    cli.verbose = true;
                },
                other if !other.starts_with('-') && cli.input.is_none() => {
                    cli.input = Some(PathBuf::from(other));
                },
                other => {
                    eprintln!("Ignoring unknown argument: {}", other);
                },
            }
            i += 1;
        }

        cli
    }
}

fn print_usage() {
    eprintln!("Usage: extract_tables <tokens.json> [--config cfg.json] [--header-employer NAME]");
    eprintln!("                      [--output out.json] [--dump-lines] [--verbose]");
}

fn report(tables: &DocumentTables) -> Value {
    let mut by_table = Map::new();
    for id in SectionId::ALL {
        by_table.insert(
            id.to_string(),
            json!({
                "title": id.title(),
                "found": tables.section(id).is_some(),
                "rows": tables.rows(id),
            }),
        );
    }

    json!({
        "direction": tables.direction,
        "sections": tables.sections,
        "tables": by_table,
        "validation": tables.validation,
    })
}

fn run(cli: &CliConfig, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    let pipeline = TablePipeline::with_config(config);

    let mut document = TokenDocument::load(input)?;
    if let Some(employer) = &cli.header_employer {
        document.header_employer = Some(employer.clone());
    }
    log::info!(
        "Loaded {} tokens on {} pages from {}",
        document.tokens.len(),
        document.page_count(),
        input.display()
    );

    if cli.dump_lines {
        let lines = pipeline.lines(document.tokens.clone());
        eprint!("{}", render_lines(&lines));
    }

    let tables = pipeline.process_document(document);
    let json = serde_json::to_string_pretty(&report(&tables))?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)?;
            log::info!("Report written to {}", path.display());
        },
        None => println!("{}", json),
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = CliConfig::from_args();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let Some(input) = cli.input.clone() else {
        print_usage();
        return ExitCode::FAILURE;
    };

    match run(&cli, &input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
