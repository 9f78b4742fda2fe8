//! # tabxl-cli
//!
//! Command-line interface for converting HTML tables to xlsx or CSV.

mod config;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tabxl_sheet::{
    csv_rows, parse_document, parse_fragments_json, write_csv, ConversionReport, ConvertOptions,
    Diagnostics, ParsedTable, Warning, WorkbookWriter,
};
use tracing_subscriber::EnvFilter;

/// tabxl - HTML tables to spreadsheets
#[derive(Parser)]
#[command(name = "tabxl")]
#[command(author, version, about = "Convert HTML tables to xlsx or CSV", long_about = None)]
struct Cli {
    /// HTML page, or a JSON array of table HTML strings with --fragments
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (.xlsx or .csv)
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Output format (default: from the output file extension)
    #[arg(short = 'f', long = "format")]
    format: Option<OutputFormat>,

    /// Options file (.json, .yaml or .yml)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Treat INPUT as a JSON array of table fragments
    #[arg(long)]
    fragments: bool,

    /// Worksheet name, in table order (repeatable)
    #[arg(short = 's', long = "sheet-name", value_name = "NAME")]
    sheet_names: Vec<String>,

    /// Skip tables with this id (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "ID")]
    exclude: Vec<String>,

    /// Keep literal cell values instead of data-excel formulas
    #[arg(long)]
    no_formulas: bool,

    /// Fail on directive problems instead of warning
    #[arg(long)]
    strict: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// Excel workbook, one worksheet per table
    Xlsx,
    /// Single CSV file with every table
    Csv,
}

impl OutputFormat {
    fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx") => Ok(OutputFormat::Xlsx),
            Some("csv") => Ok(OutputFormat::Csv),
            _ => bail!(
                "Cannot infer output format from '{}'; use --format",
                path.display()
            ),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let options = build_options(&cli)?;
    let format = match cli.format {
        Some(format) => format,
        None => OutputFormat::from_path(&cli.output)?,
    };

    let input = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read input: {}", cli.input.display()))?;

    let mut diagnostics = Diagnostics::new();
    let tables = parse_input(&input, cli.fragments, &options, &mut diagnostics)?;
    if tables.is_empty() {
        bail!("No tables found in {}", cli.input.display());
    }
    tracing::info!(tables = tables.len(), "parsed input");

    match format {
        OutputFormat::Xlsx => {
            let report = WorkbookWriter::new(options)
                .save(&cli.output, &tables)
                .with_context(|| format!("Failed to write {}", cli.output.display()))?;
            print_warnings(diagnostics.warnings());
            print_report(&report, &cli.output);
        }
        OutputFormat::Csv => {
            let rows = csv_rows(&tables, &options);
            let file = std::fs::File::create(&cli.output)
                .with_context(|| format!("Failed to create {}", cli.output.display()))?;
            write_csv(std::io::BufWriter::new(file), &rows)
                .with_context(|| format!("Failed to write {}", cli.output.display()))?;
            print_warnings(diagnostics.warnings());
            println!(
                "{} {} rows to {}",
                "Wrote".green().bold(),
                rows.len(),
                cli.output.display()
            );
        }
    }

    Ok(())
}

/// Config file first, then command-line overrides.
fn build_options(cli: &Cli) -> Result<ConvertOptions> {
    let mut options = match &cli.config {
        Some(path) => config::load_options(path)?,
        None => ConvertOptions::default(),
    };

    if !cli.sheet_names.is_empty() {
        options.sheet_names.clone_from(&cli.sheet_names);
    }
    options.excluded_tables.extend(cli.exclude.iter().cloned());
    if cli.no_formulas {
        options.include_formulas = false;
    }
    if cli.strict {
        options.strict = true;
    }
    Ok(options)
}

fn parse_input(
    input: &str,
    fragments: bool,
    options: &ConvertOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<ParsedTable>> {
    let tables = if fragments {
        parse_fragments_json(
            input,
            &options.excluded_tables,
            options.strict,
            diagnostics,
        )
        .context("Failed to parse table fragments")?
    } else {
        parse_document(input, &options.excluded_tables, options.strict, diagnostics)
            .context("Failed to parse HTML")?
    };
    Ok(tables)
}

fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("{} {warning}", "Warning:".yellow().bold());
    }
}

fn print_report(report: &ConversionReport, output: &Path) {
    print_warnings(&report.warnings);
    println!(
        "{} {} worksheet(s) to {}: {}",
        "Wrote".green().bold(),
        report.sheets.len(),
        output.display(),
        report.sheets.join(", ")
    );
}
