// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ifc-carbon` - embodied-carbon report for an IFC building model

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ifc_carbon_core::{assess, CarbonConfig, MaterialDatabase, NameMatching};
use ifc_carbon_model::IfcParser;
use ifc_carbon_parser::{ElementExtractor, StepParser};
use ifc_carbon_report::{to_json, ReportGenerator};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Embodied-carbon assessment of IFC building models
#[derive(Parser, Debug)]
#[command(name = "ifc-carbon", version)]
#[command(about = "Embodied-carbon assessment of IFC building models", long_about = None)]
struct Args {
    /// IFC model to assess
    model: PathBuf,

    /// Reference material database
    #[arg(short, long)]
    database: PathBuf,

    /// Output directory [default: reports/<model name>]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Artifacts to write
    #[arg(short, long, value_enum, default_value_t = OutputFormat::All)]
    format: OutputFormat,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Markdown template replacing the built-in one
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Match material names case-sensitively
    #[arg(long)]
    exact_names: bool,

    /// Tolerance when comparing carbon per volume
    #[arg(long)]
    tolerance: Option<f64>,

    /// Database field delimiter
    #[arg(long)]
    delimiter: Option<char>,

    /// First token of every database material id
    #[arg(long)]
    id_prefix: Option<String>,

    /// Log more detail (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
    All,
}

impl OutputFormat {
    fn markdown(self) -> bool {
        matches!(self, OutputFormat::Markdown | OutputFormat::All)
    }

    fn json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::All)
    }
}

impl Args {
    /// Configuration file values with command-line overrides applied
    fn config(&self) -> Result<CarbonConfig> {
        let mut config = match &self.config {
            Some(path) => CarbonConfig::load(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => CarbonConfig::default(),
        };
        if self.exact_names {
            config = config.with_name_matching(NameMatching::Exact);
        }
        if let Some(tolerance) = self.tolerance {
            config = config.with_tolerance(tolerance);
        }

        let mut format = config.database.clone();
        if let Some(delimiter) = self.delimiter {
            format = format.with_delimiter(delimiter);
        }
        if let Some(prefix) = &self.id_prefix {
            format = format.with_id_prefix(prefix.as_str());
        }
        Ok(config.with_database_format(format))
    }

    fn output_dir(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let stem = self
                .model
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "model".to_string());
            Path::new("reports").join(stem)
        })
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Rendered artifacts, written only once everything succeeded
struct Artifacts {
    files: Vec<(&'static str, String)>,
}

fn run(args: &Args) -> Result<Artifacts> {
    let config = args.config()?;

    tracing::info!("Reading {}", args.model.display());
    let content = std::fs::read_to_string(&args.model)
        .with_context(|| format!("Failed to read {}", args.model.display()))?;
    let model = StepParser::new()
        .parse(&content)
        .with_context(|| format!("Failed to parse {}", args.model.display()))?;

    let mut extractor = ElementExtractor::new(model.as_ref());
    if let Some(name) = args.model.file_name() {
        extractor = extractor.with_source_file(name.to_string_lossy());
    }
    let building = extractor.extract()?;

    let database = MaterialDatabase::load(&args.database, &config.database, config.name_matching)
        .with_context(|| format!("Failed to load database {}", args.database.display()))?;

    let assessment = assess(&building, &database, &config)?;

    let mut files = Vec::new();
    if args.format.markdown() {
        let generator = match &args.template {
            Some(path) => ReportGenerator::from_template_file(path)
                .with_context(|| format!("Failed to read template {}", path.display()))?,
            None => ReportGenerator::new(),
        };
        files.push(("report.md", generator.render(&assessment)?));
    }
    if args.format.json() {
        files.push(("assessment.json", to_json(&assessment)?));
    }

    Ok(Artifacts { files })
}

fn write_artifacts(dir: &Path, artifacts: Artifacts) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    for (name, content) in artifacts.files {
        let path = dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Wrote {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let artifacts = run(&args)?;
    write_artifacts(&args.output_dir(), artifacts)
}
