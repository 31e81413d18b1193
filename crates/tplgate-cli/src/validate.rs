//! # Validate Subcommand
//!
//! Registers every descriptor in the given files, in argument order, as
//! one registry session and renders the resulting report.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use semver::Version;
use tplgate_registry::{TemplateRegistry, ValidationReport};
use tplgate_schema::JsonSchemaValidator;

use crate::load::{as_batch, load_document};

/// Report rendering.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per error, then a summary.
    #[default]
    Text,
    /// The full report as pretty-printed JSON.
    Json,
}

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Element template files (JSON, or YAML with a .yaml/.yml extension).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Element template JSON Schema. Defaults to the bundled schema.
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Highest supported schema version. Defaults to the version in the schema `$id`.
    #[arg(long, value_parser = parse_version)]
    pub supported_version: Option<Version>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

fn parse_version(s: &str) -> Result<Version, semver::Error> {
    Version::parse(s)
}

/// Build the schema validator described by `args`.
pub fn build_validator(args: &ValidateArgs) -> anyhow::Result<JsonSchemaValidator> {
    let validator = match (&args.schema, &args.supported_version) {
        (Some(path), version) => JsonSchemaValidator::from_file(path, version.clone())?,
        (None, None) => JsonSchemaValidator::bundled()?,
        (None, Some(version)) => {
            let schema: serde_json::Value = serde_json::from_str(tplgate_schema::BUNDLED_SCHEMA)
                .context("bundled schema is not valid JSON")?;
            JsonSchemaValidator::new(&schema, version.clone())?
        }
    };
    Ok(validator)
}

/// Load and register every file named in `args`.
///
/// A file that cannot be read or parsed is recorded as an invalid batch
/// and the remaining files are still processed.
///
/// # Errors
///
/// Fails only if the schema cannot be loaded.
pub fn validate_files(args: &ValidateArgs) -> anyhow::Result<ValidationReport> {
    let validator = build_validator(args)?;
    tracing::info!(
        schema = %validator.schema_name(),
        files = args.files.len(),
        "validating element templates"
    );

    let mut registry = TemplateRegistry::new(validator);
    for path in &args.files {
        match load_document(path) {
            Ok(document) => {
                tracing::debug!(path = %path.display(), "loaded template file");
                registry.add_all_json(as_batch(document));
            }
            Err(e) => registry.reject_batch(e.to_string()),
        }
    }

    Ok(registry.report())
}

/// Render a report in the requested format.
pub fn render(report: &ValidationReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("failed to serialize report")
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for error in &report.errors {
                out.push_str(&error.to_string());
                out.push('\n');
            }
            out.push_str(&format!(
                "{} template(s) accepted, {} rejected",
                report.accepted.len(),
                report.rejected
            ));
            let invalid_batches = report.invalid_batches();
            if invalid_batches > 0 {
                out.push_str(&format!(", {invalid_batches} invalid batch(es)"));
            }
            out.push_str(&format!(
                " (schema version <= {})",
                report.supported_schema_version
            ));
            Ok(out)
        }
    }
}
