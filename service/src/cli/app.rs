//! Main CLI application logic

use super::types::{ContentModelCli, ContentModelCommand, OutputFormat};
use crate::config::load_content_model_config;
use crate::host::ConfigDirectoryHost;
use crate::kinds::FieldKindRegistry;
use crate::provision::{
    ApplyMode, ApplyReport, FieldIssue, Provisioner, TypeDeletion, ValidationReport, validate_model,
};
use crate::sheet::ModelExtractor;
use calamine::{Data, Range};
use clap::Parser;
use colored::Colorize;
use content_model_core::config::ContentModelConfig;
use content_model_core::error::{ContentModelError, Result};
use content_model_core::types::{ContentModel, FieldDefinition};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Main CLI application
pub struct ContentModelApp {
    cli: ContentModelCli,
}

impl ContentModelApp {
    /// Create the application from command line arguments
    #[must_use]
    pub fn from_args() -> Self {
        Self {
            cli: ContentModelCli::parse(),
        }
    }

    /// Create the application from an already parsed command line
    #[must_use]
    pub fn new(cli: ContentModelCli) -> Self {
        Self { cli }
    }

    /// Run the CLI application
    ///
    /// # Errors
    ///
    /// Returns the error of the command that failed.
    pub async fn run(self) -> Result<()> {
        self.init_logging();
        info!("Starting content model CLI");

        match self.execute_command().await {
            Ok(()) => {
                info!("Command completed successfully");
                Ok(())
            }
            Err(err) => {
                error!("Command failed: {}", err);
                if !self.cli.quiet {
                    self.print_error(&err);
                }
                Err(err)
            }
        }
    }

    /// Configure tracing subscriber based on CLI flags; `RUST_LOG` wins when set
    fn init_logging(&self) {
        let builder = tracing_subscriber::fmt()
            .with_target(false)
            .with_writer(std::io::stderr);

        let result = if std::env::var_os("RUST_LOG").is_some() {
            builder.with_env_filter(EnvFilter::from_default_env()).try_init()
        } else if self.cli.quiet {
            builder.with_max_level(tracing::Level::ERROR).try_init()
        } else if self.cli.verbose {
            builder.with_max_level(tracing::Level::DEBUG).try_init()
        } else {
            builder.with_max_level(tracing::Level::INFO).try_init()
        };

        if result.is_err() {
            eprintln!("Logging was already initialised");
        }
    }

    async fn execute_command(&self) -> Result<()> {
        let config = self.load_config()?;

        match &self.cli.command {
            ContentModelCommand::ShowFields { content_type } => {
                let model = self.load_model(&config).await?;
                self.show_fields(&model, content_type)
            }
            ContentModelCommand::CreateType { types } => {
                self.provision(&config, types, ApplyMode::TypeOnly).await
            }
            ContentModelCommand::CreateTypeWithFields { types } => {
                self.provision(&config, types, ApplyMode::TypeWithFields)
                    .await
            }
            ContentModelCommand::CreateTypeFields { types } => {
                self.provision(&config, types, ApplyMode::FieldsOnly).await
            }
            ContentModelCommand::DeleteTypes { types } => self.delete(&config, types),
            ContentModelCommand::Validate => {
                let model = self.load_model(&config).await?;
                self.validate(&config, &model)
            }
            ContentModelCommand::Report => {
                let model = self.load_model(&config).await?;
                self.report(&model)
            }
        }
    }

    fn load_config(&self) -> Result<ContentModelConfig> {
        let mut config = load_content_model_config(self.cli.config.as_deref())?;
        if let Some(workbook) = &self.cli.workbook {
            config.workbook.path = Some(workbook.clone());
        }
        if let Some(sheet) = &self.cli.sheet {
            config.workbook.sheet_name.clone_from(sheet);
        }
        config.validate()?;
        Ok(config)
    }

    async fn load_model(&self, config: &ContentModelConfig) -> Result<ContentModel> {
        let path = config.workbook.path.as_deref().ok_or_else(|| {
            ContentModelError::config("no workbook given: pass --workbook or set workbook.path")
        })?;
        if !path.exists() {
            return Err(ContentModelError::io_error(format!(
                "Workbook not found: {}",
                path.display()
            )));
        }

        let extractor = ModelExtractor::new(config.workbook.clone());
        let sheet = read_sheet(&extractor, path).await?;
        extractor.extract_model(&sheet)
    }

    fn open_host(&self, config: &ContentModelConfig) -> Result<ConfigDirectoryHost> {
        let target = self.cli.target.as_deref().ok_or_else(|| {
            ContentModelError::config("no target given: pass --target <config directory>")
        })?;
        Ok(ConfigDirectoryHost::open(target, &config.provisioner.entity_kind)?
            .dry_run(self.cli.dry_run))
    }

    async fn provision(
        &self,
        config: &ContentModelConfig,
        names: &[String],
        mode: ApplyMode,
    ) -> Result<()> {
        let model = self.load_model(config).await?;
        let schemas = names
            .iter()
            .map(|name| model.get(name))
            .collect::<Result<Vec<_>>>()?;

        let mut host = self.open_host(config)?;
        let mut provisioner = Provisioner::new(
            &mut host,
            config.provisioner.clone(),
            FieldKindRegistry::builtin(),
        );

        let progress = self.progress_bar(schemas.len());
        let mut report = ApplyReport::default();
        for schema in schemas {
            progress.set_message(schema.definition.name.clone());
            let outcome = provisioner.apply(schema, mode);
            progress.inc(1);
            match outcome {
                Ok(outcome) => report.types.push(outcome),
                Err(e) => {
                    progress.abandon();
                    return Err(e);
                }
            }
        }
        progress.finish_and_clear();

        self.emit(&report, || render_apply_report(&report))?;
        self.print_dry_run(&host);
        Ok(())
    }

    fn delete(&self, config: &ContentModelConfig, names: &[String]) -> Result<()> {
        let mut host = self.open_host(config)?;
        let mut provisioner = Provisioner::new(
            &mut host,
            config.provisioner.clone(),
            FieldKindRegistry::builtin(),
        );
        let deletions = provisioner.delete_types(names)?;

        self.emit(&deletions, || render_deletions(&deletions))?;
        self.print_dry_run(&host);
        Ok(())
    }

    fn show_fields(&self, model: &ContentModel, content_type: &str) -> Result<()> {
        let schema = model.get(content_type)?;
        self.emit(&schema.fields, || {
            let mut out = format!(
                "{} ({} fields)\n",
                schema.definition.label.bold(),
                schema.fields.len()
            );
            for field in &schema.fields {
                out.push_str(&render_field(field));
            }
            out
        })
    }

    fn validate(&self, config: &ContentModelConfig, model: &ContentModel) -> Result<()> {
        let report = validate_model(model, &FieldKindRegistry::builtin(), &config.provisioner);
        self.emit(&report, || render_validation(&report))?;

        if report.is_valid() {
            return Ok(());
        }
        Err(ContentModelError::InvalidSheet {
            issues: report
                .issues
                .iter()
                .map(FieldIssue::to_row_issue)
                .collect(),
        })
    }

    fn report(&self, model: &ContentModel) -> Result<()> {
        let kinds = FieldKindRegistry::builtin();
        self.emit(model, || {
            let mut out = String::new();
            for schema in model.types.values() {
                let definition = &schema.definition;
                let _ = writeln!(
                    out,
                    "{} {} (template {}, row {})",
                    definition.name.bold(),
                    definition.label,
                    definition.base_type,
                    definition.source_row
                );
                if !definition.description.is_empty() {
                    let _ = writeln!(out, "  {}", definition.description.dimmed());
                }
                for field in &schema.fields {
                    out.push_str(&render_field(field));
                    let storage = match kinds.resolve(field) {
                        Ok(mapping) => mapping.storage_type.green().to_string(),
                        Err(_) => "unmapped".red().to_string(),
                    };
                    let _ = writeln!(out, "        storage: {storage}");
                }
            }
            let _ = write!(
                out,
                "{} types, {} fields",
                model.types.len(),
                model.field_count()
            );
            out
        })
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if self.cli.quiet || self.cli.format != OutputFormat::Pretty {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }

    /// Print `value` as JSON or YAML, or the pretty rendering
    fn emit<T: Serialize + ?Sized>(&self, value: &T, pretty: impl FnOnce() -> String) -> Result<()> {
        let rendered = match self.cli.format {
            OutputFormat::Pretty => pretty(),
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
        };
        println!("{rendered}");
        Ok(())
    }

    fn print_dry_run(&self, host: &ConfigDirectoryHost) {
        if !self.cli.dry_run || self.cli.quiet {
            return;
        }
        eprintln!("{}", "Dry run: nothing was written".yellow().bold());
        for (file, write) in host.pending_changes() {
            let action = if write { "write" } else { "delete" };
            eprintln!("  {action:<6} {}", host.root().join(file).display());
        }
    }

    fn print_error(&self, err: &ContentModelError) {
        if let ContentModelError::InvalidSheet { issues } = err {
            eprintln!(
                "{} {} problem(s) in the content model:",
                "Error:".red().bold(),
                issues.len()
            );
            for issue in issues {
                eprintln!("  {issue}");
            }
        } else {
            eprintln!("{} {err}", "Error:".red().bold());
        }
    }
}

async fn read_sheet(extractor: &ModelExtractor, path: &Path) -> Result<Range<Data>> {
    let is_xlsx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "xlsx" | "xlsm"));

    if is_xlsx {
        let bytes = tokio::fs::read(path).await?;
        extractor.sheet_from_bytes(bytes)
    } else {
        extractor.open_sheet(path)
    }
}

fn render_field(field: &FieldDefinition) -> String {
    let required = if field.required {
        "required".yellow().to_string()
    } else {
        "optional".to_string()
    };
    format!(
        "  {:>4}  {:<32} {:<24} {:<8} x{:<3} {:<8} weight {}\n",
        field.source_row,
        field.name,
        field.type_tag,
        required,
        field.cardinality,
        field.group,
        field.weight
    )
}

fn render_apply_report(report: &ApplyReport) -> String {
    let mut out = String::new();
    for outcome in &report.types {
        let status = match &outcome.handle {
            Some(handle) if handle.created => "created",
            Some(_) => "updated",
            None => "fields",
        };
        let _ = writeln!(
            out,
            "{} {} ({status}, {} fields)",
            "✓".green(),
            outcome.name.bold(),
            outcome.fields.len()
        );
        for skipped in &outcome.skipped {
            let _ = writeln!(
                out,
                "  {} {} (row {}): {}",
                "skipped".yellow(),
                skipped.field,
                skipped.row,
                skipped.reason
            );
        }
    }
    let _ = write!(
        out,
        "{} types, {} fields provisioned",
        report.types.len(),
        report.field_count()
    );
    out
}

fn render_deletions(deletions: &[TypeDeletion]) -> String {
    deletions
        .iter()
        .map(|deletion| {
            if deletion.deleted {
                format!("{} deleted {}", "✓".green(), deletion.name)
            } else {
                format!("{} {} does not exist", "-".yellow(), deletion.name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_validation(report: &ValidationReport) -> String {
    if report.is_valid() {
        return format!("{} {} fields checked, all valid", "✓".green(), report.checked);
    }
    let mut out = String::new();
    for issue in &report.issues {
        let _ = writeln!(
            out,
            "{} {}.{} (row {}, '{}'): {}",
            "✗".red(),
            issue.content_type,
            issue.field,
            issue.row,
            issue.type_tag,
            issue.message
        );
    }
    let _ = write!(
        out,
        "{} of {} fields failed",
        report.issues.len(),
        report.checked
    );
    out
}
