use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use reqdoc::{Project, Report, domain::Severity};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Default, Parser)]
#[command(about = "Check the project for consistency problems")]
pub struct Validate {
    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Treat warnings as failures, regardless of configuration
    #[arg(long)]
    strict: bool,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,

    /// Only report issues located in this document
    #[arg(long, value_name = "DOCNAME")]
    document: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Summary,
}

impl Validate {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let project = super::load_project(root)?;
        let report = match &self.document {
            Some(docname) => project.validate().in_document(docname),
            None => project.validate(),
        };
        let strict = self.strict || project.config().strict;

        match self.output {
            OutputFormat::Table => self.output_table(&report, &project),
            OutputFormat::Json => output_json(&report, strict)?,
            OutputFormat::Summary => output_summary(&report),
        }

        // Exit with appropriate code
        if report.is_failure(strict) {
            std::process::exit(2);
        }

        Ok(())
    }

    fn output_table(&self, report: &Report, project: &Project) {
        if self.quiet {
            for issue in report.with_severity(Severity::Error) {
                eprintln!("{}", format!("error: {issue}").error());
            }
            return;
        }

        println!("Validating project...\n");

        for issue in &report.issues {
            let line = format!("{}: {issue}", issue.severity());
            match issue.severity() {
                Severity::Warning => println!("{}", line.warning()),
                Severity::Error => println!("{}", line.error()),
            }
        }

        let errors = report.with_severity(Severity::Error).count();
        let warnings = report.with_severity(Severity::Warning).count();

        if report.is_clean() {
            println!(
                "{}",
                format!(
                    "✓ {} requirements in {} documents, 0 issues",
                    project.registry().len(),
                    project.documents().len()
                )
                .success()
            );
        } else {
            println!(
                "\n{}",
                format!("Summary: {errors} errors, {warnings} warnings").warning()
            );
        }
    }
}

fn output_json(report: &Report, strict: bool) -> anyhow::Result<()> {
    use serde_json::json;

    let errors = report.with_severity(Severity::Error).count();
    let warnings = report.with_severity(Severity::Warning).count();

    let issues: Vec<_> = report
        .issues
        .iter()
        .map(|issue| {
            let mut value = serde_json::to_value(issue)?;
            value["severity"] = json!(issue.severity());
            Ok(value)
        })
        .collect::<Result<_, serde_json::Error>>()
        .context("failed to render json output")?;

    let output = json!({
        "status": if report.is_failure(strict) { "failed" } else if report.is_clean() { "healthy" } else { "warnings" },
        "issues": issues,
        "summary": {
            "total_issues": report.issues.len(),
            "errors": errors,
            "warnings": warnings,
        }
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_summary(report: &Report) {
    let errors = report.with_severity(Severity::Error).count();
    let warnings = report.with_severity(Severity::Warning).count();
    println!("errors={errors} warnings={warnings}");
}
