use std::path::PathBuf;

use clap::Parser;
use reqdoc::{
    domain::Severity,
    render::render_project,
    storage::write_pages,
};
use tracing::instrument;

use super::{show::Format, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Render every document and the index page")]
pub struct Build {
    /// Output directory [default: <root>/_build]
    #[arg(long, short, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Format of requirement tables
    #[arg(long, value_name = "FORMAT", default_value = "markdown")]
    tables: Format,
}

impl Build {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let project = super::load_project(root)?;
        let out = self.out.unwrap_or_else(|| project.root().join("_build"));

        for error in project.directive_errors() {
            tracing::error!("{error}");
        }

        let site = render_project(&project, self.tables.into());
        let written = write_pages(&out, &site.pages)?;

        println!(
            "{}",
            format!("✓ Wrote {} pages to {}", written.len(), out.display()).success()
        );

        let report = project.validate();
        let strict = project.config().strict;
        if !site.unresolved.is_empty() {
            println!(
                "{}",
                format!("{} unresolved references", site.unresolved.len()).warning()
            );
        }
        let errors = report.with_severity(Severity::Error).count();
        if errors > 0 {
            println!("{}", format!("{errors} errors, run 'reqdoc validate' for details").error());
        }

        if report.is_failure(strict) {
            std::process::exit(2);
        }

        Ok(())
    }
}
