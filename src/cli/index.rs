use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use reqdoc::{Renderer, TableFormat};
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Show the requirement index, grouped by first character")]
pub struct Index {
    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "markdown")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl Index {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let project = super::load_project(root)?;
        let index = project.index();

        match self.output {
            OutputFormat::Markdown => {
                let renderer = Renderer::new(project.resolver(), TableFormat::Markdown);
                print!(
                    "{}",
                    renderer.index_page(&index, project.config().index_title())
                );
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), &index)
                    .context("failed to render json output")?;
                println!();
            }
        }

        Ok(())
    }
}
