use std::path::PathBuf;

use clap::Parser;
use reqdoc::{Renderer, TableFormat};
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Render the table of a single requirement")]
pub struct Show {
    /// The identifier of the requirement to display
    id: String,

    /// Table format
    #[arg(long, value_name = "FORMAT", default_value = "markdown")]
    format: Format,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum Format {
    #[default]
    Markdown,
    Html,
}

impl From<Format> for TableFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Markdown => Self::Markdown,
            Format::Html => Self::Html,
        }
    }
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let project = super::load_project(root)?;

        let Some(requirement) = project.registry().resolve(&self.id) else {
            eprintln!("Requirement {} not found", self.id);
            std::process::exit(1);
        };

        let renderer = Renderer::new(project.resolver(), self.format.into());
        let rendered = renderer.requirement(requirement);

        print!("{}", rendered.content);
        Ok(())
    }
}
