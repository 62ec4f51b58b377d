use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use reqdoc::Requirement;
use tracing::instrument;

use super::terminal::{self, Colorize};

#[derive(Debug, Parser)]
#[command(about = "List all requirements in registration order")]
pub struct List {
    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Print identifiers only
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let project = super::load_project(root)?;
        let requirements = project.registry().list_all();

        match self.output {
            OutputFormat::Table => render_table(requirements, self.quiet),
            OutputFormat::Json => render_json(requirements)?,
        }

        Ok(())
    }
}

const HEADERS: [&str; 4] = ["ID", "Location", "Derived from", "Description"];

fn render_table(requirements: &[Requirement], quiet: bool) {
    if quiet {
        for requirement in requirements {
            println!("{}", requirement.id());
        }
        return;
    }

    if requirements.is_empty() {
        println!("{}", "No requirements found".dim());
        return;
    }

    let data: Vec<[String; 3]> = requirements
        .iter()
        .map(|requirement| {
            [
                requirement.id().to_string(),
                requirement.location().to_string(),
                requirement
                    .derived_from()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            ]
        })
        .collect();

    // Determine column widths for alignment.
    let widths: Vec<usize> = (0..3)
        .map(|idx| {
            data.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(HEADERS[idx].len())
        })
        .collect();

    let used: usize = widths.iter().map(|w| w + 2).sum();
    let description_width = terminal::terminal_width()
        .map_or(usize::MAX, |w| w.saturating_sub(used).max(HEADERS[3].len()));

    for (header, width) in HEADERS.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!("{}", HEADERS[3]);

    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!("{:-<1$}", "", HEADERS[3].len());

    for (row, requirement) in data.iter().zip(requirements) {
        for (value, width) in row.iter().zip(&widths) {
            print!("{value:<width$}  ");
        }
        println!(
            "{}",
            terminal::truncate(requirement.description(), description_width)
        );
    }
}

fn render_json(requirements: &[Requirement]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(std::io::stdout(), requirements)
        .context("failed to render json output")?;
    println!();
    Ok(())
}
