use std::path::{Path, PathBuf};

mod build;
mod index;
mod list;
mod resolve;
mod show;
mod terminal;
mod trace;
mod validate;

use build::Build;
use clap::ArgAction;
use index::Index;
use list::List;
use reqdoc::{Config, Project, storage::config_path};
use resolve::Resolve;
use show::Show;
use trace::Trace;
use tracing::instrument;
use validate::Validate;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the source tree
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Validate(Validate::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Initialize a project configuration
    Init(Init),

    /// List all requirements in registration order
    List(List),

    /// Render the table of a single requirement
    Show(Show),

    /// Show the requirement index
    Index(Index),

    /// Resolve a requirement reference to a link
    Resolve(Resolve),

    /// Show the derivation lineage of a requirement
    ///
    /// Lists the chain of requirements it is derived from, and the
    /// requirements derived from it.
    Trace(Trace),

    /// Check the project for duplicate identifiers, dangling links, cycles,
    /// unresolved references and malformed directives (default)
    Validate(Validate),

    /// Render every document and the index page into an output directory
    Build(Build),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run(&root)?,
            Self::List(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::Index(command) => command.run(root)?,
            Self::Resolve(command) => command.run(root)?,
            Self::Trace(command) => command.run(root)?,
            Self::Validate(command) => command.run(root)?,
            Self::Build(command) => command.run(root)?,
        }
        Ok(())
    }
}

#[derive(Debug, Default, clap::Parser)]
pub struct Init {
    /// Suffix appended to document names in links
    #[arg(long, value_name = "SUFFIX")]
    link_suffix: Option<String>,

    /// Additional path component names to skip (can be specified multiple
    /// times)
    #[arg(long, value_name = "NAME")]
    exclude: Vec<String>,
}

impl Init {
    #[instrument(skip(self))]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        use terminal::Colorize;

        let config_path = config_path(root);
        if config_path.exists() {
            anyhow::bail!(
                "Project already initialized (found existing {})",
                config_path.display()
            );
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", parent.display()))?;
        }

        let mut config = Config::default();
        if let Some(suffix) = self.link_suffix {
            config.set_link_suffix(suffix);
        }
        for name in self.exclude {
            config.add_exclude(name);
        }

        config
            .save(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

        println!(
            "{}",
            format!("Initialized project in {}", root.display()).success()
        );
        println!("  Created: .req/config.toml");
        println!();
        println!("Next steps:");
        println!("  Add `.. requirement:: REQ-1` blocks to your .rst sources");
        println!("  reqdoc validate");

        Ok(())
    }
}

/// Load the project rooted at `root`.
fn load_project(root: PathBuf) -> anyhow::Result<Project> {
    Ok(Project::load(root)?)
}
