use std::path::PathBuf;

use clap::Parser;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Resolve a requirement reference to a link")]
pub struct Resolve {
    /// The identifier being referenced
    target: String,

    /// The document the reference is made from
    #[arg(long, value_name = "DOCNAME", default_value = "index")]
    from: String,
}

impl Resolve {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let project = super::load_project(root)?;
        let resolver = project.resolver();

        let Some(requirement) = resolver.lookup(&self.target) else {
            eprintln!(
                "{}",
                format!("undefined requirement reference '{}'", self.target).warning()
            );
            std::process::exit(1);
        };

        let link = resolver.link_to(&self.from, requirement, &self.target);
        println!("{}", link.href);
        println!("{}", format!("defined at {}", requirement.location()).dim());

        Ok(())
    }
}
