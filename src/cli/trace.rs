use std::path::PathBuf;

use clap::Parser;
use reqdoc::Registry;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Show the derivation lineage of a requirement")]
pub struct Trace {
    /// The identifier of the requirement to trace
    id: String,
}

impl Trace {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let project = super::load_project(root)?;
        let registry = project.registry();

        let lineage = registry.lineage(&self.id);
        if lineage.is_empty() {
            eprintln!("Requirement {} not found", self.id);
            std::process::exit(1);
        }

        println!("{}", "Derived from".dim());
        for (depth, requirement) in lineage.iter().enumerate() {
            let marker = if depth == 0 { "" } else { "↑ " };
            println!(
                "  {}{marker}{} ({})",
                "  ".repeat(depth),
                requirement.id(),
                requirement.location()
            );
        }

        if let Some(parent) = lineage.last().and_then(|r| r.derived_from()) {
            if !registry.contains(parent.as_str()) {
                println!(
                    "  {}{}",
                    "  ".repeat(lineage.len()),
                    format!("↑ {parent} (undefined)").warning()
                );
            }
        }

        println!("\n{}", "Derived requirements".dim());
        let mut printed = false;
        print_descendants(registry, &self.id, 1, &mut vec![self.id.clone()], &mut printed);
        if !printed {
            println!("  {}", "(none)".dim());
        }

        Ok(())
    }
}

fn print_descendants(
    registry: &Registry,
    id: &str,
    depth: usize,
    path: &mut Vec<String>,
    printed: &mut bool,
) {
    for child in registry.derived_from(id) {
        let child_id = child.id().as_str();
        *printed = true;

        if path.iter().any(|seen| seen == child_id) {
            println!(
                "  {}{}",
                "  ".repeat(depth - 1),
                format!("↓ {child_id} (cycle)").warning()
            );
            continue;
        }

        println!(
            "  {}↓ {child_id} ({})",
            "  ".repeat(depth - 1),
            child.location()
        );

        path.push(child_id.to_string());
        print_descendants(registry, child_id, depth + 1, path, printed);
        path.pop();
    }
}
