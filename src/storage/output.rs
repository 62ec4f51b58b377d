//! Writing rendered pages to an output directory.

use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use nonempty::NonEmpty;

use crate::{render::Page, storage::docname::construct_path_from_docname};

/// The extension of written pages.
pub const PAGE_EXTENSION: &str = "md";

/// Write every page below `out_dir`, creating directories as needed.
///
/// A page named `design/core` is written to `out_dir/design/core.md`. Writing
/// continues past failures.
///
/// # Errors
///
/// Returns an error listing every page that could not be written.
pub fn write_pages(out_dir: &Path, pages: &[Page]) -> Result<Vec<PathBuf>, WriteError> {
    let mut written = Vec::with_capacity(pages.len());
    let mut failures = Vec::new();

    for page in pages {
        let path = construct_path_from_docname(out_dir, &page.docname, PAGE_EXTENSION);
        match write_page(&path, &page.content) {
            Ok(()) => {
                tracing::debug!("Wrote {}", path.display());
                written.push(path);
            }
            Err(e) => failures.push((path, e)),
        }
    }

    if let Some(failures) = NonEmpty::from_vec(failures) {
        return Err(WriteError { failures });
    }

    Ok(written)
}

fn write_page(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}

/// Errors that can occur while writing pages.
#[derive(Debug, thiserror::Error)]
pub struct WriteError {
    failures: NonEmpty<(PathBuf, io::Error)>,
}

impl WriteError {
    /// Every page that could not be written, with the reason.
    pub fn failures(&self) -> impl Iterator<Item = &(PathBuf, io::Error)> {
        self.failures.iter()
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_DISPLAY: usize = 5;

        write!(f, "failed to write pages: ")?;

        let total = self.failures.len();
        let displayed: Vec<String> = self
            .failures
            .iter()
            .take(MAX_DISPLAY)
            .map(|(p, e)| format!("{} ({e})", p.display()))
            .collect();

        let msg = displayed.join(", ");

        if total <= MAX_DISPLAY {
            write!(f, "{msg}")
        } else {
            write!(f, "{msg}... (and {} more)", total - MAX_DISPLAY)
        }
    }
}
