//! A filesystem backed documentation project
//!
//! The [`Project`] walks a directory of reStructuredText sources, parses every
//! requirement block and reference, and registers the requirements in a
//! filesystem agnostic [`Registry`].

use std::{
    ffi::OsStr,
    fmt, io,
    path::{Path, PathBuf},
};

use nonempty::NonEmpty;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use walkdir::WalkDir;

use crate::{
    domain::{
        Config, CrossReference, Index, Registry, Report, Resolver, build_index, validate,
    },
    storage::{
        directive::{DirectiveError, SourceDocument},
        docname::{ParseError, docname_from_path},
    },
};

/// The directory holding project metadata such as `config.toml`.
pub const METADATA_DIR: &str = ".req";

/// A loaded documentation project.
#[derive(Debug, Clone)]
pub struct Project {
    /// The root of the source tree.
    root: PathBuf,
    config: Config,
    /// Documents sorted by document name.
    documents: Vec<SourceDocument>,
    registry: Registry,
}

impl Project {
    /// Load every source document below `root`, using the configuration in
    /// `root/.req/config.toml` (or the defaults if there is none).
    ///
    /// # Errors
    ///
    /// Returns an error listing every source file that could not be read.
    /// Malformed requirement blocks are not errors; see
    /// [`Project::directive_errors`].
    pub fn load(root: PathBuf) -> Result<Self, LoadError> {
        let config = load_config(&root);
        Self::load_with_config(root, config)
    }

    /// Load every source document below `root` with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error listing every source file that could not be read.
    pub fn load_with_config(root: PathBuf, config: Config) -> Result<Self, LoadError> {
        let paths = collect_source_paths(&root, &config);
        tracing::debug!("Found {} source documents in {}", paths.len(), root.display());

        let (documents, failures): (Vec<_>, Vec<_>) = paths
            .into_par_iter()
            .map(|path| load_document(&path, &root).map_err(|e| (path, e)))
            .partition(Result::is_ok);

        let failures: Vec<_> = failures.into_iter().filter_map(Result::err).collect();
        if let Some(failures) = NonEmpty::from_vec(failures) {
            return Err(LoadError { failures });
        }

        let documents = documents.into_iter().filter_map(Result::ok).collect();
        Ok(Self::from_documents(root, config, documents))
    }

    /// Build a project from already parsed documents.
    ///
    /// Requirements are registered in order of document name, then source
    /// order within each document.
    #[must_use]
    pub fn from_documents(
        root: PathBuf,
        config: Config,
        mut documents: Vec<SourceDocument>,
    ) -> Self {
        documents.sort_by(|a, b| a.docname().cmp(b.docname()));

        let registry: Registry = documents
            .iter()
            .flat_map(SourceDocument::requirements)
            .cloned()
            .collect();

        tracing::info!(
            "Registered {} requirements from {} documents",
            registry.len(),
            documents.len()
        );

        Self {
            root,
            config,
            documents,
            registry,
        }
    }

    /// The root of the source tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The project configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The requirement registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// All documents, sorted by document name.
    #[must_use]
    pub fn documents(&self) -> &[SourceDocument] {
        &self.documents
    }

    /// Looks up a document by name.
    #[must_use]
    pub fn document(&self, docname: &str) -> Option<&SourceDocument> {
        self.documents
            .binary_search_by(|document| document.docname().cmp(docname))
            .ok()
            .map(|position| &self.documents[position])
    }

    /// Every cross-reference in the project, in document order.
    pub fn references(&self) -> impl Iterator<Item = &CrossReference> {
        self.documents
            .iter()
            .flat_map(|document| document.references().iter())
    }

    /// Every malformed requirement block in the project.
    pub fn directive_errors(&self) -> impl Iterator<Item = &DirectiveError> {
        self.documents
            .iter()
            .flat_map(|document| document.errors().iter())
    }

    /// Every requirement block accepted with a problem.
    pub fn directive_warnings(&self) -> impl Iterator<Item = &DirectiveError> {
        self.documents
            .iter()
            .flat_map(|document| document.warnings().iter())
    }

    /// A resolver for references in this project.
    #[must_use]
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.registry, self.config.link_suffix())
    }

    /// The requirement index.
    #[must_use]
    pub fn index(&self) -> Index {
        build_index(&self.registry)
    }

    /// Validates the project.
    ///
    /// Includes every malformed or partially accepted requirement block as
    /// well as the registry checks.
    #[must_use]
    pub fn validate(&self) -> Report {
        let references: Vec<CrossReference> = self.references().cloned().collect();
        let mut report = validate(&self.registry, &references);
        report.extend(self.directive_warnings().cloned().map(Into::into));
        report.extend(self.directive_errors().cloned().map(Into::into));
        report
    }
}

/// Errors that can occur while loading a project.
#[derive(Debug, thiserror::Error)]
pub struct LoadError {
    failures: NonEmpty<(PathBuf, FileError)>,
}

impl LoadError {
    /// Every file that failed to load, with the reason.
    pub fn failures(&self) -> impl Iterator<Item = &(PathBuf, FileError)> {
        self.failures.iter()
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_DISPLAY: usize = 5;

        write!(f, "failed to load source documents: ")?;

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

/// Why a single source file failed to load.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// The file could not be read.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// No document name could be derived from the path.
    #[error(transparent)]
    Docname(#[from] ParseError),
}

/// The path of the configuration file of the project rooted at `root`.
#[must_use]
pub fn config_path(root: &Path) -> PathBuf {
    root.join(METADATA_DIR).join("config.toml")
}

fn load_config(root: &Path) -> Config {
    Config::load(&config_path(root)).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

fn collect_source_paths(root: &Path, config: &Config) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| config.is_excluded(name))
        })
        .filter_map(|entry| {
            entry
                .map_err(|e| tracing::debug!("Skipping unreadable entry: {e}"))
                .ok()
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(OsStr::to_str)
                .is_some_and(|extension| config.is_source_extension(extension))
        })
        .map(walkdir::DirEntry::into_path)
        .collect();

    paths.sort();
    paths
}

fn load_document(path: &Path, root: &Path) -> Result<SourceDocument, FileError> {
    let docname = docname_from_path(path, root)?;
    let source = std::fs::read_to_string(path)?;
    Ok(SourceDocument::parse(docname, source))
}
