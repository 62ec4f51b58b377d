/// Requirement directive and reference parsing.
pub mod directive;
mod docname;
pub mod output;
pub mod project;

pub use directive::{Block, DirectiveError, DirectiveErrorKind, SourceDocument};
pub use docname::{ParseError, construct_path_from_docname, docname_from_path};
pub use output::{PAGE_EXTENSION, WriteError, write_pages};
pub use project::{FileError, LoadError, METADATA_DIR, Project, config_path};
