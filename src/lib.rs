//! Traceable requirements in reStructuredText sources
//!
//! Requirements are declared with `.. requirement::` blocks, referenced with
//! `:req:ref:` roles and collected into an index page.

pub mod domain;
pub use domain::{
    Config, CrossReference, Index, Issue, Location, Registry, Report, Requirement, RequirementId,
    Resolver, build_index,
};

pub mod render;
pub use render::{Renderer, TableFormat};

/// Source loading and output writing.
pub mod storage;
pub use storage::{Project, SourceDocument};
