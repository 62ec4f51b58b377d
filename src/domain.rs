//! Domain models for requirement tracking.
//!
//! This module contains the core domain types: requirement identifiers,
//! requirements, the registry, the index, cross-reference resolution and
//! validation.

/// Requirement domain model.
pub mod requirement;
pub use requirement::{Fields, Location, Requirement};

mod config;
pub use config::Config;

/// Requirement identifier type and parsing.
pub mod id;
pub use id::{InvalidIdError, RequirementId};

pub mod index;
pub use index::{Index, IndexEntry, IndexGroup, build_index};

pub mod registry;
pub use registry::{DanglingLink, Duplicate, RecordError, Registry};

pub mod validation;
pub use validation::{Issue, Report, Severity, validate};

pub mod xref;
pub use xref::{CrossReference, Link, Resolver, Unresolved};
