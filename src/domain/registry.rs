//! In-memory registry of requirements
//!
//! The [`Registry`] knows nothing about the filesystem or source syntax. It
//! keeps requirements in the order they were registered and answers lookups
//! by identifier.

use std::collections::{HashMap, HashSet};

use petgraph::{algo::tarjan_scc, graphmap::DiGraphMap};
use thiserror::Error;
use tracing::instrument;

use crate::domain::{Fields, InvalidIdError, Location, Requirement, RequirementId};

/// An ordered store of requirements.
///
/// Registration never fails on a duplicate identifier: every copy is kept, and
/// lookups return the copy that was registered first. Use
/// [`Registry::duplicates`] to find them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    /// Requirements in registration order.
    requirements: Vec<Requirement>,

    /// Position of the first registration of each identifier.
    first_by_id: HashMap<String, usize>,
}

/// Errors that can occur when recording a requirement.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The identifier is not a valid requirement identifier.
    #[error(transparent)]
    InvalidId(#[from] InvalidIdError),
}

/// An identifier that was registered more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    /// The duplicated identifier.
    pub id: RequirementId,
    /// Every location the identifier was registered at, in registration
    /// order.
    pub locations: Vec<Location>,
}

/// A derived-from link whose target is not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingLink<'a> {
    /// The requirement carrying the link.
    pub requirement: &'a Requirement,
    /// The identifier it names.
    pub target: &'a RequirementId,
}

impl Registry {
    /// Creates a new registry with pre-allocated capacity for the given
    /// number of requirements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            requirements: Vec::with_capacity(capacity),
            first_by_id: HashMap::with_capacity(capacity),
        }
    }

    /// Appends a requirement, returning its registration position.
    ///
    /// No uniqueness check is made.
    pub fn register(&mut self, requirement: Requirement) -> usize {
        let position = self.requirements.len();

        match self.first_by_id.get(requirement.id().as_str()) {
            Some(&first) => tracing::debug!(
                "Duplicate requirement {} at {}, first registered at {}",
                requirement.id(),
                requirement.location(),
                self.requirements[first].location()
            ),
            None => {
                self.first_by_id
                    .insert(requirement.id().to_string(), position);
            }
        }

        self.requirements.push(requirement);
        position
    }

    /// Validates an identifier and registers a requirement under it.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a valid requirement identifier.
    pub fn record(
        &mut self,
        id: &str,
        fields: Fields,
        location: Location,
    ) -> Result<&Requirement, RecordError> {
        let id = RequirementId::try_from(id)?;
        let position = self.register(Requirement::new(id, fields, location));
        Ok(&self.requirements[position])
    }

    /// The number of registered requirements, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    /// Whether no requirement has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// All requirements in registration order.
    #[must_use]
    pub fn list_all(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Iterate over all requirements in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter()
    }

    /// Looks up the first requirement registered under exactly `target`.
    ///
    /// Returns `None` if the target is unresolved.
    #[must_use]
    pub fn resolve(&self, target: &str) -> Option<&Requirement> {
        self.first_by_id
            .get(target)
            .map(|&position| &self.requirements[position])
    }

    /// Whether `target` has been registered at least once.
    #[must_use]
    pub fn contains(&self, target: &str) -> bool {
        self.first_by_id.contains_key(target)
    }

    /// Identifiers registered more than once, in order of first
    /// registration.
    #[must_use]
    pub fn duplicates(&self) -> Vec<Duplicate> {
        let mut locations: HashMap<&str, Vec<Location>> = HashMap::new();
        for requirement in &self.requirements {
            locations
                .entry(requirement.id().as_str())
                .or_default()
                .push(requirement.location().clone());
        }

        let mut duplicates: Vec<_> = locations
            .into_iter()
            .filter(|(_, locations)| locations.len() > 1)
            .map(|(id, locations)| (self.first_by_id[id], locations))
            .collect();
        duplicates.sort_by_key(|(first, _)| *first);

        duplicates
            .into_iter()
            .map(|(first, locations)| Duplicate {
                id: self.requirements[first].id().clone(),
                locations,
            })
            .collect()
    }

    /// Requirements whose derived-from target is not registered.
    #[must_use]
    pub fn dangling_links(&self) -> Vec<DanglingLink<'_>> {
        self.requirements
            .iter()
            .filter_map(|requirement| {
                let target = requirement.derived_from()?;
                (!self.contains(target)).then_some(DanglingLink {
                    requirement,
                    target,
                })
            })
            .collect()
    }

    /// Requirements that name `id` as the requirement they are derived from,
    /// in registration order.
    pub fn derived_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Requirement> + 'a {
        self.requirements
            .iter()
            .filter(move |requirement| requirement.derived_from().is_some_and(|p| p.as_str() == id))
    }

    /// The derivation chain starting at `id`.
    ///
    /// The first element is the requirement itself, followed by the
    /// requirement it is derived from, and so on. The chain stops at a
    /// dangling link or when an identifier repeats. Returns an empty chain if
    /// `id` is unresolved.
    #[must_use]
    pub fn lineage(&self, id: &str) -> Vec<&Requirement> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = self.resolve(id);

        while let Some(requirement) = next {
            if !seen.insert(requirement.id().as_str()) {
                break;
            }
            chain.push(requirement);
            next = requirement
                .derived_from()
                .and_then(|parent| self.resolve(parent));
        }

        chain
    }

    fn derivation_graph(&self) -> DiGraphMap<&str, ()> {
        let mut graph = DiGraphMap::with_capacity(self.first_by_id.len(), self.len());

        for requirement in &self.requirements {
            let child = requirement.id().as_str();
            graph.add_node(child);
            if let Some(parent) = requirement.derived_from() {
                if self.contains(parent) {
                    graph.add_edge(child, parent.as_str(), ());
                }
            }
        }

        graph
    }

    /// Return all cycles in the derivation graph as sorted sets of
    /// identifiers.
    #[instrument(skip(self))]
    #[must_use]
    pub fn derivation_cycles(&self) -> Vec<Vec<RequirementId>> {
        let graph = self.derivation_graph();
        let mut cycles = Vec::new();

        for component in tarjan_scc(&graph) {
            let is_cycle = match component.as_slice() {
                [] => false,
                [node] => graph.contains_edge(*node, *node),
                _ => true,
            };
            if !is_cycle {
                continue;
            }

            let mut ids: Vec<_> = component
                .iter()
                .filter_map(|id| self.resolve(id).map(|r| r.id().clone()))
                .collect();
            ids.sort();
            cycles.push(ids);
        }

        cycles.sort();
        cycles
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Requirement;
    type IntoIter = std::slice::Iter<'a, Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.requirements.iter()
    }
}

impl FromIterator<Requirement> for Registry {
    fn from_iter<I: IntoIterator<Item = Requirement>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut registry = Self::with_capacity(iter.size_hint().0);
        for requirement in iter {
            registry.register(requirement);
        }
        registry
    }
}
