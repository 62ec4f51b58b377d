//! Consistency checks over a set of requirements and references.

use std::fmt;

use serde::Serialize;

use crate::domain::{
    Location, Registry, RequirementId,
    xref::{CrossReference, Unresolved},
};

/// How serious an [`Issue`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported, but the output is still usable.
    Warning,
    /// The output is incomplete.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A problem found while validating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// The same identifier was registered more than once.
    DuplicateId {
        /// The duplicated identifier.
        #[serde(serialize_with = "serialize_display")]
        id: RequirementId,
        /// Every location it was registered at.
        locations: Vec<Location>,
    },
    /// A derived-from link names an identifier that is not registered.
    DanglingDerivation {
        /// The requirement carrying the link.
        #[serde(serialize_with = "serialize_display")]
        id: RequirementId,
        /// The missing identifier.
        #[serde(serialize_with = "serialize_display")]
        target: RequirementId,
        /// Where the requirement is defined.
        location: Location,
    },
    /// Requirements derive from each other in a cycle.
    DerivationCycle {
        /// The requirements in the cycle, sorted.
        ids: Vec<String>,
    },
    /// A cross-reference names an identifier that is not registered.
    UnresolvedReference {
        /// The missing identifier.
        target: String,
        /// Where the reference occurs.
        location: Location,
    },
    /// A `:derivedfrom:` value is not a valid identifier. The requirement is
    /// defined without the link.
    InvalidDerivation {
        /// Where the requirement block starts.
        location: Location,
        /// What is wrong with the value.
        message: String,
    },
    /// A requirement block could not be parsed.
    MalformedDirective {
        /// Where the block starts.
        location: Location,
        /// What is wrong with it.
        message: String,
    },
}

fn serialize_display<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: fmt::Display,
{
    serializer.collect_str(value)
}

impl Issue {
    /// The severity of the issue.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::DuplicateId { .. }
            | Self::DanglingDerivation { .. }
            | Self::UnresolvedReference { .. }
            | Self::InvalidDerivation { .. } => Severity::Warning,
            Self::DerivationCycle { .. } | Self::MalformedDirective { .. } => Severity::Error,
        }
    }

    /// The location the issue is reported at, if it has a single one.
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::DuplicateId { locations, .. } => locations.get(1),
            Self::DanglingDerivation { location, .. }
            | Self::UnresolvedReference { location, .. }
            | Self::InvalidDerivation { location, .. }
            | Self::MalformedDirective { location, .. } => Some(location),
            Self::DerivationCycle { .. } => None,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id, locations } => {
                write!(f, "duplicate requirement {id} defined at ")?;
                for (i, location) in locations.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{location}")?;
                }
                Ok(())
            }
            Self::DanglingDerivation {
                id,
                target,
                location,
            } => write!(
                f,
                "{location}: requirement {id} is derived from unknown requirement {target}"
            ),
            Self::DerivationCycle { ids } => {
                write!(f, "derivation cycle between {}", ids.join(", "))
            }
            Self::UnresolvedReference { target, location } => {
                write!(f, "{location}: undefined requirement reference '{target}'")
            }
            Self::InvalidDerivation { location, message }
            | Self::MalformedDirective { location, message } => write!(f, "{location}: {message}"),
        }
    }
}

impl From<Unresolved> for Issue {
    fn from(unresolved: Unresolved) -> Self {
        Self::UnresolvedReference {
            target: unresolved.target,
            location: unresolved.location,
        }
    }
}

/// The outcome of validating a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Every issue found, grouped by check.
    pub issues: Vec<Issue>,
}

impl Report {
    /// Whether no issue was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues of the given severity.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.severity() == severity)
    }

    /// The issues located in document `docname`.
    ///
    /// Issues without a single location, such as derivation cycles, are left
    /// out. A duplicate identifier belongs to the document of its second
    /// definition.
    #[must_use]
    pub fn in_document(&self, docname: &str) -> Self {
        Self {
            issues: self
                .issues
                .iter()
                .filter(|issue| issue.location().is_some_and(|l| l.docname == docname))
                .cloned()
                .collect(),
        }
    }

    /// Whether the report should fail a run.
    ///
    /// Errors always fail; warnings only fail when `strict` is set.
    #[must_use]
    pub fn is_failure(&self, strict: bool) -> bool {
        self.issues
            .iter()
            .any(|issue| strict || issue.severity() == Severity::Error)
    }
}

impl Extend<Issue> for Report {
    fn extend<T: IntoIterator<Item = Issue>>(&mut self, iter: T) {
        self.issues.extend(iter);
    }
}

/// Checks `registry` and `references` for duplicate identifiers, dangling
/// derivation links, derivation cycles and unresolved references.
#[must_use]
pub fn validate(registry: &Registry, references: &[CrossReference]) -> Report {
    let mut report = Report::default();

    report.extend(
        registry
            .duplicates()
            .into_iter()
            .map(|duplicate| Issue::DuplicateId {
                id: duplicate.id,
                locations: duplicate.locations,
            }),
    );

    report.extend(
        registry
            .dangling_links()
            .into_iter()
            .map(|link| Issue::DanglingDerivation {
                id: link.requirement.id().clone(),
                target: link.target.clone(),
                location: link.requirement.location().clone(),
            }),
    );

    report.extend(
        registry
            .derivation_cycles()
            .into_iter()
            .map(|cycle| Issue::DerivationCycle {
                ids: cycle.iter().map(ToString::to_string).collect(),
            }),
    );

    report.extend(
        references
            .iter()
            .filter(|reference| !registry.contains(&reference.target))
            .map(|reference| Issue::UnresolvedReference {
                target: reference.target.clone(),
                location: reference.location.clone(),
            }),
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Fields, Requirement};

    fn id(s: &str) -> RequirementId {
        RequirementId::try_from(s).unwrap()
    }

    fn requirement(name: &str, parent: Option<&str>, line: usize) -> Requirement {
        let mut fields = Fields::new("desc");
        fields.derived_from = parent.map(id);
        Requirement::new(id(name), fields, Location::new("index", line))
    }

    #[test]
    fn consistent_project_is_clean() {
        let registry: Registry = [requirement("REQ-1", None, 1), requirement("REQ-2", Some("REQ-1"), 8)]
            .into_iter()
            .collect();
        let references = [CrossReference::new("REQ-2", Location::new("index", 20))];

        let report = validate(&registry, &references);

        assert!(report.is_clean());
        assert!(!report.is_failure(true));
    }

    #[test]
    fn reports_every_kind_of_issue() {
        let registry: Registry = [
            requirement("REQ-1", None, 1),
            requirement("REQ-1", None, 5),
            requirement("REQ-2", Some("REQ-404"), 9),
            requirement("A", Some("B"), 12),
            requirement("B", Some("A"), 15),
        ]
        .into_iter()
        .collect();
        let references = [
            CrossReference::new("REQ-1", Location::new("index", 20)),
            CrossReference::new("MISSING", Location::new("index", 21)),
        ];

        let report = validate(&registry, &references);

        assert_eq!(
            report.issues,
            [
                Issue::DuplicateId {
                    id: id("REQ-1"),
                    locations: vec![Location::new("index", 1), Location::new("index", 5)],
                },
                Issue::DanglingDerivation {
                    id: id("REQ-2"),
                    target: id("REQ-404"),
                    location: Location::new("index", 9),
                },
                Issue::DerivationCycle {
                    ids: vec!["A".to_string(), "B".to_string()],
                },
                Issue::UnresolvedReference {
                    target: "MISSING".to_string(),
                    location: Location::new("index", 21),
                },
            ]
        );
    }

    #[test]
    fn warnings_only_fail_in_strict_mode() {
        let registry: Registry = [requirement("REQ-2", Some("REQ-404"), 9)].into_iter().collect();

        let report = validate(&registry, &[]);

        assert_eq!(report.with_severity(Severity::Warning).count(), 1);
        assert!(!report.is_failure(false));
        assert!(report.is_failure(true));
    }

    #[test]
    fn cycles_and_malformed_directives_are_errors() {
        let registry: Registry = [requirement("SELF", Some("SELF"), 1)].into_iter().collect();

        let mut report = validate(&registry, &[]);
        report.extend([Issue::MalformedDirective {
            location: Location::new("index", 30),
            message: "requirement directive requires an identifier".to_string(),
        }]);

        assert_eq!(report.with_severity(Severity::Error).count(), 2);
        assert!(report.is_failure(false));
        assert_eq!(
            report.issues[1].to_string(),
            "index:30: requirement directive requires an identifier"
        );
    }

    #[test]
    fn filters_issues_by_document() {
        let registry: Registry = [
            requirement("REQ-1", None, 1),
            requirement("A", Some("B"), 3),
            requirement("B", Some("A"), 5),
            Requirement::new(id("REQ-1"), Fields::new("again"), Location::new("design", 2)),
            Requirement::new(
                id("REQ-2"),
                Fields::new("child").derived_from(id("REQ-404")),
                Location::new("design", 7),
            ),
        ]
        .into_iter()
        .collect();
        let references = [CrossReference::new("MISSING", Location::new("index", 12))];

        let report = validate(&registry, &references);

        let design: Vec<_> = report
            .in_document("design")
            .issues
            .iter()
            .filter_map(Issue::location)
            .map(|l| l.line)
            .collect();
        assert_eq!(design, [2, 7]);

        let index = report.in_document("index");
        assert_eq!(
            index.issues,
            [Issue::UnresolvedReference {
                target: "MISSING".to_string(),
                location: Location::new("index", 12),
            }]
        );
        assert!(report.in_document("elsewhere").is_clean());
    }

    #[test]
    fn issues_serialize_with_kind_tag() {
        let issue = Issue::DanglingDerivation {
            id: id("REQ-2"),
            target: id("REQ-1"),
            location: Location::new("index", 4),
        };

        let value = serde_json::to_value(&issue).unwrap();

        assert_eq!(value["kind"], "dangling_derivation");
        assert_eq!(value["target"], "REQ-1");
        assert_eq!(value["location"]["line"], 4);
    }
}
