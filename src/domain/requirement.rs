use serde::Serialize;

use crate::domain::RequirementId;

/// A requirement is a single traceable specification item.
///
/// Requirements are created when a requirement block is processed and are
/// immutable thereafter. A requirement may name another requirement it is
/// derived from; that link is a weak reference by identifier and may dangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    #[serde(serialize_with = "id_as_string")]
    id: RequirementId,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rationale: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "optional_id_as_string"
    )]
    derived_from: Option<RequirementId>,
    location: Location,
}

/// The content of a requirement block, excluding its identifier and
/// location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    /// Free-text description (the body of the block).
    pub description: String,
    /// Optional rationale.
    pub rationale: Option<String>,
    /// Optional identifier of the requirement this one is derived from.
    pub derived_from: Option<RequirementId>,
}

impl Fields {
    /// Fields with the given description and nothing else.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Sets the rationale.
    #[must_use]
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    /// Sets the derived-from link.
    #[must_use]
    pub fn derived_from(mut self, id: RequirementId) -> Self {
        self.derived_from = Some(id);
        self
    }
}

/// Where a requirement was defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    /// The document name: the source path relative to the project root,
    /// `/`-separated and without extension.
    pub docname: String,
    /// The 1-based line of the directive in the source document.
    pub line: usize,
}

impl Location {
    /// Creates a location.
    #[must_use]
    pub fn new(docname: impl Into<String>, line: usize) -> Self {
        Self {
            docname: docname.into(),
            line,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.docname, self.line)
    }
}

impl Requirement {
    /// Construct a new [`Requirement`].
    #[must_use]
    pub fn new(id: RequirementId, fields: Fields, location: Location) -> Self {
        let Fields {
            description,
            rationale,
            derived_from,
        } = fields;

        Self {
            id,
            description,
            rationale,
            derived_from,
            location,
        }
    }

    /// The identifier of the requirement.
    #[must_use]
    pub const fn id(&self) -> &RequirementId {
        &self.id
    }

    /// The free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The rationale, if any.
    #[must_use]
    pub fn rationale(&self) -> Option<&str> {
        self.rationale.as_deref()
    }

    /// The identifier this requirement is derived from, if any.
    #[must_use]
    pub const fn derived_from(&self) -> Option<&RequirementId> {
        self.derived_from.as_ref()
    }

    /// Where the requirement was defined.
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// The anchor the rendered table is reachable at.
    #[must_use]
    pub fn anchor(&self) -> String {
        self.id.anchor()
    }
}

fn id_as_string<S>(id: &RequirementId, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(id.as_str())
}

#[allow(clippy::ref_option)]
fn optional_id_as_string<S>(id: &Option<RequirementId>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match id {
        Some(id) => serializer.serialize_str(id.as_str()),
        None => serializer.serialize_none(),
    }
}
