//! Cross-reference resolution.
//!
//! A [`CrossReference`] names a requirement by identifier. The [`Resolver`]
//! maps it to a [`Link`] pointing at the document and anchor of the first
//! requirement registered under that identifier.

use serde::Serialize;

use crate::domain::{Location, Registry, Requirement};

/// A reference to a requirement found in a source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossReference {
    /// The identifier being referenced.
    pub target: String,
    /// Explicit link text, if the reference supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Where the reference occurs.
    pub location: Location,
}

impl CrossReference {
    /// A reference to `target` at `location`, without explicit title.
    #[must_use]
    pub fn new(target: impl Into<String>, location: Location) -> Self {
        Self {
            target: target.into(),
            title: None,
            location,
        }
    }

    /// The text a rendered reference shows.
    #[must_use]
    pub fn text(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.target)
    }
}

/// A navigable link to a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// The visible link text.
    pub text: String,
    /// The link target, relative to the referring document.
    pub href: String,
}

/// A reference whose target is not registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{location}: undefined requirement reference '{target}'")]
pub struct Unresolved {
    /// The identifier that could not be found.
    pub target: String,
    /// Where the reference occurs.
    pub location: Location,
}

/// Resolves references against a [`Registry`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a Registry,
    link_suffix: &'a str,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver producing links with the given document suffix
    /// (such as `.html` or `.md`).
    #[must_use]
    pub const fn new(registry: &'a Registry, link_suffix: &'a str) -> Self {
        Self {
            registry,
            link_suffix,
        }
    }

    /// Looks up the requirement a target names.
    #[must_use]
    pub fn lookup(&self, target: &str) -> Option<&'a Requirement> {
        self.registry.resolve(target)
    }

    /// The link from `from_docname` to `requirement`.
    #[must_use]
    pub fn link_to(&self, from_docname: &str, requirement: &Requirement, text: &str) -> Link {
        Link {
            text: text.to_string(),
            href: self.href(from_docname, &requirement.location().docname, &requirement.anchor()),
        }
    }

    /// Resolves a reference.
    ///
    /// # Errors
    ///
    /// Returns [`Unresolved`] if no requirement is registered under the
    /// reference's target.
    pub fn resolve(&self, reference: &CrossReference) -> Result<Link, Unresolved> {
        self.lookup(&reference.target)
            .map(|requirement| {
                self.link_to(&reference.location.docname, requirement, reference.text())
            })
            .ok_or_else(|| Unresolved {
                target: reference.target.clone(),
                location: reference.location.clone(),
            })
    }

    /// The link target of `anchor` in document `to_docname`, as seen from
    /// document `from_docname`.
    #[must_use]
    pub fn href(&self, from_docname: &str, to_docname: &str, anchor: &str) -> String {
        if from_docname == to_docname {
            format!("#{anchor}")
        } else {
            format!(
                "{}{}#{anchor}",
                relative_uri(from_docname, to_docname),
                self.link_suffix
            )
        }
    }
}

/// The path of document `to` relative to document `from`.
///
/// Both are `/`-separated document names.
///
/// ```
/// use reqdoc::domain::xref::relative_uri;
///
/// assert_eq!(relative_uri("index", "design/core"), "design/core");
/// assert_eq!(relative_uri("design/core", "index"), "../index");
/// assert_eq!(relative_uri("design/core", "design/bus"), "bus");
/// ```
#[must_use]
pub fn relative_uri(from: &str, to: &str) -> String {
    let from_parts: Vec<&str> = from.split('/').collect();
    let to_parts: Vec<&str> = to.split('/').collect();

    let from_dirs = &from_parts[..from_parts.len() - 1];
    let to_dirs = &to_parts[..to_parts.len() - 1];

    let common = from_dirs
        .iter()
        .zip(to_dirs)
        .take_while(|(a, b)| a == b)
        .count();

    let mut uri = "../".repeat(from_dirs.len() - common);
    uri.push_str(&to_parts[common..].join("/"));
    uri
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::{Fields, RequirementId};

    fn registry() -> Registry {
        [("REQ-1", "design/core"), ("REQ-2", "index"), ("REQ-1", "other")]
            .into_iter()
            .map(|(name, docname)| {
                Requirement::new(
                    RequirementId::try_from(name).unwrap(),
                    Fields::new("desc"),
                    Location::new(docname, 1),
                )
            })
            .collect()
    }

    #[test_case("index", "index", "index"; "same top level")]
    #[test_case("index", "a/b", "a/b"; "descend")]
    #[test_case("a/b", "index", "../index"; "ascend")]
    #[test_case("a/b/c", "a/d", "../d"; "sibling directory")]
    #[test_case("a/b", "a/c", "c"; "same directory")]
    #[test_case("x/y/z", "p/q", "../../p/q"; "disjoint")]
    fn relative_uris(from: &str, to: &str, expected: &str) {
        assert_eq!(relative_uri(from, to), expected);
    }

    #[test]
    fn resolves_to_first_registration() {
        let registry = registry();
        let resolver = Resolver::new(&registry, ".html");

        let link = resolver
            .resolve(&CrossReference::new("REQ-1", Location::new("index", 7)))
            .unwrap();

        assert_eq!(
            link,
            Link {
                text: "REQ-1".to_string(),
                href: "design/core.html#req-REQ-1".to_string(),
            }
        );
    }

    #[test]
    fn same_document_links_are_fragments() {
        let registry = registry();
        let resolver = Resolver::new(&registry, ".md");

        let link = resolver
            .resolve(&CrossReference::new("REQ-2", Location::new("index", 3)))
            .unwrap();

        assert_eq!(link.href, "#req-REQ-2");
    }

    #[test]
    fn explicit_title_is_link_text() {
        let registry = registry();
        let resolver = Resolver::new(&registry, ".md");
        let reference = CrossReference {
            target: "REQ-2".to_string(),
            title: Some("the boot requirement".to_string()),
            location: Location::new("design/core", 3),
        };

        let link = resolver.resolve(&reference).unwrap();

        assert_eq!(link.text, "the boot requirement");
        assert_eq!(link.href, "../index.md#req-REQ-2");
    }

    #[test]
    fn unknown_target_is_unresolved() {
        let registry = registry();
        let resolver = Resolver::new(&registry, ".md");

        let err = resolver
            .resolve(&CrossReference::new("REQ-404", Location::new("index", 9)))
            .unwrap_err();

        assert_eq!(err.target, "REQ-404");
        assert_eq!(
            err.to_string(),
            "index:9: undefined requirement reference 'REQ-404'"
        );
    }
}
