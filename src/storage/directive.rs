use std::{ops::Range, sync::LazyLock};

use regex::Regex;

use crate::domain::{
    CrossReference, Fields, InvalidIdError, Issue, Location, Requirement, RequirementId,
};

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)\.\.\s+requirement::(.*)$").expect("this must never fail")
});

static OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:([A-Za-z][\w-]*):(?:\s+(.*))?$").expect("this must never fail")
});

static ROLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":req:ref:`([^`]+)`").expect("this must never fail"));

static EXPLICIT_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*<([^<>]+)>$").expect("this must never fail"));

/// The most positional arguments a requirement directive accepts: the
/// identifier plus two that are ignored.
const MAX_ARGUMENTS: usize = 3;

/// A reStructuredText source document, split into requirement blocks and
/// references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    docname: String,
    source: String,
    blocks: Vec<Block>,
    references: Vec<CrossReference>,
    errors: Vec<DirectiveError>,
    warnings: Vec<DirectiveError>,
}

/// A requirement directive that parsed successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// The 0-based source lines the block spans, trailing blank lines
    /// excluded.
    pub lines: Range<usize>,
    /// The indentation of the directive marker.
    pub indent: usize,
    /// The requirement the block defines.
    pub requirement: Requirement,
}

/// A requirement directive that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{location}: {kind}")]
pub struct DirectiveError {
    /// Where the directive starts.
    pub location: Location,
    /// The 0-based source lines the malformed block spans.
    pub lines: Range<usize>,
    /// What is wrong with it.
    pub kind: DirectiveErrorKind,
}

/// The ways a requirement directive can be malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveErrorKind {
    /// No identifier argument was given.
    #[error("requirement directive requires an identifier argument")]
    MissingIdentifier,
    /// More positional arguments than the directive accepts.
    #[error("requirement directive takes at most 3 arguments, found {0}")]
    TooManyArguments(usize),
    /// The identifier argument is invalid.
    #[error("invalid requirement identifier: {0}")]
    InvalidId(InvalidIdError),
    /// An option other than `rationale` or `derivedfrom`.
    #[error("unknown option ':{0}:' in requirement directive")]
    UnknownOption(String),
    /// The same option given twice.
    #[error("duplicate option ':{0}:' in requirement directive")]
    DuplicateOption(String),
    /// The `derivedfrom` option is not a valid identifier.
    ///
    /// The requirement is still defined, without a derivation link.
    #[error("invalid ':derivedfrom:' value: {0}")]
    InvalidDerivedFrom(InvalidIdError),
}

impl From<DirectiveError> for Issue {
    fn from(error: DirectiveError) -> Self {
        match error.kind {
            DirectiveErrorKind::InvalidDerivedFrom(_) => Self::InvalidDerivation {
                location: error.location,
                message: error.kind.to_string(),
            },
            kind => Self::MalformedDirective {
                location: error.location,
                message: kind.to_string(),
            },
        }
    }
}

impl SourceDocument {
    /// Parses the requirement blocks and references out of `source`.
    ///
    /// Malformed blocks are recorded as errors and otherwise skipped. A block
    /// whose only problem is an invalid `:derivedfrom:` value still defines
    /// its requirement, without the link, and is recorded as a warning.
    /// References inside requirement blocks are not collected; block content
    /// is plain text.
    #[must_use]
    pub fn parse(docname: impl Into<String>, source: impl Into<String>) -> Self {
        let docname = docname.into();
        let source = source.into();
        let lines: Vec<&str> = source.lines().collect();

        let mut blocks = Vec::new();
        let mut references = Vec::new();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            let Some(captures) = DIRECTIVE.captures(lines[i]) else {
                references.extend(references_in_line(lines[i], &docname, i + 1));
                i += 1;
                continue;
            };

            let indent = captures[1].chars().count();
            let start = i;
            let mut end = i + 1;
            while end < lines.len()
                && (lines[end].trim().is_empty() || indentation(lines[end]) > indent)
            {
                end += 1;
            }
            while end > start + 1 && lines[end - 1].trim().is_empty() {
                end -= 1;
            }

            let location = Location::new(docname.as_str(), start + 1);
            match parse_block(&captures[2], &lines[start + 1..end], location.clone()) {
                Ok((requirement, problems)) => {
                    for kind in problems {
                        tracing::debug!("Requirement directive at {location}: {kind}");
                        warnings.push(DirectiveError {
                            location: location.clone(),
                            lines: start..end,
                            kind,
                        });
                    }
                    blocks.push(Block {
                        lines: start..end,
                        indent,
                        requirement,
                    });
                }
                Err(kind) => {
                    tracing::debug!("Malformed requirement directive at {location}: {kind}");
                    errors.push(DirectiveError {
                        location,
                        lines: start..end,
                        kind,
                    });
                }
            }

            i = end;
        }

        Self {
            docname,
            source,
            blocks,
            references,
            errors,
            warnings,
        }
    }

    /// The document name.
    #[must_use]
    pub fn docname(&self) -> &str {
        &self.docname
    }

    /// The full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Requirement blocks in source order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The requirements defined in the document, in source order.
    pub fn requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.blocks.iter().map(|block| &block.requirement)
    }

    /// Cross-references outside requirement blocks, in source order.
    #[must_use]
    pub fn references(&self) -> &[CrossReference] {
        &self.references
    }

    /// Malformed requirement blocks.
    #[must_use]
    pub fn errors(&self) -> &[DirectiveError] {
        &self.errors
    }

    /// Requirement blocks that were accepted despite a problem, such as an
    /// invalid `:derivedfrom:` value.
    #[must_use]
    pub fn warnings(&self) -> &[DirectiveError] {
        &self.warnings
    }

    /// Splits the document into its requirements, references and errors.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Requirement>, Vec<CrossReference>, Vec<DirectiveError>) {
        let requirements = self
            .blocks
            .into_iter()
            .map(|block| block.requirement)
            .collect();
        (requirements, self.references, self.errors)
    }
}

fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Parses one block into its requirement and the problems that did not
/// prevent defining it.
fn parse_block(
    arguments: &str,
    body: &[&str],
    location: Location,
) -> Result<(Requirement, Vec<DirectiveErrorKind>), DirectiveErrorKind> {
    let arguments: Vec<&str> = arguments.split_whitespace().collect();
    let id = match arguments.as_slice() {
        [] => return Err(DirectiveErrorKind::MissingIdentifier),
        [id, ..] if arguments.len() <= MAX_ARGUMENTS => {
            RequirementId::try_from(*id).map_err(DirectiveErrorKind::InvalidId)?
        }
        _ => return Err(DirectiveErrorKind::TooManyArguments(arguments.len())),
    };

    let (options, consumed) = parse_options(body);

    let mut fields = Fields::default();
    let mut problems = Vec::new();
    let mut seen_rationale = false;
    let mut seen_derived_from = false;
    for (name, value) in options {
        match name.as_str() {
            "rationale" if seen_rationale => {
                return Err(DirectiveErrorKind::DuplicateOption(name));
            }
            "rationale" => {
                seen_rationale = true;
                fields.rationale = Some(value);
            }
            "derivedfrom" if seen_derived_from => {
                return Err(DirectiveErrorKind::DuplicateOption(name));
            }
            "derivedfrom" => {
                seen_derived_from = true;
                match RequirementId::new(value) {
                    Ok(parent) => fields.derived_from = Some(parent),
                    Err(e) => problems.push(DirectiveErrorKind::InvalidDerivedFrom(e)),
                }
            }
            _ => return Err(DirectiveErrorKind::UnknownOption(name)),
        }
    }

    fields.description = body[consumed..]
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Ok((Requirement::new(id, fields, location), problems))
}

/// Parses the option list at the top of a directive body.
///
/// Returns the options in order and the number of body lines they occupy.
fn parse_options(body: &[&str]) -> (Vec<(String, String)>, usize) {
    let mut options: Vec<(String, String)> = Vec::new();
    let mut option_indent = 0;
    let mut consumed = 0;

    for line in body {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break;
        }

        if let Some(captures) = OPTION.captures(trimmed) {
            option_indent = indentation(line);
            let value = captures.get(2).map_or("", |m| m.as_str()).trim();
            options.push((captures[1].to_string(), value.to_string()));
        } else {
            match options.last_mut() {
                Some((_, value)) if indentation(line) > option_indent => {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(trimmed);
                }
                _ => break,
            }
        }

        consumed += 1;
    }

    (options, consumed)
}

/// The `:req:ref:` roles in a line.
fn references_in_line(line: &str, docname: &str, line_number: usize) -> Vec<CrossReference> {
    ROLE.captures_iter(line)
        .filter(|captures| unlinked_role_text(&captures[1]).is_none())
        .map(|captures| {
            let (target, title) = split_role_content(&captures[1]);
            CrossReference {
                target: target.to_string(),
                title: title.map(str::to_string),
                location: Location::new(docname, line_number),
            }
        })
        .collect()
}

/// Splits role content into target and optional explicit title.
///
/// `REQ-1` has no title; `the boot rule <REQ-1>` has title `the boot rule`.
pub(crate) fn split_role_content(content: &str) -> (&str, Option<&str>) {
    EXPLICIT_TITLE.captures(content).map_or_else(
        || (content.trim(), None),
        |captures| {
            let title = captures.get(1).map_or("", |m| m.as_str());
            let target = captures.get(2).map_or("", |m| m.as_str());
            (target.trim(), Some(title))
        },
    )
}

/// The text shown for a role whose content starts with `!`.
///
/// Such a role is plain text, not a reference: `!REQ-1` shows `REQ-1` and
/// `!the boot rule <REQ-1>` shows `the boot rule`. Returns `None` for an
/// ordinary reference.
pub(crate) fn unlinked_role_text(content: &str) -> Option<&str> {
    let rest = content.trim_start().strip_prefix('!')?;
    let (target, title) = split_role_content(rest);
    Some(title.unwrap_or(target))
}

/// The regular expression matching `:req:ref:` roles.
pub(crate) fn role_pattern() -> &'static Regex {
    &ROLE
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn parse(source: &str) -> SourceDocument {
        SourceDocument::parse("index", source)
    }

    #[test]
    fn parses_complete_block() {
        let document = parse(
            "Title\n=====\n\n.. requirement:: REQ-2\n   :rationale: Operators need a stable boot.\n   :derivedfrom: REQ-1\n\n   The core shall reset all\n   registers on power-up.\n\nAfter the block.\n",
        );

        assert!(document.errors().is_empty());
        let [block] = document.blocks() else {
            panic!("expected one block, got {:?}", document.blocks());
        };
        assert_eq!(block.lines, 3..9);
        assert_eq!(block.indent, 0);

        let req = &block.requirement;
        assert_eq!(req.id().as_str(), "REQ-2");
        assert_eq!(
            req.description(),
            "The core shall reset all registers on power-up."
        );
        assert_eq!(req.rationale(), Some("Operators need a stable boot."));
        assert_eq!(req.derived_from().map(RequirementId::as_str), Some("REQ-1"));
        assert_eq!(req.location(), &Location::new("index", 4));
    }

    #[test]
    fn minimal_block_has_description_only() {
        let document = parse(".. requirement:: REQ-1\n\n   desc\n");

        let req = document.requirements().next().unwrap();
        assert_eq!(req.description(), "desc");
        assert_eq!(req.rationale(), None);
        assert_eq!(req.derived_from(), None);
    }

    #[test]
    fn block_ends_at_dedent_and_excludes_trailing_blank_lines() {
        let document = parse(".. requirement:: REQ-1\n\n   desc\n\n\nNext paragraph.\n");

        assert_eq!(document.blocks()[0].lines, 0..3);
    }

    #[test]
    fn block_without_trailing_newline_runs_to_end() {
        let document = parse(".. requirement:: REQ-1\n\n   desc");

        assert_eq!(document.blocks()[0].lines, 0..3);
        assert_eq!(document.blocks()[0].requirement.description(), "desc");
    }

    #[test]
    fn nested_block_respects_its_own_indent() {
        let document = parse(
            ".. note::\n\n   .. requirement:: REQ-1\n\n      nested\n\n   Back in the note.\n",
        );

        let block = &document.blocks()[0];
        assert_eq!(block.indent, 3);
        assert_eq!(block.lines, 2..5);
        assert_eq!(block.requirement.description(), "nested");
    }

    #[test]
    fn multiple_blocks_keep_source_order() {
        let document = parse(
            ".. requirement:: B-1\n\n   first\n\n.. requirement:: A-1\n\n   second\n",
        );

        let ids: Vec<_> = document.requirements().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, ["B-1", "A-1"]);
    }

    #[test]
    fn extra_positional_arguments_are_ignored() {
        let document = parse(".. requirement:: REQ-1 functional high\n\n   desc\n");

        assert!(document.errors().is_empty());
        assert_eq!(document.blocks()[0].requirement.id().as_str(), "REQ-1");
    }

    #[test]
    fn option_values_can_continue_on_following_lines() {
        let document = parse(
            ".. requirement:: REQ-1\n   :rationale: first part\n      second part\n\n   desc\n",
        );

        assert_eq!(
            document.blocks()[0].requirement.rationale(),
            Some("first part second part")
        );
    }

    #[test]
    fn empty_rationale_is_kept() {
        let document = parse(".. requirement:: REQ-1\n   :rationale:\n\n   desc\n");

        assert_eq!(document.blocks()[0].requirement.rationale(), Some(""));
    }

    #[test]
    fn body_without_blank_line_after_options_is_description() {
        let document = parse(".. requirement:: REQ-1\n   :rationale: why\n   desc\n");

        let req = &document.blocks()[0].requirement;
        assert_eq!(req.rationale(), Some("why"));
        assert_eq!(req.description(), "desc");
    }

    #[test_case(".. requirement::\n\n   desc\n", DirectiveErrorKind::MissingIdentifier; "missing identifier")]
    #[test_case(".. requirement:: A B C D\n", DirectiveErrorKind::TooManyArguments(4); "too many arguments")]
    #[test_case(".. requirement:: A\n   :priority: high\n", DirectiveErrorKind::UnknownOption("priority".to_string()); "unknown option")]
    #[test_case(".. requirement:: A\n   :rationale: x\n   :rationale: y\n", DirectiveErrorKind::DuplicateOption("rationale".to_string()); "duplicate rationale")]
    #[test_case(".. requirement:: A\n   :derivedfrom: B\n   :derivedfrom: C\n", DirectiveErrorKind::DuplicateOption("derivedfrom".to_string()); "duplicate derivedfrom")]
    fn malformed_blocks_are_errors(source: &str, expected: DirectiveErrorKind) {
        let document = parse(source);

        assert!(document.blocks().is_empty());
        let [error] = document.errors() else {
            panic!("expected one error, got {:?}", document.errors());
        };
        assert_eq!(error.location, Location::new("index", 1));
        assert_eq!(error.lines.start, 0);
        assert_eq!(error.kind, expected);
    }

    #[test_case(".. requirement:: REQ-2\n   :derivedfrom:\n\n   desc\n", InvalidIdError::Empty; "empty")]
    #[test_case(".. requirement:: REQ-2\n   :derivedfrom: REQ-1 REQ-3\n\n   desc\n", InvalidIdError::Whitespace("REQ-1 REQ-3".to_string()); "whitespace")]
    fn invalid_derivedfrom_keeps_requirement_without_link(source: &str, expected: InvalidIdError) {
        let document = parse(source);

        assert!(document.errors().is_empty());
        let req = document.requirements().next().unwrap();
        assert_eq!(req.id().as_str(), "REQ-2");
        assert_eq!(req.description(), "desc");
        assert_eq!(req.derived_from(), None);

        let [warning] = document.warnings() else {
            panic!("expected one warning, got {:?}", document.warnings());
        };
        assert_eq!(warning.location, Location::new("index", 1));
        assert_eq!(warning.kind, DirectiveErrorKind::InvalidDerivedFrom(expected));
    }

    #[test]
    fn invalid_derivedfrom_is_a_warning_issue() {
        let document = parse(".. requirement:: REQ-2\n   :derivedfrom: REQ-1 REQ-3\n\n   desc\n");

        let issue = Issue::from(document.warnings()[0].clone());

        assert_eq!(issue.severity(), crate::domain::Severity::Warning);
        assert!(matches!(issue, Issue::InvalidDerivation { .. }));
    }

    #[test]
    fn duplicate_derivedfrom_is_an_error_even_if_first_is_invalid() {
        let document = parse(".. requirement:: A\n   :derivedfrom:\n   :derivedfrom: B\n");

        assert!(document.blocks().is_empty());
        assert_eq!(
            document.errors()[0].kind,
            DirectiveErrorKind::DuplicateOption("derivedfrom".to_string())
        );
    }

    #[test]
    fn malformed_block_does_not_stop_parsing() {
        let document = parse(".. requirement::\n\n   broken\n\n.. requirement:: REQ-1\n\n   ok\n");

        assert_eq!(document.errors().len(), 1);
        assert_eq!(document.blocks().len(), 1);
        assert_eq!(document.blocks()[0].requirement.location().line, 5);
    }

    #[test]
    fn collects_references_outside_blocks() {
        let document = parse(
            "See :req:ref:`REQ-1` and :req:ref:`the boot rule <REQ-2>`.\n\n.. requirement:: REQ-3\n\n   Unlike :req:ref:`REQ-9`.\n\nAlso :req:ref:`REQ-3`.\n",
        );

        let references: Vec<_> = document
            .references()
            .iter()
            .map(|r| (r.target.as_str(), r.title.as_deref(), r.location.line))
            .collect();
        assert_eq!(
            references,
            [
                ("REQ-1", None, 1),
                ("REQ-2", Some("the boot rule"), 1),
                ("REQ-3", None, 7),
            ]
        );
    }

    #[test_case("REQ-1", "REQ-1", None; "bare target")]
    #[test_case(" REQ-1 ", "REQ-1", None; "padded target")]
    #[test_case("boot <REQ-1>", "REQ-1", Some("boot"); "explicit title")]
    #[test_case("a <b> c <REQ-1>", "REQ-1", Some("a <b> c"); "angle brackets in title")]
    fn splits_role_content(content: &str, target: &str, title: Option<&str>) {
        assert_eq!(split_role_content(content), (target, title));
    }

    #[test_case("!REQ-1", Some("REQ-1"); "bare target")]
    #[test_case(" !REQ-1", Some("REQ-1"); "leading space")]
    #[test_case("!the boot rule <REQ-1>", Some("the boot rule"); "explicit title")]
    #[test_case("REQ-1", None; "ordinary reference")]
    #[test_case("boot <!REQ-1>", None; "marker inside target")]
    fn unlinked_roles(content: &str, text: Option<&str>) {
        assert_eq!(unlinked_role_text(content), text);
    }

    #[test]
    fn unlinked_roles_are_not_references() {
        let document = parse("See :req:ref:`!REQ-1`, :req:ref:`!boot <REQ-404>` and :req:ref:`REQ-2`.\n");

        let targets: Vec<_> = document.references().iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, ["REQ-2"]);
    }

    #[test]
    fn into_parts_returns_everything() {
        let document = parse(".. requirement::\n\n.. requirement:: R-1\n\n   x\n\n:req:ref:`R-1`\n");

        let (requirements, references, errors) = document.into_parts();
        assert_eq!(requirements.len(), 1);
        assert_eq!(references.len(), 1);
        assert_eq!(errors.len(), 1);
    }
}
