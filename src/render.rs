//! Rendering of requirement tables, the index page and whole documents.
//!
//! Documents are written as Markdown: prose is passed through, requirement
//! blocks are replaced by their tables and `:req:ref:` roles by links.
//! Tables can be Markdown or raw HTML, both of which Markdown renderers
//! accept.

mod html;
mod markdown;

use serde::Serialize;

use crate::{
    domain::{CrossReference, Index, Link, Location, Requirement, Resolver, Unresolved},
    storage::{
        Project, SourceDocument,
        directive::{role_pattern, split_role_content, unlinked_role_text},
    },
};

/// The document name of the generated index page.
pub const INDEX_DOCNAME: &str = "req-requirement";

/// How requirement tables are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// GitHub-flavoured Markdown tables.
    #[default]
    Markdown,
    /// HTML `<table>` elements.
    Html,
}

/// Rendered output plus every reference that could not be resolved while
/// rendering it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    /// The rendered text.
    pub content: String,
    /// References rendered without a link.
    pub unresolved: Vec<Unresolved>,
}

/// One output page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// The document name the page is written under.
    pub docname: String,
    /// The page content.
    pub content: String,
}

/// Every page of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Site {
    /// One page per source document, then the index page.
    pub pages: Vec<Page>,
    /// References rendered without a link, across all pages.
    pub unresolved: Vec<Unresolved>,
}

struct Row {
    label: &'static str,
    value: Cell,
}

enum Cell {
    Text(String),
    Link(Link),
    Literal(String),
}

/// Renders requirements, resolving references as it goes.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    resolver: Resolver<'a>,
    format: TableFormat,
}

impl<'a> Renderer<'a> {
    /// Creates a renderer writing tables in `format`.
    #[must_use]
    pub const fn new(resolver: Resolver<'a>, format: TableFormat) -> Self {
        Self { resolver, format }
    }

    /// Renders the table of one requirement.
    ///
    /// The table has an ID and a Description row, a Rationale row if the
    /// requirement has a rationale, and a Derived from row if it has a
    /// derivation link. The derivation link is a navigable link if it
    /// resolves, and a plain literal otherwise.
    #[must_use]
    pub fn requirement(&self, requirement: &Requirement) -> Rendered {
        let mut rows = vec![
            Row {
                label: "ID",
                value: Cell::Text(requirement.id().to_string()),
            },
            Row {
                label: "Description",
                value: Cell::Text(requirement.description().to_string()),
            },
        ];

        if let Some(rationale) = requirement.rationale() {
            rows.push(Row {
                label: "Rationale",
                value: Cell::Text(rationale.to_string()),
            });
        }

        let mut unresolved = Vec::new();
        if let Some(parent) = requirement.derived_from() {
            let reference = CrossReference::new(parent.as_str(), requirement.location().clone());
            let value = match self.resolver.resolve(&reference) {
                Ok(link) => Cell::Link(link),
                Err(e) => {
                    tracing::warn!("{e}");
                    unresolved.push(e);
                    Cell::Literal(parent.to_string())
                }
            };
            rows.push(Row {
                label: "Derived from",
                value,
            });
        }

        let anchor = requirement.anchor();
        let content = match self.format {
            TableFormat::Markdown => markdown::table(&anchor, &rows),
            TableFormat::Html => html::table(&anchor, &rows),
        };

        Rendered {
            content,
            unresolved,
        }
    }

    /// Renders the index page.
    #[must_use]
    pub fn index_page(&self, index: &Index, title: &str) -> String {
        match self.format {
            TableFormat::Markdown => {
                markdown::index_page(title, index, &self.resolver, INDEX_DOCNAME)
            }
            TableFormat::Html => html::index_page(title, index, &self.resolver, INDEX_DOCNAME),
        }
    }

    /// Renders a whole document.
    ///
    /// Each requirement block is replaced by its table, indented like the
    /// directive. Every `:req:ref:` role outside requirement blocks is
    /// replaced by a link, or by a literal if it does not resolve. Malformed
    /// blocks are passed through verbatim.
    #[must_use]
    pub fn document(&self, document: &SourceDocument) -> Rendered {
        let lines: Vec<&str> = document.source().lines().collect();
        let mut blocks = document.blocks().iter().peekable();
        let mut errors = document.errors().iter().peekable();

        let mut content = String::new();
        let mut unresolved = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            if let Some(block) = blocks.next_if(|block| block.lines.start == i) {
                let rendered = self.requirement(&block.requirement);
                let indent = " ".repeat(block.indent);
                for line in rendered.content.lines() {
                    if !line.is_empty() {
                        content.push_str(&indent);
                    }
                    content.push_str(line);
                    content.push('\n');
                }
                unresolved.extend(rendered.unresolved);
                i = block.lines.end;
                continue;
            }

            if let Some(error) = errors.next_if(|error| error.lines.start == i) {
                for line in &lines[error.lines.clone()] {
                    content.push_str(line);
                    content.push('\n');
                }
                i = error.lines.end;
                continue;
            }

            let location = Location::new(document.docname(), i + 1);
            content.push_str(&self.substitute_roles(lines[i], &location, &mut unresolved));
            content.push('\n');
            i += 1;
        }

        Rendered {
            content,
            unresolved,
        }
    }

    fn substitute_roles(
        &self,
        line: &str,
        location: &Location,
        unresolved: &mut Vec<Unresolved>,
    ) -> String {
        role_pattern()
            .replace_all(line, |captures: &regex::Captures<'_>| {
                if let Some(text) = unlinked_role_text(&captures[1]) {
                    return markdown::literal(text);
                }

                let (target, title) = split_role_content(&captures[1]);
                let reference = CrossReference {
                    target: target.to_string(),
                    title: title.map(str::to_string),
                    location: location.clone(),
                };

                match self.resolver.resolve(&reference) {
                    Ok(link) => markdown::link(&link),
                    Err(e) => {
                        tracing::warn!("{e}");
                        unresolved.push(e);
                        markdown::literal(reference.text())
                    }
                }
            })
            .into_owned()
    }
}

/// Renders every document of `project` and its index page.
#[must_use]
pub fn render_project(project: &Project, format: TableFormat) -> Site {
    let renderer = Renderer::new(project.resolver(), format);
    let mut site = Site::default();

    for document in project.documents() {
        let rendered = renderer.document(document);
        site.unresolved.extend(rendered.unresolved);
        site.pages.push(Page {
            docname: document.docname().to_string(),
            content: rendered.content,
        });
    }

    site.pages.push(Page {
        docname: INDEX_DOCNAME.to_string(),
        content: renderer.index_page(&project.index(), project.config().index_title()),
    });

    site
}
