//! GitHub-flavoured Markdown output.

use super::{Cell, Row};
use crate::domain::{Index, Link, Resolver};

/// Renders a requirement table, preceded by an HTML anchor so links to the
/// requirement land on it.
pub(super) fn table(anchor: &str, rows: &[Row]) -> String {
    let mut out = format!("<a id=\"{}\"></a>\n\n", escape_attribute(anchor));

    for (i, row) in rows.iter().enumerate() {
        out.push_str(&format!("| **{}** | {} |\n", row.label, cell(&row.value)));
        if i == 0 {
            out.push_str("| --- | --- |\n");
        }
    }

    out
}

fn cell(value: &Cell) -> String {
    match value {
        Cell::Text(text) => escape(text),
        Cell::Link(target) => link(target),
        Cell::Literal(text) => literal(text),
    }
}

pub(super) fn link(target: &Link) -> String {
    format!(
        "[{}]({})",
        escape_inline(&target.text),
        encode_href(&target.href)
    )
}

pub(super) fn literal(text: &str) -> String {
    format!("`{}`", text.replace('`', "'"))
}

/// Escapes text for a table cell.
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace('\n', " ")
}

/// Escapes text that must not be read as inline markup, such as link text.
fn escape_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '(' | ')' | '<' | '>' | '|' | '!' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attribute(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encodes every path segment and the fragment of a relative link,
/// keeping the `/` and `#` delimiters.
fn encode_href(href: &str) -> String {
    let (path, fragment) = href.split_once('#').map_or((href, None), |(p, f)| (p, Some(f)));

    let mut out = path
        .split('/')
        .map(|segment| match segment {
            ".." | "" => segment.into(),
            _ => urlencoding::encode(segment),
        })
        .collect::<Vec<_>>()
        .join("/");

    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(&urlencoding::encode(fragment));
    }
    out
}

pub(super) fn index_page(
    title: &str,
    index: &Index,
    resolver: &Resolver<'_>,
    from_docname: &str,
) -> String {
    let mut out = format!("# {title}\n");

    for group in &index.groups {
        out.push_str(&format!("\n## {}\n\n", group.key));
        for entry in &group.entries {
            let href = resolver.href(from_docname, &entry.docname, &entry.anchor);
            out.push_str(&format!(
                "- [{}]({}) ({})\n",
                escape_inline(&entry.name),
                encode_href(&href),
                escape_inline(&entry.docname)
            ));
        }
    }

    out
}
