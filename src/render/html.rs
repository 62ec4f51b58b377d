//! HTML output.

use super::{Cell, Row};
use crate::domain::{Index, Link, Resolver};

/// Renders a requirement table with a 20/80 column split.
pub(super) fn table(anchor: &str, rows: &[Row]) -> String {
    let mut out = format!(
        "<table id=\"{}\" class=\"colwidths-given requirement\">\n\
         <colgroup><col style=\"width: 20%\"><col style=\"width: 80%\"></colgroup>\n\
         <tbody>\n",
        escape(anchor)
    );

    for row in rows {
        out.push_str(&format!(
            "<tr><td><strong>{}</strong></td><td><p>{}</p></td></tr>\n",
            row.label,
            cell(&row.value)
        ));
    }

    out.push_str("</tbody>\n</table>\n");
    out
}

fn cell(value: &Cell) -> String {
    match value {
        Cell::Text(text) => escape(text),
        Cell::Link(target) => link(target),
        Cell::Literal(text) => literal(text),
    }
}

fn link(target: &Link) -> String {
    format!(
        "<a class=\"reference internal\" href=\"{}\">{}</a>",
        escape(&target.href),
        literal(&target.text)
    )
}

fn literal(text: &str) -> String {
    format!("<code class=\"xref req req-ref\">{}</code>", escape(text))
}

fn escape(text: &str) -> String {
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

pub(super) fn index_page(
    title: &str,
    index: &Index,
    resolver: &Resolver<'_>,
    from_docname: &str,
) -> String {
    let mut out = format!("<h1>{}</h1>\n", escape(title));

    for group in &index.groups {
        out.push_str(&format!(
            "<h2>{}</h2>\n<ul>\n",
            escape(&group.key.to_string())
        ));
        for entry in &group.entries {
            let href = resolver.href(from_docname, &entry.docname, &entry.anchor);
            out.push_str(&format!(
                "<li><a href=\"{}\">{}</a> <em>{}</em></li>\n",
                escape(&href),
                escape(&entry.name),
                escape(&entry.docname)
            ));
        }
        out.push_str("</ul>\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<b>"a" & b</b>"#),
            "&lt;b&gt;&quot;a&quot; &amp; b&lt;/b&gt;"
        );
    }

    #[test]
    fn unresolved_literal_has_no_anchor_element() {
        let out = cell(&Cell::Literal("REQ-404".to_string()));
        assert_eq!(out, "<code class=\"xref req req-ref\">REQ-404</code>");
        assert!(!out.contains("<a "));
    }
}
