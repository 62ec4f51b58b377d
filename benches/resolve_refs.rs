//! This bench test simulates resolving every cross-reference in a large
//! project of interlinked requirements, then rendering the result.

#![allow(missing_docs)]

use std::path::PathBuf;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use reqdoc::{Config, Project, SourceDocument, TableFormat, render::render_project};
use tempfile::TempDir;

const DOCUMENTS: usize = 50;
const REQUIREMENTS_PER_DOCUMENT: usize = 40;

/// Generates documents whose requirements derive from, and refer to,
/// requirements in the previous document.
fn source(doc: usize) -> String {
    let mut out = format!("Document {doc}\n===========\n\n");
    for i in 0..REQUIREMENTS_PER_DOCUMENT {
        out.push_str(&format!(".. requirement:: SYS-{doc}-{i}\n"));
        if doc > 0 {
            out.push_str(&format!("   :derivedfrom: SYS-{}-{i}\n", doc - 1));
        }
        out.push_str("\n   The system shall do something traceable.\n\n");
        out.push_str(&format!(
            "See :req:ref:`SYS-{}-{i}` and :req:ref:`the missing one <GONE-{i}>`.\n\n",
            doc.saturating_sub(1)
        ));
    }
    out
}

fn documents() -> Vec<SourceDocument> {
    (0..DOCUMENTS)
        .map(|doc| SourceDocument::parse(format!("part{}/doc{doc}", doc % 5), source(doc)))
        .collect()
}

fn resolve_refs(c: &mut Criterion) {
    let project = Project::from_documents(PathBuf::from("."), Config::default(), documents());

    c.bench_function("resolve refs", |b| {
        b.iter(|| {
            let resolver = project.resolver();
            project
                .references()
                .filter(|reference| resolver.resolve(reference).is_ok())
                .count()
        });
    });

    c.bench_function("render project", |b| {
        b.iter(|| render_project(&project, TableFormat::Markdown));
    });
}

fn load_project(c: &mut Criterion) {
    c.bench_function("load project", |b| {
        b.iter_batched(
            || {
                let tmp_dir = TempDir::new().unwrap();
                for doc in 0..DOCUMENTS {
                    let path = tmp_dir.path().join(format!("part{}/doc{doc}.rst", doc % 5));
                    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                    std::fs::write(path, source(doc)).unwrap();
                }
                tmp_dir
            },
            |tmp_dir| Project::load(tmp_dir.path().to_path_buf()).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, resolve_refs, load_project);
criterion_main!(benches);
