//! Document names
//!
//! A document name identifies a source file independently of the platform:
//! the path relative to the project root, with `/` separators and without
//! extension.
//!
//! - Example: `root/index.rst` → `index`
//! - Example: `root/design/core.rst` → `design/core`

use std::path::{Component, Path, PathBuf};

/// Derive the document name of a source file.
///
/// # Errors
///
/// Returns an error if:
/// - The path is not below `root`
/// - A path component is not valid UTF-8
/// - The path has no file name
pub fn docname_from_path(path: &Path, root: &Path) -> Result<String, ParseError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| ParseError::OutsideRoot(path.to_path_buf()))?;

    let stem = relative
        .file_stem()
        .ok_or_else(|| ParseError::InvalidPath(path.to_path_buf()))?
        .to_str()
        .ok_or_else(|| ParseError::InvalidPath(path.to_path_buf()))?;

    let mut segments = relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| match c {
                    Component::Normal(s) => Some(
                        s.to_str()
                            .ok_or_else(|| ParseError::InvalidPath(path.to_path_buf())),
                    ),
                    _ => None,
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();

    segments.push(stem);
    Ok(segments.join("/"))
}

/// Construct the output path of a document.
///
/// ```
/// use std::path::Path;
///
/// use reqdoc::storage::construct_path_from_docname;
///
/// let path = construct_path_from_docname(Path::new("out"), "design/core", "md");
/// assert_eq!(path, Path::new("out/design/core.md"));
/// ```
#[must_use]
pub fn construct_path_from_docname(root: &Path, docname: &str, extension: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    let mut segments = docname.split('/').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_some() {
            path.push(segment);
        } else {
            // the last segment may contain dots of its own
            path.push(format!("{segment}.{extension}"));
        }
    }
    path
}

/// Errors that can occur when deriving a document name.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    /// The path is not inside the project root.
    #[error("{} is not inside the project root", .0.display())]
    OutsideRoot(PathBuf),
    /// The path has no file name or is not valid UTF-8.
    #[error("invalid document path {}", .0.display())]
    InvalidPath(PathBuf),
}
