use thiserror::Error;

use crate::frontmatter::FrontmatterError;

/// Errors that can abort a compile.
///
/// Degraded content (unknown languages, malformed highlight descriptors,
/// escaped raw HTML) never surfaces here; those paths log and keep going.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The markdown parser rejected the document.
    #[error("markdown parse error: {0}")]
    Parse(String),
    /// The metadata block was present but unusable.
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
}
