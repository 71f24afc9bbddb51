use thiserror::Error;

/// Failures the pipelines report instead of absorbing.
///
/// Unparseable dates and list lines, and failed fetches, are not errors;
/// they are skipped or degrade to empty content.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A source document could not be opened or decoded.
    #[error("Failed to read document {path}: {reason}")]
    DocumentRead {
        /// Path of the document.
        path: String,
        /// What went wrong.
        reason: String,
    },
    /// The trends pipeline was given the wrong number of documents.
    #[error("Expected exactly {expected} category documents but got {actual}")]
    InputShape { expected: usize, actual: usize },
}

impl PipelineError {
    pub(crate) fn read(path: &std::path::Path, reason: impl ToString) -> Self {
        PipelineError::DocumentRead {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}
