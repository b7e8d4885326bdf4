//! Error types for artifact generation.

use std::io;
use std::path::PathBuf;

use benchforge_core::DefinitionError;
use thiserror::Error;

/// Failure to write a report artifact.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot serialize plot description `{name}`: {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| ReportError::Io { path, source }
    }
}
