//! Error types for the `hrkb-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval and document-lifecycle operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// A document could not be read or its format is unsupported.
    #[error("Load error ({path}): {message}")]
    Load {
        /// The file path or URL that failed to load.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    Search {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// An update deleted the old document but failed to ingest the new one.
    ///
    /// The source is now absent from the store. Callers must treat this
    /// differently from an update that failed with the old document intact.
    #[error("Update of '{source}' deleted the old document but re-ingestion failed: {cause}")]
    UpdateIncomplete {
        /// The source identifier that is now absent.
        source: String,
        /// The underlying ingestion failure.
        #[source]
        cause: Box<RagError>,
    },
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
