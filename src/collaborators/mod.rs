//! External collaborator seams: the Ingestor and the Answerer.
//!
//! The session core never parses documents or produces answers itself; it
//! orchestrates two abstract services reached through the traits in this
//! module. Implementations are expected to be slow (network I/O, model
//! inference) — the pipelines bound every call with a configurable timeout
//! and treat expiry as an ordinary failure.
//!
//! Collaborators receive inputs and return results by value. They never hold
//! references into the session store, so nothing they do can mutate session
//! state behind the manager's back.
//!
//! [`stubs`] provides latency- and failure-scriptable implementations for
//! tests and demos.

pub mod stubs;

pub use stubs::{StubAnswerer, StubIngestor};

use async_trait::async_trait;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque token identifying an ingested document inside the Ingestor.
///
/// Produced by [`Ingestor::ingest`] and later presented verbatim to
/// [`Answerer::answer`]. The session core stores it and passes it through;
/// the contents are meaningful only to the collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHandle(String);

impl DocumentHandle {
    /// Wrap a collaborator-issued token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for collaborators that need it back.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.0
    }
}

/// Converts a raw uploaded file into a queryable document representation.
///
/// Called at most once per document, from the ingestion pipeline, after the
/// declared media type has already passed the session's allow-list. The
/// implementation may still reject the payload (corrupt bytes, a type it
/// cannot handle) by returning an [`IngestError`].
#[async_trait]
pub trait Ingestor: Send + Sync {
    /// Ingest `bytes` declared as `media_type`, yielding an opaque handle.
    async fn ingest(&self, bytes: &[u8], media_type: &str) -> Result<DocumentHandle, IngestError>;
}

/// Produces a natural-language answer for a question about one document.
///
/// Called once per Q&A entry, from the query pipeline, with the handle the
/// Ingestor issued for the target document.
#[async_trait]
pub trait Answerer: Send + Sync {
    /// Answer `question` against the document identified by `handle`.
    async fn answer(&self, handle: &DocumentHandle, question: &str) -> Result<String, AnswerError>;
}

/// Failure reported by an [`Ingestor`] implementation.
#[derive(Debug, Error, Diagnostic)]
pub enum IngestError {
    /// The payload could not be converted despite an accepted media type.
    #[error("unprocessable document ({media_type}): {reason}")]
    #[diagnostic(
        code(docweave::collaborators::unprocessable),
        help("The file may be corrupt or mislabeled; re-export and re-upload it.")
    )]
    Unprocessable { media_type: String, reason: String },

    /// The backing service failed.
    #[error("ingestor backend error: {message}")]
    #[diagnostic(code(docweave::collaborators::ingest_backend))]
    Backend { message: String },
}

/// Failure reported by an [`Answerer`] implementation.
#[derive(Debug, Error, Diagnostic)]
pub enum AnswerError {
    /// The handle was not recognized by the Answerer.
    #[error("unknown document handle")]
    #[diagnostic(
        code(docweave::collaborators::unknown_handle),
        help("The document may have expired on the answering service; re-upload it.")
    )]
    UnknownHandle,

    /// The backing service failed.
    #[error("answerer backend error: {message}")]
    #[diagnostic(code(docweave::collaborators::answer_backend))]
    Backend { message: String },
}
