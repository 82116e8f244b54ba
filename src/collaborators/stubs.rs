//! Scriptable stand-in collaborators.
//!
//! [`StubIngestor`] and [`StubAnswerer`] replace the fixed artificial delays
//! of a mocked frontend with genuine awaited async work: an optional
//! `tokio::time::sleep` latency plus a scripted success or failure. They are
//! the default collaborators for tests and demos; production callers supply
//! real [`Ingestor`]/[`Answerer`] implementations.

use std::time::Duration;

use async_trait::async_trait;

use super::{AnswerError, Answerer, DocumentHandle, IngestError, Ingestor};

/// An [`Ingestor`] that sleeps for a configured latency and then succeeds,
/// issuing a handle derived from the payload, or fails with a scripted reason.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use docweave::collaborators::StubIngestor;
///
/// // Succeeds after 50ms.
/// let ingestor = StubIngestor::new().with_latency(Duration::from_millis(50));
///
/// // Always fails.
/// let broken = StubIngestor::new().failing_with("parser exploded");
/// ```
#[derive(Debug, Default)]
pub struct StubIngestor {
    latency: Option<Duration>,
    failure: Option<String>,
}

impl StubIngestor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long before completing.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail every call with the given backend reason.
    #[must_use]
    pub fn failing_with(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }
}

#[async_trait]
impl Ingestor for StubIngestor {
    async fn ingest(&self, bytes: &[u8], media_type: &str) -> Result<DocumentHandle, IngestError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(reason) = &self.failure {
            return Err(IngestError::Backend {
                message: reason.clone(),
            });
        }
        Ok(DocumentHandle::new(format!(
            "stub:{media_type}:{}",
            bytes.len()
        )))
    }
}

/// An [`Answerer`] that sleeps for a configured latency and then returns a
/// canned answer echoing the question, or fails with a scripted reason.
#[derive(Debug, Default)]
pub struct StubAnswerer {
    latency: Option<Duration>,
    failure: Option<String>,
}

impl StubAnswerer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long before completing.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail every call with the given backend reason.
    #[must_use]
    pub fn failing_with(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }
}

#[async_trait]
impl Answerer for StubAnswerer {
    async fn answer(&self, handle: &DocumentHandle, question: &str) -> Result<String, AnswerError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(reason) = &self.failure {
            return Err(AnswerError::Backend {
                message: reason.clone(),
            });
        }
        Ok(format!(
            "Answer derived from document {}: {question}",
            handle.token()
        ))
    }
}
