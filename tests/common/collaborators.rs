//! Gated and counting collaborator doubles.
//!
//! The crate's own stubs cover fixed latency and scripted failure; the
//! doubles here add what concurrency tests need: an external gate that holds
//! a call open until the test releases it, and call counting.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use docweave::collaborators::{
    AnswerError, Answerer, DocumentHandle, IngestError, Ingestor,
};

/// A gate a collaborator call blocks on until the test opens it.
#[derive(Clone, Debug)]
pub struct Gate(Arc<Semaphore>);

impl Gate {
    pub fn closed() -> Self {
        Self(Arc::new(Semaphore::new(0)))
    }

    /// Allow one blocked (or future) call through.
    pub fn open_one(&self) {
        self.0.add_permits(1);
    }

    async fn pass(&self) {
        let permit = self.0.acquire().await.expect("gate semaphore closed");
        permit.forget();
    }
}

/// Ingestor that waits on a [`Gate`] before completing and counts its calls.
pub struct GatedIngestor {
    gate: Gate,
    calls: AtomicUsize,
}

impl GatedIngestor {
    pub fn new(gate: Gate) -> Self {
        Self {
            gate,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Ingestor for GatedIngestor {
    async fn ingest(&self, bytes: &[u8], media_type: &str) -> Result<DocumentHandle, IngestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.pass().await;
        Ok(DocumentHandle::new(format!(
            "gated:{media_type}:{}",
            bytes.len()
        )))
    }
}

/// Answerer that waits on a [`Gate`] before echoing the question back.
pub struct GatedAnswerer {
    gate: Gate,
    calls: AtomicUsize,
}

impl GatedAnswerer {
    pub fn new(gate: Gate) -> Self {
        Self {
            gate,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Answerer for GatedAnswerer {
    async fn answer(&self, _handle: &DocumentHandle, question: &str) -> Result<String, AnswerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.pass().await;
        Ok(format!("echo: {question}"))
    }
}

/// Answerer that gates only questions containing a marker substring; all
/// other questions answer immediately. Lets one slow call coexist with fast
/// ones behind a single collaborator instance.
pub struct SelectiveAnswerer {
    gate: Gate,
    marker: &'static str,
}

impl SelectiveAnswerer {
    pub fn new(gate: Gate, marker: &'static str) -> Self {
        Self { gate, marker }
    }
}

#[async_trait]
impl Answerer for SelectiveAnswerer {
    async fn answer(&self, _handle: &DocumentHandle, question: &str) -> Result<String, AnswerError> {
        if question.contains(self.marker) {
            self.gate.pass().await;
        }
        Ok(format!("echo: {question}"))
    }
}
