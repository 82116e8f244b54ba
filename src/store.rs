//! The in-memory document registry for one session.
//!
//! [`DocumentStore`] is a pure state container: every operation is
//! synchronous, non-blocking, and either applies a single consistent change
//! or returns an error with no mutation. All orchestration (spawning
//! pipelines, timeouts, cancellation) lives above it in
//! [`crate::manager`] and [`crate::pipelines`].
//!
//! # Snapshots
//!
//! Consumers never see the live registry. [`DocumentStore::snapshot`] clones
//! the documents into an immutable [`SessionSnapshot`] in display order
//! (newest upload first); mutating the store afterwards does not affect a
//! snapshot already taken.
//!
//! # Completion races
//!
//! Two writers can race on the same record: a slow success completing after a
//! failure (or after a delete), and vice versa. The store resolves these with
//! a terminal-state guard — [`settle_document`](DocumentStore::settle_document)
//! and [`resolve_answer`](DocumentStore::resolve_answer) write only if the
//! current state is non-terminal and report `Ok(false)` otherwise, so the
//! first completion wins and later ones are benign no-ops.
//!
//! # Examples
//!
//! ```rust
//! use docweave::store::DocumentStore;
//! use docweave::types::DocumentStatus;
//!
//! let mut store = DocumentStore::new();
//! let id = store.create_document("report.pdf", "application/pdf", 2048);
//!
//! store.update_status(id, DocumentStatus::Processing).unwrap();
//!
//! let snapshot = store.snapshot();
//! assert_eq!(snapshot.documents.len(), 1);
//! assert_eq!(snapshot.documents[0].status, DocumentStatus::Processing);
//! ```

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collaborators::DocumentHandle;
use crate::document::{Document, QaEntry};
use crate::types::{DocumentId, DocumentStatus, QaId, QaStatus};

/// Errors returned by store operations.
///
/// Every variant is a validation-class error: the operation performed no
/// mutation. Staleness (`NotFound` for an id that existed a moment ago) is a
/// normal, recoverable race for pipeline writers, not a fatal condition.
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    /// The referenced document does not exist (never did, or was deleted).
    #[error("document not found: {id}")]
    #[diagnostic(code(docweave::store::document_not_found))]
    DocumentNotFound { id: DocumentId },

    /// The referenced history entry does not exist on that document.
    #[error("question entry not found: {qa_id} on document {id}")]
    #[diagnostic(code(docweave::store::entry_not_found))]
    EntryNotFound { id: DocumentId, qa_id: QaId },

    /// The requested status change violates the monotonic lifecycle order.
    #[error("invalid status transition: {from} -> {to}")]
    #[diagnostic(
        code(docweave::store::invalid_transition),
        help("Document status only moves uploading -> processing -> ready | failed.")
    )]
    InvalidTransition {
        from: DocumentStatus,
        to: DocumentStatus,
    },

    /// Questions require the document to be `Ready`.
    #[error("document not ready for questions: {id} is {status}")]
    #[diagnostic(
        code(docweave::store::document_not_ready),
        help("Wait for ingestion to finish; only ready documents accept questions.")
    )]
    DocumentNotReady {
        id: DocumentId,
        status: DocumentStatus,
    },
}

/// Terminal outcome of an ingestion attempt, applied via
/// [`DocumentStore::settle_document`].
#[derive(Clone, Debug)]
pub enum IngestOutcome {
    /// Ingestion succeeded; the document becomes `Ready` with this handle.
    Ready(DocumentHandle),
    /// Ingestion failed or timed out with this reason.
    Failed(String),
}

/// Terminal outcome of a query attempt, applied via
/// [`DocumentStore::resolve_answer`].
#[derive(Clone, Debug)]
pub enum AnswerOutcome {
    /// The Answerer produced this text.
    Answered(String),
    /// The Answerer failed or timed out with this reason.
    Failed(String),
}

/// Immutable copy of the session's visible state at one point in time.
///
/// Documents appear in display order: newest upload first. Taking two
/// snapshots with no intervening mutation yields equal values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// All documents, newest upload first.
    pub documents: Vec<Document>,
    /// The currently selected document, if any; always references an entry
    /// in `documents`.
    pub selected: Option<DocumentId>,
}

impl SessionSnapshot {
    /// Look up a document in this snapshot by id.
    #[must_use]
    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    /// The selected document record, if a selection exists.
    #[must_use]
    pub fn selected_document(&self) -> Option<&Document> {
        self.selected.and_then(|id| self.document(id))
    }
}

/// In-memory registry of documents and their Q&A history for one session.
///
/// Owned exclusively by the session manager; pipeline tasks reach it only
/// through the manager's lock, and external collaborators never hold
/// references into it.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: FxHashMap<DocumentId, Document>,
    /// Display order, newest upload first.
    order: Vec<DocumentId>,
    selected: Option<DocumentId>,
}

impl DocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new document in the `Uploading` state and return its id.
    ///
    /// Never blocks and never fails; media-type validation happens in the
    /// facade before the document is created.
    pub fn create_document(
        &mut self,
        name: impl Into<String>,
        media_type: impl Into<String>,
        size_bytes: u64,
    ) -> DocumentId {
        let doc = Document::new(name, media_type, size_bytes);
        let id = doc.id;
        self.documents.insert(id, doc);
        self.order.insert(0, id);
        id
    }

    /// Apply a monotonic status transition.
    ///
    /// Fails with [`StoreError::DocumentNotFound`] if `id` is absent and
    /// [`StoreError::InvalidTransition`] for any move that is not the next
    /// step of `Uploading → Processing → Ready | Failed`.
    pub fn update_status(
        &mut self,
        id: DocumentId,
        status: DocumentStatus,
    ) -> Result<(), StoreError> {
        let doc = self
            .documents
            .get_mut(&id)
            .ok_or(StoreError::DocumentNotFound { id })?;
        if !doc.status.can_transition_to(&status) {
            return Err(StoreError::InvalidTransition {
                from: doc.status.clone(),
                to: status,
            });
        }
        doc.status = status;
        Ok(())
    }

    /// Write the terminal outcome of an ingestion attempt, first completion
    /// wins.
    ///
    /// Returns `Ok(true)` if the write applied, `Ok(false)` if the document
    /// already reached a terminal status (a later completion losing the
    /// race — benign). Fails with [`StoreError::DocumentNotFound`] if the
    /// document was deleted mid-flight, which callers treat the same way.
    pub fn settle_document(
        &mut self,
        id: DocumentId,
        outcome: IngestOutcome,
    ) -> Result<bool, StoreError> {
        let doc = self
            .documents
            .get_mut(&id)
            .ok_or(StoreError::DocumentNotFound { id })?;
        if doc.status.is_terminal() {
            return Ok(false);
        }
        let status = match &outcome {
            IngestOutcome::Ready(_) => DocumentStatus::Ready,
            IngestOutcome::Failed(reason) => DocumentStatus::Failed(reason.clone()),
        };
        if !doc.status.can_transition_to(&status) {
            return Err(StoreError::InvalidTransition {
                from: doc.status.clone(),
                to: status,
            });
        }
        doc.status = status;
        if let IngestOutcome::Ready(handle) = outcome {
            doc.handle = Some(handle);
        }
        Ok(true)
    }

    /// Insert a `Pending` entry at the head of the document's history.
    ///
    /// Fails with [`StoreError::DocumentNotFound`] if the document is absent
    /// and [`StoreError::DocumentNotReady`] unless it is `Ready`.
    pub fn append_question(
        &mut self,
        id: DocumentId,
        question: impl Into<String>,
    ) -> Result<QaId, StoreError> {
        let doc = self
            .documents
            .get_mut(&id)
            .ok_or(StoreError::DocumentNotFound { id })?;
        if !doc.status.is_ready() {
            return Err(StoreError::DocumentNotReady {
                id,
                status: doc.status.clone(),
            });
        }
        let entry = QaEntry::new(question);
        let qa_id = entry.id;
        doc.history.insert(0, entry);
        Ok(qa_id)
    }

    /// Write the terminal outcome of a query attempt, first completion wins.
    ///
    /// Returns `Ok(true)` if the write applied and `Ok(false)` if the entry
    /// already settled. Fails with a `NotFound` variant when either id is
    /// stale (document deleted or history gone mid-flight) — for pipeline
    /// writers this is the normal shape of losing a race with deletion.
    pub fn resolve_answer(
        &mut self,
        id: DocumentId,
        qa_id: QaId,
        outcome: AnswerOutcome,
    ) -> Result<bool, StoreError> {
        let doc = self
            .documents
            .get_mut(&id)
            .ok_or(StoreError::DocumentNotFound { id })?;
        let entry = doc
            .entry_mut(qa_id)
            .ok_or(StoreError::EntryNotFound { id, qa_id })?;
        if entry.status.is_terminal() {
            return Ok(false);
        }
        match outcome {
            AnswerOutcome::Answered(text) => {
                entry.answer = Some(text);
                entry.status = QaStatus::Answered;
            }
            AnswerOutcome::Failed(reason) => {
                entry.status = QaStatus::Failed(reason);
            }
        }
        entry.answered_at = Some(chrono::Utc::now());
        Ok(true)
    }

    /// Mark a document as the current selection.
    pub fn select_document(&mut self, id: DocumentId) -> Result<(), StoreError> {
        if !self.documents.contains_key(&id) {
            return Err(StoreError::DocumentNotFound { id });
        }
        self.selected = Some(id);
        Ok(())
    }

    /// Remove a document, returning the removed record.
    ///
    /// Clears the selection if it pointed at the deleted document. In-flight
    /// pipeline results for the removed id subsequently observe `NotFound`
    /// and drop their work.
    pub fn delete_document(&mut self, id: DocumentId) -> Result<Document, StoreError> {
        let doc = self
            .documents
            .remove(&id)
            .ok_or(StoreError::DocumentNotFound { id })?;
        self.order.retain(|entry| *entry != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        Ok(doc)
    }

    /// Read access to a live document record.
    #[must_use]
    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    /// The current selection, if any.
    #[must_use]
    pub fn selected(&self) -> Option<DocumentId> {
        self.selected
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Clone the visible state into an immutable snapshot, newest upload
    /// first.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let documents = self
            .order
            .iter()
            .filter_map(|id| self.documents.get(id).cloned())
            .collect();
        SessionSnapshot {
            documents,
            selected: self.selected,
        }
    }

    /// Drop every document and the selection (logout path).
    pub fn clear(&mut self) {
        self.documents.clear();
        self.order.clear();
        self.selected = None;
    }
}
