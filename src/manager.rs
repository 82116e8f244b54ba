//! The session manager facade.
//!
//! [`SessionManager`] is the single owner of all session state. It exposes
//! the operations the presentation layer consumes — login/logout, upload,
//! select, ask, delete, snapshot, subscribe — each as one atomic state
//! transition plus, where applicable, the dispatch of asynchronous pipeline
//! work. Nothing else in the crate mutates the store.
//!
//! # Concurrency model
//!
//! Facade calls return immediately; Ingestor/Answerer work runs in detached
//! Tokio tasks tracked in a [`JoinSet`]. The store sits behind a
//! `std::sync::Mutex` whose critical sections are synchronous and short —
//! the lock is never held across an await, so a slow collaborator call on
//! one document never delays work on another, while every store write stays
//! mutually exclusive.
//!
//! # Cancellation
//!
//! Logout bumps a session epoch and aborts all in-flight tasks. Pipeline
//! tasks re-read the epoch under the store lock before every write, so even
//! a completion that slips past the abort is discarded by identity, not by
//! timing. Results from a previous epoch can never reach a fresh session's
//! store.
//!
//! # Examples
//!
//! ```no_run
//! use docweave::auth::Credentials;
//! use docweave::manager::{DocumentUpload, SessionManager};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut manager = SessionManager::builder().build();
//! manager.login(Credentials::new("ada@example.com", "hunter2"))?;
//!
//! let doc_id = manager.upload_document(DocumentUpload::new(
//!     "report.pdf",
//!     "application/pdf",
//!     b"%PDF-1.7 ...".to_vec(),
//! ))?;
//!
//! // Ingestion proceeds in the background; poll snapshots or subscribe.
//! let snapshot = manager.snapshot();
//! assert_eq!(snapshot.documents[0].id, doc_id);
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex};

use miette::Diagnostic;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, instrument};

use crate::auth::{AuthError, Credentials, SessionHandle};
use crate::collaborators::{Answerer, Ingestor, StubAnswerer, StubIngestor};
use crate::config::SessionConfig;
use crate::events::{EventHub, EventStream, SessionEvent};
use crate::pipelines;
use crate::store::{DocumentStore, SessionSnapshot, StoreError};
use crate::types::{DocumentId, QaId};

/// A raw upload as received from the presentation layer.
#[derive(Clone, Debug)]
pub struct DocumentUpload {
    /// Original filename.
    pub name: String,
    /// Declared media type, checked against the session allow-list.
    pub media_type: String,
    /// Raw payload bytes.
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    #[must_use]
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }
}

/// Synchronous validation failures of the facade operations.
///
/// Every variant is reported to the caller before any state mutation;
/// pipeline failures never appear here — they surface as `Failed` statuses
/// in subsequent snapshots.
#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    /// The operation requires an authenticated session.
    #[error("not authenticated")]
    #[diagnostic(
        code(docweave::manager::not_authenticated),
        help("Call login() before uploading documents or asking questions.")
    )]
    NotAuthenticated,

    /// The declared media type is not on the accepted allow-list.
    #[error("unsupported media type: {media_type}")]
    #[diagnostic(
        code(docweave::manager::unsupported_format),
        help("Check SessionConfig::accepted_media_types for the allowed formats.")
    )]
    UnsupportedFormat { media_type: String },

    /// The upload carries no filename.
    #[error("upload has an empty file name")]
    #[diagnostic(code(docweave::manager::empty_file_name))]
    EmptyFileName,

    /// The question is empty after trimming whitespace.
    #[error("question is empty")]
    #[diagnostic(
        code(docweave::manager::empty_question),
        help("Submit a non-empty question; whitespace-only input is rejected.")
    )]
    EmptyQuestion,

    /// Store-level validation failure (unknown id, document not ready, ...).
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// Shared state reached by both the facade and the pipeline tasks.
///
/// The epoch is only ever bumped while the store lock is held, which makes
/// "read epoch + write store" an atomic unit for pipeline writers.
pub(crate) struct SessionCore {
    pub(crate) inner: Mutex<CoreInner>,
    pub(crate) events: Arc<EventHub>,
    pub(crate) config: SessionConfig,
    pub(crate) ingestor: Arc<dyn Ingestor>,
    pub(crate) answerer: Arc<dyn Answerer>,
}

pub(crate) struct CoreInner {
    pub(crate) store: DocumentStore,
    pub(crate) epoch: u64,
}

impl SessionCore {
    /// Run `f` against the store only if the session epoch still matches
    /// `expected`. Returns `None` when the epoch moved on (logout happened),
    /// in which case `f` is not invoked and the result is discarded by the
    /// caller.
    pub(crate) fn with_store_if_epoch<T>(
        &self,
        expected: u64,
        f: impl FnOnce(&mut DocumentStore) -> T,
    ) -> Option<T> {
        let mut inner = self.inner.lock().expect("session state poisoned");
        if inner.epoch != expected {
            return None;
        }
        Some(f(&mut inner.store))
    }
}

/// Builder for [`SessionManager`].
///
/// Collaborators default to the in-crate stubs, which makes a zero-config
/// manager usable in tests and demos; production callers inject real
/// [`Ingestor`]/[`Answerer`] implementations.
#[derive(Default)]
pub struct SessionManagerBuilder {
    config: Option<SessionConfig>,
    ingestor: Option<Arc<dyn Ingestor>>,
    answerer: Option<Arc<dyn Answerer>>,
}

impl SessionManagerBuilder {
    #[must_use]
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn ingestor(mut self, ingestor: Arc<dyn Ingestor>) -> Self {
        self.ingestor = Some(ingestor);
        self
    }

    #[must_use]
    pub fn answerer(mut self, answerer: Arc<dyn Answerer>) -> Self {
        self.answerer = Some(answerer);
        self
    }

    #[must_use]
    pub fn build(self) -> SessionManager {
        let config = self.config.unwrap_or_default();
        let events = EventHub::new(config.event_buffer_capacity);
        SessionManager {
            core: Arc::new(SessionCore {
                inner: Mutex::new(CoreInner {
                    store: DocumentStore::new(),
                    epoch: 0,
                }),
                events,
                config,
                ingestor: self
                    .ingestor
                    .unwrap_or_else(|| Arc::new(StubIngestor::new())),
                answerer: self
                    .answerer
                    .unwrap_or_else(|| Arc::new(StubAnswerer::new())),
            }),
            auth: None,
            tasks: JoinSet::new(),
        }
    }
}

/// Facade coordinating the store and the two pipelines for one user session.
///
/// See the [module docs](self) for the concurrency and cancellation model.
pub struct SessionManager {
    core: Arc<SessionCore>,
    auth: Option<SessionHandle>,
    tasks: JoinSet<()>,
}

impl SessionManager {
    #[must_use]
    pub fn builder() -> SessionManagerBuilder {
        SessionManagerBuilder::default()
    }

    /// `Anonymous → Authenticated`.
    ///
    /// Fails with [`AuthError::InvalidCredentials`] on malformed input and
    /// [`AuthError::AlreadyAuthenticated`] if a session is active; neither
    /// failure mutates any state.
    #[instrument(skip_all, err)]
    pub fn login(&mut self, credentials: Credentials) -> Result<SessionHandle, AuthError> {
        if self.auth.is_some() {
            return Err(AuthError::AlreadyAuthenticated);
        }
        credentials.validate()?;
        let handle = SessionHandle::mint(credentials.display_name());
        info!(user = %handle.display_name(), "session authenticated");
        self.auth = Some(handle.clone());
        Ok(handle)
    }

    /// `Authenticated → Anonymous`: clear the store, bump the epoch, abort
    /// all in-flight pipeline work. No-op when already anonymous.
    ///
    /// Any pipeline result that still completes after this call observes a
    /// stale epoch and is discarded — it can never be applied to a stale or
    /// recreated store.
    #[instrument(skip_all)]
    pub fn logout(&mut self) {
        if self.auth.take().is_none() {
            return;
        }
        {
            let mut inner = self.core.inner.lock().expect("session state poisoned");
            inner.epoch += 1;
            inner.store.clear();
        }
        self.tasks.abort_all();
        self.core.events.publish(SessionEvent::SessionCleared);
        info!("session cleared");
    }

    /// Accept an upload and dispatch ingestion; returns immediately with the
    /// new document id in the `Uploading` state.
    ///
    /// Validation (auth state, filename, media-type allow-list) happens
    /// synchronously before any document is created or task spawned: a
    /// rejected upload leaves no trace.
    #[instrument(skip_all, fields(name = %upload.name, media_type = %upload.media_type), err)]
    pub fn upload_document(&mut self, upload: DocumentUpload) -> Result<DocumentId, SessionError> {
        self.require_auth()?;
        if upload.name.trim().is_empty() {
            return Err(SessionError::EmptyFileName);
        }
        if !self.core.config.accepts(&upload.media_type) {
            return Err(SessionError::UnsupportedFormat {
                media_type: upload.media_type,
            });
        }

        let (id, epoch) = {
            let mut inner = self.core.inner.lock().expect("session state poisoned");
            let id = inner.store.create_document(
                upload.name.clone(),
                upload.media_type.clone(),
                upload.bytes.len() as u64,
            );
            (id, inner.epoch)
        };
        self.core
            .events
            .publish(SessionEvent::DocumentCreated { id });
        info!(document = %id, "upload accepted");

        self.reap_finished();
        self.tasks.spawn(pipelines::ingestion::run(
            Arc::clone(&self.core),
            epoch,
            id,
            upload.bytes,
            upload.media_type,
        ));
        Ok(id)
    }

    /// Mark a document as the current selection.
    #[instrument(skip_all, fields(document = %id), err)]
    pub fn select_document(&mut self, id: DocumentId) -> Result<(), SessionError> {
        self.require_auth()?;
        {
            let mut inner = self.core.inner.lock().expect("session state poisoned");
            inner.store.select_document(id)?;
        }
        self.core
            .events
            .publish(SessionEvent::SelectionChanged { id: Some(id) });
        Ok(())
    }

    /// Submit a question and dispatch the query pipeline; returns immediately
    /// with the entry id, already visible in history as `Pending`.
    ///
    /// Fails synchronously with [`SessionError::EmptyQuestion`] for
    /// whitespace-only input and with the store's `DocumentNotReady` /
    /// `DocumentNotFound` when the target cannot take questions.
    #[instrument(skip_all, fields(document = %document_id), err)]
    pub fn ask_question(
        &mut self,
        document_id: DocumentId,
        text: &str,
    ) -> Result<QaId, SessionError> {
        self.require_auth()?;
        let question = text.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }

        let (qa_id, epoch) = {
            let mut inner = self.core.inner.lock().expect("session state poisoned");
            let qa_id = inner.store.append_question(document_id, question)?;
            (qa_id, inner.epoch)
        };
        self.core.events.publish(SessionEvent::QuestionAsked {
            document: document_id,
            qa: qa_id,
        });

        self.reap_finished();
        self.tasks.spawn(pipelines::query::run(
            Arc::clone(&self.core),
            epoch,
            document_id,
            qa_id,
            question.to_string(),
        ));
        Ok(qa_id)
    }

    /// Explicitly remove a document and its history.
    ///
    /// In-flight pipeline results for the deleted id become benign no-ops.
    #[instrument(skip_all, fields(document = %id), err)]
    pub fn delete_document(&mut self, id: DocumentId) -> Result<(), SessionError> {
        self.require_auth()?;
        let selection_cleared = {
            let mut inner = self.core.inner.lock().expect("session state poisoned");
            let was_selected = inner.store.selected() == Some(id);
            inner.store.delete_document(id)?;
            was_selected
        };
        self.core
            .events
            .publish(SessionEvent::DocumentDeleted { id });
        if selection_cleared {
            self.core
                .events
                .publish(SessionEvent::SelectionChanged { id: None });
        }
        Ok(())
    }

    /// Immutable copy of the visible session state, reflecting every
    /// transition completed before this call.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.core
            .inner
            .lock()
            .expect("session state poisoned")
            .store
            .snapshot()
    }

    /// Subscribe to change notifications. See [`crate::events`].
    #[must_use]
    pub fn subscribe(&self) -> EventStream {
        self.core.events.subscribe()
    }

    /// Returns `true` while a session is authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    /// The active session handle, if authenticated.
    #[must_use]
    pub fn session_handle(&self) -> Option<&SessionHandle> {
        self.auth.as_ref()
    }

    /// Number of events lost to subscriber lag so far.
    #[must_use]
    pub fn dropped_events(&self) -> usize {
        self.core.events.dropped()
    }

    fn require_auth(&self) -> Result<(), SessionError> {
        if self.auth.is_none() {
            return Err(SessionError::NotAuthenticated);
        }
        Ok(())
    }

    /// Drop join-set slots of tasks that already finished.
    fn reap_finished(&mut self) {
        while self.tasks.try_join_next().is_some() {}
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.tasks.abort_all();
    }
}
