//! Document and Q&A entry records.
//!
//! [`Document`] and [`QaEntry`] are the two records the store manages. Both
//! are plain data: all lifecycle decisions (which transitions are legal, who
//! may mutate what) live in [`crate::store`]; the Ingestor and Answerer only
//! ever see copies or opaque handles, never references into these records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collaborators::DocumentHandle;
use crate::types::{DocumentId, DocumentStatus, QaId, QaStatus};

/// One uploaded document and its question/answer history.
///
/// Created by the store when an upload is accepted (`status = Uploading`);
/// destroyed only by logout or an explicit delete. `name`, `media_type`,
/// `uploaded_at`, and `size_bytes` are immutable after creation.
///
/// History is kept newest-first and is append-only while the document is
/// `Ready`; an entry's `answer`/`status` fields update in place when its
/// answer arrives, which never reorders the history.
///
/// # Examples
///
/// ```
/// use docweave::document::Document;
/// use docweave::types::DocumentStatus;
///
/// let doc = Document::new("report.pdf", "application/pdf", 14_336);
/// assert_eq!(doc.status, DocumentStatus::Uploading);
/// assert!(doc.history.is_empty());
/// assert!(!doc.is_queryable());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque identifier, assigned at ingestion start.
    pub id: DocumentId,
    /// Original filename, immutable.
    pub name: String,
    /// Declared media type, immutable.
    pub media_type: String,
    /// Upload timestamp, immutable.
    pub uploaded_at: DateTime<Utc>,
    /// Raw size of the uploaded payload, immutable.
    pub size_bytes: u64,
    /// Current lifecycle status.
    pub status: DocumentStatus,
    /// Opaque Ingestor token, present once the document is `Ready`.
    ///
    /// This crate stores the handle and passes it to the Answerer verbatim;
    /// it never interprets the contents. Excluded from serialized snapshots.
    #[serde(skip)]
    pub handle: Option<DocumentHandle>,
    /// Question/answer history, newest first.
    pub history: Vec<QaEntry>,
}

impl Document {
    /// Create a fresh document record in the `Uploading` state.
    #[must_use]
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.into(),
            media_type: media_type.into(),
            uploaded_at: Utc::now(),
            size_bytes,
            status: DocumentStatus::Uploading,
            handle: None,
            history: Vec::new(),
        }
    }

    /// Returns `true` if questions may currently be asked of this document.
    #[must_use]
    pub fn is_queryable(&self) -> bool {
        self.status.is_ready()
    }

    /// Number of questions asked of this document so far.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.history.len()
    }

    /// Look up a history entry by id.
    #[must_use]
    pub fn entry(&self, qa_id: QaId) -> Option<&QaEntry> {
        self.history.iter().find(|entry| entry.id == qa_id)
    }

    pub(crate) fn entry_mut(&mut self, qa_id: QaId) -> Option<&mut QaEntry> {
        self.history.iter_mut().find(|entry| entry.id == qa_id)
    }
}

/// One question and its (eventual) answer.
///
/// Visible in history immediately upon submission as `Pending`, so a consumer
/// can show the question right away and backfill the answer when it lands.
///
/// # Examples
///
/// ```
/// use docweave::document::QaEntry;
/// use docweave::types::QaStatus;
///
/// let entry = QaEntry::new("What is the grand total?");
/// assert_eq!(entry.status, QaStatus::Pending);
/// assert!(entry.answer.is_none());
/// assert!(entry.answered_at.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaEntry {
    /// Opaque identifier for this entry.
    pub id: QaId,
    /// The question text, as submitted.
    pub question: String,
    /// The answer text, populated only on successful completion.
    pub answer: Option<String>,
    /// Submission timestamp.
    pub asked_at: DateTime<Utc>,
    /// Completion timestamp, set when the entry reaches a terminal status.
    pub answered_at: Option<DateTime<Utc>>,
    /// Current processing status.
    pub status: QaStatus,
}

impl QaEntry {
    /// Create a fresh pending entry for the given question.
    #[must_use]
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            id: QaId::new(),
            question: question.into(),
            answer: None,
            asked_at: Utc::now(),
            answered_at: None,
            status: QaStatus::Pending,
        }
    }
}
