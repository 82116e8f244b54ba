//! Core identifier and status types for the docweave session core.
//!
//! This module defines the fundamental types used throughout the crate for
//! identifying documents and Q&A entries and for tracking their lifecycle.
//! These are the core domain concepts that define what a session *contains*.
//!
//! # Key Types
//!
//! - [`DocumentId`] / [`QaId`]: opaque identifiers allocated by the store
//! - [`DocumentStatus`]: the `Uploading → Processing → Ready | Failed` machine
//! - [`QaStatus`]: the `Pending → Answered | Failed` machine
//!
//! Both status machines expose the same two predicates: whether a transition
//! is monotonic ([`DocumentStatus::can_transition_to`]) and whether a state is
//! terminal ([`DocumentStatus::is_terminal`]). Terminal states are never left;
//! the pipelines rely on this to resolve completion races by "first completion
//! wins".
//!
//! # Examples
//!
//! ```rust
//! use docweave::types::DocumentStatus;
//!
//! let status = DocumentStatus::Processing;
//! assert!(status.can_transition_to(&DocumentStatus::Ready));
//! assert!(!status.can_transition_to(&DocumentStatus::Uploading));
//! assert!(!status.is_terminal());
//! assert!(DocumentStatus::Ready.is_terminal());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque unique identifier for a document, assigned at ingestion start.
///
/// Allocated by the store when an upload is accepted; stable for the
/// document's whole lifetime. Copyable and cheap to pass around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Allocate a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque unique identifier for a question/answer entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QaId(Uuid);

impl QaId {
    /// Allocate a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of an uploaded document.
///
/// The only legal path is `Uploading → Processing → Ready | Failed`.
/// `Ready` and `Failed` are terminal: once reached, no further status write
/// is applied. The store enforces monotonicity; the ingestion pipeline uses
/// the terminal guard so that a slow completion racing a failure resolves as
/// a no-op rather than flapping the state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Upload accepted, raw bytes received, ingestion not yet dispatched.
    Uploading,
    /// Ingestion dispatched to the external Ingestor.
    Processing,
    /// Ingestion succeeded; the document is queryable.
    Ready,
    /// Ingestion failed or timed out, with the recorded reason.
    Failed(String),
}

impl DocumentStatus {
    /// Returns `true` if this status admits no further transition.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed(_))
    }

    /// Returns `true` if the document can be queried in this status.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns `true` if moving from `self` to `next` follows the monotonic
    /// lifecycle order.
    #[must_use]
    pub fn can_transition_to(&self, next: &DocumentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Uploading, Self::Processing)
                | (Self::Processing, Self::Ready)
                | (Self::Processing, Self::Failed(_))
        )
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uploading => write!(f, "uploading"),
            Self::Processing => write!(f, "processing"),
            Self::Ready => write!(f, "ready"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Processing status of a single question/answer entry.
///
/// `Pending → Answered | Failed`; both outcomes are terminal. A failed entry
/// is never retried in place — re-asking produces a fresh entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum QaStatus {
    /// Submitted, answer not yet produced.
    Pending,
    /// Answer produced successfully.
    Answered,
    /// The Answerer failed or timed out, with the recorded reason.
    Failed(String),
}

impl QaStatus {
    /// Returns `true` if this status admits no further transition.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Answered | Self::Failed(_))
    }

    /// Returns `true` if the entry is still awaiting its answer.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for QaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Answered => write!(f, "answered"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
