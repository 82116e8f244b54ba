//! The asynchronous work drivers.
//!
//! Each pipeline is the body of one detached Tokio task: `ingestion` drives
//! a single document from `Uploading` to `Ready`/`Failed`, `query` drives a
//! single Q&A entry from `Pending` to `Answered`/`Failed`. Both follow the
//! same discipline:
//!
//! - the only suspension points are the external collaborator call, bounded
//!   by the configured timeout;
//! - every store write happens under the store lock *and* behind the epoch
//!   captured at dispatch, so results outlived by a logout are dropped by
//!   identity;
//! - terminal outcomes settle through the store's first-completion-wins
//!   guards, so a late completion is a no-op rather than a state flap.

pub(crate) mod ingestion;
pub(crate) mod query;
