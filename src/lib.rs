//! # Docweave: Document Session Orchestration
//!
//! Docweave is the session core of a "upload documents, ask questions"
//! system: it tracks the lifecycle of uploaded documents, orchestrates
//! asynchronous ingestion and question-answering work against them, and
//! guarantees consistent, race-free state for concurrent uploads and queries
//! within one user session.
//!
//! The crate deliberately does *not* parse documents or produce answers —
//! those are external collaborators reached through the [`collaborators`]
//! traits. Nor does it render anything: consumers read immutable
//! [`store::SessionSnapshot`]s and may subscribe to [`events`] for change
//! hints.
//!
//! ## Core Concepts
//!
//! - **Document Store**: in-memory registry of documents and Q&A history,
//!   exclusively owned by the session manager
//! - **Pipelines**: detached Tokio tasks driving one document (ingestion)
//!   or one Q&A entry (query) to a terminal state under a timeout
//! - **Session Manager**: the facade exposing login/logout, upload, select,
//!   ask, delete, snapshot, and subscribe
//! - **Epoch cancellation**: logout bumps a session epoch; late pipeline
//!   results are dropped by identity, never applied to a fresh session
//!
//! ## Quick Start
//!
//! ```no_run
//! use docweave::auth::Credentials;
//! use docweave::manager::{DocumentUpload, SessionManager};
//! use docweave::types::DocumentStatus;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Stub collaborators by default; inject real ones via the builder.
//!     let mut manager = SessionManager::builder().build();
//!     manager.login(Credentials::new("ada@example.com", "hunter2"))?;
//!
//!     let doc_id = manager.upload_document(DocumentUpload::new(
//!         "report.pdf",
//!         "application/pdf",
//!         b"%PDF-1.7 ...".to_vec(),
//!     ))?;
//!
//!     // Ingestion runs in the background; watch for readiness.
//!     let mut events = manager.subscribe();
//!     while let Ok(event) = events.recv().await {
//!         let snapshot = manager.snapshot();
//!         if snapshot.document(doc_id).is_some_and(|d| d.status == DocumentStatus::Ready) {
//!             break;
//!         }
//!         let _ = event;
//!     }
//!
//!     let qa_id = manager.ask_question(doc_id, "What is the grand total?")?;
//!     println!("asked {qa_id}; answer lands in a later snapshot");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Validation failures (wrong media type, empty question, unknown id) come
//! back synchronously from the facade call and mutate nothing. Pipeline
//! failures — collaborator errors and timeouts alike — are recorded as
//! terminal `Failed` statuses and surface through the next snapshot; they
//! are never thrown at the original caller, whose call already returned.
//! Nothing in this crate is fatal to the process.
//!
//! ## Module Guide
//!
//! - [`manager`] - The session manager facade and its builder
//! - [`store`] - The document registry and immutable snapshots
//! - [`pipelines`] - Ingestion and query task bodies
//! - [`collaborators`] - Ingestor/Answerer traits, handle, and stubs
//! - [`document`] / [`types`] - Records, identifiers, and status machines
//! - [`events`] - Broadcast change notifications
//! - [`auth`] / [`config`] / [`telemetry`] - Credentials, tunables, tracing

pub mod auth;
pub mod collaborators;
pub mod config;
pub mod document;
pub mod events;
pub mod manager;
pub mod pipelines;
pub mod store;
pub mod telemetry;
pub mod types;
