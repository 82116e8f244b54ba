//! Shared setup helpers for the integration tests.

use std::sync::Arc;
use std::time::Duration;

use docweave::auth::Credentials;
use docweave::collaborators::{Answerer, Ingestor, StubAnswerer, StubIngestor};
use docweave::config::SessionConfig;
use docweave::manager::{DocumentUpload, SessionManager};
use docweave::store::SessionSnapshot;
use docweave::types::{DocumentId, DocumentStatus};

/// Short timeouts so failure-path tests finish quickly.
pub fn fast_config() -> SessionConfig {
    SessionConfig::default()
        .with_ingest_timeout(Duration::from_millis(200))
        .with_answer_timeout(Duration::from_millis(200))
}

/// A manager with instant stub collaborators, already logged in.
pub fn stub_manager() -> SessionManager {
    logged_in(
        SessionManager::builder()
            .config(fast_config())
            .ingestor(Arc::new(StubIngestor::new()))
            .answerer(Arc::new(StubAnswerer::new()))
            .build(),
    )
}

/// A manager with the given collaborators, already logged in.
pub fn manager_with(
    ingestor: Arc<dyn Ingestor>,
    answerer: Arc<dyn Answerer>,
) -> SessionManager {
    logged_in(
        SessionManager::builder()
            .config(fast_config())
            .ingestor(ingestor)
            .answerer(answerer)
            .build(),
    )
}

pub fn logged_in(mut manager: SessionManager) -> SessionManager {
    manager
        .login(Credentials::new("ada@example.com", "hunter2"))
        .expect("test login");
    manager
}

pub fn pdf_upload(name: &str) -> DocumentUpload {
    DocumentUpload::new(name, "application/pdf", b"%PDF-1.7 test payload".to_vec())
}

/// Upload and wait until the document settles `Ready`.
pub async fn upload_ready(manager: &mut SessionManager, name: &str) -> DocumentId {
    let id = manager
        .upload_document(pdf_upload(name))
        .expect("test upload");
    wait_for(manager, |snapshot| {
        snapshot
            .document(id)
            .is_some_and(|doc| doc.status == DocumentStatus::Ready)
    })
    .await;
    id
}

/// Poll snapshots until `pred` holds; panics after two seconds.
pub async fn wait_for(manager: &SessionManager, pred: impl Fn(&SessionSnapshot) -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if pred(&manager.snapshot()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached within deadline");
}
