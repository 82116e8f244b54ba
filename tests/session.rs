//! Session state machine: authentication, logout cancellation, deletion
//! races, snapshot semantics, and change notifications.

mod common;

use std::sync::Arc;
use std::time::Duration;

use docweave::auth::{AuthError, Credentials};
use docweave::collaborators::{StubAnswerer, StubIngestor};
use docweave::events::SessionEvent;
use docweave::manager::{SessionError, SessionManager};
use docweave::store::StoreError;
use docweave::types::{DocumentStatus, QaStatus};

use common::*;

#[test]
fn operations_require_authentication() {
    let mut manager = SessionManager::builder().config(fast_config()).build();
    assert!(!manager.is_authenticated());

    let err = manager
        .upload_document(pdf_upload("early.pdf"))
        .expect_err("anonymous upload");
    assert!(matches!(err, SessionError::NotAuthenticated));

    // Logout while anonymous is a no-op, not an error.
    manager.logout();
    assert!(!manager.is_authenticated());
}

#[tokio::test]
async fn login_validates_and_mints_handle() {
    let mut manager = SessionManager::builder().config(fast_config()).build();

    let err = manager
        .login(Credentials::new("not-an-email", "pw"))
        .expect_err("malformed email");
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(!manager.is_authenticated());

    let handle = manager
        .login(Credentials::new("ada@example.com", "hunter2"))
        .unwrap();
    assert_eq!(handle.display_name(), "ada");
    assert!(manager.is_authenticated());

    // Login never implicitly discards an active session.
    let err = manager
        .login(Credentials::new("bob@example.com", "pw"))
        .expect_err("double login");
    assert!(matches!(err, AuthError::AlreadyAuthenticated));
    assert_eq!(manager.session_handle().unwrap().display_name(), "ada");
}

#[tokio::test]
async fn logout_clears_state_and_discards_inflight_ingestion() {
    let gate = Gate::closed();
    let mut manager = manager_with(
        Arc::new(GatedIngestor::new(gate.clone())),
        Arc::new(StubAnswerer::new()),
    );

    let id = manager.upload_document(pdf_upload("doomed.pdf")).unwrap();
    assert_eq!(manager.snapshot().documents.len(), 1);

    // Ingestion is parked on the gate; log out underneath it.
    manager.logout();
    assert!(!manager.is_authenticated());
    assert!(manager.snapshot().documents.is_empty());

    // Fresh session in the same manager.
    manager
        .login(Credentials::new("ada@example.com", "hunter2"))
        .unwrap();

    // Release the old ingestion; its result belongs to a dead epoch and must
    // never surface in the new session's store.
    gate.open_one();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let snapshot = manager.snapshot();
    assert!(snapshot.documents.is_empty());
    assert!(snapshot.document(id).is_none());
}

#[tokio::test]
async fn logout_discards_inflight_answers() {
    let gate = Gate::closed();
    let answerer = Arc::new(GatedAnswerer::new(gate.clone()));
    let mut manager = manager_with(Arc::new(StubIngestor::new()), answerer);

    let doc = upload_ready(&mut manager, "report.pdf").await;
    manager.ask_question(doc, "pending forever?").unwrap();

    manager.logout();
    gate.open_one();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(manager.snapshot().documents.is_empty());
}

#[tokio::test]
async fn delete_mid_answer_is_a_benign_race() {
    let gate = Gate::closed();
    let answerer = Arc::new(GatedAnswerer::new(gate.clone()));
    let mut manager = manager_with(Arc::new(StubIngestor::new()), answerer);

    let doc = upload_ready(&mut manager, "report.pdf").await;
    manager.ask_question(doc, "racing a delete?").unwrap();
    manager.delete_document(doc).unwrap();

    // The late answer finds no document; nothing panics, nothing reappears.
    gate.open_one();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(manager.snapshot().documents.is_empty());

    // New operations on the deleted id report NotFound.
    let err = manager
        .ask_question(doc, "still here?")
        .expect_err("deleted document");
    assert!(matches!(
        err,
        SessionError::Store(StoreError::DocumentNotFound { .. })
    ));
}

#[tokio::test]
async fn selection_follows_documents() {
    let mut manager = stub_manager();
    let doc = upload_ready(&mut manager, "report.pdf").await;

    manager.select_document(doc).unwrap();
    assert_eq!(manager.snapshot().selected, Some(doc));
    assert_eq!(
        manager.snapshot().selected_document().map(|d| d.id),
        Some(doc)
    );

    let err = manager
        .select_document(docweave::types::DocumentId::new())
        .expect_err("unknown id");
    assert!(matches!(
        err,
        SessionError::Store(StoreError::DocumentNotFound { .. })
    ));

    manager.delete_document(doc).unwrap();
    assert_eq!(manager.snapshot().selected, None);
}

#[tokio::test]
async fn snapshot_is_idempotent_between_mutations() {
    let mut manager = stub_manager();
    let doc = upload_ready(&mut manager, "report.pdf").await;
    let qa = manager.ask_question(doc, "settled?").unwrap();
    wait_for(&manager, |s| {
        s.document(doc)
            .and_then(|d| d.entry(qa))
            .is_some_and(|e| e.status.is_terminal())
    })
    .await;

    let first = manager.snapshot();
    let second = manager.snapshot();
    assert_eq!(first, second);
}

#[tokio::test]
async fn events_track_applied_transitions() {
    let mut manager = manager_with(
        Arc::new(StubIngestor::new()),
        Arc::new(StubAnswerer::new()),
    );
    let mut events = manager.subscribe();

    let doc = manager.upload_document(pdf_upload("report.pdf")).unwrap();

    let created = events
        .next_timeout(Duration::from_secs(2))
        .await
        .expect("created event");
    assert_eq!(created, SessionEvent::DocumentCreated { id: doc });

    // Processing, then Ready.
    let mut statuses = Vec::new();
    while statuses.len() < 2 {
        match events.next_timeout(Duration::from_secs(2)).await {
            Some(SessionEvent::DocumentStatusChanged { id, status }) if id == doc => {
                statuses.push(status);
            }
            Some(_) => {}
            None => panic!("event stream ended early"),
        }
    }
    assert_eq!(statuses[0], DocumentStatus::Processing);
    assert_eq!(statuses[1], DocumentStatus::Ready);

    let qa = manager.ask_question(doc, "and the answer?").unwrap();
    let mut saw_asked = false;
    loop {
        match events.next_timeout(Duration::from_secs(2)).await {
            Some(SessionEvent::QuestionAsked { document, qa: asked }) => {
                assert_eq!((document, asked), (doc, qa));
                saw_asked = true;
            }
            Some(SessionEvent::QuestionResolved { document, qa: resolved, status }) => {
                assert_eq!((document, resolved), (doc, qa));
                assert_eq!(status, QaStatus::Answered);
                break;
            }
            Some(_) => {}
            None => panic!("event stream ended early"),
        }
    }
    assert!(saw_asked, "asked event precedes resolution");

    manager.logout();
    loop {
        match events.next_timeout(Duration::from_secs(2)).await {
            Some(SessionEvent::SessionCleared) => break,
            Some(_) => {}
            None => panic!("missing session-cleared event"),
        }
    }
}
