//! Drives one Q&A entry from `Pending` to `Answered` or `Failed`.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::collaborators::DocumentHandle;
use crate::events::SessionEvent;
use crate::manager::SessionCore;
use crate::store::AnswerOutcome;
use crate::types::{DocumentId, QaId, QaStatus};

/// Task body for one query attempt. Invoked exactly once per entry.
///
/// Readiness was checked when the entry was appended, and is checked *again*
/// here at dispatch time: the document may have been deleted (or the session
/// logged out) between submission and execution. A failed re-check settles
/// the entry as `Failed` where it still exists, and is silent where it does
/// not — re-asking is always a fresh, user-initiated entry.
pub(crate) async fn run(
    core: Arc<SessionCore>,
    epoch: u64,
    document_id: DocumentId,
    qa_id: QaId,
    question: String,
) {
    let handle = match dispatch_check(&core, epoch, document_id) {
        DispatchCheck::Proceed(handle) => handle,
        DispatchCheck::Abandon => {
            debug!(document = %document_id, qa = %qa_id, "query abandoned before dispatch");
            return;
        }
        DispatchCheck::FailEntry(reason) => {
            settle(&core, epoch, document_id, qa_id, AnswerOutcome::Failed(reason));
            return;
        }
    };

    let timeout = core.config.answer_timeout;
    let outcome = match tokio::time::timeout(timeout, core.answerer.answer(&handle, &question))
        .await
    {
        Ok(Ok(text)) => AnswerOutcome::Answered(text),
        Ok(Err(err)) => {
            warn!(document = %document_id, qa = %qa_id, error = %err, "answerer failed");
            AnswerOutcome::Failed(err.to_string())
        }
        Err(_) => AnswerOutcome::Failed(format!(
            "answer timed out after {}ms",
            timeout.as_millis()
        )),
    };

    settle(&core, epoch, document_id, qa_id, outcome);
}

enum DispatchCheck {
    /// Document present and ready; answer with this handle.
    Proceed(DocumentHandle),
    /// Document (and therefore the entry) is gone, or the session moved on.
    Abandon,
    /// Document exists but cannot be queried; fail the entry with a reason.
    FailEntry(String),
}

fn dispatch_check(core: &SessionCore, epoch: u64, document_id: DocumentId) -> DispatchCheck {
    let checked = core.with_store_if_epoch(epoch, |store| match store.document(document_id) {
        None => DispatchCheck::Abandon,
        Some(doc) if !doc.status.is_ready() => DispatchCheck::FailEntry(format!(
            "document became unavailable before answering ({})",
            doc.status
        )),
        Some(doc) => match &doc.handle {
            Some(handle) => DispatchCheck::Proceed(handle.clone()),
            None => DispatchCheck::FailEntry("document handle missing".to_string()),
        },
    });
    checked.unwrap_or(DispatchCheck::Abandon)
}

fn settle(
    core: &SessionCore,
    epoch: u64,
    document_id: DocumentId,
    qa_id: QaId,
    outcome: AnswerOutcome,
) {
    let status = match &outcome {
        AnswerOutcome::Answered(_) => QaStatus::Answered,
        AnswerOutcome::Failed(reason) => QaStatus::Failed(reason.clone()),
    };
    let applied = core.with_store_if_epoch(epoch, |store| {
        // A stale document or entry id is the normal shape of losing a race
        // with deletion; nothing to record.
        store
            .resolve_answer(document_id, qa_id, outcome)
            .unwrap_or(false)
    });
    if applied == Some(true) {
        debug!(document = %document_id, qa = %qa_id, status = %status, "query settled");
        core.events.publish(SessionEvent::QuestionResolved {
            document: document_id,
            qa: qa_id,
            status,
        });
    } else {
        debug!(document = %document_id, qa = %qa_id, "late answer dropped");
    }
}
