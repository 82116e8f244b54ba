//! Drives one document from `Uploading` to `Ready` or `Failed`.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::events::SessionEvent;
use crate::manager::SessionCore;
use crate::store::IngestOutcome;
use crate::types::{DocumentId, DocumentStatus};

/// Task body for one ingestion attempt. Invoked exactly once per document.
///
/// The facade has already validated the media type and created the document
/// in `Uploading`; this task marks it `Processing`, dispatches the Ingestor
/// under the configured timeout, and settles the terminal outcome.
pub(crate) async fn run(
    core: Arc<SessionCore>,
    epoch: u64,
    id: DocumentId,
    bytes: Vec<u8>,
    media_type: String,
) {
    // Mark Processing before dispatching the collaborator. A stale epoch or
    // a deleted document means there is nothing left to ingest for.
    let marked = core.with_store_if_epoch(epoch, |store| {
        store.update_status(id, DocumentStatus::Processing).is_ok()
    });
    match marked {
        Some(true) => {
            core.events.publish(SessionEvent::DocumentStatusChanged {
                id,
                status: DocumentStatus::Processing,
            });
        }
        Some(false) | None => {
            debug!(document = %id, "ingestion abandoned before dispatch");
            return;
        }
    }

    let timeout = core.config.ingest_timeout;
    let outcome =
        match tokio::time::timeout(timeout, core.ingestor.ingest(&bytes, &media_type)).await {
            Ok(Ok(handle)) => IngestOutcome::Ready(handle),
            Ok(Err(err)) => IngestOutcome::Failed(err.to_string()),
            Err(_) => IngestOutcome::Failed(format!(
                "ingestion timed out after {}ms",
                timeout.as_millis()
            )),
        };

    let status = match &outcome {
        IngestOutcome::Ready(_) => DocumentStatus::Ready,
        IngestOutcome::Failed(reason) => {
            warn!(document = %id, reason = %reason, "ingestion failed");
            DocumentStatus::Failed(reason.clone())
        }
    };

    let applied = core.with_store_if_epoch(epoch, |store| {
        // NotFound here means the document was deleted mid-flight: the same
        // benign no-op as losing the completion race.
        store.settle_document(id, outcome).unwrap_or(false)
    });
    if applied == Some(true) {
        debug!(document = %id, status = %status, "ingestion settled");
        core.events
            .publish(SessionEvent::DocumentStatusChanged { id, status });
    } else {
        debug!(document = %id, "late ingestion result dropped");
    }
}
