use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::transport::{now_ms, Transport};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::EngineEvent;

// ============================================================================
// Offline mutation queue
// ============================================================================

/// One write the host could not deliver while offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedMutation {
    pub url: String,
    pub method: String,
    pub body: Value,
    pub queued_at_ms: u64,
}

/// What one flush attempt accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushOutcome {
    pub sent: usize,
    pub requeued: usize,
}

/// FIFO queue of pending mutations. Flushing sends each one independently;
/// failures are re-queued in their original order for the next attempt.
#[derive(Default)]
pub struct OfflineQueue {
    entries: Mutex<Vec<QueuedMutation>>,
}

impl OfflineQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, url: &str, method: &str, body: Value) {
        let mutation = QueuedMutation {
            url: url.to_string(),
            method: method.to_string(),
            body,
            queued_at_ms: now_ms(),
        };

        match self.entries.lock() {
            Ok(mut entries) => entries.push(mutation),
            Err(e) => eprintln!("Warning: offline queue lock poisoned: {}", e),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pending mutations, oldest first.
    pub fn pending(&self) -> Vec<QueuedMutation> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Try to deliver every queued mutation through the transport.
    pub fn flush(&self, transport: &dyn Transport, logger: &TraceLogger) -> FlushOutcome {
        let drained = match self.entries.lock() {
            Ok(mut entries) => std::mem::take(&mut *entries),
            Err(e) => {
                eprintln!("Warning: offline queue lock poisoned: {}", e);
                return FlushOutcome { sent: 0, requeued: 0 };
            }
        };

        let mut sent = 0;
        let mut kept = Vec::new();

        for mutation in drained {
            match transport.request(&mutation.url, &mutation.method, Some(&mutation.body)) {
                Ok(_) => {
                    sent += 1;
                    logger.log(
                        &EngineEvent::now("queue_flush")
                            .with_detail(format!("delivered {} {}", mutation.method, mutation.url)),
                    );
                }
                Err(e) => {
                    logger.log(
                        &EngineEvent::now("queue_flush")
                            .with_detail(format!("kept {} {}", mutation.method, mutation.url))
                            .with_error(e),
                    );
                    kept.push(mutation);
                }
            }
        }

        let requeued = kept.len();

        if !kept.is_empty() {
            if let Ok(mut entries) = self.entries.lock() {
                // Mutations enqueued during the flush stay behind the retries.
                kept.append(&mut entries);
                *entries = kept;
            }
        }

        FlushOutcome { sent, requeued }
    }
}
