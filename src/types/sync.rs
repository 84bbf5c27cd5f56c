use serde::{Deserialize, Serialize};

/// What a completed push did to the remote document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PushOutcome {
    Created { document_id: String, count: usize },
    Updated { document_id: String, count: usize },
    /// A newer push was scheduled before this one got its turn.
    Superseded,
}

/// What a pull did to the local collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// No remote document, or it was empty.
    NoRemote,
    Merged { added: usize },
    Replaced { count: usize },
}

/// Completion report for a fire-and-forget push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Pushed { generation: u64, outcome: PushOutcome },
    PushFailed { generation: u64, error: String },
}
