use crate::fingerprint::fingerprint;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SyncState
// ---------------------------------------------------------------------------

/// Remote-sync state of a task. `checklist_id` is absent only when checklist
/// creation failed after the card was created; ids obtained before a failure
/// are retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncState {
    #[default]
    Unsynced,
    Synced {
        card_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checklist_id: Option<String>,
    },
    /// Terminal: the card left the tracked list. Never transitions back.
    Deprecated {
        card_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checklist_id: Option<String>,
    },
}

impl SyncState {
    pub fn card_id(&self) -> Option<&str> {
        match self {
            SyncState::Unsynced => None,
            SyncState::Synced { card_id, .. } | SyncState::Deprecated { card_id, .. } => {
                Some(card_id)
            }
        }
    }

    pub fn checklist_id(&self) -> Option<&str> {
        match self {
            SyncState::Unsynced => None,
            SyncState::Synced { checklist_id, .. }
            | SyncState::Deprecated { checklist_id, .. } => checklist_id.as_deref(),
        }
    }

    pub fn is_deprecated(&self) -> bool {
        matches!(self, SyncState::Deprecated { .. })
    }

    /// Mark terminal, keeping whatever remote ids are known.
    pub fn deprecate(&mut self) {
        *self = match std::mem::take(self) {
            SyncState::Synced {
                card_id,
                checklist_id,
            }
            | SyncState::Deprecated {
                card_id,
                checklist_id,
            } => SyncState::Deprecated {
                card_id,
                checklist_id,
            },
            SyncState::Unsynced => SyncState::Unsynced,
        };
    }
}

// ---------------------------------------------------------------------------
// TaskRecord
// ---------------------------------------------------------------------------

/// One structured comment block, as parsed from a source file and as stored
/// in the task store. The remote card/checklist are referenced by id only;
/// the board owns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub title: String,
    pub checklist: Vec<String>,
    /// Exact verbatim text of the matched comment block.
    pub comment: String,
    #[serde(default)]
    pub state: SyncState,
}

impl TaskRecord {
    pub fn new(
        title: impl Into<String>,
        checklist: Vec<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            checklist,
            comment: comment.into(),
            state: SyncState::Unsynced,
        }
    }

    pub fn fingerprint(&self) -> String {
        fingerprint(&self.comment)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
