use crate::config::{Config, Credentials};
use crate::error::Result;
use crate::remote::BoardClient;
use crate::store::TaskStore;
use crate::task::{SyncState, TaskRecord};
use serde::Serialize;
use std::collections::HashSet;

/// Name given to the single checklist created under each card.
pub const CHECKLIST_NAME: &str = "Checklist";

// ---------------------------------------------------------------------------
// Options / outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub list_id: String,
    pub red_label_id: Option<String>,
    /// Legacy fallback: adopt an existing same-title card instead of creating.
    pub adopt_by_title: bool,
    /// Delete the remote card when its comment disappears from source.
    pub delete_removed: bool,
}

impl ReconcileOptions {
    pub fn from_config(config: &Config, creds: &Credentials) -> Self {
        Self {
            list_id: creds.list_id.clone(),
            red_label_id: creds.red_label_id.clone(),
            adopt_by_title: config.adopt_by_title,
            delete_removed: config.delete_removed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReconcileAction {
    /// New card, checklist, and check items created remotely.
    Created,
    /// Existing same-title card adopted (adopt_by_title policy).
    Adopted,
    /// Fingerprint match with a synced previous task: zero remote calls.
    Skipped,
    /// Fingerprint match with a deprecated previous task: terminal, excluded.
    SkippedDeprecated,
    /// Remote card deleted (delete_removed policy).
    Deleted,
    Failed { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileOutcome {
    pub title: String,
    #[serde(flatten)]
    pub action: ReconcileAction,
}

// ---------------------------------------------------------------------------
// Save-time reconciliation
// ---------------------------------------------------------------------------

/// Diff the tasks currently parsed from a file against the store's previous
/// observation and drive the board client accordingly. The store entry is
/// replaced wholesale at the end; the caller owns the store save.
///
/// Remote failures never abort the batch: the failing task keeps whatever ids
/// it obtained before the failure and processing continues with the next one.
pub fn reconcile_file(
    client: &dyn BoardClient,
    store: &mut TaskStore,
    file_key: &str,
    mut current: Vec<TaskRecord>,
    opts: &ReconcileOptions,
) -> Vec<ReconcileOutcome> {
    let previous = store.tasks_for(file_key).to_vec();
    let mut outcomes = Vec::new();

    for task in current.iter_mut() {
        let fp = task.fingerprint();
        let prev = previous.iter().find(|p| p.fingerprint() == fp);

        let action = match prev.map(|p| &p.state) {
            Some(state @ SyncState::Deprecated { .. }) => {
                task.state = state.clone();
                ReconcileAction::SkippedDeprecated
            }
            Some(state @ SyncState::Synced { .. }) => {
                task.state = state.clone();
                ReconcileAction::Skipped
            }
            // Unknown fingerprint, or a previous attempt that never got a
            // card id: (re)create.
            _ => match push_task(client, file_key, task, opts) {
                Ok(action) => action,
                Err(e) => {
                    tracing::warn!(title = %task.title, error = %e, "remote call failed");
                    ReconcileAction::Failed {
                        message: e.to_string(),
                    }
                }
            },
        };
        outcomes.push(ReconcileOutcome {
            title: task.title.clone(),
            action,
        });
    }

    if opts.delete_removed {
        let current_fps: HashSet<String> = current.iter().map(|t| t.fingerprint()).collect();
        for prev in &previous {
            if current_fps.contains(&prev.fingerprint()) || prev.state.is_deprecated() {
                continue;
            }
            let Some(card_id) = prev.state.card_id() else {
                continue;
            };
            let action = match client.delete_card(card_id) {
                Ok(()) => ReconcileAction::Deleted,
                Err(e) => {
                    tracing::warn!(title = %prev.title, error = %e, "card deletion failed");
                    ReconcileAction::Failed {
                        message: e.to_string(),
                    }
                }
            };
            outcomes.push(ReconcileOutcome {
                title: prev.title.clone(),
                action,
            });
        }
    }

    store.replace(file_key, current);
    outcomes
}

/// Create (or adopt) the remote side of one task. Ids are written onto the
/// task immediately after the call that produced them succeeds, so a later
/// failure retains everything obtained so far.
fn push_task(
    client: &dyn BoardClient,
    file_key: &str,
    task: &mut TaskRecord,
    opts: &ReconcileOptions,
) -> Result<ReconcileAction> {
    if opts.adopt_by_title {
        let cards = client.list_cards(&opts.list_id)?;
        if let Some(card) = cards.into_iter().find(|c| c.name == task.title) {
            let checklist_id = client
                .list_checklists(&card.id)?
                .into_iter()
                .next()
                .map(|cl| cl.id);
            task.state = SyncState::Synced {
                card_id: card.id,
                checklist_id,
            };
            return Ok(ReconcileAction::Adopted);
        }
    }

    let labels: Vec<String> = opts.red_label_id.iter().cloned().collect();
    let desc = format!("[RED] Created from {file_key}");
    let card = client.create_card(&opts.list_id, &task.title, &desc, &labels)?;
    task.state = SyncState::Synced {
        card_id: card.id.clone(),
        checklist_id: None,
    };

    let checklist = client.create_checklist(&card.id, CHECKLIST_NAME)?;
    task.state = SyncState::Synced {
        card_id: card.id,
        checklist_id: Some(checklist.id.clone()),
    };

    for item in &task.checklist {
        client.add_check_item(&checklist.id, item)?;
    }
    Ok(ReconcileAction::Created)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
