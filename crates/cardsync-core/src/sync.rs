use crate::codec::{self, ChecklistPolicy};
use crate::remote::BoardClient;
use crate::store::TaskStore;
use crate::task::TaskRecord;
use serde::Serialize;
use std::collections::HashSet;
use std::ops::Range;
use std::path::Path;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncAction {
    /// Remote checklist changed; the source comment was rewritten.
    Updated,
    /// Remote and source already agree.
    Unchanged,
    /// The card left the tracked list; the task is now terminal.
    Deprecated,
    Failed { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub file: String,
    pub title: String,
    #[serde(flatten)]
    pub action: SyncAction,
}

// ---------------------------------------------------------------------------
// Inbound sync
// ---------------------------------------------------------------------------

/// Pull remote state back into source comments for every file in the store.
///
/// Per task: a card that left the target list is deprecated (terminal, no
/// further remote calls ever); otherwise the comment block is regenerated
/// from the remote checklist and, when its previous text is still present
/// verbatim, replaced at its exact span. A stored comment no longer found in
/// the file skips silently. Fetch failures leave that task untouched and
/// never abort the pass. The caller owns the store save.
pub fn sync_store(
    client: &dyn BoardClient,
    store: &mut TaskStore,
    list_id: &str,
    policy: ChecklistPolicy,
) -> Vec<SyncOutcome> {
    let mut outcomes = Vec::new();

    for file_key in store.file_keys() {
        let mut tasks = store.tasks_for(&file_key).to_vec();

        let text = match std::fs::read_to_string(Path::new(&file_key)) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(file = %file_key, error = %e, "cannot read source file, skipping");
                continue;
            }
        };

        let replacements = sync_file_tasks(
            client,
            &file_key,
            &text,
            &mut tasks,
            list_id,
            policy,
            &mut outcomes,
        );

        if !replacements.is_empty() {
            let rewritten = apply_replacements(&text, replacements);
            if let Err(e) = crate::io::atomic_write(Path::new(&file_key), rewritten.as_bytes()) {
                tracing::warn!(file = %file_key, error = %e, "failed to rewrite source file");
                continue;
            }
        }

        store.replace(&file_key, tasks);
    }

    outcomes
}

fn sync_file_tasks(
    client: &dyn BoardClient,
    file_key: &str,
    text: &str,
    tasks: &mut [TaskRecord],
    list_id: &str,
    policy: ChecklistPolicy,
    outcomes: &mut Vec<SyncOutcome>,
) -> Vec<(Range<usize>, String)> {
    let blocks = codec::parse_blocks(text, policy);
    let mut claimed: HashSet<usize> = HashSet::new();
    let mut replacements: Vec<(Range<usize>, String)> = Vec::new();

    for task in tasks.iter_mut() {
        if task.state.is_deprecated() {
            continue;
        }
        let (Some(card_id), Some(checklist_id)) = (
            task.state.card_id().map(str::to_string),
            task.state.checklist_id().map(str::to_string),
        ) else {
            continue;
        };

        let title = task.title.clone();
        let outcome = |action: SyncAction| SyncOutcome {
            file: file_key.to_string(),
            title: title.clone(),
            action,
        };

        let card = match client.get_card(&card_id) {
            Ok(c) => c,
            Err(e) => {
                outcomes.push(outcome(SyncAction::Failed {
                    message: e.to_string(),
                }));
                continue;
            }
        };

        if card.list_id != list_id {
            tracing::warn!(title = %task.title, list = %card.list_id, "card left tracked list, deprecating");
            task.state.deprecate();
            outcomes.push(outcome(SyncAction::Deprecated));
            continue;
        }

        let items = match client.get_checklist_items(&checklist_id) {
            Ok(items) => items,
            Err(e) => {
                outcomes.push(outcome(SyncAction::Failed {
                    message: e.to_string(),
                }));
                continue;
            }
        };
        let names: Vec<String> = items.into_iter().map(|i| i.name).collect();
        let regenerated = codec::serialize(&task.title, &names);

        // Locate this task's block by verbatim text, claiming its span so a
        // second identical block maps to the next occurrence.
        let block_idx = blocks
            .iter()
            .enumerate()
            .find(|(i, b)| !claimed.contains(i) && b.comment == task.comment)
            .map(|(i, _)| i);
        let Some(idx) = block_idx else {
            tracing::debug!(title = %task.title, "stored comment not found in source, skipping rewrite");
            continue;
        };
        claimed.insert(idx);

        if regenerated == task.comment {
            outcomes.push(outcome(SyncAction::Unchanged));
            continue;
        }

        replacements.push((blocks[idx].span.clone(), regenerated.clone()));
        task.comment = regenerated;
        task.checklist = names;
        outcomes.push(outcome(SyncAction::Updated));
    }

    replacements
}

/// Splice replacements into `text`. Spans refer to the original text, so they
/// are applied in descending start order to keep earlier offsets valid.
fn apply_replacements(text: &str, mut replacements: Vec<(Range<usize>, String)>) -> String {
    replacements.sort_by(|a, b| b.0.start.cmp(&a.0.start));
    let mut out = text.to_string();
    for (span, replacement) in replacements {
        out.replace_range(span, &replacement);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
