use crate::output::{print_json, print_table};
use cardsync_core::{store::TaskStore, task::SyncState};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = TaskStore::load(root)?;

    if json {
        return print_json(&store);
    }

    if store.files.is_empty() {
        println!("No tracked tasks.");
        return Ok(());
    }

    let mut rows = Vec::new();
    for (file, tasks) in &store.files {
        for task in tasks {
            rows.push(vec![
                file.clone(),
                task.title.clone(),
                describe(&task.state),
                task.state.card_id().unwrap_or("-").to_string(),
            ]);
        }
    }
    print_table(&["FILE", "TASK", "STATE", "CARD"], rows);
    Ok(())
}

fn describe(state: &SyncState) -> String {
    match state {
        SyncState::Unsynced => "unsynced".to_string(),
        SyncState::Synced { checklist_id, .. } if checklist_id.is_none() => {
            "synced (no checklist)".to_string()
        }
        SyncState::Synced { .. } => "synced".to_string(),
        SyncState::Deprecated { .. } => "deprecated".to_string(),
    }
}
