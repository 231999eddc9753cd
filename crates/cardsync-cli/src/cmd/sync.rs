use crate::output::{print_json, print_table};
use anyhow::Context;
use cardsync_core::{
    config::Config,
    remote::TrelloClient,
    store::TaskStore,
    sync::{self, SyncAction, SyncOutcome},
};
use std::path::Path;

/// One inbound sync pass over every tracked file: pull remote checklist
/// state back into source comments and flag cards that left the list.
pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let creds = config.credentials()?;

    let client = TrelloClient::from_credentials(&config.base_url, &creds);
    let mut store = TaskStore::load(root)?;

    let outcomes = sync::sync_store(&client, &mut store, &creds.list_id, config.checklist_policy);
    store.save(root).context("failed to save task store")?;

    report(&outcomes, json)
}

pub fn report(outcomes: &[SyncOutcome], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&outcomes);
    }
    if outcomes.is_empty() {
        println!("Nothing to sync.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = outcomes
        .iter()
        .map(|o| vec![o.file.clone(), o.title.clone(), describe(&o.action)])
        .collect();
    print_table(&["FILE", "TASK", "RESULT"], rows);
    Ok(())
}

fn describe(action: &SyncAction) -> String {
    match action {
        SyncAction::Updated => "comment updated from board".to_string(),
        SyncAction::Unchanged => "up to date".to_string(),
        SyncAction::Deprecated => "card left the tracked list; task deprecated".to_string(),
        SyncAction::Failed { message } => format!("FAILED: {message}"),
    }
}
