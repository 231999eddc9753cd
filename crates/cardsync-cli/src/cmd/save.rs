use crate::output::{print_json, print_table};
use anyhow::Context;
use cardsync_core::{
    codec,
    config::Config,
    paths,
    reconcile::{self, ReconcileAction, ReconcileOptions, ReconcileOutcome},
    remote::TrelloClient,
    store::TaskStore,
};
use std::path::Path;

/// One reconcile pass for one file: parse its task comments, diff against the
/// store, drive the board, persist the store.
pub fn run(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    // Credentials are resolved before any remote call; absence aborts the pass.
    let creds = config.credentials()?;

    let text = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;
    let current = codec::active_tasks(&text, config.checklist_policy);
    let file_key = paths::file_key(file);

    let client = TrelloClient::from_credentials(&config.base_url, &creds);
    let opts = ReconcileOptions::from_config(&config, &creds);

    let mut store = TaskStore::load(root)?;
    let outcomes = reconcile::reconcile_file(&client, &mut store, &file_key, current, &opts);
    store.save(root).context("failed to save task store")?;

    report(&outcomes, json)
}

fn report(outcomes: &[ReconcileOutcome], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&outcomes);
    }
    if outcomes.is_empty() {
        println!("No task comments found.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = outcomes
        .iter()
        .map(|o| vec![o.title.clone(), describe(&o.action)])
        .collect();
    print_table(&["TASK", "RESULT"], rows);
    Ok(())
}

fn describe(action: &ReconcileAction) -> String {
    match action {
        ReconcileAction::Created => "created".to_string(),
        ReconcileAction::Adopted => "adopted existing card".to_string(),
        ReconcileAction::Skipped => "up to date".to_string(),
        ReconcileAction::SkippedDeprecated => "deprecated (skipped)".to_string(),
        ReconcileAction::Deleted => "remote card deleted".to_string(),
        ReconcileAction::Failed { message } => format!("FAILED: {message}"),
    }
}
