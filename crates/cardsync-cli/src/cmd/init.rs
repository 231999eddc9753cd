use anyhow::Context;
use cardsync_core::{config::Config, io, paths, store::TaskStore};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing cardsync in: {}", root.display());

    // 1. Create the .cardsync directory
    let dir = paths::cardsync_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    // 2. Write config.yaml if missing
    let config_path = paths::config_path(root);
    if !config_path.exists() {
        let cfg = Config::new();
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    // 3. Write an empty store if missing
    let store_path = paths::store_path(root);
    if !store_path.exists() {
        let store = TaskStore::new();
        store.save(root).context("failed to write store.yaml")?;
        println!("  created: {}", paths::STORE_FILE);
    } else {
        println!("  exists:  {}", paths::STORE_FILE);
    }

    // 4. The store is machine-local state; keep it out of version control.
    io::ensure_gitignore_entry(root, paths::STORE_FILE)?;

    println!("\ncardsync initialized.");
    println!("Next: set CARDSYNC_API_KEY / CARDSYNC_API_TOKEN / CARDSYNC_LIST_ID,");
    println!("then: cardsync save <file>");
    Ok(())
}
