use cardsync_core::{config::Config, paths};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Watch a directory for source changes. A changed file with a configured
/// extension triggers a reconcile pass for that file; every
/// `sync_interval_secs` an inbound sync pass runs. Both kinds of pass run
/// sequentially on this thread, so they never overlap.
pub fn run(root: &Path, dir: Option<&Path>) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    // Fail fast: a watcher without credentials would only ever log errors.
    config.credentials()?;

    let watch_dir: PathBuf = dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());

    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher = RecommendedWatcher::new(tx, NotifyConfig::default())?;
    watcher.watch(&watch_dir, RecursiveMode::Recursive)?;

    let interval = Duration::from_secs(config.sync_interval_secs.max(1));
    let mut next_sync = Instant::now() + interval;
    tracing::info!(dir = %watch_dir.display(), interval_secs = config.sync_interval_secs, "watching");

    loop {
        let timeout = next_sync.saturating_duration_since(Instant::now());
        match rx.recv_timeout(timeout) {
            Ok(Ok(event)) => {
                if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                    continue;
                }
                for path in event.paths {
                    if !has_watched_extension(&path, &config.extensions) {
                        continue;
                    }
                    // The store rewrite itself must not re-trigger a pass.
                    if path.starts_with(paths::cardsync_dir(root)) {
                        continue;
                    }
                    tracing::info!(file = %path.display(), "change detected, reconciling");
                    if let Err(e) = super::save::run(root, &path, false) {
                        tracing::warn!(file = %path.display(), error = %e, "save pass failed");
                    }
                }
            }
            Ok(Err(e)) => tracing::warn!(error = %e, "watch error"),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::info!("sync timer fired, pulling board state");
                if let Err(e) = super::sync::run(root, false) {
                    tracing::warn!(error = %e, "sync pass failed");
                }
                next_sync = Instant::now() + interval;
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(())
}

fn has_watched_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want == ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_filter() {
        let exts = vec!["ts".to_string()];
        assert!(has_watched_extension(Path::new("/src/a.ts"), &exts));
        assert!(!has_watched_extension(Path::new("/src/a.rs"), &exts));
        assert!(!has_watched_extension(Path::new("/src/Makefile"), &exts));
    }
}
