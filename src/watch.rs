//! Re-render on source file changes.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::fs;
use std::path::Path;
use std::sync::mpsc;
use tracing::{debug, info, warn};

use crate::display::Display;
use crate::session::Session;

/// Watches `path` and republishes the preview whenever its text changes.
///
/// The parent directory is watched rather than the file itself so editors
/// that save by renaming a fresh file over the old one are still seen.
/// Events are handled one at a time; this call blocks until the watcher
/// stops delivering events.
///
/// # Errors
///
/// Returns error if the watcher cannot be created or attached
pub fn watch<D: Display>(path: &Path, session: &mut Session<D>) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch directory: {}", dir.display()))?;

    info!(path = %path.display(), "Watching for changes");

    for res in rx {
        match res {
            Ok(event) if is_relevant(&event, path) => match reload(path, session) {
                Ok(true) => info!(path = %path.display(), "Preview updated"),
                Ok(false) => debug!(path = %path.display(), "Source unchanged"),
                Err(e) => warn!(error = %e, "Failed to refresh preview"),
            },
            Ok(_) => {}
            Err(e) => warn!(error = %e, "File watcher error"),
        }
    }

    Ok(())
}

/// Checks whether an event is a write or creation of the watched file.
pub fn is_relevant(event: &Event, path: &Path) -> bool {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return false;
    }
    let Some(name) = path.file_name() else {
        return false;
    };
    event
        .paths
        .iter()
        .any(|changed| changed.file_name() == Some(name))
}

/// Re-reads the source and publishes it when the text differs.
///
/// Returns whether a new preview was published.
///
/// # Errors
///
/// Returns error if the file cannot be read or the display fails
pub fn reload<D: Display>(path: &Path, session: &mut Session<D>) -> Result<bool> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read source: {}", path.display()))?;

    if text == session.buffer().text() {
        return Ok(false);
    }

    session.set_text(text)?;
    Ok(true)
}
