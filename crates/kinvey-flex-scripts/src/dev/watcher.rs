//! Bundle watcher with debouncing.
//!
//! Watches the directory containing the bundle and reports writes to the
//! bundle file itself. Bundlers often write a file several times in a row,
//! so a change is only reported once the file has been quiet for the
//! debounce window, and it is the last change of the burst.

use crate::error::{CliError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Modified(PathBuf),
    Created(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    /// Whether the bundle is present after this change.
    pub fn is_removal(&self) -> bool {
        matches!(self, FileChange::Removed(_))
    }
}

/// Watches a single bundle file.
pub struct BundleWatcher {
    _watcher: RecommendedWatcher,
    target: PathBuf,
}

impl BundleWatcher {
    /// Start watching `bundle`. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundle's directory does not exist or the
    /// platform watcher cannot be created.
    pub fn new(bundle: &Path, debounce_ms: u64) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        let dir = bundle
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if !dir.exists() {
            return Err(CliError::FileNotFound(dir.to_path_buf()));
        }
        let dir = dir.canonicalize()?;
        let file_name = bundle
            .file_name()
            .ok_or_else(|| CliError::InvalidArgument(format!("not a file: {}", bundle.display())))?;
        let target = dir.join(file_name);

        let (raw_tx, raw_rx) = mpsc::unbounded_channel();
        let (tx, rx) = mpsc::channel(16);
        let watched = target.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else {
                return;
            };
            for path in event.paths.iter().filter(|p| is_target(p, &watched)) {
                let change = match event.kind {
                    EventKind::Create(_) => FileChange::Created(path.clone()),
                    EventKind::Modify(_) => FileChange::Modified(path.clone()),
                    EventKind::Remove(_) => FileChange::Removed(path.clone()),
                    _ => continue,
                };
                let _ = raw_tx.send(change);
            }
        })?;

        tokio::spawn(debounce(raw_rx, tx, Duration::from_millis(debounce_ms)));
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        Ok((
            Self {
                _watcher: watcher,
                target,
            },
            rx,
        ))
    }

    /// Absolute path of the watched bundle.
    pub fn target(&self) -> &Path {
        &self.target
    }
}

/// Forwards the last change of each burst once `window` passes without a new one.
async fn debounce(
    mut raw: mpsc::UnboundedReceiver<FileChange>,
    out: mpsc::Sender<FileChange>,
    window: Duration,
) {
    while let Some(mut pending) = raw.recv().await {
        let closed = loop {
            match tokio::time::timeout(window, raw.recv()).await {
                Ok(Some(change)) => pending = change,
                Ok(None) => break true,
                Err(_) => break false,
            }
        };

        if out.send(pending).await.is_err() || closed {
            return;
        }
    }
}

fn is_target(path: &Path, target: &Path) -> bool {
    if path == target {
        return true;
    }
    // some backends report paths through a different prefix (symlinked tmp dirs)
    path.file_name() == target.file_name()
        && path
            .parent()
            .and_then(|p| p.canonicalize().ok())
            .is_some_and(|p| Some(p.as_path()) == target.parent())
}
