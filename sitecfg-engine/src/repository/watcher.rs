//! Filesystem watcher feeding repository events

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::event::{ModifyKind, RemoveKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, FileIdMap};
use sitecfg_protocol::{RepositoryEvent, Resource};
use sitecfg_utils::{Result, SitecfgError};
use tokio::sync::mpsc;

use super::{FsRepository, Repository};

/// Watches an [`FsRepository`] root and reports changes as [`RepositoryEvent`]s
pub struct RepositoryWatcher {
    repository: Arc<FsRepository>,
    rx: mpsc::UnboundedReceiver<Result<Vec<Event>>>,
    /// Debouncer handle (kept alive)
    _debouncer: Debouncer<RecommendedWatcher, FileIdMap>,
}

impl RepositoryWatcher {
    pub fn new(repository: Arc<FsRepository>, debounce: Duration) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut debouncer = new_debouncer(debounce, None, move |result: DebounceEventResult| {
            let events = result
                .map(|events| events.into_iter().map(|e| e.event).collect())
                .map_err(|errs| SitecfgError::repository(format!("Watch error: {:?}", errs)));
            let _ = tx.send(events);
        })
        .map_err(|e| SitecfgError::repository(format!("Failed to create watcher: {}", e)))?;

        debouncer
            .watcher()
            .watch(repository.root(), RecursiveMode::Recursive)
            .map_err(|e| SitecfgError::repository(format!("Failed to watch: {}", e)))?;

        Ok(Self {
            repository,
            rx,
            _debouncer: debouncer,
        })
    }

    /// Forward events until the watcher is dropped or `sink` returns false
    pub async fn run<F>(mut self, mut sink: F)
    where
        F: FnMut(RepositoryEvent) -> bool,
    {
        tracing::info!("Repository watcher started for {:?}", self.repository.root());

        while let Some(result) = self.rx.recv().await {
            match result {
                Ok(events) => {
                    for event in &events {
                        for converted in to_repository_events(&self.repository, event) {
                            tracing::debug!(kind = converted.kind(), "repository change");
                            if !sink(converted) {
                                tracing::info!("Repository watcher stopped");
                                return;
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Repository watch error: {}", e);
                }
            }
        }
    }
}

/// Translate one filesystem event; paths outside the root are dropped
///
/// Directory creates, renames and removals are expanded to every resource
/// in the subtree, since ids follow paths and each config document below
/// the directory changes identity with it.
pub(crate) fn to_repository_events(
    repository: &FsRepository,
    event: &Event,
) -> Vec<RepositoryEvent> {
    match &event.kind {
        EventKind::Create(_) => event
            .paths
            .iter()
            .flat_map(|p| subtree(repository, p, false))
            .map(RepositoryEvent::ResourceCreated)
            .collect(),
        EventKind::Modify(ModifyKind::Name(_)) => {
            let (present, gone): (Vec<&PathBuf>, Vec<&PathBuf>) =
                event.paths.iter().partition(|p| p.exists());
            let deleted: Vec<Resource> = gone
                .into_iter()
                .flat_map(|p| subtree(repository, p, false))
                .collect();

            let mut converted = Vec::new();
            if !deleted.is_empty() {
                converted.push(RepositoryEvent::ResourceDeleted(deleted));
            }
            converted.extend(
                present
                    .into_iter()
                    .flat_map(|p| subtree(repository, p, false))
                    .map(RepositoryEvent::ResourceCreated),
            );
            converted
        }
        EventKind::Modify(_) => event
            .paths
            .iter()
            .filter_map(|p| {
                let is_dir = p.is_dir();
                repository
                    .root_path_for(p, is_dir)
                    .map(|root_path| repository.resource_for(&root_path, is_dir))
            })
            .map(RepositoryEvent::ResourceModified)
            .collect(),
        EventKind::Remove(kind) => {
            let deleted: Vec<Resource> = event
                .paths
                .iter()
                .flat_map(|p| subtree(repository, p, *kind == RemoveKind::Folder))
                .collect();
            if deleted.is_empty() {
                Vec::new()
            } else {
                vec![RepositoryEvent::ResourceDeleted(deleted)]
            }
        }
        _ => Vec::new(),
    }
}

/// The resource at `fs_path` plus everything below it
///
/// An existing directory is walked; a vanished path answers from the ids
/// the repository has seen before.
fn subtree(repository: &FsRepository, fs_path: &Path, assume_dir: bool) -> Vec<Resource> {
    let exists = fs_path.exists();
    let is_dir = assume_dir || fs_path.is_dir();
    let Some(root_path) = repository.root_path_for(fs_path, is_dir) else {
        return Vec::new();
    };

    if exists && is_dir {
        match repository.list_resources(&root_path, None) {
            Ok(resources) => return resources,
            Err(e) => {
                tracing::warn!(path = %root_path, error = %e, "Could not list changed directory");
            }
        }
    } else if !exists {
        let known = repository.known_below(&root_path);
        if !known.is_empty() {
            return known;
        }
    }
    vec![repository.resource_for(&root_path, is_dir)]
}
