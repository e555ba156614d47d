//! `sitecfg watch`: keep both caches live and report refreshes

use std::sync::Arc;

use serde::Serialize;
use sitecfg_engine::{ConfigurationManager, RepositoryWatcher};
use sitecfg_protocol::RepositoryEvent;
use sitecfg_utils::Result;
use tracing::{info, warn};

use super::{print_json, Session};

#[derive(Debug, Serialize)]
struct RefreshReport {
    cycle: u64,
    configs: usize,
    folder_types: usize,
    pending: usize,
}

pub async fn watch(session: Session) -> Result<i32> {
    if !session.manager.initialize() {
        warn!("Starting with uninitialized caches");
    }

    if session.settings.watcher.enabled {
        let watcher = RepositoryWatcher::new(
            Arc::clone(&session.repository),
            session.settings.watcher.debounce(),
        )?;
        let manager = Arc::clone(&session.manager);
        tokio::spawn(watcher.run(move |event| {
            forward(&manager, event);
            true
        }));
    } else {
        info!("Filesystem watcher disabled");
    }

    let cache = session.manager.cache(session.project);
    loop {
        tokio::select! {
            _ = cache.wait_for_update() => {
                let state = cache.state();
                print_json(&RefreshReport {
                    cycle: cache.update_count(),
                    configs: state.config_count(),
                    folder_types: state.folder_types().len(),
                    pending: cache.pending(),
                })?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                break;
            }
        }
    }

    session.manager.shutdown();
    Ok(0)
}

/// A directory is edited and published at once
fn forward(manager: &ConfigurationManager, event: RepositoryEvent) {
    let resources: Vec<_> = event.resources().into_iter().cloned().collect();
    manager.handle_event(&event);
    if !resources.is_empty() {
        manager.handle_event(&RepositoryEvent::ProjectPublished { resources });
    }
}
