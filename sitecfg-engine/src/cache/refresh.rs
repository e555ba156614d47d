use std::sync::Weak;

use tokio::sync::oneshot;

use super::ConfigCache;
use crate::settings::CacheSettings;

/// Fixed-delay refresh loop of one cache
///
/// Ends when cancelled or when the cache has been dropped.
pub(super) async fn refresh_task(
    cache: Weak<ConfigCache>,
    settings: CacheSettings,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    let interval = settings.update_interval();
    let settle = settings.settle_delay();

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                // Let notifications emitted with the change reach the dirty set
                tokio::time::sleep(settle).await;

                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let name = cache.name();

                match tokio::task::spawn_blocking(move || cache.perform_update()).await {
                    Ok(outcome) => {
                        tracing::trace!(cache = name, ?outcome, "Refresh cycle finished");
                    }
                    Err(e) => {
                        tracing::error!(cache = name, error = %e, "Refresh cycle panicked");
                    }
                }
            }
            _ = &mut cancel_rx => {
                tracing::debug!("Refresh task stopped");
                break;
            }
        }
    }
}
