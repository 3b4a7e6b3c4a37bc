//! Idle session reaper.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::state::Registry;

/// Spawn the reaper task: every `check_interval`, disconnect sessions idle
/// longer than `idle_limit` through the standard disconnect path. The
/// authenticated bot nickname is exempt.
pub fn spawn(
    registry: Arc<Registry>,
    idle_limit: Duration,
    check_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(check_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick fires immediately; skip it.
        interval.tick().await;
        let mut shutdown_rx = registry.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let stale: Vec<_> = registry
                        .live_sessions()
                        .into_iter()
                        .filter_map(|(id, session)| {
                            let guard = session.read();
                            if guard.idle_for() <= idle_limit {
                                return None;
                            }
                            if let Some(nick) = &guard.nick {
                                if registry.is_bot(nick) {
                                    return None;
                                }
                            }
                            Some((id, guard.nick.clone()))
                        })
                        .collect();

                    for (id, nick) in stale {
                        info!(%id, nick = ?nick, "disconnecting idle session");
                        registry.remove_session(id).await;
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("idle reaper stopping");
                    break;
                }
            }
        }
    })
}
