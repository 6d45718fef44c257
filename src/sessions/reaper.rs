use crate::app_context::AppContext;
use crate::sessions::services::{log_sessions_count, release};
use crate::storage::interface::ISessionStorage;
use crate::storage::sessions::HashMapSessionStorage;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Unmounts every session that went idle and returns how many were reaped.
///
/// Covers pages that were closed without a `DELETE`. Sessions with an open selection socket
/// are never idle.
pub async fn reap_idle<SS: ISessionStorage>(app_context: &AppContext<SS>) -> usize {
    let idle_timeout = app_context.config.idle_timeout;
    let mut reaped = 0;
    for handle in app_context.sessions.all().await {
        let mut session = handle.lock().await;
        if !session.is_idle(idle_timeout) {
            continue;
        }
        app_context.sessions.remove(&session.id).await;
        release(app_context, &mut session, "reaped");
        reaped += 1;
    }
    if reaped > 0 {
        log_sessions_count(app_context).await;
    }
    reaped
}

pub fn spawn_reaper(
    app_context: AppContext<HashMapSessionStorage>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let reaped = reap_idle(&app_context).await;
            tracing::debug!(task = "session_reaper", reaped, "Swept idle sessions.");
        }
    })
}
