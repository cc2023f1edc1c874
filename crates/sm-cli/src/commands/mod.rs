pub mod auth;
pub mod chat;
pub mod config;
pub mod progress;
pub mod study;
pub mod subjects;

use std::io::Write;
use std::sync::Arc;

use sm_client::{QueueConfig, SessionUpdateQueue, TutorApiError, TutorClient};
use sm_core::{Config, SettingsManager};

/// Everything a command needs: settings, the backend client, and the one
/// session-update queue instance shared for the process lifetime.
pub struct AppContext {
    pub settings: SettingsManager,
    pub config: Config,
    pub client: TutorClient,
    pub queue: SessionUpdateQueue,
}

impl AppContext {
    /// Load settings from the default location and wire up the client and
    /// queue from them.
    pub fn load() -> Self {
        let settings = SettingsManager::default_path();
        let config = settings.load_or_default();
        let client =
            TutorClient::with_timeout(&config.backend.base_url, config.backend.request_timeout());
        let queue = SessionUpdateQueue::new(
            Arc::new(client.clone()),
            QueueConfig {
                delivery_timeout: config.backend.delivery_timeout(),
            },
        );
        Self {
            settings,
            config,
            client,
            queue,
        }
    }

    /// The configured user id, or an error telling the user to log in.
    pub fn user_id(&self) -> anyhow::Result<String> {
        self.config
            .user
            .id
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no user configured — run `sm auth login` first"))
    }
}

/// Map common backend errors to user-friendly messages.
pub fn friendly_error(err: TutorApiError) -> anyhow::Error {
    match err {
        TutorApiError::Http(_) | TutorApiError::Timeout => anyhow::anyhow!(
            "Could not reach the studymate backend. Check your connection\n  \
             (or `backend.base_url` in `sm config path`)."
        ),
        TutorApiError::Unauthorized => {
            anyhow::anyhow!("Your session has expired. Run `sm auth login` again.")
        }
        other => anyhow::anyhow!("Backend request failed: {other}"),
    }
}

/// Read one trimmed line from stdin after printing a prompt.
pub fn prompt(msg: &str) -> anyhow::Result<String> {
    print!("{msg}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Wait for the queue to finish delivering session results. If delivery
/// halted on a network failure, offer to retry; declined or still-failing
/// updates are lost when the process exits (the queue is memory-only).
pub async fn flush_queue(ctx: &AppContext) -> anyhow::Result<()> {
    ctx.queue.wait_idle().await;
    while ctx.queue.pending_len() > 0 {
        let answer = prompt(&format!(
            "{} result(s) could not be saved (network problem). Retry now? [y/N] ",
            ctx.queue.pending_len()
        ))?;
        if !answer.eq_ignore_ascii_case("y") {
            tracing::warn!(
                pending = ctx.queue.pending_len(),
                "exiting with unsaved session results"
            );
            println!("Unsaved results will be lost.");
            break;
        }
        ctx.queue.retry_pending();
        ctx.queue.wait_idle().await;
    }
    Ok(())
}
