pub mod dispatcher;
pub mod mail_api;
pub mod messages;

use async_trait::async_trait;

pub use dispatcher::NotificationDispatcher;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Stand-in when no mail provider is configured: the message only reaches the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> anyhow::Result<()> {
        tracing::info!(
            to = %to,
            subject = %subject,
            "mail not configured, notification logged only"
        );
        Ok(())
    }
}
