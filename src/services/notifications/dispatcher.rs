use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use super::{Notification, Notifier};

const QUEUE_CAPACITY: usize = 256;

/// Fire-and-forget delivery. Messages go onto a bounded queue drained by a
/// background task; delivery failures are logged and never reach the caller.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::Sender<Notification>,
}

impl NotificationDispatcher {
    /// Spawns the delivery task, so this must run inside a tokio runtime.
    pub fn spawn(notifier: Arc<dyn Notifier>, send_timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        tokio::spawn(delivery_loop(notifier, rx, send_timeout));
        Self { tx }
    }

    pub fn dispatch(&self, notification: Notification) {
        if notification.to.is_empty() {
            tracing::debug!(subject = %notification.subject, "no recipient, notification skipped");
            return;
        }
        if let Err(e) = self.tx.try_send(notification) {
            let dropped = match e {
                mpsc::error::TrySendError::Full(n) | mpsc::error::TrySendError::Closed(n) => n,
            };
            tracing::warn!(
                to = %dropped.to,
                subject = %dropped.subject,
                "notification queue unavailable, message dropped"
            );
        }
    }
}

async fn delivery_loop(
    notifier: Arc<dyn Notifier>,
    mut rx: mpsc::Receiver<Notification>,
    send_timeout: Duration,
) {
    while let Some(n) = rx.recv().await {
        match timeout(send_timeout, notifier.send(&n.to, &n.subject, &n.html_body)).await {
            Ok(Ok(())) => {
                tracing::info!(to = %n.to, subject = %n.subject, "notification sent");
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, to = %n.to, subject = %n.subject, "notification failed");
            }
            Err(_) => {
                tracing::warn!(
                    to = %n.to,
                    subject = %n.subject,
                    timeout = ?send_timeout,
                    "notification timed out"
                );
            }
        }
    }
}
