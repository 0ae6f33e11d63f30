use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;

use super::Notifier;

/// Transactional-mail HTTP API that accepts `{from, to, subject, html}` with a
/// bearer key.
pub struct HttpMailNotifier {
    api_url: String,
    api_key: String,
    from: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OutgoingMail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

impl HttpMailNotifier {
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        Self {
            api_url,
            api_key,
            from,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for HttpMailNotifier {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> anyhow::Result<()> {
        let mail = OutgoingMail {
            from: &self.from,
            to,
            subject,
            html: html_body,
        };

        self.client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&mail)
            .send()
            .await
            .context("failed to reach mail API")?
            .error_for_status()
            .context("mail API returned error")?;

        Ok(())
    }
}
