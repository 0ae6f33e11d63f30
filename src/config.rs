use std::env;
use std::path::PathBuf;

/// Value of `DATA_FILE` that keeps the store document in process memory only.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub data_file: String,
    pub public_dir: PathBuf,
    pub public_url: String,
    pub admin_token: String,
    pub mail_api_url: String,
    pub mail_api_key: String,
    pub mail_from: String,
    pub receiver_email: String,
    pub send_confirmations: bool,
    pub storage_timeout_ms: u64,
    pub notify_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        // Serverless deployments only allow writes under /tmp
        let data_file = env::var("DATA_FILE").unwrap_or_else(|_| {
            if env::var("VERCEL").is_ok() {
                "/tmp/data.json".to_string()
            } else {
                "data.json".to_string()
            }
        });

        Self {
            port,
            data_file,
            public_dir: env::var("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("public")),
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| format!("http://localhost:{port}")),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            mail_api_url: env::var("MAIL_API_URL").unwrap_or_default(),
            mail_api_key: env::var("MAIL_API_KEY").unwrap_or_default(),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "\"PZ Booking\" <no-reply@localhost>".to_string()),
            receiver_email: env::var("RECEIVER_EMAIL").unwrap_or_default(),
            send_confirmations: env::var("SEND_CONFIRMATIONS")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            storage_timeout_ms: env::var("STORAGE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),
            notify_timeout_secs: env::var("NOTIFY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }

    pub fn mail_configured(&self) -> bool {
        !self.mail_api_url.is_empty() && !self.mail_api_key.is_empty()
    }

    pub fn cancel_link(&self, token: &str) -> String {
        format!(
            "{}/book.html?cancel={token}",
            self.public_url.trim_end_matches('/')
        )
    }
}
