use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub max_connections: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub session_expiry_minutes: u64,
    /// Seconds an emailed activation key stays redeemable.
    pub activation_expiry_secs: i64,
    /// Login failures from one address before it is blacklisted...
    pub max_login_failures: usize,
    /// ...when they fall inside this window (seconds).
    pub failure_window_secs: i64,
    /// Key for sealing activation and removal tickets.
    ///
    /// Prefer loading this via the `REVIEW_SECRET_KEY` environment variable.
    /// This config field is the fallback for deployments that cannot inject
    /// env vars at runtime.
    ///
    /// **Minimum length:** 32 characters.
    /// **Hot-reload safe:** NO. The server derives its sealing cipher from
    /// this once at startup. Rotating it requires a restart and invalidates
    /// every activation and removal link already mailed out.
    pub secret_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// CIDR blocks denied at login regardless of failure history.
    pub blocked_networks: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MailConfig {
    /// Recipient for review-report mails.
    pub admin_email: String,
    /// Public base URL used when building activation and removal links.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl ServerConfig {
    /// Full bind address, e.g. `"0.0.0.0:5000"`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl AuthConfig {
    /// Session expiry converted to seconds, for expiry stamps and cookie
    /// `Max-Age`.
    pub fn session_expiry_secs(&self) -> i64 {
        (self.session_expiry_minutes * 60) as i64
    }

    /// Resolve the sealing key with the `REVIEW_SECRET_KEY` env-var taking
    /// priority over the config file field.
    ///
    /// Returns `None` when neither source is set (the server startup code
    /// treats this as a hard error).
    pub fn resolved_secret_key(&self) -> Option<String> {
        std::env::var("REVIEW_SECRET_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.secret_key.clone())
            .filter(|s| !s.is_empty())
    }
}

impl MailConfig {
    /// Activation link placed in registration mails.
    pub fn activation_url(&self, key: &str) -> String {
        format!("{}/activate?key={}", self.base_url, key)
    }

    /// Removal link placed in report mails to the admin.
    pub fn removal_url(&self, key: &str) -> String {
        format!("{}/remove?key={}", self.base_url, key)
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5000,
            max_connections: 1000,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_expiry_minutes: 60,
            activation_expiry_secs: 600,
            max_login_failures: 5,
            failure_window_secs: 3600,
            secret_key: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "reviews.db".to_string(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            admin_email: "admin@localhost".to_string(),
            base_url: "http://localhost:5000".to_string(),
        }
    }
}
