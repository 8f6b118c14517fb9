//! Command-line and environment configuration.

use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;

use crate::kv_client::{Credentials, Login};

/// HTTP todo service backed by a line-protocol key-value store.
#[derive(Parser)]
#[command(name = "todo-server", version)]
pub struct Config {
    /// Address the HTTP server binds to.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port the HTTP server listens on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address of the key-value store.
    #[arg(long, env = "KV_ADDR", default_value = "127.0.0.1:5142")]
    pub kv_addr: String,

    /// User sent with `LIN` during the store handshake.
    #[arg(long, env = "KV_USER", requires = "kv_password")]
    pub kv_user: Option<String>,

    #[arg(long, env = "KV_PASSWORD", hide_env_values = true, requires = "kv_user")]
    pub kv_password: Option<String>,

    /// Token sent with `AUTH` during the store handshake.
    #[arg(long, env = "KV_AUTH_TOKEN", hide_env_values = true)]
    pub kv_auth_token: Option<String>,

    /// Per-command timeout for store round trips, in milliseconds.
    #[arg(long, env = "KV_TIMEOUT_MS")]
    pub kv_timeout_ms: Option<u64>,

    /// Keep todos in process memory instead of the remote store.
    #[arg(long)]
    pub in_memory: bool,

    /// `tracing` filter directive, e.g. `info` or `todo_core=debug`.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Config {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn kv_timeout(&self) -> Option<Duration> {
        self.kv_timeout_ms.map(Duration::from_millis)
    }

    pub fn credentials(&self) -> Credentials {
        let login = match (&self.kv_user, &self.kv_password) {
            (Some(user), Some(password)) => Some(Login {
                user: user.clone(),
                password: SecretString::from(password.clone()),
            }),
            _ => None,
        };
        Credentials {
            login,
            auth_token: self.kv_auth_token.clone().map(SecretString::from),
        }
    }
}
