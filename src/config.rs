//! Process configuration.
//!
//! [`Settings`] is a flat, case-insensitive key/value view over the process
//! environment. Secrets fetched from Vault at startup are merged on top of it
//! with [`Settings::merge_secret`]. The typed configs below are read out of a
//! `Settings` once and handed to the components that need them.

use std::str::FromStr;

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde_json::{Map, Value};
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::error::BookstoreError;

pub const PORT: &str = "PORT";
pub const LOGLEVEL: &str = "LOGLEVEL";

pub const VAULT_ADDR: &str = "VAULT_ADDR";
pub const VAULT_TOKEN: &str = "VAULT_TOKEN";
pub const VAULT_ROLE: &str = "VAULT_ROLE";
pub const VAULT_KV_MOUNT: &str = "VAULT_KV_MOUNT";
pub const VAULT_BOOKSTORE_ENV: &str = "VAULT_BOOKSTORE_ENV";
pub const VAULT_K8S_AUTH_MOUNT: &str = "VAULT_K8S_AUTH_MOUNT";

pub const KUBE_SVC_ACCT_TOKEN: &str = "KUBE_SVC_ACCT_TOKEN";

pub const DB_HOST: &str = "DB_HOST";
pub const DB_PORT: &str = "DB_PORT";
pub const DB_NAME: &str = "DB_NAME";
pub const DB_USER: &str = "DB_USER";
pub const DB_PASS: &str = "DB_PASS";
pub const DB_SSL: &str = "DB_SSL";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOGLEVEL: &str = "info";
const DEFAULT_VAULT_ADDR: &str = "https://127.0.0.1:8200";
const DEFAULT_K8S_AUTH_MOUNT: &str = "kubernetes";
const DEFAULT_KUBE_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

#[derive(Debug, Clone)]
pub struct Settings {
    figment: Figment,
}

impl Settings {
    /// Snapshot the process environment. Values are kept as the raw strings
    /// the environment holds.
    pub fn from_env() -> Self {
        let raw: Map<String, Value> = Env::raw()
            .iter()
            .map(|(k, v)| (k.as_str().to_ascii_lowercase(), Value::String(v)))
            .collect();
        Self::from_figment(Figment::from(Serialized::defaults(raw)))
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    /// Look up `key` case-insensitively. Missing keys read as an empty string.
    pub fn get(&self, key: &str) -> String {
        match self.figment.extract_inner::<Value>(&key.to_ascii_lowercase()) {
            Ok(Value::String(s)) => s,
            Ok(Value::Null) | Err(_) => String::new(),
            Ok(other) => other.to_string(),
        }
    }

    fn get_or(&self, key: &str, default: &str) -> String {
        let value = self.get(key);
        if value.is_empty() {
            default.to_string()
        } else {
            value
        }
    }

    /// Merge a secret bundle on top of the current values. The bundle must be
    /// a JSON object; its keys override environment keys of the same name.
    pub fn merge_secret(self, bundle: Value) -> Result<Self, BookstoreError> {
        let Value::Object(entries) = bundle else {
            return Err(BookstoreError::Config(format!(
                "secret bundle must be an object, got {}",
                json_kind(&bundle)
            )));
        };
        let normalized: Map<String, Value> = entries
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();

        Ok(Self {
            figment: self.figment.merge(Serialized::defaults(normalized)),
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub loglevel: String,
}

impl ServerConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, BookstoreError> {
        let port = match settings.get(PORT) {
            p if p.is_empty() => DEFAULT_PORT,
            p => p
                .parse()
                .map_err(|e| BookstoreError::Config(format!("invalid {PORT} {p:?}: {e}")))?,
        };
        Ok(Self {
            port,
            loglevel: settings.get_or(LOGLEVEL, DEFAULT_LOGLEVEL),
        })
    }
}

#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub addr: String,
    pub token: Option<String>,
    pub role: String,
    pub kube_token_path: String,
    pub kv_mount: String,
    pub bookstore_env: String,
    pub auth_mount: String,
}

impl VaultConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        let token = settings.get(VAULT_TOKEN);
        Self {
            addr: settings.get_or(VAULT_ADDR, DEFAULT_VAULT_ADDR),
            token: (!token.is_empty()).then_some(token),
            role: settings.get(VAULT_ROLE),
            kube_token_path: settings.get_or(KUBE_SVC_ACCT_TOKEN, DEFAULT_KUBE_TOKEN_PATH),
            kv_mount: settings.get(VAULT_KV_MOUNT),
            bookstore_env: settings.get(VAULT_BOOKSTORE_ENV),
            auth_mount: settings.get_or(VAULT_K8S_AUTH_MOUNT, DEFAULT_K8S_AUTH_MOUNT),
        }
    }
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: String,
    pub name: String,
    pub user: String,
    pub pass: String,
    pub ssl: String,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .field("ssl", &self.ssl)
            .finish()
    }
}

impl DatabaseConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            host: settings.get(DB_HOST),
            port: settings.get(DB_PORT),
            name: settings.get(DB_NAME),
            user: settings.get(DB_USER),
            pass: settings.get(DB_PASS),
            ssl: settings.get(DB_SSL),
        }
    }

    /// Build driver options. Empty values fall back to the driver defaults.
    pub fn connect_options(&self) -> Result<PgConnectOptions, BookstoreError> {
        let mut opts = PgConnectOptions::new();
        if !self.host.is_empty() {
            opts = opts.host(&self.host);
        }
        if !self.port.is_empty() {
            let port = self.port.parse::<u16>().map_err(|e| {
                BookstoreError::Config(format!("invalid {DB_PORT} {:?}: {e}", self.port))
            })?;
            opts = opts.port(port);
        }
        if !self.name.is_empty() {
            opts = opts.database(&self.name);
        }
        if !self.user.is_empty() {
            opts = opts.username(&self.user);
        }
        if !self.pass.is_empty() {
            opts = opts.password(&self.pass);
        }
        if !self.ssl.is_empty() {
            let mode = PgSslMode::from_str(&self.ssl).map_err(|e| {
                BookstoreError::Config(format!("invalid {DB_SSL} {:?}: {e}", self.ssl))
            })?;
            opts = opts.ssl_mode(mode);
        }
        Ok(opts)
    }
}
