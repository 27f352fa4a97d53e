use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::config::VaultConfig;
use crate::error::BookstoreError;

const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

/// Minimal Vault HTTP client holding the address and the current token.
pub struct VaultClient {
    http: reqwest::Client,
    addr: Url,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct KubernetesLoginRequest<'a> {
    role: &'a str,
    jwt: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    auth: Option<VaultAuthInfo>,
}

/// The `auth` block of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct VaultAuthInfo {
    pub client_token: String,
    #[serde(default)]
    pub accessor: Option<String>,
    #[serde(default)]
    pub policies: Vec<String>,
    #[serde(default)]
    pub lease_duration: u64,
    #[serde(default)]
    pub renewable: bool,
}

#[derive(Debug, Deserialize)]
struct KvReadResponse {
    #[serde(default)]
    data: Option<KvData>,
}

#[derive(Debug, Deserialize)]
struct KvData {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    metadata: Option<KvMetadata>,
}

#[derive(Debug, Deserialize)]
struct KvMetadata {
    #[serde(default)]
    version: Option<u64>,
}

impl VaultClient {
    pub fn new(cfg: &VaultConfig) -> Result<Self, BookstoreError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("bookstore/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            http,
            addr: Url::parse(&cfg.addr)?,
            token: cfg.token.clone(),
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn endpoint(&self, path: &str) -> Result<Url, BookstoreError> {
        let base = self.addr.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/v1/{}", path.trim_start_matches('/')))?)
    }

    /// Exchange the service-account token at `cfg.kube_token_path` for a
    /// Vault token bound to `cfg.role`. On success the returned token is used
    /// for every later call. `Ok(None)` means Vault answered without an
    /// `auth` block.
    pub async fn login_kubernetes(
        &mut self,
        cfg: &VaultConfig,
    ) -> Result<Option<VaultAuthInfo>, BookstoreError> {
        if cfg.role.is_empty() {
            return Err(BookstoreError::VaultAuth(
                "no role name was provided".to_string(),
            ));
        }
        let jwt = read_service_account_token(Path::new(&cfg.kube_token_path))?;
        let url = self.endpoint(&format!("auth/{}/login", cfg.auth_mount))?;

        let resp: LoginResponse = self
            .http
            .post(url)
            .json(&KubernetesLoginRequest {
                role: &cfg.role,
                jwt: &jwt,
            })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                BookstoreError::VaultAuth(format!("unable to log in with Kubernetes auth: {e}"))
            })?
            .json()
            .await?;

        if let Some(auth) = resp.auth.as_ref() {
            self.token = Some(auth.client_token.clone());
            info!(
                role = %cfg.role,
                policies = ?auth.policies,
                lease_duration = auth.lease_duration,
                "Vault Kubernetes login succeeded"
            );
        }
        Ok(resp.auth)
    }

    /// Read the latest version of the KV v2 secret `path` under `mount` and
    /// return its `data` object.
    pub async fn read_kv2(&self, mount: &str, path: &str) -> Result<Value, BookstoreError> {
        let url = self.endpoint(&format!(
            "{}/data/{}",
            mount.trim_matches('/'),
            path.trim_matches('/')
        ))?;

        let mut req = self.http.get(url).header("Accept", "application/json");
        if let Some(token) = self.token.as_deref() {
            req = req.header(VAULT_TOKEN_HEADER, token);
        }

        let resp: KvReadResponse = req
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                BookstoreError::SecretFetch(format!("unable to read secret {mount}/{path}: {e}"))
            })?
            .json()
            .await
            .map_err(|e| {
                BookstoreError::SecretFetch(format!("malformed secret response: {e}"))
            })?;

        let kv = resp
            .data
            .ok_or_else(|| BookstoreError::SecretFetch(format!("secret {mount}/{path} not found")))?;
        let version = kv.metadata.and_then(|m| m.version);
        let data = kv.data.ok_or_else(|| {
            BookstoreError::SecretFetch(format!("secret {mount}/{path} has no data"))
        })?;
        debug!(mount, path, ?version, "read Vault KV v2 secret");
        Ok(data)
    }
}

fn read_service_account_token(path: &Path) -> Result<String, BookstoreError> {
    let token = std::fs::read_to_string(path).map_err(|e| {
        BookstoreError::VaultAuth(format!(
            "unable to read service account token {}: {e}",
            path.display()
        ))
    })?;
    Ok(token.trim().to_string())
}
