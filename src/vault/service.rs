use tracing::{info, warn};

use super::endpoints::VaultClient;
use crate::config::{Settings, VaultConfig};
use crate::error::BookstoreError;

/// Log in to Vault, read the bookstore secret and merge it into `settings`.
///
/// A failed login is only logged: the read is still attempted with whatever
/// token the client holds (`VAULT_TOKEN`, if any). A failed read or a bundle
/// that is not an object is returned as an error and stops startup.
pub async fn bootstrap_secrets(settings: Settings) -> Result<Settings, BookstoreError> {
    let cfg = VaultConfig::from_settings(&settings);
    let mut client = VaultClient::new(&cfg)?;

    match client.login_kubernetes(&cfg).await {
        Ok(Some(_)) => {}
        Ok(None) => warn!("Vault login returned no auth info"),
        Err(e) => warn!(error = %e, "Vault login failed; continuing without a fresh token"),
    }

    let bundle = client.read_kv2(&cfg.kv_mount, &cfg.bookstore_env).await?;
    let keys = bundle.as_object().map(|o| o.len()).unwrap_or_default();
    let settings = settings.merge_secret(bundle)?;

    info!(
        mount = %cfg.kv_mount,
        env = %cfg.bookstore_env,
        keys,
        "merged Vault secret into configuration"
    );
    Ok(settings)
}
