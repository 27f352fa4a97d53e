//! Startup secret bootstrap against HashiCorp Vault.
//!
//! - `endpoints.rs`: HTTP calls for Kubernetes login and KV v2 reads
//! - `service.rs`: the one-shot login, fetch and merge sequence

pub mod endpoints;
pub mod service;

pub use endpoints::{VaultAuthInfo, VaultClient};
pub use service::bootstrap_secrets;
