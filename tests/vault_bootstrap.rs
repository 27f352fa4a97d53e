//! Secret bootstrap against a mocked Vault server.
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use bookstore::BookstoreError;
use bookstore::config::{DB_HOST, DB_PASS, DB_USER, Settings, VaultConfig};
use bookstore::vault::{VaultClient, bootstrap_secrets};
use figment::{Figment, providers::Serialized};
use httpmock::prelude::*;
use serde_json::{Value, json};

struct TokenFile(PathBuf);

impl TokenFile {
    fn new(contents: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "bookstore-sa-token-{}-{}",
            std::process::id(),
            nanos
        ));
        std::fs::write(&path, contents).expect("write token file");
        Self(path)
    }

    fn path(&self) -> String {
        self.0.display().to_string()
    }
}

impl Drop for TokenFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn settings(entries: Value) -> Settings {
    Settings::from_figment(Figment::from(Serialized::defaults(entries)))
}

fn vault_settings(server: &MockServer, token_path: &str) -> Settings {
    settings(json!({
        "vault_addr": server.base_url(),
        "vault_role": "bookstore",
        "vault_kv_mount": "secret",
        "vault_bookstore_env": "dev",
        "kube_svc_acct_token": token_path,
        "db_host": "db.internal",
        "db_user": "env-user",
    }))
}

fn kv_response(data: Value) -> Value {
    json!({
        "request_id": "5b1c2a3e",
        "data": {
            "data": data,
            "metadata": { "version": 3, "destroyed": false }
        }
    })
}

#[tokio::test]
async fn login_token_is_used_to_fetch_and_merge_secrets() {
    let server = MockServer::start_async().await;
    let token = TokenFile::new("sa-jwt\n");

    let login = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/auth/kubernetes/login")
                .json_body(json!({ "role": "bookstore", "jwt": "sa-jwt" }));
            then.status(200).json_body(json!({
                "auth": {
                    "client_token": "hvs.issued",
                    "policies": ["default", "bookstore"],
                    "lease_duration": 3600,
                    "renewable": true
                }
            }));
        })
        .await;
    let read = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/secret/data/dev")
                .header("X-Vault-Token", "hvs.issued");
            then.status(200)
                .json_body(kv_response(json!({ "DB_USER": "vault-user", "DB_PASS": "s3cret" })));
        })
        .await;

    let merged = bootstrap_secrets(vault_settings(&server, &token.path()))
        .await
        .expect("bootstrap");

    login.assert_async().await;
    read.assert_async().await;
    assert_eq!(merged.get(DB_USER), "vault-user");
    assert_eq!(merged.get(DB_PASS), "s3cret");
    assert_eq!(merged.get(DB_HOST), "db.internal");
}

#[tokio::test]
async fn failed_login_still_attempts_the_secret_read() {
    let server = MockServer::start_async().await;
    let token = TokenFile::new("sa-jwt");

    let login = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/auth/kubernetes/login");
            then.status(403)
                .json_body(json!({ "errors": ["permission denied"] }));
        })
        .await;
    let read = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/secret/data/dev");
            then.status(200)
                .json_body(kv_response(json!({ "DB_PASS": "s3cret" })));
        })
        .await;

    let merged = bootstrap_secrets(vault_settings(&server, &token.path()))
        .await
        .expect("login failure is not fatal");

    login.assert_async().await;
    read.assert_async().await;
    assert_eq!(merged.get(DB_PASS), "s3cret");
    assert_eq!(merged.get(DB_USER), "env-user");
}

#[tokio::test]
async fn missing_token_file_is_a_login_error() {
    let server = MockServer::start_async().await;
    let cfg = VaultConfig::from_settings(&vault_settings(
        &server,
        "/nonexistent/bookstore/token",
    ));

    let mut client = VaultClient::new(&cfg).expect("client");
    let err = client.login_kubernetes(&cfg).await.unwrap_err();
    assert!(matches!(err, BookstoreError::VaultAuth(_)), "{err}");
    assert!(client.token().is_none());
}

#[tokio::test]
async fn login_without_auth_block_keeps_existing_token() {
    let server = MockServer::start_async().await;
    let token = TokenFile::new("sa-jwt");

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/auth/kubernetes/login");
            then.status(200).json_body(json!({ "warnings": ["no auth"] }));
        })
        .await;

    let cfg = VaultConfig::from_settings(&settings(json!({
        "vault_addr": server.base_url(),
        "vault_role": "bookstore",
        "vault_token": "hvs.preissued",
        "kube_svc_acct_token": token.path(),
    })));

    let mut client = VaultClient::new(&cfg).expect("client");
    let auth = client.login_kubernetes(&cfg).await.expect("login call");
    assert!(auth.is_none());
    assert_eq!(client.token(), Some("hvs.preissued"));
}

#[tokio::test]
async fn empty_role_is_rejected_before_contacting_vault() {
    let server = MockServer::start_async().await;
    let token = TokenFile::new("sa-jwt");
    let cfg = VaultConfig::from_settings(&settings(json!({
        "vault_addr": server.base_url(),
        "kube_svc_acct_token": token.path(),
    })));

    let mut client = VaultClient::new(&cfg).expect("client");
    let err = client.login_kubernetes(&cfg).await.unwrap_err();
    assert!(matches!(err, BookstoreError::VaultAuth(_)));
}

#[tokio::test]
async fn secret_read_failure_is_fatal() {
    let server = MockServer::start_async().await;
    let token = TokenFile::new("sa-jwt");

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/auth/kubernetes/login");
            then.status(200)
                .json_body(json!({ "auth": { "client_token": "hvs.issued" } }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/secret/data/dev");
            then.status(404).json_body(json!({ "errors": [] }));
        })
        .await;

    let err = bootstrap_secrets(vault_settings(&server, &token.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, BookstoreError::SecretFetch(_)), "{err}");
}

#[tokio::test]
async fn deleted_secret_version_is_fatal() {
    let server = MockServer::start_async().await;
    let token = TokenFile::new("sa-jwt");

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/auth/kubernetes/login");
            then.status(200)
                .json_body(json!({ "auth": { "client_token": "hvs.issued" } }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/secret/data/dev");
            then.status(200).json_body(kv_response(Value::Null));
        })
        .await;

    let err = bootstrap_secrets(vault_settings(&server, &token.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, BookstoreError::SecretFetch(_)), "{err}");
}

#[tokio::test]
async fn non_object_secret_cannot_be_merged() {
    let server = MockServer::start_async().await;
    let token = TokenFile::new("sa-jwt");

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/auth/kubernetes/login");
            then.status(200)
                .json_body(json!({ "auth": { "client_token": "hvs.issued" } }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/secret/data/dev");
            then.status(200)
                .json_body(kv_response(json!(["DB_USER", "DB_PASS"])));
        })
        .await;

    let err = bootstrap_secrets(vault_settings(&server, &token.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, BookstoreError::Config(_)), "{err}");
}
