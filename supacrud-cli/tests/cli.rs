//! Integration tests for argument handling and credential rotation

use async_trait::async_trait;
use clap::Parser;
use std::path::Path;
use supacrud::{
    ConfigResolver, ConfigResult, Connection, ConnectionSettings, EnvScanner, OperationKind,
    PersistedStore, ProbeError, Prompter, ResolverState, Validator,
};
use supacrud_cli::commands::generate::plan;
use supacrud_cli::{Cli, CredentialsCommand};
use tempfile::TempDir;

struct Answers {
    confirm: bool,
}

#[async_trait]
impl Prompter for Answers {
    async fn endpoint(&self) -> ConfigResult<String> {
        Ok("https://rotated.supabase.co".to_string())
    }

    async fn credential(&self) -> ConfigResult<String> {
        Ok("rotated-key".to_string())
    }

    async fn confirm(&self, _message: &str) -> ConfigResult<bool> {
        Ok(self.confirm)
    }
}

struct AcceptAll;

#[async_trait]
impl Validator for AcceptAll {
    async fn probe(&self, _connection: &Connection) -> Result<(), ProbeError> {
        Ok(())
    }
}

async fn resolver(root: &Path, confirm: bool) -> ConfigResolver<Answers, AcceptAll> {
    let settings = ConnectionSettings {
        store_dir: Some(root.join("store")),
        ..ConnectionSettings::default()
    };
    let store = PersistedStore::for_project(root, &settings).await.unwrap();
    let scanner = EnvScanner::new(root, &settings);
    ConfigResolver::new(store, scanner, Answers { confirm }, AcceptAll)
}

#[test]
fn test_long_flags() {
    let cli = Cli::try_parse_from([
        "supacrud",
        "--table",
        "users",
        "--create",
        "--read",
        "--update",
        "--delete",
        "--list",
    ])
    .unwrap();
    assert_eq!(cli.operations(), OperationKind::COMPOSITE_ORDER.to_vec());
}

#[test]
fn test_unknown_flag_is_rejected() {
    assert!(Cli::try_parse_from(["supacrud", "--upsert"]).is_err());
}

#[test]
fn test_plan_from_arguments() {
    let cli = Cli::try_parse_from(["supacrud", "-t", "users", "-t", "posts", "-a"]).unwrap();
    let units = plan(&cli.tables, &cli.operations());
    assert_eq!(units.len(), 2);
    assert!(units.iter().all(|u| u.operation == OperationKind::All));
}

#[tokio::test]
async fn test_rotation_persists_new_credentials() {
    let dir = TempDir::new().unwrap();
    let mut resolver = resolver(dir.path(), true).await;

    let rotated = CredentialsCommand::new().execute(&mut resolver).await.unwrap();
    assert!(rotated);
    assert!(matches!(resolver.state(), ResolverState::Connected(_)));

    let stored = std::fs::read_to_string(dir.path().join("store/config.json")).unwrap();
    assert!(stored.contains("https://rotated.supabase.co"));
    assert!(stored.contains("rotated-key"));
}

#[tokio::test]
async fn test_declined_rotation_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut resolver = resolver(dir.path(), false).await;

    let rotated = CredentialsCommand::new().execute(&mut resolver).await.unwrap();
    assert!(!rotated);
    assert!(matches!(resolver.state(), ResolverState::Unresolved));
    assert!(!dir.path().join("store/config.json").exists());
}

#[tokio::test]
async fn test_rotation_without_confirmation() {
    let dir = TempDir::new().unwrap();
    let mut resolver = resolver(dir.path(), false).await;

    let rotated = CredentialsCommand::new()
        .without_confirmation()
        .execute(&mut resolver)
        .await
        .unwrap();
    assert!(rotated);
}
