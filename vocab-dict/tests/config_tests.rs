//! Configuration resolution across CLI, environment and TOML
//!
//! Tests touching process environment are serialized.

use clap::Parser;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use vocab_common::Error;
use vocab_dict::config::{CliArgs, DictConfig, ENV_BIND, ENV_LOG_LEVEL, ENV_ROOT_FOLDER};
use vocab_dict::models::SourceId;

fn clear_env() {
    env::remove_var(ENV_BIND);
    env::remove_var(ENV_LOG_LEVEL);
    env::remove_var(ENV_ROOT_FOLDER);
    env::remove_var("VOCAB_DICT_CONFIG");
}

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("vocab-dict.toml");
    fs::write(&path, contents).unwrap();
    path
}

fn parse(args: &[&str]) -> CliArgs {
    let mut argv = vec!["vocab-dict"];
    argv.extend_from_slice(args);
    CliArgs::try_parse_from(argv).unwrap()
}

#[test]
#[serial]
fn test_toml_values_used_without_overrides() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        bind_addr = "127.0.0.1:7000"
        root_folder = "/srv/vocab"
        log_level = "warn"

        [aggregate]
        deadline_secs = 5
        enabled_sources = ["bing", "freedict"]
        "#,
    );

    let config = DictConfig::resolve(&parse(&["--config", path.to_str().unwrap()])).unwrap();

    assert_eq!(config.bind_addr.port(), 7000);
    assert_eq!(config.root_folder(), PathBuf::from("/srv/vocab"));
    assert_eq!(config.log_level, "warn");
    assert_eq!(config.aggregate.deadline_secs, 5);
    assert_eq!(
        config.aggregate.enabled_sources,
        vec![SourceId::Bing, SourceId::FreeDict]
    );
}

#[test]
#[serial]
fn test_environment_overrides_toml() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "bind_addr = \"127.0.0.1:7000\"\nroot_folder = \"/srv/vocab\"\n",
    );
    env::set_var(ENV_BIND, "127.0.0.1:7100");
    env::set_var(ENV_ROOT_FOLDER, "/env/vocab");
    env::set_var(ENV_LOG_LEVEL, "trace");

    let config = DictConfig::resolve(&parse(&["--config", path.to_str().unwrap()])).unwrap();
    clear_env();

    assert_eq!(config.bind_addr.port(), 7100);
    assert_eq!(config.root_folder(), PathBuf::from("/env/vocab"));
    assert_eq!(config.log_level, "trace");
}

#[test]
#[serial]
fn test_command_line_overrides_environment() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");
    env::set_var(ENV_BIND, "127.0.0.1:7100");
    env::set_var(ENV_ROOT_FOLDER, "/env/vocab");

    let args = parse(&[
        "--config",
        path.to_str().unwrap(),
        "--bind",
        "127.0.0.1:7200",
        "--root-folder",
        "/cli/vocab",
    ]);
    let config = DictConfig::resolve(&args).unwrap();
    clear_env();

    assert_eq!(config.bind_addr.port(), 7200);
    assert_eq!(config.root_folder(), PathBuf::from("/cli/vocab"));
    assert_eq!(config.database_path(), PathBuf::from("/cli/vocab/vocab.db"));
}

#[test]
#[serial]
fn test_missing_file_means_defaults() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let config = DictConfig::resolve(&parse(&["--config", path.to_str().unwrap()])).unwrap();

    assert_eq!(config.bind_addr, DictConfig::default().bind_addr);
    assert_eq!(config.aggregate, DictConfig::default().aggregate);
    assert_eq!(config.sources, DictConfig::default().sources);
}

#[test]
#[serial]
fn test_malformed_file_is_config_error() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "bind_addr = [not valid");

    let result = DictConfig::resolve(&parse(&["--config", path.to_str().unwrap()]));

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_invalid_values_rejected() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[aggregate]\nmax_concurrency = 0\n");

    let result = DictConfig::resolve(&parse(&["--config", path.to_str().unwrap()]));

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_written_config_resolves_back() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("vocab-dict.toml");
    let mut original = DictConfig::default();
    original.root_folder = Some(PathBuf::from("/written/vocab"));
    original.aggregate.enabled_sources = vec![SourceId::Cambridge];
    original.sources.bing.timeout_secs = 4;

    vocab_common::config::write_toml_config(&original, &path).unwrap();
    let resolved = DictConfig::resolve(&parse(&["--config", path.to_str().unwrap()])).unwrap();

    assert_eq!(resolved, original);
}
