//! Configuration for the dictionary service
//!
//! Resolution priority: command line → environment → TOML file → compiled
//! default. Command line and environment are merged by clap; the TOML file
//! and root folder go through `vocab_common::config`.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use vocab_common::config::{
    database_path, default_config_path, default_root_folder, load_toml_config,
    resolve_root_folder,
};
use vocab_common::{Error, Result};

use crate::aggregator::{AggregatorSettings, DEFAULT_DEADLINE, DEFAULT_MAX_CONCURRENCY};
use crate::cache::{CacheTtl, DEFAULT_DURABLE_TTL, DEFAULT_FAST_TTL};
use crate::models::SourceId;
use crate::sources::{youdao, SourceEndpoint, SourceEndpoints};

pub const CONFIG_FILE_NAME: &str = "vocab-dict.toml";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5731";
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const ENV_BIND: &str = "VOCAB_DICT_BIND";
pub const ENV_ROOT_FOLDER: &str = "VOCAB_ROOT_FOLDER";
pub const ENV_LOG_LEVEL: &str = "VOCAB_LOG_LEVEL";
pub const ENV_CONFIG: &str = "VOCAB_DICT_CONFIG";

/// Command line arguments
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "vocab-dict", version, about = "Multi-source dictionary lookup service")]
pub struct CliArgs {
    /// TOML configuration file
    #[arg(long, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Root folder holding the cache database
    #[arg(long)]
    pub root_folder: Option<PathBuf>,

    /// Listen address
    #[arg(long, env = ENV_BIND)]
    pub bind: Option<SocketAddr>,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, env = ENV_LOG_LEVEL)]
    pub log_level: Option<String>,

    /// Write the resolved configuration to the config file and exit
    #[arg(long)]
    pub write_config: bool,
}

impl CliArgs {
    /// `--config` if given, else `<config dir>/vocab/vocab-dict.toml`
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config
            .clone()
            .or_else(|| default_config_path(CONFIG_FILE_NAME))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub fast_ttl_secs: u64,
    pub durable_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fast_ttl_secs: DEFAULT_FAST_TTL.as_secs(),
            durable_ttl_secs: DEFAULT_DURABLE_TTL.as_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> CacheTtl {
        CacheTtl {
            fast: Duration::from_secs(self.fast_ttl_secs),
            durable: Duration::from_secs(self.durable_ttl_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    pub deadline_secs: u64,
    pub max_concurrency: usize,
    pub enabled_sources: Vec<SourceId>,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            deadline_secs: DEFAULT_DEADLINE.as_secs(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            enabled_sources: SourceId::ALL.to_vec(),
        }
    }
}

impl AggregateConfig {
    pub fn settings(&self) -> AggregatorSettings {
        AggregatorSettings {
            deadline: Duration::from_secs(self.deadline_secs),
            max_concurrency: self.max_concurrency,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictConfig {
    pub bind_addr: SocketAddr,
    pub root_folder: Option<PathBuf>,
    pub log_level: String,
    pub cache: CacheConfig,
    pub aggregate: AggregateConfig,
    pub sources: SourceEndpoints,
    /// Free-text translation endpoint (Youdao mobile site)
    pub translate: SourceEndpoint,
}

impl Default for DictConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5731)),
            root_folder: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            cache: CacheConfig::default(),
            aggregate: AggregateConfig::default(),
            sources: SourceEndpoints::default(),
            translate: SourceEndpoint::new(
                youdao::DEFAULT_TRANSLATE_BASE_URL,
                youdao::DEFAULT_TRANSLATE_TIMEOUT_SECS,
            ),
        }
    }
}

impl DictConfig {
    /// Load the TOML file and apply command line / environment overrides
    pub fn resolve(args: &CliArgs) -> Result<Self> {
        let mut config: DictConfig = match &args.config_path() {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration file");
                load_toml_config(path)?
            }
            None => DictConfig::default(),
        };

        config.apply_overrides(args);
        config.validate()?;
        Ok(config)
    }

    /// Overlay command line / environment values onto file values
    pub fn apply_overrides(&mut self, args: &CliArgs) {
        if let Some(bind) = args.bind {
            self.bind_addr = bind;
        }
        if let Some(level) = &args.log_level {
            if !level.trim().is_empty() {
                self.log_level = level.trim().to_string();
            }
        }
        self.root_folder = Some(resolve_root_folder(
            args.root_folder.as_deref(),
            ENV_ROOT_FOLDER,
            self.root_folder.as_deref(),
        ));
    }

    pub fn validate(&self) -> Result<()> {
        if self.aggregate.max_concurrency == 0 {
            return Err(Error::Config(
                "aggregate.max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.aggregate.deadline_secs == 0 {
            return Err(Error::Config(
                "aggregate.deadline_secs must be greater than 0".to_string(),
            ));
        }
        for source in SourceId::ALL {
            let endpoint = self.sources.get(source);
            if reqwest::Url::parse(&endpoint.base_url).is_err() {
                return Err(Error::Config(format!(
                    "sources.{}.base_url is not a valid URL: {}",
                    source, endpoint.base_url
                )));
            }
        }
        if reqwest::Url::parse(&self.translate.base_url).is_err() {
            return Err(Error::Config(format!(
                "translate.base_url is not a valid URL: {}",
                self.translate.base_url
            )));
        }
        Ok(())
    }

    pub fn root_folder(&self) -> PathBuf {
        self.root_folder.clone().unwrap_or_else(default_root_folder)
    }

    pub fn database_path(&self) -> PathBuf {
        database_path(&self.root_folder())
    }
}
