use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::handlers::QueryService;
use crate::storage::{
    ContentStore, DEFAULT_MAX_ENTRY_BYTES, HttpStore, HttpStoreConfig, MemoryStore, RetryPolicy, StorageAdapter,
};

/// Environment variable holding the web3.storage API token
pub const TOKEN_ENV: &str = "W3_STORAGE_API_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CidstoreConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Web3,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub api_url: String,
    pub gateway_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Largest entry body accepted from the gateway
    pub max_entry_bytes: u64,
    /// Where write payloads are staged before upload (system temp dir when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging_dir: Option<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Web3,
            api_url: "https://api.web3.storage".to_string(),
            gateway_url: "https://w3s.link".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES,
            staging_dir: None,
        }
    }
}

impl BackendConfig {
    pub fn http_config(&self, token: String) -> anyhow::Result<HttpStoreConfig> {
        Ok(HttpStoreConfig {
            api_url: self.api_url.parse::<url::Url>().map_err(|e| anyhow::anyhow!("invalid api_url {:?}: {}", self.api_url, e))?,
            gateway_url: self
                .gateway_url
                .parse::<url::Url>()
                .map_err(|e| anyhow::anyhow!("invalid gateway_url {:?}: {}", self.gateway_url, e))?,
            token,
            timeout: Duration::from_secs(self.timeout_secs),
            retry: RetryPolicy {
                max_retries: self.max_retries,
                ..RetryPolicy::default()
            },
            max_entry_bytes: self.max_entry_bytes,
        })
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("cidstore.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<CidstoreConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: CidstoreConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &CidstoreConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Build the query service for `config`.
///
/// `token` is the web3.storage credential; the web3 backend refuses to start
/// without it. The memory backend ignores it.
pub fn build_service(config: &BackendConfig, token: Option<String>) -> anyhow::Result<QueryService> {
    let store: Arc<dyn ContentStore> = match config.kind {
        BackendKind::Web3 => {
            let token = token
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("missing web3.storage credentials '{}' in env", TOKEN_ENV))?;
            Arc::new(HttpStore::new(config.http_config(token)?)?)
        }
        BackendKind::Memory => Arc::new(MemoryStore::new()),
    };

    let adapter = match &config.staging_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            StorageAdapter::with_staging_dir(store.clone(), dir)
        }
        None => StorageAdapter::new(store.clone()),
    };

    tracing::info!(backend = store.name(), staging_dir = %adapter.staging_dir().display(), "storage backend ready");
    Ok(QueryService::new(adapter))
}
