use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Listing of certified candidates, relative to `base_url`.
    #[serde(default = "default_listing_path")]
    pub listing_path: String,
    /// Pause between election page requests.
    #[serde(default = "default_pace_ms")]
    pub pace_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub db_path: Option<String>,
    pub pace_ms: Option<u64>,
    pub disable_cache: bool,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/calaccess-candidates/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(db_path) = overrides.db_path {
            self.storage.db_path = db_path;
        }
        if let Some(pace_ms) = overrides.pace_ms {
            self.source.pace_ms = pace_ms;
        }
        if overrides.disable_cache {
            self.cache.enabled = false;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.source.base_url)
            .with_context(|| format!("invalid base_url: {}", self.source.base_url))
    }

    pub fn listing_url(&self) -> Result<Url> {
        self.base_url()?
            .join(&self.source.listing_path)
            .with_context(|| format!("invalid listing_path: {}", self.source.listing_path))
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn resolved_cache_dir(&self) -> PathBuf {
        expand_tilde(&self.cache.dir)
    }

    pub fn default_template() -> String {
        let template = r#"[source]
base_url = "http://cal-access.sos.ca.gov/"
listing_path = "/Campaign/Candidates/list.aspx?view=certified&electNav=93"
pace_ms = 500

[http]
user_agent = "calaccess-candidates/0.1"
timeout_secs = 30
connect_timeout_secs = 10
max_retries = 3
retry_backoff_ms = 2000

[cache]
enabled = true
dir = "~/.cache/calaccess-candidates/pages"

[storage]
db_path = "~/.local/share/calaccess-candidates/candidates.db"
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            listing_path: default_listing_path(),
            pace_ms: default_pace_ms(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: default_cache_dir(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_base_url() -> String {
    "http://cal-access.sos.ca.gov/".to_string()
}

fn default_listing_path() -> String {
    "/Campaign/Candidates/list.aspx?view=certified&electNav=93".to_string()
}

fn default_pace_ms() -> u64 {
    500
}

fn default_user_agent() -> String {
    "calaccess-candidates/0.1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    2000
}

fn default_cache_dir() -> String {
    "~/.cache/calaccess-candidates/pages".to_string()
}

fn default_db_path() -> String {
    "~/.local/share/calaccess-candidates/candidates.db".to_string()
}

fn default_true() -> bool {
    true
}
