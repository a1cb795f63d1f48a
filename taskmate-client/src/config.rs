use crate::app::App;
use crate::http::HttpStore;
use crate::memory::MemoryStore;
use crate::remote::RemoteTaskStore;
use crate::sync::{ReadBackPolicy, TaskSync};
use std::sync::Arc;
use std::time::Duration;
use taskmate_core::{StoreError, DEFAULT_COLLECTION};
use thiserror::Error;

pub const DEFAULT_LOG_FILTER: &str = "taskmate=info";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidNumber {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to build remote store: {0}")]
    Store(#[from] StoreError),
}

/// Where task documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Process-local store, lost on exit.
    Memory,
    Http {
        base_url: String,
        token: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    pub collection: String,
    pub request_timeout: Duration,
    pub read_back_attempts: usize,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            collection: DEFAULT_COLLECTION.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            read_back_attempts: ReadBackPolicy::default().attempts,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Read `TASKMATE_*` variables and `RUST_LOG` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Unset or blank values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Config::default();

        if let Some(base_url) = get("TASKMATE_STORE_URL") {
            config.backend = Backend::Http {
                base_url,
                token: get("TASKMATE_STORE_TOKEN"),
            };
        }
        if let Some(collection) = get("TASKMATE_COLLECTION") {
            config.collection = collection;
        }
        if let Some(value) = get("TASKMATE_TIMEOUT_SECS") {
            let secs = parse_number("TASKMATE_TIMEOUT_SECS", &value)?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(value) = get("TASKMATE_READ_BACK_ATTEMPTS") {
            config.read_back_attempts = parse_number("TASKMATE_READ_BACK_ATTEMPTS", &value)?;
        }
        if let Some(filter) = get("RUST_LOG") {
            config.log_filter = filter;
        }

        Ok(config)
    }

    pub fn read_back_policy(&self) -> ReadBackPolicy {
        ReadBackPolicy {
            attempts: self.read_back_attempts,
            ..ReadBackPolicy::default()
        }
    }

    /// Instantiate the configured remote store.
    pub fn remote_store(&self) -> Result<Arc<dyn RemoteTaskStore>, ConfigError> {
        match &self.backend {
            Backend::Memory => {
                tracing::warn!("No TASKMATE_STORE_URL set; tasks are kept in memory only");
                Ok(Arc::new(MemoryStore::new()))
            }
            Backend::Http { base_url, token } => {
                tracing::info!("Using remote store at {}", base_url);
                let store = HttpStore::new(base_url, token.clone(), self.request_timeout)?;
                Ok(Arc::new(store))
            }
        }
    }

    pub fn task_sync(&self) -> Result<TaskSync<dyn RemoteTaskStore>, ConfigError> {
        Ok(TaskSync::new(self.remote_store()?)
            .with_collection(self.collection.clone())
            .with_read_back(self.read_back_policy()))
    }

    pub fn build_app(&self) -> Result<App<dyn RemoteTaskStore>, ConfigError> {
        Ok(App::new(self.task_sync()?))
    }
}

fn parse_number<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
            reason: e.to_string(),
        })
}
