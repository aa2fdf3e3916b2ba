use std::path::PathBuf;

mod env;

pub const ONTOLOGY_BUCKET_ENV: &str = "ONTOLOGY_BUCKET";
pub const ONTOLOGY_DIR_ENV: &str = "AARE_ONTOLOGY_DIR";
pub const STORAGE_ENDPOINT_ENV: &str = "AARE_STORAGE_ENDPOINT";
pub const STORAGE_TOKEN_ENV: &str = "AARE_STORAGE_TOKEN";
pub const STORAGE_TIMEOUT_MS_ENV: &str = "AARE_STORAGE_TIMEOUT_MS";
pub const ONTOLOGY_CACHE_CAPACITY_ENV: &str = "AARE_ONTOLOGY_CACHE_CAPACITY";

pub const DEFAULT_ONTOLOGY_BUCKET: &str = "aare-ai-ontologies";
pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://storage.googleapis.com";
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_ONTOLOGY_CACHE_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub cache_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    ObjectStore(ObjectStoreConfig),
    Directory(PathBuf),
}

#[derive(Clone, PartialEq, Eq)]
pub struct ObjectStoreConfig {
    pub endpoint: String,
    pub bucket: String,
    pub token: Option<String>,
    pub timeout_ms: u64,
}

impl std::fmt::Debug for ObjectStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreConfig")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_STORAGE_ENDPOINT.to_string(),
            bucket: DEFAULT_ONTOLOGY_BUCKET.to_string(),
            token: None,
            timeout_ms: DEFAULT_STORAGE_TIMEOUT_MS,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::ObjectStore(ObjectStoreConfig::default()),
            cache_capacity: DEFAULT_ONTOLOGY_CACHE_CAPACITY,
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(&|name| std::env::var(name).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let storage = match env::read_non_empty_env(lookup, ONTOLOGY_DIR_ENV) {
            Some(dir) => StorageConfig::Directory(PathBuf::from(dir)),
            None => StorageConfig::ObjectStore(ObjectStoreConfig {
                endpoint: env::read_non_empty_env(lookup, STORAGE_ENDPOINT_ENV)
                    .map(|raw| raw.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_STORAGE_ENDPOINT.to_string()),
                bucket: env::read_non_empty_env(lookup, ONTOLOGY_BUCKET_ENV)
                    .unwrap_or_else(|| DEFAULT_ONTOLOGY_BUCKET.to_string()),
                token: env::read_non_empty_env(lookup, STORAGE_TOKEN_ENV),
                timeout_ms: env::read_env_u64(lookup, STORAGE_TIMEOUT_MS_ENV)
                    .filter(|value| *value > 0)
                    .unwrap_or(DEFAULT_STORAGE_TIMEOUT_MS),
            }),
        };
        Self {
            storage,
            cache_capacity: env::read_env_usize(
                lookup,
                ONTOLOGY_CACHE_CAPACITY_ENV,
                DEFAULT_ONTOLOGY_CACHE_CAPACITY,
                1,
            ),
        }
    }
}
