use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, info, warn};

use crate::config::DEFAULT_ONTOLOGY_CACHE_CAPACITY;
use crate::error::{OntologyFailureKind, OntologyLoadError};
use crate::ontology::{DEFAULT_ONTOLOGY_NAME, Ontology, default_ontology, parse_ontology};
use crate::store::{ONTOLOGY_FILE_SUFFIX, OntologyStore};

pub(crate) mod cache;

use cache::LruCache;

/// What the loader does when a named ontology cannot be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackDecision {
    /// Serve the built-in default ontology, logging at the given severity.
    UseDefault(FallbackSeverity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FallbackSeverity {
    Info,
    Warn,
    Error,
}

/// Every failure kind degrades to the default ontology. A document that
/// exists but fails validation is an authoring bug and logs at error level.
#[must_use]
pub const fn fallback_decision(kind: OntologyFailureKind) -> FallbackDecision {
    match kind {
        OntologyFailureKind::NotFound => FallbackDecision::UseDefault(FallbackSeverity::Info),
        OntologyFailureKind::Fetch | OntologyFailureKind::Malformed => {
            FallbackDecision::UseDefault(FallbackSeverity::Warn)
        }
        OntologyFailureKind::Invalid => FallbackDecision::UseDefault(FallbackSeverity::Error),
    }
}

/// Fetches, validates and memoizes ontologies by name.
///
/// The cache lock is never held across a store fetch, so two concurrent first
/// loads of the same name may both hit the store. Fetches are idempotent and
/// the later insert wins.
pub struct OntologyLoader {
    store: Arc<dyn OntologyStore>,
    cache: Mutex<LruCache<String, Arc<Ontology>>>,
}

impl std::fmt::Debug for OntologyLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OntologyLoader")
            .field("cached", &self.cached_len())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

impl OntologyLoader {
    #[must_use]
    pub fn new(store: Arc<dyn OntologyStore>) -> Self {
        Self::with_capacity(store, DEFAULT_ONTOLOGY_CACHE_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(store: Arc<dyn OntologyStore>, capacity: usize) -> Self {
        Self {
            store,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Resolve `name` to a usable ontology. Never fails: any acquisition
    /// failure yields the built-in default, and that outcome is cached too.
    pub fn load(&self, name: &str) -> Arc<Ontology> {
        if let Some(hit) = self.lock_cache().get(&name.to_string()) {
            debug!(ontology = name, "ontology cache hit");
            return hit;
        }

        let ontology = match self.try_load(name) {
            Ok(ontology) => Arc::new(ontology),
            Err(err) => {
                let FallbackDecision::UseDefault(severity) = fallback_decision(err.kind());
                log_fallback(name, &err, severity);
                default_ontology()
            }
        };

        if let Some(evicted) = self
            .lock_cache()
            .insert(name.to_string(), Arc::clone(&ontology))
        {
            debug!(ontology = %evicted, "evicted ontology from cache");
        }
        ontology
    }

    /// Fetch and validate `name` without caching or fallback.
    pub fn try_load(&self, name: &str) -> Result<Ontology, OntologyLoadError> {
        let raw = self.store.fetch(name)?;
        parse_ontology(&raw)
    }

    /// Names of the ontologies in the store. Never fails: a storage error
    /// yields only the default ontology's name.
    pub fn list_available(&self) -> Vec<String> {
        match self.store.list() {
            Ok(objects) => objects
                .into_iter()
                .filter_map(|object| {
                    object
                        .strip_suffix(ONTOLOGY_FILE_SUFFIX)
                        .map(ToString::to_string)
                })
                .collect(),
            Err(err) => {
                warn!(error = %err, "failed to list ontologies");
                vec![DEFAULT_ONTOLOGY_NAME.to_string()]
            }
        }
    }

    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.lock_cache().len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.lock_cache().capacity()
    }

    #[must_use]
    pub fn is_cached(&self, name: &str) -> bool {
        self.lock_cache().contains(&name.to_string())
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, LruCache<String, Arc<Ontology>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_fallback(name: &str, err: &OntologyLoadError, severity: FallbackSeverity) {
    let kind = err.kind().as_str();
    match severity {
        FallbackSeverity::Info => {
            info!(ontology = name, kind, "ontology not found; using default ontology");
        }
        FallbackSeverity::Warn => {
            warn!(ontology = name, kind, error = %err, "failed to load ontology; using default ontology");
        }
        FallbackSeverity::Error => {
            error!(ontology = name, kind, error = %err, "stored ontology failed validation; using default ontology");
        }
    }
}
