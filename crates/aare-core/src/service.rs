use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{AppConfig, StorageConfig};
use crate::error::Result;
use crate::extract::{ExtractedData, Extractor, PatternExtractor};
use crate::loader::OntologyLoader;
use crate::ontology::DEFAULT_ONTOLOGY_NAME;
use crate::solver::{FormulaSolver, Solver, Violation};
use crate::store::{DirOntologyStore, ObjectOntologyStore, OntologyStore, UnavailableStore};

pub const SOLVER_LABEL: &str = "Constraint Logic";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyRequest {
    pub llm_output: String,
    pub ontology: String,
}

impl VerifyRequest {
    #[must_use]
    pub fn new(llm_output: impl Into<String>) -> Self {
        Self {
            llm_output: llm_output.into(),
            ontology: DEFAULT_ONTOLOGY_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn with_ontology(mut self, ontology: impl Into<String>) -> Self {
        self.ontology = ontology.into();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OntologySummary {
    pub name: String,
    pub version: String,
    pub constraints_checked: usize,
}

/// Body of a successful verification response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationReport {
    pub verified: bool,
    pub violations: Vec<Violation>,
    pub parsed_data: ExtractedData,
    pub ontology: OntologySummary,
    pub proof: serde_json::Value,
    pub solver: String,
    pub verification_id: String,
    pub execution_time_ms: f64,
    pub timestamp: String,
}

/// Long-lived handles shared by every request: the ontology loader and the
/// extraction and solving capabilities.
pub struct VerificationService {
    loader: OntologyLoader,
    extractor: Arc<dyn Extractor>,
    solver: Arc<dyn Solver>,
}

impl std::fmt::Debug for VerificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationService")
            .field("loader", &self.loader)
            .finish_non_exhaustive()
    }
}

impl VerificationService {
    #[must_use]
    pub fn new(
        loader: OntologyLoader,
        extractor: Arc<dyn Extractor>,
        solver: Arc<dyn Solver>,
    ) -> Self {
        Self {
            loader,
            extractor,
            solver,
        }
    }

    /// Service over `store` with the built-in extractor and solver.
    #[must_use]
    pub fn with_store(store: Arc<dyn OntologyStore>, cache_capacity: usize) -> Self {
        Self::new(
            OntologyLoader::with_capacity(store, cache_capacity),
            Arc::new(PatternExtractor::new()),
            Arc::new(FormulaSolver::new()),
        )
    }

    /// Must be called outside any async runtime: the object store client is blocking.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let store: Arc<dyn OntologyStore> = match &config.storage {
            StorageConfig::Directory(root) => Arc::new(DirOntologyStore::new(root.clone())),
            StorageConfig::ObjectStore(object) => match ObjectOntologyStore::new(object.clone()) {
                Ok(store) => Arc::new(store),
                Err(err) => {
                    warn!(error = %err, "failed to initialize ontology storage client");
                    Arc::new(UnavailableStore::new(err.to_string()))
                }
            },
        };
        Self::with_store(store, config.cache_capacity)
    }

    #[must_use]
    pub fn loader(&self) -> &OntologyLoader {
        &self.loader
    }

    /// Load the ontology, extract, verify and assemble the response body.
    /// Extractor and solver failures propagate unmodified.
    pub fn verify(&self, request: &VerifyRequest) -> Result<VerificationReport> {
        let ontology = self.loader.load(&request.ontology);
        let parsed_data = self.extractor.parse(&request.llm_output, &ontology)?;
        let result = self.solver.verify(&parsed_data, &ontology)?;
        debug!(
            ontology = %ontology.name,
            verified = result.verified,
            violations = result.violations.len(),
            "verification complete"
        );

        Ok(VerificationReport {
            verified: result.verified,
            violations: result.violations,
            parsed_data,
            ontology: OntologySummary {
                name: ontology.name.clone(),
                version: ontology.version.clone(),
                constraints_checked: ontology.constraints.len(),
            },
            proof: result.proof,
            solver: SOLVER_LABEL.to_string(),
            verification_id: Uuid::new_v4().to_string(),
            execution_time_ms: result.execution_time_ms,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        })
    }
}
