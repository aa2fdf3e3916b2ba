// Public fallible APIs in this crate share one concrete error contract (`AareError`).
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod config;
pub mod error;
pub mod extract;
pub mod loader;
pub mod ontology;
pub mod service;
pub mod solver;
pub mod store;

pub use config::AppConfig;
pub use error::{AareError, OntologyFailureKind, OntologyLoadError, Result};
pub use extract::{ExtractedData, ExtractedValue, Extractor, PatternExtractor};
pub use loader::OntologyLoader;
pub use ontology::{DEFAULT_ONTOLOGY_NAME, Ontology};
pub use service::{SOLVER_LABEL, VerificationReport, VerificationService, VerifyRequest};
pub use solver::{FormulaSolver, Solver, VerificationResult, Violation};
pub use store::OntologyStore;
