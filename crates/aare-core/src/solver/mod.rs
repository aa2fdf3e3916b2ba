use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::ExtractedData;
use crate::ontology::Ontology;

mod formula;
mod formula_solver;

pub use formula_solver::FormulaSolver;

/// Evaluates an ontology's constraints against extracted data.
pub trait Solver: Send + Sync {
    fn verify(&self, data: &ExtractedData, ontology: &Ontology) -> Result<VerificationResult>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationResult {
    pub verified: bool,
    pub violations: Vec<Violation>,
    /// Solver-specific artifact explaining the outcome.
    pub proof: serde_json::Value,
    pub execution_time_ms: f64,
}

/// A constraint found false for the extracted data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violation {
    pub constraint_id: String,
    pub category: String,
    pub description: String,
    pub error_message: String,
    pub citation: String,
    pub formula: String,
}
