use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = AareError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AareError {
    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("invalid extraction pattern for `{variable}`: {source}")]
    InvalidPattern {
        variable: String,
        #[source]
        source: regex::Error,
    },

    #[error("solver failed: {0}")]
    Solver(String),

    #[error("formula error in constraint {constraint_id}: {message}")]
    Formula {
        constraint_id: String,
        message: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AareError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Extraction(_) => "EXTRACTION_FAILED",
            Self::InvalidPattern { .. } => "INVALID_PATTERN",
            Self::Solver(_) => "SOLVER_FAILED",
            Self::Formula { .. } => "FORMULA_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Http(_) => "HTTP_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Client-safe description of the failure. Full detail stays in server logs.
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::Extraction(_) | Self::InvalidPattern { .. } => {
                "failed to extract structured data from llm_output"
            }
            Self::Solver(_) | Self::Formula { .. } => "failed to evaluate ontology constraints",
            Self::Config(_) => "service is misconfigured",
            Self::Http(_) | Self::Internal(_) => "internal verification error",
        }
    }
}

/// Why an ontology could not be acquired from its store.
#[derive(Debug, Error)]
pub enum OntologyLoadError {
    #[error("ontology not found: {0}")]
    NotFound(String),

    #[error("ontology fetch failed: {0}")]
    Fetch(String),

    #[error("ontology document is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid ontology: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OntologyFailureKind {
    NotFound,
    Fetch,
    Malformed,
    Invalid,
}

impl OntologyLoadError {
    #[must_use]
    pub fn kind(&self) -> OntologyFailureKind {
        match self {
            Self::NotFound(_) => OntologyFailureKind::NotFound,
            Self::Fetch(_) => OntologyFailureKind::Fetch,
            Self::Malformed(_) => OntologyFailureKind::Malformed,
            Self::Invalid(_) => OntologyFailureKind::Invalid,
        }
    }
}

impl OntologyFailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Fetch => "fetch",
            Self::Malformed => "malformed",
            Self::Invalid => "invalid",
        }
    }
}
