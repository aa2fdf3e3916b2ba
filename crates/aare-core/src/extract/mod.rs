use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ontology::Ontology;

mod pattern;

pub use pattern::PatternExtractor;

/// Typed key/value data pulled out of free text.
pub type ExtractedData = BTreeMap<String, ExtractedValue>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ExtractedValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl ExtractedValue {
    #[must_use]
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Bool(_) => None,
            #[expect(
                clippy::cast_precision_loss,
                reason = "extracted integers are scores and counts far below 2^52"
            )]
            Self::Int(value) => Some(value as f64),
            Self::Float(value) => Some(value),
        }
    }
}

/// Turns free text plus an ontology's extraction rules into typed data.
pub trait Extractor: Send + Sync {
    fn parse(&self, text: &str, ontology: &Ontology) -> Result<ExtractedData>;
}
