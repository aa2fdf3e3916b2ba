mod default;
mod model;
mod parse;

pub use default::{DEFAULT_ONTOLOGY_NAME, default_ontology};
pub use model::{Constraint, ExtractorSpec, Ontology, ValueKind, VariableDef, VariableType};
pub use parse::{REQUIRED_FIELDS, parse_ontology};
