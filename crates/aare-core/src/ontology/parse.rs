use std::collections::HashSet;

use crate::error::OntologyLoadError;

use super::model::{Ontology, ValueKind};

/// Top-level keys a stored ontology document must carry.
pub const REQUIRED_FIELDS: [&str; 4] = ["name", "version", "constraints", "extractors"];

pub fn parse_ontology(raw: &str) -> Result<Ontology, OntologyLoadError> {
    let document = serde_json::from_str::<serde_json::Value>(raw)?;
    let Some(fields) = document.as_object() else {
        return Err(OntologyLoadError::Invalid(
            "ontology document must be a JSON object".to_string(),
        ));
    };
    if let Some(missing) = REQUIRED_FIELDS
        .iter()
        .find(|field| !fields.contains_key(**field))
    {
        return Err(OntologyLoadError::Invalid(format!("missing {missing}")));
    }

    let ontology = serde_json::from_value::<Ontology>(document)
        .map_err(|err| OntologyLoadError::Invalid(format!("unexpected shape: {err}")))?;
    validate_rules(&ontology)?;
    Ok(ontology)
}

fn validate_rules(ontology: &Ontology) -> Result<(), OntologyLoadError> {
    let mut seen = HashSet::new();
    for constraint in &ontology.constraints {
        if !seen.insert(constraint.id.as_str()) {
            return Err(OntologyLoadError::Invalid(format!(
                "duplicate constraint id: {}",
                constraint.id
            )));
        }
    }

    for (variable, spec) in &ontology.extractors {
        match (&spec.pattern, spec.keywords.is_empty()) {
            (None, true) => {
                return Err(OntologyLoadError::Invalid(format!(
                    "extractor `{variable}` needs a pattern or keywords"
                )));
            }
            (None, false) if spec.kind != ValueKind::Boolean => {
                return Err(OntologyLoadError::Invalid(format!(
                    "extractor `{variable}` uses keywords but is not boolean"
                )));
            }
            _ => {}
        }
    }
    Ok(())
}
