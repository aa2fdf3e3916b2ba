use crate::error::OntologyLoadError;

mod dir;
mod object;

pub use dir::DirOntologyStore;
pub use object::ObjectOntologyStore;

pub const ONTOLOGY_FILE_SUFFIX: &str = ".json";

/// Source of raw ontology documents addressed as `<name>.json`.
///
/// Calls are blocking. Implementations report a missing document as
/// [`OntologyLoadError::NotFound`] and every other failure as
/// [`OntologyLoadError::Fetch`].
pub trait OntologyStore: Send + Sync {
    fn fetch(&self, name: &str) -> Result<String, OntologyLoadError>;

    /// Raw object names in the store, suffix included.
    fn list(&self) -> Result<Vec<String>, OntologyLoadError>;
}

/// Store standing in for a client that could not be constructed.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl OntologyStore for UnavailableStore {
    fn fetch(&self, _name: &str) -> Result<String, OntologyLoadError> {
        Err(OntologyLoadError::Fetch(format!(
            "storage client unavailable: {}",
            self.reason
        )))
    }

    fn list(&self) -> Result<Vec<String>, OntologyLoadError> {
        Err(OntologyLoadError::Fetch(format!(
            "storage client unavailable: {}",
            self.reason
        )))
    }
}

/// Object name for an ontology, rejecting names that would escape the namespace.
pub(crate) fn object_name(name: &str) -> Result<String, OntologyLoadError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed != name
        || name.contains(['/', '\\'])
        || name.starts_with('.')
        || name.chars().any(char::is_control)
    {
        return Err(OntologyLoadError::NotFound(name.to_string()));
    }
    Ok(format!("{name}{ONTOLOGY_FILE_SUFFIX}"))
}
