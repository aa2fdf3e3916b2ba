use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::OntologyLoadError;

use super::{OntologyStore, object_name};

/// Ontology documents stored as `<root>/<name>.json` on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirOntologyStore {
    root: PathBuf,
}

impl DirOntologyStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl OntologyStore for DirOntologyStore {
    fn fetch(&self, name: &str) -> Result<String, OntologyLoadError> {
        let path = self.root.join(object_name(name)?);
        fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => OntologyLoadError::NotFound(name.to_string()),
            _ => OntologyLoadError::Fetch(format!("read {}: {err}", path.display())),
        })
    }

    fn list(&self) -> Result<Vec<String>, OntologyLoadError> {
        let entries = fs::read_dir(&self.root).map_err(|err| {
            OntologyLoadError::Fetch(format!("list {}: {err}", self.root.display()))
        })?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| {
                OntologyLoadError::Fetch(format!("list {}: {err}", self.root.display()))
            })?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
