use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named, versioned bundle of compliance constraints and extraction rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ontology {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub constraints: Vec<Constraint>,
    pub extractors: BTreeMap<String, ExtractorSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Constraint {
    pub id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub formula_readable: String,
    #[serde(default)]
    pub variables: Vec<VariableDef>,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub citation: String,
}

impl Constraint {
    #[must_use]
    pub fn variable_type(&self, name: &str) -> Option<VariableType> {
        self.variables
            .iter()
            .find(|variable| variable.name == name)
            .map(|variable| variable.kind)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariableDef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VariableType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    #[serde(alias = "float")]
    Real,
    #[serde(alias = "integer")]
    Int,
    #[serde(alias = "boolean")]
    Bool,
}

/// Rule for pulling one typed variable out of free text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractorSpec {
    #[serde(rename = "type")]
    pub kind: ValueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl ExtractorSpec {
    #[must_use]
    pub fn pattern(kind: ValueKind, pattern: &str) -> Self {
        Self {
            kind,
            pattern: Some(pattern.to_string()),
            keywords: Vec::new(),
        }
    }

    #[must_use]
    pub fn keywords(keywords: &[&str]) -> Self {
        Self {
            kind: ValueKind::Boolean,
            pattern: None,
            keywords: keywords.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Float,
    Int,
    Money,
    #[serde(alias = "bool")]
    Boolean,
}
