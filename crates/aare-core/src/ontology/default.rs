use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use super::model::{Constraint, ExtractorSpec, Ontology, ValueKind, VariableDef, VariableType};

pub const DEFAULT_ONTOLOGY_NAME: &str = "mortgage-compliance-v1";

static DEFAULT_ONTOLOGY: LazyLock<Arc<Ontology>> =
    LazyLock::new(|| Arc::new(build_default_ontology()));

/// Built-in U.S. mortgage compliance ontology served whenever a named
/// ontology cannot be acquired.
#[must_use]
pub fn default_ontology() -> Arc<Ontology> {
    Arc::clone(&DEFAULT_ONTOLOGY)
}

fn build_default_ontology() -> Ontology {
    Ontology {
        name: DEFAULT_ONTOLOGY_NAME.to_string(),
        version: "1.0.0".to_string(),
        description: "U.S. Mortgage Compliance - Core constraints".to_string(),
        constraints: vec![
            constraint(
                ("ATR_QM_DTI", "ATR/QM"),
                "Debt-to-income ratio requirements",
                "(dti ≤ 43) ∨ (compensating_factors ≥ 2)",
                &[
                    ("dti", VariableType::Real),
                    ("compensating_factors", VariableType::Int),
                ],
                "DTI exceeds 43% without sufficient compensating factors",
                "12 CFR § 1026.43(c)",
            ),
            constraint(
                ("HOEPA_HIGH_COST", "HOEPA"),
                "High-cost mortgage counseling requirement",
                "(fee_percentage < 8) ∨ counseling_disclosed",
                &[
                    ("fee_percentage", VariableType::Real),
                    ("counseling_disclosed", VariableType::Bool),
                ],
                "HOEPA triggered - counseling disclosure required",
                "12 CFR § 1026.32",
            ),
            constraint(
                ("UDAAP_NO_GUARANTEES", "UDAAP"),
                "Prohibition on guarantee language",
                "¬(has_guarantee ∧ has_approval)",
                &[
                    ("has_guarantee", VariableType::Bool),
                    ("has_approval", VariableType::Bool),
                ],
                "Cannot guarantee approval",
                "12 CFR § 1036.3",
            ),
            constraint(
                ("HPML_ESCROW", "Escrow"),
                "Escrow requirements based on FICO",
                "(credit_score ≥ 620) ∨ ¬escrow_waived",
                &[
                    ("credit_score", VariableType::Int),
                    ("escrow_waived", VariableType::Bool),
                ],
                "Cannot waive escrow with FICO < 620",
                "12 CFR § 1026.35(b)",
            ),
            constraint(
                ("REG_B_ADVERSE", "Regulation B"),
                "Adverse action disclosure requirements",
                "is_denial → has_specific_reason",
                &[
                    ("is_denial", VariableType::Bool),
                    ("has_specific_reason", VariableType::Bool),
                ],
                "Must disclose specific denial reason",
                "12 CFR § 1002.9",
            ),
        ],
        extractors: default_extractors(),
    }
}

fn default_extractors() -> BTreeMap<String, ExtractorSpec> {
    [
        (
            "dti",
            ExtractorSpec::pattern(ValueKind::Float, r"dti[:\s~]*(\d+(?:\.\d+)?)"),
        ),
        (
            "credit_score",
            ExtractorSpec::pattern(ValueKind::Int, r"(?:fico|credit score)[:\s]*(\d{3})"),
        ),
        (
            "fees",
            ExtractorSpec::pattern(ValueKind::Money, r"\$?([\d,]+)k?\s*(?:fees?|costs?)"),
        ),
        (
            "loan_amount",
            ExtractorSpec::pattern(ValueKind::Money, r"\$?([\d,]+)k?\s*(?:loan|mortgage)"),
        ),
        (
            "has_guarantee",
            ExtractorSpec::keywords(&["guaranteed", "100%", "definitely"]),
        ),
        ("has_approval", ExtractorSpec::keywords(&["approved", "approve"])),
        ("counseling_disclosed", ExtractorSpec::keywords(&["counseling"])),
        (
            "escrow_waived",
            ExtractorSpec::keywords(&["escrow waived", "waive escrow", "skip escrow"]),
        ),
        ("is_denial", ExtractorSpec::keywords(&["denied", "cannot approve"])),
        (
            "has_specific_reason",
            ExtractorSpec::keywords(&["credit", "income", "dti", "debt", "score"]),
        ),
    ]
    .into_iter()
    .map(|(name, spec)| (name.to_string(), spec))
    .collect()
}

fn constraint(
    (id, category): (&str, &str),
    description: &str,
    formula: &str,
    variables: &[(&str, VariableType)],
    error_message: &str,
    citation: &str,
) -> Constraint {
    Constraint {
        id: id.to_string(),
        category: category.to_string(),
        description: description.to_string(),
        formula_readable: formula.to_string(),
        variables: variables
            .iter()
            .map(|(name, kind)| VariableDef {
                name: (*name).to_string(),
                kind: *kind,
            })
            .collect(),
        error_message: error_message.to_string(),
        citation: citation.to_string(),
    }
}
