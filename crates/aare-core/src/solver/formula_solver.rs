use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use serde_json::json;

use crate::error::{AareError, Result};
use crate::extract::{ExtractedData, ExtractedValue};
use crate::ontology::{Constraint, Ontology, VariableType};

use super::formula::{Value, parse_formula};
use super::{Solver, VerificationResult, Violation};

const PROOF_METHOD: &str = "formula-evaluation";

/// Evaluates each constraint's `formula_readable` directly.
///
/// A variable missing from the extracted data takes the zero value of the type
/// the constraint declares for it (`0` for numbers, `false` for booleans).
/// Undeclared, unextracted variables are an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaSolver;

#[derive(Debug, Serialize)]
struct ConstraintCheck {
    id: String,
    satisfied: bool,
    bindings: BTreeMap<String, serde_json::Value>,
}

impl FormulaSolver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn check(constraint: &Constraint, data: &ExtractedData) -> Result<ConstraintCheck> {
        let formula_error = |message: String| AareError::Formula {
            constraint_id: constraint.id.clone(),
            message,
        };
        let expr = parse_formula(&constraint.formula_readable).map_err(formula_error)?;

        let mut bindings = BTreeMap::new();
        for name in expr.variables() {
            if let Some(value) = bind(constraint, data, &name).map_err(formula_error)? {
                bindings.insert(name, value);
            }
        }
        let satisfied = expr
            .eval(&|name| bindings.get(name).copied())
            .map_err(formula_error)?;

        Ok(ConstraintCheck {
            id: constraint.id.clone(),
            satisfied,
            bindings: bindings
                .into_iter()
                .map(|(name, value)| (name, value_json(value)))
                .collect(),
        })
    }
}

impl Solver for FormulaSolver {
    fn verify(&self, data: &ExtractedData, ontology: &Ontology) -> Result<VerificationResult> {
        let started = Instant::now();
        let mut checks = Vec::with_capacity(ontology.constraints.len());
        let mut violations = Vec::new();
        for constraint in &ontology.constraints {
            let check = Self::check(constraint, data)?;
            if !check.satisfied {
                violations.push(Violation {
                    constraint_id: constraint.id.clone(),
                    category: constraint.category.clone(),
                    description: constraint.description.clone(),
                    error_message: constraint.error_message.clone(),
                    citation: constraint.citation.clone(),
                    formula: constraint.formula_readable.clone(),
                });
            }
            checks.push(check);
        }

        Ok(VerificationResult {
            verified: violations.is_empty(),
            violations,
            proof: json!({
                "method": PROOF_METHOD,
                "constraints": checks,
            }),
            execution_time_ms: started.elapsed().as_secs_f64() * 1_000.0,
        })
    }
}

fn bind(
    constraint: &Constraint,
    data: &ExtractedData,
    name: &str,
) -> std::result::Result<Option<Value>, String> {
    let declared = constraint.variable_type(name);
    match (data.get(name).copied(), declared) {
        (Some(ExtractedValue::Bool(value)), None | Some(VariableType::Bool)) => {
            Ok(Some(Value::Bool(value)))
        }
        (
            Some(value @ (ExtractedValue::Int(_) | ExtractedValue::Float(_))),
            None | Some(VariableType::Int | VariableType::Real),
        ) => Ok(value.as_f64().map(Value::Num)),
        (Some(value), Some(kind)) => Err(format!(
            "variable `{name}` declared {kind:?} but extracted {value:?}"
        )),
        (None, Some(VariableType::Bool)) => Ok(Some(Value::Bool(false))),
        (None, Some(VariableType::Int | VariableType::Real)) => Ok(Some(Value::Num(0.0))),
        (None, None) => Ok(None),
    }
}

fn value_json(value: Value) -> serde_json::Value {
    match value {
        Value::Bool(value) => json!(value),
        Value::Num(value) => json!(value),
    }
}
