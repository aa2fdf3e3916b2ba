use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use regex::{Regex, RegexBuilder};

use crate::config::DEFAULT_ONTOLOGY_CACHE_CAPACITY;
use crate::error::{AareError, Result};
use crate::loader::cache::LruCache;
use crate::ontology::{ExtractorSpec, Ontology, ValueKind};

use super::{ExtractedData, ExtractedValue, Extractor};

const FEES_VARIABLE: &str = "fees";
const LOAN_AMOUNT_VARIABLE: &str = "loan_amount";
const FEE_PERCENTAGE_VARIABLE: &str = "fee_percentage";

/// Compiled pattern rules of one ontology, keyed by variable.
type PatternSet = Arc<HashMap<String, Regex>>;

/// Applies each extractor rule of an ontology to the text.
///
/// Pattern rules match case-insensitively and read the first capture group.
/// Keyword rules are case-insensitive substring checks. Numeric values that
/// are not found are left out of the result; booleans default to `false`.
/// Compiled patterns are cached per ontology name and version, with the same
/// bound as the ontology cache.
#[derive(Debug)]
pub struct PatternExtractor {
    compiled: Mutex<LruCache<(String, String), PatternSet>>,
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            compiled: Mutex::new(LruCache::new(DEFAULT_ONTOLOGY_CACHE_CAPACITY)),
        }
    }

    fn patterns(&self, ontology: &Ontology) -> Result<PatternSet> {
        let key = (ontology.name.clone(), ontology.version.clone());
        let cached = self
            .compiled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key);
        // A document re-published under the same version is recompiled.
        if let Some(set) = cached.filter(|set| compiled_from(set, ontology)) {
            return Ok(set);
        }

        let set = Arc::new(compile_patterns(ontology)?);
        self.compiled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&set));
        Ok(set)
    }

    fn extract_one(
        patterns: &HashMap<String, Regex>,
        variable: &str,
        spec: &ExtractorSpec,
        text: &str,
        lowered: &str,
    ) -> Option<ExtractedValue> {
        if spec.pattern.is_some() {
            let regex = patterns.get(variable)?;
            if spec.kind == ValueKind::Boolean {
                return Some(ExtractedValue::Bool(regex.is_match(text)));
            }
            let captures = regex.captures(text)?;
            let group = captures.get(1).or_else(|| captures.get(0))?;
            let thousands = text[group.end()..].starts_with(['k', 'K']);
            return convert(spec.kind, group.as_str(), thousands);
        }

        let found = spec
            .keywords
            .iter()
            .any(|keyword| lowered.contains(&keyword.to_lowercase()));
        Some(ExtractedValue::Bool(found))
    }
}

impl Extractor for PatternExtractor {
    fn parse(&self, text: &str, ontology: &Ontology) -> Result<ExtractedData> {
        let patterns = self.patterns(ontology)?;
        let lowered = text.to_lowercase();
        let mut data = ExtractedData::new();
        for (variable, spec) in &ontology.extractors {
            if let Some(value) = Self::extract_one(&patterns, variable, spec, text, &lowered) {
                data.insert(variable.clone(), value);
            }
        }

        if !ontology.extractors.contains_key(FEE_PERCENTAGE_VARIABLE) {
            if let Some(percentage) = fee_percentage(&data) {
                data.insert(
                    FEE_PERCENTAGE_VARIABLE.to_string(),
                    ExtractedValue::Float(percentage),
                );
            }
        }
        Ok(data)
    }
}

fn compile_patterns(ontology: &Ontology) -> Result<HashMap<String, Regex>> {
    let mut compiled = HashMap::new();
    for (variable, spec) in &ontology.extractors {
        let Some(pattern) = &spec.pattern else {
            continue;
        };
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| AareError::InvalidPattern {
                variable: variable.clone(),
                source,
            })?;
        compiled.insert(variable.clone(), regex);
    }
    Ok(compiled)
}

fn compiled_from(set: &HashMap<String, Regex>, ontology: &Ontology) -> bool {
    let mut rules = 0;
    for (variable, spec) in &ontology.extractors {
        let Some(pattern) = &spec.pattern else {
            continue;
        };
        rules += 1;
        if set.get(variable).is_none_or(|regex| regex.as_str() != pattern) {
            return false;
        }
    }
    rules == set.len()
}

fn convert(kind: ValueKind, raw: &str, thousands: bool) -> Option<ExtractedValue> {
    match kind {
        ValueKind::Float => raw.trim().parse::<f64>().ok().map(ExtractedValue::Float),
        ValueKind::Int => raw
            .trim()
            .replace(',', "")
            .parse::<i64>()
            .ok()
            .map(ExtractedValue::Int),
        ValueKind::Money => {
            let amount = raw.trim().replace(',', "").parse::<f64>().ok()?;
            let amount = if thousands { amount * 1_000.0 } else { amount };
            Some(ExtractedValue::Float(amount))
        }
        ValueKind::Boolean => Some(ExtractedValue::Bool(!raw.is_empty())),
    }
}

/// Points and fees as a percentage of the loan amount.
fn fee_percentage(data: &ExtractedData) -> Option<f64> {
    let fees = data.get(FEES_VARIABLE)?.as_f64()?;
    let loan = data.get(LOAN_AMOUNT_VARIABLE)?.as_f64()?;
    (loan > 0.0).then(|| fees / loan * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::default_ontology;

    fn extract(text: &str) -> ExtractedData {
        PatternExtractor::new()
            .parse(text, &default_ontology())
            .expect("extract")
    }

    #[test]
    fn reads_dti_and_keyword_flags() {
        let data = extract("DTI: 50%, no compensating factors");
        assert_eq!(data["dti"], ExtractedValue::Float(50.0));
        assert_eq!(data["has_specific_reason"], ExtractedValue::Bool(true));
        assert_eq!(data["has_guarantee"], ExtractedValue::Bool(false));
        assert!(!data.contains_key("credit_score"));
        assert!(!data.contains_key("compensating_factors"));
    }

    #[test]
    fn reads_credit_score_case_insensitively() {
        let data = extract("Borrower FICO: 580 and we can waive escrow");
        assert_eq!(data["credit_score"], ExtractedValue::Int(580));
        assert_eq!(data["escrow_waived"], ExtractedValue::Bool(true));
    }

    #[test]
    fn money_applies_thousands_suffix_and_derives_fee_percentage() {
        let data = extract("$12k fees on a $100k loan");
        assert_eq!(data["fees"], ExtractedValue::Float(12_000.0));
        assert_eq!(data["loan_amount"], ExtractedValue::Float(100_000.0));
        assert_eq!(data["fee_percentage"], ExtractedValue::Float(12.0));
    }

    #[test]
    fn money_strips_thousands_separators() {
        let data = extract("closing costs of 4,500 costs on a 250,000 mortgage");
        assert_eq!(data["fees"], ExtractedValue::Float(4_500.0));
        assert_eq!(data["loan_amount"], ExtractedValue::Float(250_000.0));
    }

    #[test]
    fn no_fee_percentage_without_loan_amount() {
        let data = extract("$900 fees");
        assert!(!data.contains_key("fee_percentage"));
    }

    #[test]
    fn invalid_pattern_is_reported_with_variable() {
        let mut ontology = (*default_ontology()).clone();
        ontology.extractors.insert(
            "broken".to_string(),
            ExtractorSpec::pattern(ValueKind::Float, "(unclosed"),
        );
        let err = PatternExtractor::new()
            .parse("anything", &ontology)
            .expect_err("invalid regex");
        assert_eq!(err.code(), "INVALID_PATTERN");
        assert!(err.to_string().contains("`broken`"));
    }

    #[test]
    fn compiled_patterns_are_cached_per_ontology_version() {
        let extractor = PatternExtractor::new();
        let first = extractor.patterns(&default_ontology()).expect("first");
        let second = extractor.patterns(&default_ontology()).expect("second");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 4);

        let mut bumped = (*default_ontology()).clone();
        bumped.version = "1.1.0".to_string();
        let third = extractor.patterns(&bumped).expect("new version");
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(
            extractor
                .compiled
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
            2
        );
    }

    #[test]
    fn changed_patterns_under_same_version_are_recompiled() {
        let extractor = PatternExtractor::new();
        let mut ontology = (*default_ontology()).clone();
        assert_eq!(
            extractor.parse("DTI: 50%", &ontology).expect("original")["dti"],
            ExtractedValue::Float(50.0)
        );

        ontology.extractors.insert(
            "dti".to_string(),
            ExtractorSpec::pattern(ValueKind::Float, r"ratio\s+(\d+)"),
        );
        let data = extractor.parse("DTI: 50%, ratio 41", &ontology).expect("republished");
        assert_eq!(data["dti"], ExtractedValue::Float(41.0));
    }

    #[test]
    fn pattern_cache_is_bounded() {
        let extractor = PatternExtractor::new();
        let mut ontology = (*default_ontology()).clone();
        for version in 0..=DEFAULT_ONTOLOGY_CACHE_CAPACITY {
            ontology.version = format!("1.0.{version}");
            extractor.parse("dti 30", &ontology).expect("extract");
        }
        assert_eq!(
            extractor
                .compiled
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
            DEFAULT_ONTOLOGY_CACHE_CAPACITY
        );
    }
}
