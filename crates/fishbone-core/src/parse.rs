use crate::model::{
    CausalTaxonomy, Degradation, DegradationKind, MajorCategory, ParsedTaxonomy, SubCause,
};
use crate::preprocess::preprocess_taxonomy_text;
use crate::{Error, ParseOptions, Result};
use serde_json::{Map, Value};

/// Parses a model reply (category -> {subcause -> [root cause]}) into a validated tree.
///
/// Wrapper markers are stripped first. Text that does not decode as a mapping at all is a
/// [`Error::MalformedTaxonomy`]; malformed branches inside a valid mapping are degraded to empty
/// detail and reported, unless `options` asks for strict branches.
pub fn parse_taxonomy(
    raw: &str,
    problem_statement: &str,
    options: ParseOptions,
) -> Result<ParsedTaxonomy> {
    let pre = preprocess_taxonomy_text(raw);
    tracing::debug!(
        stripped_fence = pre.stripped_fence,
        stripped_prose = pre.stripped_prose,
        bytes = pre.text.len(),
        "preprocessed taxonomy text"
    );

    let value = decode_mapping_text(&pre.text)?;
    let Value::Object(categories) = value else {
        return Err(Error::malformed(
            format!(
                "expected a mapping of categories, found {}",
                value_kind(&value)
            ),
            &pre.text,
        ));
    };

    let mut degradations = Vec::new();
    let taxonomy = CausalTaxonomy {
        problem_statement: problem_statement.trim().to_string(),
        categories: categories
            .iter()
            .enumerate()
            .map(|(m, (label, value))| build_category(m, label, value, &mut degradations))
            .collect(),
    };

    if options.strict_branches {
        if let Some(first) = degradations.first() {
            return Err(Error::malformed(
                format!("{} (strict branch checking)", first.defect()),
                &pre.text,
            ));
        }
    }

    for d in &degradations {
        tracing::warn!(path = ?d.path, "{d}");
    }
    tracing::debug!(
        categories = taxonomy.categories.len(),
        subcauses = taxonomy.subcause_count(),
        root_causes = taxonomy.root_cause_count(),
        "parsed taxonomy"
    );

    Ok(ParsedTaxonomy {
        taxonomy,
        degradations,
    })
}

fn decode_mapping_text(text: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(v) => Ok(v),
        Err(strict_err) => {
            // Models frequently answer with single-quoted keys; JSON5 accepts those.
            match json5::from_str::<Value>(text) {
                Ok(v) => {
                    tracing::debug!("taxonomy decoded as JSON5");
                    Ok(v)
                }
                Err(_) => Err(Error::malformed(
                    format!("not decodable as a nested mapping: {strict_err}"),
                    text,
                )),
            }
        }
    }
}

fn build_category(
    m: usize,
    label: &str,
    value: &Value,
    degradations: &mut Vec<Degradation>,
) -> MajorCategory {
    let label = label.trim().to_string();
    let subcauses = match value {
        Value::Object(subs) => build_subcauses(m, subs, degradations),
        _ => {
            degradations.push(Degradation {
                path: vec![m],
                label: label.clone(),
                kind: DegradationKind::CategoryNotMapping,
            });
            Vec::new()
        }
    };
    MajorCategory { label, subcauses }
}

fn build_subcauses(
    m: usize,
    subs: &Map<String, Value>,
    degradations: &mut Vec<Degradation>,
) -> Vec<SubCause> {
    subs.iter()
        .enumerate()
        .map(|(s, (label, value))| {
            let label = label.trim().to_string();
            let root_causes = match value {
                Value::Array(items) => items
                    .iter()
                    .enumerate()
                    .filter_map(|(t, item)| {
                        let text = scalar_text(item);
                        if text.is_none() {
                            degradations.push(Degradation {
                                path: vec![m, s, t],
                                label: label.clone(),
                                kind: DegradationKind::RootCauseNotText,
                            });
                        }
                        text
                    })
                    .collect(),
                _ => {
                    degradations.push(Degradation {
                        path: vec![m, s],
                        label: label.clone(),
                        kind: DegradationKind::RootCausesNotSequence,
                    });
                    Vec::new()
                }
            };
            SubCause { label, root_causes }
        })
        .collect()
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
