//! Semantic model: a three-level causal taxonomy (category -> subcause -> root cause).
//!
//! The tree is built once per analysis, never mutated afterwards, and rendered by read-only
//! traversals. Sequence order is input order everywhere.

use crate::ident::NodeId;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CausalTaxonomy {
    pub problem_statement: String,
    pub categories: Vec<MajorCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorCategory {
    pub label: String,
    pub subcauses: Vec<SubCause>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCause {
    pub label: String,
    pub root_causes: Vec<String>,
}

impl CausalTaxonomy {
    pub fn new(problem_statement: impl Into<String>) -> Self {
        Self {
            problem_statement: problem_statement.into(),
            categories: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: MajorCategory) -> Self {
        self.categories.push(category);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn subcause_count(&self) -> usize {
        self.categories.iter().map(|c| c.subcauses.len()).sum()
    }

    pub fn root_cause_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| c.subcauses.iter())
            .map(|s| s.root_causes.len())
            .sum()
    }

    /// Number of nodes below the problem (categories + subcauses + root causes).
    pub fn node_count(&self) -> usize {
        self.categories.len() + self.subcause_count() + self.root_cause_count()
    }

    /// Every node below the problem in depth-first pre-order (category, its subcauses, each
    /// subcause's root causes), paired with its label.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &str)> + '_ {
        self.categories.iter().enumerate().flat_map(|(m, category)| {
            std::iter::once((NodeId::Major { m }, category.label.as_str())).chain(
                category.subcauses.iter().enumerate().flat_map(move |(s, sub)| {
                    std::iter::once((NodeId::Sub { m, s }, sub.label.as_str())).chain(
                        sub.root_causes
                            .iter()
                            .enumerate()
                            .map(move |(t, root)| (NodeId::Root { m, s, t }, root.as_str())),
                    )
                }),
            )
        })
    }

    /// Clamps the category list to `arity`.
    ///
    /// Returns the tree unchanged (borrowed) when it already fits. Otherwise the trailing
    /// categories are dropped and a [`DegradationKind::CategoriesTruncated`] record is returned.
    pub fn truncate_to_arity(&self, arity: usize) -> (Cow<'_, Self>, Option<Degradation>) {
        if self.categories.len() <= arity {
            return (Cow::Borrowed(self), None);
        }
        let dropped = self.categories.len() - arity;
        let degradation = Degradation {
            path: vec![arity],
            label: self.categories[arity].label.clone(),
            kind: DegradationKind::CategoriesTruncated {
                kept: arity,
                dropped,
            },
        };
        let truncated = Self {
            problem_statement: self.problem_statement.clone(),
            categories: self.categories[..arity].to_vec(),
        };
        (Cow::Owned(truncated), Some(degradation))
    }
}

impl MajorCategory {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            subcauses: Vec::new(),
        }
    }

    pub fn with_subcause(mut self, subcause: SubCause) -> Self {
        self.subcauses.push(subcause);
        self
    }
}

impl SubCause {
    pub fn new<I, S>(label: impl Into<String>, root_causes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            root_causes: root_causes.into_iter().map(Into::into).collect(),
        }
    }
}

/// A soft, non-fatal failure: one branch was malformed and rendered as empty detail, or the
/// category list was clamped to the configured arity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Degradation {
    /// Zero-based indices locating the affected node (category, subcause, root cause).
    pub path: Vec<usize>,
    pub label: String,
    pub kind: DegradationKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum DegradationKind {
    CategoryNotMapping,
    RootCausesNotSequence,
    RootCauseNotText,
    CategoriesTruncated { kept: usize, dropped: usize },
}

impl Degradation {
    fn dotted_path(&self) -> String {
        self.path
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// What is wrong with the branch, without the recovery applied to it.
    pub fn defect(&self) -> String {
        let path = self.dotted_path();
        match &self.kind {
            DegradationKind::CategoryNotMapping => {
                format!("category {path} ({}) is not a mapping", self.label)
            }
            DegradationKind::RootCausesNotSequence => {
                format!("subcause {path} ({}) has no root-cause list", self.label)
            }
            DegradationKind::RootCauseNotText => {
                format!("root cause {path} under ({}) is not text", self.label)
            }
            DegradationKind::CategoriesTruncated { kept, dropped } => format!(
                "{dropped} categor{} beyond the first {kept}, starting at ({})",
                if *dropped == 1 { "y" } else { "ies" },
                self.label
            ),
        }
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DegradationKind::CategoryNotMapping | DegradationKind::RootCausesNotSequence => {
                write!(f, "{}; rendered without detail", self.defect())
            }
            DegradationKind::RootCauseNotText => write!(f, "{}; dropped", self.defect()),
            DegradationKind::CategoriesTruncated { kept, dropped } => write!(
                f,
                "{dropped} categor{} beyond the first {kept} dropped, starting at ({})",
                if *dropped == 1 { "y" } else { "ies" },
                self.label
            ),
        }
    }
}

/// Parser output: the validated tree plus every branch that had to be degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTaxonomy {
    pub taxonomy: CausalTaxonomy,
    pub degradations: Vec<Degradation>,
}
