//! Graph-text (Mermaid flowchart) compiler.
//!
//! Edges point from a node toward its parent, so causes flow inward to the problem. Output is a
//! pure function of the tree: the same taxonomy always yields byte-identical text.

use fishbone_core::sanitize::caption;
use fishbone_core::{CausalTaxonomy, Dialect, NodeId, NodeRole};
use std::fmt::Write as _;

const STYLED_CLASS_DEFS: &[(&str, &str)] = &[
    (
        "problem",
        "fill:#fde2e1,stroke:#c0392b,stroke-width:2px,color:#1f2937,font-weight:bold",
    ),
    (
        "category",
        "fill:#dbeafe,stroke:#1e40af,stroke-width:1.5px,color:#1f2937,font-weight:bold",
    ),
    ("subcause", "fill:#ffffff,stroke:#6b7280,color:#1f2937"),
    ("rootcause", "fill:#f9fafb,stroke:#9ca3af,color:#374151"),
];

fn class_name(role: NodeRole) -> &'static str {
    match role {
        NodeRole::Problem => "problem",
        NodeRole::Category => "category",
        NodeRole::SubCause => "subcause",
        NodeRole::RootCause => "rootcause",
    }
}

fn push_node(out: &mut String, id: NodeId, label: &str, dialect: Dialect) {
    let cap = caption(label);
    let _ = match (dialect, id.role()) {
        (Dialect::Minimal, NodeRole::Problem) => write!(out, "{id}((\"{cap}\"))"),
        (Dialect::Minimal, _) => write!(out, "{id}[\"{cap}\"]"),
        (Dialect::Styled, NodeRole::Problem) => write!(out, "{id}{{{{\"{cap}\"}}}}"),
        (Dialect::Styled, NodeRole::Category) => write!(out, "{id}[\"{cap}\"]"),
        (Dialect::Styled, NodeRole::SubCause) => write!(out, "{id}(\"{cap}\")"),
        (Dialect::Styled, NodeRole::RootCause) => write!(out, "{id}([\"{cap}\"])"),
    };
}

/// Compiles `taxonomy` into Mermaid graph text.
///
/// Never fails and never truncates: an empty taxonomy yields the header plus the problem node.
pub fn compile(taxonomy: &CausalTaxonomy, dialect: Dialect) -> String {
    let mut out = String::with_capacity(64 + taxonomy.node_count() * 48);

    out.push_str(match dialect {
        Dialect::Minimal => "graph LR\n",
        Dialect::Styled => "flowchart LR\n",
    });
    if dialect == Dialect::Styled {
        for (name, style) in STYLED_CLASS_DEFS {
            let _ = writeln!(out, "    classDef {name} {style}");
        }
    }

    out.push_str("    ");
    push_node(&mut out, NodeId::Problem, &taxonomy.problem_statement, dialect);
    out.push('\n');

    let mut groups: [Vec<NodeId>; 4] = Default::default();
    groups[0].push(NodeId::Problem);

    for (id, label) in taxonomy.nodes() {
        out.push_str("    ");
        push_node(&mut out, id, label, dialect);
        if let Some(parent) = id.parent() {
            let _ = write!(out, " --> {parent}");
        }
        out.push('\n');

        let slot = match id.role() {
            NodeRole::Problem => 0,
            NodeRole::Category => 1,
            NodeRole::SubCause => 2,
            NodeRole::RootCause => 3,
        };
        groups[slot].push(id);
    }

    if dialect == Dialect::Styled {
        for ids in groups.iter().filter(|ids| !ids.is_empty()) {
            let joined = ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            let _ = writeln!(out, "    class {joined} {}", class_name(ids[0].role()));
        }
    }

    tracing::debug!(
        %dialect,
        nodes = taxonomy.node_count() + 1,
        bytes = out.len(),
        "compiled graph text"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishbone_core::{MajorCategory, SubCause};

    fn norovirus() -> CausalTaxonomy {
        CausalTaxonomy::new("Norovirus outbreak").with_category(
            MajorCategory::new("People")
                .with_subcause(SubCause::new("Training gap", ["No refresher course"])),
        )
    }

    #[test]
    fn minimal_dialect_points_leaves_at_the_problem() {
        assert_eq!(
            compile(&norovirus(), Dialect::Minimal),
            "graph LR\n\
             \x20   Problem((\"Norovirus outbreak\"))\n\
             \x20   M0[\"People\"] --> Problem\n\
             \x20   M0S0[\"Training gap\"] --> M0\n\
             \x20   M0S0T0[\"No refresher course\"] --> M0S0\n"
        );
    }

    #[test]
    fn empty_taxonomy_yields_only_the_problem_node() {
        let out = compile(&CausalTaxonomy::new("Nothing yet"), Dialect::Minimal);
        assert_eq!(out, "graph LR\n    Problem((\"Nothing yet\"))\n");

        let styled = compile(&CausalTaxonomy::new("Nothing yet"), Dialect::Styled);
        assert!(styled.contains("    Problem{{\"Nothing yet\"}}\n"));
        assert!(styled.ends_with("    class Problem problem\n"));
        assert!(!styled.contains("class M"));
    }

    #[test]
    fn styled_dialect_uses_role_shapes_and_classes() {
        let t = norovirus().with_category(MajorCategory::new("Machine"));
        let out = compile(&t, Dialect::Styled);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "flowchart LR");
        assert!(lines[1..5].iter().all(|l| l.starts_with("    classDef ")));
        assert_eq!(lines[5], "    Problem{{\"Norovirus outbreak\"}}");
        assert_eq!(lines[6], "    M0[\"People\"] --> Problem");
        assert_eq!(lines[7], "    M0S0(\"Training gap\") --> M0");
        assert_eq!(lines[8], "    M0S0T0([\"No refresher course\"]) --> M0S0");
        assert_eq!(lines[9], "    M1[\"Machine\"] --> Problem");
        assert_eq!(
            &lines[10..],
            [
                "    class Problem problem",
                "    class M0,M1 category",
                "    class M0S0 subcause",
                "    class M0S0T0 rootcause",
            ]
        );
    }

    #[test]
    fn captions_are_escaped_and_never_identifiers() {
        let t = CausalTaxonomy::new("Why (again)?").with_category(
            MajorCategory::new("Say \"hi\" <now>")
                .with_subcause(SubCause::new("x --> y", ["#1 issue"])),
        );
        let out = compile(&t, Dialect::Minimal);
        assert!(out.contains("Problem((\"Why #40;again#41;?\"))"));
        assert!(out.contains("M0[\"Say #quot;hi#quot; #lt;now#gt;\"] --> Problem"));
        assert!(out.contains("M0S0[\"x --#gt; y\"] --> M0"));
        assert!(out.contains("M0S0T0[\"#35;1 issue\"] --> M0S0"));
    }

    #[test]
    fn repeated_labels_keep_distinct_ids() {
        let t = CausalTaxonomy::new("P")
            .with_category(MajorCategory::new("Same").with_subcause(SubCause::new("Same", ["Same"])))
            .with_category(MajorCategory::new("Same"));
        let out = compile(&t, Dialect::Minimal);
        for id in ["M0[", "M0S0[", "M0S0T0[", "M1["] {
            assert_eq!(out.matches(id).count(), 1, "{id}");
        }
    }

    #[test]
    fn compile_is_deterministic() {
        let t = norovirus();
        assert_eq!(compile(&t, Dialect::Styled), compile(&t, Dialect::Styled));
    }
}
