use std::collections::HashSet;

use crate::logical_workflow::{LogicalStep, LogicalWorkflow, StepId};

/// Render a logical workflow as human-readable multiline text.
///
/// Each initial branch is printed in chain order; steps reachable from more
/// than one branch (joins and everything after them) are printed once, where
/// the first branch reaches them.
pub fn explain_workflow(workflow: &LogicalWorkflow) -> String {
    let mut out = String::new();
    let mut seen: HashSet<StepId> = HashSet::new();
    for &initial in workflow.initial_steps() {
        let mut current = Some(initial);
        let mut indent = 0;
        while let Some(id) = current {
            if !seen.insert(id) {
                break;
            }
            let pad = "  ".repeat(indent);
            out.push_str(&format!("{pad}{}\n", fmt_step(&workflow.step(id).step)));
            current = workflow.step(id).next;
            indent += 1;
        }
    }
    out
}

fn fmt_step(step: &LogicalStep) -> String {
    match step {
        LogicalStep::Project(p) => {
            let columns: Vec<String> = p.columns.iter().map(|c| c.to_string()).collect();
            format!(
                "Project table={} cluster={} columns=[{}]",
                p.table,
                p.cluster,
                columns.join(", ")
            )
        }
        LogicalStep::Filter(f) => {
            format!("Filter operation={} relation={}", f.operation, f.relation)
        }
        LogicalStep::Join(j) => {
            let relations: Vec<String> = j.relations.iter().map(|r| r.to_string()).collect();
            format!(
                "Join id={} sources=[{}] on=[{}]",
                j.id,
                j.sources.join(", "),
                relations.join(", ")
            )
        }
        LogicalStep::Limit(l) => format!("Limit rows={}", l.rows),
        LogicalStep::Select(s) => {
            let mut aliases: Vec<String> =
                s.aliases.iter().map(|(k, v)| format!("{k} AS {v}")).collect();
            aliases.sort();
            format!("Select [{}]", aliases.join(", "))
        }
    }
}
