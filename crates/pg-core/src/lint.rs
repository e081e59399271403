//! Lint diagnostics for zones.
//!
//! Reports action-graph issues without modifying the document. Dangling
//! and duplicate edges are legal; they are surfaced here so the operator
//! can decide, never auto-repaired.

use crate::graph::ActionGraph;
use crate::id::{ActionId, TaskId};
use crate::model::{TriggerKind, Zone};
use std::collections::HashSet;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Likely a mistake.
    Warning,
    /// Legal but worth a look.
    Info,
}

/// A single lint diagnostic for a task.
#[derive(Debug, Clone, PartialEq)]
pub struct LintDiagnostic {
    /// The task this diagnostic refers to.
    pub task_id: TaskId,
    /// The offending edge, when the finding is about one edge.
    pub action_id: Option<ActionId>,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "dangling-action").
    pub rule: &'static str,
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Run all lint rules over a zone.
#[must_use]
pub fn lint_zone(zone: &Zone) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_dangling(zone, &mut diags);
    lint_duplicates(zone, &mut diags);
    lint_self_unlock(zone, &mut diags);
    lint_cycles(zone, &mut diags);
    diags
}

// ─── Rules ───────────────────────────────────────────────────────────────

fn lint_dangling(zone: &Zone, diags: &mut Vec<LintDiagnostic>) {
    for task in &zone.tasks {
        for (trigger, list) in &task.actions {
            for edge in list.iter().filter(|e| !zone.contains(e.target)) {
                diags.push(LintDiagnostic {
                    task_id: task.id,
                    action_id: Some(edge.id),
                    message: format!(
                        "`{}` {} unlocks `{}`, which is not in this zone.",
                        task.id, trigger, edge.target
                    ),
                    severity: LintSeverity::Warning,
                    rule: "dangling-action",
                });
            }
        }
    }
}

fn lint_duplicates(zone: &Zone, diags: &mut Vec<LintDiagnostic>) {
    for task in &zone.tasks {
        for (trigger, list) in &task.actions {
            let mut seen: HashSet<TaskId> = HashSet::new();
            for edge in list {
                if !seen.insert(edge.target) {
                    diags.push(LintDiagnostic {
                        task_id: task.id,
                        action_id: Some(edge.id),
                        message: format!(
                            "`{}` unlocks `{}` more than once on {}.",
                            task.id, edge.target, trigger
                        ),
                        severity: LintSeverity::Info,
                        rule: "duplicate-action",
                    });
                }
            }
        }
    }
}

fn lint_self_unlock(zone: &Zone, diags: &mut Vec<LintDiagnostic>) {
    for task in &zone.tasks {
        for (trigger, list) in &task.actions {
            for edge in list.iter().filter(|e| e.target == task.id) {
                diags.push(LintDiagnostic {
                    task_id: task.id,
                    action_id: Some(edge.id),
                    message: format!("`{}` unlocks itself on {}.", task.id, trigger_label(*trigger)),
                    severity: LintSeverity::Warning,
                    rule: "self-unlock",
                });
            }
        }
    }
}

fn lint_cycles(zone: &Zone, diags: &mut Vec<LintDiagnostic>) {
    for cycle in ActionGraph::build(zone).unlock_cycles() {
        // Self-loops are already reported by `self-unlock`.
        if cycle.len() < 2 {
            continue;
        }
        let names: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
        diags.push(LintDiagnostic {
            task_id: cycle[0],
            action_id: None,
            message: format!("Tasks unlock each other in a loop: {}.", names.join(" → ")),
            severity: LintSeverity::Info,
            rule: "unlock-cycle",
        });
    }
}

fn trigger_label(trigger: TriggerKind) -> &'static str {
    match trigger {
        TriggerKind::OnOpen => "open",
        TriggerKind::OnCorrect => "correct answer",
        TriggerKind::OnIncorrect => "incorrect answer",
    }
}
