//! Action graph: trigger-typed "unlock" edges between tasks of one zone.
//!
//! Edges live on the source task (`task.actions[trigger]`). Mutations are
//! whole-task replacements. For queries a read-only [`ActionGraph`] view is
//! built over a `petgraph` multigraph: duplicates are kept as parallel edges
//! and cycles are just edges, never walked recursively.

use crate::id::{ActionId, TaskId};
use crate::model::*;
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, HashMap, HashSet};

// ─── Mutations ───────────────────────────────────────────────────────────

/// Return a copy of `task` with an unlock edge `id` appended to `trigger`.
/// No target uniqueness check: adding the same target twice keeps both edges.
#[must_use]
pub fn with_edge(task: &Task, trigger: TriggerKind, target: TaskId, id: ActionId) -> Task {
    let edge = ActionEdge {
        id,
        kind: ActionKind::Unlock,
        target,
    };
    let mut next = task.clone();
    next.actions.entry(trigger).or_default().push(edge);
    next
}

/// A generated action id that no edge in `zone` carries yet.
///
/// The generator is per process, so ids loaded from a saved document can
/// already hold the next value.
pub fn fresh_action_id(zone: &Zone) -> ActionId {
    let taken: HashSet<ActionId> = zone
        .tasks
        .iter()
        .flat_map(|t| t.actions.values())
        .flatten()
        .map(|e| e.id)
        .collect();
    loop {
        let id = ActionId::generate();
        if !taken.contains(&id) {
            return id;
        }
        log::debug!("zone {}: generated id {id} already in use", zone.id);
    }
}

/// Return a copy of `task` without the edge `action`, or `None` if absent.
#[must_use]
pub fn without_edge(task: &Task, action: ActionId) -> Option<Task> {
    let mut next = task.clone();
    let mut removed = false;
    for list in next.actions.values_mut() {
        if let Some(pos) = list.iter().position(|e| e.id == action) {
            list.remove(pos);
            removed = true;
            break;
        }
    }
    if !removed {
        return None;
    }
    next.actions.retain(|_, list| !list.is_empty());
    Some(next)
}

/// Append an edge `source --trigger--> target` inside `zone`.
///
/// Both ends must exist at creation time. Returns the new edge's id.
pub fn add_edge(
    zone: &mut Zone,
    source: TaskId,
    trigger: TriggerKind,
    target: TaskId,
) -> Option<ActionId> {
    if !zone.contains(target) {
        log::warn!("zone {}: edge target {target} does not exist", zone.id);
        return None;
    }
    let id = fresh_action_id(zone);
    let next = with_edge(zone.task(source)?, trigger, target, id);
    zone.replace_task(next);
    log::debug!("zone {}: {source} --{trigger}--> {target} ({id})", zone.id);
    Some(id)
}

/// Remove one edge from `source`. Duplicates are removed one at a time.
pub fn remove_edge(zone: &mut Zone, source: TaskId, action: ActionId) -> bool {
    let Some(next) = zone.task(source).and_then(|t| without_edge(t, action)) else {
        return false;
    };
    zone.replace_task(next)
}

/// Outgoing edges of `id`, grouped by trigger.
pub fn edges_from(zone: &Zone, id: TaskId) -> Option<&BTreeMap<TriggerKind, ActionList>> {
    zone.task(id).map(|t| &t.actions)
}

// ─── Query view ──────────────────────────────────────────────────────────

/// An edge pointing at a task: who unlocks it, and on which trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Incoming {
    pub source: TaskId,
    pub trigger: TriggerKind,
    pub action: ActionId,
}

/// A resolvable edge, ready to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub source: TaskId,
    pub target: TaskId,
    pub trigger: TriggerKind,
    pub action: ActionId,
}

#[derive(Debug, Clone, Copy)]
struct Link {
    trigger: TriggerKind,
    action: ActionId,
}

/// Read-only multigraph over one zone's tasks. Dangling edges are left out.
#[derive(Debug, Clone)]
pub struct ActionGraph {
    graph: StableDiGraph<TaskId, Link>,
    index: HashMap<TaskId, NodeIndex>,
    dangling: usize,
}

impl ActionGraph {
    pub fn build(zone: &Zone) -> Self {
        let mut graph = StableDiGraph::new();
        let mut index = HashMap::with_capacity(zone.tasks.len());
        for task in &zone.tasks {
            index.insert(task.id, graph.add_node(task.id));
        }

        let mut dangling = 0;
        for task in &zone.tasks {
            let from = index[&task.id];
            for (trigger, list) in &task.actions {
                for edge in list {
                    match index.get(&edge.target) {
                        Some(&to) => {
                            graph.add_edge(
                                from,
                                to,
                                Link {
                                    trigger: *trigger,
                                    action: edge.id,
                                },
                            );
                        }
                        None => {
                            dangling += 1;
                            log::warn!(
                                "zone {}: skipping dangling edge {} -> {}",
                                zone.id,
                                task.id,
                                edge.target
                            );
                        }
                    }
                }
            }
        }

        Self {
            graph,
            index,
            dangling,
        }
    }

    /// Number of edges skipped because their target no longer exists.
    pub fn dangling_count(&self) -> usize {
        self.dangling
    }

    /// Every edge targeting `id`, in document order.
    pub fn targets_of(&self, id: TaskId) -> Vec<Incoming> {
        let Some(&idx) = self.index.get(&id) else {
            return Vec::new();
        };
        let mut incoming: Vec<(EdgeIndex, Incoming)> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| {
                (
                    e.id(),
                    Incoming {
                        source: self.graph[e.source()],
                        trigger: e.weight().trigger,
                        action: e.weight().action,
                    },
                )
            })
            .collect();
        incoming.sort_by_key(|(edge, _)| *edge);
        incoming.into_iter().map(|(_, inc)| inc).collect()
    }

    /// True when some edge unlocks `id` (the task starts locked).
    pub fn is_unlock_target(&self, id: TaskId) -> bool {
        self.index.get(&id).is_some_and(|&idx| {
            self.graph
                .edges_directed(idx, Direction::Incoming)
                .next()
                .is_some()
        })
    }

    /// All resolvable edges in document order.
    pub fn connectors(&self) -> Vec<Connector> {
        self.graph
            .edge_indices()
            .filter_map(|e| {
                let (from, to) = self.graph.edge_endpoints(e)?;
                let link = self.graph[e];
                Some(Connector {
                    source: self.graph[from],
                    target: self.graph[to],
                    trigger: link.trigger,
                    action: link.action,
                })
            })
            .collect()
    }

    /// Groups of tasks that unlock each other in a loop (including
    /// self-unlocks). Sorted for stable output.
    pub fn unlock_cycles(&self) -> Vec<Vec<TaskId>> {
        let mut cycles: Vec<Vec<TaskId>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.graph.find_edge(scc[0], scc[0]).is_some()
            })
            .map(|scc| {
                let mut ids: Vec<TaskId> = scc.into_iter().map(|i| self.graph[i]).collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ZoneId;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> TaskId {
        TaskId::intern(s)
    }

    fn zone(ids: &[&str]) -> Zone {
        let mut zone = Zone::new(ZoneId::intern("graph_zone"), "Graph");
        for s in ids {
            zone.add_task(Task::new(id(s), *s));
        }
        zone
    }

    #[test]
    fn add_edge_is_visible_both_ways() {
        let mut z = zone(&["g_a", "g_b"]);
        let action = add_edge(&mut z, id("g_a"), TriggerKind::OnCorrect, id("g_b")).unwrap();

        let out = edges_from(&z, id("g_a")).unwrap();
        assert_eq!(out[&TriggerKind::OnCorrect][0].target, id("g_b"));
        assert_eq!(out[&TriggerKind::OnCorrect][0].id, action);

        let graph = ActionGraph::build(&z);
        assert_eq!(
            graph.targets_of(id("g_b")),
            vec![Incoming {
                source: id("g_a"),
                trigger: TriggerKind::OnCorrect,
                action,
            }]
        );
        assert!(graph.is_unlock_target(id("g_b")));
        assert!(!graph.is_unlock_target(id("g_a")));
    }

    #[test]
    fn duplicate_edges_are_kept() {
        let mut z = zone(&["d_a", "d_b"]);
        let first = add_edge(&mut z, id("d_a"), TriggerKind::OnOpen, id("d_b")).unwrap();
        let second = add_edge(&mut z, id("d_a"), TriggerKind::OnOpen, id("d_b")).unwrap();
        assert_ne!(first, second);
        assert_eq!(edges_from(&z, id("d_a")).unwrap()[&TriggerKind::OnOpen].len(), 2);
        assert_eq!(ActionGraph::build(&z).connectors().len(), 2);

        assert!(remove_edge(&mut z, id("d_a"), first));
        let left = &edges_from(&z, id("d_a")).unwrap()[&TriggerKind::OnOpen];
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, second);
    }

    #[test]
    fn reloaded_ids_are_never_reused() {
        // A saved document holds `action_0` plus the next ids this process
        // would generate, as if written by an earlier session.
        let next = ActionId::generate().as_str()["action_".len()..].parse::<u64>().unwrap() + 1;
        let saved: Vec<String> = std::iter::once(0)
            .chain(next..next + 32)
            .map(|n| format!(r#"{{ "id": "action_{n}", "targetNodeId": "ld_b" }}"#))
            .collect();
        let json = format!(
            r#"{{ "zones": [ {{ "id": "reload_zone", "name": "Reload", "tasks": [
                {{ "id": "ld_a", "actions": {{ "onOpen": [ {} ] }} }},
                {{ "id": "ld_b" }},
                {{ "id": "ld_c" }}
            ] }} ] }}"#,
            saved.join(", ")
        );
        let doc = Document::from_json(&json).unwrap();
        let mut z = doc.zone(ZoneId::intern("reload_zone")).unwrap().clone();

        let action = add_edge(&mut z, id("ld_a"), TriggerKind::OnCorrect, id("ld_c")).unwrap();
        assert!(!saved.iter().any(|s| s.contains(&format!(r#""{action}""#))));

        assert!(remove_edge(&mut z, id("ld_a"), action));
        let out = edges_from(&z, id("ld_a")).unwrap();
        assert!(!out.contains_key(&TriggerKind::OnCorrect));
        assert_eq!(out[&TriggerKind::OnOpen].len(), saved.len());
        assert_eq!(out[&TriggerKind::OnOpen][0].id, ActionId::intern("action_0"));
        assert_eq!(
            ActionGraph::build(&z)
                .targets_of(id("ld_b"))
                .iter()
                .filter(|i| i.source == id("ld_a"))
                .count(),
            saved.len()
        );
    }

    #[test]
    fn removing_last_edge_drops_trigger_entry() {
        let mut z = zone(&["r_a", "r_b"]);
        let action = add_edge(&mut z, id("r_a"), TriggerKind::OnIncorrect, id("r_b")).unwrap();
        assert!(remove_edge(&mut z, id("r_a"), action));
        assert!(edges_from(&z, id("r_a")).unwrap().is_empty());
        assert!(!remove_edge(&mut z, id("r_a"), action));
    }

    #[test]
    fn target_must_exist_when_adding() {
        let mut z = zone(&["m_a"]);
        assert!(add_edge(&mut z, id("m_a"), TriggerKind::OnOpen, id("m_ghost")).is_none());
        assert!(add_edge(&mut z, id("m_ghost"), TriggerKind::OnOpen, id("m_a")).is_none());
    }

    #[test]
    fn dangling_edges_are_skipped_not_pruned() {
        let mut z = zone(&["x_a", "x_b"]);
        add_edge(&mut z, id("x_a"), TriggerKind::OnCorrect, id("x_b"));
        z.remove_task(id("x_b"));

        let graph = ActionGraph::build(&z);
        assert!(graph.connectors().is_empty());
        assert_eq!(graph.dangling_count(), 1);
        // Still stored on the source.
        assert_eq!(edges_from(&z, id("x_a")).unwrap()[&TriggerKind::OnCorrect].len(), 1);

        // Re-adding a task with the same id resurrects the edge.
        z.add_task(Task::new(id("x_b"), "back"));
        assert_eq!(ActionGraph::build(&z).connectors().len(), 1);
    }

    #[test]
    fn cycles_are_reported_without_looping() {
        let mut z = zone(&["c_a", "c_b", "c_c"]);
        add_edge(&mut z, id("c_a"), TriggerKind::OnCorrect, id("c_b"));
        add_edge(&mut z, id("c_b"), TriggerKind::OnCorrect, id("c_a"));
        add_edge(&mut z, id("c_c"), TriggerKind::OnOpen, id("c_c"));

        let graph = ActionGraph::build(&z);
        assert_eq!(graph.connectors().len(), 3);
        assert_eq!(
            graph.unlock_cycles(),
            vec![vec![id("c_a"), id("c_b")], vec![id("c_c")]]
        );
    }
}
