//! Integration tests: stored document → device layout store → snapping.
//!
//! Exercises the full `pg-core` pipeline: JSON → Document → effective
//! positions → snap passes, across device classes.

use pg_core::graph::ActionGraph;
use pg_core::id::{TaskId, ZoneId};
use pg_core::layout::{PositionSource, position_of, position_with_source, with_position};
use pg_core::model::*;
use pg_core::snap::{SELECTED_PADDING, plan_grid, snap_all, snap_selected};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn harbor() -> Zone {
    let doc = Document::from_json(include_str!("fixtures/harbor.json")).unwrap();
    doc.zone(ZoneId::intern("harbor")).unwrap().clone()
}

fn id(s: &str) -> TaskId {
    TaskId::intern(s)
}

// ─── Resolution ──────────────────────────────────────────────────────────

#[test]
fn every_position_is_inside_the_canvas() {
    let zone = harbor();
    for task in &zone.tasks {
        for device in DeviceClass::ALL {
            let p = position_of(task, device);
            assert!(
                (0.0..=100.0).contains(&p.x) && (0.0..=100.0).contains(&p.y),
                "{} on {device} resolved to {p:?}",
                task.id
            );
        }
    }
}

#[test]
fn fallback_chain_per_task() {
    let zone = harbor();
    let crane = zone.task(id("crane")).unwrap();
    assert_eq!(
        position_with_source(crane, DeviceClass::Mobile),
        (Point::new(64.0, 22.0), PositionSource::Legacy)
    );

    let lighthouse = zone.task(id("lighthouse")).unwrap();
    assert_eq!(
        position_with_source(lighthouse, DeviceClass::Desktop),
        (Point::CENTER, PositionSource::Default)
    );

    let market = zone.task(id("fish_market")).unwrap();
    assert_eq!(position_of(market, DeviceClass::Mobile), Point::new(100.0, 0.0));
}

#[test]
fn set_then_get_only_changes_one_device() {
    let zone = harbor();
    let lighthouse = zone.task(id("lighthouse")).unwrap();
    let moved = with_position(lighthouse, DeviceClass::Mobile, Point::new(41.0, 72.0), false);

    assert_eq!(position_of(&moved, DeviceClass::Mobile), Point::new(41.0, 72.0));
    for other in [DeviceClass::Tablet, DeviceClass::Desktop] {
        assert_eq!(position_of(&moved, other), position_of(lighthouse, other));
    }
    assert_eq!(moved.placements[&DeviceClass::Tablet].scale, Some(1.5));
}

// ─── Snapping ────────────────────────────────────────────────────────────

#[test]
fn snap_selected_leaves_unmarked_tasks_untouched() {
    let zone = harbor();
    let marked: HashSet<TaskId> = ["lighthouse", "crane", "ferry", "pier"]
        .into_iter()
        .map(id)
        .collect();

    let snapped = snap_selected(&zone, DeviceClass::Mobile, &marked);

    for (before, after) in zone.tasks.iter().zip(&snapped.tasks) {
        if marked.contains(&before.id) {
            let p = position_of(after, DeviceClass::Mobile);
            assert!(
                p.x >= SELECTED_PADDING
                    && p.x <= 100.0 - SELECTED_PADDING
                    && p.y >= SELECTED_PADDING
                    && p.y <= 100.0 - SELECTED_PADDING,
                "{} left the padded rectangle: {p:?}",
                before.id
            );
        } else {
            assert_eq!(before, after, "{} should not change", before.id);
        }
    }
}

#[test]
fn snap_selected_detects_two_rows() {
    let zone = harbor();
    let marked: HashSet<TaskId> = ["lighthouse", "crane", "ferry", "pier"]
        .into_iter()
        .map(id)
        .collect();
    let snapped = snap_selected(&zone, DeviceClass::Mobile, &marked);

    let y = |s: &str| position_of(snapped.task(id(s)).unwrap(), DeviceClass::Mobile).y;
    assert!((y("lighthouse") - y("crane")).abs() < 0.01);
    assert!((y("ferry") - y("pier")).abs() < 0.01);
    assert!(y("lighthouse") < y("ferry"));
}

#[test]
fn snap_all_keeps_other_devices_and_edges() {
    let zone = harbor();
    let snapped = snap_all(&zone, DeviceClass::Mobile);

    let lighthouse = snapped.task(id("lighthouse")).unwrap();
    assert_eq!(
        position_of(lighthouse, DeviceClass::Tablet),
        Point::new(15.0, 30.0)
    );
    assert_eq!(
        ActionGraph::build(&snapped).connectors(),
        ActionGraph::build(&zone).connectors()
    );

    let cells: HashSet<_> = plan_grid(
        &zone
            .tasks
            .iter()
            .map(|t| (t.id, position_of(t, DeviceClass::Mobile)))
            .collect::<Vec<_>>(),
    )
    .into_iter()
    .map(|p| p.cell)
    .collect();
    assert_eq!(cells.len(), zone.tasks.len());
}

// ─── Graph over fixture ──────────────────────────────────────────────────

#[test]
fn dangling_fixture_edge_is_skipped() {
    let zone = harbor();
    let graph = ActionGraph::build(&zone);
    assert_eq!(graph.dangling_count(), 1);
    assert_eq!(graph.connectors().len(), 1);
    assert!(graph.is_unlock_target(id("crane")));
}
