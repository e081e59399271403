//! Grid snapping: deterministic re-layout of tasks into rows and columns.
//!
//! Both passes bucket tasks into rows by vertical proximity, order each row
//! left to right, and hand out grid cells. They only ever write the layout
//! of one device class.
//!
//! - **snap-all** re-flows every task into an evenly spaced grid whose
//!   column count grows with the task count.
//! - **snap-selected** re-lays only a marked subset into a rectangle sized
//!   to the rows/columns the operator already roughed out, keeping extra
//!   padding for labels. Unmarked tasks are not touched.

use crate::id::TaskId;
use crate::layout::{position_of, with_position};
use crate::model::*;
use std::collections::HashSet;

/// Vertical distance under which two tasks share a row (snap-all).
pub const ROW_TOLERANCE: f32 = 15.0;
/// Tighter row tolerance for snap-selected.
pub const SELECTED_ROW_TOLERANCE: f32 = 10.0;
/// Edge padding of the snap-all grid, in percent.
pub const GRID_PADDING: f32 = 10.0;
/// Minimum edge padding of a snap-selected rectangle (label clearance).
pub const SELECTED_PADDING: f32 = 15.0;
/// Preferred spacing between neighbours in a snap-selected rectangle.
pub const SELECTED_MIN_GAP: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

/// Where one task lands after a snap pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub id: TaskId,
    pub cell: GridCell,
    pub position: Point,
}

/// Column count of the snap-all grid.
pub fn column_count(task_count: usize) -> usize {
    match task_count {
        0..=12 => 3,
        13..=20 => 4,
        _ => 5,
    }
}

/// Bucket tasks into rows. Rows are ordered top to bottom; a row starts at
/// its topmost task and takes every following task within `tolerance` of
/// it. Each row is ordered left to right. Ties break on id.
pub fn bucket_rows(items: &[(TaskId, Point)], tolerance: f32) -> Vec<Vec<(TaskId, Point)>> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| {
        a.1.y
            .total_cmp(&b.1.y)
            .then(a.1.x.total_cmp(&b.1.x))
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut rows: Vec<Vec<(TaskId, Point)>> = Vec::new();
    let mut anchor_y = f32::NEG_INFINITY;
    for item in sorted {
        match rows.last_mut() {
            Some(row) if item.1.y - anchor_y <= tolerance => row.push(item),
            _ => {
                anchor_y = item.1.y;
                rows.push(vec![item]);
            }
        }
    }

    for row in &mut rows {
        row.sort_by(|a, b| a.1.x.total_cmp(&b.1.x).then_with(|| a.0.cmp(&b.0)));
    }
    rows
}

// ─── Snap-all ────────────────────────────────────────────────────────────

/// Plan a snap-all pass over `items` (effective positions).
pub fn plan_grid(items: &[(TaskId, Point)]) -> Vec<Placement> {
    match items {
        [] => Vec::new(),
        [(id, _)] => vec![Placement {
            id: *id,
            cell: GridCell { row: 0, col: 0 },
            position: Point::CENTER,
        }],
        _ => {
            let ordered: Vec<TaskId> = bucket_rows(items, ROW_TOLERANCE)
                .into_iter()
                .flatten()
                .map(|(id, _)| id)
                .collect();
            let cols = column_count(ordered.len());
            let rows = ordered.len().div_ceil(cols);
            let span = 100.0 - 2.0 * GRID_PADDING;
            let cell_w = span / cols as f32;
            let cell_h = span / rows as f32;

            ordered
                .into_iter()
                .enumerate()
                .map(|(i, id)| {
                    let cell = GridCell {
                        row: i / cols,
                        col: i % cols,
                    };
                    let position = Point::new(
                        GRID_PADDING + (cell.col as f32 + 0.5) * cell_w,
                        GRID_PADDING + (cell.row as f32 + 0.5) * cell_h,
                    );
                    Placement { id, cell, position }
                })
                .collect()
        }
    }
}

// ─── Snap-selected ───────────────────────────────────────────────────────

/// Plan a snap-selected pass over the marked `items`.
pub fn plan_selection(items: &[(TaskId, Point)]) -> Vec<Placement> {
    if items.len() < 2 {
        return items
            .iter()
            .map(|&(id, position)| Placement {
                id,
                cell: GridCell { row: 0, col: 0 },
                position,
            })
            .collect();
    }

    let rows = bucket_rows(items, SELECTED_ROW_TOLERANCE);
    let row_count = rows.len();
    let col_count = rows.iter().map(Vec::len).max().unwrap_or(1);

    let xs: Vec<f32> = items.iter().map(|(_, p)| p.x).collect();
    let ys: Vec<f32> = items.iter().map(|(_, p)| p.y).collect();
    let (left, right) = fit_span(&xs, col_count);
    let (top, bottom) = fit_span(&ys, row_count);

    let mut placements = Vec::with_capacity(items.len());
    for (r, row) in rows.into_iter().enumerate() {
        let y = spread(top, bottom, r, row_count);
        for (c, (id, _)) in row.into_iter().enumerate() {
            placements.push(Placement {
                id,
                cell: GridCell { row: r, col: c },
                position: Point::new(spread(left, right, c, col_count), y),
            });
        }
    }
    placements
}

/// Extent along one axis for `slots` evenly spaced slots: the current
/// extent of `values` inside the padded area, widened around its middle
/// when it is too tight to keep neighbours apart.
fn fit_span(values: &[f32], slots: usize) -> (f32, f32) {
    let lo_bound = SELECTED_PADDING;
    let hi_bound = 100.0 - SELECTED_PADDING;

    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut lo = min.clamp(lo_bound, hi_bound);
    let mut hi = max.clamp(lo_bound, hi_bound);

    if slots > 1 {
        let gap = SELECTED_MIN_GAP.min((hi_bound - lo_bound) / (slots - 1) as f32);
        let needed = gap * (slots - 1) as f32;
        if hi - lo < needed {
            let mid = (lo + hi) / 2.0;
            lo = mid - needed / 2.0;
            hi = mid + needed / 2.0;
            if lo < lo_bound {
                hi += lo_bound - lo;
                lo = lo_bound;
            }
            if hi > hi_bound {
                lo -= hi - hi_bound;
                hi = hi_bound;
            }
        }
    }
    (lo, hi)
}

fn spread(lo: f32, hi: f32, index: usize, slots: usize) -> f32 {
    if slots <= 1 {
        (lo + hi) / 2.0
    } else {
        lo + index as f32 * (hi - lo) / (slots - 1) as f32
    }
}

// ─── Zone-level passes ───────────────────────────────────────────────────

fn effective_positions<'a>(
    tasks: impl Iterator<Item = &'a Task>,
    device: DeviceClass,
) -> Vec<(TaskId, Point)> {
    tasks.map(|t| (t.id, position_of(t, device))).collect()
}

/// Write `placements` into the `device` layout of a copy of `zone`.
pub fn apply_placements(zone: &Zone, device: DeviceClass, placements: &[Placement]) -> Zone {
    let mut next = zone.clone();
    for placement in placements {
        if let Some(task) = zone.task(placement.id) {
            next.replace_task(with_position(task, device, placement.position, false));
        }
    }
    next
}

/// Snap every task of `zone` into a grid, for `device` only.
pub fn snap_all(zone: &Zone, device: DeviceClass) -> Zone {
    let placements = plan_grid(&effective_positions(zone.tasks.iter(), device));
    log::debug!(
        "zone {}: snap-all on {device} over {} tasks",
        zone.id,
        placements.len()
    );
    apply_placements(zone, device, &placements)
}

/// Snap only the `selected` tasks of `zone`, for `device` only.
pub fn snap_selected(zone: &Zone, device: DeviceClass, selected: &HashSet<TaskId>) -> Zone {
    let items = effective_positions(
        zone.tasks.iter().filter(|t| selected.contains(&t.id)),
        device,
    );
    let placements = plan_selection(&items);
    log::debug!(
        "zone {}: snap-selected on {device} over {} tasks",
        zone.id,
        placements.len()
    );
    apply_placements(zone, device, &placements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ZoneId;
    use crate::layout::position_of;
    use pretty_assertions::assert_eq;

    fn items(points: &[(f32, f32)]) -> Vec<(TaskId, Point)> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| (TaskId::intern(&format!("snap_{i}")), Point::new(x, y)))
            .collect()
    }

    #[test]
    fn column_count_grows_with_tasks() {
        assert_eq!(column_count(1), 3);
        assert_eq!(column_count(12), 3);
        assert_eq!(column_count(13), 4);
        assert_eq!(column_count(20), 4);
        assert_eq!(column_count(21), 5);
    }

    #[test]
    fn rows_are_bucketed_by_proximity() {
        let rows = bucket_rows(&items(&[(80.0, 12.0), (10.0, 20.0), (50.0, 60.0)]), 15.0);
        let shape: Vec<usize> = rows.iter().map(Vec::len).collect();
        assert_eq!(shape, vec![2, 1]);
        // Left to right inside the first row.
        assert_eq!(rows[0][0].0, TaskId::intern("snap_1"));
        assert_eq!(rows[0][1].0, TaskId::intern("snap_0"));
    }

    #[test]
    fn grid_cells_are_distinct() {
        for n in [0usize, 1, 5, 13, 21] {
            let pts: Vec<(f32, f32)> = (0..n)
                .map(|i| ((i * 37 % 100) as f32, (i * 53 % 100) as f32))
                .collect();
            let plan = plan_grid(&items(&pts));
            assert_eq!(plan.len(), n);
            let cells: HashSet<GridCell> = plan.iter().map(|p| p.cell).collect();
            assert_eq!(cells.len(), n, "cells collide for n={n}");
            for p in &plan {
                assert!((0.0..=100.0).contains(&p.position.x));
                assert!((0.0..=100.0).contains(&p.position.y));
            }
        }
    }

    #[test]
    fn single_task_goes_to_center() {
        let plan = plan_grid(&items(&[(3.0, 97.0)]));
        assert_eq!(plan[0].position, Point::CENTER);
    }

    #[test]
    fn grid_is_deterministic() {
        let input = items(&[(10.0, 10.0), (10.0, 10.0), (90.0, 40.0), (40.0, 80.0)]);
        assert_eq!(plan_grid(&input), plan_grid(&input));
    }

    #[test]
    fn selection_keeps_detected_shape_inside_padding() {
        // Two rough rows of two.
        let plan = plan_selection(&items(&[(20.0, 20.0), (60.0, 24.0), (22.0, 70.0), (58.0, 66.0)]));
        let mut cells: Vec<GridCell> = plan.iter().map(|p| p.cell).collect();
        cells.sort();
        assert_eq!(
            cells,
            vec![
                GridCell { row: 0, col: 0 },
                GridCell { row: 0, col: 1 },
                GridCell { row: 1, col: 0 },
                GridCell { row: 1, col: 1 },
            ]
        );
        for p in &plan {
            assert!(p.position.x >= SELECTED_PADDING && p.position.x <= 100.0 - SELECTED_PADDING);
            assert!(p.position.y >= SELECTED_PADDING && p.position.y <= 100.0 - SELECTED_PADDING);
        }
    }

    #[test]
    fn stacked_selection_is_spread_apart() {
        let plan = plan_selection(&items(&[(50.0, 50.0), (50.0, 50.0), (50.0, 50.0)]));
        let xs: HashSet<u32> = plan.iter().map(|p| p.position.x.round() as u32).collect();
        assert_eq!(xs.len(), 3);
    }

    #[test]
    fn snap_writes_only_the_current_device() {
        let mut zone = Zone::new(ZoneId::intern("snap_zone"), "Snap");
        for i in 0..4 {
            zone.add_task(
                Task::new(TaskId::intern(&format!("sz_{i}")), "t")
                    .placed(DeviceClass::Tablet, Point::new(7.0 * i as f32, 3.0)),
            );
        }
        let snapped = snap_all(&zone, DeviceClass::Mobile);
        for (before, after) in zone.tasks.iter().zip(&snapped.tasks) {
            assert_eq!(
                position_of(before, DeviceClass::Tablet),
                position_of(after, DeviceClass::Tablet)
            );
            assert!(after.placements.contains_key(&DeviceClass::Mobile));
        }
    }
}
