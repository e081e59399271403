//! Connector geometry and per-trigger styling.
//!
//! Each trigger kind gets one fixed color/dash pair so the operator can tell
//! edges apart. Styling has no effect on the graph itself.

use crate::hit::{MarkerMetrics, marker_of};
use pg_core::graph::{ActionGraph, Connector};
use pg_core::id::TaskId;
use pg_core::model::{DeviceClass, TriggerKind, Zone};
use pg_core::transform::{ScreenPoint, ScreenRect};

/// Visual style of a connector line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorStyle {
    pub rgb: (u8, u8, u8),
    /// Same color as a CSS string, for Canvas2D hosts.
    pub css: &'static str,
    pub width: f64,
    /// Dash pattern in pixels. Empty = solid.
    pub dash: &'static [f64],
}

pub fn connector_style(trigger: TriggerKind) -> ConnectorStyle {
    match trigger {
        TriggerKind::OnOpen => ConnectorStyle {
            rgb: (0x3B, 0x82, 0xF6),
            css: "#3B82F6",
            width: 2.0,
            dash: &[],
        },
        TriggerKind::OnCorrect => ConnectorStyle {
            rgb: (0x10, 0xB9, 0x81),
            css: "#10B981",
            width: 2.0,
            dash: &[8.0, 4.0],
        },
        TriggerKind::OnIncorrect => ConnectorStyle {
            rgb: (0xEF, 0x44, 0x44),
            css: "#EF4444",
            width: 2.0,
            dash: &[2.0, 4.0],
        },
    }
}

/// A connector resolved to screen space, trimmed to the marker rims.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorLine {
    pub connector: Connector,
    pub from: ScreenPoint,
    pub to: ScreenPoint,
}

/// Screen-space lines for every resolvable edge of `zone`.
///
/// Dangling edges never reach here (the graph view drops them). Self-loops
/// and coincident markers have no direction to draw and are skipped.
pub fn connector_lines(
    zone: &Zone,
    device: DeviceClass,
    canvas: ScreenRect,
    metrics: MarkerMetrics,
) -> Vec<ConnectorLine> {
    if canvas.is_degenerate() {
        return Vec::new();
    }
    let graph = ActionGraph::build(zone);
    graph
        .connectors()
        .into_iter()
        .filter_map(|connector| {
            let source = zone.task(connector.source)?;
            let target = zone.task(connector.target)?;
            let (a, ra) = marker_of(source, device, canvas, metrics);
            let (b, rb) = marker_of(target, device, canvas, metrics);
            let len = a.distance_to(b);
            if connector.source == connector.target || len <= ra + rb {
                log::trace!(
                    "connector {} -> {} has no visible length",
                    connector.source,
                    connector.target
                );
                return None;
            }
            let (ux, uy) = ((b.x - a.x) / len, (b.y - a.y) / len);
            Some(ConnectorLine {
                connector,
                from: ScreenPoint::new(a.x + ux * ra, a.y + uy * ra),
                to: ScreenPoint::new(b.x - ux * rb, b.y - uy * rb),
            })
        })
        .collect()
}

/// Draw-mode preview line: from the rim of `source`'s marker to the cursor.
///
/// `None` when the source is gone or the cursor is still inside its marker.
pub fn rubber_band(
    zone: &Zone,
    device: DeviceClass,
    canvas: ScreenRect,
    metrics: MarkerMetrics,
    source: TaskId,
    cursor: ScreenPoint,
) -> Option<(ScreenPoint, ScreenPoint)> {
    if canvas.is_degenerate() {
        return None;
    }
    let (center, radius) = marker_of(zone.task(source)?, device, canvas, metrics);
    let len = center.distance_to(cursor);
    if len <= radius {
        return None;
    }
    let (ux, uy) = ((cursor.x - center.x) / len, (cursor.y - center.y) / len);
    Some((
        ScreenPoint::new(center.x + ux * radius, center.y + uy * radius),
        cursor,
    ))
}

/// Arrowhead triangle at `to`, pointing away from `from`.
pub fn arrowhead(from: ScreenPoint, to: ScreenPoint, size: f32) -> [ScreenPoint; 3] {
    let angle = (to.y - from.y).atan2(to.x - from.x);
    let spread = 0.4_f32;
    [
        to,
        ScreenPoint::new(
            to.x - size * (angle - spread).cos(),
            to.y - size * (angle - spread).sin(),
        ),
        ScreenPoint::new(
            to.x - size * (angle + spread).cos(),
            to.y - size * (angle + spread).sin(),
        ),
    ]
}
