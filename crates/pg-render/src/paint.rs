//! Zone → Vello drawing commands.
//!
//! Paints connectors first, then task markers on top in document order so
//! the last task is topmost (matching [`crate::hit::hit_test`]). Editor
//! overlays (draw-mode rubber band, marquee) come last.

use crate::connector::{ConnectorLine, arrowhead, connector_lines, connector_style};
use crate::hit::{MarkerMetrics, marker_of};
use kurbo::{Affine, BezPath, Cap, Circle, Join, Line, Point, Rect, Stroke};
use peniko::{Color, Fill};
use pg_core::graph::ActionGraph;
use pg_core::id::TaskId;
use pg_core::model::{DeviceClass, TriggerKind, Zone};
use pg_core::transform::{ScreenPoint, ScreenRect};
use std::collections::HashSet;
use vello::Scene;

/// Editor state that changes how a frame looks but is not part of the zone.
#[derive(Debug, Default)]
pub struct Overlay<'a> {
    pub selected: Option<TaskId>,
    pub marked: Option<&'a HashSet<TaskId>>,
    /// Draw-mode preview line with the trigger being drawn.
    pub rubber_band: Option<(ScreenPoint, ScreenPoint, TriggerKind)>,
    /// Marquee rectangle while marking by drag.
    pub marquee: Option<ScreenRect>,
}

const MARKER_FILL: Color = Color::from_rgb8(0xFF, 0xFF, 0xFF);
const MARKER_RIM: Color = Color::from_rgb8(0x33, 0x41, 0x55);
const COMPLETED_FILL: Color = Color::from_rgb8(0xD1, 0xFA, 0xE5);
const LOCKED_FILL: Color = Color::from_rgb8(0xE5, 0xE7, 0xEB);
const SELECTED_RING: Color = Color::from_rgb8(0x25, 0x63, 0xEB);
const MARKED_RING: Color = Color::from_rgb8(0xF5, 0x9E, 0x0B);
const MARQUEE: Color = Color::from_rgba8(0x25, 0x63, 0xEB, 0x33);

/// Paint one frame of `zone` for `device` into `scene`.
///
/// Call once per frame with a freshly-cleared `Scene`.
pub fn paint_zone(
    scene: &mut Scene,
    zone: &Zone,
    device: DeviceClass,
    canvas: ScreenRect,
    metrics: MarkerMetrics,
    overlay: &Overlay<'_>,
) {
    if canvas.is_degenerate() {
        log::trace!("skipping paint of {}: canvas not mounted", zone.id);
        return;
    }

    for line in connector_lines(zone, device, canvas, metrics) {
        paint_connector(scene, &line);
    }

    let graph = ActionGraph::build(zone);
    for task in &zone.tasks {
        let (center, radius) = marker_of(task, device, canvas, metrics);
        let circle = Circle::new(to_point(center), radius as f64);
        let fill = if task.completed {
            COMPLETED_FILL
        } else if graph.is_unlock_target(task.id) {
            LOCKED_FILL
        } else {
            MARKER_FILL
        };
        scene.fill(Fill::NonZero, Affine::IDENTITY, fill, None, &circle);
        scene.stroke(&Stroke::new(1.5), Affine::IDENTITY, MARKER_RIM, None, &circle);

        if overlay.marked.is_some_and(|m| m.contains(&task.id)) {
            let ring = Circle::new(to_point(center), radius as f64 + 3.0);
            scene.stroke(&Stroke::new(2.0), Affine::IDENTITY, MARKED_RING, None, &ring);
        }
        if overlay.selected == Some(task.id) {
            let ring = Circle::new(to_point(center), radius as f64 + 6.0);
            scene.stroke(&Stroke::new(2.0), Affine::IDENTITY, SELECTED_RING, None, &ring);
        }
    }

    if let Some((from, to, trigger)) = overlay.rubber_band {
        let style = connector_style(trigger);
        let (r, g, b) = style.rgb;
        let stroke = Stroke::new(style.width).with_dashes(0.0, [6.0, 6.0]);
        let line = Line::new(to_point(from), to_point(to));
        scene.stroke(&stroke, Affine::IDENTITY, Color::from_rgb8(r, g, b), None, &line);
    }

    if let Some(rect) = overlay.marquee {
        let r = Rect::new(
            rect.left as f64,
            rect.top as f64,
            (rect.left + rect.width) as f64,
            (rect.top + rect.height) as f64,
        );
        scene.fill(Fill::NonZero, Affine::IDENTITY, MARQUEE, None, &r);
        scene.stroke(&Stroke::new(1.0), Affine::IDENTITY, SELECTED_RING, None, &r);
    }
}

// ─── Connectors ──────────────────────────────────────────────────────────────

fn paint_connector(scene: &mut Scene, line: &ConnectorLine) {
    let style = connector_style(line.connector.trigger);
    let (r, g, b) = style.rgb;
    let color = Color::from_rgb8(r, g, b);

    let stroke = Stroke {
        width: style.width,
        join: Join::Round,
        start_cap: Cap::Round,
        end_cap: Cap::Round,
        ..Default::default()
    }
    .with_dashes(0.0, style.dash.iter().copied());
    let segment = Line::new(to_point(line.from), to_point(line.to));
    scene.stroke(&stroke, Affine::IDENTITY, color, None, &segment);

    let [tip, left, right] = arrowhead(line.from, line.to, 10.0);
    let mut head = BezPath::new();
    head.move_to(to_point(tip));
    head.line_to(to_point(left));
    head.line_to(to_point(right));
    head.close_path();
    scene.fill(Fill::NonZero, Affine::IDENTITY, color, None, &head);
}

fn to_point(p: ScreenPoint) -> Point {
    Point::new(p.x as f64, p.y as f64)
}
