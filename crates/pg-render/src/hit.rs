//! Hit testing: screen point → task lookup.
//!
//! Walks tasks back to front (last painted = topmost) and checks each
//! circular marker at its effective position for the active device class.

use pg_core::id::TaskId;
use pg_core::layout::{position_of, scale_of};
use pg_core::model::{DeviceClass, Task, Zone};
use pg_core::transform::{ScreenPoint, ScreenRect, percent_to_screen};

/// On-screen marker size: base diameter × task scale × view zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerMetrics {
    /// Marker diameter in canvas pixels at scale 1.0.
    pub base_px: f32,
    /// Current view zoom.
    pub zoom: f32,
}

impl MarkerMetrics {
    pub fn radius(&self, scale: f32) -> f32 {
        self.base_px * scale * self.zoom / 2.0
    }
}

/// Screen center and radius of a task's marker.
pub fn marker_of(
    task: &Task,
    device: DeviceClass,
    canvas: ScreenRect,
    metrics: MarkerMetrics,
) -> (ScreenPoint, f32) {
    let center = percent_to_screen(position_of(task, device), canvas);
    (center, metrics.radius(scale_of(task, device)))
}

/// Find the topmost task under `point`. `None` means background.
pub fn hit_test(
    zone: &Zone,
    device: DeviceClass,
    canvas: ScreenRect,
    metrics: MarkerMetrics,
    point: ScreenPoint,
) -> Option<TaskId> {
    if canvas.is_degenerate() {
        return None;
    }
    zone.tasks.iter().rev().find_map(|task| {
        let (center, radius) = marker_of(task, device, canvas, metrics);
        (center.distance_to(point) <= radius).then_some(task.id)
    })
}

/// All tasks whose marker center lies inside `rect` (marquee marking).
pub fn hit_test_rect(
    zone: &Zone,
    device: DeviceClass,
    canvas: ScreenRect,
    rect: ScreenRect,
) -> Vec<TaskId> {
    if canvas.is_degenerate() {
        return Vec::new();
    }
    zone.tasks
        .iter()
        .filter(|task| rect.contains(percent_to_screen(position_of(task, device), canvas)))
        .map(|task| task.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_core::id::ZoneId;
    use pg_core::model::Point;

    const CANVAS: ScreenRect = ScreenRect::new(0.0, 0.0, 400.0, 800.0);
    const METRICS: MarkerMetrics = MarkerMetrics {
        base_px: 40.0,
        zoom: 1.0,
    };

    fn zone() -> Zone {
        let mut zone = Zone::new(ZoneId::intern("hit_zone"), "Hit");
        zone.add_task(
            Task::new(TaskId::intern("hit_under"), "Under").placed(DeviceClass::Mobile, Point::new(50.0, 50.0)),
        );
        zone.add_task(
            Task::new(TaskId::intern("hit_over"), "Over").placed(DeviceClass::Mobile, Point::new(52.0, 50.0)),
        );
        zone
    }

    #[test]
    fn topmost_task_wins() {
        // (200, 400) is the center of "hit_under", but "hit_over" (8px right) covers it too.
        let hit = hit_test(&zone(), DeviceClass::Mobile, CANVAS, METRICS, ScreenPoint::new(200.0, 400.0));
        assert_eq!(hit, Some(TaskId::intern("hit_over")));
    }

    #[test]
    fn background_miss() {
        let hit = hit_test(&zone(), DeviceClass::Mobile, CANVAS, METRICS, ScreenPoint::new(10.0, 10.0));
        assert_eq!(hit, None);
    }

    #[test]
    fn scale_grows_hit_area() {
        let mut z = zone();
        z.tasks[1].scale = 3.0;
        // 50px right of center: outside a 20px radius, inside a 60px one.
        let hit = hit_test(&z, DeviceClass::Mobile, CANVAS, METRICS, ScreenPoint::new(258.0, 400.0));
        assert_eq!(hit, Some(TaskId::intern("hit_over")));
    }

    #[test]
    fn marquee_collects_centers() {
        let hits = hit_test_rect(
            &zone(),
            DeviceClass::Mobile,
            CANVAS,
            ScreenRect::new(190.0, 390.0, 15.0, 20.0),
        );
        assert_eq!(hits, vec![TaskId::intern("hit_under")]);
    }
}
