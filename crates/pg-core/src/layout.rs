//! Device layout store.
//!
//! Each task stores one placement per device class. Reads go through a
//! single ordered resolution chain (device entry → legacy shared position →
//! canvas center) so call sites never do their own fallback. Writes return
//! a new [`Task`] and touch only the requested class.

use crate::model::*;
use crate::transform::{SNAP_STEP, Size};
use serde::{Deserialize, Serialize};

// ─── Device reference table ──────────────────────────────────────────────

/// Reference viewport of one device class. `size: None` means "fill the
/// available editor area" (desktop).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub size: Option<Size>,
    pub orientation: Orientation,
}

/// Fixed table of device reference dimensions, supplied as configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceTable {
    pub mobile: DeviceProfile,
    pub tablet: DeviceProfile,
    pub desktop: DeviceProfile,
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self {
            mobile: DeviceProfile {
                size: Some(Size::new(375.0, 812.0)),
                orientation: Orientation::Portrait,
            },
            tablet: DeviceProfile {
                size: Some(Size::new(1024.0, 768.0)),
                orientation: Orientation::Landscape,
            },
            desktop: DeviceProfile {
                size: None,
                orientation: Orientation::Landscape,
            },
        }
    }
}

impl DeviceTable {
    pub fn profile(&self, device: DeviceClass) -> DeviceProfile {
        match device {
            DeviceClass::Mobile => self.mobile,
            DeviceClass::Tablet => self.tablet,
            DeviceClass::Desktop => self.desktop,
        }
    }

    /// Logical canvas size for `device` inside an editor area of `available`.
    pub fn canvas_size(&self, device: DeviceClass, available: Size) -> Size {
        self.profile(device).size.unwrap_or(available)
    }
}

// ─── Resolution chain ────────────────────────────────────────────────────

/// Where an effective position came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
    Device,
    Legacy,
    Default,
}

/// The resolution chain itself: first present layer wins, result clamped.
pub fn resolve_position(
    device_entry: Option<Point>,
    legacy: Option<Point>,
) -> (Point, PositionSource) {
    let (point, source) = match (device_entry, legacy) {
        (Some(p), _) => (p, PositionSource::Device),
        (None, Some(p)) => (p, PositionSource::Legacy),
        (None, None) => (Point::CENTER, PositionSource::Default),
    };
    (point.clamped(), source)
}

/// Effective position of `task` for `device`. Never fails.
pub fn position_of(task: &Task, device: DeviceClass) -> Point {
    position_with_source(task, device).0
}

pub fn position_with_source(task: &Task, device: DeviceClass) -> (Point, PositionSource) {
    resolve_position(
        task.placements.get(&device).map(|p| p.position),
        task.legacy_position,
    )
}

/// Effective render scale: device override → task scale, clamped.
pub fn scale_of(task: &Task, device: DeviceClass) -> f32 {
    let scale = task
        .placements
        .get(&device)
        .and_then(|p| p.scale)
        .unwrap_or(task.scale);
    clamp_scale(scale)
}

// ─── Writes (whole-task replacement) ─────────────────────────────────────

/// Normalize a position for storage: clamp, then optionally snap to the grid.
pub fn normalize_position(position: Point, snap: bool) -> Point {
    let p = position.clamped();
    if snap {
        // Multiples of 5 inside [0, 100] stay inside [0, 100].
        p.snapped(SNAP_STEP)
    } else {
        p
    }
}

/// Return a copy of `task` with the placement for `device` set to `position`.
/// Other device classes are untouched; an existing device scale is kept.
#[must_use]
pub fn with_position(task: &Task, device: DeviceClass, position: Point, snap: bool) -> Task {
    let position = normalize_position(position, snap);
    let mut next = task.clone();
    next.placements
        .entry(device)
        .and_modify(|p| p.position = position)
        .or_insert(DevicePlacement::at(position));
    next
}

/// Return a copy of `task` with a device-specific scale override.
///
/// A task without a stored placement for `device` gets one pinned at its
/// current effective position, so the override has somewhere to live.
#[must_use]
pub fn with_device_scale(task: &Task, device: DeviceClass, scale: f32) -> Task {
    let current = position_of(task, device);
    let mut next = task.clone();
    next.placements
        .entry(device)
        .or_insert(DevicePlacement::at(current))
        .scale = Some(clamp_scale(scale));
    next
}

/// Return a copy of `task` with a new task-wide scale.
#[must_use]
pub fn with_scale(task: &Task, scale: f32) -> Task {
    let mut next = task.clone();
    next.scale = clamp_scale(scale);
    next
}

/// Copy every task's effective `from` position into `to`. Explicit operator
/// action; nothing copies layouts implicitly.
pub fn copy_device_layout(zone: &Zone, from: DeviceClass, to: DeviceClass) -> Zone {
    let mut next = zone.clone();
    if from == to {
        return next;
    }
    for task in &mut next.tasks {
        let position = position_of(task, from);
        *task = with_position(task, to, position, false);
    }
    log::debug!("zone {}: copied {from} layout to {to}", zone.id);
    next
}
