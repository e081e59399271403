//! Zone document model.
//!
//! A [`Document`] owns an ordered list of [`Zone`]s. Each zone owns an
//! ordered list of [`Task`] nodes placed on a background image. Positions are
//! percentages of a logical canvas and are stored independently per
//! [`DeviceClass`]. Tasks are wired together by trigger-typed
//! [`ActionEdge`]s stored on the source task.

use crate::error::DocumentError;
use crate::icon::TaskIcon;
use crate::id::{ActionId, TaskId, ZoneId};
use crate::transform::{clamp_percent, snap_to_step};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ─── Geometry ────────────────────────────────────────────────────────────

/// A position on the logical canvas, both axes in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const CENTER: Point = Point { x: 50.0, y: 50.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Both axes clamped to `[0, 100]`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::new(clamp_percent(self.x), clamp_percent(self.y))
    }

    /// Both axes rounded to the nearest multiple of `step`.
    #[must_use]
    pub fn snapped(self, step: f32) -> Self {
        Self::new(snap_to_step(self.x, step), snap_to_step(self.y, step))
    }
}

// ─── Device classes ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Reference viewport profile. Each class keeps its own layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    #[default]
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceClass {
    pub const ALL: [DeviceClass; 3] = [DeviceClass::Mobile, DeviceClass::Tablet, DeviceClass::Desktop];

    pub const fn name(self) -> &'static str {
        match self {
            DeviceClass::Mobile => "mobile",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Desktop => "desktop",
        }
    }

    pub const fn orientation(self) -> Orientation {
        match self {
            DeviceClass::Mobile => Orientation::Portrait,
            DeviceClass::Tablet | DeviceClass::Desktop => Orientation::Landscape,
        }
    }
}

impl FromStr for DeviceClass {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceClass::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DocumentError::UnknownDevice(s.to_string()))
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Triggers & actions ──────────────────────────────────────────────────

/// Event category that fires a task's outgoing actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerKind {
    OnOpen,
    OnCorrect,
    OnIncorrect,
}

impl TriggerKind {
    pub const ALL: [TriggerKind; 3] = [
        TriggerKind::OnOpen,
        TriggerKind::OnCorrect,
        TriggerKind::OnIncorrect,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            TriggerKind::OnOpen => "onOpen",
            TriggerKind::OnCorrect => "onCorrect",
            TriggerKind::OnIncorrect => "onIncorrect",
        }
    }
}

impl FromStr for TriggerKind {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TriggerKind::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DocumentError::UnknownTrigger(s.to_string()))
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    #[default]
    Unlock,
}

/// A directed, trigger-typed link from the owning task to `target`.
///
/// `target` may dangle once its task is removed; readers skip such edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEdge {
    pub id: ActionId,
    #[serde(default)]
    pub kind: ActionKind,
    #[serde(rename = "targetNodeId")]
    pub target: TaskId,
}

impl ActionEdge {
    pub fn unlock(target: TaskId) -> Self {
        Self {
            id: ActionId::generate(),
            kind: ActionKind::Unlock,
            target,
        }
    }
}

/// Edges for one trigger. Most triggers fan out to one or two targets.
pub type ActionList = SmallVec<[ActionEdge; 2]>;

// ─── Tasks ───────────────────────────────────────────────────────────────

pub const SCALE_MIN: f32 = 0.5;
pub const SCALE_MAX: f32 = 3.0;
pub const DEFAULT_SCALE: f32 = 1.0;

/// Clamp a render scale to `[0.5, 3.0]`. NaN falls back to `1.0`.
pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        return DEFAULT_SCALE;
    }
    scale.clamp(SCALE_MIN, SCALE_MAX)
}

fn default_scale() -> f32 {
    DEFAULT_SCALE
}

/// Stored placement of a task for one device class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DevicePlacement {
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
}

impl DevicePlacement {
    pub const fn at(position: Point) -> Self {
        Self {
            position,
            scale: None,
        }
    }
}

/// A placeable, triggerable node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub icon: TaskIcon,

    /// Per-device placements. A missing class falls back to `legacy_position`.
    #[serde(default, rename = "positionsByDevice")]
    pub placements: BTreeMap<DeviceClass, DevicePlacement>,

    /// Shared position from documents that predate per-device layouts.
    #[serde(default, rename = "position", skip_serializing_if = "Option::is_none")]
    pub legacy_position: Option<Point>,

    #[serde(default = "default_scale")]
    pub scale: f32,

    #[serde(default)]
    pub actions: BTreeMap<TriggerKind, ActionList>,
}

impl Task {
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            points: 0,
            completed: false,
            icon: TaskIcon::default(),
            placements: BTreeMap::new(),
            legacy_position: None,
            scale: DEFAULT_SCALE,
            actions: BTreeMap::new(),
        }
    }

    /// Builder-style placement for one device class (clamped, not snapped).
    #[must_use]
    pub fn placed(mut self, device: DeviceClass, position: Point) -> Self {
        self.placements
            .insert(device, DevicePlacement::at(position.clamped()));
        self
    }

    #[must_use]
    pub fn with_points(mut self, points: i32) -> Self {
        self.points = points;
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: TaskIcon) -> Self {
        self.icon = icon;
        self
    }
}

// ─── Zones ───────────────────────────────────────────────────────────────

/// Zone-level display toggles for the player view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayToggles {
    pub show_scores: bool,
    pub show_order: bool,
    pub show_names: bool,
    pub show_status: bool,
}

impl Default for DisplayToggles {
    fn default() -> Self {
        Self {
            show_scores: true,
            show_order: false,
            show_names: true,
            show_status: true,
        }
    }
}

/// Ordering of the task side list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Document order.
    #[default]
    Manual,
    Title,
    /// Highest points first.
    Points,
}

/// A named canvas owning an ordered set of tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    /// Background image reference returned by the host's asset upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default)]
    pub display: DisplayToggles,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Zone {
    pub fn new(id: ZoneId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            background: None,
            display: DisplayToggles::default(),
            tasks: Vec::new(),
        }
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|t| t.id).collect()
    }

    /// Append a task. Rejects an id that is already present.
    pub fn add_task(&mut self, task: Task) -> bool {
        if self.contains(task.id) {
            log::warn!("zone {}: task {} already exists", self.id, task.id);
            return false;
        }
        self.tasks.push(task);
        true
    }

    /// Remove a task. Edges that point at it are left in place and dangle.
    pub fn remove_task(&mut self, id: TaskId) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(pos))
    }

    /// Swap in a new version of an existing task, keeping its slot in the order.
    pub fn replace_task(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }

    /// Tasks in side-list order.
    pub fn sorted_tasks(&self, mode: SortMode) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().collect();
        match mode {
            SortMode::Manual => {}
            SortMode::Title => tasks.sort_by(|a, b| {
                a.title
                    .to_lowercase()
                    .cmp(&b.title.to_lowercase())
                    .then_with(|| a.id.cmp(&b.id))
            }),
            SortMode::Points => {
                tasks.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.id.cmp(&b.id)))
            }
        }
        tasks
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// The complete authored document: every zone the operator owns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub zones: Vec<Zone>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn zone_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        self.zones.iter_mut().find(|z| z.id == id)
    }

    pub fn add_zone(&mut self, zone: Zone) -> bool {
        if self.zone(zone.id).is_some() {
            return false;
        }
        self.zones.push(zone);
        true
    }

    /// Remove a zone together with every task it owns.
    pub fn remove_zone(&mut self, id: ZoneId) -> Option<Zone> {
        let pos = self.zones.iter().position(|z| z.id == id)?;
        let zone = self.zones.remove(pos);
        log::debug!("removed zone {} ({} tasks)", zone.id, zone.tasks.len());
        Some(zone)
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Compact MessagePack snapshot (structs encoded as maps).
    pub fn to_msgpack(&self) -> Result<Vec<u8>, DocumentError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, DocumentError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
