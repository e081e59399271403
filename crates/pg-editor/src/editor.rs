//! Zone editor controller.
//!
//! Owns every piece of interactive state for one open zone: the drag
//! session, draw mode, selection, marks, view transform and pending
//! writes. The host feeds it [`InputEvent`]s and a clock, and gets back
//! [`HostRequest`]s for the things only the host can do (pointer capture,
//! opening a task editor, repainting).

use crate::coalesce::{PendingWrite, WriteCoalescer};
use crate::config::EditorConfig;
use crate::drag::{DragContext, DragEffect, DragSession, PressTarget};
use crate::draw::{DrawMode, DrawStep};
use crate::input::InputEvent;
use crate::prefs::SessionPrefs;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::sync::{Applied, DocumentObserver, DocumentSync, ZoneMutation};
use pg_core::id::{TaskId, ZoneId};
use pg_core::layout::{position_of, with_position};
use pg_core::lint::{LintDiagnostic, lint_zone};
use pg_core::model::{DeviceClass, Document, Point, SortMode, TriggerKind, Zone};
use pg_core::transform::{ScreenPoint, ScreenRect, ViewTransform};
use pg_render::connector::{ConnectorLine, connector_lines, rubber_band};
use pg_render::hit::{MarkerMetrics, hit_test, hit_test_rect};
use smallvec::{SmallVec, smallvec};
use std::borrow::Cow;
use std::collections::HashSet;

/// Something the controller needs the host to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    CapturePointer(i32),
    ReleasePointer(i32),
    /// A task was clicked (not dragged): open its editor.
    OpenTask(TaskId),
    Redraw,
}

pub type Requests = SmallVec<[HostRequest; 4]>;

pub struct ZoneEditor {
    sync: DocumentSync,
    zone: ZoneId,
    config: EditorConfig,
    prefs: SessionPrefs,
    device: DeviceClass,
    view: ViewTransform,
    /// Bounding rect of the viewport element; `None` while unmounted.
    viewport: Option<ScreenRect>,
    drag: DragSession,
    draw: DrawMode,
    writes: WriteCoalescer,
    selected: Option<TaskId>,
    marked: HashSet<TaskId>,
    /// Uncommitted position of the task being dragged.
    preview: Option<(TaskId, Point)>,
    marquee: Option<ScreenRect>,
}

impl ZoneEditor {
    pub fn new(document: Document, zone: ZoneId, config: EditorConfig, prefs: SessionPrefs) -> Self {
        let config = config.sanitized();
        let device = prefs.for_zone(zone).device;
        let writes = WriteCoalescer::new(config.flush_interval_ms);
        Self {
            sync: DocumentSync::new(document),
            zone,
            config,
            prefs,
            device,
            view: ViewTransform::IDENTITY,
            viewport: None,
            drag: DragSession::Idle,
            draw: DrawMode::Inactive,
            writes,
            selected: None,
            marked: HashSet::new(),
            preview: None,
            marquee: None,
        }
    }

    pub fn subscribe(&mut self, observer: impl DocumentObserver + 'static) {
        self.sync.subscribe(observer);
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn document(&self) -> &Document {
        self.sync.document()
    }

    pub fn zone_id(&self) -> ZoneId {
        self.zone
    }

    pub fn zone(&self) -> Option<&Zone> {
        self.sync.zone(self.zone)
    }

    pub fn revision(&self) -> u64 {
        self.sync.revision()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn prefs(&self) -> &SessionPrefs {
        &self.prefs
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn drag_session(&self) -> DragSession {
        self.drag
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.draw
    }

    pub fn selected(&self) -> Option<TaskId> {
        self.selected
    }

    pub fn marked(&self) -> &HashSet<TaskId> {
        &self.marked
    }

    pub fn marquee(&self) -> Option<ScreenRect> {
        self.marquee
    }

    pub fn metrics(&self) -> MarkerMetrics {
        MarkerMetrics {
            base_px: self.config.task_size_px,
            zoom: self.view.zoom,
        }
    }

    // ─── Session / view ──────────────────────────────────────────────────

    /// Open another zone of the same document. Refused mid-drag.
    pub fn open_zone(&mut self, zone: ZoneId) -> bool {
        if !self.drag.is_idle() || self.sync.zone(zone).is_none() {
            return false;
        }
        self.flush_writes();
        self.zone = zone;
        self.device = self.prefs.for_zone(zone).device;
        self.draw = DrawMode::Inactive;
        self.selected = None;
        self.marked.clear();
        self.preview = None;
        self.marquee = None;
        log::debug!("opened zone {zone} on {}", self.device);
        true
    }

    /// Switch the device class being edited. Refused mid-drag.
    pub fn set_device(&mut self, device: DeviceClass) -> bool {
        if !self.drag.is_idle() {
            log::debug!("device switch to {device} ignored during a drag");
            return false;
        }
        self.flush_writes();
        self.device = device;
        self.prefs.set_device(self.zone, device);
        true
    }

    pub fn sort_mode(&self) -> SortMode {
        self.prefs.for_zone(self.zone).sort
    }

    pub fn set_sort_mode(&mut self, sort: SortMode) {
        self.prefs.set_sort(self.zone, sort);
    }

    /// Task ids in side-list order for the current sort mode.
    pub fn sorted_task_ids(&self) -> Vec<TaskId> {
        let sort = self.sort_mode();
        self.zone()
            .map(|z| z.sorted_tasks(sort).into_iter().map(|t| t.id).collect())
            .unwrap_or_default()
    }

    /// Report the viewport element's bounding rect. `None` = unmounted.
    pub fn set_viewport(&mut self, viewport: Option<ScreenRect>) {
        self.viewport = viewport;
    }

    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
    }

    /// On-screen rectangle of the logical canvas for the current device.
    pub fn canvas_rect(&self) -> Option<ScreenRect> {
        let viewport = self.viewport.filter(|v| !v.is_degenerate())?;
        let size = self.config.devices.canvas_size(self.device, viewport.size());
        Some(self.view.canvas_rect(viewport.origin(), size)).filter(|r| !r.is_degenerate())
    }

    fn zoom_by(&mut self, factor: f32, anchor: Option<ScreenPoint>) {
        let anchor = match (anchor, self.viewport) {
            (Some(at), Some(v)) => ScreenPoint::new(at.x - v.left, at.y - v.top),
            (None, Some(v)) => ScreenPoint::new(v.width / 2.0, v.height / 2.0),
            (_, None) => ScreenPoint::default(),
        };
        self.view = self
            .view
            .zoom_at(anchor, factor, self.config.min_zoom, self.config.max_zoom);
        log::trace!("zoom → {}", self.view.zoom);
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn handle(&mut self, event: &InputEvent, now_ms: f64) -> Requests {
        match event {
            InputEvent::Key { key, modifiers } => match ShortcutMap::resolve(key, *modifiers) {
                Some(action) => self.run_shortcut(action),
                None => Requests::new(),
            },
            InputEvent::Wheel { x, y, zoom } => {
                if !self.drag.is_idle() {
                    return Requests::new();
                }
                self.zoom_by(*zoom, Some(ScreenPoint::new(*x, *y)));
                redraw()
            }
            _ if self.draw.is_armed() => self.handle_draw(event),
            _ => self.handle_drag(event, now_ms),
        }
    }

    fn handle_draw(&mut self, event: &InputEvent) -> Requests {
        match *event {
            InputEvent::PointerMove { x, y, .. } => {
                self.draw = self.draw.pointer_moved(ScreenPoint::new(x, y));
                redraw()
            }
            InputEvent::PointerDown { x, y, .. } => {
                let hit = self.hit(ScreenPoint::new(x, y));
                if let DrawStep::Connect {
                    source,
                    trigger,
                    target,
                } = self.draw.pressed(hit)
                {
                    self.sync.apply(
                        self.zone,
                        ZoneMutation::AddEdge {
                            source,
                            trigger,
                            target,
                        },
                    );
                    return redraw();
                }
                Requests::new()
            }
            _ => Requests::new(),
        }
    }

    fn handle_drag(&mut self, event: &InputEvent, now_ms: f64) -> Requests {
        let ctx = self.drag_context();
        let (next, effects) = match *event {
            InputEvent::PointerDown {
                pointer_id,
                x,
                y,
                modifiers,
            } => {
                let at = ScreenPoint::new(x, y);
                let target = match self.hit(at).and_then(|id| self.zone()?.task(id)) {
                    Some(task) => PressTarget::Task {
                        id: task.id,
                        position: position_of(task, self.device),
                    },
                    None => PressTarget::Background,
                };
                self.drag.press(pointer_id, at, target, modifiers, &ctx)
            }
            InputEvent::PointerMove { pointer_id, x, y, .. } => {
                self.drag.motion(pointer_id, ScreenPoint::new(x, y), &ctx)
            }
            InputEvent::PointerUp { pointer_id, x, y } => {
                self.drag.release(pointer_id, ScreenPoint::new(x, y), &ctx)
            }
            InputEvent::PointerCancel { pointer_id } => self.drag.cancel(pointer_id, &ctx),
            InputEvent::Wheel { .. } | InputEvent::Key { .. } => return Requests::new(),
        };
        self.drag = next;
        self.run_effects(effects, now_ms)
    }

    fn drag_context(&self) -> DragContext {
        DragContext {
            canvas: self.canvas_rect(),
            view: self.view,
            threshold_px: self.config.drag_threshold_px,
            snap: self.config.snap_to_grid,
        }
    }

    fn run_effects(&mut self, effects: impl IntoIterator<Item = DragEffect>, now_ms: f64) -> Requests {
        let mut requests = Requests::new();
        for effect in effects {
            match effect {
                DragEffect::CapturePointer(id) => requests.push(HostRequest::CapturePointer(id)),
                DragEffect::ReleasePointer(id) => requests.push(HostRequest::ReleasePointer(id)),
                DragEffect::SetView(view) => {
                    self.view = view;
                    push_redraw(&mut requests);
                }
                DragEffect::Preview { task, position } => {
                    self.preview = Some((task, position));
                    self.writes.push(task, self.device, position, now_ms);
                    push_redraw(&mut requests);
                }
                DragEffect::Commit { task, position } => {
                    self.writes.push(task, self.device, position, now_ms);
                    self.flush_writes();
                    self.preview = None;
                    push_redraw(&mut requests);
                }
                DragEffect::Discard { task } => {
                    self.writes.discard(task);
                    self.preview = None;
                    push_redraw(&mut requests);
                }
                DragEffect::Click(task) => {
                    self.selected = Some(task);
                    requests.push(HostRequest::OpenTask(task));
                    push_redraw(&mut requests);
                }
                DragEffect::BackgroundClick => {
                    self.selected = None;
                    push_redraw(&mut requests);
                }
                DragEffect::Marquee(rect) => {
                    self.marquee = Some(rect);
                    push_redraw(&mut requests);
                }
                DragEffect::Mark(rect) => {
                    self.marquee = None;
                    let hits = match (self.zone(), self.canvas_rect()) {
                        (Some(zone), Some(canvas)) => hit_test_rect(zone, self.device, canvas, rect),
                        _ => Vec::new(),
                    };
                    log::debug!("marquee marked {} task(s)", hits.len());
                    self.marked.extend(hits);
                    push_redraw(&mut requests);
                }
            }
        }
        requests
    }

    fn hit(&self, at: ScreenPoint) -> Option<TaskId> {
        hit_test(self.zone()?, self.device, self.canvas_rect()?, self.metrics(), at)
    }

    /// Advance the write clock. Returns true if buffered positions were committed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let due = self.writes.tick(now_ms);
        let any = !due.is_empty();
        self.commit_writes(due);
        any
    }

    fn flush_writes(&mut self) {
        let writes = self.writes.flush();
        self.commit_writes(writes);
    }

    fn commit_writes(&mut self, writes: Vec<PendingWrite>) {
        for write in writes {
            self.sync.apply(
                self.zone,
                ZoneMutation::SetPosition {
                    task: write.task,
                    device: write.device,
                    position: write.position,
                    snap: self.config.snap_to_grid,
                },
            );
        }
    }

    // ─── Shortcuts ───────────────────────────────────────────────────────

    fn run_shortcut(&mut self, action: ShortcutAction) -> Requests {
        log::trace!("shortcut {action:?}");
        match action {
            ShortcutAction::Cancel => {
                if self.draw.is_armed() {
                    self.exit_draw_mode();
                } else {
                    self.selected = None;
                }
            }
            ShortcutAction::SnapAll => {
                self.snap_all();
            }
            ShortcutAction::SnapSelected => {
                self.snap_selected();
            }
            ShortcutAction::SelectDevice(device) => {
                self.set_device(device);
            }
            ShortcutAction::DeleteTask => {
                if let Some(id) = self.selected {
                    self.remove_task(id);
                }
            }
            ShortcutAction::ToggleMark => {
                if let Some(id) = self.selected {
                    self.toggle_mark(id);
                }
            }
            ShortcutAction::ZoomIn => self.zoom_by(self.config.zoom_step, None),
            ShortcutAction::ZoomOut => self.zoom_by(1.0 / self.config.zoom_step, None),
            ShortcutAction::ZoomReset => self.view = ViewTransform::IDENTITY,
        }
        redraw()
    }

    // ─── Selection & marking ─────────────────────────────────────────────

    pub fn select(&mut self, task: Option<TaskId>) {
        self.selected = task.filter(|id| self.zone().is_some_and(|z| z.contains(*id)));
    }

    pub fn toggle_mark(&mut self, task: TaskId) {
        if !self.marked.remove(&task) && self.zone().is_some_and(|z| z.contains(task)) {
            self.marked.insert(task);
        }
    }

    pub fn clear_marks(&mut self) {
        self.marked.clear();
    }

    // ─── Draw mode ───────────────────────────────────────────────────────

    /// Arm draw mode on `source`. Refused mid-drag or for an unknown task.
    pub fn arm(&mut self, source: TaskId, trigger: TriggerKind) -> bool {
        if !self.drag.is_idle() || !self.zone().is_some_and(|z| z.contains(source)) {
            return false;
        }
        self.draw = DrawMode::arm(source, trigger);
        true
    }

    pub fn exit_draw_mode(&mut self) {
        self.draw = self.draw.exit();
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Apply any zone mutation to the open zone.
    pub fn apply(&mut self, mutation: ZoneMutation) -> Option<Applied> {
        if let ZoneMutation::RemoveTask { id } = mutation {
            return self.remove_task(id).then_some(Applied {
                revision: self.revision(),
                action: None,
            });
        }
        self.sync.apply(self.zone, mutation)
    }

    pub fn snap_all(&mut self) -> bool {
        self.flush_writes();
        let device = self.device;
        self.sync
            .apply(self.zone, ZoneMutation::SnapAll { device })
            .is_some()
    }

    /// Snap the marked subset. Needs at least two marked tasks.
    pub fn snap_selected(&mut self) -> bool {
        if self.marked.len() < 2 {
            log::debug!("snap-selected needs two or more marked tasks");
            return false;
        }
        self.flush_writes();
        let mut tasks: Vec<TaskId> = self.marked.iter().copied().collect();
        tasks.sort();
        let device = self.device;
        self.sync
            .apply(self.zone, ZoneMutation::SnapSelected { device, tasks })
            .is_some()
    }

    /// Copy the `from` layout into the current device class.
    pub fn copy_layout_from(&mut self, from: DeviceClass) -> bool {
        self.flush_writes();
        let to = self.device;
        self.sync
            .apply(self.zone, ZoneMutation::CopyDeviceLayout { from, to })
            .is_some()
    }

    pub fn remove_task(&mut self, id: TaskId) -> bool {
        if self.drag.moving_task() == Some(id) {
            return false;
        }
        self.writes.discard(id);
        let removed = self
            .sync
            .apply(self.zone, ZoneMutation::RemoveTask { id })
            .is_some();
        if removed {
            self.marked.remove(&id);
            if self.selected == Some(id) {
                self.selected = None;
            }
            if self.draw.source().is_some_and(|(source, _)| source == id) {
                self.exit_draw_mode();
            }
        }
        removed
    }

    // ─── Rendering views ─────────────────────────────────────────────────

    /// The open zone as it should look right now, with any drag preview.
    pub fn display_zone(&self) -> Option<Cow<'_, Zone>> {
        let zone = self.zone()?;
        let Some((id, position)) = self.preview else {
            return Some(Cow::Borrowed(zone));
        };
        let Some(task) = zone.task(id) else {
            return Some(Cow::Borrowed(zone));
        };
        let mut shown = zone.clone();
        shown.replace_task(with_position(task, self.device, position, false));
        Some(Cow::Owned(shown))
    }

    /// Effective position of `task` on the current device, preview-aware.
    pub fn position_of(&self, task: TaskId) -> Option<Point> {
        match self.preview {
            Some((id, position)) if id == task => Some(position),
            _ => self.zone()?.task(task).map(|t| position_of(t, self.device)),
        }
    }

    pub fn connectors(&self) -> Vec<ConnectorLine> {
        match (self.display_zone(), self.canvas_rect()) {
            (Some(zone), Some(canvas)) => connector_lines(&zone, self.device, canvas, self.metrics()),
            _ => Vec::new(),
        }
    }

    /// Rubber band line while draw mode is armed and the pointer has moved.
    pub fn rubber_band(&self) -> Option<(ScreenPoint, ScreenPoint, TriggerKind)> {
        let (source, trigger) = self.draw.source()?;
        let cursor = self.draw.cursor()?;
        let (from, to) = rubber_band(
            self.zone()?,
            self.device,
            self.canvas_rect()?,
            self.metrics(),
            source,
            cursor,
        )?;
        Some((from, to, trigger))
    }

    pub fn lint(&self) -> Vec<LintDiagnostic> {
        self.zone().map(lint_zone).unwrap_or_default()
    }
}

fn redraw() -> Requests {
    smallvec![HostRequest::Redraw]
}

fn push_redraw(requests: &mut Requests) {
    if !requests.contains(&HostRequest::Redraw) {
        requests.push(HostRequest::Redraw);
    }
}
