//! WASM bridge for the zone editor: exposes the Rust controller to the
//! JavaScript editor shell.
//!
//! Compiled via `wasm-pack build --target web`. Structured results cross the
//! boundary as JSON strings; the document is handed to the host's change
//! callback as JSON after every committed mutation.

mod render2d;

use pg_core::graph::ActionGraph;
use pg_core::id::{ActionId, TaskId, ZoneId};
use pg_core::model::{DeviceClass, DisplayToggles, Document, SortMode, Task, TriggerKind};
use pg_core::transform::ScreenRect;
use pg_editor::sync::ZoneMutation;
use pg_editor::{EditorConfig, HostRequest, InputEvent, Modifiers, SessionPrefs, ZoneEditor};
use pg_render::paint::Overlay;
use serde_json::json;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The main WASM-facing editor for one zone of a document.
#[wasm_bindgen]
pub struct ZoneCanvas {
    editor: ZoneEditor,
    viewport: Option<ScreenRect>,
    dark_mode: bool,
}

#[wasm_bindgen]
impl ZoneCanvas {
    /// Open `zone_id` of a JSON document with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(document_json: &str, zone_id: &str) -> Result<ZoneCanvas, JsValue> {
        Self::with_config(document_json, zone_id, "{}", "{}")
    }

    /// Open a zone with a JSON `EditorConfig` and JSON `SessionPrefs`
    /// (missing fields take their defaults).
    pub fn with_config(
        document_json: &str,
        zone_id: &str,
        config_json: &str,
        prefs_json: &str,
    ) -> Result<ZoneCanvas, JsValue> {
        console_error_panic_hook_setup();

        let document = Document::from_json(document_json).map_err(to_js)?;
        let zone = ZoneId::intern(zone_id);
        if document.zone(zone).is_none() {
            return Err(JsValue::from_str(&format!("unknown zone `{zone_id}`")));
        }
        let config: EditorConfig = serde_json::from_str(config_json).map_err(to_js)?;
        let prefs: SessionPrefs = serde_json::from_str(prefs_json).map_err(to_js)?;

        Ok(Self {
            editor: ZoneEditor::new(document, zone, config, prefs),
            viewport: None,
            dark_mode: false,
        })
    }

    /// Register the persistence callback. Called with the document JSON
    /// after every committed change.
    pub fn on_document_change(&mut self, callback: js_sys::Function) {
        self.editor.subscribe(move |document: &Document| match document.to_json() {
            Ok(json) => {
                if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    log::warn!("document change callback failed: {err:?}");
                }
            }
            Err(err) => log::warn!("document could not be serialized: {err}"),
        });
    }

    // ─── Layout of the host element ──────────────────────────────────────

    /// Report the viewport element's bounding client rect.
    pub fn set_viewport(&mut self, left: f32, top: f32, width: f32, height: f32) {
        let rect = ScreenRect::new(left, top, width, height);
        self.viewport = Some(rect);
        self.editor.set_viewport(Some(rect));
    }

    /// The viewport element was unmounted.
    pub fn clear_viewport(&mut self) {
        self.viewport = None;
        self.editor.set_viewport(None);
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
    }

    /// Render the current frame to the Canvas2D context covering the viewport.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let (Some(viewport), Some(canvas), Some(zone)) =
            (self.viewport, self.editor.canvas_rect(), self.editor.display_zone())
        else {
            return;
        };
        let theme = if self.dark_mode {
            render2d::CanvasTheme::dark()
        } else {
            render2d::CanvasTheme::light()
        };
        let frame = render2d::Frame {
            device: self.editor.device(),
            viewport,
            canvas,
            metrics: self.editor.metrics(),
            overlay: Overlay {
                selected: self.editor.selected(),
                marked: Some(self.editor.marked()),
                rubber_band: self.editor.rubber_band(),
                marquee: self.editor.marquee(),
            },
            theme: &theme,
        };
        render2d::render_zone(ctx, &zone, &frame);
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Returns a JSON array of host requests (`capture`, `release`, `open`, `redraw`).
    #[allow(clippy::too_many_arguments)]
    pub fn pointer_down(
        &mut self,
        pointer_id: i32,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
        now_ms: f64,
    ) -> String {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.dispatch(
            InputEvent::PointerDown {
                pointer_id,
                x,
                y,
                modifiers,
            },
            now_ms,
        )
    }

    pub fn pointer_move(&mut self, pointer_id: i32, x: f32, y: f32, shift: bool, now_ms: f64) -> String {
        let modifiers = Modifiers {
            shift,
            ..Modifiers::NONE
        };
        self.dispatch(
            InputEvent::PointerMove {
                pointer_id,
                x,
                y,
                modifiers,
            },
            now_ms,
        )
    }

    pub fn pointer_up(&mut self, pointer_id: i32, x: f32, y: f32, now_ms: f64) -> String {
        self.dispatch(InputEvent::PointerUp { pointer_id, x, y }, now_ms)
    }

    pub fn pointer_cancel(&mut self, pointer_id: i32, now_ms: f64) -> String {
        self.dispatch(InputEvent::PointerCancel { pointer_id }, now_ms)
    }

    pub fn wheel(&mut self, x: f32, y: f32, zoom: f32, now_ms: f64) -> String {
        self.dispatch(InputEvent::Wheel { x, y, zoom }, now_ms)
    }

    pub fn key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool, now_ms: f64) -> String {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.dispatch(
            InputEvent::Key {
                key: key.to_string(),
                modifiers,
            },
            now_ms,
        )
    }

    /// Drive the write coalescer. Call from `requestAnimationFrame` or a timer.
    /// Returns true if buffered positions were committed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.editor.tick(now_ms)
    }

    // ─── Device / view ───────────────────────────────────────────────────

    pub fn device(&self) -> String {
        self.editor.device().to_string()
    }

    pub fn set_device(&mut self, name: &str) -> bool {
        match name.parse::<DeviceClass>() {
            Ok(device) => self.editor.set_device(device),
            Err(err) => {
                log::warn!("{err}");
                false
            }
        }
    }

    pub fn zoom(&self) -> f32 {
        self.editor.view().zoom
    }

    /// Current session preferences as JSON, for the host to keep.
    pub fn prefs_json(&self) -> String {
        serde_json::to_string(self.editor.prefs()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn set_sort_mode(&mut self, name: &str) -> bool {
        match serde_json::from_value::<SortMode>(json!(name)) {
            Ok(sort) => {
                self.editor.set_sort_mode(sort);
                true
            }
            Err(_) => {
                log::warn!("unknown sort mode `{name}`");
                false
            }
        }
    }

    /// Task ids in side-list order as a JSON array.
    pub fn sorted_task_ids(&self) -> String {
        ids_json(self.editor.sorted_task_ids())
    }

    // ─── Selection & marking ─────────────────────────────────────────────

    pub fn selected_id(&self) -> Option<String> {
        self.editor.selected().map(|id| id.as_str().to_string())
    }

    pub fn select(&mut self, task_id: Option<String>) {
        self.editor.select(task_id.as_deref().map(TaskId::intern));
    }

    pub fn toggle_mark(&mut self, task_id: &str) {
        self.editor.toggle_mark(TaskId::intern(task_id));
    }

    pub fn clear_marks(&mut self) {
        self.editor.clear_marks();
    }

    pub fn marked_ids(&self) -> String {
        let mut ids: Vec<TaskId> = self.editor.marked().iter().copied().collect();
        ids.sort();
        ids_json(ids)
    }

    // ─── Draw mode ───────────────────────────────────────────────────────

    /// Arm draw mode; `trigger` is `onOpen`, `onCorrect` or `onIncorrect`.
    pub fn arm(&mut self, source_id: &str, trigger: &str) -> bool {
        match trigger.parse::<TriggerKind>() {
            Ok(trigger) => self.editor.arm(TaskId::intern(source_id), trigger),
            Err(err) => {
                log::warn!("{err}");
                false
            }
        }
    }

    pub fn exit_draw_mode(&mut self) {
        self.editor.exit_draw_mode();
    }

    pub fn is_drawing(&self) -> bool {
        self.editor.draw_mode().is_armed()
    }

    // ─── Commands ────────────────────────────────────────────────────────

    pub fn snap_all(&mut self) -> bool {
        self.editor.snap_all()
    }

    pub fn snap_selected(&mut self) -> bool {
        self.editor.snap_selected()
    }

    /// Copy another device's layout into the current device.
    pub fn copy_layout_from(&mut self, device: &str) -> bool {
        match device.parse::<DeviceClass>() {
            Ok(from) => self.editor.copy_layout_from(from),
            Err(err) => {
                log::warn!("{err}");
                false
            }
        }
    }

    /// Add a task from its JSON form.
    pub fn add_task(&mut self, task_json: &str) -> bool {
        match serde_json::from_str::<Task>(task_json) {
            Ok(task) => self
                .editor
                .apply(ZoneMutation::AddTask {
                    task: Box::new(task),
                })
                .is_some(),
            Err(err) => {
                log::warn!("invalid task: {err}");
                false
            }
        }
    }

    /// Replace a task wholesale (title, points, icon edits from the host form).
    pub fn replace_task(&mut self, task_json: &str) -> bool {
        match serde_json::from_str::<Task>(task_json) {
            Ok(task) => self
                .editor
                .apply(ZoneMutation::ReplaceTask {
                    task: Box::new(task),
                })
                .is_some(),
            Err(err) => {
                log::warn!("invalid task: {err}");
                false
            }
        }
    }

    pub fn remove_task(&mut self, task_id: &str) -> bool {
        self.editor.remove_task(TaskId::intern(task_id))
    }

    pub fn remove_edge(&mut self, source_id: &str, action_id: &str) -> bool {
        self.editor
            .apply(ZoneMutation::RemoveEdge {
                source: TaskId::intern(source_id),
                action: ActionId::intern(action_id),
            })
            .is_some()
    }

    /// Scale a task; with `device` set, only for that device class.
    pub fn set_scale(&mut self, task_id: &str, device: Option<String>, scale: f32) -> bool {
        let device = match device.as_deref().map(str::parse::<DeviceClass>).transpose() {
            Ok(device) => device,
            Err(err) => {
                log::warn!("{err}");
                return false;
            }
        };
        self.editor
            .apply(ZoneMutation::SetScale {
                task: TaskId::intern(task_id),
                device,
                scale,
            })
            .is_some()
    }

    /// Store the URL returned by the host's asset upload; `None` clears it.
    pub fn set_background(&mut self, url: Option<String>) -> bool {
        self.editor
            .apply(ZoneMutation::SetBackground { url })
            .is_some()
    }

    pub fn set_display(&mut self, display_json: &str) -> bool {
        match serde_json::from_str::<DisplayToggles>(display_json) {
            Ok(display) => self
                .editor
                .apply(ZoneMutation::SetDisplay { display })
                .is_some(),
            Err(err) => {
                log::warn!("invalid display toggles: {err}");
                false
            }
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn document_json(&self) -> String {
        self.editor.document().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// `[{source, trigger, action}]` for every edge unlocking `task_id`.
    pub fn targets_of(&self, task_id: &str) -> String {
        let Some(zone) = self.editor.zone() else {
            return "[]".to_string();
        };
        let incoming: Vec<serde_json::Value> = ActionGraph::build(zone)
            .targets_of(TaskId::intern(task_id))
            .into_iter()
            .map(|i| {
                json!({
                    "source": i.source.as_str(),
                    "trigger": i.trigger.name(),
                    "action": i.action.as_str(),
                })
            })
            .collect();
        serde_json::Value::Array(incoming).to_string()
    }

    /// Lint diagnostics for the open zone as JSON.
    pub fn lint_json(&self) -> String {
        let diags: Vec<serde_json::Value> = self
            .editor
            .lint()
            .into_iter()
            .map(|d| {
                json!({
                    "taskId": d.task_id.as_str(),
                    "actionId": d.action_id.map(|a| a.as_str().to_string()),
                    "message": d.message,
                    "severity": format!("{:?}", d.severity).to_lowercase(),
                    "rule": d.rule,
                })
            })
            .collect();
        serde_json::Value::Array(diags).to_string()
    }
}

impl ZoneCanvas {
    fn dispatch(&mut self, event: InputEvent, now_ms: f64) -> String {
        let requests = self.editor.handle(&event, now_ms);
        requests_json(&requests)
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn ids_json(ids: Vec<TaskId>) -> String {
    let ids: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
    serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
}

fn requests_json(requests: &[HostRequest]) -> String {
    let out: Vec<serde_json::Value> = requests
        .iter()
        .map(|r| match r {
            HostRequest::CapturePointer(id) => json!({ "kind": "capture", "pointerId": id }),
            HostRequest::ReleasePointer(id) => json!({ "kind": "release", "pointerId": id }),
            HostRequest::OpenTask(id) => json!({ "kind": "open", "taskId": id.as_str() }),
            HostRequest::Redraw => json!({ "kind": "redraw" }),
        })
        .collect();
    serde_json::Value::Array(out).to_string()
}

/// Install a panic hook that logs to the browser console.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("zone editor panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"{
        "zones": [{
            "id": "bridge_zone",
            "name": "Bridge",
            "tasks": [
                { "id": "bridge_a", "title": "A", "positionsByDevice": { "mobile": { "position": { "x": 10, "y": 10 } } } },
                { "id": "bridge_b", "title": "B", "position": { "x": 60, "y": 60 } }
            ]
        }]
    }"#;

    fn canvas() -> ZoneCanvas {
        let mut c = ZoneCanvas::new(DOC, "bridge_zone").unwrap();
        c.set_viewport(0.0, 0.0, 375.0, 812.0);
        c
    }

    #[test]
    fn click_reports_open_request() {
        let mut c = canvas();
        let down = c.pointer_down(1, 37.5, 81.2, false, false, false, false, 0.0);
        assert!(down.contains(r#""kind":"capture""#));
        let up = c.pointer_up(1, 37.5, 81.2, 10.0);
        assert!(up.contains(r#""taskId":"bridge_a""#));
        assert_eq!(c.selected_id().as_deref(), Some("bridge_a"));
    }

    #[test]
    fn draw_mode_by_trigger_name() {
        let mut c = canvas();
        assert!(!c.arm("bridge_a", "onSomething"));
        assert!(c.arm("bridge_a", "onCorrect"));
        c.pointer_down(1, 225.0, 487.2, false, false, false, false, 0.0);
        assert!(c.is_drawing());
        assert!(c.targets_of("bridge_b").contains(r#""source":"bridge_a""#));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let mut c = canvas();
        assert!(!c.set_device("watch"));
        assert!(c.set_device("Tablet"));
        assert_eq!(c.device(), "tablet");
        assert!(!c.set_sort_mode("random"));
        assert!(c.set_sort_mode("points"));
    }
}
