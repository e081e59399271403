//! Integration tests: pointer gestures → controller → committed document.
//!
//! The viewport is a 375×812 rect at the origin, so the mobile canvas maps
//! 1:1 onto it and a percentage position `p` sits at `(3.75 p.x, 8.12 p.y)`.

use pg_core::graph::ActionGraph;
use pg_core::id::{TaskId, ZoneId};
use pg_core::layout::position_of;
use pg_core::model::*;
use pg_core::transform::{ScreenPoint, ScreenRect};
use pg_editor::drag::DragSession;
use pg_editor::draw::DrawMode;
use pg_editor::{EditorConfig, HostRequest, InputEvent, Modifiers, SessionPrefs, ZoneEditor};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

const VIEWPORT: ScreenRect = ScreenRect::new(0.0, 0.0, 375.0, 812.0);

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn id(s: &str) -> TaskId {
    TaskId::intern(s)
}

fn park() -> ZoneId {
    ZoneId::intern("park")
}

fn document(a_at: Point) -> Document {
    let mut zone = Zone::new(park(), "Park");
    zone.add_task(Task::new(id("fountain"), "Fountain").placed(DeviceClass::Mobile, a_at));
    zone.add_task(Task::new(id("bench"), "Bench").placed(DeviceClass::Mobile, Point::new(50.0, 50.0)));
    zone.add_task(Task::new(id("gate"), "Gate").placed(DeviceClass::Mobile, Point::new(80.0, 80.0)));
    let mut doc = Document::new();
    doc.add_zone(zone);
    doc
}

fn screen(p: Point) -> ScreenPoint {
    ScreenPoint::new(p.x * 3.75, p.y * 8.12)
}

/// Editor over `document`, with a counter of observer notifications.
fn editor(doc: Document, config: EditorConfig) -> (ZoneEditor, Rc<RefCell<usize>>) {
    init_logs();
    let mut editor = ZoneEditor::new(doc, park(), config, SessionPrefs::new());
    editor.set_viewport(Some(VIEWPORT));
    let changes = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&changes);
    editor.subscribe(move |_: &Document| *sink.borrow_mut() += 1);
    (editor, changes)
}

fn stored(editor: &ZoneEditor, task: &str) -> Point {
    position_of(editor.zone().unwrap().task(id(task)).unwrap(), DeviceClass::Mobile)
}

fn down(at: ScreenPoint) -> InputEvent {
    InputEvent::pointer_down(1, at.x, at.y)
}

fn mv(at: ScreenPoint) -> InputEvent {
    InputEvent::pointer_move(1, at.x, at.y)
}

fn up(at: ScreenPoint) -> InputEvent {
    InputEvent::pointer_up(1, at.x, at.y)
}

// ─── Drag engine ─────────────────────────────────────────────────────────

#[test]
fn stationary_press_is_a_click_with_no_commit() {
    let (mut ed, changes) = editor(document(Point::new(10.0, 10.0)), EditorConfig::default());
    let at = screen(Point::new(10.0, 10.0));

    let requests = ed.handle(&down(at), 0.0);
    assert!(requests.contains(&HostRequest::CapturePointer(1)));
    ed.handle(&mv(ScreenPoint::new(at.x + 2.0, at.y + 1.0)), 16.0);
    ed.handle(&mv(ScreenPoint::new(at.x - 1.0, at.y + 2.0)), 32.0);
    let requests = ed.handle(&up(ScreenPoint::new(at.x + 1.0, at.y)), 48.0);

    let opened: Vec<_> = requests
        .iter()
        .filter(|r| matches!(r, HostRequest::OpenTask(_)))
        .collect();
    assert_eq!(opened, vec![&HostRequest::OpenTask(id("fountain"))]);
    assert!(requests.contains(&HostRequest::ReleasePointer(1)));
    assert_eq!(*changes.borrow(), 0);
    assert_eq!(ed.selected(), Some(id("fountain")));
    assert_eq!(stored(&ed, "fountain"), Point::new(10.0, 10.0));
}

#[test]
fn many_moves_make_one_commit_at_the_last_position() {
    let (mut ed, changes) = editor(document(Point::new(10.0, 10.0)), EditorConfig::default());
    let start = screen(Point::new(10.0, 10.0));

    ed.handle(&down(start), 0.0);
    for step in 1..=20 {
        let t = step as f32 / 20.0;
        let at = ScreenPoint::new(start.x + t * 162.5, start.y + t * 218.8);
        // Within one flush interval: nothing is written yet.
        ed.handle(&mv(at), step as f64 * 5.0);
    }
    assert_eq!(*changes.borrow(), 0);
    ed.handle(&up(ScreenPoint::new(start.x + 162.5, start.y + 218.8)), 110.0);

    assert_eq!(*changes.borrow(), 1);
    let p = stored(&ed, "fountain");
    // 162.5 / 375 = 43.33 points, 218.8 / 812 = 26.95 points.
    assert!((p.x - 53.333).abs() < 0.01, "{p:?}");
    assert!((p.y - 36.946).abs() < 0.01, "{p:?}");
    assert!(ed.drag_session().is_idle());
}

#[test]
fn snapping_drag_lands_on_multiples_of_five() {
    let config = EditorConfig {
        snap_to_grid: true,
        ..EditorConfig::default()
    };
    let (mut ed, changes) = editor(document(Point::new(10.0, 10.0)), config);

    ed.handle(&down(screen(Point::new(10.0, 10.0))), 0.0);
    ed.handle(&mv(screen(Point::new(40.0, 30.0))), 10.0);
    ed.handle(&mv(screen(Point::new(83.0, 47.0))), 20.0);
    assert_eq!(ed.position_of(id("fountain")), Some(Point::new(85.0, 45.0)));
    ed.handle(&up(screen(Point::new(83.0, 47.0))), 30.0);

    assert_eq!(*changes.borrow(), 1);
    assert_eq!(stored(&ed, "fountain"), Point::new(85.0, 45.0));
}

#[test]
fn long_drags_flush_on_the_timer_and_on_release() {
    let (mut ed, changes) = editor(document(Point::new(10.0, 10.0)), EditorConfig::default());
    let start = screen(Point::new(10.0, 10.0));

    ed.handle(&down(start), 0.0);
    ed.handle(&mv(ScreenPoint::new(start.x + 40.0, start.y)), 10.0);
    assert!(!ed.tick(100.0));
    assert!(ed.tick(160.0));
    assert_eq!(*changes.borrow(), 1);

    ed.handle(&mv(ScreenPoint::new(start.x + 80.0, start.y)), 200.0);
    ed.handle(&up(ScreenPoint::new(start.x + 80.0, start.y)), 210.0);
    assert_eq!(*changes.borrow(), 2);
    assert!(!ed.tick(1000.0));
}

#[test]
fn unmounting_mid_drag_keeps_the_last_flushed_position() {
    let (mut ed, changes) = editor(document(Point::new(10.0, 10.0)), EditorConfig::default());
    let start = screen(Point::new(10.0, 10.0));

    ed.handle(&down(start), 0.0);
    ed.handle(&mv(ScreenPoint::new(start.x + 75.0, start.y)), 10.0);
    ed.set_viewport(None);
    ed.handle(&mv(ScreenPoint::new(start.x + 150.0, start.y)), 20.0);
    ed.handle(&up(ScreenPoint::new(start.x + 150.0, start.y)), 30.0);

    assert_eq!(*changes.borrow(), 0);
    assert_eq!(stored(&ed, "fountain"), Point::new(10.0, 10.0));
    assert!(ed.drag_session().is_idle());
}

#[test]
fn background_drag_pans_the_view() {
    let (mut ed, changes) = editor(document(Point::new(10.0, 10.0)), EditorConfig::default());

    ed.handle(&down(ScreenPoint::new(200.0, 200.0)), 0.0);
    assert!(matches!(ed.drag_session(), DragSession::Panning { .. }));
    ed.handle(&mv(ScreenPoint::new(230.0, 180.0)), 10.0);
    ed.handle(&up(ScreenPoint::new(230.0, 180.0)), 20.0);

    assert_eq!((ed.view().pan_x, ed.view().pan_y), (30.0, -20.0));
    assert_eq!(*changes.borrow(), 0);
    // The canvas moved with the pan, so the task moved on screen too.
    assert_eq!(ed.canvas_rect().unwrap().left, 30.0);
}

#[test]
fn shift_marquee_marks_then_snaps_selected() {
    let (mut ed, changes) = editor(document(Point::new(10.0, 10.0)), EditorConfig::default());

    ed.handle(
        &InputEvent::PointerDown {
            pointer_id: 4,
            x: 5.0,
            y: 5.0,
            modifiers: Modifiers::SHIFT,
        },
        0.0,
    );
    ed.handle(&InputEvent::pointer_move(4, 250.0, 500.0), 10.0);
    assert!(ed.marquee().is_some());
    ed.handle(&InputEvent::pointer_up(4, 250.0, 500.0), 20.0);

    let mut marked: Vec<TaskId> = ed.marked().iter().copied().collect();
    marked.sort();
    assert_eq!(marked, vec![id("bench"), id("fountain")]);
    assert!(ed.marquee().is_none());

    let gate_before = ed.zone().unwrap().task(id("gate")).cloned();
    assert!(ed.snap_selected());
    assert_eq!(*changes.borrow(), 1);
    assert_eq!(ed.zone().unwrap().task(id("gate")).cloned(), gate_before);
}

// ─── Draw mode ───────────────────────────────────────────────────────────

#[test]
fn draw_mode_fans_one_trigger_out_to_several_targets() {
    let (mut ed, changes) = editor(document(Point::new(20.0, 20.0)), EditorConfig::default());

    assert!(ed.arm(id("fountain"), TriggerKind::OnCorrect));
    ed.handle(&mv(ScreenPoint::new(120.0, 300.0)), 0.0);
    assert!(ed.rubber_band().is_some());

    ed.handle(&down(screen(Point::new(50.0, 50.0))), 10.0);
    ed.handle(&up(screen(Point::new(50.0, 50.0))), 20.0);
    ed.handle(&down(screen(Point::new(80.0, 80.0))), 30.0);
    ed.handle(&up(screen(Point::new(80.0, 80.0))), 40.0);

    let zone = ed.zone().unwrap();
    let edges = &zone.task(id("fountain")).unwrap().actions[&TriggerKind::OnCorrect];
    let targets: Vec<TaskId> = edges.iter().map(|e| e.target).collect();
    assert_eq!(targets, vec![id("bench"), id("gate")]);
    assert_eq!(*changes.borrow(), 2);

    assert_eq!(
        ed.draw_mode().source(),
        Some((id("fountain"), TriggerKind::OnCorrect))
    );
    let graph = ActionGraph::build(zone);
    assert!(graph.is_unlock_target(id("bench")));
    assert!(graph.is_unlock_target(id("gate")));
    // No drag session was started by the clicks.
    assert!(ed.drag_session().is_idle());
}

#[test]
fn clicking_the_source_while_armed_adds_nothing() {
    let (mut ed, changes) = editor(document(Point::new(20.0, 20.0)), EditorConfig::default());
    ed.arm(id("fountain"), TriggerKind::OnOpen);
    ed.handle(&down(screen(Point::new(20.0, 20.0))), 0.0);
    ed.handle(&down(ScreenPoint::new(370.0, 5.0)), 10.0);
    assert_eq!(*changes.borrow(), 0);
    assert!(ed.draw_mode().is_armed());
}

#[test]
fn escape_leaves_draw_mode() {
    let (mut ed, _) = editor(document(Point::new(20.0, 20.0)), EditorConfig::default());
    ed.arm(id("fountain"), TriggerKind::OnIncorrect);
    ed.handle(&mv(ScreenPoint::new(100.0, 100.0)), 0.0);
    ed.handle(&InputEvent::key("Escape"), 10.0);
    assert_eq!(ed.draw_mode(), DrawMode::Inactive);
    assert!(ed.rubber_band().is_none());
}

// ─── Shortcuts & prefs ───────────────────────────────────────────────────

#[test]
fn device_shortcut_switches_layout_and_remembers_it() {
    let (mut ed, _) = editor(document(Point::new(10.0, 10.0)), EditorConfig::default());
    ed.handle(&InputEvent::key("2"), 0.0);
    assert_eq!(ed.device(), DeviceClass::Tablet);
    assert_eq!(ed.prefs().for_zone(park()).device, DeviceClass::Tablet);

    // Tablet has no stored layout: everything resolves to the center.
    assert_eq!(ed.position_of(id("bench")), Some(Point::CENTER));
}

#[test]
fn delete_removes_selected_task_and_leaves_edges_dangling() {
    let (mut ed, _) = editor(document(Point::new(10.0, 10.0)), EditorConfig::default());
    ed.arm(id("fountain"), TriggerKind::OnOpen);
    ed.handle(&down(screen(Point::new(80.0, 80.0))), 0.0);
    ed.exit_draw_mode();

    ed.select(Some(id("gate")));
    ed.handle(&InputEvent::key("Delete"), 10.0);

    let zone = ed.zone().unwrap();
    assert!(!zone.contains(id("gate")));
    assert_eq!(zone.task(id("fountain")).unwrap().actions[&TriggerKind::OnOpen].len(), 1);
    assert_eq!(ActionGraph::build(zone).dangling_count(), 1);
    assert!(ed.connectors().is_empty());
    assert_eq!(ed.selected(), None);
}

#[test]
fn inverted_zoom_bounds_from_the_host_still_zoom() {
    let config: EditorConfig = serde_json::from_str(r#"{ "min_zoom": 4, "max_zoom": 0.25 }"#).unwrap();
    let (mut ed, _) = editor(document(Point::new(10.0, 10.0)), config);

    let wheel = InputEvent::Wheel {
        x: 100.0,
        y: 100.0,
        zoom: 1.1,
    };
    for step in 0..40 {
        ed.handle(&wheel, step as f64);
    }
    assert_eq!(ed.view().zoom, 4.0);
    assert_eq!((ed.config().min_zoom, ed.config().max_zoom), (0.25, 4.0));
}
