//! Drag interaction engine.
//!
//! A pointer gesture on the canvas is one [`DragSession`]: panning the view
//! (press on background), moving a task (press on a marker), or marking by
//! marquee (Shift + press on background). Transitions are pure functions
//! `(session, event, context) -> (session, effects)`; the controller owns
//! the session and carries out the effects.
//!
//! Only one pointer drives a session. Events from any other `pointer_id`
//! are ignored until the session ends.

use crate::input::Modifiers;
use pg_core::id::TaskId;
use pg_core::layout::normalize_position;
use pg_core::model::Point;
use pg_core::transform::{ScreenPoint, ScreenRect, ViewTransform, delta_to_percent};
use smallvec::{SmallVec, smallvec};

/// What the pointer landed on when the gesture started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressTarget {
    Background,
    /// A task marker, with the task's effective position at press time.
    Task { id: TaskId, position: Point },
}

/// Read-only inputs every transition needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragContext {
    /// On-screen canvas rectangle; `None` while the canvas is unmounted.
    pub canvas: Option<ScreenRect>,
    pub view: ViewTransform,
    pub threshold_px: f32,
    pub snap: bool,
}

impl DragContext {
    fn mounted_canvas(&self) -> Option<ScreenRect> {
        self.canvas.filter(|c| !c.is_degenerate())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragSession {
    #[default]
    Idle,
    Panning {
        pointer_id: i32,
        origin: ScreenPoint,
        original_view: ViewTransform,
        moved: bool,
    },
    MovingTask {
        pointer_id: i32,
        origin: ScreenPoint,
        task: TaskId,
        original: Point,
        /// Last pointer-derived position, clamped but not snapped.
        current: Point,
        moved: bool,
    },
    Marking {
        pointer_id: i32,
        origin: ScreenPoint,
        current: ScreenPoint,
        moved: bool,
    },
}

/// Side effects requested by a transition, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEffect {
    CapturePointer(i32),
    ReleasePointer(i32),
    SetView(ViewTransform),
    /// Show `task` at `position` without committing.
    Preview { task: TaskId, position: Point },
    /// Final position of a moved task.
    Commit { task: TaskId, position: Point },
    /// Drop anything not yet flushed for `task`; the canvas went away.
    Discard { task: TaskId },
    /// Press and release on a task without passing the threshold.
    Click(TaskId),
    BackgroundClick,
    /// Live marquee rectangle while marking.
    Marquee(ScreenRect),
    /// Finished marquee.
    Mark(ScreenRect),
}

pub type Effects = SmallVec<[DragEffect; 4]>;

impl DragSession {
    pub fn is_idle(&self) -> bool {
        matches!(self, DragSession::Idle)
    }

    pub fn pointer_id(&self) -> Option<i32> {
        match *self {
            DragSession::Idle => None,
            DragSession::Panning { pointer_id, .. }
            | DragSession::MovingTask { pointer_id, .. }
            | DragSession::Marking { pointer_id, .. } => Some(pointer_id),
        }
    }

    /// The task being moved, if any.
    pub fn moving_task(&self) -> Option<TaskId> {
        match *self {
            DragSession::MovingTask { task, .. } => Some(task),
            _ => None,
        }
    }

    /// Pointer pressed. A session still open (its release was lost) is
    /// finished first, exactly as a release would finish it.
    pub fn press(
        self,
        pointer_id: i32,
        at: ScreenPoint,
        target: PressTarget,
        modifiers: Modifiers,
        ctx: &DragContext,
    ) -> (DragSession, Effects) {
        let mut effects = Effects::new();
        if !self.is_idle() {
            log::debug!("pointer {pointer_id} pressed during an open session; finishing it");
            let (_, stale) = self.finish(ctx, true);
            effects.extend(stale);
        }

        if ctx.mounted_canvas().is_none() {
            log::warn!("pointer {pointer_id} pressed while the canvas is unmounted; ignored");
            return (DragSession::Idle, effects);
        }

        let next = match target {
            PressTarget::Task { id, position } => DragSession::MovingTask {
                pointer_id,
                origin: at,
                task: id,
                original: position,
                current: position,
                moved: false,
            },
            PressTarget::Background if modifiers.shift => DragSession::Marking {
                pointer_id,
                origin: at,
                current: at,
                moved: false,
            },
            PressTarget::Background => DragSession::Panning {
                pointer_id,
                origin: at,
                original_view: ctx.view,
                moved: false,
            },
        };
        effects.push(DragEffect::CapturePointer(pointer_id));
        (next, effects)
    }

    /// Pointer moved.
    pub fn motion(self, pointer_id: i32, at: ScreenPoint, ctx: &DragContext) -> (DragSession, Effects) {
        if self.pointer_id() != Some(pointer_id) {
            return (self, Effects::new());
        }
        let past = |origin: ScreenPoint| origin.distance_to(at) > ctx.threshold_px;

        match self {
            DragSession::Idle => (self, Effects::new()),

            DragSession::Panning {
                origin,
                original_view,
                moved,
                ..
            } => {
                let moved = moved || past(origin);
                let next = DragSession::Panning {
                    pointer_id,
                    origin,
                    original_view,
                    moved,
                };
                if !moved {
                    return (next, Effects::new());
                }
                let view = original_view.with_pan(
                    original_view.pan_x + (at.x - origin.x),
                    original_view.pan_y + (at.y - origin.y),
                );
                log::trace!("pan → ({}, {})", view.pan_x, view.pan_y);
                (next, smallvec![DragEffect::SetView(view)])
            }

            DragSession::MovingTask {
                origin,
                task,
                original,
                current,
                moved,
                ..
            } => {
                let Some((dx, dy)) = ctx
                    .mounted_canvas()
                    .and_then(|canvas| delta_to_percent(at.x - origin.x, at.y - origin.y, canvas))
                else {
                    log::warn!("move of {task} dropped: canvas unmounted");
                    return (self, Effects::new());
                };
                let moved = moved || past(origin);
                let current = if moved {
                    Point::new(original.x + dx, original.y + dy).clamped()
                } else {
                    current
                };
                let next = DragSession::MovingTask {
                    pointer_id,
                    origin,
                    task,
                    original,
                    current,
                    moved,
                };
                if !moved {
                    return (next, Effects::new());
                }
                let position = normalize_position(current, ctx.snap);
                log::trace!("preview {task} at ({}, {})", position.x, position.y);
                (next, smallvec![DragEffect::Preview { task, position }])
            }

            DragSession::Marking { origin, moved, .. } => {
                let moved = moved || past(origin);
                let next = DragSession::Marking {
                    pointer_id,
                    origin,
                    current: at,
                    moved,
                };
                if !moved {
                    return (next, Effects::new());
                }
                (next, smallvec![DragEffect::Marquee(rect_between(origin, at))])
            }
        }
    }

    /// Pointer released at `at`.
    pub fn release(self, pointer_id: i32, at: ScreenPoint, ctx: &DragContext) -> (DragSession, Effects) {
        if self.pointer_id() != Some(pointer_id) {
            return (self, Effects::new());
        }
        let (session, mut effects) = self.motion(pointer_id, at, ctx);
        // Superseded by Commit / Mark.
        effects.retain(|e| !matches!(e, DragEffect::Preview { .. } | DragEffect::Marquee(_)));
        let (idle, done) = session.finish(ctx, true);
        effects.extend(done);
        (idle, effects)
    }

    /// Pointer cancelled by the platform. Finishes like a release but never
    /// produces a click.
    pub fn cancel(self, pointer_id: i32, ctx: &DragContext) -> (DragSession, Effects) {
        if self.pointer_id() != Some(pointer_id) {
            return (self, Effects::new());
        }
        self.finish(ctx, false)
    }

    fn finish(self, ctx: &DragContext, clicks: bool) -> (DragSession, Effects) {
        let mut effects = Effects::new();
        match self {
            DragSession::Idle => return (self, effects),

            DragSession::Panning {
                pointer_id, moved, ..
            } => {
                effects.push(DragEffect::ReleasePointer(pointer_id));
                if !moved && clicks {
                    effects.push(DragEffect::BackgroundClick);
                }
            }

            DragSession::MovingTask {
                pointer_id,
                task,
                current,
                moved,
                ..
            } => {
                effects.push(DragEffect::ReleasePointer(pointer_id));
                if !moved {
                    if clicks {
                        effects.push(DragEffect::Click(task));
                    }
                } else if ctx.mounted_canvas().is_none() {
                    log::warn!("drag of {task} ended on an unmounted canvas; discarded");
                    effects.push(DragEffect::Discard { task });
                } else {
                    let position = normalize_position(current, ctx.snap);
                    log::debug!("commit {task} at ({}, {})", position.x, position.y);
                    effects.push(DragEffect::Commit { task, position });
                }
            }

            DragSession::Marking {
                pointer_id,
                origin,
                current,
                moved,
            } => {
                effects.push(DragEffect::ReleasePointer(pointer_id));
                if moved {
                    effects.push(DragEffect::Mark(rect_between(origin, current)));
                } else if clicks {
                    effects.push(DragEffect::BackgroundClick);
                }
            }
        }
        (DragSession::Idle, effects)
    }
}

/// Normalized rectangle spanned by two corners.
pub fn rect_between(a: ScreenPoint, b: ScreenPoint) -> ScreenRect {
    ScreenRect::new(a.x.min(b.x), a.y.min(b.y), (b.x - a.x).abs(), (b.y - a.y).abs())
}
