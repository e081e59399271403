//! Draw mode: interactive edge authoring.
//!
//! The operator arms a trigger on a source task, then clicks targets. Each
//! click on another task adds one edge and the mode stays armed, so one
//! trigger can fan out to several targets without re-arming. Only an
//! explicit exit leaves the mode.

use pg_core::id::TaskId;
use pg_core::model::TriggerKind;
use pg_core::transform::ScreenPoint;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawMode {
    #[default]
    Inactive,
    Armed {
        source: TaskId,
        trigger: TriggerKind,
        /// Last pointer position, for the rubber band. `None` until the
        /// pointer moves after arming.
        cursor: Option<ScreenPoint>,
    },
}

/// What a press in draw mode asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStep {
    /// Nothing to do (background, the source itself, or not armed).
    Ignore,
    Connect {
        source: TaskId,
        trigger: TriggerKind,
        target: TaskId,
    },
}

impl DrawMode {
    pub fn arm(source: TaskId, trigger: TriggerKind) -> Self {
        log::debug!("draw mode armed: {source} {trigger}");
        DrawMode::Armed {
            source,
            trigger,
            cursor: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, DrawMode::Armed { .. })
    }

    pub fn source(&self) -> Option<(TaskId, TriggerKind)> {
        match *self {
            DrawMode::Armed { source, trigger, .. } => Some((source, trigger)),
            DrawMode::Inactive => None,
        }
    }

    pub fn cursor(&self) -> Option<ScreenPoint> {
        match *self {
            DrawMode::Armed { cursor, .. } => cursor,
            DrawMode::Inactive => None,
        }
    }

    /// Track the pointer for the rubber band.
    pub fn pointer_moved(self, at: ScreenPoint) -> Self {
        match self {
            DrawMode::Armed { source, trigger, .. } => DrawMode::Armed {
                source,
                trigger,
                cursor: Some(at),
            },
            DrawMode::Inactive => self,
        }
    }

    /// A press on `hit` (or the background). The mode itself never changes.
    pub fn pressed(&self, hit: Option<TaskId>) -> DrawStep {
        match (*self, hit) {
            (DrawMode::Armed { source, trigger, .. }, Some(target)) if target != source => {
                DrawStep::Connect {
                    source,
                    trigger,
                    target,
                }
            }
            _ => DrawStep::Ignore,
        }
    }

    pub fn exit(self) -> Self {
        if let DrawMode::Armed { source, .. } = self {
            log::debug!("draw mode exited (source {source})");
        }
        DrawMode::Inactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> TaskId {
        TaskId::intern(s)
    }

    #[test]
    fn fans_out_without_rearming() {
        let mode = DrawMode::arm(id("draw_a"), TriggerKind::OnCorrect);
        for target in ["draw_b", "draw_c"] {
            assert_eq!(
                mode.pressed(Some(id(target))),
                DrawStep::Connect {
                    source: id("draw_a"),
                    trigger: TriggerKind::OnCorrect,
                    target: id(target)
                }
            );
        }
        assert!(mode.is_armed());
    }

    #[test]
    fn source_and_background_are_no_ops() {
        let mode = DrawMode::arm(id("draw_a"), TriggerKind::OnOpen);
        assert_eq!(mode.pressed(Some(id("draw_a"))), DrawStep::Ignore);
        assert_eq!(mode.pressed(None), DrawStep::Ignore);
        assert_eq!(DrawMode::Inactive.pressed(Some(id("draw_b"))), DrawStep::Ignore);
    }

    #[test]
    fn exit_discards_cursor() {
        let mode = DrawMode::arm(id("draw_a"), TriggerKind::OnOpen).pointer_moved(ScreenPoint::new(3.0, 4.0));
        assert_eq!(mode.cursor(), Some(ScreenPoint::new(3.0, 4.0)));
        let mode = mode.exit();
        assert_eq!(mode, DrawMode::Inactive);
        assert_eq!(mode.cursor(), None);
    }
}
