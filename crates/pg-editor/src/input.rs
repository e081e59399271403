//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and pen pointer events into a unified
//! `InputEvent` enum consumed by the editor controller. Coordinates are
//! client (screen) pixels, the same space as the viewport's bounding rect.

use pg_core::transform::ScreenPoint;

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Self::NONE
    };

    /// Platform command key (⌘ on macOS, Ctrl elsewhere).
    pub fn cmd(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A normalized input event from any pointing device or the keyboard.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed. `pointer_id` is the DOM `PointerEvent.pointerId`.
    PointerDown {
        pointer_id: i32,
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },

    PointerMove {
        pointer_id: i32,
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },

    PointerUp { pointer_id: i32, x: f32, y: f32 },

    /// The platform took the pointer away (touch cancel, lost capture).
    PointerCancel { pointer_id: i32 },

    /// Wheel / pinch-zoom at a screen position.
    Wheel {
        x: f32,
        y: f32,
        /// Zoom factor (1.0 = no change; >1 = zoom in).
        zoom: f32,
    },

    /// Keyboard shortcut. `key` is the `KeyboardEvent.key` value.
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    pub fn pointer_down(pointer_id: i32, x: f32, y: f32) -> Self {
        Self::PointerDown {
            pointer_id,
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_move(pointer_id: i32, x: f32, y: f32) -> Self {
        Self::PointerMove {
            pointer_id,
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_up(pointer_id: i32, x: f32, y: f32) -> Self {
        Self::PointerUp { pointer_id, x, y }
    }

    pub fn key(key: &str) -> Self {
        Self::Key {
            key: key.to_string(),
            modifiers: Modifiers::NONE,
        }
    }

    /// Extract position if this is a positioned pointer event.
    pub fn position(&self) -> Option<ScreenPoint> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. }
            | Self::Wheel { x, y, .. } => Some(ScreenPoint::new(*x, *y)),
            Self::PointerCancel { .. } | Self::Key { .. } => None,
        }
    }

    pub fn pointer_id(&self) -> Option<i32> {
        match self {
            Self::PointerDown { pointer_id, .. }
            | Self::PointerMove { pointer_id, .. }
            | Self::PointerUp { pointer_id, .. }
            | Self::PointerCancel { pointer_id } => Some(*pointer_id),
            Self::Wheel { .. } | Self::Key { .. } => None,
        }
    }
}
