//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s.
//! The shortcut map lives in Rust so it's shared across WASM and native.

use crate::input::Modifiers;
use pg_core::model::DeviceClass;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Leave draw mode, or clear the selection when not drawing.
    Cancel,

    // ── Layout ──
    SnapAll,
    SnapSelected,
    SelectDevice(DeviceClass),

    // ── Edit ──
    DeleteTask,
    ToggleMark,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"g"`, `"Escape"`).
    /// Returns `None` if the key combo has no binding. Command-key combos
    /// belong to the host shell and are never bound here.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.cmd() || modifiers.alt {
            return None;
        }

        if modifiers.shift {
            return match key {
                "G" | "g" => Some(ShortcutAction::SnapSelected),
                // "+" usually arrives shifted.
                "+" => Some(ShortcutAction::ZoomIn),
                _ => None,
            };
        }

        match key {
            "Escape" => Some(ShortcutAction::Cancel),
            "g" | "G" => Some(ShortcutAction::SnapAll),
            "1" => Some(ShortcutAction::SelectDevice(DeviceClass::Mobile)),
            "2" => Some(ShortcutAction::SelectDevice(DeviceClass::Tablet)),
            "3" => Some(ShortcutAction::SelectDevice(DeviceClass::Desktop)),
            "Delete" | "Backspace" => Some(ShortcutAction::DeleteTask),
            "m" | "M" => Some(ShortcutAction::ToggleMark),
            "=" | "+" => Some(ShortcutAction::ZoomIn),
            "-" => Some(ShortcutAction::ZoomOut),
            "0" => Some(ShortcutAction::ZoomReset),
            _ => None,
        }
    }
}
