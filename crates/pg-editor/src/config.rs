//! Editor configuration.
//!
//! Everything the host may tune lives here and is loaded from JSON with
//! per-field defaults, so a partial object is always valid.

use pg_core::layout::DeviceTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Cumulative pointer travel (px) before a press becomes a drag.
    pub drag_threshold_px: f32,
    /// Interval between coalesced position writes during a drag.
    pub flush_interval_ms: f64,
    /// Round committed positions to the nearest multiple of 5.
    pub snap_to_grid: bool,
    /// Marker diameter in canvas pixels at scale 1.0.
    pub task_size_px: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Factor applied per zoom-in/zoom-out step.
    pub zoom_step: f32,
    pub devices: DeviceTable,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 4.0,
            flush_interval_ms: 150.0,
            snap_to_grid: false,
            task_size_px: 48.0,
            min_zoom: 0.25,
            max_zoom: 4.0,
            zoom_step: 1.2,
            devices: DeviceTable::default(),
        }
    }
}

impl EditorConfig {
    /// Replace values a host could send that the editor cannot work with:
    /// non-finite or non-positive numbers fall back to defaults and
    /// inverted zoom bounds are swapped.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let before = self.clone();
        let positive = |v: f32, fallback: f32| if v.is_finite() && v > 0.0 { v } else { fallback };
        let mut min_zoom = positive(self.min_zoom, defaults.min_zoom);
        let mut max_zoom = positive(self.max_zoom, defaults.max_zoom);
        if min_zoom > max_zoom {
            std::mem::swap(&mut min_zoom, &mut max_zoom);
        }
        let sanitized = Self {
            drag_threshold_px: if self.drag_threshold_px.is_finite() && self.drag_threshold_px >= 0.0 {
                self.drag_threshold_px
            } else {
                defaults.drag_threshold_px
            },
            flush_interval_ms: if self.flush_interval_ms.is_finite() && self.flush_interval_ms > 0.0 {
                self.flush_interval_ms
            } else {
                defaults.flush_interval_ms
            },
            task_size_px: positive(self.task_size_px, defaults.task_size_px),
            min_zoom,
            max_zoom,
            zoom_step: positive(self.zoom_step, defaults.zoom_step),
            ..self
        };
        if sanitized != before {
            log::warn!("editor config adjusted: {sanitized:?}");
        }
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{ "snap_to_grid": true, "flush_interval_ms": 50 }"#).unwrap();
        assert!(config.snap_to_grid);
        assert_eq!(config.flush_interval_ms, 50.0);
        assert_eq!(config.drag_threshold_px, 4.0);
        assert_eq!(config.devices, DeviceTable::default());
    }

    #[test]
    fn sanitized_repairs_zoom_bounds() {
        let config: EditorConfig = serde_json::from_str(r#"{ "min_zoom": 4, "max_zoom": 0.25 }"#).unwrap();
        let config = config.sanitized();
        assert_eq!((config.min_zoom, config.max_zoom), (0.25, 4.0));

        let broken = EditorConfig {
            min_zoom: f32::NAN,
            max_zoom: f32::INFINITY,
            zoom_step: -1.0,
            flush_interval_ms: f64::NAN,
            ..EditorConfig::default()
        }
        .sanitized();
        assert_eq!(broken, EditorConfig::default());
    }

    #[test]
    fn sane_config_is_untouched() {
        let config = EditorConfig {
            snap_to_grid: true,
            min_zoom: 0.5,
            max_zoom: 2.0,
            ..EditorConfig::default()
        };
        assert_eq!(config.clone().sanitized(), config);
    }
}
