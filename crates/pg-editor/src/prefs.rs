//! Per-session editor preferences.
//!
//! The host hands a `SessionPrefs` to the controller at construction and
//! reads it back when the session ends; nothing here touches global storage.

use pg_core::id::ZoneId;
use pg_core::model::{DeviceClass, SortMode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Remembered choices for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZonePrefs {
    pub device: DeviceClass,
    pub sort: SortMode,
}

/// Preferences for every zone touched in this session, keyed by zone id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionPrefs {
    zones: HashMap<ZoneId, ZonePrefs>,
}

impl SessionPrefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored preferences for `zone`, or the defaults for a zone never opened.
    pub fn for_zone(&self, zone: ZoneId) -> ZonePrefs {
        self.zones.get(&zone).copied().unwrap_or_default()
    }

    pub fn set_device(&mut self, zone: ZoneId, device: DeviceClass) {
        self.zones.entry(zone).or_default().device = device;
    }

    pub fn set_sort(&mut self, zone: ZoneId, sort: SortMode) {
        self.zones.entry(zone).or_default().sort = sort;
    }
}
