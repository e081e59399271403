//! Closed icon table for task markers.
//!
//! Icon keys arrive as strings from stored documents. They are parsed once,
//! at load time, into [`TaskIcon`]; an unknown key is a load error, never a
//! blank marker at render time.

use crate::error::DocumentError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskIcon {
    #[default]
    Pin,
    Star,
    Flag,
    Key,
    Lock,
    Question,
    Camera,
    Map,
    Trophy,
    Puzzle,
    Music,
    Book,
}

impl TaskIcon {
    pub const ALL: [TaskIcon; 12] = [
        TaskIcon::Pin,
        TaskIcon::Star,
        TaskIcon::Flag,
        TaskIcon::Key,
        TaskIcon::Lock,
        TaskIcon::Question,
        TaskIcon::Camera,
        TaskIcon::Map,
        TaskIcon::Trophy,
        TaskIcon::Puzzle,
        TaskIcon::Music,
        TaskIcon::Book,
    ];

    /// Stable key used in stored documents.
    pub const fn key(self) -> &'static str {
        match self {
            TaskIcon::Pin => "pin",
            TaskIcon::Star => "star",
            TaskIcon::Flag => "flag",
            TaskIcon::Key => "key",
            TaskIcon::Lock => "lock",
            TaskIcon::Question => "question",
            TaskIcon::Camera => "camera",
            TaskIcon::Map => "map",
            TaskIcon::Trophy => "trophy",
            TaskIcon::Puzzle => "puzzle",
            TaskIcon::Music => "music",
            TaskIcon::Book => "book",
        }
    }
}

impl FromStr for TaskIcon {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskIcon::ALL
            .into_iter()
            .find(|icon| icon.key() == s)
            .ok_or_else(|| DocumentError::UnknownIcon(s.to_string()))
    }
}

impl fmt::Display for TaskIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for TaskIcon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for TaskIcon {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Maps an icon to whatever the host renders (a glyph, an SVG handle, a
/// component). Provided by the editor shell.
pub trait IconResolver {
    type Renderable;

    fn resolve(&self, icon: TaskIcon) -> Self::Renderable;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_icon_parses_from_its_key() {
        for icon in TaskIcon::ALL {
            assert_eq!(icon.key().parse::<TaskIcon>().unwrap(), icon);
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = "dragon".parse::<TaskIcon>().unwrap_err();
        assert!(matches!(err, DocumentError::UnknownIcon(ref k) if k == "dragon"));
    }

    #[test]
    fn unknown_key_fails_deserialization() {
        let result: Result<TaskIcon, _> = serde_json::from_str("\"dragon\"");
        assert!(result.is_err());
    }
}
