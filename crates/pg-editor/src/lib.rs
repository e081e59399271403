pub mod coalesce;
pub mod config;
pub mod drag;
pub mod draw;
pub mod editor;
pub mod input;
pub mod prefs;
pub mod shortcuts;
pub mod sync;

pub use config::EditorConfig;
pub use editor::{HostRequest, Requests, ZoneEditor};
pub use input::{InputEvent, Modifiers};
pub use prefs::SessionPrefs;
pub use sync::{DocumentObserver, DocumentSync, ZoneMutation};
