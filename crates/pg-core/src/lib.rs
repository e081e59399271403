pub mod error;
pub mod graph;
pub mod icon;
pub mod id;
pub mod layout;
pub mod lint;
pub mod model;
pub mod snap;
pub mod transform;

pub use error::DocumentError;
pub use graph::{ActionGraph, Connector, Incoming};
pub use icon::{IconResolver, TaskIcon};
pub use id::{ActionId, TaskId, ZoneId};
pub use layout::{DeviceTable, position_of, scale_of};
pub use lint::{LintDiagnostic, LintSeverity, lint_zone};
pub use model::*;
pub use transform::{ScreenPoint, ScreenRect, Size, ViewTransform};
