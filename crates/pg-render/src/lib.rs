pub mod connector;
pub mod hit;
pub mod paint;

pub use connector::{ConnectorLine, ConnectorStyle, connector_lines, connector_style, rubber_band};
pub use hit::{MarkerMetrics, hit_test, hit_test_rect};
