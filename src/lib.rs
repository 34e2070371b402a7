pub mod catalog;
pub mod config;
pub mod connection_detector;
pub mod error;
pub mod report;

pub use catalog::{TableCatalog, TableNode};
pub use config::DetectorConfig;
pub use connection_detector::{
    detect_connections, match_fields, Connection, ConnectionDetector, ConnectionType, FieldMatch,
};
pub use error::{CanvasError, Result};
pub use report::{ConnectionSummary, DetectionReport};
