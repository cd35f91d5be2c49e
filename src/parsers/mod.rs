pub mod html;
pub mod text;

pub use html::{SnapshotLimits, parse_snapshot};
