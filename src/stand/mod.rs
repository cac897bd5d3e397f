pub mod competition;
mod stand;

pub use stand::{Stand, StandMetrics, TOP_HEIGHT_TREE_COUNT};
