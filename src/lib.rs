pub mod config;
pub mod error;
pub mod growth;
pub mod models;
pub mod stand;
pub mod visualization;

pub use config::{SpeciesConfig, SpeciesLibrary};
pub use error::SimError;
pub use growth::{HdModel, HeightDiameterModel};
pub use models::{GrowthParameters, Species, Tree, TreeStatus};
pub use stand::{Stand, StandMetrics};
