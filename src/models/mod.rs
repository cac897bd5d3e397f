mod growth_params;
mod species;
mod tree;

pub use growth_params::{competition_factor_from_ccf, GrowthParameters};
pub use species::{EcoUnit, ForestTypeGroup, Species};
pub use tree::{Tree, TreeGrowth, TreeStatus};
