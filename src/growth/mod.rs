mod engine;
mod height_diameter;

pub use engine::grow_tree;
pub use height_diameter::{
    HdCoefficients, HdModel, HeightDiameterModel, ModelComparison, BREAST_HEIGHT_FT,
    MAX_SOLVER_DBH,
};
