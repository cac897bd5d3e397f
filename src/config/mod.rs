mod coefficients;
mod library;

pub use coefficients::{
    BarkRatioCoefficients, CrownRatioCoefficients, CrownWidthCoefficients,
    CurtisArneyCoefficients, DiameterGrowthCoefficients, EcoUnitAdjustments,
    ForestTypeAdjustments, MortalityCoefficients, SiteCurveCoefficients, SpeciesConfig,
    VolumeCoefficients, WykoffCoefficients, SITE_INDEX_BASE_AGE,
};
pub use library::SpeciesLibrary;
