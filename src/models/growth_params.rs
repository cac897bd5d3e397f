use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::models::{EcoUnit, ForestTypeGroup};
use crate::stand::{competition, Stand};

/// Competition factor derived from crown competition factor: zero at or
/// below full site occupancy (CCF 100), saturating at CCF 300.
pub fn competition_factor_from_ccf(ccf: f64) -> f64 {
    ((ccf - 100.0) / 200.0).clamp(0.0, 1.0)
}

/// Everything the per-tree growth equations need for one cycle, frozen
/// from start-of-cycle stand state. Plain data; copying one per tree is
/// how the cycle guarantees no tree sees another tree's in-cycle update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthParameters {
    /// Site index, feet at base age 25
    pub site_index: f64,
    /// Live basal area, sq ft per acre
    pub basal_area: f64,
    /// Basal area in live trees with strictly larger dbh, sq ft per acre
    pub pbal: f64,
    /// Relative stand density index on the 1-12 scale
    pub relsdi: f64,
    /// Crown competition factor (100 = full site occupancy)
    pub ccf: f64,
    /// Normalized crowding, 0 (open) to 1 (saturated)
    pub competition_factor: f64,
    /// Proportion of live trees with strictly smaller dbh (0-1)
    pub rank: f64,
    /// Ground slope, proportion
    pub slope: f64,
    /// Aspect in radians, clockwise from north
    pub aspect: f64,
    /// Cycle length in years
    pub time_step: u32,
    /// Ecological unit, when known
    pub ecounit: Option<EcoUnit>,
    /// Surrounding forest type group, when known
    pub forest_type: Option<ForestTypeGroup>,
}

impl Default for GrowthParameters {
    fn default() -> Self {
        GrowthParameters {
            site_index: 70.0,
            basal_area: 100.0,
            pbal: 50.0,
            relsdi: 5.0,
            ccf: 100.0,
            competition_factor: 0.0,
            rank: 0.5,
            slope: 0.05,
            aspect: 0.0,
            time_step: 5,
            ecounit: None,
            forest_type: None,
        }
    }
}

impl GrowthParameters {
    /// Build a parameter snapshot from current stand state.
    ///
    /// Stand-level metrics (basal area, RELSDI, CCF) are computed once from
    /// the live trees. Without a target tree, `rank` and `pbal` take neutral
    /// mid-distribution defaults; with one, both are computed for that tree.
    pub fn from_stand(stand: &Stand, target: Option<usize>) -> Result<Self, SimError> {
        if let Some(index) = target {
            if index >= stand.trees().len() {
                return Err(SimError::Validation(format!(
                    "target tree index {index} out of range for stand of {} trees",
                    stand.trees().len()
                )));
            }
        }

        let trees = stand.trees();
        let config = stand.config();

        let basal_area = competition::basal_area(trees);
        let relsdi = competition::relsdi(trees, config.sdi_max);
        let ccf = competition::ccf(trees, &config.crown_width);

        let (pbal, rank) = match target {
            Some(index) => {
                let subject = &trees[index];
                let n_live = trees.iter().filter(|t| t.is_live()).count();
                let smaller = trees
                    .iter()
                    .filter(|t| t.is_live() && t.dbh < subject.dbh)
                    .count();
                let rank = if n_live == 0 {
                    0.5
                } else {
                    smaller as f64 / n_live as f64
                };
                (competition::pbal(trees, subject.dbh), rank)
            }
            None => (basal_area / 2.0, 0.5),
        };

        let params = GrowthParameters {
            site_index: stand.site_index(),
            basal_area,
            pbal,
            relsdi,
            ccf,
            competition_factor: competition_factor_from_ccf(ccf),
            rank,
            slope: 0.0,
            aspect: 0.0,
            time_step: stand.time_step(),
            ecounit: stand.ecounit(),
            forest_type: stand.forest_type(),
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the snapshot for values the growth equations cannot use.
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.site_index.is_finite() || self.site_index <= 0.0 {
            return Err(SimError::Validation(format!(
                "site index must be positive, got {}",
                self.site_index
            )));
        }
        if self.time_step == 0 {
            return Err(SimError::Validation(
                "time step must be a positive number of years".to_string(),
            ));
        }
        for (name, value) in [
            ("basal_area", self.basal_area),
            ("pbal", self.pbal),
            ("relsdi", self.relsdi),
            ("ccf", self.ccf),
            ("competition_factor", self.competition_factor),
            ("rank", self.rank),
            ("slope", self.slope),
            ("aspect", self.aspect),
        ] {
            if !value.is_finite() || (name != "aspect" && value < 0.0) {
                return Err(SimError::Validation(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}
