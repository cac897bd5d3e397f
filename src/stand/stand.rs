use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{SpeciesConfig, SpeciesLibrary};
use crate::error::SimError;
use crate::growth::{grow_tree, HeightDiameterModel};
use crate::models::{
    competition_factor_from_ccf, EcoUnit, ForestTypeGroup, GrowthParameters, Species, Tree,
    TreeGrowth, TreeStatus,
};

use super::competition;

/// Trees whose heights define top height, taken largest dbh first.
pub const TOP_HEIGHT_TREE_COUNT: usize = 40;

/// Planting densities above this are outside the fitted range.
const MAX_PLANTING_TPA: u32 = 5_000;

const MIN_SITE_INDEX: f64 = 30.0;
const MAX_SITE_INDEX: f64 = 120.0;

/// Planted seedlings span this dbh band, smallest first.
const PLANTED_DBH_MIN: f64 = 0.4;
const PLANTED_DBH_SPREAD: f64 = 0.2;
const PLANTED_CROWN_RATIO: f64 = 0.9;

const DEFAULT_TIME_STEP: u32 = 5;
const MAX_TIME_STEP: u32 = 10;

/// Stand-level summary of the live trees at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandMetrics {
    /// Stand age in years since planting.
    pub age: u32,
    /// Live trees per acre.
    pub tpa: f64,
    /// Live basal area, square feet per acre.
    pub basal_area: f64,
    /// Quadratic mean diameter, inches.
    pub qmd: f64,
    /// Arithmetic mean dbh of live trees, inches.
    pub mean_dbh: f64,
    /// Arithmetic mean total height of live trees, feet.
    pub mean_height: f64,
    /// Mean height of the live trees with the largest diameters, feet.
    pub top_height: f64,
    /// Total stem cubic volume, cubic feet per acre.
    pub volume: f64,
}

/// A one-acre even-aged single-species stand.
///
/// The tree list is the state; everything else is configuration. Each
/// growth cycle runs in two phases so that every tree's target is computed
/// against the same frozen start-of-cycle state: first all parameter
/// snapshots and targets, then all mutations. Mortality marks trees dead
/// in place, so the tree list never shrinks and dead stems stay visible
/// to callers.
#[derive(Debug, Clone)]
pub struct Stand {
    species: Species,
    config: SpeciesConfig,
    site_index: f64,
    age: u32,
    time_step: u32,
    ecounit: Option<EcoUnit>,
    forest_type: Option<ForestTypeGroup>,
    trees: Vec<Tree>,
    history: Vec<StandMetrics>,
}

impl Stand {
    /// Create a freshly planted stand of `trees_per_acre` seedlings.
    ///
    /// Seedlings are spread over a narrow dbh band rather than planted
    /// identical, so diameter rank and PBAL are defined from the first
    /// cycle. Heights start on the species height-diameter curve.
    pub fn initialize_planted(
        trees_per_acre: u32,
        site_index: f64,
        species_code: &str,
        library: &SpeciesLibrary,
    ) -> Result<Self, SimError> {
        let (species, config) = library.lookup(species_code)?;
        if trees_per_acre == 0 {
            return Err(SimError::Validation(
                "planting density must be at least one tree per acre".to_string(),
            ));
        }
        if trees_per_acre > MAX_PLANTING_TPA {
            return Err(SimError::Validation(format!(
                "planting density {trees_per_acre} exceeds {MAX_PLANTING_TPA} trees per acre"
            )));
        }
        if !(MIN_SITE_INDEX..=MAX_SITE_INDEX).contains(&site_index) {
            return Err(SimError::Validation(format!(
                "site index {site_index} ft outside the supported range \
                 {MIN_SITE_INDEX}-{MAX_SITE_INDEX} ft"
            )));
        }

        let hd = HeightDiameterModel::new(species, config);
        let count = trees_per_acre as usize;
        let mut trees = Vec::with_capacity(count);
        for i in 0..count {
            let dbh = PLANTED_DBH_MIN + PLANTED_DBH_SPREAD * (i as f64 + 0.5) / count as f64;
            trees.push(Tree {
                dbh,
                height: hd.curtis_arney_height(dbh),
                crown_ratio: PLANTED_CROWN_RATIO,
                age: 0,
                status: TreeStatus::Live,
            });
        }

        let mut stand = Stand {
            species,
            config: config.clone(),
            site_index,
            age: 0,
            time_step: DEFAULT_TIME_STEP,
            ecounit: None,
            forest_type: None,
            trees,
            history: Vec::new(),
        };
        stand.history.push(stand.get_metrics());
        info!(
            species = %stand.species,
            trees_per_acre,
            site_index,
            "initialized planted stand"
        );
        Ok(stand)
    }

    /// Replace the default 5-year growth cycle.
    pub fn with_time_step(mut self, step: u32) -> Result<Self, SimError> {
        if step == 0 || step > MAX_TIME_STEP {
            return Err(SimError::Validation(format!(
                "cycle length must be 1-{MAX_TIME_STEP} years, got {step}"
            )));
        }
        self.time_step = step;
        Ok(self)
    }

    /// Set the ecological unit the stand sits in.
    pub fn with_ecounit(mut self, unit: Option<EcoUnit>) -> Self {
        self.ecounit = unit;
        self
    }

    /// Set the surrounding forest type group.
    pub fn with_forest_type(mut self, group: Option<ForestTypeGroup>) -> Self {
        self.forest_type = group;
        self
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn config(&self) -> &SpeciesConfig {
        &self.config
    }

    pub fn site_index(&self) -> f64 {
        self.site_index
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn time_step(&self) -> u32 {
        self.time_step
    }

    pub fn ecounit(&self) -> Option<EcoUnit> {
        self.ecounit
    }

    pub fn forest_type(&self) -> Option<ForestTypeGroup> {
        self.forest_type
    }

    /// Every tree ever planted, dead stems included.
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn trees_mut(&mut self) -> &mut [Tree] {
        &mut self.trees
    }

    pub fn live_count(&self) -> usize {
        self.trees.iter().filter(|t| t.is_live()).count()
    }

    /// Project the stand forward by `years`.
    ///
    /// The projection length must be a whole number of growth cycles.
    pub fn grow(&mut self, years: u32) -> Result<(), SimError> {
        if years == 0 {
            return Err(SimError::Validation(
                "projection length must be at least one cycle".to_string(),
            ));
        }
        if years % self.time_step != 0 {
            return Err(SimError::Validation(format!(
                "projection length {years} yr is not a multiple of the {} yr cycle",
                self.time_step
            )));
        }
        for _ in 0..years / self.time_step {
            self.advance_cycle()?;
        }
        info!(
            species = %self.species,
            age = self.age,
            live = self.live_count(),
            "projection complete"
        );
        Ok(())
    }

    /// Run one growth cycle: compute every target from the frozen state,
    /// apply them all, thin from below, advance the clock.
    fn advance_cycle(&mut self) -> Result<(), SimError> {
        // Mortality drivers come from the same frozen state as growth.
        let ccf = competition::ccf(&self.trees, &self.config.crown_width);
        let relsdi = competition::relsdi(&self.trees, self.config.sdi_max);
        let rate = self.config.mortality.cycle_rate(
            competition_factor_from_ccf(ccf),
            relsdi,
            self.time_step,
        );

        let mut targets: Vec<(usize, TreeGrowth)> = Vec::with_capacity(self.live_count());
        for index in 0..self.trees.len() {
            if !self.trees[index].is_live() {
                continue;
            }
            let params = GrowthParameters::from_stand(self, Some(index))?;
            let target = grow_tree(&self.trees[index], self.species, &self.config, &params)?;
            targets.push((index, target));
        }

        for (index, target) in &targets {
            self.trees[*index].apply_growth(target, self.time_step);
        }
        self.apply_mortality(rate);
        self.age += self.time_step;

        let metrics = self.get_metrics();
        self.history.push(metrics);
        debug!(
            age = metrics.age,
            tpa = metrics.tpa,
            basal_area = metrics.basal_area,
            qmd = metrics.qmd,
            "completed growth cycle"
        );
        Ok(())
    }

    /// Mark the expected number of deaths, smallest diameters first.
    fn apply_mortality(&mut self, rate: f64) {
        let mut live: Vec<usize> = (0..self.trees.len())
            .filter(|&i| self.trees[i].is_live())
            .collect();
        let deaths = (live.len() as f64 * rate).round() as usize;
        if deaths == 0 {
            return;
        }
        live.sort_by(|&a, &b| self.trees[a].dbh.total_cmp(&self.trees[b].dbh));
        for &index in live.iter().take(deaths) {
            self.trees[index].status = TreeStatus::Dead;
        }
        debug!(deaths, rate, "applied mortality");
    }

    /// Summarize the live trees as they stand right now.
    pub fn get_metrics(&self) -> StandMetrics {
        let live: Vec<&Tree> = self.trees.iter().filter(|t| t.is_live()).collect();
        let count = live.len() as f64;
        let (mean_dbh, mean_height) = if live.is_empty() {
            (0.0, 0.0)
        } else {
            (
                live.iter().map(|t| t.dbh).sum::<f64>() / count,
                live.iter().map(|t| t.height).sum::<f64>() / count,
            )
        };
        StandMetrics {
            age: self.age,
            tpa: count,
            basal_area: competition::basal_area(&self.trees),
            qmd: competition::qmd(&self.trees),
            mean_dbh,
            mean_height,
            top_height: top_height(&live),
            volume: live
                .iter()
                .map(|t| t.cubic_volume(&self.config.volume))
                .sum(),
        }
    }

    /// One row per recorded point in time, planting first.
    pub fn metrics_history(&self) -> &[StandMetrics] {
        &self.history
    }
}

fn top_height(live: &[&Tree]) -> f64 {
    if live.is_empty() {
        return 0.0;
    }
    let mut by_dbh = live.to_vec();
    by_dbh.sort_by(|a, b| b.dbh.total_cmp(&a.dbh));
    let dominants = &by_dbh[..by_dbh.len().min(TOP_HEIGHT_TREE_COUNT)];
    dominants.iter().map(|t| t.height).sum::<f64>() / dominants.len() as f64
}
