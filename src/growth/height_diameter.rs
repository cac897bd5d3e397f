use serde::{Deserialize, Serialize};

use crate::config::{CurtisArneyCoefficients, SpeciesConfig, SpeciesLibrary, WykoffCoefficients};
use crate::error::SimError;
use crate::models::Species;

/// Breast height in feet; no tree prediction falls below this.
pub const BREAST_HEIGHT_FT: f64 = 4.5;

/// Diameters below this measurement floor pin to breast height exactly.
const MIN_MEASURABLE_DBH: f64 = 0.1;

/// Upper end of the diameter domain for the height inversion.
pub const MAX_SOLVER_DBH: f64 = 60.0;

const SOLVER_MAX_ITERATIONS: usize = 100;
const SOLVER_HEIGHT_TOL_FT: f64 = 1e-3;
const SOLVER_DBH_TOL_IN: f64 = 1e-4;

/// Which height-diameter equation to evaluate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HdModel {
    #[default]
    CurtisArney,
    Wykoff,
}

impl std::fmt::Display for HdModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HdModel::CurtisArney => write!(f, "curtis_arney"),
            HdModel::Wykoff => write!(f, "wykoff"),
        }
    }
}

impl std::str::FromStr for HdModel {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "curtis_arney" | "curtis-arney" => Ok(HdModel::CurtisArney),
            "wykoff" => Ok(HdModel::Wykoff),
            _ => Err(SimError::Validation(format!(
                "unknown height-diameter model '{s}' (expected curtis_arney or wykoff)"
            ))),
        }
    }
}

/// Coefficients behind one of the two equations, for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HdCoefficients {
    CurtisArney(CurtisArneyCoefficients),
    Wykoff(WykoffCoefficients),
}

/// Parallel model predictions over a diameter grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelComparison {
    pub species: Species,
    pub dbh: Vec<f64>,
    pub curtis_arney: Vec<f64>,
    pub wykoff: Vec<f64>,
}

/// Height-diameter model for one species. Heights in feet, diameters in
/// inches outside bark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightDiameterModel {
    species: Species,
    curtis_arney: CurtisArneyCoefficients,
    wykoff: WykoffCoefficients,
}

impl HeightDiameterModel {
    pub fn new(species: Species, config: &SpeciesConfig) -> Self {
        HeightDiameterModel {
            species,
            curtis_arney: config.curtis_arney,
            wykoff: config.wykoff,
        }
    }

    /// Look up a species code (normalized) and build its model.
    pub fn for_species(code: &str, library: &SpeciesLibrary) -> Result<Self, SimError> {
        let (species, config) = library.lookup(code)?;
        Ok(Self::new(species, config))
    }

    pub fn species(&self) -> Species {
        self.species
    }

    /// Curtis-Arney height. Below the small-tree bound the curve is a
    /// straight line from breast height at dbh 0 up to the curve value at
    /// the bound, so saplings do not ride the asymptotic tail.
    pub fn curtis_arney_height(&self, dbh: f64) -> f64 {
        let c = &self.curtis_arney;
        if dbh < MIN_MEASURABLE_DBH {
            return BREAST_HEIGHT_FT;
        }
        if dbh < c.dbw {
            let anchor = curtis_arney_curve(c, c.dbw);
            return BREAST_HEIGHT_FT + (anchor - BREAST_HEIGHT_FT) * (dbh / c.dbw);
        }
        curtis_arney_curve(c, dbh)
    }

    /// Wykoff height: `4.5 + exp(b1 + b2 / (dbh + 1))`.
    pub fn wykoff_height(&self, dbh: f64) -> f64 {
        if dbh < MIN_MEASURABLE_DBH {
            return BREAST_HEIGHT_FT;
        }
        let w = &self.wykoff;
        BREAST_HEIGHT_FT + (w.b1 + w.b2 / (dbh + 1.0)).exp()
    }

    pub fn predict_height(&self, dbh: f64, model: HdModel) -> f64 {
        match model {
            HdModel::CurtisArney => self.curtis_arney_height(dbh),
            HdModel::Wykoff => self.wykoff_height(dbh),
        }
    }

    /// Invert the height curve by bisection over `[0, 60]` inches.
    ///
    /// Returns the diameter whose predicted height is nearest the target.
    /// Heights outside what the curve can produce on that domain fail with
    /// a convergence error.
    pub fn solve_dbh_from_height(&self, height: f64, model: HdModel) -> Result<f64, SimError> {
        if !height.is_finite() {
            return Err(SimError::Validation(format!(
                "target height must be finite, got {height}"
            )));
        }

        let mut lo = 0.0_f64;
        let mut hi = MAX_SOLVER_DBH;
        let f_lo = self.predict_height(lo, model) - height;
        let f_hi = self.predict_height(hi, model) - height;

        if f_lo.abs() < SOLVER_HEIGHT_TOL_FT {
            return Ok(lo);
        }
        if f_hi.abs() < SOLVER_HEIGHT_TOL_FT {
            return Ok(hi);
        }
        if f_lo > 0.0 || f_hi < 0.0 {
            return Err(SimError::Convergence(format!(
                "height {:.2} ft for {} is outside the invertible range [{:.2}, {:.2}]",
                height,
                self.species,
                self.predict_height(lo, model),
                self.predict_height(hi, model),
            )));
        }

        for _ in 0..SOLVER_MAX_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            let f_mid = self.predict_height(mid, model) - height;
            if f_mid.abs() < SOLVER_HEIGHT_TOL_FT || (hi - lo) < SOLVER_DBH_TOL_IN {
                return Ok(mid);
            }
            if f_mid < 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        Err(SimError::Convergence(format!(
            "height-to-diameter inversion did not converge for {:.2} ft",
            height
        )))
    }

    /// The coefficient set behind the requested equation.
    pub fn model_parameters(&self, model: HdModel) -> HdCoefficients {
        match model {
            HdModel::CurtisArney => HdCoefficients::CurtisArney(self.curtis_arney),
            HdModel::Wykoff => HdCoefficients::Wykoff(self.wykoff),
        }
    }

    /// Evaluate both equations over a diameter grid.
    pub fn compare_models(&self, dbh_values: &[f64]) -> ModelComparison {
        ModelComparison {
            species: self.species,
            dbh: dbh_values.to_vec(),
            curtis_arney: dbh_values
                .iter()
                .map(|&d| self.curtis_arney_height(d))
                .collect(),
            wykoff: dbh_values.iter().map(|&d| self.wykoff_height(d)).collect(),
        }
    }
}

fn curtis_arney_curve(c: &CurtisArneyCoefficients, dbh: f64) -> f64 {
    BREAST_HEIGHT_FT + c.p2 * (-c.p3 * dbh.powf(c.p4)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn model(species: Species) -> HeightDiameterModel {
        HeightDiameterModel::for_species(species.code(), &SpeciesLibrary::builtin()).unwrap()
    }

    #[test]
    fn test_breast_height_floor_is_exact() {
        let m = model(Species::LP);
        assert_eq!(m.curtis_arney_height(0.05), BREAST_HEIGHT_FT);
        assert_eq!(m.curtis_arney_height(0.0), BREAST_HEIGHT_FT);
        assert_eq!(m.wykoff_height(0.0), BREAST_HEIGHT_FT);
        assert_eq!(m.wykoff_height(0.09), BREAST_HEIGHT_FT);
    }

    #[test]
    fn test_small_diameter_interpolation() {
        let m = model(Species::LP);
        let h_low = m.curtis_arney_height(0.2);
        let h_mid = m.curtis_arney_height(0.35);
        let h_bound = m.curtis_arney_height(0.5);
        assert!(h_low > BREAST_HEIGHT_FT);
        assert!(h_low < h_mid && h_mid < h_bound);
        // Continuous at the bound.
        assert!((h_bound - m.curtis_arney_height(0.5001)).abs() < 0.01);
    }

    #[test]
    fn test_curtis_arney_loblolly_reference_heights() {
        let m = model(Species::LP);
        assert!((m.curtis_arney_height(3.0) - 23.5).abs() < 1.0);
        assert!((m.curtis_arney_height(12.0) - 69.1).abs() < 1.0);
        assert!((m.curtis_arney_height(24.0) - 98.0).abs() < 1.0);
        assert!((m.curtis_arney_height(60.0) - 135.4).abs() < 1.5);
    }

    #[test]
    fn test_wykoff_loblolly_reference_height() {
        let m = model(Species::LP);
        assert!((m.wykoff_height(12.0) - 68.6).abs() < 1.0);
    }

    #[test]
    fn test_predict_height_default_is_curtis_arney() {
        let m = model(Species::SA);
        assert_eq!(HdModel::default(), HdModel::CurtisArney);
        assert_eq!(
            m.predict_height(12.0, HdModel::default()),
            m.curtis_arney_height(12.0)
        );
        assert_eq!(m.predict_height(12.0, HdModel::Wykoff), m.wykoff_height(12.0));
    }

    #[test]
    fn test_round_trip_reference_diameters() {
        for species in Species::ALL {
            let m = model(species);
            for dbh in [3.0, 6.0, 12.0, 18.0, 24.0] {
                for hd in [HdModel::CurtisArney, HdModel::Wykoff] {
                    let h = m.predict_height(dbh, hd);
                    let solved = m.solve_dbh_from_height(h, hd).unwrap();
                    assert!(
                        (solved - dbh).abs() < 0.5,
                        "{species} {hd} round trip at {dbh}: got {solved}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_round_trip_is_tight_at_twelve_inches() {
        let m = model(Species::LP);
        let h = m.curtis_arney_height(12.0);
        let solved = m.solve_dbh_from_height(h, HdModel::CurtisArney).unwrap();
        assert!((solved - 12.0).abs() < 0.1);
    }

    #[test]
    fn test_solve_at_breast_height_returns_zero() {
        let m = model(Species::LP);
        let solved = m
            .solve_dbh_from_height(BREAST_HEIGHT_FT, HdModel::CurtisArney)
            .unwrap();
        assert_eq!(solved, 0.0);
    }

    #[test]
    fn test_solve_unreachable_height_fails() {
        let m = model(Species::LP);
        let err = m
            .solve_dbh_from_height(1000.0, HdModel::CurtisArney)
            .unwrap_err();
        assert!(matches!(err, SimError::Convergence(_)));
    }

    #[test]
    fn test_solve_below_floor_fails() {
        let m = model(Species::LP);
        let err = m.solve_dbh_from_height(2.0, HdModel::Wykoff).unwrap_err();
        assert!(matches!(err, SimError::Convergence(_)));
    }

    #[test]
    fn test_solve_rejects_nan() {
        let m = model(Species::LP);
        assert!(matches!(
            m.solve_dbh_from_height(f64::NAN, HdModel::CurtisArney),
            Err(SimError::Validation(_))
        ));
    }

    #[test]
    fn test_models_agree_for_southern_pines() {
        // Longleaf hugs breast height through its grass stage, so the
        // comparison starts above the sapling range.
        for species in Species::ALL {
            let m = model(species);
            for dbh in [3.0, 6.0, 12.0, 18.0, 24.0] {
                let ca = m.curtis_arney_height(dbh);
                let wy = m.wykoff_height(dbh);
                let ratio = wy / ca;
                assert!(
                    (0.7..=1.3).contains(&ratio),
                    "{species} at {dbh} in: curtis_arney {ca:.1}, wykoff {wy:.1}"
                );
            }
        }
    }

    #[test]
    fn test_for_species_unknown_code() {
        let err =
            HeightDiameterModel::for_species("XX", &SpeciesLibrary::builtin()).unwrap_err();
        assert!(matches!(err, SimError::UnknownSpecies(_)));
    }

    #[test]
    fn test_model_parameters_match_library() {
        let lib = SpeciesLibrary::builtin();
        let m = HeightDiameterModel::for_species("LL", &lib).unwrap();
        match m.model_parameters(HdModel::CurtisArney) {
            HdCoefficients::CurtisArney(c) => {
                assert_eq!(c, lib.config(Species::LL).curtis_arney)
            }
            other => panic!("wrong coefficient set: {other:?}"),
        }
        match m.model_parameters(HdModel::Wykoff) {
            HdCoefficients::Wykoff(w) => assert_eq!(w, lib.config(Species::LL).wykoff),
            other => panic!("wrong coefficient set: {other:?}"),
        }
    }

    #[test]
    fn test_compare_models_grid() {
        let m = model(Species::SP);
        let grid = [2.0, 7.0, 15.0];
        let cmp = m.compare_models(&grid);
        assert_eq!(cmp.dbh, grid.to_vec());
        assert_eq!(cmp.curtis_arney.len(), 3);
        assert_eq!(cmp.wykoff.len(), 3);
        assert_eq!(cmp.curtis_arney[1], m.curtis_arney_height(7.0));
        assert_eq!(cmp.wykoff[2], m.wykoff_height(15.0));
        assert_eq!(cmp.species, Species::SP);
    }

    #[test]
    fn test_hd_model_parse_and_display() {
        assert_eq!("curtis_arney".parse::<HdModel>().unwrap(), HdModel::CurtisArney);
        assert_eq!("Curtis-Arney".parse::<HdModel>().unwrap(), HdModel::CurtisArney);
        assert_eq!("WYKOFF".parse::<HdModel>().unwrap(), HdModel::Wykoff);
        assert!("chapman".parse::<HdModel>().is_err());
        assert_eq!(HdModel::CurtisArney.to_string(), "curtis_arney");
        assert_eq!(HdModel::Wykoff.to_string(), "wykoff");
    }

    proptest! {
        #[test]
        fn prop_curtis_arney_monotonic(a in 0.0..60.0f64, b in 0.0..60.0f64) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let m = model(Species::LP);
            prop_assert!(m.curtis_arney_height(lo) <= m.curtis_arney_height(hi) + 1e-9);
        }

        #[test]
        fn prop_wykoff_monotonic(a in 0.0..60.0f64, b in 0.0..60.0f64) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let m = model(Species::SA);
            prop_assert!(m.wykoff_height(lo) <= m.wykoff_height(hi) + 1e-9);
        }

        #[test]
        fn prop_heights_never_below_breast_height(dbh in 0.0..60.0f64) {
            let m = model(Species::LL);
            prop_assert!(m.curtis_arney_height(dbh) >= BREAST_HEIGHT_FT);
            prop_assert!(m.wykoff_height(dbh) >= BREAST_HEIGHT_FT);
        }

        #[test]
        fn prop_round_trip_within_half_inch(dbh in 0.1..40.0f64) {
            let m = model(Species::LP);
            let h = m.curtis_arney_height(dbh);
            let solved = m.solve_dbh_from_height(h, HdModel::CurtisArney).unwrap();
            prop_assert!((solved - dbh).abs() < 0.5);
        }
    }
}
