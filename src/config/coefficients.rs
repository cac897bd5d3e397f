use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::models::{EcoUnit, ForestTypeGroup, Species};

/// Base age (years) for site index curves.
pub const SITE_INDEX_BASE_AGE: f64 = 25.0;

/// Curtis-Arney height-diameter coefficients:
/// `height = 4.5 + p2 * exp(-p3 * dbh^p4)` above the small-tree bound `dbw`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurtisArneyCoefficients {
    pub p2: f64,
    pub p3: f64,
    pub p4: f64,
    /// Diameter (inches) below which the curve is linearly interpolated
    /// down to breast height at dbh 0.
    pub dbw: f64,
}

/// Wykoff height-diameter coefficients:
/// `height = 4.5 + exp(b1 + b2 / (dbh + 1))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WykoffCoefficients {
    pub b1: f64,
    pub b2: f64,
}

/// Linear inside-bark diameter model: `dib = b1 + b2 * dob`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarkRatioCoefficients {
    pub b1: f64,
    pub b2: f64,
}

impl BarkRatioCoefficients {
    /// Ratio of inside-bark to outside-bark diameter at the given outside
    /// bark diameter, clamped to a physically sensible range.
    pub fn ratio(&self, dob: f64) -> f64 {
        if dob <= 0.0 {
            return self.b2.clamp(0.80, 0.99);
        }
        ((self.b1 + self.b2 * dob) / dob).clamp(0.80, 0.99)
    }

    /// Inside-bark diameter for an outside-bark diameter.
    pub fn dib(&self, dob: f64) -> f64 {
        self.ratio(dob) * dob
    }
}

/// Open-grown crown width (feet): `ocw = a1 + a2 * dbh + a3 * dbh^2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrownWidthCoefficients {
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,
}

impl CrownWidthCoefficients {
    pub fn open_crown_width(&self, dbh: f64) -> f64 {
        let d = dbh.max(0.0);
        (self.a1 + self.a2 * d + self.a3 * d * d).max(0.0)
    }
}

/// Equilibrium crown ratio model. The equilibrium percentage falls off
/// linearly once relative SDI exceeds the onset of strong crown recession.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrownRatioCoefficients {
    /// Equilibrium crown ratio (percent) in uncrowded stands.
    pub d0: f64,
    /// Percent lost per unit of relative SDI above the recession threshold.
    pub d1: f64,
}

/// Ecological-unit adjustments to ln(DDS), additive on the log scale.
/// Unit 232 (Atlantic Coastal Plain) is the zero baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EcoUnitAdjustments {
    pub e222: f64,
    pub e231: f64,
    pub e232: f64,
    pub e234: f64,
    pub e255: f64,
    pub m231: f64,
}

impl EcoUnitAdjustments {
    pub fn adjustment(&self, unit: Option<EcoUnit>) -> f64 {
        match unit {
            Some(EcoUnit::E222) => self.e222,
            Some(EcoUnit::E231) => self.e231,
            Some(EcoUnit::E232) => self.e232,
            Some(EcoUnit::E234) => self.e234,
            Some(EcoUnit::E255) => self.e255,
            Some(EcoUnit::M231) => self.m231,
            None => 0.0,
        }
    }
}

/// Forest-type-group adjustments to ln(DDS). Yellow pine is the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestTypeAdjustments {
    pub yellow_pine: f64,
    pub oak_pine: f64,
    pub lowland_hardwood: f64,
    pub upland_hardwood: f64,
}

impl ForestTypeAdjustments {
    pub fn adjustment(&self, group: Option<ForestTypeGroup>) -> f64 {
        match group {
            Some(ForestTypeGroup::YellowPine) => self.yellow_pine,
            Some(ForestTypeGroup::OakPine) => self.oak_pine,
            Some(ForestTypeGroup::LowlandHardwood) => self.lowland_hardwood,
            Some(ForestTypeGroup::UplandHardwood) => self.upland_hardwood,
            None => 0.0,
        }
    }
}

/// ln(DDS) large-tree diameter growth coefficients. DDS is the 5-year
/// change in squared inside-bark diameter:
///
/// ```text
/// ln(dds) = b1 + b2*ln(dbh) + b3*dbh^2 + b4*ln(cr%) + b5*relsdi + b6*si
///         + b7*ba + b8*pbal + b9*slope + b10*slope*cos(aspect)
///         + b11*slope*sin(aspect) + forest type + ecological unit
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiameterGrowthCoefficients {
    pub b1: f64,
    pub b2: f64,
    pub b3: f64,
    pub b4: f64,
    pub b5: f64,
    pub b6: f64,
    pub b7: f64,
    pub b8: f64,
    pub b9: f64,
    pub b10: f64,
    pub b11: f64,
    pub ecounit: EcoUnitAdjustments,
    pub forest_type: ForestTypeAdjustments,
}

/// Chapman-Richards dominant-height curve anchored at the site index base
/// age: `h(age) = 4.5 + (si - 4.5) * ((1-e^(-k*age)) / (1-e^(-k*base)))^m`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteCurveCoefficients {
    pub k: f64,
    pub m: f64,
}

impl SiteCurveCoefficients {
    /// Expected dominant height (feet) at a total age for the given site
    /// index (base age 25). Age 0 pins to breast height.
    pub fn height_at(&self, age: f64, site_index: f64) -> f64 {
        if age <= 0.0 {
            return 4.5;
        }
        let shape = (1.0 - (-self.k * age).exp()) / (1.0 - (-self.k * SITE_INDEX_BASE_AGE).exp());
        4.5 + (site_index - 4.5) * shape.powf(self.m)
    }
}

/// Stand-level mortality rate model:
/// `annual = background + competition * cf + density * max(0, relsdi - 8)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MortalityCoefficients {
    pub background: f64,
    pub competition: f64,
    pub density: f64,
}

impl MortalityCoefficients {
    /// Annual mortality rate as a proportion of live trees.
    pub fn annual_rate(&self, competition_factor: f64, relsdi: f64) -> f64 {
        let surge = (relsdi - 8.0).max(0.0);
        (self.background + self.competition * competition_factor + self.density * surge)
            .clamp(0.0, 1.0)
    }

    /// Mortality rate compounded over a cycle of `time_step` years.
    pub fn cycle_rate(&self, competition_factor: f64, relsdi: f64, time_step: u32) -> f64 {
        let annual = self.annual_rate(competition_factor, relsdi);
        1.0 - (1.0 - annual).powi(time_step as i32)
    }
}

/// Combined-variable cubic volume equation: `v = v0 + v1 * dbh^2 * height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeCoefficients {
    pub v0: f64,
    pub v1: f64,
}

impl VolumeCoefficients {
    /// Total stem cubic volume (cubic feet). Trees below 1.0 in dbh carry
    /// no measurable stem volume.
    pub fn cubic_volume(&self, dbh: f64, height: f64) -> f64 {
        if dbh < 1.0 || height <= 4.5 {
            return 0.0;
        }
        (self.v0 + self.v1 * dbh * dbh * height).max(0.0)
    }
}

/// Complete coefficient set for one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesConfig {
    pub curtis_arney: CurtisArneyCoefficients,
    pub wykoff: WykoffCoefficients,
    pub bark_ratio: BarkRatioCoefficients,
    pub crown_width: CrownWidthCoefficients,
    pub crown_ratio: CrownRatioCoefficients,
    pub diameter_growth: DiameterGrowthCoefficients,
    pub site_curve: SiteCurveCoefficients,
    pub mortality: MortalityCoefficients,
    pub volume: VolumeCoefficients,
    /// Maximum Reineke stand density index.
    pub sdi_max: f64,
}

impl SpeciesConfig {
    /// Check a coefficient set for values the growth equations cannot use.
    pub fn validate(&self, species: Species) -> Result<(), SimError> {
        let fail = |field: &str, why: &str| {
            Err(SimError::Config(format!("{species} {field}: {why}")))
        };

        if self.curtis_arney.p2 <= 0.0 {
            return fail("curtis_arney.p2", "asymptote must be positive");
        }
        if self.curtis_arney.p3 <= 0.0 {
            return fail("curtis_arney.p3", "must be positive");
        }
        if self.curtis_arney.p4 >= 0.0 {
            return fail("curtis_arney.p4", "exponent must be negative");
        }
        if self.curtis_arney.dbw <= 0.0 || self.curtis_arney.dbw > 3.0 {
            return fail("curtis_arney.dbw", "must be in (0, 3] inches");
        }
        if self.wykoff.b2 >= 0.0 {
            return fail("wykoff.b2", "must be negative");
        }
        if self.bark_ratio.b2 <= 0.0 || self.bark_ratio.b2 > 1.0 {
            return fail("bark_ratio.b2", "slope must be in (0, 1]");
        }
        if self.crown_width.a2 <= 0.0 {
            return fail("crown_width.a2", "slope must be positive");
        }
        if !(5.0..=95.0).contains(&self.crown_ratio.d0) {
            return fail("crown_ratio.d0", "equilibrium percent must be in [5, 95]");
        }
        if self.crown_ratio.d1 < 0.0 {
            return fail("crown_ratio.d1", "recession slope must be non-negative");
        }
        if self.site_curve.k <= 0.0 || self.site_curve.m <= 0.0 {
            return fail("site_curve", "k and m must be positive");
        }
        if self.mortality.background < 0.0
            || self.mortality.competition < 0.0
            || self.mortality.density < 0.0
        {
            return fail("mortality", "rates must be non-negative");
        }
        if self.mortality.background >= 1.0 {
            return fail("mortality.background", "annual rate must be below 1.0");
        }
        if self.volume.v1 <= 0.0 {
            return fail("volume.v1", "combined-variable slope must be positive");
        }
        if self.sdi_max <= 0.0 {
            return fail("sdi_max", "must be positive");
        }
        Ok(())
    }
}
