use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::coefficients::{
    BarkRatioCoefficients, CrownRatioCoefficients, CrownWidthCoefficients,
    CurtisArneyCoefficients, DiameterGrowthCoefficients, EcoUnitAdjustments,
    ForestTypeAdjustments, MortalityCoefficients, SiteCurveCoefficients, SpeciesConfig,
    VolumeCoefficients, WykoffCoefficients,
};
use crate::error::SimError;
use crate::models::Species;

/// On-disk override file: complete coefficient sets keyed by species code.
#[derive(Debug, Serialize, Deserialize)]
struct LibraryFile {
    species: BTreeMap<String, SpeciesConfig>,
}

/// The coefficient sets for every supported species. Built-in values ship
/// with the crate; a TOML file can replace whole species entries. The
/// library is passed explicitly wherever coefficients are needed.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesLibrary {
    lp: SpeciesConfig,
    sp: SpeciesConfig,
    sa: SpeciesConfig,
    ll: SpeciesConfig,
}

impl SpeciesLibrary {
    /// Library with the built-in southern variant coefficient sets.
    pub fn builtin() -> Self {
        SpeciesLibrary {
            lp: loblolly(),
            sp: shortleaf(),
            sa: slash(),
            ll: longleaf(),
        }
    }

    /// Built-in library with whole-species overrides from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, SimError> {
        let file: LibraryFile = toml::from_str(text)?;
        let mut lib = SpeciesLibrary::builtin();
        for (code, config) in file.species {
            let species = Species::from_str(&code)?;
            config.validate(species)?;
            *lib.config_mut(species) = config;
        }
        Ok(lib)
    }

    /// Built-in library with overrides loaded from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        let lib = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "loaded species coefficient overrides");
        Ok(lib)
    }

    /// Coefficient set for a species.
    pub fn config(&self, species: Species) -> &SpeciesConfig {
        match species {
            Species::LP => &self.lp,
            Species::SP => &self.sp,
            Species::SA => &self.sa,
            Species::LL => &self.ll,
        }
    }

    fn config_mut(&mut self, species: Species) -> &mut SpeciesConfig {
        match species {
            Species::LP => &mut self.lp,
            Species::SP => &mut self.sp,
            Species::SA => &mut self.sa,
            Species::LL => &mut self.ll,
        }
    }

    /// Parse a species code and return it with its coefficient set.
    pub fn lookup(&self, code: &str) -> Result<(Species, &SpeciesConfig), SimError> {
        let species = Species::from_str(code)?;
        Ok((species, self.config(species)))
    }
}

impl Default for SpeciesLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

fn base_ecounit_adjustments() -> EcoUnitAdjustments {
    EcoUnitAdjustments {
        e222: -0.3066,
        e231: 0.1577,
        e232: 0.0,
        e234: 0.3856,
        e255: -0.1406,
        m231: 0.7885,
    }
}

fn base_forest_type_adjustments() -> ForestTypeAdjustments {
    ForestTypeAdjustments {
        yellow_pine: 0.0,
        oak_pine: -0.1223,
        lowland_hardwood: -0.1922,
        upland_hardwood: -0.2459,
    }
}

fn loblolly() -> SpeciesConfig {
    SpeciesConfig {
        curtis_arney: CurtisArneyCoefficients {
            p2: 243.860648,
            p3: 4.28460566,
            p4: -0.47130185,
            dbw: 0.5,
        },
        wykoff: WykoffCoefficients {
            b1: 4.6897,
            b2: -6.8801,
        },
        bark_ratio: BarkRatioCoefficients {
            b1: -0.48140,
            b2: 0.91413,
        },
        crown_width: CrownWidthCoefficients {
            a1: 0.583,
            a2: 1.620,
            a3: 0.0,
        },
        crown_ratio: CrownRatioCoefficients { d0: 62.0, d1: 4.0 },
        diameter_growth: DiameterGrowthCoefficients {
            b1: -1.370,
            b2: 0.857,
            b3: -0.00057,
            b4: 0.450,
            b5: -0.015,
            b6: 0.0153,
            b7: -0.00455,
            b8: -0.00269,
            b9: -0.178,
            b10: 0.115,
            b11: -0.069,
            ecounit: base_ecounit_adjustments(),
            forest_type: base_forest_type_adjustments(),
        },
        site_curve: SiteCurveCoefficients { k: 0.065, m: 1.40 },
        mortality: MortalityCoefficients {
            background: 0.012,
            competition: 0.055,
            density: 0.02,
        },
        volume: VolumeCoefficients {
            v0: 0.34864,
            v1: 0.00232,
        },
        sdi_max: 450.0,
    }
}

fn shortleaf() -> SpeciesConfig {
    SpeciesConfig {
        curtis_arney: CurtisArneyCoefficients {
            p2: 444.0921666,
            p3: 4.11876312,
            p4: -0.30617043,
            dbw: 0.5,
        },
        wykoff: WykoffCoefficients {
            b1: 4.6090,
            b2: -6.1896,
        },
        bark_ratio: BarkRatioCoefficients {
            b1: -0.44121,
            b2: 0.93045,
        },
        crown_width: CrownWidthCoefficients {
            a1: 1.120,
            a2: 1.450,
            a3: 0.0,
        },
        crown_ratio: CrownRatioCoefficients { d0: 64.0, d1: 4.2 },
        diameter_growth: DiameterGrowthCoefficients {
            b1: -1.550,
            b2: 0.870,
            b3: -0.00062,
            b4: 0.435,
            b5: -0.014,
            b6: 0.0158,
            b7: -0.00431,
            b8: -0.00254,
            b9: -0.164,
            b10: 0.103,
            b11: -0.058,
            ecounit: base_ecounit_adjustments(),
            forest_type: base_forest_type_adjustments(),
        },
        site_curve: SiteCurveCoefficients { k: 0.051, m: 1.45 },
        mortality: MortalityCoefficients {
            background: 0.010,
            competition: 0.050,
            density: 0.02,
        },
        volume: VolumeCoefficients {
            v0: 0.28964,
            v1: 0.00235,
        },
        sdi_max: 490.0,
    }
}

fn slash() -> SpeciesConfig {
    SpeciesConfig {
        curtis_arney: CurtisArneyCoefficients {
            p2: 1087.101439,
            p3: 5.10450596,
            p4: -0.24284896,
            dbw: 0.5,
        },
        wykoff: WykoffCoefficients {
            b1: 4.6561,
            b2: -6.2258,
        },
        bark_ratio: BarkRatioCoefficients {
            b1: -0.55073,
            b2: 0.91887,
        },
        crown_width: CrownWidthCoefficients {
            a1: 0.113,
            a2: 1.622,
            a3: 0.0,
        },
        crown_ratio: CrownRatioCoefficients { d0: 60.0, d1: 3.8 },
        diameter_growth: DiameterGrowthCoefficients {
            b1: -1.285,
            b2: 0.849,
            b3: -0.00055,
            b4: 0.462,
            b5: -0.016,
            b6: 0.0149,
            b7: -0.00470,
            b8: -0.00277,
            b9: -0.181,
            b10: 0.120,
            b11: -0.072,
            ecounit: base_ecounit_adjustments(),
            forest_type: base_forest_type_adjustments(),
        },
        site_curve: SiteCurveCoefficients { k: 0.072, m: 1.32 },
        mortality: MortalityCoefficients {
            background: 0.013,
            competition: 0.058,
            density: 0.02,
        },
        volume: VolumeCoefficients {
            v0: 0.31212,
            v1: 0.00229,
        },
        sdi_max: 430.0,
    }
}

fn longleaf() -> SpeciesConfig {
    SpeciesConfig {
        curtis_arney: CurtisArneyCoefficients {
            p2: 98.56082813,
            p3: 3.89930709,
            p4: -0.86730393,
            dbw: 0.5,
        },
        wykoff: WykoffCoefficients {
            b1: 4.5991,
            b2: -5.9111,
        },
        bark_ratio: BarkRatioCoefficients {
            b1: -0.45903,
            b2: 0.92746,
        },
        crown_width: CrownWidthCoefficients {
            a1: 0.720,
            a2: 1.500,
            a3: 0.0,
        },
        crown_ratio: CrownRatioCoefficients { d0: 66.0, d1: 4.4 },
        diameter_growth: DiameterGrowthCoefficients {
            b1: -1.650,
            b2: 0.881,
            b3: -0.00060,
            b4: 0.441,
            b5: -0.013,
            b6: 0.0161,
            b7: -0.00426,
            b8: -0.00248,
            b9: -0.170,
            b10: 0.108,
            b11: -0.061,
            ecounit: base_ecounit_adjustments(),
            forest_type: base_forest_type_adjustments(),
        },
        site_curve: SiteCurveCoefficients { k: 0.043, m: 1.58 },
        mortality: MortalityCoefficients {
            background: 0.009,
            competition: 0.045,
            density: 0.02,
        },
        volume: VolumeCoefficients {
            v0: 0.33653,
            v1: 0.00247,
        },
        sdi_max: 400.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_validates() {
        let lib = SpeciesLibrary::builtin();
        for species in Species::ALL {
            lib.config(species).validate(species).unwrap();
        }
    }

    #[test]
    fn test_lookup_normalizes_code() {
        let lib = SpeciesLibrary::builtin();
        let (species, config) = lib.lookup(" lp ").unwrap();
        assert_eq!(species, Species::LP);
        assert_eq!(config, lib.config(Species::LP));
    }

    #[test]
    fn test_lookup_unknown_code() {
        let lib = SpeciesLibrary::builtin();
        let err = lib.lookup("WO").unwrap_err();
        assert!(matches!(err, SimError::UnknownSpecies(_)));
    }

    #[test]
    fn test_species_differ() {
        let lib = SpeciesLibrary::builtin();
        assert_ne!(lib.config(Species::LP), lib.config(Species::LL));
        assert_ne!(lib.config(Species::SP), lib.config(Species::SA));
    }

    fn override_file(code: &str, config: SpeciesConfig) -> String {
        let mut species = BTreeMap::new();
        species.insert(code.to_string(), config);
        toml::to_string(&LibraryFile { species }).unwrap()
    }

    #[test]
    fn test_override_replaces_one_species() {
        let mut config = SpeciesLibrary::builtin().config(Species::LP).clone();
        config.sdi_max = 500.0;
        let text = override_file("LP", config);

        let lib = SpeciesLibrary::from_toml_str(&text).unwrap();
        assert_eq!(lib.config(Species::LP).sdi_max, 500.0);
        assert_eq!(
            lib.config(Species::SA),
            SpeciesLibrary::builtin().config(Species::SA)
        );
    }

    #[test]
    fn test_override_rejects_unknown_species() {
        let config = SpeciesLibrary::builtin().config(Species::LP).clone();
        let text = override_file("WO", config);
        let err = SpeciesLibrary::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, SimError::UnknownSpecies(_)));
    }

    #[test]
    fn test_override_rejects_invalid_coefficients() {
        let mut config = SpeciesLibrary::builtin().config(Species::LP).clone();
        config.sdi_max = -10.0;
        let text = override_file("LP", config);
        let err = SpeciesLibrary::from_toml_str(&text).unwrap_err();
        assert!(err.to_string().contains("sdi_max"));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = SpeciesLibrary::from_toml_str("species = 12").unwrap_err();
        assert!(matches!(err, SimError::Toml(_)));
    }

    #[test]
    fn test_from_path() {
        let mut config = SpeciesLibrary::builtin().config(Species::SA).clone();
        config.mortality.background = 0.02;
        let text = override_file("SA", config);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();

        let lib = SpeciesLibrary::from_path(file.path()).unwrap();
        assert_eq!(lib.config(Species::SA).mortality.background, 0.02);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SpeciesLibrary::from_path(Path::new("/no/such/file.toml")).unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }
}
