use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Southern yellow pine species handled by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    /// Loblolly pine (Pinus taeda)
    LP,
    /// Shortleaf pine (Pinus echinata)
    SP,
    /// Slash pine (Pinus elliottii)
    SA,
    /// Longleaf pine (Pinus palustris)
    LL,
}

impl Species {
    /// All species with built-in coefficient sets.
    pub const ALL: [Species; 4] = [Species::LP, Species::SP, Species::SA, Species::LL];

    /// Two-letter species code.
    pub fn code(&self) -> &'static str {
        match self {
            Species::LP => "LP",
            Species::SP => "SP",
            Species::SA => "SA",
            Species::LL => "LL",
        }
    }

    pub fn common_name(&self) -> &'static str {
        match self {
            Species::LP => "Loblolly Pine",
            Species::SP => "Shortleaf Pine",
            Species::SA => "Slash Pine",
            Species::LL => "Longleaf Pine",
        }
    }

    pub fn scientific_name(&self) -> &'static str {
        match self {
            Species::LP => "Pinus taeda",
            Species::SP => "Pinus echinata",
            Species::SA => "Pinus elliottii",
            Species::LL => "Pinus palustris",
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Species {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LP" => Ok(Species::LP),
            "SP" => Ok(Species::SP),
            "SA" => Ok(Species::SA),
            "LL" => Ok(Species::LL),
            _ => Err(SimError::UnknownSpecies(s.trim().to_string())),
        }
    }
}

/// Ecological unit (Bailey province) a stand sits in. Feeds an additive
/// adjustment into the diameter growth equation; `E232` (Atlantic Coastal
/// Plain) is the calibration baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EcoUnit {
    #[serde(rename = "222")]
    E222,
    #[serde(rename = "231")]
    E231,
    #[serde(rename = "232")]
    E232,
    #[serde(rename = "234")]
    E234,
    #[serde(rename = "255")]
    E255,
    #[serde(rename = "M231")]
    M231,
}

impl EcoUnit {
    pub fn code(&self) -> &'static str {
        match self {
            EcoUnit::E222 => "222",
            EcoUnit::E231 => "231",
            EcoUnit::E232 => "232",
            EcoUnit::E234 => "234",
            EcoUnit::E255 => "255",
            EcoUnit::M231 => "M231",
        }
    }
}

impl std::fmt::Display for EcoUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for EcoUnit {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "222" => Ok(EcoUnit::E222),
            "231" => Ok(EcoUnit::E231),
            "232" => Ok(EcoUnit::E232),
            "234" => Ok(EcoUnit::E234),
            "255" => Ok(EcoUnit::E255),
            "M231" => Ok(EcoUnit::M231),
            _ => Err(SimError::Config(format!(
                "unknown ecological unit code '{}' (expected 222, 231, 232, 234, 255, or M231)",
                s.trim()
            ))),
        }
    }
}

/// Forest type group surrounding the subject trees. Like [`EcoUnit`], an
/// additive adjustment to diameter growth; yellow pine is the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForestTypeGroup {
    #[serde(rename = "FTYLPN")]
    YellowPine,
    #[serde(rename = "FTOKPN")]
    OakPine,
    #[serde(rename = "FTLOHD")]
    LowlandHardwood,
    #[serde(rename = "FTUPHD")]
    UplandHardwood,
}

impl ForestTypeGroup {
    pub fn code(&self) -> &'static str {
        match self {
            ForestTypeGroup::YellowPine => "FTYLPN",
            ForestTypeGroup::OakPine => "FTOKPN",
            ForestTypeGroup::LowlandHardwood => "FTLOHD",
            ForestTypeGroup::UplandHardwood => "FTUPHD",
        }
    }
}

impl std::fmt::Display for ForestTypeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for ForestTypeGroup {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FTYLPN" => Ok(ForestTypeGroup::YellowPine),
            "FTOKPN" => Ok(ForestTypeGroup::OakPine),
            "FTLOHD" => Ok(ForestTypeGroup::LowlandHardwood),
            "FTUPHD" => Ok(ForestTypeGroup::UplandHardwood),
            _ => Err(SimError::Config(format!(
                "unknown forest type group '{}' (expected FTYLPN, FTOKPN, FTLOHD, or FTUPHD)",
                s.trim()
            ))),
        }
    }
}
