use crate::config::CrownWidthCoefficients;
use crate::models::Tree;

/// Square feet of basal area per square inch of diameter squared.
pub const BASAL_AREA_FACTOR: f64 = 0.005454154;

/// Crown competition factor contributed per square foot of open-grown
/// crown area, scaled so CCF 100 means crowns could just cover an acre.
pub const CCF_FACTOR: f64 = 0.001803;

/// Reineke slope: SDI = TPA * (QMD / 10)^1.605.
pub const REINEKE_EXPONENT: f64 = 1.605;

/// Live basal area in square feet per acre.
pub fn basal_area(trees: &[Tree]) -> f64 {
    trees
        .iter()
        .filter(|t| t.is_live())
        .map(|t| t.basal_area_sqft())
        .sum()
}

/// Basal area per acre in live trees with dbh strictly greater than the
/// subject diameter. Ties contribute nothing, so the largest tree in a
/// stand sees zero.
pub fn pbal(trees: &[Tree], subject_dbh: f64) -> f64 {
    trees
        .iter()
        .filter(|t| t.is_live() && t.dbh > subject_dbh)
        .map(|t| t.basal_area_sqft())
        .sum()
}

/// Quadratic mean diameter of live trees, inches. Zero for an empty stand.
pub fn qmd(trees: &[Tree]) -> f64 {
    let live: Vec<f64> = trees
        .iter()
        .filter(|t| t.is_live())
        .map(|t| t.dbh)
        .collect();
    if live.is_empty() {
        return 0.0;
    }
    let mean_sq = live.iter().map(|d| d * d).sum::<f64>() / live.len() as f64;
    mean_sq.sqrt()
}

/// Reineke stand density index of the live trees.
pub fn sdi(trees: &[Tree]) -> f64 {
    let tpa = trees.iter().filter(|t| t.is_live()).count() as f64;
    let q = qmd(trees);
    if tpa == 0.0 || q <= 0.0 {
        return 0.0;
    }
    tpa * (q / 10.0).powf(REINEKE_EXPONENT)
}

/// Relative SDI on the 1-12 scale used by the diameter growth equation:
/// `SDI / SDImax * 10`, floored at 1 so sparse stands still evaluate.
pub fn relsdi(trees: &[Tree], sdi_max: f64) -> f64 {
    if sdi_max <= 0.0 {
        return 1.0;
    }
    (sdi(trees) / sdi_max * 10.0).clamp(1.0, 12.0)
}

/// Crown competition factor: summed open-grown crown areas of the live
/// trees as a percentage of an acre. 100 is nominal full site occupancy.
pub fn ccf(trees: &[Tree], crown_width: &CrownWidthCoefficients) -> f64 {
    trees
        .iter()
        .filter(|t| t.is_live())
        .map(|t| {
            let ocw = crown_width.open_crown_width(t.dbh);
            CCF_FACTOR * ocw * ocw
        })
        .sum()
}
