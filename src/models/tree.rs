use serde::{Deserialize, Serialize};

use crate::config::VolumeCoefficients;
use crate::error::SimError;

/// Status of a tree in the stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeStatus {
    Live,
    Dead,
}

/// Target state for one tree over a growth cycle, produced by the growth
/// equations before any mutation happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeGrowth {
    pub dbh: f64,
    pub height: f64,
    pub crown_ratio: f64,
}

/// A single simulated tree. One record represents one tree per acre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Diameter at breast height, inches outside bark
    pub dbh: f64,
    /// Total height in feet
    pub height: f64,
    /// Live crown ratio (0.0 - 1.0)
    pub crown_ratio: f64,
    /// Total age in years
    pub age: u32,
    /// Live or dead; dead trees stay in the collection but drop out of
    /// every metric and never grow
    pub status: TreeStatus,
}

impl Tree {
    pub fn is_live(&self) -> bool {
        self.status == TreeStatus::Live
    }

    /// Basal area of this tree in square feet.
    pub fn basal_area_sqft(&self) -> f64 {
        std::f64::consts::PI * (self.dbh / 2.0).powi(2) / 144.0
    }

    /// Total stem cubic-foot volume under the given equation.
    pub fn cubic_volume(&self, eq: &VolumeCoefficients) -> f64 {
        eq.cubic_volume(self.dbh, self.height)
    }

    /// Move the tree to its post-cycle state. Diameter and height never
    /// shrink; crown ratio stays within its physical bounds.
    pub fn apply_growth(&mut self, target: &TreeGrowth, time_step: u32) {
        self.dbh = target.dbh.max(self.dbh);
        self.height = target.height.max(self.height);
        self.crown_ratio = target.crown_ratio.clamp(0.05, 0.95);
        self.age += time_step;
    }

    /// Validate tree measurements. Returns `SimError::Validation` on failure.
    ///
    /// Planting and growth keep these bounds by construction; this is the
    /// guard for trees built directly or edited through the stand's mutable
    /// tree access. A tree with a dbh reading stands at least breast height
    /// (4.5 ft) tall.
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.dbh.is_finite() || self.dbh < 0.0 {
            return Err(SimError::Validation(format!(
                "tree dbh must be finite and non-negative, got {}",
                self.dbh
            )));
        }
        if !self.height.is_finite() || self.height < 4.5 {
            return Err(SimError::Validation(format!(
                "tree height must be finite and at least breast height (4.5 ft), got {}",
                self.height
            )));
        }
        if !(0.0..=1.0).contains(&self.crown_ratio) {
            return Err(SimError::Validation(format!(
                "crown_ratio must be in 0.0..=1.0, got {}",
                self.crown_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tree(dbh: f64, height: f64, status: TreeStatus) -> Tree {
        Tree {
            dbh,
            height,
            crown_ratio: 0.55,
            age: 20,
            status,
        }
    }

    #[test]
    fn test_basal_area_12_inch_tree() {
        let tree = make_tree(12.0, 70.0, TreeStatus::Live);
        let ba = tree.basal_area_sqft();
        assert!((ba - 0.7854).abs() < 0.001);
    }

    #[test]
    fn test_basal_area_matches_forester_constant() {
        let tree = make_tree(9.3, 55.0, TreeStatus::Live);
        let expected = 0.005454154 * 9.3 * 9.3;
        assert!((tree.basal_area_sqft() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_cubic_volume_uses_equation() {
        let eq = VolumeCoefficients {
            v0: 0.3,
            v1: 0.002,
        };
        let tree = make_tree(10.0, 60.0, TreeStatus::Live);
        let v = tree.cubic_volume(&eq);
        assert!((v - (0.3 + 0.002 * 100.0 * 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_apply_growth_advances_state() {
        let mut tree = make_tree(8.0, 50.0, TreeStatus::Live);
        let target = TreeGrowth {
            dbh: 8.9,
            height: 55.5,
            crown_ratio: 0.50,
        };
        tree.apply_growth(&target, 5);
        assert!((tree.dbh - 8.9).abs() < 1e-12);
        assert!((tree.height - 55.5).abs() < 1e-12);
        assert!((tree.crown_ratio - 0.50).abs() < 1e-12);
        assert_eq!(tree.age, 25);
    }

    #[test]
    fn test_apply_growth_never_shrinks() {
        let mut tree = make_tree(8.0, 50.0, TreeStatus::Live);
        let target = TreeGrowth {
            dbh: 7.2,
            height: 48.0,
            crown_ratio: 0.01,
        };
        tree.apply_growth(&target, 5);
        assert_eq!(tree.dbh, 8.0);
        assert_eq!(tree.height, 50.0);
        assert_eq!(tree.crown_ratio, 0.05);
    }

    #[test]
    fn test_validate_accepts_reasonable_tree() {
        assert!(make_tree(10.0, 60.0, TreeStatus::Live).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_dbh() {
        let tree = make_tree(-1.0, 60.0, TreeStatus::Live);
        let err = tree.validate().unwrap_err();
        assert!(matches!(err, SimError::Validation(_)));
        assert!(err.to_string().contains("dbh"));
    }

    #[test]
    fn test_validate_rejects_nan_height() {
        let tree = make_tree(10.0, f64::NAN, TreeStatus::Live);
        assert!(tree.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_sub_breast_height() {
        // A 10 in stem shorter than the 4.5 ft dbh reference has no
        // meaningful dbh reading.
        let tree = make_tree(10.0, 2.0, TreeStatus::Live);
        let err = tree.validate().unwrap_err();
        assert!(matches!(err, SimError::Validation(_)));
        assert!(err.to_string().contains("breast height"));
    }

    #[test]
    fn test_validate_accepts_seedling_at_breast_height() {
        // The height curves floor at exactly 4.5 ft for near-zero dbh.
        let mut tree = make_tree(0.05, 4.5, TreeStatus::Live);
        tree.age = 0;
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_crown() {
        let mut tree = make_tree(10.0, 60.0, TreeStatus::Live);
        tree.crown_ratio = 1.4;
        assert!(tree.validate().is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let tree = make_tree(11.5, 68.0, TreeStatus::Dead);
        let json = serde_json::to_string(&tree).unwrap();
        let back: Tree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }
}
