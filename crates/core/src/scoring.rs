//! Point-award policy.
//!
//! Pure logic. Three trust tiers decide how a classification converts into
//! points:
//!
//! | Condition                               | Award                       |
//! |-----------------------------------------|-----------------------------|
//! | manual override, or confidence < 0.40   | `override_points`           |
//! | confidence not a probability (NaN, ...) | `override_points`           |
//! | confidence >= 0.75                      | `floor(base * confidence)`  |
//! | otherwise                               | `floor(base * 0.6)`         |

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::waste::CategoryPoints;

/// Below this confidence the classification is not trusted.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.40;

/// At or above this confidence the award scales with confidence.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.75;

/// Fraction of base points paid for mid-confidence classifications.
pub const MID_CONFIDENCE_FACTOR: f64 = 0.6;

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

/// Classifier confidence attached to a deposit.
///
/// `Unset` is a deposit with no classification (operator or user override)
/// and scores as `0.0`. Prefer [`Confidence::known`] for construction; a
/// `Known` value outside `[0, 1]` is treated exactly like `Unset`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Confidence {
    Known(f64),
    #[default]
    Unset,
}

impl Confidence {
    /// Build a known confidence, rejecting values outside `[0, 1]`.
    pub fn known(value: f64) -> Result<Self, CoreError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(CoreError::Validation(format!(
                "confidence must be between 0 and 1, got {value}"
            )));
        }
        Ok(Self::Known(value))
    }

    /// Convert a nullable column or request field.
    pub fn from_option(value: Option<f64>) -> Result<Self, CoreError> {
        value.map_or(Ok(Self::Unset), Self::known)
    }

    /// Value used by the award policy.
    pub fn score(self) -> f64 {
        self.as_option().unwrap_or(0.0)
    }

    /// Value stored on the transaction record.
    pub fn as_option(self) -> Option<f64> {
        match self {
            Self::Known(value) if (0.0..=1.0).contains(&value) => Some(value),
            Self::Known(_) | Self::Unset => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Award policy
// ---------------------------------------------------------------------------

/// Which branch of the policy produced an award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardTier {
    /// Flat `override_points` (override or low confidence).
    Fallback,
    /// `base_points` scaled by confidence.
    Proportional,
    /// `base_points` discounted by [`MID_CONFIDENCE_FACTOR`].
    Discounted,
}

/// Result of the award policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Award {
    pub points: i32,
    pub tier: AwardTier,
}

/// Compute the points for a deposit.
///
/// Fractional results are truncated toward zero (`floor`, since every input
/// is non-negative), never rounded.
pub fn award_points(points: CategoryPoints, confidence: Confidence, manual_override: bool) -> Award {
    let score = confidence.score();

    if manual_override || score < LOW_CONFIDENCE_THRESHOLD {
        return Award {
            points: points.override_points,
            tier: AwardTier::Fallback,
        };
    }

    let base = f64::from(points.base_points);
    if score >= HIGH_CONFIDENCE_THRESHOLD {
        Award {
            points: (base * score).floor() as i32,
            tier: AwardTier::Proportional,
        }
    } else {
        Award {
            points: (base * MID_CONFIDENCE_FACTOR).floor() as i32,
            tier: AwardTier::Discounted,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waste::{PointsTable, WasteCategory};

    fn points(category: WasteCategory) -> CategoryPoints {
        PointsTable::reference().lookup(category)
    }

    #[test]
    fn high_confidence_scales_with_confidence() {
        let award = award_points(points(WasteCategory::Battery), Confidence::Known(0.80), false);
        assert_eq!(award.points, 88);
        assert_eq!(award.tier, AwardTier::Proportional);
    }

    #[test]
    fn high_threshold_is_inclusive() {
        let award = award_points(points(WasteCategory::Printer), Confidence::Known(0.75), false);
        assert_eq!(award.points, 150);
        assert_eq!(award.tier, AwardTier::Proportional);
    }

    #[test]
    fn proportional_award_truncates() {
        // 27 * 0.99 = 26.73
        let award = award_points(points(WasteCategory::Mouse), Confidence::Known(0.99), false);
        assert_eq!(award.points, 26);
    }

    #[test]
    fn low_confidence_falls_back_to_override_points() {
        let award = award_points(points(WasteCategory::Mobile), Confidence::Known(0.30), false);
        assert_eq!(award.points, 80);
        assert_eq!(award.tier, AwardTier::Fallback);
    }

    #[test]
    fn low_threshold_is_exclusive() {
        let award = award_points(points(WasteCategory::Mobile), Confidence::Known(0.40), false);
        assert_eq!(award.tier, AwardTier::Discounted);
        assert_eq!(award.points, 90);
    }

    #[test]
    fn mid_confidence_is_discounted() {
        // 27 * 0.6 = 16.2
        let award = award_points(points(WasteCategory::Mouse), Confidence::Known(0.74), false);
        assert_eq!(award.points, 16);
        assert_eq!(award.tier, AwardTier::Discounted);
    }

    #[test]
    fn manual_override_ignores_confidence() {
        for confidence in [0.0, 0.5, 0.99, 1.0] {
            let award = award_points(
                points(WasteCategory::Television),
                Confidence::Known(confidence),
                true,
            );
            assert_eq!(award.points, 180);
            assert_eq!(award.tier, AwardTier::Fallback);
        }
    }

    #[test]
    fn unset_confidence_scores_as_zero() {
        let award = award_points(points(WasteCategory::Laptop), Confidence::Unset, false);
        assert_eq!(award.points, 100);
        assert_eq!(award.tier, AwardTier::Fallback);
    }

    #[test]
    fn unknown_category_default_pays_flat_fifty_or_nothing() {
        let default = crate::waste::DEFAULT_CATEGORY_POINTS;
        assert_eq!(award_points(default, Confidence::Known(0.1), false).points, 50);
        assert_eq!(award_points(default, Confidence::Known(0.9), false).points, 0);
        assert_eq!(award_points(default, Confidence::Known(0.5), false).points, 0);
    }

    #[test]
    fn override_tier_matches_table_for_every_category() {
        let table = PointsTable::reference();
        for category in WasteCategory::ALL {
            let p = table.lookup(category);
            assert_eq!(award_points(p, Confidence::Known(0.39), false).points, p.override_points);
            assert_eq!(award_points(p, Confidence::Known(0.6), false).points, p.base_points * 3 / 5);
        }
    }

    #[test]
    fn non_probability_confidence_is_not_trusted() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1.5, -0.2] {
            let confidence = Confidence::Known(value);
            let award = award_points(points(WasteCategory::Television), confidence, false);
            assert_eq!(award.tier, AwardTier::Fallback, "{value}");
            assert_eq!(award.points, 180, "{value}");
            assert_eq!(confidence.as_option(), None, "{value}");
        }
    }

    #[test]
    fn confidence_rejects_out_of_range() {
        assert!(Confidence::known(1.01).is_err());
        assert!(Confidence::known(-0.1).is_err());
        assert!(Confidence::known(f64::NAN).is_err());
        assert_eq!(Confidence::from_option(None).unwrap(), Confidence::Unset);
        assert_eq!(Confidence::from_option(Some(0.5)).unwrap().as_option(), Some(0.5));
    }
}
