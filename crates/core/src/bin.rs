//! Bin status and capacity rules.
//!
//! A bin accepts deposits only while `active`. It becomes `full` once its fill
//! level reaches 90% of capacity (rounded up), and only an explicit reset
//! returns it to `active`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Fill units added by one accepted deposit.
pub const DEFAULT_FILL_INCREMENT: i32 = 10;

/// Percentage of capacity at which a bin is considered full.
pub const FULL_THRESHOLD_PERCENT: i32 = 90;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Operational status of a bin, stored as free text.
///
/// Parsing is case-insensitive. Any value that is not one of the known
/// statuses is kept verbatim in [`BinStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinStatus {
    Active,
    Full,
    Maintenance,
    Offline,
    Other(String),
}

impl BinStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "full" => Self::Full,
            "maintenance" => Self::Maintenance,
            "offline" => Self::Offline,
            _ => Self::Other(raw.to_string()),
        }
    }

    /// Value written to the `status` column.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Full => "full",
            Self::Maintenance => "maintenance",
            Self::Offline => "offline",
            Self::Other(raw) => raw,
        }
    }

    pub fn accepts_deposits(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for BinStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BinStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BinStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

// ---------------------------------------------------------------------------
// Capacity rules
// ---------------------------------------------------------------------------

/// `ceil(0.9 * capacity)` in integer arithmetic.
pub fn full_threshold(capacity: i32) -> i32 {
    let scaled = i64::from(capacity) * i64::from(FULL_THRESHOLD_PERCENT);
    // capacity is positive, so ceiling division is (a + b - 1) / b.
    ((scaled + 99) / 100) as i32
}

/// Validate a capacity / fill pair for a new or updated bin.
pub fn validate_capacity(capacity: i32, fill_level: i32) -> Result<(), CoreError> {
    if capacity <= 0 {
        return Err(CoreError::Validation(format!(
            "capacity must be positive, got {capacity}"
        )));
    }
    if !(0..=capacity).contains(&fill_level) {
        return Err(CoreError::Validation(format!(
            "fill_level must be between 0 and {capacity}, got {fill_level}"
        )));
    }
    Ok(())
}

/// Status a bin should hold at the given fill level.
///
/// Returns `Full` at or above the threshold, otherwise `current` unchanged.
pub fn status_for_fill(current: &BinStatus, capacity: i32, fill_level: i32) -> BinStatus {
    if fill_level >= full_threshold(capacity) {
        BinStatus::Full
    } else {
        current.clone()
    }
}

/// The bin state the decision engine reads under lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinSnapshot {
    pub id: DbId,
    pub capacity: i32,
    pub fill_level: i32,
    pub status: BinStatus,
}

/// New fill level and status after one accepted deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillTransition {
    pub fill_level: i32,
    pub status: BinStatus,
}

impl BinSnapshot {
    pub fn is_at_capacity(&self) -> bool {
        self.fill_level >= self.capacity
    }

    /// Apply `increment` fill units, clamped to capacity, and re-evaluate the
    /// full threshold.
    pub fn after_deposit(&self, increment: i32) -> FillTransition {
        let fill_level = self.fill_level.saturating_add(increment).min(self.capacity);
        FillTransition {
            status: status_for_fill(&self.status, self.capacity, fill_level),
            fill_level,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(capacity: i32, fill_level: i32) -> BinSnapshot {
        BinSnapshot {
            id: 1,
            capacity,
            fill_level,
            status: BinStatus::Active,
        }
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(BinStatus::parse("ACTIVE"), BinStatus::Active);
        assert_eq!(BinStatus::parse(" Full "), BinStatus::Full);
        assert_eq!(
            BinStatus::parse("Decommissioned"),
            BinStatus::Other("Decommissioned".to_string())
        );
        assert_eq!(BinStatus::parse("Decommissioned").as_str(), "Decommissioned");
    }

    #[test]
    fn only_active_accepts_deposits() {
        assert!(BinStatus::Active.accepts_deposits());
        assert!(!BinStatus::Full.accepts_deposits());
        assert!(!BinStatus::Maintenance.accepts_deposits());
        assert!(!BinStatus::Other("paused".into()).accepts_deposits());
    }

    #[test]
    fn threshold_rounds_up() {
        assert_eq!(full_threshold(100), 90);
        assert_eq!(full_threshold(15), 14); // 13.5 -> 14
        assert_eq!(full_threshold(1), 1);
        assert_eq!(full_threshold(11), 10); // 9.9 -> 10
    }

    #[test]
    fn deposit_adds_increment_and_stays_active_below_threshold() {
        let t = snapshot(100, 50).after_deposit(DEFAULT_FILL_INCREMENT);
        assert_eq!(t.fill_level, 60);
        assert_eq!(t.status, BinStatus::Active);
    }

    #[test]
    fn deposit_reaching_threshold_marks_full() {
        let t = snapshot(100, 89).after_deposit(DEFAULT_FILL_INCREMENT);
        assert_eq!(t.fill_level, 99);
        assert_eq!(t.status, BinStatus::Full);

        let t = snapshot(100, 80).after_deposit(DEFAULT_FILL_INCREMENT);
        assert_eq!(t.fill_level, 90);
        assert_eq!(t.status, BinStatus::Full);
    }

    #[test]
    fn deposit_clamps_to_capacity() {
        let t = snapshot(100, 95).after_deposit(DEFAULT_FILL_INCREMENT);
        assert_eq!(t.fill_level, 100);
        assert_eq!(t.status, BinStatus::Full);
    }

    #[test]
    fn at_capacity_check() {
        assert!(snapshot(100, 100).is_at_capacity());
        assert!(!snapshot(100, 99).is_at_capacity());
    }

    #[test]
    fn capacity_validation() {
        assert!(validate_capacity(100, 0).is_ok());
        assert!(validate_capacity(100, 100).is_ok());
        assert!(validate_capacity(0, 0).is_err());
        assert!(validate_capacity(100, 101).is_err());
        assert!(validate_capacity(100, -1).is_err());
    }
}
