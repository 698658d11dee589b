//! Deposit decision engine.
//!
//! Turns a classified (or manually categorised) deposit into points and a bin
//! fill update. Every read and write goes through one [`DepositUnitOfWork`],
//! which the storage layer backs with a single database transaction; dropping
//! the unit without calling [`DepositUnitOfWork::commit`] must discard every
//! staged write.
//!
//! Guards run in order and the first failure rejects the deposit:
//!
//! 1. the bin exists ([`DepositRejection::BinNotFound`]);
//! 2. the bin is `active` ([`DepositRejection::BinUnavailable`]);
//! 3. the bin is below capacity ([`DepositRejection::BinFull`]);
//! 4. the user exists ([`DepositRejection::UserNotFound`]).
//!
//! Guard 3 is the only one that writes: it repairs a stale `active` status to
//! `full` and commits that single change before rejecting.
//!
//! Deposits carry no idempotency key. Submitting the same deposit twice
//! awards points twice.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::bin::{BinSnapshot, BinStatus, FillTransition, DEFAULT_FILL_INCREMENT};
use crate::error::CoreError;
use crate::scoring::{award_points, AwardTier, Confidence};
use crate::types::DbId;
use crate::waste::{PointsTable, WasteCategory};

// ---------------------------------------------------------------------------
// Request / outcome types
// ---------------------------------------------------------------------------

/// One deposit attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositRequest {
    pub user_id: DbId,
    pub bin_id: DbId,
    pub category: WasteCategory,
    pub confidence: Confidence,
    /// Pay the flat override reward regardless of confidence.
    pub manual_override: bool,
}

/// Why a deposit was refused. No points are awarded and no transaction is
/// recorded for any rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DepositRejection {
    #[error("Bin {bin_id} not found")]
    BinNotFound { bin_id: DbId },

    #[error("Bin unavailable (status: {current_status})")]
    BinUnavailable {
        bin_id: DbId,
        current_status: String,
    },

    #[error("Bin {bin_id} is full")]
    BinFull { bin_id: DbId },

    #[error("User {user_id} not found")]
    UserNotFound { user_id: DbId },
}

impl DepositRejection {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BinNotFound { .. } => "BIN_NOT_FOUND",
            Self::BinUnavailable { .. } => "BIN_UNAVAILABLE",
            Self::BinFull { .. } => "BIN_FULL",
            Self::UserNotFound { .. } => "USER_NOT_FOUND",
        }
    }
}

/// Summary of an accepted deposit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepositReceipt {
    pub transaction_id: Uuid,
    pub user_id: DbId,
    pub bin_id: DbId,
    pub category: WasteCategory,
    pub confidence: Option<f64>,
    pub points_awarded: i32,
    pub award_tier: AwardTier,
    pub new_fill_level: i32,
    pub bin_status: BinStatus,
}

/// Result of [`DepositEngine::deposit`].
#[derive(Debug, Clone, PartialEq)]
pub enum DepositOutcome {
    Accepted(DepositReceipt),
    Rejected(DepositRejection),
}

impl DepositOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Transaction row written for an accepted deposit.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub id: Uuid,
    pub user_id: DbId,
    pub bin_id: DbId,
    pub category: WasteCategory,
    pub confidence: Option<f64>,
    pub points_awarded: i32,
}

// ---------------------------------------------------------------------------
// Persistence seam
// ---------------------------------------------------------------------------

/// One atomic unit of work against bin, user, and transaction storage.
///
/// Writes become visible only on [`commit`](Self::commit). Implementations
/// must hold the bin row returned by
/// [`load_bin_for_update`](Self::load_bin_for_update) locked until the unit
/// ends, so concurrent deposits into the same bin serialize.
pub trait DepositUnitOfWork: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load_bin_for_update(
        &mut self,
        bin_id: DbId,
    ) -> impl Future<Output = Result<Option<BinSnapshot>, Self::Error>> + Send;

    fn user_exists(
        &mut self,
        user_id: DbId,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    fn mark_bin_full(&mut self, bin_id: DbId)
        -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn insert_transaction(
        &mut self,
        record: &NewTransaction,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn add_user_points(
        &mut self,
        user_id: DbId,
        points: i32,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn update_bin_fill(
        &mut self,
        bin_id: DbId,
        transition: &FillTransition,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn commit(self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Applies the award policy and bin rules to deposits.
///
/// Holds only configuration; every call borrows its own unit of work.
#[derive(Debug, Clone)]
pub struct DepositEngine {
    points: Arc<PointsTable>,
    fill_increment: i32,
}

impl Default for DepositEngine {
    fn default() -> Self {
        Self {
            points: Arc::new(PointsTable::reference()),
            fill_increment: DEFAULT_FILL_INCREMENT,
        }
    }
}

impl DepositEngine {
    pub fn new(points: Arc<PointsTable>, fill_increment: i32) -> Result<Self, CoreError> {
        if fill_increment <= 0 {
            return Err(CoreError::Validation(format!(
                "fill increment must be positive, got {fill_increment}"
            )));
        }
        Ok(Self {
            points,
            fill_increment,
        })
    }

    pub fn points_table(&self) -> &PointsTable {
        &self.points
    }

    pub fn fill_increment(&self) -> i32 {
        self.fill_increment
    }

    /// Run one deposit to completion inside `unit`.
    ///
    /// Business-rule refusals come back as [`DepositOutcome::Rejected`];
    /// `Err` is reserved for storage failures, in which case nothing was
    /// committed.
    pub async fn deposit<U: DepositUnitOfWork>(
        &self,
        mut unit: U,
        request: &DepositRequest,
    ) -> Result<DepositOutcome, U::Error> {
        let bin_id = request.bin_id;

        let Some(bin) = unit.load_bin_for_update(bin_id).await? else {
            return Ok(self.reject(DepositRejection::BinNotFound { bin_id }));
        };

        if !bin.status.accepts_deposits() {
            return Ok(self.reject(DepositRejection::BinUnavailable {
                bin_id,
                current_status: bin.status.as_str().to_string(),
            }));
        }

        if bin.is_at_capacity() {
            // Status still says active at full capacity: persist the repair
            // even though the deposit is refused.
            unit.mark_bin_full(bin_id).await?;
            unit.commit().await?;
            tracing::warn!(bin_id, fill_level = bin.fill_level, "Repaired stale status on full bin");
            return Ok(self.reject(DepositRejection::BinFull { bin_id }));
        }

        if !unit.user_exists(request.user_id).await? {
            return Ok(self.reject(DepositRejection::UserNotFound {
                user_id: request.user_id,
            }));
        }

        let award = award_points(
            self.points.lookup(request.category),
            request.confidence,
            request.manual_override,
        );
        let transition = bin.after_deposit(self.fill_increment);

        let record = NewTransaction {
            id: Uuid::now_v7(),
            user_id: request.user_id,
            bin_id,
            category: request.category,
            confidence: request.confidence.as_option(),
            points_awarded: award.points,
        };

        unit.insert_transaction(&record).await?;
        unit.add_user_points(request.user_id, award.points).await?;
        unit.update_bin_fill(bin_id, &transition).await?;
        unit.commit().await?;

        tracing::info!(
            transaction_id = %record.id,
            user_id = request.user_id,
            bin_id,
            category = %request.category,
            points = award.points,
            tier = ?award.tier,
            fill_level = transition.fill_level,
            bin_status = %transition.status,
            "Deposit accepted"
        );

        Ok(DepositOutcome::Accepted(DepositReceipt {
            transaction_id: record.id,
            user_id: request.user_id,
            bin_id,
            category: request.category,
            confidence: record.confidence,
            points_awarded: award.points,
            award_tier: award.tier,
            new_fill_level: transition.fill_level,
            bin_status: transition.status,
        }))
    }

    fn reject(&self, rejection: DepositRejection) -> DepositOutcome {
        tracing::info!(code = rejection.code(), %rejection, "Deposit rejected");
        DepositOutcome::Rejected(rejection)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
