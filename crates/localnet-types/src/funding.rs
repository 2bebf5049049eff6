//! # Funding Requirements
//!
//! The invariant an account must satisfy before a test can rely on it:
//! enough resource records, enough aggregate balance, and at least one
//! record large enough to cover a single operation's fee on its own (many
//! dust-sized records are not a funded account).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::resources::ResourceRecord;

/// Default number of spendable records a funded account holds.
pub const DEFAULT_RESOURCE_COUNT: usize = 2;

/// Default per-record balance in minor units.
pub const DEFAULT_PER_RESOURCE_BALANCE: u64 = 500_000_000;

/// What an account must hold to count as funded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingRequirement {
    /// Minimum aggregate balance across all records, in minor units.
    pub min_balance: u64,
    /// Minimum number of spendable resource records.
    pub min_resource_count: usize,
    /// Minimum balance at least one single record must reach.
    pub min_per_resource_balance: u64,
}

impl Default for FundingRequirement {
    fn default() -> Self {
        Self {
            min_balance: DEFAULT_PER_RESOURCE_BALANCE * DEFAULT_RESOURCE_COUNT as u64,
            min_resource_count: DEFAULT_RESOURCE_COUNT,
            min_per_resource_balance: DEFAULT_PER_RESOURCE_BALANCE,
        }
    }
}

impl FundingRequirement {
    /// Builds a requirement from a record count, deriving the aggregate as
    /// per-record × count.
    pub fn with_resource_count(count: usize) -> Self {
        Self {
            min_balance: DEFAULT_PER_RESOURCE_BALANCE.saturating_mul(count.max(1) as u64),
            min_resource_count: count,
            min_per_resource_balance: DEFAULT_PER_RESOURCE_BALANCE,
        }
    }

    /// Evaluates the invariant against the account's current holdings.
    ///
    /// Returns `None` when the account is funded, otherwise the first unmet
    /// clause in check order: record count, aggregate balance, per-record
    /// minimum.
    pub fn shortfall(&self, records: &[ResourceRecord]) -> Option<FundingShortfall> {
        let spendable: Vec<&ResourceRecord> =
            records.iter().filter(|record| record.is_spendable()).collect();

        if spendable.len() < self.min_resource_count {
            return Some(FundingShortfall::ResourceCount {
                have: spendable.len(),
                need: self.min_resource_count,
            });
        }

        let aggregate: u64 = spendable.iter().map(|record| record.balance).sum();
        if aggregate < self.min_balance {
            return Some(FundingShortfall::AggregateBalance { have: aggregate, need: self.min_balance });
        }

        let largest = spendable.iter().map(|record| record.balance).max().unwrap_or(0);
        if largest < self.min_per_resource_balance {
            return Some(FundingShortfall::PerResourceMinimum {
                largest,
                need: self.min_per_resource_balance,
            });
        }

        None
    }

    /// Whether the holdings satisfy the invariant.
    pub fn is_satisfied_by(&self, records: &[ResourceRecord]) -> bool {
        self.shortfall(records).is_none()
    }
}

/// The specific clause of the funding invariant an account fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingShortfall {
    /// Too few spendable records.
    ResourceCount { have: usize, need: usize },
    /// Aggregate balance below the minimum.
    AggregateBalance { have: u64, need: u64 },
    /// No single record reaches the per-record minimum.
    PerResourceMinimum { largest: u64, need: u64 },
}

impl fmt::Display for FundingShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceCount { have, need } => {
                write!(f, "resource count {have} below required {need}")
            }
            Self::AggregateBalance { have, need } => {
                write!(f, "aggregate balance {have} below required {need}")
            }
            Self::PerResourceMinimum { largest, need } => {
                write!(f, "largest record {largest} below per-resource minimum {need}")
            }
        }
    }
}
