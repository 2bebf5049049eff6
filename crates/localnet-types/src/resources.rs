//! # Resource Records
//!
//! Individually versioned units of value or data on the ledger. A
//! [`ResourceRecord`] is the spendable view used for fee selection and
//! funding checks; a [`ResourceDescriptor`] is the full object view fetched
//! when the artifact ledger sees a newly created resource.

use serde::{Deserialize, Serialize};

use crate::ids::{Address, ObjectId};

/// A spendable resource record owned by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Normalized object id.
    pub id: ObjectId,
    /// Object version at the time of the query.
    pub version: u64,
    /// Content digest at the time of the query.
    pub digest: String,
    /// Balance in minor units. Zero for non-fungible data objects.
    pub balance: u64,
}

impl ResourceRecord {
    /// Whether this record can cover any fee at all.
    pub fn is_spendable(&self) -> bool {
        self.balance > 0
    }
}

/// The full descriptor of a ledger object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Normalized object id.
    pub id: ObjectId,
    /// Fully qualified type tag of the object.
    pub object_type: String,
    /// Current owner address.
    pub owner: Address,
    /// Current version.
    pub version: u64,
    /// Current content digest.
    pub digest: String,
}

/// Selects the freshest spendable record, skipping every excluded id.
///
/// "Freshest" means highest version, ties broken by larger balance so the
/// selected record is the most likely to cover a fee on its own.
pub fn freshest_spendable<'a>(
    records: &'a [ResourceRecord],
    excluded: &[ObjectId],
) -> Option<&'a ResourceRecord> {
    records
        .iter()
        .filter(|record| record.is_spendable() && !excluded.contains(&record.id))
        .max_by(|a, b| a.version.cmp(&b.version).then(a.balance.cmp(&b.balance)))
}
