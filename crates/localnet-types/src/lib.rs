//! # Localnet Types Crate
//!
//! Core domain entities for the Localnet test-network harness.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all ledger-facing types shared by the RPC
//!   client and the harness live here.
//! - **No I/O**: this crate performs no network or filesystem access; it is
//!   pure data plus the invariant arithmetic that belongs with the data
//!   (funding shortfall evaluation, id normalization).
//!
//! ## Clusters
//!
//! - **Identity**: [`Address`], [`ObjectId`], [`OperationDigest`]
//! - **Resources**: [`ResourceRecord`], [`ResourceDescriptor`]
//! - **Artifacts**: [`ObjectArtifact`], [`ResourceChange`]
//! - **Funding**: [`FundingRequirement`], [`FundingShortfall`]
//! - **Execution**: [`Operation`], [`SignedOperation`], [`ExecutionEffects`],
//!   [`ExecutionStatus`], [`EventRecord`]
//! - **Diagnostics**: [`ReadinessSnapshot`]

pub mod artifacts;
pub mod execution;
pub mod funding;
pub mod ids;
pub mod resources;

pub use artifacts::{ObjectArtifact, ResourceChange};
pub use execution::{
    EventRecord, ExecutionEffects, ExecutionStatus, Operation, OperationKind, ReadinessSnapshot,
    SignedOperation,
};
pub use funding::{FundingRequirement, FundingShortfall};
pub use ids::{Address, IdParseError, ObjectId, OperationDigest};
pub use resources::{ResourceDescriptor, ResourceRecord};
