//! # Ports
//!
//! Boundary traits the harness consumes. The node, its faucet, and the
//! package build/publish toolchain are external collaborators; everything
//! the harness needs from them is expressed here so tests can substitute
//! in-memory fakes.

pub mod outbound;

pub use outbound::{
    BuiltPackage, FaucetApi, LedgerError, LedgerReader, LedgerSubmitter, OperationSigner,
    PackagePublisher, PublishArtifact,
};
