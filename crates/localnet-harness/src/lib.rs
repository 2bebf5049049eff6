//! # Localnet Harness
//!
//! Provisions an isolated, disposable ledger network per test run, funds
//! synthetic accounts, executes state-mutating operations with automatic
//! recovery from version-conflict failures, and tears everything down
//! cleanly.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - Port implementations over localnet-rpc             │
//! │  process   - Node child-process lifecycle                       │
//! │  netport   - Free-port negotiation                              │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements / feeds ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/outbound.rs - LedgerReader, LedgerSubmitter, FaucetApi,  │
//! │                      PackagePublisher, OperationSigner          │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  instance  - NetworkInstance handle (start/stop)                │
//! │  context   - Per-test sandbox with helper actions               │
//! │  funding   - Idempotent account funding (treasury or faucet)    │
//! │  exec      - Conflict-aware execution retry wrapper             │
//! │  artifacts - File-backed object artifact ledger                 │
//! │  conflict  - Tagged-variant failure classifier                  │
//! │  account   - Deterministic synthetic accounts                   │
//! │  keystore  - Treasury discovery from the node keystore          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! NetworkInstance::start ──→ Ready ──→ TestContext::new ──→ test body
//!        │                                   │
//!        │                                   └── sandbox removed on every
//!        │                                       exit path (RAII)
//!        └── stop(): SIGTERM → bounded wait → SIGKILL → dir removal
//! ```
//!
//! ## Isolation Contract
//!
//! Synthetic accounts derive deterministically from `(test_id, label)` so a
//! failing run can be replayed against the same addresses. Two concurrent
//! test cases must therefore use distinct labels; the harness adds no
//! randomness and no locking across contexts.

pub mod account;
pub mod adapters;
pub mod artifacts;
pub mod conflict;
pub mod context;
pub mod env;
pub mod error;
pub mod exec;
pub mod funding;
pub mod instance;
pub mod keystore;
pub mod logging;
pub mod netport;
pub mod ports;
pub mod process;

pub use account::SyntheticAccount;
pub use artifacts::{AffectedArtifacts, ArtifactLedger};
pub use conflict::{ConflictClassifier, ConflictKind};
pub use context::{TestContext, TestContextBuilder};
pub use env::EnvOverrides;
pub use error::HarnessError;
pub use exec::{ExecutionResult, Executor};
pub use funding::FundingService;
pub use instance::{NetworkConfig, NetworkInstance};
pub use netport::{resolve_ports, PortPlan};
pub use process::{NodeLaunchConfig, NodeProcess, ProcessState};
