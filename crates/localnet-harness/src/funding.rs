//! Idempotent account funding.
//!
//! Funds flow from one of two sources: a pre-funded treasury account (one
//! atomic split-and-transfer operation, so no partial-funding state is ever
//! observable) or the network faucet (repeated request-and-poll). A call on
//! an already-funded account is a no-op, which is what makes concurrent
//! test cases safe to over-ask.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use localnet_types::{Address, FundingRequirement, Operation, OperationKind};

use crate::account::SyntheticAccount;
use crate::error::HarnessError;
use crate::exec::Executor;
use crate::ports::{FaucetApi, LedgerReader, OperationSigner};

/// Faucet attempt bound.
const FAUCET_ATTEMPTS: u32 = 5;

/// Poll interval while waiting for credited resources to land.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Per-attempt poll budget.
const POLL_BUDGET: Duration = Duration::from_secs(10);

/// Brings synthetic accounts up to their funding requirement.
pub struct FundingService {
    reader: Arc<dyn LedgerReader>,
    executor: Arc<Executor>,
    treasury: Option<Arc<SyntheticAccount>>,
    faucet: Option<Arc<dyn FaucetApi>>,
}

impl FundingService {
    /// Builds the service. Either source may be absent; `fund` fails fast
    /// when both are.
    pub fn new(
        reader: Arc<dyn LedgerReader>,
        executor: Arc<Executor>,
        treasury: Option<Arc<SyntheticAccount>>,
        faucet: Option<Arc<dyn FaucetApi>>,
    ) -> Self {
        Self { reader, executor, treasury, faucet }
    }

    /// Guarantees `account` satisfies `requirement`.
    ///
    /// Idempotent: when the invariant already holds this performs no
    /// funding operation at all.
    pub async fn fund(
        &self,
        account: Address,
        requirement: FundingRequirement,
    ) -> Result<(), HarnessError> {
        let records = self.reader.owned_resources(account).await?;
        let Some(shortfall) = requirement.shortfall(&records) else {
            debug!(%account, "funding requirement already satisfied; no-op");
            return Ok(());
        };
        debug!(%account, %shortfall, "funding required");

        if let Some(treasury) = &self.treasury {
            return self.fund_from_treasury(treasury, account, requirement).await;
        }
        if let Some(faucet) = &self.faucet {
            return self.fund_from_faucet(faucet.as_ref(), account, requirement).await;
        }
        Err(HarnessError::NoFundingSource { address: account })
    }

    /// Treasury path: one atomic operation splitting the treasury's native
    /// resource into shares and transferring each to the target.
    async fn fund_from_treasury(
        &self,
        treasury: &SyntheticAccount,
        account: Address,
        requirement: FundingRequirement,
    ) -> Result<(), HarnessError> {
        let share_count = requirement.min_resource_count.max(1) as u64;
        // Each share meets the per-record minimum and the shares together
        // meet the aggregate minimum.
        let share_amount = requirement
            .min_per_resource_balance
            .max(requirement.min_balance.div_ceil(share_count));

        let operation = Operation::new(
            treasury.address(),
            OperationKind::PayShares { recipient: account, share_amount, share_count },
        );

        info!(%account, share_count, share_amount, "funding from treasury");
        let result = self.executor.execute(operation, treasury).await?;
        if !result.status.is_success() {
            return Err(HarnessError::Execution(format!(
                "treasury funding operation {} aborted",
                result.digest
            )));
        }
        Ok(())
    }

    /// Faucet path: request per missing record, then poll holdings until
    /// the invariant is satisfied or the attempt budget runs out.
    async fn fund_from_faucet(
        &self,
        faucet: &dyn FaucetApi,
        account: Address,
        requirement: FundingRequirement,
    ) -> Result<(), HarnessError> {
        for attempt in 1..=FAUCET_ATTEMPTS {
            let records = self.reader.owned_resources(account).await?;
            if requirement.is_satisfied_by(&records) {
                return Ok(());
            }

            let spendable = records.iter().filter(|r| r.is_spendable()).count();
            let missing = requirement.min_resource_count.saturating_sub(spendable).max(1);
            info!(%account, attempt, missing, "requesting faucet credits");
            for _ in 0..missing {
                faucet.credit(account).await?;
            }

            if self.poll_until_funded(account, &requirement).await? {
                return Ok(());
            }
            warn!(%account, attempt, "faucet poll budget elapsed; holdings still short");
        }

        // Re-read holdings after the final attempt so the reported shortfall
        // reflects any credits that landed during the last poll window.
        let records = self.reader.owned_resources(account).await?;
        match requirement.shortfall(&records) {
            Some(shortfall) => {
                Err(HarnessError::Funding { address: account, endpoint: faucet.endpoint(), shortfall })
            }
            None => Ok(()),
        }
    }

    /// Polls holdings at a fixed interval within one attempt's budget.
    async fn poll_until_funded(
        &self,
        account: Address,
        requirement: &FundingRequirement,
    ) -> Result<bool, HarnessError> {
        let deadline = Instant::now() + POLL_BUDGET;
        loop {
            let records = self.reader.owned_resources(account).await?;
            if requirement.is_satisfied_by(&records) {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}
