//! # Funding Flow Tests
//!
//! Exercises the idempotent funding invariant end to end: no-op on
//! already-funded accounts, the single-operation treasury path, the
//! request-and-poll faucet path, and the failure modes when sources are
//! exhausted or absent.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use localnet_harness::ports::{FaucetApi, OperationSigner};
    use localnet_harness::{HarnessError, SyntheticAccount, TestContext, TestContextBuilder};
    use localnet_types::{FundingRequirement, FundingShortfall, OperationKind};

    use crate::support::{record, MockFaucet, MockLedger};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Treasury account with one large spendable record on the ledger.
    fn seeded_treasury(ledger: &MockLedger) -> Arc<SyntheticAccount> {
        let treasury = Arc::new(SyntheticAccount::derive("suite", "treasury"));
        ledger.set_resources(
            treasury.address(),
            vec![record("0x7e50", 10, 100_000_000_000)],
        );
        treasury
    }

    fn treasury_context(ledger: &Arc<MockLedger>, test_id: &str) -> TestContext {
        let treasury = seeded_treasury(ledger);
        TestContextBuilder::new(test_id, "testnet", ledger.clone(), ledger.clone())
            .treasury(treasury)
            .build()
            .unwrap()
    }

    // =========================================================================
    // NO-OP AND TREASURY PATH
    // =========================================================================

    #[tokio::test]
    async fn test_fund_is_noop_when_already_satisfied() {
        let ledger = Arc::new(MockLedger::new());
        let ctx = treasury_context(&ledger, "noop");
        let account = ctx.create_account("payer");
        ledger.set_resources(
            account.address(),
            vec![record("0x01", 1, 600_000_000), record("0x02", 1, 600_000_000)],
        );

        ctx.fund(account.address(), FundingRequirement::default()).await.unwrap();

        assert_eq!(ledger.submit_count(), 0);
    }

    #[tokio::test]
    async fn test_treasury_funding_submits_once_and_is_idempotent() {
        let ledger = Arc::new(MockLedger::new());
        let ctx = treasury_context(&ledger, "idempotent");
        let account = ctx.create_account("payer");

        ctx.fund(account.address(), FundingRequirement::default()).await.unwrap();
        // Second call observes the satisfied invariant and does nothing.
        ctx.fund(account.address(), FundingRequirement::default()).await.unwrap();

        assert_eq!(ledger.submit_count(), 1);
        let holdings = ledger.resources_of(account.address());
        assert!(FundingRequirement::default().is_satisfied_by(&holdings));
    }

    #[tokio::test]
    async fn test_treasury_share_sizing_meets_all_clauses() {
        let ledger = Arc::new(MockLedger::new());
        let ctx = treasury_context(&ledger, "sizing");
        let account = ctx.create_account("payer");

        let requirement = FundingRequirement {
            min_balance: 1_000,
            min_resource_count: 3,
            min_per_resource_balance: 100,
        };
        ctx.fund(account.address(), requirement).await.unwrap();

        let submitted = ledger.submitted();
        assert_eq!(submitted.len(), 1);
        match &submitted[0].operation.kind {
            OperationKind::PayShares { recipient, share_amount, share_count } => {
                assert_eq!(*recipient, account.address());
                assert_eq!(*share_count, 3);
                // ceil(1000 / 3) = 334 dominates the per-record minimum.
                assert_eq!(*share_amount, 334);
            }
            other => panic!("expected PayShares, got {other:?}"),
        }
        assert!(requirement.is_satisfied_by(&ledger.resources_of(account.address())));
    }

    // =========================================================================
    // FAUCET PATH
    // =========================================================================

    #[tokio::test]
    async fn test_faucet_funding_credits_missing_records() {
        let ledger = Arc::new(MockLedger::new());
        let faucet = Arc::new(MockFaucet::delivering(ledger.clone(), 600_000_000));
        let ctx = TestContextBuilder::new("faucet-ok", "testnet", ledger.clone(), ledger.clone())
            .faucet(faucet.clone())
            .build()
            .unwrap();
        let account = ctx.create_account("payer");

        ctx.fund(account.address(), FundingRequirement::default()).await.unwrap();

        // Two records short, so exactly two credit requests.
        assert_eq!(faucet.calls(), 2);
        assert_eq!(ledger.submit_count(), 0);
        let holdings = ledger.resources_of(account.address());
        assert!(FundingRequirement::default().is_satisfied_by(&holdings));
    }

    #[tokio::test(start_paused = true)]
    async fn test_faucet_exhaustion_names_endpoint_and_shortfall() {
        let ledger = Arc::new(MockLedger::new());
        let faucet = Arc::new(MockFaucet::dry(ledger.clone()));
        let ctx = TestContextBuilder::new("faucet-dry", "testnet", ledger.clone(), ledger.clone())
            .faucet(faucet.clone())
            .build()
            .unwrap();
        let account = ctx.create_account("payer");

        let err = ctx.fund(account.address(), FundingRequirement::default()).await.unwrap_err();
        match err {
            HarnessError::Funding { address, endpoint, shortfall } => {
                assert_eq!(address, account.address());
                assert_eq!(endpoint, faucet.endpoint());
                assert_eq!(shortfall, FundingShortfall::ResourceCount { have: 0, need: 2 });
            }
            other => panic!("expected Funding error, got {other:?}"),
        }
        // Five attempts, two requests each.
        assert_eq!(faucet.calls(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_faucet_exhaustion_reports_holdings_after_last_credit() {
        let ledger = Arc::new(MockLedger::new());
        // Delivers dust: every credit lands but never closes the gap.
        let faucet = Arc::new(MockFaucet::delivering(ledger.clone(), 10));
        let ctx = TestContextBuilder::new("faucet-dust", "testnet", ledger.clone(), ledger.clone())
            .faucet(faucet.clone())
            .build()
            .unwrap();
        let account = ctx.create_account("payer");

        let requirement = FundingRequirement {
            min_balance: 1_000,
            min_resource_count: 2,
            min_per_resource_balance: 100,
        };
        let err = ctx.fund(account.address(), requirement).await.unwrap_err();

        // Two credits on the first attempt, one per attempt after.
        assert_eq!(faucet.calls(), 6);
        match err {
            HarnessError::Funding { shortfall, .. } => {
                // The shortfall counts the final attempt's credit too.
                assert_eq!(shortfall, FundingShortfall::AggregateBalance { have: 60, need: 1_000 });
            }
            other => panic!("expected Funding error, got {other:?}"),
        }
    }

    // =========================================================================
    // NO SOURCE
    // =========================================================================

    #[tokio::test]
    async fn test_no_funding_source_fails_fast() {
        let ledger = Arc::new(MockLedger::new());
        let ctx = TestContextBuilder::new("no-source", "testnet", ledger.clone(), ledger.clone())
            .build()
            .unwrap();
        let account = ctx.create_account("payer");

        let err = ctx.fund(account.address(), FundingRequirement::default()).await.unwrap_err();
        assert!(matches!(
            err,
            HarnessError::NoFundingSource { address } if address == account.address()
        ));
        assert_eq!(ledger.submit_count(), 0);
    }
}
