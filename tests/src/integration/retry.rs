//! # Conflict Retry Tests
//!
//! Exercises the execution wrapper's recovery contract: stale and locked
//! rejections re-select the fee resource and retry once, everything else
//! propagates from whatever attempt hit it, and the attempt bound is
//! honored when raised.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use localnet_harness::ports::OperationSigner;
    use localnet_harness::{
        ArtifactLedger, Executor, HarnessError, SyntheticAccount, TestContext, TestContextBuilder,
    };
    use localnet_types::{ExecutionStatus, ObjectId, Operation, OperationKind, ResourceChange};

    use crate::support::{record, MockLedger};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// An account holding four spendable records with descending freshness.
    fn seeded_signer(ledger: &MockLedger) -> SyntheticAccount {
        let signer = SyntheticAccount::derive("retry", "payer");
        ledger.set_resources(
            signer.address(),
            vec![
                record("0xaaaa0001", 5, 1_000),
                record("0xaaaa0002", 4, 900),
                record("0xaaaa0003", 3, 800),
                record("0xaaaa0004", 2, 700),
            ],
        );
        signer
    }

    fn context(ledger: &Arc<MockLedger>, test_id: &str) -> TestContext {
        TestContextBuilder::new(test_id, "testnet", ledger.clone(), ledger.clone())
            .build()
            .unwrap()
    }

    fn noop_operation(signer: &SyntheticAccount) -> Operation {
        Operation::new(signer.address(), OperationKind::Raw(serde_json::json!({ "op": "noop" })))
    }

    // =========================================================================
    // STALE AND LOCKED RECOVERY
    // =========================================================================

    #[tokio::test]
    async fn test_stale_rejection_reselects_fee_and_succeeds() {
        let ledger = Arc::new(MockLedger::new());
        let ctx = context(&ledger, "stale-recover");
        let signer = seeded_signer(&ledger);

        // First submission rejected naming the freshest record as stale.
        ledger.script_submit(Err("object version mismatch for object 0xaaaa0001"));

        let result = ctx.execute(noop_operation(&signer), &signer).await.unwrap();
        assert!(result.status.is_success());

        let submitted = ledger.submitted();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[0].operation.fee_resource, Some(ObjectId::new("0xaaaa0001")));
        // Retry excludes the conflicted id and picks the next freshest.
        assert_eq!(submitted[1].operation.fee_resource, Some(ObjectId::new("0xaaaa0002")));
    }

    #[tokio::test]
    async fn test_locked_rejection_without_ids_still_retries() {
        let ledger = Arc::new(MockLedger::new());
        let ctx = context(&ledger, "locked-recover");
        let signer = seeded_signer(&ledger);

        ledger.script_submit(Err("objects are locked; retry later"));

        let result = ctx.execute(noop_operation(&signer), &signer).await.unwrap();
        assert!(result.status.is_success());
        assert_eq!(ledger.submit_count(), 2);
        // Even with no extractable ids the used fee is excluded on retry.
        let submitted = ledger.submitted();
        assert_ne!(submitted[0].operation.fee_resource, submitted[1].operation.fee_resource);
    }

    #[tokio::test]
    async fn test_permanent_staleness_stops_after_one_retry() {
        let ledger = Arc::new(MockLedger::new());
        let ctx = context(&ledger, "stale-permanent");
        let signer = seeded_signer(&ledger);

        ledger.script_submit(Err("object version mismatch for object 0xdead"));
        ledger.script_submit(Err("object version mismatch for object 0xdead"));

        let err = ctx.execute(noop_operation(&signer), &signer).await.unwrap_err();
        assert!(matches!(
            &err,
            HarnessError::Execution(message) if message.contains("version mismatch")
        ));
        assert_eq!(ledger.submit_count(), 2);
    }

    // =========================================================================
    // NON-RETRYABLE FAILURES
    // =========================================================================

    #[tokio::test]
    async fn test_unclassified_rejection_submits_once() {
        let ledger = Arc::new(MockLedger::new());
        let ctx = context(&ledger, "other-failure");
        let signer = seeded_signer(&ledger);

        ledger.script_submit(Err("insufficient balance for fee"));

        let err = ctx.execute(noop_operation(&signer), &signer).await.unwrap_err();
        assert!(matches!(
            &err,
            HarnessError::Execution(message) if message.contains("insufficient balance")
        ));
        assert_eq!(ledger.submit_count(), 1);
    }

    #[tokio::test]
    async fn test_executed_abort_is_terminal_and_records_nothing() {
        let ledger = Arc::new(MockLedger::new());
        let ctx = context(&ledger, "aborted");
        let signer = seeded_signer(&ledger);

        let mut effects = ledger.success_effects(vec![ResourceChange::Created {
            id: ObjectId::new("0xc0de"),
            version: 1,
            digest: "digest-c0de".to_string(),
            object_type: None,
            owner: None,
        }]);
        effects.status = ExecutionStatus::Failure { reason: "MoveAbort(7)".to_string() };
        ledger.script_submit(Ok(effects));

        let result = ctx.execute(noop_operation(&signer), &signer).await.unwrap();
        assert!(!result.status.is_success());
        assert_eq!(ledger.submit_count(), 1);
        // Aborted operations leave no artifact rows behind.
        assert!(ctx.artifacts().snapshot().await.is_empty());
        assert!(result.artifacts.created.is_empty());
    }

    #[tokio::test]
    async fn test_no_spendable_fee_resource_fails_before_submission() {
        let ledger = Arc::new(MockLedger::new());
        let ctx = context(&ledger, "broke");
        let signer = SyntheticAccount::derive("retry", "pauper");

        let err = ctx.execute(noop_operation(&signer), &signer).await.unwrap_err();
        assert!(matches!(
            err,
            HarnessError::NoFeeResource { address, excluded: 0 } if address == signer.address()
        ));
        assert_eq!(ledger.submit_count(), 0);
    }

    // =========================================================================
    // RAISED ATTEMPT BOUND
    // =========================================================================

    #[tokio::test]
    async fn test_raised_max_attempts_is_honored() {
        let ledger = Arc::new(MockLedger::new());
        let signer = seeded_signer(&ledger);

        let artifacts_dir = tempfile::tempdir().unwrap();
        let artifacts =
            Arc::new(ArtifactLedger::open(artifacts_dir.path(), "testnet").unwrap());
        let executor = Executor::new(ledger.clone(), ledger.clone(), artifacts);

        ledger.script_submit(Err("object version mismatch for object 0xdead"));
        ledger.script_submit(Err("object version mismatch for object 0xdead"));
        ledger.script_submit(Err("object version mismatch for object 0xdead"));

        let result = executor
            .execute_with_retry(noop_operation(&signer), &signer, 4)
            .await
            .unwrap();
        assert!(result.status.is_success());
        assert_eq!(ledger.submit_count(), 4);

        // Every attempt used a distinct fee resource.
        let fees: Vec<_> =
            ledger.submitted().iter().map(|s| s.operation.fee_resource.clone()).collect();
        for (i, fee) in fees.iter().enumerate() {
            for later in &fees[i + 1..] {
                assert_ne!(fee, later);
            }
        }
    }
}
