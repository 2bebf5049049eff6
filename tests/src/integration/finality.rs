//! # Finality Wait Tests
//!
//! Exercises the checkpoint-wait loop: an operation that is pending at
//! first and checkpointed later, nodes that answer the lookup with a
//! not-found error instead of null, and the budget timeout.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use localnet_harness::{HarnessError, TestContext, TestContextBuilder};
    use localnet_types::{ExecutionEffects, ExecutionStatus, OperationDigest};

    use crate::support::MockLedger;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn context(ledger: &Arc<MockLedger>, test_id: &str) -> TestContext {
        TestContextBuilder::new(test_id, "testnet", ledger.clone(), ledger.clone())
            .build()
            .unwrap()
    }

    fn success_effects(digest: &OperationDigest) -> ExecutionEffects {
        ExecutionEffects {
            digest: digest.clone(),
            status: ExecutionStatus::Success,
            changes: Vec::new(),
            events: Vec::new(),
        }
    }

    // =========================================================================
    // POLL LOOP
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_finality_returns_once_checkpointed() {
        let ledger = Arc::new(MockLedger::new());
        let ctx = context(&ledger, "finality-late");
        let digest = OperationDigest("op-late".to_string());

        // Checkpoint the operation after a few poll rounds have gone by.
        let effects = success_effects(&digest);
        let checkpoint = async {
            tokio::time::sleep(Duration::from_millis(900)).await;
            ledger.insert_operation(effects);
        };

        let (result, ()) = tokio::join!(ctx.wait_for_finality(&digest, 5_000), checkpoint);
        let effects = result.unwrap();
        assert_eq!(effects.digest, digest);
        assert!(effects.status.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_finality_tolerates_not_found_while_pending() {
        let ledger = Arc::new(MockLedger::new());
        // Unknown digests now come back as a not-found error, like node
        // builds that reject the query until the operation lands.
        ledger.fail_unknown_operations();
        let ctx = context(&ledger, "finality-not-found");
        let digest = OperationDigest("op-not-found".to_string());

        let effects = success_effects(&digest);
        let checkpoint = async {
            tokio::time::sleep(Duration::from_millis(900)).await;
            ledger.insert_operation(effects);
        };

        let (result, ()) = tokio::join!(ctx.wait_for_finality(&digest, 5_000), checkpoint);
        assert_eq!(result.unwrap().digest, digest);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_finality_times_out_on_never_checkpointed() {
        let ledger = Arc::new(MockLedger::new());
        let ctx = context(&ledger, "finality-timeout");
        let digest = OperationDigest("op-missing".to_string());

        let err = ctx.wait_for_finality(&digest, 1_000).await.unwrap_err();
        assert!(matches!(
            err,
            HarnessError::FinalityTimeout { digest: d, budget_ms: 1_000 } if d == digest
        ));
    }
}
