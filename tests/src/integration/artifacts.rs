//! # Artifact Ledger Tests
//!
//! Exercises the file-backed object index: row lifecycle across create,
//! mutate, delete, and wrap; the consumed-rows-are-kept rule; and reload
//! from the JSON file a previous run wrote.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use localnet_harness::ArtifactLedger;
    use localnet_types::{Address, ObjectId, ResourceChange, ResourceDescriptor};

    use crate::support::MockLedger;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn created(id: &str, version: u64) -> ResourceChange {
        ResourceChange::Created {
            id: ObjectId::new(id),
            version,
            digest: format!("digest-{id}-{version}"),
            object_type: Some("0x2::coin::Coin".to_string()),
            owner: Some(Address([0x11; 32])),
        }
    }

    fn mutated(id: &str, version: u64) -> ResourceChange {
        ResourceChange::Mutated {
            id: ObjectId::new(id),
            owner: Address([0x22; 32]),
            version,
            digest: format!("digest-{id}-{version}"),
        }
    }

    // =========================================================================
    // ROW LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_create_then_mutate_keeps_single_row() {
        let dir = tempfile::tempdir().unwrap();
        let reader = MockLedger::new();
        let ledger = ArtifactLedger::open(dir.path(), "testnet").unwrap();

        let affected = ledger.record_changes(&reader, &[created("0xaa", 1)]).await.unwrap();
        assert_eq!(affected.created.len(), 1);
        let first_seen = ledger.get(&ObjectId::new("0xaa")).await.unwrap().created_at;
        assert!(first_seen.is_some());

        let affected = ledger.record_changes(&reader, &[mutated("0xaa", 2)]).await.unwrap();
        assert_eq!(affected.updated.len(), 1);

        let rows = ledger.snapshot().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].version, 2);
        assert_eq!(rows[0].owner, Address([0x22; 32]));
        // The creation timestamp survives mutation.
        assert_eq!(rows[0].created_at, first_seen);
    }

    #[tokio::test]
    async fn test_delete_stamps_row_and_excludes_it_from_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let reader = MockLedger::new();
        let ledger = ArtifactLedger::open(dir.path(), "testnet").unwrap();

        ledger.record_changes(&reader, &[created("0xbb", 1)]).await.unwrap();
        let affected = ledger
            .record_changes(&reader, &[ResourceChange::Deleted { id: ObjectId::new("0xbb"), version: 2 }])
            .await
            .unwrap();
        assert_eq!(affected.deleted, vec![ObjectId::new("0xbb")]);

        let row = ledger.get(&ObjectId::new("0xbb")).await.unwrap();
        assert!(row.deleted_at.is_some());
        assert!(row.is_consumed());

        // A late mutation of the consumed id is a no-op.
        let affected = ledger.record_changes(&reader, &[mutated("0xbb", 3)]).await.unwrap();
        assert!(affected.updated.is_empty());
        assert_eq!(ledger.get(&ObjectId::new("0xbb")).await.unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_wrap_stamps_row() {
        let dir = tempfile::tempdir().unwrap();
        let reader = MockLedger::new();
        let ledger = ArtifactLedger::open(dir.path(), "testnet").unwrap();

        ledger.record_changes(&reader, &[created("0xcc", 1)]).await.unwrap();
        let affected = ledger
            .record_changes(&reader, &[ResourceChange::Wrapped { id: ObjectId::new("0xcc"), version: 2 }])
            .await
            .unwrap();
        assert_eq!(affected.wrapped, vec![ObjectId::new("0xcc")]);

        let row = ledger.get(&ObjectId::new("0xcc")).await.unwrap();
        assert!(row.wrapped_at.is_some());
        assert!(row.deleted_at.is_none());
        assert!(row.is_consumed());
    }

    #[tokio::test]
    async fn test_mutation_of_unknown_id_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let reader = MockLedger::new();
        let ledger = ArtifactLedger::open(dir.path(), "testnet").unwrap();

        let affected = ledger.record_changes(&reader, &[mutated("0xee", 4)]).await.unwrap();
        assert!(affected.updated.is_empty());
        assert!(ledger.snapshot().await.is_empty());
    }

    // =========================================================================
    // DESCRIPTOR ENRICHMENT
    // =========================================================================

    #[tokio::test]
    async fn test_created_row_prefers_authoritative_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let reader = MockLedger::new();
        reader.insert_descriptor(ResourceDescriptor {
            id: ObjectId::new("0xdd"),
            object_type: "0x7::registry::Entry".to_string(),
            owner: Address([0x33; 32]),
            version: 1,
            digest: "digest-authoritative".to_string(),
        });
        let ledger = ArtifactLedger::open(dir.path(), "testnet").unwrap();

        // Inline change data says Coin; the fetched descriptor wins.
        ledger.record_changes(&reader, &[created("0xdd", 1)]).await.unwrap();
        let row = ledger.get(&ObjectId::new("0xdd")).await.unwrap();
        assert_eq!(row.object_type, "0x7::registry::Entry");
        assert_eq!(row.owner, Address([0x33; 32]));
        assert_eq!(row.digest, "digest-authoritative");
    }

    // =========================================================================
    // PERSISTENCE
    // =========================================================================

    #[tokio::test]
    async fn test_rows_survive_reopen_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let reader = MockLedger::new();

        {
            let ledger = ArtifactLedger::open(dir.path(), "persistnet").unwrap();
            ledger.record_changes(&reader, &[created("0xaa", 1), created("0xab", 1)]).await.unwrap();
            ledger
                .record_changes(
                    &reader,
                    &[ResourceChange::Deleted { id: ObjectId::new("0xab"), version: 2 }],
                )
                .await
                .unwrap();
        }
        assert!(dir.path().join("persistnet.artifacts.json").exists());

        let reopened = ArtifactLedger::open(dir.path(), "persistnet").unwrap();
        let rows = reopened.snapshot().await;
        assert_eq!(rows.len(), 2);
        // Consumed rows are kept, timestamp intact.
        let consumed = reopened.get(&ObjectId::new("0xab")).await.unwrap();
        assert!(consumed.deleted_at.is_some());
        let live = reopened.get(&ObjectId::new("0xaa")).await.unwrap();
        assert!(!live.is_consumed());
    }

    // =========================================================================
    // EXECUTOR INTEGRATION
    // =========================================================================

    #[tokio::test]
    async fn test_successful_execution_records_created_artifacts() {
        use localnet_harness::ports::OperationSigner;
        use localnet_harness::{Executor, SyntheticAccount};
        use localnet_types::{Operation, OperationKind};

        use crate::support::record;

        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(MockLedger::new());
        let signer = SyntheticAccount::derive("artifacts", "payer");
        ledger.set_resources(signer.address(), vec![record("0x01", 1, 1_000)]);

        let artifacts = Arc::new(ArtifactLedger::open(dir.path(), "testnet").unwrap());
        let executor = Executor::new(ledger.clone(), ledger.clone(), artifacts.clone());

        let effects = ledger.success_effects(vec![created("0xf1", 1)]);
        ledger.script_submit(Ok(effects));

        let operation = Operation::new(
            signer.address(),
            OperationKind::Raw(serde_json::json!({ "op": "mint" })),
        );
        let result = executor.execute(operation, &signer).await.unwrap();
        assert_eq!(result.artifacts.created.len(), 1);
        assert!(artifacts.get(&ObjectId::new("0xf1")).await.is_some());
    }
}
