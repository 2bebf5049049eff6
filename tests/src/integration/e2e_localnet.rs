//! # Live-Node Smoke Test
//!
//! End-to-end pass against a real ledger node binary: start a network with
//! a faucet, open a sandbox, fund an account, and tear everything down.
//! Skipped unless `LOCALNET_NODE_BIN` points at the binary.

#[cfg(test)]
mod tests {
    use localnet_harness::ports::OperationSigner;
    use localnet_harness::{NetworkConfig, NetworkInstance, TestContext};
    use localnet_types::FundingRequirement;

    const NODE_BIN_VAR: &str = "LOCALNET_NODE_BIN";

    #[tokio::test]
    async fn test_e2e_start_fund_and_stop() {
        let Ok(node_binary) = std::env::var(NODE_BIN_VAR) else {
            eprintln!("{NODE_BIN_VAR} not set; skipping live-node smoke test");
            return;
        };
        localnet_harness::logging::init();

        let config = NetworkConfig::new(node_binary, "smoke").with_faucet();
        let instance = NetworkInstance::start(config).await.expect("network start");
        assert!(instance.readiness().validator_count >= 1 || instance.readiness().epoch == 0);

        let ctx = TestContext::new(&instance, "e2e-smoke", None).expect("context");
        let account = ctx.create_account("payer");
        ctx.fund(account.address(), FundingRequirement::default()).await.expect("funding");

        let holdings = instance
            .reader()
            .owned_resources(account.address())
            .await
            .expect("holdings query");
        assert!(FundingRequirement::default().is_satisfied_by(&holdings));

        ctx.close().expect("context close");
        instance.stop().await.expect("network stop");
    }
}
