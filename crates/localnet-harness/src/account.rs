//! Deterministic synthetic accounts.
//!
//! The keypair seed is SHA3-256 over `test_id` and `label`, so re-running a
//! failed test with the same ids reproduces the same address. This is a
//! debugging convenience, not a security property; concurrent tests get
//! isolation by choosing distinct labels, never by randomness.

use ed25519_dalek::{Signer, SigningKey};
use sha3::{Digest, Sha3_256};

use localnet_types::{Address, Operation, SignedOperation};

use crate::ports::OperationSigner;

/// A deterministically derived keypair plus address.
pub struct SyntheticAccount {
    label: String,
    signing_key: SigningKey,
    address: Address,
}

impl SyntheticAccount {
    /// Derives the account for `(test_id, label)`.
    pub fn derive(test_id: &str, label: &str) -> Self {
        let mut hasher = Sha3_256::new();
        hasher.update(test_id.as_bytes());
        hasher.update([0u8]); // domain separator between the two inputs
        hasher.update(label.as_bytes());
        let seed: [u8; 32] = hasher.finalize().into();

        let signing_key = SigningKey::from_bytes(&seed);
        let address = address_for(&signing_key);
        Self { label: label.to_string(), signing_key, address }
    }

    /// Wraps an existing signing key (keystore accounts reuse this).
    pub fn from_signing_key(label: &str, signing_key: SigningKey) -> Self {
        let address = address_for(&signing_key);
        Self { label: label.to_string(), signing_key, address }
    }

    /// The label this account was derived under.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The hex-encoded public key.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().as_bytes())
    }
}

fn address_for(signing_key: &SigningKey) -> Address {
    let digest = Sha3_256::digest(signing_key.verifying_key().as_bytes());
    Address(digest.into())
}

impl OperationSigner for SyntheticAccount {
    fn address(&self) -> Address {
        self.address
    }

    fn sign_operation(&self, operation: &Operation) -> SignedOperation {
        // Canonical bytes are the serde_json encoding of the operation body.
        // Serialization of these types cannot fail.
        let bytes = serde_json::to_vec(operation).unwrap_or_default();
        let signature = self.signing_key.sign(&bytes);
        SignedOperation {
            operation: operation.clone(),
            signature: hex::encode(signature.to_bytes()),
            public_key: self.public_key_hex(),
        }
    }
}
