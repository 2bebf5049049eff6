//! Treasury discovery from the node keystore.
//!
//! Genesis initialization writes pre-funded keys under
//! `<working_dir>/keystore/*.key` (hex-encoded ed25519 seeds). Candidates
//! are scanned in sorted filename order so discovery is deterministic; the
//! first entry with a live balance becomes the treasury, unless
//! `LOCALNET_TREASURY_INDEX` pins a specific entry.

use std::path::Path;

use ed25519_dalek::SigningKey;
use tracing::{debug, info, warn};

use crate::account::SyntheticAccount;
use crate::env::EnvOverrides;
use crate::error::HarnessError;
use crate::ports::{LedgerReader, OperationSigner};

/// Loads keystore entries in deterministic (sorted filename) order.
///
/// Unreadable or malformed entries are skipped with a warning; a missing
/// keystore directory yields an empty list, which simply means no treasury.
pub fn load_keystore(working_dir: &Path) -> Result<Vec<SyntheticAccount>, HarnessError> {
    let keystore_dir = working_dir.join("keystore");
    if !keystore_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut paths: Vec<_> = std::fs::read_dir(&keystore_dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "key"))
        .collect();
    paths.sort();

    let mut accounts = Vec::with_capacity(paths.len());
    for path in paths {
        match load_entry(&path) {
            Some(account) => accounts.push(account),
            None => warn!(path = %path.display(), "skipping malformed keystore entry"),
        }
    }
    Ok(accounts)
}

fn load_entry(path: &Path) -> Option<SyntheticAccount> {
    let raw = std::fs::read_to_string(path).ok()?;
    let seed_bytes = hex::decode(raw.trim()).ok()?;
    let seed: [u8; 32] = seed_bytes.as_slice().try_into().ok()?;
    let label = path.file_stem().map(|s| s.to_string_lossy().to_string())?;
    Some(SyntheticAccount::from_signing_key(&label, SigningKey::from_bytes(&seed)))
}

/// Locates a treasury account: a keystore entry with a non-zero balance.
///
/// Honors the `LOCALNET_TREASURY_INDEX` override; with no override, entries
/// are tested in keystore order and the first funded one wins. Returns
/// `None` when the keystore is empty or nothing holds a balance — the
/// funding service then falls back to the faucet.
pub async fn discover_treasury(
    working_dir: &Path,
    reader: &dyn LedgerReader,
    overrides: &EnvOverrides,
) -> Result<Option<SyntheticAccount>, HarnessError> {
    let mut accounts = load_keystore(working_dir)?;
    if accounts.is_empty() {
        debug!("keystore empty; no treasury candidate");
        return Ok(None);
    }

    if let Some(index) = overrides.treasury_index {
        if index >= accounts.len() {
            warn!(index, entries = accounts.len(), "treasury index override out of range");
            return Ok(None);
        }
        let account = accounts.swap_remove(index);
        info!(address = %account.address(), index, "treasury pinned by override");
        return Ok(Some(account));
    }

    for account in accounts {
        let records = reader.owned_resources(account.address()).await?;
        let balance: u64 = records.iter().map(|record| record.balance).sum();
        if balance > 0 {
            info!(address = %account.address(), balance, "treasury account discovered");
            return Ok(Some(account));
        }
    }

    debug!("no keystore entry holds a balance");
    Ok(None)
}
