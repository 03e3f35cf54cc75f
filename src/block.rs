//! Block construction and identity

use crate::crypto::double_sha256;
use crate::error::{ChainError, Result};
use crate::types::*;
use crate::utxo::UtxoPool;

impl Block {
    pub fn new(prev_block_hash: Option<Hash>, coinbase: Transaction) -> Self {
        Self {
            prev_block_hash,
            coinbase,
            transactions: Vec::new(),
        }
    }

    /// Genesis block: no parent, coinbase rewarding height 1
    pub fn genesis(coinbase: Transaction) -> Self {
        Self::new(None, coinbase)
    }

    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    pub fn transaction(&self, index: usize) -> Option<&Transaction> {
        self.transactions.get(index)
    }

    /// Block hash: double-SHA256 over the previous hash (zeroes for genesis),
    /// the coinbase identity and every transaction identity in order
    pub fn hash(&self) -> Hash {
        let prev = self.prev_block_hash.unwrap_or([0u8; 32]);
        let coinbase = self.coinbase.hash();
        let tx_hashes: Vec<Hash> = self.transactions.iter().map(Transaction::hash).collect();

        let mut parts: Vec<&[u8]> = Vec::with_capacity(tx_hashes.len() + 2);
        parts.push(&prev);
        parts.push(&coinbase);
        parts.extend(tx_hashes.iter().map(|h| h.as_slice()));
        double_sha256(&parts)
    }
}

/// ApplyCoinbase: 𝒯𝒳 × 𝒰𝒮 → 𝒰𝒮
///
/// Adds every coinbase output under `(coinbase.hash(), i)`. Coinbase outputs
/// are not validated. Fails without touching `utxo_pool` if any of the
/// outpoints already exists.
pub fn apply_coinbase(coinbase: &Transaction, utxo_pool: &mut UtxoPool) -> Result<()> {
    let tx_id = coinbase.hash();
    for index in 0..coinbase.outputs.len() {
        let outpoint = OutPoint::new(tx_id, index as Natural);
        if utxo_pool.contains(&outpoint) {
            return Err(ChainError::DuplicateUtxo(outpoint));
        }
    }

    for (index, output) in coinbase.outputs.iter().enumerate() {
        utxo_pool.add(OutPoint::new(tx_id, index as Natural), output.clone())?;
    }
    Ok(())
}
