//! Pending transaction pool
//!
//! Transactions wait here, unvalidated, until a block includes them. Their
//! validity depends on the branch they end up on, so nothing is checked on
//! insertion.

use crate::types::*;
use std::collections::HashMap;

/// Mempool data structure: identity hash → transaction
#[derive(Debug, Clone, Default)]
pub struct TransactionPool {
    txs: HashMap<Hash, Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `tx`, replacing any pending transaction with the same identity
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.txs.insert(tx.hash(), tx);
    }

    pub fn remove_transaction(&mut self, tx_hash: &Hash) -> Option<Transaction> {
        self.txs.remove(tx_hash)
    }

    pub fn get_transaction(&self, tx_hash: &Hash) -> Option<&Transaction> {
        self.txs.get(tx_hash)
    }

    pub fn contains(&self, tx_hash: &Hash) -> bool {
        self.txs.contains_key(tx_hash)
    }

    /// Snapshot of every pending transaction, in no particular order
    pub fn transactions(&self) -> Vec<Transaction> {
        self.txs.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }
}
