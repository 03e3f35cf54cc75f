//! Ledger snapshot: the set of unspent outputs at one point of a branch
//!
//! Every chain node owns its own `UtxoPool`. A child's pool starts as a
//! deep copy (`Clone`) of its parent's and is never shared afterwards.

use crate::error::{ChainError, Result};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// UTXO Set: 𝒰𝒮 = 𝒪 → 𝒯
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoPool {
    utxos: HashMap<OutPoint, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.utxos.contains_key(outpoint)
    }

    pub fn get(&self, outpoint: &OutPoint) -> Option<&TransactionOutput> {
        self.utxos.get(outpoint)
    }

    /// Insert a new unspent output. An existing entry is never overwritten.
    pub fn add(&mut self, outpoint: OutPoint, output: TransactionOutput) -> Result<()> {
        if self.utxos.contains_key(&outpoint) {
            return Err(ChainError::DuplicateUtxo(outpoint));
        }
        self.utxos.insert(outpoint, output);
        Ok(())
    }

    /// Remove a spent output. Removing an absent outpoint is a caller bug.
    pub fn remove(&mut self, outpoint: &OutPoint) -> Result<TransactionOutput> {
        self.utxos
            .remove(outpoint)
            .ok_or(ChainError::UtxoNotFound(*outpoint))
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Every outpoint currently unspent, in no particular order
    pub fn outpoints(&self) -> Vec<OutPoint> {
        self.utxos.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OutPoint, &TransactionOutput)> {
        self.utxos.iter()
    }

    /// Sum of all unspent values, `None` on overflow
    pub fn total_value(&self) -> Option<Integer> {
        self.utxos
            .values()
            .try_fold(0i64, |acc, o| acc.checked_add(o.value))
    }
}
