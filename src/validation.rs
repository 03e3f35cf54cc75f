//! Transaction validation against a ledger snapshot
//!
//! [`TxHandler`] owns one snapshot. [`TxHandler::check_tx`] judges a single
//! transaction without touching it; [`TxHandler::handle_txs`] applies the
//! largest set it can reach greedily from an unordered batch.

use crate::crypto::verify_signature;
use crate::error::{ChainError, Result};
use crate::types::*;
use crate::utxo::UtxoPool;
use std::collections::HashSet;
use tracing::{debug, error, trace};

pub struct TxHandler {
    utxo_pool: UtxoPool,
}

impl TxHandler {
    /// Validate against `utxo_pool`. Pass a clone to keep the original intact.
    pub fn new(utxo_pool: UtxoPool) -> Self {
        Self { utxo_pool }
    }

    pub fn utxo_pool(&self) -> &UtxoPool {
        &self.utxo_pool
    }

    pub fn into_utxo_pool(self) -> UtxoPool {
        self.utxo_pool
    }

    /// CheckTx: 𝒯𝒳 × 𝒰𝒮 → {valid, invalid}
    ///
    /// A transaction tx = (v, ins, outs, lt) is valid if and only if:
    /// 1. ∀i ∈ ins: i.prevout ∈ us
    /// 2. ∀i ∈ ins: the signature of i verifies over the signable bytes of
    ///    its position against us(i.prevout).owner
    /// 3. no prevout appears in more than one input
    /// 4. ∀o ∈ outs: o.value ≥ 0
    /// 5. Σᵢ us(i.prevout).value ≥ Σₒ o.value
    pub fn check_tx(&self, tx: &Transaction) -> ValidationResult {
        let mut seen = HashSet::with_capacity(tx.inputs.len());
        let mut total_input_value = 0i64;

        for (i, input) in tx.inputs.iter().enumerate() {
            // 1. Referenced output must be unspent
            let utxo = match self.utxo_pool.get(&input.prevout) {
                Some(utxo) => utxo,
                None => {
                    return ValidationResult::Invalid(format!(
                        "Input {} not found in UTXO set",
                        i
                    ))
                }
            };

            // 2. Spender must control the referenced output
            let signed = match tx.raw_data_to_sign(i) {
                Some(data) => data,
                None => {
                    return ValidationResult::Invalid(format!(
                        "Input {} has no signable data",
                        i
                    ))
                }
            };
            if !verify_signature(&utxo.owner, &signed, &input.signature) {
                return ValidationResult::Invalid(format!("Invalid signature at input {}", i));
            }

            // 3. No double claim inside the transaction
            if !seen.insert(input.prevout) {
                return ValidationResult::Invalid(format!(
                    "Input {} claims an output already claimed by this transaction",
                    i
                ));
            }

            total_input_value = match total_input_value.checked_add(utxo.value) {
                Some(total) => total,
                None => return ValidationResult::Invalid("Input value overflow".to_string()),
            };
        }

        // 4. Output values are non-negative
        if let Some((i, output)) = tx.outputs.iter().enumerate().find(|(_, o)| o.value < 0) {
            return ValidationResult::Invalid(format!(
                "Negative output value {} at index {}",
                output.value, i
            ));
        }
        let total_output_value = match tx.total_output_value() {
            Some(total) => total,
            None => return ValidationResult::Invalid("Output value overflow".to_string()),
        };

        // 5. Value is conserved; any surplus is an untracked fee
        if total_input_value < total_output_value {
            return ValidationResult::Invalid(format!(
                "Insufficient input value: {} < {}",
                total_input_value, total_output_value
            ));
        }

        ValidationResult::Valid
    }

    pub fn is_valid_tx(&self, tx: &Transaction) -> bool {
        self.check_tx(tx).is_valid()
    }

    /// HandleTxs: 𝒯𝒳* × 𝒰𝒮 → 𝒯𝒳* × 𝒰𝒮
    ///
    /// Repeats passes over the remaining candidates, in the given order,
    /// applying every transaction valid against the snapshot as it stands at
    /// that moment. Stops when nothing is left or a whole pass accepts
    /// nothing. Returns the accepted transactions in acceptance order; the
    /// snapshot then reflects exactly those.
    ///
    /// Conflicts are resolved by encounter order: of two spends of the same
    /// output, the first one checked wins.
    pub fn handle_txs(&mut self, possible_txs: &[Transaction]) -> Result<Vec<Transaction>> {
        let mut pending: Vec<&Transaction> = possible_txs.iter().collect();
        let mut accepted = Vec::with_capacity(pending.len());
        let mut passes = 0usize;

        loop {
            let initial = pending.len();
            let mut remaining = Vec::with_capacity(initial);

            for tx in pending {
                let tx_id = tx.hash();
                if self.is_valid_tx(tx) && !self.produces_existing(tx, &tx_id) {
                    self.apply_transaction(tx, tx_id)?;
                    accepted.push(tx.clone());
                } else {
                    remaining.push(tx);
                }
            }

            pending = remaining;
            passes += 1;
            if pending.is_empty() || pending.len() == initial {
                break;
            }
        }

        debug!(
            accepted = accepted.len(),
            rejected = pending.len(),
            passes,
            "transaction batch reached fixed point"
        );
        Ok(accepted)
    }

    /// True if any output of `tx` would land on an outpoint already unspent
    fn produces_existing(&self, tx: &Transaction, tx_id: &Hash) -> bool {
        (0..tx.outputs.len())
            .any(|i| self.utxo_pool.contains(&OutPoint::new(*tx_id, i as Natural)))
    }

    /// Consume the inputs of an already-validated transaction and add its
    /// outputs under `(tx_id, i)`
    fn apply_transaction(&mut self, tx: &Transaction, tx_id: Hash) -> Result<()> {
        for input in &tx.inputs {
            if let Err(err) = self.utxo_pool.remove(&input.prevout) {
                error!(?err, tx = ?tx_id, "validated input missing from snapshot");
                return Err(ChainError::InvariantViolation(format!(
                    "validated input {:?} missing from snapshot: {}",
                    input.prevout, err
                )));
            }
        }

        for (i, output) in tx.outputs.iter().enumerate() {
            let outpoint = OutPoint::new(tx_id, i as Natural);
            if let Err(err) = self.utxo_pool.add(outpoint, output.clone()) {
                error!(?err, tx = ?tx_id, "output collided after collision check");
                return Err(ChainError::InvariantViolation(err.to_string()));
            }
        }

        trace!(
            tx = ?tx_id,
            inputs = tx.inputs.len(),
            outputs = tx.outputs.len(),
            "applied transaction"
        );
        Ok(())
    }
}
