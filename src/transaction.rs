//! Transaction construction, canonical encoding and identity
//!
//! The identity of a transaction covers everything except input signatures,
//! so signing an input never changes the outpoints its outputs will occupy.

use crate::constants::*;
use crate::crypto::{double_sha256, sign_message};
use crate::types::*;
use secp256k1::SecretKey;

impl Transaction {
    /// Empty transaction with the current version
    pub fn new() -> Self {
        Self {
            version: TX_VERSION,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    /// Coinbase paying `value` to `owner`. `height` is the height of the
    /// block it rewards and keeps coinbase identities unique along a branch.
    pub fn coinbase(value: Integer, owner: ByteString, height: Natural) -> Self {
        Self {
            version: TX_VERSION,
            inputs: Vec::new(),
            outputs: vec![TransactionOutput { value, owner }],
            lock_time: height,
        }
    }

    pub fn add_input(&mut self, prev_tx_hash: Hash, output_index: Natural) {
        self.inputs.push(TransactionInput {
            prevout: OutPoint::new(prev_tx_hash, output_index),
            signature: Vec::new(),
        });
    }

    pub fn add_output(&mut self, value: Integer, owner: ByteString) {
        self.outputs.push(TransactionOutput { value, owner });
    }

    pub fn remove_input(&mut self, index: usize) -> Option<TransactionInput> {
        if index < self.inputs.len() {
            Some(self.inputs.remove(index))
        } else {
            None
        }
    }

    /// Attach a signature to input `index`. Returns false if there is no
    /// such input.
    pub fn add_signature(&mut self, signature: ByteString, index: usize) -> bool {
        match self.inputs.get_mut(index) {
            Some(input) => {
                input.signature = signature;
                true
            }
            None => false,
        }
    }

    /// Sign input `index` with `secret` over [`Self::raw_data_to_sign`]
    pub fn sign_input(&mut self, index: usize, secret: &SecretKey) -> bool {
        match self.raw_data_to_sign(index) {
            Some(data) => self.add_signature(sign_message(secret, &data), index),
            None => false,
        }
    }

    pub fn input(&self, index: usize) -> Option<&TransactionInput> {
        self.inputs.get(index)
    }

    pub fn output(&self, index: usize) -> Option<&TransactionOutput> {
        self.outputs.get(index)
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Bytes signed by input `index`: version, that input's outpoint, every
    /// output and lock time. Excludes all signatures.
    pub fn raw_data_to_sign(&self, index: usize) -> Option<ByteString> {
        let input = self.inputs.get(index)?;
        let mut data = Vec::new();
        data.extend_from_slice(&self.version.to_le_bytes());
        encode_outpoint(&mut data, &input.prevout);
        encode_outputs(&mut data, &self.outputs);
        data.extend_from_slice(&self.lock_time.to_le_bytes());
        Some(data)
    }

    /// Canonical encoding used for the identity hash
    pub fn raw_tx(&self) -> ByteString {
        let mut data = Vec::new();
        data.extend_from_slice(&self.version.to_le_bytes());
        data.extend_from_slice(&encode_varint(self.inputs.len() as u64));
        for input in &self.inputs {
            encode_outpoint(&mut data, &input.prevout);
        }
        encode_outputs(&mut data, &self.outputs);
        data.extend_from_slice(&self.lock_time.to_le_bytes());
        data
    }

    /// Identity hash: double-SHA256 of [`Self::raw_tx`]
    pub fn hash(&self) -> Hash {
        double_sha256(&[self.raw_tx().as_slice()])
    }

    /// Outpoint that output `index` of this transaction occupies once applied
    pub fn outpoint(&self, index: usize) -> OutPoint {
        OutPoint::new(self.hash(), index as Natural)
    }

    pub fn total_output_value(&self) -> Option<Integer> {
        self.outputs
            .iter()
            .try_fold(0i64, |acc, o| acc.checked_add(o.value))
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_outpoint(data: &mut Vec<u8>, prevout: &OutPoint) {
    data.extend_from_slice(&prevout.hash);
    data.extend_from_slice(&prevout.index.to_le_bytes());
}

fn encode_outputs(data: &mut Vec<u8>, outputs: &[TransactionOutput]) {
    data.extend_from_slice(&encode_varint(outputs.len() as u64));
    for output in outputs {
        data.extend_from_slice(&output.value.to_le_bytes());
        data.extend_from_slice(&encode_varint(output.owner.len() as u64));
        data.extend_from_slice(&output.owner);
    }
}

/// Encode a number as a varint
fn encode_varint(value: u64) -> Vec<u8> {
    if value < 0xfd {
        vec![value as u8]
    } else if value <= 0xffff {
        let mut result = vec![0xfd];
        result.extend_from_slice(&(value as u16).to_le_bytes());
        result
    } else if value <= 0xffffffff {
        let mut result = vec![0xfe];
        result.extend_from_slice(&(value as u32).to_le_bytes());
        result
    } else {
        let mut result = vec![0xff];
        result.extend_from_slice(&value.to_le_bytes());
        result
    }
}
