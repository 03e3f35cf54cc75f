//! Shared fixtures for integration tests

#![allow(dead_code)]

use secp256k1::SecretKey;
use utxo_chain::crypto::{public_key_bytes, secret_key_from_bytes};
use utxo_chain::*;

pub struct Wallet {
    pub secret: SecretKey,
    pub owner: ByteString,
}

pub fn wallet(seed: u8) -> Wallet {
    let secret = secret_key_from_bytes(&[seed; 32]).unwrap();
    Wallet { owner: public_key_bytes(&secret), secret }
}

pub fn genesis(owner: &Wallet) -> Block {
    Block::genesis(Transaction::coinbase(COINBASE_REWARD, owner.owner.clone(), GENESIS_HEIGHT))
}

/// Transaction spending `inputs`, each signed by its paired wallet
pub fn spend(inputs: &[(OutPoint, &Wallet)], outputs: &[(Integer, &Wallet)]) -> Transaction {
    let mut tx = Transaction::new();
    for (outpoint, _) in inputs {
        tx.add_input(outpoint.hash, outpoint.index);
    }
    for (value, to) in outputs {
        tx.add_output(*value, to.owner.clone());
    }
    for (index, (_, signer)) in inputs.iter().enumerate() {
        assert!(tx.sign_input(index, &signer.secret));
    }
    tx
}

/// Empty block over `parent` paying the reward to `recipient`
pub fn child(chain: &BlockChain, parent: &Hash, recipient: &Wallet) -> Block {
    let height = chain.height_of(parent).expect("parent retained") + 1;
    Block::new(
        Some(*parent),
        Transaction::coinbase(COINBASE_REWARD, recipient.owner.clone(), height),
    )
}

/// Append `count` empty blocks over `tip`, returning the hashes in order
pub fn extend(chain: &mut BlockChain, tip: Hash, count: usize, recipient: &Wallet) -> Vec<Hash> {
    let mut hashes = Vec::with_capacity(count);
    let mut parent = tip;
    for _ in 0..count {
        let block = child(chain, &parent, recipient);
        parent = block.hash();
        assert!(chain.add_block(block));
        hashes.push(parent);
    }
    hashes
}
