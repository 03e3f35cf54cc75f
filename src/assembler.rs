//! Block assembly on top of the current head
//!
//! Thin layer over [`BlockChain`]: no policy beyond bundling every pending
//! transaction and paying the configured reward to the caller's key.

use crate::chain::BlockChain;
use crate::types::*;
use tracing::debug;

pub struct BlockHandler {
    chain: BlockChain,
}

impl BlockHandler {
    pub fn new(chain: BlockChain) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &BlockChain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut BlockChain {
        &mut self.chain
    }

    pub fn into_chain(self) -> BlockChain {
        self.chain
    }

    /// Add `block` to the chain if it is valid
    pub fn process_block(&mut self, block: Block) -> bool {
        self.chain.add_block(block)
    }

    /// Queue a transaction for a future block
    pub fn process_tx(&mut self, tx: Transaction) {
        self.chain.add_transaction(tx);
    }

    /// CreateNewBlock: Chain × 𝕂 → ℬ?
    ///
    /// Build a block over the max height block holding every pending
    /// transaction and a coinbase paying the reward to `recipient`, then add
    /// it. Returns `None` if the chain rejects it, e.g. because two pending
    /// transactions conflict or one is invalid on the head's branch.
    pub fn create_block(&mut self, recipient: ByteString) -> Option<Block> {
        let parent_hash = self.chain.max_height_hash();
        let height = self.chain.max_height() + 1;
        let coinbase = Transaction::coinbase(self.chain.coinbase_reward(), recipient, height);

        let mut block = Block::new(Some(parent_hash), coinbase);
        for tx in self.chain.transaction_pool().transactions() {
            block.add_transaction(tx);
        }

        if self.chain.add_block(block.clone()) {
            debug!(block = %hex::encode(block.hash()), height, "assembled block");
            Some(block)
        } else {
            None
        }
    }
}
