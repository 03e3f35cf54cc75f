//! Fork-aware block tree with a bounded retention window
//!
//! Blocks live in an arena keyed by block hash. Each [`BlockNode`] owns the
//! ledger snapshot obtained by applying its block on top of a copy of its
//! parent's snapshot, so every retained branch can be extended
//! independently. The head is the first node to reach the greatest height;
//! a later sibling at the same height does not replace it.
//!
//! Once the head is `W` levels above the oldest retained height, every node
//! at height `<= head - W` is dropped. Blocks whose parent has been dropped,
//! or was never seen, are rejected.

use crate::block::apply_coinbase;
use crate::config::ChainConfig;
use crate::constants::*;
use crate::error::{ChainError, Result};
use crate::mempool::TransactionPool;
use crate::types::*;
use crate::utxo::UtxoPool;
use crate::validation::TxHandler;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// A retained block together with the ledger state after it
#[derive(Debug, Clone)]
pub struct BlockNode {
    block: Block,
    hash: Hash,
    height: Natural,
    utxo_pool: UtxoPool,
    /// Lookup key only; may name a node that has since been pruned
    parent: Option<Hash>,
    children: Vec<Hash>,
}

impl BlockNode {
    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn height(&self) -> Natural {
        self.height
    }

    pub fn utxo_pool(&self) -> &UtxoPool {
        &self.utxo_pool
    }

    pub fn parent(&self) -> Option<Hash> {
        self.parent
    }

    pub fn children(&self) -> &[Hash] {
        &self.children
    }
}

pub struct BlockChain {
    nodes: HashMap<Hash, BlockNode>,
    max_height_hash: Hash,
    oldest_block_height: Natural,
    tx_pool: TransactionPool,
    config: ChainConfig,
}

impl BlockChain {
    /// Chain holding only `genesis_block`, with the default configuration
    pub fn new(genesis_block: Block) -> Result<Self> {
        Self::with_config(genesis_block, ChainConfig::default())
    }

    /// Chain holding only `genesis_block`. The genesis coinbase is applied
    /// to an empty ledger without validation; any other transactions in it
    /// are ignored.
    pub fn with_config(genesis_block: Block, config: ChainConfig) -> Result<Self> {
        config.validate()?;

        if !genesis_block.transactions.is_empty() {
            warn!(
                count = genesis_block.transactions.len(),
                "ignoring transactions in genesis block"
            );
        }

        let mut utxo_pool = UtxoPool::new();
        apply_coinbase(&genesis_block.coinbase, &mut utxo_pool)?;

        let hash = genesis_block.hash();
        let genesis = BlockNode {
            block: genesis_block,
            hash,
            height: GENESIS_HEIGHT,
            utxo_pool,
            parent: None,
            children: Vec::new(),
        };

        let mut nodes = HashMap::new();
        nodes.insert(hash, genesis);
        info!(genesis = %hex::encode(hash), "chain initialized");

        Ok(Self {
            nodes,
            max_height_hash: hash,
            oldest_block_height: GENESIS_HEIGHT,
            tx_pool: TransactionPool::new(),
            config,
        })
    }

    /// The head is never pruned: pruning only removes heights below it.
    fn head(&self) -> &BlockNode {
        &self.nodes[&self.max_height_hash]
    }

    pub fn max_height_block(&self) -> &Block {
        &self.head().block
    }

    pub fn max_height_hash(&self) -> Hash {
        self.max_height_hash
    }

    pub fn max_height(&self) -> Natural {
        self.head().height
    }

    /// Ledger to build the next block against
    pub fn max_height_utxo_pool(&self) -> &UtxoPool {
        &self.head().utxo_pool
    }

    pub fn oldest_block_height(&self) -> Natural {
        self.oldest_block_height
    }

    pub fn transaction_pool(&self) -> &TransactionPool {
        &self.tx_pool
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn coinbase_reward(&self) -> Integer {
        self.config.coinbase_reward
    }

    pub fn get_node(&self, hash: &Hash) -> Option<&BlockNode> {
        self.nodes.get(hash)
    }

    pub fn get_block(&self, hash: &Hash) -> Option<&Block> {
        self.nodes.get(hash).map(|node| &node.block)
    }

    pub fn contains_block(&self, hash: &Hash) -> bool {
        self.nodes.contains_key(hash)
    }

    pub fn height_of(&self, hash: &Hash) -> Option<Natural> {
        self.nodes.get(hash).map(|node| node.height)
    }

    /// Parent of `hash`, if both are still retained
    pub fn parent_of(&self, hash: &Hash) -> Option<&BlockNode> {
        self.nodes
            .get(hash)
            .and_then(|node| node.parent)
            .and_then(|parent| self.nodes.get(&parent))
    }

    pub fn children_of(&self, hash: &Hash) -> Vec<&BlockNode> {
        self.nodes
            .get(hash)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|child| self.nodes.get(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn block_count(&self) -> usize {
        self.nodes.len()
    }

    /// Add `block` if it is valid; see [`Self::process_block`]
    pub fn add_block(&mut self, block: Block) -> bool {
        match self.process_block(block) {
            Ok(result) => result.is_valid(),
            Err(err) => {
                error!(%err, "block processing aborted");
                false
            }
        }
    }

    /// AddBlock: ℬ × Chain → {valid, invalid} × Chain
    ///
    /// For block b with parent p:
    /// 1. p must be retained and b not already known
    /// 2. height(b) = height(p) + 1 must exceed max_height - W
    /// 3. every transaction of b must apply to a copy of p's ledger
    /// 4. b's coinbase outputs are added unconditionally
    /// 5. b's transactions leave the pending pool
    /// 6. b becomes head if strictly higher than the current head
    /// 7. nodes outside the retention window are pruned
    ///
    /// Rejections leave the chain untouched. `Err` means an internal
    /// invariant was broken; the chain is untouched in that case too.
    pub fn process_block(&mut self, block: Block) -> Result<ValidationResult> {
        let block_hash = block.hash();

        // 1. Locate the parent
        let prev_hash = match block.prev_block_hash {
            Some(hash) => hash,
            None => return Ok(self.reject(&block_hash, "Block has no previous hash")),
        };
        if self.nodes.contains_key(&block_hash) {
            return Ok(self.reject(&block_hash, "Block already in chain"));
        }

        let (height, mut handler) = {
            let parent = match self.nodes.get(&prev_hash) {
                Some(parent) => parent,
                None => return Ok(self.reject(&block_hash, "Unknown parent block")),
            };

            // 2. Too far behind the head to ever matter
            let height = parent.height + 1;
            if height.saturating_add(self.config.retention_window) <= self.max_height() {
                return Ok(self.reject(
                    &block_hash,
                    &format!(
                        "Block at height {} is outside the retention window (max height {})",
                        height,
                        self.max_height()
                    ),
                ));
            }

            (height, TxHandler::new(parent.utxo_pool.clone()))
        };

        // 3. All declared transactions must apply
        let accepted = handler.handle_txs(&block.transactions)?;
        if accepted.len() != block.transactions.len() {
            return Ok(self.reject(
                &block_hash,
                &format!(
                    "Only {} of {} transactions are valid",
                    accepted.len(),
                    block.transactions.len()
                ),
            ));
        }

        // 4. Coinbase
        let mut utxo_pool = handler.into_utxo_pool();
        match apply_coinbase(&block.coinbase, &mut utxo_pool) {
            Ok(()) => {}
            Err(ChainError::DuplicateUtxo(outpoint)) => {
                return Ok(self.reject(
                    &block_hash,
                    &format!("Coinbase output {:?} already unspent", outpoint),
                ));
            }
            Err(err) => return Err(err),
        }

        // 5. Committed transactions leave the pending pool
        for tx in &block.transactions {
            self.tx_pool.remove_transaction(&tx.hash());
        }

        let tx_count = block.transactions.len();
        let node = BlockNode {
            block,
            hash: block_hash,
            height,
            utxo_pool,
            parent: Some(prev_hash),
            children: Vec::new(),
        };
        if let Some(parent) = self.nodes.get_mut(&prev_hash) {
            parent.children.push(block_hash);
        }
        self.nodes.insert(block_hash, node);

        debug!(
            block = %hex::encode(block_hash),
            height,
            transactions = tx_count,
            "block added"
        );

        // 6. Strictly higher wins; ties keep the first arrival
        if height > self.max_height() {
            self.max_height_hash = block_hash;
            info!(head = %hex::encode(block_hash), height, "new head");
        }

        // 7. Drop everything outside the window
        self.prune();

        Ok(ValidationResult::Valid)
    }

    /// Add a transaction to the pending pool. It is validated only when a
    /// block including it is processed.
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.tx_pool.add_transaction(tx);
    }

    fn reject(&self, block_hash: &Hash, reason: &str) -> ValidationResult {
        debug!(block = %hex::encode(block_hash), reason, "block rejected");
        ValidationResult::Invalid(reason.to_string())
    }

    fn prune(&mut self) {
        let max_height = self.max_height();
        let window = self.config.retention_window;
        if max_height - self.oldest_block_height < window {
            return;
        }

        let cutoff = max_height - window;
        let before = self.nodes.len();
        self.nodes.retain(|_, node| node.height > cutoff);
        self.oldest_block_height = cutoff + 1;

        debug!(
            removed = before - self.nodes.len(),
            oldest_height = self.oldest_block_height,
            "pruned blocks outside retention window"
        );
    }
}
