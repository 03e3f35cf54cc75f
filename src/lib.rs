//! # UTXO-Chain
//!
//! Transaction validation against an unspent-output ledger, and a
//! bounded-memory, fork-aware chain of blocks built from those transactions.
//!
//! ## Architecture
//!
//! The crate is layered leaf-first:
//! - Ledger snapshot ([`utxo::UtxoPool`]): unspent outputs at one point of a branch
//! - Transaction validator ([`validation::TxHandler`]): single checks and
//!   fixed-point batch application
//! - Chain manager ([`chain::BlockChain`]): block tree, head selection,
//!   pending pool and pruning
//! - Block assembler ([`assembler::BlockHandler`]): bundles the pending pool
//!   into a block over the head
//!
//! ## Design Principles
//!
//! 1. **Per-branch ledgers**: every block node owns its own snapshot, derived
//!    by copy from its parent
//! 2. **Rejections are values**: invalid transactions and blocks yield
//!    [`ValidationResult::Invalid`] or `false`, never an error
//! 3. **Loud invariant failures**: a broken internal invariant aborts the
//!    operation with [`ChainError::InvariantViolation`]
//! 4. **Synchronous**: callers sharing a chain across threads serialize access
//!
//! ## Usage
//!
//! ```rust
//! use utxo_chain::*;
//! use utxo_chain::crypto::{public_key_bytes, secret_key_from_bytes};
//!
//! let alice = secret_key_from_bytes(&[1u8; 32]).unwrap();
//! let bob = secret_key_from_bytes(&[2u8; 32]).unwrap();
//!
//! let genesis = Block::genesis(Transaction::coinbase(
//!     COINBASE_REWARD,
//!     public_key_bytes(&alice),
//!     GENESIS_HEIGHT,
//! ));
//! let mut handler = BlockHandler::new(BlockChain::new(genesis.clone()).unwrap());
//!
//! // Alice pays Bob from the genesis reward
//! let mut tx = Transaction::new();
//! tx.add_input(genesis.coinbase.hash(), 0);
//! tx.add_output(COINBASE_REWARD, public_key_bytes(&bob));
//! tx.sign_input(0, &alice);
//! handler.process_tx(tx);
//!
//! let block = handler.create_block(public_key_bytes(&bob)).unwrap();
//! assert_eq!(block.transactions.len(), 1);
//! assert_eq!(handler.chain().max_height(), 2);
//! assert!(handler.chain().transaction_pool().is_empty());
//! ```

pub mod types;
pub mod constants;
pub mod config;
pub mod crypto;
pub mod transaction;
pub mod block;
pub mod utxo;
pub mod validation;
pub mod mempool;
pub mod chain;
pub mod assembler;
pub mod error;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use config::ChainConfig;
pub use utxo::UtxoPool;
pub use validation::TxHandler;
pub use mempool::TransactionPool;
pub use chain::{BlockChain, BlockNode};
pub use assembler::BlockHandler;
pub use error::{ChainError, Result};
