//! Error types for ledger and chain maintenance
//!
//! Rejected transactions and blocks are not errors; they are reported as
//! [`crate::types::ValidationResult::Invalid`]. The variants below cover
//! misuse of the ledger primitives and broken internal invariants.

use crate::types::OutPoint;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("UTXO not found: {0:?}")]
    UtxoNotFound(OutPoint),

    #[error("UTXO already present: {0:?}")]
    DuplicateUtxo(OutPoint),

    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Signature error: {0}")]
    Signature(#[from] secp256k1::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChainError>;
