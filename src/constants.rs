//! Chain constants

/// Base units per coin
pub const COIN: i64 = 100_000_000;

/// Reward paid by every coinbase transaction: 25 coins
pub const COINBASE_REWARD: i64 = 25 * COIN;

/// Number of most recent height levels addressable before pruning
pub const CUT_OFF_AGE: u64 = 10;

/// Retention window W: a block at height `h` is stale once
/// `h <= max_height - RETENTION_WINDOW`
pub const RETENTION_WINDOW: u64 = CUT_OFF_AGE - 1;

/// Height of the genesis block
pub const GENESIS_HEIGHT: u64 = 1;

/// Version stamped on transactions built by this crate
pub const TX_VERSION: u64 = 1;
