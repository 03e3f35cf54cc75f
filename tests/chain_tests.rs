//! Integration tests for block ingestion, forks and pruning

mod common;

use common::*;
use utxo_chain::*;

#[test]
fn test_empty_block_over_genesis() {
    let alice = wallet(1);
    let bob = wallet(2);
    let mut chain = BlockChain::new(genesis(&alice)).unwrap();
    let root = chain.max_height_hash();

    assert!(chain.add_block(child(&chain, &root, &bob)));
    assert_eq!(chain.max_height(), 2);
}

#[test]
fn test_block_with_valid_transaction() {
    let alice = wallet(1);
    let bob = wallet(2);
    let genesis = genesis(&alice);
    let mut chain = BlockChain::new(genesis.clone()).unwrap();

    let tx = spend(
        &[(genesis.coinbase.outpoint(0), &alice)],
        &[(10 * COIN, &alice), (15 * COIN, &bob)],
    );
    let mut block = child(&chain, &genesis.hash(), &bob);
    block.add_transaction(tx.clone());

    assert!(chain.add_block(block.clone()));
    let pool = chain.max_height_utxo_pool();
    assert!(!pool.contains(&genesis.coinbase.outpoint(0)));
    assert_eq!(pool.get(&tx.outpoint(1)).unwrap().value, 15 * COIN);
    assert!(pool.contains(&block.coinbase.outpoint(0)));
    assert_eq!(pool.len(), 3);
}

#[test]
fn test_block_with_overspending_transaction() {
    let alice = wallet(1);
    let bob = wallet(2);
    let genesis = genesis(&alice);
    let mut chain = BlockChain::new(genesis.clone()).unwrap();

    let tx = spend(
        &[(genesis.coinbase.outpoint(0), &alice)],
        &[(10 * COIN, &alice), (25 * COIN, &bob)],
    );
    let mut block = child(&chain, &genesis.hash(), &bob);
    block.add_transaction(tx);

    assert!(!chain.add_block(block));
    assert_eq!(chain.max_height(), 1);
}

#[test]
fn test_block_with_double_spend_rejected_whole() {
    let alice = wallet(1);
    let bob = wallet(2);
    let genesis = genesis(&alice);
    let mut chain = BlockChain::new(genesis.clone()).unwrap();

    let tx1 = spend(&[(genesis.coinbase.outpoint(0), &alice)], &[(10 * COIN, &bob)]);
    let tx2 = spend(&[(genesis.coinbase.outpoint(0), &alice)], &[(10 * COIN, &alice)]);
    chain.add_transaction(tx1.clone());
    chain.add_transaction(tx2.clone());

    let mut block = child(&chain, &genesis.hash(), &bob);
    block.add_transaction(tx1.clone());
    block.add_transaction(tx2.clone());

    let result = chain.process_block(block.clone()).unwrap();
    assert!(matches!(result, ValidationResult::Invalid(_)));
    assert!(!chain.contains_block(&block.hash()));
    assert_eq!(chain.transaction_pool().len(), 2);
    assert!(chain.transaction_pool().contains(&tx1.hash()));
    assert!(chain.transaction_pool().contains(&tx2.hash()));
    assert!(chain.max_height_utxo_pool().contains(&genesis.coinbase.outpoint(0)));
}

#[test]
fn test_block_with_reverse_ordered_dependency() {
    let alice = wallet(1);
    let bob = wallet(2);
    let carol = wallet(3);
    let genesis = genesis(&alice);
    let mut chain = BlockChain::new(genesis.clone()).unwrap();

    let tx1 = spend(&[(genesis.coinbase.outpoint(0), &alice)], &[(COINBASE_REWARD, &bob)]);
    let tx2 = spend(&[(tx1.outpoint(0), &bob)], &[(COINBASE_REWARD, &carol)]);

    let mut block = child(&chain, &genesis.hash(), &bob);
    block.add_transaction(tx2.clone());
    block.add_transaction(tx1);

    assert!(chain.add_block(block));
    let pool = chain.max_height_utxo_pool();
    assert_eq!(pool.get(&tx2.outpoint(0)).unwrap().owner, carol.owner);
}

#[test]
fn test_transaction_cannot_spend_own_block_coinbase() {
    let alice = wallet(1);
    let bob = wallet(2);
    let mut chain = BlockChain::new(genesis(&alice)).unwrap();
    let root = chain.max_height_hash();

    let mut block = child(&chain, &root, &bob);
    let tx = spend(&[(block.coinbase.outpoint(0), &bob)], &[(COIN, &alice)]);
    block.add_transaction(tx);

    assert!(!chain.add_block(block));
}

#[test]
fn test_prev_block_hash() {
    let alice = wallet(1);
    let bob = wallet(2);
    let genesis = genesis(&alice);
    let mut chain = BlockChain::new(genesis.clone()).unwrap();

    let mut wrong = genesis.hash();
    wrong[0] = wrong[0].wrapping_add(1);
    let orphan = Block::new(
        Some(wrong),
        Transaction::coinbase(COINBASE_REWARD, bob.owner.clone(), 2),
    );
    assert!(!chain.add_block(orphan));

    assert!(chain.add_block(child(&chain, &genesis.hash(), &bob)));
}

#[test]
fn test_block_without_prev_hash_rejected() {
    let alice = wallet(1);
    let mut chain = BlockChain::new(genesis(&alice)).unwrap();

    let block = Block::genesis(Transaction::coinbase(COINBASE_REWARD, alice.owner.clone(), 5));
    assert!(!chain.add_block(block));
    assert_eq!(chain.block_count(), 1);
}

#[test]
fn test_forks_keep_independent_ledgers() {
    let alice = wallet(1);
    let bob = wallet(2);
    let carol = wallet(3);
    let genesis = genesis(&alice);
    let mut chain = BlockChain::new(genesis.clone()).unwrap();

    // Both branches spend the genesis reward, to different people
    let to_bob = spend(&[(genesis.coinbase.outpoint(0), &alice)], &[(COINBASE_REWARD, &bob)]);
    let to_carol = spend(&[(genesis.coinbase.outpoint(0), &alice)], &[(COINBASE_REWARD, &carol)]);

    let mut branch_a = child(&chain, &genesis.hash(), &alice);
    branch_a.add_transaction(to_bob.clone());
    let mut branch_b = child(&chain, &genesis.hash(), &alice);
    branch_b.add_transaction(to_carol.clone());

    assert!(chain.add_block(branch_a.clone()));
    assert!(chain.add_block(branch_b.clone()));
    assert_eq!(chain.max_height_hash(), branch_a.hash());

    // Carol's output only exists on branch B
    let carol_pays = spend(&[(to_carol.outpoint(0), &carol)], &[(COIN, &bob)]);

    let mut on_a = child(&chain, &branch_a.hash(), &alice);
    on_a.add_transaction(carol_pays.clone());
    assert!(!chain.add_block(on_a));

    let mut on_b = child(&chain, &branch_b.hash(), &alice);
    on_b.add_transaction(carol_pays);
    assert!(chain.add_block(on_b.clone()));

    // Branch B is now strictly higher
    assert_eq!(chain.max_height_hash(), on_b.hash());
    assert_eq!(chain.max_height(), 3);
    assert!(chain
        .get_node(&branch_a.hash())
        .unwrap()
        .utxo_pool()
        .contains(&to_bob.outpoint(0)));
}

#[test]
fn test_equal_height_sibling_does_not_take_head() {
    let alice = wallet(1);
    let mut chain = BlockChain::new(genesis(&alice)).unwrap();
    let root = chain.max_height_hash();

    let first = extend(&mut chain, root, 2, &wallet(2));
    let second = extend(&mut chain, root, 2, &wallet(3));

    assert_eq!(chain.max_height_hash(), first[1]);
    assert_eq!(chain.height_of(&second[1]), Some(3));
}

#[test]
fn test_memory_maintain() {
    let alice = wallet(1);
    let bob = wallet(2);
    let mut chain = BlockChain::new(genesis(&alice)).unwrap();
    let root = chain.max_height_hash();

    let appended = 30;
    extend(&mut chain, root, appended, &bob);

    assert_eq!(chain.oldest_block_height(), appended as u64 + 1 - 8);
    assert_eq!(chain.block_count(), CUT_OFF_AGE as usize - 1);
}

#[test]
fn test_oldest_height_for_various_lengths() {
    for appended in [9usize, 10, 11, 17] {
        let alice = wallet(1);
        let mut chain = BlockChain::new(genesis(&alice)).unwrap();
        let root = chain.max_height_hash();
        extend(&mut chain, root, appended, &alice);

        assert_eq!(chain.max_height(), appended as u64 + 1);
        assert_eq!(chain.oldest_block_height(), appended as u64 + 1 - 8);
    }
}

#[test]
fn test_no_pruning_before_window_fills() {
    let alice = wallet(1);
    let mut chain = BlockChain::new(genesis(&alice)).unwrap();
    let root = chain.max_height_hash();
    extend(&mut chain, root, 8, &alice);

    assert_eq!(chain.max_height(), 9);
    assert_eq!(chain.oldest_block_height(), 1);
    assert!(chain.contains_block(&root));
}

#[test]
fn test_fork_from_genesis_until_window_passes() {
    let alice = wallet(1);
    let bob = wallet(2);
    let mut chain = BlockChain::new(genesis(&alice)).unwrap();
    let root = chain.max_height_hash();

    let main = extend(&mut chain, root, 8, &alice);
    assert_eq!(chain.max_height(), 9);
    assert!(chain.add_block(child(&chain, &root, &bob)));

    extend(&mut chain, main[7], 1, &alice);
    assert_eq!(chain.max_height(), 10);
    assert!(!chain.contains_block(&root));

    let late = Block::new(
        Some(root),
        Transaction::coinbase(COINBASE_REWARD, wallet(3).owner, 2),
    );
    assert!(!chain.add_block(late));
}

#[test]
fn test_stale_branch_rejected() {
    let alice = wallet(1);
    let bob = wallet(2);
    let mut chain = BlockChain::new(genesis(&alice)).unwrap();
    let root = chain.max_height_hash();

    let main = extend(&mut chain, root, 12, &alice);
    assert_eq!(chain.max_height(), 13);
    let oldest = chain.oldest_block_height();
    assert_eq!(oldest, 5);

    // Node at height 4 fell out of the window, so its children are orphans
    let below_window = main[2];
    assert_eq!(chain.height_of(&below_window), None);
    let stale = Block::new(
        Some(below_window),
        Transaction::coinbase(COINBASE_REWARD, bob.owner.clone(), 5),
    );
    assert!(!chain.add_block(stale));

    // Oldest retained node can still be extended
    let oldest_hash = main[3];
    assert_eq!(chain.height_of(&oldest_hash), Some(5));
    assert!(chain.add_block(child(&chain, &oldest_hash, &bob)));
}

#[test]
fn test_pruning_drops_side_branches() {
    let alice = wallet(1);
    let bob = wallet(2);
    let mut chain = BlockChain::new(genesis(&alice)).unwrap();
    let root = chain.max_height_hash();

    let side = extend(&mut chain, root, 2, &bob);
    let main = extend(&mut chain, root, 3, &alice);
    extend(&mut chain, main[2], 8, &alice);

    assert_eq!(chain.max_height(), 12);
    assert_eq!(chain.oldest_block_height(), 4);
    assert!(!chain.contains_block(&side[0]));
    assert!(!chain.contains_block(&side[1]));
    assert!(chain.get_node(&main[2]).unwrap().parent().is_some());
    assert!(chain.parent_of(&main[2]).is_none());
}

#[test]
fn test_block_removes_only_its_transactions_from_pool() {
    let alice = wallet(1);
    let bob = wallet(2);
    let genesis = genesis(&alice);
    let mut chain = BlockChain::new(genesis.clone()).unwrap();

    let included = spend(&[(genesis.coinbase.outpoint(0), &alice)], &[(COIN, &bob)]);
    let unrelated = spend(&[(OutPoint::new([7; 32], 0), &bob)], &[(COIN, &alice)]);
    chain.add_transaction(included.clone());
    chain.add_transaction(unrelated.clone());

    let mut block = child(&chain, &genesis.hash(), &bob);
    block.add_transaction(included.clone());
    assert!(chain.add_block(block));

    let pool = chain.transaction_pool();
    assert_eq!(pool.len(), 1);
    assert!(pool.contains(&unrelated.hash()));
    assert!(!pool.contains(&included.hash()));
}

#[test]
fn test_add_transaction_is_not_validated() {
    let alice = wallet(1);
    let mut chain = BlockChain::new(genesis(&alice)).unwrap();

    let bogus = spend(&[(OutPoint::new([9; 32], 3), &alice)], &[(-5, &alice)]);
    chain.add_transaction(bogus.clone());

    assert_eq!(chain.transaction_pool().get_transaction(&bogus.hash()), Some(&bogus));
}

#[test]
fn test_coinbase_reward_from_config() -> anyhow::Result<()> {
    let alice = wallet(1);
    let config = ChainConfig::from_json(r#"{ "coinbase_reward": 42 }"#)?;
    let chain = BlockChain::with_config(genesis(&alice), config)?;

    assert_eq!(chain.coinbase_reward(), 42);
    assert_eq!(chain.config().retention_window, RETENTION_WINDOW);
    Ok(())
}
