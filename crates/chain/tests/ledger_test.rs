use bloxer_chain::{Ledger, LedgerError};
use bloxer_core::{Address, Keypair, Transaction};
use std::collections::BTreeSet;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_genesis_only_balances_are_zero() {
    let ledger = Ledger::new(2, 100.0);
    let anyone = Keypair::generate().unwrap().address();

    assert_eq!(ledger.balance_of(&anyone), 0.0);
    assert_eq!(ledger.balance_of("miner"), 0.0);
}

#[test]
fn test_reward_arrives_one_block_late() {
    let mut ledger = Ledger::new(2, 100.0);
    let addr1 = Keypair::generate().unwrap();
    let addr2 = Keypair::generate().unwrap().address();

    let tx = Transaction::new(addr1.address(), addr2.clone(), 24.56)
        .signed(&addr1)
        .unwrap();
    ledger.add_transaction(tx).unwrap();

    ledger.mine_pending("miner");
    assert_eq!(ledger.balance_of(&addr2), 24.56);
    assert_eq!(ledger.balance_of(addr1.address()), -24.56);
    assert_eq!(ledger.balance_of("miner"), 0.0);

    ledger.mine_pending("miner");
    assert_eq!(ledger.balance_of("miner"), 100.0);

    assert!(ledger.is_chain_valid());
    for block in ledger.chain().iter().skip(1) {
        assert!(block.hash().as_str().starts_with("00"));
    }
}

#[test]
fn test_external_reward_rejected_at_admission() {
    let mut ledger = Ledger::new(2, 100.0);

    let forged = Transaction::new(Address::empty(), "thief", 1_000_000.0);
    assert!(forged.is_valid());
    assert!(matches!(
        ledger.add_transaction(forged),
        Err(LedgerError::EmptySender)
    ));
    assert!(ledger.pending().is_empty());
}

#[test]
fn test_chain_linkage() {
    let mut ledger = Ledger::new(1, 50.0);
    for _ in 0..5 {
        ledger.mine_pending("miner");
    }

    let chain = ledger.chain();
    assert_eq!(chain.len(), 6);
    for i in 1..chain.len() {
        assert_eq!(chain[i].prev_hash, chain[i - 1].hash().as_str());
        assert!(chain[i].is_self_consistent());
    }
}

#[test]
fn test_balance_conservation() {
    let mut ledger = Ledger::new(1, 100.0);
    let alice = Keypair::generate().unwrap();
    let bob = Keypair::generate().unwrap();

    // Fund alice through two rounds of rewards.
    ledger.mine_pending(alice.address());
    ledger.mine_pending(alice.address());

    let to_bob = Transaction::new(alice.address(), bob.address(), 24.56)
        .signed(&alice)
        .unwrap();
    let back = Transaction::new(bob.address(), alice.address(), 10.0)
        .signed(&bob)
        .unwrap();
    ledger.add_transaction(to_bob).unwrap();
    ledger.add_transaction(back).unwrap();
    ledger.mine_pending("miner");

    let rewards_issued: f64 = ledger
        .chain()
        .iter()
        .flat_map(|b| b.transactions())
        .filter(|tx| tx.is_reward())
        .map(|tx| tx.amount)
        .sum();

    let addresses: BTreeSet<Address> = ledger
        .chain()
        .iter()
        .flat_map(|b| b.transactions())
        .flat_map(|tx| [tx.from.clone(), tx.to.clone()])
        .filter(|a| !a.is_empty())
        .collect();

    let total: f64 = addresses.iter().map(|a| ledger.balance_of(a)).sum();

    assert!(approx_eq(rewards_issued, 200.0));
    assert!(approx_eq(total, rewards_issued));
    assert!(approx_eq(ledger.balance_of(bob.address()), 14.56));
    assert!(approx_eq(ledger.balance_of(alice.address()), 185.44));
}

#[test]
fn test_tamper_then_detect() {
    let mut ledger = Ledger::new(1, 100.0);
    let alice = Keypair::generate().unwrap();
    let tx = Transaction::new(alice.address(), "bob", 3.0)
        .signed(&alice)
        .unwrap();
    ledger.add_transaction(tx).unwrap();
    ledger.mine_pending("miner");
    ledger.mine_pending("miner");

    let mut chain = ledger.chain().to_vec();
    chain[1].payload.transactions_mut().unwrap()[0].to = Address::from("mallory");

    let tampered = Ledger::from_parts(
        chain,
        ledger.difficulty(),
        ledger.pending().to_vec(),
        ledger.reward(),
    )
    .unwrap();

    assert!(ledger.is_chain_valid());
    assert!(!tampered.is_chain_valid());
}
