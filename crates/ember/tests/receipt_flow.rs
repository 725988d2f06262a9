//! The full execution record path: run bytecode, build the receipt, persist
//! it and query it back by hash and by log filter.

use ember::{
    make_receipt, Evm, InMemoryDB, RunCodeInput, SpecId, U256,
};
use ember_primitives::{address, b256, keccak256, Bytes, HashMap, B256};
use ember_receipts::{
    BlockRef, ChainView, MemoryKv, ReceiptStore, TopicFilter, TxReceiptWithType,
};

#[derive(Default)]
struct TestChain {
    head: u64,
    blocks: HashMap<u64, BlockRef>,
}

impl TestChain {
    fn insert(&mut self, block: BlockRef) {
        self.head = self.head.max(block.number);
        self.blocks.insert(block.number, block);
    }
}

impl ChainView for TestChain {
    fn head_number(&self) -> u64 {
        self.head
    }

    fn block_by_number(&self, number: u64) -> Option<BlockRef> {
        self.blocks.get(&number).cloned()
    }
}

/// LOG1 with topic 0x07 and one byte of data, then STOP:
/// PUSH1 7, PUSH1 1, PUSH1 31, LOG1, STOP
const LOGGING_CODE: &[u8] = &[0x60, 0x07, 0x60, 0x01, 0x60, 0x1f, 0xa1, 0x00];

#[test]
fn executed_logs_survive_the_round_trip() {
    let emitter = address!("00000000000000000000000000000000000000aa");
    let mut evm = Evm::builder(InMemoryDB::new())
        .with_spec(SpecId::LATEST)
        .build();

    let result = evm.run_code(RunCodeInput {
        code: Bytes::copy_from_slice(LOGGING_CODE),
        address: emitter,
        gas_limit: 100_000,
        ..Default::default()
    });
    assert_eq!(result.exception, None);
    assert_eq!(result.logs.len(), 1);
    let topic = B256::from(U256::from(7));
    assert_eq!(result.logs[0].topics, vec![topic]);

    // build and persist the receipt
    let receipt = make_receipt(
        evm.rules(),
        result.exception.is_none(),
        B256::ZERO,
        U256::from(result.execution_gas_used),
        result.logs.clone(),
    );
    let receipts = vec![TxReceiptWithType::legacy(receipt)];

    let tx_hash = keccak256(b"tx-0");
    let block = BlockRef {
        hash: b256!("00000000000000000000000000000000000000000000000000000000000000b1"),
        number: 1,
        tx_hashes: vec![tx_hash],
    };
    let mut chain = TestChain::default();
    chain.insert(block.clone());

    let mut store = ReceiptStore::new(MemoryKv::new());
    store.save_receipts(&block, &receipts, &chain).unwrap();

    // by transaction hash
    let found = store.get_receipt_by_tx_hash(&tx_hash).unwrap().unwrap();
    assert_eq!(found.block_hash, block.hash);
    assert_eq!(found.tx_index, 0);
    assert_eq!(found.log_index, 0);
    assert!(found.logs_bloom.contains_input(emitter.as_slice()));
    assert_eq!(found.receipt.receipt.logs(), result.logs.as_slice());

    // by log filter
    let entries = store
        .get_logs(&chain, 1, 1, &[emitter], &[TopicFilter::Is(topic)])
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].tx_hash, tx_hash);
    assert_eq!(entries[0].log.data.as_ref(), [0x00]);

    // a filter on a missing second topic matches nothing
    let entries = store
        .get_logs(
            &chain,
            1,
            1,
            &[],
            &[TopicFilter::Any, TopicFilter::Is(topic)],
        )
        .unwrap();
    assert!(entries.is_empty());
}
