use crate::{KeyValueStore, KvError, TxReceiptWithType};
use alloy_rlp::{Decodable, Encodable, RlpDecodable, RlpEncodable};
use ember_primitives::{Address, Bloom, Log, B256};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Key prefix for per-block receipt lists.
const RECEIPTS_PREFIX: u8 = b'r';
/// Key prefix for the tx-hash → (block, index) lookup index.
const TX_INDEX_PREFIX: u8 = b't';

/// Default cap on the number of logs a single query returns.
const GET_LOGS_LIMIT: usize = 10_000;
/// Default cap on the serialized size of a query's result, in bytes.
const GET_LOGS_LIMIT_BYTES: usize = 150 * 1024 * 1024;
/// Default cap on the block span of a query.
const GET_LOGS_BLOCK_RANGE_LIMIT: u64 = 2_500;

/// Failure of a receipt-store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Kv(#[from] KvError),
    /// The backend handed back bytes that do not decode. A bug or a corrupt
    /// store, not a consensus condition.
    #[error("malformed stored value: {0}")]
    Rlp(#[from] alloy_rlp::Error),
    #[error("block range {0} exceeds the query limit {1}")]
    RangeTooLarge(u64, u64),
    #[error("canonical block {0} not available")]
    UnknownBlock(u64),
}

/// The narrow view of a block the store needs: its hash, height and the
/// hashes of its transactions in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockRef {
    pub hash: B256,
    pub number: u64,
    pub tx_hashes: Vec<B256>,
}

/// Canonical-chain lookups, provided by the embedding client.
pub trait ChainView {
    /// Height of the chain head.
    fn head_number(&self) -> u64;

    /// The canonical block at `number`, if known.
    fn block_by_number(&self, number: u64) -> Option<BlockRef>;
}

/// Tuning knobs of the store.
#[derive(Clone, Debug)]
pub struct ReceiptStoreConfig {
    /// Maximum block age for which tx-hash indexes are retained; `0` keeps
    /// them forever.
    pub tx_lookup_limit: u64,
    /// Log-count budget of a query.
    pub get_logs_limit: usize,
    /// Serialized-size budget of a query, in bytes.
    pub get_logs_size_limit: usize,
    /// Maximum block span of a query.
    pub block_range_limit: u64,
}

impl Default for ReceiptStoreConfig {
    fn default() -> Self {
        Self {
            tx_lookup_limit: 2_350_000,
            get_logs_limit: GET_LOGS_LIMIT,
            get_logs_size_limit: GET_LOGS_LIMIT_BYTES,
            block_range_limit: GET_LOGS_BLOCK_RANGE_LIMIT,
        }
    }
}

/// Value stored under a tx-hash index key.
#[derive(Clone, Debug, PartialEq, Eq, RlpDecodable, RlpEncodable)]
struct TxHashIndex {
    block_hash: B256,
    tx_index: u32,
}

/// A receipt as returned by hash lookup, with its position and bloom.
#[derive(Clone, Debug)]
pub struct ReceiptWithMeta {
    pub receipt: TxReceiptWithType,
    pub block_hash: B256,
    pub tx_index: u32,
    /// Number of logs emitted by earlier transactions in the same block.
    pub log_index: u64,
    pub logs_bloom: Bloom,
}

/// One matching log of a range query, with enough position data to serve
/// `eth_getLogs`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub log: Log,
    pub block_hash: B256,
    pub block_number: u64,
    pub tx_hash: B256,
    pub tx_index: u32,
    /// Per-block sequential log index.
    pub log_index: u64,
}

/// One position of an ordered topic filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopicFilter {
    /// Matches any topic, including a missing one.
    Any,
    /// Requires the log to have exactly this topic at the position.
    Is(B256),
    /// Requires the log's topic at the position to be one of the listed
    /// values.
    OneOf(Vec<B256>),
}

impl TopicFilter {
    fn matches(&self, log: &Log, position: usize) -> bool {
        match self {
            Self::Any => true,
            Self::Is(topic) => log.topics.get(position) == Some(topic),
            Self::OneOf(topics) => log
                .topics
                .get(position)
                .is_some_and(|t| topics.contains(t)),
        }
    }
}

/// Every position of the filter must be satisfied for a log to match.
fn topics_match(filters: &[TopicFilter], log: &Log) -> bool {
    filters
        .iter()
        .enumerate()
        .all(|(position, filter)| filter.matches(log, position))
}

fn receipts_key(block_hash: &B256) -> Vec<u8> {
    let mut key = Vec::with_capacity(33);
    key.push(RECEIPTS_PREFIX);
    key.extend_from_slice(block_hash.as_slice());
    key
}

fn tx_index_key(tx_hash: &B256) -> Vec<u8> {
    let mut key = Vec::with_capacity(33);
    key.push(TX_INDEX_PREFIX);
    key.extend_from_slice(tx_hash.as_slice());
    key
}

/// Persists receipts per block and maintains the tx-hash lookup index.
#[derive(Clone, Debug)]
pub struct ReceiptStore<KV> {
    kv: KV,
    config: ReceiptStoreConfig,
}

impl<KV: KeyValueStore> ReceiptStore<KV> {
    pub fn new(kv: KV) -> Self {
        Self::with_config(kv, ReceiptStoreConfig::default())
    }

    pub fn with_config(kv: KV, config: ReceiptStoreConfig) -> Self {
        Self { kv, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ReceiptStoreConfig {
        &self.config
    }

    /// Encodes and persists a block's receipts, then updates the tx-hash
    /// index. A failed receipt or index write is an error (lookups would be
    /// corrupt); a failed retention delete only leaves a stale index behind
    /// and is logged instead.
    pub fn save_receipts(
        &mut self,
        block: &BlockRef,
        receipts: &[TxReceiptWithType],
        chain: &dyn ChainView,
    ) -> Result<(), StoreError> {
        let mut encoded = Vec::new();
        encode_receipt_list(receipts, &mut encoded);
        self.kv.put(receipts_key(&block.hash), encoded).map_err(|e| {
            error!(block = block.number, %e, "failed to persist receipts");
            e
        })?;

        self.update_index(block, chain)
    }

    fn update_index(&mut self, block: &BlockRef, chain: &dyn ChainView) -> Result<(), StoreError> {
        let limit = self.config.tx_lookup_limit;
        let head = chain.head_number();

        // index the block's transactions while it is inside the retention
        // window (limit 0 retains everything)
        if limit == 0 || head.saturating_sub(limit) < block.number {
            for (i, tx_hash) in block.tx_hashes.iter().enumerate() {
                let value = alloy_rlp::encode(TxHashIndex {
                    block_hash: block.hash,
                    tx_index: i as u32,
                });
                self.kv.put(tx_index_key(tx_hash), value).map_err(|e| {
                    error!(block = block.number, tx = %tx_hash, %e, "failed to index transaction");
                    e
                })?;
            }
        }

        // garbage-collect the indexes of the block falling out of the
        // window; stale leftovers are tolerable, so failures only warn
        if limit > 0 {
            if let Some(expired) = block.number.checked_sub(limit) {
                match chain.block_by_number(expired) {
                    Some(old) => {
                        for tx_hash in &old.tx_hashes {
                            if let Err(e) = self.kv.delete(&tx_index_key(tx_hash)) {
                                warn!(block = expired, tx = %tx_hash, %e, "stale tx index not deleted");
                            }
                        }
                    }
                    None => debug!(block = expired, "no block to expire indexes for"),
                }
            }
        }
        Ok(())
    }

    /// Loads a block's receipts. Unknown blocks read as empty.
    pub fn get_receipts(&self, block_hash: &B256) -> Result<Vec<TxReceiptWithType>, StoreError> {
        match self.kv.get(&receipts_key(block_hash))? {
            Some(encoded) => Ok(Vec::<TxReceiptWithType>::decode(&mut encoded.as_slice())?),
            None => Ok(Vec::new()),
        }
    }

    /// Resolves a receipt by transaction hash, annotating it with its block
    /// position, per-block log index and bloom.
    pub fn get_receipt_by_tx_hash(
        &self,
        tx_hash: &B256,
    ) -> Result<Option<ReceiptWithMeta>, StoreError> {
        let Some(encoded) = self.kv.get(&tx_index_key(tx_hash))? else {
            return Ok(None);
        };
        let index = TxHashIndex::decode(&mut encoded.as_slice())?;

        let receipts = self.get_receipts(&index.block_hash)?;
        let Some(receipt) = receipts.get(index.tx_index as usize) else {
            // index points at a receipt that is not there: corrupt store
            error!(tx = %tx_hash, "tx index points past the stored receipts");
            return Ok(None);
        };

        let log_index = receipts[..index.tx_index as usize]
            .iter()
            .map(|r| r.receipt.logs().len() as u64)
            .sum();

        Ok(Some(ReceiptWithMeta {
            logs_bloom: receipt.receipt.bloom(),
            receipt: receipt.clone(),
            block_hash: index.block_hash,
            tx_index: index.tx_index,
            log_index,
        }))
    }

    /// Collects the logs of blocks `from..=to` that pass the address and
    /// ordered-topic filters, in ascending (block, tx, log) order. The
    /// result is truncated at the configured count and size budgets.
    pub fn get_logs(
        &self,
        chain: &dyn ChainView,
        from: u64,
        to: u64,
        addresses: &[Address],
        topics: &[TopicFilter],
    ) -> Result<Vec<LogEntry>, StoreError> {
        let span = to.saturating_sub(from).saturating_add(1);
        if span > self.config.block_range_limit {
            return Err(StoreError::RangeTooLarge(span, self.config.block_range_limit));
        }

        let mut entries = Vec::new();
        let mut accumulated_size = 0usize;

        for number in from..=to {
            let Some(block) = chain.block_by_number(number) else {
                // past the head: nothing more to scan
                break;
            };
            let receipts = self.get_receipts(&block.hash)?;

            let mut log_index = 0u64;
            for (tx_index, receipt) in receipts.iter().enumerate() {
                for log in receipt.receipt.logs() {
                    let position = log_index;
                    log_index += 1;

                    if !addresses.is_empty() && !addresses.contains(&log.address) {
                        continue;
                    }
                    if !topics_match(topics, log) {
                        continue;
                    }

                    accumulated_size += log.length();
                    entries.push(LogEntry {
                        log: log.clone(),
                        block_hash: block.hash,
                        block_number: number,
                        tx_hash: block
                            .tx_hashes
                            .get(tx_index)
                            .copied()
                            .unwrap_or_default(),
                        tx_index: tx_index as u32,
                        log_index: position,
                    });

                    if entries.len() >= self.config.get_logs_limit
                        || accumulated_size >= self.config.get_logs_size_limit
                    {
                        return Ok(entries);
                    }
                }
            }
        }
        Ok(entries)
    }
}

fn encode_receipt_list(receipts: &[TxReceiptWithType], out: &mut Vec<u8>) {
    let payload_length: usize = receipts.iter().map(Encodable::length).sum();
    alloy_rlp::Header {
        list: true,
        payload_length,
    }
    .encode(out);
    for receipt in receipts {
        receipt.encode(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryKv, TxReceipt};
    use ember_primitives::{address, b256, Bytes, HashMap, U256};

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

    fn block_hash(number: u64) -> B256 {
        let mut raw = [0u8; 32];
        raw[..8].copy_from_slice(&number.to_be_bytes());
        B256::from(raw)
    }

    fn tx_hash(block: u64, index: u64) -> B256 {
        let mut raw = [0u8; 32];
        raw[..8].copy_from_slice(&block.to_be_bytes());
        raw[8..16].copy_from_slice(&index.to_be_bytes());
        B256::from(raw)
    }

    fn receipt_with_logs(logs: Vec<Log>) -> TxReceiptWithType {
        TxReceiptWithType::legacy(TxReceipt::PostByzantium {
            status: true,
            cumulative_gas_used: U256::from(21_000),
            logs,
        })
    }

    fn simple_log(addr_byte: u8, topics: Vec<B256>) -> Log {
        let mut addr = [0u8; 20];
        addr[19] = addr_byte;
        Log::new(Address::from(addr), topics, Bytes::new())
    }

    fn block_with_receipts(
        number: u64,
        receipts: &[TxReceiptWithType],
    ) -> BlockRef {
        BlockRef {
            hash: block_hash(number),
            number,
            tx_hashes: (0..receipts.len() as u64)
                .map(|i| tx_hash(number, i))
                .collect(),
        }
    }

    #[test]
    fn receipt_by_tx_hash_round_trip() {
        let mut chain = TestChain::default();
        let mut store = ReceiptStore::new(MemoryKv::new());

        let t1 = b256!("1111111111111111111111111111111111111111111111111111111111111111");
        let receipts = vec![
            receipt_with_logs(vec![simple_log(0xaa, vec![t1]), simple_log(0xaa, vec![])]),
            receipt_with_logs(vec![simple_log(0xbb, vec![])]),
        ];
        let block = block_with_receipts(7, &receipts);
        chain.insert(block.clone());

        store.save_receipts(&block, &receipts, &chain).unwrap();

        let found = store
            .get_receipt_by_tx_hash(&tx_hash(7, 1))
            .unwrap()
            .unwrap();
        assert_eq!(found.block_hash, block.hash);
        assert_eq!(found.tx_index, 1);
        // two logs precede receipt 1
        assert_eq!(found.log_index, 2);
        assert_eq!(found.receipt, receipts[1]);
        assert!(found
            .logs_bloom
            .contains_input(receipts[1].receipt.logs()[0].address.as_slice()));

        assert!(store
            .get_receipt_by_tx_hash(&tx_hash(7, 2))
            .unwrap()
            .is_none());
    }

    #[test]
    fn lookup_limit_expires_old_indexes() {
        let mut chain = TestChain::default();
        let mut store = ReceiptStore::with_config(
            MemoryKv::new(),
            ReceiptStoreConfig {
                tx_lookup_limit: 2,
                ..Default::default()
            },
        );

        for number in 1..=4 {
            let receipts = vec![receipt_with_logs(vec![])];
            let block = block_with_receipts(number, &receipts);
            chain.insert(block.clone());
            store.save_receipts(&block, &receipts, &chain).unwrap();
        }

        // head is 4, limit 2: blocks 1 and 2 have fallen out of the window
        assert!(store
            .get_receipt_by_tx_hash(&tx_hash(1, 0))
            .unwrap()
            .is_none());
        assert!(store
            .get_receipt_by_tx_hash(&tx_hash(2, 0))
            .unwrap()
            .is_none());
        assert!(store
            .get_receipt_by_tx_hash(&tx_hash(3, 0))
            .unwrap()
            .is_some());
        assert!(store
            .get_receipt_by_tx_hash(&tx_hash(4, 0))
            .unwrap()
            .is_some());
    }

    #[test]
    fn get_logs_filters_by_address_and_ordered_topics() {
        let mut chain = TestChain::default();
        let mut store = ReceiptStore::new(MemoryKv::new());

        let t1 = b256!("1111111111111111111111111111111111111111111111111111111111111111");
        let t2 = b256!("2222222222222222222222222222222222222222222222222222222222222222");

        for number in 10..=12u64 {
            let receipts = if number == 11 {
                vec![
                    receipt_with_logs(vec![simple_log(0xaa, vec![t1, t2])]),
                    receipt_with_logs(vec![simple_log(0xbb, vec![t1])]),
                ]
            } else {
                vec![receipt_with_logs(vec![])]
            };
            let block = block_with_receipts(number, &receipts);
            chain.insert(block.clone());
            store.save_receipts(&block, &receipts, &chain).unwrap();
        }

        let aa = address!("00000000000000000000000000000000000000aa");
        let entries = store
            .get_logs(
                &chain,
                10,
                12,
                &[aa],
                &[TopicFilter::Any, TopicFilter::Is(t2)],
            )
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].block_number, 11);
        assert_eq!(entries[0].tx_index, 0);
        assert_eq!(entries[0].log_index, 0);
        assert_eq!(entries[0].log.address, aa);
    }

    #[test]
    fn topics_all_positions_must_match() {
        let t1 = b256!("1111111111111111111111111111111111111111111111111111111111111111");
        let t2 = b256!("2222222222222222222222222222222222222222222222222222222222222222");

        // a log with a single topic cannot satisfy a filter on position 1
        let log = simple_log(0xbb, vec![t1]);
        assert!(!topics_match(&[TopicFilter::Any, TopicFilter::Is(t2)], &log));
        // matching the first position alone is not enough
        assert!(!topics_match(&[TopicFilter::Is(t1), TopicFilter::Is(t2)], &log));
        // wildcard-only filters match everything
        assert!(topics_match(&[TopicFilter::Any], &log));
        assert!(topics_match(&[], &log));
        // one-of lists
        assert!(topics_match(&[TopicFilter::OneOf(vec![t2, t1])], &log));
        assert!(!topics_match(&[TopicFilter::OneOf(vec![t2])], &log));
    }

    #[test]
    fn get_logs_truncates_at_count_budget() {
        let mut chain = TestChain::default();
        let mut store = ReceiptStore::with_config(
            MemoryKv::new(),
            ReceiptStoreConfig {
                get_logs_limit: 3,
                ..Default::default()
            },
        );

        // 100 matching logs spread over several blocks
        for number in 1..=10u64 {
            let logs: Vec<Log> = (0..10).map(|_| simple_log(0xaa, vec![])).collect();
            let receipts = vec![receipt_with_logs(logs)];
            let block = block_with_receipts(number, &receipts);
            chain.insert(block.clone());
            store.save_receipts(&block, &receipts, &chain).unwrap();
        }

        let entries = store.get_logs(&chain, 1, 10, &[], &[]).unwrap();
        assert_eq!(entries.len(), 3);
        // ascending (block, tx, log) order
        assert_eq!(entries[0].block_number, 1);
        assert_eq!(entries[0].log_index, 0);
        assert_eq!(entries[1].log_index, 1);
        assert_eq!(entries[2].log_index, 2);
    }

    #[test]
    fn get_logs_rejects_oversized_range() {
        let chain = TestChain::default();
        let store = ReceiptStore::new(MemoryKv::new());
        let err = store.get_logs(&chain, 0, 5_000, &[], &[]).unwrap_err();
        assert!(matches!(err, StoreError::RangeTooLarge(5_001, 2_500)));
    }
}
