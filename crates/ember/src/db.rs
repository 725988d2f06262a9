use crate::state::AccountInfo;
use ember_primitives::{keccak256, Address, Bytes, HashMap, B256, KECCAK_EMPTY, U256};

/// Read handle to the backing state store. The journal caches everything it
/// reads, so each (account, slot) is fetched at most once per transaction.
pub trait Database {
    /// Basic account data, or `None` when the account does not exist.
    fn basic(&mut self, address: Address) -> Option<AccountInfo>;

    /// Code by its hash. The empty hash reads as empty code.
    fn code_by_hash(&mut self, code_hash: B256) -> Bytes;

    /// Value of a storage slot; absent slots read as zero.
    fn storage(&mut self, address: Address, index: U256) -> U256;

    /// Hash of the block at the given height.
    fn block_hash(&mut self, number: U256) -> B256;
}

#[derive(Clone, Debug, Default)]
struct DbAccount {
    info: AccountInfo,
    storage: HashMap<U256, U256>,
}

/// Map-backed [`Database`] for tests and light embedding.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDB {
    accounts: HashMap<Address, DbAccount>,
    contracts: HashMap<B256, Bytes>,
    block_hashes: HashMap<U256, B256>,
}

impl InMemoryDB {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an account.
    pub fn insert_account_info(&mut self, address: Address, info: AccountInfo) {
        if let Some(code) = info.code.clone() {
            if !code.is_empty() {
                self.contracts.insert(info.code_hash, code);
            }
        }
        self.accounts.entry(address).or_default().info = info;
    }

    /// Deploys `code` at `address`, hashing it for the account info.
    pub fn insert_contract(&mut self, address: Address, code: Bytes) {
        let code_hash = if code.is_empty() {
            KECCAK_EMPTY
        } else {
            keccak256(&code)
        };
        self.insert_account_info(
            address,
            AccountInfo {
                code_hash,
                code: Some(code),
                ..Default::default()
            },
        );
    }

    /// Sets one storage slot.
    pub fn insert_storage(&mut self, address: Address, index: U256, value: U256) {
        self.accounts
            .entry(address)
            .or_default()
            .storage
            .insert(index, value);
    }

    /// Registers a block hash for BLOCKHASH lookups.
    pub fn insert_block_hash(&mut self, number: U256, hash: B256) {
        self.block_hashes.insert(number, hash);
    }
}

/// Write handle: applies a finalized state delta to the store.
pub trait DatabaseCommit {
    fn commit(&mut self, changes: crate::state::State);
}

impl DatabaseCommit for InMemoryDB {
    fn commit(&mut self, changes: crate::state::State) {
        for (address, account) in changes {
            if account.selfdestructed {
                self.accounts.remove(&address);
                continue;
            }
            let entry = self.accounts.entry(address).or_default();
            if let Some(code) = account.info.code.clone() {
                if !code.is_empty() {
                    self.contracts.insert(account.info.code_hash, code);
                }
            }
            entry.info = account.info;
            for (key, slot) in account.storage {
                entry.storage.insert(key, slot.present_value);
            }
        }
    }
}

impl Database for InMemoryDB {
    fn basic(&mut self, address: Address) -> Option<AccountInfo> {
        self.accounts.get(&address).map(|acc| acc.info.clone())
    }

    fn code_by_hash(&mut self, code_hash: B256) -> Bytes {
        if code_hash == KECCAK_EMPTY {
            return Bytes::new();
        }
        self.contracts.get(&code_hash).cloned().unwrap_or_default()
    }

    fn storage(&mut self, address: Address, index: U256) -> U256 {
        self.accounts
            .get(&address)
            .and_then(|acc| acc.storage.get(&index).copied())
            .unwrap_or_default()
    }

    fn block_hash(&mut self, number: U256) -> B256 {
        self.block_hashes.get(&number).copied().unwrap_or_default()
    }
}
