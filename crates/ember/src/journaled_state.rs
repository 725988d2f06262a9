use crate::{
    db::Database,
    state::{Account, AccountInfo, State, StorageSlot},
};
use ember_interpreter::{InstructionResult, SStoreResult, SelfDestructResult};
use ember_primitives::{
    hardfork::SPURIOUS_DRAGON, keccak256, Address, Bytes, ChainRules, HashMap, Log, KECCAK_EMPTY,
    U256,
};

/// Checkpointable cache of accounts and storage over a [`Database`].
///
/// Every mutation is journaled; a checkpoint records how far the journal and
/// the log buffer have grown, and reverting replays the entries backwards.
#[derive(Clone, Debug)]
pub struct JournaledState {
    /// Cached and modified accounts. Presence in the map doubles as the
    /// EIP-2929 warm set.
    pub state: State,
    /// EIP-1153 transient storage, cleared between transactions.
    pub transient_storage: HashMap<(Address, U256), U256>,
    /// Logs emitted so far, truncated on revert.
    pub logs: Vec<Log>,
    /// Current call depth.
    pub depth: usize,
    /// One entry list per open checkpoint.
    journal: Vec<Vec<JournalEntry>>,
    /// Whether EIP-161 state clearing applies.
    state_clear: bool,
}

/// One reversible state effect.
#[derive(Clone, Debug)]
enum JournalEntry {
    /// Account pulled into the warm cache.
    AccountLoaded { address: Address },
    /// Account marked touched (EIP-161 write-back candidate).
    AccountTouched { address: Address },
    /// Balance moved between two accounts.
    BalanceTransfer {
        from: Address,
        to: Address,
        balance: U256,
    },
    /// Nonce incremented by one.
    NonceChange { address: Address },
    /// Account marked created this transaction.
    AccountCreated { address: Address },
    /// Storage slot written, or cold-loaded when `had_value` is `None`.
    StorageChange {
        address: Address,
        key: U256,
        had_value: Option<U256>,
    },
    /// Transient storage slot written.
    TransientStorageChange {
        address: Address,
        key: U256,
        had_value: U256,
    },
    /// Contract code installed on a freshly created account.
    CodeChange { address: Address },
    /// Account scheduled for destruction, balance swept to `target`.
    AccountDestroyed {
        address: Address,
        target: Address,
        was_destroyed: bool,
        had_balance: U256,
    },
}

/// Handle for rolling a frame back.
#[derive(Clone, Copy, Debug)]
pub struct JournalCheckpoint {
    log_i: usize,
    journal_i: usize,
}

impl JournaledState {
    pub fn new(rules: ChainRules) -> Self {
        Self {
            state: HashMap::new(),
            transient_storage: HashMap::new(),
            logs: Vec::new(),
            depth: 0,
            journal: vec![Vec::new()],
            state_clear: rules.is_enabled(SPURIOUS_DRAGON),
        }
    }

    fn last_journal(&mut self) -> &mut Vec<JournalEntry> {
        self.journal.last_mut().expect("journal never empty")
    }

    /// Loads an account into the cache, returning whether it was cold.
    pub fn load_account(&mut self, address: Address, db: &mut dyn Database) -> bool {
        if self.state.contains_key(&address) {
            return false;
        }
        let account = match db.basic(address) {
            Some(info) => Account {
                info,
                ..Default::default()
            },
            None => Account::new_not_existing(),
        };
        self.state.insert(address, account);
        self.last_journal()
            .push(JournalEntry::AccountLoaded { address });
        true
    }

    /// Loads an account and makes sure its code bytes are present.
    /// Returns `(code, is_cold)`.
    pub fn load_code(&mut self, address: Address, db: &mut dyn Database) -> (Bytes, bool) {
        let is_cold = self.load_account(address, db);
        let account = self.state.get_mut(&address).expect("loaded above");
        if account.info.code.is_none() {
            account.info.code = Some(db.code_by_hash(account.info.code_hash));
        }
        (
            account.info.code.clone().expect("filled above"),
            is_cold,
        )
    }

    /// Cached account view. The account has been loaded.
    pub fn account(&self, address: Address) -> &Account {
        self.state.get(&address).expect("account loaded")
    }

    /// Marks an account touched so it is written back on finalize.
    pub fn touch(&mut self, address: Address) {
        if let Some(account) = self.state.get_mut(&address) {
            if !account.touched {
                account.touched = true;
                self.journal
                    .last_mut()
                    .expect("journal never empty")
                    .push(JournalEntry::AccountTouched { address });
            }
        }
    }

    /// Storage read with warm tracking. The account has been loaded.
    /// Returns `(value, is_cold)`.
    pub fn sload(&mut self, address: Address, key: U256, db: &mut dyn Database) -> (U256, bool) {
        let account = self.state.get_mut(&address).expect("account loaded");
        if let Some(slot) = account.storage.get(&key) {
            return (slot.present_value, false);
        }
        // created accounts never consult the database for storage
        let value = if account.created {
            U256::ZERO
        } else {
            db.storage(address, key)
        };
        account.storage.insert(key, StorageSlot::new(value));
        self.last_journal().push(JournalEntry::StorageChange {
            address,
            key,
            had_value: None,
        });
        (value, true)
    }

    /// Start-of-transaction value of a slot. The slot has been loaded.
    pub fn original_storage(&mut self, address: Address, key: U256) -> U256 {
        self.state
            .get(&address)
            .and_then(|account| account.storage.get(&key))
            .map(|slot| slot.original_value)
            .unwrap_or_default()
    }

    /// Storage write. Loads the slot first so the result carries the
    /// original and present values.
    pub fn sstore(
        &mut self,
        address: Address,
        key: U256,
        new: U256,
        db: &mut dyn Database,
    ) -> SStoreResult {
        let (present, is_cold) = self.sload(address, key, db);
        let original = self.original_storage(address, key);
        if present != new {
            let account = self.state.get_mut(&address).expect("account loaded");
            account
                .storage
                .get_mut(&key)
                .expect("slot loaded")
                .present_value = new;
            self.last_journal().push(JournalEntry::StorageChange {
                address,
                key,
                had_value: Some(present),
            });
        }
        self.touch(address);
        SStoreResult {
            original,
            present,
            new,
            is_cold,
        }
    }

    /// EIP-1153 transient read.
    pub fn tload(&mut self, address: Address, key: U256) -> U256 {
        self.transient_storage
            .get(&(address, key))
            .copied()
            .unwrap_or_default()
    }

    /// EIP-1153 transient write.
    pub fn tstore(&mut self, address: Address, key: U256, value: U256) {
        let had_value = if value.is_zero() {
            self.transient_storage.remove(&(address, key))
        } else {
            self.transient_storage.insert((address, key), value)
        }
        .unwrap_or_default();
        if had_value != value {
            self.last_journal().push(JournalEntry::TransientStorageChange {
                address,
                key,
                had_value,
            });
        }
    }

    /// Appends a log. Reverting the checkpoint drops it again.
    pub fn log(&mut self, log: Log) {
        self.logs.push(log);
    }

    /// Moves `value` from `from` to `to`; both become touched.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
        db: &mut dyn Database,
    ) -> Result<(), InstructionResult> {
        self.load_account(from, db);
        self.load_account(to, db);

        if value.is_zero() {
            self.touch(to);
            return Ok(());
        }

        let from_account = self.state.get_mut(&from).expect("loaded above");
        let Some(from_balance) = from_account.info.balance.checked_sub(value) else {
            return Err(InstructionResult::OutOfFunds);
        };
        from_account.info.balance = from_balance;

        let to_account = self.state.get_mut(&to).expect("loaded above");
        let Some(to_balance) = to_account.info.balance.checked_add(value) else {
            return Err(InstructionResult::OverflowPayment);
        };
        to_account.info.balance = to_balance;

        self.last_journal().push(JournalEntry::BalanceTransfer {
            from,
            to,
            balance: value,
        });
        self.touch(from);
        self.touch(to);
        Ok(())
    }

    /// Increments an account's nonce, returning the previous value, or
    /// `None` on overflow.
    pub fn inc_nonce(&mut self, address: Address) -> Option<u64> {
        let account = self.state.get_mut(&address)?;
        let old = account.info.nonce;
        account.info.nonce = old.checked_add(1)?;
        self.last_journal().push(JournalEntry::NonceChange { address });
        self.touch(address);
        Some(old)
    }

    /// Turns a loaded account into a freshly created contract account.
    /// Fails with `CreateCollision` when the slot already carries code or a
    /// nonce.
    pub fn create_account(&mut self, address: Address) -> Result<(), InstructionResult> {
        let account = self.state.get_mut(&address).expect("account loaded");
        if account.info.code_hash != KECCAK_EMPTY || account.info.nonce != 0 {
            return Err(InstructionResult::CreateCollision);
        }
        account.created = true;
        account.loaded_as_not_existing = false;
        account.storage.clear();
        self.last_journal().push(JournalEntry::AccountCreated { address });
        self.touch(address);
        Ok(())
    }

    /// Installs code on a created account.
    pub fn set_code(&mut self, address: Address, code: Bytes) {
        let account = self.state.get_mut(&address).expect("account loaded");
        account.info.code_hash = if code.is_empty() {
            KECCAK_EMPTY
        } else {
            keccak256(&code)
        };
        account.info.code = Some(code);
        self.last_journal().push(JournalEntry::CodeChange { address });
        self.touch(address);
    }

    /// Schedules `address` for destruction and sweeps its balance to
    /// `target`.
    pub fn selfdestruct(
        &mut self,
        address: Address,
        target: Address,
        db: &mut dyn Database,
    ) -> SelfDestructResult {
        let is_cold = self.load_account(target, db);
        let target_exists = self.account(target).exists();

        let account = self.state.get_mut(&address).expect("account loaded");
        let had_balance = account.info.balance;
        let was_destroyed = account.selfdestructed;
        account.info.balance = U256::ZERO;
        account.selfdestructed = true;

        if address != target {
            let target_account = self.state.get_mut(&target).expect("loaded above");
            target_account.info.balance += had_balance;
        }

        self.last_journal().push(JournalEntry::AccountDestroyed {
            address,
            target,
            was_destroyed,
            had_balance,
        });
        self.touch(address);
        self.touch(target);

        SelfDestructResult {
            had_value: !had_balance.is_zero(),
            target_exists,
            is_cold,
            previously_destroyed: was_destroyed,
        }
    }

    /// Opens a checkpoint and enters a new frame.
    pub fn checkpoint(&mut self) -> JournalCheckpoint {
        let checkpoint = JournalCheckpoint {
            log_i: self.logs.len(),
            journal_i: self.journal.len(),
        };
        self.depth += 1;
        self.journal.push(Vec::new());
        checkpoint
    }

    /// Commits the current frame into its parent.
    pub fn checkpoint_commit(&mut self) {
        self.depth -= 1;
        let committed = self.journal.pop().expect("journal never empty");
        self.last_journal().extend(committed);
    }

    /// Rolls the state back to `checkpoint`, dropping this frame's logs and
    /// replaying its journal entries backwards.
    pub fn checkpoint_revert(&mut self, checkpoint: JournalCheckpoint) {
        self.depth -= 1;
        self.logs.truncate(checkpoint.log_i);
        while self.journal.len() > checkpoint.journal_i {
            let entries = self.journal.pop().expect("checked by loop condition");
            for entry in entries.into_iter().rev() {
                Self::revert_entry(&mut self.state, &mut self.transient_storage, entry);
            }
        }
    }

    fn revert_entry(
        state: &mut State,
        transient: &mut HashMap<(Address, U256), U256>,
        entry: JournalEntry,
    ) {
        match entry {
            JournalEntry::AccountLoaded { address } => {
                state.remove(&address);
            }
            JournalEntry::AccountTouched { address } => {
                if let Some(account) = state.get_mut(&address) {
                    account.touched = false;
                }
            }
            JournalEntry::BalanceTransfer { from, to, balance } => {
                if let Some(account) = state.get_mut(&to) {
                    account.info.balance -= balance;
                }
                if let Some(account) = state.get_mut(&from) {
                    account.info.balance += balance;
                }
            }
            JournalEntry::NonceChange { address } => {
                if let Some(account) = state.get_mut(&address) {
                    account.info.nonce -= 1;
                }
            }
            JournalEntry::AccountCreated { address } => {
                if let Some(account) = state.get_mut(&address) {
                    account.created = false;
                }
            }
            JournalEntry::StorageChange {
                address,
                key,
                had_value,
            } => {
                if let Some(account) = state.get_mut(&address) {
                    match had_value {
                        // cold-load marker: the slot leaves the warm set
                        None => {
                            account.storage.remove(&key);
                        }
                        Some(value) => {
                            if let Some(slot) = account.storage.get_mut(&key) {
                                slot.present_value = value;
                            }
                        }
                    }
                }
            }
            JournalEntry::TransientStorageChange {
                address,
                key,
                had_value,
            } => {
                if had_value.is_zero() {
                    transient.remove(&(address, key));
                } else {
                    transient.insert((address, key), had_value);
                }
            }
            JournalEntry::CodeChange { address } => {
                if let Some(account) = state.get_mut(&address) {
                    account.info.code_hash = KECCAK_EMPTY;
                    account.info.code = Some(Bytes::new());
                }
            }
            JournalEntry::AccountDestroyed {
                address,
                target,
                was_destroyed,
                had_balance,
            } => {
                if address != target {
                    if let Some(account) = state.get_mut(&target) {
                        account.info.balance -= had_balance;
                    }
                }
                if let Some(account) = state.get_mut(&address) {
                    account.selfdestructed = was_destroyed;
                    account.info.balance += had_balance;
                }
            }
        }
    }

    /// Ends the transaction: returns the touched accounts and the logs, and
    /// resets the journal. Untouched cache entries are dropped; EIP-161
    /// clears touched empty accounts by reporting them for removal.
    pub fn finalize(&mut self) -> (State, Vec<Log>) {
        let state = core::mem::take(&mut self.state);
        let logs = core::mem::take(&mut self.logs);
        self.journal = vec![Vec::new()];
        self.transient_storage.clear();
        self.depth = 0;

        let state_clear = self.state_clear;
        let state = state
            .into_iter()
            .filter(|(_, account)| {
                account.touched && !(state_clear && account.is_empty())
            })
            .collect();
        (state, logs)
    }
}

/// Creates a new account info record for a certain balance, used to seed
/// test fixtures.
pub fn account_with_balance(balance: U256) -> AccountInfo {
    AccountInfo {
        balance,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryDB;
    use ember_primitives::{address, SpecId};

    fn setup() -> (JournaledState, InMemoryDB) {
        let mut db = InMemoryDB::new();
        db.insert_account_info(
            address!("0000000000000000000000000000000000000001"),
            account_with_balance(U256::from(1000)),
        );
        (
            JournaledState::new(ChainRules::new(SpecId::LATEST)),
            db,
        )
    }

    #[test]
    fn revert_restores_balances_and_warm_set() {
        let (mut journal, mut db) = setup();
        let a = address!("0000000000000000000000000000000000000001");
        let b = address!("0000000000000000000000000000000000000002");

        journal.load_account(a, &mut db);
        let checkpoint = journal.checkpoint();
        journal.transfer(a, b, U256::from(400), &mut db).unwrap();
        assert_eq!(journal.account(a).info.balance, U256::from(600));

        journal.checkpoint_revert(checkpoint);
        assert_eq!(journal.account(a).info.balance, U256::from(1000));
        // b was loaded inside the reverted frame, so it is cold again
        assert!(journal.load_account(b, &mut db));
    }

    #[test]
    fn revert_drops_logs_and_storage_writes() {
        let (mut journal, mut db) = setup();
        let a = address!("0000000000000000000000000000000000000001");
        journal.load_account(a, &mut db);

        let checkpoint = journal.checkpoint();
        journal.sstore(a, U256::from(1), U256::from(42), &mut db);
        journal.log(Log::new(a, vec![], Bytes::new()));
        assert_eq!(journal.logs.len(), 1);

        journal.checkpoint_revert(checkpoint);
        assert!(journal.logs.is_empty());
        let (value, is_cold) = journal.sload(a, U256::from(1), &mut db);
        assert_eq!(value, U256::ZERO);
        assert!(is_cold);
    }

    #[test]
    fn commit_keeps_nested_changes() {
        let (mut journal, mut db) = setup();
        let a = address!("0000000000000000000000000000000000000001");
        journal.load_account(a, &mut db);

        let outer = journal.checkpoint();
        let _inner = journal.checkpoint();
        journal.sstore(a, U256::ZERO, U256::from(7), &mut db);
        journal.checkpoint_commit();
        // the inner write survives the outer revert boundary until the
        // outer frame itself reverts
        journal.checkpoint_revert(outer);
        let (value, _) = journal.sload(a, U256::ZERO, &mut db);
        assert_eq!(value, U256::ZERO);
    }

    #[test]
    fn sstore_result_carries_original() {
        let (mut journal, mut db) = setup();
        let a = address!("0000000000000000000000000000000000000001");
        db.insert_storage(a, U256::from(5), U256::from(10));
        journal.load_account(a, &mut db);

        let first = journal.sstore(a, U256::from(5), U256::from(11), &mut db);
        assert_eq!(first.original, U256::from(10));
        assert_eq!(first.present, U256::from(10));
        assert!(first.is_cold);

        let second = journal.sstore(a, U256::from(5), U256::from(12), &mut db);
        assert_eq!(second.original, U256::from(10));
        assert_eq!(second.present, U256::from(11));
        assert!(!second.is_cold);
    }

    #[test]
    fn create_collision_on_nonzero_nonce() {
        let (mut journal, mut db) = setup();
        let a = address!("0000000000000000000000000000000000000003");
        db.insert_account_info(
            a,
            AccountInfo {
                nonce: 1,
                ..Default::default()
            },
        );
        journal.load_account(a, &mut db);
        assert_eq!(
            journal.create_account(a),
            Err(InstructionResult::CreateCollision)
        );
    }

    #[test]
    fn finalize_reports_touched_only() {
        let (mut journal, mut db) = setup();
        let a = address!("0000000000000000000000000000000000000001");
        let c = address!("0000000000000000000000000000000000000004");
        journal.load_account(a, &mut db);
        journal.load_account(c, &mut db); // loaded but never touched

        journal.transfer(a, a, U256::ZERO, &mut db).unwrap();
        let (state, _) = journal.finalize();
        assert!(state.contains_key(&a));
        assert!(!state.contains_key(&c));
    }
}
