use ember_primitives::{Bytes, HashMap, B256, KECCAK_EMPTY, U256};

/// Balance, nonce and code of an account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountInfo {
    pub balance: U256,
    pub nonce: u64,
    pub code_hash: B256,
    /// Code bytes, loaded lazily; `None` means not fetched yet.
    pub code: Option<Bytes>,
}

impl Default for AccountInfo {
    fn default() -> Self {
        Self {
            balance: U256::ZERO,
            nonce: 0,
            code_hash: KECCAK_EMPTY,
            code: None,
        }
    }
}

impl AccountInfo {
    pub fn new(balance: U256, nonce: u64, code_hash: B256, code: Bytes) -> Self {
        Self {
            balance,
            nonce,
            code_hash,
            code: Some(code),
        }
    }

    /// Account is empty per EIP-161: zero balance, zero nonce, no code.
    pub fn is_empty(&self) -> bool {
        self.balance.is_zero() && self.nonce == 0 && self.code_hash == KECCAK_EMPTY
    }

    /// Whether the account carries code.
    pub fn has_code(&self) -> bool {
        self.code_hash != KECCAK_EMPTY
    }
}

/// One storage slot with the value it had at the start of the transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StorageSlot {
    pub original_value: U256,
    pub present_value: U256,
}

impl StorageSlot {
    pub fn new(value: U256) -> Self {
        Self {
            original_value: value,
            present_value: value,
        }
    }

    /// Whether the slot was written this transaction.
    pub fn is_changed(&self) -> bool {
        self.original_value != self.present_value
    }
}

/// In-journal representation of an account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Account {
    pub info: AccountInfo,
    pub storage: HashMap<U256, StorageSlot>,
    /// Touched accounts are written back on finalize (EIP-161).
    pub touched: bool,
    /// Created this transaction (storage reads skip the database).
    pub created: bool,
    /// Scheduled for destruction by SELFDESTRUCT.
    pub selfdestructed: bool,
    /// The database had no such account; it exists only as a journal stub.
    pub loaded_as_not_existing: bool,
}

impl Account {
    pub fn new_not_existing() -> Self {
        Self {
            loaded_as_not_existing: true,
            ..Default::default()
        }
    }

    /// Empty per EIP-161 and therefore removable when touched.
    pub fn is_empty(&self) -> bool {
        self.info.is_empty()
    }

    /// Whether the account exists for the purposes of the CALL new-account
    /// charge.
    pub fn exists(&self) -> bool {
        !self.loaded_as_not_existing || self.touched || !self.is_empty()
    }
}

/// Post-execution state delta: every touched account.
pub type State = HashMap<ember_primitives::Address, Account>;
