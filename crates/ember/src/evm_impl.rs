use crate::{db::Database, journaled_state::JournaledState};
use ember_interpreter::{
    CallInputs, CallOutcome, Contract, CreateInputs, CreateOutcome, CreateScheme, Gas, Host,
    Inspector, InstructionResult, Interpreter, OpcodeTable, SStoreResult, SelfDestructResult,
    StepEvent,
};
use ember_precompile::{PrecompileError, Precompiles};
use ember_primitives::{
    create2_address, create_address,
    hardfork::{HOMESTEAD, SPURIOUS_DRAGON},
    keccak256, Address, Bytes, ChainRules, Env, Log, B256, CALL_STACK_LIMIT, MAX_INITCODE_SIZE,
    U256,
};
use std::sync::Arc;
use tracing::error;

/// Execution context shared by every frame of one transaction: the
/// environment, the journal and the backing database.
pub struct EvmData<'a, DB> {
    pub env: &'a Env,
    pub journal: JournaledState,
    pub db: &'a mut DB,
}

/// One transaction's execution machinery. Implements [`Host`] so the
/// interpreter's CALL/CREATE instructions recurse through it.
pub struct EvmImpl<'a, DB> {
    pub data: EvmData<'a, DB>,
    table: Arc<OpcodeTable>,
    precompiles: Arc<Precompiles>,
    inspector: Option<&'a mut dyn Inspector>,
    rules: ChainRules,
}

impl<'a, DB: Database> EvmImpl<'a, DB> {
    pub fn new(
        env: &'a Env,
        db: &'a mut DB,
        table: Arc<OpcodeTable>,
        precompiles: Arc<Precompiles>,
        inspector: Option<&'a mut dyn Inspector>,
    ) -> Self {
        let rules = env.cfg.rules;
        Self {
            data: EvmData {
                env,
                journal: JournaledState::new(rules),
                db,
            },
            table,
            precompiles,
            inspector,
            rules,
        }
    }

    /// Consumes the context, returning the journaled logs.
    pub fn into_logs(self) -> Vec<Log> {
        self.data.journal.logs
    }

    /// Runs a contract frame to completion.
    fn run_interpreter(
        &mut self,
        contract: Contract,
        gas_limit: u64,
        is_static: bool,
    ) -> (InstructionResult, Gas, Bytes) {
        let depth = self.data.journal.depth;
        let mut interpreter =
            Interpreter::new(contract, gas_limit, depth, is_static, self.rules);
        let table = Arc::clone(&self.table);
        let result = interpreter.run(&table, self);
        (result, interpreter.gas, interpreter.output)
    }

    /// CALL-family framing: checkpoint, transfer, precompile or code
    /// dispatch, commit or revert.
    pub fn call_inner(&mut self, inputs: CallInputs) -> CallOutcome {
        let gas = Gas::new(inputs.gas_limit);

        // fail before entering the frame: too deep
        if self.data.journal.depth > CALL_STACK_LIMIT {
            return CallOutcome::new(InstructionResult::CallTooDeep, gas, Bytes::new());
        }

        let (code, _) = self.data.journal.load_code(inputs.contract, self.data.db);

        let checkpoint = self.data.journal.checkpoint();

        // value moves for CALL/CALLCODE; zero-value transfer still touches
        if let Err(result) = self.data.journal.transfer(
            inputs.transfer.source,
            inputs.transfer.target,
            inputs.transfer.value,
            self.data.db,
        ) {
            // insufficient balance fails without entering; gas is untouched
            self.data.journal.checkpoint_revert(checkpoint);
            return CallOutcome::new(result, gas, Bytes::new());
        }

        if let Some(precompile) = self.precompiles.get(&inputs.contract).copied() {
            let outcome = self.run_precompile(precompile, &inputs, gas);
            if outcome.result.is_ok() {
                self.data.journal.checkpoint_commit();
            } else {
                self.data.journal.checkpoint_revert(checkpoint);
            }
            return outcome;
        }

        // an account without code succeeds trivially
        if code.is_empty() {
            self.data.journal.checkpoint_commit();
            return CallOutcome::new(InstructionResult::Stop, gas, Bytes::new());
        }

        let contract = Contract::new(
            inputs.input,
            code,
            inputs.context.address,
            inputs.context.caller,
            inputs.context.apparent_value,
        );
        let (result, gas, output) =
            self.run_interpreter(contract, inputs.gas_limit, inputs.is_static);

        if result.is_ok() {
            self.data.journal.checkpoint_commit();
        } else {
            self.data.journal.checkpoint_revert(checkpoint);
        }
        CallOutcome::new(result, gas, output)
    }

    fn run_precompile(
        &mut self,
        precompile: ember_precompile::PrecompileFn,
        inputs: &CallInputs,
        mut gas: Gas,
    ) -> CallOutcome {
        match precompile(&inputs.input, inputs.gas_limit) {
            Ok(output) => {
                if !gas.record_cost(output.gas_used) {
                    // a precompile reporting more gas than it was given is
                    // a bug in the precompile, not a consensus condition
                    error!(address = %inputs.contract, "precompile overran its gas limit");
                    gas.spend_all();
                    return CallOutcome::new(InstructionResult::PrecompileError, gas, Bytes::new());
                }
                CallOutcome::new(InstructionResult::Return, gas, output.bytes)
            }
            Err(error) => {
                gas.spend_all();
                let result = match error {
                    PrecompileError::OutOfGas => InstructionResult::OutOfGas,
                    _ => InstructionResult::PrecompileError,
                };
                CallOutcome::new(result, gas, Bytes::new())
            }
        }
    }

    /// CREATE/CREATE2 framing: address derivation, collision check, init
    /// frame, returned-code validation and deposit.
    pub fn create_inner(&mut self, inputs: CreateInputs) -> CreateOutcome {
        let gas = Gas::new(inputs.gas_limit);

        if self.data.journal.depth > CALL_STACK_LIMIT {
            return CreateOutcome::new(InstructionResult::CallTooDeep, None, gas, Bytes::new());
        }

        self.data.journal.load_account(inputs.caller, self.data.db);
        if self.data.journal.account(inputs.caller).info.balance < inputs.value {
            return CreateOutcome::new(InstructionResult::OutOfFunds, None, gas, Bytes::new());
        }

        // EIP-3860 guards transaction-level creates too
        if self.rules.is_enabled(ember_primitives::hardfork::SHANGHAI)
            && inputs.init_code.len() > MAX_INITCODE_SIZE
        {
            return CreateOutcome::new(
                InstructionResult::CreateInitCodeSizeLimit,
                None,
                Gas::new_spent(inputs.gas_limit),
                Bytes::new(),
            );
        }

        let Some(old_nonce) = self.data.journal.inc_nonce(inputs.caller) else {
            return CreateOutcome::new(InstructionResult::NonceOverflow, None, gas, Bytes::new());
        };

        let created_address = match inputs.scheme {
            CreateScheme::Create => create_address(inputs.caller, old_nonce),
            CreateScheme::Create2 { salt } => {
                create2_address(inputs.caller, keccak256(&inputs.init_code), salt)
            }
        };

        self.data.journal.load_account(created_address, self.data.db);
        let checkpoint = self.data.journal.checkpoint();

        if let Err(result) = self.data.journal.create_account(created_address) {
            self.data.journal.checkpoint_revert(checkpoint);
            return CreateOutcome::new(
                result,
                Some(created_address),
                Gas::new_spent(inputs.gas_limit),
                Bytes::new(),
            );
        }

        if let Err(result) = self.data.journal.transfer(
            inputs.caller,
            created_address,
            inputs.value,
            self.data.db,
        ) {
            self.data.journal.checkpoint_revert(checkpoint);
            return CreateOutcome::new(result, Some(created_address), gas, Bytes::new());
        }

        // EIP-161: created accounts start at nonce 1
        if self.rules.is_enabled(SPURIOUS_DRAGON) {
            self.data.journal.inc_nonce(created_address);
        }

        let contract = Contract::new(
            Bytes::new(),
            inputs.init_code,
            created_address,
            inputs.caller,
            inputs.value,
        );
        let (result, mut gas, output) =
            self.run_interpreter(contract, inputs.gas_limit, false);

        if !result.is_ok() {
            self.data.journal.checkpoint_revert(checkpoint);
            let output = if result.is_revert() { output } else { Bytes::new() };
            return CreateOutcome::new(result, Some(created_address), gas, output);
        }

        // EIP-3541: no deployed code may start with 0xEF
        if self.rules.rejects_ef_bytecode() && output.first() == Some(&0xef) {
            self.data.journal.checkpoint_revert(checkpoint);
            return CreateOutcome::new(
                InstructionResult::CreateContractStartingWithEF,
                Some(created_address),
                Gas::new_spent(inputs.gas_limit),
                Bytes::new(),
            );
        }

        // EIP-170: deployed code size limit
        if !self.data.env.cfg.allow_unlimited_contract_size {
            if let Some(limit) = self.rules.max_code_size() {
                if output.len() > limit {
                    self.data.journal.checkpoint_revert(checkpoint);
                    return CreateOutcome::new(
                        InstructionResult::CreateContractSizeLimit,
                        Some(created_address),
                        Gas::new_spent(inputs.gas_limit),
                        Bytes::new(),
                    );
                }
            }
        }

        // code deposit: 200 gas per byte
        let deposit = output.len() as u64 * ember_interpreter::gas::CODEDEPOSIT;
        if !gas.record_cost(deposit) {
            if self.rules.is_enabled(HOMESTEAD) {
                self.data.journal.checkpoint_revert(checkpoint);
                return CreateOutcome::new(
                    InstructionResult::CodeStoreOutOfGas,
                    Some(created_address),
                    Gas::new_spent(inputs.gas_limit),
                    Bytes::new(),
                );
            }
            // Frontier kept the account with empty code instead of failing
            self.data.journal.set_code(created_address, Bytes::new());
            self.data.journal.checkpoint_commit();
            return CreateOutcome::new(
                InstructionResult::Return,
                Some(created_address),
                gas,
                Bytes::new(),
            );
        }

        self.data.journal.set_code(created_address, output);
        self.data.journal.checkpoint_commit();
        CreateOutcome::new(
            InstructionResult::Return,
            Some(created_address),
            gas,
            Bytes::new(),
        )
    }
}

impl<DB: Database> Host for EvmImpl<'_, DB> {
    fn env(&self) -> &Env {
        self.data.env
    }

    fn block_hash(&mut self, number: U256) -> B256 {
        self.data.db.block_hash(number)
    }

    fn load_account(&mut self, address: Address) -> (bool, bool) {
        let is_cold = self.data.journal.load_account(address, self.data.db);
        let exists =
            self.data.journal.account(address).exists() || self.precompiles.contains(&address);
        (is_cold, exists)
    }

    fn balance(&mut self, address: Address) -> (U256, bool) {
        let is_cold = self.data.journal.load_account(address, self.data.db);
        (self.data.journal.account(address).info.balance, is_cold)
    }

    fn code(&mut self, address: Address) -> (Bytes, bool) {
        self.data.journal.load_code(address, self.data.db)
    }

    fn code_hash(&mut self, address: Address) -> (B256, bool) {
        let is_cold = self.data.journal.load_account(address, self.data.db);
        let account = self.data.journal.account(address);
        // non-existing and empty accounts hash to zero
        if !account.exists() || account.is_empty() {
            return (B256::ZERO, is_cold);
        }
        (account.info.code_hash, is_cold)
    }

    fn sload(&mut self, address: Address, index: U256) -> (U256, bool) {
        self.data.journal.sload(address, index, self.data.db)
    }

    fn original_storage(&mut self, address: Address, index: U256) -> U256 {
        self.data.journal.original_storage(address, index)
    }

    fn sstore(&mut self, address: Address, index: U256, value: U256) -> SStoreResult {
        self.data.journal.sstore(address, index, value, self.data.db)
    }

    fn tload(&mut self, address: Address, index: U256) -> U256 {
        self.data.journal.tload(address, index)
    }

    fn tstore(&mut self, address: Address, index: U256, value: U256) {
        self.data.journal.tstore(address, index, value)
    }

    fn log(&mut self, log: Log) {
        self.data.journal.log(log)
    }

    fn selfdestruct(&mut self, address: Address, target: Address) -> SelfDestructResult {
        self.data.journal.selfdestruct(address, target, self.data.db)
    }

    fn call(&mut self, inputs: CallInputs) -> CallOutcome {
        self.call_inner(inputs)
    }

    fn create(&mut self, inputs: CreateInputs) -> CreateOutcome {
        self.create_inner(inputs)
    }

    fn step(&mut self, event: &StepEvent<'_>) -> InstructionResult {
        match &mut self.inspector {
            Some(inspector) => inspector.step(event),
            None => InstructionResult::Continue,
        }
    }
}
