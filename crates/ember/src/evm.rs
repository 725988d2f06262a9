use crate::{db::Database, evm_impl::EvmImpl};
use ember_interpreter::{
    CallInputs, CallOutcome, Contract, CreateInputs, CreateOutcome, CustomOpcode, Inspector,
    InstructionResult, Interpreter, NoOpInspector, OpcodeTable,
};
use ember_precompile::{PrecompileFn, PrecompileSpecId, Precompiles};
use ember_primitives::{Address, Bytes, ChainRules, Env, Log, SpecId, U256};
use std::sync::Arc;

/// One overlay entry for the precompile set: an address with a function
/// installs or replaces the precompile, an address alone removes it,
/// leaving an ordinary empty-code account.
#[derive(Clone, Copy, Debug)]
pub struct CustomPrecompile {
    pub address: Address,
    pub precompile: Option<PrecompileFn>,
}

impl CustomPrecompile {
    pub fn install(address: Address, precompile: PrecompileFn) -> Self {
        Self {
            address,
            precompile: Some(precompile),
        }
    }

    pub fn delete(address: Address) -> Self {
        Self {
            address,
            precompile: None,
        }
    }
}

/// The virtual machine: environment, database handle, opcode table and
/// precompile set. Construction fixes the tables; they are immutable for
/// the EVM's lifetime and copied by value into clones.
#[derive(Clone)]
pub struct Evm<DB> {
    pub env: Env,
    pub db: DB,
    table: Arc<OpcodeTable>,
    precompiles: Arc<Precompiles>,
    custom_opcodes: Vec<CustomOpcode>,
    custom_precompiles: Vec<CustomPrecompile>,
}

/// Recognized construction options for [`Evm`].
pub struct EvmBuilder<DB> {
    db: DB,
    env: Env,
    custom_opcodes: Vec<CustomOpcode>,
    custom_precompiles: Vec<CustomPrecompile>,
}

impl<DB: Database> EvmBuilder<DB> {
    pub fn new(db: DB) -> Self {
        Self {
            db,
            env: Env::default(),
            custom_opcodes: Vec::new(),
            custom_precompiles: Vec::new(),
        }
    }

    /// Selects the hardfork.
    pub fn with_spec(mut self, spec: SpecId) -> Self {
        self.env.cfg.rules = ChainRules::new(spec);
        self
    }

    /// Replaces the whole environment.
    pub fn with_env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    /// Ordered opcode overlay; later entries for the same opcode win.
    pub fn with_custom_opcodes(mut self, custom: Vec<CustomOpcode>) -> Self {
        self.custom_opcodes = custom;
        self
    }

    /// Ordered precompile overlay by address.
    pub fn with_custom_precompiles(mut self, custom: Vec<CustomPrecompile>) -> Self {
        self.custom_precompiles = custom;
        self
    }

    /// Disables the EIP-170 deployed-code size check.
    pub fn allow_unlimited_contract_size(mut self, allow: bool) -> Self {
        self.env.cfg.allow_unlimited_contract_size = allow;
        self
    }

    pub fn build(self) -> Evm<DB> {
        let rules = self.env.cfg.rules;
        let table = OpcodeTable::with_overlay(rules, &self.custom_opcodes);

        let mut precompiles =
            Precompiles::new(PrecompileSpecId::from_spec_id(rules.spec_id())).clone();
        for entry in &self.custom_precompiles {
            match entry.precompile {
                Some(function) => {
                    precompiles.extend([ember_precompile::PrecompileWithAddress(
                        entry.address,
                        function,
                    )]);
                }
                None => precompiles.remove(&entry.address),
            }
        }

        Evm {
            env: self.env,
            db: self.db,
            table: Arc::new(table),
            precompiles: Arc::new(precompiles),
            custom_opcodes: self.custom_opcodes,
            custom_precompiles: self.custom_precompiles,
        }
    }
}

/// Input of [`Evm::run_code`]: run raw bytecode in the configured
/// environment without transaction-level validation.
#[derive(Clone, Debug, Default)]
pub struct RunCodeInput {
    pub code: Bytes,
    pub data: Bytes,
    pub gas_limit: u64,
    pub caller: Address,
    pub address: Address,
    /// Overrides the transaction origin for the run.
    pub origin: Option<Address>,
    pub value: U256,
    pub depth: usize,
    pub is_static: bool,
}

/// Result of [`Evm::run_code`].
#[derive(Clone, Debug)]
pub struct RunCodeResult {
    /// Gas consumed by execution.
    pub execution_gas_used: u64,
    /// RETURN/REVERT payload.
    pub return_value: Bytes,
    /// Present whenever the execution failed, Revert included.
    pub exception: Option<InstructionResult>,
    /// Gas left in the frame.
    pub gas_left: u64,
    /// Accumulated refund counter.
    pub gas_refund: i64,
    /// Logs emitted by the run; empty when the run failed.
    pub logs: Vec<Log>,
}

impl<DB: Database> Evm<DB> {
    /// Builder with the default environment.
    pub fn builder(db: DB) -> EvmBuilder<DB> {
        EvmBuilder::new(db)
    }

    /// The opcode overlay this EVM was built with.
    pub fn custom_opcodes(&self) -> &[CustomOpcode] {
        &self.custom_opcodes
    }

    /// The precompile overlay this EVM was built with.
    pub fn custom_precompiles(&self) -> &[CustomPrecompile] {
        &self.custom_precompiles
    }

    /// The effective dispatch table.
    pub fn opcode_table(&self) -> &OpcodeTable {
        &self.table
    }

    /// Active chain rules.
    pub fn rules(&self) -> ChainRules {
        self.env.cfg.rules
    }

    /// Runs raw bytecode, not observed.
    pub fn run_code(&mut self, input: RunCodeInput) -> RunCodeResult {
        self.run_code_inspected(input, &mut NoOpInspector)
    }

    /// Runs raw bytecode with a step observer attached.
    pub fn run_code_inspected(
        &mut self,
        input: RunCodeInput,
        inspector: &mut dyn Inspector,
    ) -> RunCodeResult {
        let mut env = self.env.clone();
        if let Some(origin) = input.origin {
            env.tx.origin = origin;
        }

        let rules = env.cfg.rules;
        let mut context = EvmImpl::new(
            &env,
            &mut self.db,
            Arc::clone(&self.table),
            Arc::clone(&self.precompiles),
            Some(inspector),
        );

        // warm the executing account and the caller, as the transaction
        // preamble would
        context.data.journal.load_account(input.address, context.data.db);
        context.data.journal.load_account(input.caller, context.data.db);
        context.data.journal.depth = input.depth;
        let checkpoint = context.data.journal.checkpoint();

        let contract = Contract::new(
            input.data,
            input.code,
            input.address,
            input.caller,
            input.value,
        );
        let mut interpreter = Interpreter::new(
            contract,
            input.gas_limit,
            input.depth,
            input.is_static,
            rules,
        );
        let table = Arc::clone(&self.table);
        let result = interpreter.run(&table, &mut context);

        let logs = if result.is_ok() {
            context.data.journal.checkpoint_commit();
            context.into_logs()
        } else {
            context.data.journal.checkpoint_revert(checkpoint);
            Vec::new()
        };

        RunCodeResult {
            execution_gas_used: interpreter.gas.spent(),
            return_value: interpreter.output.clone(),
            exception: (!result.is_ok()).then_some(result),
            gas_left: interpreter.gas.remaining(),
            gas_refund: interpreter.gas.refunded(),
            logs,
        }
    }

    /// Runs a CALL-family message against the configured state, returning
    /// the outcome together with the finalized state delta and logs. The
    /// caller decides whether to [`commit`](crate::DatabaseCommit::commit)
    /// the delta.
    pub fn call(&mut self, inputs: CallInputs) -> (CallOutcome, crate::State, Vec<Log>) {
        let env = self.env.clone();
        let mut context = EvmImpl::new(
            &env,
            &mut self.db,
            Arc::clone(&self.table),
            Arc::clone(&self.precompiles),
            None,
        );
        let outcome = context.call_inner(inputs);
        let (state, logs) = context.data.journal.finalize();
        (outcome, state, logs)
    }

    /// Runs a CREATE message against the configured state; see [`Self::call`]
    /// for the state-delta contract.
    pub fn create(&mut self, inputs: CreateInputs) -> (CreateOutcome, crate::State, Vec<Log>) {
        let env = self.env.clone();
        let mut context = EvmImpl::new(
            &env,
            &mut self.db,
            Arc::clone(&self.table),
            Arc::clone(&self.precompiles),
            None,
        );
        let outcome = context.create_inner(inputs);
        let (state, logs) = context.data.journal.finalize();
        (outcome, state, logs)
    }
}
