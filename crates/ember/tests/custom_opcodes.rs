//! Opcode-table extensibility: overrides, deletions and isolation between
//! EVM instances.

use ember::{
    CustomOpcode, Evm, InMemoryDB, Inspector, InstructionResult, OpcodeDescriptor, RunCodeInput,
    SpecId, StepEvent, U256,
};
use ember_primitives::Bytes;

#[derive(Default)]
struct RecordingInspector {
    steps: Vec<(usize, u8, String, u64, usize)>,
}

impl Inspector for RecordingInspector {
    fn step(&mut self, event: &StepEvent<'_>) -> InstructionResult {
        self.steps.push((
            event.pc,
            event.opcode,
            event.name.to_string(),
            event.gas_left,
            event.depth,
        ));
        InstructionResult::Continue
    }
}

fn run_input(code: &[u8], gas_limit: u64) -> RunCodeInput {
    RunCodeInput {
        code: Bytes::copy_from_slice(code),
        gas_limit,
        ..Default::default()
    }
}

fn test_opcode() -> OpcodeDescriptor {
    OpcodeDescriptor::custom("TEST", 333)
        .with_stack(0, 1)
        .with_gas(|_, _, base| Some(base + 33))
        .with_logic(|interpreter, _| {
            if let Err(result) = interpreter.stack.push(U256::from(1)) {
                interpreter.instruction_result = result;
            }
        })
}

#[test]
fn custom_opcode_gas_logic_and_step_event() {
    let mut evm = Evm::builder(InMemoryDB::new())
        .with_spec(SpecId::LATEST)
        .with_custom_opcodes(vec![CustomOpcode::install(0x21, test_opcode())])
        .build();

    let mut inspector = RecordingInspector::default();
    let result = evm.run_code_inspected(run_input(&[0x21], 100_000), &mut inspector);

    assert_eq!(result.exception, None);
    assert_eq!(result.execution_gas_used, 366);
    assert_eq!(result.gas_left, 100_000 - 366);

    let (pc, opcode, name, gas_left, depth) = &inspector.steps[0];
    assert_eq!(*pc, 0);
    assert_eq!(*opcode, 0x21);
    assert_eq!(name, "TEST");
    assert_eq!(*gas_left, 100_000 - 366);
    assert_eq!(*depth, 0);
}

#[test]
fn deleted_opcode_fails_and_consumes_all_gas() {
    let mut evm = Evm::builder(InMemoryDB::new())
        .with_spec(SpecId::LATEST)
        .with_custom_opcodes(vec![CustomOpcode::delete(0x20)])
        .build();

    let result = evm.run_code(run_input(&[0x20], 123_456));

    assert_eq!(result.exception, Some(InstructionResult::OpcodeNotFound));
    assert_eq!(result.exception.unwrap().as_str(), "invalid opcode");
    assert_eq!(result.execution_gas_used, 123_456);
    assert_eq!(result.gas_left, 0);
}

#[test]
fn deleting_an_opcode_leaves_fresh_evms_untouched() {
    // EVM A deletes ADD
    let mut modified = Evm::builder(InMemoryDB::new())
        .with_spec(SpecId::LATEST)
        .with_custom_opcodes(vec![CustomOpcode::delete(0x01)])
        .build();
    let failed = modified.run_code(run_input(&[0x60, 0x01, 0x60, 0x01, 0x01], 100_000));
    assert_eq!(failed.exception, Some(InstructionResult::OpcodeNotFound));

    // EVM B, freshly constructed with defaults, still executes ADD:
    // PUSH1 4, PUSH1 1, ADD, PUSH1 0, MSTORE, PUSH1 1, PUSH1 31, RETURN
    let mut pristine = Evm::builder(InMemoryDB::new())
        .with_spec(SpecId::LATEST)
        .build();
    let code = ember_primitives::hex!("60046001016000526001601ff3");
    let result = pristine.run_code(run_input(&code, 100_000));
    assert_eq!(result.exception, None);
    assert_eq!(result.return_value.as_ref(), [0x05]);
}

#[test]
fn overriding_an_existing_opcode() {
    // replace KECCAK256 (0x20) with the TEST opcode
    let mut evm = Evm::builder(InMemoryDB::new())
        .with_spec(SpecId::LATEST)
        .with_custom_opcodes(vec![CustomOpcode::install(0x20, test_opcode())])
        .build();

    let result = evm.run_code(run_input(&[0x20], 100_000));
    assert_eq!(result.exception, None);
    assert_eq!(result.execution_gas_used, 366);
}

#[test]
fn clones_copy_the_overlay_by_value() {
    let original = Evm::builder(InMemoryDB::new())
        .with_spec(SpecId::LATEST)
        .with_custom_opcodes(vec![CustomOpcode::install(0x21, test_opcode())])
        .build();

    let mut cloned = original.clone();
    assert_eq!(cloned.custom_opcodes().len(), 1);

    // the clone dispatches its own copy of the overlay
    let result = cloned.run_code(run_input(&[0x21], 1_000));
    assert_eq!(result.execution_gas_used, 366);

    // rebuilding the clone with a different overlay leaves the original's
    // table untouched
    let mut rebuilt = Evm::builder(InMemoryDB::new())
        .with_spec(SpecId::LATEST)
        .with_custom_opcodes(vec![CustomOpcode::delete(0x21)])
        .build();
    assert!(rebuilt
        .run_code(run_input(&[0x21], 1_000))
        .exception
        .is_some());

    let mut original = original;
    let result = original.run_code(run_input(&[0x21], 1_000));
    assert_eq!(result.exception, None);
}

#[test]
fn observer_requested_halt_is_honored_within_one_opcode() {
    struct HaltAfterFirstStep {
        steps: usize,
    }
    impl Inspector for HaltAfterFirstStep {
        fn step(&mut self, _event: &StepEvent<'_>) -> InstructionResult {
            self.steps += 1;
            InstructionResult::Stop
        }
    }

    let mut evm = Evm::builder(InMemoryDB::new())
        .with_spec(SpecId::LATEST)
        .build();
    let mut inspector = HaltAfterFirstStep { steps: 0 };
    // a loop that would otherwise run until out of gas:
    // JUMPDEST, PUSH1 0, JUMP
    let result = evm.run_code_inspected(run_input(&[0x5b, 0x60, 0x00, 0x56], 1_000_000), &mut inspector);

    assert_eq!(inspector.steps, 1);
    assert_eq!(result.exception, None);
    assert!(result.gas_left > 0);
}
