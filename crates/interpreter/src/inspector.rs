use crate::{InstructionResult, Stack};
use auto_impl::auto_impl;

/// Immutable view of one interpreter step, handed to observers after the
/// gas charge and before the instruction logic runs.
#[derive(Debug)]
pub struct StepEvent<'a> {
    /// Program counter of the fetched instruction.
    pub pc: usize,
    /// Raw opcode byte.
    pub opcode: u8,
    /// Resolved opcode name.
    pub name: &'a str,
    /// Gas remaining after this step's charge.
    pub gas_left: u64,
    /// Call depth of the frame.
    pub depth: usize,
    /// Stack as it looks before the instruction executes.
    pub stack: &'a Stack,
}

/// Synchronous step observer.
///
/// Observers see an immutable view and must not retain it past the
/// callback. Returning anything other than `Continue` asks the interpreter
/// to halt; the request is honored before the next fetch.
#[auto_impl(&mut, Box)]
pub trait Inspector {
    fn step(&mut self, _event: &StepEvent<'_>) -> InstructionResult {
        InstructionResult::Continue
    }
}

/// An [`Inspector`] that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpInspector;

impl Inspector for NoOpInspector {}
