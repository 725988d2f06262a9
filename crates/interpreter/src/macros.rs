//! Helper macros for instruction implementations. Each one sets the
//! interpreter's instruction result and returns on failure.

macro_rules! pop {
    ($interp:expr, $x1:ident) => {
        let Ok($x1) = $interp.stack.pop() else {
            $interp.instruction_result = $crate::InstructionResult::StackUnderflow;
            return;
        };
    };
    ($interp:expr, $x1:ident, $x2:ident) => {
        pop!($interp, $x1);
        pop!($interp, $x2);
    };
    ($interp:expr, $x1:ident, $x2:ident, $x3:ident) => {
        pop!($interp, $x1, $x2);
        pop!($interp, $x3);
    };
    ($interp:expr, $x1:ident, $x2:ident, $x3:ident, $x4:ident) => {
        pop!($interp, $x1, $x2, $x3);
        pop!($interp, $x4);
    };
}

/// Pops values and binds a mutable reference to the new top of the stack.
macro_rules! pop_top {
    ($interp:expr, $top:ident) => {
        let Ok($top) = $interp.stack.top() else {
            $interp.instruction_result = $crate::InstructionResult::StackUnderflow;
            return;
        };
    };
    ($interp:expr, $x1:ident, $top:ident) => {
        pop!($interp, $x1);
        pop_top!($interp, $top);
    };
    ($interp:expr, $x1:ident, $x2:ident, $top:ident) => {
        pop!($interp, $x1, $x2);
        pop_top!($interp, $top);
    };
}

macro_rules! push {
    ($interp:expr, $($x:expr),* $(,)?) => {
        $(
            if let Err(result) = $interp.stack.push($x) {
                $interp.instruction_result = result;
                return;
            }
        )*
    };
}

macro_rules! push_b256 {
    ($interp:expr, $($x:expr),* $(,)?) => {
        $(
            if let Err(result) = $interp.stack.push_b256($x) {
                $interp.instruction_result = result;
                return;
            }
        )*
    };
}

macro_rules! as_usize_saturated {
    ($v:expr) => {{
        let limbs = $v.as_limbs();
        if limbs[1] != 0 || limbs[2] != 0 || limbs[3] != 0 {
            usize::MAX
        } else {
            limbs[0] as usize
        }
    }};
}

macro_rules! as_usize_or_fail {
    ($interp:expr, $v:expr) => {
        as_usize_or_fail!($interp, $v, $crate::InstructionResult::OutOfGas)
    };
    ($interp:expr, $v:expr, $reason:expr) => {{
        let limbs = $v.as_limbs();
        if limbs[1] != 0 || limbs[2] != 0 || limbs[3] != 0 {
            $interp.instruction_result = $reason;
            return;
        }
        limbs[0] as usize
    }};
}

/// Grows frame memory to cover `offset..offset+len`, rounded to the 32-byte
/// boundary. The expansion cost has been charged by the opcode's gas
/// function already.
macro_rules! resize_memory {
    ($interp:expr, $offset:expr, $len:expr) => {
        if $len != 0 {
            let end = $offset.saturating_add($len);
            match $crate::interpreter::next_multiple_of_32(end) {
                Some(rounded) => $interp.memory.resize(rounded),
                None => {
                    $interp.instruction_result = $crate::InstructionResult::OutOfGas;
                    return;
                }
            }
        }
    };
}
