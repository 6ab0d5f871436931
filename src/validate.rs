//! Operand legality per opcode.

use crate::error::AsmError;
use crate::instructions::Opcode;
use crate::operand::OperandKind::{Immediate, Memory, None as Absent};
use crate::operand::TypedInstruction;

/// Checks one instruction; the error string names the broken rule.
pub fn check(insn: &TypedInstruction) -> Result<(), &'static str> {
    let (dst, src) = (insn.dst.kind(), insn.src.kind());
    match insn.opcode {
        Opcode::Mov => match (dst, src) {
            (Memory, Memory) => Err("memory to memory not allowed"),
            (Memory, Immediate) => Err("immediate to memory not allowed"),
            (Absent, _) | (_, Absent) => Err("missing operand"),
            _ => Ok(()),
        },
        Opcode::Add => match (dst, src) {
            (Memory, Memory) => Err("memory to memory not allowed"),
            (Absent, _) | (_, Absent) => Err("missing operand"),
            _ => Ok(()),
        },
        Opcode::Hlt => match (dst, src) {
            (Absent, Absent) => Ok(()),
            _ => Err("operands not allowed"),
        },
    }
}

/// Validates a program in order and reports the first violation.
pub fn validate(insns: &[TypedInstruction]) -> Result<(), AsmError> {
    for (index, insn) in insns.iter().enumerate() {
        check(insn).map_err(|reason| AsmError::IllegalOperandCombination {
            index,
            opcode: insn.opcode,
            dst: insn.dst.kind(),
            src: insn.src.kind(),
            reason,
        })?;
    }
    tracing::debug!(count = insns.len(), "instructions validated");
    Ok(())
}
