use crate::instructions::Opcode;
use crate::operand::OperandKind;

/// Errors raised while turning resolved intermediate code into machine code.
///
/// Every error is fatal to the translation run; nothing is emitted once one
/// is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("invalid operand `{operand}`")]
    InvalidOperand { operand: String },
    #[error("unknown opcode `{opcode}`")]
    UnknownOpcode { opcode: String },
    #[error("instruction {index}: illegal {opcode} {dst}, {src}: {reason}")]
    IllegalOperandCombination {
        index: usize,
        opcode: Opcode,
        dst: OperandKind,
        src: OperandKind,
        reason: &'static str,
    },
    #[error("instruction {index}: no encoding for {opcode} {dst}, {src}")]
    UnsupportedEncoding {
        index: usize,
        opcode: Opcode,
        dst: OperandKind,
        src: OperandKind,
    },
}
