use serde::{Deserialize, Serialize};

use crate::instructions::{Form, Opcode};
use crate::operand::{TypedInstruction, TypedOperand};

/// Longest encoding in the subset: opcode, ModRM, 16-bit operand.
pub const MAX_INSN_LEN: usize = 4;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),
    #[error("ModRM {modrm:#04x} has no decode rule for opcode {opcode:#04x}")]
    InvalidModRm { opcode: u8, modrm: u8 },
    #[error("register id {0} out of range")]
    InvalidRegisterId(u8),
    #[error("instruction needs {need} bytes, only {have} available")]
    Truncated { need: usize, have: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    pub form: Form,
    pub width: u8, // 1..=4 bytes
    pub dst: TypedOperand,
    pub src: TypedOperand,
}

impl Decoded {
    pub fn opcode(&self) -> Opcode {
        self.form.opcode()
    }

    /// The typed instruction this encoding was generated from.
    pub fn instruction(&self) -> TypedInstruction {
        TypedInstruction {
            opcode: self.opcode(),
            dst: self.dst,
            src: self.src,
        }
    }
}

pub trait Decoder {
    /// Decodes the instruction at the start of `bytes`.
    fn decode(&self, bytes: &[u8]) -> Result<Decoded, DecodeError>;
}
