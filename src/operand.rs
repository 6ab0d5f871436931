//! Operand typing: resolved operand text to tagged operand values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AsmError;
use crate::instructions::{Opcode, RegisterId};

/// One line of resolved intermediate code as handed over by the front end.
///
/// Operands are register names, decimal literals, bracketed decimal
/// addresses, or empty when absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntermediateInstruction {
    pub opcode: String,
    pub op1: String,
    pub op2: String,
}

impl IntermediateInstruction {
    pub fn new(opcode: impl Into<String>, op1: impl Into<String>, op2: impl Into<String>) -> Self {
        Self {
            opcode: opcode.into(),
            op1: op1.into(),
            op2: op2.into(),
        }
    }
}

impl fmt::Display for IntermediateInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.opcode, self.op1, self.op2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TypedOperand {
    Register(RegisterId),
    Memory(u16),
    /// Truncated to 16 bits when encoded.
    Immediate(i32),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandKind {
    Register,
    Memory,
    Immediate,
    None,
}

impl OperandKind {
    pub const ALL: [OperandKind; 4] = [
        OperandKind::Register,
        OperandKind::Memory,
        OperandKind::Immediate,
        OperandKind::None,
    ];
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperandKind::Register => "reg",
            OperandKind::Memory => "mem",
            OperandKind::Immediate => "imm",
            OperandKind::None => "none",
        })
    }
}

impl TypedOperand {
    pub fn kind(&self) -> OperandKind {
        match self {
            TypedOperand::Register(_) => OperandKind::Register,
            TypedOperand::Memory(_) => OperandKind::Memory,
            TypedOperand::Immediate(_) => OperandKind::Immediate,
            TypedOperand::None => OperandKind::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, TypedOperand::None)
    }
}

impl fmt::Display for TypedOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedOperand::Register(r) => write!(f, "{r}"),
            TypedOperand::Memory(addr) => write!(f, "[{addr}]"),
            TypedOperand::Immediate(v) => write!(f, "{v}"),
            TypedOperand::None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedInstruction {
    pub opcode: Opcode,
    pub dst: TypedOperand,
    pub src: TypedOperand,
}

impl TypedInstruction {
    pub fn new(opcode: Opcode, dst: TypedOperand, src: TypedOperand) -> Self {
        Self { opcode, dst, src }
    }
}

impl fmt::Display for TypedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.dst.is_none(), self.src.is_none()) {
            (true, true) => write!(f, "{}", self.opcode),
            (false, true) => write!(f, "{} {}", self.opcode, self.dst),
            (true, false) => write!(f, "{} -, {}", self.opcode, self.src),
            (false, false) => write!(f, "{} {}, {}", self.opcode, self.dst, self.src),
        }
    }
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Classifies one operand string.
///
/// Checked in order: register name, `[<decimal>]`, bare decimal. The empty
/// string is `None`.
pub fn type_operand(op: &str) -> Result<TypedOperand, AsmError> {
    let invalid = || AsmError::InvalidOperand {
        operand: op.to_string(),
    };

    if op.is_empty() {
        return Ok(TypedOperand::None);
    }
    if let Some(r) = RegisterId::from_name(op) {
        return Ok(TypedOperand::Register(r));
    }
    if let Some(inner) = op.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        if !is_decimal(inner) {
            return Err(invalid());
        }
        let addr = inner.parse::<u16>().map_err(|_| invalid())?;
        return Ok(TypedOperand::Memory(addr));
    }
    if is_decimal(op) {
        let value = op.parse::<i32>().map_err(|_| invalid())?;
        return Ok(TypedOperand::Immediate(value));
    }
    Err(invalid())
}

pub fn type_instruction(ic: &IntermediateInstruction) -> Result<TypedInstruction, AsmError> {
    let opcode = ic.opcode.parse::<Opcode>()?;
    Ok(TypedInstruction {
        opcode,
        dst: type_operand(&ic.op1)?,
        src: type_operand(&ic.op2)?,
    })
}

/// Types a whole program, stopping at the first bad line.
pub fn type_program(ics: &[IntermediateInstruction]) -> Result<Vec<TypedInstruction>, AsmError> {
    let typed = ics.iter().map(type_instruction).collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(count = typed.len(), "typed instructions");
    Ok(typed)
}
