pub mod codegen;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod emulator;
pub mod error;
pub mod exec;
pub mod instructions;
pub mod memory;
pub mod operand;
pub mod validate;

pub mod isa {
    pub mod i8086; // 16-bit MOV/ADD/HLT subset
}

pub use cpu::{Cpu, CpuConfig, Registers, RunState, Trap};
pub use emulator::{emulate, Emulator};
pub use error::AsmError;
pub use instructions::{Opcode, RegisterId};
pub use memory::{Bus, LinearMemory, MEMORY_SIZE};
pub use operand::{IntermediateInstruction, OperandKind, TypedInstruction, TypedOperand};

use serde::Serialize;

/// Output of the translation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Program {
    pub instructions: Vec<TypedInstruction>,
    pub code: Vec<u8>,
}

/// Types, validates and encodes resolved intermediate code.
pub fn assemble(ics: &[IntermediateInstruction]) -> Result<Program, AsmError> {
    let instructions = operand::type_program(ics)?;
    validate::validate(&instructions)?;
    let code = codegen::encode(&instructions)?;
    Ok(Program { instructions, code })
}
