//! Machine-code generation for validated instructions.
//!
//! Each instruction becomes one contiguous byte run. Immediates and
//! addresses are written low byte first; memory operands always use the
//! direct 16-bit address form (`mod=00, r/m=110`).

use crate::error::AsmError;
use crate::instructions::{
    Form, Opcode, RegisterId, GROUP1_ADD, MOD_MEMORY, MOD_REGISTER, RM_DIRECT,
};
use crate::operand::TypedInstruction;

/// Packs a ModRM byte: `mode` in bits 7..6, `reg` in 5..3, `rm` in 2..0.
pub fn modrm(mode: u8, reg: u8, rm: u8) -> u8 {
    ((mode & 0b11) << 6) | ((reg & 0b111) << 3) | (rm & 0b111)
}

/// Splits a ModRM byte back into `(mode, reg, rm)`.
pub fn split_modrm(b: u8) -> (u8, u8, u8) {
    (b >> 6, (b >> 3) & 0b111, b & 0b111)
}

struct Emitter<'a> {
    buf: &'a mut Vec<u8>,
}

impl Emitter<'_> {
    fn u8(&mut self, b: u8) {
        self.buf.push(b);
    }

    fn u16(&mut self, w: u16) {
        self.buf.extend_from_slice(&w.to_le_bytes());
    }

    fn reg_reg(&mut self, form: Form, reg: RegisterId, rm: RegisterId) {
        self.u8(form.byte());
        self.u8(modrm(MOD_REGISTER, reg.id(), rm.id()));
    }

    fn reg_direct(&mut self, form: Form, reg: RegisterId, addr: u16) {
        self.u8(form.byte());
        self.u8(modrm(MOD_MEMORY, reg.id(), RM_DIRECT));
        self.u16(addr);
    }
}

/// Appends the bytes of one instruction and returns the form it used.
///
/// `index` is only used for error reporting. On error nothing is appended.
pub fn encode_instruction(
    insn: &TypedInstruction,
    index: usize,
    buf: &mut Vec<u8>,
) -> Result<Form, AsmError> {
    use crate::operand::TypedOperand::{Immediate, Memory, None as Absent, Register};

    let mut e = Emitter { buf };
    let form = match (insn.opcode, insn.dst, insn.src) {
        (Opcode::Mov, Register(dst), Immediate(v)) => {
            e.u8(Form::MovRegImm.byte() + dst.id());
            e.u16(v as u16);
            Form::MovRegImm
        }
        (Opcode::Mov, Register(dst), Register(src)) => {
            e.reg_reg(Form::MovRegRm, dst, src);
            Form::MovRegRm
        }
        (Opcode::Mov, Register(dst), Memory(addr)) => {
            e.reg_direct(Form::MovRegRm, dst, addr);
            Form::MovRegRm
        }
        (Opcode::Mov, Memory(addr), Register(src)) => {
            e.reg_direct(Form::MovRmReg, src, addr);
            Form::MovRmReg
        }
        (Opcode::Add, Register(dst), Register(src)) => {
            e.reg_reg(Form::AddRegRm, dst, src);
            Form::AddRegRm
        }
        (Opcode::Add, Register(dst), Memory(addr)) => {
            e.reg_direct(Form::AddRegRm, dst, addr);
            Form::AddRegRm
        }
        (Opcode::Add, Memory(addr), Register(src)) => {
            e.reg_direct(Form::AddRmReg, src, addr);
            Form::AddRmReg
        }
        (Opcode::Add, Register(RegisterId::AX), Immediate(v)) => {
            e.u8(Form::AddAccImm.byte());
            e.u16(v as u16);
            Form::AddAccImm
        }
        (Opcode::Add, Register(dst), Immediate(v)) => {
            e.u8(Form::AddRmImm.byte());
            e.u8(modrm(MOD_REGISTER, GROUP1_ADD, dst.id()));
            e.u16(v as u16);
            Form::AddRmImm
        }
        (Opcode::Hlt, Absent, Absent) => {
            e.u8(Form::Hlt.byte());
            Form::Hlt
        }
        (opcode, dst, src) => {
            return Err(AsmError::UnsupportedEncoding {
                index,
                opcode,
                dst: dst.kind(),
                src: src.kind(),
            })
        }
    };
    tracing::trace!(index, ?form, insn = %insn, "encoded");
    Ok(form)
}

/// Encodes a whole program. Either every instruction encodes or no bytes
/// are returned.
pub fn encode(insns: &[TypedInstruction]) -> Result<Vec<u8>, AsmError> {
    let mut code = Vec::with_capacity(insns.len() * 4);
    for (index, insn) in insns.iter().enumerate() {
        encode_instruction(insn, index, &mut code)?;
    }
    tracing::debug!(bytes = code.len(), "machine code generated");
    Ok(code)
}
