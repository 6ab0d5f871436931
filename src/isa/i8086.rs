use crate::codegen::split_modrm;
use crate::decoder::{DecodeError, Decoded, Decoder};
use crate::instructions::{
    lookup, AddrMode, RegisterId, GROUP1_ADD, MOD_MEMORY, MOD_REGISTER, RM_DIRECT,
};
use crate::operand::TypedOperand;

/// Decoder for the 16-bit MOV/ADD/HLT subset.
/// Inverse of `codegen::encode`: register-direct (`mod=11`) and direct
/// 16-bit address (`mod=00, r/m=110`) operands only.
#[derive(Debug, Default, Clone, Copy)]
pub struct I8086Decoder;

impl I8086Decoder {
    pub fn new() -> Self {
        Self
    }
}

fn need(bytes: &[u8], n: usize) -> Result<(), DecodeError> {
    if bytes.len() < n {
        return Err(DecodeError::Truncated {
            need: n,
            have: bytes.len(),
        });
    }
    Ok(())
}

fn reg(id: u8) -> Result<RegisterId, DecodeError> {
    RegisterId::new(id).ok_or(DecodeError::InvalidRegisterId(id))
}

fn imm16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

impl Decoder for I8086Decoder {
    fn decode(&self, bytes: &[u8]) -> Result<Decoded, DecodeError> {
        need(bytes, 1)?;
        let op = bytes[0];
        let desc = lookup(op).ok_or(DecodeError::UnknownOpcode(op))?;
        let form = desc.form;

        match desc.mode {
            AddrMode::Implied => Ok(Decoded {
                form,
                width: 1,
                dst: TypedOperand::None,
                src: TypedOperand::None,
            }),
            AddrMode::RegInOpcode => {
                // B8+r iw
                need(bytes, 3)?;
                Ok(Decoded {
                    form,
                    width: 3,
                    dst: TypedOperand::Register(reg(op - desc.byte)?),
                    src: TypedOperand::Immediate(i32::from(imm16(bytes, 1))),
                })
            }
            AddrMode::AccImm => {
                need(bytes, 3)?;
                Ok(Decoded {
                    form,
                    width: 3,
                    dst: TypedOperand::Register(RegisterId::AX),
                    src: TypedOperand::Immediate(i32::from(imm16(bytes, 1))),
                })
            }
            AddrMode::RmImm => {
                // 81 /0 iw, register destination only
                need(bytes, 4)?;
                let modrm = bytes[1];
                let (mode, sub, rm) = split_modrm(modrm);
                if mode != MOD_REGISTER || sub != GROUP1_ADD {
                    return Err(DecodeError::InvalidModRm { opcode: op, modrm });
                }
                Ok(Decoded {
                    form,
                    width: 4,
                    dst: TypedOperand::Register(reg(rm)?),
                    src: TypedOperand::Immediate(i32::from(imm16(bytes, 2))),
                })
            }
            AddrMode::RegRm | AddrMode::RmReg => {
                need(bytes, 2)?;
                let modrm = bytes[1];
                let (mode, r, rm) = split_modrm(modrm);
                let reg_op = TypedOperand::Register(reg(r)?);
                let (rm_op, width) = match (mode, rm) {
                    (MOD_REGISTER, _) => (TypedOperand::Register(reg(rm)?), 2),
                    (MOD_MEMORY, RM_DIRECT) => {
                        need(bytes, 4)?;
                        (TypedOperand::Memory(imm16(bytes, 2)), 4)
                    }
                    _ => return Err(DecodeError::InvalidModRm { opcode: op, modrm }),
                };
                let (dst, src) = if desc.mode == AddrMode::RegRm {
                    (reg_op, rm_op)
                } else {
                    (rm_op, reg_op)
                };
                Ok(Decoded { form, width, dst, src })
            }
        }
    }
}
