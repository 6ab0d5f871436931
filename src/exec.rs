use crate::cpu::{Cpu, RunState, Trap};
use crate::decoder::Decoded;
use crate::instructions::Form;
use crate::memory::Bus;
use crate::operand::TypedOperand;

pub trait Executor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: Decoded) -> Result<(), Trap>;
}

fn load<B: Bus>(cpu: &Cpu, bus: &mut B, ip: u16, op: TypedOperand) -> Result<u16, Trap> {
    match op {
        TypedOperand::Register(r) => Ok(cpu.reg(r)),
        TypedOperand::Memory(addr) => bus
            .read_u16(addr)
            .map_err(|source| Trap::Bus { addr, source }),
        TypedOperand::Immediate(v) => Ok(v as u16),
        TypedOperand::None => Err(Trap::InvalidInstruction { ip }),
    }
}

fn store<B: Bus>(
    cpu: &mut Cpu,
    bus: &mut B,
    ip: u16,
    op: TypedOperand,
    val: u16,
) -> Result<(), Trap> {
    match op {
        TypedOperand::Register(r) => {
            cpu.set_reg(r, val);
            Ok(())
        }
        TypedOperand::Memory(addr) => bus
            .write_u16(addr, val)
            .map_err(|source| Trap::Bus { addr, source }),
        TypedOperand::Immediate(_) | TypedOperand::None => Err(Trap::InvalidInstruction { ip }),
    }
}

/// Integer executor: 16-bit moves and wrapping adds, no flags.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntExecutor;
impl Executor for IntExecutor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: Decoded) -> Result<(), Trap> {
        // IP has already moved past this instruction
        let ip = cpu.ip.wrapping_sub(u16::from(d.width));
        match d.form {
            Form::MovRegImm | Form::MovRegRm | Form::MovRmReg => {
                let val = load(cpu, bus, ip, d.src)?;
                store(cpu, bus, ip, d.dst, val)?;
            }
            Form::AddRegRm | Form::AddRmReg | Form::AddAccImm | Form::AddRmImm => {
                let a = load(cpu, bus, ip, d.dst)?;
                let b = load(cpu, bus, ip, d.src)?;
                store(cpu, bus, ip, d.dst, a.wrapping_add(b))?;
            }
            Form::Hlt => {
                cpu.state = RunState::Halted;
            }
        }
        Ok(())
    }
}
