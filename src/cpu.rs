use std::fmt;

use anyhow::Error;
use serde::{Deserialize, Serialize};

use crate::decoder::{DecodeError, Decoder, MAX_INSN_LEN};
use crate::exec::Executor;
use crate::instructions::RegisterId;
use crate::memory::{Bus, MEMORY_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    pub memory_size: usize, // bytes, at most 64 KiB
    pub load_address: u16,  // where the code stream is placed and IP starts
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            memory_size: MEMORY_SIZE,
            load_address: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Running,
    Halted,
}

#[derive(thiserror::Error, Debug)]
pub enum Trap {
    #[error("Unknown opcode {opcode:#04x} at {ip:#06x}")]
    UnknownOpcode { ip: u16, opcode: u8 },
    #[error("Invalid register id {id} at {ip:#06x}")]
    InvalidRegisterId { ip: u16, id: u8 },
    #[error("Unsupported ModRM {modrm:#04x} for opcode {opcode:#04x} at {ip:#06x}")]
    InvalidModRm { ip: u16, opcode: u8, modrm: u8 },
    #[error("Invalid instruction at {ip:#06x}")]
    InvalidInstruction { ip: u16 },
    #[error("Ran past end of code at offset {offset:#06x} without HLT")]
    EndOfCode { offset: usize },
    #[error("Bus error at {addr:#06x}: {source}")]
    Bus { addr: u16, #[source] source: Error },
}

impl Trap {
    fn decode(ip: u16, err: DecodeError) -> Self {
        match err {
            DecodeError::UnknownOpcode(opcode) => Trap::UnknownOpcode { ip, opcode },
            DecodeError::InvalidModRm { opcode, modrm } => Trap::InvalidModRm { ip, opcode, modrm },
            DecodeError::InvalidRegisterId(id) => Trap::InvalidRegisterId { ip, id },
            DecodeError::Truncated { .. } => Trap::EndOfCode {
                offset: usize::from(ip),
            },
        }
    }
}

/// Final register contents observed after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Registers {
    pub ax: u16,
    pub bx: u16,
    pub cx: u16,
    pub dx: u16,
    pub sp: u16,
    pub bp: u16,
    pub si: u16,
    pub di: u16,
    pub ip: u16,
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "AX = {}", self.ax)?;
        writeln!(f, "BX = {}", self.bx)?;
        writeln!(f, "CX = {}", self.cx)?;
        write!(f, "DX = {}", self.dx)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub ip: u16,
    pub regs: [u16; 8], // indexed by RegisterId
    pub state: RunState,
    /// One past the last byte of loaded code.
    pub code_end: usize,
    pub cfg: CpuConfig,
}

impl Cpu {
    pub fn new(cfg: CpuConfig) -> Self {
        Self {
            ip: cfg.load_address,
            regs: [0; 8],
            state: RunState::Running,
            code_end: usize::from(cfg.load_address),
            cfg,
        }
    }

    /// Clears registers and points IP at `entry`, with code ending at `code_end`.
    pub fn reset(&mut self, entry: u16, code_end: usize) {
        self.ip = entry;
        self.regs = [0; 8];
        self.state = RunState::Running;
        self.code_end = code_end;
    }

    pub fn reg(&self, r: RegisterId) -> u16 {
        self.regs[r.index()]
    }

    pub fn set_reg(&mut self, r: RegisterId, val: u16) {
        self.regs[r.index()] = val;
    }

    pub fn is_halted(&self) -> bool {
        self.state == RunState::Halted
    }

    pub fn snapshot(&self) -> Registers {
        Registers {
            ax: self.reg(RegisterId::AX),
            bx: self.reg(RegisterId::BX),
            cx: self.reg(RegisterId::CX),
            dx: self.reg(RegisterId::DX),
            sp: self.reg(RegisterId::SP),
            bp: self.reg(RegisterId::BP),
            si: self.reg(RegisterId::SI),
            di: self.reg(RegisterId::DI),
            ip: self.ip,
        }
    }

    /// Fetches, decodes and executes one instruction. A halted CPU stays put.
    pub fn step<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        bus: &mut B,
        dec: &D,
        exec: &X,
    ) -> Result<(), Trap> {
        if self.is_halted() {
            return Ok(());
        }
        let ip = self.ip;
        let start = usize::from(ip);
        if start >= self.code_end {
            return Err(Trap::EndOfCode { offset: start });
        }

        // Fetch window never extends past the loaded code
        let avail = (self.code_end - start).min(MAX_INSN_LEN);
        let mut window = [0u8; MAX_INSN_LEN];
        for (i, slot) in window.iter_mut().enumerate().take(avail) {
            let addr = ip.wrapping_add(i as u16);
            *slot = bus
                .read_u8(addr)
                .map_err(|source| Trap::Bus { addr, source })?;
        }
        let d = dec
            .decode(&window[..avail])
            .map_err(|e| Trap::decode(ip, e))?;
        tracing::trace!(ip, insn = %crate::disasm::fmt_decoded(&d), "step");

        let next = start + usize::from(d.width);
        self.ip = next as u16; // wraps only at the top of memory
        exec.exec(self, bus, d)?;

        if !self.is_halted() && next >= self.code_end {
            return Err(Trap::EndOfCode { offset: next });
        }
        Ok(())
    }

    /// Steps until `HLT`. Every instruction advances IP, so the loop is
    /// bounded by the size of the loaded code.
    pub fn run<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        bus: &mut B,
        dec: &D,
        exec: &X,
    ) -> Result<Registers, Trap> {
        let mut steps = 0u64;
        while !self.is_halted() {
            self.step(bus, dec, exec)?;
            steps += 1;
        }
        tracing::debug!(steps, ip = self.ip, "halted");
        Ok(self.snapshot())
    }
}
