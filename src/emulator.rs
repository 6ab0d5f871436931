use anyhow::Result;

use crate::cpu::{Cpu, CpuConfig, Registers, Trap};
use crate::exec::IntExecutor;
use crate::isa::i8086::I8086Decoder;
use crate::memory::LinearMemory;

/// One emulation run: a fresh register file and memory image.
#[derive(Debug)]
pub struct Emulator {
    pub cpu: Cpu,
    pub mem: LinearMemory,
    dec: I8086Decoder,
    exec: IntExecutor,
}

impl Emulator {
    pub fn new(cfg: CpuConfig) -> Self {
        Self {
            cpu: Cpu::new(cfg),
            mem: LinearMemory::new(cfg.memory_size),
            dec: I8086Decoder::new(),
            exec: IntExecutor,
        }
    }

    /// Places the code stream at the configured load address and resets
    /// the CPU to run it.
    pub fn load(&mut self, code: &[u8]) -> Result<()> {
        let base = self.cpu.cfg.load_address;
        self.mem.load(base, code)?;
        self.cpu.reset(base, usize::from(base) + code.len());
        tracing::debug!(base, bytes = code.len(), "code loaded");
        Ok(())
    }

    /// Preloads data (e.g. initialised variables) without touching the CPU.
    pub fn write_bytes(&mut self, addr: u16, bytes: &[u8]) -> Result<()> {
        self.mem.load(addr, bytes)
    }

    pub fn run(&mut self) -> Result<Registers, Trap> {
        self.cpu.run(&mut self.mem, &self.dec, &self.exec)
    }

    pub fn memory(&self) -> &LinearMemory {
        &self.mem
    }
}

/// Loads `code` at address 0 of a fresh 64 KiB machine and runs it to `HLT`.
///
/// Code that does not fit in memory is reported as a `Trap::Bus` at the
/// load address.
pub fn emulate(code: &[u8]) -> Result<Emulator, Trap> {
    let mut emu = Emulator::new(CpuConfig::default());
    let addr = emu.cpu.cfg.load_address;
    emu.load(code).map_err(|source| Trap::Bus { addr, source })?;
    emu.run()?;
    Ok(emu)
}
