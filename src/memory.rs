use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Size of the flat 16-bit address space.
pub const MEMORY_SIZE: usize = 0x1_0000;

pub trait Bus {
    fn read_u8(&mut self, addr: u16) -> Result<u8>;
    fn read_u16(&mut self, addr: u16) -> Result<u16>;
    fn write_u8(&mut self, addr: u16, val: u8) -> Result<()>;
    fn write_u16(&mut self, addr: u16, val: u16) -> Result<()>;
}

/// Zero-initialised flat memory. Words are little-endian; the high byte of
/// a word at 0xFFFF wraps to address 0.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearMemory {
    pub mem: Vec<u8>,
}

impl std::fmt::Debug for LinearMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearMemory")
            .field("size", &self.mem.len())
            .finish()
    }
}

impl Default for LinearMemory {
    fn default() -> Self {
        Self::new(MEMORY_SIZE)
    }
}

impl LinearMemory {
    pub fn new(size: usize) -> Self {
        Self {
            mem: vec![0; size.min(MEMORY_SIZE)],
        }
    }

    pub fn len(&self) -> usize {
        self.mem.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mem.is_empty()
    }

    /// Copies `bytes` in starting at `addr`.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) -> Result<()> {
        let start = usize::from(addr);
        let end = start + bytes.len();
        ensure!(
            end <= self.mem.len(),
            "{} bytes at {addr:#06x} do not fit in {} bytes of memory",
            bytes.len(),
            self.mem.len()
        );
        self.mem[start..end].copy_from_slice(bytes);
        Ok(())
    }

    fn offset(&self, addr: u16) -> Result<usize> {
        let off = usize::from(addr);
        ensure!(
            off < self.mem.len(),
            "address {addr:#06x} outside {} bytes of memory",
            self.mem.len()
        );
        Ok(off)
    }
}

impl Bus for LinearMemory {
    fn read_u8(&mut self, addr: u16) -> Result<u8> {
        let off = self.offset(addr)?;
        Ok(self.mem[off])
    }
    fn read_u16(&mut self, addr: u16) -> Result<u16> {
        let lo = self.read_u8(addr)?;
        let hi = self.read_u8(addr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }
    fn write_u8(&mut self, addr: u16, val: u8) -> Result<()> {
        let off = self.offset(addr)?;
        self.mem[off] = val;
        Ok(())
    }
    fn write_u16(&mut self, addr: u16, val: u16) -> Result<()> {
        // check both bytes before touching either
        self.offset(addr)?;
        self.offset(addr.wrapping_add(1))?;
        let [lo, hi] = val.to_le_bytes();
        self.write_u8(addr, lo)?;
        self.write_u8(addr.wrapping_add(1), hi)
    }
}
