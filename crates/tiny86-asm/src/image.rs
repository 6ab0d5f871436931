use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use tiny86_rs::{Emulator, MEMORY_SIZE};

#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub name: String,
    pub base: u16,
    pub bytes: Vec<u8>,
}

/// Code plus initialised data, ready to place into a machine.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Image {
    pub segments: Vec<Segment>,
}

impl Image {
    pub fn segment(&self, name: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.name == name)
    }

    pub fn code(&self) -> &[u8] {
        self.segment("code")
            .map(|s| s.bytes.as_slice())
            .unwrap_or_default()
    }

    /// Loads the code segment and preloads every other segment. A segment
    /// that would land on the loaded code is an error and nothing is written.
    pub fn install(&self, emu: &mut Emulator) -> Result<()> {
        let code = self.code();
        let code_start = u32::from(emu.cpu.cfg.load_address);
        let code_end = code_start + code.len() as u32;
        for s in self.segments.iter().filter(|s| s.name != "code") {
            let start = u32::from(s.base);
            let end = start + s.bytes.len() as u32;
            anyhow::ensure!(
                end <= code_start || start >= code_end,
                "{} segment {start:#06x}..{end:#06x} overlaps code {code_start:#06x}..{code_end:#06x}",
                s.name
            );
        }
        emu.load(code)?;
        for s in self.segments.iter().filter(|s| s.name != "code") {
            emu.write_bytes(s.base, &s.bytes)?;
        }
        Ok(())
    }
}

/// Reads a raw machine-code file as a single code segment at address 0.
pub fn load_raw_bin(path: &Path) -> Result<Image> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    anyhow::ensure!(
        bytes.len() <= MEMORY_SIZE,
        "{} is {} bytes, larger than 64 KiB",
        path.display(),
        bytes.len()
    );
    Ok(Image {
        segments: vec![Segment {
            name: "code".into(),
            base: 0,
            bytes,
        }],
    })
}
