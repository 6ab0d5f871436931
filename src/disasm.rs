use serde::Serialize;

use crate::decoder::{Decoded, Decoder};

pub fn fmt_decoded(d: &Decoded) -> String {
    d.instruction().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub offset: usize,
    pub bytes: Vec<u8>,
    pub text: String,
}

impl Line {
    /// `0003: 8b d8        MOV BX, AX`
    pub fn render(&self, show_bytes: bool) -> String {
        if show_bytes {
            let hex: Vec<String> = self.bytes.iter().map(|b| format!("{b:02x}")).collect();
            format!("{:04x}: {:<12} {}", self.offset, hex.join(" "), self.text)
        } else {
            format!("{:04x}: {}", self.offset, self.text)
        }
    }
}

/// Linear sweep over a code stream. Bytes that do not decode are listed as
/// `.byte` and skipped one at a time.
pub fn listing<D: Decoder>(dec: &D, code: &[u8]) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut off = 0;
    while off < code.len() {
        let (width, text) = match dec.decode(&code[off..]) {
            Ok(d) => (usize::from(d.width), fmt_decoded(&d)),
            Err(_) => (1, format!(".byte {:#04x}", code[off])),
        };
        lines.push(Line {
            offset: off,
            bytes: code[off..off + width].to_vec(),
            text,
        });
        off += width;
    }
    lines
}
