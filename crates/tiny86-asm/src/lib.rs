pub mod image;
pub mod resolve;
pub mod source;

pub use image::{load_raw_bin, Image, Segment};
pub use resolve::{allocate, resolve, Symbol, SymbolTable};
pub use source::{parse, Source, SourceError};

use tiny86_rs::IntermediateInstruction;

/// Where `.DATA` symbols are placed unless told otherwise; keeps data clear
/// of code loaded at address 0.
pub const DEFAULT_DATA_BASE: u16 = 0x1000;

/// Front-end result: parsed source, symbol table and resolved intermediate code.
#[derive(Debug, Clone)]
pub struct Translation {
    pub source: Source,
    pub symbols: SymbolTable,
    pub ir: Vec<IntermediateInstruction>,
    pub data_base: u16,
}

impl Translation {
    /// Pairs generated machine code with the initialised data segment.
    pub fn image(&self, code: Vec<u8>) -> Image {
        let mut segments = vec![Segment {
            name: "code".into(),
            base: 0,
            bytes: code,
        }];
        let data = resolve::data_bytes(&self.source);
        if !data.is_empty() {
            segments.push(Segment {
                name: "data".into(),
                base: self.data_base,
                bytes: data,
            });
        }
        Image { segments }
    }
}

pub fn translate(text: &str, data_base: u16) -> Result<Translation, SourceError> {
    let source = parse(text)?;
    let symbols = allocate(&source, data_base)?;
    let ir = resolve(&source, &symbols);
    Ok(Translation {
        source,
        symbols,
        ir,
        data_base,
    })
}

/// Parses a 16-bit CLI number (decimal or hex).
pub fn parse_num_arg(s: &str) -> anyhow::Result<u16> {
    let v = source::parse_num(s).ok_or_else(|| anyhow::anyhow!("bad number: {s}"))?;
    u16::try_from(v).map_err(|_| anyhow::anyhow!("{s} does not fit in 16 bits"))
}
