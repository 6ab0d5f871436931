//! Data allocation and symbol resolution.

use std::collections::BTreeMap;

use serde::Serialize;
use tiny86_rs::IntermediateInstruction;

use crate::source::{MemRef, Operand, Source, SourceError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub address: u16,
    pub size: u8,
}

pub type SymbolTable = BTreeMap<String, Symbol>;

/// Gives every data definition consecutive addresses starting at `base`.
pub fn allocate(src: &Source, base: u16) -> Result<SymbolTable, SourceError> {
    let mut table = SymbolTable::new();
    let mut next = u32::from(base);
    for def in &src.data {
        let end = next + u32::from(def.size);
        if end > 0x1_0000 {
            return Err(SourceError::DataOverflow {
                name: def.name.clone(),
            });
        }
        table.insert(
            def.name.clone(),
            Symbol {
                address: next as u16,
                size: def.size,
            },
        );
        next = end;
    }
    Ok(table)
}

/// Initial bytes of the data segment, little-endian words.
pub fn data_bytes(src: &Source) -> Vec<u8> {
    let mut out = Vec::new();
    for def in &src.data {
        match def.size {
            1 => out.push(def.value as u8),
            _ => out.extend_from_slice(&def.value.to_le_bytes()),
        }
    }
    out
}

fn resolve_operand(op: &Operand, table: &SymbolTable) -> String {
    match op {
        Operand::Register(r) => r.clone(),
        Operand::Number(n) => n.to_string(),
        Operand::Mem(MemRef::Number(n)) => format!("[{n}]"),
        // unknown names go through untouched so the operand typer rejects them
        Operand::Symbol(name) | Operand::Mem(MemRef::Symbol(name)) => match table.get(name) {
            Some(sym) => format!("[{}]", sym.address),
            None if matches!(op, Operand::Mem(_)) => format!("[{name}]"),
            None => name.clone(),
        },
    }
}

/// Produces the resolved intermediate code for the core: every data name is
/// replaced by its bracketed address.
pub fn resolve(src: &Source, table: &SymbolTable) -> Vec<IntermediateInstruction> {
    src.code
        .iter()
        .map(|ins| {
            let mut ops = ins.operands.iter().map(|op| resolve_operand(op, table));
            IntermediateInstruction {
                opcode: ins.mnemonic.clone(),
                op1: ops.next().unwrap_or_default(),
                op2: ops.next().unwrap_or_default(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn symbols_become_bracketed_addresses() {
        let src = parse(".DATA\na DB 1\nb DW 258\nc DB 3\n.CODE\nMOV AX, b\nADD [c], AX\nMOV BX, a\nHLT\n")
            .unwrap();
        let table = allocate(&src, 0x100).unwrap();
        assert_eq!(table["A"].address, 0x100);
        assert_eq!(table["B"].address, 0x101);
        assert_eq!(table["C"].address, 0x103);

        let ir = resolve(&src, &table);
        assert_eq!(
            ir,
            vec![
                IntermediateInstruction::new("MOV", "AX", "[257]"),
                IntermediateInstruction::new("ADD", "[259]", "AX"),
                IntermediateInstruction::new("MOV", "BX", "[256]"),
                IntermediateInstruction::new("HLT", "", ""),
            ]
        );
        assert_eq!(data_bytes(&src), vec![1, 2, 1, 3]);
    }

    #[test]
    fn unknown_names_pass_through() {
        let src = parse("MOV AX, nowhere\nMOV [elsewhere], AX\n").unwrap();
        let ir = resolve(&src, &SymbolTable::new());
        assert_eq!(ir[0].op2, "NOWHERE");
        assert_eq!(ir[1].op1, "[ELSEWHERE]");
    }

    #[test]
    fn data_past_top_of_memory_is_rejected() {
        let src = parse(".DATA\nw DW 1\n").unwrap();
        assert!(matches!(
            allocate(&src, 0xFFFF),
            Err(SourceError::DataOverflow { .. })
        ));
    }
}
