//! Line-oriented source parser.
//!
//! One statement per line, `;` starts a comment, words are case-insensitive.
//! `.DATA` lines declare `name DB value` / `name DW value`; everything else
//! is an optional `label:` followed by `MNEMONIC [op [, op]]`.

use serde::Serialize;

/// Register names the lexer recognises. Only the 16-bit general registers
/// are accepted by the code generator; the rest reach it as text and are
/// rejected there.
pub const REGISTERS: &[&str] = &[
    "AX", "BX", "CX", "DX", "SP", "BP", "SI", "DI", "AL", "AH", "BL", "BH", "CL", "CH", "DL",
    "DH", "CS", "DS", "ES", "SS", "IP", "FLAGS",
];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("line {line}: {msg}")]
    Syntax { line: usize, msg: String },
    #[error("line {line}: duplicate symbol {name}")]
    DuplicateSymbol { line: usize, name: String },
    #[error("line {line}: duplicate label {name}")]
    DuplicateLabel { line: usize, name: String },
    #[error("data segment does not fit below 0x10000 (symbol {name})")]
    DataOverflow { name: String },
}

fn syntax(line: usize, msg: impl Into<String>) -> SourceError {
    SourceError::Syntax {
        line,
        msg: msg.into(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Code,
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MemRef {
    Number(u32),
    Symbol(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Operand {
    Register(String),
    Number(u32),
    Symbol(String),
    Mem(MemRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataDef {
    pub line: usize,
    pub name: String,
    pub size: u8, // 1 for DB, 2 for DW
    pub value: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instr {
    pub line: usize,
    pub mnemonic: String,
    pub operands: Vec<Operand>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Source {
    pub data: Vec<DataDef>,
    pub code: Vec<Instr>,
    /// Label name and the index of the instruction it precedes.
    pub labels: Vec<(String, usize)>,
}

/// Decimal, `0x` hex or `h`-suffixed hex.
pub fn parse_num(s: &str) -> Option<u32> {
    let t = s.trim();
    if let Some(hex) = t.strip_prefix("0X").or_else(|| t.strip_prefix("0x")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(hex) = t.strip_suffix('H').or_else(|| t.strip_suffix('h')) {
        if !t.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        u32::from_str_radix(hex, 16).ok()
    } else {
        t.parse::<u32>().ok()
    }
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_operand(line: usize, text: &str) -> Result<Operand, SourceError> {
    let t = text.trim();
    if let Some(inner) = t.strip_prefix('[') {
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| syntax(line, format!("missing closing ']' in {t}")))?
            .trim();
        if let Some(n) = parse_num(inner) {
            return Ok(Operand::Mem(MemRef::Number(n)));
        }
        if is_ident(inner) && !REGISTERS.contains(&inner) {
            return Ok(Operand::Mem(MemRef::Symbol(inner.to_string())));
        }
        return Err(syntax(line, format!("invalid memory operand {t}")));
    }
    if REGISTERS.contains(&t) {
        return Ok(Operand::Register(t.to_string()));
    }
    if t.starts_with(|c: char| c.is_ascii_digit()) {
        return parse_num(t)
            .map(Operand::Number)
            .ok_or_else(|| syntax(line, format!("bad number {t}")));
    }
    if is_ident(t) {
        return Ok(Operand::Symbol(t.to_string()));
    }
    Err(syntax(line, format!("invalid operand {t}")))
}

fn parse_data(line: usize, s: &str) -> Result<DataDef, SourceError> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    let [name, dir, rest @ ..] = parts.as_slice() else {
        return Err(syntax(line, "expected `name DB value`"));
    };
    if !is_ident(name) {
        return Err(syntax(line, format!("bad data name {name}")));
    }
    if REGISTERS.contains(name) {
        return Err(syntax(line, format!("register {name} cannot name data")));
    }
    let size = match *dir {
        "DB" => 1,
        "DW" => 2,
        other => return Err(syntax(line, format!("expected DB or DW after {name}, found {other}"))),
    };
    let value = match rest {
        [v] => parse_num(v).ok_or_else(|| syntax(line, format!("expected NUMBER after {dir} for {name}")))?,
        _ => return Err(syntax(line, format!("expected one NUMBER after {dir} for {name}"))),
    };
    let limit = if size == 1 { 0xFF } else { 0xFFFF };
    if value > limit {
        return Err(syntax(line, format!("{value} does not fit in {dir}")));
    }
    Ok(DataDef {
        line,
        name: name.to_string(),
        size,
        value: value as u16,
    })
}

fn parse_instr(line: usize, s: &str) -> Result<Instr, SourceError> {
    let (mnemonic, rest) = match s.split_once(char::is_whitespace) {
        Some((m, r)) => (m, r.trim()),
        None => (s, ""),
    };
    if !is_ident(mnemonic) {
        return Err(syntax(line, format!("bad mnemonic {mnemonic}")));
    }
    let operands = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(',')
            .map(|op| parse_operand(line, op))
            .collect::<Result<Vec<_>, _>>()?
    };
    if operands.len() > 2 {
        return Err(syntax(line, format!("{mnemonic} takes at most two operands")));
    }
    Ok(Instr {
        line,
        mnemonic: mnemonic.to_string(),
        operands,
    })
}

pub fn parse(text: &str) -> Result<Source, SourceError> {
    let mut src = Source::default();
    let mut section = Section::Code;

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let body = raw.split(';').next().unwrap_or("").trim().to_uppercase();
        if body.is_empty() {
            continue;
        }
        match body.split_whitespace().next() {
            Some(".DATA") => {
                section = Section::Data;
                continue;
            }
            Some(".CODE") => {
                section = Section::Code;
                continue;
            }
            Some(d) if d.starts_with('.') || d == "END" || d == "ASSUME" => continue,
            _ => {}
        }

        let mut stmt = body.as_str();
        if let Some((label, rest)) = stmt.split_once(':') {
            let label = label.trim();
            if is_ident(label) {
                if src.labels.iter().any(|(l, _)| l == label) {
                    return Err(SourceError::DuplicateLabel {
                        line,
                        name: label.to_string(),
                    });
                }
                src.labels.push((label.to_string(), src.code.len()));
                stmt = rest.trim();
                if stmt.is_empty() {
                    continue;
                }
            }
        }

        match section {
            Section::Data => {
                let def = parse_data(line, stmt)?;
                if src.data.iter().any(|d| d.name == def.name) {
                    return Err(SourceError::DuplicateSymbol { line, name: def.name });
                }
                src.data.push(def);
            }
            Section::Code => src.code.push(parse_instr(line, stmt)?),
        }
    }
    tracing::debug!(
        data = src.data.len(),
        code = src.code.len(),
        labels = src.labels.len(),
        "source parsed"
    );
    Ok(src)
}
