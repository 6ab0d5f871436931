use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AsmError;

/// Register names indexed by their 3-bit encoding.
pub const REGISTER_NAMES: [&str; 8] = ["AX", "CX", "DX", "BX", "SP", "BP", "SI", "DI"];

/// A general register, identified by its 3-bit encoding (AX=0 .. DI=7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RegisterId(u8);

impl RegisterId {
    pub const AX: RegisterId = RegisterId(0);
    pub const CX: RegisterId = RegisterId(1);
    pub const DX: RegisterId = RegisterId(2);
    pub const BX: RegisterId = RegisterId(3);
    pub const SP: RegisterId = RegisterId(4);
    pub const BP: RegisterId = RegisterId(5);
    pub const SI: RegisterId = RegisterId(6);
    pub const DI: RegisterId = RegisterId(7);

    /// Returns `None` for anything outside 0..=7.
    pub fn new(id: u8) -> Option<Self> {
        (usize::from(id) < REGISTER_NAMES.len()).then_some(Self(id))
    }

    pub fn from_name(name: &str) -> Option<Self> {
        REGISTER_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| Self(i as u8))
    }

    pub fn id(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn name(self) -> &'static str {
        REGISTER_NAMES[self.index()]
    }

    pub fn all() -> impl Iterator<Item = RegisterId> {
        (0..REGISTER_NAMES.len() as u8).map(RegisterId)
    }
}

impl TryFrom<u8> for RegisterId {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id).ok_or_else(|| format!("register id {id} out of range 0..=7"))
    }
}

impl From<RegisterId> for u8 {
    fn from(r: RegisterId) -> u8 {
        r.0
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Opcode {
    Mov,
    Add,
    Hlt,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Mov => "MOV",
            Opcode::Add => "ADD",
            Opcode::Hlt => "HLT",
        }
    }
}

impl FromStr for Opcode {
    type Err = AsmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MOV" => Ok(Opcode::Mov),
            "ADD" => Ok(Opcode::Add),
            "HLT" => Ok(Opcode::Hlt),
            other => Err(AsmError::UnknownOpcode {
                opcode: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// How an encoding lays out its bytes after the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    /// Register folded into the low 3 bits of the opcode, then imm16.
    RegInOpcode,
    /// ModRM byte; `reg` is the destination register.
    RegRm,
    /// ModRM byte; `reg` is the source register, `r/m` the destination.
    RmReg,
    /// Accumulator implied, then imm16.
    AccImm,
    /// ModRM byte whose `reg` field is a group sub-operation, then imm16.
    RmImm,
    /// Opcode byte only.
    Implied,
}

/// Encoding forms understood by both the code generator and the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Form {
    MovRegImm,
    MovRegRm,
    MovRmReg,
    AddRegRm,
    AddRmReg,
    AddAccImm,
    AddRmImm,
    Hlt,
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub form: Form,
    pub opcode: Opcode,
    /// First opcode byte; `RegInOpcode` forms occupy `byte..=byte + 7`.
    pub byte: u8,
    pub mode: AddrMode,
}

/// `reg` field value selecting ADD inside the 0x81 immediate group.
pub const GROUP1_ADD: u8 = 0b000;

/// ModRM mode bits for register-direct addressing.
pub const MOD_REGISTER: u8 = 0b11;
/// ModRM mode bits for memory addressing without displacement.
pub const MOD_MEMORY: u8 = 0b00;
/// `r/m` value which, with `MOD_MEMORY`, selects a direct 16-bit address.
pub const RM_DIRECT: u8 = 0b110;

pub const TABLE: &[InstrDesc] = &[
    InstrDesc {
        form: Form::MovRegImm,
        opcode: Opcode::Mov,
        byte: 0xB8,
        mode: AddrMode::RegInOpcode,
    },
    InstrDesc {
        form: Form::MovRegRm,
        opcode: Opcode::Mov,
        byte: 0x8B,
        mode: AddrMode::RegRm,
    },
    InstrDesc {
        form: Form::MovRmReg,
        opcode: Opcode::Mov,
        byte: 0x89,
        mode: AddrMode::RmReg,
    },
    InstrDesc {
        form: Form::AddRegRm,
        opcode: Opcode::Add,
        byte: 0x03,
        mode: AddrMode::RegRm,
    },
    InstrDesc {
        form: Form::AddRmReg,
        opcode: Opcode::Add,
        byte: 0x01,
        mode: AddrMode::RmReg,
    },
    InstrDesc {
        form: Form::AddAccImm,
        opcode: Opcode::Add,
        byte: 0x05,
        mode: AddrMode::AccImm,
    },
    InstrDesc {
        form: Form::AddRmImm,
        opcode: Opcode::Add,
        byte: 0x81,
        mode: AddrMode::RmImm,
    },
    InstrDesc {
        form: Form::Hlt,
        opcode: Opcode::Hlt,
        byte: 0xF4,
        mode: AddrMode::Implied,
    },
];

impl Form {
    pub fn desc(self) -> &'static InstrDesc {
        // TABLE rows are kept in declaration order of Form
        &TABLE[self as usize]
    }

    pub fn opcode(self) -> Opcode {
        self.desc().opcode
    }

    pub fn byte(self) -> u8 {
        self.desc().byte
    }
}

/// Looks up the encoding form for a leading opcode byte.
pub fn lookup(byte: u8) -> Option<&'static InstrDesc> {
    TABLE.iter().find(|d| match d.mode {
        AddrMode::RegInOpcode => (d.byte..=d.byte + 7).contains(&byte),
        _ => d.byte == byte,
    })
}
