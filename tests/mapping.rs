use tiny86_rs::operand::{type_instruction, type_operand, type_program};
use tiny86_rs::{AsmError, IntermediateInstruction, Opcode, RegisterId, TypedOperand};

#[test]
fn operand_shapes_map_to_one_type_each() {
    assert_eq!(type_operand("").unwrap(), TypedOperand::None);
    assert_eq!(type_operand("AX").unwrap(), TypedOperand::Register(RegisterId::AX));
    assert_eq!(type_operand("DI").unwrap(), TypedOperand::Register(RegisterId::DI));
    assert_eq!(type_operand("[4]").unwrap(), TypedOperand::Memory(4));
    assert_eq!(type_operand("[65535]").unwrap(), TypedOperand::Memory(0xFFFF));
    assert_eq!(type_operand("0042").unwrap(), TypedOperand::Immediate(42));
    assert_eq!(type_operand("100000").unwrap(), TypedOperand::Immediate(100_000));
}

#[test]
fn malformed_operands_are_invalid() {
    for bad in [
        "ax", "AL", "FOO", "[]", "[", "]", "[AX]", "[[4]]", "[ 4]", "-5", "4h", "[65536]",
        "99999999999",
    ] {
        assert_eq!(
            type_operand(bad),
            Err(AsmError::InvalidOperand {
                operand: bad.to_string()
            }),
            "{bad:?}"
        );
    }
}

#[test]
fn instructions_keep_operand_order() {
    let t = type_instruction(&IntermediateInstruction::new("ADD", "[8]", "CX")).unwrap();
    assert_eq!(t.opcode, Opcode::Add);
    assert_eq!(t.dst, TypedOperand::Memory(8));
    assert_eq!(t.src, TypedOperand::Register(RegisterId::CX));

    let h = type_instruction(&IntermediateInstruction::new("HLT", "", "")).unwrap();
    assert!(h.dst.is_none() && h.src.is_none());
}

#[test]
fn unknown_mnemonic_fails_while_typing() {
    let ics = [
        IntermediateInstruction::new("MOV", "AX", "1"),
        IntermediateInstruction::new("SUB", "AX", "1"),
    ];
    assert_eq!(
        type_program(&ics),
        Err(AsmError::UnknownOpcode {
            opcode: "SUB".to_string()
        })
    );
}
