use tiny86_rs::{assemble, emulate, AsmError, CpuConfig, Emulator, IntermediateInstruction, RegisterId, Trap, MEMORY_SIZE};

fn ic(op: &str, a: &str, b: &str) -> IntermediateInstruction {
    IntermediateInstruction::new(op, a, b)
}

#[test]
fn mov_add_program_runs_to_halt() {
    let prog = assemble(&[
        ic("MOV", "AX", "5"),
        ic("MOV", "BX", "AX"),
        ic("ADD", "AX", "BX"),
        ic("HLT", "", ""),
    ])
    .unwrap();
    assert_eq!(prog.code, vec![0xB8, 0x05, 0x00, 0x8B, 0xD8, 0x03, 0xC3, 0xF4]);

    let emu = emulate(&prog.code).unwrap();
    let regs = emu.cpu.snapshot();
    assert_eq!(regs.ax, 10);
    assert_eq!(regs.bx, 5);
    assert_eq!(regs.cx, 0);
    assert_eq!(regs.dx, 0);
    assert_eq!(regs.ip, 8);
}

#[test]
fn direct_store_writes_little_endian_word() {
    let prog = assemble(&[ic("MOV", "AX", "7"), ic("MOV", "[4]", "AX"), ic("HLT", "", "")]).unwrap();
    // 89 /r with mod=00 r/m=110, address 0x0004
    assert_eq!(&prog.code[3..7], &[0x89, 0x06, 0x04, 0x00]);

    let emu = emulate(&prog.code).unwrap();
    assert_eq!(emu.memory().mem[4], 7);
    assert_eq!(emu.memory().mem[5], 0);
}

#[test]
fn add_immediate_uses_short_form_for_ax_only() {
    let prog = assemble(&[ic("ADD", "AX", "100"), ic("ADD", "BX", "100"), ic("HLT", "", "")]).unwrap();
    assert_eq!(&prog.code[..3], &[0x05, 0x64, 0x00]);
    assert_eq!(&prog.code[3..7], &[0x81, 0xC3, 0x64, 0x00]);
    assert_eq!(prog.code[4] >> 3 & 0b111, 0, "group sub-op must select ADD");

    let regs = emulate(&prog.code).unwrap().cpu.snapshot();
    assert_eq!(regs.ax, 100);
    assert_eq!(regs.bx, 100);
}

#[test]
fn memory_to_memory_is_rejected_before_encoding() {
    let err = assemble(&[ic("MOV", "[0]", "[2]"), ic("HLT", "", "")]).unwrap_err();
    assert!(matches!(
        err,
        AsmError::IllegalOperandCombination { index: 0, .. }
    ));
}

#[test]
fn unknown_opcode_byte_stops_execution() {
    // MOV AX, 1 ; <0x0F> ; MOV BX, 2 ; HLT
    let code = [0xB8, 0x01, 0x00, 0x0F, 0xBB, 0x02, 0x00, 0xF4];
    let mut emu = Emulator::new(CpuConfig::default());
    emu.load(&code).unwrap();
    let err = emu.run().unwrap_err();
    assert!(matches!(err, Trap::UnknownOpcode { ip: 3, opcode: 0x0F }));
    assert_eq!(emu.cpu.reg(RegisterId::AX), 1);
    assert_eq!(emu.cpu.reg(RegisterId::BX), 0);
    assert!(!emu.cpu.is_halted());
}

#[test]
fn running_off_the_end_is_an_error() {
    let mut emu = Emulator::new(CpuConfig::default());
    emu.load(&[0xB8, 0x01, 0x00]).unwrap();
    assert!(matches!(emu.run(), Err(Trap::EndOfCode { offset: 3 })));
    assert_eq!(emu.cpu.reg(RegisterId::AX), 1);

    // truncated immediate
    let mut emu = Emulator::new(CpuConfig::default());
    emu.load(&[0xB8, 0x01]).unwrap();
    assert!(matches!(emu.run(), Err(Trap::EndOfCode { offset: 0 })));
    assert_eq!(emu.cpu.reg(RegisterId::AX), 0);

    let mut emu = Emulator::new(CpuConfig::default());
    emu.load(&[]).unwrap();
    assert!(matches!(emu.run(), Err(Trap::EndOfCode { offset: 0 })));
}

#[test]
fn add_wraps_at_sixteen_bits() {
    let prog = assemble(&[
        ic("MOV", "CX", "65535"),
        ic("ADD", "CX", "2"),
        ic("MOV", "DX", "70000"),
        ic("HLT", "", ""),
    ])
    .unwrap();
    let regs = emulate(&prog.code).unwrap().cpu.snapshot();
    assert_eq!(regs.cx, 1);
    assert_eq!(regs.dx, (70000 & 0xFFFF) as u16);
}

#[test]
fn memory_operands_read_and_accumulate() {
    let prog = assemble(&[
        ic("MOV", "AX", "300"),
        ic("MOV", "[512]", "AX"),
        ic("ADD", "[512]", "AX"),
        ic("MOV", "SI", "[512]"),
        ic("ADD", "SI", "[512]"),
        ic("HLT", "", ""),
    ])
    .unwrap();
    let emu = emulate(&prog.code).unwrap();
    assert_eq!(emu.cpu.reg(RegisterId::SI), 1200);
    assert_eq!(&emu.memory().mem[512..514], &600u16.to_le_bytes());
}

#[test]
fn a_halted_cpu_ignores_further_steps() {
    let mut emu = Emulator::new(CpuConfig::default());
    emu.load(&[0xF4, 0xB8, 0x09, 0x00]).unwrap();
    let regs = emu.run().unwrap();
    assert_eq!(regs.ip, 1);
    assert_eq!(emu.run().unwrap(), regs);
}

#[test]
fn one_shot_emulation_keeps_the_trap_kind() {
    assert!(matches!(
        emulate(&[0xB8, 0x01, 0x00, 0x0F]),
        Err(Trap::UnknownOpcode { ip: 3, opcode: 0x0F })
    ));
    assert!(matches!(
        emulate(&[0xB8, 0x01, 0x00]),
        Err(Trap::EndOfCode { offset: 3 })
    ));
    assert!(matches!(
        emulate(&vec![0xF4; MEMORY_SIZE + 1]),
        Err(Trap::Bus { addr: 0, .. })
    ));
}
