use tiny86_rs::{assemble, Bus, CpuConfig, Emulator, IntermediateInstruction, LinearMemory, Trap, MEMORY_SIZE};

fn ic(op: &str, a: &str, b: &str) -> IntermediateInstruction {
    IntermediateInstruction::new(op, a, b)
}

#[test]
fn words_are_little_endian() {
    let mut mem = LinearMemory::default();
    assert_eq!(mem.len(), MEMORY_SIZE);
    mem.write_u16(10, 0xBEEF).unwrap();
    assert_eq!(mem.read_u8(10).unwrap(), 0xEF);
    assert_eq!(mem.read_u8(11).unwrap(), 0xBE);
    assert_eq!(mem.read_u16(10).unwrap(), 0xBEEF);
}

#[test]
fn word_at_top_of_memory_wraps_to_zero() {
    let mut mem = LinearMemory::default();
    mem.write_u16(0xFFFF, 0x1234).unwrap();
    assert_eq!(mem.mem[0xFFFF], 0x34);
    assert_eq!(mem.mem[0], 0x12);
    assert_eq!(mem.read_u16(0xFFFF).unwrap(), 0x1234);
}

#[test]
fn loading_twice_gives_identical_memory() {
    let code = assemble(&[ic("MOV", "AX", "3"), ic("MOV", "[20]", "AX"), ic("HLT", "", "")])
        .unwrap()
        .code;
    let mut a = Emulator::new(CpuConfig::default());
    let mut b = Emulator::new(CpuConfig::default());
    a.load(&code).unwrap();
    b.load(&code).unwrap();
    assert!(a.memory() == b.memory());
    assert_eq!(&a.memory().mem[..code.len()], code.as_slice());
    assert!(a.memory().mem[code.len()..].iter().all(|&byte| byte == 0));
}

#[test]
fn access_outside_small_memory_traps() {
    let cfg = CpuConfig {
        memory_size: 32,
        ..CpuConfig::default()
    };
    let code = assemble(&[ic("MOV", "AX", "1"), ic("MOV", "[100]", "AX"), ic("HLT", "", "")])
        .unwrap()
        .code;
    let mut emu = Emulator::new(cfg);
    emu.load(&code).unwrap();
    assert!(matches!(emu.run(), Err(Trap::Bus { addr: 100, .. })));

    let mut tiny = Emulator::new(CpuConfig {
        memory_size: 2,
        ..CpuConfig::default()
    });
    assert!(tiny.load(&code).is_err());
}

#[test]
fn code_can_be_loaded_at_another_address() {
    let cfg = CpuConfig {
        load_address: 0x100,
        ..CpuConfig::default()
    };
    let code = assemble(&[ic("MOV", "DX", "9"), ic("HLT", "", "")]).unwrap().code;
    let mut emu = Emulator::new(cfg);
    emu.load(&code).unwrap();
    let regs = emu.run().unwrap();
    assert_eq!(regs.dx, 9);
    assert_eq!(regs.ip, 0x104);
    assert!(emu.memory().mem[..0x100].iter().all(|&byte| byte == 0));
}

#[test]
fn preloaded_data_is_visible_to_the_program() {
    let code = assemble(&[ic("MOV", "BX", "[600]"), ic("ADD", "BX", "[602]"), ic("HLT", "", "")])
        .unwrap()
        .code;
    let mut emu = Emulator::new(CpuConfig::default());
    emu.load(&code).unwrap();
    emu.write_bytes(600, &[0x10, 0x00, 0x05, 0x01]).unwrap();
    let regs = emu.run().unwrap();
    assert_eq!(regs.bx, 0x10 + 0x105);
}
