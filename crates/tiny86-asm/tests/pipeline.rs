use pretty_assertions::assert_eq;

use tiny86_asm::{translate, SourceError, DEFAULT_DATA_BASE};
use tiny86_rs::{assemble, AsmError, CpuConfig, Emulator, IntermediateInstruction};

const SUM: &str = "\
.MODEL SMALL
.DATA
  x DW 300
  y DW 0x2A
  total DW 0
.CODE
main:
  mov ax, x        ; load
  add ax, y
  mov [total], ax
  mov bx, total
  add bx, 1
  hlt
END
";

#[test]
fn source_runs_with_preloaded_data() {
    let t = translate(SUM, DEFAULT_DATA_BASE).unwrap();
    assert_eq!(t.ir[0], IntermediateInstruction::new("MOV", "AX", "[4096]"));
    assert_eq!(t.ir[2], IntermediateInstruction::new("MOV", "[4100]", "AX"));

    let program = assemble(&t.ir).unwrap();
    let image = t.image(program.code.clone());
    assert_eq!(image.segment("data").unwrap().bytes, vec![0x2C, 0x01, 0x2A, 0x00, 0, 0]);

    let mut emu = Emulator::new(CpuConfig::default());
    image.install(&mut emu).unwrap();
    let regs = emu.run().unwrap();
    assert_eq!(regs.ax, 342);
    assert_eq!(regs.bx, 343);
    assert_eq!(&emu.memory().mem[0x1004..0x1006], &[0x56, 0x01]);
    assert_eq!(usize::from(regs.ip), program.code.len());
}

#[test]
fn unknown_names_reach_the_typer() {
    let t = translate("MOV AX, missing\nHLT\n", DEFAULT_DATA_BASE).unwrap();
    assert_eq!(t.ir[0].op2, "MISSING");
    assert_eq!(
        assemble(&t.ir),
        Err(AsmError::InvalidOperand {
            operand: "MISSING".into()
        })
    );
}

#[test]
fn byte_registers_parse_but_do_not_type() {
    let t = translate("mov al, 1\nhlt", DEFAULT_DATA_BASE).unwrap();
    assert!(matches!(assemble(&t.ir), Err(AsmError::InvalidOperand { .. })));
}

#[test]
fn data_past_the_top_of_memory_is_rejected() {
    let err = translate(".DATA\na DW 1\nb DW 2\n.CODE\nHLT\n", 0xFFFE).unwrap_err();
    assert_eq!(err, SourceError::DataOverflow { name: "B".into() });
}

#[test]
fn data_placed_over_code_does_not_clobber_it() {
    let t = translate(".DATA\nv DW 0x0F0F\n.CODE\nMOV AX, 5\nHLT\n", 0).unwrap();
    let program = assemble(&t.ir).unwrap();
    assert_eq!(program.code, vec![0xB8, 0x05, 0x00, 0xF4]);

    let mut emu = Emulator::new(CpuConfig::default());
    let err = t.image(program.code.clone()).install(&mut emu).unwrap_err();
    assert!(err.to_string().contains("overlaps code"), "{err}");
    assert_eq!(&emu.memory().mem[..2], &[0, 0]);

    // the same source is fine once data sits past the code
    let t = translate(".DATA\nv DW 0x0F0F\n.CODE\nMOV AX, 5\nHLT\n", 4).unwrap();
    let mut emu = Emulator::new(CpuConfig::default());
    t.image(assemble(&t.ir).unwrap().code).install(&mut emu).unwrap();
    assert_eq!(emu.run().unwrap().ax, 5);
    assert_eq!(&emu.memory().mem[4..6], &[0x0F, 0x0F]);
}
