use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use std::path::Path;

use tiny86_asm::{load_raw_bin, parse_num_arg, translate, Translation};
use tiny86_rs::disasm::listing;
use tiny86_rs::isa::i8086::I8086Decoder;
use tiny86_rs::{assemble, CpuConfig, Emulator, Program};

#[derive(Parser, Debug)]
#[command(author, version, about = "tiny86 assembler, disassembler and runner", long_about=None)]
struct Cli {
    /// Address of the first .DATA symbol (hex or dec)
    #[arg(long, default_value = "0x1000")]
    data_base: String,
    /// Output format: text or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Input path (assembly source, or a raw binary with --raw)
    #[arg(value_name = "FILE")]
    input: String,
    /// Treat the input as raw machine code (disasm and run only)
    #[arg(long)]
    raw: bool,
    /// Subcommand
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved intermediate code
    Ir,
    /// Print the typed instructions after validation
    Typed,
    /// Write the machine code to a file
    Build {
        #[arg(short, long, value_name = "FILE")]
        out: String,
    },
    /// Linear disassembly of the machine code
    Disasm {
        /// Show instruction bytes
        #[arg(long)]
        show_bytes: bool,
    },
    /// Assemble (unless --raw), emulate to HLT and print the registers
    Run,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn front_end(cli: &Cli) -> Result<Translation> {
    anyhow::ensure!(!cli.raw, "this subcommand needs assembly source, not --raw");
    let text = std::fs::read_to_string(&cli.input).with_context(|| format!("reading {}", cli.input))?;
    let data_base = parse_num_arg(&cli.data_base)?;
    Ok(translate(&text, data_base)?)
}

fn back_end(tr: &Translation) -> Result<Program> {
    assemble(&tr.ir).context("translation failed")
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let json = cli.format == OutputFormat::Json;

    match &cli.cmd {
        Command::Ir => {
            let tr = front_end(&cli)?;
            if json {
                print_json(&tr.ir)?;
            } else {
                println!("INTERMEDIATE CODE");
                for ic in &tr.ir {
                    println!("{ic}");
                }
            }
        }
        Command::Typed => {
            let tr = front_end(&cli)?;
            let prog = back_end(&tr)?;
            if json {
                print_json(&prog.instructions)?;
            } else {
                for (i, ins) in prog.instructions.iter().enumerate() {
                    println!("{i:>4}: {ins}");
                }
            }
        }
        Command::Build { out } => {
            let tr = front_end(&cli)?;
            let prog = back_end(&tr)?;
            std::fs::write(out, &prog.code).with_context(|| format!("writing {out}"))?;
            if !tr.source.data.is_empty() {
                tracing::warn!("initialised .DATA values are not part of the raw binary");
            }
            println!("{} bytes written to {out}", prog.code.len());
        }
        Command::Disasm { show_bytes } => {
            let code = if cli.raw {
                load_raw_bin(Path::new(&cli.input))?.code().to_vec()
            } else {
                back_end(&front_end(&cli)?)?.code
            };
            let lines = listing(&I8086Decoder::new(), &code);
            if json {
                print_json(&lines)?;
            } else {
                for l in &lines {
                    println!("{}", l.render(*show_bytes));
                }
            }
        }
        Command::Run => {
            let image = if cli.raw {
                load_raw_bin(Path::new(&cli.input))?
            } else {
                let tr = front_end(&cli)?;
                let prog = back_end(&tr)?;
                tr.image(prog.code)
            };
            let mut emu = Emulator::new(CpuConfig::default());
            image.install(&mut emu)?;
            let regs = emu.run()?;
            if json {
                print_json(&regs)?;
            } else {
                println!("CPU STATE AFTER EXECUTION");
                println!("{regs}");
            }
        }
    }
    Ok(())
}
