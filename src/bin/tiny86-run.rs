use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tiny86_rs::{CpuConfig, Emulator};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Run a raw tiny86 machine-code file until HLT"
)]
struct Opts {
    /// Address the code is loaded at and executed from
    #[arg(short, long, default_value_t = 0u16)]
    load: u16,
    /// Print the final registers as JSON
    #[arg(long)]
    json: bool,
    #[arg(value_name = "BINFILE")]
    input: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let bytes = std::fs::read(&opts.input).with_context(|| format!("reading {}", opts.input))?;

    let cfg = CpuConfig {
        load_address: opts.load,
        ..CpuConfig::default()
    };
    let mut emu = Emulator::new(cfg);
    emu.load(&bytes)?;
    let regs = emu.run()?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&regs)?);
    } else {
        println!("CPU STATE AFTER EXECUTION");
        println!("{regs}");
    }
    Ok(())
}
