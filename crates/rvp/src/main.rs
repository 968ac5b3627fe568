//! rvp - user-mode RISC-V emulator.
//!
//! Loads a RISC-V ELF executable at its linked addresses, interprets it,
//! and proxies a small syscall surface to the host. The ELF class and the
//! `--isa` profile select one of the monomorphized emulator instantiations
//! once at startup.

mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use error::Result;
use rvp_elf::{get_elf_class, ELF_CLASS_64};
use rvp_emu::Emulator;
use rvp_isa::{Isa, Rv32, Rv64, Xlen};

/// Exit status for usage errors and --help, kept from the original tool.
const EXIT_USAGE: u8 = 9;

#[derive(Parser)]
#[command(name = "rvp")]
#[command(about = "User-mode RISC-V emulator with a host syscall proxy")]
#[command(disable_help_flag = true)]
struct Cli {
    /// Print approximate host text/heap/stack addresses at startup
    #[arg(short = 'm', long)]
    memory_debug: bool,

    /// Verbose region-mapping logs
    #[arg(short = 'd', long)]
    emulator_debug: bool,

    /// ISA extensions (IMA, IMAC, IMAFD, IMAFDC)
    #[arg(short = 'i', long, default_value = "IMAFDC")]
    isa: String,

    /// Dump the integer register file before each instruction
    #[arg(short = 'r', long)]
    log_registers: bool,

    /// Dump disassembly before each instruction
    #[arg(short = 'l', long)]
    log_instructions: bool,

    /// Show help
    #[arg(short = 'h', long, action = clap::ArgAction::Help)]
    help: Option<bool>,

    /// RISC-V ELF executable
    #[arg(value_name = "elf_file")]
    elf_file: PathBuf,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Usage problems and --help both leave with the usage status.
            let _ = err.print();
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let default_level = if cli.emulator_debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("rvp={default_level}").parse().unwrap())
                .add_directive(format!("rvp_emu={default_level}").parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.memory_debug {
        memory_info();
    }

    match run(&cli) {
        Ok(status) => ExitCode::from(status as u8),
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Pick the processor instantiation from the ELF class and ISA profile.
fn run(cli: &Cli) -> Result<i32> {
    let isa: Isa = cli.isa.parse()?;

    let header = std::fs::read(&cli.elf_file)?;
    if get_elf_class(&header)? == ELF_CLASS_64 {
        start::<Rv64>(cli, isa)
    } else {
        start::<Rv32>(cli, isa)
    }
}

/// Load and run the executable; the guest's exit status is ours.
fn start<X: Xlen>(cli: &Cli, isa: Isa) -> Result<i32> {
    let mut emu = Emulator::<X>::new(isa);
    emu.proc.debug = cli.emulator_debug;
    emu.proc.log_registers = cli.log_registers;
    emu.proc.log_instructions = cli.log_instructions;

    emu.load(&cli.elf_file)?;
    Ok(emu.run()?)
}

/// Print the approximate location of the host's text, heap and stack, to
/// show where the guest's identity-mapped ranges must not land.
fn memory_info() {
    let text = memory_info as *const () as usize;
    let heap = Box::new(0u8);
    let stack = 0u8;
    info!("text : ~0x{:016x}", text);
    info!("heap : ~0x{:016x}", std::ptr::from_ref(&*heap) as usize);
    info!("stack: ~0x{:016x}", std::ptr::from_ref(&stack) as usize);
}
