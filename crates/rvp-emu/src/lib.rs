//! User-mode RISC-V emulator core.
//!
//! Interprets RV32/RV64 IMA(FD)(C) machine code against a flat guest
//! address space that is identity-mapped onto host memory, and proxies a
//! small syscall surface to the host. The CLI crate picks one of the
//! monomorphized entry points at startup; everything after that is static
//! dispatch.

mod exec;
mod loader;
mod memory;
mod processor;
mod proxy;
mod stepper;

pub use exec::exec;
pub use loader::{load_elf, map_stack, STACK_SIZE, STACK_TOP};
pub use memory::page_size;
pub use processor::Processor;
pub use proxy::{proxy_syscall, syscall_nr, AbiStat};
pub use stepper::{Emulator, Step, INST_CACHE_SIZE};

use thiserror::Error;

/// Setup errors: anything that stops the emulator before guest code runs.
#[derive(Error, Debug)]
pub enum EmuError {
    #[error("ELF error: {0}")]
    Elf(#[from] rvp_elf::ElfError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("mmap failed: {0}")]
    Mmap(#[from] nix::Error),
}

/// Faults that halt a running guest.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("illegal instruction: pc=0x{pc:x} inst=0x{raw:08x}")]
    IllegalInstruction { pc: u64, raw: u64 },
    #[error("unknown syscall: {nr} (pc=0x{pc:x})")]
    UnknownSyscall { nr: u64, pc: u64 },
}

pub type Result<T> = std::result::Result<T, EmuError>;
