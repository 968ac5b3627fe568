use thiserror::Error;

/// Emulator CLI errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Emu(#[from] rvp_emu::EmuError),
    #[error("ELF error: {0}")]
    Elf(#[from] rvp_elf::ElfError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Isa(#[from] rvp_isa::UnknownIsa),
    #[error("{0}")]
    Fault(#[from] rvp_emu::Fault),
}

pub type Result<T> = std::result::Result<T, Error>;
