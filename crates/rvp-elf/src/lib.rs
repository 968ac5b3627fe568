//! ELF parser for RISC-V executables.
//!
//! Parses just what the emulator's loader needs: the entry point, the ELF
//! class, and the program header table. Segment contents are not copied;
//! the loader maps them from the file directly.

mod constants;
mod file;
mod header;

pub use constants::*;
pub use file::*;
pub use header::*;

use thiserror::Error;

/// ELF parsing errors.
#[derive(Error, Debug)]
pub enum ElfError {
    #[error("ELF data too small")]
    TooSmall,
    #[error("Invalid ELF magic number")]
    InvalidMagic,
    #[error("Only little-endian ELF supported")]
    NotLittleEndian,
    #[error("Not a RISC-V ELF (machine {0})")]
    NotRiscv(u16),
    #[error("Unsupported ELF class: {0}")]
    UnsupportedClass(u8),
    #[error("ELF XLEN mismatch: expected {expected}, got {actual}")]
    XlenMismatch { expected: u8, actual: u8 },
    #[error("Program header out of bounds")]
    ProgramOutOfBounds,
    #[error("Segment extends beyond file")]
    SegmentBeyondFile,
    #[error("Virtual address overflow")]
    VirtualAddressOverflow,
    #[error("No loadable segments found")]
    NoLoadableSegments,
}

pub type Result<T> = std::result::Result<T, ElfError>;
