//! ELF header structures.

use rvp_isa::Xlen;

/// Parsed ELF file header fields the loader cares about.
#[derive(Clone, Debug)]
pub struct ElfHeader<X: Xlen> {
    pub class: u8,
    pub machine: u16,
    pub entry: X::Reg,
    pub flags: u32,
    pub phoff: u64,
    pub phentsize: u16,
    pub phnum: u16,
}

/// Program header entry.
#[derive(Clone, Debug)]
pub struct ProgramHeader<X: Xlen> {
    pub p_type: u32,
    pub flags: u32,
    pub offset: X::Reg,
    pub vaddr: X::Reg,
    pub filesz: X::Reg,
    pub memsz: X::Reg,
}

impl<X: Xlen> ProgramHeader<X> {
    /// Whether this segment must be mapped into the process image.
    pub fn is_load(&self) -> bool {
        self.p_type == crate::PT_LOAD
    }
}
