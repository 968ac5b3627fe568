//! ELF loading glue: map PT_LOAD segments and the stack into the guest
//! address space.

use std::fs::File;
use std::path::Path;

use nix::sys::mman::ProtFlags;
use tracing::debug;

use crate::memory::{map_fixed_anon, map_fixed_file};
use crate::processor::Processor;
use crate::{EmuError, Result};
use rvp_elf::{ElfFile, ProgramHeader, PF_R, PF_W, PF_X};
use rvp_isa::{Xlen, REG_SP};

/// Top of the guest stack (1920 MiB).
pub const STACK_TOP: u64 = 0x7800_0000;

/// Guest stack size (16 MiB).
pub const STACK_SIZE: u64 = 0x0100_0000;

/// Translate ELF segment flags to mmap protections.
fn p_flags_prot(flags: u32) -> ProtFlags {
    let mut prot = ProtFlags::empty();
    if flags & PF_X != 0 {
        prot |= ProtFlags::PROT_EXEC;
    }
    if flags & PF_W != 0 {
        prot |= ProtFlags::PROT_WRITE;
    }
    if flags & PF_R != 0 {
        prot |= ProtFlags::PROT_READ;
    }
    prot
}

fn p_flags_name(flags: u32) -> String {
    format!(
        "{}{}{}",
        if flags & PF_R != 0 { "+R" } else { "" },
        if flags & PF_W != 0 { "+W" } else { "" },
        if flags & PF_X != 0 { "+X" } else { "" },
    )
}

/// Map one PT_LOAD segment at its linked address, backed by the ELF file.
fn map_load_segment<X: Xlen>(
    proc: &mut Processor<X>,
    file: &File,
    phdr: &ProgramHeader<X>,
) -> Result<()> {
    let vaddr = X::to_u64(phdr.vaddr);
    let memsz = X::to_u64(phdr.memsz);
    let offset = X::to_u64(phdr.offset);

    map_fixed_file(vaddr, memsz, p_flags_prot(phdr.flags), file, offset)
        .map_err(EmuError::Mmap)?;

    proc.mapped_segments.push((vaddr as usize, memsz as usize));

    // The brk area begins past the highest loaded segment.
    let seg_end = vaddr + memsz;
    if proc.heap_begin < seg_end {
        proc.heap_begin = seg_end;
        proc.heap_end = seg_end;
    }

    if proc.debug {
        debug!(
            "elf: mmap: 0x{:016x} - 0x{:016x} {}",
            vaddr,
            seg_end,
            p_flags_name(phdr.flags)
        );
    }
    Ok(())
}

/// Map the stack segment and point sp just below its top.
pub fn map_stack<X: Xlen>(proc: &mut Processor<X>, stack_top: u64, stack_size: u64) -> Result<()> {
    map_fixed_anon(stack_top - stack_size, stack_size).map_err(EmuError::Mmap)?;

    proc.mapped_segments
        .push(((stack_top - stack_size) as usize, stack_size as usize));
    proc.set_reg(REG_SP, X::from_u64(stack_top - 0x8));

    if proc.debug {
        debug!(
            "sp : mmap: 0x{:016x} - 0x{:016x} +R+W",
            stack_top - stack_size,
            stack_top
        );
    }
    Ok(())
}

/// Load an ELF executable: map its PT_LOAD segments and a stack, and set
/// the pc to the entry point.
pub fn load_elf<X: Xlen>(proc: &mut Processor<X>, path: &Path) -> Result<()> {
    let data = std::fs::read(path)?;
    let elf = ElfFile::<X>::parse(&data)?;

    let file = File::open(path)?;
    for phdr in elf.load_segments() {
        map_load_segment(proc, &file, phdr)?;
    }

    map_stack(proc, STACK_TOP, STACK_SIZE)?;
    proc.pc = elf.entry_point;
    Ok(())
}
