//! ELF file parser.

use rvp_isa::Xlen;

use crate::constants::*;
use crate::header::*;
use crate::{ElfError, Result};

/// Read little-endian u16 from bytes.
#[inline]
fn read_le16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

/// Read little-endian u32 from bytes.
#[inline]
fn read_le32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Read little-endian u64 from bytes.
#[inline]
fn read_le64(data: &[u8], offset: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(b)
}

/// Peek the ELF class byte (EI_CLASS) after validating the magic.
///
/// Used to pick the XLEN before committing to a typed parse.
pub fn get_elf_class(data: &[u8]) -> Result<u8> {
    if data.len() < 16 {
        return Err(ElfError::TooSmall);
    }
    if read_le32(data, 0) != ELF_MAGIC {
        return Err(ElfError::InvalidMagic);
    }
    match data[4] {
        c @ (ELF_CLASS_32 | ELF_CLASS_64) => Ok(c),
        c => Err(ElfError::UnsupportedClass(c)),
    }
}

/// Parsed ELF file.
#[derive(Clone, Debug)]
pub struct ElfFile<X: Xlen> {
    pub entry_point: X::Reg,
    pub e_flags: u32,
    pub program_headers: Vec<ProgramHeader<X>>,
}

impl<X: Xlen> ElfFile<X> {
    /// Parse ELF headers from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not a little-endian RISC-V ELF of
    /// the expected class, or if a loadable segment lies outside the file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = Self::parse_header(data)?;

        let elf_xlen = if header.class == ELF_CLASS_64 { 64 } else { 32 };
        if elf_xlen != X::VALUE {
            return Err(ElfError::XlenMismatch {
                expected: X::VALUE,
                actual: elf_xlen,
            });
        }
        if header.machine != EM_RISCV {
            return Err(ElfError::NotRiscv(header.machine));
        }

        let program_headers = Self::parse_program_headers(data, &header)?;
        Self::validate_load_segments(data, &program_headers)?;

        Ok(Self {
            entry_point: header.entry,
            e_flags: header.flags,
            program_headers,
        })
    }

    /// Loadable program headers, in file order.
    pub fn load_segments(&self) -> impl Iterator<Item = &ProgramHeader<X>> {
        self.program_headers.iter().filter(|p| p.is_load())
    }

    fn parse_header(data: &[u8]) -> Result<ElfHeader<X>> {
        let min_size = if X::VALUE == 64 { 64 } else { 52 };
        if data.len() < min_size {
            return Err(ElfError::TooSmall);
        }

        if read_le32(data, 0) != ELF_MAGIC {
            return Err(ElfError::InvalidMagic);
        }
        if data[5] != ELF_DATA_LSB {
            return Err(ElfError::NotLittleEndian);
        }
        let class = data[4];
        let machine = read_le16(data, 18);

        Ok(if X::VALUE == 64 {
            ElfHeader {
                class,
                machine,
                entry: X::from_u64(read_le64(data, 24)),
                phoff: read_le64(data, 32),
                flags: read_le32(data, 48),
                phentsize: read_le16(data, 54),
                phnum: read_le16(data, 56),
            }
        } else {
            ElfHeader {
                class,
                machine,
                entry: X::from_u64(read_le32(data, 24) as u64),
                phoff: read_le32(data, 28) as u64,
                flags: read_le32(data, 36),
                phentsize: read_le16(data, 42),
                phnum: read_le16(data, 44),
            }
        })
    }

    fn parse_program_headers(
        data: &[u8],
        header: &ElfHeader<X>,
    ) -> Result<Vec<ProgramHeader<X>>> {
        let entsize = header.phentsize as usize;
        let expected = if X::VALUE == 64 { 56 } else { 32 };
        if entsize < expected {
            return Err(ElfError::ProgramOutOfBounds);
        }

        let mut headers = Vec::with_capacity(header.phnum as usize);
        for i in 0..header.phnum as usize {
            let off = header.phoff as usize + i * entsize;
            if off + expected > data.len() {
                return Err(ElfError::ProgramOutOfBounds);
            }

            let phdr = if X::VALUE == 64 {
                ProgramHeader {
                    p_type: read_le32(data, off),
                    flags: read_le32(data, off + 4),
                    offset: X::from_u64(read_le64(data, off + 8)),
                    vaddr: X::from_u64(read_le64(data, off + 16)),
                    filesz: X::from_u64(read_le64(data, off + 32)),
                    memsz: X::from_u64(read_le64(data, off + 40)),
                }
            } else {
                ProgramHeader {
                    p_type: read_le32(data, off),
                    offset: X::from_u64(read_le32(data, off + 4) as u64),
                    vaddr: X::from_u64(read_le32(data, off + 8) as u64),
                    filesz: X::from_u64(read_le32(data, off + 16) as u64),
                    memsz: X::from_u64(read_le32(data, off + 20) as u64),
                    flags: read_le32(data, off + 24),
                }
            };
            headers.push(phdr);
        }
        Ok(headers)
    }

    fn validate_load_segments(data: &[u8], headers: &[ProgramHeader<X>]) -> Result<()> {
        let mut any = false;
        for phdr in headers.iter().filter(|p| p.is_load()) {
            any = true;
            let offset = X::to_u64(phdr.offset);
            let filesz = X::to_u64(phdr.filesz);
            if offset.checked_add(filesz).is_none() || offset + filesz > data.len() as u64 {
                return Err(ElfError::SegmentBeyondFile);
            }
            if X::to_u64(phdr.vaddr).checked_add(X::to_u64(phdr.memsz)).is_none() {
                return Err(ElfError::VirtualAddressOverflow);
            }
        }
        if !any {
            return Err(ElfError::NoLoadableSegments);
        }
        Ok(())
    }
}
