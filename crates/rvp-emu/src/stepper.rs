//! Quantum-driven step loop with a direct-mapped decode cache.

use crate::exec::exec;
use crate::loader::load_elf;
use crate::processor::Processor;
use crate::proxy::proxy_syscall;
use crate::{Fault, Result};
use rvp_isa::{decode, disasm_simple, DecodedInstr, Isa, Xlen, OP_ECALL};

/// Decode cache entries; a prime, so nearby instruction words spread over
/// the table.
pub const INST_CACHE_SIZE: usize = 8191;

/// One direct-mapped cache slot.
///
/// Content-addressed by the raw instruction word: identical words at
/// different pcs share the slot, which is sound because decode never looks
/// at the pc. The zeroed initial state holds the illegal record for the
/// word 0, which is exactly what word 0 decodes to.
#[derive(Clone, Copy, Default)]
struct InstCacheEntry {
    inst: u64,
    dec: DecodedInstr,
}

/// Outcome of a stepping quantum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Quantum exhausted, more to run.
    More,
    /// Guest invoked exit with this status.
    Exit(i32),
    /// Fatal fault; the run is over.
    Halt(Fault),
}

/// The stepper: processor plus decode cache plus the enabled extensions.
pub struct Emulator<X: Xlen> {
    pub proc: Processor<X>,
    isa: Isa,
    cache: Vec<InstCacheEntry>,
}

impl<X: Xlen> Emulator<X> {
    pub fn new(isa: Isa) -> Self {
        Self::with_cache_size(isa, INST_CACHE_SIZE)
    }

    /// A custom cache size; decode-cache transparency tests shrink it to 1.
    pub fn with_cache_size(isa: Isa, cache_size: usize) -> Self {
        Self {
            proc: Processor::new(),
            isa,
            cache: vec![InstCacheEntry::default(); cache_size.max(1)],
        }
    }

    /// Load an ELF executable and aim the pc at its entry point.
    pub fn load(&mut self, path: &std::path::Path) -> Result<()> {
        load_elf(&mut self.proc, path)
    }

    /// Fetch at the pc: optimistic 32-bit read, widened only when the
    /// length classification asks for more.
    #[inline]
    fn fetch(&self) -> (u64, usize) {
        let addr = X::to_u64(self.proc.pc);
        let low = self.proc.read_u32(addr) as u64;
        if low & 0b11 != 0b11 {
            (low & 0xFFFF, 2)
        } else if low & 0b11100 != 0b11100 {
            (low, 4)
        } else if low & 0b11_1111 == 0b01_1111 {
            (low | (self.proc.read_u16(addr + 4) as u64) << 32, 6)
        } else if low & 0b111_1111 == 0b011_1111 {
            (low | (self.proc.read_u32(addr + 4) as u64) << 32, 8)
        } else {
            (0, 8)
        }
    }

    /// Run up to `count` instructions.
    pub fn step(&mut self, count: usize) -> Step {
        for _ in 0..count {
            let (inst, len) = self.fetch();

            let key = (inst % self.cache.len() as u64) as usize;
            let dec = if self.cache[key].inst == inst {
                self.cache[key].dec
            } else {
                let dec = decode::<X>(inst, len, self.isa);
                self.cache[key] = InstCacheEntry { inst, dec };
                dec
            };

            if self.proc.log_registers {
                self.proc.print_int_registers();
            }
            if self.proc.log_instructions {
                self.log_instruction(&dec, inst, len);
            }

            if exec(&mut self.proc, &dec) {
                self.proc.instret += 1;
                continue;
            }
            if dec.opid == OP_ECALL {
                if let Err(fault) = proxy_syscall(&mut self.proc) {
                    return Step::Halt(fault);
                }
                if self.proc.has_exited {
                    return Step::Exit(self.proc.exit_code);
                }
                self.proc.advance(len as u8);
                self.proc.instret += 1;
                continue;
            }
            return Step::Halt(Fault::IllegalInstruction {
                pc: X::to_u64(self.proc.pc),
                raw: inst,
            });
        }
        Step::More
    }

    /// Step until the guest exits or faults.
    pub fn run(&mut self) -> std::result::Result<i32, Fault> {
        loop {
            match self.step(1024) {
                Step::More => continue,
                Step::Exit(code) => return Ok(code),
                Step::Halt(fault) => return Err(fault),
            }
        }
    }

    fn log_instruction(&self, dec: &DecodedInstr, inst: u64, len: usize) {
        let pc = X::to_u64(self.proc.pc);
        let pc_width = X::VALUE as usize / 4;
        let inst_str = match len {
            2 | 4 => format!("0x{inst:08x}"),
            6 => format!("0x{inst:012x}"),
            _ => format!("0x{inst:016x}"),
        };
        println!(
            "core {:3}: 0x{:0pc_width$x} ({}) {:<30}",
            self.proc.hart_id,
            pc,
            inst_str,
            disasm_simple(dec)
        );
    }
}
