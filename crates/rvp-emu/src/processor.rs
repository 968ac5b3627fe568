//! Architectural state of the single emulated hart.
//!
//! Guest addresses are host addresses (identity mapping): every load and
//! store below is a plain host memory access. The loader and `brk` are the
//! only sources of mapped regions; a guest access outside them is undefined
//! behavior by contract, and no bounds check is performed on the hot path.

use rvp_isa::{reg_name, Xlen, NUM_FREGS, NUM_REGS};

/// NaN-box pattern for single-precision values in 64-bit registers.
const NAN_BOX_F32: u64 = 0xFFFF_FFFF_0000_0000;

/// Canonical quiet NaN bit patterns.
const CANONICAL_NAN_F32: u32 = 0x7FC0_0000;

/// Reservation granule for LR/SC, one aligned doubleword.
const RESERVATION_GRANULE: u64 = 8;

/// Processor state for one hart.
pub struct Processor<X: Xlen> {
    /// Integer register file; index 0 reads as zero, writes are dropped.
    pub xreg: [X::Reg; NUM_REGS],
    /// Float register file: 64-bit containers, NaN-boxed for f32 values.
    pub freg: [u64; NUM_FREGS],
    /// Program counter.
    pub pc: X::Reg,
    /// Hart id (always 0; kept for the log format).
    pub hart_id: usize,
    /// Instructions retired.
    pub instret: u64,
    /// Accrued FP exception flags (fcsr[4:0]).
    pub fflags: u8,
    /// Dynamic FP rounding mode (fcsr[7:5]).
    pub frm: u8,
    /// LR/SC reservation address.
    reservation: Option<u64>,
    /// Start of the brk region (end of the highest loaded segment).
    pub heap_begin: u64,
    /// Current program break.
    pub heap_end: u64,
    /// Owned guest regions `(host_addr, len)`, unmapped in order on drop.
    pub(crate) mapped_segments: Vec<(usize, usize)>,
    /// Set by the exit syscall.
    pub has_exited: bool,
    /// Valid when `has_exited`.
    pub exit_code: i32,
    /// Verbose region-mapping logs.
    pub debug: bool,
    /// Dump the integer register file before each instruction.
    pub log_registers: bool,
    /// Dump disassembly before each instruction.
    pub log_instructions: bool,
}

impl<X: Xlen> Processor<X> {
    pub fn new() -> Self {
        Self {
            xreg: [X::from_u64(0); NUM_REGS],
            freg: [0; NUM_FREGS],
            pc: X::from_u64(0),
            hart_id: 0,
            instret: 0,
            fflags: 0,
            frm: 0,
            reservation: None,
            heap_begin: 0,
            heap_end: 0,
            mapped_segments: Vec::new(),
            has_exited: false,
            exit_code: 0,
            debug: false,
            log_registers: false,
            log_instructions: false,
        }
    }

    /// Get a register value.
    #[inline]
    pub fn get_reg(&self, idx: u8) -> X::Reg {
        self.xreg[idx as usize]
    }

    /// Set a register value; writes to x0 are dropped.
    #[inline]
    pub fn set_reg(&mut self, idx: u8, val: X::Reg) {
        if idx != 0 {
            self.xreg[idx as usize] = val;
        }
    }

    /// Advance the pc past a straight-line instruction.
    #[inline]
    pub fn advance(&mut self, size: u8) {
        self.pc = X::from_u64(X::to_u64(self.pc).wrapping_add(size as u64));
    }

    // Float register file. 64-bit reads and writes are raw; 32-bit values
    // live NaN-boxed in the upper-ones pattern, and a read that finds the
    // box invalid delivers the canonical NaN.

    #[inline]
    pub fn freg_raw(&self, idx: u8) -> u64 {
        self.freg[idx as usize]
    }

    #[inline]
    pub fn set_freg_raw(&mut self, idx: u8, bits: u64) {
        self.freg[idx as usize] = bits;
    }

    #[inline]
    pub fn read_f32(&self, idx: u8) -> f32 {
        f32::from_bits(self.read_f32_bits(idx))
    }

    #[inline]
    pub fn read_f32_bits(&self, idx: u8) -> u32 {
        let bits = self.freg[idx as usize];
        if bits & NAN_BOX_F32 == NAN_BOX_F32 {
            bits as u32
        } else {
            CANONICAL_NAN_F32
        }
    }

    #[inline]
    pub fn write_f32(&mut self, idx: u8, val: f32) {
        self.write_f32_bits(idx, val.to_bits());
    }

    #[inline]
    pub fn write_f32_bits(&mut self, idx: u8, bits: u32) {
        self.freg[idx as usize] = NAN_BOX_F32 | bits as u64;
    }

    #[inline]
    pub fn read_f64(&self, idx: u8) -> f64 {
        f64::from_bits(self.freg[idx as usize])
    }

    #[inline]
    pub fn write_f64(&mut self, idx: u8, val: f64) {
        self.freg[idx as usize] = val.to_bits();
    }

    /// fcsr view: fflags in [4:0], frm in [7:5].
    pub fn fcsr(&self) -> u32 {
        (self.fflags as u32 & 0x1F) | ((self.frm as u32 & 0x7) << 5)
    }

    pub fn set_fcsr(&mut self, val: u32) {
        self.fflags = (val & 0x1F) as u8;
        self.frm = ((val >> 5) & 0x7) as u8;
    }

    // LR/SC reservation. A store into the reservation granule, and any SC
    // attempt, clears it.

    #[inline]
    pub fn set_reservation(&mut self, addr: u64) {
        self.reservation = Some(addr);
    }

    #[inline]
    pub fn take_reservation(&mut self) -> Option<u64> {
        self.reservation.take()
    }

    #[inline]
    fn note_store(&mut self, addr: u64, len: u64) {
        if let Some(resv) = self.reservation {
            let granule = resv & !(RESERVATION_GRANULE - 1);
            if addr < granule + RESERVATION_GRANULE && addr + len > granule {
                self.reservation = None;
            }
        }
    }

    // Guest memory access. The guest address is the host address; the
    // loader invariant (all guest accesses fall inside an owned region) is
    // what makes these dereferences sound.

    #[inline]
    pub fn read_u8(&self, addr: u64) -> u8 {
        unsafe { (addr as usize as *const u8).read() }
    }

    #[inline]
    pub fn read_u16(&self, addr: u64) -> u16 {
        u16::from_le(unsafe { (addr as usize as *const u16).read_unaligned() })
    }

    #[inline]
    pub fn read_u32(&self, addr: u64) -> u32 {
        u32::from_le(unsafe { (addr as usize as *const u32).read_unaligned() })
    }

    #[inline]
    pub fn read_u64(&self, addr: u64) -> u64 {
        u64::from_le(unsafe { (addr as usize as *const u64).read_unaligned() })
    }

    #[inline]
    pub fn write_u8(&mut self, addr: u64, val: u8) {
        self.note_store(addr, 1);
        unsafe { (addr as usize as *mut u8).write(val) }
    }

    #[inline]
    pub fn write_u16(&mut self, addr: u64, val: u16) {
        self.note_store(addr, 2);
        unsafe { (addr as usize as *mut u16).write_unaligned(val.to_le()) }
    }

    #[inline]
    pub fn write_u32(&mut self, addr: u64, val: u32) {
        self.note_store(addr, 4);
        unsafe { (addr as usize as *mut u32).write_unaligned(val.to_le()) }
    }

    #[inline]
    pub fn write_u64(&mut self, addr: u64, val: u64) {
        self.note_store(addr, 8);
        unsafe { (addr as usize as *mut u64).write_unaligned(val.to_le()) }
    }

    /// Dump the integer register file, four columns per row.
    pub fn print_int_registers(&self) {
        let width = X::VALUE as usize / 4;
        for (i, val) in self.xreg.iter().enumerate() {
            let sep = if (i + 1) % 4 == 0 { "\n" } else { " " };
            print!(
                "{:<4}: 0x{:0width$x}{}",
                reg_name(i as u8),
                X::to_u64(*val),
                sep
            );
        }
    }
}

impl<X: Xlen> Default for Processor<X> {
    fn default() -> Self {
        Self::new()
    }
}

impl<X: Xlen> Drop for Processor<X> {
    fn drop(&mut self) {
        // Release owned regions in insertion order.
        for (addr, len) in self.mapped_segments.drain(..) {
            if let Some(ptr) = std::ptr::NonNull::new(addr as *mut std::ffi::c_void) {
                unsafe {
                    let _ = nix::sys::mman::munmap(ptr, len);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvp_isa::{Rv32, Rv64};

    #[test]
    fn test_x0_write_ignored() {
        let mut p = Processor::<Rv64>::new();
        p.set_reg(0, 42);
        assert_eq!(p.get_reg(0), 0);
        p.set_reg(1, 42);
        assert_eq!(p.get_reg(1), 42);
    }

    #[test]
    fn test_advance_wraps_rv32() {
        let mut p = Processor::<Rv32>::new();
        p.pc = u32::MAX - 1;
        p.advance(4);
        assert_eq!(p.pc, 2);
    }

    #[test]
    fn test_nan_boxing() {
        let mut p = Processor::<Rv64>::new();
        p.write_f32(0, 1.5);
        assert_eq!(p.freg_raw(0) >> 32, 0xFFFF_FFFF);
        assert_eq!(p.read_f32(0), 1.5);

        // An improperly boxed register reads as the canonical NaN.
        p.set_freg_raw(1, 0x0000_0001_3FC0_0000);
        assert!(p.read_f32(1).is_nan());
        assert_eq!(p.read_f32_bits(1), 0x7FC0_0000);

        // 64-bit reads are raw.
        p.write_f64(2, 2.5);
        assert_eq!(p.read_f64(2), 2.5);
    }

    #[test]
    fn test_reservation_cleared_by_overlapping_store() {
        let mut buf = [0u8; 64];
        let base = buf.as_mut_ptr() as u64;
        let mut p = Processor::<Rv64>::new();

        p.set_reservation(base);
        let mut q = Processor::<Rv64>::new();
        q.set_reservation(base);

        // A store into the granule clears it.
        p.write_u32(base + 4, 7);
        assert_eq!(p.take_reservation(), None);

        // A store outside the granule leaves it intact.
        q.write_u32(base + 32, 7);
        assert_eq!(q.take_reservation(), Some(base));
    }

    #[test]
    fn test_memory_little_endian() {
        let mut buf = [0u8; 16];
        let base = buf.as_mut_ptr() as u64;
        let mut p = Processor::<Rv64>::new();
        p.write_u32(base, 0x1234_5678);
        assert_eq!(p.read_u8(base), 0x78);
        assert_eq!(p.read_u16(base + 2), 0x1234);
        assert_eq!(p.read_u32(base), 0x1234_5678);
    }

    #[test]
    fn test_fcsr_pack() {
        let mut p = Processor::<Rv64>::new();
        p.set_fcsr(0b111_11111);
        assert_eq!(p.fflags, 0x1F);
        assert_eq!(p.frm, 0x7);
        assert_eq!(p.fcsr(), 0xFF);
    }
}
