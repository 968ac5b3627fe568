//! Zicsr/Zifencei semantics.
//!
//! Only the user-visible CSRs the proxy ABI needs are real: the float
//! status registers and the read-only counters. Anything else makes exec
//! return "unhandled", which the stepper turns into a halt. fence.i is a
//! no-op under a single hart with no decode-cache invalidation contract.

use crate::processor::Processor;
use rvp_isa::extensions::zicsr::*;
use rvp_isa::{DecodedInstr, InstrArgs, Xlen};

fn read_csr<X: Xlen>(p: &Processor<X>, csr: u16) -> Option<u64> {
    Some(match csr {
        CSR_FFLAGS => p.fflags as u64,
        CSR_FRM => p.frm as u64,
        CSR_FCSR => p.fcsr() as u64,
        CSR_CYCLE | CSR_TIME | CSR_INSTRET => p.instret,
        _ => return None,
    })
}

fn write_csr<X: Xlen>(p: &mut Processor<X>, csr: u16, val: u64) -> bool {
    match csr {
        CSR_FFLAGS => p.fflags = (val & 0x1F) as u8,
        CSR_FRM => p.frm = (val & 0x7) as u8,
        CSR_FCSR => p.set_fcsr(val as u32),
        _ => return false,
    }
    true
}

pub fn exec<X: Xlen>(p: &mut Processor<X>, d: &DecodedInstr) -> bool {
    match (d.opid, d.args) {
        (OP_FENCE_I, _) => {}

        (OP_CSRRW, InstrArgs::Csr { rd, rs1, csr }) => {
            // rd = x0 skips the read (and read side effects).
            let old = if rd != 0 {
                match read_csr(p, csr) {
                    Some(v) => v,
                    None => return false,
                }
            } else {
                0
            };
            if !write_csr(p, csr, X::to_u64(p.get_reg(rs1))) {
                return false;
            }
            p.set_reg(rd, X::from_u64(old));
        }
        (OP_CSRRS, InstrArgs::Csr { rd, rs1, csr }) => {
            let Some(old) = read_csr(p, csr) else {
                return false;
            };
            // rs1 = x0 is a pure read, legal even on read-only CSRs.
            if rs1 != 0 && !write_csr(p, csr, old | X::to_u64(p.get_reg(rs1))) {
                return false;
            }
            p.set_reg(rd, X::from_u64(old));
        }
        (OP_CSRRC, InstrArgs::Csr { rd, rs1, csr }) => {
            let Some(old) = read_csr(p, csr) else {
                return false;
            };
            if rs1 != 0 && !write_csr(p, csr, old & !X::to_u64(p.get_reg(rs1))) {
                return false;
            }
            p.set_reg(rd, X::from_u64(old));
        }
        (OP_CSRRWI, InstrArgs::CsrI { rd, imm, csr }) => {
            let old = if rd != 0 {
                match read_csr(p, csr) {
                    Some(v) => v,
                    None => return false,
                }
            } else {
                0
            };
            if !write_csr(p, csr, imm as u64) {
                return false;
            }
            p.set_reg(rd, X::from_u64(old));
        }
        (OP_CSRRSI, InstrArgs::CsrI { rd, imm, csr }) => {
            let Some(old) = read_csr(p, csr) else {
                return false;
            };
            if imm != 0 && !write_csr(p, csr, old | imm as u64) {
                return false;
            }
            p.set_reg(rd, X::from_u64(old));
        }
        (OP_CSRRCI, InstrArgs::CsrI { rd, imm, csr }) => {
            let Some(old) = read_csr(p, csr) else {
                return false;
            };
            if imm != 0 && !write_csr(p, csr, old & !(imm as u64)) {
                return false;
            }
            p.set_reg(rd, X::from_u64(old));
        }
        _ => return false,
    }
    p.advance(d.size);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvp_isa::{decode, Isa, Rv64};

    fn run(p: &mut Processor<rvp_isa::Rv64>, raw: u32) -> bool {
        let dec = decode::<Rv64>(raw as u64, 4, Isa::IMAFDC);
        exec(p, &dec)
    }

    #[test]
    fn test_fcsr_write_and_read() {
        let mut p = Processor::<Rv64>::new();
        p.set_reg(1, 0b010_00011);
        // csrrw x0, fcsr, x1 = 0x00309073
        assert!(run(&mut p, 0x0030_9073));
        assert_eq!(p.fflags, 0b00011);
        assert_eq!(p.frm, 0b010);
        // csrrs x2, fcsr, x0 = 0x00302173
        assert!(run(&mut p, 0x0030_2173));
        assert_eq!(p.get_reg(2), 0b010_00011);
    }

    #[test]
    fn test_counter_read_only() {
        let mut p = Processor::<Rv64>::new();
        p.instret = 1234;
        // csrrs x2, instret, x0 = 0xC0202173
        assert!(run(&mut p, 0xC020_2173));
        assert_eq!(p.get_reg(2), 1234);
        // csrrw x0, instret, x1 writes a counter: unhandled
        p.set_reg(1, 1);
        // = 0xC0209073
        assert!(!run(&mut p, 0xC020_9073));
    }

    #[test]
    fn test_unknown_csr_unhandled() {
        let mut p = Processor::<Rv64>::new();
        // csrrs x2, mstatus(0x300), x0 = 0x30002173
        assert!(!run(&mut p, 0x3000_2173));
    }

    #[test]
    fn test_fence_i_nop() {
        let mut p = Processor::<Rv64>::new();
        assert!(run(&mut p, 0x0000_100F));
        assert_eq!(p.pc, 4);
    }
}
