//! Per-opcode semantic actions.
//!
//! `exec` returns `true` when the opcode was handled and the pc updated
//! (by the instruction length for straight-line ops, or to the target for
//! control flow). `false` means "unhandled": the stepper then proxies an
//! ecall or halts on anything else. The match is monomorphized per XLEN;
//! there is no per-instruction dynamic dispatch.

mod amo;
mod base;
mod fp;
mod mul;
mod system;

use crate::processor::Processor;
use rvp_isa::{DecodedInstr, Xlen, EXT_A, EXT_D, EXT_F, EXT_I, EXT_M, EXT_ZICSR};

/// Execute one decoded instruction.
pub fn exec<X: Xlen>(p: &mut Processor<X>, d: &DecodedInstr) -> bool {
    match d.opid.ext {
        EXT_I => base::exec(p, d),
        EXT_M => mul::exec(p, d),
        EXT_A => amo::exec(p, d),
        EXT_ZICSR => system::exec(p, d),
        EXT_F => fp::exec_f(p, d),
        EXT_D => fp::exec_d(p, d),
        _ => false,
    }
}

/// Effective address `rs1 + sext(imm)`, wrapped to register width.
#[inline]
pub(crate) fn ea<X: Xlen>(p: &Processor<X>, rs1: u8, imm: i32) -> u64 {
    let base = X::to_u64(p.get_reg(rs1)).wrapping_add(imm as i64 as u64);
    X::to_u64(X::from_u64(base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvp_isa::{decode, Isa, Rv32, Rv64};

    fn exec_raw<X: Xlen>(p: &mut Processor<X>, raw: u32) -> bool {
        let dec = decode::<X>(raw as u64, 4, Isa::IMAFDC);
        exec(p, &dec)
    }

    #[test]
    fn test_ea_wraps_to_32_bits() {
        let mut p = Processor::<Rv32>::new();
        p.set_reg(1, 0xFFFF_FFFF);
        assert_eq!(ea(&p, 1, 2), 1);
        let mut p = Processor::<Rv64>::new();
        p.set_reg(1, 0xFFFF_FFFF);
        assert_eq!(ea(&p, 1, 2), 0x1_0000_0001);
    }

    #[test]
    fn test_unhandled_returns_false() {
        let mut p = Processor::<Rv64>::new();
        assert!(!exec_raw(&mut p, 0)); // illegal
        assert!(!exec_raw(&mut p, 0x0000_0073)); // ecall
    }
}
