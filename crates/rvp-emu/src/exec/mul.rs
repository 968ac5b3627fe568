//! M extension semantics.
//!
//! Division by zero yields all-ones quotient and the dividend as
//! remainder; signed overflow (INT_MIN / -1) yields INT_MIN and 0. The
//! 32-bit sign-extended domain makes i64 arithmetic exact for RV32, so the
//! overflow checks below only ever fire on RV64.

use crate::processor::Processor;
use rvp_isa::extensions::m::*;
use rvp_isa::{DecodedInstr, InstrArgs, Xlen};

pub fn exec<X: Xlen>(p: &mut Processor<X>, d: &DecodedInstr) -> bool {
    let InstrArgs::R { rd, rs1, rs2 } = d.args else {
        return false;
    };
    let a = p.get_reg(rs1);
    let b = p.get_reg(rs2);

    let v = match d.opid {
        OP_MUL => X::to_u64(a).wrapping_mul(X::to_u64(b)),
        OP_MULH => {
            let prod = X::to_i64(a) as i128 * X::to_i64(b) as i128;
            (prod >> X::VALUE) as u64
        }
        OP_MULHSU => {
            let prod = X::to_i64(a) as i128 * X::to_u64(b) as i128;
            (prod >> X::VALUE) as u64
        }
        OP_MULHU => {
            let prod = X::to_u64(a) as u128 * X::to_u64(b) as u128;
            (prod >> X::VALUE) as u64
        }
        OP_DIV => {
            let (a, b) = (X::to_i64(a), X::to_i64(b));
            if b == 0 {
                u64::MAX
            } else if a == i64::MIN && b == -1 {
                a as u64
            } else {
                (a / b) as u64
            }
        }
        OP_DIVU => {
            let (a, b) = (X::to_u64(a), X::to_u64(b));
            if b == 0 {
                u64::MAX
            } else {
                a / b
            }
        }
        OP_REM => {
            let (a, b) = (X::to_i64(a), X::to_i64(b));
            if b == 0 {
                a as u64
            } else if a == i64::MIN && b == -1 {
                0
            } else {
                (a % b) as u64
            }
        }
        OP_REMU => {
            let (a, b) = (X::to_u64(a), X::to_u64(b));
            if b == 0 {
                a
            } else {
                a % b
            }
        }

        // RV64 W variants, in 32 bits
        OP_MULW => {
            let v = X::truncate_to_32(a).wrapping_mul(X::truncate_to_32(b));
            p.set_reg(rd, X::sign_extend_32(v));
            p.advance(d.size);
            return true;
        }
        OP_DIVW => {
            let (a, b) = (X::truncate_to_32(a) as i32, X::truncate_to_32(b) as i32);
            let v = if b == 0 {
                -1
            } else if a == i32::MIN && b == -1 {
                a
            } else {
                a / b
            };
            p.set_reg(rd, X::sign_extend_32(v as u32));
            p.advance(d.size);
            return true;
        }
        OP_DIVUW => {
            let (a, b) = (X::truncate_to_32(a), X::truncate_to_32(b));
            let v = if b == 0 { u32::MAX } else { a / b };
            p.set_reg(rd, X::sign_extend_32(v));
            p.advance(d.size);
            return true;
        }
        OP_REMW => {
            let (a, b) = (X::truncate_to_32(a) as i32, X::truncate_to_32(b) as i32);
            let v = if b == 0 {
                a
            } else if a == i32::MIN && b == -1 {
                0
            } else {
                a % b
            };
            p.set_reg(rd, X::sign_extend_32(v as u32));
            p.advance(d.size);
            return true;
        }
        OP_REMUW => {
            let (a, b) = (X::truncate_to_32(a), X::truncate_to_32(b));
            let v = if b == 0 { a } else { a % b };
            p.set_reg(rd, X::sign_extend_32(v));
            p.advance(d.size);
            return true;
        }
        _ => return false,
    };

    p.set_reg(rd, X::from_u64(v));
    p.advance(d.size);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvp_isa::{decode, Isa, Rv32, Rv64};

    fn run<X: Xlen>(p: &mut Processor<X>, raw: u32) {
        let dec = decode::<X>(raw as u64, 4, Isa::IMAFDC);
        assert!(exec(p, &dec));
    }

    // mul/div/rem x5, x6, x7 raw words
    const MUL: u32 = 0x0273_02B3;
    const MULH: u32 = 0x0273_12B3;
    const MULHU: u32 = 0x0273_32B3;
    const DIV: u32 = 0x0273_42B3;
    const DIVU: u32 = 0x0273_52B3;
    const REM: u32 = 0x0273_62B3;
    const REMU: u32 = 0x0273_72B3;

    #[test]
    fn test_mul_low_bits() {
        let mut p = Processor::<Rv64>::new();
        p.set_reg(6, u64::MAX);
        p.set_reg(7, 3);
        run(&mut p, MUL);
        assert_eq!(p.get_reg(5), u64::MAX.wrapping_mul(3));
    }

    #[test]
    fn test_mulh_variants() {
        let mut p = Processor::<Rv64>::new();
        p.set_reg(6, u64::MAX); // -1
        p.set_reg(7, u64::MAX); // -1
        run(&mut p, MULH);
        assert_eq!(p.get_reg(5), 0); // (-1)*(-1) = 1, high bits 0
        run(&mut p, MULHU);
        assert_eq!(p.get_reg(5), u64::MAX - 1); // 0xFFFE...
    }

    #[test]
    fn test_mulh_rv32() {
        let mut p = Processor::<Rv32>::new();
        p.set_reg(6, 0x8000_0000); // i32::MIN
        p.set_reg(7, 0x8000_0000);
        run(&mut p, MULH);
        // (-2^31)^2 = 2^62; high word = 0x40000000
        assert_eq!(p.get_reg(5), 0x4000_0000);
    }

    #[test]
    fn test_div_by_zero() {
        let mut p = Processor::<Rv64>::new();
        p.set_reg(6, 42);
        p.set_reg(7, 0);
        run(&mut p, DIV);
        assert_eq!(p.get_reg(5), u64::MAX); // -1
        run(&mut p, DIVU);
        assert_eq!(p.get_reg(5), u64::MAX); // 2^64 - 1
        run(&mut p, REM);
        assert_eq!(p.get_reg(5), 42);
        run(&mut p, REMU);
        assert_eq!(p.get_reg(5), 42);
    }

    #[test]
    fn test_div_overflow() {
        let mut p = Processor::<Rv64>::new();
        p.set_reg(6, i64::MIN as u64);
        p.set_reg(7, u64::MAX); // -1
        run(&mut p, DIV);
        assert_eq!(p.get_reg(5), i64::MIN as u64);
        run(&mut p, REM);
        assert_eq!(p.get_reg(5), 0);
    }

    #[test]
    fn test_div_overflow_rv32() {
        let mut p = Processor::<Rv32>::new();
        p.set_reg(6, 0x8000_0000); // i32::MIN
        p.set_reg(7, 0xFFFF_FFFF); // -1
        run(&mut p, DIV);
        assert_eq!(p.get_reg(5), 0x8000_0000);
        run(&mut p, REM);
        assert_eq!(p.get_reg(5), 0);
    }

    #[test]
    fn test_w_variants() {
        let mut p = Processor::<Rv64>::new();
        // divw x5, x6, x7 = 0x027342BB
        p.set_reg(6, 0x8000_0000); // i32::MIN after truncation
        p.set_reg(7, u64::MAX); // -1
        run(&mut p, 0x0273_42BB);
        assert_eq!(p.get_reg(5), 0xFFFF_FFFF_8000_0000);
        // remuw x5, x6, x7 = 0x027372BB, rem by zero keeps dividend
        p.set_reg(7, 0);
        run(&mut p, 0x0273_72BB);
        assert_eq!(p.get_reg(5), 0xFFFF_FFFF_8000_0000);
    }
}
