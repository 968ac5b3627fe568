//! F and D extension semantics.
//!
//! Arithmetic is host IEEE-754 in the host's default round-to-nearest-even;
//! the instruction rm field is honored in software where the direction is
//! architecturally visible to integer code (float-to-int conversions).
//! Single-precision values are NaN-boxed in the 64-bit register file and
//! every f32 read goes through the box check. Arithmetic NaN results are
//! canonicalized; sign-injection and moves preserve raw bits.

use super::ea;
use crate::processor::Processor;
use rvp_isa::extensions::d::*;
use rvp_isa::extensions::f::*;
use rvp_isa::{DecodedInstr, InstrArgs, Xlen};

const CANONICAL_NAN_F32: u32 = 0x7FC0_0000;
const CANONICAL_NAN_F64: u64 = 0x7FF8_0000_0000_0000;

/// Rounding mode resolved from the instruction's rm field.
#[derive(Clone, Copy)]
enum Rounding {
    /// Round to nearest, ties to even
    Rne,
    /// Round towards zero
    Rtz,
    /// Round down
    Rdn,
    /// Round up
    Rup,
    /// Round to nearest, ties away from zero
    Rmm,
}

/// Resolve the rm field; 0b111 selects the dynamic frm, anything out of
/// range falls back to round-to-nearest-even.
fn effective_rm(rm: u8, frm: u8) -> Rounding {
    let rm = if rm == 7 { frm } else { rm };
    match rm {
        1 => Rounding::Rtz,
        2 => Rounding::Rdn,
        3 => Rounding::Rup,
        4 => Rounding::Rmm,
        _ => Rounding::Rne,
    }
}

fn round_int(v: f64, r: Rounding) -> f64 {
    match r {
        Rounding::Rne => v.round_ties_even(),
        Rounding::Rtz => v.trunc(),
        Rounding::Rdn => v.floor(),
        Rounding::Rup => v.ceil(),
        Rounding::Rmm => v.round(),
    }
}

// Saturating float-to-int conversions, NaN to the maximum per the RISC-V
// convention.

fn cvt_i32(v: f64, r: Rounding) -> i32 {
    if v.is_nan() {
        return i32::MAX;
    }
    let v = round_int(v, r);
    if v > 2_147_483_647.0 {
        i32::MAX
    } else if v < -2_147_483_648.0 {
        i32::MIN
    } else {
        v as i32
    }
}

fn cvt_u32(v: f64, r: Rounding) -> u32 {
    if v.is_nan() {
        return u32::MAX;
    }
    let v = round_int(v, r);
    if v > 4_294_967_295.0 {
        u32::MAX
    } else if v < 0.0 {
        0
    } else {
        v as u32
    }
}

fn cvt_i64(v: f64, r: Rounding) -> i64 {
    if v.is_nan() {
        return i64::MAX;
    }
    let v = round_int(v, r);
    if v >= 9_223_372_036_854_775_808.0 {
        i64::MAX
    } else if v < -9_223_372_036_854_775_808.0 {
        i64::MIN
    } else {
        v as i64
    }
}

fn cvt_u64(v: f64, r: Rounding) -> u64 {
    if v.is_nan() {
        return u64::MAX;
    }
    let v = round_int(v, r);
    if v >= 18_446_744_073_709_551_616.0 {
        u64::MAX
    } else if v < 0.0 {
        0
    } else {
        v as u64
    }
}

/// Canonicalize an arithmetic NaN result.
fn canon_s(v: f32) -> f32 {
    if v.is_nan() {
        f32::from_bits(CANONICAL_NAN_F32)
    } else {
        v
    }
}

fn canon_d(v: f64) -> f64 {
    if v.is_nan() {
        f64::from_bits(CANONICAL_NAN_F64)
    } else {
        v
    }
}

// minimumNumber/maximumNumber: one NaN selects the other operand, both NaN
// give the canonical NaN, and -0.0 orders below +0.0.

fn fmin_s(a: f32, b: f32) -> f32 {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => f32::from_bits(CANONICAL_NAN_F32),
        (true, false) => b,
        (false, true) => a,
        _ if a == 0.0 && b == 0.0 => {
            if a.is_sign_negative() || b.is_sign_negative() {
                -0.0
            } else {
                0.0
            }
        }
        _ => a.min(b),
    }
}

fn fmax_s(a: f32, b: f32) -> f32 {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => f32::from_bits(CANONICAL_NAN_F32),
        (true, false) => b,
        (false, true) => a,
        _ if a == 0.0 && b == 0.0 => {
            if a.is_sign_positive() || b.is_sign_positive() {
                0.0
            } else {
                -0.0
            }
        }
        _ => a.max(b),
    }
}

fn fmin_d(a: f64, b: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => f64::from_bits(CANONICAL_NAN_F64),
        (true, false) => b,
        (false, true) => a,
        _ if a == 0.0 && b == 0.0 => {
            if a.is_sign_negative() || b.is_sign_negative() {
                -0.0
            } else {
                0.0
            }
        }
        _ => a.min(b),
    }
}

fn fmax_d(a: f64, b: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => f64::from_bits(CANONICAL_NAN_F64),
        (true, false) => b,
        (false, true) => a,
        _ if a == 0.0 && b == 0.0 => {
            if a.is_sign_positive() || b.is_sign_positive() {
                0.0
            } else {
                -0.0
            }
        }
        _ => a.max(b),
    }
}

/// fclass result bit per the unprivileged spec (bit 0 = -inf ... bit 9 =
/// quiet NaN).
fn fclass_f32(bits: u32) -> u32 {
    let v = f32::from_bits(bits);
    let neg = bits >> 31 != 0;
    if v.is_infinite() {
        if neg { 1 << 0 } else { 1 << 7 }
    } else if v.is_nan() {
        if bits & 0x0040_0000 != 0 { 1 << 9 } else { 1 << 8 }
    } else if v == 0.0 {
        if neg { 1 << 3 } else { 1 << 4 }
    } else if v.is_subnormal() {
        if neg { 1 << 2 } else { 1 << 5 }
    } else if neg {
        1 << 1
    } else {
        1 << 6
    }
}

fn fclass_f64(bits: u64) -> u32 {
    let v = f64::from_bits(bits);
    let neg = bits >> 63 != 0;
    if v.is_infinite() {
        if neg { 1 << 0 } else { 1 << 7 }
    } else if v.is_nan() {
        if bits & 0x0008_0000_0000_0000 != 0 { 1 << 9 } else { 1 << 8 }
    } else if v == 0.0 {
        if neg { 1 << 3 } else { 1 << 4 }
    } else if v.is_subnormal() {
        if neg { 1 << 2 } else { 1 << 5 }
    } else if neg {
        1 << 1
    } else {
        1 << 6
    }
}

/// Execute an F extension instruction.
pub fn exec_f<X: Xlen>(p: &mut Processor<X>, d: &DecodedInstr) -> bool {
    match (d.opid, d.args) {
        (OP_FLW, InstrArgs::I { rd, rs1, imm }) => {
            let bits = p.read_u32(ea(p, rs1, imm));
            p.write_f32_bits(rd, bits);
        }
        (OP_FSW, InstrArgs::S { rs1, rs2, imm }) => {
            let a = ea(p, rs1, imm);
            let bits = p.freg_raw(rs2) as u32;
            p.write_u32(a, bits);
        }

        // Fused multiply-add, one rounding step.
        (OP_FMADD_S, InstrArgs::R4 { rd, rs1, rs2, rs3, .. }) => {
            let v = p.read_f32(rs1).mul_add(p.read_f32(rs2), p.read_f32(rs3));
            p.write_f32(rd, canon_s(v));
        }
        (OP_FMSUB_S, InstrArgs::R4 { rd, rs1, rs2, rs3, .. }) => {
            let v = p.read_f32(rs1).mul_add(p.read_f32(rs2), -p.read_f32(rs3));
            p.write_f32(rd, canon_s(v));
        }
        (OP_FNMSUB_S, InstrArgs::R4 { rd, rs1, rs2, rs3, .. }) => {
            let v = (-p.read_f32(rs1)).mul_add(p.read_f32(rs2), p.read_f32(rs3));
            p.write_f32(rd, canon_s(v));
        }
        (OP_FNMADD_S, InstrArgs::R4 { rd, rs1, rs2, rs3, .. }) => {
            let v = (-p.read_f32(rs1)).mul_add(p.read_f32(rs2), -p.read_f32(rs3));
            p.write_f32(rd, canon_s(v));
        }

        (OP_FADD_S, InstrArgs::FpR { rd, rs1, rs2, .. }) => {
            let v = p.read_f32(rs1) + p.read_f32(rs2);
            p.write_f32(rd, canon_s(v));
        }
        (OP_FSUB_S, InstrArgs::FpR { rd, rs1, rs2, .. }) => {
            let v = p.read_f32(rs1) - p.read_f32(rs2);
            p.write_f32(rd, canon_s(v));
        }
        (OP_FMUL_S, InstrArgs::FpR { rd, rs1, rs2, .. }) => {
            let v = p.read_f32(rs1) * p.read_f32(rs2);
            p.write_f32(rd, canon_s(v));
        }
        (OP_FDIV_S, InstrArgs::FpR { rd, rs1, rs2, .. }) => {
            let v = p.read_f32(rs1) / p.read_f32(rs2);
            p.write_f32(rd, canon_s(v));
        }
        (OP_FSQRT_S, InstrArgs::FpR { rd, rs1, .. }) => {
            let v = p.read_f32(rs1).sqrt();
            p.write_f32(rd, canon_s(v));
        }

        (OP_FSGNJ_S, InstrArgs::R { rd, rs1, rs2 }) => {
            let (a, b) = (p.read_f32_bits(rs1), p.read_f32_bits(rs2));
            p.write_f32_bits(rd, (b & 0x8000_0000) | (a & 0x7FFF_FFFF));
        }
        (OP_FSGNJN_S, InstrArgs::R { rd, rs1, rs2 }) => {
            let (a, b) = (p.read_f32_bits(rs1), p.read_f32_bits(rs2));
            p.write_f32_bits(rd, (!b & 0x8000_0000) | (a & 0x7FFF_FFFF));
        }
        (OP_FSGNJX_S, InstrArgs::R { rd, rs1, rs2 }) => {
            let (a, b) = (p.read_f32_bits(rs1), p.read_f32_bits(rs2));
            p.write_f32_bits(rd, ((a ^ b) & 0x8000_0000) | (a & 0x7FFF_FFFF));
        }

        (OP_FMIN_S, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = fmin_s(p.read_f32(rs1), p.read_f32(rs2));
            p.write_f32(rd, v);
        }
        (OP_FMAX_S, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = fmax_s(p.read_f32(rs1), p.read_f32(rs2));
            p.write_f32(rd, v);
        }

        (OP_FEQ_S, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = (p.read_f32(rs1) == p.read_f32(rs2)) as u64;
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_FLT_S, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = (p.read_f32(rs1) < p.read_f32(rs2)) as u64;
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_FLE_S, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = (p.read_f32(rs1) <= p.read_f32(rs2)) as u64;
            p.set_reg(rd, X::from_u64(v));
        }

        (OP_FCVT_W_S, InstrArgs::FpR { rd, rs1, rm, .. }) => {
            let v = cvt_i32(p.read_f32(rs1) as f64, effective_rm(rm, p.frm));
            p.set_reg(rd, X::sign_extend_32(v as u32));
        }
        (OP_FCVT_WU_S, InstrArgs::FpR { rd, rs1, rm, .. }) => {
            let v = cvt_u32(p.read_f32(rs1) as f64, effective_rm(rm, p.frm));
            p.set_reg(rd, X::sign_extend_32(v));
        }
        (OP_FCVT_L_S, InstrArgs::FpR { rd, rs1, rm, .. }) => {
            let v = cvt_i64(p.read_f32(rs1) as f64, effective_rm(rm, p.frm));
            p.set_reg(rd, X::from_u64(v as u64));
        }
        (OP_FCVT_LU_S, InstrArgs::FpR { rd, rs1, rm, .. }) => {
            let v = cvt_u64(p.read_f32(rs1) as f64, effective_rm(rm, p.frm));
            p.set_reg(rd, X::from_u64(v));
        }

        (OP_FCVT_S_W, InstrArgs::FpR { rd, rs1, .. }) => {
            let v = X::truncate_to_32(p.get_reg(rs1)) as i32 as f32;
            p.write_f32(rd, v);
        }
        (OP_FCVT_S_WU, InstrArgs::FpR { rd, rs1, .. }) => {
            let v = X::truncate_to_32(p.get_reg(rs1)) as f32;
            p.write_f32(rd, v);
        }
        (OP_FCVT_S_L, InstrArgs::FpR { rd, rs1, .. }) => {
            let v = X::to_i64(p.get_reg(rs1)) as f32;
            p.write_f32(rd, v);
        }
        (OP_FCVT_S_LU, InstrArgs::FpR { rd, rs1, .. }) => {
            let v = X::to_u64(p.get_reg(rs1)) as f32;
            p.write_f32(rd, v);
        }

        (OP_FMV_X_W, InstrArgs::R { rd, rs1, .. }) => {
            p.set_reg(rd, X::sign_extend_32(p.freg_raw(rs1) as u32));
        }
        (OP_FMV_W_X, InstrArgs::R { rd, rs1, .. }) => {
            p.write_f32_bits(rd, X::truncate_to_32(p.get_reg(rs1)));
        }
        (OP_FCLASS_S, InstrArgs::R { rd, rs1, .. }) => {
            let v = fclass_f32(p.read_f32_bits(rs1)) as u64;
            p.set_reg(rd, X::from_u64(v));
        }
        _ => return false,
    }
    p.advance(d.size);
    true
}

/// Execute a D extension instruction.
pub fn exec_d<X: Xlen>(p: &mut Processor<X>, d: &DecodedInstr) -> bool {
    match (d.opid, d.args) {
        (OP_FLD, InstrArgs::I { rd, rs1, imm }) => {
            let bits = p.read_u64(ea(p, rs1, imm));
            p.set_freg_raw(rd, bits);
        }
        (OP_FSD, InstrArgs::S { rs1, rs2, imm }) => {
            let a = ea(p, rs1, imm);
            let bits = p.freg_raw(rs2);
            p.write_u64(a, bits);
        }

        (OP_FMADD_D, InstrArgs::R4 { rd, rs1, rs2, rs3, .. }) => {
            let v = p.read_f64(rs1).mul_add(p.read_f64(rs2), p.read_f64(rs3));
            p.write_f64(rd, canon_d(v));
        }
        (OP_FMSUB_D, InstrArgs::R4 { rd, rs1, rs2, rs3, .. }) => {
            let v = p.read_f64(rs1).mul_add(p.read_f64(rs2), -p.read_f64(rs3));
            p.write_f64(rd, canon_d(v));
        }
        (OP_FNMSUB_D, InstrArgs::R4 { rd, rs1, rs2, rs3, .. }) => {
            let v = (-p.read_f64(rs1)).mul_add(p.read_f64(rs2), p.read_f64(rs3));
            p.write_f64(rd, canon_d(v));
        }
        (OP_FNMADD_D, InstrArgs::R4 { rd, rs1, rs2, rs3, .. }) => {
            let v = (-p.read_f64(rs1)).mul_add(p.read_f64(rs2), -p.read_f64(rs3));
            p.write_f64(rd, canon_d(v));
        }

        (OP_FADD_D, InstrArgs::FpR { rd, rs1, rs2, .. }) => {
            let v = p.read_f64(rs1) + p.read_f64(rs2);
            p.write_f64(rd, canon_d(v));
        }
        (OP_FSUB_D, InstrArgs::FpR { rd, rs1, rs2, .. }) => {
            let v = p.read_f64(rs1) - p.read_f64(rs2);
            p.write_f64(rd, canon_d(v));
        }
        (OP_FMUL_D, InstrArgs::FpR { rd, rs1, rs2, .. }) => {
            let v = p.read_f64(rs1) * p.read_f64(rs2);
            p.write_f64(rd, canon_d(v));
        }
        (OP_FDIV_D, InstrArgs::FpR { rd, rs1, rs2, .. }) => {
            let v = p.read_f64(rs1) / p.read_f64(rs2);
            p.write_f64(rd, canon_d(v));
        }
        (OP_FSQRT_D, InstrArgs::FpR { rd, rs1, .. }) => {
            let v = p.read_f64(rs1).sqrt();
            p.write_f64(rd, canon_d(v));
        }

        (OP_FSGNJ_D, InstrArgs::R { rd, rs1, rs2 }) => {
            let (a, b) = (p.freg_raw(rs1), p.freg_raw(rs2));
            p.set_freg_raw(rd, (b & 1 << 63) | (a & !(1 << 63)));
        }
        (OP_FSGNJN_D, InstrArgs::R { rd, rs1, rs2 }) => {
            let (a, b) = (p.freg_raw(rs1), p.freg_raw(rs2));
            p.set_freg_raw(rd, (!b & 1 << 63) | (a & !(1 << 63)));
        }
        (OP_FSGNJX_D, InstrArgs::R { rd, rs1, rs2 }) => {
            let (a, b) = (p.freg_raw(rs1), p.freg_raw(rs2));
            p.set_freg_raw(rd, ((a ^ b) & 1 << 63) | (a & !(1 << 63)));
        }

        (OP_FMIN_D, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = fmin_d(p.read_f64(rs1), p.read_f64(rs2));
            p.write_f64(rd, v);
        }
        (OP_FMAX_D, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = fmax_d(p.read_f64(rs1), p.read_f64(rs2));
            p.write_f64(rd, v);
        }

        (OP_FCVT_S_D, InstrArgs::FpR { rd, rs1, .. }) => {
            let v = p.read_f64(rs1) as f32;
            p.write_f32(rd, canon_s(v));
        }
        (OP_FCVT_D_S, InstrArgs::FpR { rd, rs1, .. }) => {
            let v = p.read_f32(rs1) as f64;
            p.write_f64(rd, canon_d(v));
        }

        (OP_FEQ_D, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = (p.read_f64(rs1) == p.read_f64(rs2)) as u64;
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_FLT_D, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = (p.read_f64(rs1) < p.read_f64(rs2)) as u64;
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_FLE_D, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = (p.read_f64(rs1) <= p.read_f64(rs2)) as u64;
            p.set_reg(rd, X::from_u64(v));
        }

        (OP_FCLASS_D, InstrArgs::R { rd, rs1, .. }) => {
            let v = fclass_f64(p.freg_raw(rs1)) as u64;
            p.set_reg(rd, X::from_u64(v));
        }

        (OP_FCVT_W_D, InstrArgs::FpR { rd, rs1, rm, .. }) => {
            let v = cvt_i32(p.read_f64(rs1), effective_rm(rm, p.frm));
            p.set_reg(rd, X::sign_extend_32(v as u32));
        }
        (OP_FCVT_WU_D, InstrArgs::FpR { rd, rs1, rm, .. }) => {
            let v = cvt_u32(p.read_f64(rs1), effective_rm(rm, p.frm));
            p.set_reg(rd, X::sign_extend_32(v));
        }
        (OP_FCVT_L_D, InstrArgs::FpR { rd, rs1, rm, .. }) => {
            let v = cvt_i64(p.read_f64(rs1), effective_rm(rm, p.frm));
            p.set_reg(rd, X::from_u64(v as u64));
        }
        (OP_FCVT_LU_D, InstrArgs::FpR { rd, rs1, rm, .. }) => {
            let v = cvt_u64(p.read_f64(rs1), effective_rm(rm, p.frm));
            p.set_reg(rd, X::from_u64(v));
        }

        (OP_FCVT_D_W, InstrArgs::FpR { rd, rs1, .. }) => {
            let v = X::truncate_to_32(p.get_reg(rs1)) as i32 as f64;
            p.write_f64(rd, v);
        }
        (OP_FCVT_D_WU, InstrArgs::FpR { rd, rs1, .. }) => {
            let v = X::truncate_to_32(p.get_reg(rs1)) as f64;
            p.write_f64(rd, v);
        }
        (OP_FCVT_D_L, InstrArgs::FpR { rd, rs1, .. }) => {
            let v = X::to_i64(p.get_reg(rs1)) as f64;
            p.write_f64(rd, v);
        }
        (OP_FCVT_D_LU, InstrArgs::FpR { rd, rs1, .. }) => {
            let v = X::to_u64(p.get_reg(rs1)) as f64;
            p.write_f64(rd, v);
        }

        (OP_FMV_X_D, InstrArgs::R { rd, rs1, .. }) => {
            p.set_reg(rd, X::from_u64(p.freg_raw(rs1)));
        }
        (OP_FMV_D_X, InstrArgs::R { rd, rs1, .. }) => {
            p.set_freg_raw(rd, X::to_u64(p.get_reg(rs1)));
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

    fn run(p: &mut Processor<rvp_isa::Rv64>, raw: u32) {
        let dec = decode::<Rv64>(raw as u64, 4, Isa::IMAFDC);
        assert!(exec_f(p, &dec) || exec_d(p, &dec), "raw {raw:#010x}");
    }

    #[test]
    fn test_fadd_s() {
        let mut p = Processor::<Rv64>::new();
        p.write_f32(2, 1.5);
        p.write_f32(3, 2.25);
        // fadd.s f1, f2, f3
        run(&mut p, 0x0031_00D3);
        assert_eq!(p.read_f32(1), 3.75);
    }

    #[test]
    fn test_unboxed_input_is_nan() {
        let mut p = Processor::<Rv64>::new();
        p.set_freg_raw(2, 1.5f32.to_bits() as u64); // upper bits not boxed
        p.write_f32(3, 1.0);
        run(&mut p, 0x0031_00D3);
        assert!(p.read_f32(1).is_nan());
        assert_eq!(p.read_f32_bits(1), CANONICAL_NAN_F32);
    }

    #[test]
    fn test_fmadd_single_rounding() {
        let x = 1.0 + 2f64.powi(-30);
        let mut p = Processor::<Rv64>::new();
        p.write_f64(1, x);
        p.write_f64(2, x);
        p.write_f64(3, -1.0);
        // fmadd.d f0, f1, f2, f3 = 0x1A20F043
        run(&mut p, 0x1A20_F043);
        // x*x - 1 = 2^-29 + 2^-60 exactly; the fused form keeps the tail
        // that a separate multiply-then-add rounds away.
        assert_eq!(p.read_f64(0), x.mul_add(x, -1.0));
        assert_ne!(p.read_f64(0), x * x - 1.0);
    }

    #[test]
    fn test_fcvt_rounding_modes() {
        let mut p = Processor::<Rv64>::new();
        p.write_f64(2, 2.5);
        // fcvt.w.d x1, f2 with rm=rne (0) = 0xC20100D3
        run(&mut p, 0xC201_00D3);
        assert_eq!(p.get_reg(1), 2); // ties to even
        // rm=rtz (1)
        run(&mut p, 0xC201_10D3);
        assert_eq!(p.get_reg(1), 2);
        p.write_f64(2, -2.5);
        // rm=rup (3) -> ceil
        run(&mut p, 0xC201_30D3);
        assert_eq!(p.get_reg(1), (-2i64) as u64);
        // rm=rdn (2) -> floor
        run(&mut p, 0xC201_20D3);
        assert_eq!(p.get_reg(1), (-3i64) as u64);
    }

    #[test]
    fn test_fcvt_saturates() {
        let mut p = Processor::<Rv64>::new();
        p.write_f64(2, 1e20);
        run(&mut p, 0xC201_00D3); // fcvt.w.d
        assert_eq!(p.get_reg(1), i32::MAX as u64);
        p.write_f64(2, f64::NAN);
        run(&mut p, 0xC201_00D3);
        assert_eq!(p.get_reg(1), i32::MAX as u64);
        p.write_f64(2, -1.0);
        // fcvt.wu.d x1, f2 rtz = 0xC211_10D3
        run(&mut p, 0xC211_10D3);
        assert_eq!(p.get_reg(1), 0);
    }

    #[test]
    fn test_fmin_negative_zero() {
        let mut p = Processor::<Rv64>::new();
        p.write_f32(2, 0.0);
        p.write_f32(3, -0.0);
        // fmin.s f1, f2, f3 = 0x283100D3
        run(&mut p, 0x2831_00D3);
        assert!(p.read_f32(1).is_sign_negative());
        // fmin with one NaN picks the number: fmin.s f1, f2, f3 with f2=NaN
        p.write_f32(2, f32::NAN);
        p.write_f32(3, 4.0);
        run(&mut p, 0x2831_00D3);
        assert_eq!(p.read_f32(1), 4.0);
    }

    #[test]
    fn test_compare_nan_is_false() {
        let mut p = Processor::<Rv64>::new();
        p.write_f32(2, f32::NAN);
        p.write_f32(3, 1.0);
        p.set_reg(1, 7);
        // feq.s x1, f2, f3 = 0xA03120D3
        run(&mut p, 0xA031_20D3);
        assert_eq!(p.get_reg(1), 0);
    }

    #[test]
    fn test_fclass() {
        let mut p = Processor::<Rv64>::new();
        p.write_f32(2, f32::NEG_INFINITY);
        // fclass.s x1, f2 = 0xE0211_0D3
        run(&mut p, 0xE021_10D3);
        assert_eq!(p.get_reg(1), 1);
        p.write_f32(2, -0.0);
        run(&mut p, 0xE021_10D3);
        assert_eq!(p.get_reg(1), 1 << 3);
        p.write_f32(2, 1.0);
        run(&mut p, 0xE021_10D3);
        assert_eq!(p.get_reg(1), 1 << 6);
    }

    #[test]
    fn test_fsgnj_preserves_bits() {
        let mut p = Processor::<Rv64>::new();
        let weird_nan = 0x7FC0_1234u32;
        p.write_f32_bits(2, weird_nan);
        p.write_f32(3, -1.0);
        // fsgnj.s f1, f2, f3 = 0x203100D3
        run(&mut p, 0x2031_00D3);
        assert_eq!(p.read_f32_bits(1), 0xFFC0_1234);
    }

    #[test]
    fn test_fmv_round_trips() {
        let mut p = Processor::<Rv64>::new();
        p.set_reg(1, 0x3FC0_0000);
        // fmv.w.x f1, ra = 0xF00080D3
        run(&mut p, 0xF000_80D3);
        assert_eq!(p.read_f32(1), 1.5);
        // fmv.x.w sp, f1 = 0xE000_8153
        run(&mut p, 0xE000_8153);
        assert_eq!(p.get_reg(2), 0x3FC0_0000);
    }
}
