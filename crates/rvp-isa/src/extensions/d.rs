//! D extension (double-precision floating point) - decode, encode, disasm.

use crate::encode::*;
use crate::{DecodedInstr, InstrArgs, OpId, Xlen, EXT_D};

pub const OP_FLD: OpId = OpId::new(EXT_D, 0);
pub const OP_FSD: OpId = OpId::new(EXT_D, 1);
pub const OP_FMADD_D: OpId = OpId::new(EXT_D, 2);
pub const OP_FMSUB_D: OpId = OpId::new(EXT_D, 3);
pub const OP_FNMSUB_D: OpId = OpId::new(EXT_D, 4);
pub const OP_FNMADD_D: OpId = OpId::new(EXT_D, 5);
pub const OP_FADD_D: OpId = OpId::new(EXT_D, 6);
pub const OP_FSUB_D: OpId = OpId::new(EXT_D, 7);
pub const OP_FMUL_D: OpId = OpId::new(EXT_D, 8);
pub const OP_FDIV_D: OpId = OpId::new(EXT_D, 9);
pub const OP_FSQRT_D: OpId = OpId::new(EXT_D, 10);
pub const OP_FSGNJ_D: OpId = OpId::new(EXT_D, 11);
pub const OP_FSGNJN_D: OpId = OpId::new(EXT_D, 12);
pub const OP_FSGNJX_D: OpId = OpId::new(EXT_D, 13);
pub const OP_FMIN_D: OpId = OpId::new(EXT_D, 14);
pub const OP_FMAX_D: OpId = OpId::new(EXT_D, 15);
pub const OP_FCVT_S_D: OpId = OpId::new(EXT_D, 16);
pub const OP_FCVT_D_S: OpId = OpId::new(EXT_D, 17);
pub const OP_FEQ_D: OpId = OpId::new(EXT_D, 18);
pub const OP_FLT_D: OpId = OpId::new(EXT_D, 19);
pub const OP_FLE_D: OpId = OpId::new(EXT_D, 20);
pub const OP_FCLASS_D: OpId = OpId::new(EXT_D, 21);
pub const OP_FCVT_W_D: OpId = OpId::new(EXT_D, 22);
pub const OP_FCVT_WU_D: OpId = OpId::new(EXT_D, 23);
pub const OP_FCVT_D_W: OpId = OpId::new(EXT_D, 24);
pub const OP_FCVT_D_WU: OpId = OpId::new(EXT_D, 25);

// RV64D
pub const OP_FCVT_L_D: OpId = OpId::new(EXT_D, 26);
pub const OP_FCVT_LU_D: OpId = OpId::new(EXT_D, 27);
pub const OP_FMV_X_D: OpId = OpId::new(EXT_D, 28);
pub const OP_FCVT_D_L: OpId = OpId::new(EXT_D, 29);
pub const OP_FCVT_D_LU: OpId = OpId::new(EXT_D, 30);
pub const OP_FMV_D_X: OpId = OpId::new(EXT_D, 31);

/// Get the mnemonic for a D extension instruction.
pub fn d_mnemonic(opid: OpId) -> &'static str {
    const NAMES: [&str; 32] = [
        "fld", "fsd", "fmadd.d", "fmsub.d", "fnmsub.d", "fnmadd.d", "fadd.d", "fsub.d",
        "fmul.d", "fdiv.d", "fsqrt.d", "fsgnj.d", "fsgnjn.d", "fsgnjx.d", "fmin.d", "fmax.d",
        "fcvt.s.d", "fcvt.d.s", "feq.d", "flt.d", "fle.d", "fclass.d", "fcvt.w.d",
        "fcvt.wu.d", "fcvt.d.w", "fcvt.d.wu", "fcvt.l.d", "fcvt.lu.d", "fmv.x.d", "fcvt.d.l",
        "fcvt.d.lu", "fmv.d.x",
    ];
    NAMES.get(opid.idx as usize).copied().unwrap_or("???")
}

/// Decode a D extension instruction.
pub fn decode32<X: Xlen>(raw: u32) -> Option<DecodedInstr> {
    let funct3 = decode_funct3(raw);
    let funct7 = decode_funct7(raw);
    let rd = decode_rd(raw);
    let rs1 = decode_rs1(raw);
    let rs2 = decode_rs2(raw);
    let rm = decode_rm(raw);

    let (opid, args) = match decode_opcode(raw) {
        0x07 if funct3 == 3 => (
            OP_FLD,
            InstrArgs::I {
                rd,
                rs1,
                imm: decode_i_imm(raw),
            },
        ),
        0x27 if funct3 == 3 => (
            OP_FSD,
            InstrArgs::S {
                rs1,
                rs2,
                imm: decode_s_imm(raw),
            },
        ),
        op @ (0x43 | 0x47 | 0x4B | 0x4F) if (raw >> 25) & 0x3 == 1 => {
            let opid = match op {
                0x43 => OP_FMADD_D,
                0x47 => OP_FMSUB_D,
                0x4B => OP_FNMSUB_D,
                _ => OP_FNMADD_D,
            };
            (
                opid,
                InstrArgs::R4 {
                    rd,
                    rs1,
                    rs2,
                    rs3: decode_rs3(raw),
                    rm,
                },
            )
        }
        0x53 => {
            let fp_r = InstrArgs::FpR { rd, rs1, rs2, rm };
            let r = InstrArgs::R { rd, rs1, rs2 };
            match funct7 {
                0x01 => (OP_FADD_D, fp_r),
                0x05 => (OP_FSUB_D, fp_r),
                0x09 => (OP_FMUL_D, fp_r),
                0x0D => (OP_FDIV_D, fp_r),
                0x2D if rs2 == 0 => (OP_FSQRT_D, fp_r),
                0x11 => match funct3 {
                    0 => (OP_FSGNJ_D, r),
                    1 => (OP_FSGNJN_D, r),
                    2 => (OP_FSGNJX_D, r),
                    _ => return None,
                },
                0x15 => match funct3 {
                    0 => (OP_FMIN_D, r),
                    1 => (OP_FMAX_D, r),
                    _ => return None,
                },
                0x20 if rs2 == 1 => (OP_FCVT_S_D, fp_r),
                0x21 if rs2 == 0 => (OP_FCVT_D_S, fp_r),
                0x51 => match funct3 {
                    0 => (OP_FLE_D, r),
                    1 => (OP_FLT_D, r),
                    2 => (OP_FEQ_D, r),
                    _ => return None,
                },
                0x61 => match rs2 {
                    0 => (OP_FCVT_W_D, fp_r),
                    1 => (OP_FCVT_WU_D, fp_r),
                    2 if X::VALUE == 64 => (OP_FCVT_L_D, fp_r),
                    3 if X::VALUE == 64 => (OP_FCVT_LU_D, fp_r),
                    _ => return None,
                },
                0x69 => match rs2 {
                    0 => (OP_FCVT_D_W, fp_r),
                    1 => (OP_FCVT_D_WU, fp_r),
                    2 if X::VALUE == 64 => (OP_FCVT_D_L, fp_r),
                    3 if X::VALUE == 64 => (OP_FCVT_D_LU, fp_r),
                    _ => return None,
                },
                0x71 if rs2 == 0 => match funct3 {
                    0 if X::VALUE == 64 => (OP_FMV_X_D, r),
                    1 => (OP_FCLASS_D, r),
                    _ => return None,
                },
                0x79 if rs2 == 0 && funct3 == 0 && X::VALUE == 64 => (OP_FMV_D_X, r),
                _ => return None,
            }
        }
        _ => return None,
    };

    Some(DecodedInstr::new(opid, raw, 4, args))
}

/// Fixed bits per opcode; operand fields are OR'd in by `encode`.
fn template(opid: OpId) -> Option<u32> {
    let f3 = |n: u32| n << 12;
    let f7 = |n: u32| n << 25;
    Some(match opid {
        OP_FLD => 0x07 | f3(3),
        OP_FSD => 0x27 | f3(3),
        OP_FMADD_D => 0x43 | 1 << 25,
        OP_FMSUB_D => 0x47 | 1 << 25,
        OP_FNMSUB_D => 0x4B | 1 << 25,
        OP_FNMADD_D => 0x4F | 1 << 25,
        OP_FADD_D => 0x53 | f7(0x01),
        OP_FSUB_D => 0x53 | f7(0x05),
        OP_FMUL_D => 0x53 | f7(0x09),
        OP_FDIV_D => 0x53 | f7(0x0D),
        OP_FSQRT_D => 0x53 | f7(0x2D),
        OP_FSGNJ_D => 0x53 | f7(0x11),
        OP_FSGNJN_D => 0x53 | f7(0x11) | f3(1),
        OP_FSGNJX_D => 0x53 | f7(0x11) | f3(2),
        OP_FMIN_D => 0x53 | f7(0x15),
        OP_FMAX_D => 0x53 | f7(0x15) | f3(1),
        OP_FCVT_S_D => 0x53 | f7(0x20) | encode_rs2(1),
        OP_FCVT_D_S => 0x53 | f7(0x21),
        OP_FLE_D => 0x53 | f7(0x51),
        OP_FLT_D => 0x53 | f7(0x51) | f3(1),
        OP_FEQ_D => 0x53 | f7(0x51) | f3(2),
        OP_FCVT_W_D | OP_FCVT_WU_D | OP_FCVT_L_D | OP_FCVT_LU_D => 0x53 | f7(0x61),
        OP_FCVT_D_W | OP_FCVT_D_WU | OP_FCVT_D_L | OP_FCVT_D_LU => 0x53 | f7(0x69),
        OP_FMV_X_D => 0x53 | f7(0x71),
        OP_FCLASS_D => 0x53 | f7(0x71) | f3(1),
        OP_FMV_D_X => 0x53 | f7(0x79),
        _ => return None,
    })
}

/// Re-encode a decoded D instruction.
pub fn encode(instr: &DecodedInstr) -> Option<u32> {
    let t = template(instr.opid)?;
    Some(match instr.args {
        InstrArgs::I { rd, rs1, imm } => t | encode_rd(rd) | encode_rs1(rs1) | encode_i_imm(imm),
        InstrArgs::S { rs1, rs2, imm } => t | encode_rs1(rs1) | encode_rs2(rs2) | encode_s_imm(imm),
        InstrArgs::R { rd, rs1, rs2 } => t | encode_rd(rd) | encode_rs1(rs1) | encode_rs2(rs2),
        InstrArgs::FpR { rd, rs1, rs2, rm } => {
            t | encode_rd(rd) | encode_rs1(rs1) | encode_rs2(rs2) | encode_rm(rm)
        }
        InstrArgs::R4 {
            rd,
            rs1,
            rs2,
            rs3,
            rm,
        } => t | encode_rd(rd) | encode_rs1(rs1) | encode_rs2(rs2) | encode_rs3(rs3) | encode_rm(rm),
        _ => return None,
    })
}

/// Disassembly string for a D instruction.
pub fn disasm(instr: &DecodedInstr) -> String {
    super::f::format_fp(d_mnemonic(instr.opid), instr)
}
