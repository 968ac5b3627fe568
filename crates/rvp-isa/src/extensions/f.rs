//! F extension (single-precision floating point) - decode, encode, disasm.

use crate::encode::*;
use crate::{freg_name, reg_name, DecodedInstr, InstrArgs, OpId, Xlen, EXT_F};

pub const OP_FLW: OpId = OpId::new(EXT_F, 0);
pub const OP_FSW: OpId = OpId::new(EXT_F, 1);
pub const OP_FMADD_S: OpId = OpId::new(EXT_F, 2);
pub const OP_FMSUB_S: OpId = OpId::new(EXT_F, 3);
pub const OP_FNMSUB_S: OpId = OpId::new(EXT_F, 4);
pub const OP_FNMADD_S: OpId = OpId::new(EXT_F, 5);
pub const OP_FADD_S: OpId = OpId::new(EXT_F, 6);
pub const OP_FSUB_S: OpId = OpId::new(EXT_F, 7);
pub const OP_FMUL_S: OpId = OpId::new(EXT_F, 8);
pub const OP_FDIV_S: OpId = OpId::new(EXT_F, 9);
pub const OP_FSQRT_S: OpId = OpId::new(EXT_F, 10);
pub const OP_FSGNJ_S: OpId = OpId::new(EXT_F, 11);
pub const OP_FSGNJN_S: OpId = OpId::new(EXT_F, 12);
pub const OP_FSGNJX_S: OpId = OpId::new(EXT_F, 13);
pub const OP_FMIN_S: OpId = OpId::new(EXT_F, 14);
pub const OP_FMAX_S: OpId = OpId::new(EXT_F, 15);
pub const OP_FCVT_W_S: OpId = OpId::new(EXT_F, 16);
pub const OP_FCVT_WU_S: OpId = OpId::new(EXT_F, 17);
pub const OP_FMV_X_W: OpId = OpId::new(EXT_F, 18);
pub const OP_FEQ_S: OpId = OpId::new(EXT_F, 19);
pub const OP_FLT_S: OpId = OpId::new(EXT_F, 20);
pub const OP_FLE_S: OpId = OpId::new(EXT_F, 21);
pub const OP_FCLASS_S: OpId = OpId::new(EXT_F, 22);
pub const OP_FCVT_S_W: OpId = OpId::new(EXT_F, 23);
pub const OP_FCVT_S_WU: OpId = OpId::new(EXT_F, 24);
pub const OP_FMV_W_X: OpId = OpId::new(EXT_F, 25);

// RV64F
pub const OP_FCVT_L_S: OpId = OpId::new(EXT_F, 26);
pub const OP_FCVT_LU_S: OpId = OpId::new(EXT_F, 27);
pub const OP_FCVT_S_L: OpId = OpId::new(EXT_F, 28);
pub const OP_FCVT_S_LU: OpId = OpId::new(EXT_F, 29);

/// Get the mnemonic for an F extension instruction.
pub fn f_mnemonic(opid: OpId) -> &'static str {
    const NAMES: [&str; 30] = [
        "flw", "fsw", "fmadd.s", "fmsub.s", "fnmsub.s", "fnmadd.s", "fadd.s", "fsub.s",
        "fmul.s", "fdiv.s", "fsqrt.s", "fsgnj.s", "fsgnjn.s", "fsgnjx.s", "fmin.s", "fmax.s",
        "fcvt.w.s", "fcvt.wu.s", "fmv.x.w", "feq.s", "flt.s", "fle.s", "fclass.s",
        "fcvt.s.w", "fcvt.s.wu", "fmv.w.x", "fcvt.l.s", "fcvt.lu.s", "fcvt.s.l", "fcvt.s.lu",
    ];
    NAMES.get(opid.idx as usize).copied().unwrap_or("???")
}

/// Decode an F extension instruction.
pub fn decode32<X: Xlen>(raw: u32) -> Option<DecodedInstr> {
    let funct3 = decode_funct3(raw);
    let funct7 = decode_funct7(raw);
    let rd = decode_rd(raw);
    let rs1 = decode_rs1(raw);
    let rs2 = decode_rs2(raw);
    let rm = decode_rm(raw);

    let (opid, args) = match decode_opcode(raw) {
        0x07 if funct3 == 2 => (
            OP_FLW,
            InstrArgs::I {
                rd,
                rs1,
                imm: decode_i_imm(raw),
            },
        ),
        0x27 if funct3 == 2 => (
            OP_FSW,
            InstrArgs::S {
                rs1,
                rs2,
                imm: decode_s_imm(raw),
            },
        ),
        op @ (0x43 | 0x47 | 0x4B | 0x4F) if (raw >> 25) & 0x3 == 0 => {
            let opid = match op {
                0x43 => OP_FMADD_S,
                0x47 => OP_FMSUB_S,
                0x4B => OP_FNMSUB_S,
                _ => OP_FNMADD_S,
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
            // rs2 doubles as a function selector for fsqrt/fcvt forms; it
            // is carried in the args either way so re-encoding is uniform.
            let fp_r = InstrArgs::FpR { rd, rs1, rs2, rm };
            let r = InstrArgs::R { rd, rs1, rs2 };
            match funct7 {
                0x00 => (OP_FADD_S, fp_r),
                0x04 => (OP_FSUB_S, fp_r),
                0x08 => (OP_FMUL_S, fp_r),
                0x0C => (OP_FDIV_S, fp_r),
                0x2C if rs2 == 0 => (OP_FSQRT_S, fp_r),
                0x10 => match funct3 {
                    0 => (OP_FSGNJ_S, r),
                    1 => (OP_FSGNJN_S, r),
                    2 => (OP_FSGNJX_S, r),
                    _ => return None,
                },
                0x14 => match funct3 {
                    0 => (OP_FMIN_S, r),
                    1 => (OP_FMAX_S, r),
                    _ => return None,
                },
                0x50 => match funct3 {
                    0 => (OP_FLE_S, r),
                    1 => (OP_FLT_S, r),
                    2 => (OP_FEQ_S, r),
                    _ => return None,
                },
                0x60 => match rs2 {
                    0 => (OP_FCVT_W_S, fp_r),
                    1 => (OP_FCVT_WU_S, fp_r),
                    2 if X::VALUE == 64 => (OP_FCVT_L_S, fp_r),
                    3 if X::VALUE == 64 => (OP_FCVT_LU_S, fp_r),
                    _ => return None,
                },
                0x68 => match rs2 {
                    0 => (OP_FCVT_S_W, fp_r),
                    1 => (OP_FCVT_S_WU, fp_r),
                    2 if X::VALUE == 64 => (OP_FCVT_S_L, fp_r),
                    3 if X::VALUE == 64 => (OP_FCVT_S_LU, fp_r),
                    _ => return None,
                },
                0x70 if rs2 == 0 => match funct3 {
                    0 => (OP_FMV_X_W, r),
                    1 => (OP_FCLASS_S, r),
                    _ => return None,
                },
                0x78 if rs2 == 0 && funct3 == 0 => (OP_FMV_W_X, r),
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
        OP_FLW => 0x07 | f3(2),
        OP_FSW => 0x27 | f3(2),
        OP_FMADD_S => 0x43,
        OP_FMSUB_S => 0x47,
        OP_FNMSUB_S => 0x4B,
        OP_FNMADD_S => 0x4F,
        OP_FADD_S => 0x53,
        OP_FSUB_S => 0x53 | f7(0x04),
        OP_FMUL_S => 0x53 | f7(0x08),
        OP_FDIV_S => 0x53 | f7(0x0C),
        OP_FSQRT_S => 0x53 | f7(0x2C),
        OP_FSGNJ_S => 0x53 | f7(0x10),
        OP_FSGNJN_S => 0x53 | f7(0x10) | f3(1),
        OP_FSGNJX_S => 0x53 | f7(0x10) | f3(2),
        OP_FMIN_S => 0x53 | f7(0x14),
        OP_FMAX_S => 0x53 | f7(0x14) | f3(1),
        OP_FLE_S => 0x53 | f7(0x50),
        OP_FLT_S => 0x53 | f7(0x50) | f3(1),
        OP_FEQ_S => 0x53 | f7(0x50) | f3(2),
        OP_FCVT_W_S => 0x53 | f7(0x60),
        OP_FCVT_WU_S => 0x53 | f7(0x60),
        OP_FCVT_L_S => 0x53 | f7(0x60),
        OP_FCVT_LU_S => 0x53 | f7(0x60),
        OP_FCVT_S_W => 0x53 | f7(0x68),
        OP_FCVT_S_WU => 0x53 | f7(0x68),
        OP_FCVT_S_L => 0x53 | f7(0x68),
        OP_FCVT_S_LU => 0x53 | f7(0x68),
        OP_FMV_X_W => 0x53 | f7(0x70),
        OP_FCLASS_S => 0x53 | f7(0x70) | f3(1),
        OP_FMV_W_X => 0x53 | f7(0x78),
        _ => return None,
    })
}

/// Re-encode a decoded F instruction.
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

/// Disassembly string for an F instruction.
pub fn disasm(instr: &DecodedInstr) -> String {
    format_fp(f_mnemonic(instr.opid), instr)
}

/// Shared FP operand formatting; register-file membership per operand slot
/// follows the opcode (integer rd for fcvt.w/fmv.x/fclass/compares, integer
/// rs1 for fcvt-from-int/fmv from x).
pub(super) fn format_fp(m: &str, instr: &DecodedInstr) -> String {
    let int_rd = m.starts_with("fcvt.w")
        || m.starts_with("fcvt.l")
        || m.starts_with("fmv.x")
        || m.starts_with("fclass")
        || m.starts_with("feq")
        || m.starts_with("flt")
        || m.starts_with("fle");
    let int_rs1 = m.starts_with("fcvt.s.w")
        || m.starts_with("fcvt.s.l")
        || m.starts_with("fcvt.d.w")
        || m.starts_with("fcvt.d.l")
        || m.starts_with("fmv.w.x")
        || m.starts_with("fmv.d.x");
    let rd_name = |r: u8| if int_rd { reg_name(r) } else { freg_name(r) };
    let rs1_name = |r: u8| if int_rs1 { reg_name(r) } else { freg_name(r) };
    match instr.args {
        InstrArgs::I { rd, rs1, imm } => {
            format!("{} {}, {}({})", m, freg_name(rd), imm, reg_name(rs1))
        }
        InstrArgs::S { rs1, rs2, imm } => {
            format!("{} {}, {}({})", m, freg_name(rs2), imm, reg_name(rs1))
        }
        InstrArgs::R4 {
            rd, rs1, rs2, rs3, ..
        } => format!(
            "{} {}, {}, {}, {}",
            m,
            freg_name(rd),
            freg_name(rs1),
            freg_name(rs2),
            freg_name(rs3)
        ),
        InstrArgs::FpR { rd, rs1, rs2, .. } => {
            if m.starts_with("fsqrt") || m.starts_with("fcvt") {
                format!("{} {}, {}", m, rd_name(rd), rs1_name(rs1))
            } else {
                format!(
                    "{} {}, {}, {}",
                    m,
                    freg_name(rd),
                    freg_name(rs1),
                    freg_name(rs2)
                )
            }
        }
        InstrArgs::R { rd, rs1, rs2 } => {
            if m.starts_with("fmv") || m.starts_with("fclass") {
                format!("{} {}, {}", m, rd_name(rd), rs1_name(rs1))
            } else {
                format!(
                    "{} {}, {}, {}",
                    m,
                    rd_name(rd),
                    freg_name(rs1),
                    freg_name(rs2)
                )
            }
        }
        _ => m.to_string(),
    }
}
