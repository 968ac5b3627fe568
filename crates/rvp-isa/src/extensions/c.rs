//! C extension (compressed instructions) - decode, decompress, compress.
//!
//! Decode canonicalizes operands while decoding (sp-relative forms get
//! `rs1 = sp`, register aliases are expanded), so decompression is a pure
//! opcode-id rewrite through a per-XLEN table and the executor never sees a
//! compressed opcode.

use crate::extensions::{base, d, f};
use crate::{reg_name, DecodedInstr, InstrArgs, Isa, OpId, Xlen, EXT_C};

// Quadrant 0
pub const OP_C_ADDI4SPN: OpId = OpId::new(EXT_C, 0);
pub const OP_C_LW: OpId = OpId::new(EXT_C, 1);
pub const OP_C_SW: OpId = OpId::new(EXT_C, 2);
pub const OP_C_LD: OpId = OpId::new(EXT_C, 3); // RV64C
pub const OP_C_SD: OpId = OpId::new(EXT_C, 4); // RV64C

// Quadrant 1
pub const OP_C_NOP: OpId = OpId::new(EXT_C, 5);
pub const OP_C_ADDI: OpId = OpId::new(EXT_C, 6);
pub const OP_C_JAL: OpId = OpId::new(EXT_C, 7); // RV32C only
pub const OP_C_ADDIW: OpId = OpId::new(EXT_C, 8); // RV64C
pub const OP_C_LI: OpId = OpId::new(EXT_C, 9);
pub const OP_C_ADDI16SP: OpId = OpId::new(EXT_C, 10);
pub const OP_C_LUI: OpId = OpId::new(EXT_C, 11);
pub const OP_C_SRLI: OpId = OpId::new(EXT_C, 12);
pub const OP_C_SRAI: OpId = OpId::new(EXT_C, 13);
pub const OP_C_ANDI: OpId = OpId::new(EXT_C, 14);
pub const OP_C_SUB: OpId = OpId::new(EXT_C, 15);
pub const OP_C_XOR: OpId = OpId::new(EXT_C, 16);
pub const OP_C_OR: OpId = OpId::new(EXT_C, 17);
pub const OP_C_AND: OpId = OpId::new(EXT_C, 18);
pub const OP_C_SUBW: OpId = OpId::new(EXT_C, 19); // RV64C
pub const OP_C_ADDW: OpId = OpId::new(EXT_C, 20); // RV64C
pub const OP_C_J: OpId = OpId::new(EXT_C, 21);
pub const OP_C_BEQZ: OpId = OpId::new(EXT_C, 22);
pub const OP_C_BNEZ: OpId = OpId::new(EXT_C, 23);

// Quadrant 2
pub const OP_C_SLLI: OpId = OpId::new(EXT_C, 24);
pub const OP_C_LWSP: OpId = OpId::new(EXT_C, 25);
pub const OP_C_LDSP: OpId = OpId::new(EXT_C, 26); // RV64C
pub const OP_C_JR: OpId = OpId::new(EXT_C, 27);
pub const OP_C_MV: OpId = OpId::new(EXT_C, 28);
pub const OP_C_EBREAK: OpId = OpId::new(EXT_C, 29);
pub const OP_C_JALR: OpId = OpId::new(EXT_C, 30);
pub const OP_C_ADD: OpId = OpId::new(EXT_C, 31);
pub const OP_C_SWSP: OpId = OpId::new(EXT_C, 32);
pub const OP_C_SDSP: OpId = OpId::new(EXT_C, 33); // RV64C

// Floating-point forms
pub const OP_C_FLD: OpId = OpId::new(EXT_C, 34);
pub const OP_C_FSD: OpId = OpId::new(EXT_C, 35);
pub const OP_C_FLW: OpId = OpId::new(EXT_C, 36); // RV32C only
pub const OP_C_FSW: OpId = OpId::new(EXT_C, 37); // RV32C only
pub const OP_C_FLDSP: OpId = OpId::new(EXT_C, 38);
pub const OP_C_FSDSP: OpId = OpId::new(EXT_C, 39);
pub const OP_C_FLWSP: OpId = OpId::new(EXT_C, 40); // RV32C only
pub const OP_C_FSWSP: OpId = OpId::new(EXT_C, 41); // RV32C only

/// Get the mnemonic for a C extension instruction.
pub fn c_mnemonic(opid: OpId) -> &'static str {
    const NAMES: [&str; 42] = [
        "c.addi4spn", "c.lw", "c.sw", "c.ld", "c.sd", "c.nop", "c.addi", "c.jal", "c.addiw",
        "c.li", "c.addi16sp", "c.lui", "c.srli", "c.srai", "c.andi", "c.sub", "c.xor", "c.or",
        "c.and", "c.subw", "c.addw", "c.j", "c.beqz", "c.bnez", "c.slli", "c.lwsp", "c.ldsp",
        "c.jr", "c.mv", "c.ebreak", "c.jalr", "c.add", "c.swsp", "c.sdsp", "c.fld", "c.fsd",
        "c.flw", "c.fsw", "c.fldsp", "c.fsdsp", "c.flwsp", "c.fswsp",
    ];
    NAMES.get(opid.idx as usize).copied().unwrap_or("???")
}

/// Decode a 16-bit compressed instruction.
pub fn decode16<X: Xlen>(raw: u16, isa: Isa) -> Option<DecodedInstr> {
    let quadrant = raw & 0x3;
    let funct3 = ((raw >> 13) & 0x7) as u8;

    let (opid, args) = match quadrant {
        0b00 => decode_q0::<X>(raw, funct3, isa)?,
        0b01 => decode_q1::<X>(raw, funct3)?,
        0b10 => decode_q2::<X>(raw, funct3, isa)?,
        _ => return None,
    };

    Some(DecodedInstr::new(opid, raw as u32, 2, args))
}

/// Rewrite a compressed opcode id to its canonical 32-bit equivalent.
///
/// The operand record is already canonical; only the id changes. Separate
/// tables per XLEN: `c.jal` exists only on RV32, `c.addiw` only on RV64.
pub fn decompress<X: Xlen>(instr: DecodedInstr) -> Option<DecodedInstr> {
    if instr.opid.ext != EXT_C {
        return Some(instr);
    }
    let opid = if X::VALUE == 64 {
        decompress_op_rv64(instr.opid)?
    } else {
        decompress_op_rv32(instr.opid)?
    };
    Some(DecodedInstr { opid, ..instr })
}

/// RV32C decompression table.
pub fn decompress_op_rv32(opid: OpId) -> Option<OpId> {
    Some(match opid {
        OP_C_ADDI4SPN | OP_C_NOP | OP_C_ADDI | OP_C_LI | OP_C_ADDI16SP => base::OP_ADDI,
        OP_C_LW | OP_C_LWSP => base::OP_LW,
        OP_C_SW | OP_C_SWSP => base::OP_SW,
        OP_C_JAL | OP_C_J => base::OP_JAL,
        OP_C_LUI => base::OP_LUI,
        OP_C_SRLI => base::OP_SRLI,
        OP_C_SRAI => base::OP_SRAI,
        OP_C_ANDI => base::OP_ANDI,
        OP_C_SUB => base::OP_SUB,
        OP_C_XOR => base::OP_XOR,
        OP_C_OR => base::OP_OR,
        OP_C_AND => base::OP_AND,
        OP_C_BEQZ => base::OP_BEQ,
        OP_C_BNEZ => base::OP_BNE,
        OP_C_SLLI => base::OP_SLLI,
        OP_C_JR | OP_C_JALR => base::OP_JALR,
        OP_C_MV | OP_C_ADD => base::OP_ADD,
        OP_C_EBREAK => base::OP_EBREAK,
        OP_C_FLD | OP_C_FLDSP => d::OP_FLD,
        OP_C_FSD | OP_C_FSDSP => d::OP_FSD,
        OP_C_FLW | OP_C_FLWSP => f::OP_FLW,
        OP_C_FSW | OP_C_FSWSP => f::OP_FSW,
        _ => return None,
    })
}

/// RV64C decompression table.
pub fn decompress_op_rv64(opid: OpId) -> Option<OpId> {
    Some(match opid {
        OP_C_ADDI4SPN | OP_C_NOP | OP_C_ADDI | OP_C_LI | OP_C_ADDI16SP => base::OP_ADDI,
        OP_C_LW | OP_C_LWSP => base::OP_LW,
        OP_C_SW | OP_C_SWSP => base::OP_SW,
        OP_C_LD | OP_C_LDSP => base::OP_LD,
        OP_C_SD | OP_C_SDSP => base::OP_SD,
        OP_C_ADDIW => base::OP_ADDIW,
        OP_C_J => base::OP_JAL,
        OP_C_LUI => base::OP_LUI,
        OP_C_SRLI => base::OP_SRLI,
        OP_C_SRAI => base::OP_SRAI,
        OP_C_ANDI => base::OP_ANDI,
        OP_C_SUB => base::OP_SUB,
        OP_C_XOR => base::OP_XOR,
        OP_C_OR => base::OP_OR,
        OP_C_AND => base::OP_AND,
        OP_C_SUBW => base::OP_SUBW,
        OP_C_ADDW => base::OP_ADDW,
        OP_C_BEQZ => base::OP_BEQ,
        OP_C_BNEZ => base::OP_BNE,
        OP_C_SLLI => base::OP_SLLI,
        OP_C_JR | OP_C_JALR => base::OP_JALR,
        OP_C_MV | OP_C_ADD => base::OP_ADD,
        OP_C_EBREAK => base::OP_EBREAK,
        OP_C_FLD | OP_C_FLDSP => d::OP_FLD,
        OP_C_FSD | OP_C_FSDSP => d::OP_FSD,
        _ => return None,
    })
}

/// Map a canonical instruction back to its compressed opcode id, if its
/// operands satisfy the RVC constraints. Assembler-side convenience; the
/// raw word is not re-encoded.
pub fn compress_op<X: Xlen>(instr: &DecodedInstr) -> Option<OpId> {
    let creg = |r: u8| (8..16).contains(&r);
    let imm6 = |imm: i32| (-32..32).contains(&imm);
    match (instr.opid, instr.args) {
        (base::OP_ADDI, InstrArgs::I { rd, rs1, imm }) => {
            if rd == 0 && rs1 == 0 && imm == 0 {
                Some(OP_C_NOP)
            } else if rd == rs1 && rd != 0 && imm6(imm) && imm != 0 {
                Some(OP_C_ADDI)
            } else if rs1 == 0 && rd != 0 && imm6(imm) {
                Some(OP_C_LI)
            } else if rd == 2 && rs1 == 2 && imm != 0 && imm % 16 == 0 && (-512..512).contains(&imm)
            {
                Some(OP_C_ADDI16SP)
            } else if rs1 == 2 && creg(rd) && imm > 0 && imm % 4 == 0 && imm < 1024 {
                Some(OP_C_ADDI4SPN)
            } else {
                None
            }
        }
        (base::OP_ADDIW, InstrArgs::I { rd, rs1, imm }) if X::VALUE == 64 => {
            (rd == rs1 && rd != 0 && imm6(imm)).then_some(OP_C_ADDIW)
        }
        (base::OP_ADD, InstrArgs::R { rd, rs1, rs2 }) => {
            if rs1 == 0 && rd != 0 && rs2 != 0 {
                Some(OP_C_MV)
            } else if rd == rs1 && rd != 0 && rs2 != 0 {
                Some(OP_C_ADD)
            } else {
                None
            }
        }
        (base::OP_SUB, InstrArgs::R { rd, rs1, rs2 }) => {
            (rd == rs1 && creg(rd) && creg(rs2)).then_some(OP_C_SUB)
        }
        (base::OP_XOR, InstrArgs::R { rd, rs1, rs2 }) => {
            (rd == rs1 && creg(rd) && creg(rs2)).then_some(OP_C_XOR)
        }
        (base::OP_OR, InstrArgs::R { rd, rs1, rs2 }) => {
            (rd == rs1 && creg(rd) && creg(rs2)).then_some(OP_C_OR)
        }
        (base::OP_AND, InstrArgs::R { rd, rs1, rs2 }) => {
            (rd == rs1 && creg(rd) && creg(rs2)).then_some(OP_C_AND)
        }
        (base::OP_ANDI, InstrArgs::I { rd, rs1, imm }) => {
            (rd == rs1 && creg(rd) && imm6(imm)).then_some(OP_C_ANDI)
        }
        (base::OP_SLLI, InstrArgs::I { rd, rs1, imm }) => {
            (rd == rs1 && rd != 0 && imm != 0).then_some(OP_C_SLLI)
        }
        (base::OP_SRLI, InstrArgs::I { rd, rs1, imm }) => {
            (rd == rs1 && creg(rd) && imm != 0).then_some(OP_C_SRLI)
        }
        (base::OP_SRAI, InstrArgs::I { rd, rs1, imm }) => {
            (rd == rs1 && creg(rd) && imm != 0).then_some(OP_C_SRAI)
        }
        (base::OP_LUI, InstrArgs::U { rd, imm }) => {
            (rd != 0 && rd != 2 && imm != 0 && (-0x20000..0x20000).contains(&imm))
                .then_some(OP_C_LUI)
        }
        (base::OP_JAL, InstrArgs::J { rd, imm }) => {
            if !(-2048..2048).contains(&imm) {
                None
            } else if rd == 0 {
                Some(OP_C_J)
            } else if rd == 1 && X::VALUE == 32 {
                Some(OP_C_JAL)
            } else {
                None
            }
        }
        (base::OP_JALR, InstrArgs::I { rd, rs1, imm }) => {
            if imm != 0 || rs1 == 0 {
                None
            } else if rd == 0 {
                Some(OP_C_JR)
            } else if rd == 1 {
                Some(OP_C_JALR)
            } else {
                None
            }
        }
        (base::OP_BEQ, InstrArgs::B { rs1, rs2, imm }) => {
            (rs2 == 0 && creg(rs1) && (-256..256).contains(&imm)).then_some(OP_C_BEQZ)
        }
        (base::OP_BNE, InstrArgs::B { rs1, rs2, imm }) => {
            (rs2 == 0 && creg(rs1) && (-256..256).contains(&imm)).then_some(OP_C_BNEZ)
        }
        (base::OP_LW, InstrArgs::I { rd, rs1, imm }) => {
            if rs1 == 2 && rd != 0 && imm >= 0 && imm % 4 == 0 && imm < 256 {
                Some(OP_C_LWSP)
            } else if creg(rd) && creg(rs1) && imm >= 0 && imm % 4 == 0 && imm < 128 {
                Some(OP_C_LW)
            } else {
                None
            }
        }
        (base::OP_LD, InstrArgs::I { rd, rs1, imm }) if X::VALUE == 64 => {
            if rs1 == 2 && rd != 0 && imm >= 0 && imm % 8 == 0 && imm < 512 {
                Some(OP_C_LDSP)
            } else if creg(rd) && creg(rs1) && imm >= 0 && imm % 8 == 0 && imm < 256 {
                Some(OP_C_LD)
            } else {
                None
            }
        }
        (base::OP_SW, InstrArgs::S { rs1, rs2, imm }) => {
            if rs1 == 2 && imm >= 0 && imm % 4 == 0 && imm < 256 {
                Some(OP_C_SWSP)
            } else if creg(rs1) && creg(rs2) && imm >= 0 && imm % 4 == 0 && imm < 128 {
                Some(OP_C_SW)
            } else {
                None
            }
        }
        (base::OP_SD, InstrArgs::S { rs1, rs2, imm }) if X::VALUE == 64 => {
            if rs1 == 2 && imm >= 0 && imm % 8 == 0 && imm < 512 {
                Some(OP_C_SDSP)
            } else if creg(rs1) && creg(rs2) && imm >= 0 && imm % 8 == 0 && imm < 256 {
                Some(OP_C_SD)
            } else {
                None
            }
        }
        (base::OP_EBREAK, InstrArgs::None) => Some(OP_C_EBREAK),
        _ => None,
    }
}

// Decode helpers

fn decode_q0<X: Xlen>(raw: u16, funct3: u8, isa: Isa) -> Option<(OpId, InstrArgs)> {
    let rd = ((raw >> 2) & 0x7) as u8 + 8;
    let rs2 = rd;
    let rs1 = ((raw >> 7) & 0x7) as u8 + 8;
    match funct3 {
        0b000 => {
            let nzuimm = decode_addi4spn_imm(raw);
            if nzuimm == 0 {
                return None;
            }
            Some((
                OP_C_ADDI4SPN,
                InstrArgs::I {
                    rd,
                    rs1: 2,
                    imm: nzuimm as i32,
                },
            ))
        }
        0b001 if isa.d => Some((
            OP_C_FLD,
            InstrArgs::I {
                rd,
                rs1,
                imm: decode_cl_ld_offset(raw) as i32,
            },
        )),
        0b010 => Some((
            OP_C_LW,
            InstrArgs::I {
                rd,
                rs1,
                imm: decode_cl_lw_offset(raw) as i32,
            },
        )),
        0b011 if X::VALUE == 64 => Some((
            OP_C_LD,
            InstrArgs::I {
                rd,
                rs1,
                imm: decode_cl_ld_offset(raw) as i32,
            },
        )),
        0b011 if isa.f => Some((
            OP_C_FLW,
            InstrArgs::I {
                rd,
                rs1,
                imm: decode_cl_lw_offset(raw) as i32,
            },
        )),
        0b101 if isa.d => Some((
            OP_C_FSD,
            InstrArgs::S {
                rs1,
                rs2,
                imm: decode_cl_ld_offset(raw) as i32,
            },
        )),
        0b110 => Some((
            OP_C_SW,
            InstrArgs::S {
                rs1,
                rs2,
                imm: decode_cl_lw_offset(raw) as i32,
            },
        )),
        0b111 if X::VALUE == 64 => Some((
            OP_C_SD,
            InstrArgs::S {
                rs1,
                rs2,
                imm: decode_cl_ld_offset(raw) as i32,
            },
        )),
        0b111 if isa.f => Some((
            OP_C_FSW,
            InstrArgs::S {
                rs1,
                rs2,
                imm: decode_cl_lw_offset(raw) as i32,
            },
        )),
        _ => None,
    }
}

fn decode_q1<X: Xlen>(raw: u16, funct3: u8) -> Option<(OpId, InstrArgs)> {
    match funct3 {
        0b000 => {
            let rd = ((raw >> 7) & 0x1F) as u8;
            let imm = decode_ci_imm(raw);
            if rd == 0 && imm == 0 {
                return Some((
                    OP_C_NOP,
                    InstrArgs::I {
                        rd: 0,
                        rs1: 0,
                        imm: 0,
                    },
                ));
            }
            Some((
                OP_C_ADDI,
                InstrArgs::I {
                    rd,
                    rs1: rd,
                    imm: imm as i32,
                },
            ))
        }
        0b001 => {
            if X::VALUE == 64 {
                let rd = ((raw >> 7) & 0x1F) as u8;
                if rd == 0 {
                    return None;
                }
                Some((
                    OP_C_ADDIW,
                    InstrArgs::I {
                        rd,
                        rs1: rd,
                        imm: decode_ci_imm(raw) as i32,
                    },
                ))
            } else {
                Some((
                    OP_C_JAL,
                    InstrArgs::J {
                        rd: 1,
                        imm: decode_cj_imm(raw) as i32,
                    },
                ))
            }
        }
        0b010 => {
            let rd = ((raw >> 7) & 0x1F) as u8;
            Some((
                OP_C_LI,
                InstrArgs::I {
                    rd,
                    rs1: 0,
                    imm: decode_ci_imm(raw) as i32,
                },
            ))
        }
        0b011 => {
            let rd = ((raw >> 7) & 0x1F) as u8;
            if rd == 2 {
                let imm = decode_ci16sp_imm(raw);
                if imm == 0 {
                    return None;
                }
                Some((
                    OP_C_ADDI16SP,
                    InstrArgs::I {
                        rd: 2,
                        rs1: 2,
                        imm: imm as i32,
                    },
                ))
            } else {
                let imm = decode_ci_lui_imm(raw);
                if imm == 0 || rd == 0 {
                    return None;
                }
                Some((OP_C_LUI, InstrArgs::U { rd, imm }))
            }
        }
        0b100 => decode_misc_alu::<X>(raw),
        0b101 => Some((
            OP_C_J,
            InstrArgs::J {
                rd: 0,
                imm: decode_cj_imm(raw) as i32,
            },
        )),
        0b110 => {
            let rs1 = ((raw >> 7) & 0x7) as u8 + 8;
            Some((
                OP_C_BEQZ,
                InstrArgs::B {
                    rs1,
                    rs2: 0,
                    imm: decode_cb_imm(raw) as i32,
                },
            ))
        }
        0b111 => {
            let rs1 = ((raw >> 7) & 0x7) as u8 + 8;
            Some((
                OP_C_BNEZ,
                InstrArgs::B {
                    rs1,
                    rs2: 0,
                    imm: decode_cb_imm(raw) as i32,
                },
            ))
        }
        _ => None,
    }
}

fn decode_misc_alu<X: Xlen>(raw: u16) -> Option<(OpId, InstrArgs)> {
    let funct2 = ((raw >> 10) & 0x3) as u8;
    let rd = ((raw >> 7) & 0x7) as u8 + 8;

    match funct2 {
        0b00 | 0b01 => {
            let shamt = decode_ci_shamt(raw);
            // shamt[5] is reserved on RV32
            if X::VALUE == 32 && shamt & 0x20 != 0 {
                return None;
            }
            let opid = if funct2 == 0 { OP_C_SRLI } else { OP_C_SRAI };
            Some((
                opid,
                InstrArgs::I {
                    rd,
                    rs1: rd,
                    imm: shamt as i32,
                },
            ))
        }
        0b10 => Some((
            OP_C_ANDI,
            InstrArgs::I {
                rd,
                rs1: rd,
                imm: decode_ci_imm(raw) as i32,
            },
        )),
        0b11 => {
            let rs2 = ((raw >> 2) & 0x7) as u8 + 8;
            let funct6 = ((raw >> 12) & 0x1) as u8;
            let funct2_low = ((raw >> 5) & 0x3) as u8;

            let opid = if funct6 == 0 {
                match funct2_low {
                    0b00 => OP_C_SUB,
                    0b01 => OP_C_XOR,
                    0b10 => OP_C_OR,
                    _ => OP_C_AND,
                }
            } else {
                if X::VALUE != 64 {
                    return None;
                }
                match funct2_low {
                    0b00 => OP_C_SUBW,
                    0b01 => OP_C_ADDW,
                    _ => return None,
                }
            };
            Some((opid, InstrArgs::R { rd, rs1: rd, rs2 }))
        }
        _ => None,
    }
}

fn decode_q2<X: Xlen>(raw: u16, funct3: u8, isa: Isa) -> Option<(OpId, InstrArgs)> {
    let rd = ((raw >> 7) & 0x1F) as u8;
    match funct3 {
        0b000 => {
            let shamt = decode_ci_shamt(raw);
            if rd == 0 || (X::VALUE == 32 && shamt & 0x20 != 0) {
                return None;
            }
            Some((
                OP_C_SLLI,
                InstrArgs::I {
                    rd,
                    rs1: rd,
                    imm: shamt as i32,
                },
            ))
        }
        0b001 if isa.d => Some((
            OP_C_FLDSP,
            InstrArgs::I {
                rd,
                rs1: 2,
                imm: decode_ci_ldsp_offset(raw) as i32,
            },
        )),
        0b010 => {
            if rd == 0 {
                return None;
            }
            Some((
                OP_C_LWSP,
                InstrArgs::I {
                    rd,
                    rs1: 2,
                    imm: decode_ci_lwsp_offset(raw) as i32,
                },
            ))
        }
        0b011 if X::VALUE == 64 => {
            if rd == 0 {
                return None;
            }
            Some((
                OP_C_LDSP,
                InstrArgs::I {
                    rd,
                    rs1: 2,
                    imm: decode_ci_ldsp_offset(raw) as i32,
                },
            ))
        }
        0b011 if isa.f => Some((
            OP_C_FLWSP,
            InstrArgs::I {
                rd,
                rs1: 2,
                imm: decode_ci_lwsp_offset(raw) as i32,
            },
        )),
        0b100 => {
            let funct4 = ((raw >> 12) & 0x1) as u8;
            let rs1 = rd;
            let rs2 = ((raw >> 2) & 0x1F) as u8;

            if funct4 == 0 {
                if rs2 == 0 {
                    if rs1 == 0 {
                        return None;
                    }
                    Some((OP_C_JR, InstrArgs::I { rd: 0, rs1, imm: 0 }))
                } else {
                    Some((OP_C_MV, InstrArgs::R { rd: rs1, rs1: 0, rs2 }))
                }
            } else if rs1 == 0 && rs2 == 0 {
                Some((OP_C_EBREAK, InstrArgs::None))
            } else if rs2 == 0 {
                Some((OP_C_JALR, InstrArgs::I { rd: 1, rs1, imm: 0 }))
            } else {
                Some((OP_C_ADD, InstrArgs::R { rd: rs1, rs1, rs2 }))
            }
        }
        0b101 if isa.d => Some((
            OP_C_FSDSP,
            InstrArgs::S {
                rs1: 2,
                rs2: ((raw >> 2) & 0x1F) as u8,
                imm: decode_css_sdsp_offset(raw) as i32,
            },
        )),
        0b110 => Some((
            OP_C_SWSP,
            InstrArgs::S {
                rs1: 2,
                rs2: ((raw >> 2) & 0x1F) as u8,
                imm: decode_css_swsp_offset(raw) as i32,
            },
        )),
        0b111 if X::VALUE == 64 => Some((
            OP_C_SDSP,
            InstrArgs::S {
                rs1: 2,
                rs2: ((raw >> 2) & 0x1F) as u8,
                imm: decode_css_sdsp_offset(raw) as i32,
            },
        )),
        0b111 if isa.f => Some((
            OP_C_FSWSP,
            InstrArgs::S {
                rs1: 2,
                rs2: ((raw >> 2) & 0x1F) as u8,
                imm: decode_css_swsp_offset(raw) as i32,
            },
        )),
        _ => None,
    }
}

/// Disassembly string for a compressed instruction (pre-decompression).
pub fn disasm(instr: &DecodedInstr) -> String {
    let m = c_mnemonic(instr.opid);
    match instr.args {
        InstrArgs::R { rd, rs2, .. } => format!("{} {}, {}", m, reg_name(rd), reg_name(rs2)),
        InstrArgs::I { rd, imm, .. } => format!("{} {}, {}", m, reg_name(rd), imm),
        InstrArgs::S { rs2, imm, .. } => format!("{} {}, {}", m, reg_name(rs2), imm),
        InstrArgs::U { rd, imm } => format!("{} {}, 0x{:x}", m, reg_name(rd), (imm as u32) >> 12),
        InstrArgs::J { imm, .. } => format!("{} {}", m, imm),
        InstrArgs::B { rs1, imm, .. } => format!("{} {}, {}", m, reg_name(rs1), imm),
        _ => m.to_string(),
    }
}

// Compressed immediate decoders

fn decode_addi4spn_imm(raw: u16) -> u16 {
    (((raw >> 6) & 0x1) << 2)
        | (((raw >> 5) & 0x1) << 3)
        | (((raw >> 11) & 0x3) << 4)
        | (((raw >> 7) & 0xF) << 6)
}

fn decode_cl_lw_offset(raw: u16) -> u8 {
    ((((raw >> 6) & 0x1) << 2) | (((raw >> 10) & 0x7) << 3) | (((raw >> 5) & 0x1) << 6)) as u8
}

fn decode_cl_ld_offset(raw: u16) -> u8 {
    ((((raw >> 10) & 0x7) << 3) | (((raw >> 5) & 0x3) << 6)) as u8
}

fn decode_ci_imm(raw: u16) -> i8 {
    let imm = (((raw >> 2) & 0x1F) | (((raw >> 12) & 0x1) << 5)) as u8;
    ((imm as i8) << 2) >> 2
}

fn decode_cj_imm(raw: u16) -> i16 {
    let imm = (((raw >> 3) & 0x7) << 1)
        | (((raw >> 11) & 0x1) << 4)
        | (((raw >> 2) & 0x1) << 5)
        | (((raw >> 7) & 0x1) << 6)
        | (((raw >> 6) & 0x1) << 7)
        | (((raw >> 9) & 0x3) << 8)
        | (((raw >> 8) & 0x1) << 10)
        | (((raw >> 12) & 0x1) << 11);
    ((imm as i16) << 4) >> 4
}

fn decode_ci16sp_imm(raw: u16) -> i16 {
    let imm = (((raw >> 6) & 0x1) << 4)
        | (((raw >> 2) & 0x1) << 5)
        | (((raw >> 5) & 0x1) << 6)
        | (((raw >> 3) & 0x3) << 7)
        | (((raw >> 12) & 0x1) << 9);
    ((imm as i16) << 6) >> 6
}

fn decode_ci_lui_imm(raw: u16) -> i32 {
    let imm = ((((raw >> 2) & 0x1F) | (((raw >> 12) & 0x1) << 5)) as u32) << 12;
    ((imm as i32) << 14) >> 14
}

fn decode_ci_shamt(raw: u16) -> u8 {
    (((raw >> 2) & 0x1F) | (((raw >> 12) & 0x1) << 5)) as u8
}

fn decode_cb_imm(raw: u16) -> i16 {
    let imm = (((raw >> 3) & 0x3) << 1)
        | (((raw >> 10) & 0x3) << 3)
        | (((raw >> 2) & 0x1) << 5)
        | (((raw >> 5) & 0x3) << 6)
        | (((raw >> 12) & 0x1) << 8);
    ((imm as i16) << 7) >> 7
}

fn decode_ci_lwsp_offset(raw: u16) -> u8 {
    ((((raw >> 4) & 0x7) << 2) | (((raw >> 12) & 0x1) << 5) | (((raw >> 2) & 0x3) << 6)) as u8
}

fn decode_css_swsp_offset(raw: u16) -> u8 {
    ((((raw >> 9) & 0xF) << 2) | (((raw >> 7) & 0x3) << 6)) as u8
}

fn decode_ci_ldsp_offset(raw: u16) -> u16 {
    (((raw >> 5) & 0x3) << 3) | (((raw >> 12) & 0x1) << 5) | (((raw >> 2) & 0x7) << 6)
}

fn decode_css_sdsp_offset(raw: u16) -> u16 {
    (((raw >> 10) & 0x7) << 3) | (((raw >> 7) & 0x7) << 6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rv32, Rv64};

    #[test]
    fn test_decode_c_li() {
        // c.li a0, 1 = 0x4505
        let dec = decode16::<Rv64>(0x4505, Isa::IMAFDC).unwrap();
        assert_eq!(dec.opid, OP_C_LI);
        assert_eq!(
            dec.args,
            InstrArgs::I {
                rd: 10,
                rs1: 0,
                imm: 1
            }
        );
        assert_eq!(decompress_op_rv64(dec.opid), Some(base::OP_ADDI));
    }

    #[test]
    fn test_decode_c_addi() {
        // c.addi a0, -1 = 0x157D
        let dec = decode16::<Rv64>(0x157D, Isa::IMAFDC).unwrap();
        assert_eq!(dec.opid, OP_C_ADDI);
        assert_eq!(
            dec.args,
            InstrArgs::I {
                rd: 10,
                rs1: 10,
                imm: -1
            }
        );
    }

    #[test]
    fn test_c_jal_rv32_vs_addiw_rv64() {
        // On RV32 funct3=001/Q1 is c.jal; on RV64 it is c.addiw.
        // c.addiw a0, 1 / c.jal ... = 0x2505
        let dec64 = decode16::<Rv64>(0x2505, Isa::IMAFDC).unwrap();
        assert_eq!(dec64.opid, OP_C_ADDIW);
        assert_eq!(decompress_op_rv64(dec64.opid), Some(base::OP_ADDIW));
        let dec32 = decode16::<Rv32>(0x2505, Isa::IMAFDC).unwrap();
        assert_eq!(dec32.opid, OP_C_JAL);
        assert_eq!(decompress_op_rv32(dec32.opid), Some(base::OP_JAL));
        // c.jal never decompresses on RV64, c.addiw never on RV32
        assert_eq!(decompress_op_rv64(OP_C_JAL), None);
        assert_eq!(decompress_op_rv32(OP_C_ADDIW), None);
    }

    #[test]
    fn test_decode_c_mv_and_add() {
        // c.mv a0, a1 = 0x852E
        let dec = decode16::<Rv64>(0x852E, Isa::IMAFDC).unwrap();
        assert_eq!(dec.opid, OP_C_MV);
        assert_eq!(
            dec.args,
            InstrArgs::R {
                rd: 10,
                rs1: 0,
                rs2: 11
            }
        );
        // c.add a0, a1 = 0x952E
        let dec = decode16::<Rv64>(0x952E, Isa::IMAFDC).unwrap();
        assert_eq!(dec.opid, OP_C_ADD);
        assert_eq!(
            dec.args,
            InstrArgs::R {
                rd: 10,
                rs1: 10,
                rs2: 11
            }
        );
    }

    #[test]
    fn test_decode_c_lwsp_sdsp() {
        // c.ldsp ra, 8(sp) = 0x60A2
        let dec = decode16::<Rv64>(0x60A2, Isa::IMAFDC).unwrap();
        assert_eq!(dec.opid, OP_C_LDSP);
        assert_eq!(
            dec.args,
            InstrArgs::I {
                rd: 1,
                rs1: 2,
                imm: 8
            }
        );
        // c.sdsp ra, 8(sp) = 0xE406
        let dec = decode16::<Rv64>(0xE406, Isa::IMAFDC).unwrap();
        assert_eq!(dec.opid, OP_C_SDSP);
        assert_eq!(
            dec.args,
            InstrArgs::S {
                rs1: 2,
                rs2: 1,
                imm: 8
            }
        );
    }

    #[test]
    fn test_fp_forms_gated() {
        // c.fld fa0, 8(a0) = 0x2508 (Q0, funct3=001)
        let dec = decode16::<Rv64>(0x2508, Isa::IMAFDC).unwrap();
        assert_eq!(dec.opid, OP_C_FLD);
        assert!(decode16::<Rv64>(0x2508, Isa::IMAC).is_none());
    }

    #[test]
    fn test_c_ebreak_and_jr() {
        // c.ebreak = 0x9002
        let dec = decode16::<Rv64>(0x9002, Isa::IMAFDC).unwrap();
        assert_eq!(dec.opid, OP_C_EBREAK);
        // c.jr ra = 0x8082
        let dec = decode16::<Rv64>(0x8082, Isa::IMAFDC).unwrap();
        assert_eq!(dec.opid, OP_C_JR);
        assert_eq!(dec.args, InstrArgs::I { rd: 0, rs1: 1, imm: 0 });
    }

    #[test]
    fn test_rv32_shamt_reserved() {
        // c.slli a0, 33 has shamt[5] set; reserved on RV32
        // = funct3 000/Q2, rd=10, shamt=33 -> bit12=1, bits6:2=1
        let raw: u16 = 0b000_1_01010_00001_10;
        assert_eq!(
            decode16::<Rv64>(raw, Isa::IMAFDC).unwrap().opid,
            OP_C_SLLI
        );
        assert!(decode16::<Rv32>(raw, Isa::IMAFDC).is_none());
    }

    #[test]
    fn test_compress_op() {
        // addi a0, a0, 4 -> c.addi
        let dec = DecodedInstr::new(
            base::OP_ADDI,
            0,
            4,
            InstrArgs::I {
                rd: 10,
                rs1: 10,
                imm: 4,
            },
        );
        assert_eq!(compress_op::<Rv64>(&dec), Some(OP_C_ADDI));
        // addi a0, a1, 4 cannot compress
        let dec = DecodedInstr::new(
            base::OP_ADDI,
            0,
            4,
            InstrArgs::I {
                rd: 10,
                rs1: 11,
                imm: 4,
            },
        );
        assert_eq!(compress_op::<Rv64>(&dec), None);
        // add a0, zero, a1 -> c.mv
        let dec = DecodedInstr::new(
            base::OP_ADD,
            0,
            4,
            InstrArgs::R {
                rd: 10,
                rs1: 0,
                rs2: 11,
            },
        );
        assert_eq!(compress_op::<Rv64>(&dec), Some(OP_C_MV));
    }

    #[test]
    fn test_decompress_keeps_args() {
        let dec = decode16::<Rv64>(0x4505, Isa::IMAFDC).unwrap();
        let canon = decompress::<Rv64>(dec).unwrap();
        assert_eq!(canon.opid, base::OP_ADDI);
        assert_eq!(canon.size, 2);
        assert_eq!(canon.args, dec.args);
        assert_eq!(canon.raw, 0x4505);
    }
}
