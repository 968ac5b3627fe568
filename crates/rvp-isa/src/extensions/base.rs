//! Base integer ISA (RV32I/RV64I) - decode, encode, disasm.

use crate::encode::*;
use crate::{DecodedInstr, InstrArgs, OpId, Xlen, EXT_I};

pub const OP_LUI: OpId = OpId::new(EXT_I, 0);
pub const OP_AUIPC: OpId = OpId::new(EXT_I, 1);
pub const OP_JAL: OpId = OpId::new(EXT_I, 2);
pub const OP_JALR: OpId = OpId::new(EXT_I, 3);
pub const OP_BEQ: OpId = OpId::new(EXT_I, 4);
pub const OP_BNE: OpId = OpId::new(EXT_I, 5);
pub const OP_BLT: OpId = OpId::new(EXT_I, 6);
pub const OP_BGE: OpId = OpId::new(EXT_I, 7);
pub const OP_BLTU: OpId = OpId::new(EXT_I, 8);
pub const OP_BGEU: OpId = OpId::new(EXT_I, 9);
pub const OP_LB: OpId = OpId::new(EXT_I, 10);
pub const OP_LH: OpId = OpId::new(EXT_I, 11);
pub const OP_LW: OpId = OpId::new(EXT_I, 12);
pub const OP_LBU: OpId = OpId::new(EXT_I, 13);
pub const OP_LHU: OpId = OpId::new(EXT_I, 14);
pub const OP_SB: OpId = OpId::new(EXT_I, 15);
pub const OP_SH: OpId = OpId::new(EXT_I, 16);
pub const OP_SW: OpId = OpId::new(EXT_I, 17);
pub const OP_ADDI: OpId = OpId::new(EXT_I, 18);
pub const OP_SLTI: OpId = OpId::new(EXT_I, 19);
pub const OP_SLTIU: OpId = OpId::new(EXT_I, 20);
pub const OP_XORI: OpId = OpId::new(EXT_I, 21);
pub const OP_ORI: OpId = OpId::new(EXT_I, 22);
pub const OP_ANDI: OpId = OpId::new(EXT_I, 23);
pub const OP_SLLI: OpId = OpId::new(EXT_I, 24);
pub const OP_SRLI: OpId = OpId::new(EXT_I, 25);
pub const OP_SRAI: OpId = OpId::new(EXT_I, 26);
pub const OP_ADD: OpId = OpId::new(EXT_I, 27);
pub const OP_SUB: OpId = OpId::new(EXT_I, 28);
pub const OP_SLL: OpId = OpId::new(EXT_I, 29);
pub const OP_SLT: OpId = OpId::new(EXT_I, 30);
pub const OP_SLTU: OpId = OpId::new(EXT_I, 31);
pub const OP_XOR: OpId = OpId::new(EXT_I, 32);
pub const OP_SRL: OpId = OpId::new(EXT_I, 33);
pub const OP_SRA: OpId = OpId::new(EXT_I, 34);
pub const OP_OR: OpId = OpId::new(EXT_I, 35);
pub const OP_AND: OpId = OpId::new(EXT_I, 36);
pub const OP_FENCE: OpId = OpId::new(EXT_I, 37);
pub const OP_ECALL: OpId = OpId::new(EXT_I, 38);
pub const OP_EBREAK: OpId = OpId::new(EXT_I, 39);

// RV64I
pub const OP_LWU: OpId = OpId::new(EXT_I, 40);
pub const OP_LD: OpId = OpId::new(EXT_I, 41);
pub const OP_SD: OpId = OpId::new(EXT_I, 42);
pub const OP_ADDIW: OpId = OpId::new(EXT_I, 43);
pub const OP_SLLIW: OpId = OpId::new(EXT_I, 44);
pub const OP_SRLIW: OpId = OpId::new(EXT_I, 45);
pub const OP_SRAIW: OpId = OpId::new(EXT_I, 46);
pub const OP_ADDW: OpId = OpId::new(EXT_I, 47);
pub const OP_SUBW: OpId = OpId::new(EXT_I, 48);
pub const OP_SLLW: OpId = OpId::new(EXT_I, 49);
pub const OP_SRLW: OpId = OpId::new(EXT_I, 50);
pub const OP_SRAW: OpId = OpId::new(EXT_I, 51);

/// Get the mnemonic for a base ISA instruction.
pub fn base_mnemonic(opid: OpId) -> &'static str {
    const NAMES: [&str; 52] = [
        "lui", "auipc", "jal", "jalr", "beq", "bne", "blt", "bge", "bltu", "bgeu", "lb", "lh",
        "lw", "lbu", "lhu", "sb", "sh", "sw", "addi", "slti", "sltiu", "xori", "ori", "andi",
        "slli", "srli", "srai", "add", "sub", "sll", "slt", "sltu", "xor", "srl", "sra", "or",
        "and", "fence", "ecall", "ebreak", "lwu", "ld", "sd", "addiw", "slliw", "srliw",
        "sraiw", "addw", "subw", "sllw", "srlw", "sraw",
    ];
    NAMES.get(opid.idx as usize).copied().unwrap_or("???")
}

/// Decode a base-ISA 32-bit instruction. Returns None for anything another
/// extension owns (M/A funct7 patterns, CSR forms, fence.i).
pub fn decode32<X: Xlen>(raw: u32) -> Option<DecodedInstr> {
    let opcode = decode_opcode(raw);
    let funct3 = decode_funct3(raw);
    let funct7 = decode_funct7(raw);
    let rd = decode_rd(raw);
    let rs1 = decode_rs1(raw);
    let rs2 = decode_rs2(raw);

    let (opid, args) = match opcode {
        0x37 => (
            OP_LUI,
            InstrArgs::U {
                rd,
                imm: decode_u_imm(raw),
            },
        ),
        0x17 => (
            OP_AUIPC,
            InstrArgs::U {
                rd,
                imm: decode_u_imm(raw),
            },
        ),
        0x6F => (
            OP_JAL,
            InstrArgs::J {
                rd,
                imm: decode_j_imm(raw),
            },
        ),
        0x67 if funct3 == 0 => (
            OP_JALR,
            InstrArgs::I {
                rd,
                rs1,
                imm: decode_i_imm(raw),
            },
        ),
        0x63 => {
            let opid = match funct3 {
                0 => OP_BEQ,
                1 => OP_BNE,
                4 => OP_BLT,
                5 => OP_BGE,
                6 => OP_BLTU,
                7 => OP_BGEU,
                _ => return None,
            };
            (
                opid,
                InstrArgs::B {
                    rs1,
                    rs2,
                    imm: decode_b_imm(raw),
                },
            )
        }
        0x03 => {
            let opid = match funct3 {
                0 => OP_LB,
                1 => OP_LH,
                2 => OP_LW,
                3 if X::VALUE == 64 => OP_LD,
                4 => OP_LBU,
                5 => OP_LHU,
                6 if X::VALUE == 64 => OP_LWU,
                _ => return None,
            };
            (
                opid,
                InstrArgs::I {
                    rd,
                    rs1,
                    imm: decode_i_imm(raw),
                },
            )
        }
        0x23 => {
            let opid = match funct3 {
                0 => OP_SB,
                1 => OP_SH,
                2 => OP_SW,
                3 if X::VALUE == 64 => OP_SD,
                _ => return None,
            };
            (
                opid,
                InstrArgs::S {
                    rs1,
                    rs2,
                    imm: decode_s_imm(raw),
                },
            )
        }
        0x13 => {
            // Shift immediates reserve the upper funct bits; the shamt
            // field is 6 bits on RV64 and 5 on RV32.
            let shtop = (raw >> 26) & 0x3F;
            let shamt = (raw >> 20) & X::SHIFT_MASK;
            let sh32_ok = X::VALUE == 64 || (raw >> 25) & 1 == 0;
            let (opid, imm) = match funct3 {
                0 => (OP_ADDI, decode_i_imm(raw)),
                1 if shtop == 0 && sh32_ok => (OP_SLLI, shamt as i32),
                2 => (OP_SLTI, decode_i_imm(raw)),
                3 => (OP_SLTIU, decode_i_imm(raw)),
                4 => (OP_XORI, decode_i_imm(raw)),
                5 if shtop == 0 && sh32_ok => (OP_SRLI, shamt as i32),
                5 if shtop == 0x10 && sh32_ok => (OP_SRAI, shamt as i32),
                6 => (OP_ORI, decode_i_imm(raw)),
                7 => (OP_ANDI, decode_i_imm(raw)),
                _ => return None,
            };
            (opid, InstrArgs::I { rd, rs1, imm })
        }
        0x1B if X::VALUE == 64 => {
            let shamt = ((raw >> 20) & 0x1F) as i32;
            let (opid, imm) = match (funct7, funct3) {
                (_, 0) => (OP_ADDIW, decode_i_imm(raw)),
                (0x00, 1) => (OP_SLLIW, shamt),
                (0x00, 5) => (OP_SRLIW, shamt),
                (0x20, 5) => (OP_SRAIW, shamt),
                _ => return None,
            };
            (opid, InstrArgs::I { rd, rs1, imm })
        }
        0x33 => {
            let opid = match (funct7, funct3) {
                (0x00, 0) => OP_ADD,
                (0x20, 0) => OP_SUB,
                (0x00, 1) => OP_SLL,
                (0x00, 2) => OP_SLT,
                (0x00, 3) => OP_SLTU,
                (0x00, 4) => OP_XOR,
                (0x00, 5) => OP_SRL,
                (0x20, 5) => OP_SRA,
                (0x00, 6) => OP_OR,
                (0x00, 7) => OP_AND,
                _ => return None,
            };
            (opid, InstrArgs::R { rd, rs1, rs2 })
        }
        0x3B if X::VALUE == 64 => {
            let opid = match (funct7, funct3) {
                (0x00, 0) => OP_ADDW,
                (0x20, 0) => OP_SUBW,
                (0x00, 1) => OP_SLLW,
                (0x00, 5) => OP_SRLW,
                (0x20, 5) => OP_SRAW,
                _ => return None,
            };
            (opid, InstrArgs::R { rd, rs1, rs2 })
        }
        0x0F if funct3 == 0 => (
            OP_FENCE,
            InstrArgs::Fence {
                pred: ((raw >> 24) & 0xF) as u8,
                succ: ((raw >> 20) & 0xF) as u8,
            },
        ),
        0x73 if raw == 0x0000_0073 => (OP_ECALL, InstrArgs::None),
        0x73 if raw == 0x0010_0073 => (OP_EBREAK, InstrArgs::None),
        _ => return None,
    };

    Some(DecodedInstr::new(opid, raw, 4, args))
}

/// Fixed opcode/funct bits for each base instruction. Operand fields are
/// OR'd in by `encode`.
fn template(opid: OpId) -> Option<u32> {
    let f3 = |n: u32| n << 12;
    let f7 = |n: u32| n << 25;
    Some(match opid {
        OP_LUI => 0x37,
        OP_AUIPC => 0x17,
        OP_JAL => 0x6F,
        OP_JALR => 0x67,
        OP_BEQ => 0x63,
        OP_BNE => 0x63 | f3(1),
        OP_BLT => 0x63 | f3(4),
        OP_BGE => 0x63 | f3(5),
        OP_BLTU => 0x63 | f3(6),
        OP_BGEU => 0x63 | f3(7),
        OP_LB => 0x03,
        OP_LH => 0x03 | f3(1),
        OP_LW => 0x03 | f3(2),
        OP_LD => 0x03 | f3(3),
        OP_LBU => 0x03 | f3(4),
        OP_LHU => 0x03 | f3(5),
        OP_LWU => 0x03 | f3(6),
        OP_SB => 0x23,
        OP_SH => 0x23 | f3(1),
        OP_SW => 0x23 | f3(2),
        OP_SD => 0x23 | f3(3),
        OP_ADDI => 0x13,
        OP_SLTI => 0x13 | f3(2),
        OP_SLTIU => 0x13 | f3(3),
        OP_XORI => 0x13 | f3(4),
        OP_ORI => 0x13 | f3(6),
        OP_ANDI => 0x13 | f3(7),
        OP_SLLI => 0x13 | f3(1),
        OP_SRLI => 0x13 | f3(5),
        OP_SRAI => 0x13 | f3(5) | f7(0x20),
        OP_ADD => 0x33,
        OP_SUB => 0x33 | f7(0x20),
        OP_SLL => 0x33 | f3(1),
        OP_SLT => 0x33 | f3(2),
        OP_SLTU => 0x33 | f3(3),
        OP_XOR => 0x33 | f3(4),
        OP_SRL => 0x33 | f3(5),
        OP_SRA => 0x33 | f3(5) | f7(0x20),
        OP_OR => 0x33 | f3(6),
        OP_AND => 0x33 | f3(7),
        OP_FENCE => 0x0F,
        OP_ECALL => 0x0000_0073,
        OP_EBREAK => 0x0010_0073,
        OP_ADDIW => 0x1B,
        OP_SLLIW => 0x1B | f3(1),
        OP_SRLIW => 0x1B | f3(5),
        OP_SRAIW => 0x1B | f3(5) | f7(0x20),
        OP_ADDW => 0x3B,
        OP_SUBW => 0x3B | f7(0x20),
        OP_SLLW => 0x3B | f3(1),
        OP_SRLW => 0x3B | f3(5),
        OP_SRAW => 0x3B | f3(5) | f7(0x20),
        _ => return None,
    })
}

/// Whether the opcode's I-type immediate is a shift amount (masked, not
/// sign-extended, and must not clobber the fixed funct bits).
fn is_shift_imm(opid: OpId) -> bool {
    matches!(
        opid,
        OP_SLLI | OP_SRLI | OP_SRAI | OP_SLLIW | OP_SRLIW | OP_SRAIW
    )
}

/// Re-encode a decoded base instruction to its raw word.
pub fn encode(instr: &DecodedInstr) -> Option<u32> {
    let t = template(instr.opid)?;
    Some(match instr.args {
        InstrArgs::U { rd, imm } => t | encode_rd(rd) | encode_u_imm(imm),
        InstrArgs::J { rd, imm } => t | encode_rd(rd) | encode_j_imm(imm),
        InstrArgs::I { rd, rs1, imm } => {
            let imm = if is_shift_imm(instr.opid) {
                encode_i_imm(imm & 0x3F)
            } else {
                encode_i_imm(imm)
            };
            t | encode_rd(rd) | encode_rs1(rs1) | imm
        }
        InstrArgs::S { rs1, rs2, imm } => t | encode_rs1(rs1) | encode_rs2(rs2) | encode_s_imm(imm),
        InstrArgs::B { rs1, rs2, imm } => t | encode_rs1(rs1) | encode_rs2(rs2) | encode_b_imm(imm),
        InstrArgs::R { rd, rs1, rs2 } => t | encode_rd(rd) | encode_rs1(rs1) | encode_rs2(rs2),
        InstrArgs::Fence { pred, succ } => {
            t | (pred as u32 & 0xF) << 24 | (succ as u32 & 0xF) << 20
        }
        InstrArgs::None => t,
        _ => return None,
    })
}

/// Disassembly string for a base instruction.
pub fn disasm(instr: &DecodedInstr) -> String {
    use crate::reg_name;
    let m = base_mnemonic(instr.opid);
    match instr.args {
        InstrArgs::U { rd, imm } => {
            format!("{} {}, 0x{:x}", m, reg_name(rd), (imm as u32) >> 12)
        }
        InstrArgs::J { rd, imm } => format!("{} {}, {}", m, reg_name(rd), imm),
        InstrArgs::I { rd, rs1, imm } => match instr.opid {
            OP_JALR => format!("{} {}, {}({})", m, reg_name(rd), imm, reg_name(rs1)),
            OP_LB | OP_LH | OP_LW | OP_LD | OP_LBU | OP_LHU | OP_LWU => {
                format!("{} {}, {}({})", m, reg_name(rd), imm, reg_name(rs1))
            }
            _ => format!("{} {}, {}, {}", m, reg_name(rd), reg_name(rs1), imm),
        },
        InstrArgs::S { rs1, rs2, imm } => {
            format!("{} {}, {}({})", m, reg_name(rs2), imm, reg_name(rs1))
        }
        InstrArgs::B { rs1, rs2, imm } => {
            format!("{} {}, {}, {}", m, reg_name(rs1), reg_name(rs2), imm)
        }
        InstrArgs::R { rd, rs1, rs2 } => format!(
            "{} {}, {}, {}",
            m,
            reg_name(rd),
            reg_name(rs1),
            reg_name(rs2)
        ),
        InstrArgs::Fence { .. } => m.to_string(),
        _ => m.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rv32, Rv64};

    #[test]
    fn test_decode_add() {
        // ADD x1, x2, x3 (0x003100B3)
        let dec = decode32::<Rv64>(0x0031_00B3).unwrap();
        assert_eq!(dec.opid, OP_ADD);
        assert_eq!(
            dec.args,
            InstrArgs::R {
                rd: 1,
                rs1: 2,
                rs2: 3
            }
        );
    }

    #[test]
    fn test_decode_branch_imm() {
        // BEQ x1, x2, -4 (0xFE208EE3)
        let dec = decode32::<Rv64>(0xFE20_8EE3).unwrap();
        assert_eq!(dec.opid, OP_BEQ);
        assert_eq!(
            dec.args,
            InstrArgs::B {
                rs1: 1,
                rs2: 2,
                imm: -4
            }
        );
    }

    #[test]
    fn test_shamt_rv32_vs_rv64() {
        // slli x1, x1, 33 is only legal on RV64
        let raw = 0x13 | encode_rd(1) | encode_rs1(1) | (1 << 12) | (33 << 20);
        assert_eq!(decode32::<Rv64>(raw).unwrap().opid, OP_SLLI);
        assert!(decode32::<Rv32>(raw).is_none());
    }

    #[test]
    fn test_encode_round_trip() {
        for raw in [
            0x0031_00B3u32, // add x1, x2, x3
            0x4000_0533,    // sub a0, zero, zero
            0x0010_0093,    // addi x1, x0, 1
            0xFFF0_0E13,    // addi t3, zero, -1
            0x0123_4537,    // lui a0, 0x1234
            0x0000_A083,    // lw x1, 0(ra)
            0xFE11_2E23,    // sw ra, -4(sp)
            0xFE20_8EE3,    // beq x1, x2, -4
            0x0080_006F,    // jal x0, 8
            0x0001_00E7,    // jalr ra, 0(sp)
            0x0107_9793,    // slli a5, a5, 16
            0x4107_D793,    // srai a5, a5, 16
            0x0000_0073,    // ecall
            0x0FF0_000F,    // fence iorw, iorw
        ] {
            let dec = decode32::<Rv64>(raw).unwrap();
            assert_eq!(encode(&dec), Some(raw), "raw {raw:#010x}");
        }
    }

    #[test]
    fn test_encode_round_trip_rv64w() {
        for raw in [
            0x0000_059Bu32, // addiw a1, zero, 0
            0x0015_151B,    // slliw a0, a0, 1
            0x4100_D03B,    // sraw zero, ra, a6
            0x0000_3083,    // ld ra, 0(zero)
            0x00113023u32,  // sd ra, 0(sp)
        ] {
            let dec = decode32::<Rv64>(raw).unwrap();
            assert_eq!(encode(&dec), Some(raw), "raw {raw:#010x}");
        }
    }

    #[test]
    fn test_disasm() {
        let dec = decode32::<Rv64>(0x0031_00B3).unwrap();
        assert_eq!(disasm(&dec), "add ra, sp, gp");
        let dec = decode32::<Rv64>(0x0000_A083).unwrap();
        assert_eq!(disasm(&dec), "lw ra, 0(ra)");
    }
}
