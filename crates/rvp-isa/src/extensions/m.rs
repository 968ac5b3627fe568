//! M extension (multiply/divide) - decode, encode, disasm.

use crate::encode::*;
use crate::{reg_name, DecodedInstr, InstrArgs, OpId, Xlen, EXT_M};

pub const OP_MUL: OpId = OpId::new(EXT_M, 0);
pub const OP_MULH: OpId = OpId::new(EXT_M, 1);
pub const OP_MULHSU: OpId = OpId::new(EXT_M, 2);
pub const OP_MULHU: OpId = OpId::new(EXT_M, 3);
pub const OP_DIV: OpId = OpId::new(EXT_M, 4);
pub const OP_DIVU: OpId = OpId::new(EXT_M, 5);
pub const OP_REM: OpId = OpId::new(EXT_M, 6);
pub const OP_REMU: OpId = OpId::new(EXT_M, 7);

// RV64M W variants
pub const OP_MULW: OpId = OpId::new(EXT_M, 8);
pub const OP_DIVW: OpId = OpId::new(EXT_M, 9);
pub const OP_DIVUW: OpId = OpId::new(EXT_M, 10);
pub const OP_REMW: OpId = OpId::new(EXT_M, 11);
pub const OP_REMUW: OpId = OpId::new(EXT_M, 12);

/// Get the mnemonic for an M extension instruction.
pub fn m_mnemonic(opid: OpId) -> &'static str {
    const NAMES: [&str; 13] = [
        "mul", "mulh", "mulhsu", "mulhu", "div", "divu", "rem", "remu", "mulw", "divw",
        "divuw", "remw", "remuw",
    ];
    NAMES.get(opid.idx as usize).copied().unwrap_or("???")
}

/// Decode an M extension instruction (funct7 == 0x01 on OP/OP-32).
pub fn decode32<X: Xlen>(raw: u32) -> Option<DecodedInstr> {
    if decode_funct7(raw) != 0x01 {
        return None;
    }
    let funct3 = decode_funct3(raw);
    let rd = decode_rd(raw);
    let rs1 = decode_rs1(raw);
    let rs2 = decode_rs2(raw);

    let opid = match decode_opcode(raw) {
        0x33 => match funct3 {
            0 => OP_MUL,
            1 => OP_MULH,
            2 => OP_MULHSU,
            3 => OP_MULHU,
            4 => OP_DIV,
            5 => OP_DIVU,
            6 => OP_REM,
            7 => OP_REMU,
            _ => return None,
        },
        0x3B if X::VALUE == 64 => match funct3 {
            0 => OP_MULW,
            4 => OP_DIVW,
            5 => OP_DIVUW,
            6 => OP_REMW,
            7 => OP_REMUW,
            _ => return None,
        },
        _ => return None,
    };

    Some(DecodedInstr::new(
        opid,
        raw,
        4,
        InstrArgs::R { rd, rs1, rs2 },
    ))
}

/// Re-encode a decoded M instruction.
pub fn encode(instr: &DecodedInstr) -> Option<u32> {
    let (opcode, funct3) = match instr.opid {
        OP_MUL => (0x33, 0),
        OP_MULH => (0x33, 1),
        OP_MULHSU => (0x33, 2),
        OP_MULHU => (0x33, 3),
        OP_DIV => (0x33, 4),
        OP_DIVU => (0x33, 5),
        OP_REM => (0x33, 6),
        OP_REMU => (0x33, 7),
        OP_MULW => (0x3B, 0),
        OP_DIVW => (0x3B, 4),
        OP_DIVUW => (0x3B, 5),
        OP_REMW => (0x3B, 6),
        OP_REMUW => (0x3B, 7),
        _ => return None,
    };
    match instr.args {
        InstrArgs::R { rd, rs1, rs2 } => Some(
            opcode | (funct3 << 12) | (0x01 << 25) | encode_rd(rd) | encode_rs1(rs1)
                | encode_rs2(rs2),
        ),
        _ => None,
    }
}

/// Disassembly string for an M instruction.
pub fn disasm(instr: &DecodedInstr) -> String {
    let m = m_mnemonic(instr.opid);
    match instr.args {
        InstrArgs::R { rd, rs1, rs2 } => format!(
            "{} {}, {}, {}",
            m,
            reg_name(rd),
            reg_name(rs1),
            reg_name(rs2)
        ),
        _ => format!("{} <?>", m),
    }
}
