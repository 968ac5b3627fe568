//! A extension (atomics) - decode, encode, disasm.

use crate::encode::*;
use crate::{reg_name, DecodedInstr, InstrArgs, OpId, Xlen, EXT_A};

pub const OP_LR_W: OpId = OpId::new(EXT_A, 0);
pub const OP_SC_W: OpId = OpId::new(EXT_A, 1);
pub const OP_AMOSWAP_W: OpId = OpId::new(EXT_A, 2);
pub const OP_AMOADD_W: OpId = OpId::new(EXT_A, 3);
pub const OP_AMOXOR_W: OpId = OpId::new(EXT_A, 4);
pub const OP_AMOAND_W: OpId = OpId::new(EXT_A, 5);
pub const OP_AMOOR_W: OpId = OpId::new(EXT_A, 6);
pub const OP_AMOMIN_W: OpId = OpId::new(EXT_A, 7);
pub const OP_AMOMAX_W: OpId = OpId::new(EXT_A, 8);
pub const OP_AMOMINU_W: OpId = OpId::new(EXT_A, 9);
pub const OP_AMOMAXU_W: OpId = OpId::new(EXT_A, 10);

// RV64A
pub const OP_LR_D: OpId = OpId::new(EXT_A, 11);
pub const OP_SC_D: OpId = OpId::new(EXT_A, 12);
pub const OP_AMOSWAP_D: OpId = OpId::new(EXT_A, 13);
pub const OP_AMOADD_D: OpId = OpId::new(EXT_A, 14);
pub const OP_AMOXOR_D: OpId = OpId::new(EXT_A, 15);
pub const OP_AMOAND_D: OpId = OpId::new(EXT_A, 16);
pub const OP_AMOOR_D: OpId = OpId::new(EXT_A, 17);
pub const OP_AMOMIN_D: OpId = OpId::new(EXT_A, 18);
pub const OP_AMOMAX_D: OpId = OpId::new(EXT_A, 19);
pub const OP_AMOMINU_D: OpId = OpId::new(EXT_A, 20);
pub const OP_AMOMAXU_D: OpId = OpId::new(EXT_A, 21);

/// Get the mnemonic for an A extension instruction.
pub fn a_mnemonic(opid: OpId) -> &'static str {
    const NAMES: [&str; 22] = [
        "lr.w", "sc.w", "amoswap.w", "amoadd.w", "amoxor.w", "amoand.w", "amoor.w",
        "amomin.w", "amomax.w", "amominu.w", "amomaxu.w", "lr.d", "sc.d", "amoswap.d",
        "amoadd.d", "amoxor.d", "amoand.d", "amoor.d", "amomin.d", "amomax.d", "amominu.d",
        "amomaxu.d",
    ];
    NAMES.get(opid.idx as usize).copied().unwrap_or("???")
}

/// funct5 selector for each AMO, shared by decode and encode.
const FUNCT5: [(u8, u8); 11] = [
    (0x02, 0),  // lr
    (0x03, 1),  // sc
    (0x01, 2),  // amoswap
    (0x00, 3),  // amoadd
    (0x04, 4),  // amoxor
    (0x0C, 5),  // amoand
    (0x08, 6),  // amoor
    (0x10, 7),  // amomin
    (0x14, 8),  // amomax
    (0x18, 9),  // amominu
    (0x1C, 10), // amomaxu
];

/// Decode an A extension instruction (opcode 0x2F).
pub fn decode32<X: Xlen>(raw: u32) -> Option<DecodedInstr> {
    if decode_opcode(raw) != 0x2F {
        return None;
    }
    let width = decode_funct3(raw);
    // Only .W, and .D on RV64
    let is_64 = match width {
        2 => false,
        3 if X::VALUE == 64 => true,
        _ => return None,
    };

    let funct5 = ((raw >> 27) & 0x1F) as u8;
    let idx = FUNCT5.iter().find(|(f5, _)| *f5 == funct5)?.1;
    let opid = OpId::new(EXT_A, if is_64 { idx + 11 } else { idx });

    let rd = decode_rd(raw);
    let rs1 = decode_rs1(raw);
    let rs2 = decode_rs2(raw);
    // lr has no rs2; the field must be zero
    if funct5 == 0x02 && rs2 != 0 {
        return None;
    }

    Some(DecodedInstr::new(
        opid,
        raw,
        4,
        InstrArgs::Amo {
            rd,
            rs1,
            rs2,
            aq: (raw >> 26) & 1 != 0,
            rl: (raw >> 25) & 1 != 0,
        },
    ))
}

/// Re-encode a decoded A instruction.
pub fn encode(instr: &DecodedInstr) -> Option<u32> {
    if instr.opid.ext != EXT_A {
        return None;
    }
    let idx = instr.opid.idx;
    let (funct5, _) = FUNCT5.get((idx % 11) as usize)?;
    let width: u32 = if idx >= 11 { 3 } else { 2 };
    match instr.args {
        InstrArgs::Amo {
            rd,
            rs1,
            rs2,
            aq,
            rl,
        } => Some(
            0x2F | (width << 12)
                | ((*funct5 as u32) << 27)
                | ((aq as u32) << 26)
                | ((rl as u32) << 25)
                | encode_rd(rd)
                | encode_rs1(rs1)
                | encode_rs2(rs2),
        ),
        _ => None,
    }
}

/// Disassembly string for an A instruction.
pub fn disasm(instr: &DecodedInstr) -> String {
    let m = a_mnemonic(instr.opid);
    match instr.args {
        InstrArgs::Amo {
            rd,
            rs1,
            rs2,
            aq,
            rl,
        } => {
            let suffix = match (aq, rl) {
                (true, true) => ".aqrl",
                (true, false) => ".aq",
                (false, true) => ".rl",
                (false, false) => "",
            };
            if matches!(instr.opid, OP_LR_W | OP_LR_D) {
                format!("{}{} {}, ({})", m, suffix, reg_name(rd), reg_name(rs1))
            } else {
                format!(
                    "{}{} {}, {}, ({})",
                    m,
                    suffix,
                    reg_name(rd),
                    reg_name(rs2),
                    reg_name(rs1)
                )
            }
        }
        _ => format!("{} <?>", m),
    }
}
