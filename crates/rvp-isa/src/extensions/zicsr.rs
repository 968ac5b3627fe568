//! Zicsr/Zifencei - CSR access instructions and fence.i.

use crate::encode::*;
use crate::{reg_name, DecodedInstr, InstrArgs, OpId, Xlen, EXT_ZICSR};

pub const OP_CSRRW: OpId = OpId::new(EXT_ZICSR, 0);
pub const OP_CSRRS: OpId = OpId::new(EXT_ZICSR, 1);
pub const OP_CSRRC: OpId = OpId::new(EXT_ZICSR, 2);
pub const OP_CSRRWI: OpId = OpId::new(EXT_ZICSR, 3);
pub const OP_CSRRSI: OpId = OpId::new(EXT_ZICSR, 4);
pub const OP_CSRRCI: OpId = OpId::new(EXT_ZICSR, 5);
pub const OP_FENCE_I: OpId = OpId::new(EXT_ZICSR, 6);

// User-visible CSR numbers
pub const CSR_FFLAGS: u16 = 0x001;
pub const CSR_FRM: u16 = 0x002;
pub const CSR_FCSR: u16 = 0x003;
pub const CSR_CYCLE: u16 = 0xC00;
pub const CSR_TIME: u16 = 0xC01;
pub const CSR_INSTRET: u16 = 0xC02;

/// Get the mnemonic for a Zicsr/Zifencei instruction.
pub fn zicsr_mnemonic(opid: OpId) -> &'static str {
    const NAMES: [&str; 7] = [
        "csrrw", "csrrs", "csrrc", "csrrwi", "csrrsi", "csrrci", "fence.i",
    ];
    NAMES.get(opid.idx as usize).copied().unwrap_or("???")
}

/// Get a CSR's name for disassembly.
pub fn csr_name(csr: u16) -> Option<&'static str> {
    Some(match csr {
        CSR_FFLAGS => "fflags",
        CSR_FRM => "frm",
        CSR_FCSR => "fcsr",
        CSR_CYCLE => "cycle",
        CSR_TIME => "time",
        CSR_INSTRET => "instret",
        _ => return None,
    })
}

/// Decode a CSR instruction or fence.i.
pub fn decode32<X: Xlen>(raw: u32) -> Option<DecodedInstr> {
    let funct3 = decode_funct3(raw);
    let rd = decode_rd(raw);
    let rs1 = decode_rs1(raw);
    let csr = ((raw >> 20) & 0xFFF) as u16;

    let (opid, args) = match decode_opcode(raw) {
        0x0F if funct3 == 1 => (OP_FENCE_I, InstrArgs::None),
        0x73 => match funct3 {
            1 => (OP_CSRRW, InstrArgs::Csr { rd, rs1, csr }),
            2 => (OP_CSRRS, InstrArgs::Csr { rd, rs1, csr }),
            3 => (OP_CSRRC, InstrArgs::Csr { rd, rs1, csr }),
            5 => (OP_CSRRWI, InstrArgs::CsrI { rd, imm: rs1, csr }),
            6 => (OP_CSRRSI, InstrArgs::CsrI { rd, imm: rs1, csr }),
            7 => (OP_CSRRCI, InstrArgs::CsrI { rd, imm: rs1, csr }),
            _ => return None,
        },
        _ => return None,
    };

    Some(DecodedInstr::new(opid, raw, 4, args))
}

/// Re-encode a decoded Zicsr/Zifencei instruction.
pub fn encode(instr: &DecodedInstr) -> Option<u32> {
    let funct3: u32 = match instr.opid {
        OP_CSRRW => 1,
        OP_CSRRS => 2,
        OP_CSRRC => 3,
        OP_CSRRWI => 5,
        OP_CSRRSI => 6,
        OP_CSRRCI => 7,
        OP_FENCE_I => return Some(0x0F | 1 << 12),
        _ => return None,
    };
    match instr.args {
        InstrArgs::Csr { rd, rs1, csr } => Some(
            0x73 | funct3 << 12 | encode_rd(rd) | encode_rs1(rs1) | (csr as u32) << 20,
        ),
        InstrArgs::CsrI { rd, imm, csr } => Some(
            0x73 | funct3 << 12 | encode_rd(rd) | encode_rs1(imm) | (csr as u32) << 20,
        ),
        _ => None,
    }
}

/// Disassembly string for a Zicsr instruction.
pub fn disasm(instr: &DecodedInstr) -> String {
    let m = zicsr_mnemonic(instr.opid);
    let csr_str = |csr: u16| {
        csr_name(csr)
            .map(str::to_string)
            .unwrap_or_else(|| format!("0x{csr:03x}"))
    };
    match instr.args {
        InstrArgs::Csr { rd, rs1, csr } => format!(
            "{} {}, {}, {}",
            m,
            reg_name(rd),
            csr_str(csr),
            reg_name(rs1)
        ),
        InstrArgs::CsrI { rd, imm, csr } => {
            format!("{} {}, {}, {}", m, reg_name(rd), csr_str(csr), imm)
        }
        _ => m.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rv64;

    #[test]
    fn test_decode_csrrs() {
        // csrrs x5, fcsr, x0 (frcsr) = 0x003022F3
        let dec = decode32::<Rv64>(0x0030_22F3).unwrap();
        assert_eq!(dec.opid, OP_CSRRS);
        assert_eq!(
            dec.args,
            InstrArgs::Csr {
                rd: 5,
                rs1: 0,
                csr: CSR_FCSR
            }
        );
    }

    #[test]
    fn test_decode_fence_i() {
        let dec = decode32::<Rv64>(0x0000_100F).unwrap();
        assert_eq!(dec.opid, OP_FENCE_I);
    }

    #[test]
    fn test_encode_round_trip() {
        // csrrwi x0, fflags, 3 = 0x0011D073
        for raw in [0x0030_22F3u32, 0x0011_D073] {
            let dec = decode32::<Rv64>(raw).unwrap();
            assert_eq!(encode(&dec), Some(raw), "raw {raw:#010x}");
        }
    }
}
