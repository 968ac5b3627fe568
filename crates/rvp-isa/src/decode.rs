//! Main instruction decoder.

use crate::extensions::{a, base, c, d, f, m, zicsr};
use crate::{Isa, OpId, Xlen, OP_ILLEGAL};

/// Decoded instruction with all fields extracted.
///
/// The record is position-independent: branch and jump targets are kept as
/// immediates relative to the (live) pc, never resolved at decode time.
/// This is what lets the decode cache key on raw instruction bits alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodedInstr {
    /// Instruction identifier.
    pub opid: OpId,
    /// Raw instruction word (compressed forms zero-extended to 32 bits).
    pub raw: u32,
    /// Instruction size in bytes (2 for compressed, 4 for normal).
    pub size: u8,
    /// Instruction arguments, shaped by the opcode's codec.
    pub args: InstrArgs,
}

/// Instruction argument patterns, one variant per operand codec.
///
/// Every opcode maps to exactly one variant; fields a codec does not name
/// do not exist on its variant, so an undefined operand read cannot be
/// expressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InstrArgs {
    /// R-type: rd, rs1, rs2
    R { rd: u8, rs1: u8, rs2: u8 },
    /// R4-type with rounding mode: rd, rs1, rs2, rs3, rm (fused FP ops)
    R4 {
        rd: u8,
        rs1: u8,
        rs2: u8,
        rs3: u8,
        rm: u8,
    },
    /// R-type with rounding mode: rd, rs1, rs2, rm (OP-FP)
    FpR { rd: u8, rs1: u8, rs2: u8, rm: u8 },
    /// I-type: rd, rs1, imm
    I { rd: u8, rs1: u8, imm: i32 },
    /// S-type: rs1, rs2, imm
    S { rs1: u8, rs2: u8, imm: i32 },
    /// B-type: rs1, rs2, imm
    B { rs1: u8, rs2: u8, imm: i32 },
    /// U-type: rd, imm
    U { rd: u8, imm: i32 },
    /// J-type: rd, imm
    J { rd: u8, imm: i32 },
    /// CSR: rd, rs1, csr
    Csr { rd: u8, rs1: u8, csr: u16 },
    /// CSRI: rd, zimm, csr
    CsrI { rd: u8, imm: u8, csr: u16 },
    /// AMO: rd, rs1, rs2, aq, rl
    Amo {
        rd: u8,
        rs1: u8,
        rs2: u8,
        aq: bool,
        rl: bool,
    },
    /// FENCE: predecessor/successor masks
    Fence { pred: u8, succ: u8 },
    /// No arguments (ECALL, EBREAK, etc.)
    #[default]
    None,
}

impl DecodedInstr {
    pub fn new(opid: OpId, raw: u32, size: u8, args: InstrArgs) -> Self {
        Self {
            opid,
            raw,
            size,
            args,
        }
    }

    /// An undecodable word of the given fetched size.
    pub fn illegal(raw: u32, size: u8) -> Self {
        Self {
            opid: OP_ILLEGAL,
            raw,
            size,
            args: InstrArgs::None,
        }
    }
}

/// Decode a fetched instruction word of the given length.
///
/// `size` comes from the length classifier. 48- and 64-bit forms have no
/// defined opcodes in the supported extensions and decode to `illegal`,
/// as does anything a disabled extension would be needed for.
pub fn decode<X: Xlen>(inst: u64, size: usize, isa: Isa) -> DecodedInstr {
    match size {
        2 if isa.c => c::decode16::<X>(inst as u16, isa)
            .and_then(c::decompress::<X>)
            .unwrap_or_else(|| DecodedInstr::illegal(inst as u32, 2)),
        2 => DecodedInstr::illegal(inst as u32, 2),
        4 => decode32::<X>(inst as u32, isa)
            .unwrap_or_else(|| DecodedInstr::illegal(inst as u32, 4)),
        n => DecodedInstr::illegal(inst as u32, n as u8),
    }
}

/// Decode a 32-bit instruction, trying each enabled extension in turn.
pub fn decode32<X: Xlen>(raw: u32, isa: Isa) -> Option<DecodedInstr> {
    base::decode32::<X>(raw)
        .or_else(|| m::decode32::<X>(raw))
        .or_else(|| a::decode32::<X>(raw))
        .or_else(|| zicsr::decode32::<X>(raw))
        .or_else(|| if isa.f { f::decode32::<X>(raw) } else { None })
        .or_else(|| if isa.d { d::decode32::<X>(raw) } else { None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{OP_ADDI, OP_ECALL, OP_FADD_S, OP_LD};
    use crate::{Rv32, Rv64};

    #[test]
    fn test_decode_addi() {
        // ADDI x1, x0, 1 (0x00100093)
        let dec = decode::<Rv64>(0x0010_0093, 4, Isa::IMA);
        assert_eq!(dec.opid, OP_ADDI);
        assert_eq!(dec.size, 4);
        assert_eq!(
            dec.args,
            InstrArgs::I {
                rd: 1,
                rs1: 0,
                imm: 1
            }
        );
    }

    #[test]
    fn test_decode_ecall() {
        let dec = decode::<Rv64>(0x0000_0073, 4, Isa::IMA);
        assert_eq!(dec.opid, OP_ECALL);
        assert_eq!(dec.args, InstrArgs::None);
    }

    #[test]
    fn test_zero_word_is_illegal() {
        let dec = decode::<Rv64>(0, 2, Isa::IMAFDC);
        assert_eq!(dec.opid, OP_ILLEGAL);
    }

    #[test]
    fn test_ld_is_rv64_only() {
        // ld x1, 0(x2) = 0x00013083
        assert_eq!(decode::<Rv64>(0x0001_3083, 4, Isa::IMA).opid, OP_LD);
        assert_eq!(decode::<Rv32>(0x0001_3083, 4, Isa::IMA).opid, OP_ILLEGAL);
    }

    #[test]
    fn test_fp_gated_by_isa() {
        // fadd.s f1, f2, f3 = 0x003100D3
        assert_eq!(
            decode::<Rv64>(0x0031_00D3, 4, Isa::IMAFD).opid,
            OP_FADD_S
        );
        assert_eq!(
            decode::<Rv64>(0x0031_00D3, 4, Isa::IMA).opid,
            OP_ILLEGAL
        );
    }

    #[test]
    fn test_compressed_gated_by_isa() {
        // c.nop = 0x0001
        assert_eq!(decode::<Rv64>(0x0001, 2, Isa::IMA).opid, OP_ILLEGAL);
        assert_ne!(decode::<Rv64>(0x0001, 2, Isa::IMAC).opid, OP_ILLEGAL);
    }
}
