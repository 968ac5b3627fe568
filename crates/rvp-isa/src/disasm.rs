//! Disassembly dispatch and pseudo-instruction pretty printing.

use crate::extensions::{a, base, c, d, f, m, zicsr};
use crate::{
    reg_name, DecodedInstr, InstrArgs, EXT_A, EXT_C, EXT_D, EXT_F, EXT_I, EXT_M, EXT_ZICSR,
};

/// Disassemble a decoded instruction.
pub fn disasm(instr: &DecodedInstr) -> String {
    match instr.opid.ext {
        EXT_I => base::disasm(instr),
        EXT_M => m::disasm(instr),
        EXT_A => a::disasm(instr),
        EXT_C => c::disasm(instr),
        EXT_ZICSR => zicsr::disasm(instr),
        EXT_F => f::disasm(instr),
        EXT_D => d::disasm(instr),
        _ => "illegal".to_string(),
    }
}

/// Disassemble, substituting the common assembler pseudo forms.
pub fn disasm_simple(instr: &DecodedInstr) -> String {
    pseudo(instr).unwrap_or_else(|| disasm(instr))
}

/// Recognize pseudo-instruction forms of a decoded instruction.
fn pseudo(instr: &DecodedInstr) -> Option<String> {
    let op = instr.opid;
    Some(match (op, instr.args) {
        (base::OP_ADDI, InstrArgs::I { rd: 0, rs1: 0, imm: 0 }) => "nop".to_string(),
        (base::OP_ADDI, InstrArgs::I { rd, rs1: 0, imm }) => {
            format!("li {}, {}", reg_name(rd), imm)
        }
        (base::OP_ADDI, InstrArgs::I { rd, rs1, imm: 0 }) => {
            format!("mv {}, {}", reg_name(rd), reg_name(rs1))
        }
        (base::OP_XORI, InstrArgs::I { rd, rs1, imm: -1 }) => {
            format!("not {}, {}", reg_name(rd), reg_name(rs1))
        }
        (base::OP_SUB, InstrArgs::R { rd, rs1: 0, rs2 }) => {
            format!("neg {}, {}", reg_name(rd), reg_name(rs2))
        }
        (base::OP_SLTIU, InstrArgs::I { rd, rs1, imm: 1 }) => {
            format!("seqz {}, {}", reg_name(rd), reg_name(rs1))
        }
        (base::OP_SLTU, InstrArgs::R { rd, rs1: 0, rs2 }) => {
            format!("snez {}, {}", reg_name(rd), reg_name(rs2))
        }
        (base::OP_JAL, InstrArgs::J { rd: 0, imm }) => format!("j {}", imm),
        (base::OP_JALR, InstrArgs::I { rd: 0, rs1: 1, imm: 0 }) => "ret".to_string(),
        (base::OP_JALR, InstrArgs::I { rd: 0, rs1, imm: 0 }) => {
            format!("jr {}", reg_name(rs1))
        }
        (base::OP_BEQ, InstrArgs::B { rs1, rs2: 0, imm }) => {
            format!("beqz {}, {}", reg_name(rs1), imm)
        }
        (base::OP_BNE, InstrArgs::B { rs1, rs2: 0, imm }) => {
            format!("bnez {}, {}", reg_name(rs1), imm)
        }
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, Isa, Rv64};

    #[test]
    fn test_pseudo_li() {
        // addi a0, zero, 42
        let dec = decode::<Rv64>(0x02A0_0513, 4, Isa::IMA);
        assert_eq!(disasm_simple(&dec), "li a0, 42");
        assert_eq!(disasm(&dec), "addi a0, zero, 42");
    }

    #[test]
    fn test_pseudo_ret() {
        // jalr zero, 0(ra)
        let dec = decode::<Rv64>(0x0000_8067, 4, Isa::IMA);
        assert_eq!(disasm_simple(&dec), "ret");
    }

    #[test]
    fn test_illegal_disasm() {
        let dec = decode::<Rv64>(0, 4, Isa::IMA);
        assert_eq!(disasm(&dec), "illegal");
    }
}
