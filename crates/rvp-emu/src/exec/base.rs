//! Base integer ISA semantics.

use super::ea;
use crate::processor::Processor;
use rvp_isa::extensions::base::*;
use rvp_isa::{DecodedInstr, InstrArgs, Xlen};

pub fn exec<X: Xlen>(p: &mut Processor<X>, d: &DecodedInstr) -> bool {
    let size = d.size;
    match (d.opid, d.args) {
        (OP_LUI, InstrArgs::U { rd, imm }) => {
            p.set_reg(rd, X::sign_extend_32(imm as u32));
        }
        (OP_AUIPC, InstrArgs::U { rd, imm }) => {
            let v = X::to_u64(p.pc).wrapping_add(imm as i64 as u64);
            p.set_reg(rd, X::from_u64(v));
        }

        // Control flow: pc is written here, not advanced below.
        (OP_JAL, InstrArgs::J { rd, imm }) => {
            let target = X::to_u64(p.pc).wrapping_add(imm as i64 as u64);
            let link = X::to_u64(p.pc).wrapping_add(size as u64);
            p.set_reg(rd, X::from_u64(link));
            p.pc = X::from_u64(target);
            return true;
        }
        (OP_JALR, InstrArgs::I { rd, rs1, imm }) => {
            let target = X::to_u64(p.get_reg(rs1))
                .wrapping_add(imm as i64 as u64)
                & !1;
            let link = X::to_u64(p.pc).wrapping_add(size as u64);
            p.set_reg(rd, X::from_u64(link));
            p.pc = X::from_u64(target);
            return true;
        }
        (OP_BEQ, InstrArgs::B { rs1, rs2, imm }) => {
            return branch(p, size, imm, p.get_reg(rs1) == p.get_reg(rs2));
        }
        (OP_BNE, InstrArgs::B { rs1, rs2, imm }) => {
            return branch(p, size, imm, p.get_reg(rs1) != p.get_reg(rs2));
        }
        (OP_BLT, InstrArgs::B { rs1, rs2, imm }) => {
            let taken = X::to_i64(p.get_reg(rs1)) < X::to_i64(p.get_reg(rs2));
            return branch(p, size, imm, taken);
        }
        (OP_BGE, InstrArgs::B { rs1, rs2, imm }) => {
            let taken = X::to_i64(p.get_reg(rs1)) >= X::to_i64(p.get_reg(rs2));
            return branch(p, size, imm, taken);
        }
        (OP_BLTU, InstrArgs::B { rs1, rs2, imm }) => {
            let taken = X::to_u64(p.get_reg(rs1)) < X::to_u64(p.get_reg(rs2));
            return branch(p, size, imm, taken);
        }
        (OP_BGEU, InstrArgs::B { rs1, rs2, imm }) => {
            let taken = X::to_u64(p.get_reg(rs1)) >= X::to_u64(p.get_reg(rs2));
            return branch(p, size, imm, taken);
        }

        // Loads
        (OP_LB, InstrArgs::I { rd, rs1, imm }) => {
            let v = p.read_u8(ea(p, rs1, imm)) as i8 as i64;
            p.set_reg(rd, X::from_u64(v as u64));
        }
        (OP_LH, InstrArgs::I { rd, rs1, imm }) => {
            let v = p.read_u16(ea(p, rs1, imm)) as i16 as i64;
            p.set_reg(rd, X::from_u64(v as u64));
        }
        (OP_LW, InstrArgs::I { rd, rs1, imm }) => {
            let v = p.read_u32(ea(p, rs1, imm)) as i32 as i64;
            p.set_reg(rd, X::from_u64(v as u64));
        }
        (OP_LD, InstrArgs::I { rd, rs1, imm }) => {
            let v = p.read_u64(ea(p, rs1, imm));
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_LBU, InstrArgs::I { rd, rs1, imm }) => {
            let v = p.read_u8(ea(p, rs1, imm)) as u64;
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_LHU, InstrArgs::I { rd, rs1, imm }) => {
            let v = p.read_u16(ea(p, rs1, imm)) as u64;
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_LWU, InstrArgs::I { rd, rs1, imm }) => {
            let v = p.read_u32(ea(p, rs1, imm)) as u64;
            p.set_reg(rd, X::from_u64(v));
        }

        // Stores
        (OP_SB, InstrArgs::S { rs1, rs2, imm }) => {
            let a = ea(p, rs1, imm);
            let v = X::to_u64(p.get_reg(rs2)) as u8;
            p.write_u8(a, v);
        }
        (OP_SH, InstrArgs::S { rs1, rs2, imm }) => {
            let a = ea(p, rs1, imm);
            let v = X::to_u64(p.get_reg(rs2)) as u16;
            p.write_u16(a, v);
        }
        (OP_SW, InstrArgs::S { rs1, rs2, imm }) => {
            let a = ea(p, rs1, imm);
            let v = X::truncate_to_32(p.get_reg(rs2));
            p.write_u32(a, v);
        }
        (OP_SD, InstrArgs::S { rs1, rs2, imm }) => {
            let a = ea(p, rs1, imm);
            let v = X::to_u64(p.get_reg(rs2));
            p.write_u64(a, v);
        }

        // ALU immediate
        (OP_ADDI, InstrArgs::I { rd, rs1, imm }) => {
            let v = X::to_u64(p.get_reg(rs1)).wrapping_add(imm as i64 as u64);
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_SLTI, InstrArgs::I { rd, rs1, imm }) => {
            let v = (X::to_i64(p.get_reg(rs1)) < imm as i64) as u64;
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_SLTIU, InstrArgs::I { rd, rs1, imm }) => {
            let rhs = X::to_u64(X::from_u64(imm as i64 as u64));
            let v = (X::to_u64(p.get_reg(rs1)) < rhs) as u64;
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_XORI, InstrArgs::I { rd, rs1, imm }) => {
            let v = X::to_u64(p.get_reg(rs1)) ^ imm as i64 as u64;
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_ORI, InstrArgs::I { rd, rs1, imm }) => {
            let v = X::to_u64(p.get_reg(rs1)) | imm as i64 as u64;
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_ANDI, InstrArgs::I { rd, rs1, imm }) => {
            let v = X::to_u64(p.get_reg(rs1)) & imm as i64 as u64;
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_SLLI, InstrArgs::I { rd, rs1, imm }) => {
            let v = X::to_u64(p.get_reg(rs1)) << (imm as u32 & X::SHIFT_MASK);
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_SRLI, InstrArgs::I { rd, rs1, imm }) => {
            let v = X::to_u64(p.get_reg(rs1)) >> (imm as u32 & X::SHIFT_MASK);
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_SRAI, InstrArgs::I { rd, rs1, imm }) => {
            let v = X::to_i64(p.get_reg(rs1)) >> (imm as u32 & X::SHIFT_MASK);
            p.set_reg(rd, X::from_u64(v as u64));
        }

        // ALU register
        (OP_ADD, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = X::to_u64(p.get_reg(rs1)).wrapping_add(X::to_u64(p.get_reg(rs2)));
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_SUB, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = X::to_u64(p.get_reg(rs1)).wrapping_sub(X::to_u64(p.get_reg(rs2)));
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_SLL, InstrArgs::R { rd, rs1, rs2 }) => {
            let sh = X::to_u64(p.get_reg(rs2)) as u32 & X::SHIFT_MASK;
            p.set_reg(rd, X::from_u64(X::to_u64(p.get_reg(rs1)) << sh));
        }
        (OP_SLT, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = (X::to_i64(p.get_reg(rs1)) < X::to_i64(p.get_reg(rs2))) as u64;
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_SLTU, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = (X::to_u64(p.get_reg(rs1)) < X::to_u64(p.get_reg(rs2))) as u64;
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_XOR, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = X::to_u64(p.get_reg(rs1)) ^ X::to_u64(p.get_reg(rs2));
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_SRL, InstrArgs::R { rd, rs1, rs2 }) => {
            let sh = X::to_u64(p.get_reg(rs2)) as u32 & X::SHIFT_MASK;
            p.set_reg(rd, X::from_u64(X::to_u64(p.get_reg(rs1)) >> sh));
        }
        (OP_SRA, InstrArgs::R { rd, rs1, rs2 }) => {
            let sh = X::to_u64(p.get_reg(rs2)) as u32 & X::SHIFT_MASK;
            let v = X::to_i64(p.get_reg(rs1)) >> sh;
            p.set_reg(rd, X::from_u64(v as u64));
        }
        (OP_OR, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = X::to_u64(p.get_reg(rs1)) | X::to_u64(p.get_reg(rs2));
            p.set_reg(rd, X::from_u64(v));
        }
        (OP_AND, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = X::to_u64(p.get_reg(rs1)) & X::to_u64(p.get_reg(rs2));
            p.set_reg(rd, X::from_u64(v));
        }

        // RV64 *W forms: compute in 32 bits, sign-extend the result.
        (OP_ADDIW, InstrArgs::I { rd, rs1, imm }) => {
            let v = X::truncate_to_32(p.get_reg(rs1)).wrapping_add(imm as u32);
            p.set_reg(rd, X::sign_extend_32(v));
        }
        (OP_SLLIW, InstrArgs::I { rd, rs1, imm }) => {
            let v = X::truncate_to_32(p.get_reg(rs1)) << (imm as u32 & 0x1F);
            p.set_reg(rd, X::sign_extend_32(v));
        }
        (OP_SRLIW, InstrArgs::I { rd, rs1, imm }) => {
            let v = X::truncate_to_32(p.get_reg(rs1)) >> (imm as u32 & 0x1F);
            p.set_reg(rd, X::sign_extend_32(v));
        }
        (OP_SRAIW, InstrArgs::I { rd, rs1, imm }) => {
            let v = (X::truncate_to_32(p.get_reg(rs1)) as i32) >> (imm as u32 & 0x1F);
            p.set_reg(rd, X::sign_extend_32(v as u32));
        }
        (OP_ADDW, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = X::truncate_to_32(p.get_reg(rs1))
                .wrapping_add(X::truncate_to_32(p.get_reg(rs2)));
            p.set_reg(rd, X::sign_extend_32(v));
        }
        (OP_SUBW, InstrArgs::R { rd, rs1, rs2 }) => {
            let v = X::truncate_to_32(p.get_reg(rs1))
                .wrapping_sub(X::truncate_to_32(p.get_reg(rs2)));
            p.set_reg(rd, X::sign_extend_32(v));
        }
        (OP_SLLW, InstrArgs::R { rd, rs1, rs2 }) => {
            let sh = X::to_u64(p.get_reg(rs2)) as u32 & 0x1F;
            let v = X::truncate_to_32(p.get_reg(rs1)) << sh;
            p.set_reg(rd, X::sign_extend_32(v));
        }
        (OP_SRLW, InstrArgs::R { rd, rs1, rs2 }) => {
            let sh = X::to_u64(p.get_reg(rs2)) as u32 & 0x1F;
            let v = X::truncate_to_32(p.get_reg(rs1)) >> sh;
            p.set_reg(rd, X::sign_extend_32(v));
        }
        (OP_SRAW, InstrArgs::R { rd, rs1, rs2 }) => {
            let sh = X::to_u64(p.get_reg(rs2)) as u32 & 0x1F;
            let v = (X::truncate_to_32(p.get_reg(rs1)) as i32) >> sh;
            p.set_reg(rd, X::sign_extend_32(v as u32));
        }

        // fence and ebreak retire as no-ops under a single coherent hart;
        // ecall is the stepper's business.
        (OP_FENCE, _) | (OP_EBREAK, _) => {}
        (OP_ECALL, _) => return false,

        _ => return false,
    }
    p.advance(size);
    true
}

/// Apply a conditional branch: taken sets `pc + sext(imm)`.
#[inline]
fn branch<X: Xlen>(p: &mut Processor<X>, size: u8, imm: i32, taken: bool) -> bool {
    if taken {
        let target = X::to_u64(p.pc).wrapping_add(imm as i64 as u64);
        p.pc = X::from_u64(target);
    } else {
        p.advance(size);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvp_isa::{decode, Isa, Rv32, Rv64};

    fn run<X: Xlen>(p: &mut Processor<X>, raw: u32) {
        let dec = decode::<X>(raw as u64, 4, Isa::IMAFDC);
        assert!(exec(p, &dec), "exec failed for {raw:#010x}");
    }

    #[test]
    fn test_add_wraps() {
        let mut p = Processor::<Rv64>::new();
        p.set_reg(6, i64::MAX as u64);
        p.set_reg(7, 1);
        // add x5, x6, x7
        run(&mut p, 0x0073_02B3);
        assert_eq!(p.get_reg(5), i64::MIN as u64);
        assert_eq!(p.pc, 4);
    }

    #[test]
    fn test_x0_stays_zero() {
        let mut p = Processor::<Rv64>::new();
        p.set_reg(1, 123);
        // addi x0, x1, 1
        run(&mut p, 0x0010_8013);
        assert_eq!(p.get_reg(0), 0);
    }

    #[test]
    fn test_shift_masking_rv32_vs_rv64() {
        // sll x5, x6, x7 = 0x007312B3
        let mut p64 = Processor::<Rv64>::new();
        p64.set_reg(6, 1);
        p64.set_reg(7, 64); // masked to 0
        run(&mut p64, 0x0073_12B3);
        assert_eq!(p64.get_reg(5), 1);
        p64.set_reg(7, 63);
        run(&mut p64, 0x0073_12B3);
        assert_eq!(p64.get_reg(5), 1 << 63);

        let mut p32 = Processor::<Rv32>::new();
        p32.set_reg(6, 1);
        p32.set_reg(7, 32); // masked to 0
        run(&mut p32, 0x0073_12B3);
        assert_eq!(p32.get_reg(5), 1);
        p32.set_reg(7, 33); // masked to 1
        run(&mut p32, 0x0073_12B3);
        assert_eq!(p32.get_reg(5), 2);
    }

    #[test]
    fn test_sra_sign_fills() {
        let mut p = Processor::<Rv32>::new();
        p.set_reg(6, 0x8000_0000);
        p.set_reg(7, 31);
        // sra x5, x6, x7 = 0x407352B3
        run(&mut p, 0x4073_52B3);
        assert_eq!(p.get_reg(5), 0xFFFF_FFFF);
    }

    #[test]
    fn test_addw_sign_extends() {
        let mut p = Processor::<Rv64>::new();
        p.set_reg(6, 0x7FFF_FFFF);
        p.set_reg(7, 1);
        // addw x5, x6, x7 = 0x007302BB
        run(&mut p, 0x0073_02BB);
        assert_eq!(p.get_reg(5), 0xFFFF_FFFF_8000_0000);
    }

    #[test]
    fn test_jal_links_and_jumps() {
        let mut p = Processor::<Rv64>::new();
        p.pc = 0x1000;
        // jal x1, 8 = 0x008000EF
        run(&mut p, 0x0080_00EF);
        assert_eq!(p.pc, 0x1008);
        assert_eq!(p.get_reg(1), 0x1004);
    }

    #[test]
    fn test_jalr_clears_low_bit() {
        let mut p = Processor::<Rv64>::new();
        p.pc = 0x1000;
        p.set_reg(2, 0x2001);
        // jalr x1, 0(x2) = 0x000100E7
        run(&mut p, 0x0001_00E7);
        assert_eq!(p.pc, 0x2000);
        assert_eq!(p.get_reg(1), 0x1004);
    }

    #[test]
    fn test_branch_taken_and_not() {
        let mut p = Processor::<Rv64>::new();
        p.pc = 0x1000;
        p.set_reg(1, 5);
        p.set_reg(2, 5);
        // beq x1, x2, 16 = 0x00208863
        run(&mut p, 0x0020_8863);
        assert_eq!(p.pc, 0x1010);
        p.set_reg(2, 6);
        run(&mut p, 0x0020_8863);
        assert_eq!(p.pc, 0x1014);
    }

    #[test]
    fn test_loads_and_stores() {
        let mut buf = [0u8; 32];
        let base = buf.as_mut_ptr() as u64;
        let mut p = Processor::<Rv64>::new();
        p.set_reg(2, base);
        p.set_reg(1, 0xFFFF_FFFF_FFFF_FF80);
        // sb x1, 0(x2) = 0x00110023
        run(&mut p, 0x0011_0023);
        // lb x3, 0(x2) = 0x00010183
        run(&mut p, 0x0001_0183);
        assert_eq!(p.get_reg(3), 0xFFFF_FFFF_FFFF_FF80);
        // lbu x3, 0(x2) = 0x00014183
        run(&mut p, 0x0001_4183);
        assert_eq!(p.get_reg(3), 0x80);
    }

    #[test]
    fn test_slti_signed_unsigned() {
        let mut p = Processor::<Rv64>::new();
        p.set_reg(1, u64::MAX); // -1 signed
        // slti x3, x1, 0 = 0x0000A193
        run(&mut p, 0x0000_A193);
        assert_eq!(p.get_reg(3), 1);
        // sltiu x3, x1, 0 = 0x0000B193
        run(&mut p, 0x0000_B193);
        assert_eq!(p.get_reg(3), 0);
    }
}
