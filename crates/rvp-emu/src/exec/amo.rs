//! A extension semantics.
//!
//! Single hart on coherent host memory: every AMO is a plain
//! load-modify-store and the aq/rl bits are accepted and ignored. LR/SC
//! use the processor's reservation; stores into the reservation granule
//! and every SC attempt clear it.

use crate::processor::Processor;
use rvp_isa::extensions::a::*;
use rvp_isa::{DecodedInstr, InstrArgs, Xlen};

pub fn exec<X: Xlen>(p: &mut Processor<X>, d: &DecodedInstr) -> bool {
    let InstrArgs::Amo { rd, rs1, rs2, .. } = d.args else {
        return false;
    };
    let addr = X::to_u64(p.get_reg(rs1));

    match d.opid {
        OP_LR_W => {
            let v = p.read_u32(addr) as i32 as i64;
            p.set_reg(rd, X::from_u64(v as u64));
            p.set_reservation(addr);
        }
        OP_SC_W => {
            let ok = p.take_reservation() == Some(addr);
            if ok {
                let v = X::truncate_to_32(p.get_reg(rs2));
                p.write_u32(addr, v);
            }
            p.set_reg(rd, X::from_u64(!ok as u64));
        }
        OP_LR_D => {
            let v = p.read_u64(addr);
            p.set_reg(rd, X::from_u64(v));
            p.set_reservation(addr);
        }
        OP_SC_D => {
            let ok = p.take_reservation() == Some(addr);
            if ok {
                p.write_u64(addr, X::to_u64(p.get_reg(rs2)));
            }
            p.set_reg(rd, X::from_u64(!ok as u64));
        }

        OP_AMOSWAP_W | OP_AMOADD_W | OP_AMOXOR_W | OP_AMOAND_W | OP_AMOOR_W | OP_AMOMIN_W
        | OP_AMOMAX_W | OP_AMOMINU_W | OP_AMOMAXU_W => {
            let old = p.read_u32(addr);
            let src = X::truncate_to_32(p.get_reg(rs2));
            let new = match d.opid {
                OP_AMOSWAP_W => src,
                OP_AMOADD_W => old.wrapping_add(src),
                OP_AMOXOR_W => old ^ src,
                OP_AMOAND_W => old & src,
                OP_AMOOR_W => old | src,
                OP_AMOMIN_W => (old as i32).min(src as i32) as u32,
                OP_AMOMAX_W => (old as i32).max(src as i32) as u32,
                OP_AMOMINU_W => old.min(src),
                _ => old.max(src),
            };
            p.write_u32(addr, new);
            p.set_reg(rd, X::sign_extend_32(old));
        }

        OP_AMOSWAP_D | OP_AMOADD_D | OP_AMOXOR_D | OP_AMOAND_D | OP_AMOOR_D | OP_AMOMIN_D
        | OP_AMOMAX_D | OP_AMOMINU_D | OP_AMOMAXU_D => {
            let old = p.read_u64(addr);
            let src = X::to_u64(p.get_reg(rs2));
            let new = match d.opid {
                OP_AMOSWAP_D => src,
                OP_AMOADD_D => old.wrapping_add(src),
                OP_AMOXOR_D => old ^ src,
                OP_AMOAND_D => old & src,
                OP_AMOOR_D => old | src,
                OP_AMOMIN_D => (old as i64).min(src as i64) as u64,
                OP_AMOMAX_D => (old as i64).max(src as i64) as u64,
                OP_AMOMINU_D => old.min(src),
                _ => old.max(src),
            };
            p.write_u64(addr, new);
            p.set_reg(rd, X::from_u64(old));
        }
        _ => return false,
    }

    p.advance(d.size);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvp_isa::{decode, Isa, Rv64};

    fn run(p: &mut Processor<rvp_isa::Rv64>, raw: u32) {
        let dec = decode::<Rv64>(raw as u64, 4, Isa::IMAFDC);
        assert!(exec(p, &dec));
    }

    // x5 = result, address in x6, source in x7
    const LR_W: u32 = 0x1003_22AF;
    const SC_W: u32 = 0x1873_22AF;
    const AMOADD_W: u32 = 0x0073_22AF;
    const AMOMAXU_W: u32 = 0xE073_22AF;

    #[test]
    fn test_lr_sc_success() {
        let mut buf = [0u8; 16];
        let base = buf.as_mut_ptr() as u64;
        let mut p = Processor::<Rv64>::new();
        p.write_u32(base, 41);
        p.set_reg(6, base);
        p.set_reg(7, 42);

        run(&mut p, LR_W);
        assert_eq!(p.get_reg(5), 41);
        run(&mut p, SC_W);
        assert_eq!(p.get_reg(5), 0); // success writes 0
        assert_eq!(p.read_u32(base), 42);
    }

    #[test]
    fn test_sc_fails_after_intervening_store() {
        let mut buf = [0u8; 16];
        let base = buf.as_mut_ptr() as u64;
        let mut p = Processor::<Rv64>::new();
        p.set_reg(6, base);
        p.set_reg(7, 42);

        run(&mut p, LR_W);
        p.write_u32(base, 7); // clears the reservation
        run(&mut p, SC_W);
        assert_eq!(p.get_reg(5), 1); // failure writes nonzero
        assert_eq!(p.read_u32(base), 7);
    }

    #[test]
    fn test_sc_fails_without_reservation() {
        let mut buf = [0u8; 16];
        let base = buf.as_mut_ptr() as u64;
        let mut p = Processor::<Rv64>::new();
        p.set_reg(6, base);
        p.set_reg(7, 42);
        run(&mut p, SC_W);
        assert_eq!(p.get_reg(5), 1);
    }

    #[test]
    fn test_sc_consumed_by_sc() {
        let mut buf = [0u8; 16];
        let base = buf.as_mut_ptr() as u64;
        let mut p = Processor::<Rv64>::new();
        p.set_reg(6, base);
        p.set_reg(7, 42);
        run(&mut p, LR_W);
        run(&mut p, SC_W);
        assert_eq!(p.get_reg(5), 0);
        // A second SC without a fresh LR fails.
        run(&mut p, SC_W);
        assert_eq!(p.get_reg(5), 1);
    }

    #[test]
    fn test_amoadd_and_maxu() {
        let mut buf = [0u8; 16];
        let base = buf.as_mut_ptr() as u64;
        let mut p = Processor::<Rv64>::new();
        p.write_u32(base, 0xFFFF_FFF0);
        p.set_reg(6, base);
        p.set_reg(7, 0x20);

        run(&mut p, AMOADD_W);
        // old value sign-extends into rd
        assert_eq!(p.get_reg(5), 0xFFFF_FFFF_FFFF_FFF0);
        assert_eq!(p.read_u32(base), 0x10);

        p.write_u32(base, 5);
        run(&mut p, AMOMAXU_W);
        assert_eq!(p.read_u32(base), 0x20);
        assert_eq!(p.get_reg(5), 5);
    }
}
