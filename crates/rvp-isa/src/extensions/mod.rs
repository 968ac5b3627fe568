//! RISC-V instruction set extensions.
//!
//! Each extension provides decode, encode and disasm in a single file.
//! All instruction sets (including base I) are implemented as extensions -
//! there is no special "built-in" handling. The per-module `decode32`/
//! `encode`/`disasm` entry points stay module-qualified; only opcode ids
//! and the odd helper are re-exported flat.

pub mod a;
pub mod base;
pub mod c;
pub mod d;
pub mod f;
pub mod m;
pub mod zicsr;

pub use base::{
    base_mnemonic, OP_ADD, OP_ADDI, OP_ADDIW, OP_ADDW, OP_AND, OP_ANDI, OP_AUIPC, OP_BEQ,
    OP_BGE, OP_BGEU, OP_BLT, OP_BLTU, OP_BNE, OP_EBREAK, OP_ECALL, OP_FENCE, OP_JAL, OP_JALR,
    OP_LB, OP_LBU, OP_LD, OP_LH, OP_LHU, OP_LUI, OP_LW, OP_LWU, OP_OR, OP_ORI, OP_SB, OP_SD,
    OP_SH, OP_SLL, OP_SLLI, OP_SLLIW, OP_SLLW, OP_SLT, OP_SLTI, OP_SLTIU, OP_SLTU, OP_SRA,
    OP_SRAI, OP_SRAIW, OP_SRAW, OP_SRL, OP_SRLI, OP_SRLIW, OP_SRLW, OP_SUB, OP_SUBW, OP_SW,
    OP_XOR, OP_XORI,
};

pub use m::{
    m_mnemonic, OP_DIV, OP_DIVU, OP_DIVUW, OP_DIVW, OP_MUL, OP_MULH, OP_MULHSU, OP_MULHU,
    OP_MULW, OP_REM, OP_REMU, OP_REMUW, OP_REMW,
};

pub use a::{
    a_mnemonic, OP_AMOADD_D, OP_AMOADD_W, OP_AMOAND_D, OP_AMOAND_W, OP_AMOMAXU_D,
    OP_AMOMAXU_W, OP_AMOMAX_D, OP_AMOMAX_W, OP_AMOMINU_D, OP_AMOMINU_W, OP_AMOMIN_D,
    OP_AMOMIN_W, OP_AMOOR_D, OP_AMOOR_W, OP_AMOSWAP_D, OP_AMOSWAP_W, OP_AMOXOR_D,
    OP_AMOXOR_W, OP_LR_D, OP_LR_W, OP_SC_D, OP_SC_W,
};

pub use c::{
    c_mnemonic, compress_op, decompress_op_rv32, decompress_op_rv64, OP_C_ADD, OP_C_ADDI,
    OP_C_ADDI16SP, OP_C_ADDI4SPN, OP_C_ADDIW, OP_C_ADDW, OP_C_AND, OP_C_ANDI, OP_C_BEQZ,
    OP_C_BNEZ, OP_C_EBREAK, OP_C_FLD, OP_C_FLDSP, OP_C_FLW, OP_C_FLWSP, OP_C_FSD, OP_C_FSDSP,
    OP_C_FSW, OP_C_FSWSP, OP_C_J, OP_C_JAL, OP_C_JALR, OP_C_JR, OP_C_LD, OP_C_LDSP, OP_C_LI,
    OP_C_LUI, OP_C_LW, OP_C_LWSP, OP_C_MV, OP_C_NOP, OP_C_SD, OP_C_SDSP, OP_C_SLLI,
    OP_C_SRAI, OP_C_SRLI, OP_C_SUB, OP_C_SUBW, OP_C_SW, OP_C_SWSP, OP_C_XOR,
};

pub use f::{
    f_mnemonic, OP_FADD_S, OP_FCLASS_S, OP_FCVT_LU_S, OP_FCVT_L_S, OP_FCVT_S_L, OP_FCVT_S_LU,
    OP_FCVT_S_W, OP_FCVT_S_WU, OP_FCVT_WU_S, OP_FCVT_W_S, OP_FDIV_S, OP_FEQ_S, OP_FLE_S,
    OP_FLT_S, OP_FLW, OP_FMADD_S, OP_FMAX_S, OP_FMIN_S, OP_FMSUB_S, OP_FMUL_S, OP_FMV_W_X,
    OP_FMV_X_W, OP_FNMADD_S, OP_FNMSUB_S, OP_FSGNJN_S, OP_FSGNJX_S, OP_FSGNJ_S, OP_FSQRT_S,
    OP_FSUB_S, OP_FSW,
};

pub use d::{
    d_mnemonic, OP_FADD_D, OP_FCLASS_D, OP_FCVT_D_L, OP_FCVT_D_LU, OP_FCVT_D_S, OP_FCVT_D_W,
    OP_FCVT_D_WU, OP_FCVT_LU_D, OP_FCVT_L_D, OP_FCVT_S_D, OP_FCVT_WU_D, OP_FCVT_W_D,
    OP_FDIV_D, OP_FEQ_D, OP_FLD, OP_FLE_D, OP_FLT_D, OP_FMADD_D, OP_FMAX_D, OP_FMIN_D,
    OP_FMSUB_D, OP_FMUL_D, OP_FMV_D_X, OP_FMV_X_D, OP_FNMADD_D, OP_FNMSUB_D, OP_FSD,
    OP_FSGNJN_D, OP_FSGNJX_D, OP_FSGNJ_D, OP_FSQRT_D, OP_FSUB_D,
};

pub use zicsr::{
    csr_name, zicsr_mnemonic, CSR_CYCLE, CSR_FCSR, CSR_FFLAGS, CSR_FRM, CSR_INSTRET,
    CSR_TIME, OP_CSRRC, OP_CSRRCI, OP_CSRRS, OP_CSRRSI, OP_CSRRW, OP_CSRRWI, OP_FENCE_I,
};
