//! End-to-end scenarios against synthesized ELF executables.
//!
//! These tests claim fixed guest address ranges (the load address and the
//! stack top), so they serialize on a process-wide lock and each emulator
//! is dropped, releasing its mappings, before the lock is released.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};

use rvp_emu::{Emulator, Fault};
use rvp_isa::{Isa, Rv64};

/// Guest load address for the synthesized executables. Far below the
/// host's own mappings, above `mmap_min_addr`.
const LOAD_ADDR: u64 = 0x20000;

fn fixed_range_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Mutex::new(()));
    // A poisoned lock only means another test failed.
    lock.lock().unwrap_or_else(|e| e.into_inner())
}

/// Build a minimal static RV64 ELF: one RWX PT_LOAD holding `payload` at
/// `LOAD_ADDR`, entry at its start.
fn write_elf(name: &str, payload: &[u8]) -> PathBuf {
    const ELF_MAGIC: u32 = 0x464C_457F;
    const EM_RISCV: u16 = 243;
    const PT_LOAD: u32 = 1;
    const PF_RWX: u32 = 7;

    let mut data = vec![0u8; 0x1000 + payload.len()];
    data[0..4].copy_from_slice(&ELF_MAGIC.to_le_bytes());
    data[4] = 2; // ELFCLASS64
    data[5] = 1; // little-endian
    data[6] = 1; // version
    data[16..18].copy_from_slice(&2u16.to_le_bytes()); // ET_EXEC
    data[18..20].copy_from_slice(&EM_RISCV.to_le_bytes());
    data[24..32].copy_from_slice(&LOAD_ADDR.to_le_bytes()); // e_entry
    data[32..40].copy_from_slice(&64u64.to_le_bytes()); // e_phoff
    data[54..56].copy_from_slice(&56u16.to_le_bytes()); // e_phentsize
    data[56..58].copy_from_slice(&1u16.to_le_bytes()); // e_phnum

    let ph = 64;
    data[ph..ph + 4].copy_from_slice(&PT_LOAD.to_le_bytes());
    data[ph + 4..ph + 8].copy_from_slice(&PF_RWX.to_le_bytes());
    data[ph + 8..ph + 16].copy_from_slice(&0x1000u64.to_le_bytes()); // offset
    data[ph + 16..ph + 24].copy_from_slice(&LOAD_ADDR.to_le_bytes()); // vaddr
    data[ph + 32..ph + 40].copy_from_slice(&(payload.len() as u64).to_le_bytes()); // filesz
    data[ph + 40..ph + 48].copy_from_slice(&(payload.len() as u64).to_le_bytes()); // memsz

    data[0x1000..0x1000 + payload.len()].copy_from_slice(payload);

    let path = std::env::temp_dir().join(format!("rvp-{}-{}.elf", name, std::process::id()));
    std::fs::write(&path, data).expect("write test elf");
    path
}

fn words(ws: &[u32]) -> Vec<u8> {
    ws.iter().flat_map(|w| w.to_le_bytes()).collect()
}

fn run_elf(name: &str, payload: &[u8], isa: Isa) -> Result<i32, Fault> {
    let path = write_elf(name, payload);
    let mut emu = Emulator::<Rv64>::new(isa);
    emu.load(&path).expect("load test elf");
    let result = emu.run();
    drop(emu);
    let _ = std::fs::remove_file(&path);
    result
}

#[test]
fn scenario_exit_status() {
    let _guard = fixed_range_lock();
    // li a7, 93; li a0, 0; ecall
    let code = words(&[0x05D0_0893, 0x0000_0513, 0x0000_0073]);
    assert_eq!(run_elf("exit", &code, Isa::IMAFDC), Ok(0));
}

#[test]
fn scenario_write_stdout() {
    let _guard = fixed_range_lock();
    // "hello" sits right after the code; a1 is formed pc-relative.
    let mut code = words(&[
        0x0000_0597, // auipc a1, 0
        0x0245_8593, // addi a1, a1, 36
        0x0010_0513, // li a0, 1
        0x0050_0613, // li a2, 5
        0x0400_0893, // li a7, 64
        0x0000_0073, // ecall (write)
        0x0000_0513, // li a0, 0
        0x05D0_0893, // li a7, 93
        0x0000_0073, // ecall (exit)
    ]);
    code.extend_from_slice(b"hello");
    assert_eq!(run_elf("write", &code, Isa::IMAFDC), Ok(0));
}

#[test]
fn scenario_write_result_in_a0() {
    let _guard = fixed_range_lock();
    // Exit status is write's return value: 5 bytes written.
    let mut code = words(&[
        0x0000_0597, // auipc a1, 0
        0x0245_8593, // addi a1, a1, 36
        0x0010_0513, // li a0, 1
        0x0050_0613, // li a2, 5
        0x0400_0893, // li a7, 64
        0x0000_0073, // ecall (write), a0 = 5
        0x05D0_0893, // li a7, 93
        0x0000_0073, // ecall (exit 5)
        0x0000_0013, // nop (padding so the data offset matches)
    ]);
    code.extend_from_slice(b"hello");
    assert_eq!(run_elf("write-ret", &code, Isa::IMAFDC), Ok(5));
}

#[test]
fn scenario_brk_growth() {
    let _guard = fixed_range_lock();
    // b = brk(0); brk(b + 0x2000); poke b + 0x1fff; exit with the byte.
    let code = words(&[
        0x0D60_0893, // li a7, 214
        0x0000_0513, // li a0, 0
        0x0000_0073, // ecall (brk query) -> a0 = b
        0x0005_0413, // mv s0, a0
        0x0000_22B7, // lui t0, 0x2 -> t0 = 0x2000
        0x0054_0533, // add a0, s0, t0
        0x0D60_0893, // li a7, 214
        0x0000_0073, // ecall (brk grow)
        0x0054_0333, // add t1, s0, t0
        0xFFF3_0313, // addi t1, t1, -1 -> b + 0x1fff
        0x0AB0_0393, // li t2, 0xAB
        0x0073_0023, // sb t2, 0(t1)
        0x0003_4503, // lbu a0, 0(t1)
        0x05D0_0893, // li a7, 93
        0x0000_0073, // ecall (exit)
    ]);
    assert_eq!(run_elf("brk", &code, Isa::IMAFDC), Ok(0xAB));
}

#[test]
fn scenario_rvc_equivalence() {
    let _guard = fixed_range_lock();
    // addi a0, a0, 4 expanded...
    let wide = words(&[
        0x02A0_0513, // li a0, 42
        0x0045_0513, // addi a0, a0, 4
        0x05D0_0893, // li a7, 93
        0x0000_0073, // ecall
    ]);
    // ...and as c.addi; the ELFs differ only in that instruction.
    let mut compact = words(&[0x02A0_0513]);
    compact.extend_from_slice(&0x0511u16.to_le_bytes()); // c.addi a0, 4
    compact.extend_from_slice(&words(&[0x05D0_0893, 0x0000_0073]));

    let a = run_elf("rvc-wide", &wide, Isa::IMAFDC);
    let b = run_elf("rvc-compact", &compact, Isa::IMAFDC);
    assert_eq!(a, Ok(46));
    assert_eq!(a, b);
}

#[test]
fn scenario_illegal_halt() {
    let _guard = fixed_range_lock();
    // The all-zero word decodes as illegal: the run halts citing pc and
    // the raw word, and exit is never reached.
    let code = words(&[0x0000_0000]);
    assert_eq!(
        run_elf("illegal", &code, Isa::IMAFDC),
        Err(Fault::IllegalInstruction {
            pc: LOAD_ADDR,
            raw: 0
        })
    );
}

#[test]
fn scenario_isa_gating_end_to_end() {
    let _guard = fixed_range_lock();
    // A compressed instruction under IMA (no C) halts as illegal.
    let mut code = Vec::new();
    code.extend_from_slice(&0x4501u16.to_le_bytes()); // c.li a0, 0
    assert!(matches!(
        run_elf("no-c", &code, Isa::IMA),
        Err(Fault::IllegalInstruction { raw: 0x4501, .. })
    ));
}

#[test]
fn scenario_stack_is_usable() {
    let _guard = fixed_range_lock();
    // Push a value through the stack and exit with it.
    let code = words(&[
        0x02A0_0293, // li t0, 42
        0xFE51_3C23, // sd t0, -8(sp)
        0xFF81_3503, // ld a0, -8(sp)
        0x05D0_0893, // li a7, 93
        0x0000_0073, // ecall
    ]);
    assert_eq!(run_elf("stack", &code, Isa::IMAFDC), Ok(42));
}
