//! Fixed-address guest memory mappings and the brk heap.
//!
//! Every region is mapped at its guest virtual address with MAP_FIXED, so
//! the executor can treat guest addresses as host pointers. The guest's
//! linker script must place its segments away from the host's own text,
//! heap and stack for this to work; the stack/heap constants here are
//! chosen to sit clear of typical host layouts.

use std::ffi::c_void;
use std::num::NonZeroUsize;
use std::os::fd::AsFd;
use std::ptr::NonNull;

use nix::errno::Errno;
use nix::sys::mman::{mmap, mmap_anonymous, MapFlags, ProtFlags};
use tracing::debug;

use crate::processor::Processor;
use rvp_isa::Xlen;

/// Host page size.
pub fn page_size() -> u64 {
    let sz = unsafe { nix::libc::sysconf(nix::libc::_SC_PAGESIZE) };
    if sz > 0 {
        sz as u64
    } else {
        4096
    }
}

/// Round `val` up to the next multiple of `align` (a power of two).
pub(crate) fn round_up(val: u64, align: u64) -> u64 {
    (val + align - 1) & !(align - 1)
}

/// Map an anonymous read-write region at a fixed guest address.
pub(crate) fn map_fixed_anon(addr: u64, len: u64) -> nix::Result<NonNull<c_void>> {
    unsafe {
        mmap_anonymous(
            NonZeroUsize::new(addr as usize),
            NonZeroUsize::new(len as usize).ok_or(Errno::EINVAL)?,
            ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
            MapFlags::MAP_PRIVATE | MapFlags::MAP_ANONYMOUS | MapFlags::MAP_FIXED,
        )
    }
}

/// Map a file-backed region at a fixed guest address.
pub(crate) fn map_fixed_file<F: AsFd>(
    addr: u64,
    len: u64,
    prot: ProtFlags,
    file: &F,
    offset: u64,
) -> nix::Result<NonNull<c_void>> {
    unsafe {
        mmap(
            NonZeroUsize::new(addr as usize),
            NonZeroUsize::new(len as usize).ok_or(Errno::EINVAL)?,
            prot,
            MapFlags::MAP_PRIVATE | MapFlags::MAP_FIXED,
            file,
            offset as nix::libc::off_t,
        )
    }
}

impl<X: Xlen> Processor<X> {
    /// Grow (or query) the program break.
    ///
    /// Returns the value to place in a0: `new_addr` on success, the current
    /// break for a query below the heap, or `-ENOMEM` if the mapping
    /// failed. `heap_end` is only moved once the new region is mapped.
    pub fn brk(&mut self, new_addr: u64) -> i64 {
        if new_addr < self.heap_begin {
            // Query (brk(0)) or an address below the data segment: the
            // guest learns the current break, per the kernel contract.
            return self.heap_end as i64;
        }

        let page = page_size();
        let curr_heap_end = round_up(self.heap_end, page);
        let new_heap_end = round_up(new_addr, page);

        // Already big enough.
        if self.heap_end >= new_heap_end || new_heap_end == curr_heap_end {
            return new_addr as i64;
        }

        match map_fixed_anon(curr_heap_end, new_heap_end - curr_heap_end) {
            Ok(_) => {
                self.mapped_segments
                    .push((curr_heap_end as usize, (new_heap_end - curr_heap_end) as usize));
                self.heap_end = new_heap_end;
                if self.debug {
                    debug!(
                        "brk: mmap: 0x{:016x} - 0x{:016x} +R+W",
                        curr_heap_end, new_heap_end
                    );
                }
                new_addr as i64
            }
            Err(err) => {
                debug!("brk: error: mmap: {}", err);
                -(Errno::ENOMEM as i32 as i64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::mman::munmap;
    use rvp_isa::Rv64;

    #[test]
    fn test_round_up() {
        assert_eq!(round_up(0, 4096), 0);
        assert_eq!(round_up(1, 4096), 4096);
        assert_eq!(round_up(4096, 4096), 4096);
        assert_eq!(round_up(4097, 4096), 8192);
    }

    #[test]
    fn test_page_size_sane() {
        let p = page_size();
        assert!(p >= 4096);
        assert!(p.is_power_of_two());
    }

    /// Reserve an address range the kernel considers free, then release it
    /// so the test can claim parts of it with MAP_FIXED.
    fn probe_free_range(len: u64) -> u64 {
        let probe = unsafe {
            mmap_anonymous(
                None,
                NonZeroUsize::new(len as usize).unwrap(),
                ProtFlags::PROT_NONE,
                MapFlags::MAP_PRIVATE | MapFlags::MAP_ANONYMOUS,
            )
        }
        .expect("probe mmap");
        unsafe { munmap(probe, len as usize).expect("probe munmap") };
        probe.as_ptr() as u64
    }

    #[test]
    fn test_brk_grow_and_query() {
        let page = page_size();
        let base = probe_free_range(16 * page);

        let mut p = Processor::<Rv64>::new();
        p.heap_begin = base;
        p.heap_end = base;

        // Query returns the current break.
        assert_eq!(p.brk(0), base as i64);

        // Growing returns the requested address and maps the range.
        let want = base + 2 * page - 1;
        assert_eq!(p.brk(want), want as i64);
        assert_eq!(p.heap_end, base + 2 * page);
        p.write_u8(want, 0xAB);
        assert_eq!(p.read_u8(want), 0xAB);

        // A request inside the mapped range is satisfied without mapping.
        assert_eq!(p.brk(base + page), (base + page) as i64);
        assert_eq!(p.heap_end, base + 2 * page);
    }
}
