// SPDX-License-Identifier: Apache-2.0

//! Allocate, free and protect enclave virtual memory.

use crate::error::{Error, Result};
use crate::host::{HostUnmap, PageAllocator};
use crate::layout::Layout;
use crate::vma::{VmaSet, VMA_CAPACITY};

use core::ptr::write_bytes;
use core::sync::atomic::{AtomicBool, Ordering};

use const_default::ConstDefault;
use lset::Line;
use primordial::Page;
use spin::Mutex;

bitflags::bitflags! {
    /// Memory access protections requested for a mapping.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct Protection: usize {
        /// Read access
        const READ = 1 << 0;

        /// Write access
        const WRITE = 1 << 1;

        /// Execute access
        const EXECUTE = 1 << 2;
    }
}

impl ConstDefault for Protection {
    const DEFAULT: Self = Self::empty();
}

bitflags::bitflags! {
    /// Behavioral flags for an allocation request.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct AllocFlags: usize {
        /// The memory is for the runtime's own bookkeeping and is
        /// recorded in the VMA registry.
        const INTERNAL = 1 << 0;

        /// Reserve address space without demanding backing pages.
        ///
        /// Inside the enclave every reserved page is committed, so this
        /// changes nothing here; it is accepted for callers shared with
        /// hosts where the distinction exists.
        const RESERVE = 1 << 1;
    }
}

impl ConstDefault for AllocFlags {
    const DEFAULT: Self = Self::empty();
}

/// Tracks which ranges of enclave virtual memory are spoken for.
///
/// Sits between the memory-allocation API surface and the page
/// allocator: requests are validated against the static image and the
/// recorded ranges, physical reservation is delegated to `A`, and
/// internal allocations are recorded under a single spinlock.
///
/// All operations are synchronous and run to completion; the only
/// shared state is the registry behind its lock, whose critical
/// sections are a bounded linear scan.
#[derive(Debug)]
pub struct VirtualMemory<A, H> {
    layout: Layout,
    pages: A,
    host: H,
    vmas: Mutex<VmaSet>,
    protect_warned: AtomicBool,
}

impl<A: PageAllocator, H: HostUnmap> VirtualMemory<A, H> {
    /// Create a tracker for the given layout and collaborators.
    pub const fn new(layout: Layout, pages: A, host: H) -> Self {
        Self {
            layout,
            pages,
            host,
            vmas: Mutex::new(VmaSet::new()),
            protect_warned: AtomicBool::new(false),
        }
    }

    /// Check whether `[addr, addr + size)` is free of conflicting
    /// reservations and clear of the static image.
    ///
    /// The answer is advisory: it can go stale the instant the registry
    /// lock drops. Callers that need it to hold must serialize against
    /// concurrent allocation themselves.
    pub fn is_mappable(&self, addr: usize, size: usize) -> bool {
        // A zero-length range cannot overlap anything.
        if size == 0 {
            return true;
        }

        let end = match addr.checked_add(size) {
            Some(end) => end,
            None => return false,
        };
        let wanted = Line::new(addr, end);

        if wanted.start < self.layout.image.end && wanted.end > self.layout.image.start {
            log::debug!("address {:#x}-{:#x} is not mappable", addr, end);
            return false;
        }

        if self.vmas.lock().overlaps(&wanted) {
            log::debug!("address {:#x}-{:#x} is not mappable", addr, end);
            return false;
        }

        true
    }

    /// Reserve `size` bytes of enclave memory.
    ///
    /// With `Some(addr)` the region is placed exactly there or the call
    /// fails. Internal allocations must let the allocator choose the
    /// address; the registry never records caller-placed ranges. On
    /// success the region is zero-filled and, if internal, recorded.
    /// On failure nothing is recorded and any pages obtained
    /// mid-operation have been released.
    ///
    /// # Panics
    ///
    /// A zero `size` is a bug in the caller and traps immediately.
    pub fn alloc(
        &self,
        addr: Option<usize>,
        size: usize,
        flags: AllocFlags,
        prot: Protection,
    ) -> Result<usize> {
        if !Protection::all().contains(prot) {
            return Err(Error::InvalidArgument);
        }

        if flags.contains(AllocFlags::INTERNAL) && addr.is_some() {
            return Err(Error::InvalidArgument);
        }

        assert!(size != 0, "zero-size allocation");

        let mem = match self.pages.reserve(addr, size) {
            Some(mem) => mem,
            None if addr.is_some() => return Err(Error::Denied),
            None => return Err(Error::OutOfMemory),
        };

        if let Some(addr) = addr {
            if mem != addr {
                // TODO: make this case impossible by tightening the
                // allocator's exact-placement contract.
                self.pages.release(mem, size);
                return Err(Error::InvalidArgument);
            }
        }

        if flags.contains(AllocFlags::INTERNAL) {
            let vma = Line::new(mem, mem + size);
            if self.vmas.lock().insert(vma).is_err() {
                log::error!("out of VMAs (at most {VMA_CAPACITY} ranges can be tracked)");
                self.pages.release(mem, size);
                return Err(Error::OutOfMemory);
            }

            log::debug!("allocated {:#x}-{:#x} for internal use", mem, mem + size);
        }

        // The new owner must never observe bytes from a prior use.
        unsafe { write_bytes(mem as *mut u8, 0, size) };

        Ok(mem)
    }

    /// Release a previously allocated region.
    ///
    /// A region completely inside the enclave goes back to the page
    /// allocator and, if it was internally tracked, leaves the
    /// registry. Any other region is an untrusted mapping and is
    /// unmapped on the host side. Regions straddling the enclave
    /// boundary are unsupported.
    ///
    /// # Panics
    ///
    /// Traps when the region starts at a recorded range but does not
    /// match its recorded size; internal memory must be freed at the
    /// granularity it was allocated at.
    pub fn free(&self, addr: usize, size: usize) {
        if self.layout.contains_region(addr, size) {
            self.pages.release(addr, size);
            self.vmas.lock().remove(addr, addr + size);
        } else {
            self.host.unmap_untrusted(addr, size);
        }
    }

    /// Change the access protections of `[addr, addr + size)`.
    ///
    /// Unimplemented: without EDMM the enclave cannot change page
    /// permissions after it is built. The call reports success and logs
    /// a one-time warning.
    pub fn protect(&self, addr: usize, size: usize, prot: Protection) -> Result<()> {
        if !self.protect_warned.swap(true, Ordering::Relaxed) {
            log::warn!("protect({addr:#x}, {size}, {prot:?}) is unimplemented");
        }

        Ok(())
    }

    /// Total configured heap capacity in bytes.
    pub fn quota(&self) -> usize {
        self.layout.heap.end - self.layout.heap.start
    }

    /// Heap capacity not currently reserved, in bytes.
    ///
    /// Computed from a relaxed snapshot of the allocator's page
    /// counter; concurrent activity can make the value stale
    /// immediately. Saturates at zero if the snapshot races past the
    /// configured bound.
    pub fn available_quota(&self) -> usize {
        self.quota()
            .saturating_sub(self.pages.pages_in_use() * Page::SIZE)
    }

    /// Number of internal reservations currently recorded.
    pub fn vma_count(&self) -> usize {
        self.vmas.lock().len()
    }
}
