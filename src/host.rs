// SPDX-License-Identifier: Apache-2.0

//! Seams to the collaborators outside this crate.
//!
//! The tracker validates and records address ranges; everything
//! physical — committing pages, tearing down untrusted mappings — is
//! delegated through these traits. The enclave wires in its bootstrap
//! implementations; tests wire in doubles.

/// The low-level enclave page allocator.
///
/// The allocator owns placement and its own concurrency discipline.
/// It is also the only source of new address ranges: the tracker trusts
/// it never to hand out overlapping memory and does not re-verify that.
pub trait PageAllocator {
    /// Reserve `size` bytes of pre-committed enclave pages.
    ///
    /// With `Some(addr)` the reservation must come back at exactly
    /// `addr`, or as `None`. Current implementations are known to
    /// sometimes return a different nonzero address instead; callers
    /// defend against that by releasing the reservation and failing.
    fn reserve(&self, addr: Option<usize>, size: usize) -> Option<usize>;

    /// Return a reservation to the allocator.
    ///
    /// Release failures are not surfaced.
    fn release(&self, addr: usize, size: usize);

    /// Snapshot of the process-wide count of pages currently reserved.
    ///
    /// The counter is maintained atomically by the allocator and read
    /// without locking; the value may be stale by the time it is used.
    fn pages_in_use(&self) -> usize;
}

/// Tears down mappings that live outside the enclave.
pub trait HostUnmap {
    /// Unmap `[addr, addr + size)` in the untrusted address space.
    ///
    /// Fire and forget: no status is returned and none is consumed.
    fn unmap_untrusted(&self, addr: usize, size: usize);
}
