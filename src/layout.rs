// SPDX-License-Identifier: Apache-2.0

//! The static address layout of the enclave.

use lset::Line;

/// Address bounds fixed when the enclave is measured and loaded.
///
/// All three lines are half-open byte ranges. They never change while
/// the enclave runs and are read without locking.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    /// The whole enclave address range.
    pub enclave: Line<usize>,

    /// The statically loaded code and data image.
    ///
    /// Nothing may ever be mapped over this range. It is an exclusion
    /// bound only and is never recorded as a VMA.
    pub image: Line<usize>,

    /// The heap range available to the allocator.
    pub heap: Line<usize>,
}

impl Layout {
    /// Create a layout from the bounds supplied by enclave bootstrap.
    pub const fn new(enclave: Line<usize>, image: Line<usize>, heap: Line<usize>) -> Self {
        Self {
            enclave,
            image,
            heap,
        }
    }

    /// Whether `[addr, addr + size)` lies completely inside the enclave.
    ///
    /// A range whose end overflows the address space cannot lie inside
    /// anything and reports `false`.
    pub fn contains_region(&self, addr: usize, size: usize) -> bool {
        match addr.checked_add(size) {
            Some(end) => self.enclave.start <= addr && end <= self.enclave.end,
            None => false,
        }
    }
}
