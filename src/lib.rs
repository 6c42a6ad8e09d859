// SPDX-License-Identifier: Apache-2.0

//! Virtual memory tracking for an enclave-resident runtime
//!
//! Inside an enclave there is no operating system to ask whether an
//! address range is free: the runtime itself is the only authority on
//! which ranges it has reserved. This crate keeps that bookkeeping. It
//! sits between a generic memory-allocation API and the low-level
//! enclave page allocator: callers request a region, the tracker
//! validates it against the static enclave image and its own records,
//! delegates the physical reservation, and records runtime-internal
//! reservations in a small fixed-capacity registry behind a spinlock.
//!
//! The page allocator, the untrusted-memory unmap primitive and the
//! enclave address layout are collaborator seams ([`PageAllocator`],
//! [`HostUnmap`], [`Layout`]) wired in at enclave bootstrap.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod host;
pub mod layout;
pub mod mm;
pub mod vma;

pub use error::{Error, Result};
pub use host::{HostUnmap, PageAllocator};
pub use layout::Layout;
pub use mm::{AllocFlags, Protection, VirtualMemory};
pub use vma::{Vma, VmaSet, VMA_CAPACITY};
