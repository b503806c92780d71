/*
 * Created on Mon Jan 08 2024
 *
 * This file is a part of Skybolt
 * Skybolt is a free and open-source client driver for the Bolt graph
 * database wire protocol written by Sayan Nandan ("the Author") with
 * the vision to provide a fast and reliable way to talk to graph
 * databases without compromising on correctness or simplicity.
 *
 * Copyright (c) 2024, Sayan Nandan <ohsayan@outlook.com>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

/*!
    # Tracked allocation

    This module provides the raw allocation shim used by the value payload storage. Every
    allocation made through it is recorded in a pair of per-thread counters so that the
    test suite can assert that a create/destroy cycle returns the live byte count to
    exactly where it started. Values and connections are pinned to a single thread, which
    is what makes plain `Cell` counters sufficient here.
*/

use {
    core::cell::Cell,
    std::alloc::{self, Layout},
    std::ptr::NonNull,
};

thread_local! {
    static LIVE_BYTES: Cell<usize> = Cell::new(0);
    static ALLOCATION_EVENTS: Cell<u64> = Cell::new(0);
}

/// Returns the number of bytes currently held by tracked heap payloads on this thread
pub fn live_bytes() -> usize {
    LIVE_BYTES.with(|c| c.get())
}

/// Returns the number of tracked allocation events on this thread. This count never
/// decreases
pub fn allocation_events() -> u64 {
    ALLOCATION_EVENTS.with(|c| c.get())
}

/// Allocate a block with an array layout of type `T` with space for `l` elements,
/// recording the allocation
///
/// ## Safety
/// The caller must pair this with exactly one [`dealloc_array`] of the same `T` and `l`
pub(crate) unsafe fn alloc_array<T: Copy>(l: usize) -> *mut T {
    if l == 0 {
        return NonNull::dangling().as_ptr();
    }
    // UNSAFE(@ohsayan): the layout math is the caller's contract
    let layout = Layout::array::<T>(l).unwrap_unchecked();
    let ptr = alloc::alloc(layout);
    assert!(!ptr.is_null(), "malloc failed");
    LIVE_BYTES.with(|c| c.set(c.get() + layout.size()));
    ALLOCATION_EVENTS.with(|c| c.set(c.get() + 1));
    ptr as _
}

/// Deallocate an array of type `T` with size `l`, recording the release. Zero-sized
/// blocks never reached the allocator and are not touched
///
/// ## Safety
/// `ptr` must have come from [`alloc_array`] with the same `T` and `l`
pub(crate) unsafe fn dealloc_array<T: Copy>(ptr: *mut T, l: usize) {
    if l != 0 {
        // UNSAFE(@ohsayan): same layout as the paired alloc
        let layout = Layout::array::<T>(l).unwrap_unchecked();
        alloc::dealloc(ptr as *mut u8, layout);
        LIVE_BYTES.with(|c| c.set(c.get() - layout.size()));
    }
}
