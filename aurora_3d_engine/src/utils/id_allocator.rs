/// Monotonic `u32` id assignment for GPU resource caches.
///
/// Unlike a free-list allocator, ids are never recycled: a cache slot
/// stays bound to its id for the cache's lifetime, and "refresh" style
/// updates overwrite the slot in place rather than freeing it. This is
/// what keeps an id safe to hold across frames — an id handed to a draw
/// call can never silently start pointing at a different resource.
///
/// `u32::MAX` is reserved as the NULL sentinel and is never assigned.
///
/// # Example
///
/// ```ignore
/// let mut alloc = IdAllocator::with_capacity(1024);
/// let a = alloc.alloc().unwrap(); // 0
/// let b = alloc.alloc().unwrap(); // 1
/// assert_eq!(alloc.len(), 2);
/// ```
pub struct IdAllocator {
    next_id: u32,
    capacity: u32,
}

impl IdAllocator {
    /// Create an allocator with no upper bound (other than the sentinel)
    pub fn new() -> Self {
        Self {
            next_id: 0,
            capacity: u32::MAX,
        }
    }

    /// Create an allocator that refuses to assign more than `capacity` ids.
    ///
    /// Used by caches backed by pre-sized GPU arrays (materials).
    pub fn with_capacity(capacity: u32) -> Self {
        debug_assert!(capacity < u32::MAX);
        Self {
            next_id: 0,
            capacity,
        }
    }

    /// Assign the next id, or `None` if the capacity is exhausted.
    pub fn alloc(&mut self) -> Option<u32> {
        if self.next_id >= self.capacity {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        Some(id)
    }

    /// Whether `id` has been assigned by this allocator
    pub fn is_live(&self, id: u32) -> bool {
        id < self.next_id
    }

    /// Number of assigned ids (also the backing array length)
    pub fn len(&self) -> u32 {
        self.next_id
    }

    /// Whether no ids have been assigned yet
    pub fn is_empty(&self) -> bool {
        self.next_id == 0
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "id_allocator_tests.rs"]
mod tests;
