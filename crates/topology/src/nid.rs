//! NID sequences

/// First NID handed to a management node.
pub const MANAGEMENT_STARTING_NID: u64 = 100_001;

/// Default first NID for liquid-cooled compute nodes.
pub const DEFAULT_MOUNTAIN_STARTING_NID: u64 = 1000;

/// Hands out consecutive NIDs.
///
/// One allocator is owned per sequence by a single engine pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NidAllocator {
    next: u64,
}

impl NidAllocator {
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// NID the next call to [`NidAllocator::allocate`] returns.
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn allocate(&mut self) -> u64 {
        let nid = self.next;
        self.next += 1;
        nid
    }
}
