//! Identifiers and simple allocators for page entities.

use serde::{Deserialize, Serialize};

/// Opaque handle for a presentable element registered by the host.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// Identifies one contact form submission attempt.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub u32);

/// Monotonic allocator for TargetId and SubmissionId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_target: u32,
    next_submission: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_target(&mut self) -> TargetId {
        let id = TargetId(self.next_target);
        self.next_target = self.next_target.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_submission(&mut self) -> SubmissionId {
        let id = SubmissionId(self.next_submission);
        self.next_submission = self.next_submission.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_target(), TargetId(0));
        assert_eq!(alloc.alloc_target(), TargetId(1));
        assert_eq!(alloc.alloc_submission(), SubmissionId(0));
        assert_eq!(alloc.alloc_submission(), SubmissionId(1));
        alloc.reset();
        assert_eq!(alloc.alloc_target(), TargetId(0));
    }
}
