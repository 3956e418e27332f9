/// A per-task bump allocator, reset at every scheduling boundary (§5
/// "the process arena").
///
/// Backed by a single growable buffer rather than a free list: a
/// dispatch only ever needs scratch space for the duration of one
/// call, so `truncate` back to a snapshot is cheaper and simpler than
/// tracking individual allocations.
#[derive(Debug, Default)]
pub struct Arena {
    buf: Vec<u8>,
}

impl Arena {
    pub fn new() -> Arena {
        Arena { buf: Vec::new() }
    }

    /// Current high-water mark. Pass the result to [`Arena::truncate`]
    /// to give back everything allocated since this call.
    pub fn snapshot(&self) -> usize {
        self.buf.len()
    }

    /// Reserve `len` bytes of scratch space and return their offset.
    /// The bytes are zero-initialized.
    pub fn alloc(&mut self, len: usize) -> usize {
        let at = self.buf.len();
        self.buf.resize(at + len, 0);
        at
    }

    pub fn slice(&self, at: usize, len: usize) -> &[u8] {
        &self.buf[at..at + len]
    }

    pub fn slice_mut(&mut self, at: usize, len: usize) -> &mut [u8] {
        &mut self.buf[at..at + len]
    }

    /// Reset the watermark to `mark` without releasing capacity, so the
    /// same `Vec` is reused across every call on this task.
    pub fn truncate(&mut self, mark: usize) {
        self.buf.truncate(mark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_gives_back_allocations_without_losing_capacity() {
        let mut arena = Arena::new();
        let mark = arena.snapshot();
        arena.alloc(64);
        assert_eq!(arena.snapshot(), mark + 64);
        let capacity = arena.buf.capacity();
        arena.truncate(mark);
        assert_eq!(arena.snapshot(), mark);
        assert_eq!(arena.buf.capacity(), capacity);
    }

    #[test]
    fn nested_snapshots_restore_independently() {
        let mut arena = Arena::new();
        arena.alloc(8);
        let mark = arena.snapshot();
        arena.alloc(16);
        arena.truncate(mark);
        assert_eq!(arena.snapshot(), 8);
    }
}
