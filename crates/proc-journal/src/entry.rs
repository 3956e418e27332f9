/// A unit of admission-queue accounting (§4.H).
///
/// The on-disk log writer itself is out of scope (§1, narrow interface
/// only); this carries just what the queue needs to track backpressure.
pub struct JournalEntry {
    pub approx_len: i64,
}

impl JournalEntry {
    pub fn new(approx_len: i64) -> JournalEntry {
        JournalEntry { approx_len }
    }
}

/// The out-of-scope on-disk log writer, referenced only through this
/// narrow interface (§1). `complete` must be called exactly once, after
/// `entry` has landed, so the queue can release its accounted capacity
/// and consider waking the next waiter.
pub trait JournalWriter {
    fn write_async(&self, entry: JournalEntry, complete: Box<dyn FnOnce()>);
}
