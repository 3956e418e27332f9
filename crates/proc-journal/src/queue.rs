use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use tokio::sync::Notify;
use tracing::trace;

use crate::config::JournalConfig;
use crate::entry::{JournalEntry, JournalWriter};

/// One fiber's place in the FIFO admission queue (`journal_queue_entry`
/// in the original). `ready` is set by whoever wakes this waiter, and
/// distinguishes "woken because capacity freed up" (`false`) from
/// "woken because someone forced the whole chain through" (`true`,
/// e.g. a synchronous writer draining the queue).
struct Waiter {
    ready: Cell<bool>,
    notify: Notify,
}

/// Write-ahead log admission queue (§4.H).
///
/// Producers either submit through [`JournalQueue::admit_async`] once
/// they've confirmed [`JournalQueue::is_full`] is false, or they call
/// [`JournalQueue::write_sync`], which waits its turn first. Waiters
/// form a FIFO queue and wake each other one at a time — `is_awake`
/// guards against two wake chains running concurrently, exactly as the
/// original's `queue_is_awake` flag does.
pub struct JournalQueue {
    queue_size: Cell<i64>,
    queue_len: Cell<i64>,
    max_size: Cell<i64>,
    max_len: Cell<i64>,
    waiters: std::cell::RefCell<VecDeque<Rc<Waiter>>>,
    is_awake: Cell<bool>,
}

impl JournalQueue {
    pub fn new(config: JournalConfig) -> Rc<JournalQueue> {
        Rc::new(JournalQueue {
            queue_size: Cell::new(0),
            queue_len: Cell::new(0),
            max_size: Cell::new(config.max_size),
            max_len: Cell::new(config.max_len),
            waiters: std::cell::RefCell::new(VecDeque::new()),
            is_awake: Cell::new(false),
        })
    }

    pub fn is_full(&self) -> bool {
        self.queue_size.get() > self.max_size.get() || self.queue_len.get() > self.max_len.get()
    }

    pub fn has_waiters(&self) -> bool {
        !self.waiters.borrow().is_empty()
    }

    /// Fast path: the caller has already checked [`Self::is_full`] (and
    /// waited if necessary). Accounts `entry` against the queue's
    /// limits and hands it to `writer`; the queue's bookkeeping is
    /// released when `writer` invokes the completion callback.
    pub fn admit_async(self: &Rc<Self>, entry: JournalEntry, writer: &dyn JournalWriter) {
        self.queue_size.set(self.queue_size.get() + entry.approx_len);
        self.queue_len.set(self.queue_len.get() + 1);

        let approx_len = entry.approx_len;
        let queue = Rc::clone(self);
        writer.write_async(
            entry,
            Box::new(move || {
                queue.complete(approx_len);
            }),
        );
    }

    /// Slow path: if there are already waiters, force the whole chain
    /// through and join the tail of the queue as a drain barrier before
    /// submitting, preserving FIFO order against earlier callers that
    /// are also waiting their turn.
    pub async fn write_sync(self: &Rc<Self>, entry: JournalEntry, writer: &dyn JournalWriter) {
        if self.has_waiters() {
            self.wakeup(true);
            self.wait_queue().await;
        }
        self.admit_async(entry, writer);
    }

    /// Join the FIFO queue and yield until either capacity frees up or
    /// this waiter is forced ready, then pass the wake chain on to
    /// whichever waiter is now at the front.
    pub async fn wait_queue(&self) {
        let waiter = Rc::new(Waiter {
            ready: Cell::new(false),
            notify: Notify::new(),
        });
        self.waiters.borrow_mut().push_back(Rc::clone(&waiter));

        while self.is_full() && !waiter.ready.get() {
            waiter.notify.notified().await;
        }

        let popped = self.waiters.borrow_mut().pop_front();
        debug_assert!(
            matches!(popped, Some(ref front) if Rc::ptr_eq(front, &waiter)),
            "a waiter resuming from the head of the queue must still be at the head"
        );

        self.wakeup_from_front(waiter.ready.get());
    }

    fn complete(&self, approx_len: i64) {
        self.queue_size.set(self.queue_size.get() - approx_len);
        self.queue_len.set(self.queue_len.get() - 1);
        if self.has_waiters() && !self.is_full() {
            self.wakeup(false);
        }
    }

    /// Start a wake chain if one isn't already running (`is_awake`
    /// guards against two chains racing).
    fn wakeup(&self, force_ready: bool) {
        debug_assert!(self.has_waiters());
        if self.is_awake.get() {
            return;
        }
        self.is_awake.set(true);
        self.wakeup_from_front(force_ready);
    }

    /// Wake whichever waiter is currently at the front of the queue, or
    /// end the chain (`is_awake = false`) if there's no one left to
    /// wake, or if the queue is still full and nothing is forcing the
    /// chain through.
    fn wakeup_from_front(&self, force_ready: bool) {
        let front = self.waiters.borrow().front().cloned();
        let waiter = match front {
            Some(waiter) => waiter,
            None => {
                self.is_awake.set(false);
                return;
            }
        };
        if !force_ready && self.is_full() {
            self.is_awake.set(false);
            return;
        }
        trace!(force_ready, "waking next queue entry");
        waiter.ready.set(force_ready);
        waiter.notify.notify_one();
    }

    /// Raise the byte-size cap, waking the queue if it's no longer full
    /// and someone is waiting (§4.H: limits may change under load).
    pub fn set_max_size(&self, max_size: i64) {
        self.max_size.set(max_size);
        if self.has_waiters() && !self.is_full() {
            self.wakeup(false);
        }
    }

    /// Raise the entry-count cap, same wakeup rule as [`Self::set_max_size`].
    pub fn set_max_len(&self, max_len: i64) {
        self.max_len.set(max_len);
        if self.has_waiters() && !self.is_full() {
            self.wakeup(false);
        }
    }
}
