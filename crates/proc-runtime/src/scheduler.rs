use std::future::Future;

use tokio::runtime::Builder;
use tokio::task::LocalSet;

/// Run `fut` to completion on a fresh single-threaded cooperative
/// scheduler (§5 "Scheduling").
///
/// Every runtime operation is `!Send` (`Rc`/`RefCell` throughout), so
/// the ordinary multi-threaded `tokio` runtime can't run them at all —
/// `LocalSet` on top of a current-thread runtime is the idiomatic way
/// to get cooperative, single-OS-thread task switching out of `tokio`
/// without reaching for a bespoke executor.
pub fn block_on_local<F>(fut: F) -> F::Output
where
    F: Future,
{
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build current-thread scheduler");
    let local = LocalSet::new();
    local.block_on(&runtime, fut)
}
