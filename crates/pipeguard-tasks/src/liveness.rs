//! Watchdog refresh shared by every task loop.

use pipeguard_watchdog::WatchdogHandle;

/// Refresh `handle`, logging instead of failing when the watchdog has already
/// fired. After expiry the restart is under way and the refresh is moot.
pub(crate) fn refresh(handle: &WatchdogHandle) {
    if let Err(e) = handle.reset() {
        tracing::trace!(task = %handle.task(), error = %e, "watchdog refresh rejected");
    }
}
