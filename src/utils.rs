//! Small time helpers shared by the engine and the coordinator.

use std::time::SystemTime;

/// The current wall-clock instant, used to stamp `create_time`,
/// `canceled_at` and snapshot timestamps.
///
/// Centralized in one place (rather than calling `SystemTime::now()`
/// throughout) so that a future deterministic-clock test harness has a
/// single seam to patch.
pub(crate) fn now() -> SystemTime {
    SystemTime::now()
}
