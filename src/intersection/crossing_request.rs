/*
 * The latch that carries a pedestrian's crossing request from interrupt
 * context into the control loop.
 *
 * Both button interrupt sources store the same value, so their writes are
 * idempotent: pressing twice, holding, or bouncing before the loop consumes
 * the request still yields exactly one crossing sequence. The control loop
 * is the sole reader and the sole clearer. A raise that races the clear is
 * honored on the next iteration instead of this one, which is acceptable
 * best-effort behavior for a button.
 *
 * The atomic is what keeps the busy-waiting loop from reading a stale
 * cached value of a flag written from interrupt context.
 */

use core::sync::atomic::{AtomicBool, Ordering};

pub struct CrossingRequest {
    raised: AtomicBool,
}

impl CrossingRequest {
    pub const fn new() -> Self {
        CrossingRequest {
            raised: AtomicBool::new(false),
        }
    }

    /// Latch a request. Callable from any context; this is the entire
    /// effect of a button interrupt.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Consume the latch. Control loop only.
    pub fn clear(&self) {
        self.raised.store(false, Ordering::Release);
    }
}

impl Default for CrossingRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide latch the board wires both button lines to.
pub static CROSSING_REQUEST: CrossingRequest = CrossingRequest::new();
