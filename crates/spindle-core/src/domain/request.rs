//! Request contract: the task handle that flows producer -> queue -> worker.
//!
//! A request is shared as `Arc<R>` between the producer (which keeps a clone
//! to inspect and recycle it) and the pool (which only ever holds one clone
//! while the request is queued or being dispatched). The pool never destroys a
//! request; dropping the last clone is the producer's business.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use super::Phase;

/// Shared, mutable status fields of a request.
///
/// Flags are written by the worker with `Release` and read with `Acquire`, so
/// a producer that observes `improved == true` also observes everything the
/// worker did to the request before setting it.
#[derive(Debug)]
pub struct RequestState {
    phase: AtomicU8,
    improved: AtomicBool,
    timed_out: AtomicBool,
}

impl RequestState {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase: AtomicU8::new(phase.as_u8()),
            improved: AtomicBool::new(false),
            timed_out: AtomicBool::new(false),
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Set before enqueue. Must not be called while the request is being
    /// dispatched.
    pub fn set_phase(&self, phase: Phase) {
        self.phase.store(phase.as_u8(), Ordering::Release);
    }

    /// The worker is done with the I/O step. For a successful read,
    /// `process` may still be running when this turns true.
    pub fn is_improved(&self) -> bool {
        self.improved.load(Ordering::Acquire)
    }

    pub fn mark_improved(&self) {
        self.improved.store(true, Ordering::Release);
    }

    /// Read and clear the improved flag in one step.
    ///
    /// Producers polling for completion use this so the next round starts
    /// from a clean flag.
    pub fn take_improved(&self) -> bool {
        self.improved.swap(false, Ordering::AcqRel)
    }

    /// The I/O step failed; an external timer should tear the connection down.
    pub fn is_timed_out(&self) -> bool {
        self.timed_out.load(Ordering::Acquire)
    }

    pub fn mark_timed_out(&self) {
        self.timed_out.store(true, Ordering::Release);
    }

    /// Clear both flags so the request can be submitted again.
    pub fn reset(&self) {
        self.improved.store(false, Ordering::Release);
        self.timed_out.store(false, Ordering::Release);
    }
}

impl Default for RequestState {
    fn default() -> Self {
        Self::new(Phase::default())
    }
}

/// A unit of work the pool can dispatch.
///
/// # 使用例
/// ```
/// use spindle_core::domain::{Request, RequestState};
///
/// struct Echo {
///     state: RequestState,
/// }
///
/// impl Request for Echo {
///     type Conn = ();
///
///     fn state(&self) -> &RequestState {
///         &self.state
///     }
///
///     fn perform_read(&self) -> bool {
///         true
///     }
///
///     fn perform_write(&self) -> bool {
///         true
///     }
///
///     fn process(&self, _conn: Option<&mut ()>) {}
/// }
/// ```
///
/// Failures are reported through return values and [`RequestState`] flags,
/// never by panicking. A panic escaping any of these methods is caught by the
/// worker and logged, and the worker moves on to the next request.
pub trait Request: Send + Sync + 'static {
    /// Connection type borrowed from the pool for the duration of `process`.
    type Conn: Send;

    fn state(&self) -> &RequestState;

    /// Read whatever is available from the peer. `false` on I/O failure.
    fn perform_read(&self) -> bool;

    /// Write the prepared response. `false` on I/O failure.
    fn perform_write(&self) -> bool;

    /// Run business logic. `conn` is `None` when the pool could not hand out
    /// a connection.
    fn process(&self, conn: Option<&mut Self::Conn>);
}
