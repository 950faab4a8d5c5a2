//! Bounded FIFO of request handles.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::domain::{Phase, Request};
use crate::sync::{Locker, Sem};

struct QueueState<R> {
    items: VecDeque<Arc<R>>,
    closed: bool,
}

/// Capacity-limited request queue shared by the producer and every worker.
///
/// Design:
/// - `items` is only touched under the lock.
/// - `pending` is posted once per accepted offer and waited once per take, so
///   its count tracks `items.len()`. The only extra posts come from `close`,
///   and a woken worker checks `closed` before looking at `items`.
/// - `offer` never blocks: a full queue rejects immediately.
pub struct BoundedQueue<R> {
    state: Locker<QueueState<R>>,
    pending: Sem,
    capacity: usize,
}

impl<R> BoundedQueue<R> {
    /// Callers validate `capacity > 0` (see `PoolConfig::validate`).
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Locker::new(QueueState {
                items: VecDeque::with_capacity(capacity.min(1024)),
                closed: false,
            }),
            pending: Sem::new(0),
            capacity,
        }
    }

    /// Append to the tail. `false` if the queue is full or closed.
    pub fn offer(&self, request: Arc<R>) -> bool {
        self.push(request, |_| {})
    }

    fn push(&self, request: Arc<R>, stamp: impl FnOnce(&R)) -> bool {
        let mut state = self.state.lock();
        if state.closed || state.items.len() >= self.capacity {
            return false;
        }
        stamp(request.as_ref());
        state.items.push_back(request);
        drop(state);

        self.pending.post();
        true
    }

    /// Block until a request is available and pop the head.
    ///
    /// Returns `None` once the queue has been closed. A wake-up that finds the
    /// queue empty goes back to waiting.
    pub fn take(&self) -> Option<Arc<R>> {
        loop {
            self.pending.wait();

            let mut state = self.state.lock();
            if state.closed {
                return None;
            }
            if let Some(request) = state.items.pop_front() {
                return Some(request);
            }
        }
    }

    /// Stop accepting work and wake `waiters` blocked takers.
    ///
    /// Requests still queued stay there until [`drain`](Self::drain).
    pub fn close(&self, waiters: usize) {
        self.state.lock().closed = true;
        self.pending.post_n(waiters);
    }

    /// Remove and return everything still queued, oldest first.
    pub fn drain(&self) -> Vec<Arc<R>> {
        self.state.lock().items.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl<R: Request> BoundedQueue<R> {
    /// Like [`offer`](Self::offer), but stamps `phase` onto the request once
    /// it is known to be accepted.
    pub fn offer_with_phase(&self, request: Arc<R>, phase: Phase) -> bool {
        self.push(request, |r| r.state().set_phase(phase))
    }
}
