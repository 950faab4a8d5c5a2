//! Test fixtures shared by the unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::domain::{Phase, Request, RequestState};
use crate::sync::Locker;

/// Instrumented request: counts every capability call and can be told to
/// fail its I/O or panic inside `process`.
pub(crate) struct ProbeRequest {
    pub id: usize,
    state: RequestState,
    read_ok: bool,
    write_ok: bool,
    panic_in_process: bool,
    reads: AtomicUsize,
    writes: AtomicUsize,
    processed: AtomicUsize,
    saw_conn: AtomicBool,
    log: Option<Arc<Locker<Vec<usize>>>>,
}

impl ProbeRequest {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            state: RequestState::new(Phase::Read),
            read_ok: true,
            write_ok: true,
            panic_in_process: false,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            processed: AtomicUsize::new(0),
            saw_conn: AtomicBool::new(false),
            log: None,
        }
    }

    pub fn with_phase(self, phase: Phase) -> Self {
        self.state.set_phase(phase);
        self
    }

    pub fn failing_read(mut self) -> Self {
        self.read_ok = false;
        self
    }

    pub fn failing_write(mut self) -> Self {
        self.write_ok = false;
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic_in_process = true;
        self
    }

    /// Append `id` to `log` every time `process` runs.
    pub fn with_log(mut self, log: Arc<Locker<Vec<usize>>>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn process_calls(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn saw_connection(&self) -> bool {
        self.saw_conn.load(Ordering::SeqCst)
    }
}

impl Request for ProbeRequest {
    type Conn = u32;

    fn state(&self) -> &RequestState {
        &self.state
    }

    fn perform_read(&self) -> bool {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.read_ok
    }

    fn perform_write(&self) -> bool {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.write_ok
    }

    fn process(&self, conn: Option<&mut u32>) {
        if conn.is_some() {
            self.saw_conn.store(true, Ordering::SeqCst);
        }
        if let Some(log) = &self.log {
            log.lock().push(self.id);
        }
        self.processed.fetch_add(1, Ordering::SeqCst);
        if self.panic_in_process {
            panic!("probe request {} panicked in process", self.id);
        }
    }
}

/// Poll `cond` until it holds or `timeout` passes.
pub(crate) fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    cond()
}
