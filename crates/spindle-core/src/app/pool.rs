//! WorkerPool - プロデューサーから見たプールの表面
//!
//! # 所有関係
//! - キュー・戦略・接続プールは `Arc` でワーカーと共有する
//! - リクエストは `Arc<R>`。プールは自分の参照を手放すだけで、破棄はしない
//!
//! # 停止
//! - `shutdown()` は close → join → drain の順で、未処理のリクエストを返す
//! - 明示的に呼ばずに drop しても close + join は行われる

use std::any::type_name;
use std::sync::Arc;

use crate::app::PoolConfig;
use crate::domain::{Phase, Request};
use crate::error::PoolError;
use crate::observability::{PoolCounts, PoolStats};
use crate::ports::{ConnectionPool, DispatchStrategy};
use crate::queue::BoundedQueue;
use crate::worker::WorkerGroup;

pub struct WorkerPool<R> {
    queue: Arc<BoundedQueue<R>>,
    workers: WorkerGroup<R>,
    stats: Arc<PoolStats>,
}

impl<R: Request> WorkerPool<R> {
    /// Start `thread_number` workers over a queue of `max_requests` slots.
    ///
    /// 0 を渡すとスレッドを 1 本も起動せずに `PoolError::InvalidConfig` を返す。
    pub fn new<D, P>(
        strategy: D,
        conns: Arc<P>,
        thread_number: usize,
        max_requests: usize,
    ) -> Result<Self, PoolError>
    where
        D: DispatchStrategy,
        P: ConnectionPool<Conn = R::Conn>,
    {
        let config = PoolConfig {
            thread_number,
            max_requests,
            ..PoolConfig::default()
        };
        config.validate()?;
        Self::start(strategy, conns, &config)
    }

    /// `config` must already be validated.
    pub(crate) fn start<D, P>(
        strategy: D,
        conns: Arc<P>,
        config: &PoolConfig,
    ) -> Result<Self, PoolError>
    where
        D: DispatchStrategy,
        P: ConnectionPool<Conn = R::Conn>,
    {
        let queue = Arc::new(BoundedQueue::new(config.max_requests));
        let stats = Arc::new(PoolStats::default());
        let workers = WorkerGroup::spawn(
            config,
            Arc::clone(&queue),
            Arc::new(strategy),
            conns,
            Arc::clone(&stats),
        )?;

        tracing::info!(
            threads = config.thread_number,
            max_requests = config.max_requests,
            strategy = type_name::<D>(),
            "worker pool started"
        );

        Ok(Self {
            queue,
            workers,
            stats,
        })
    }

    /// Enqueue with the phase the producer already set.
    ///
    /// `false` はキューが満杯（またはシャットダウン済み）。呼び出し側で再送や破棄を決める。
    pub fn submit(&self, request: Arc<R>) -> bool {
        let accepted = self.queue.offer(request);
        self.after_submit(accepted);
        accepted
    }

    /// Enqueue and stamp `phase` onto the request if accepted.
    pub fn submit_with_phase(&self, request: Arc<R>, phase: Phase) -> bool {
        let accepted = self.queue.offer_with_phase(request, phase);
        self.after_submit(accepted);
        accepted
    }

    fn after_submit(&self, accepted: bool) {
        self.stats.record_submit(accepted);
        if !accepted {
            tracing::debug!(
                queued = self.queue.len(),
                capacity = self.queue.capacity(),
                "request rejected"
            );
        }
    }
}

impl<R> WorkerPool<R> {
    pub fn thread_number(&self) -> usize {
        self.workers.len()
    }

    pub fn max_requests(&self) -> usize {
        self.queue.capacity()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn counts(&self) -> PoolCounts {
        self.stats
            .snapshot(self.workers.len(), self.queue.capacity(), self.queue.len())
    }

    /// Stop the workers and hand back every request that was never dispatched.
    ///
    /// 実行中の dispatch は最後まで走らせてから join する。
    pub fn shutdown(self) -> Vec<Arc<R>> {
        let Self {
            queue,
            workers,
            stats,
        } = self;
        let threads = workers.len();
        workers.shutdown_and_join();

        let leftovers = queue.drain();
        let counts = stats.snapshot(threads, queue.capacity(), 0);
        tracing::info!(
            leftovers = leftovers.len(),
            dispatched = counts.dispatched,
            panics = counts.panics,
            "worker pool stopped"
        );
        leftovers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryConnectionPool, IoExternal, IoInWorker};
    use crate::testing::{ProbeRequest, wait_until};
    use rstest::rstest;
    use std::thread;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    fn conns(n: usize) -> Arc<InMemoryConnectionPool<u32>> {
        Arc::new(InMemoryConnectionPool::from_fn(n, |i| i as u32))
    }

    fn wait_dispatched(pool: &WorkerPool<ProbeRequest>, n: u64) {
        assert!(wait_until(WAIT, || pool.counts().dispatched >= n));
    }

    #[rstest]
    #[case(0, 10)]
    #[case(4, 0)]
    fn zero_sizes_fail_construction(#[case] threads: usize, #[case] capacity: usize) {
        let result = WorkerPool::<ProbeRequest>::new(IoExternal, conns(1), threads, capacity);
        assert!(matches!(result, Err(PoolError::InvalidConfig(_))));
    }

    #[test]
    fn read_success_processes_with_connection() {
        let conns = conns(2);
        let pool = WorkerPool::<ProbeRequest>::new(IoInWorker, Arc::clone(&conns), 2, 16).unwrap();
        let request = Arc::new(ProbeRequest::new(0));

        assert!(pool.submit_with_phase(Arc::clone(&request), Phase::Read));
        wait_dispatched(&pool, 1);

        let state = request.state();
        assert!(state.is_improved());
        assert!(!state.is_timed_out());
        assert_eq!(request.process_calls(), 1);
        assert!(request.saw_connection());
        assert_eq!(conns.outstanding(), 0);
        assert!(pool.shutdown().is_empty());
    }

    #[test]
    fn read_failure_sets_timeout_and_skips_process() {
        let pool = WorkerPool::<ProbeRequest>::new(IoInWorker, conns(1), 1, 16).unwrap();
        let request = Arc::new(ProbeRequest::new(0).failing_read());

        assert!(pool.submit_with_phase(Arc::clone(&request), Phase::Read));
        wait_dispatched(&pool, 1);

        assert!(request.state().is_improved());
        assert!(request.state().is_timed_out());
        assert_eq!(request.process_calls(), 0);
        assert_eq!(pool.counts().io_failures, 1);
    }

    #[rstest]
    #[case(Phase::Read)]
    #[case(Phase::Write)]
    fn io_external_processes_regardless_of_phase(#[case] phase: Phase) {
        let pool = WorkerPool::<ProbeRequest>::new(IoExternal, conns(1), 2, 16).unwrap();
        let request = Arc::new(ProbeRequest::new(0).with_phase(phase));

        assert!(pool.submit(Arc::clone(&request)));
        wait_dispatched(&pool, 1);

        assert_eq!(request.process_calls(), 1);
        assert_eq!(request.read_calls() + request.write_calls(), 0);
        assert!(!request.state().is_improved());
        assert!(!request.state().is_timed_out());
    }

    #[test]
    fn saturated_queue_rejects_until_a_worker_drains() {
        let conns = conns(1);
        // ワーカーを acquire で止めておく
        let held = conns.acquire().unwrap();
        let pool = WorkerPool::<ProbeRequest>::new(IoExternal, Arc::clone(&conns), 1, 2).unwrap();

        assert!(pool.submit(Arc::new(ProbeRequest::new(0))));
        assert!(wait_until(WAIT, || pool.queued() == 0));

        let results: Vec<bool> = (1..=3)
            .map(|i| pool.submit(Arc::new(ProbeRequest::new(i))))
            .collect();
        assert_eq!(results, vec![true, true, false]);
        assert_eq!(pool.counts().rejected, 1);

        conns.release(held);
        assert!(wait_until(WAIT, || pool.queued() < 2));
        assert!(pool.submit(Arc::new(ProbeRequest::new(4))));

        wait_dispatched(&pool, 4);
        let counts = pool.counts();
        assert_eq!(counts.accepted, 4);
        assert_eq!(counts.rejected, 1);
    }

    #[test]
    fn shutdown_returns_undispatched_requests_in_order() {
        let conns = conns(1);
        let held = conns.acquire().unwrap();
        let pool = WorkerPool::<ProbeRequest>::new(IoExternal, Arc::clone(&conns), 1, 8).unwrap();
        let queue = Arc::clone(&pool.queue);

        for i in 0..3 {
            assert!(pool.submit(Arc::new(ProbeRequest::new(i))));
        }
        assert!(wait_until(WAIT, || pool.queued() == 2));

        let stopper = thread::spawn(move || pool.shutdown());
        assert!(wait_until(WAIT, || queue.is_closed()));
        conns.release(held);

        let ids: Vec<usize> = stopper.join().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(conns.outstanding(), 0);
    }

    #[test]
    fn counts_report_shape() {
        let pool = WorkerPool::<ProbeRequest>::new(IoExternal, conns(1), 3, 7).unwrap();
        let counts = pool.counts();
        assert_eq!(counts.workers, 3);
        assert_eq!(counts.capacity, 7);
        assert_eq!(counts.queued, 0);
        assert_eq!(pool.thread_number(), 3);
        assert_eq!(pool.max_requests(), 7);
    }
}
