use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::app::PoolConfig;
use crate::domain::Request;
use crate::error::PoolError;
use crate::observability::PoolStats;
use crate::ports::{ConnectionPool, DispatchStrategy};
use crate::queue::BoundedQueue;

/// ワーカースレッドの本体。spawner に渡される。
pub(crate) type WorkerMain = Box<dyn FnOnce() + Send + 'static>;

/// Worker group handle.
/// - 各ワーカーは queue / strategy / conns を `Arc` で共有する（生ポインタの逆参照はしない）
/// - `request_shutdown()` でキューを close し、待機中のワーカーを起こす
/// - drop 時も close + join するので、スレッドが宙に浮くことはない
pub struct WorkerGroup<R> {
    queue: Arc<BoundedQueue<R>>,
    joins: Vec<JoinHandle<()>>,
}

impl<R: Request> WorkerGroup<R> {
    /// Spawn `config.thread_number` workers consuming `queue`.
    ///
    /// If any spawn fails, the workers already started are stopped and joined
    /// before the error is returned.
    pub(crate) fn spawn<D, P>(
        config: &PoolConfig,
        queue: Arc<BoundedQueue<R>>,
        strategy: Arc<D>,
        conns: Arc<P>,
        stats: Arc<PoolStats>,
    ) -> Result<Self, PoolError>
    where
        D: DispatchStrategy,
        P: ConnectionPool<Conn = R::Conn>,
    {
        Self::spawn_with(config, queue, strategy, conns, stats, |_, builder, main| {
            builder.spawn(main)
        })
    }

    /// `spawn` with the actual thread start delegated to `spawner`.
    pub(crate) fn spawn_with<D, P, S>(
        config: &PoolConfig,
        queue: Arc<BoundedQueue<R>>,
        strategy: Arc<D>,
        conns: Arc<P>,
        stats: Arc<PoolStats>,
        mut spawner: S,
    ) -> Result<Self, PoolError>
    where
        D: DispatchStrategy,
        P: ConnectionPool<Conn = R::Conn>,
        S: FnMut(usize, thread::Builder, WorkerMain) -> io::Result<JoinHandle<()>>,
    {
        let mut group = Self {
            queue,
            joins: Vec::with_capacity(config.thread_number),
        };

        for worker_id in 0..config.thread_number {
            let mut builder =
                thread::Builder::new().name(format!("{}-{worker_id}", config.thread_name_prefix));
            if let Some(bytes) = config.stack_size {
                builder = builder.stack_size(bytes);
            }

            let q = Arc::clone(&group.queue);
            let s = Arc::clone(&strategy);
            let c = Arc::clone(&conns);
            let st = Arc::clone(&stats);

            let main: WorkerMain = Box::new(move || worker_loop(worker_id, q, s, c, st));
            match spawner(worker_id, builder, main) {
                Ok(join) => group.joins.push(join),
                Err(source) => {
                    tracing::error!(
                        worker_id,
                        started = group.joins.len(),
                        error = %source,
                        "failed to spawn worker; stopping the ones already running"
                    );
                    group.stop();
                    return Err(PoolError::Spawn {
                        index: worker_id,
                        source,
                    });
                }
            }
        }

        Ok(group)
    }
}

impl<R> WorkerGroup<R> {
    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    /// Close the queue and wake every worker.
    /// 実行中の dispatch は止めない。終わり次第ループを抜ける。
    pub fn request_shutdown(&self) {
        self.queue.close(self.joins.len());
    }

    /// Shutdown and wait for all workers.
    pub fn shutdown_and_join(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if self.joins.is_empty() {
            return;
        }
        self.request_shutdown();
        for join in self.joins.drain(..) {
            let name = join.thread().name().map(str::to_owned);
            if join.join().is_err() {
                tracing::warn!(worker = ?name, "worker thread terminated by panic");
            }
        }
    }
}

impl<R> Drop for WorkerGroup<R> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop<R, D, P>(
    worker_id: usize,
    queue: Arc<BoundedQueue<R>>,
    strategy: Arc<D>,
    conns: Arc<P>,
    stats: Arc<PoolStats>,
) where
    R: Request,
    D: DispatchStrategy,
    P: ConnectionPool<Conn = R::Conn>,
{
    tracing::debug!(worker_id, "worker started");

    // take() は close されると None を返す
    while let Some(request) = queue.take() {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            strategy.dispatch(request.as_ref(), conns.as_ref())
        }));

        match result {
            Ok(outcome) => stats.record_dispatch(outcome),
            Err(payload) => {
                stats.record_panic();
                tracing::error!(
                    worker_id,
                    panic = %panic_message(payload.as_ref()),
                    "dispatch panicked; worker continues with the next request"
                );
            }
        }
        // ここで手放すのはプールが持っていた参照だけ。破棄はプロデューサー側の責務。
    }

    tracing::debug!(worker_id, "worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
