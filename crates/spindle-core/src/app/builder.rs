//! PoolBuilder - プールの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）: スレッドを起動する前に設定を検証する

use std::sync::Arc;

use crate::app::{PoolConfig, WorkerPool};
use crate::domain::{ActorModel, Request};
use crate::error::PoolError;
use crate::ports::{ConnectionPool, DispatchStrategy};

/// PoolBuilder はワーカープールを構築
///
/// # 使用例
/// ```
/// use std::sync::Arc;
/// use spindle_core::app::PoolBuilder;
/// use spindle_core::domain::{Request, RequestState};
/// use spindle_core::impls::{InMemoryConnectionPool, IoInWorker};
///
/// struct Ping(RequestState);
///
/// impl Request for Ping {
///     type Conn = ();
///     fn state(&self) -> &RequestState { &self.0 }
///     fn perform_read(&self) -> bool { true }
///     fn perform_write(&self) -> bool { true }
///     fn process(&self, _conn: Option<&mut ()>) {}
/// }
///
/// let pool = PoolBuilder::new(IoInWorker)
///     .thread_number(2)
///     .max_requests(16)
///     .build::<Ping, _>(Arc::new(InMemoryConnectionPool::new(vec![()])))?;
/// assert_eq!(pool.thread_number(), 2);
/// pool.shutdown();
/// # Ok::<(), spindle_core::error::PoolError>(())
/// ```
///
/// # Fail-fast 設計
/// - build() 時に `PoolConfig::validate()` を通す
/// - 失敗すればスレッドは 1 本も起動しない
pub struct PoolBuilder<D> {
    strategy: D,
    config: PoolConfig,
}

impl<D: DispatchStrategy> PoolBuilder<D> {
    /// デフォルト設定で新しい PoolBuilder を作成
    pub fn new(strategy: D) -> Self {
        Self {
            strategy,
            config: PoolConfig::default(),
        }
    }

    pub fn thread_number(mut self, n: usize) -> Self {
        self.config.thread_number = n;
        self
    }

    pub fn max_requests(mut self, n: usize) -> Self {
        self.config.max_requests = n;
        self
    }

    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.config.stack_size = Some(bytes);
        self
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// 検証してからワーカーを起動する
    ///
    /// # エラー
    /// - `PoolError::InvalidConfig`: スレッド数または容量が 0
    /// - `PoolError::Spawn`: スレッド起動失敗（起動済みのものは停止・join 済み）
    pub fn build<R, P>(self, conns: Arc<P>) -> Result<WorkerPool<R>, PoolError>
    where
        R: Request,
        P: ConnectionPool<Conn = R::Conn>,
    {
        self.config.validate()?;
        WorkerPool::start(self.strategy, conns, &self.config)
    }
}

impl PoolBuilder<ActorModel> {
    /// 設定ファイルや環境変数から読んだ `PoolConfig` で構築する。
    /// 戦略は `config.actor_model` で決まる。
    pub fn from_config(config: PoolConfig) -> Self {
        Self {
            strategy: config.actor_model,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Phase;
    use crate::impls::{InMemoryConnectionPool, IoExternal};
    use crate::testing::{ProbeRequest, wait_until};
    use rstest::rstest;
    use std::time::Duration;

    fn conns() -> Arc<InMemoryConnectionPool<u32>> {
        Arc::new(InMemoryConnectionPool::from_fn(2, |i| i as u32))
    }

    #[test]
    fn test_build_success() {
        let pool = PoolBuilder::new(IoExternal)
            .thread_number(3)
            .max_requests(5)
            .thread_name_prefix("test-pool")
            .build::<ProbeRequest, _>(conns())
            .unwrap();

        assert_eq!(pool.thread_number(), 3);
        assert_eq!(pool.max_requests(), 5);
        assert!(pool.shutdown().is_empty());
    }

    #[rstest]
    #[case(0, 5)]
    #[case(2, 0)]
    fn test_build_rejects_invalid_config(#[case] threads: usize, #[case] capacity: usize) {
        let result = PoolBuilder::new(IoExternal)
            .thread_number(threads)
            .max_requests(capacity)
            .build::<ProbeRequest, _>(conns());
        assert!(matches!(result, Err(PoolError::InvalidConfig(_))));
    }

    #[rstest]
    #[case(ActorModel::IoInWorker, true)]
    #[case(ActorModel::IoExternal, false)]
    fn test_from_config_picks_strategy(#[case] model: ActorModel, #[case] reads: bool) {
        let config = PoolConfig {
            actor_model: model,
            thread_number: 1,
            max_requests: 4,
            ..PoolConfig::default()
        };
        let builder = PoolBuilder::from_config(config);
        assert_eq!(builder.config().actor_model, model);

        let pool = builder.build::<ProbeRequest, _>(conns()).unwrap();
        let request = Arc::new(ProbeRequest::new(0));
        assert!(pool.submit_with_phase(Arc::clone(&request), Phase::Read));
        assert!(wait_until(Duration::from_secs(5), || {
            pool.counts().dispatched == 1
        }));

        assert_eq!(request.read_calls() == 1, reads);
        assert_eq!(request.state().is_improved(), reads);
        assert_eq!(request.process_calls(), 1);
    }
}
