//! spindle-core
//!
//! Fixed-size worker thread pool fed by a bounded request queue.
//!
//! # モジュール構成
//! - **sync**: Locker / Cond / Sem（parking_lot ベースの同期プリミティブ）
//! - **domain**: Request trait, RequestState, Phase, ActorModel
//! - **ports**: 抽象化レイヤー（ConnectionPool, DispatchStrategy）
//! - **impls**: 実装（IoInWorker / IoExternal, InMemoryConnectionPool）
//! - **queue**: BoundedQueue
//! - **worker**: ワーカースレッド群
//! - **app**: PoolConfig, PoolBuilder, WorkerPool
//! - **observability**: PoolCounts
//!
//! # 流れ
//! 1. プロデューサーが `Arc<R>` を作り、phase を決めて `submit` する
//! 2. 満杯なら `false` が返る（ブロックしない）
//! 3. 空いているワーカーが 1 件取り出し、DispatchStrategy で実行する
//! 4. 結果は RequestState のフラグ（improved / timed_out）で返る

pub mod app;
pub mod domain;
pub mod error;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod queue;
pub mod sync;
pub mod worker;

#[cfg(test)]
mod testing;

pub use app::{PoolBuilder, PoolConfig, WorkerPool};
pub use domain::{ActorModel, Phase, Request, RequestState};
pub use error::{ConfigError, PoolError};
pub use observability::PoolCounts;
pub use ports::{ConnectionPool, DispatchOutcome, DispatchStrategy, PooledConn};
