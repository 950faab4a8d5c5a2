//! Ports - 抽象化レイヤー
//!
//! ワーカープールが外部に依存する箇所を trait で切り出しています。
//!
//! - **ConnectionPool**: 接続の acquire / release（中身の管理アルゴリズムは外側の責務）
//! - **DispatchStrategy**: リクエスト 1 件の実行方針（actor model）

pub mod connection_pool;
pub mod dispatch;

// 主要な trait を再エクスポート
pub use self::connection_pool::{ConnectionPool, PooledConn};
pub use self::dispatch::{DispatchOutcome, DispatchStrategy};
