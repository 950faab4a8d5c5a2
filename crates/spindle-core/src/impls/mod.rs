//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryConnectionPool**: 開発・テスト用の接続プール
//! - **IoInWorker / IoExternal**: DispatchStrategy の 2 モデル
//!
//! # 本番用実装
//! 実際の DB 接続プールは利用側のクレートで `ConnectionPool` を実装してください。

pub mod dispatch;
pub mod inmem_pool;

// 主要な型を再エクスポート
pub use self::dispatch::{IoExternal, IoInWorker};
pub use self::inmem_pool::InMemoryConnectionPool;
