//! App - アプリケーション層
//!
//! ports と queue / worker を組み合わせて、プロデューサーが触るプールを組み立てます。
//!
//! # 主要コンポーネント
//! - **PoolConfig**: 設定値（デフォルト・環境変数・検証）
//! - **PoolBuilder**: 構築とワイヤリング（Fail-fast）
//! - **WorkerPool**: submit / counts / shutdown

pub mod builder;
pub mod config;
pub mod pool;

// 主要な型を再エクスポート
pub use self::builder::PoolBuilder;
pub use self::config::PoolConfig;
pub use self::pool::WorkerPool;
