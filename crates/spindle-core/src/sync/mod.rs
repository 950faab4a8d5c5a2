//! Sync - 同期プリミティブ
//!
//! ワーカープールが使う 3 つの同期部品をまとめています。
//!
//! # 含まれる型
//! - **Locker**: 排他ロック（guard を drop すると unlock）
//! - **Cond**: 条件変数（wait / timed_wait / signal / broadcast）
//! - **Sem**: カウンティングセマフォ（wait / post）
//!
//! いずれも `parking_lot` の上に薄く載せたもので、初期化は失敗しません。
//! ロックは poison されないため、dispatch 中に panic したワーカーがいても
//! キューはそのまま使い続けられます。

mod cond;
mod locker;
mod sem;

pub use self::cond::Cond;
pub use self::locker::{Locker, LockerGuard};
pub use self::sem::Sem;
