//! Locker - 排他ロック

use parking_lot::{Mutex, MutexGuard};

/// `lock()` が返す guard。drop した時点で unlock される。
pub type LockerGuard<'a, T> = MutexGuard<'a, T>;

/// Locker は保護対象の値ごと持つ排他ロック
///
/// # 使用例
/// ```
/// use spindle_core::sync::Locker;
///
/// let locker = Locker::new(Vec::new());
/// {
///     let mut items = locker.lock();
///     items.push(1);
/// } // ここで unlock
/// assert_eq!(locker.lock().len(), 1);
/// ```
///
/// 保持していないロックを unlock する手段は型で塞がれています
/// （unlock は guard の消費でしか起きない）。
#[derive(Debug, Default)]
pub struct Locker<T> {
    inner: Mutex<T>,
}

impl<T> Locker<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// ロックを取得（取れるまでブロック）
    pub fn lock(&self) -> LockerGuard<'_, T> {
        self.inner.lock()
    }

    /// ブロックせずにロックを試みる。保持中なら `None`。
    pub fn try_lock(&self) -> Option<LockerGuard<'_, T>> {
        self.inner.try_lock()
    }

    /// 明示的に unlock する（`drop(guard)` と同じ）
    pub fn unlock(guard: LockerGuard<'_, T>) {
        drop(guard);
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}
