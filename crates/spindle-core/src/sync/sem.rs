//! Sem - カウンティングセマフォ
//!
//! # 実装
//! - カウンタを [`Locker`] で保護
//! - [`Cond`] で post 時に待機スレッドを起こす

use std::time::{Duration, Instant};

use super::{Cond, Locker};

/// Sem はカウンティングセマフォ
///
/// - `wait()`: count > 0 になるまで待ち、1 減らす
/// - `post()`: 1 増やして待機スレッドを 1 つ起こす
#[derive(Debug, Default)]
pub struct Sem {
    count: Locker<usize>,
    cond: Cond,
}

impl Sem {
    /// 初期値 `initial` のセマフォを作成（`Default` は 0）
    pub fn new(initial: usize) -> Self {
        Self {
            count: Locker::new(initial),
            cond: Cond::new(),
        }
    }

    pub fn wait(&self) {
        let mut count = self.count.lock();
        while *count == 0 {
            self.cond.wait(&mut count);
        }
        *count -= 1;
    }

    /// ブロックせずに 1 減らせたら `true`
    pub fn try_wait(&self) -> bool {
        let mut count = self.count.lock();
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }

    /// 最大 `timeout` だけ待つ。取得できなければ `false`。
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.count.lock();
        while *count == 0 {
            if !self.cond.timed_wait(&mut count, deadline) && *count == 0 {
                return false;
            }
        }
        *count -= 1;
        true
    }

    pub fn post(&self) {
        self.post_n(1);
    }

    /// `n` 回分まとめて post する
    pub fn post_n(&self, n: usize) {
        if n == 0 {
            return;
        }
        {
            let mut count = self.count.lock();
            *count += n;
        }
        if n == 1 {
            self.cond.signal();
        } else {
            self.cond.broadcast();
        }
    }

    /// 現在のカウント（観測用。読んだ直後に変わり得る）
    pub fn count(&self) -> usize {
        *self.count.lock()
    }
}
