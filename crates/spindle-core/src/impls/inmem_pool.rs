//! InMemoryConnectionPool - 開発用の接続プール
//!
//! # 実装詳細
//! - 空き接続を `Locker<Vec<C>>` で保持
//! - 空き数を `Sem` で数える（枯渇中の acquire はここで待つ）
//! - acquire タイムアウトを指定すると、待ち切れなかった時に `None` を返す

use std::time::Duration;

use crate::ports::ConnectionPool;
use crate::sync::{Locker, Sem};

/// InMemoryConnectionPool は固定個数の接続を貸し出す
///
/// # 使用例
/// ```
/// use spindle_core::impls::InMemoryConnectionPool;
/// use spindle_core::ports::ConnectionPool;
///
/// let pool = InMemoryConnectionPool::from_fn(2, |i| format!("conn-{i}"));
/// let conn = pool.acquire().unwrap();
/// assert_eq!(pool.outstanding(), 1);
/// pool.release(conn);
/// assert_eq!(pool.outstanding(), 0);
/// ```
#[derive(Debug)]
pub struct InMemoryConnectionPool<C> {
    free: Locker<Vec<C>>,
    available: Sem,
    size: usize,
    acquire_timeout: Option<Duration>,
}

impl<C> InMemoryConnectionPool<C> {
    pub fn new(conns: Vec<C>) -> Self {
        let size = conns.len();
        Self {
            free: Locker::new(conns),
            available: Sem::new(size),
            size,
            acquire_timeout: None,
        }
    }

    /// `size` 個の接続を `make(index)` で作る
    pub fn from_fn(size: usize, make: impl FnMut(usize) -> C) -> Self {
        Self::new((0..size).map(make).collect())
    }

    /// 枯渇時に待つ上限。指定しなければ返却されるまで待ち続ける。
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// 貸し出し中の接続数
    pub fn outstanding(&self) -> usize {
        self.size - self.free.lock().len()
    }

    pub fn free_count(&self) -> usize {
        self.free.lock().len()
    }
}

impl<C: Send + 'static> ConnectionPool for InMemoryConnectionPool<C> {
    type Conn = C;

    fn acquire(&self) -> Option<C> {
        match self.acquire_timeout {
            Some(timeout) => {
                if !self.available.wait_timeout(timeout) {
                    tracing::debug!(?timeout, size = self.size, "connection acquire timed out");
                    return None;
                }
            }
            None => self.available.wait(),
        }
        // Sem の count と free.len() は常に一致するので、ここで空にはならない
        self.free.lock().pop()
    }

    fn release(&self, conn: C) {
        self.free.lock().push(conn);
        self.available.post();
    }
}
