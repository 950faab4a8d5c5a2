//! ConnectionPool port - 共有リソース（DB 接続など）の貸し出し
//!
//! ワーカーは `process` 1 回分だけ接続を借り、必ず返します。
//! 返却は [`PooledConn`] の drop で行うので、`process` が panic しても漏れません。
//!
//! # 実装
//! - **InMemoryConnectionPool**: 開発・テスト用（`impls::inmem_pool`）

/// ConnectionPool は接続の acquire / release だけを公開する
///
/// # 設計原則
/// - `acquire` は枯渇時にブロックしてよい（待ち方は実装に任せる）
/// - 渡せる接続がなければ `None`
/// - `Send + Sync`（全ワーカーから共有される）
pub trait ConnectionPool: Send + Sync + 'static {
    type Conn: Send;

    fn acquire(&self) -> Option<Self::Conn>;

    fn release(&self, conn: Self::Conn);
}

/// PooledConn はスコープ付きの接続貸し出し
///
/// 生成時に acquire、drop 時に release する。
///
/// # 使用例
/// ```ignore
/// {
///     let mut conn = PooledConn::acquire(pool);
///     request.process(conn.get_mut());
/// } // ここで release
/// ```
pub struct PooledConn<'a, P: ConnectionPool + ?Sized> {
    pool: &'a P,
    conn: Option<P::Conn>,
}

impl<'a, P: ConnectionPool + ?Sized> PooledConn<'a, P> {
    pub fn acquire(pool: &'a P) -> Self {
        let conn = pool.acquire();
        if conn.is_none() {
            tracing::warn!("connection pool returned no connection");
        }
        Self { pool, conn }
    }

    pub fn is_acquired(&self) -> bool {
        self.conn.is_some()
    }

    pub fn get_mut(&mut self) -> Option<&mut P::Conn> {
        self.conn.as_mut()
    }
}

impl<P: ConnectionPool + ?Sized> Drop for PooledConn<'_, P> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}
