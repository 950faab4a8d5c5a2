//! DispatchStrategy port - 取り出したリクエストをどう実行するか
//!
//! # 実装
//! - **IoInWorker**: ワーカー自身が read/write してから process
//! - **IoExternal**: I/O は済んでいる前提で process のみ
//! - **ActorModel**: 設定値から上の 2 つに委譲する enum

use crate::domain::Request;
use crate::ports::ConnectionPool;

/// What a single dispatch did. Used for counters only; the request itself
/// learns the outcome through its [`RequestState`](crate::domain::RequestState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
    /// `process` ran (with or without a connection).
    Processed,

    /// The write step succeeded; nothing else to do.
    Written,

    /// The read or write step failed; the request is flagged for the timer.
    IoFailed,
}

/// DispatchStrategy は 1 リクエスト分の実行方針
///
/// # 設計原則
/// - 失敗は戻り値とフラグで伝える（ワーカーループを巻き戻さない）
/// - 接続はこの呼び出しの中だけで借りて返す
/// - `Send + Sync`（全ワーカーが `Arc` で共有する）
pub trait DispatchStrategy: Send + Sync + 'static {
    fn dispatch<R, P>(&self, request: &R, conns: &P) -> DispatchOutcome
    where
        R: Request,
        P: ConnectionPool<Conn = R::Conn>;
}
