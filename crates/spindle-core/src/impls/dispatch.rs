//! IoInWorker / IoExternal - 2 つの actor model
//!
//! `ActorModel` enum も DispatchStrategy を実装し、設定値から選んだ方に委譲します。

use crate::domain::{ActorModel, Phase, Request};
use crate::ports::{ConnectionPool, DispatchOutcome, DispatchStrategy, PooledConn};

/// ワーカーが read / write まで担当するモデル
///
/// - Read: read 成功 → improved → 接続を借りて process
/// - Write: write の結果だけ反映
/// - I/O 失敗時は improved と timed_out の両方を立て、process は呼ばない
#[derive(Debug, Clone, Copy, Default)]
pub struct IoInWorker;

/// I/O は別の仕組みで済んでいるモデル
///
/// phase を見ずに接続を借りて process するだけ。フラグは触らない。
#[derive(Debug, Clone, Copy, Default)]
pub struct IoExternal;

impl DispatchStrategy for IoInWorker {
    fn dispatch<R, P>(&self, request: &R, conns: &P) -> DispatchOutcome
    where
        R: Request,
        P: ConnectionPool<Conn = R::Conn>,
    {
        let state = request.state();
        match state.phase() {
            Phase::Read => {
                if request.perform_read() {
                    state.mark_improved();
                    let mut conn = PooledConn::acquire(conns);
                    request.process(conn.get_mut());
                    DispatchOutcome::Processed
                } else {
                    tracing::debug!("read failed; flagging request for the timer");
                    state.mark_improved();
                    state.mark_timed_out();
                    DispatchOutcome::IoFailed
                }
            }
            Phase::Write => {
                if request.perform_write() {
                    state.mark_improved();
                    DispatchOutcome::Written
                } else {
                    tracing::debug!("write failed; flagging request for the timer");
                    state.mark_improved();
                    state.mark_timed_out();
                    DispatchOutcome::IoFailed
                }
            }
        }
    }
}

impl DispatchStrategy for IoExternal {
    fn dispatch<R, P>(&self, request: &R, conns: &P) -> DispatchOutcome
    where
        R: Request,
        P: ConnectionPool<Conn = R::Conn>,
    {
        let mut conn = PooledConn::acquire(conns);
        request.process(conn.get_mut());
        DispatchOutcome::Processed
    }
}

impl DispatchStrategy for ActorModel {
    fn dispatch<R, P>(&self, request: &R, conns: &P) -> DispatchOutcome
    where
        R: Request,
        P: ConnectionPool<Conn = R::Conn>,
    {
        match self {
            ActorModel::IoInWorker => IoInWorker.dispatch(request, conns),
            ActorModel::IoExternal => IoExternal.dispatch(request, conns),
        }
    }
}
