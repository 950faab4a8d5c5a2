//! Cond - 条件変数

use std::time::Instant;

use parking_lot::Condvar;

use super::LockerGuard;

/// Cond は [`Locker`](super::Locker) の guard と組み合わせて使う条件変数
///
/// spurious wakeup はあり得るので、呼び出し側は条件をループで再確認すること。
#[derive(Debug, Default)]
pub struct Cond {
    inner: Condvar,
}

impl Cond {
    pub fn new() -> Self {
        Self {
            inner: Condvar::new(),
        }
    }

    /// signal されるまでブロック。戻る時点でロックは再取得済み。
    pub fn wait<T>(&self, guard: &mut LockerGuard<'_, T>) {
        self.inner.wait(guard);
    }

    /// `deadline` まで待つ。signal で起きたら `true`、タイムアウトなら `false`。
    pub fn timed_wait<T>(&self, guard: &mut LockerGuard<'_, T>, deadline: Instant) -> bool {
        !self.inner.wait_until(guard, deadline).timed_out()
    }

    /// 待機中のスレッドを 1 つ起こす。起こせたかどうかを返す。
    pub fn signal(&self) -> bool {
        self.inner.notify_one()
    }

    /// 待機中の全スレッドを起こし、起こした数を返す。
    pub fn broadcast(&self) -> usize {
        self.inner.notify_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::Locker;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn timed_wait_times_out_without_signal() {
        let locker = Locker::new(());
        let cond = Cond::new();
        let mut guard = locker.lock();
        let signaled = cond.timed_wait(&mut guard, Instant::now() + Duration::from_millis(20));
        assert!(!signaled);
    }

    #[test]
    fn signal_without_waiters_wakes_nobody() {
        let cond = Cond::new();
        assert!(!cond.signal());
        assert_eq!(cond.broadcast(), 0);
    }

    #[test]
    fn broadcast_releases_all_waiters() {
        let shared = Arc::new((Locker::new(false), Cond::new()));
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    let (locker, cond) = &*shared;
                    let mut ready = locker.lock();
                    while !*ready {
                        cond.wait(&mut ready);
                    }
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        {
            let (locker, cond) = &*shared;
            *locker.lock() = true;
            cond.broadcast();
        }

        for h in handles {
            h.join().unwrap();
        }
    }
}
