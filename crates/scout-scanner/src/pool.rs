//! Fixed-size pool of browser sessions.
//!
//! A session is only ever driven by one resolution at a time: callers
//! borrow one with [`SessionPool::acquire`] and it goes back when the guard
//! drops. When all sessions are busy, callers wait.

use crate::error::{Result, ScanError};
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::debug;

pub struct SessionPool<S> {
    idle: Mutex<Vec<S>>,
    permits: Semaphore,
    size: usize,
}

impl<S> SessionPool<S> {
    pub fn new(sessions: Vec<S>) -> Self {
        let size = sessions.len();
        Self {
            idle: Mutex::new(sessions),
            permits: Semaphore::new(size),
            size,
        }
    }

    /// Number of sessions the pool was created with.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Sessions not currently borrowed.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    fn idle(&self) -> MutexGuard<'_, Vec<S>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for a free session. A pool without sessions never has one to
    /// give, so it counts as closed.
    pub async fn acquire(&self) -> Result<PooledSession<'_, S>> {
        if self.size == 0 {
            return Err(ScanError::PoolClosed);
        }

        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ScanError::PoolClosed)?;

        // a permit always has an idle session behind it
        let session = self.idle().pop().ok_or(ScanError::PoolClosed)?;

        Ok(PooledSession {
            session: Some(session),
            pool: self,
            _permit: permit,
        })
    }

    /// Wait for every session to come back, close the pool and hand the
    /// sessions over for cleanup. Later `acquire` calls fail.
    pub async fn drain(&self) -> Vec<S> {
        let total = u32::try_from(self.size).unwrap_or(u32::MAX);
        match self.permits.acquire_many(total).await {
            Ok(all) => {
                self.permits.close();
                drop(all);
            }
            Err(_) => debug!("Session pool already closed"),
        }
        std::mem::take(&mut *self.idle())
    }
}

/// A borrowed session; returned to the pool on drop.
pub struct PooledSession<'a, S> {
    session: Option<S>,
    pool: &'a SessionPool<S>,
    _permit: SemaphorePermit<'a>,
}

impl<S> Deref for PooledSession<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        // only taken in drop
        match &self.session {
            Some(session) => session,
            None => unreachable!("pooled session used after release"),
        }
    }
}

impl<S> Drop for PooledSession<'_, S> {
    fn drop(&mut self) {
        // returned before the permit is released (fields drop after this)
        if let Some(session) = self.session.take() {
            self.pool.idle().push(session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_acquire_and_return() {
        let pool = SessionPool::new(vec!["a", "b"]);
        assert_eq!(pool.size(), 2);

        let first = pool.acquire().await.unwrap();
        let second = pool.acquire().await.unwrap();
        assert_ne!(*first, *second);
        assert_eq!(pool.available(), 0);

        drop(first);
        assert_eq!(pool.available(), 1);
        let third = pool.acquire().await.unwrap();
        assert!(*third == "a" || *third == "b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_when_exhausted() {
        let pool = Arc::new(SessionPool::new(vec![1]));
        let held = pool.acquire().await.unwrap();

        let waiter = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move {
                let value = *pool.acquire().await.unwrap();
                value
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(held);
        assert_eq!(waiter.await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_pool_is_closed() {
        let pool: SessionPool<u8> = SessionPool::new(Vec::new());
        assert!(matches!(pool.acquire().await, Err(ScanError::PoolClosed)));
    }

    #[tokio::test]
    async fn test_drain_closes_pool() {
        let pool = SessionPool::new(vec![1, 2, 3]);
        let mut sessions = pool.drain().await;
        sessions.sort_unstable();

        assert_eq!(sessions, vec![1, 2, 3]);
        assert!(pool.is_closed());
        assert!(matches!(pool.acquire().await, Err(ScanError::PoolClosed)));
        assert!(pool.drain().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_waits_for_borrowed_sessions() {
        let pool = Arc::new(SessionPool::new(vec![1, 2]));

        let (acquired_tx, acquired_rx) = tokio::sync::oneshot::channel();
        let borrower = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move {
                let _session = pool.acquire().await.unwrap();
                acquired_tx.send(()).unwrap();
                tokio::time::sleep(Duration::from_secs(1)).await;
            })
        };
        acquired_rx.await.unwrap();

        let drained = pool.drain().await;
        borrower.await.unwrap();
        assert_eq!(drained.len(), 2);
    }
}
