//! Deadline Timer
//!
//! One-shot deferred trigger for a session deadline. Firing and cancelling
//! race through a single compare-and-set on the timer state, so exactly one
//! of them wins: either `cancel` returns `true` and the callback never runs,
//! or the callback runs and `cancel` returns `false`.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::error::{BattleError, BattleResult};

const IDLE: u8 = 0;
const ARMED: u8 = 1;
const FIRED: u8 = 2;
const CANCELLED: u8 = 3;

#[derive(Debug)]
pub struct DeadlineTimer {
    state: Arc<AtomicU8>,
    handle: Option<JoinHandle<()>>,
}

impl DeadlineTimer {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(IDLE)),
            handle: None,
        }
    }

    /// Schedule `on_fire` to run once after `duration`.
    ///
    /// A timer can be armed once in its lifetime; any further call fails with
    /// [`BattleError::AlreadyArmed`]. Must be called from within a Tokio runtime.
    pub fn arm<F, Fut>(&mut self, duration: Duration, on_fire: F) -> BattleResult<()>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self
            .state
            .compare_exchange(IDLE, ARMED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BattleError::AlreadyArmed);
        }

        let state = Arc::clone(&self.state);
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if state
                .compare_exchange(ARMED, FIRED, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                tracing::debug!(after = ?duration, "Deadline timer fired");
                on_fire().await;
            }
        }));

        Ok(())
    }

    /// Prevent a pending fire.
    ///
    /// Returns `false` if the timer already fired, was already cancelled, or
    /// was never armed.
    pub fn cancel(&mut self) -> bool {
        let won = self
            .state
            .compare_exchange(ARMED, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            // Only abort a task that is still sleeping; a fired task may be
            // in the middle of its callback.
            if let Some(handle) = self.handle.take() {
                handle.abort();
            }
        }
        won
    }

    pub fn is_armed(&self) -> bool {
        self.state.load(Ordering::Acquire) == ARMED
    }

    pub fn has_fired(&self) -> bool {
        self.state.load(Ordering::Acquire) == FIRED
    }
}

impl Default for DeadlineTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_callback(
        counter: &Arc<AtomicUsize>,
    ) -> impl FnOnce() -> std::future::Ready<()> + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_duration() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DeadlineTimer::new();
        timer
            .arm(Duration::from_secs(300), counting_callback(&fired))
            .unwrap();
        assert!(timer.is_armed());

        tokio::time::sleep(Duration::from_secs(299)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(timer.has_fired());
        assert!(!timer.cancel(), "cancel after fire is ineffective");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_fire() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DeadlineTimer::new();
        timer
            .arm(Duration::from_secs(10), counting_callback(&fired))
            .unwrap();

        assert!(timer.cancel());
        assert!(!timer.cancel(), "second cancel is a no-op");

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_never_armed() {
        let mut timer = DeadlineTimer::new();
        assert!(!timer.cancel());
    }

    #[tokio::test]
    async fn test_arm_twice_is_rejected() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DeadlineTimer::new();
        timer
            .arm(Duration::from_secs(10), counting_callback(&fired))
            .unwrap();
        assert!(matches!(
            timer.arm(Duration::from_secs(10), counting_callback(&fired)),
            Err(BattleError::AlreadyArmed)
        ));

        timer.cancel();
        assert!(matches!(
            timer.arm(Duration::from_secs(10), counting_callback(&fired)),
            Err(BattleError::AlreadyArmed)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let mut timer = DeadlineTimer::new();
            timer
                .arm(Duration::from_secs(5), counting_callback(&fired))
                .unwrap();
        }
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cancel_and_fire_are_exclusive() {
        for _ in 0..200 {
            let fired = Arc::new(AtomicUsize::new(0));
            let mut timer = DeadlineTimer::new();
            timer
                .arm(Duration::from_micros(50), counting_callback(&fired))
                .unwrap();

            tokio::time::sleep(Duration::from_micros(50)).await;
            let cancelled = timer.cancel();
            // Give a fired callback time to finish.
            tokio::time::sleep(Duration::from_millis(2)).await;

            let fire_count = fired.load(Ordering::SeqCst);
            assert!(fire_count <= 1);
            assert_ne!(cancelled, fire_count == 1, "exactly one side must win");
        }
    }
}
