use chrono::{DateTime, Utc};
use std::time::Duration;

/// Abstraction over wall-clock time and sleeping, so retry/timeout logic
/// (the external-failure controller's graceful-stop deadline, the
/// supervisor's retry delay) can be driven deterministically in tests.
#[async_trait::async_trait]
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;

    /// Suspend the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// The real system clock, backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait::async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn system_clock_sleeps_and_advances() {
        let clock = SystemClock;
        let before = clock.now();
        clock.sleep(Duration::from_millis(1)).await;
        let after = clock.now();
        assert!(after >= before);
    }
}
