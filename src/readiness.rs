//! Bounded availability polling.
//!
//! [`wait_until_ready`] calls a probe at a fixed interval until it reports
//! ready or the attempt budget runs out. It never loops forever and never
//! fails: running out of attempts is an ordinary [`Readiness::TimedOut`].

use std::future::Future;
use std::time::Duration;

use crate::config::ReadinessConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready { attempts: u32 },
    TimedOut { attempts: u32 },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Poll `probe` up to `max_attempts` times (at least once), sleeping
/// `interval` between attempts.
pub async fn wait_until_ready<F, Fut>(mut probe: F, interval: Duration, max_attempts: u32) -> Readiness
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let max_attempts = max_attempts.max(1);
    for attempt in 1..=max_attempts {
        if probe().await {
            return Readiness::Ready { attempts: attempt };
        }
        if attempt < max_attempts {
            tokio::time::sleep(interval).await;
        }
    }
    Readiness::TimedOut {
        attempts: max_attempts,
    }
}

/// [`wait_until_ready`] with the interval and budget from configuration.
pub async fn wait_with_config<F, Fut>(probe: F, config: &ReadinessConfig) -> Readiness
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    wait_until_ready(
        probe,
        Duration::from_millis(config.interval_ms),
        config.max_attempts,
    )
    .await
}
