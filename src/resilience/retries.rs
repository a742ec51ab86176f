//! Retry logic.
//!
//! # Responsibilities
//! - Drive a probe for at most `max_attempts` attempts
//! - Sleep a fixed delay between failed attempts
//! - Report the last failure cause and the attempt count
//!
//! # State Transitions
//! ```text
//! Idle → Attempting
//! Attempting → Succeeded                 (first success, no trailing delay)
//! Attempting → Retrying → Attempting     (failure, attempts remain)
//! Attempting → Failed                    (failure, attempts exhausted)
//! Attempting | Retrying → Failed         (cancelled)
//! ```
//!
//! # Design Decisions
//! - Fixed delay, no jitter, no exponential growth: runs are short-lived smoke tests
//! - Only the last failure cause is kept
//! - Retrying is a loop iteration, never recursion
//! - Cancellation is checked while an attempt is in flight and while sleeping
//! - `Probe::enrich` runs once, after success, outside the attempt deadline

use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::lifecycle::Cancel;
use crate::probe::{FailureCause, Probe, ProbeResult, ProbeSuccess};
use crate::resilience::timeouts::with_deadline;

/// Invalid retry policy parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("max attempts must be at least 1")]
    ZeroAttempts,

    #[error("per-attempt timeout must be greater than zero")]
    ZeroTimeout,
}

/// How many times, and how often, a probe is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        delay: Duration,
        attempt_timeout: Duration,
    ) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        if attempt_timeout.is_zero() {
            return Err(PolicyError::ZeroTimeout);
        }
        Ok(Self {
            max_attempts,
            delay,
            attempt_timeout,
        })
    }

    /// 3 attempts, 1s apart, 5s per attempt.
    pub fn tcp_default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(5),
        }
    }

    /// Single attempt with a 5s timeout.
    pub fn http_default() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(5),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay between a failed attempt and the next one.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }
}

/// Applies a `RetryPolicy` to any `Probe`.
#[derive(Debug, Clone)]
pub struct RetryRunner {
    policy: RetryPolicy,
    cancel: Cancel,
}

impl RetryRunner {
    pub fn new(policy: RetryPolicy, cancel: Cancel) -> Self {
        Self { policy, cancel }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `probe` until it succeeds, attempts run out, or the run is cancelled.
    pub async fn run<P: Probe>(&self, probe: &P) -> ProbeResult {
        let target = probe.target();

        if self.cancel.is_cancelled() {
            info!(probe = %target, "Probe cancelled before first attempt");
            return ProbeResult::failed(FailureCause::Cancelled, 0);
        }

        let mut attempts = 0;
        loop {
            attempts += 1;
            debug!(probe = %target, attempt = attempts, max_attempts = self.policy.max_attempts, "Probe attempt");

            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!(probe = %target, attempt = attempts, "Probe cancelled during attempt");
                    return ProbeResult::failed(FailureCause::Cancelled, attempts);
                }
                outcome = with_deadline(self.policy.attempt_timeout, probe.attempt()) => outcome,
            };

            let cause = match outcome {
                Ok(success) => {
                    info!(probe = %target, attempts, "Probe succeeded");
                    let success = self.enrich(probe, success).await;
                    return ProbeResult::succeeded(success, attempts);
                }
                Err(cause) => cause,
            };

            if attempts >= self.policy.max_attempts {
                warn!(probe = %target, attempts, cause = %cause, "Probe failed, attempts exhausted");
                return ProbeResult::failed(cause, attempts);
            }

            warn!(
                probe = %target,
                attempt = attempts,
                delay = ?self.policy.delay,
                cause = %cause,
                "Probe attempt failed, retrying"
            );

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!(probe = %target, attempts, "Probe cancelled while waiting to retry");
                    return ProbeResult::failed(FailureCause::Cancelled, attempts);
                }
                _ = tokio::time::sleep(self.policy.delay) => {}
            }
        }
    }

    /// Enrichment follows a passed check, so it is outside the attempt
    /// deadline and a cancel here keeps the success.
    async fn enrich<P: Probe>(&self, probe: &P, success: ProbeSuccess) -> ProbeSuccess {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                info!(probe = %probe.target(), "Enrichment cancelled, keeping success");
                ProbeSuccess::with_warning("metadata fetch cancelled")
            }
            enriched = probe.enrich(success) => enriched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    /// Probe that replays a script of outcomes; the last one repeats.
    struct ScriptedProbe {
        script: Vec<Result<ProbeSuccess, FailureCause>>,
        calls: Arc<AtomicU32>,
        latency: Duration,
        /// How long `enrich` takes; `None` skips enrichment.
        enrich_latency: Option<Duration>,
    }

    impl ScriptedProbe {
        fn new(script: Vec<Result<ProbeSuccess, FailureCause>>) -> Self {
            Self {
                script,
                calls: Arc::new(AtomicU32::new(0)),
                latency: Duration::ZERO,
                enrich_latency: None,
            }
        }

        fn always_failing() -> Self {
            Self::new(vec![Err(refused())])
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Probe for ScriptedProbe {
        fn target(&self) -> String {
            "scripted".to_string()
        }

        async fn attempt(&self) -> Result<ProbeSuccess, FailureCause> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            let index = call.min(self.script.len() - 1);
            self.script[index].clone()
        }

        async fn enrich(&self, mut success: ProbeSuccess) -> ProbeSuccess {
            if let Some(latency) = self.enrich_latency {
                tokio::time::sleep(latency).await;
                success.metadata.insert("version".into(), "9.9.9".into());
            }
            success
        }
    }

    fn refused() -> FailureCause {
        FailureCause::ConnectionRefused("nothing listening".into())
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_secs(1), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_policy_validation() {
        assert_eq!(
            RetryPolicy::new(0, Duration::from_secs(1), Duration::from_secs(1)),
            Err(PolicyError::ZeroAttempts)
        );
        assert_eq!(
            RetryPolicy::new(3, Duration::from_secs(1), Duration::ZERO),
            Err(PolicyError::ZeroTimeout)
        );
        // A zero delay is allowed, as is a timeout longer than the delay.
        let p = RetryPolicy::new(2, Duration::ZERO, Duration::from_secs(10)).unwrap();
        assert_eq!(p.max_attempts(), 2);
        assert_eq!(p.delay(), Duration::ZERO);
        assert_eq!(p.attempt_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_reference_defaults() {
        let tcp = RetryPolicy::tcp_default();
        assert_eq!(tcp.max_attempts(), 3);
        assert_eq!(tcp.delay(), Duration::from_secs(1));
        assert_eq!(tcp.attempt_timeout(), Duration::from_secs(5));

        let http = RetryPolicy::http_default();
        assert_eq!(http.max_attempts(), 1);
        assert_eq!(http.attempt_timeout(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_uses_n_attempts_and_n_minus_one_delays() {
        for n in 1..=4 {
            let probe = ScriptedProbe::always_failing();
            let runner = RetryRunner::new(policy(n), Cancel::new());

            let start = Instant::now();
            let result = runner.run(&probe).await;

            assert_eq!(result, ProbeResult::failed(refused(), n));
            assert_eq!(probe.calls(), n);
            assert_eq!(start.elapsed(), Duration::from_secs(u64::from(n - 1)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_attempt_k_stops_immediately() {
        let mut metadata = crate::probe::Metadata::new();
        metadata.insert("version".into(), "1.2.3".into());

        let probe = ScriptedProbe::new(vec![
            Err(refused()),
            Err(FailureCause::Timeout(Duration::from_secs(5))),
            Ok(ProbeSuccess::with_metadata(metadata.clone())),
        ]);
        let runner = RetryRunner::new(policy(5), Cancel::new());

        let start = Instant::now();
        let result = runner.run(&probe).await;

        assert_eq!(
            result,
            ProbeResult::Success {
                metadata,
                warning: None,
                attempts: 3
            }
        );
        assert_eq!(probe.calls(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_consumes_no_delay() {
        let probe = ScriptedProbe::new(vec![Ok(ProbeSuccess::default())]);
        let runner = RetryRunner::new(policy(3), Cancel::new());

        let start = Instant::now();
        let result = runner.run(&probe).await;

        assert!(result.is_success());
        assert_eq!(result.attempts(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_cause_is_reported() {
        let probe = ScriptedProbe::new(vec![
            Err(refused()),
            Err(FailureCause::UnexpectedStatus { code: 503 }),
        ]);
        let runner = RetryRunner::new(policy(2), Cancel::new());

        let result = runner.run(&probe).await;
        assert_eq!(
            result.cause(),
            Some(&FailureCause::UnexpectedStatus { code: 503 })
        );
        assert_eq!(result.attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_bounded_by_policy_timeout() {
        let mut probe = ScriptedProbe::new(vec![Ok(ProbeSuccess::default())]);
        probe.latency = Duration::from_secs(60);
        let policy = RetryPolicy::new(2, Duration::from_secs(1), Duration::from_secs(5)).unwrap();
        let runner = RetryRunner::new(policy, Cancel::new());

        let start = Instant::now();
        let result = runner.run(&probe).await;

        assert_eq!(
            result,
            ProbeResult::failed(FailureCause::Timeout(Duration::from_secs(5)), 2)
        );
        assert_eq!(start.elapsed(), Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_delay_skips_remaining_attempts() {
        let probe = ScriptedProbe::always_failing();
        let cancel = Cancel::new();
        let runner = RetryRunner::new(policy(3), cancel.clone());

        // Attempt 1 at t=0, attempt 2 at t=1s, second delay spans 1s..2s.
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            trigger.trigger();
        });

        let start = Instant::now();
        let result = runner.run(&probe).await;

        assert_eq!(result, ProbeResult::failed(FailureCause::Cancelled, 2));
        assert_eq!(probe.calls(), 2);
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_attempt() {
        let mut probe = ScriptedProbe::always_failing();
        probe.latency = Duration::from_secs(3);
        let cancel = Cancel::new();
        let runner = RetryRunner::new(policy(3), cancel.clone());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.trigger();
        });

        let result = runner.run(&probe).await;
        assert_eq!(result, ProbeResult::failed(FailureCause::Cancelled, 1));
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start_makes_no_attempt() {
        let probe = ScriptedProbe::new(vec![Ok(ProbeSuccess::default())]);
        let cancel = Cancel::new();
        cancel.trigger();

        let result = RetryRunner::new(policy(3), cancel).run(&probe).await;
        assert_eq!(result, ProbeResult::failed(FailureCause::Cancelled, 0));
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_enrichment_does_not_fail_passed_check() {
        let mut probe = ScriptedProbe::new(vec![Ok(ProbeSuccess::default())]);
        probe.enrich_latency = Some(Duration::from_secs(30));
        let runner = RetryRunner::new(policy(3), Cancel::new());

        let result = runner.run(&probe).await;

        // Enrichment outlasts the 5s attempt timeout yet the check still passes.
        match result {
            ProbeResult::Success {
                metadata,
                attempts: 1,
                ..
            } => {
                assert_eq!(metadata.get("version").map(String::as_str), Some("9.9.9"));
            }
            other => panic!("expected success on the first attempt, got {other:?}"),
        }
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_enrichment_keeps_success() {
        let mut probe = ScriptedProbe::new(vec![Ok(ProbeSuccess::default())]);
        probe.enrich_latency = Some(Duration::from_secs(30));
        let cancel = Cancel::new();
        let runner = RetryRunner::new(policy(3), cancel.clone());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.trigger();
        });

        let result = runner.run(&probe).await;
        match result {
            ProbeResult::Success {
                metadata,
                warning,
                attempts: 1,
            } => {
                assert!(metadata.is_empty());
                assert!(warning.is_some());
            }
            other => panic!("expected success with warning, got {other:?}"),
        }
    }
}
