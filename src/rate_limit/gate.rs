//! The per-adapter rate-limit gate.
//!
//! A gate admits calls optimistically from its local counter and rejects
//! pessimistically: any quota signal from the provider zeroes the counter and
//! pushes the reset deadline forward, so one rejection does not turn into a
//! burst of doomed requests.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use cool_ip_api::rate_limit::{ManualClock, RateLimitGate, RateLimitPolicy};
//!
//! let clock = Arc::new(ManualClock::new());
//! let gate = RateLimitGate::new("example", RateLimitPolicy::new(1, Duration::from_secs(60)), clock.clone());
//!
//! let permit = gate.check_and_consume_permission().unwrap();
//! permit.record_success();
//! assert!(gate.check_and_consume_permission().is_err());
//!
//! clock.advance(Duration::from_secs(61));
//! assert!(gate.check_and_consume_permission().is_ok());
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::{IpApiError, RateLimitOrigin};
use crate::rate_limit::{Clock, RateLimitPolicy, RejectionKind};

/// Rate-limit signals read from a provider response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitHints {
    /// Requests the provider says are left in its window
    pub remaining: Option<u32>,
    /// Time until the provider's window resets
    pub reset_in: Option<Duration>,
}

impl LimitHints {
    /// Check whether the response carried any signal at all.
    pub fn is_empty(&self) -> bool {
        self.remaining.is_none() && self.reset_in.is_none()
    }
}

/// Point-in-time view of a gate's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateSnapshot {
    /// Maximum calls per window
    pub limit_amount: u32,
    /// Calls left in the current window
    pub remaining: u32,
    /// Admitted calls whose outcome is not known yet
    pub in_flight: u32,
    /// When the current window ends
    pub reset_at: Instant,
    /// Window length
    pub window: Duration,
}

#[derive(Debug)]
struct GateState {
    remaining: u32,
    in_flight: u32,
    reset_at: Instant,
}

impl GateState {
    fn roll_over(&mut self, now: Instant, policy: &RateLimitPolicy) {
        if now >= self.reset_at {
            self.remaining = policy.limit_amount;
            self.reset_at = now + policy.window;
        }
    }

    fn push_reset(&mut self, at: Instant) {
        if at > self.reset_at {
            self.reset_at = at;
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Settlement {
    Success,
    Rejection(RejectionKind),
    Release,
}

/// Admission and bookkeeping for one adapter instance.
///
/// All state sits behind a single lock, so concurrent callers sharing an
/// adapter never lose an update. The lock is never held across I/O.
pub struct RateLimitGate {
    name: &'static str,
    policy: Option<RateLimitPolicy>,
    clock: Arc<dyn Clock>,
    state: Mutex<GateState>,
}

impl RateLimitGate {
    /// Create a gate enforcing `policy`, with a full window starting now.
    pub fn new(name: &'static str, policy: RateLimitPolicy, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            name,
            state: Mutex::new(GateState {
                remaining: policy.limit_amount,
                in_flight: 0,
                reset_at: now + policy.window,
            }),
            policy: Some(policy),
            clock,
        }
    }

    /// Create a gate that admits every call.
    pub fn unlimited(name: &'static str, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            name,
            policy: None,
            clock,
            state: Mutex::new(GateState {
                remaining: 0,
                in_flight: 0,
                reset_at: now,
            }),
        }
    }

    /// The policy this gate enforces, `None` for an unlimited gate.
    pub fn policy(&self) -> Option<&RateLimitPolicy> {
        self.policy.as_ref()
    }

    /// Decide whether a request may be sent now.
    ///
    /// Rolls the window over when its deadline has passed, then reserves one
    /// unit of quota. The reservation is held by the returned [`Permit`] until
    /// the outcome is recorded; dropping the permit releases it without
    /// touching the counter.
    pub fn check_and_consume_permission(&self) -> Result<Permit<'_>, IpApiError> {
        let Some(policy) = &self.policy else {
            return Ok(Permit {
                gate: self,
                reserved: false,
            });
        };

        let now = self.clock.now();
        let mut state = self.state.lock();
        state.roll_over(now, policy);

        if state.remaining <= state.in_flight {
            let retry_after = state.reset_at.saturating_duration_since(now);
            tracing::warn!(
                provider = self.name,
                retry_after_ms = retry_after.as_millis() as u64,
                "request blocked by local rate limit"
            );
            return Err(IpApiError::RateLimit {
                message: format!(
                    "{} allows {} requests per {:?}",
                    self.name, policy.limit_amount, policy.window
                ),
                origin: RateLimitOrigin::Local,
                retry_after: Some(retry_after),
            });
        }

        state.in_flight += 1;
        Ok(Permit {
            gate: self,
            reserved: true,
        })
    }

    /// Count one confirmed successful call against the window.
    pub fn record_success(&self) {
        self.settle(false, Settlement::Success);
    }

    /// Close the window after the provider signaled a limit or quota rejection.
    pub fn record_rejection(&self, kind: RejectionKind) {
        self.settle(false, Settlement::Rejection(kind));
    }

    /// Align the local counter with limit signals reported by the provider.
    ///
    /// The counter only ever goes down and the reset deadline only ever moves
    /// forward.
    pub fn reconcile(&self, hints: &LimitHints) {
        let Some(policy) = &self.policy else {
            return;
        };
        if hints.is_empty() {
            return;
        }

        let now = self.clock.now();
        let mut state = self.state.lock();
        // Hints describe the provider's current window, not an expired local one.
        state.roll_over(now, policy);
        if let Some(remaining) = hints.remaining {
            state.remaining = state.remaining.min(remaining);
        }
        if let Some(reset_in) = hints.reset_in {
            if state.remaining == 0 {
                state.push_reset(now + reset_in);
            }
        }
    }

    /// Current bookkeeping, `None` for an unlimited gate.
    ///
    /// The snapshot does not roll the window over; a stale window shows up as
    /// `reset_at` in the past.
    pub fn snapshot(&self) -> Option<GateSnapshot> {
        let policy = self.policy.as_ref()?;
        let state = self.state.lock();
        Some(GateSnapshot {
            limit_amount: policy.limit_amount,
            remaining: state.remaining,
            in_flight: state.in_flight,
            reset_at: state.reset_at,
            window: policy.window,
        })
    }

    /// Calls left in the current window, `None` for an unlimited gate.
    pub fn remaining(&self) -> Option<u32> {
        self.snapshot().map(|s| s.remaining)
    }

    fn settle(&self, reserved: bool, settlement: Settlement) {
        let Some(policy) = &self.policy else {
            return;
        };

        let now = self.clock.now();
        let mut state = self.state.lock();
        if reserved {
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        match settlement {
            Settlement::Success => {
                state.remaining = state.remaining.saturating_sub(1);
            }
            Settlement::Rejection(kind) => {
                state.remaining = 0;
                state.push_reset(now + policy.cooldown(kind));
            }
            Settlement::Release => {}
        }
    }
}

impl std::fmt::Debug for RateLimitGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitGate")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("state", &*self.state.lock())
            .finish()
    }
}

/// Admission token for one request.
///
/// Settle it with one of the `record_*` methods once the provider's answer is
/// known. A permit dropped unsettled, e.g. because the async call was
/// cancelled, records nothing.
#[must_use = "an unsettled permit records no outcome"]
#[derive(Debug)]
pub struct Permit<'a> {
    gate: &'a RateLimitGate,
    reserved: bool,
}

impl Permit<'_> {
    /// The provider confirmed success: consume one unit.
    pub fn record_success(mut self) {
        let reserved = self.take();
        self.gate.settle(reserved, Settlement::Success);
    }

    /// The provider signaled a rate-limit or quota rejection.
    pub fn record_rejection(mut self, kind: RejectionKind) {
        let reserved = self.take();
        self.gate.settle(reserved, Settlement::Rejection(kind));
    }

    /// The provider rejected the credential.
    ///
    /// Consumes a unit only when the policy says authentication failures count.
    pub fn record_auth_failure(mut self) {
        let reserved = self.take();
        let consumes = self
            .gate
            .policy
            .as_ref()
            .is_some_and(|p| p.auth_failure_consumes);
        let settlement = if consumes {
            Settlement::Success
        } else {
            Settlement::Release
        };
        self.gate.settle(reserved, settlement);
    }

    /// The outcome used no quota: give the reservation back.
    pub fn release(mut self) {
        let reserved = self.take();
        self.gate.settle(reserved, Settlement::Release);
    }

    fn take(&mut self) -> bool {
        std::mem::replace(&mut self.reserved, false)
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if self.reserved {
            self.gate.settle(true, Settlement::Release);
        }
    }
}
