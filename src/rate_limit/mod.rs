//! Rate limiting for IP lookup providers.
//!
//! Every provider documents its own quota: ip-api.com allows 45 requests per
//! minute, ipapi.co 1000 per day, abstractapi.com one per second plus a monthly
//! allowance. Each adapter owns a [`RateLimitGate`] that tracks the current
//! window locally and refuses calls once it is exhausted, without touching the
//! network.
//!
//! ## Window model
//!
//! - A window holds `limit_amount` calls and lasts `window`.
//! - Once the deadline passes, the next admission check refills the window.
//! - A confirmed success consumes one call.
//! - A provider-side rejection zeroes the window and pushes the deadline out
//!   by one window, or by the quota cooldown for hard quota exhaustion.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use cool_ip_api::rate_limit::RateLimitPolicy;
//!
//! // 45 requests per minute, counting failed authentications as well.
//! let policy = RateLimitPolicy::per_minute(45).with_auth_failure_consumes(true);
//! assert_eq!(policy.window, Duration::from_secs(60));
//! ```

mod clock;
mod gate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use gate::{GateSnapshot, LimitHints, Permit, RateLimitGate};

use std::time::Duration;

/// Which deadline a provider-side rejection applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    /// Short-term rate limit: close for one window
    Window,
    /// Hard quota exhaustion: close for the quota cooldown
    Quota,
}

/// Rate limit configuration for one adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Maximum calls per window.
    pub limit_amount: u32,
    /// Length of the window.
    pub window: Duration,
    /// How long the gate stays closed after a hard quota rejection.
    pub quota_cooldown: Duration,
    /// Whether a rejected credential counts against the window.
    pub auth_failure_consumes: bool,
}

impl RateLimitPolicy {
    /// Cooldown applied after a hard quota rejection unless configured otherwise.
    pub const DEFAULT_QUOTA_COOLDOWN: Duration = Duration::from_secs(limits::QUOTA_COOLDOWN_SECS);

    /// Create a policy allowing `limit_amount` calls per `window`.
    pub fn new(limit_amount: u32, window: Duration) -> Self {
        Self {
            limit_amount,
            window,
            quota_cooldown: Self::DEFAULT_QUOTA_COOLDOWN,
            auth_failure_consumes: false,
        }
    }

    /// `limit_amount` calls per second.
    pub fn per_second(limit_amount: u32) -> Self {
        Self::new(limit_amount, Duration::from_secs(1))
    }

    /// `limit_amount` calls per minute.
    pub fn per_minute(limit_amount: u32) -> Self {
        Self::new(limit_amount, Duration::from_secs(60))
    }

    /// `limit_amount` calls per day.
    pub fn per_day(limit_amount: u32) -> Self {
        Self::new(limit_amount, Duration::from_secs(limits::DAY_SECS))
    }

    /// `limit_amount` calls per 30-day month.
    pub fn per_month(limit_amount: u32) -> Self {
        Self::new(limit_amount, Duration::from_secs(limits::MONTH_SECS))
    }

    /// Set the cooldown used after a hard quota rejection.
    pub fn with_quota_cooldown(mut self, cooldown: Duration) -> Self {
        self.quota_cooldown = cooldown;
        self
    }

    /// Set whether authentication failures consume quota.
    pub fn with_auth_failure_consumes(mut self, consumes: bool) -> Self {
        self.auth_failure_consumes = consumes;
        self
    }

    pub(crate) fn cooldown(&self, kind: RejectionKind) -> Duration {
        match kind {
            RejectionKind::Window => self.window,
            RejectionKind::Quota => self.quota_cooldown,
        }
    }
}

/// Documented (or best-effort) provider limits.
///
/// Several of these are approximations of undocumented policies; adapters
/// accept a custom [`RateLimitPolicy`] for when providers change them.
pub mod limits {
    /// Seconds in a day.
    pub const DAY_SECS: u64 = 60 * 60 * 24;
    /// Seconds in a 30-day month.
    pub const MONTH_SECS: u64 = DAY_SECS * 30;
    /// Default cooldown after hard quota exhaustion.
    pub const QUOTA_COOLDOWN_SECS: u64 = MONTH_SECS;

    /// ip-api.com: 45 requests per minute per client IP.
    pub mod ip_api_com {
        /// Requests per window.
        pub const LIMIT_AMOUNT: u32 = 45;
        /// Window length in seconds.
        pub const WINDOW_SECS: u64 = 60;
    }

    /// ipapi.co: 1000 requests per day per client IP.
    pub mod ipapi_co {
        /// Requests per window.
        pub const LIMIT_AMOUNT: u32 = 1000;
        /// Window length in seconds.
        pub const WINDOW_SECS: u64 = super::DAY_SECS;
    }

    /// ipapi.com: 1000 requests per month per API key.
    pub mod ipapi_com {
        /// Requests per window.
        pub const LIMIT_AMOUNT: u32 = 1000;
        /// Window length in seconds.
        pub const WINDOW_SECS: u64 = super::MONTH_SECS;
    }

    /// abstractapi.com: one request per second (the monthly allowance is signaled by HTTP 422).
    pub mod abstractapi_com {
        /// Requests per window.
        pub const LIMIT_AMOUNT: u32 = 1;
        /// Window length in seconds.
        pub const WINDOW_SECS: u64 = 1;
    }

    /// ipinfo.io: 50000 requests per month per token.
    pub mod ipinfo_io {
        /// Requests per window.
        pub const LIMIT_AMOUNT: u32 = 50_000;
        /// Window length in seconds.
        pub const WINDOW_SECS: u64 = super::MONTH_SECS;
    }

    /// ipwho.is: 10000 requests per month.
    pub mod ipwho_is {
        /// Requests per window.
        pub const LIMIT_AMOUNT: u32 = 10_000;
        /// Window length in seconds.
        pub const WINDOW_SECS: u64 = super::MONTH_SECS;
    }

    /// myip.wtf: one request per minute per family, two to cover combined mode.
    pub mod myip_wtf {
        /// Requests per window.
        pub const LIMIT_AMOUNT: u32 = 2;
        /// Window length in seconds.
        pub const WINDOW_SECS: u64 = 60;
    }
}
