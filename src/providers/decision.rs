//! Classification of provider responses.
//!
//! Each provider documents its failures differently: some through HTTP status
//! codes, some through an error object inside a 200 response, some through
//! both. A [`DecisionTable`] maps those signals to an [`ErrorKind`] and to the
//! effect the outcome has on the rate-limit gate. Rules are checked in order
//! and the first match wins.

use crate::error::ErrorKind;
use crate::rate_limit::{Permit, RejectionKind};

/// An error object the provider embedded in its response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadError {
    /// Numeric error code, for providers that send one
    pub code: Option<i64>,
    /// Error message or reason
    pub message: String,
}

impl PayloadError {
    /// Create a payload error without a code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Create a payload error with a numeric code.
    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

/// The part of a response a rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Exactly this HTTP status
    Status(u16),
    /// A payload error carrying this code
    PayloadCode(i64),
    /// A payload error whose message contains this text, case-insensitively
    PayloadMessage(&'static str),
    /// Any payload error
    AnyPayloadError,
    /// Any status outside 2xx
    AnyFailureStatus,
}

/// What an outcome does to the rate-limit gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEffect {
    /// The provider counted the call: consume one unit
    Consume,
    /// The provider refused for quota reasons: close the gate
    Reject(RejectionKind),
    /// Credential rejected: consume only if the policy says so
    AuthFailure,
    /// No quota used
    Release,
}

impl GateEffect {
    /// Settle `permit` according to this effect.
    pub fn apply(self, permit: Permit<'_>) {
        match self {
            GateEffect::Consume => permit.record_success(),
            GateEffect::Reject(kind) => permit.record_rejection(kind),
            GateEffect::AuthFailure => permit.record_auth_failure(),
            GateEffect::Release => permit.release(),
        }
    }
}

/// One row of a decision table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    /// What to match
    pub signal: Signal,
    /// The error kind reported to the caller
    pub kind: ErrorKind,
    /// The effect on the gate
    pub gate: GateEffect,
    /// Message used when the provider supplies none
    pub message: &'static str,
}

impl Rule {
    /// Create a rule.
    pub const fn new(signal: Signal, kind: ErrorKind, gate: GateEffect, message: &'static str) -> Self {
        Self {
            signal,
            kind,
            gate,
            message,
        }
    }

    fn matches(&self, status: u16, payload: Option<&PayloadError>) -> bool {
        match self.signal {
            Signal::Status(code) => status == code,
            Signal::AnyFailureStatus => !(200..300).contains(&status),
            Signal::AnyPayloadError => payload.is_some(),
            Signal::PayloadCode(code) => payload.is_some_and(|p| p.code == Some(code)),
            Signal::PayloadMessage(needle) => payload.is_some_and(|p| {
                p.message
                    .to_ascii_lowercase()
                    .contains(&needle.to_ascii_lowercase())
            }),
        }
    }
}

/// Result of classifying a response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict<'a> {
    /// 2xx without a payload error
    Success,
    /// A rule matched
    Failure(&'a Rule),
    /// A failure no rule covers
    Unclassified,
}

/// Ordered, static list of rules for one provider.
#[derive(Debug, Clone, Copy)]
pub struct DecisionTable {
    rules: &'static [Rule],
}

impl DecisionTable {
    /// Create a table from its rules, highest priority first.
    pub const fn new(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    /// The rules, in match order.
    pub fn rules(&self) -> &'static [Rule] {
        self.rules
    }

    /// Classify a response by its status and embedded error.
    pub fn classify(&self, status: u16, payload: Option<&PayloadError>) -> Verdict<'static> {
        if (200..300).contains(&status) && payload.is_none() {
            return Verdict::Success;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(status, payload))
            .map_or(Verdict::Unclassified, Verdict::Failure)
    }
}
