//! Liveness monitoring and the hardware fail-safe timer.
//!
//! Every execution context owns a [`Heartbeat`] it refreshes from its
//! service loop. The supervisor checks all heartbeats each period and only
//! feeds the fail-safe timer while every context is healthy; a stuck
//! context therefore ends in a full device reset.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::config::{HEALTH_WINDOW_US, STARTUP_GRACE_US, STARTUP_HANDSHAKE_TIMEOUT_US};
use crate::error::Error;
use crate::time::{elapsed, Clock, Micros};

/// Progress marker of one execution context.
///
/// Only plain atomic loads and stores are used, so this works on cores
/// without compare-and-swap (Cortex-M0+).
pub struct Heartbeat {
    last_seen: AtomicU32,
    started: AtomicBool,
}

impl Heartbeat {
    pub const fn new() -> Self {
        Self {
            last_seen: AtomicU32::new(0),
            started: AtomicBool::new(false),
        }
    }

    /// Record forward progress at `now`.
    pub fn beat(&self, now: Micros) {
        self.last_seen.store(now, Ordering::Release);
    }

    /// Complete the startup handshake.
    pub fn mark_started(&self, now: Micros) {
        self.beat(now);
        self.started.store(true, Ordering::Release);
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub fn last_seen(&self) -> Micros {
        self.last_seen.load(Ordering::Acquire)
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self::new()
    }
}

/// Hardware timer that resets the device unless fed.
pub trait FailSafe {
    fn feed(&mut self);
}

/// Outcome of one supervision pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verdict {
    Healthy,
    /// Context `index` is stuck or never came up; the timer is not fed.
    Unhealthy { index: usize },
}

impl Verdict {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Verdict::Healthy)
    }
}

/// Supervisor over `N` heartbeats.
pub struct LivenessMonitor<'a, const N: usize> {
    contexts: [&'a Heartbeat; N],
    started_at: Micros,
    handshake_reported: [bool; N],
    last_verdict: Verdict,
}

impl<'a, const N: usize> LivenessMonitor<'a, N> {
    /// Start supervising at `now`; startup deadlines count from here.
    pub fn new(contexts: [&'a Heartbeat; N], now: Micros) -> Self {
        Self {
            contexts,
            started_at: now,
            handshake_reported: [false; N],
            last_verdict: Verdict::Healthy,
        }
    }

    /// Evaluate every context at `now`.
    pub fn check(&mut self, now: Micros) -> Verdict {
        let since_start = elapsed(now, self.started_at);
        let mut verdict = Verdict::Healthy;

        for (index, heartbeat) in self.contexts.iter().enumerate() {
            let healthy = if heartbeat.is_started() {
                elapsed(now, heartbeat.last_seen()) <= HEALTH_WINDOW_US
            } else {
                if since_start > STARTUP_HANDSHAKE_TIMEOUT_US && !self.handshake_reported[index] {
                    self.handshake_reported[index] = true;
                    error!("context {} missed its startup handshake", index);
                }
                since_start <= STARTUP_GRACE_US
            };

            if !healthy && verdict.is_healthy() {
                verdict = Verdict::Unhealthy { index };
            }
        }

        if verdict != self.last_verdict {
            match verdict {
                Verdict::Unhealthy { index } => {
                    error!("context {} unresponsive, withholding watchdog feed", index)
                }
                Verdict::Healthy => info!("all contexts healthy again"),
            }
            self.last_verdict = verdict;
        }
        verdict
    }

    /// Check and feed `failsafe` only if every context is healthy.
    pub fn service(&mut self, now: Micros, failsafe: &mut impl FailSafe) -> Verdict {
        let verdict = self.check(now);
        if verdict.is_healthy() {
            failsafe.feed();
        }
        verdict
    }

    /// [`service`](Self::service), yielding the verdict only when it differs
    /// from the previous pass.
    pub fn service_changes(&mut self, now: Micros, failsafe: &mut impl FailSafe) -> Option<Verdict> {
        let before = self.last_verdict;
        let verdict = self.service(now, failsafe);
        (verdict != before).then_some(verdict)
    }
}

/// Progress of the wait for another context's startup handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupWait {
    Started,
    Waiting,
    TimedOut,
}

/// Poll `heartbeat` during the bounded startup wait that began at `since`.
pub fn startup_wait(heartbeat: &Heartbeat, since: Micros, now: Micros) -> StartupWait {
    if heartbeat.is_started() {
        StartupWait::Started
    } else if elapsed(now, since) >= STARTUP_HANDSHAKE_TIMEOUT_US {
        StartupWait::TimedOut
    } else {
        StartupWait::Waiting
    }
}

/// Run a context's bring-up and complete its handshake on success.
///
/// On failure the error is logged and the heartbeat is left untouched so
/// the supervisor escalates to a reset.
pub fn bring_up<T>(
    heartbeat: &Heartbeat,
    clock: &impl Clock,
    init: impl FnOnce() -> Result<T, Error>,
) -> Option<T> {
    match init() {
        Ok(value) => {
            heartbeat.mark_started(clock.now_us());
            Some(value)
        }
        Err(e) => {
            error!("bring-up failed: {}", e);
            None
        }
    }
}
